/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Middle value of the sorted data; the mean of the two middle values for an
/// even count. Returns 0.0 for empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Most frequent value. When several values share the highest count, the
/// smallest of them wins. Returns 0.0 for empty input.
pub fn mode(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    for run in sorted.chunk_by(|a, b| a == b) {
        // Ascending scan with a strict comparison keeps the smallest tied value.
        if best.is_none_or(|(_, count)| run.len() > count) {
            best = Some((run[0], run.len()));
        }
    }
    best.map(|(value, _)| value).unwrap_or(0.0)
}

/// Rounds half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Share of `part` in `total` as a percentage. Returns 0.0 when `total` is zero.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn test_population_stddev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(stddev(&values, mean(&values)), 2.0);
        assert_eq!(stddev(&[], 0.0), 0.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_mode_tie_takes_smallest() {
        assert_eq!(mode(&[70.0, 70.0, 80.0, 80.0]), 70.0);
        assert_eq!(mode(&[80.0, 80.0, 70.0, 70.0]), 70.0);
        assert_eq!(mode(&[50.0, 90.0, 90.0, 60.0]), 90.0);
    }

    #[test]
    fn test_mode_all_distinct_is_minimum() {
        assert_eq!(mode(&[65.0, 42.0, 88.0]), 42.0);
        assert_eq!(mode(&[]), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(75.125, 2), 75.13);
        assert_eq!(round_to(10.0 / 3.0, 2), 3.33);
        assert_eq!(round_to(66.66666, 1), 66.7);
        assert_eq!(round_to(11.0, 2), 11.0);
    }

    #[test]
    fn test_pct() {
        assert_eq!(pct(10, 0), 0.0);
        assert_eq!(pct(1, 4), 25.0);
    }
}
