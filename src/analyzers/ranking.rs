//! Competition ranking ("1, 2, 2, 4") of students by mean points.

use std::cmp::Ordering;

use crate::analyzers::types::{Performance, StudentRecord};

/// Descending by mean points, then by mean score.
pub fn by_merit(a: &Performance, b: &Performance) -> Ordering {
    b.mean_points
        .total_cmp(&a.mean_points)
        .then(b.mean_score.total_cmp(&a.mean_score))
}

/// Assigns competition ranks to points already sorted in descending order.
///
/// A value equal to its predecessor shares the predecessor's rank; any other
/// value takes its 1-based position.
pub fn competition_ranks(points: &[f64]) -> Vec<u32> {
    let mut ranks: Vec<u32> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let rank = match ranks.last() {
            Some(&prev) if points[i - 1] == *p => prev,
            _ => i as u32 + 1,
        };
        ranks.push(rank);
    }
    ranks
}

/// Orders students by merit and fills in `overall_rank` and, when groups are
/// given, `stream_rank`.
///
/// Unscored students keep their sheet order after the ranked ones and get no
/// rank. Mean score only orders students with equal points; it never splits
/// their shared rank.
pub fn rank_students(mut records: Vec<StudentRecord>, groups: &[String]) -> Vec<StudentRecord> {
    records.sort_by(|a, b| match (&a.performance, &b.performance) {
        (Some(pa), Some(pb)) => by_merit(pa, pb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let ranked: Vec<usize> = (0..records.len())
        .filter(|&i| records[i].is_ranked())
        .collect();
    assign(&mut records, &ranked, |r, rank| r.overall_rank = Some(rank));

    for group in groups {
        let members: Vec<usize> = ranked
            .iter()
            .copied()
            .filter(|&i| records[i].group.as_deref() == Some(group.as_str()))
            .collect();
        assign(&mut records, &members, |r, rank| r.stream_rank = Some(rank));
    }

    records
}

fn assign(
    records: &mut [StudentRecord],
    order: &[usize],
    mut set: impl FnMut(&mut StudentRecord, u32),
) {
    let points: Vec<f64> = order
        .iter()
        .filter_map(|&i| records[i].performance.as_ref().map(|p| p.mean_points))
        .collect();

    for (&i, rank) in order.iter().zip(competition_ranks(&points)) {
        set(&mut records[i], rank);
    }
}
