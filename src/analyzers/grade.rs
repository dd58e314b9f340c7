use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which a subject score counts as passed.
pub const PASS_MARK: f64 = 50.0;

/// Lowest grade that qualifies for university entry.
pub const QUALITY_GRADE: Grade = Grade::CPlus;

const MAX_SCORE: f64 = 100.0;

/// One of the twelve letter grades, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "E")]
    E,
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::DMinus => "D-",
            Grade::E => "E",
        }
    }

    /// The tier this grade belongs to in [`GRADING_SYSTEM`].
    pub fn def(self) -> &'static GradeDef {
        GRADING_SYSTEM
            .iter()
            .find(|g| g.grade == self)
            .unwrap_or(lowest_tier())
    }

    pub fn points(self) -> u8 {
        self.def().points
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A band of the grading scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeDef {
    pub min: f64,
    pub max: f64,
    pub grade: Grade,
    pub points: u8,
}

impl GradeDef {
    /// Whether `score` falls in this band. Bands are integer-bounded; a
    /// fractional score between two bands belongs to the lower one.
    pub fn contains(&self, score: f64) -> bool {
        if self.max >= MAX_SCORE {
            score >= self.min && score <= self.max
        } else {
            score >= self.min && score < self.max + 1.0
        }
    }
}

/// The fixed grading scale.
///
/// | Score    | Grade | Points |
/// |----------|-------|--------|
/// | 80 – 100 | A     | 12     |
/// | 75 – 79  | A-    | 11     |
/// | 70 – 74  | B+    | 10     |
/// | 65 – 69  | B     | 9      |
/// | 60 – 64  | B-    | 8      |
/// | 55 – 59  | C+    | 7      |
/// | 50 – 54  | C     | 6      |
/// | 45 – 49  | C-    | 5      |
/// | 40 – 44  | D+    | 4      |
/// | 35 – 39  | D     | 3      |
/// | 30 – 34  | D-    | 2      |
/// | 0 – 29   | E     | 1      |
pub static GRADING_SYSTEM: [GradeDef; 12] = [
    GradeDef { min: 80.0, max: 100.0, grade: Grade::A, points: 12 },
    GradeDef { min: 75.0, max: 79.0, grade: Grade::AMinus, points: 11 },
    GradeDef { min: 70.0, max: 74.0, grade: Grade::BPlus, points: 10 },
    GradeDef { min: 65.0, max: 69.0, grade: Grade::B, points: 9 },
    GradeDef { min: 60.0, max: 64.0, grade: Grade::BMinus, points: 8 },
    GradeDef { min: 55.0, max: 59.0, grade: Grade::CPlus, points: 7 },
    GradeDef { min: 50.0, max: 54.0, grade: Grade::C, points: 6 },
    GradeDef { min: 45.0, max: 49.0, grade: Grade::CMinus, points: 5 },
    GradeDef { min: 40.0, max: 44.0, grade: Grade::DPlus, points: 4 },
    GradeDef { min: 35.0, max: 39.0, grade: Grade::D, points: 3 },
    GradeDef { min: 30.0, max: 34.0, grade: Grade::DMinus, points: 2 },
    GradeDef { min: 0.0, max: 29.0, grade: Grade::E, points: 1 },
];

fn lowest_tier() -> &'static GradeDef {
    &GRADING_SYSTEM[GRADING_SYSTEM.len() - 1]
}

/// Resolves a raw score to its grade band.
///
/// Scores are not clamped: anything outside the scale (negative, above 100,
/// NaN) resolves to the lowest band.
pub fn resolve_grade(score: f64) -> &'static GradeDef {
    GRADING_SYSTEM
        .iter()
        .find(|g| g.contains(score))
        .unwrap_or(lowest_tier())
}

/// Converts an average point value into the mean grade.
///
/// The average is rounded half away from zero; a rounded value with no
/// matching tier resolves to the lowest grade.
pub fn resolve_mean_grade(avg_points: f64) -> Grade {
    let rounded = avg_points.round();
    GRADING_SYSTEM
        .iter()
        .find(|g| f64::from(g.points) == rounded)
        .map(|g| g.grade)
        .unwrap_or(lowest_tier().grade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(resolve_grade(100.0).grade, Grade::A);
        assert_eq!(resolve_grade(80.0).grade, Grade::A);
        assert_eq!(resolve_grade(79.0).grade, Grade::AMinus);
        assert_eq!(resolve_grade(75.0).grade, Grade::AMinus);
        assert_eq!(resolve_grade(74.0).grade, Grade::BPlus);
        assert_eq!(resolve_grade(55.0).grade, Grade::CPlus);
        assert_eq!(resolve_grade(54.0).grade, Grade::C);
        assert_eq!(resolve_grade(50.0).grade, Grade::C);
        assert_eq!(resolve_grade(49.0).grade, Grade::CMinus);
        assert_eq!(resolve_grade(30.0).grade, Grade::DMinus);
        assert_eq!(resolve_grade(29.0).grade, Grade::E);
        assert_eq!(resolve_grade(0.0).grade, Grade::E);
    }

    #[test]
    fn test_points_follow_scale() {
        assert_eq!(resolve_grade(92.0).points, 12);
        assert_eq!(resolve_grade(66.0).points, 9);
        assert_eq!(resolve_grade(12.0).points, 1);
        assert_eq!(Grade::CPlus.points(), 7);
    }

    #[test]
    fn test_fractional_score_between_bands_takes_lower_band() {
        assert_eq!(resolve_grade(79.5).grade, Grade::AMinus);
        assert_eq!(resolve_grade(29.99).grade, Grade::E);
        assert_eq!(resolve_grade(99.5).grade, Grade::A);
    }

    #[test]
    fn test_out_of_domain_scores_fall_back_to_lowest() {
        assert_eq!(resolve_grade(-5.0).grade, Grade::E);
        assert_eq!(resolve_grade(100.5).grade, Grade::E);
        assert_eq!(resolve_grade(f64::NAN).grade, Grade::E);
    }

    #[test]
    fn test_every_score_in_domain_hits_exactly_one_tier() {
        let mut score = 0.0;
        while score <= 100.0 {
            let hits = GRADING_SYSTEM.iter().filter(|g| g.contains(score)).count();
            assert_eq!(hits, 1, "score {score} matched {hits} tiers");
            assert!(resolve_grade(score).contains(score));
            score += 0.25;
        }
    }

    #[test]
    fn test_mean_grade_rounds_half_up() {
        assert_eq!(resolve_mean_grade(11.0), Grade::AMinus);
        assert_eq!(resolve_mean_grade(10.5), Grade::AMinus);
        assert_eq!(resolve_mean_grade(10.49), Grade::BPlus);
        assert_eq!(resolve_mean_grade(6.5), Grade::CPlus);
    }

    #[test]
    fn test_mean_grade_outside_scale_is_lowest() {
        assert_eq!(resolve_mean_grade(0.0), Grade::E);
        assert_eq!(resolve_mean_grade(0.4), Grade::E);
        assert_eq!(resolve_mean_grade(13.0), Grade::E);
        assert_eq!(resolve_mean_grade(12.4), Grade::A);
    }

    #[test]
    fn test_grade_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Grade::BMinus).unwrap(), "\"B-\"");
        assert_eq!(Grade::DPlus.to_string(), "D+");
    }
}
