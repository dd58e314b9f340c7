use crate::analyzers::grade::{PASS_MARK, resolve_mean_grade};
use crate::analyzers::student::compute_performance;
use crate::analyzers::types::{ClassStats, StudentRecord};
use crate::analyzers::utility::{mean, pct, round_to};

/// A student's contribution to a group: average score and mean points.
struct StudentFigures {
    average: f64,
    points: f64,
}

/// Aggregates each group from its students' stored figures.
///
/// Means cover scored students only. The pass rate is taken over every member,
/// so an unscored student counts as not passed.
pub fn class_stats(records: &[StudentRecord], groups: &[String]) -> Vec<ClassStats> {
    groups
        .iter()
        .map(|group| {
            let members = members_of(records, group);
            let figures = members
                .iter()
                .filter_map(|r| r.performance.as_ref())
                .map(|p| StudentFigures {
                    average: p.mean_score,
                    points: p.mean_points,
                })
                .collect();
            summarize(group, members.len(), figures)
        })
        .collect()
}

/// Aggregates each group with every student's figures recomputed from the
/// given subjects only.
pub fn class_stats_for_subjects(
    records: &[StudentRecord],
    groups: &[String],
    subjects: &[String],
) -> Vec<ClassStats> {
    groups
        .iter()
        .map(|group| {
            let members = members_of(records, group);
            let figures = members
                .iter()
                .filter_map(|r| {
                    compute_performance(subjects.iter().filter_map(|s| r.score(s)))
                })
                .map(|p| StudentFigures {
                    average: p.mean_score,
                    points: p.mean_points,
                })
                .collect();
            summarize(group, members.len(), figures)
        })
        .collect()
}

fn members_of<'a>(records: &'a [StudentRecord], group: &str) -> Vec<&'a StudentRecord> {
    records
        .iter()
        .filter(|r| r.group.as_deref() == Some(group))
        .collect()
}

fn summarize(group: &str, student_count: usize, figures: Vec<StudentFigures>) -> ClassStats {
    if figures.is_empty() {
        return ClassStats {
            class_name: group.to_string(),
            mean_score: 0.0,
            mean_points: 0.0,
            mean_grade: None,
            pass_rate: 0.0,
            student_count,
        };
    }

    let averages: Vec<f64> = figures.iter().map(|f| f.average).collect();
    let points: Vec<f64> = figures.iter().map(|f| f.points).collect();
    let passed = figures.iter().filter(|f| f.average >= PASS_MARK).count();
    let mean_points = round_to(mean(&points), 2);

    ClassStats {
        class_name: group.to_string(),
        mean_score: round_to(mean(&averages), 2),
        mean_points,
        mean_grade: Some(resolve_mean_grade(mean_points)),
        pass_rate: round_to(pct(passed, student_count), 1),
        student_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::dataset::Dataset;
    use crate::analyzers::grade::Grade;
    use crate::analyzers::student::enrich;

    const SHEET: &str = "Name,Stream,Math,Eng\n\
                         A,East,80,70\n\
                         B,East,40,44\n\
                         C,West,60,65\n\
                         D,West,ABS,\n";

    fn groups() -> Vec<String> {
        vec!["East".to_string(), "West".to_string(), "North".to_string()]
    }

    #[test]
    fn test_class_stats_reuse_student_figures() {
        let records = enrich(&Dataset::parse(SHEET).unwrap());
        let stats = class_stats(&records, &groups());

        let east = &stats[0];
        assert_eq!(east.student_count, 2);
        // A: 75.0 / 11.0, B: 42.0 / 4.0
        assert_eq!(east.mean_score, 58.5);
        assert_eq!(east.mean_points, 7.5);
        assert_eq!(east.mean_grade, Some(Grade::BMinus));
        assert_eq!(east.pass_rate, 50.0);
    }

    #[test]
    fn test_unscored_student_counts_but_does_not_average() {
        let records = enrich(&Dataset::parse(SHEET).unwrap());
        let west = &class_stats(&records, &groups())[1];

        assert_eq!(west.student_count, 2);
        assert_eq!(west.mean_score, 62.5);
        // D has no score and counts as not passed.
        assert_eq!(west.pass_rate, 50.0);
    }

    #[test]
    fn test_empty_group_is_placeholder() {
        let records = enrich(&Dataset::parse(SHEET).unwrap());
        let north = &class_stats(&records, &groups())[2];

        assert_eq!(north.student_count, 0);
        assert_eq!(north.mean_score, 0.0);
        assert_eq!(north.mean_grade, None);
    }

    #[test]
    fn test_subject_subset_recomputes_figures() {
        let records = enrich(&Dataset::parse(SHEET).unwrap());
        let stats = class_stats_for_subjects(&records, &groups(), &["Math".to_string()]);

        let east = &stats[0];
        assert_eq!(east.mean_score, 60.0);
        // 80 -> 12 points, 40 -> 4 points.
        assert_eq!(east.mean_points, 8.0);
        assert_eq!(east.mean_grade, Some(Grade::BMinus));
    }

    #[test]
    fn test_recompute_over_all_subjects_matches_stored_figures() {
        let records = enrich(&Dataset::parse(SHEET).unwrap());
        let subjects = vec!["Math".to_string(), "Eng".to_string()];

        assert_eq!(
            class_stats(&records, &groups()),
            class_stats_for_subjects(&records, &groups(), &subjects)
        );
    }
}
