use crate::analyzers::grade::{Grade, PASS_MARK, resolve_grade, resolve_mean_grade};
use crate::analyzers::types::{
    StudentRecord, SubjectGroupCell, SubjectGroupRow, SubjectStats, empty_grade_counts,
};
use crate::analyzers::utility::{mean, median, mode, pct, round_to, stddev};

/// Aggregates one subject over every student with a numeric score in it.
///
/// A subject without any numeric score yields an all-zero record graded E.
pub fn subject_stats(records: &[StudentRecord], subject: &str) -> SubjectStats {
    let scores: Vec<f64> = records.iter().filter_map(|r| r.score(subject)).collect();
    let mut grade_distribution = empty_grade_counts();

    if scores.is_empty() {
        return SubjectStats {
            subject: subject.to_string(),
            mean: 0.0,
            mean_points: 0.0,
            mean_grade: Grade::E,
            median: 0.0,
            mode: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            pass_rate: 0.0,
            count: 0,
            grade_distribution,
        };
    }

    let avg = round_to(mean(&scores), 2);
    let mut total_points = 0.0;
    for &score in &scores {
        let def = resolve_grade(score);
        total_points += f64::from(def.points);
        *grade_distribution.entry(def.grade).or_insert(0) += 1;
    }
    let mean_points = round_to(total_points / scores.len() as f64, 2);
    let passed = scores.iter().filter(|&&s| s >= PASS_MARK).count();

    SubjectStats {
        subject: subject.to_string(),
        mean: avg,
        mean_points,
        mean_grade: resolve_mean_grade(mean_points),
        median: median(&scores),
        mode: mode(&scores),
        std_dev: round_to(stddev(&scores, avg), 2),
        min: scores.iter().copied().fold(f64::INFINITY, f64::min),
        max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        pass_rate: round_to(pct(passed, scores.len()), 1),
        count: scores.len(),
        grade_distribution,
    }
}

pub fn all_subject_stats(records: &[StudentRecord], subjects: &[String]) -> Vec<SubjectStats> {
    subjects
        .iter()
        .map(|subject| subject_stats(records, subject))
        .collect()
}

/// Breaks every subject down by group: mean score, mean points and mean grade
/// of the group's numeric scores in that subject.
pub fn subject_group_matrix(
    records: &[StudentRecord],
    subjects: &[String],
    groups: &[String],
) -> Vec<SubjectGroupRow> {
    subjects
        .iter()
        .map(|subject| SubjectGroupRow {
            subject: subject.clone(),
            groups: groups
                .iter()
                .map(|group| {
                    let scores: Vec<f64> = records
                        .iter()
                        .filter(|r| r.group.as_deref() == Some(group.as_str()))
                        .filter_map(|r| r.score(subject))
                        .collect();
                    group_cell(group, &scores)
                })
                .collect(),
        })
        .collect()
}

fn group_cell(group: &str, scores: &[f64]) -> SubjectGroupCell {
    if scores.is_empty() {
        return SubjectGroupCell {
            group: group.to_string(),
            mean: 0.0,
            mean_points: 0.0,
            mean_grade: None,
        };
    }

    let points: Vec<f64> = scores
        .iter()
        .map(|&s| f64::from(resolve_grade(s).points))
        .collect();
    let mean_points = round_to(mean(&points), 2);

    SubjectGroupCell {
        group: group.to_string(),
        mean: round_to(mean(scores), 2),
        mean_points,
        mean_grade: Some(resolve_mean_grade(mean_points)),
    }
}
