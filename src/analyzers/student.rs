use crate::analyzers::dataset::Dataset;
use crate::analyzers::grade::{resolve_grade, resolve_mean_grade};
use crate::analyzers::types::{Performance, StudentRecord, SubjectScore, empty_grade_counts};
use crate::analyzers::utility::round_to;
use crate::parser::CellValue;

/// Computes mean score, mean points, mean grade and the grade tally over a
/// student's numeric scores.
///
/// Returns `None` when there is no score to average.
pub fn compute_performance(scores: impl IntoIterator<Item = f64>) -> Option<Performance> {
    let mut total_score = 0.0;
    let mut total_points = 0.0;
    let mut count = 0usize;
    let mut grade_counts = empty_grade_counts();

    for score in scores {
        let def = resolve_grade(score);
        total_score += score;
        total_points += f64::from(def.points);
        *grade_counts.entry(def.grade).or_insert(0) += 1;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let mean_score = round_to(total_score / count as f64, 2);
    let mean_points = round_to(total_points / count as f64, 2);

    Some(Performance {
        mean_score,
        mean_points,
        mean_grade: resolve_mean_grade(mean_points),
        grade_counts,
    })
}

/// Builds one enriched [`StudentRecord`] per dataset row, in sheet order.
///
/// Ranks are left empty; see [`crate::analyzers::ranking::rank_students`].
pub fn enrich(dataset: &Dataset) -> Vec<StudentRecord> {
    let roles = &dataset.roles;
    let text_of = |row: &[CellValue], index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.as_str().to_string())
    };

    dataset
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let scores: Vec<SubjectScore> = roles
                .subjects
                .iter()
                .map(|column| SubjectScore {
                    subject: column.name.clone(),
                    score: row.get(column.index).and_then(|c| c.as_number()),
                })
                .collect();

            let performance = compute_performance(scores.iter().filter_map(|s| s.score));

            StudentRecord {
                row: row_index,
                adm_no: text_of(row, roles.identifier.as_ref().map(|c| c.index)),
                name: text_of(row, roles.name.as_ref().map(|c| c.index)),
                group: dataset.group_of(row),
                scores,
                cells: row.clone(),
                performance,
                overall_rank: None,
                stream_rank: None,
            }
        })
        .collect()
}
