use crate::analyzers::grade::resolve_mean_grade;
use crate::analyzers::ranking::by_merit;
use crate::analyzers::types::{
    GlobalStats, Performance, StudentRecord, StudentSummary, SubjectChampion, SubjectStats,
};
use crate::analyzers::utility::{mean, round_to};

/// Length of the top and weakest student lists.
pub const SELECTION_SIZE: usize = 5;

/// Computes the school-wide summary.
///
/// Mean score averages the means of subjects that have scores, while mean
/// points averages the mean points of ranked students.
pub fn global_stats(records: &[StudentRecord], subject_stats: &[SubjectStats]) -> GlobalStats {
    let scored: Vec<&SubjectStats> = subject_stats.iter().filter(|s| s.count > 0).collect();

    let subject_means: Vec<f64> = scored.iter().map(|s| s.mean).collect();
    let student_points: Vec<f64> = records
        .iter()
        .filter_map(|r| r.performance.as_ref().map(|p| p.mean_points))
        .collect();
    let mean_points = round_to(mean(&student_points), 2);

    let mut by_points = scored;
    by_points.sort_by(|a, b| b.mean_points.total_cmp(&a.mean_points));

    GlobalStats {
        total_students: records.len(),
        mean_score: round_to(mean(&subject_means), 2),
        mean_points,
        mean_grade: resolve_mean_grade(mean_points),
        top_performing_subject: by_points.first().map(|s| s.subject.clone()),
        lowest_performing_subject: by_points.last().map(|s| s.subject.clone()),
    }
}

/// Returns the top and weakest ranked students, best first and weakest first
/// respectively.
pub fn select_students(records: &[StudentRecord]) -> (Vec<StudentSummary>, Vec<StudentSummary>) {
    let mut ranked: Vec<(&StudentRecord, &Performance)> = records
        .iter()
        .filter_map(|r| r.performance.as_ref().map(|p| (r, p)))
        .collect();
    ranked.sort_by(|a, b| by_merit(a.1, b.1));

    let top = ranked
        .iter()
        .take(SELECTION_SIZE)
        .map(|&(r, p)| summary(r, p))
        .collect();

    let weakest = ranked
        .iter()
        .rev()
        .take(SELECTION_SIZE)
        .map(|&(r, p)| summary(r, p))
        .collect();

    (top, weakest)
}

fn summary(record: &StudentRecord, performance: &Performance) -> StudentSummary {
    StudentSummary {
        name: record.display_name().to_string(),
        adm_no: record.display_adm_no().to_string(),
        average: performance.mean_score,
        mean_points: performance.mean_points,
        mean_grade: resolve_mean_grade(performance.mean_points),
    }
}

/// Finds the top scorer of each subject.
///
/// Students are visited in sheet order and only a strictly greater score
/// replaces the current champion, so the first of several equal scores wins.
/// Subjects nobody has a numeric score in have no champion.
pub fn subject_champions(records: &[StudentRecord], subjects: &[String]) -> Vec<SubjectChampion> {
    let mut in_sheet_order: Vec<&StudentRecord> = records.iter().collect();
    in_sheet_order.sort_by_key(|r| r.row);

    subjects
        .iter()
        .filter_map(|subject| {
            let mut best: Option<(&StudentRecord, f64)> = None;
            for &record in &in_sheet_order {
                if let Some(score) = record.score(subject) {
                    if best.is_none_or(|(_, top)| score > top) {
                        best = Some((record, score));
                    }
                }
            }

            best.map(|(record, score)| SubjectChampion {
                subject: subject.clone(),
                name: record.display_name().to_string(),
                adm_no: record.display_adm_no().to_string(),
                score,
            })
        })
        .collect()
}
