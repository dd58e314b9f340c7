use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::analyzers::aggregate::{global_stats, select_students, subject_champions};
use crate::analyzers::dataset::Dataset;
use crate::analyzers::group::class_stats;
use crate::analyzers::ranking::rank_students;
use crate::analyzers::student::enrich;
use crate::analyzers::subject::all_subject_stats;
use crate::analyzers::types::{AnalysisResult, StudentRecord};
use crate::error::AnalysisError;

/// Runs the whole pipeline over a dataset: enrichment, ranking, then the
/// subject, group and school-wide aggregates.
///
/// Every call is an independent run; analyzing a filtered dataset builds a
/// fresh result rather than adjusting an earlier one.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyDataset`] when the dataset has no rows.
#[tracing::instrument(skip(dataset), fields(rows = dataset.rows.len()))]
pub fn analyze(dataset: &Dataset) -> Result<AnalysisResult, AnalysisError> {
    if dataset.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let roles = &dataset.roles;
    let subjects = roles.subject_names();

    let classes: Vec<String> = if roles.has_group() {
        dataset
            .rows
            .iter()
            .filter_map(|row| dataset.group_of(row))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };

    debug!(
        subjects = subjects.len(),
        groups = classes.len(),
        has_group = roles.has_group(),
        has_identifier = roles.identifier.is_some(),
        "Column roles resolved"
    );

    let records = rank_students(enrich(dataset), &classes);

    let subject_stats = all_subject_stats(&records, &subjects);
    let class_stats = class_stats(&records, &classes);
    let global_stats = global_stats(&records, &subject_stats);
    let (top_students, weakest_students) = select_students(&records);
    let subject_champions = subject_champions(&records, &subjects);

    let ranked = records.iter().filter(|r| r.is_ranked()).count();
    info!(
        students = records.len(),
        ranked,
        mean_points = global_stats.mean_points,
        mean_grade = %global_stats.mean_grade,
        "Analysis complete"
    );

    Ok(AnalysisResult {
        columns: dataset.headers.clone(),
        records,
        subjects,
        class_column: roles.group.as_ref().map(|c| c.name.clone()),
        adm_column: roles.identifier.as_ref().map(|c| c.name.clone()),
        name_column: roles.name.as_ref().map(|c| c.name.clone()),
        classes,
        subject_stats,
        class_stats,
        global_stats,
        top_students,
        weakest_students,
        subject_champions,
    })
}

/// Parses delimited text and analyzes it.
pub fn analyze_text(text: &str) -> Result<AnalysisResult, AnalysisError> {
    analyze(&Dataset::parse(text)?)
}

/// Students whose name or admission number contains `term`, ignoring case.
/// An empty term matches everyone.
pub fn search_students<'a>(records: &'a [StudentRecord], term: &str) -> Vec<&'a StudentRecord> {
    let term = term.trim().to_lowercase();
    records
        .iter()
        .filter(|r| {
            term.is_empty()
                || r.name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&term))
                || r.adm_no
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&term))
        })
        .collect()
}
