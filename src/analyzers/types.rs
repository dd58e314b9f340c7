//! Data types produced by the analysis pipeline.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::grade::{GRADING_SYSTEM, Grade};
use crate::parser::CellValue;

/// Count of scores per grade, best grade first.
pub type GradeCounts = BTreeMap<Grade, u32>;

/// A tally with all twelve grades present at zero.
pub fn empty_grade_counts() -> GradeCounts {
    GRADING_SYSTEM.iter().map(|g| (g.grade, 0)).collect()
}

/// One subject cell of a student: the score when the cell was numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectScore {
    pub subject: String,
    pub score: Option<f64>,
}

/// Derived figures over a student's numeric subject scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub mean_score: f64,
    pub mean_points: f64,
    pub mean_grade: Grade,
    pub grade_counts: GradeCounts,
}

/// A student row with typed metadata and derived figures.
///
/// `performance` is `None` when the row has no numeric subject score; such a
/// student is listed but never ranked or aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Zero-based position of the row in the source sheet.
    pub row: usize,
    pub adm_no: Option<String>,
    pub name: Option<String>,
    pub group: Option<String>,
    pub scores: Vec<SubjectScore>,
    #[serde(skip)]
    pub cells: Vec<CellValue>,
    #[serde(flatten)]
    pub performance: Option<Performance>,
    pub overall_rank: Option<u32>,
    pub stream_rank: Option<u32>,
}

impl StudentRecord {
    /// Numeric score in `subject`, if any.
    pub fn score(&self, subject: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.subject == subject)
            .and_then(|s| s.score)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    pub fn display_adm_no(&self) -> &str {
        self.adm_no.as_deref().unwrap_or("-")
    }

    pub fn is_ranked(&self) -> bool {
        self.performance.is_some()
    }
}

/// Statistics for one subject column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject: String,
    pub mean: f64,
    pub mean_points: f64,
    pub mean_grade: Grade,
    pub median: f64,
    pub mode: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub pass_rate: f64,
    pub count: usize,
    pub grade_distribution: GradeCounts,
}

/// Statistics for one group (stream).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub class_name: String,
    pub mean_score: f64,
    pub mean_points: f64,
    /// `None` when the group has no scored student.
    pub mean_grade: Option<Grade>,
    pub pass_rate: f64,
    pub student_count: usize,
}

/// School-wide summary.
///
/// `mean_score` averages subject means while `mean_points` averages student
/// mean points; the two need not agree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_students: usize,
    pub mean_score: f64,
    pub mean_points: f64,
    pub mean_grade: Grade,
    pub top_performing_subject: Option<String>,
    pub lowest_performing_subject: Option<String>,
}

/// Entry of the top and weakest student lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub name: String,
    pub adm_no: String,
    pub average: f64,
    pub mean_points: f64,
    pub mean_grade: Grade,
}

/// Highest scorer in one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectChampion {
    pub subject: String,
    pub name: String,
    pub adm_no: String,
    pub score: f64,
}

/// One subject's figures inside one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGroupCell {
    pub group: String,
    pub mean: f64,
    pub mean_points: f64,
    pub mean_grade: Option<Grade>,
}

/// One subject broken down by group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGroupRow {
    pub subject: String,
    pub groups: Vec<SubjectGroupCell>,
}

/// Complete analysis of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// All source columns, in sheet order.
    pub columns: Vec<String>,
    /// Students in rank order; unranked students trail in sheet order.
    pub records: Vec<StudentRecord>,
    pub subjects: Vec<String>,
    pub class_column: Option<String>,
    pub adm_column: Option<String>,
    pub name_column: Option<String>,
    pub classes: Vec<String>,
    pub subject_stats: Vec<SubjectStats>,
    pub class_stats: Vec<ClassStats>,
    pub global_stats: GlobalStats,
    pub top_students: Vec<StudentSummary>,
    pub weakest_students: Vec<StudentSummary>,
    pub subject_champions: Vec<SubjectChampion>,
}
