//! Compact, serializable summary of an analysis, handed to the narrative
//! generator.

use serde::Serialize;

use crate::analyzers::grade::{Grade, QUALITY_GRADE};
use crate::analyzers::types::AnalysisResult;
use crate::analyzers::utility::mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolMean {
    pub grade: Grade,
    pub points: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub name: String,
    pub mean_points: f64,
    pub mean_grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeSummary {
    pub school_mean: SchoolMean,
    pub subjects: Vec<SubjectSummary>,
    pub top_student: Option<String>,
    /// Students whose unrounded average score reaches the quality grade's
    /// minimum score.
    pub university_entry_count: usize,
    pub total_candidates: usize,
}

impl NarrativeSummary {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let global = &analysis.global_stats;
        let quality_min = QUALITY_GRADE.def().min;

        let university_entry_count = analysis
            .records
            .iter()
            .filter(|r| {
                let scores: Vec<f64> = r.scores.iter().filter_map(|s| s.score).collect();
                !scores.is_empty() && mean(&scores) >= quality_min
            })
            .count();

        NarrativeSummary {
            school_mean: SchoolMean {
                grade: global.mean_grade,
                points: global.mean_points,
                score: global.mean_score,
            },
            subjects: analysis
                .subject_stats
                .iter()
                .map(|s| SubjectSummary {
                    name: s.subject.clone(),
                    mean_points: s.mean_points,
                    mean_grade: s.mean_grade,
                })
                .collect(),
            top_student: analysis.top_students.first().map(|s| s.name.clone()),
            university_entry_count,
            total_candidates: global.total_students,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::analyzer::analyze_text;

    #[test]
    fn test_summary_from_analysis() {
        let analysis =
            analyze_text("Name,Math,Eng\nAnn,80,70\nBen,60,50\nCid,55,55\nDan,ABS,\n").unwrap();
        let summary = NarrativeSummary::from_analysis(&analysis);

        assert_eq!(summary.total_candidates, 4);
        assert_eq!(summary.top_student.as_deref(), Some("Ann"));
        // Ann 75.0, Ben 55.0 and Cid 55.0 reach the C+ minimum.
        assert_eq!(summary.university_entry_count, 3);
        assert_eq!(summary.subjects.len(), 2);
        assert_eq!(summary.school_mean.grade, analysis.global_stats.mean_grade);
    }

    #[test]
    fn test_entry_count_uses_unrounded_average() {
        let analysis = analyze_text("Name,Math,Eng\nAnn,55,54.992\nBen,56,54\n").unwrap();
        let ann = analysis.records.iter().find(|r| r.display_name() == "Ann").unwrap();
        assert_eq!(ann.performance.as_ref().unwrap().mean_score, 55.0);

        let summary = NarrativeSummary::from_analysis(&analysis);
        assert_eq!(summary.university_entry_count, 1);
    }

    #[test]
    fn test_summary_serializes_in_camel_case() {
        let analysis = analyze_text("Name,Math\nAnn,80\n").unwrap();
        let json = serde_json::to_value(NarrativeSummary::from_analysis(&analysis)).unwrap();

        assert_eq!(json["schoolMean"]["grade"], "A");
        assert_eq!(json["subjects"][0]["meanPoints"], 12.0);
        assert_eq!(json["topStudent"], "Ann");
        assert_eq!(json["universityEntryCount"], 1);
    }
}
