//! Error type for the analysis pipeline.
//!
//! Per-row and per-cell anomalies never surface here; they are dropped or
//! skipped where they occur. Only a sheet that cannot be analyzed at all
//! produces an [`AnalysisError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unable to analyze this input: {0}")]
    Unreadable(#[from] csv::Error),

    #[error("unable to analyze this input: missing header line")]
    MissingHeader,

    #[error("unable to analyze this input: no student records")]
    EmptyDataset,
}
