//! Exam analysis pipeline.
//!
//! Rows are enriched with per-student figures, ranked, and then aggregated
//! per subject, per group (stream) and school-wide. Every stage reads the
//! output of the previous one and never modifies it.

pub mod aggregate;
pub mod analyzer;
pub mod dataset;
pub mod grade;
pub mod group;
pub mod ranking;
pub mod student;
pub mod subject;
pub mod types;
pub mod utility;
