//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, a JSON report envelope, and a ranked-student CSV
//! export.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::AnalysisResult;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;

/// Bumped whenever the serialized shape of [`ReportEnvelope`] changes.
pub const SCHEMA_VERSION: u8 = 1;

/// A serialized analysis together with where and when it was produced.
#[derive(Serialize)]
pub struct ReportEnvelope<'a, T: Serialize> {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub source: &'a str,
    pub body: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    pub fn new(source: &'a str, body: &'a T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            source,
            body,
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    debug!(path, "Writing JSON");
    let mut file = File::create(path)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Writes every student as a CSV row, in rank order.
///
/// The source columns come first, unchanged, followed by the derived rank and
/// mean columns. Unscored students have those derived cells left empty.
pub fn write_students_csv<W: Write>(writer: W, analysis: &AnalysisResult) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    let mut header: Vec<&str> = analysis.columns.iter().map(String::as_str).collect();
    header.extend(["OverallRank", "StreamRank", "MeanScore", "MeanPoints", "MeanGrade"]);
    writer.write_record(&header)?;

    for record in &analysis.records {
        let mut row: Vec<String> = record.cells.iter().map(ToString::to_string).collect();
        row.push(opt(record.overall_rank));
        row.push(opt(record.stream_rank));
        match &record.performance {
            Some(p) => {
                row.push(format!("{:.2}", p.mean_score));
                row.push(format!("{:.2}", p.mean_points));
                row.push(p.mean_grade.to_string());
            }
            None => row.extend([String::new(), String::new(), String::new()]),
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the ranked-student CSV to `path`, replacing any existing file.
pub fn export_students(path: &str, analysis: &AnalysisResult) -> Result<()> {
    debug!(path, students = analysis.records.len(), "Exporting students");
    write_students_csv(File::create(path)?, analysis)
}

fn opt(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
