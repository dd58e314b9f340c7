//! Delimited-text parser for exam score sheets.

use std::fmt;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::AnalysisError;

/// A single cell, typed once at parse time.
///
/// Numbers keep the trimmed text they were read from, so identifiers such as
/// `007` survive display and export unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number { value: f64, raw: String },
    Text(String),
}

impl CellValue {
    /// Types a raw field. A field is numeric when it parses as a finite
    /// number; anything else, including an empty field, stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Number {
                value,
                raw: trimmed.to_string(),
            },
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number { value, .. } => Some(*value),
            CellValue::Text(_) => None,
        }
    }

    /// The cell as written in the sheet, after trimming.
    pub fn as_str(&self) -> &str {
        match self {
            CellValue::Number { raw, .. } => raw,
            CellValue::Text(s) => s,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed sheet: header names and the rows aligned with them.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Parses comma-separated text whose first line is the header.
///
/// Lines whose field count differs from the header's are dropped without
/// error.
///
/// # Errors
///
/// Returns an error if the header line cannot be read or is blank.
pub fn parse_records(text: &str) -> Result<Table, AnalysisError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(AnalysisError::MissingHeader);
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "Dropping unreadable line");
                dropped += 1;
                continue;
            }
        };

        if record.len() != headers.len() {
            debug!(
                line = line_of(&record),
                fields = record.len(),
                expected = headers.len(),
                "Dropping line with mismatched field count"
            );
            dropped += 1;
            continue;
        }

        rows.push(record.iter().map(CellValue::parse).collect());
    }

    debug!(rows = rows.len(), dropped, columns = headers.len(), "Sheet parsed");
    Ok(Table { headers, rows })
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_types_cells() {
        let table = parse_records("AdmNo,Name,Math\n1001, James Kamau ,78.5\n").unwrap();
        assert_eq!(table.headers, vec!["AdmNo", "Name", "Math"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0].as_number(), Some(1001.0));
        assert_eq!(table.rows[0][1], CellValue::Text("James Kamau".to_string()));
        assert_eq!(table.rows[0][2].as_number(), Some(78.5));
    }

    #[test]
    fn test_mismatched_lines_are_dropped() {
        let text = "Name,Math,Eng\nA,80,70\nB,60\nC,50,40,30\nD,55,65\n";
        let table = parse_records(text).unwrap();
        let names: Vec<String> = table.rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["A", "D"]);
    }

    #[test]
    fn test_empty_cell_is_absent_not_zero() {
        let table = parse_records("Name,Math\nA,\n").unwrap();
        assert_eq!(table.rows[0][1], CellValue::Text(String::new()));
        assert!(table.rows[0][1].is_empty());
        assert_eq!(table.rows[0][1].as_number(), None);
    }

    #[test]
    fn test_non_finite_values_stay_text() {
        assert_eq!(CellValue::parse("NaN"), CellValue::Text("NaN".to_string()));
        assert_eq!(CellValue::parse("inf"), CellValue::Text("inf".to_string()));
        assert_eq!(CellValue::parse("ABS"), CellValue::Text("ABS".to_string()));
        assert_eq!(
            CellValue::parse(" 42 "),
            CellValue::Number {
                value: 42.0,
                raw: "42".to_string()
            }
        );
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let table = parse_records("Name,Math\n\"Kamau, James\",78\n").unwrap();
        assert_eq!(table.rows[0][0].to_string(), "Kamau, James");
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert!(matches!(parse_records(""), Err(AnalysisError::MissingHeader)));
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let table = parse_records("Name,Math\n").unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_number_displays_as_written() {
        assert_eq!(CellValue::parse("007").to_string(), "007");
        assert_eq!(CellValue::parse("007").as_number(), Some(7.0));
        assert_eq!(CellValue::parse(" 75.50 ").to_string(), "75.50");
        assert_eq!(
            CellValue::parse("12345678901234567891").as_str(),
            "12345678901234567891"
        );
    }
}
