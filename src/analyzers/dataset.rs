//! Column-role inference and the dataset handed to the pipeline.
//!
//! Roles are guessed once from the header and the first row, then applied to
//! every row. A column whose type changes further down the sheet is not
//! re-checked; aggregators skip the non-numeric cells they meet.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::parser::{CellValue, Table, parse_records};

/// Headers that look numeric but never hold subject scores.
const RESERVED_METADATA: &[&str] = &[
    "id",
    "admno",
    "adm",
    "admission",
    "phone",
    "mobile",
    "zip",
    "year",
];

const GROUP_SYNONYMS: &[&str] = &["stream", "class", "grade", "form", "section", "yeargroup"];

const IDENTIFIER_SYNONYMS: &[&str] = &["adm", "admno", "admission", "id", "reg", "regno"];

const NAME_SYNONYMS: &[&str] = &[
    "name",
    "names",
    "student",
    "studentname",
    "candidate",
    "pupil",
];

/// A column picked out of the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub index: usize,
    pub name: String,
}

/// Role assignment for the columns of a sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub subjects: Vec<Column>,
    pub group: Option<Column>,
    pub identifier: Option<Column>,
    pub name: Option<Column>,
}

impl ColumnRoles {
    /// Infers column roles from the header and the first data row.
    pub fn infer(headers: &[String], first_row: Option<&[CellValue]>) -> Self {
        let column = |index: usize| Column {
            index,
            name: headers[index].clone(),
        };
        let cell = |index: usize| first_row.and_then(|row| row.get(index));

        let group = headers
            .iter()
            .position(|h| GROUP_SYNONYMS.contains(&alphanumeric(h).as_str()))
            .map(column);

        let identifier = headers
            .iter()
            .position(|h| IDENTIFIER_SYNONYMS.contains(&alphanumeric(h).as_str()))
            .map(column);

        let taken = |index: usize| {
            Some(index) == group.as_ref().map(|c| c.index)
                || Some(index) == identifier.as_ref().map(|c| c.index)
        };

        let name = headers
            .iter()
            .position(|h| NAME_SYNONYMS.contains(&letters(h).as_str()))
            .or_else(|| {
                (0..headers.len())
                    .find(|&i| matches!(cell(i), Some(CellValue::Text(_))) && !taken(i))
            })
            .map(column);

        let subjects = (0..headers.len())
            .filter(|&i| {
                cell(i).is_some_and(CellValue::is_number)
                    && !RESERVED_METADATA.contains(&alphanumeric(&headers[i]).as_str())
                    && !taken(i)
            })
            .map(column)
            .collect();

        ColumnRoles {
            subjects,
            group,
            identifier,
            name,
        }
    }

    pub fn has_group(&self) -> bool {
        self.group.is_some()
    }

    pub fn subject_names(&self) -> Vec<String> {
        self.subjects.iter().map(|c| c.name.clone()).collect()
    }
}

/// Parsed rows together with the column roles inferred for them.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub roles: ColumnRoles,
}

impl Dataset {
    pub fn from_table(table: Table) -> Self {
        let roles = ColumnRoles::infer(&table.headers, table.rows.first().map(Vec::as_slice));
        Dataset {
            headers: table.headers,
            rows: table.rows,
            roles,
        }
    }

    /// Parses delimited text and infers its column roles.
    pub fn parse(text: &str) -> Result<Self, AnalysisError> {
        Ok(Self::from_table(parse_records(text)?))
    }

    /// Group value of a row, as written in the sheet.
    pub fn group_of(&self, row: &[CellValue]) -> Option<String> {
        self.roles
            .group
            .as_ref()
            .and_then(|c| row.get(c.index))
            .map(|cell| cell.as_str().to_string())
    }

    /// A new dataset holding only the rows of `group`, with the same roles.
    pub fn filter_group(&self, group: &str) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| self.group_of(row).as_deref() == Some(group))
            .cloned()
            .collect();

        Dataset {
            headers: self.headers.clone(),
            rows,
            roles: self.roles.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn alphanumeric(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn letters(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[Column]) -> Vec<&str> {
        columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_infers_standard_roles() {
        let dataset =
            Dataset::parse("AdmNo,Name,Stream,Mathematics,English\n1001,Jane,4 East,78,82\n")
                .unwrap();
        let roles = &dataset.roles;

        assert_eq!(names(&roles.subjects), vec!["Mathematics", "English"]);
        assert_eq!(roles.group.as_ref().unwrap().name, "Stream");
        assert_eq!(roles.identifier.as_ref().unwrap().name, "AdmNo");
        assert_eq!(roles.name.as_ref().unwrap().name, "Name");
    }

    #[test]
    fn test_reserved_numeric_columns_are_not_subjects() {
        let dataset =
            Dataset::parse("ID,Phone,Zip,Year,Mobile,Math\n7,0712,00100,2024,0733,55\n").unwrap();
        assert_eq!(names(&dataset.roles.subjects), vec!["Math"]);
    }

    #[test]
    fn test_header_normalization_ignores_case_and_punctuation() {
        let dataset =
            Dataset::parse("Adm. No,Student Name,Year Group,Bio\n12,Ann,Blue,61\n").unwrap();
        let roles = &dataset.roles;

        assert_eq!(roles.identifier.as_ref().unwrap().name, "Adm. No");
        assert_eq!(roles.name.as_ref().unwrap().name, "Student Name");
        assert_eq!(roles.group.as_ref().unwrap().name, "Year Group");
        assert_eq!(names(&roles.subjects), vec!["Bio"]);
    }

    #[test]
    fn test_numeric_group_column_is_not_a_subject() {
        let dataset = Dataset::parse("Name,Form,Math\nAnn,4,61\n").unwrap();
        assert_eq!(dataset.roles.group.as_ref().unwrap().name, "Form");
        assert_eq!(names(&dataset.roles.subjects), vec!["Math"]);
    }

    #[test]
    fn test_name_falls_back_to_first_free_text_column() {
        let dataset = Dataset::parse("Reg,Class,Learner,Math\nR1,North,Ann,61\n").unwrap();
        assert_eq!(dataset.roles.name.as_ref().unwrap().name, "Learner");
    }

    #[test]
    fn test_missing_roles_are_reported_as_none() {
        let dataset = Dataset::parse("Math,English\n50,60\n").unwrap();
        assert!(dataset.roles.group.is_none());
        assert!(dataset.roles.identifier.is_none());
        assert!(dataset.roles.name.is_none());
        assert!(!dataset.roles.has_group());
    }

    #[test]
    fn test_roles_come_from_first_row_only() {
        let dataset = Dataset::parse("Name,Math,Eng\nAnn,ABS,70\nBen,60,65\n").unwrap();
        assert_eq!(names(&dataset.roles.subjects), vec!["Eng"]);
    }

    #[test]
    fn test_filter_group_keeps_roles() {
        let dataset =
            Dataset::parse("Name,Stream,Math\nAnn,East,60\nBen,West,70\nCid,East,80\n").unwrap();
        let east = dataset.filter_group("East");

        assert_eq!(east.rows.len(), 2);
        assert_eq!(east.roles, dataset.roles);
        assert!(dataset.filter_group("South").is_empty());
    }

    #[test]
    fn test_numeric_group_values_match_as_written() {
        let dataset = Dataset::parse("Name,Stream,Math
Ann,01,60
Ben,1,70
Cid,01,80
").unwrap();
        assert_eq!(dataset.group_of(&dataset.rows[0]).as_deref(), Some("01"));
        assert_eq!(dataset.filter_group("01").rows.len(), 2);
        assert_eq!(dataset.filter_group("1").rows.len(), 1);
    }
}
