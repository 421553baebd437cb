//! Spreadsheet decoding for bulk employee import.
//!
//! Turns uploaded xlsx bytes into normalized `EmployeeRow`s. The column
//! names are a compatibility contract with the upload template; a missing
//! required column is a structural error that aborts the whole import
//! before any row is processed.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;

/// Required column headers, exactly as they appear in the template.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Employee ID",
    "Employee First Name",
    "Employee Last Name",
    "Email ID",
    "Project Role",
    "Skill Requirement",
];

/// Older templates label the id column differently; both are accepted.
const EMPLOYEE_ID_ALIAS: &str = "Associate Id";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Failed to read Excel file: {0}")]
    Decode(String),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),
}

/// One employee record, trimmed and split, ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub sso_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub project_role: String,
    pub skills: Vec<String>,
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    sso_id: usize,
    first_name: usize,
    last_name: usize,
    email: usize,
    project_role: usize,
    skills: usize,
}

/// Decodes an uploaded workbook into employee rows.
///
/// Reads the first sheet only. Fully empty rows are skipped; everything
/// else is passed through for per-row reconciliation.
pub fn parse_employee_sheet(bytes: &[u8]) -> Result<Vec<EmployeeRow>, SheetError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| SheetError::Decode(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SheetError::Decode("workbook contains no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SheetError::Decode(e.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let columns = resolve_columns(&header)?;

    Ok(rows.filter_map(|r| extract_row(r, &columns)).collect())
}

/// Checks the column contract once, up front. Reports every missing column
/// in a single message rather than failing on the first.
fn resolve_columns(header: &[String]) -> Result<ColumnMap, SheetError> {
    let position = |name: &str| header.iter().position(|h| h == name);

    let sso_id = position("Employee ID").or_else(|| position(EMPLOYEE_ID_ALIAS));
    let first_name = position("Employee First Name");
    let last_name = position("Employee Last Name");
    let email = position("Email ID");
    let project_role = position("Project Role");
    let skills = position("Skill Requirement");

    let found = [sso_id, first_name, last_name, email, project_role, skills];
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .zip(found)
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(SheetError::MissingColumns(missing.join(", ")));
    }

    Ok(ColumnMap {
        sso_id: sso_id.unwrap(),
        first_name: first_name.unwrap(),
        last_name: last_name.unwrap(),
        email: email.unwrap(),
        project_role: project_role.unwrap(),
        skills: skills.unwrap(),
    })
}

fn extract_row(cells: &[Data], columns: &ColumnMap) -> Option<EmployeeRow> {
    let cell = |idx: usize| cells.get(idx).map(cell_to_string).unwrap_or_default();

    let row = EmployeeRow {
        sso_id: cell(columns.sso_id),
        first_name: cell(columns.first_name),
        last_name: cell(columns.last_name),
        email: cell(columns.email),
        project_role: cell(columns.project_role),
        skills: split_skills(&cell(columns.skills)),
    };

    let all_empty = row.sso_id.is_empty()
        && row.first_name.is_empty()
        && row.last_name.is_empty()
        && row.email.is_empty()
        && row.project_role.is_empty()
        && row.skills.is_empty();
    (!all_empty).then_some(row)
}

/// Splits the comma-separated skill-requirement field into an ordered list
/// of trimmed, non-empty labels.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes a cell to its string form. Numeric employee ids come back
/// from the workbook as floats; integral values drop the trailing `.0`.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_columns_happy_path() {
        let map = resolve_columns(&header(&REQUIRED_COLUMNS)).unwrap();
        assert_eq!(map.sso_id, 0);
        assert_eq!(map.skills, 5);
    }

    #[test]
    fn test_resolve_columns_accepts_associate_id_alias() {
        let map = resolve_columns(&header(&[
            "Associate Id",
            "Employee First Name",
            "Employee Last Name",
            "Email ID",
            "Project Role",
            "Skill Requirement",
        ]))
        .unwrap();
        assert_eq!(map.sso_id, 0);
    }

    #[test]
    fn test_resolve_columns_order_independent() {
        let map = resolve_columns(&header(&[
            "Skill Requirement",
            "Project Role",
            "Email ID",
            "Employee Last Name",
            "Employee First Name",
            "Employee ID",
        ]))
        .unwrap();
        assert_eq!(map.sso_id, 5);
        assert_eq!(map.skills, 0);
    }

    #[test]
    fn test_resolve_columns_reports_all_missing() {
        let err = resolve_columns(&header(&["Employee ID", "Email ID"])).unwrap_err();
        match err {
            SheetError::MissingColumns(msg) => {
                assert!(msg.contains("Employee First Name"));
                assert!(msg.contains("Employee Last Name"));
                assert!(msg.contains("Project Role"));
                assert!(msg.contains("Skill Requirement"));
                assert!(!msg.contains("Email ID"));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_employee_id_drops_decimal_point() {
        assert_eq!(cell_to_string(&Data::Float(764321.0)), "764321");
        assert_eq!(cell_to_string(&Data::Int(764321)), "764321");
    }

    #[test]
    fn test_string_cells_are_trimmed() {
        assert_eq!(cell_to_string(&Data::String("  Jane  ".into())), "Jane");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_split_skills_trims_and_drops_empties() {
        assert_eq!(
            split_skills("React, SQL , ,AWS,"),
            vec!["React", "SQL", "AWS"]
        );
        assert!(split_skills("").is_empty());
        assert!(split_skills(" , ,").is_empty());
    }

    #[test]
    fn test_extract_row_skips_fully_empty_rows() {
        let columns = resolve_columns(&header(&REQUIRED_COLUMNS)).unwrap();
        let cells = vec![Data::Empty; 6];
        assert!(extract_row(&cells, &columns).is_none());
    }

    #[test]
    fn test_extract_row_builds_employee() {
        let columns = resolve_columns(&header(&REQUIRED_COLUMNS)).unwrap();
        let cells = vec![
            Data::Float(1001.0),
            Data::String("Jane".into()),
            Data::String("Doe".into()),
            Data::String("jane.doe@example.com".into()),
            Data::String("Frontend Developer".into()),
            Data::String("React, SQL".into()),
        ];
        let row = extract_row(&cells, &columns).unwrap();
        assert_eq!(row.sso_id, "1001");
        assert_eq!(row.project_role, "Frontend Developer");
        assert_eq!(row.skills, vec!["React", "SQL"]);
    }

    #[test]
    fn test_extract_row_tolerates_short_rows() {
        let columns = resolve_columns(&header(&REQUIRED_COLUMNS)).unwrap();
        let cells = vec![Data::String("1002".into())];
        let row = extract_row(&cells, &columns).unwrap();
        assert_eq!(row.sso_id, "1002");
        assert!(row.skills.is_empty());
    }
}
