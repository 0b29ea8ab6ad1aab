//! Fixture loader: spreadsheet rows into patient records
//!
//! The first sheet of the workbook is the fixture. Row 1 is the header
//! (trimmed, internal spaces removed), every following row is one patient.
//! Loading stops at the first fully blank row, so only a prefix of the sheet
//! is ever used; rows after a blank separator are deliberately ignored.

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::{debug, info};

use crate::error::{HarnessError, Result};

/// One spreadsheet row, keyed by normalized header name.
///
/// Created once at collection time and read-only afterwards. Absent fields
/// read as the empty string so that blank values overwrite stale form state
/// instead of skipping the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    fields: BTreeMap<String, String>,
}

impl PatientRecord {
    /// Value for a field, or `""` when the column is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Records without both names never reach the browser; their case is
    /// skipped instead of failed.
    pub fn has_required_names(&self) -> bool {
        !self.get("Firstname").trim().is_empty() && !self.get("Lastname").trim().is_empty()
    }

    /// Display name used in case labels and logs.
    pub fn display_name(&self) -> String {
        let first = self.get("Firstname").trim();
        let last = self.get("Lastname").trim();
        match (first.is_empty(), last.is_empty()) {
            (true, true) => "<unnamed>".to_string(),
            _ => format!("{first} {last}").trim().to_string(),
        }
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Load all patient records from the first sheet of an xlsx workbook.
///
/// A missing file is reported as [`HarnessError::FixtureMissing`] so the
/// runner can skip the whole run instead of failing it; that situation is an
/// environment problem, not a test result.
pub fn load_patients(path: &Path) -> Result<Vec<PatientRecord>> {
    if !path.exists() {
        return Err(HarnessError::FixtureMissing(path.display().to_string()));
    }

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| HarnessError::Fixture(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| HarnessError::Fixture("workbook has no sheets".to_string()))?
        .map_err(|e| HarnessError::Fixture(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| HarnessError::Fixture("fixture sheet is empty".to_string()))?;
    let headers = normalize_headers(header_row);
    debug!(?headers, "fixture headers");

    let records = parse_rows(&headers, rows)?;
    info!(
        count = records.len(),
        fixture = %path.display(),
        "loaded patient records"
    );
    Ok(records)
}

/// Header cells trimmed with internal spaces removed, e.g. `"First name "`
/// becomes `"Firstname"`. Trailing unnamed columns are dropped.
fn normalize_headers(row: &[Data]) -> Vec<String> {
    let mut headers: Vec<String> = row
        .iter()
        .map(|cell| cell_to_string(cell).trim().replace(' ', ""))
        .collect();
    while headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }
    headers
}

/// Zip data rows against the header, stopping at the first blank row.
///
/// A value in a column the header does not name is an error rather than a
/// silent drop or an out-of-range panic.
fn parse_rows<'a>(
    headers: &[String],
    rows: impl Iterator<Item = &'a [Data]>,
) -> Result<Vec<PatientRecord>> {
    let mut records = Vec::new();
    for (offset, row) in rows.enumerate() {
        if row_is_blank(row) {
            break;
        }
        // spreadsheet row number: header is row 1, data starts at row 2
        let row_number = offset + 2;
        if let Some(extra) = row.get(headers.len()..) {
            if !row_is_blank(extra) {
                return Err(HarnessError::Fixture(format!(
                    "row {row_number} has a value beyond the {} named columns",
                    headers.len()
                )));
            }
        }
        let mut fields = BTreeMap::new();
        for (header, cell) in headers.iter().zip(row) {
            fields.insert(header.clone(), cell_to_string(cell));
        }
        records.push(PatientRecord { fields });
    }
    Ok(records)
}

fn row_is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Stringify a cell the way the form expects it: whole floats lose their
/// fractional part (a Height of `170` must fill as `"170"`, not `"170.0"`).
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn rows<'a>(data: &'a [Vec<Data>]) -> impl Iterator<Item = &'a [Data]> {
        data.iter().map(Vec::as_slice)
    }

    #[test]
    fn headers_are_trimmed_and_despaced() {
        let header = vec![s(" First name "), s("Lastname"), s("Mobile Number")];
        assert_eq!(
            normalize_headers(&header),
            vec!["Firstname", "Lastname", "MobileNumber"]
        );
    }

    #[test]
    fn trailing_unnamed_header_columns_are_dropped() {
        let header = vec![s("Firstname"), s("Lastname"), Data::Empty, s("  ")];
        assert_eq!(normalize_headers(&header), vec!["Firstname", "Lastname"]);
    }

    #[test]
    fn one_record_per_row_in_order() {
        let headers = normalize_headers(&[s("Firstname"), s("Lastname")]);
        let data = vec![
            vec![s("Jane"), s("Doe")],
            vec![s("John"), s("Roe")],
        ];
        let records = parse_rows(&headers, rows(&data)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Firstname"), "Jane");
        assert_eq!(records[1].get("Lastname"), "Roe");
    }

    #[test]
    fn loading_stops_at_first_blank_row() {
        let headers = normalize_headers(&[s("Firstname"), s("Lastname")]);
        let data = vec![
            vec![s("Jane"), s("Doe")],
            vec![s("John"), s("Roe")],
            vec![s("Ann"), s("Poe")],
            vec![Data::Empty, s("   ")],
            vec![s("Never"), s("Loaded")],
            vec![s("Also"), s("Ignored")],
        ];
        let records = parse_rows(&headers, rows(&data)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].get("Firstname"), "Ann");
    }

    #[test]
    fn value_beyond_named_columns_is_an_error() {
        let headers = normalize_headers(&[s("Firstname"), s("Lastname")]);
        let data = vec![vec![s("Jane"), s("Doe"), s("stray")]];
        let err = parse_rows(&headers, rows(&data)).unwrap_err();
        assert!(matches!(err, HarnessError::Fixture(_)), "{err}");
    }

    #[test]
    fn empty_cells_beyond_named_columns_are_tolerated() {
        let headers = normalize_headers(&[s("Firstname"), s("Lastname")]);
        let data = vec![vec![s("Jane"), s("Doe"), Data::Empty]];
        let records = parse_rows(&headers, rows(&data)).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn numeric_cells_fill_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(170.0)), "170");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn absent_field_reads_as_empty_string() {
        let record = PatientRecord::from_pairs(&[("Firstname", "Jane"), ("Lastname", "Doe")]);
        assert_eq!(record.get("Email"), "");
        assert!(record.has_required_names());
    }

    #[test]
    fn record_without_firstname_fails_required_check() {
        let record = PatientRecord::from_pairs(&[("Firstname", "  "), ("Lastname", "Doe")]);
        assert!(!record.has_required_names());
        assert_eq!(record.display_name(), "Doe");
    }
}
