//! Fixture loader tests against real xlsx files
//!
//! Each test writes the exact workbook it needs into a temp dir with
//! `rust_xlsxwriter`, then loads it back through the public loader.

use std::path::{Path, PathBuf};

use patient_intake_e2e::{load_patients, HarnessError};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn fixture_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// Write rows of string cells starting at row 0. `None` rows are left
/// entirely blank.
fn write_fixture(path: &Path, rows: &[Option<&[&str]>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row_index, row) in rows.iter().enumerate() {
        let Some(cells) = row else { continue };
        for (col_index, cell) in cells.iter().enumerate() {
            worksheet
                .write_string(row_index as u32, col_index as u16, *cell)
                .expect("write cell");
        }
    }
    workbook.save(path).expect("save workbook");
}

#[test]
fn one_record_per_row_in_file_order() {
    let dir = TempDir::new().unwrap();
    let path = fixture_path(&dir, "patients.xlsx");
    write_fixture(
        &path,
        &[
            Some(&["Firstname", "Lastname", "Email"]),
            Some(&["Jane", "Doe", "jane@example.com"]),
            Some(&["John", "Roe", ""]),
        ],
    );

    let records = load_patients(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("Firstname"), "Jane");
    assert_eq!(records[0].get("Email"), "jane@example.com");
    assert_eq!(records[1].get("Lastname"), "Roe");
    assert_eq!(records[1].get("Email"), "");
}

#[test]
fn blank_row_ends_loading_even_with_rows_after_it() {
    let dir = TempDir::new().unwrap();
    let path = fixture_path(&dir, "sparse.xlsx");
    // valid rows 2-4, blank row 5, more valid rows 6-8: only the prefix loads
    write_fixture(
        &path,
        &[
            Some(&["Firstname", "Lastname"]),
            Some(&["Jane", "Doe"]),
            Some(&["John", "Roe"]),
            Some(&["Ann", "Poe"]),
            None,
            Some(&["Never", "Loaded"]),
            Some(&["Also", "Ignored"]),
            Some(&["Still", "Ignored"]),
        ],
    );

    let records = load_patients(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].get("Firstname"), "Ann");
}

#[test]
fn headers_with_spaces_map_to_despaced_field_names() {
    let dir = TempDir::new().unwrap();
    let path = fixture_path(&dir, "headers.xlsx");
    write_fixture(
        &path,
        &[
            Some(&[" First name ", "Last name", "Mobile Number"]),
            Some(&["Jane", "Doe", "5551234"]),
        ],
    );

    let records = load_patients(&path).unwrap();
    assert_eq!(records[0].get("Firstname"), "Jane");
    assert_eq!(records[0].get("Lastname"), "Doe");
    assert_eq!(records[0].get("MobileNumber"), "5551234");
}

#[test]
fn numeric_height_loads_as_integer_string() {
    let dir = TempDir::new().unwrap();
    let path = fixture_path(&dir, "height.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Firstname").unwrap();
    worksheet.write_string(0, 1, "Lastname").unwrap();
    worksheet.write_string(0, 2, "Height").unwrap();
    worksheet.write_string(1, 0, "Jane").unwrap();
    worksheet.write_string(1, 1, "Doe").unwrap();
    worksheet.write_number(1, 2, 170.0).unwrap();
    workbook.save(&path).unwrap();

    let records = load_patients(&path).unwrap();
    assert_eq!(records[0].get("Height"), "170");
}

#[test]
fn record_missing_names_still_loads_but_fails_required_check() {
    let dir = TempDir::new().unwrap();
    let path = fixture_path(&dir, "unnamed.xlsx");
    write_fixture(
        &path,
        &[
            Some(&["Firstname", "Lastname"]),
            Some(&["", "Doe"]),
            Some(&["Jane", "Doe"]),
        ],
    );

    let records = load_patients(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert!(!records[0].has_required_names());
    assert!(records[1].has_required_names());
}

#[test]
fn value_outside_named_columns_is_a_fixture_error() {
    let dir = TempDir::new().unwrap();
    let path = fixture_path(&dir, "stray.xlsx");
    write_fixture(
        &path,
        &[
            Some(&["Firstname", "Lastname"]),
            Some(&["Jane", "Doe", "stray"]),
        ],
    );

    let err = load_patients(&path).unwrap_err();
    assert!(matches!(err, HarnessError::Fixture(_)), "{err}");
}

#[test]
fn missing_file_is_the_skip_variant_not_a_failure() {
    let dir = TempDir::new().unwrap();
    let path = fixture_path(&dir, "does-not-exist.xlsx");

    let err = load_patients(&path).unwrap_err();
    assert!(matches!(err, HarnessError::FixtureMissing(_)), "{err}");
    assert!(!err.is_fatal_config());
}
