//! Workbook loading against the .xlsx fixture, which mirrors background_table.csv
//! on its "Spell Distribution" sheet behind a leading "Notes" sheet.

use std::path::{Path, PathBuf};

use spellclass::config::RunConfig;
use spellclass::data::table::{is_marked, load_background_table, DEFAULT_SHEET_NAME};
use spellclass::error::{LoadError, RunError};
use spellclass::pipeline::{load_lookups, run_annotation, AnnotateRequest};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_config() -> RunConfig {
    RunConfig::load(&fixture_path("config.yaml")).expect("fixture config should load")
}

#[test]
fn workbook_reads_named_sheet_with_header_row() {
    let table = load_background_table(&fixture_path("background_table.xlsx"), DEFAULT_SHEET_NAME)
        .expect("workbook should load");

    assert_eq!(
        table.headers,
        vec!["Background", "Warrior", "Ranger", "TacticsSubclass", "Beast Master", "Notes", "Tier"]
    );
    assert_eq!(table.rows.len(), 7);
    assert_eq!(table.rows[0].background(), "Strength");
    assert!(is_marked(table.rows[0].cell(1)));
    assert_eq!(table.rows[0].cell(2), "");
    // Whole numbers stored as floats render without a fraction.
    assert_eq!(table.rows[0].cell(6), "1");
    assert_eq!(table.rows[6].cell(6), "4");
}

#[test]
fn sheet_name_is_matched_after_trimming() {
    let table = load_background_table(
        &fixture_path("background_table.xlsx"),
        "  Spell Distribution ",
    )
    .expect("trimmed sheet name should match");
    assert_eq!(table.rows.len(), 7);
}

#[test]
fn sheet_name_is_case_sensitive() {
    let err = load_background_table(&fixture_path("background_table.xlsx"), "spell distribution")
        .expect_err("case differs");
    assert!(matches!(err, LoadError::MissingSheet { .. }));
}

#[test]
fn unknown_sheet_is_a_missing_sheet_error() {
    let err = load_background_table(&fixture_path("background_table.xlsx"), "Distribution")
        .expect_err("no such sheet");
    match err {
        LoadError::MissingSheet { sheet, .. } => assert_eq!(sheet, "Distribution"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn workbook_and_csv_build_the_same_lookups() {
    let config = fixture_config();
    let (_, from_csv) = load_lookups(&config, &fixture_path("background_table.csv"), None)
        .expect("csv lookups");
    let (_, from_xlsx) = load_lookups(&config, &fixture_path("background_table.xlsx"), None)
        .expect("xlsx lookups");
    assert_eq!(from_xlsx, from_csv);
}

#[test]
fn workbook_and_csv_annotate_identically() {
    let config = fixture_config();
    let run = |table: &str| {
        let request = AnnotateRequest {
            spells_path: fixture_path("spells.json"),
            table_path: fixture_path(table),
            output_path: None,
            sheet_name: None,
        };
        let mut out = Vec::new();
        let report = run_annotation(&config, &request, &mut out).expect("run");
        (out, report)
    };

    let (csv_out, csv_report) = run("background_table.csv");
    let (xlsx_out, xlsx_report) = run("background_table.xlsx");
    assert_eq!(xlsx_out, csv_out);
    assert_eq!(xlsx_report, csv_report);
    assert_eq!(xlsx_report.annotated, 5);
}

#[test]
fn sheet_override_reaches_the_loader() {
    let request = AnnotateRequest {
        spells_path: fixture_path("spells.json"),
        table_path: fixture_path("background_table.xlsx"),
        output_path: None,
        sheet_name: Some("Notes".to_string()),
    };
    let mut out = Vec::new();
    let report = run_annotation(&fixture_config(), &request, &mut out).expect("notes sheet loads");
    // The notes sheet has no class columns, so every valid spell gets empty lists.
    assert_eq!(report.failures.len(), 1);

    let request = AnnotateRequest {
        sheet_name: Some("Missing".to_string()),
        ..request
    };
    let err = run_annotation(&fixture_config(), &request, &mut Vec::new()).expect_err("missing");
    assert!(matches!(err, RunError::Load(LoadError::MissingSheet { .. })));
}
