//! One annotation run: table → lookups → spells → annotate → output.
//! The table is loaded before the spell file is read, so a bad table aborts the
//! run without touching the spells.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::data::spells::{load_spell_document, to_pretty_json, write_spell_document};
use crate::data::table::{load_background_table, BackgroundTable};
use crate::error::RunError;
use crate::mapping::{annotate_spells, build_lookups, AnnotationReport, BackgroundLookups};

#[derive(Debug, Clone)]
pub struct AnnotateRequest {
    pub spells_path: PathBuf,
    pub table_path: PathBuf,
    /// Written here when set; otherwise the document goes to the output stream.
    pub output_path: Option<PathBuf>,
    /// Overrides `RunConfig::sheet_name`.
    pub sheet_name: Option<String>,
}

/// Read the table only. `--sheet` overrides the configured sheet name.
pub fn load_table(
    config: &RunConfig,
    table_path: &Path,
    sheet_name: Option<&str>,
) -> Result<BackgroundTable, RunError> {
    let sheet = sheet_name.unwrap_or(&config.sheet_name);
    Ok(load_background_table(table_path, sheet)?)
}

pub fn load_lookups(
    config: &RunConfig,
    table_path: &Path,
    sheet_name: Option<&str>,
) -> Result<(BackgroundTable, BackgroundLookups), RunError> {
    let table = load_table(config, table_path, sheet_name)?;
    let lookups = build_lookups(&table, &config.classes)?;
    Ok((table, lookups))
}

pub fn run_annotation<W: Write>(
    config: &RunConfig,
    request: &AnnotateRequest,
    out: &mut W,
) -> Result<AnnotationReport, RunError> {
    let (_, lookups) = load_lookups(config, &request.table_path, request.sheet_name.as_deref())?;
    let mut document = load_spell_document(&request.spells_path)?;

    tracing::debug!(
        valid_backgrounds = config.valid_backgrounds.len(),
        locations = config.locations.len(),
        "annotating spells"
    );
    let valid = config.valid_background_set();
    let report = annotate_spells(document.spells_mut(), &lookups, &valid);

    match &request.output_path {
        Some(path) => {
            write_spell_document(&document, path)?;
            tracing::info!(path = %path.display(), "updated JSON saved");
        }
        None => {
            let payload = to_pretty_json(&document.into_value())?;
            writeln!(out, "{payload}").map_err(|source| RunError::Write {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
        }
    }

    tracing::info!(
        total = report.total_spells,
        annotated = report.annotated,
        skipped = report.skipped(),
        failed = report.failures.len(),
        "annotation complete"
    );
    Ok(report)
}
