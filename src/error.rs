//! Error taxonomy for a run. `LoadError`, `StructureError` and `ConfigError` are
//! fatal; `SpellError` is recovered per spell by the annotator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The background table could not be read into a `BackgroundTable`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open workbook '{path}': {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("failed to read CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unsupported table format '{path}' (expected .xlsx, .xlsm, .xls, .ods or .csv)")]
    UnsupportedFormat { path: PathBuf },
    #[error("workbook '{path}' contains no sheets")]
    NoSheets { path: PathBuf },
    #[error("sheet '{sheet}' not found in '{path}'")]
    MissingSheet { path: PathBuf, sheet: String },
    #[error("table '{path}' has no header row")]
    MissingHeader { path: PathBuf },
    #[error("table row {row} has marked columns but no background name")]
    MissingBackground { row: usize },
}

/// The spell collection document does not have the expected shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("invalid JSON structure: document is not an object")]
    NotAnObject,
    #[error("invalid JSON structure: missing 'spell' key")]
    MissingSpellKey,
    #[error("invalid JSON structure: 'spell' is not an array")]
    SpellNotArray,
}

/// Failure while computing one spell's classes. The spell is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpellError {
    #[error("spell entry is not an object")]
    NotAnObject,
    #[error("'backgrounds' is not a list")]
    BackgroundsNotList,
    #[error("background entry {index} has no 'name'")]
    BackgroundWithoutName { index: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Anything that aborts a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("error loading classes and subclasses from table: {0}")]
    Load(#[from] LoadError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error("failed to read spell file '{path}': {source}")]
    ReadSpells {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse spell JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to write output '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
