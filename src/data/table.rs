//! Background cross-reference table: one row per background, one column per class or
//! subclass, "X" in a cell marks the pairing.
//! Reads .xlsx/.xlsm/.xls/.ods workbooks or .csv files. Workbooks must contain the
//! named sheet (matched after trimming, case-sensitive); there is no fallback.

use std::path::Path;

use calamine::Reader;

use crate::error::LoadError;

pub const DEFAULT_SHEET_NAME: &str = "Spell Distribution";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundTable {
    /// Raw header cells; index 0 is the background column.
    pub headers: Vec<String>,
    pub rows: Vec<BackgroundRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundRow {
    /// Cells aligned with `headers`; index 0 holds the background name.
    pub cells: Vec<String>,
}

impl BackgroundRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    pub fn background(&self) -> &str {
        self.cells.first().map(|s| s.trim()).unwrap_or("")
    }

    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

impl BackgroundTable {
    pub fn new<I, S>(headers: I, rows: Vec<BackgroundRow>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// Headers trimmed and lower-cased, for catalog matching.
    pub fn normalized_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| normalize_header(h)).collect()
    }
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A cell counts as marked when it reads "X" (any case) after trimming.
pub fn is_marked(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("x")
}

/// Load a table, choosing the reader by file extension.
pub fn load_background_table(path: &Path, sheet_name: &str) -> Result<BackgroundTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_from_workbook(path, sheet_name),
        "csv" => read_from_csv(path),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn read_from_workbook(path: &Path, sheet_name: &str) -> Result<BackgroundTable, LoadError> {
    let workbook_err = |source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut wb = calamine::open_workbook_auto(path).map_err(workbook_err)?;
    let names = wb.sheet_names();
    if names.is_empty() {
        return Err(LoadError::NoSheets {
            path: path.to_path_buf(),
        });
    }
    let sheet = names
        .iter()
        .find(|s| s.trim() == sheet_name.trim())
        .ok_or_else(|| LoadError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet_name.to_string(),
        })?
        .clone();
    let range = wb.worksheet_range(&sheet).map_err(workbook_err)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::MissingHeader {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(cell_str)
        .collect();
    let rows = rows
        .map(|row| BackgroundRow {
            cells: row.iter().map(cell_str).collect(),
        })
        .collect();
    tracing::debug!(path = %path.display(), sheet = %sheet, "loaded background workbook");
    Ok(BackgroundTable { headers, rows })
}

fn read_from_csv(path: &Path) -> Result<BackgroundTable, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(BackgroundRow::new(record.iter()));
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded background CSV");
    Ok(BackgroundTable { headers, rows })
}

/// Render a workbook cell as text. Whole floats print without a fraction.
pub fn cell_str(d: &calamine::Data) -> String {
    match d {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.clone(),
        calamine::Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        calamine::Data::Float(f) => format!("{}", f),
        calamine::Data::Int(i) => format!("{}", i),
        calamine::Data::Bool(b) => format!("{}", b),
        _ => format!("{:?}", d),
    }
}
