use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::data::catalog::ClassCatalogEntry;
use crate::data::table::{is_marked, BackgroundTable};
use crate::mapping::{class_columns, CatalogIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Most severe first; stable within a severity.
    pub fn sorted(mut self) -> Self {
        self.diagnostics.sort_by_key(|diag| diag.severity);
        self
    }
}

/// Catalog checks: blank names, names defined twice (the later definition wins in
/// the lookups), and subclasses shadowed by a main class of the same name.
pub fn validate_catalog(catalog: &[ClassCatalogEntry]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut main_names = HashSet::new();
    let mut subclass_owner: HashMap<String, String> = HashMap::new();

    for (index, class) in catalog.iter().enumerate() {
        let context = format!("classes[{index}]");
        if class.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, &context, "missing non-empty 'name'");
        } else if !main_names.insert(class.name.to_lowercase()) {
            report.push(
                ValidationSeverity::Warning,
                &context,
                format!("duplicate class '{}' overrides an earlier entry", class.name),
            );
        }
        if class.source.trim().is_empty() {
            report.push(
                ValidationSeverity::Warning,
                &context,
                format!("class '{}' has no source", class.name),
            );
        }

        for (sub_index, subclass) in class.subclasses.iter().enumerate() {
            let sub_context = format!("{context}.sub_classes[{sub_index}]");
            if subclass.name.trim().is_empty() {
                report.push(
                    ValidationSeverity::Error,
                    sub_context,
                    "missing non-empty 'name'",
                );
                continue;
            }
            if let Some(owner) =
                subclass_owner.insert(subclass.name.to_lowercase(), class.name.clone())
            {
                report.push(
                    ValidationSeverity::Warning,
                    &sub_context,
                    format!(
                        "subclass '{}' already defined under '{owner}'; this entry wins",
                        subclass.name
                    ),
                );
            }
            if subclass.short_name.trim().is_empty() {
                report.push(
                    ValidationSeverity::Warning,
                    &sub_context,
                    format!("subclass '{}' has no shortName", subclass.name),
                );
            }
        }
    }

    for (index, class) in catalog.iter().enumerate() {
        for (sub_index, subclass) in class.subclasses.iter().enumerate() {
            if main_names.contains(&subclass.name.to_lowercase()) {
                report.push(
                    ValidationSeverity::Warning,
                    format!("classes[{index}].sub_classes[{sub_index}]"),
                    format!(
                        "subclass '{}' shares its name with a main class and is never matched",
                        subclass.name
                    ),
                );
            }
        }
    }

    report
}

/// Table checks against the catalog and the configured backgrounds.
pub fn validate_table(
    table: &BackgroundTable,
    catalog: &[ClassCatalogEntry],
    valid_backgrounds: &[String],
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let index = CatalogIndex::new(catalog);
    let headers = table.normalized_headers();

    if headers.len() < 2 {
        report.push(
            ValidationSeverity::Error,
            "header",
            "expected a background column followed by at least one class column",
        );
    }

    let columns = class_columns(&headers);
    for (col, header) in headers.iter().enumerate().skip(1) {
        if !columns.contains(&col) {
            report.push(
                ValidationSeverity::Warning,
                format!("column[{col}] '{}'", table.headers[col].trim()),
                "repeats an earlier header; its marks are ignored",
            );
            continue;
        }
        if index.is_main_class(header) || index.is_subclass(header) {
            continue;
        }
        let marks = table.rows.iter().filter(|row| is_marked(row.cell(col))).count();
        if marks > 0 {
            report.push(
                ValidationSeverity::Info,
                format!("column[{col}] '{}'", table.headers[col].trim()),
                format!("not in the class catalog; {marks} mark(s) ignored"),
            );
        }
    }

    let valid: HashSet<&str> = valid_backgrounds.iter().map(String::as_str).collect();
    let mut seen_rows: HashMap<&str, usize> = HashMap::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let context = format!("row[{}]", row_idx + 1);
        let background = row.background();
        if background.is_empty() {
            if (1..headers.len()).any(|col| is_marked(row.cell(col))) {
                report.push(
                    ValidationSeverity::Error,
                    context,
                    "row has marks but no background name",
                );
            }
            continue;
        }
        if let Some(first) = seen_rows.insert(background, row_idx + 1) {
            report.push(
                ValidationSeverity::Warning,
                &context,
                format!("background '{background}' repeats row[{first}]; the later row wins"),
            );
        }
        if !valid.contains(background) {
            report.push(
                ValidationSeverity::Info,
                &context,
                format!("background '{background}' is not in valid_backgrounds"),
            );
        }
    }

    for background in valid_backgrounds {
        if !seen_rows.contains_key(background.as_str()) {
            report.push(
                ValidationSeverity::Info,
                "valid_backgrounds",
                format!("'{background}' has no row in the table"),
            );
        }
    }

    report
}
