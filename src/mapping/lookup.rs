//! Background → class / subclass lookups built from the cross-reference table and
//! the class catalog.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::catalog::{ClassCatalogEntry, SubclassInfo};
use crate::data::table::{is_marked, BackgroundTable};
use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRef {
    pub name: String,
    pub source: String,
}

/// A subclass marked for a background, carrying its parent class identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubclassRef {
    pub class_name: String,
    pub class_source: String,
    pub subclass: SubclassInfo,
}

impl SubclassRef {
    pub fn parent(&self) -> ClassRef {
        ClassRef {
            name: self.class_name.clone(),
            source: self.class_source.clone(),
        }
    }
}

pub type BackgroundClassMap = HashMap<String, Vec<ClassRef>>;
pub type BackgroundSubclassMap = HashMap<String, Vec<SubclassRef>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackgroundLookups {
    pub classes: BackgroundClassMap,
    pub subclasses: BackgroundSubclassMap,
}

#[derive(Debug, Clone)]
struct SubclassIndexEntry<'a> {
    class_name: &'a str,
    class_source: &'a str,
    short_name: &'a str,
    source: &'a str,
}

/// Lower-cased name indexes over the catalog. Later duplicates overwrite earlier ones.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex<'a> {
    main: HashMap<String, &'a str>,
    sub: HashMap<String, SubclassIndexEntry<'a>>,
}

impl<'a> CatalogIndex<'a> {
    pub fn new(catalog: &'a [ClassCatalogEntry]) -> Self {
        let mut index = CatalogIndex::default();
        for class in catalog {
            index
                .main
                .insert(class.name.to_lowercase(), class.source.as_str());
            for subclass in &class.subclasses {
                index.sub.insert(
                    subclass.name.to_lowercase(),
                    SubclassIndexEntry {
                        class_name: &class.name,
                        class_source: &class.source,
                        short_name: &subclass.short_name,
                        source: &subclass.source,
                    },
                );
            }
        }
        index
    }

    pub fn is_main_class(&self, normalized: &str) -> bool {
        self.main.contains_key(normalized)
    }

    pub fn is_subclass(&self, normalized: &str) -> bool {
        self.sub.contains_key(normalized)
    }

    fn class_ref(&self, normalized: &str) -> Option<ClassRef> {
        self.main.get(normalized).map(|source| ClassRef {
            name: capitalize(normalized),
            source: source.to_string(),
        })
    }

    fn subclass_ref(&self, normalized: &str) -> Option<SubclassRef> {
        self.sub.get(normalized).map(|entry| SubclassRef {
            class_name: entry.class_name.to_string(),
            class_source: entry.class_source.to_string(),
            subclass: SubclassInfo {
                name: capitalize(normalized),
                short_name: entry.short_name.to_string(),
                source: entry.source.to_string(),
            },
        })
    }
}

/// Build both lookups. Unrecognized columns are ignored even when marked, and a
/// background with no matches is left out of the corresponding map. A header that
/// repeats an earlier one (after normalization) is ignored.
///
/// Blank rows are skipped; a row with marks but no background name is a `LoadError`.
pub fn build_lookups(
    table: &BackgroundTable,
    catalog: &[ClassCatalogEntry],
) -> Result<BackgroundLookups, LoadError> {
    let headers = table.normalized_headers();
    let columns = class_columns(&headers);
    let index = CatalogIndex::new(catalog);
    let mut lookups = BackgroundLookups::default();

    for (row_idx, row) in table.rows.iter().enumerate() {
        let background = row.background();
        if background.is_empty() {
            if (1..headers.len()).any(|col| is_marked(row.cell(col))) {
                return Err(LoadError::MissingBackground { row: row_idx + 1 });
            }
            tracing::debug!(row = row_idx + 1, "skipping blank table row");
            continue;
        }

        let mut classes = Vec::new();
        let mut subclasses = Vec::new();
        for &col in &columns {
            if !is_marked(row.cell(col)) {
                continue;
            }
            let header = headers[col].as_str();
            // Main classes shadow subclasses of the same name.
            if let Some(class) = index.class_ref(header) {
                classes.push(class);
            } else if let Some(subclass) = index.subclass_ref(header) {
                subclasses.push(subclass);
            }
        }

        if !classes.is_empty() {
            lookups.classes.insert(background.to_string(), classes);
        }
        if !subclasses.is_empty() {
            lookups.subclasses.insert(background.to_string(), subclasses);
        }
    }

    tracing::debug!(
        class_backgrounds = lookups.classes.len(),
        subclass_backgrounds = lookups.subclasses.len(),
        "built background lookups"
    );
    Ok(lookups)
}

/// Column indexes after the background column, first occurrence of each header only.
pub fn class_columns(normalized_headers: &[String]) -> Vec<usize> {
    let mut seen = HashSet::new();
    normalized_headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, header)| seen.insert(header.as_str()))
        .map(|(col, _)| col)
        .collect()
}

/// Upper-case the first character; the rest is left as-is.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_lookups, capitalize, class_columns, ClassRef};
    use crate::data::catalog::ClassCatalogEntry;
    use crate::data::table::{BackgroundRow, BackgroundTable};
    use crate::error::LoadError;

    fn catalog() -> Vec<ClassCatalogEntry> {
        vec![
            ClassCatalogEntry::new("Warrior", "XPHB")
                .with_subclass("TacticsSubclass", "Tactics", "GW"),
            ClassCatalogEntry::new("Ranger", "XPHB").with_subclass(
                "Beast Master",
                "Beast Master",
                "XPHB",
            ),
        ]
    }

    #[test]
    fn single_marked_main_class_yields_one_class_ref() {
        let table = BackgroundTable::new(
            ["Background", "Warrior", "Ranger"],
            vec![BackgroundRow::new(["Strength", "X", ""])],
        );
        let lookups = build_lookups(&table, &catalog()).expect("lookups");
        assert_eq!(
            lookups.classes["Strength"],
            vec![ClassRef {
                name: "Warrior".into(),
                source: "XPHB".into()
            }]
        );
        assert!(!lookups.subclasses.contains_key("Strength"));
    }

    #[test]
    fn subclass_column_carries_parent_identity() {
        let table = BackgroundTable::new(
            ["Background", " BEAST MASTER "],
            vec![BackgroundRow::new(["Expertise", "x"])],
        );
        let lookups = build_lookups(&table, &catalog()).expect("lookups");
        let refs = &lookups.subclasses["Expertise"];
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].class_name, "Ranger");
        assert_eq!(refs[0].class_source, "XPHB");
        assert_eq!(refs[0].subclass.name, "Beast master");
        assert_eq!(refs[0].subclass.short_name, "Beast Master");
        assert!(!lookups.classes.contains_key("Expertise"));
    }

    #[test]
    fn unknown_columns_and_unmarked_rows_are_ignored() {
        let table = BackgroundTable::new(
            ["Background", "Notes", "Warrior"],
            vec![
                BackgroundRow::new(["Strength", "X", ""]),
                BackgroundRow::new(["Expertise", "", ""]),
            ],
        );
        let lookups = build_lookups(&table, &catalog()).expect("lookups");
        assert!(lookups.classes.is_empty());
        assert!(lookups.subclasses.is_empty());
    }

    #[test]
    fn main_class_wins_over_subclass_with_same_name() {
        let catalog = vec![
            ClassCatalogEntry::new("Warrior", "XPHB"),
            ClassCatalogEntry::new("Paragon", "GW").with_subclass("Warrior", "W", "GW"),
        ];
        let table = BackgroundTable::new(
            ["Background", "Warrior"],
            vec![BackgroundRow::new(["Strength", "X"])],
        );
        let lookups = build_lookups(&table, &catalog).expect("lookups");
        assert_eq!(lookups.classes["Strength"].len(), 1);
        assert!(lookups.subclasses.is_empty());
    }

    #[test]
    fn later_duplicate_background_row_replaces_earlier() {
        let table = BackgroundTable::new(
            ["Background", "Warrior", "Ranger"],
            vec![
                BackgroundRow::new(["Strength", "X", ""]),
                BackgroundRow::new(["Strength", "", "X"]),
            ],
        );
        let lookups = build_lookups(&table, &catalog()).expect("lookups");
        assert_eq!(lookups.classes["Strength"][0].name, "Ranger");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let table = BackgroundTable::new(
            ["Background", "Warrior"],
            vec![
                BackgroundRow::new(["", ""]),
                BackgroundRow::new(["  "]),
                BackgroundRow::new(["Strength", "X"]),
            ],
        );
        let lookups = build_lookups(&table, &catalog()).expect("lookups");
        assert_eq!(lookups.classes.len(), 1);
    }

    #[test]
    fn marked_row_without_background_name_is_rejected() {
        let table = BackgroundTable::new(
            ["Background", "Warrior"],
            vec![
                BackgroundRow::new(["", "X"]),
                BackgroundRow::new(["Strength", "X"]),
            ],
        );
        let err = build_lookups(&table, &catalog()).expect_err("row 1 has no name");
        assert!(matches!(err, LoadError::MissingBackground { row: 1 }));
    }

    #[test]
    fn repeated_header_only_counts_once() {
        let table = BackgroundTable::new(
            ["Background", "TacticsSubclass", " tacticssubclass"],
            vec![BackgroundRow::new(["Tactics", "X", "X"])],
        );
        let lookups = build_lookups(&table, &catalog()).expect("lookups");
        assert_eq!(lookups.subclasses["Tactics"].len(), 1);
        assert_eq!(class_columns(&table.normalized_headers()), vec![1]);
    }

    #[test]
    fn capitalize_only_touches_first_char() {
        assert_eq!(capitalize("collage of lore"), "Collage of lore");
        assert_eq!(capitalize(""), "");
    }
}
