//! Class catalog: the universe of recognized main classes and their subclasses.
//! Supplied through the run config; never read from the table itself.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCatalogEntry {
    pub name: String,
    pub source: String,
    #[serde(default, rename = "sub_classes", alias = "subclasses")]
    pub subclasses: Vec<SubclassInfo>,
}

/// Subclass identity as written into a spell's `fromSubclass` entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubclassInfo {
    pub name: String,
    #[serde(rename = "shortName")]
    pub short_name: String,
    pub source: String,
}

impl ClassCatalogEntry {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            subclasses: Vec::new(),
        }
    }

    pub fn with_subclass(
        mut self,
        name: impl Into<String>,
        short_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.subclasses.push(SubclassInfo {
            name: name.into(),
            short_name: short_name.into(),
            source: source.into(),
        });
        self
    }
}
