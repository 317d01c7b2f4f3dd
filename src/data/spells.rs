//! Spell collection document: `{ "spell": [ {...}, ... ] }`.
//! Spells stay as raw JSON so fields this tool does not own pass through untouched.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RunError, SpellError, StructureError};

pub const SPELL_KEY: &str = "spell";
pub const UNKNOWN_SPELL_NAME: &str = "Unknown Spell";

/// A spell's reference to a background: either the bare name or an object naming it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BackgroundRef {
    Name(String),
    Ref { name: String },
}

impl BackgroundRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Ref { name } => name,
        }
    }
}

/// A parsed spell document. Top-level keys other than `spell` are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellDocument {
    root: Map<String, Value>,
}

impl SpellDocument {
    pub fn from_value(value: Value) -> Result<Self, StructureError> {
        let Value::Object(root) = value else {
            return Err(StructureError::NotAnObject);
        };
        match root.get(SPELL_KEY) {
            None => Err(StructureError::MissingSpellKey),
            Some(Value::Array(_)) => Ok(Self { root }),
            Some(_) => Err(StructureError::SpellNotArray),
        }
    }

    pub fn spells(&self) -> &[Value] {
        match self.root.get(SPELL_KEY) {
            Some(Value::Array(spells)) => spells.as_slice(),
            _ => &[],
        }
    }

    pub fn spells_mut(&mut self) -> &mut [Value] {
        match self.root.get_mut(SPELL_KEY) {
            Some(Value::Array(spells)) => spells.as_mut_slice(),
            _ => &mut [],
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}

pub fn load_spell_document(path: &Path) -> Result<SpellDocument, RunError> {
    let raw = fs::read_to_string(path).map_err(|source| RunError::ReadSpells {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw)?;
    Ok(SpellDocument::from_value(value)?)
}

/// Pretty-print with four-space indentation, keeping non-ASCII characters as-is.
pub fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_spell_document(doc: &SpellDocument, path: &Path) -> Result<(), RunError> {
    let payload = to_pretty_json(&doc.as_value())?;
    let write_err = |source| RunError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut file = fs::File::create(path).map_err(write_err)?;
    file.write_all(payload.as_bytes()).map_err(write_err)?;
    Ok(())
}

pub fn spell_name(spell: &Value) -> &str {
    spell
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_SPELL_NAME)
}

/// Background references of one spell. A missing or null `backgrounds` field reads as empty.
/// Entries that cannot name a background (numbers, `{"name": null}`) are dropped; only an
/// object with no `name` key at all fails the spell.
pub fn spell_backgrounds(spell: &Value) -> Result<Vec<BackgroundRef>, SpellError> {
    let Some(object) = spell.as_object() else {
        return Err(SpellError::NotAnObject);
    };
    let entries = match object.get("backgrounds") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(SpellError::BackgroundsNotList),
    };

    let mut refs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match BackgroundRef::deserialize(entry) {
            Ok(background) => refs.push(background),
            Err(_) if entry.is_object() && entry.get("name").is_none() => {
                return Err(SpellError::BackgroundWithoutName { index });
            }
            Err(_) => continue,
        }
    }
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{spell_backgrounds, to_pretty_json, BackgroundRef, SpellDocument};
    use crate::error::{SpellError, StructureError};

    #[test]
    fn document_requires_spell_array() {
        assert_eq!(
            SpellDocument::from_value(json!({"spells": []})).unwrap_err(),
            StructureError::MissingSpellKey
        );
        assert_eq!(
            SpellDocument::from_value(json!({"spell": {}})).unwrap_err(),
            StructureError::SpellNotArray
        );
        assert_eq!(
            SpellDocument::from_value(json!([])).unwrap_err(),
            StructureError::NotAnObject
        );
        let doc = SpellDocument::from_value(json!({"spell": [{"name": "Bash"}]})).unwrap();
        assert_eq!(doc.spells().len(), 1);
    }

    #[test]
    fn backgrounds_accept_names_and_objects() {
        let spell = json!({"name": "Bash", "backgrounds": ["Strength", {"name": "Tactics"}, 7]});
        let refs = spell_backgrounds(&spell).expect("backgrounds parse");
        assert_eq!(
            refs,
            vec![
                BackgroundRef::Name("Strength".into()),
                BackgroundRef::Ref {
                    name: "Tactics".into()
                }
            ]
        );
        assert_eq!(refs[1].name(), "Tactics");
    }

    #[test]
    fn object_background_with_non_string_name_is_dropped() {
        let spell = json!({
            "name": "Bash",
            "backgrounds": ["Strength", {"name": null}, {"name": 5, "id": 2}]
        });
        assert_eq!(
            spell_backgrounds(&spell),
            Ok(vec![BackgroundRef::Name("Strength".into())])
        );
    }

    #[test]
    fn object_background_without_name_is_an_error() {
        let spell = json!({"backgrounds": ["Strength", {"title": "Tactics"}]});
        assert_eq!(
            spell_backgrounds(&spell),
            Err(SpellError::BackgroundWithoutName { index: 1 })
        );
        assert_eq!(
            spell_backgrounds(&json!({"backgrounds": "Strength"})),
            Err(SpellError::BackgroundsNotList)
        );
        assert_eq!(spell_backgrounds(&json!("Bash")), Err(SpellError::NotAnObject));
    }

    #[test]
    fn pretty_json_uses_four_spaces_and_keeps_unicode() {
        let out = to_pretty_json(&json!({"name": "Sceau de Balthazar ✦"})).unwrap();
        assert_eq!(out, "{\n    \"name\": \"Sceau de Balthazar ✦\"\n}");
    }
}
