//! Per-spell merge of background lookups into the spell's `classes` field.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{json, Value};

use crate::data::catalog::SubclassInfo;
use crate::data::spells::{spell_backgrounds, spell_name};
use crate::error::SpellError;
use crate::mapping::lookup::{BackgroundLookups, ClassRef};

pub const CLASSES_KEY: &str = "classes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubclassGrant {
    pub class: ClassRef,
    pub subclass: SubclassInfo,
}

/// The value written to a spell's `classes` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellClasses {
    pub from_class_list: Vec<ClassRef>,
    pub from_subclass: Vec<SubclassGrant>,
}

impl SpellClasses {
    pub fn to_value(&self) -> Value {
        let classes: Vec<Value> = self.from_class_list.iter().map(class_value).collect();
        let subclasses: Vec<Value> = self
            .from_subclass
            .iter()
            .map(|grant| {
                json!({
                    "class": class_value(&grant.class),
                    "subclass": {
                        "name": grant.subclass.name,
                        "shortName": grant.subclass.short_name,
                        "source": grant.subclass.source,
                    },
                })
            })
            .collect();
        json!({
            "fromClassList": classes,
            "fromSubclass": subclasses,
        })
    }
}

fn class_value(class: &ClassRef) -> Value {
    json!({ "name": class.name, "source": class.source })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoBackgrounds,
    NoValidBackgrounds,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBackgrounds => "No backgrounds found.",
            Self::NoValidBackgrounds => "No valid backgrounds.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellOutcome {
    Annotated(SpellClasses),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellFailure {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub total_spells: usize,
    pub annotated: usize,
    pub skipped_no_backgrounds: usize,
    pub skipped_no_valid_backgrounds: usize,
    pub failures: Vec<SpellFailure>,
}

impl AnnotationReport {
    pub fn skipped(&self) -> usize {
        self.skipped_no_backgrounds + self.skipped_no_valid_backgrounds
    }
}

/// Merge the lookups of `backgrounds`, in order. A class name is recorded once; a
/// subclass is kept only while its parent class has not been recorded. Subclasses
/// themselves are not recorded, so the same subclass may appear more than once.
pub fn merge_classes<S: AsRef<str>>(backgrounds: &[S], lookups: &BackgroundLookups) -> SpellClasses {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = SpellClasses::default();

    for background in backgrounds {
        let background = background.as_ref();
        if let Some(classes) = lookups.classes.get(background) {
            for class in classes {
                if seen.insert(class.name.to_lowercase()) {
                    merged.from_class_list.push(class.clone());
                }
            }
        }
        if let Some(subclasses) = lookups.subclasses.get(background) {
            for subclass in subclasses {
                if !seen.contains(&subclass.class_name.to_lowercase()) {
                    merged.from_subclass.push(SubclassGrant {
                        class: subclass.parent(),
                        subclass: subclass.subclass.clone(),
                    });
                }
            }
        }
    }
    merged
}

/// Annotate one spell in place. Skipped spells and failures leave the spell untouched.
pub fn annotate_spell(
    spell: &mut Value,
    lookups: &BackgroundLookups,
    valid_backgrounds: &HashSet<String>,
) -> Result<SpellOutcome, SpellError> {
    let refs = spell_backgrounds(spell)?;
    if refs.is_empty() {
        return Ok(SpellOutcome::Skipped(SkipReason::NoBackgrounds));
    }

    let valid: Vec<&str> = refs
        .iter()
        .map(|r| r.name())
        .filter(|name| valid_backgrounds.contains(*name))
        .collect();
    if valid.is_empty() {
        return Ok(SpellOutcome::Skipped(SkipReason::NoValidBackgrounds));
    }

    let classes = merge_classes(&valid, lookups);
    let object = spell.as_object_mut().ok_or(SpellError::NotAnObject)?;
    object.insert(CLASSES_KEY.to_string(), classes.to_value());
    Ok(SpellOutcome::Annotated(classes))
}

/// Annotate every spell. One spell failing never stops the batch.
pub fn annotate_spells(
    spells: &mut [Value],
    lookups: &BackgroundLookups,
    valid_backgrounds: &HashSet<String>,
) -> AnnotationReport {
    let mut report = AnnotationReport {
        total_spells: spells.len(),
        ..AnnotationReport::default()
    };

    for (index, spell) in spells.iter_mut().enumerate() {
        let name = spell_name(spell).to_string();
        match annotate_spell(spell, lookups, valid_backgrounds) {
            Ok(SpellOutcome::Annotated(classes)) => {
                report.annotated += 1;
                tracing::info!(
                    spell = %name,
                    classes = classes.from_class_list.len(),
                    subclasses = classes.from_subclass.len(),
                    "updated spell with classes and subclasses"
                );
            }
            Ok(SpellOutcome::Skipped(reason)) => {
                match reason {
                    SkipReason::NoBackgrounds => report.skipped_no_backgrounds += 1,
                    SkipReason::NoValidBackgrounds => report.skipped_no_valid_backgrounds += 1,
                }
                tracing::info!(spell = %name, "skipping spell - {}", reason.as_str());
            }
            Err(err) => {
                tracing::warn!(spell = %name, index, "error processing spell: {err}");
                report.failures.push(SpellFailure {
                    index,
                    name,
                    reason: err.to_string(),
                });
            }
        }
    }
    report
}
