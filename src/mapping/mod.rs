//! Background → class mapping: lookup construction and per-spell annotation.

mod annotate;
mod lookup;

pub use annotate::{
    annotate_spell, annotate_spells, merge_classes, AnnotationReport, SkipReason, SpellClasses,
    SpellFailure, SpellOutcome, SubclassGrant, CLASSES_KEY,
};
pub use lookup::{
    build_lookups, class_columns, BackgroundClassMap, BackgroundLookups, BackgroundSubclassMap, CatalogIndex,
    ClassRef, SubclassRef,
};
