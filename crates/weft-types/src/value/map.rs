// src/value/map.rs
//
// Map values: an ordered entry list closed by a fallback entry.
//
// Invalid configurations are storable. `validate` reports them as a
// ValidationResult so an editor can keep an in-progress map around.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use weft_identity::Identifier;

use super::{Value, ValueHolder};
use crate::{SubtypeOrder, TypeRef, TypeSystem};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MapEntry {
    /// Maps one source value to one target value.
    OneToOne {
        source: ValueHolder,
        target: ValueHolder,
    },
    /// Fallback: every unmapped source maps to `target`.
    AllToOne { target: ValueHolder },
    /// Fallback: every unmapped source maps to itself.
    AllToSame,
}

impl MapEntry {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, MapEntry::OneToOne { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(message) => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapValue {
    pub source_type: TypeRef,
    pub target_type: TypeRef,
    pub entries: Vec<MapEntry>,
}

impl MapValue {
    pub fn new(source_type: TypeRef, target_type: TypeRef, entries: Vec<MapEntry>) -> Self {
        Self {
            source_type,
            target_type,
            entries,
        }
    }

    pub fn fallback(&self) -> Option<&MapEntry> {
        self.entries.last().filter(|entry| entry.is_fallback())
    }

    /// Check the entry layout and that every entry is well typed.
    pub fn validate(&self, ts: &TypeSystem) -> ValidationResult {
        let Some(last) = self.entries.last() else {
            return ValidationResult::Invalid("map has no entries".to_string());
        };
        if !last.is_fallback() {
            return ValidationResult::Invalid("the last entry must be a fallback".to_string());
        }
        let last_index = self.entries.len() - 1;
        if let Some(i) = self.entries[..last_index]
            .iter()
            .position(MapEntry::is_fallback)
        {
            return ValidationResult::Invalid(format!(
                "entry {i} is a fallback but only the last entry may be one"
            ));
        }
        match self.type_problem(ts) {
            Some(message) => ValidationResult::Invalid(message),
            None => ValidationResult::Valid,
        }
    }

    /// Describe the first badly typed entry, ignoring where fallbacks sit.
    pub(crate) fn type_problem(&self, ts: &TypeSystem) -> Option<String> {
        let source_type = match ts.resolve(&self.source_type) {
            Ok(ty) => ty,
            Err(err) => return Some(format!("source type: {err}")),
        };
        let target_type = match ts.resolve(&self.target_type) {
            Ok(ty) => ty,
            Err(err) => return Some(format!("target type: {err}")),
        };
        for (i, entry) in self.entries.iter().enumerate() {
            match entry {
                MapEntry::OneToOne { source, target } => {
                    if !source_type.is_valid_value(ts, source) {
                        return Some(format!(
                            "entry {i}: {} is not a {}",
                            **source, self.source_type
                        ));
                    }
                    if !target_type.is_valid_value(ts, target) {
                        return Some(format!(
                            "entry {i}: {} is not a {}",
                            **target, self.target_type
                        ));
                    }
                }
                MapEntry::AllToOne { target } => {
                    if !target_type.is_valid_value(ts, target) {
                        return Some(format!(
                            "entry {i}: {} is not a {}",
                            **target, self.target_type
                        ));
                    }
                }
                MapEntry::AllToSame => {
                    let order = ts.compare_subtype(&self.source_type, &self.target_type);
                    if order != SubtypeOrder::Equivalent {
                        return Some(format!(
                            "entry {i}: identity fallback needs equivalent types, {} and {} are {order}",
                            self.source_type, self.target_type
                        ));
                    }
                }
            }
        }
        None
    }

    /// Map `source` through the entries. The first matching one-to-one entry
    /// wins, otherwise the fallback applies. Returns `None` only when the map
    /// has no fallback.
    pub fn resolve(&self, source: &ValueHolder) -> Option<ValueHolder> {
        let mapped = self.entries.iter().find_map(|entry| match entry {
            MapEntry::OneToOne { source: s, target } if s == source => Some(target.clone()),
            _ => None,
        });
        if mapped.is_some() {
            return mapped;
        }
        match self.fallback()? {
            MapEntry::AllToOne { target } => Some(target.clone()),
            MapEntry::AllToSame => Some(source.clone()),
            MapEntry::OneToOne { .. } => None,
        }
    }

    pub(crate) fn visit_identifiers(&mut self, visit: &mut dyn FnMut(&mut Identifier)) {
        self.source_type.visit_identifiers(visit);
        self.target_type.visit_identifiers(visit);
        for entry in &mut self.entries {
            match entry {
                MapEntry::OneToOne { source, target } => {
                    source.visit_identifiers(visit);
                    target.visit_identifiers(visit);
                }
                MapEntry::AllToOne { target } => target.visit_identifiers(visit),
                MapEntry::AllToSame => {}
            }
        }
    }

    pub(crate) fn visit_file_paths(&mut self, visit: &mut dyn FnMut(&mut PathBuf)) {
        for entry in &mut self.entries {
            match entry {
                MapEntry::OneToOne { source, target } => {
                    source.visit_file_paths(visit);
                    target.visit_file_paths(visit);
                }
                MapEntry::AllToOne { target } => target.visit_file_paths(visit),
                MapEntry::AllToSame => {}
            }
        }
    }
}

impl From<MapValue> for Value {
    fn from(map: MapValue) -> Self {
        Value::Map(map)
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("map{")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match entry {
                MapEntry::OneToOne { source, target } => write!(f, "{} -> {}", **source, **target)?,
                MapEntry::AllToOne { target } => write!(f, "* -> {}", **target)?,
                MapEntry::AllToSame => f.write_str("* -> *")?,
            }
        }
        f.write_str("}")
    }
}
