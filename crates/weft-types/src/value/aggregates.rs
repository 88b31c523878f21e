// src/value/aggregates.rs
//
// Payloads of the structured value kinds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use weft_identity::Identifier;

use super::ValueHolder;
use crate::TypeRef;

/// Field values keyed by field identifier. Only active fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordValue(pub(crate) BTreeMap<Identifier, ValueHolder>);

impl RecordValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Identifier) -> Option<&ValueHolder> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &Identifier) -> Option<&mut ValueHolder> {
        self.0.get_mut(id)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.0.contains_key(id)
    }

    pub fn insert(&mut self, id: Identifier, value: ValueHolder) -> Option<ValueHolder> {
        self.0.insert(id, value)
    }

    pub fn remove(&mut self, id: &Identifier) -> Option<ValueHolder> {
        self.0.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &ValueHolder)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn visit_identifiers(&mut self, visit: &mut dyn FnMut(&mut Identifier)) {
        // Keys order the map, so it is rebuilt after they were visited.
        let fields = std::mem::take(&mut self.0);
        for (mut id, mut holder) in fields {
            visit(&mut id);
            holder.visit_identifiers(visit);
            self.0.insert(id, holder);
        }
    }
}

impl FromIterator<(Identifier, ValueHolder)> for RecordValue {
    fn from_iter<I: IntoIterator<Item = (Identifier, ValueHolder)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (id, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}: {}", **value)?;
        }
        f.write_str("}")
    }
}

/// A record with variants: the selected tag plus the fields active for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantValue {
    pub tag: Identifier,
    pub fields: RecordValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArrayValue(pub Vec<ValueHolder>);

impl ArrayValue {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ValueHolder> {
        self.0.get(index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TupleValue(pub Vec<ValueHolder>);

/// A value of one summand of a sum type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SumValue {
    pub summand: usize,
    pub value: ValueHolder,
}

/// A generic value: one optional assignment per type variable plus the
/// value of the wrapped type after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenericValue {
    pub assignments: Vec<Option<TypeRef>>,
    pub wrapped: ValueHolder,
}
