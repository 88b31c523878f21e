// types/record.rs
//
// Records: named fields, each always active or optional.

use rustc_hash::FxHashMap;
use weft_identity::{Identifier, PathStep};

use super::{TypeKind, adapt_to, default_of, value_fits};
use crate::compound::{ChildMut, ChildRef, CompoundType, out_of_range};
use crate::errors::{ModelError, PathError, TypeSystemError};
use crate::subtype::SubtypeOrder;
use crate::type_ref::TypeRef;
use crate::value::{RecordValue, Value, ValueHolder};
use crate::TypeSystem;

/// Whether a field is always present, and if not, whether new values have it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Optionality {
    AlwaysActive,
    OptionalDefaultInactive,
    OptionalDefaultActive,
}

impl Optionality {
    /// Decode the numeric form used in `Record` value arguments.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Optionality::AlwaysActive),
            1 => Some(Optionality::OptionalDefaultInactive),
            2 => Some(Optionality::OptionalDefaultActive),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Optionality::AlwaysActive => 0,
            Optionality::OptionalDefaultInactive => 1,
            Optionality::OptionalDefaultActive => 2,
        }
    }

    pub fn is_optional(self) -> bool {
        self != Optionality::AlwaysActive
    }

    pub fn is_active_by_default(self) -> bool {
        self != Optionality::OptionalDefaultInactive
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub id: Identifier,
    pub type_ref: TypeRef,
    pub optionality: Optionality,
}

#[derive(Debug, Clone)]
pub struct RecordType {
    fields: Vec<FieldInfo>,
    index: FxHashMap<Identifier, usize>,
}

impl RecordType {
    pub fn new(fields: Vec<FieldInfo>) -> Result<Self, TypeSystemError> {
        let index = field_index(fields.iter().map(|f| &f.id))?;
        Ok(Self { fields, index })
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field(&self, id: &Identifier) -> Option<&FieldInfo> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.optionality.is_optional())
    }

    pub fn is_active(&self, value: &Value, id: &Identifier) -> bool {
        self.index.contains_key(id) && value.as_record().is_some_and(|r| r.contains(id))
    }

    /// Add an optional field with its default value. `Ok(false)` when the
    /// field was already active.
    pub fn activate_field(
        &self,
        ts: &TypeSystem,
        value: &mut ValueHolder,
        id: &Identifier,
    ) -> Result<bool, ModelError> {
        let field = self.optional_field(id)?;
        if record_of(value)?.contains(id) {
            return Ok(false);
        }
        let default = default_of(ts, &field.type_ref)?;
        record_mut(value)?.insert(field.id.clone(), default);
        Ok(true)
    }

    /// Remove an optional field. `Ok(false)` when it was not active.
    pub fn deactivate_field(
        &self,
        value: &mut ValueHolder,
        id: &Identifier,
    ) -> Result<bool, ModelError> {
        self.optional_field(id)?;
        if !record_of(value)?.contains(id) {
            return Ok(false);
        }
        record_mut(value)?.remove(id);
        Ok(true)
    }

    fn optional_field(&self, id: &Identifier) -> Result<&FieldInfo, ModelError> {
        let field = self.field(id).ok_or_else(|| ModelError::UnknownField {
            field: id.to_string(),
        })?;
        if !field.optionality.is_optional() {
            return Err(ModelError::FieldNotOptional {
                field: id.to_string(),
            });
        }
        Ok(field)
    }

    pub(super) fn create_value(&self, ts: &TypeSystem) -> Result<Value, TypeSystemError> {
        let mut record = RecordValue::new();
        for field in &self.fields {
            if field.optionality.is_active_by_default() {
                record.insert(field.id.clone(), default_of(ts, &field.type_ref)?);
            }
        }
        Ok(Value::Record(record))
    }

    pub(super) fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        let Value::Record(record) = value else {
            return false;
        };
        self.fields.iter().all(|field| match record.get(&field.id) {
            Some(holder) => value_fits(ts, &field.type_ref, holder),
            None => field.optionality.is_optional(),
        })
    }

    pub(super) fn compare(&self, ts: &TypeSystem, other: &TypeKind) -> SubtypeOrder {
        let TypeKind::Record(other) = other else {
            return SubtypeOrder::Unrelated;
        };
        compare_field_sets(ts, self.field_summaries(), other.field_summaries())
    }

    fn field_summaries(&self) -> Vec<FieldSummary<'_>> {
        self.fields
            .iter()
            .map(|f| FieldSummary {
                id: &f.id,
                type_ref: &f.type_ref,
                required: !f.optionality.is_optional(),
            })
            .collect()
    }

    /// Keep every declared field of `old` that can be adapted. Fields of a
    /// variant record are taken over as well.
    pub(super) fn adapt(
        &self,
        ts: &TypeSystem,
        old: &Value,
    ) -> Result<Option<Value>, TypeSystemError> {
        let old_fields = match old {
            Value::Record(record) => record,
            Value::Variant(variant) => &variant.fields,
            _ => return Ok(None),
        };
        let mut record = RecordValue::new();
        for field in &self.fields {
            match old_fields.get(&field.id) {
                Some(holder) => {
                    record.insert(field.id.clone(), adapt_to(ts, &field.type_ref, holder)?);
                }
                None if field.optionality.is_active_by_default() => {
                    record.insert(field.id.clone(), default_of(ts, &field.type_ref)?);
                }
                None => {}
            }
        }
        Ok(Some(Value::Record(record)))
    }
}

impl CompoundType for RecordType {
    fn num_children(&self, value: &ValueHolder) -> usize {
        value
            .as_record()
            .map_or(0, |record| active_fields(&self.fields, record).count())
    }

    fn child<'v>(&self, value: &'v ValueHolder, index: usize) -> Result<ChildRef<'v>, PathError> {
        let record = record_of(value)?;
        let (field, holder) = active_fields(&self.fields, record)
            .nth(index)
            .ok_or_else(|| out_of_range(index, self.num_children(value)))?;
        Ok(ChildRef {
            value: holder,
            step: PathStep::Field(field.id.clone()),
            type_ref: field.type_ref.clone(),
        })
    }

    fn child_mut<'v>(
        &self,
        value: &'v mut ValueHolder,
        index: usize,
    ) -> Result<ChildMut<'v>, PathError> {
        let count = self.num_children(value);
        let field = {
            let record = record_of(value)?;
            active_fields(&self.fields, record)
                .nth(index)
                .map(|(field, _)| field)
                .ok_or_else(|| out_of_range(index, count))?
        };
        let holder = record_mut(value)?
            .get_mut(&field.id)
            .ok_or_else(|| out_of_range(index, count))?;
        Ok(ChildMut {
            value: holder,
            step: PathStep::Field(field.id.clone()),
            type_ref: field.type_ref.clone(),
        })
    }

    fn child_index_from_step(&self, value: &ValueHolder, step: &PathStep) -> Option<usize> {
        let id = step.as_field()?;
        active_fields(&self.fields, value.as_record()?).position(|(field, _)| field.id == *id)
    }
}

// ============================================================================
// Helpers shared with records with variants
// ============================================================================

/// Declared fields present in `record`, in declaration order.
pub(super) fn active_fields<'f, 'v>(
    fields: &'f [FieldInfo],
    record: &'v RecordValue,
) -> impl Iterator<Item = (&'f FieldInfo, &'v ValueHolder)> {
    fields
        .iter()
        .filter_map(move |field| record.get(&field.id).map(|holder| (field, holder)))
}

pub(super) fn field_index<'a>(
    ids: impl Iterator<Item = &'a Identifier>,
) -> Result<FxHashMap<Identifier, usize>, TypeSystemError> {
    let mut index = FxHashMap::default();
    for (i, id) in ids.enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(TypeSystemError::DuplicateField {
                field: id.to_string(),
            });
        }
    }
    Ok(index)
}

pub(super) fn record_of(value: &Value) -> Result<&RecordValue, PathError> {
    value.as_record().ok_or_else(|| PathError::mismatch("record"))
}

fn record_mut(value: &mut ValueHolder) -> Result<&mut RecordValue, PathError> {
    record_of(value)?;
    match value.copy_contents_and_get_non_const() {
        Value::Record(record) => Ok(record),
        _ => Err(PathError::mismatch("record")),
    }
}

pub(super) struct FieldSummary<'a> {
    pub id: &'a Identifier,
    pub type_ref: &'a TypeRef,
    pub required: bool,
}

/// Compare two field lists by identifier.
///
/// A field only `mine` has makes `mine` more specific (`Subtype`), one only
/// `theirs` has makes it `Supertype`. Shared fields contribute their type
/// order plus the optionality order, where required is narrower than
/// optional. Any `Unrelated` field type makes the records unrelated.
pub(super) fn compare_field_sets(
    ts: &TypeSystem,
    mut mine: Vec<FieldSummary<'_>>,
    mut theirs: Vec<FieldSummary<'_>>,
) -> SubtypeOrder {
    mine.sort_by(|a, b| a.id.cmp(b.id));
    theirs.sort_by(|a, b| a.id.cmp(b.id));

    let mut order = SubtypeOrder::Equivalent;
    let (mut i, mut j) = (0, 0);
    while i < mine.len() || j < theirs.len() {
        let step = match (mine.get(i), theirs.get(j)) {
            (Some(a), Some(b)) if a.id == b.id => {
                let field_order = ts.compare_subtype(a.type_ref, b.type_ref);
                if field_order == SubtypeOrder::Unrelated {
                    return SubtypeOrder::Unrelated;
                }
                let optionality = match (a.required, b.required) {
                    (true, false) => SubtypeOrder::Subtype,
                    (false, true) => SubtypeOrder::Supertype,
                    _ => SubtypeOrder::Equivalent,
                };
                i += 1;
                j += 1;
                field_order.product(optionality)
            }
            (Some(a), Some(b)) if a.id < b.id => {
                i += 1;
                SubtypeOrder::Subtype
            }
            (Some(_), None) => {
                i += 1;
                SubtypeOrder::Subtype
            }
            _ => {
                j += 1;
                SubtypeOrder::Supertype
            }
        };
        order = order.product(step);
    }
    order
}
