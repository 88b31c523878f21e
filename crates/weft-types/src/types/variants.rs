// types/variants.rs
//
// Records with variants: one tag is selected at a time and only the fields
// associated with it are active.

use rustc_hash::FxHashMap;
use weft_identity::{Identifier, PathStep};

use super::record::{FieldSummary, compare_field_sets, field_index};
use super::{TypeKind, adapt_to, default_of, value_fits};
use crate::compound::{ChildMut, ChildRef, CompoundType, out_of_range};
use crate::errors::{ModelError, PathError, TypeSystemError};
use crate::subtype::SubtypeOrder;
use crate::type_ref::TypeRef;
use crate::value::{RecordValue, Value, ValueHolder, VariantValue};
use crate::TypeSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFieldInfo {
    pub id: Identifier,
    pub type_ref: TypeRef,
    /// Tags the field belongs to. Empty means every tag.
    pub tags: Vec<Identifier>,
}

impl VariantFieldInfo {
    pub fn applies_to(&self, tag: &Identifier) -> bool {
        self.tags.is_empty() || self.tags.contains(tag)
    }
}

#[derive(Debug, Clone)]
pub struct RecordWithVariantsType {
    tags: Vec<Identifier>,
    tag_index: FxHashMap<Identifier, usize>,
    default_tag: usize,
    fields: Vec<VariantFieldInfo>,
    field_index: FxHashMap<Identifier, usize>,
}

impl RecordWithVariantsType {
    pub fn new(
        tags: Vec<Identifier>,
        default_tag: usize,
        fields: Vec<VariantFieldInfo>,
    ) -> Result<Self, TypeSystemError> {
        let mut tag_index = FxHashMap::default();
        for (i, tag) in tags.iter().enumerate() {
            if tag_index.insert(tag.clone(), i).is_some() {
                return Err(TypeSystemError::DuplicateEnumValue {
                    value: tag.to_string(),
                });
            }
        }
        if default_tag >= tags.len() {
            return Err(TypeSystemError::InvalidDefault {
                constructor: "RecordWithVariants".to_string(),
                reason: format!("default tag {default_tag} but only {} tags", tags.len()),
            });
        }
        if let Some(tag) = fields
            .iter()
            .flat_map(|f| &f.tags)
            .find(|tag| !tag_index.contains_key(*tag))
        {
            return Err(TypeSystemError::UnknownTag {
                tag: tag.to_string(),
            });
        }
        let field_index = field_index(fields.iter().map(|f| &f.id))?;
        Ok(Self {
            tags,
            tag_index,
            default_tag,
            fields,
            field_index,
        })
    }

    pub fn tags(&self) -> &[Identifier] {
        &self.tags
    }

    pub fn default_tag(&self) -> &Identifier {
        &self.tags[self.default_tag]
    }

    pub fn fields(&self) -> &[VariantFieldInfo] {
        &self.fields
    }

    pub fn field(&self, id: &Identifier) -> Option<&VariantFieldInfo> {
        self.field_index.get(id).map(|&i| &self.fields[i])
    }

    pub fn tag_of<'v>(&self, value: &'v Value) -> Option<&'v Identifier> {
        match value {
            Value::Variant(variant) => Some(&variant.tag),
            _ => None,
        }
    }

    pub fn fields_for_tag<'a>(
        &'a self,
        tag: &'a Identifier,
    ) -> impl Iterator<Item = &'a VariantFieldInfo> {
        self.fields.iter().filter(move |f| f.applies_to(tag))
    }

    /// Switch to `tag`. Fields that no longer apply are dropped, newly
    /// applying fields get defaults and fields shared by both tags keep their
    /// values. `Ok(false)` when `tag` is already selected.
    pub fn select_tag(
        &self,
        ts: &TypeSystem,
        value: &mut ValueHolder,
        tag: &Identifier,
    ) -> Result<bool, ModelError> {
        let Some(&tag_index) = self.tag_index.get(tag) else {
            return Err(ModelError::TagNotFound {
                tag: tag.to_string(),
            });
        };
        let current = variant_of(value)?;
        if current.tag == *tag {
            return Ok(false);
        }
        let new_tag = &self.tags[tag_index];
        let mut fields = RecordValue::new();
        for field in self.fields_for_tag(new_tag) {
            let kept = current
                .fields
                .get(&field.id)
                .filter(|_| field.applies_to(&current.tag));
            let holder = match kept {
                Some(holder) => holder.clone(),
                None => default_of(ts, &field.type_ref)?,
            };
            fields.insert(field.id.clone(), holder);
        }
        *value = ValueHolder::new(Value::Variant(VariantValue {
            tag: new_tag.clone(),
            fields,
        }));
        Ok(true)
    }

    /// Fields of `value` that switching to `tag` would remove.
    pub fn fields_removed_by_change_of_branch(
        &self,
        value: &Value,
        tag: &Identifier,
    ) -> Vec<Identifier> {
        let Value::Variant(variant) = value else {
            return Vec::new();
        };
        active_fields(&self.fields, variant)
            .filter(|(field, _)| !field.applies_to(tag))
            .map(|(field, _)| field.id.clone())
            .collect()
    }

    fn value_for_tag(
        &self,
        ts: &TypeSystem,
        tag: &Identifier,
        old_fields: Option<&RecordValue>,
    ) -> Result<Value, TypeSystemError> {
        let mut fields = RecordValue::new();
        for field in self.fields_for_tag(tag) {
            let holder = match old_fields.and_then(|old| old.get(&field.id)) {
                Some(old) => adapt_to(ts, &field.type_ref, old)?,
                None => default_of(ts, &field.type_ref)?,
            };
            fields.insert(field.id.clone(), holder);
        }
        Ok(Value::Variant(VariantValue {
            tag: tag.clone(),
            fields,
        }))
    }

    pub(super) fn create_value(&self, ts: &TypeSystem) -> Result<Value, TypeSystemError> {
        self.value_for_tag(ts, self.default_tag(), None)
    }

    pub(super) fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        let Value::Variant(variant) = value else {
            return false;
        };
        if !self.tag_index.contains_key(&variant.tag) {
            return false;
        }
        self.fields_for_tag(&variant.tag)
            .all(|field| match variant.fields.get(&field.id) {
                Some(holder) => value_fits(ts, &field.type_ref, holder),
                None => false,
            })
    }

    /// Field comparison as for plain records. The tag sets must also match,
    /// otherwise related fields only make the types intersect.
    pub(super) fn compare(&self, ts: &TypeSystem, other: &TypeKind) -> SubtypeOrder {
        let TypeKind::RecordWithVariants(other) = other else {
            return SubtypeOrder::Unrelated;
        };
        let fields = compare_field_sets(ts, self.field_summaries(), other.field_summaries());
        let same_tags = self.tags.len() == other.tags.len()
            && self.tags.iter().all(|tag| other.tag_index.contains_key(tag));
        match (same_tags, fields.is_related()) {
            (true, _) => fields,
            (false, true) => SubtypeOrder::Intersecting,
            (false, false) => SubtypeOrder::Unrelated,
        }
    }

    fn field_summaries(&self) -> Vec<FieldSummary<'_>> {
        self.fields
            .iter()
            .map(|f| FieldSummary {
                id: &f.id,
                type_ref: &f.type_ref,
                required: f.tags.is_empty(),
            })
            .collect()
    }

    pub(super) fn adapt(
        &self,
        ts: &TypeSystem,
        old: &Value,
    ) -> Result<Option<Value>, TypeSystemError> {
        let (tag, old_fields) = match old {
            Value::Variant(variant) => match self.tag_index.get(&variant.tag) {
                Some(&i) => (&self.tags[i], &variant.fields),
                None => (self.default_tag(), &variant.fields),
            },
            Value::Record(record) => (self.default_tag(), record),
            _ => return Ok(None),
        };
        self.value_for_tag(ts, tag, Some(old_fields)).map(Some)
    }
}

impl CompoundType for RecordWithVariantsType {
    fn num_children(&self, value: &ValueHolder) -> usize {
        match &**value {
            Value::Variant(variant) => active_fields(&self.fields, variant).count(),
            _ => 0,
        }
    }

    fn child<'v>(&self, value: &'v ValueHolder, index: usize) -> Result<ChildRef<'v>, PathError> {
        let variant = variant_of(value)?;
        let (field, holder) = active_fields(&self.fields, variant)
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
            let variant = variant_of(value)?;
            active_fields(&self.fields, variant)
                .nth(index)
                .map(|(field, _)| field)
                .ok_or_else(|| out_of_range(index, count))?
        };
        let Value::Variant(variant) = value.copy_contents_and_get_non_const() else {
            return Err(PathError::mismatch("variant record"));
        };
        let holder = variant
            .fields
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
        let Value::Variant(variant) = &**value else {
            return None;
        };
        active_fields(&self.fields, variant).position(|(field, _)| field.id == *id)
    }
}

/// Fields of the selected tag present in `variant`, in declaration order.
fn active_fields<'f, 'v>(
    fields: &'f [VariantFieldInfo],
    variant: &'v VariantValue,
) -> impl Iterator<Item = (&'f VariantFieldInfo, &'v ValueHolder)> {
    fields.iter().filter_map(move |field| {
        if !field.applies_to(&variant.tag) {
            return None;
        }
        variant.fields.get(&field.id).map(|holder| (field, holder))
    })
}

fn variant_of(value: &Value) -> Result<&VariantValue, PathError> {
    match value {
        Value::Variant(variant) => Ok(variant),
        _ => Err(PathError::mismatch("variant record")),
    }
}
