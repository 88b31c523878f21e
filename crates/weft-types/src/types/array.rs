// types/array.rs
//
// Homogeneous arrays with a size range.

use weft_identity::PathStep;

use super::{TypeKind, adapt_to, default_of};
use crate::compound::{ChildMut, ChildRef, CompoundType, out_of_range};
use crate::errors::{ModelError, PathError, TypeSystemError};
use crate::subtype::{Range, SubtypeOrder};
use crate::type_ref::TypeRef;
use crate::value::{ArrayValue, Value, ValueHolder};
use crate::TypeSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    entry_type: TypeRef,
    size_range: Range<usize>,
    initial_size: usize,
}

impl ArrayType {
    pub fn new(
        entry_type: TypeRef,
        size_range: Range<usize>,
        initial_size: usize,
    ) -> Result<Self, TypeSystemError> {
        if let Some(max) = size_range.max
            && size_range.min > max
        {
            return Err(TypeSystemError::InvalidRange {
                min: size_range.min.to_string(),
                max: max.to_string(),
            });
        }
        if !size_range.contains(initial_size) {
            return Err(TypeSystemError::InvalidDefault {
                constructor: "Array".to_string(),
                reason: format!("initial size {initial_size} is outside {size_range}"),
            });
        }
        Ok(Self {
            entry_type,
            size_range,
            initial_size,
        })
    }

    pub fn entry_type(&self) -> &TypeRef {
        &self.entry_type
    }

    pub fn size_range(&self) -> Range<usize> {
        self.size_range
    }

    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Insert `count` default entries before `index`.
    pub fn insert_entries(
        &self,
        ts: &TypeSystem,
        value: &mut ValueHolder,
        index: usize,
        count: usize,
    ) -> Result<bool, ModelError> {
        let len = array_of(value)?.len();
        if index > len {
            return Err(ModelError::IndexOutOfRange { index, len });
        }
        self.check_size(len.saturating_add(count))?;
        if count == 0 {
            return Ok(false);
        }
        let entry = default_of(ts, &self.entry_type)?;
        let entries = &mut array_mut(value)?.0;
        entries.splice(index..index, std::iter::repeat_n(entry, count));
        Ok(true)
    }

    /// Remove the `count` entries starting at `index`.
    pub fn remove_entries(
        &self,
        value: &mut ValueHolder,
        index: usize,
        count: usize,
    ) -> Result<bool, ModelError> {
        let len = array_of(value)?.len();
        let end = index.saturating_add(count);
        if end > len {
            return Err(ModelError::IndexOutOfRange { index: end, len });
        }
        self.check_size(len - count)?;
        if count == 0 {
            return Ok(false);
        }
        array_mut(value)?.0.drain(index..end);
        Ok(true)
    }

    /// Grow with default entries or truncate to `size`.
    pub fn set_size(
        &self,
        ts: &TypeSystem,
        value: &mut ValueHolder,
        size: usize,
    ) -> Result<bool, ModelError> {
        let len = array_of(value)?.len();
        if size > len {
            self.insert_entries(ts, value, len, size - len)
        } else {
            self.remove_entries(value, size, len - size)
        }
    }

    fn check_size(&self, size: usize) -> Result<(), ModelError> {
        if self.size_range.contains(size) {
            Ok(())
        } else {
            Err(ModelError::ArraySizeOutOfRange {
                size,
                range: self.size_range.to_string(),
            })
        }
    }

    pub(super) fn create_value(&self, ts: &TypeSystem) -> Result<Value, TypeSystemError> {
        // Entries start out sharing one default value.
        let entry = default_of(ts, &self.entry_type)?;
        Ok(Value::Array(ArrayValue(vec![entry; self.initial_size])))
    }

    pub(super) fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        let Value::Array(array) = value else {
            return false;
        };
        if !self.size_range.contains(array.len()) {
            return false;
        }
        if array.is_empty() {
            return true;
        }
        let Ok(entry_type) = ts.resolve(&self.entry_type) else {
            return false;
        };
        array.0.iter().all(|entry| entry_type.is_valid_value(ts, entry))
    }

    /// Product of the entry order and the size order. Unrelated or disjoint
    /// entries still share the empty array when both sizes allow it.
    pub(super) fn compare(&self, ts: &TypeSystem, other: &TypeKind) -> SubtypeOrder {
        let TypeKind::Array(other) = other else {
            return SubtypeOrder::Unrelated;
        };
        compare_arrays(
            ts.compare_subtype(&self.entry_type, &other.entry_type),
            &self.size_range,
            &other.size_range,
        )
    }

    pub(super) fn adapt(
        &self,
        ts: &TypeSystem,
        old: &Value,
    ) -> Result<Option<Value>, TypeSystemError> {
        let Value::Array(old) = old else {
            return Ok(None);
        };
        let keep = self
            .size_range
            .max
            .map_or(old.len(), |max| old.len().min(max));
        let mut entries = old.0[..keep]
            .iter()
            .map(|entry| adapt_to(ts, &self.entry_type, entry))
            .collect::<Result<Vec<_>, _>>()?;
        if entries.len() < self.size_range.min {
            let entry = default_of(ts, &self.entry_type)?;
            entries.resize(self.size_range.min, entry);
        }
        Ok(Some(Value::Array(ArrayValue(entries))))
    }
}

pub(crate) fn compare_arrays(
    entries: SubtypeOrder,
    mine: &Range<usize>,
    theirs: &Range<usize>,
) -> SubtypeOrder {
    if matches!(entries, SubtypeOrder::Unrelated | SubtypeOrder::Disjoint) {
        return if mine.contains(0) && theirs.contains(0) {
            SubtypeOrder::Intersecting
        } else {
            SubtypeOrder::Disjoint
        };
    }
    entries.product(mine.compare(theirs))
}

impl CompoundType for ArrayType {
    fn num_children(&self, value: &ValueHolder) -> usize {
        value.as_array().map_or(0, ArrayValue::len)
    }

    fn child<'v>(&self, value: &'v ValueHolder, index: usize) -> Result<ChildRef<'v>, PathError> {
        let array = array_of(value)?;
        let entry = array
            .get(index)
            .ok_or_else(|| out_of_range(index, array.len()))?;
        Ok(ChildRef {
            value: entry,
            step: PathStep::Index(index),
            type_ref: self.entry_type.clone(),
        })
    }

    fn child_mut<'v>(
        &self,
        value: &'v mut ValueHolder,
        index: usize,
    ) -> Result<ChildMut<'v>, PathError> {
        let len = array_of(value)?.len();
        if index >= len {
            return Err(out_of_range(index, len));
        }
        let entry = array_mut(value)?
            .0
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        Ok(ChildMut {
            value: entry,
            step: PathStep::Index(index),
            type_ref: self.entry_type.clone(),
        })
    }

    fn child_index_from_step(&self, value: &ValueHolder, step: &PathStep) -> Option<usize> {
        let index = step.as_index()?;
        (index < self.num_children(value)).then_some(index)
    }
}

fn array_of(value: &Value) -> Result<&ArrayValue, PathError> {
    value.as_array().ok_or_else(|| PathError::mismatch("array"))
}

fn array_mut(value: &mut ValueHolder) -> Result<&mut ArrayValue, PathError> {
    array_of(value)?;
    match value.copy_contents_and_get_non_const() {
        Value::Array(array) => Ok(array),
        _ => Err(PathError::mismatch("array")),
    }
}
