// types/tuple.rs

use weft_identity::PathStep;

use super::{TypeKind, adapt_to, default_of, value_fits};
use crate::compound::{ChildMut, ChildRef, CompoundType, out_of_range};
use crate::errors::{PathError, TypeSystemError};
use crate::subtype::SubtypeOrder;
use crate::type_ref::TypeRef;
use crate::value::{TupleValue, Value, ValueHolder};
use crate::TypeSystem;

/// Fixed-arity heterogeneous positional values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleType {
    elements: Vec<TypeRef>,
}

impl TupleType {
    pub fn new(elements: Vec<TypeRef>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[TypeRef] {
        &self.elements
    }

    pub(super) fn create_value(&self, ts: &TypeSystem) -> Result<Value, TypeSystemError> {
        let elements = self
            .elements
            .iter()
            .map(|element| default_of(ts, element))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Tuple(TupleValue(elements)))
    }

    pub(super) fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        let Value::Tuple(TupleValue(elements)) = value else {
            return false;
        };
        elements.len() == self.elements.len()
            && self
                .elements
                .iter()
                .zip(elements)
                .all(|(type_ref, element)| value_fits(ts, type_ref, element))
    }

    pub(super) fn compare(&self, ts: &TypeSystem, other: &TypeKind) -> SubtypeOrder {
        let TypeKind::Tuple(other) = other else {
            return SubtypeOrder::Unrelated;
        };
        if self.elements.len() != other.elements.len() {
            return SubtypeOrder::Disjoint;
        }
        let mut order = SubtypeOrder::Equivalent;
        for (mine, theirs) in self.elements.iter().zip(&other.elements) {
            let element = ts.compare_subtype(mine, theirs);
            if element == SubtypeOrder::Unrelated {
                return SubtypeOrder::Unrelated;
            }
            order = order.product(element);
        }
        order
    }

    pub(super) fn adapt(
        &self,
        ts: &TypeSystem,
        old: &Value,
    ) -> Result<Option<Value>, TypeSystemError> {
        let Value::Tuple(TupleValue(old)) = old else {
            return Ok(None);
        };
        let elements = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, type_ref)| match old.get(i) {
                Some(element) => adapt_to(ts, type_ref, element),
                None => default_of(ts, type_ref),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Value::Tuple(TupleValue(elements))))
    }
}

impl CompoundType for TupleType {
    fn num_children(&self, value: &ValueHolder) -> usize {
        match &**value {
            Value::Tuple(TupleValue(elements)) => elements.len(),
            _ => 0,
        }
    }

    fn child<'v>(&self, value: &'v ValueHolder, index: usize) -> Result<ChildRef<'v>, PathError> {
        let Value::Tuple(TupleValue(elements)) = &**value else {
            return Err(PathError::mismatch("tuple"));
        };
        let (element, type_ref) = elements
            .get(index)
            .zip(self.elements.get(index))
            .ok_or_else(|| out_of_range(index, elements.len()))?;
        Ok(ChildRef {
            value: element,
            step: PathStep::Index(index),
            type_ref: type_ref.clone(),
        })
    }

    fn child_mut<'v>(
        &self,
        value: &'v mut ValueHolder,
        index: usize,
    ) -> Result<ChildMut<'v>, PathError> {
        if !matches!(**value, Value::Tuple(_)) {
            return Err(PathError::mismatch("tuple"));
        }
        let count = self.num_children(value);
        let type_ref = self
            .elements
            .get(index)
            .filter(|_| index < count)
            .ok_or_else(|| out_of_range(index, count))?;
        let Value::Tuple(TupleValue(elements)) = value.copy_contents_and_get_non_const() else {
            return Err(PathError::mismatch("tuple"));
        };
        let element = elements
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, count))?;
        Ok(ChildMut {
            value: element,
            step: PathStep::Index(index),
            type_ref: type_ref.clone(),
        })
    }

    fn child_index_from_step(&self, value: &ValueHolder, step: &PathStep) -> Option<usize> {
        let index = step.as_index()?;
        (index < self.num_children(value)).then_some(index)
    }
}
