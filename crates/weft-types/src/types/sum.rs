// types/sum.rs
//
// Sum types: mutually exclusive alternatives tagged with the chosen summand.

use weft_identity::PathStep;

use super::{Type, TypeKind, adapt_to, default_of, value_fits};
use crate::compound::{ChildMut, ChildRef, CompoundType, out_of_range};
use crate::errors::{ModelError, PathError, TypeSystemError};
use crate::subtype::SubtypeOrder;
use crate::type_ref::TypeRef;
use crate::value::{SumValue, Value, ValueHolder};
use crate::TypeSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumType {
    summands: Vec<TypeRef>,
    default_summand: usize,
}

impl SumType {
    pub fn new(summands: Vec<TypeRef>, default_summand: usize) -> Result<Self, TypeSystemError> {
        if default_summand >= summands.len() {
            return Err(TypeSystemError::InvalidDefault {
                constructor: "Sum".to_string(),
                reason: format!(
                    "default summand {default_summand} but only {} summands",
                    summands.len()
                ),
            });
        }
        Ok(Self {
            summands,
            default_summand,
        })
    }

    pub fn summands(&self) -> &[TypeRef] {
        &self.summands
    }

    pub fn default_summand(&self) -> usize {
        self.default_summand
    }

    pub fn summand_of(&self, value: &Value) -> Option<usize> {
        match value {
            Value::Sum(sum) if sum.summand < self.summands.len() => Some(sum.summand),
            _ => None,
        }
    }

    /// Switch to summand `index`, keeping the current inner value when the
    /// new summand accepts it.
    pub fn select_summand(
        &self,
        ts: &TypeSystem,
        value: &mut ValueHolder,
        index: usize,
    ) -> Result<bool, ModelError> {
        let summand_type = self
            .summands
            .get(index)
            .ok_or(ModelError::SummandOutOfRange {
                index,
                count: self.summands.len(),
            })?;
        let Value::Sum(current) = &**value else {
            return Err(PathError::mismatch("sum").into());
        };
        if current.summand == index {
            return Ok(false);
        }
        let inner = if value_fits(ts, summand_type, &current.value) {
            current.value.clone()
        } else {
            default_of(ts, summand_type)?
        };
        *value = ValueHolder::new(Value::Sum(SumValue {
            summand: index,
            value: inner,
        }));
        Ok(true)
    }

    /// Wrap a plain value into the first summand that accepts it.
    pub fn wrap(&self, ts: &TypeSystem, value: &ValueHolder) -> Option<ValueHolder> {
        let summand = self
            .summands
            .iter()
            .position(|summand| value_fits(ts, summand, value))?;
        Some(ValueHolder::new(Value::Sum(SumValue {
            summand,
            value: value.clone(),
        })))
    }

    pub(super) fn create_value(&self, ts: &TypeSystem) -> Result<Value, TypeSystemError> {
        Ok(Value::Sum(SumValue {
            summand: self.default_summand,
            value: default_of(ts, &self.summands[self.default_summand])?,
        }))
    }

    pub(super) fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        let Value::Sum(sum) = value else {
            return false;
        };
        self.summands
            .get(sum.summand)
            .is_some_and(|summand| value_fits(ts, summand, &sum.value))
    }

    pub(super) fn compare(&self, ts: &TypeSystem, other: &Type) -> SubtypeOrder {
        let TypeKind::Sum(other_sum) = other.kind() else {
            return self.compare_with_plain(ts, other.type_ref());
        };
        let covered = |from: &[TypeRef], by: &[TypeRef]| {
            from.iter()
                .all(|a| by.iter().any(|b| ts.is_subtype(a, b)))
        };
        let mine_covered = covered(&self.summands, &other_sum.summands);
        let theirs_covered = covered(&other_sum.summands, &self.summands);
        match (mine_covered, theirs_covered) {
            (true, true) => SubtypeOrder::Equivalent,
            (true, false) => SubtypeOrder::Subtype,
            (false, true) => SubtypeOrder::Supertype,
            (false, false) if self.any_related(ts, &other_sum.summands) => {
                SubtypeOrder::Intersecting
            }
            (false, false) => SubtypeOrder::Disjoint,
        }
    }

    /// A plain type below one of the summands is contained in the sum.
    fn compare_with_plain(&self, ts: &TypeSystem, plain: &TypeRef) -> SubtypeOrder {
        if self.summands.iter().any(|s| ts.is_subtype(plain, s)) {
            SubtypeOrder::Supertype
        } else if self.any_related(ts, std::slice::from_ref(plain)) {
            SubtypeOrder::Intersecting
        } else {
            SubtypeOrder::Unrelated
        }
    }

    fn any_related(&self, ts: &TypeSystem, others: &[TypeRef]) -> bool {
        self.summands
            .iter()
            .any(|a| others.iter().any(|b| ts.is_related_type(a, b)))
    }

    pub(super) fn adapt(
        &self,
        ts: &TypeSystem,
        old: &Value,
    ) -> Result<Option<Value>, TypeSystemError> {
        if let Value::Sum(sum) = old
            && let Some(summand_type) = self.summands.get(sum.summand)
        {
            return Ok(Some(Value::Sum(SumValue {
                summand: sum.summand,
                value: adapt_to(ts, summand_type, &sum.value)?,
            })));
        }
        let plain = ValueHolder::new(old.clone());
        Ok(self.wrap(ts, &plain).map(ValueHolder::into_value))
    }
}

impl CompoundType for SumType {
    fn num_children(&self, value: &ValueHolder) -> usize {
        usize::from(self.summand_of(value).is_some())
    }

    fn child<'v>(&self, value: &'v ValueHolder, index: usize) -> Result<ChildRef<'v>, PathError> {
        let Value::Sum(sum) = &**value else {
            return Err(PathError::mismatch("sum"));
        };
        let summand_type = self
            .summands
            .get(sum.summand)
            .filter(|_| index == 0)
            .ok_or_else(|| out_of_range(index, self.num_children(value)))?;
        Ok(ChildRef {
            value: &sum.value,
            step: PathStep::Index(sum.summand),
            type_ref: summand_type.clone(),
        })
    }

    fn child_mut<'v>(
        &self,
        value: &'v mut ValueHolder,
        index: usize,
    ) -> Result<ChildMut<'v>, PathError> {
        let count = self.num_children(value);
        if !matches!(**value, Value::Sum(_)) {
            return Err(PathError::mismatch("sum"));
        }
        if index >= count {
            return Err(out_of_range(index, count));
        }
        let Value::Sum(sum) = value.copy_contents_and_get_non_const() else {
            return Err(PathError::mismatch("sum"));
        };
        let type_ref = self
            .summands
            .get(sum.summand)
            .ok_or_else(|| out_of_range(index, count))?
            .clone();
        Ok(ChildMut {
            value: &mut sum.value,
            step: PathStep::Index(sum.summand),
            type_ref,
        })
    }

    fn child_index_from_step(&self, value: &ValueHolder, step: &PathStep) -> Option<usize> {
        let selected = self.summand_of(value)?;
        (step.as_index()? == selected).then_some(0)
    }
}
