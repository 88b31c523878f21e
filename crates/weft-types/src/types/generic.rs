// types/generic.rs
//
// Generic types wrap one type that may refer to their variable slots, and
// type variables are the placeholders for those slots.

use weft_identity::PathStep;

use super::{TypeKind, adapt_to, default_of, value_fits};
use crate::compound::{ChildMut, ChildRef, CompoundType, out_of_range};
use crate::errors::{ModelError, PathError, TypeSystemError};
use crate::subtype::SubtypeOrder;
use crate::type_ref::{SubstitutionIds, TypeRef};
use crate::value::{GenericValue, Value, ValueHolder};
use crate::TypeSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericType {
    wrapped_type: TypeRef,
    num_variables: usize,
    ids: SubstitutionIds,
}

impl GenericType {
    pub fn new(wrapped_type: TypeRef, num_variables: usize, ids: SubstitutionIds) -> Self {
        Self {
            wrapped_type,
            num_variables,
            ids,
        }
    }

    /// The wrapped type before any substitution.
    pub fn declared_wrapped_type(&self) -> &TypeRef {
        &self.wrapped_type
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// The wrapped type with `assignments` substituted.
    pub fn substituted(&self, assignments: &[Option<TypeRef>]) -> TypeRef {
        self.wrapped_type
            .substitute_type_variables(&self.ids, 0, assignments)
    }

    /// The wrapped type as instantiated by `value`.
    pub fn wrapped_type(&self, value: &Value) -> Option<TypeRef> {
        match value {
            Value::Generic(generic) => Some(self.substituted(&generic.assignments)),
            _ => None,
        }
    }

    pub fn is_any_type_variable_unassigned(&self, value: &Value) -> bool {
        match value {
            Value::Generic(generic) => {
                generic.assignments.len() < self.num_variables
                    || generic.assignments.iter().any(Option::is_none)
            }
            _ => true,
        }
    }

    /// Assign (or clear) variable `index` and rebuild the wrapped value for
    /// the newly substituted type, keeping whatever of the old value still
    /// fits. `Ok(false)` when the assignment is unchanged.
    pub fn instantiate_type_variable(
        &self,
        ts: &TypeSystem,
        value: &mut ValueHolder,
        index: usize,
        assignment: Option<TypeRef>,
    ) -> Result<bool, ModelError> {
        if index >= self.num_variables {
            return Err(TypeSystemError::TypeVariableOutOfRange {
                index,
                count: self.num_variables,
            }
            .into());
        }
        let Value::Generic(current) = &**value else {
            return Err(PathError::mismatch("generic").into());
        };
        if current.assignments.get(index).cloned().flatten() == assignment {
            return Ok(false);
        }
        let mut assignments = current.assignments.clone();
        assignments.resize(self.num_variables, None);
        assignments[index] = assignment;

        let wrapped = adapt_to(ts, &self.substituted(&assignments), &current.wrapped)?;
        *value = ValueHolder::new(Value::Generic(GenericValue {
            assignments,
            wrapped,
        }));
        Ok(true)
    }

    pub(super) fn create_value(&self, ts: &TypeSystem) -> Result<Value, TypeSystemError> {
        Ok(Value::Generic(GenericValue {
            assignments: vec![None; self.num_variables],
            wrapped: default_of(ts, &self.wrapped_type)?,
        }))
    }

    pub(super) fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        let Value::Generic(generic) = value else {
            return false;
        };
        generic.assignments.len() == self.num_variables
            && value_fits(ts, &self.substituted(&generic.assignments), &generic.wrapped)
    }

    pub(super) fn compare(&self, ts: &TypeSystem, other: &TypeKind) -> SubtypeOrder {
        let TypeKind::Generic(other) = other else {
            return SubtypeOrder::Unrelated;
        };
        if self.num_variables != other.num_variables {
            return SubtypeOrder::Disjoint;
        }
        ts.compare_subtype(&self.wrapped_type, &other.wrapped_type)
    }

    pub(super) fn adapt(
        &self,
        ts: &TypeSystem,
        old: &Value,
    ) -> Result<Option<Value>, TypeSystemError> {
        let Value::Generic(old) = old else {
            return Ok(None);
        };
        let mut assignments = old.assignments.clone();
        assignments.resize(self.num_variables, None);
        let wrapped = adapt_to(ts, &self.substituted(&assignments), &old.wrapped)?;
        Ok(Some(Value::Generic(GenericValue {
            assignments,
            wrapped,
        })))
    }
}

impl CompoundType for GenericType {
    fn num_children(&self, value: &ValueHolder) -> usize {
        usize::from(matches!(**value, Value::Generic(_)))
    }

    fn child<'v>(&self, value: &'v ValueHolder, index: usize) -> Result<ChildRef<'v>, PathError> {
        let Value::Generic(generic) = &**value else {
            return Err(PathError::mismatch("generic"));
        };
        if index != 0 {
            return Err(out_of_range(index, 1));
        }
        Ok(ChildRef {
            value: &generic.wrapped,
            step: PathStep::Index(0),
            type_ref: self.substituted(&generic.assignments),
        })
    }

    fn child_mut<'v>(
        &self,
        value: &'v mut ValueHolder,
        index: usize,
    ) -> Result<ChildMut<'v>, PathError> {
        if !matches!(**value, Value::Generic(_)) {
            return Err(PathError::mismatch("generic"));
        }
        if index != 0 {
            return Err(out_of_range(index, 1));
        }
        let Value::Generic(generic) = value.copy_contents_and_get_non_const() else {
            return Err(PathError::mismatch("generic"));
        };
        let type_ref = self.substituted(&generic.assignments);
        Ok(ChildMut {
            value: &mut generic.wrapped,
            step: PathStep::Index(0),
            type_ref,
        })
    }

    fn child_index_from_step(&self, value: &ValueHolder, step: &PathStep) -> Option<usize> {
        (self.num_children(value) == 1 && step.as_index()? == 0).then_some(0)
    }
}

/// Placeholder for variable `index` of the generic `level` layers out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeVariableType {
    pub index: usize,
    pub level: usize,
}

impl TypeVariableType {
    pub(super) fn compare(&self, other: &TypeKind) -> SubtypeOrder {
        match other {
            TypeKind::TypeVariable(other) if other == self => SubtypeOrder::Equivalent,
            _ => SubtypeOrder::Unrelated,
        }
    }
}
