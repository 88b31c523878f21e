// type_ref/substitution.rs
//
// Type variable substitution for generic instantiation.

use std::sync::Arc;

use super::{TypeConstructorArguments, TypeConstructorId, TypeRef};
use crate::value::ValueHolder;

/// The constructor ids substitution needs to recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionIds {
    pub generic: TypeConstructorId,
    pub type_var: TypeConstructorId,
}

impl TypeRef {
    /// Replace the type variables that refer to the generic `level` layers
    /// out from this ref.
    ///
    /// `TypeVar[index, level]` counts enclosing generics from the inside, so
    /// the level a variable must carry to match grows by one for every
    /// nested `Generic` passed on the way down. Unassigned slots are left as
    /// they are. When nothing changes the original ref is returned.
    pub fn substitute_type_variables(
        &self,
        ids: &SubstitutionIds,
        level: usize,
        assignments: &[Option<TypeRef>],
    ) -> TypeRef {
        if assignments.iter().all(Option::is_none) {
            return self.clone();
        }
        self.substitute_at(ids, level, assignments)
            .unwrap_or_else(|| self.clone())
    }

    /// Like `substitute_type_variables`, but `None` when unchanged.
    fn substitute_at(
        &self,
        ids: &SubstitutionIds,
        level: usize,
        assignments: &[Option<TypeRef>],
    ) -> Option<TypeRef> {
        let TypeRef::Constructed(id, args) = self else {
            return None;
        };

        if *id == ids.type_var {
            let (index, var_level) = type_variable_args(&args.value_args)?;
            if var_level != level {
                return None;
            }
            return assignments.get(index).cloned().flatten();
        }

        let inner_level = if *id == ids.generic { level + 1 } else { level };
        let mut changed = false;
        let type_args = args
            .type_args
            .iter()
            .map(|arg| match arg.substitute_at(ids, inner_level, assignments) {
                Some(new_arg) => {
                    changed = true;
                    new_arg
                }
                None => arg.clone(),
            })
            .collect();
        if !changed {
            return None;
        }
        Some(TypeRef::Constructed(
            id.clone(),
            Arc::new(TypeConstructorArguments {
                type_args,
                value_args: args.value_args.clone(),
            }),
        ))
    }
}

/// Decode `[index, level]` from a type variable's value arguments.
pub(crate) fn type_variable_args(value_args: &[ValueHolder]) -> Option<(usize, usize)> {
    let [index, level] = value_args else {
        return None;
    };
    let index = usize::try_from(index.as_int()?).ok()?;
    let level = usize::try_from(level.as_int()?).ok()?;
    Some((index, level))
}
