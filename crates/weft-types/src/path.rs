// src/path.rs
//! Following a [`Path`] from a root value down to a nested value.

use std::sync::Arc;

use weft_identity::Path;

use crate::compound::CompoundType;
use crate::errors::PathError;
use crate::type_ref::TypeRef;
use crate::types::Type;
use crate::value::ValueHolder;
use crate::TypeSystem;

/// The value at `path` below `value` (of type `type_ref`), with its type.
pub fn follow_path<'v>(
    ts: &TypeSystem,
    type_ref: &TypeRef,
    value: &'v ValueHolder,
    path: &Path,
) -> Result<(&'v ValueHolder, TypeRef), PathError> {
    check_depth(ts, path)?;
    let mut current = value;
    let mut current_type = type_ref.clone();
    for (step_index, step) in path.iter().enumerate() {
        let ty = resolve_step(ts, &current_type, step_index, path)?;
        let compound = compound_of(&ty, step_index, path)?;
        let index = compound
            .child_index_from_step(current, step)
            .ok_or_else(|| step_not_found(step_index, path))?;
        let child = compound.child(current, index)?;
        current = child.value;
        current_type = child.type_ref;
    }
    Ok((current, current_type))
}

/// Like [`follow_path`], but every holder on the way is made unique so the
/// returned slot can be written.
pub fn follow_path_mut<'v>(
    ts: &TypeSystem,
    type_ref: &TypeRef,
    value: &'v mut ValueHolder,
    path: &Path,
) -> Result<(&'v mut ValueHolder, TypeRef), PathError> {
    check_depth(ts, path)?;
    let mut current = value;
    let mut current_type = type_ref.clone();
    for (step_index, step) in path.iter().enumerate() {
        let ty = resolve_step(ts, &current_type, step_index, path)?;
        let compound = compound_of(&ty, step_index, path)?;
        let index = compound
            .child_index_from_step(current, step)
            .ok_or_else(|| step_not_found(step_index, path))?;
        let child = compound.child_mut(current, index)?;
        current = child.value;
        current_type = child.type_ref;
    }
    Ok((current, current_type))
}

pub fn try_follow_path<'v>(
    ts: &TypeSystem,
    type_ref: &TypeRef,
    value: &'v ValueHolder,
    path: &Path,
) -> Option<(&'v ValueHolder, TypeRef)> {
    follow_path(ts, type_ref, value, path).ok()
}

fn check_depth(ts: &TypeSystem, path: &Path) -> Result<(), PathError> {
    let limit = ts.config().max_path_depth;
    if path.len() > limit {
        return Err(PathError::TooDeep {
            depth: path.len(),
            limit,
        });
    }
    Ok(())
}

fn resolve_step(
    ts: &TypeSystem,
    type_ref: &TypeRef,
    step_index: usize,
    path: &Path,
) -> Result<Arc<Type>, PathError> {
    ts.resolve(type_ref)
        .map_err(|cause| PathError::UnresolvedType {
            step_index,
            path: path.to_string(),
            cause: Box::new(cause),
        })
}

fn compound_of<'t>(
    ty: &'t Type,
    step_index: usize,
    path: &Path,
) -> Result<&'t dyn CompoundType, PathError> {
    ty.as_compound().ok_or_else(|| PathError::NotCompound {
        step_index,
        path: path.to_string(),
        type_name: ty.kind_name().to_string(),
    })
}

fn step_not_found(step_index: usize, path: &Path) -> PathError {
    PathError::StepNotFound {
        step_index,
        step: path.steps()[step_index].to_string(),
        path: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use weft_identity::{Identifier, IdentifierRegistry, PathStep};

    use super::*;
    use crate::config::TypeSystemConfig;
    use crate::types::Optionality;
    use crate::value::Value;

    fn id(name: &str) -> Identifier {
        Identifier::new(name).unwrap()
    }

    fn setup(config: TypeSystemConfig) -> (TypeSystem, TypeRef) {
        let mut registry = IdentifierRegistry::new();
        let ts = TypeSystem::new(&mut registry, config).unwrap();
        let b = ts.builtins();
        let point = b.record([
            (id("x"), b.int(0, 100, 1), Optionality::AlwaysActive),
            (id("y"), b.int(0, 100, 2), Optionality::AlwaysActive),
        ]);
        let shape = b.record([
            (id("name"), b.string(), Optionality::AlwaysActive),
            (id("points"), b.array(point, 0, None, 2), Optionality::AlwaysActive),
        ]);
        (ts, shape)
    }

    fn path(steps: &[PathStep]) -> Path {
        let mut path = Path::root();
        for step in steps {
            path.push(step.clone());
        }
        path
    }

    #[test]
    fn follows_fields_and_indices() {
        let (ts, shape) = setup(TypeSystemConfig::default());
        let value = ts.resolve(&shape).unwrap().create_value(&ts).unwrap();

        let target = path(&[
            PathStep::field(id("points")),
            PathStep::index(1),
            PathStep::field(id("y")),
        ]);
        let (found, found_type) = follow_path(&ts, &shape, &value, &target).unwrap();
        assert_eq!(found.as_int(), Some(2));
        assert_eq!(found_type, ts.builtins().int(0, 100, 2));
    }

    #[test]
    fn root_path_is_the_value_itself() {
        let (ts, shape) = setup(TypeSystemConfig::default());
        let value = ts.resolve(&shape).unwrap().create_value(&ts).unwrap();
        let (found, found_type) = follow_path(&ts, &shape, &value, &Path::root()).unwrap();
        assert!(found.ptr_eq(&value));
        assert_eq!(found_type, shape);
    }

    #[test]
    fn missing_step_is_reported_with_its_position() {
        let (ts, shape) = setup(TypeSystemConfig::default());
        let value = ts.resolve(&shape).unwrap().create_value(&ts).unwrap();

        let target = path(&[PathStep::field(id("points")), PathStep::index(5)]);
        let err = follow_path(&ts, &shape, &value, &target).unwrap_err();
        assert!(matches!(err, PathError::StepNotFound { step_index: 1, .. }));
        assert!(try_follow_path(&ts, &shape, &value, &target).is_none());
    }

    #[test]
    fn stepping_into_a_leaf_is_not_compound() {
        let (ts, shape) = setup(TypeSystemConfig::default());
        let value = ts.resolve(&shape).unwrap().create_value(&ts).unwrap();

        let target = path(&[PathStep::field(id("name")), PathStep::index(0)]);
        let err = follow_path(&ts, &shape, &value, &target).unwrap_err();
        assert_eq!(
            err,
            PathError::NotCompound {
                step_index: 1,
                path: target.to_string(),
                type_name: "String".to_string(),
            }
        );
    }

    #[test]
    fn depth_limit_comes_from_config() {
        let config = TypeSystemConfig {
            max_path_depth: 2,
            ..TypeSystemConfig::default()
        };
        let (ts, shape) = setup(config);
        let value = ts.resolve(&shape).unwrap().create_value(&ts).unwrap();

        let target = path(&[
            PathStep::field(id("points")),
            PathStep::index(0),
            PathStep::field(id("x")),
        ]);
        let err = follow_path(&ts, &shape, &value, &target).unwrap_err();
        assert_eq!(err, PathError::TooDeep { depth: 3, limit: 2 });
    }

    #[test]
    fn unresolvable_type_names_the_step() {
        let (ts, _) = setup(TypeSystemConfig::default());
        let bogus = TypeRef::primitive(id("Nope"));
        let value = ValueHolder::new(Value::Int(0));
        let target = path(&[PathStep::index(0)]);
        let err = follow_path(&ts, &bogus, &value, &target).unwrap_err();
        assert!(matches!(err, PathError::UnresolvedType { step_index: 0, .. }));
    }

    #[test]
    fn mutable_follow_copies_only_the_spine() {
        let (ts, shape) = setup(TypeSystemConfig::default());
        let original = ts.resolve(&shape).unwrap().create_value(&ts).unwrap();
        let mut working = original.clone();

        let target = path(&[
            PathStep::field(id("points")),
            PathStep::index(0),
            PathStep::field(id("x")),
        ]);
        let (slot, _) = follow_path_mut(&ts, &shape, &mut working, &target).unwrap();
        *slot = ValueHolder::new(Value::Int(42));

        let (old_x, _) = follow_path(&ts, &shape, &original, &target).unwrap();
        let (new_x, _) = follow_path(&ts, &shape, &working, &target).unwrap();
        assert_eq!(old_x.as_int(), Some(1));
        assert_eq!(new_x.as_int(), Some(42));

        let name = path(&[PathStep::field(id("name"))]);
        let (old_name, _) = follow_path(&ts, &shape, &original, &name).unwrap();
        let (new_name, _) = follow_path(&ts, &shape, &working, &name).unwrap();
        assert!(old_name.ptr_eq(new_name));

        let second = path(&[PathStep::field(id("points")), PathStep::index(1)]);
        let (old_second, _) = follow_path(&ts, &shape, &original, &second).unwrap();
        let (new_second, _) = follow_path(&ts, &shape, &working, &second).unwrap();
        assert!(old_second.ptr_eq(new_second));
    }
}
