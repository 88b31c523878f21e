// src/diff.rs
//
// Structural comparison of two versions of a value. Subtrees whose holders
// are pointer-equal are never visited.

use weft_types::{TypeRef, TypeSystem, ValueHolder};

use crate::flags::ChangeFlags;

/// What changed between `old` and `new`, both of type `type_ref`.
pub(crate) fn changes(
    ts: &TypeSystem,
    type_ref: &TypeRef,
    old: &ValueHolder,
    new: &ValueHolder,
) -> ChangeFlags {
    // Equality checks pointer identity before comparing contents.
    if old == new {
        return ChangeFlags::empty();
    }
    let changed = ChangeFlags::VALUE_CHANGED;
    let Some(ty) = ts.try_resolve(type_ref) else {
        return changed;
    };
    let Some(compound) = ty.as_compound() else {
        return changed;
    };
    if compound.child_steps(old) != compound.child_steps(new) {
        return changed | ChangeFlags::STRUCTURE_CHANGED;
    }

    for index in 0..compound.num_children(new) {
        let (Ok(before), Ok(after)) = (compound.child(old, index), compound.child(new, index))
        else {
            continue;
        };
        // A generic whose variables were reassigned gives its child a new type.
        if before.type_ref != after.type_ref {
            return changed | ChangeFlags::STRUCTURE_CHANGED;
        }
        if changes(ts, &after.type_ref, before.value, after.value)
            .contains(ChangeFlags::STRUCTURE_CHANGED)
        {
            return changed | ChangeFlags::STRUCTURE_CHANGED;
        }
    }
    changed
}
