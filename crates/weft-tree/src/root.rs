// src/root.rs

use std::sync::Arc;

use tracing::{debug, trace};
use weft_identity::{Identifier, Path};
use weft_types::{
    ModelError, Type, TypeRef, TypeSystem, ValueHolder, follow_path, follow_path_mut,
    try_follow_path,
};

use crate::diff::changes;
use crate::flags::ChangeFlags;

/// The owner of one typed value tree.
///
/// Holds the root type, the current root value, an optional backup taken by
/// [`back_up_value`](Self::back_up_value) and the change flags raised so
/// far. Without a backup every effective edit raises its flags at once;
/// with one, flags are only computed by
/// [`reconcile_changes_from_backup`](Self::reconcile_changes_from_backup).
#[derive(Debug, Clone)]
pub struct ValueTreeRoot {
    type_ref: TypeRef,
    value: ValueHolder,
    backup: Option<ValueHolder>,
    flags: ChangeFlags,
}

impl ValueTreeRoot {
    /// A tree holding the default value of `type_ref`.
    pub fn new(ts: &TypeSystem, type_ref: TypeRef) -> Result<Self, ModelError> {
        let value = ts.resolve(&type_ref)?.create_value(ts)?;
        Ok(Self {
            type_ref,
            value,
            backup: None,
            flags: ChangeFlags::empty(),
        })
    }

    pub fn value(&self) -> &ValueHolder {
        &self.value
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn get_type(&self, ts: &TypeSystem) -> Result<Arc<Type>, ModelError> {
        Ok(ts.resolve(&self.type_ref)?)
    }

    // ========================================================================
    // Whole-value writes
    // ========================================================================

    /// Replace the root value. The value must be valid for the root type.
    pub fn set_value(&mut self, ts: &TypeSystem, value: ValueHolder) -> Result<bool, ModelError> {
        let ty = self.get_type(ts)?;
        if !ty.is_valid_value(ts, &value) {
            return Err(self.invalid_value());
        }
        Ok(self.commit(ts, value))
    }

    pub fn set_to_default(&mut self, ts: &TypeSystem) -> Result<bool, ModelError> {
        let value = self.get_type(ts)?.create_value(ts)?;
        Ok(self.commit(ts, value))
    }

    /// Store `value`, a value of `source_type`. The source type must be a
    /// subtype of the root type; plain values are wrapped when the root is a
    /// sum.
    pub fn assign(
        &mut self,
        ts: &TypeSystem,
        source_type: &TypeRef,
        value: ValueHolder,
    ) -> Result<bool, ModelError> {
        if !ts.is_subtype(source_type, &self.type_ref) {
            return Err(ModelError::NotASubtype {
                source_type: source_type.to_string(),
                target_type: self.type_ref.to_string(),
            });
        }
        let value = self
            .get_type(ts)?
            .coerce_value(ts, &value)
            .ok_or_else(|| self.invalid_value())?;
        Ok(self.commit(ts, value))
    }

    // ========================================================================
    // Path-addressed access
    // ========================================================================

    pub fn value_at(&self, ts: &TypeSystem, path: &Path) -> Result<&ValueHolder, ModelError> {
        Ok(follow_path(ts, &self.type_ref, &self.value, path)?.0)
    }

    pub fn try_value_at(&self, ts: &TypeSystem, path: &Path) -> Option<&ValueHolder> {
        try_follow_path(ts, &self.type_ref, &self.value, path).map(|(value, _)| value)
    }

    /// The type of the value at `path`.
    pub fn type_at(&self, ts: &TypeSystem, path: &Path) -> Result<TypeRef, ModelError> {
        Ok(follow_path(ts, &self.type_ref, &self.value, path)?.1)
    }

    /// Write `value` at `path`, checked against the type found there.
    pub fn set_value_at(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        value: ValueHolder,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |ts, ty, slot| {
            let value = ty.coerce_value(ts, &value).ok_or_else(|| ModelError::InvalidValue {
                type_ref: ty.type_ref().to_string(),
            })?;
            if *slot == value {
                return Ok(false);
            }
            *slot = value;
            Ok(true)
        })
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    pub fn activate_field(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        field: &Identifier,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |ts, ty, slot| {
            let record = ty
                .as_record()
                .ok_or_else(|| wrong_kind("activate_field", "record", ty))?;
            record.activate_field(ts, slot, field)
        })
    }

    pub fn deactivate_field(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        field: &Identifier,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |_, ty, slot| {
            let record = ty
                .as_record()
                .ok_or_else(|| wrong_kind("deactivate_field", "record", ty))?;
            record.deactivate_field(slot, field)
        })
    }

    pub fn select_tag(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        tag: &Identifier,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |ts, ty, slot| {
            let variants = ty
                .as_record_with_variants()
                .ok_or_else(|| wrong_kind("select_tag", "record with variants", ty))?;
            variants.select_tag(ts, slot, tag)
        })
    }

    pub fn insert_entries(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        index: usize,
        count: usize,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |ts, ty, slot| {
            let array = ty
                .as_array()
                .ok_or_else(|| wrong_kind("insert_entries", "array", ty))?;
            array.insert_entries(ts, slot, index, count)
        })
    }

    pub fn remove_entries(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        index: usize,
        count: usize,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |_, ty, slot| {
            let array = ty
                .as_array()
                .ok_or_else(|| wrong_kind("remove_entries", "array", ty))?;
            array.remove_entries(slot, index, count)
        })
    }

    pub fn set_array_size(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        size: usize,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |ts, ty, slot| {
            let array = ty
                .as_array()
                .ok_or_else(|| wrong_kind("set_array_size", "array", ty))?;
            array.set_size(ts, slot, size)
        })
    }

    pub fn select_summand(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        summand: usize,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |ts, ty, slot| {
            let sum = ty
                .as_sum()
                .ok_or_else(|| wrong_kind("select_summand", "sum", ty))?;
            sum.select_summand(ts, slot, summand)
        })
    }

    pub fn instantiate_type_variable(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        index: usize,
        assignment: Option<TypeRef>,
    ) -> Result<bool, ModelError> {
        self.edit_at(ts, path, |ts, ty, slot| {
            let generic = ty
                .as_generic()
                .ok_or_else(|| wrong_kind("instantiate_type_variable", "generic", ty))?;
            generic.instantiate_type_variable(ts, slot, index, assignment)
        })
    }

    // ========================================================================
    // Change tracking
    // ========================================================================

    /// Snapshot the current value. Until the next reconcile, edits do not
    /// raise flags one by one.
    pub fn back_up_value(&mut self) {
        self.backup = Some(self.value.clone());
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// Compare the current value with the backup, raise the flags that
    /// describe the difference and drop the backup. Returns the flags found
    /// by this comparison.
    #[tracing::instrument(level = "debug", skip_all, fields(type_ref = %self.type_ref))]
    pub fn reconcile_changes_from_backup(&mut self, ts: &TypeSystem) -> ChangeFlags {
        let Some(backup) = self.backup.take() else {
            trace!("no backup to reconcile");
            return ChangeFlags::empty();
        };
        let found = changes(ts, &self.type_ref, &backup, &self.value);
        debug!(?found, "reconciled");
        self.flags |= found;
        found
    }

    pub fn change_flags(&self) -> ChangeFlags {
        self.flags
    }

    /// True when any of `flags` has been raised.
    pub fn is_changed(&self, flags: ChangeFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn clear_changes(&mut self) {
        self.flags = ChangeFlags::empty();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Run `edit` on a working copy of the slot at `path` and commit the
    /// copy only if the edit succeeded and changed something.
    fn edit_at(
        &mut self,
        ts: &TypeSystem,
        path: &Path,
        edit: impl FnOnce(&TypeSystem, &Type, &mut ValueHolder) -> Result<bool, ModelError>,
    ) -> Result<bool, ModelError> {
        let mut working = self.value.clone();
        let (slot, slot_type) = follow_path_mut(ts, &self.type_ref, &mut working, path)?;
        let ty = ts.resolve(&slot_type)?;
        if !edit(ts, &ty, slot)? {
            trace!(%path, "edit changed nothing");
            return Ok(false);
        }
        Ok(self.commit(ts, working))
    }

    /// Install `value` as the root value. Returns whether it differs from
    /// the previous one.
    fn commit(&mut self, ts: &TypeSystem, value: ValueHolder) -> bool {
        if self.value == value {
            return false;
        }
        let previous = std::mem::replace(&mut self.value, value);
        if self.backup.is_none() {
            let found = changes(ts, &self.type_ref, &previous, &self.value);
            debug!(?found, type_ref = %self.type_ref, "value committed");
            self.flags |= found;
        }
        true
    }

    fn invalid_value(&self) -> ModelError {
        ModelError::InvalidValue {
            type_ref: self.type_ref.to_string(),
        }
    }
}

fn wrong_kind(operation: &'static str, expected: &'static str, ty: &Type) -> ModelError {
    ModelError::WrongKind {
        operation,
        expected,
        actual: ty.kind_name().to_string(),
    }
}
