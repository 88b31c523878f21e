// src/value/holder.rs
//
// ValueHolder: the shared, copy-on-write unit of storage for every value.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use weft_identity::Identifier;

use super::Value;

/// A reference-counted handle to an immutable [`Value`].
///
/// Cloning a holder shares the value. Writing goes through
/// [`copy_contents_and_get_non_const`](Self::copy_contents_and_get_non_const),
/// which copies the value first if anyone else still holds it.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueHolder(Arc<Value>);

impl ValueHolder {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    pub fn get(&self) -> &Value {
        &self.0
    }

    /// Make this holder the sole owner of its value and return it mutably.
    pub fn copy_contents_and_get_non_const(&mut self) -> &mut Value {
        Arc::make_mut(&mut self.0)
    }

    /// True when both holders point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &ValueHolder) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.0) > 1
    }

    pub fn into_value(self) -> Value {
        Arc::unwrap_or_clone(self.0)
    }

    /// Visit identifiers in place. The holder keeps its allocation when the
    /// visitor leaves every identifier as it was.
    pub fn visit_identifiers(&mut self, visit: &mut dyn FnMut(&mut Identifier)) {
        let mut copy = Value::clone(&self.0);
        let mut changed = false;
        copy.visit_identifiers(&mut |ident| {
            let before = ident.clone();
            visit(ident);
            changed |= ident.name() != before.name()
                || ident.discriminator() != before.discriminator();
        });
        if changed {
            self.0 = Arc::new(copy);
        }
    }

    pub fn visit_file_paths(&mut self, visit: &mut dyn FnMut(&mut PathBuf)) {
        let mut copy = Value::clone(&self.0);
        let mut changed = false;
        copy.visit_file_paths(&mut |path| {
            let before = path.clone();
            visit(path);
            changed |= *path != before;
        });
        if changed {
            self.0 = Arc::new(copy);
        }
    }
}

impl Deref for ValueHolder {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ValueHolder {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl PartialEq for ValueHolder {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for ValueHolder {}

impl PartialOrd for ValueHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        self.0.cmp(&other.0)
    }
}

impl Hash for ValueHolder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl std::fmt::Debug for ValueHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
