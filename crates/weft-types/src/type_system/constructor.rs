// type_system/constructor.rs
//
// The TypeConstructor trait and the memoizing cache in front of each
// registered constructor.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::TypeSystem;
use crate::errors::TypeSystemError;
use crate::subtype::SubtypeOrder;
use crate::type_ref::{TypeConstructorArguments, TypeRef};
use crate::types::Type;
use crate::value::ValueHolder;

/// Builds types from resolved arguments.
///
/// A constructor is called at most once per distinct argument list; the
/// [`TypeSystem`] caches the result for the rest of its lifetime.
pub trait TypeConstructor: Send + Sync {
    /// Build the type `type_ref` names. `type_args` are the resolved type
    /// arguments of `type_ref`, in order.
    fn construct_type(
        &self,
        ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError>;

    /// Compare two argument lists of this constructor without building the
    /// types. `None` leaves the decision to the resolved types.
    fn compare_subtype_args(
        &self,
        _ts: &TypeSystem,
        _this_args: &TypeConstructorArguments,
        _other_args: &TypeConstructorArguments,
    ) -> Option<SubtypeOrder> {
        None
    }

    /// Compare a type of this constructor with an arbitrary other ref.
    fn compare_subtype_ref(
        &self,
        _ts: &TypeSystem,
        _this_args: &TypeConstructorArguments,
        _other: &TypeRef,
    ) -> Option<SubtypeOrder> {
        None
    }
}

type Slot = Arc<OnceCell<Arc<Type>>>;

/// A registered constructor plus its cache.
///
/// Each argument list owns a slot. Slots are found or created under the
/// lock, but filled outside it, so a constructor may resolve other types of
/// the same constructor while it runs. Concurrent resolutions of the same
/// arguments wait on the slot instead of constructing twice.
pub(super) struct ConstructorEntry {
    constructor: Box<dyn TypeConstructor>,
    cache: RwLock<FxHashMap<Arc<TypeConstructorArguments>, Slot>>,
}

impl ConstructorEntry {
    pub(super) fn new(constructor: Box<dyn TypeConstructor>, capacity: usize) -> Self {
        Self {
            constructor,
            cache: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    pub(super) fn constructor(&self) -> &dyn TypeConstructor {
        self.constructor.as_ref()
    }

    pub(super) fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub(super) fn get_or_construct(
        &self,
        ts: &TypeSystem,
        type_ref: &TypeRef,
        args: &Arc<TypeConstructorArguments>,
    ) -> Result<Arc<Type>, TypeSystemError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ty) = cache.get(args.as_ref()).and_then(|slot| slot.get()) {
                trace!(%type_ref, "constructor cache hit");
                return Ok(ty.clone());
            }
        }
        self.construct_missing(ts, type_ref, args)
    }

    #[tracing::instrument(level = "debug", skip(self, ts, args), fields(type_ref = %type_ref))]
    fn construct_missing(
        &self,
        ts: &TypeSystem,
        type_ref: &TypeRef,
        args: &Arc<TypeConstructorArguments>,
    ) -> Result<Arc<Type>, TypeSystemError> {
        // Resolve the type arguments with no lock held.
        let type_args = args
            .type_args
            .iter()
            .map(|arg| ts.resolve(arg))
            .collect::<Result<SmallVec<[Arc<Type>; 2]>, _>>()?;

        let slot = {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            cache
                .entry(args.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let built = slot
            .get_or_try_init(|| {
                debug!("constructing type");
                self.constructor
                    .construct_type(ts, type_ref, &type_args, &args.value_args)
                    .map(Arc::new)
            })
            .cloned();
        if let Err(error) = &built {
            debug!(%error, "construction failed");
            self.forget_empty_slot(args);
        }
        built
    }

    /// Drop the slot for `args` unless another caller has filled it since.
    fn forget_empty_slot(&self, args: &TypeConstructorArguments) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.get(args).is_some_and(|slot| slot.get().is_none()) {
            cache.remove(args);
        }
    }

    #[cfg(test)]
    pub(super) fn slot_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
