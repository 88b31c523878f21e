// src/type_system/mod.rs
//! The registry that turns [`TypeRef`]s into shared [`Type`]s.
//!
//! Primitive types are stored directly. Constructed types are built on
//! first use by their [`TypeConstructor`] and cached per argument list, so
//! resolving the same ref twice yields the same `Arc`.
//!
//! Registration needs `&mut self` and happens during setup. After that the
//! system is shared by reference across threads.

mod builtins;
mod constructor;
mod constructors;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use weft_identity::IdentifierRegistry;

use crate::config::TypeSystemConfig;
use crate::errors::TypeSystemError;
use crate::subtype::SubtypeOrder;
use crate::type_ref::{RegisteredTypeId, TypeConstructorId, TypeRef};
use crate::types::{FilePathType, IntType, RationalType, StringType, Type, TypeKind};

pub use builtins::BuiltinTypes;
pub use constructor::TypeConstructor;

use constructor::ConstructorEntry;
use constructors::{
    AddBlankToEnumConstructor, ArrayConstructor, EnumConstructor, EnumUnionConstructor,
    GenericConstructor, IntConstructor, MapConstructor, RationalConstructor,
    RecordConstructor, RecordWithVariantsConstructor, SumConstructor, TupleConstructor,
    TypeVarConstructor,
};

pub struct TypeSystem {
    config: TypeSystemConfig,
    primitives: FxHashMap<RegisteredTypeId, Arc<Type>>,
    constructors: FxHashMap<TypeConstructorId, ConstructorEntry>,
    builtins: BuiltinTypes,
}

impl TypeSystem {
    /// A type system with the built-in primitives and constructors. Their
    /// names are interned in `registry`.
    pub fn new(
        registry: &mut IdentifierRegistry,
        config: TypeSystemConfig,
    ) -> Result<Self, TypeSystemError> {
        let builtins = BuiltinTypes::new(registry)?;
        let mut ts = Self {
            config,
            primitives: FxHashMap::default(),
            constructors: FxHashMap::default(),
            builtins: builtins.clone(),
        };

        ts.add_primitive_type(builtins.string_id, TypeKind::String(StringType::default()))?;
        ts.add_primitive_type(
            builtins.file_path_id,
            TypeKind::FilePath(FilePathType::default()),
        )?;
        ts.add_primitive_type(builtins.int_primitive_id, TypeKind::Int(IntType::UNBOUNDED))?;
        ts.add_primitive_type(
            builtins.rational_primitive_id,
            TypeKind::Rational(RationalType::UNBOUNDED),
        )?;

        let builtin_constructors: [(TypeConstructorId, Box<dyn TypeConstructor>); 13] = [
            (builtins.int_id, Box::new(IntConstructor)),
            (builtins.rational_id, Box::new(RationalConstructor)),
            (builtins.enum_id, Box::new(EnumConstructor)),
            (builtins.enum_union_id, Box::new(EnumUnionConstructor)),
            (builtins.add_blank_to_enum_id, Box::new(AddBlankToEnumConstructor)),
            (builtins.record_id, Box::new(RecordConstructor)),
            (
                builtins.record_with_variants_id,
                Box::new(RecordWithVariantsConstructor),
            ),
            (builtins.array_id, Box::new(ArrayConstructor)),
            (builtins.tuple_id, Box::new(TupleConstructor)),
            (builtins.sum_id, Box::new(SumConstructor)),
            (builtins.generic_id, Box::new(GenericConstructor)),
            (builtins.type_var_id, Box::new(TypeVarConstructor)),
            (builtins.map_id, Box::new(MapConstructor)),
        ];
        for (id, constructor) in builtin_constructors {
            ts.add_type_constructor(id, constructor)?;
        }

        debug!(
            primitives = ts.primitives.len(),
            constructors = ts.constructors.len(),
            "type system ready"
        );
        Ok(ts)
    }

    pub fn config(&self) -> &TypeSystemConfig {
        &self.config
    }

    pub fn builtins(&self) -> &BuiltinTypes {
        &self.builtins
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a type that takes no arguments and return the ref naming it.
    pub fn add_primitive_type(
        &mut self,
        id: RegisteredTypeId,
        kind: TypeKind,
    ) -> Result<TypeRef, TypeSystemError> {
        if self.primitives.contains_key(&id) {
            return Err(TypeSystemError::DuplicateRegistration { id: id.to_string() });
        }
        let type_ref = TypeRef::Primitive(id.clone());
        self.primitives
            .insert(id, Arc::new(Type::new(type_ref.clone(), kind)));
        Ok(type_ref)
    }

    pub fn add_type_constructor(
        &mut self,
        id: TypeConstructorId,
        constructor: Box<dyn TypeConstructor>,
    ) -> Result<(), TypeSystemError> {
        if self.constructors.contains_key(&id) {
            return Err(TypeSystemError::DuplicateRegistration { id: id.to_string() });
        }
        let entry = ConstructorEntry::new(constructor, self.config.initial_cache_capacity);
        self.constructors.insert(id, entry);
        Ok(())
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Arc<Type>, TypeSystemError> {
        match type_ref {
            TypeRef::Primitive(id) => self
                .primitives
                .get(id)
                .cloned()
                .ok_or_else(|| TypeSystemError::UnknownPrimitive { id: id.to_string() }),
            TypeRef::Constructed(id, args) => self
                .constructor_entry(id)?
                .get_or_construct(self, type_ref, args),
        }
    }

    pub fn try_resolve(&self, type_ref: &TypeRef) -> Option<Arc<Type>> {
        self.resolve(type_ref).ok()
    }

    /// Parse a ref from text using this system's depth limit.
    pub fn parse_type_ref(&self, text: &str) -> Result<TypeRef, TypeSystemError> {
        TypeRef::deserialize_from_string(text, self.config.max_type_ref_depth)
    }

    /// Number of constructed types built so far, across all constructors.
    pub fn cached_type_count(&self) -> usize {
        self.constructors
            .values()
            .map(ConstructorEntry::cached_len)
            .sum()
    }

    fn constructor_entry(
        &self,
        id: &TypeConstructorId,
    ) -> Result<&ConstructorEntry, TypeSystemError> {
        self.constructors
            .get(id)
            .ok_or_else(|| TypeSystemError::UnknownConstructor { id: id.to_string() })
    }

    fn constructor(&self, type_ref: &TypeRef) -> Option<&dyn TypeConstructor> {
        let id = type_ref.constructor_id()?;
        self.constructors.get(id).map(ConstructorEntry::constructor)
    }

    // ========================================================================
    // Subtyping
    // ========================================================================

    /// Order of `a` relative to `b`.
    ///
    /// Constructors get the first say, on the unresolved refs; the resolved
    /// types are asked only when no constructor judged the pair. `Unrelated`
    /// means nobody could, including when a ref does not resolve.
    pub fn compare_subtype(&self, a: &TypeRef, b: &TypeRef) -> SubtypeOrder {
        if a == b {
            return SubtypeOrder::Equivalent;
        }

        if let (TypeRef::Constructed(a_id, a_args), TypeRef::Constructed(b_id, b_args)) = (a, b)
            && a_id == b_id
            && let Some(order) = self
                .constructor(a)
                .and_then(|c| c.compare_subtype_args(self, a_args, b_args))
        {
            return order;
        }

        if let Some(a_args) = a.args()
            && let Some(order) = self
                .constructor(a)
                .and_then(|c| c.compare_subtype_ref(self, a_args, b))
        {
            return order;
        }
        if let Some(b_args) = b.args()
            && let Some(order) = self
                .constructor(b)
                .and_then(|c| c.compare_subtype_ref(self, b_args, a))
        {
            return order.reverse();
        }

        let (a_type, b_type) = match (self.resolve(a), self.resolve(b)) {
            (Ok(a_type), Ok(b_type)) => (a_type, b_type),
            (Err(error), _) | (_, Err(error)) => {
                warn!(%a, %b, %error, "cannot compare unresolvable types");
                return SubtypeOrder::Unrelated;
            }
        };
        match a_type.compare_subtype_helper(self, &b_type) {
            SubtypeOrder::Unrelated => b_type.compare_subtype_helper(self, &a_type).reverse(),
            order => order,
        }
    }

    /// Every value of `a` is a value of `b`.
    pub fn is_subtype(&self, a: &TypeRef, b: &TypeRef) -> bool {
        self.compare_subtype(a, b).is_subtype_or_equivalent()
    }

    /// `a` and `b` share at least one value, as far as can be told.
    pub fn is_related_type(&self, a: &TypeRef, b: &TypeRef) -> bool {
        self.compare_subtype(a, b).is_related()
    }
}

impl fmt::Debug for TypeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSystem")
            .field("config", &self.config)
            .field("primitives", &self.primitives.len())
            .field("constructors", &self.constructors.len())
            .field("cached_types", &self.cached_type_count())
            .finish()
    }
}
