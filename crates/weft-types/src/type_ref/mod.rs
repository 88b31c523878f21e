// src/type_ref/mod.rs
//! Immutable, hashable descriptions of types.
//!
//! A [`TypeRef`] names either a registered primitive type or a type
//! constructor applied to arguments. Refs are compared, hashed and ordered
//! structurally, so they can key caches and sets. The order is by
//! identifier and says nothing about subtyping.

pub(crate) mod substitution;
mod text;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use weft_identity::Identifier;

use crate::config::DEFAULT_CONFIG;
use crate::errors::TypeSystemError;
use crate::types::Type;
use crate::value::ValueHolder;
use crate::TypeSystem;

pub use substitution::SubstitutionIds;

/// Id of a type registered with [`TypeSystem::add_primitive_type`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisteredTypeId(pub Identifier);

/// Id of a constructor registered with [`TypeSystem::add_type_constructor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeConstructorId(pub Identifier);

impl fmt::Display for RegisteredTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for TypeConstructorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Arguments of a constructed type: nested type refs plus literal values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeConstructorArguments {
    pub type_args: SmallVec<[TypeRef; 2]>,
    pub value_args: SmallVec<[ValueHolder; 2]>,
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    Primitive(RegisteredTypeId),
    Constructed(TypeConstructorId, Arc<TypeConstructorArguments>),
}

impl TypeRef {
    pub fn primitive(id: Identifier) -> Self {
        TypeRef::Primitive(RegisteredTypeId(id))
    }

    pub fn constructed(
        id: TypeConstructorId,
        type_args: impl IntoIterator<Item = TypeRef>,
        value_args: impl IntoIterator<Item = ValueHolder>,
    ) -> Self {
        TypeRef::Constructed(
            id,
            Arc::new(TypeConstructorArguments {
                type_args: type_args.into_iter().collect(),
                value_args: value_args.into_iter().collect(),
            }),
        )
    }

    /// The identifier naming the primitive type or the constructor.
    pub fn name(&self) -> &Identifier {
        match self {
            TypeRef::Primitive(id) => &id.0,
            TypeRef::Constructed(id, _) => &id.0,
        }
    }

    pub fn constructor_id(&self) -> Option<&TypeConstructorId> {
        match self {
            TypeRef::Constructed(id, _) => Some(id),
            TypeRef::Primitive(_) => None,
        }
    }

    pub fn is_constructed_by(&self, id: &TypeConstructorId) -> bool {
        self.constructor_id() == Some(id)
    }

    pub fn args(&self) -> Option<&Arc<TypeConstructorArguments>> {
        match self {
            TypeRef::Constructed(_, args) => Some(args),
            TypeRef::Primitive(_) => None,
        }
    }

    pub fn type_args(&self) -> &[TypeRef] {
        self.args().map_or(&[], |args| &args.type_args)
    }

    pub fn value_args(&self) -> &[ValueHolder] {
        self.args().map_or(&[], |args| &args.value_args)
    }

    pub fn resolve(&self, ts: &TypeSystem) -> Result<Arc<Type>, TypeSystemError> {
        ts.resolve(self)
    }

    pub fn try_resolve(&self, ts: &TypeSystem) -> Option<Arc<Type>> {
        ts.try_resolve(self)
    }

    /// Canonical text form, e.g. `Array<Int[0, 10, 0]>[0, 8, 2]`.
    pub fn serialize_to_string(&self) -> String {
        self.to_string()
    }

    /// Parse the text form, refusing input nested deeper than `max_depth`.
    pub fn deserialize_from_string(text: &str, max_depth: usize) -> Result<Self, TypeSystemError> {
        text::parse_type_ref(text, max_depth)
    }

    /// Call `visit` on every identifier in this ref, including those inside
    /// value arguments. Shared argument lists are copied first.
    pub fn visit_identifiers(&mut self, visit: &mut dyn FnMut(&mut Identifier)) {
        match self {
            TypeRef::Primitive(id) => visit(&mut id.0),
            TypeRef::Constructed(id, args) => {
                visit(&mut id.0);
                let args = Arc::make_mut(args);
                for type_arg in &mut args.type_args {
                    type_arg.visit_identifiers(visit);
                }
                for value_arg in &mut args.value_args {
                    value_arg.visit_identifiers(visit);
                }
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        text::write_type_ref(f, self)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        text::write_type_ref(f, self)
    }
}

impl FromStr for TypeRef {
    type Err = TypeSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        text::parse_type_ref(s, DEFAULT_CONFIG.max_type_ref_depth)
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests;
