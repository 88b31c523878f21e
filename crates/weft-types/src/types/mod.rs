// src/types/mod.rs
//! Resolved types.
//!
//! A [`Type`] pairs the [`TypeRef`] it was resolved from with a closed
//! [`TypeKind`]. Every operation dispatches with a `match` on the kind, so
//! adding a kind is a compile error everywhere it needs handling.

mod array;
mod enums;
mod generic;
mod leaf;
mod map;
mod numeric;
mod record;
mod sum;
mod tuple;
mod variants;

use crate::compound::CompoundType;
use crate::errors::TypeSystemError;
use crate::subtype::SubtypeOrder;
use crate::type_ref::TypeRef;
use crate::value::{Value, ValueHolder};
use crate::TypeSystem;

pub use array::ArrayType;
pub(crate) use array::compare_arrays;
pub use enums::{EnumType, NativeEnum};
pub(crate) use enums::native_identifiers;
pub use generic::{GenericType, TypeVariableType};
pub use leaf::{FilePathType, StringType};
pub use map::{FallbackKind, MapType};
pub use numeric::{IntType, RationalType};
pub use record::{FieldInfo, Optionality, RecordType};
pub use sum::SumType;
pub use tuple::TupleType;
pub use variants::{RecordWithVariantsType, VariantFieldInfo};

#[derive(Debug, Clone)]
pub enum TypeKind {
    Int(IntType),
    Rational(RationalType),
    String(StringType),
    FilePath(FilePathType),
    Enum(EnumType),
    Record(RecordType),
    RecordWithVariants(RecordWithVariantsType),
    Array(ArrayType),
    Tuple(TupleType),
    Sum(SumType),
    Generic(GenericType),
    TypeVariable(TypeVariableType),
    Map(MapType),
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Int(_) => "Int",
            TypeKind::Rational(_) => "Rational",
            TypeKind::String(_) => "String",
            TypeKind::FilePath(_) => "FilePath",
            TypeKind::Enum(_) => "Enum",
            TypeKind::Record(_) => "Record",
            TypeKind::RecordWithVariants(_) => "RecordWithVariants",
            TypeKind::Array(_) => "Array",
            TypeKind::Tuple(_) => "Tuple",
            TypeKind::Sum(_) => "Sum",
            TypeKind::Generic(_) => "Generic",
            TypeKind::TypeVariable(_) => "TypeVariable",
            TypeKind::Map(_) => "Map",
        }
    }
}

/// A resolved type. Shared through `Arc` by the primitive registry and the
/// constructor caches.
#[derive(Debug, Clone)]
pub struct Type {
    type_ref: TypeRef,
    kind: TypeKind,
}

impl Type {
    pub fn new(type_ref: TypeRef, kind: TypeKind) -> Self {
        Self { type_ref, kind }
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Build the default value of this type.
    pub fn create_value(&self, ts: &TypeSystem) -> Result<ValueHolder, TypeSystemError> {
        let value = match &self.kind {
            TypeKind::Int(t) => Value::Int(t.default_value()),
            TypeKind::Rational(t) => Value::Rational(t.default_value()),
            TypeKind::String(t) => Value::String(t.default_value().to_string()),
            TypeKind::FilePath(t) => Value::FilePath(t.default_value().to_path_buf()),
            TypeKind::Enum(t) => Value::Enum(t.default_identifier().clone()),
            TypeKind::Record(t) => t.create_value(ts)?,
            TypeKind::RecordWithVariants(t) => t.create_value(ts)?,
            TypeKind::Array(t) => t.create_value(ts)?,
            TypeKind::Tuple(t) => t.create_value(ts)?,
            TypeKind::Sum(t) => t.create_value(ts)?,
            TypeKind::Generic(t) => t.create_value(ts)?,
            TypeKind::TypeVariable(_) => Value::Unassigned,
            TypeKind::Map(t) => t.create_value(ts)?,
        };
        Ok(ValueHolder::new(value))
    }

    /// Whether `value` is a value of this type. Records tolerate fields
    /// they do not declare.
    pub fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        match &self.kind {
            TypeKind::Int(t) => t.is_valid_value(value),
            TypeKind::Rational(t) => t.is_valid_value(value),
            TypeKind::String(_) => matches!(value, Value::String(_)),
            TypeKind::FilePath(_) => matches!(value, Value::FilePath(_)),
            TypeKind::Enum(t) => t.is_valid_value(value),
            TypeKind::Record(t) => t.is_valid_value(ts, value),
            TypeKind::RecordWithVariants(t) => t.is_valid_value(ts, value),
            TypeKind::Array(t) => t.is_valid_value(ts, value),
            TypeKind::Tuple(t) => t.is_valid_value(ts, value),
            TypeKind::Sum(t) => t.is_valid_value(ts, value),
            TypeKind::Generic(t) => t.is_valid_value(ts, value),
            TypeKind::TypeVariable(_) => matches!(value, Value::Unassigned),
            TypeKind::Map(t) => t.is_valid_value(ts, value),
        }
    }

    /// Compare with `other` from this kind's point of view. Returns
    /// `Unrelated` when this kind cannot judge `other`.
    pub fn compare_subtype_helper(&self, ts: &TypeSystem, other: &Type) -> SubtypeOrder {
        match &self.kind {
            TypeKind::Int(t) => t.compare(&other.kind),
            TypeKind::Rational(t) => t.compare(&other.kind),
            TypeKind::String(_) => match other.kind {
                TypeKind::String(_) => SubtypeOrder::Equivalent,
                _ => SubtypeOrder::Unrelated,
            },
            TypeKind::FilePath(_) => match other.kind {
                TypeKind::FilePath(_) => SubtypeOrder::Equivalent,
                _ => SubtypeOrder::Unrelated,
            },
            TypeKind::Enum(t) => t.compare(&other.kind),
            TypeKind::Record(t) => t.compare(ts, &other.kind),
            TypeKind::RecordWithVariants(t) => t.compare(ts, &other.kind),
            TypeKind::Array(t) => t.compare(ts, &other.kind),
            TypeKind::Tuple(t) => t.compare(ts, &other.kind),
            TypeKind::Sum(t) => t.compare(ts, other),
            TypeKind::Generic(t) => t.compare(ts, &other.kind),
            TypeKind::TypeVariable(t) => t.compare(&other.kind),
            TypeKind::Map(t) => t.compare(ts, &other.kind),
        }
    }

    /// The navigation facet of structured kinds.
    pub fn as_compound(&self) -> Option<&dyn CompoundType> {
        match &self.kind {
            TypeKind::Record(t) => Some(t),
            TypeKind::RecordWithVariants(t) => Some(t),
            TypeKind::Array(t) => Some(t),
            TypeKind::Tuple(t) => Some(t),
            TypeKind::Sum(t) => Some(t),
            TypeKind::Generic(t) => Some(t),
            TypeKind::Int(_)
            | TypeKind::Rational(_)
            | TypeKind::String(_)
            | TypeKind::FilePath(_)
            | TypeKind::Enum(_)
            | TypeKind::TypeVariable(_)
            | TypeKind::Map(_) => None,
        }
    }

    /// Turn `old` into a value of this type, keeping what still fits.
    ///
    /// A valid value is returned as is. Otherwise the default is built and
    /// every record field, array entry, tuple element, summand value or
    /// wrapped value of `old` is carried over after being adapted itself.
    pub fn adapt_value(
        &self,
        ts: &TypeSystem,
        old: &ValueHolder,
    ) -> Result<ValueHolder, TypeSystemError> {
        if self.is_valid_value(ts, old) {
            return Ok(old.clone());
        }
        let adapted = match &self.kind {
            TypeKind::Record(t) => t.adapt(ts, old)?,
            TypeKind::RecordWithVariants(t) => t.adapt(ts, old)?,
            TypeKind::Array(t) => t.adapt(ts, old)?,
            TypeKind::Tuple(t) => t.adapt(ts, old)?,
            TypeKind::Sum(t) => t.adapt(ts, old)?,
            TypeKind::Generic(t) => t.adapt(ts, old)?,
            _ => None,
        };
        match adapted {
            Some(value) => Ok(ValueHolder::new(value)),
            None => self.create_value(ts),
        }
    }

    /// `value` itself when it is valid, or `value` wrapped into the first
    /// summand that accepts it when this is a sum type.
    pub fn coerce_value(&self, ts: &TypeSystem, value: &ValueHolder) -> Option<ValueHolder> {
        if self.is_valid_value(ts, value) {
            return Some(value.clone());
        }
        match &self.kind {
            TypeKind::Sum(t) => t.wrap(ts, value),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match &self.kind {
            TypeKind::Enum(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match &self.kind {
            TypeKind::Record(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_record_with_variants(&self) -> Option<&RecordWithVariantsType> {
        match &self.kind {
            TypeKind::RecordWithVariants(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match &self.kind {
            TypeKind::Array(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_sum(&self) -> Option<&SumType> {
        match &self.kind {
            TypeKind::Sum(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_generic(&self) -> Option<&GenericType> {
        match &self.kind {
            TypeKind::Generic(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapType> {
        match &self.kind {
            TypeKind::Map(t) => Some(t),
            _ => None,
        }
    }
}

/// Resolve `type_ref` and check `value` against it. Unresolvable types
/// accept nothing.
pub(crate) fn value_fits(ts: &TypeSystem, type_ref: &TypeRef, value: &Value) -> bool {
    ts.resolve(type_ref)
        .is_ok_and(|ty| ty.is_valid_value(ts, value))
}

/// Resolve `type_ref` and adapt `old` to it.
pub(crate) fn adapt_to(
    ts: &TypeSystem,
    type_ref: &TypeRef,
    old: &ValueHolder,
) -> Result<ValueHolder, TypeSystemError> {
    ts.resolve(type_ref)?.adapt_value(ts, old)
}

pub(crate) fn default_of(
    ts: &TypeSystem,
    type_ref: &TypeRef,
) -> Result<ValueHolder, TypeSystemError> {
    ts.resolve(type_ref)?.create_value(ts)
}
