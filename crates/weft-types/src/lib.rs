//! weft structural type system: type references, memoized type construction,
//! the subtype-ordering algebra and copy-on-write values.
//!
//! A [`TypeRef`] is resolved against a [`TypeSystem`] into a shared [`Type`].
//! The type builds default values, validates values, compares itself with
//! other types and, for structured kinds, exposes a [`CompoundType`] facet so
//! values of any shape can be navigated by [`Path`](weft_identity::Path).

pub mod compound;
pub mod config;
pub mod errors;
pub mod path;
pub mod subtype;
pub mod type_ref;
pub mod type_system;
pub mod types;
pub mod value;

pub use compound::{ChildMut, ChildRef, CompoundType};
pub use config::{ConfigError, DEFAULT_CONFIG, TypeSystemConfig};
pub use errors::{ModelError, PathError, TypeSystemError};
pub use path::{follow_path, follow_path_mut, try_follow_path};
pub use subtype::{Range, SubtypeOrder, subtype_product};
pub use type_ref::{RegisteredTypeId, TypeConstructorArguments, TypeConstructorId, TypeRef};
pub use type_system::{BuiltinTypes, TypeConstructor, TypeSystem};
pub use types::{
    ArrayType, EnumType, FallbackKind, FieldInfo, FilePathType, GenericType, IntType, MapType,
    NativeEnum, Optionality, RationalType, RecordType, RecordWithVariantsType, StringType,
    SumType, TupleType, Type, TypeKind, TypeVariableType, VariantFieldInfo,
};
pub use value::{
    ArrayValue, GenericValue, MapEntry, MapValue, Rational, RecordValue, SumValue, TupleValue,
    ValidationResult, Value, ValueHolder, VariantValue,
};
