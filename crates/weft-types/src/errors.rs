// src/errors.rs
//! Type system errors (E1xxx), path navigation errors (E2xxx) and value
//! model errors (E3xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::Diagnostic;
use thiserror::Error;
use weft_identity::IdentifierError;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum TypeSystemError {
    #[error("unknown type constructor '{id}'")]
    #[diagnostic(code(E1001))]
    UnknownConstructor { id: String },

    #[error("unknown primitive type '{id}'")]
    #[diagnostic(code(E1002))]
    UnknownPrimitive { id: String },

    #[error("'{id}' is already registered")]
    #[diagnostic(code(E1003))]
    DuplicateRegistration { id: String },

    #[error("{constructor} expects {expected} type arguments, found {found}")]
    #[diagnostic(code(E1004))]
    WrongTypeArgCount {
        constructor: String,
        expected: String,
        found: usize,
    },

    #[error("{constructor} expects {expected} value arguments, found {found}")]
    #[diagnostic(code(E1005))]
    WrongValueArgCount {
        constructor: String,
        expected: String,
        found: usize,
    },

    #[error("type argument {index} of {constructor} must be {expected}, found {actual}")]
    #[diagnostic(code(E1006))]
    WrongTypeArgKind {
        constructor: String,
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("value argument {index} of {constructor} must be {expected}, found {actual}")]
    #[diagnostic(code(E1007))]
    WrongValueArgKind {
        constructor: String,
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("enum value '{value}' appears more than once")]
    #[diagnostic(code(E1008))]
    DuplicateEnumValue { value: String },

    #[error("enum value '{value}' is missing from the supertype")]
    #[diagnostic(code(E1009))]
    MissingEnumValue { value: String },

    #[error("enum value '{value}' has a different meaning in the supertype")]
    #[diagnostic(
        code(E1010),
        help("enums related by subtyping must use identifiers with the same discriminator")
    )]
    DiscriminatorMismatch { value: String },

    #[error("field '{field}' appears more than once")]
    #[diagnostic(code(E1011))]
    DuplicateField { field: String },

    #[error("invalid range: min {min} is greater than max {max}")]
    #[diagnostic(code(E1012))]
    InvalidRange { min: String, max: String },

    #[error("invalid default for {constructor}: {reason}")]
    #[diagnostic(code(E1013))]
    InvalidDefault { constructor: String, reason: String },

    #[error("type variable {index} is out of range, the generic type has {count} variables")]
    #[diagnostic(code(E1014))]
    TypeVariableOutOfRange { index: usize, count: usize },

    #[error("cannot parse type reference at offset {offset}: {message}")]
    #[diagnostic(code(E1015))]
    Parse { offset: usize, message: String },

    #[error(transparent)]
    #[diagnostic(code(E1016))]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("an identity fallback needs equivalent source and target types, found {source_type} and {target_type}")]
    #[diagnostic(code(E1017))]
    IncompatibleFallback {
        source_type: String,
        target_type: String,
    },

    #[error("tag '{tag}' is not declared by the record")]
    #[diagnostic(code(E1018))]
    UnknownTag { tag: String },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum PathError {
    #[error("step {step_index} ('{step}') of path '{path}' does not exist")]
    #[diagnostic(code(E2001))]
    StepNotFound {
        step_index: usize,
        step: String,
        path: String,
    },

    #[error("step {step_index} of path '{path}' enters {type_name}, which has no children")]
    #[diagnostic(code(E2002))]
    NotCompound {
        step_index: usize,
        path: String,
        type_name: String,
    },

    #[error("step {step_index} of path '{path}' has a type that cannot be resolved")]
    #[diagnostic(code(E2003))]
    UnresolvedType {
        step_index: usize,
        path: String,
        #[source]
        cause: Box<TypeSystemError>,
    },

    #[error("child {index} requested, but only {count} children exist")]
    #[diagnostic(code(E2004))]
    ChildIndexOutOfRange { index: usize, count: usize },

    #[error("value does not have the shape of a {expected}")]
    #[diagnostic(code(E2005))]
    ValueMismatch { expected: String },

    #[error("path of depth {depth} exceeds the limit of {limit}")]
    #[diagnostic(code(E2006))]
    TooDeep { depth: usize, limit: usize },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ModelError {
    #[error("value is not valid for type {type_ref}")]
    #[diagnostic(code(E3001))]
    InvalidValue { type_ref: String },

    #[error("{source_type} is not a subtype of {target_type}")]
    #[diagnostic(code(E3002))]
    NotASubtype {
        source_type: String,
        target_type: String,
    },

    #[error("{operation} needs a {expected}, found {actual}")]
    #[diagnostic(code(E3003))]
    WrongKind {
        operation: &'static str,
        expected: &'static str,
        actual: String,
    },

    #[error("field '{field}' is not optional")]
    #[diagnostic(code(E3004))]
    FieldNotOptional { field: String },

    #[error("field '{field}' is not declared by the record")]
    #[diagnostic(code(E3005))]
    UnknownField { field: String },

    #[error("tag '{tag}' is not declared by the record")]
    #[diagnostic(code(E3006))]
    TagNotFound { tag: String },

    #[error("array size {size} is outside the allowed range {range}")]
    #[diagnostic(code(E3007))]
    ArraySizeOutOfRange { size: usize, range: String },

    #[error("index {index} is out of range for length {len}")]
    #[diagnostic(code(E3008))]
    IndexOutOfRange { index: usize, len: usize },

    #[error("summand {index} is out of range, the sum has {count} summands")]
    #[diagnostic(code(E3009))]
    SummandOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    TypeSystem(#[from] TypeSystemError),
}

impl PathError {
    pub(crate) fn mismatch(expected: &str) -> Self {
        PathError::ValueMismatch {
            expected: expected.to_string(),
        }
    }
}
