// src/value/mod.rs
//! Values and the copy-on-write [`ValueHolder`] that stores them.
//!
//! A [`Value`] is a closed tagged payload. Compound payloads hold their
//! children as holders, so unchanged subtrees are shared between snapshots
//! and only the spine leading to a mutation gets copied.

mod aggregates;
mod holder;
mod map;
mod rational;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use weft_identity::Identifier;

pub use aggregates::{ArrayValue, GenericValue, RecordValue, SumValue, TupleValue, VariantValue};
pub use holder::ValueHolder;
pub use map::{MapEntry, MapValue, ValidationResult};
pub use rational::Rational;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Rational(Rational),
    String(String),
    FilePath(PathBuf),
    Enum(Identifier),
    Record(RecordValue),
    Variant(VariantValue),
    Array(ArrayValue),
    Tuple(TupleValue),
    Sum(SumValue),
    Generic(GenericValue),
    Map(MapValue),
    /// The value of a type variable that has not been assigned yet.
    Unassigned,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Rational(_) => "rational",
            Value::String(_) => "string",
            Value::FilePath(_) => "file path",
            Value::Enum(_) => "enum",
            Value::Record(_) => "record",
            Value::Variant(_) => "variant record",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
            Value::Sum(_) => "sum",
            Value::Generic(_) => "generic",
            Value::Map(_) => "map",
            Value::Unassigned => "unassigned",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Ints are accepted wherever a rational is expected.
    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Value::Int(v) => Some(Rational::from_int(*v)),
            Value::Rational(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Value::Enum(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleValue> {
        match self {
            Value::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Call `visit` on every identifier reachable from this value, including
    /// those inside type references held by generic and map values. A child
    /// holder is replaced only when the visitor changed something inside it.
    pub fn visit_identifiers(&mut self, visit: &mut dyn FnMut(&mut Identifier)) {
        match self {
            Value::Enum(id) => visit(id),
            Value::Record(record) => record.visit_identifiers(visit),
            Value::Variant(variant) => {
                visit(&mut variant.tag);
                variant.fields.visit_identifiers(visit);
            }
            Value::Array(ArrayValue(entries)) | Value::Tuple(TupleValue(entries)) => {
                for entry in entries {
                    entry.visit_identifiers(visit);
                }
            }
            Value::Sum(sum) => sum.value.visit_identifiers(visit),
            Value::Generic(generic) => {
                for type_ref in generic.assignments.iter_mut().flatten() {
                    type_ref.visit_identifiers(visit);
                }
                generic.wrapped.visit_identifiers(visit);
            }
            Value::Map(map) => map.visit_identifiers(visit),
            Value::Int(_)
            | Value::Rational(_)
            | Value::String(_)
            | Value::FilePath(_)
            | Value::Unassigned => {}
        }
    }

    /// Call `visit` on every file path reachable from this value.
    pub fn visit_file_paths(&mut self, visit: &mut dyn FnMut(&mut PathBuf)) {
        match self {
            Value::FilePath(path) => visit(path),
            Value::Record(record) => {
                for holder in record.0.values_mut() {
                    holder.visit_file_paths(visit);
                }
            }
            Value::Variant(variant) => {
                for holder in variant.fields.0.values_mut() {
                    holder.visit_file_paths(visit);
                }
            }
            Value::Array(ArrayValue(entries)) | Value::Tuple(TupleValue(entries)) => {
                for entry in entries {
                    entry.visit_file_paths(visit);
                }
            }
            Value::Sum(sum) => sum.value.visit_file_paths(visit),
            Value::Generic(generic) => generic.wrapped.visit_file_paths(visit),
            Value::Map(map) => map.visit_file_paths(visit),
            Value::Int(_)
            | Value::Rational(_)
            | Value::String(_)
            | Value::Enum(_)
            | Value::Unassigned => {}
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<Rational> for Value {
    fn from(value: Rational) -> Self {
        Value::Rational(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Identifier> for Value {
    fn from(value: Identifier) -> Self {
        Value::Enum(value)
    }
}

// ============================================================================
// Text form
// ============================================================================

/// Ints, rationals, strings, file paths, identifiers and tuples print in the
/// literal syntax accepted inside type reference value arguments.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Rational(r) => write!(f, "{r}"),
            Value::String(s) => write_quoted(f, s),
            Value::FilePath(p) => {
                f.write_str("@")?;
                write_quoted(f, &p.to_string_lossy())
            }
            Value::Enum(id) => write!(f, "#{id}"),
            Value::Tuple(TupleValue(elements)) => {
                f.write_str("(")?;
                write_list(f, elements)?;
                f.write_str(")")
            }
            Value::Array(ArrayValue(entries)) => {
                f.write_str("[")?;
                write_list(f, entries)?;
                f.write_str("]")
            }
            Value::Record(record) => write!(f, "{record}"),
            Value::Variant(variant) => write!(f, "#{}{}", variant.tag, variant.fields),
            Value::Sum(sum) => write!(f, "<{}>{}", sum.summand, *sum.value),
            Value::Generic(generic) => write!(f, "generic({})", *generic.wrapped),
            Value::Map(map) => write!(f, "{map}"),
            Value::Unassigned => f.write_str("?"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in text.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("\"")
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[ValueHolder]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", **item)?;
    }
    Ok(())
}
