// type_system/constructors.rs
//
// The built-in type constructors.

use std::sync::Arc;

use weft_identity::Identifier;

use super::{TypeConstructor, TypeSystem};
use crate::errors::TypeSystemError;
use crate::subtype::{Range, SubtypeOrder};
use crate::type_ref::{TypeConstructorArguments, TypeRef, substitution::type_variable_args};
use crate::types::{
    ArrayType, EnumType, FallbackKind, FieldInfo, GenericType, IntType, MapType, Optionality,
    RationalType, RecordType, RecordWithVariantsType, SumType, TupleType, Type, TypeKind,
    TypeVariableType, VariantFieldInfo, compare_arrays,
};
use crate::value::{Rational, ValueHolder};

// ============================================================================
// Argument checking
// ============================================================================

struct Args<'a> {
    constructor: &'static str,
    type_ref: &'a TypeRef,
    types: &'a [Arc<Type>],
    values: &'a [ValueHolder],
}

impl<'a> Args<'a> {
    fn new(
        constructor: &'static str,
        type_ref: &'a TypeRef,
        types: &'a [Arc<Type>],
        values: &'a [ValueHolder],
    ) -> Self {
        Self {
            constructor,
            type_ref,
            types,
            values,
        }
    }

    fn types_exactly(&self, expected: usize) -> Result<&Self, TypeSystemError> {
        if self.types.len() != expected {
            return Err(TypeSystemError::WrongTypeArgCount {
                constructor: self.constructor.to_string(),
                expected: expected.to_string(),
                found: self.types.len(),
            });
        }
        Ok(self)
    }

    fn types_at_least(&self, min: usize) -> Result<&Self, TypeSystemError> {
        if self.types.len() < min {
            return Err(TypeSystemError::WrongTypeArgCount {
                constructor: self.constructor.to_string(),
                expected: format!("at least {min}"),
                found: self.types.len(),
            });
        }
        Ok(self)
    }

    fn values_between(&self, min: usize, max: usize) -> Result<&Self, TypeSystemError> {
        if !(min..=max).contains(&self.values.len()) {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(TypeSystemError::WrongValueArgCount {
                constructor: self.constructor.to_string(),
                expected,
                found: self.values.len(),
            });
        }
        Ok(self)
    }

    fn wrong_value(&self, index: usize, expected: &str) -> TypeSystemError {
        let actual = self
            .values
            .get(index)
            .map_or("nothing", |value| value.kind_name());
        TypeSystemError::WrongValueArgKind {
            constructor: self.constructor.to_string(),
            index,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    fn int(&self, index: usize) -> Result<i64, TypeSystemError> {
        self.values
            .get(index)
            .and_then(|value| value.as_int())
            .ok_or_else(|| self.wrong_value(index, "int"))
    }

    fn count(&self, index: usize) -> Result<usize, TypeSystemError> {
        usize::try_from(self.int(index)?).map_err(|_| self.wrong_value(index, "non-negative int"))
    }

    /// Optional trailing count, `fallback` when absent.
    fn count_or(&self, index: usize, fallback: usize) -> Result<usize, TypeSystemError> {
        if index < self.values.len() {
            self.count(index)
        } else {
            Ok(fallback)
        }
    }

    fn rational(&self, index: usize) -> Result<Rational, TypeSystemError> {
        self.values
            .get(index)
            .and_then(|value| value.as_rational())
            .ok_or_else(|| self.wrong_value(index, "rational"))
    }

    fn tuple(&self, index: usize, expected: &str) -> Result<&'a [ValueHolder], TypeSystemError> {
        self.values
            .get(index)
            .and_then(|value| value.as_tuple())
            .map(|tuple| tuple.0.as_slice())
            .ok_or_else(|| self.wrong_value(index, expected))
    }

    fn identifiers(&self, index: usize) -> Result<Vec<Identifier>, TypeSystemError> {
        self.tuple(index, "tuple of identifiers")?
            .iter()
            .map(|value| {
                value
                    .as_identifier()
                    .cloned()
                    .ok_or_else(|| self.wrong_value(index, "tuple of identifiers"))
            })
            .collect()
    }

    fn enum_type(&self, index: usize) -> Result<&'a EnumType, TypeSystemError> {
        let types: &'a [Arc<Type>] = self.types;
        let ty = &types[index];
        ty.as_enum().ok_or_else(|| TypeSystemError::WrongTypeArgKind {
            constructor: self.constructor.to_string(),
            index,
            expected: "Enum".to_string(),
            actual: ty.kind_name().to_string(),
        })
    }

    fn type_arg(&self, index: usize) -> TypeRef {
        self.types[index].type_ref().clone()
    }

    fn build(&self, kind: TypeKind) -> Type {
        Type::new(self.type_ref.clone(), kind)
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// `Int[min, max, default]`
pub(super) struct IntConstructor;

impl TypeConstructor for IntConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Int", type_ref, type_args, value_args);
        args.types_exactly(0)?.values_between(3, 3)?;
        let int = IntType::new(args.int(0)?, args.int(1)?, args.int(2)?)?;
        Ok(args.build(TypeKind::Int(int)))
    }

    fn compare_subtype_args(
        &self,
        _ts: &TypeSystem,
        this_args: &TypeConstructorArguments,
        other_args: &TypeConstructorArguments,
    ) -> Option<SubtypeOrder> {
        // Only argument lists that would construct are judged here.
        let bounds = |args: &TypeConstructorArguments| {
            let [min, max, default] = args.value_args.as_slice() else {
                return None;
            };
            if !args.type_args.is_empty() {
                return None;
            }
            let int = IntType::new(min.as_int()?, max.as_int()?, default.as_int()?).ok()?;
            Some(int.range())
        };
        Some(bounds(this_args)?.compare(&bounds(other_args)?))
    }
}

/// `Rational[min, max, default]`
pub(super) struct RationalConstructor;

impl TypeConstructor for RationalConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Rational", type_ref, type_args, value_args);
        args.types_exactly(0)?.values_between(3, 3)?;
        let rational = RationalType::new(args.rational(0)?, args.rational(1)?, args.rational(2)?)?;
        Ok(args.build(TypeKind::Rational(rational)))
    }

    fn compare_subtype_args(
        &self,
        _ts: &TypeSystem,
        this_args: &TypeConstructorArguments,
        other_args: &TypeConstructorArguments,
    ) -> Option<SubtypeOrder> {
        let bounds = |args: &TypeConstructorArguments| {
            let [min, max, default] = args.value_args.as_slice() else {
                return None;
            };
            if !args.type_args.is_empty() {
                return None;
            }
            let rational = RationalType::new(
                min.as_rational()?,
                max.as_rational()?,
                default.as_rational()?,
            )
            .ok()?;
            Some(rational.range())
        };
        Some(bounds(this_args)?.compare(&bounds(other_args)?))
    }
}

// ============================================================================
// Enums
// ============================================================================

/// `Enum[(#v1, ...), default_index]`, the default index defaults to 0.
pub(super) struct EnumConstructor;

impl TypeConstructor for EnumConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Enum", type_ref, type_args, value_args);
        args.types_exactly(0)?.values_between(1, 2)?;
        let values = args.identifiers(0)?;
        let default_index = args.count_or(1, 0)?;
        Ok(args.build(TypeKind::Enum(EnumType::new(values, default_index)?)))
    }
}

/// `EnumUnion<E1, ...>`
pub(super) struct EnumUnionConstructor;

impl TypeConstructor for EnumUnionConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("EnumUnion", type_ref, type_args, value_args);
        args.types_at_least(1)?.values_between(0, 0)?;
        let parts = (0..type_args.len())
            .map(|i| args.enum_type(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(args.build(TypeKind::Enum(EnumType::union(parts)?)))
    }
}

/// `AddBlankToEnum<E>`: `E` plus the blank value, which becomes the default.
pub(super) struct AddBlankToEnumConstructor;

impl TypeConstructor for AddBlankToEnumConstructor {
    fn construct_type(
        &self,
        ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("AddBlankToEnum", type_ref, type_args, value_args);
        args.types_exactly(1)?.values_between(0, 0)?;
        let with_blank = args.enum_type(0)?.with_blank(ts.builtins().blank.clone())?;
        Ok(args.build(TypeKind::Enum(with_blank)))
    }

    // Adding the blank only widens the wrapped enum.
    fn compare_subtype_ref(
        &self,
        ts: &TypeSystem,
        this_args: &TypeConstructorArguments,
        other: &TypeRef,
    ) -> Option<SubtypeOrder> {
        if this_args.type_args.as_slice() != std::slice::from_ref(other)
            || !this_args.value_args.is_empty()
        {
            return None;
        }
        let inner = ts.try_resolve(other)?;
        let has_blank = inner.as_enum()?.index_of(&ts.builtins().blank).is_some();
        Some(if has_blank {
            SubtypeOrder::Equivalent
        } else {
            SubtypeOrder::Supertype
        })
    }
}

// ============================================================================
// Records
// ============================================================================

/// `Record<T1, ...>[((#f1, optionality), ...)]`
pub(super) struct RecordConstructor;

impl TypeConstructor for RecordConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        const LAYOUT: &str = "tuple of (#field, optionality) pairs";
        let args = Args::new("Record", type_ref, type_args, value_args);
        args.values_between(1, 1)?;
        let layout = args.tuple(0, LAYOUT)?;
        args.types_exactly(layout.len())?;

        let fields = layout
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let (id, optionality) = match entry.as_tuple().map(|t| t.0.as_slice()) {
                    Some([id, code]) => (id.as_identifier(), code.as_int()),
                    _ => (None, None),
                };
                match (id, optionality.and_then(Optionality::from_code)) {
                    (Some(id), Some(optionality)) => Ok(FieldInfo {
                        id: id.clone(),
                        type_ref: args.type_arg(i),
                        optionality,
                    }),
                    _ => Err(args.wrong_value(0, LAYOUT)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(args.build(TypeKind::Record(RecordType::new(fields)?)))
    }
}

/// `RecordWithVariants<T1, ...>[(#tag1, ...), default_tag, ((#f1, (#tag, ...)), ...)]`
pub(super) struct RecordWithVariantsConstructor;

impl TypeConstructor for RecordWithVariantsConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        const LAYOUT: &str = "tuple of (#field, (#tag, ...)) pairs";
        let args = Args::new("RecordWithVariants", type_ref, type_args, value_args);
        args.values_between(3, 3)?;
        let tags = args.identifiers(0)?;
        let default_tag = args.count(1)?;
        let layout = args.tuple(2, LAYOUT)?;
        args.types_exactly(layout.len())?;

        let fields = layout
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let Some([id, field_tags]) = entry.as_tuple().map(|t| t.0.as_slice()) else {
                    return Err(args.wrong_value(2, LAYOUT));
                };
                let id = id.as_identifier().ok_or_else(|| args.wrong_value(2, LAYOUT))?;
                let field_tags = field_tags
                    .as_tuple()
                    .ok_or_else(|| args.wrong_value(2, LAYOUT))?
                    .0
                    .iter()
                    .map(|tag| tag.as_identifier().cloned())
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| args.wrong_value(2, LAYOUT))?;
                Ok(VariantFieldInfo {
                    id: id.clone(),
                    type_ref: args.type_arg(i),
                    tags: field_tags,
                })
            })
            .collect::<Result<Vec<_>, TypeSystemError>>()?;
        let variants = RecordWithVariantsType::new(tags, default_tag, fields)?;
        Ok(args.build(TypeKind::RecordWithVariants(variants)))
    }
}

// ============================================================================
// Arrays, tuples, sums
// ============================================================================

/// `Array<T>[min, max, initial]`, max `-1` means unbounded.
pub(super) struct ArrayConstructor;

fn array_size_range(values: &[ValueHolder]) -> Option<Range<usize>> {
    let [min, max, ..] = values else {
        return None;
    };
    let min = usize::try_from(min.as_int()?).ok()?;
    let max = match max.as_int()? {
        -1 => None,
        max => Some(usize::try_from(max).ok()?),
    };
    Some(Range { min, max })
}

/// Entry type and size range of array arguments that would construct.
fn constructible_array<'a>(
    ts: &TypeSystem,
    args: &'a TypeConstructorArguments,
) -> Option<(&'a TypeRef, Range<usize>)> {
    let [entry] = args.type_args.as_slice() else {
        return None;
    };
    let [_, _, initial] = args.value_args.as_slice() else {
        return None;
    };
    ts.try_resolve(entry)?;
    let sizes = array_size_range(&args.value_args)?;
    let initial = usize::try_from(initial.as_int()?).ok()?;
    ArrayType::new(entry.clone(), sizes, initial).ok()?;
    Some((entry, sizes))
}

impl TypeConstructor for ArrayConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Array", type_ref, type_args, value_args);
        args.types_exactly(1)?.values_between(3, 3)?;
        args.count(0)?;
        if args.int(1)? < -1 {
            return Err(args.wrong_value(1, "non-negative int or -1"));
        }
        let size_range = array_size_range(value_args)
            .ok_or_else(|| args.wrong_value(1, "non-negative int or -1"))?;
        let array = ArrayType::new(args.type_arg(0), size_range, args.count(2)?)?;
        Ok(args.build(TypeKind::Array(array)))
    }

    fn compare_subtype_args(
        &self,
        ts: &TypeSystem,
        this_args: &TypeConstructorArguments,
        other_args: &TypeConstructorArguments,
    ) -> Option<SubtypeOrder> {
        let (mine, my_sizes) = constructible_array(ts, this_args)?;
        let (theirs, their_sizes) = constructible_array(ts, other_args)?;
        let entries = ts.compare_subtype(mine, theirs);
        Some(compare_arrays(entries, &my_sizes, &their_sizes))
    }
}

/// `Tuple<T1, ...>`
pub(super) struct TupleConstructor;

impl TypeConstructor for TupleConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Tuple", type_ref, type_args, value_args);
        args.values_between(0, 0)?;
        let elements = (0..type_args.len()).map(|i| args.type_arg(i)).collect();
        Ok(args.build(TypeKind::Tuple(TupleType::new(elements))))
    }
}

/// `Sum<T1, ...>[default]`, the default summand defaults to 0.
pub(super) struct SumConstructor;

impl TypeConstructor for SumConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Sum", type_ref, type_args, value_args);
        args.types_at_least(1)?.values_between(0, 1)?;
        let summands = (0..type_args.len()).map(|i| args.type_arg(i)).collect();
        let sum = SumType::new(summands, args.count_or(0, 0)?)?;
        Ok(args.build(TypeKind::Sum(sum)))
    }
}

// ============================================================================
// Generics and maps
// ============================================================================

/// `Generic<W>[num_variables]`
pub(super) struct GenericConstructor;

impl TypeConstructor for GenericConstructor {
    fn construct_type(
        &self,
        ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Generic", type_ref, type_args, value_args);
        args.types_exactly(1)?.values_between(1, 1)?;
        let generic = GenericType::new(
            args.type_arg(0),
            args.count(0)?,
            ts.builtins().substitution_ids(),
        );
        Ok(args.build(TypeKind::Generic(generic)))
    }
}

/// `TypeVar[index, level]`
pub(super) struct TypeVarConstructor;

impl TypeConstructor for TypeVarConstructor {
    fn construct_type(
        &self,
        _ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("TypeVar", type_ref, type_args, value_args);
        args.types_exactly(0)?.values_between(2, 2)?;
        args.count(0)?;
        args.count(1)?;
        let (index, level) =
            type_variable_args(value_args).ok_or_else(|| args.wrong_value(0, "non-negative int"))?;
        Ok(args.build(TypeKind::TypeVariable(TypeVariableType { index, level })))
    }
}

/// `Map<S, T>[fallback]`, fallback 0 maps to one target, 1 is the identity.
pub(super) struct MapConstructor;

impl TypeConstructor for MapConstructor {
    fn construct_type(
        &self,
        ts: &TypeSystem,
        type_ref: &TypeRef,
        type_args: &[Arc<Type>],
        value_args: &[ValueHolder],
    ) -> Result<Type, TypeSystemError> {
        let args = Args::new("Map", type_ref, type_args, value_args);
        args.types_exactly(2)?.values_between(0, 1)?;
        let code = if value_args.is_empty() { 0 } else { args.int(0)? };
        let fallback = FallbackKind::from_code(code)
            .ok_or_else(|| args.wrong_value(0, "fallback code 0 or 1"))?;
        let map = MapType::new(ts, args.type_arg(0), args.type_arg(1), fallback)?;
        Ok(args.build(TypeKind::Map(map)))
    }
}
