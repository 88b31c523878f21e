// type_system/builtins.rs
//
// Ids of the built-in types and constructors, plus builders for refs to
// them.

use weft_identity::{Identifier, IdentifierRegistry};

use crate::errors::TypeSystemError;
use crate::type_ref::{RegisteredTypeId, SubstitutionIds, TypeConstructorId, TypeRef};
use crate::types::{FallbackKind, NativeEnum, Optionality};
use crate::value::{Rational, TupleValue, Value, ValueHolder};

/// Built-in ids, interned in the registry the type system was created with.
#[derive(Debug, Clone)]
pub struct BuiltinTypes {
    pub string_id: RegisteredTypeId,
    pub file_path_id: RegisteredTypeId,
    pub int_primitive_id: RegisteredTypeId,
    pub rational_primitive_id: RegisteredTypeId,

    pub int_id: TypeConstructorId,
    pub rational_id: TypeConstructorId,
    pub enum_id: TypeConstructorId,
    pub enum_union_id: TypeConstructorId,
    pub add_blank_to_enum_id: TypeConstructorId,
    pub record_id: TypeConstructorId,
    pub record_with_variants_id: TypeConstructorId,
    pub array_id: TypeConstructorId,
    pub tuple_id: TypeConstructorId,
    pub sum_id: TypeConstructorId,
    pub generic_id: TypeConstructorId,
    pub type_var_id: TypeConstructorId,
    pub map_id: TypeConstructorId,

    /// The value `AddBlankToEnum` adds.
    pub blank: Identifier,
}

impl BuiltinTypes {
    pub(super) fn new(registry: &mut IdentifierRegistry) -> Result<Self, TypeSystemError> {
        let mut primitive = |name: &str| registry.intern(name).map(RegisteredTypeId);
        let string_id = primitive("String")?;
        let file_path_id = primitive("FilePath")?;
        let int_primitive_id = primitive("Int")?;
        let rational_primitive_id = primitive("Rational")?;
        let blank = registry.intern("_")?;

        let mut constructor = |name: &str| registry.intern(name).map(TypeConstructorId);
        Ok(Self {
            string_id,
            file_path_id,
            int_primitive_id,
            rational_primitive_id,
            int_id: constructor("Int")?,
            rational_id: constructor("Rational")?,
            enum_id: constructor("Enum")?,
            enum_union_id: constructor("EnumUnion")?,
            add_blank_to_enum_id: constructor("AddBlankToEnum")?,
            record_id: constructor("Record")?,
            record_with_variants_id: constructor("RecordWithVariants")?,
            array_id: constructor("Array")?,
            tuple_id: constructor("Tuple")?,
            sum_id: constructor("Sum")?,
            generic_id: constructor("Generic")?,
            type_var_id: constructor("TypeVar")?,
            map_id: constructor("Map")?,
            blank,
        })
    }

    pub fn substitution_ids(&self) -> SubstitutionIds {
        SubstitutionIds {
            generic: self.generic_id.clone(),
            type_var: self.type_var_id.clone(),
        }
    }

    pub fn string(&self) -> TypeRef {
        TypeRef::Primitive(self.string_id.clone())
    }

    pub fn file_path(&self) -> TypeRef {
        TypeRef::Primitive(self.file_path_id.clone())
    }

    /// `Int[min, max, default]`
    pub fn int(&self, min: i64, max: i64, default: i64) -> TypeRef {
        let args = [min, max, default].map(|v| ValueHolder::new(Value::Int(v)));
        TypeRef::constructed(self.int_id.clone(), [], args)
    }

    /// `Rational[min, max, default]`
    pub fn rational(&self, min: Rational, max: Rational, default: Rational) -> TypeRef {
        let args = [min, max, default].map(|v| ValueHolder::new(Value::Rational(v)));
        TypeRef::constructed(self.rational_id.clone(), [], args)
    }

    /// `Enum[(#v1, ...), default_index]`
    pub fn enum_of(
        &self,
        values: impl IntoIterator<Item = Identifier>,
        default_index: usize,
    ) -> TypeRef {
        let values = tuple(values.into_iter().map(Value::Enum));
        TypeRef::constructed(self.enum_id.clone(), [], [values, int(default_index)])
    }

    /// The enum mirroring a native Rust enum.
    pub fn native_enum<E: NativeEnum>(
        &self,
        registry: &mut IdentifierRegistry,
    ) -> Result<TypeRef, TypeSystemError> {
        let values = crate::types::native_identifiers::<E>(registry)?;
        Ok(self.enum_of(values, E::DEFAULT_INDEX))
    }

    /// `EnumUnion<E1, ...>`
    pub fn enum_union(&self, enums: impl IntoIterator<Item = TypeRef>) -> TypeRef {
        TypeRef::constructed(self.enum_union_id.clone(), enums, [])
    }

    /// `AddBlankToEnum<E>`
    pub fn add_blank_to_enum(&self, inner: TypeRef) -> TypeRef {
        TypeRef::constructed(self.add_blank_to_enum_id.clone(), [inner], [])
    }

    /// `Record<T1, ...>[((#f1, opt1), ...)]`
    pub fn record(
        &self,
        fields: impl IntoIterator<Item = (Identifier, TypeRef, Optionality)>,
    ) -> TypeRef {
        let (layout, types): (Vec<_>, Vec<_>) = fields
            .into_iter()
            .map(|(id, type_ref, optionality)| {
                let pair = tuple([Value::Enum(id), Value::Int(optionality.code())]);
                (pair.into_value(), type_ref)
            })
            .unzip();
        TypeRef::constructed(self.record_id.clone(), types, [tuple(layout)])
    }

    /// `RecordWithVariants<T1, ...>[(#tag1, ...), default_tag, ((#f1, (#tagA, ...)), ...)]`
    pub fn record_with_variants(
        &self,
        tags: impl IntoIterator<Item = Identifier>,
        default_tag: usize,
        fields: impl IntoIterator<Item = (Identifier, TypeRef, Vec<Identifier>)>,
    ) -> TypeRef {
        let tags = tuple(tags.into_iter().map(Value::Enum));
        let (layout, types): (Vec<_>, Vec<_>) = fields
            .into_iter()
            .map(|(id, type_ref, field_tags)| {
                let field_tags = tuple(field_tags.into_iter().map(Value::Enum));
                let pair = tuple([Value::Enum(id), field_tags.into_value()]);
                (pair.into_value(), type_ref)
            })
            .unzip();
        TypeRef::constructed(
            self.record_with_variants_id.clone(),
            types,
            [tags, int(default_tag), tuple(layout)],
        )
    }

    /// `Array<T>[min, max, initial]`, with max `-1` for unbounded.
    pub fn array(&self, entry: TypeRef, min: usize, max: Option<usize>, initial: usize) -> TypeRef {
        let max = max.map_or(ValueHolder::new(Value::Int(-1)), int);
        TypeRef::constructed(self.array_id.clone(), [entry], [int(min), max, int(initial)])
    }

    /// `Tuple<T1, ...>`
    pub fn tuple(&self, elements: impl IntoIterator<Item = TypeRef>) -> TypeRef {
        TypeRef::constructed(self.tuple_id.clone(), elements, [])
    }

    /// `Sum<T1, ...>[default]`
    pub fn sum(&self, summands: impl IntoIterator<Item = TypeRef>, default: usize) -> TypeRef {
        TypeRef::constructed(self.sum_id.clone(), summands, [int(default)])
    }

    /// `Generic<W>[num_variables]`
    pub fn generic(&self, wrapped: TypeRef, num_variables: usize) -> TypeRef {
        TypeRef::constructed(self.generic_id.clone(), [wrapped], [int(num_variables)])
    }

    /// `TypeVar[index, level]`
    pub fn type_variable(&self, index: usize, level: usize) -> TypeRef {
        TypeRef::constructed(self.type_var_id.clone(), [], [int(index), int(level)])
    }

    /// `Map<S, T>[fallback]`
    pub fn map(&self, source: TypeRef, target: TypeRef, fallback: FallbackKind) -> TypeRef {
        let fallback = ValueHolder::new(Value::Int(fallback.code()));
        TypeRef::constructed(self.map_id.clone(), [source, target], [fallback])
    }
}

fn int(value: usize) -> ValueHolder {
    ValueHolder::new(Value::Int(i64::try_from(value).unwrap_or(i64::MAX)))
}

fn tuple(values: impl IntoIterator<Item = Value>) -> ValueHolder {
    ValueHolder::new(Value::Tuple(TupleValue(
        values.into_iter().map(ValueHolder::new).collect(),
    )))
}
