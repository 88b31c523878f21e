// types/enums.rs
//
// Enum types: an ordered, duplicate-free set of identifiers.

use rustc_hash::FxHashMap;
use weft_identity::{Identifier, IdentifierRegistry};

use super::TypeKind;
use crate::errors::TypeSystemError;
use crate::subtype::SubtypeOrder;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct EnumType {
    values: Vec<Identifier>,
    index: FxHashMap<Identifier, usize>,
    default_index: usize,
}

impl EnumType {
    pub fn new(values: Vec<Identifier>, default_index: usize) -> Result<Self, TypeSystemError> {
        let mut index = FxHashMap::default();
        index.reserve(values.len());
        for (i, value) in values.iter().enumerate() {
            if index.insert(value.clone(), i).is_some() {
                return Err(TypeSystemError::DuplicateEnumValue {
                    value: value.to_string(),
                });
            }
        }
        if default_index >= values.len() {
            return Err(TypeSystemError::InvalidDefault {
                constructor: "Enum".to_string(),
                reason: format!(
                    "default index {default_index} but only {} values",
                    values.len()
                ),
            });
        }
        Ok(Self {
            values,
            index,
            default_index,
        })
    }

    /// Union of several enums, keeping first-seen order. A name that occurs
    /// in more than one part must mean the same thing everywhere.
    pub fn union<'a>(
        parts: impl IntoIterator<Item = &'a EnumType>,
    ) -> Result<Self, TypeSystemError> {
        let mut values: Vec<Identifier> = Vec::new();
        let mut seen: FxHashMap<Identifier, usize> = FxHashMap::default();
        for part in parts {
            for value in &part.values {
                match seen.get(value) {
                    Some(&i) => {
                        if !compatible_meaning(&values[i], value) {
                            return Err(TypeSystemError::DiscriminatorMismatch {
                                value: value.to_string(),
                            });
                        }
                    }
                    None => {
                        seen.insert(value.clone(), values.len());
                        values.push(value.clone());
                    }
                }
            }
        }
        Self::new(values, 0)
    }

    /// This enum plus `blank`, which becomes the default.
    pub fn with_blank(&self, blank: Identifier) -> Result<Self, TypeSystemError> {
        if let Some(&i) = self.index.get(&blank) {
            let mut copy = self.clone();
            copy.default_index = i;
            return Ok(copy);
        }
        let mut values = self.values.clone();
        values.push(blank);
        let default_index = values.len() - 1;
        Self::new(values, default_index)
    }

    /// Build the enum described by a native Rust enum, registering one
    /// meaning per value under the native type's name.
    pub fn from_native<E: NativeEnum>(
        registry: &mut IdentifierRegistry,
    ) -> Result<Self, TypeSystemError> {
        Self::new(native_identifiers::<E>(registry)?, E::DEFAULT_INDEX)
    }

    /// Map an identifier of this enum back to the native value.
    pub fn native_value<E: NativeEnum>(&self, id: &Identifier) -> Option<E> {
        self.index.get(id)?;
        E::VALUES
            .iter()
            .find(|(_, name)| *name == id.name())
            .map(|(value, _)| *value)
    }

    pub fn values(&self) -> &[Identifier] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index_of(&self, id: &Identifier) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn identifier_at(&self, index: usize) -> Option<&Identifier> {
        self.values.get(index)
    }

    pub fn default_index(&self) -> usize {
        self.default_index
    }

    pub fn default_identifier(&self) -> &Identifier {
        &self.values[self.default_index]
    }

    /// Whether `id` names a value of this enum. On success the stored
    /// discriminator is copied onto `id`, resolving it.
    pub fn is_a_value(&self, id: &mut Identifier) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                id.set_discriminator(self.values[i].discriminator());
                true
            }
            None => false,
        }
    }

    /// Check that every value of this enum exists in `parent` with the same
    /// meaning.
    pub fn verify_supertype(&self, parent: &EnumType) -> Result<(), TypeSystemError> {
        for value in &self.values {
            let Some(&i) = parent.index.get(value) else {
                return Err(TypeSystemError::MissingEnumValue {
                    value: value.to_string(),
                });
            };
            if !parent.values[i].same_meaning(value) {
                return Err(TypeSystemError::DiscriminatorMismatch {
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    pub(super) fn is_valid_value(&self, value: &Value) -> bool {
        let Value::Enum(id) = value else {
            return false;
        };
        self.index
            .get(id)
            .is_some_and(|&i| compatible_meaning(&self.values[i], id))
    }

    pub(super) fn compare(&self, other: &TypeKind) -> SubtypeOrder {
        let TypeKind::Enum(other) = other else {
            return SubtypeOrder::Unrelated;
        };
        let common = self
            .values
            .iter()
            .filter(|value| other.index.contains_key(*value))
            .count();
        match (common == self.values.len(), common == other.values.len()) {
            (true, true) => SubtypeOrder::Equivalent,
            (true, false) => SubtypeOrder::Subtype,
            (false, true) => SubtypeOrder::Supertype,
            (false, false) if common > 0 => SubtypeOrder::Intersecting,
            (false, false) => SubtypeOrder::Disjoint,
        }
    }
}

/// Unresolved discriminators match anything.
fn compatible_meaning(a: &Identifier, b: &Identifier) -> bool {
    let (da, db) = (a.discriminator(), b.discriminator());
    !da.is_resolved() || !db.is_resolved() || da == db
}

pub(crate) fn native_identifiers<E: NativeEnum>(
    registry: &mut IdentifierRegistry,
) -> Result<Vec<Identifier>, TypeSystemError> {
    let label = std::any::type_name::<E>();
    E::VALUES
        .iter()
        .map(|(_, name)| registry.add(name, label).map_err(TypeSystemError::from))
        .collect()
}

/// A Rust enum whose values are mirrored by an enum type.
///
/// ```
/// use weft_types::NativeEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Interpolation {
///     Nearest,
///     Linear,
/// }
///
/// impl NativeEnum for Interpolation {
///     const VALUES: &'static [(Self, &'static str)] =
///         &[(Interpolation::Nearest, "nearest"), (Interpolation::Linear, "linear")];
/// }
/// ```
pub trait NativeEnum: Copy + Eq + 'static {
    /// Every native value with the identifier naming it, in enum order.
    const VALUES: &'static [(Self, &'static str)];
    const DEFAULT_INDEX: usize = 0;

    fn identifier_name(self) -> Option<&'static str> {
        Self::VALUES
            .iter()
            .find(|(value, _)| *value == self)
            .map(|(_, name)| *name)
    }
}

#[cfg(test)]
mod tests {
    use weft_identity::Discriminator;

    use super::*;

    fn ids(names: &[&str]) -> Vec<Identifier> {
        names.iter().map(|n| Identifier::new(n).unwrap()).collect()
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Fast,
        Slow,
    }

    impl NativeEnum for Mode {
        const VALUES: &'static [(Self, &'static str)] = &[(Mode::Fast, "fast"), (Mode::Slow, "slow")];
        const DEFAULT_INDEX: usize = 1;
    }

    #[test]
    fn duplicates_and_bad_defaults_are_errors() {
        assert!(matches!(
            EnumType::new(ids(&["a", "a"]), 0),
            Err(TypeSystemError::DuplicateEnumValue { .. })
        ));
        assert!(matches!(
            EnumType::new(ids(&["a"]), 1),
            Err(TypeSystemError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn index_round_trip() {
        let e = EnumType::new(ids(&["red", "green", "blue"]), 0).unwrap();
        for id in e.values() {
            assert_eq!(e.identifier_at(e.index_of(id).unwrap()), Some(id));
        }
    }

    #[test]
    fn is_a_value_copies_discriminator() {
        let stored = Identifier::new("x")
            .unwrap()
            .with_discriminator(Discriminator::new(4));
        let e = EnumType::new(vec![stored], 0).unwrap();
        let mut candidate = Identifier::new("x").unwrap();
        assert!(e.is_a_value(&mut candidate));
        assert_eq!(candidate.discriminator(), Discriminator::new(4));
        assert!(!e.is_a_value(&mut Identifier::new("y").unwrap()));
    }

    #[test]
    fn verify_supertype_checks_meaning() {
        let mut registry = IdentifierRegistry::new();
        let a1 = registry.add("a", "first").unwrap();
        let a2 = registry.add("a", "second").unwrap();
        let b = registry.add("b", "first").unwrap();

        let parent = EnumType::new(vec![a1.clone(), b.clone()], 0).unwrap();
        let child = EnumType::new(vec![a1], 0).unwrap();
        assert!(child.verify_supertype(&parent).is_ok());

        let renamed = EnumType::new(vec![a2], 0).unwrap();
        assert!(matches!(
            renamed.verify_supertype(&parent),
            Err(TypeSystemError::DiscriminatorMismatch { .. })
        ));
        assert!(matches!(
            parent.verify_supertype(&child),
            Err(TypeSystemError::MissingEnumValue { .. })
        ));
    }

    #[test]
    fn set_comparison() {
        let abc = EnumType::new(ids(&["a", "b", "c"]), 0).unwrap();
        let ab = EnumType::new(ids(&["b", "a"]), 0).unwrap();
        let cd = EnumType::new(ids(&["c", "d"]), 0).unwrap();
        let xy = EnumType::new(ids(&["x", "y"]), 0).unwrap();
        assert_eq!(ab.compare(&TypeKind::Enum(abc.clone())), SubtypeOrder::Subtype);
        assert_eq!(abc.compare(&TypeKind::Enum(ab.clone())), SubtypeOrder::Supertype);
        assert_eq!(abc.compare(&TypeKind::Enum(cd.clone())), SubtypeOrder::Intersecting);
        assert_eq!(cd.compare(&TypeKind::Enum(xy)), SubtypeOrder::Disjoint);
        assert_eq!(ab.compare(&TypeKind::Enum(ab.clone())), SubtypeOrder::Equivalent);
    }

    #[test]
    fn union_rejects_conflicting_meanings() {
        let mut registry = IdentifierRegistry::new();
        let a1 = registry.add("a", "first").unwrap();
        let a2 = registry.add("a", "second").unwrap();
        let left = EnumType::new(vec![a1.clone()], 0).unwrap();
        let same = EnumType::new(vec![a1, Identifier::new("z").unwrap()], 0).unwrap();
        let right = EnumType::new(vec![a2], 0).unwrap();

        assert_eq!(EnumType::union([&left, &same]).unwrap().len(), 2);
        assert!(matches!(
            EnumType::union([&left, &right]),
            Err(TypeSystemError::DiscriminatorMismatch { .. })
        ));
    }

    #[test]
    fn native_mapping() {
        let mut registry = IdentifierRegistry::new();
        let e = EnumType::from_native::<Mode>(&mut registry).unwrap();
        assert_eq!(e.default_identifier().name(), "slow");
        assert!(e.default_identifier().discriminator().is_resolved());
        let fast = e.identifier_at(0).unwrap();
        assert_eq!(e.native_value::<Mode>(fast), Some(Mode::Fast));
        assert_eq!(Mode::Slow.identifier_name(), Some("slow"));
    }
}
