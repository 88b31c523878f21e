// types/map.rs
//
// Map types. A map is edited as a whole through its entry list and is not
// navigable by path.

use super::{TypeKind, default_of};
use crate::errors::TypeSystemError;
use crate::subtype::SubtypeOrder;
use crate::type_ref::TypeRef;
use crate::value::{MapEntry, MapValue, Value};
use crate::TypeSystem;

/// The fallback entry a new map value starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackKind {
    /// Every source maps to the target type's default.
    AllToOne,
    /// Every source maps to itself.
    AllToSame,
}

impl FallbackKind {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(FallbackKind::AllToOne),
            1 => Some(FallbackKind::AllToSame),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            FallbackKind::AllToOne => 0,
            FallbackKind::AllToSame => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapType {
    source: TypeRef,
    target: TypeRef,
    default_fallback: FallbackKind,
}

impl MapType {
    /// An identity fallback needs equivalent source and target types.
    pub fn new(
        ts: &TypeSystem,
        source: TypeRef,
        target: TypeRef,
        default_fallback: FallbackKind,
    ) -> Result<Self, TypeSystemError> {
        if default_fallback == FallbackKind::AllToSame
            && ts.compare_subtype(&source, &target) != SubtypeOrder::Equivalent
        {
            return Err(TypeSystemError::IncompatibleFallback {
                source_type: source.to_string(),
                target_type: target.to_string(),
            });
        }
        Ok(Self {
            source,
            target,
            default_fallback,
        })
    }

    pub fn source(&self) -> &TypeRef {
        &self.source
    }

    pub fn target(&self) -> &TypeRef {
        &self.target
    }

    pub fn default_fallback(&self) -> FallbackKind {
        self.default_fallback
    }

    pub(super) fn create_value(&self, ts: &TypeSystem) -> Result<Value, TypeSystemError> {
        let fallback = match self.default_fallback {
            FallbackKind::AllToOne => MapEntry::AllToOne {
                target: default_of(ts, &self.target)?,
            },
            FallbackKind::AllToSame => MapEntry::AllToSame,
        };
        Ok(Value::Map(MapValue::new(
            self.source.clone(),
            self.target.clone(),
            vec![fallback],
        )))
    }

    /// Declared types must match and every entry must be well typed. Where
    /// the fallback sits is left to `MapValue::validate`.
    pub(super) fn is_valid_value(&self, ts: &TypeSystem, value: &Value) -> bool {
        let Value::Map(map) = value else {
            return false;
        };
        ts.compare_subtype(&map.source_type, &self.source) == SubtypeOrder::Equivalent
            && ts.compare_subtype(&map.target_type, &self.target) == SubtypeOrder::Equivalent
            && map.type_problem(ts).is_none()
    }

    /// Sources compare contravariantly, targets covariantly.
    pub(super) fn compare(&self, ts: &TypeSystem, other: &TypeKind) -> SubtypeOrder {
        let TypeKind::Map(other) = other else {
            return SubtypeOrder::Unrelated;
        };
        let sources = ts.compare_subtype(&other.source, &self.source);
        let targets = ts.compare_subtype(&self.target, &other.target);
        if sources == SubtypeOrder::Unrelated || targets == SubtypeOrder::Unrelated {
            return SubtypeOrder::Unrelated;
        }
        sources.product(targets)
    }
}
