// types/numeric.rs
//
// Range-restricted ints and rationals.

use super::TypeKind;
use crate::errors::TypeSystemError;
use crate::subtype::{Range, SubtypeOrder};
use crate::value::{Rational, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntType {
    range: Range<i64>,
    default: i64,
}

impl IntType {
    /// The type of the `Int` primitive.
    pub const UNBOUNDED: IntType = IntType {
        range: Range {
            min: i64::MIN,
            max: Some(i64::MAX),
        },
        default: 0,
    };

    pub fn new(min: i64, max: i64, default: i64) -> Result<Self, TypeSystemError> {
        check_bounds("Int", min, max, default)?;
        Ok(Self {
            range: Range::new(min, max),
            default,
        })
    }

    pub fn range(&self) -> Range<i64> {
        self.range
    }

    pub fn default_value(&self) -> i64 {
        self.default
    }

    fn rational_range(&self) -> Range<Rational> {
        self.range.map(Rational::from_int)
    }

    pub(super) fn is_valid_value(&self, value: &Value) -> bool {
        matches!(value, Value::Int(v) if self.range.contains(*v))
    }

    // Ints are rationals, so an int range compares with a rational range
    // directly.
    pub(super) fn compare(&self, other: &TypeKind) -> SubtypeOrder {
        match other {
            TypeKind::Int(other) => self.range.compare(&other.range),
            TypeKind::Rational(other) => self.rational_range().compare(&other.range),
            _ => SubtypeOrder::Unrelated,
        }
    }
}

/// A rational range. Int values are accepted as rationals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalType {
    range: Range<Rational>,
    default: Rational,
}

impl RationalType {
    /// The type of the `Rational` primitive.
    pub const UNBOUNDED: RationalType = RationalType {
        range: Range {
            min: Rational::from_int(i64::MIN),
            max: Some(Rational::from_int(i64::MAX)),
        },
        default: Rational::ZERO,
    };

    pub fn new(min: Rational, max: Rational, default: Rational) -> Result<Self, TypeSystemError> {
        check_bounds("Rational", min, max, default)?;
        Ok(Self {
            range: Range::new(min, max),
            default,
        })
    }

    pub fn range(&self) -> Range<Rational> {
        self.range
    }

    pub fn default_value(&self) -> Rational {
        self.default
    }

    pub(super) fn is_valid_value(&self, value: &Value) -> bool {
        matches!(value, Value::Int(_) | Value::Rational(_))
            && value.as_rational().is_some_and(|r| self.range.contains(r))
    }

    pub(super) fn compare(&self, other: &TypeKind) -> SubtypeOrder {
        match other {
            TypeKind::Rational(other) => self.range.compare(&other.range),
            TypeKind::Int(other) => other.compare(&TypeKind::Rational(self.clone())).reverse(),
            _ => SubtypeOrder::Unrelated,
        }
    }
}

fn check_bounds<T: Ord + std::fmt::Display>(
    constructor: &str,
    min: T,
    max: T,
    default: T,
) -> Result<(), TypeSystemError> {
    if min > max {
        return Err(TypeSystemError::InvalidRange {
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    if default < min || default > max {
        return Err(TypeSystemError::InvalidDefault {
            constructor: constructor.to_string(),
            reason: format!("{default} is outside [{min}, {max}]"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_checks_bounds() {
        assert!(matches!(
            IntType::new(5, 1, 3),
            Err(TypeSystemError::InvalidRange { .. })
        ));
        assert!(matches!(
            IntType::new(0, 10, 11),
            Err(TypeSystemError::InvalidDefault { .. })
        ));
        let half = Rational::new(1, 2).unwrap();
        assert!(RationalType::new(Rational::ZERO, half, half).is_ok());
    }

    #[test]
    fn int_against_rational_ranges() {
        let int = IntType::new(0, 4, 0).unwrap();
        let wide = RationalType::new(
            Rational::from_int(-1),
            Rational::from_int(4),
            Rational::ZERO,
        )
        .unwrap();
        assert_eq!(int.compare(&TypeKind::Rational(wide.clone())), SubtypeOrder::Subtype);
        assert_eq!(wide.compare(&TypeKind::Int(int)), SubtypeOrder::Supertype);
    }

    #[test]
    fn rational_accepts_ints_in_range() {
        let t = RationalType::new(Rational::ZERO, Rational::from_int(1), Rational::ZERO).unwrap();
        assert!(t.is_valid_value(&Value::Int(1)));
        assert!(t.is_valid_value(&Value::Rational(Rational::new(1, 3).unwrap())));
        assert!(!t.is_valid_value(&Value::Int(2)));
        assert!(!t.is_valid_value(&Value::from("1")));
    }
}
