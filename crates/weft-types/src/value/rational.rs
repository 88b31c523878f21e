// src/value/rational.rs

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An exact fraction, always stored in lowest terms with a positive
/// denominator so that derived equality and hashing agree with numeric
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64)", into = "(i64, i64)")]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    /// Returns `None` for a zero denominator or when normalizing overflows.
    pub fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1);
        let (mut num, mut den) = (i128::from(num), i128::from(den));
        num /= i128::from(g);
        den /= i128::from(g);
        if den < 0 {
            num = -num;
            den = -den;
        }
        Some(Self {
            num: i64::try_from(num).ok()?,
            den: i64::try_from(den).ok()?,
        })
    }

    pub const fn from_int(value: i64) -> Self {
        Self { num: value, den: 1 }
    }

    pub fn numerator(self) -> i64 {
        self.num
    }

    pub fn denominator(self) -> i64 {
        self.den
    }

    pub fn is_integer(self) -> bool {
        self.den == 1
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross multiplication keeps the order.
        let lhs = i128::from(self.num) * i128::from(other.den);
        let rhs = i128::from(other.num) * i128::from(self.den);
        lhs.cmp(&rhs)
    }
}

impl TryFrom<(i64, i64)> for Rational {
    type Error = String;

    fn try_from((num, den): (i64, i64)) -> Result<Self, Self::Error> {
        Rational::new(num, den).ok_or_else(|| format!("invalid rational {num}/{den}"))
    }
}

impl From<Rational> for (i64, i64) {
    fn from(r: Rational) -> Self {
        (r.num, r.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_sign_and_terms() {
        let r = Rational::new(4, -8).unwrap();
        assert_eq!((r.numerator(), r.denominator()), (-1, 2));
        assert_eq!(Rational::new(2, 4), Rational::new(1, 2));
        assert!(Rational::new(1, 0).is_none());
    }

    #[test]
    fn orders_numerically() {
        let third = Rational::new(1, 3).unwrap();
        let half = Rational::new(1, 2).unwrap();
        assert!(third < half);
        assert!(Rational::from_int(-1) < third);
    }

    #[test]
    fn extreme_values_do_not_panic() {
        assert!(Rational::new(i64::MIN, -1).is_none());
        assert_eq!(Rational::new(i64::MIN, i64::MIN), Some(Rational::from_int(1)));
    }
}
