// src/subtype.rs
//
// The subtype-ordering algebra: the relation between two types and the
// product used to fold per-field and per-parameter relations together.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the value set of one type relates to the value set of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtypeOrder {
    /// Both types accept exactly the same values.
    Equivalent,
    /// Every value of the left type is a value of the right type.
    Subtype,
    /// Every value of the right type is a value of the left type.
    Supertype,
    /// The types share some values but neither contains the other.
    Intersecting,
    /// The types share no values.
    Disjoint,
    /// No relation could be established. Only produced while comparing
    /// mismatched type families; callers treat it as "not compatible".
    Unrelated,
}

impl SubtypeOrder {
    pub const ALL: [SubtypeOrder; 6] = [
        SubtypeOrder::Equivalent,
        SubtypeOrder::Subtype,
        SubtypeOrder::Supertype,
        SubtypeOrder::Intersecting,
        SubtypeOrder::Disjoint,
        SubtypeOrder::Unrelated,
    ];

    /// The order seen from the other side.
    pub fn reverse(self) -> Self {
        match self {
            SubtypeOrder::Subtype => SubtypeOrder::Supertype,
            SubtypeOrder::Supertype => SubtypeOrder::Subtype,
            other => other,
        }
    }

    pub fn is_subtype_or_equivalent(self) -> bool {
        matches!(self, SubtypeOrder::Equivalent | SubtypeOrder::Subtype)
    }

    pub fn is_related(self) -> bool {
        !matches!(self, SubtypeOrder::Disjoint | SubtypeOrder::Unrelated)
    }

    /// Fold another order into this one with [`subtype_product`].
    #[must_use]
    pub fn product(self, other: SubtypeOrder) -> Self {
        subtype_product(self, other)
    }
}

impl fmt::Display for SubtypeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubtypeOrder::Equivalent => "equivalent",
            SubtypeOrder::Subtype => "subtype",
            SubtypeOrder::Supertype => "supertype",
            SubtypeOrder::Intersecting => "intersecting",
            SubtypeOrder::Disjoint => "disjoint",
            SubtypeOrder::Unrelated => "unrelated",
        };
        f.write_str(name)
    }
}

/// Combine two component orders into the order of the aggregate.
///
/// `Equivalent` is the identity and `Disjoint` absorbs everything. Equal
/// orders stay as they are, any other mix becomes `Intersecting`.
pub fn subtype_product(a: SubtypeOrder, b: SubtypeOrder) -> SubtypeOrder {
    use SubtypeOrder::*;
    match (a, b) {
        (Disjoint, _) | (_, Disjoint) => Disjoint,
        (Equivalent, other) | (other, Equivalent) => other,
        (a, b) if a == b => a,
        _ => Intersecting,
    }
}

/// A closed interval `[min, max]`. `max: None` means unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range<T> {
    pub min: T,
    pub max: Option<T>,
}

impl<T: Ord + Copy> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max: Some(max) }
    }

    pub fn unbounded(min: T) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }

    /// True when every element of `other` lies in `self`.
    pub fn contains_range(&self, other: &Range<T>) -> bool {
        if other.min < self.min {
            return false;
        }
        match (self.max, other.max) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => theirs <= mine,
        }
    }

    pub fn overlaps(&self, other: &Range<T>) -> bool {
        let below_other = self.max.is_some_and(|max| max < other.min);
        let above_other = other.max.is_some_and(|max| max < self.min);
        !below_other && !above_other
    }

    /// Interval containment order of `self` relative to `other`.
    pub fn compare(&self, other: &Range<T>) -> SubtypeOrder {
        let inside = other.contains_range(self);
        let around = self.contains_range(other);
        match (inside, around) {
            (true, true) => SubtypeOrder::Equivalent,
            (true, false) => SubtypeOrder::Subtype,
            (false, true) => SubtypeOrder::Supertype,
            (false, false) if self.overlaps(other) => SubtypeOrder::Intersecting,
            (false, false) => SubtypeOrder::Disjoint,
        }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Range<U> {
        Range {
            min: f(self.min),
            max: self.max.map(f),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, "[{}, ..]", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::SubtypeOrder::*;
    use super::*;

    #[test]
    fn product_identity_and_absorption() {
        for order in SubtypeOrder::ALL {
            assert_eq!(subtype_product(Equivalent, order), order);
            assert_eq!(subtype_product(order, Disjoint), Disjoint);
            assert_eq!(subtype_product(order, order), order);
        }
        assert_eq!(subtype_product(Subtype, Supertype), Intersecting);
        assert_eq!(subtype_product(Unrelated, Subtype), Intersecting);
    }

    #[test]
    fn product_is_commutative_and_associative() {
        for a in SubtypeOrder::ALL {
            for b in SubtypeOrder::ALL {
                assert_eq!(subtype_product(a, b), subtype_product(b, a));
                for c in SubtypeOrder::ALL {
                    assert_eq!(
                        subtype_product(subtype_product(a, b), c),
                        subtype_product(a, subtype_product(b, c))
                    );
                }
            }
        }
    }

    #[test]
    fn range_cases() {
        let r1 = Range::new(0, 4);
        let r2 = Range::new(1, 3);
        assert_eq!(r2.compare(&r1), Subtype);
        assert_eq!(r1.compare(&r2), Supertype);
        assert_eq!(r1.compare(&Range::new(0, 4)), Equivalent);
        assert_eq!(r1.compare(&Range::new(4, 8)), Intersecting);
        assert_eq!(r1.compare(&Range::new(5, 9)), Disjoint);
    }

    #[test]
    fn unbounded_ranges() {
        let open = Range::unbounded(0usize);
        assert_eq!(Range::new(0, 100).compare(&open), Subtype);
        assert_eq!(open.compare(&Range::unbounded(2)), Supertype);
        assert_eq!(Range::new(0, 1).compare(&Range::unbounded(2)), Disjoint);
        assert!(open.contains(usize::MAX));
    }

    #[test]
    fn reverse_swaps_only_sub_and_super() {
        assert_eq!(Subtype.reverse(), Supertype);
        assert_eq!(Intersecting.reverse(), Intersecting);
        assert!(Subtype.is_subtype_or_equivalent());
        assert!(!Unrelated.is_related());
    }

    fn arb_range() -> impl Strategy<Value = Range<i64>> {
        (-20i64..20, prop::option::of(0i64..20))
            .prop_map(|(min, span)| Range { min, max: span.map(|span| min + span) })
    }

    proptest! {
        #[test]
        fn compare_agrees_with_containment(a in arb_range(), b in arb_range()) {
            let order = a.compare(&b);
            prop_assert_eq!(b.compare(&a), order.reverse());
            prop_assert_eq!(order.is_subtype_or_equivalent(), b.contains_range(&a));
            prop_assert_eq!(order == Disjoint, !a.overlaps(&b));
            if let Some(max) = a.max {
                prop_assert_eq!(order.is_subtype_or_equivalent(), b.contains(a.min) && b.contains(max));
            }
        }
    }
}
