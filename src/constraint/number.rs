//! Numeric interval constraints.
//!
//! A [`NumberConstraint`] is a closed interval over arbitrary-precision
//! integers. Either bound may be absent, meaning unbounded on that side; an
//! interval with both bounds absent carries no information and is never
//! constructed (the fallible constructor rejects it). The interval
//! invariant `min <= max` is enforced at construction: an inverted pair
//! describes an infeasible path and surfaces as `None`.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// An inclusive numeric interval with optional (unbounded) endpoints.
///
/// # Examples
///
/// ```rust
/// use num_bigint::BigInt;
/// use pathscope::constraint::NumberConstraint;
///
/// let positive = NumberConstraint::at_least(1);
/// assert!(positive.contains(&BigInt::from(42)));
/// assert!(!positive.contains(&BigInt::from(0)));
///
/// // Inverted bounds are an infeasible interval, not a panic.
/// assert!(NumberConstraint::new(Some(5.into()), Some(3.into())).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumberConstraint {
    min: Option<BigInt>,
    max: Option<BigInt>,
}

impl NumberConstraint {
    /// Creates an interval from optional bounds.
    ///
    /// Returns `None` when both bounds are absent (no information) or when
    /// `min > max` (infeasible).
    #[must_use]
    pub fn new(min: Option<BigInt>, max: Option<BigInt>) -> Option<Self> {
        match (&min, &max) {
            (None, None) => None,
            (Some(lo), Some(hi)) if lo > hi => None,
            _ => Some(Self { min, max }),
        }
    }

    /// Creates the single-point interval `[value, value]`.
    #[must_use]
    pub fn exact(value: impl Into<BigInt>) -> Self {
        let value = value.into();
        Self {
            min: Some(value.clone()),
            max: Some(value),
        }
    }

    /// Creates the half-open interval `[value, +inf)`.
    #[must_use]
    pub fn at_least(value: impl Into<BigInt>) -> Self {
        Self {
            min: Some(value.into()),
            max: None,
        }
    }

    /// Creates the half-open interval `(-inf, value]`.
    #[must_use]
    pub fn at_most(value: impl Into<BigInt>) -> Self {
        Self {
            min: None,
            max: Some(value.into()),
        }
    }

    /// Creates the closed interval `[min, max]`.
    ///
    /// Returns `None` when `min > max`.
    #[must_use]
    pub fn range(min: impl Into<BigInt>, max: impl Into<BigInt>) -> Option<Self> {
        Self::new(Some(min.into()), Some(max.into()))
    }

    /// The lower bound, or `None` when unbounded below.
    #[must_use]
    pub const fn min(&self) -> Option<&BigInt> {
        self.min.as_ref()
    }

    /// The upper bound, or `None` when unbounded above.
    #[must_use]
    pub const fn max(&self) -> Option<&BigInt> {
        self.max.as_ref()
    }

    /// The single value of a point interval, or `None` for wider ranges.
    #[must_use]
    pub fn single_value(&self) -> Option<&BigInt> {
        match (&self.min, &self.max) {
            (Some(lo), Some(hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }

    /// Returns `true` if the interval is exactly `[0, 0]`.
    #[must_use]
    pub fn is_zero_only(&self) -> bool {
        self.single_value().is_some_and(Zero::is_zero)
    }

    /// Returns `true` if the interval admits a negative value.
    #[must_use]
    pub fn can_be_negative(&self) -> bool {
        self.min.as_ref().is_none_or(Signed::is_negative)
    }

    /// Returns `true` if the interval admits a positive value.
    #[must_use]
    pub fn can_be_positive(&self) -> bool {
        self.max.as_ref().is_none_or(Signed::is_positive)
    }

    /// Returns `true` if every admitted value is `>= 0`.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.min.as_ref().is_some_and(|lo| !lo.is_negative())
    }

    /// Returns `true` if every admitted value is `<= 0`.
    #[must_use]
    pub fn is_non_positive(&self) -> bool {
        self.max.as_ref().is_some_and(|hi| !hi.is_positive())
    }

    /// Returns `true` if every admitted value is `< 0`.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.max.as_ref().is_some_and(Signed::is_negative)
    }

    /// Returns `true` if every admitted value is `> 0`.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.min.as_ref().is_some_and(Signed::is_positive)
    }

    /// Returns `true` if `value` lies within the interval.
    #[must_use]
    pub fn contains(&self, value: &BigInt) -> bool {
        self.min.as_ref().is_none_or(|lo| lo <= value)
            && self.max.as_ref().is_none_or(|hi| hi >= value)
    }

    /// Intersects two intervals.
    ///
    /// Returns `None` when the intersection is empty - the combined
    /// constraints disagree and the path carrying both is infeasible.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let min = tighter(self.min.as_ref(), other.min.as_ref(), |a, b| a >= b);
        let max = tighter(self.max.as_ref(), other.max.as_ref(), |a, b| a <= b);
        Self::new(min, max)
    }

    /// Narrows the interval by excluding a single value.
    ///
    /// Interior holes are not representable, so only three cases narrow:
    /// a point interval equal to `value` becomes infeasible (`None`), and a
    /// `value` sitting exactly on an endpoint moves that endpoint inward by
    /// one. Any other `value` leaves the interval unchanged.
    #[must_use]
    pub fn excluding(&self, value: &BigInt) -> Option<Self> {
        if self.single_value() == Some(value) {
            return None;
        }
        if self.min.as_ref() == Some(value) {
            return Self::new(Some(value + BigInt::one()), self.max.clone());
        }
        if self.max.as_ref() == Some(value) {
            return Self::new(self.min.clone(), Some(value - BigInt::one()));
        }
        Some(self.clone())
    }

    /// Returns `true` if the two intervals share no value.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersect(other).is_none()
    }

    /// Returns `true` if every value here is strictly below every value of
    /// `other`.
    #[must_use]
    pub fn is_strictly_below(&self, other: &Self) -> bool {
        match (&self.max, &other.min) {
            (Some(hi), Some(lo)) => hi < lo,
            _ => false,
        }
    }

    /// Returns `true` if every value here is strictly above every value of
    /// `other`.
    #[must_use]
    pub fn is_strictly_above(&self, other: &Self) -> bool {
        match (&self.min, &other.max) {
            (Some(lo), Some(hi)) => lo > hi,
            _ => false,
        }
    }
}

/// Picks the tighter of two optional bounds under `prefer_first`.
fn tighter<'a>(
    first: Option<&'a BigInt>,
    second: Option<&'a BigInt>,
    prefer_first: impl Fn(&BigInt, &BigInt) -> bool,
) -> Option<BigInt> {
    match (first, second) {
        (Some(a), Some(b)) => Some(if prefer_first(a, b) { a } else { b }.clone()),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

impl fmt::Display for NumberConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.min {
            Some(lo) => write!(f, "[{lo}..")?,
            None => write!(f, "(..")?,
        }
        match &self.max {
            Some(hi) => write!(f, "{hi}]"),
            None => write!(f, ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_min_le_max() {
        assert!(NumberConstraint::range(3, 5).is_some());
        assert!(NumberConstraint::range(5, 5).is_some());
        assert!(NumberConstraint::range(5, 3).is_none());
        assert!(NumberConstraint::new(None, None).is_none());
    }

    #[test]
    fn test_contains() {
        let range = NumberConstraint::range(-2, 7).unwrap();
        assert!(range.contains(&BigInt::from(-2)));
        assert!(range.contains(&BigInt::from(0)));
        assert!(range.contains(&BigInt::from(7)));
        assert!(!range.contains(&BigInt::from(8)));

        let open = NumberConstraint::at_least(10);
        assert!(open.contains(&BigInt::from(1_000_000)));
        assert!(!open.contains(&BigInt::from(9)));
    }

    #[test]
    fn test_sign_predicates() {
        let mixed = NumberConstraint::range(-5, 5).unwrap();
        assert!(mixed.can_be_negative());
        assert!(mixed.can_be_positive());
        assert!(!mixed.is_non_negative());

        let nonneg = NumberConstraint::at_least(0);
        assert!(nonneg.is_non_negative());
        assert!(!nonneg.can_be_negative());
        assert!(nonneg.can_be_positive());

        let negative = NumberConstraint::at_most(-1);
        assert!(negative.is_negative());
        assert!(!negative.can_be_positive());
    }

    #[test]
    fn test_intersect() {
        let a = NumberConstraint::range(0, 10).unwrap();
        let b = NumberConstraint::range(5, 20).unwrap();
        assert_eq!(a.intersect(&b), NumberConstraint::range(5, 10));

        let open = NumberConstraint::at_least(8);
        assert_eq!(a.intersect(&open), NumberConstraint::range(8, 10));

        let disjoint = NumberConstraint::range(11, 12).unwrap();
        assert!(a.intersect(&disjoint).is_none());
        assert!(a.is_disjoint(&disjoint));
    }

    #[test]
    fn test_excluding_endpoints() {
        let range = NumberConstraint::range(0, 5).unwrap();
        assert_eq!(
            range.excluding(&BigInt::from(0)),
            NumberConstraint::range(1, 5)
        );
        assert_eq!(
            range.excluding(&BigInt::from(5)),
            NumberConstraint::range(0, 4)
        );
        // Interior values cannot narrow a contiguous interval.
        assert_eq!(range.excluding(&BigInt::from(3)), Some(range.clone()));
        // A point interval is eliminated entirely.
        assert!(NumberConstraint::exact(7).excluding(&BigInt::from(7)).is_none());
    }

    #[test]
    fn test_ordering_predicates() {
        let low = NumberConstraint::range(0, 4).unwrap();
        let high = NumberConstraint::range(5, 9).unwrap();
        assert!(low.is_strictly_below(&high));
        assert!(high.is_strictly_above(&low));
        assert!(!low.is_strictly_above(&high));

        let overlapping = NumberConstraint::range(4, 9).unwrap();
        assert!(!low.is_strictly_below(&overlapping));
    }

    #[test]
    fn test_display() {
        assert_eq!(NumberConstraint::range(1, 5).unwrap().to_string(), "[1..5]");
        assert_eq!(NumberConstraint::at_least(6).to_string(), "[6..)");
        assert_eq!(NumberConstraint::at_most(0).to_string(), "(..0]");
    }
}
