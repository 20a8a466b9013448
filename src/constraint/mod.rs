//! Constraint domains tracked by the engine.
//!
//! Each domain is an independent axis of knowledge about a value:
//!
//! - [`ObjectConstraint`] - nullability of a reference
//! - [`BoolConstraint`] - boolean truth
//! - [`NumberConstraint`] - numeric interval with arbitrary-precision bounds
//! - [`CollectionConstraint`] - collection emptiness
//!
//! A symbolic value holds at most one constraint per domain. Setting a
//! constraint in one domain never disturbs another domain's constraint on
//! the same value. Two constraints of the same domain that disagree
//! represent an infeasible execution path; combination helpers surface that
//! as `None`/`true` conflicts and the caller discards the state.

mod boolean;
mod collection;
mod nullability;
mod number;

pub use boolean::BoolConstraint;
pub use collection::CollectionConstraint;
pub use nullability::{Nullability, ObjectConstraint};
pub use number::NumberConstraint;

use strum::{EnumCount, EnumIter};

/// The independent axes of knowledge a value can carry.
///
/// Used to address a single constraint slot of a
/// [`SymbolicValue`](crate::state::SymbolicValue) without naming the
/// concrete constraint, e.g. when clearing one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum ConstraintDomain {
    /// Reference nullability.
    Object,
    /// Boolean truth.
    Bool,
    /// Numeric interval.
    Number,
    /// Collection emptiness.
    Collection,
}

/// A single constraint in one of the four domains.
///
/// # Examples
///
/// ```rust
/// use pathscope::constraint::{Constraint, ConstraintDomain, ObjectConstraint};
///
/// let constraint = Constraint::from(ObjectConstraint::NotNull);
/// assert_eq!(constraint.domain(), ConstraintDomain::Object);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The value is a null or provably non-null reference.
    Object(ObjectConstraint),
    /// The value is a known boolean.
    Bool(BoolConstraint),
    /// The value lies within a numeric interval.
    Number(NumberConstraint),
    /// The value is a collection known to be empty or non-empty.
    Collection(CollectionConstraint),
}

impl Constraint {
    /// Returns the domain this constraint belongs to.
    #[must_use]
    pub const fn domain(&self) -> ConstraintDomain {
        match self {
            Self::Object(_) => ConstraintDomain::Object,
            Self::Bool(_) => ConstraintDomain::Bool,
            Self::Number(_) => ConstraintDomain::Number,
            Self::Collection(_) => ConstraintDomain::Collection,
        }
    }

    /// Returns `true` if both constraints belong to the same domain and
    /// cannot hold at once.
    ///
    /// Constraints of different domains never conflict: they describe
    /// independent facts about the value.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => a != b,
            (Self::Bool(a), Self::Bool(b)) => a != b,
            (Self::Collection(a), Self::Collection(b)) => a != b,
            (Self::Number(a), Self::Number(b)) => a.intersect(b).is_none(),
            _ => false,
        }
    }
}

impl From<ObjectConstraint> for Constraint {
    fn from(constraint: ObjectConstraint) -> Self {
        Self::Object(constraint)
    }
}

impl From<BoolConstraint> for Constraint {
    fn from(constraint: BoolConstraint) -> Self {
        Self::Bool(constraint)
    }
}

impl From<NumberConstraint> for Constraint {
    fn from(constraint: NumberConstraint) -> Self {
        Self::Number(constraint)
    }
}

impl From<CollectionConstraint> for Constraint {
    fn from(constraint: CollectionConstraint) -> Self {
        Self::Collection(constraint)
    }
}
