//! Symbolic values: per-domain constraint records.

use crate::constraint::{
    BoolConstraint, CollectionConstraint, Constraint, ConstraintDomain, NumberConstraint,
    ObjectConstraint,
};

/// The knowledge attached to one value: at most one constraint per domain.
///
/// A symbolic value is an immutable record. Attaching or removing a
/// constraint yields a new value; the domains not involved are untouched.
/// Two values are equal exactly when their constraint records match - a
/// value with no constraints is the "unknown" value and is usually
/// represented by the *absence* of a binding in the program state rather
/// than by storing an empty record.
///
/// # Examples
///
/// ```rust
/// use pathscope::constraint::{BoolConstraint, ObjectConstraint};
/// use pathscope::state::SymbolicValue;
///
/// let value = SymbolicValue::empty()
///     .with_constraint(ObjectConstraint::NotNull.into())
///     .with_constraint(BoolConstraint::True.into());
///
/// assert_eq!(value.object(), Some(ObjectConstraint::NotNull));
/// assert_eq!(value.boolean(), Some(BoolConstraint::True));
/// assert_eq!(value.number(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SymbolicValue {
    object: Option<ObjectConstraint>,
    boolean: Option<BoolConstraint>,
    number: Option<NumberConstraint>,
    collection: Option<CollectionConstraint>,
}

impl SymbolicValue {
    /// The value with no knowledge attached.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            object: None,
            boolean: None,
            number: None,
            collection: None,
        }
    }

    /// A value known to be the null reference.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            object: Some(ObjectConstraint::Null),
            boolean: None,
            number: None,
            collection: None,
        }
    }

    /// A value known to be a non-null reference.
    #[must_use]
    pub const fn not_null() -> Self {
        Self {
            object: Some(ObjectConstraint::NotNull),
            boolean: None,
            number: None,
            collection: None,
        }
    }

    /// Returns `true` if no domain carries a constraint.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.object.is_none()
            && self.boolean.is_none()
            && self.number.is_none()
            && self.collection.is_none()
    }

    /// Returns a value with `constraint` set, replacing any previous
    /// constraint of the same domain and leaving other domains untouched.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        match constraint {
            Constraint::Object(c) => self.object = Some(c),
            Constraint::Bool(c) => self.boolean = Some(c),
            Constraint::Number(c) => self.number = Some(c),
            Constraint::Collection(c) => self.collection = Some(c),
        }
        self
    }

    /// Returns a value with the given domain's constraint removed.
    #[must_use]
    pub fn without(mut self, domain: ConstraintDomain) -> Self {
        match domain {
            ConstraintDomain::Object => self.object = None,
            ConstraintDomain::Bool => self.boolean = None,
            ConstraintDomain::Number => self.number = None,
            ConstraintDomain::Collection => self.collection = None,
        }
        self
    }

    /// Combines `constraint` with the record.
    ///
    /// Numeric constraints intersect; the other domains must agree with any
    /// existing constraint. Returns `None` when the combination is
    /// contradictory - the path carrying both facts is infeasible.
    #[must_use]
    pub fn merge_constraint(self, constraint: Constraint) -> Option<Self> {
        match &constraint {
            Constraint::Number(incoming) => match &self.number {
                Some(existing) => {
                    let narrowed = existing.intersect(incoming)?;
                    Some(self.with_constraint(narrowed.into()))
                }
                None => Some(self.with_constraint(constraint)),
            },
            _ => {
                if self
                    .constraint(constraint.domain())
                    .is_some_and(|existing| existing.conflicts_with(&constraint))
                {
                    None
                } else {
                    Some(self.with_constraint(constraint))
                }
            }
        }
    }

    /// The constraint of the given domain, if present.
    #[must_use]
    pub fn constraint(&self, domain: ConstraintDomain) -> Option<Constraint> {
        match domain {
            ConstraintDomain::Object => self.object.map(Constraint::Object),
            ConstraintDomain::Bool => self.boolean.map(Constraint::Bool),
            ConstraintDomain::Number => self.number.clone().map(Constraint::Number),
            ConstraintDomain::Collection => self.collection.map(Constraint::Collection),
        }
    }

    /// The nullability constraint, if present.
    #[must_use]
    pub const fn object(&self) -> Option<ObjectConstraint> {
        self.object
    }

    /// The boolean constraint, if present.
    #[must_use]
    pub const fn boolean(&self) -> Option<BoolConstraint> {
        self.boolean
    }

    /// The numeric interval constraint, if present.
    #[must_use]
    pub const fn number(&self) -> Option<&NumberConstraint> {
        self.number.as_ref()
    }

    /// The collection emptiness constraint, if present.
    #[must_use]
    pub const fn collection(&self) -> Option<CollectionConstraint> {
        self.collection
    }
}

impl From<Constraint> for SymbolicValue {
    fn from(constraint: Constraint) -> Self {
        Self::empty().with_constraint(constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_are_independent() {
        let value = SymbolicValue::empty()
            .with_constraint(ObjectConstraint::NotNull.into())
            .with_constraint(NumberConstraint::exact(5).into());

        // Setting one domain leaves the other untouched.
        assert_eq!(value.object(), Some(ObjectConstraint::NotNull));
        assert_eq!(value.number(), Some(&NumberConstraint::exact(5)));

        let cleared = value.clone().without(ConstraintDomain::Number);
        assert_eq!(cleared.object(), Some(ObjectConstraint::NotNull));
        assert_eq!(cleared.number(), None);
    }

    #[test]
    fn test_with_constraint_replaces_same_domain() {
        let value = SymbolicValue::null().with_constraint(ObjectConstraint::NotNull.into());
        assert_eq!(value.object(), Some(ObjectConstraint::NotNull));
    }

    #[test]
    fn test_merge_detects_contradiction() {
        let value = SymbolicValue::null();
        assert!(value
            .clone()
            .merge_constraint(ObjectConstraint::NotNull.into())
            .is_none());
        assert!(value
            .merge_constraint(ObjectConstraint::Null.into())
            .is_some());
    }

    #[test]
    fn test_merge_intersects_numbers() {
        let value =
            SymbolicValue::from(Constraint::from(NumberConstraint::range(0, 10).unwrap()));
        let narrowed = value
            .clone()
            .merge_constraint(NumberConstraint::at_least(5).into())
            .unwrap();
        assert_eq!(narrowed.number(), NumberConstraint::range(5, 10).as_ref());

        // Disjoint intervals are an infeasible combination.
        assert!(value
            .merge_constraint(NumberConstraint::at_least(11).into())
            .is_none());
    }

    #[test]
    fn test_empty_detection() {
        assert!(SymbolicValue::empty().is_empty());
        assert!(!SymbolicValue::null().is_empty());
        assert!(SymbolicValue::null()
            .without(ConstraintDomain::Object)
            .is_empty());
    }
}
