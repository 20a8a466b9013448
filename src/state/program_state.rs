//! Immutable program states and state sets.
//!
//! A [`ProgramState`] is a snapshot of everything the engine knows on one
//! execution path: a persistent map from symbols to symbolic values, a
//! persistent map from operations to symbolic values, and per-block visit
//! counts used as loop-context metadata. Every mutator returns a new state
//! and shares unchanged bindings with its predecessor, so forking a state
//! at a branch is proportional to the delta, not to the state size.
//!
//! Equality and hashing cover the bindings only. Visit counts are
//! bookkeeping: two states reached through different iteration counts but
//! holding identical knowledge must coalesce during traversal, otherwise
//! loops would never stabilize.

use std::hash::{Hash, Hasher};

use crate::{
    cfg::{BlockId, OperationId, SymbolId},
    constraint::{
        BoolConstraint, CollectionConstraint, Constraint, NumberConstraint, ObjectConstraint,
    },
    state::SymbolicValue,
    utils::TrieMap,
};

/// Addresses either a symbol or an operation binding of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKey {
    /// A storage location.
    Symbol(SymbolId),
    /// An operation result.
    Operation(OperationId),
}

impl From<SymbolId> for ValueKey {
    fn from(id: SymbolId) -> Self {
        Self::Symbol(id)
    }
}

impl From<OperationId> for ValueKey {
    fn from(id: OperationId) -> Self {
        Self::Operation(id)
    }
}

/// An immutable snapshot of all constraints known on one execution path.
///
/// An unset symbol or operation is "unknown" - there is no default value.
///
/// # Examples
///
/// ```rust
/// use pathscope::cfg::SymbolId;
/// use pathscope::constraint::ObjectConstraint;
/// use pathscope::state::ProgramState;
///
/// let s = SymbolId::new(0);
/// let state = ProgramState::empty().with_symbol_constraint(s, ObjectConstraint::Null);
///
/// assert_eq!(state.object_constraint(s), Some(ObjectConstraint::Null));
/// // The original empty state is unaffected.
/// assert_eq!(ProgramState::empty().object_constraint(s), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProgramState {
    symbols: TrieMap<SymbolicValue>,
    operations: TrieMap<SymbolicValue>,
    visits: TrieMap<u32>,
}

impl ProgramState {
    /// The state with no knowledge; seeds the walk at the CFG entry.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks up the value bound to `key`.
    #[must_use]
    pub fn value_of(&self, key: impl Into<ValueKey>) -> Option<&SymbolicValue> {
        match key.into() {
            ValueKey::Symbol(id) => self.symbols.get(id.index() as u32),
            ValueKey::Operation(id) => self.operations.get(id.index() as u32),
        }
    }

    /// Returns a state with `key` bound to `value`.
    ///
    /// Binding an empty value is equivalent to clearing the key: an empty
    /// record carries no knowledge and would otherwise defeat state
    /// deduplication against states that never bound the key.
    #[must_use]
    pub fn with_value(&self, key: impl Into<ValueKey>, value: SymbolicValue) -> Self {
        let key = key.into();
        if value.is_empty() {
            return self.without_value(key);
        }
        let mut state = self.clone();
        match key {
            ValueKey::Symbol(id) => state.symbols = self.symbols.insert(id.index() as u32, value),
            ValueKey::Operation(id) => {
                state.operations = self.operations.insert(id.index() as u32, value);
            }
        }
        state
    }

    /// Returns a state with the binding for `key` removed (made unknown).
    #[must_use]
    pub fn without_value(&self, key: impl Into<ValueKey>) -> Self {
        let mut state = self.clone();
        match key.into() {
            ValueKey::Symbol(id) => state.symbols = self.symbols.remove(id.index() as u32),
            ValueKey::Operation(id) => state.operations = self.operations.remove(id.index() as u32),
        }
        state
    }

    /// Returns a state where `symbol`'s value carries `constraint`,
    /// replacing a previous constraint of the same domain only.
    #[must_use]
    pub fn with_symbol_constraint(
        &self,
        symbol: SymbolId,
        constraint: impl Into<Constraint>,
    ) -> Self {
        let value = self.value_of(symbol).cloned().unwrap_or_default();
        self.with_value(symbol, value.with_constraint(constraint.into()))
    }

    /// Returns a state where `operation`'s value carries `constraint`,
    /// replacing a previous constraint of the same domain only.
    #[must_use]
    pub fn with_operation_constraint(
        &self,
        operation: OperationId,
        constraint: impl Into<Constraint>,
    ) -> Self {
        let value = self.value_of(operation).cloned().unwrap_or_default();
        self.with_value(operation, value.with_constraint(constraint.into()))
    }

    /// The nullability constraint of `key`, if known.
    #[must_use]
    pub fn object_constraint(&self, key: impl Into<ValueKey>) -> Option<ObjectConstraint> {
        self.value_of(key).and_then(SymbolicValue::object)
    }

    /// The boolean constraint of `key`, if known.
    #[must_use]
    pub fn bool_constraint(&self, key: impl Into<ValueKey>) -> Option<BoolConstraint> {
        self.value_of(key).and_then(SymbolicValue::boolean)
    }

    /// The numeric interval constraint of `key`, if known.
    #[must_use]
    pub fn number_constraint(&self, key: impl Into<ValueKey>) -> Option<&NumberConstraint> {
        self.value_of(key).and_then(SymbolicValue::number)
    }

    /// The collection emptiness constraint of `key`, if known.
    #[must_use]
    pub fn collection_constraint(&self, key: impl Into<ValueKey>) -> Option<CollectionConstraint> {
        self.value_of(key).and_then(SymbolicValue::collection)
    }

    /// Returns a state with every operation binding removed.
    ///
    /// Operation values are block-local: operands and their consumers live
    /// in the same block, so bindings left over from a finished block are
    /// dead weight. Dropping them when control crosses an edge lets states
    /// that differ only in spent intermediate results coalesce.
    #[must_use]
    pub fn without_operations(&self) -> Self {
        let mut state = self.clone();
        state.operations = TrieMap::new();
        state
    }

    /// How often this path has entered `block`.
    #[must_use]
    pub fn visit_count(&self, block: BlockId) -> u32 {
        self.visits.get(block.index() as u32).copied().unwrap_or(0)
    }

    /// Returns a state with the visit count of `block` incremented.
    #[must_use]
    pub fn with_visit(&self, block: BlockId) -> Self {
        let mut state = self.clone();
        state.visits = self
            .visits
            .insert(block.index() as u32, self.visit_count(block) + 1);
        state
    }
}

impl PartialEq for ProgramState {
    fn eq(&self, other: &Self) -> bool {
        // Visit counts are deliberately excluded; see the module docs.
        self.symbols == other.symbols && self.operations == other.operations
    }
}

impl Eq for ProgramState {}

impl Hash for ProgramState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbols.hash(state);
        self.operations.hash(state);
    }
}

/// The 0..N states produced by processing one operation.
///
/// Multiple states are alternate hypotheses about the same program point,
/// e.g. the "null" and "not null" outcomes of an ambiguous downcast. An
/// empty set means every hypothesis was infeasible and the path dies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramStates(Vec<ProgramState>);

impl ProgramStates {
    /// The empty set: no feasible continuation.
    #[must_use]
    pub const fn none() -> Self {
        Self(Vec::new())
    }

    /// A single-state set.
    #[must_use]
    pub fn single(state: ProgramState) -> Self {
        Self(vec![state])
    }

    /// A two-state set of alternate hypotheses.
    #[must_use]
    pub fn pair(first: ProgramState, second: ProgramState) -> Self {
        Self(vec![first, second])
    }

    /// Appends a state.
    pub fn push(&mut self, state: ProgramState) {
        self.0.push(state);
    }

    /// Number of states in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The states as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ProgramState] {
        &self.0
    }

    /// Iterates over the states.
    pub fn iter(&self) -> std::slice::Iter<'_, ProgramState> {
        self.0.iter()
    }
}

impl From<ProgramState> for ProgramStates {
    fn from(state: ProgramState) -> Self {
        Self::single(state)
    }
}

impl From<Vec<ProgramState>> for ProgramStates {
    fn from(states: Vec<ProgramState>) -> Self {
        Self(states)
    }
}

impl IntoIterator for ProgramStates {
    type Item = ProgramState;
    type IntoIter = std::vec::IntoIter<ProgramState>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProgramStates {
    type Item = &'a ProgramState;
    type IntoIter = std::slice::Iter<'a, ProgramState>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintDomain;

    #[test]
    fn test_unset_is_unknown() {
        let state = ProgramState::empty();
        assert_eq!(state.value_of(SymbolId::new(0)), None);
        assert_eq!(state.object_constraint(SymbolId::new(0)), None);
    }

    #[test]
    fn test_mutators_do_not_touch_original() {
        let s = SymbolId::new(1);
        let base = ProgramState::empty();
        let derived = base.with_symbol_constraint(s, ObjectConstraint::NotNull);

        assert_eq!(base.object_constraint(s), None);
        assert_eq!(derived.object_constraint(s), Some(ObjectConstraint::NotNull));
    }

    #[test]
    fn test_set_constraint_is_idempotent() {
        let s = SymbolId::new(0);
        let once = ProgramState::empty().with_symbol_constraint(s, BoolConstraint::True);
        let twice = once.with_symbol_constraint(s, BoolConstraint::True);
        assert_eq!(once, twice);

        let mut hasher_a = std::collections::hash_map::DefaultHasher::new();
        let mut hasher_b = std::collections::hash_map::DefaultHasher::new();
        once.hash(&mut hasher_a);
        twice.hash(&mut hasher_b);
        assert_eq!(hasher_a.finish(), hasher_b.finish());
    }

    #[test]
    fn test_domains_do_not_disturb_each_other() {
        let s = SymbolId::new(2);
        let state = ProgramState::empty()
            .with_symbol_constraint(s, ObjectConstraint::NotNull)
            .with_symbol_constraint(s, NumberConstraint::exact(3));

        assert_eq!(state.object_constraint(s), Some(ObjectConstraint::NotNull));
        assert_eq!(state.number_constraint(s), Some(&NumberConstraint::exact(3)));
    }

    #[test]
    fn test_equality_over_bindings_only() {
        let s = SymbolId::new(0);
        let op = OperationId::new(4);

        // Different call sequences, identical final bindings.
        let a = ProgramState::empty()
            .with_symbol_constraint(s, ObjectConstraint::Null)
            .with_operation_constraint(op, BoolConstraint::False);
        let b = ProgramState::empty()
            .with_operation_constraint(op, BoolConstraint::True)
            .with_symbol_constraint(s, ObjectConstraint::Null)
            .with_operation_constraint(op, BoolConstraint::False);
        assert_eq!(a, b);

        // Visit counts do not distinguish states.
        let visited = a.with_visit(BlockId::new(3));
        assert_eq!(a, visited);
        assert_eq!(visited.visit_count(BlockId::new(3)), 1);
        assert_eq!(a.visit_count(BlockId::new(3)), 0);
    }

    #[test]
    fn test_clearing_a_value() {
        let s = SymbolId::new(0);
        let state = ProgramState::empty().with_symbol_constraint(s, BoolConstraint::True);
        let cleared = state.without_value(s);
        assert_eq!(cleared, ProgramState::empty());

        // Stripping the last constraint of a value behaves like clearing.
        let value = state.value_of(s).cloned().unwrap();
        let stripped = state.with_value(s, value.without(ConstraintDomain::Bool));
        assert_eq!(stripped, ProgramState::empty());
    }

    #[test]
    fn test_program_states_construction() {
        let states = ProgramStates::pair(
            ProgramState::empty(),
            ProgramState::empty().with_symbol_constraint(SymbolId::new(0), BoolConstraint::True),
        );
        assert_eq!(states.len(), 2);
        assert!(!states.is_empty());
        assert!(ProgramStates::none().is_empty());
    }
}
