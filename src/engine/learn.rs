//! Branch learning: deriving operand constraints from boolean decisions.
//!
//! For any boolean-producing decision the engine derives, independently
//! then combines:
//!
//! - **Equality/inequality**: definite object/boolean knowledge of one side
//!   propagates to a symbol on the other side, using the domain-specific
//!   opposite for inequalities. Nullable-boolean symbols refuse to learn
//!   from inequality with a boolean constant: a null value satisfies the
//!   inequality too, so concluding the opposite truth value would be
//!   unsound.
//! - **Relational numeric**: the symbol's interval intersects the bound
//!   implied by the other side's interval; the operator is flipped when the
//!   symbol sits on the right, and negated on the false branch.
//! - **Collection emptiness**: a comparison between a tracked collection's
//!   size accessor and a numeric range attaches `Empty` (forced zero) or
//!   `NotEmpty` (forced >= 1) to the collection's own symbol.
//!
//! Every learning step can discover that its side of the branch is
//! infeasible (the learned constraint contradicts existing knowledge); the
//! step then yields `None` and the caller discards the state.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::{
    cfg::{ComparisonOperator, ControlFlowGraph, OperationId, OperationKind, SymbolId, TypeHint},
    constraint::{CollectionConstraint, Constraint, NumberConstraint},
    engine::CollectionClassifier,
    state::ProgramState,
};

/// Follows value-preserving wrappers to the symbol an operand reads.
pub(crate) fn resolve_symbol(cfg: &ControlFlowGraph, mut operation: OperationId) -> Option<SymbolId> {
    loop {
        match cfg.operation(operation)?.kind() {
            OperationKind::SymbolRead(symbol) => return Some(*symbol),
            OperationKind::Conversion { operand, .. } => operation = *operand,
            // An assignment used as an expression reads as its target.
            OperationKind::Assignment { target, .. } => return Some(*target),
            _ => return None,
        }
    }
}

/// Recognizes a size-accessor read of a tracked collection and returns the
/// collection's symbol.
pub(crate) fn resolve_size_access(
    cfg: &ControlFlowGraph,
    classifier: &CollectionClassifier,
    mut operation: OperationId,
) -> Option<SymbolId> {
    loop {
        match cfg.operation(operation)?.kind() {
            OperationKind::Conversion { operand, .. } => operation = *operand,
            OperationKind::PropertyRead { instance, property } => {
                let symbol = cfg.symbol(*instance)?;
                return (classifier.is_size_accessor(property)
                    && classifier.is_collection(symbol))
                .then_some(*instance);
            }
            _ => return None,
        }
    }
}

/// Merges a constraint into a symbol's value; `None` when contradictory.
fn merge_symbol(
    state: ProgramState,
    symbol: SymbolId,
    constraint: impl Into<Constraint>,
) -> Option<ProgramState> {
    let value = state.value_of(symbol).cloned().unwrap_or_default();
    let merged = value.merge_constraint(constraint.into())?;
    Some(state.with_value(symbol, merged))
}

/// The interval a value must lie in for `value <operator> other` to hold.
///
/// `None` means the operator/bound combination implies nothing
/// representable (inequality is handled by endpoint exclusion instead).
fn implied_interval(
    operator: ComparisonOperator,
    other: &NumberConstraint,
) -> Option<NumberConstraint> {
    match operator {
        ComparisonOperator::Equals => Some(other.clone()),
        ComparisonOperator::NotEquals => None,
        ComparisonOperator::LessThan => other
            .max()
            .map(|hi| NumberConstraint::at_most(hi - BigInt::one())),
        ComparisonOperator::LessThanOrEqual => {
            other.max().map(|hi| NumberConstraint::at_most(hi.clone()))
        }
        ComparisonOperator::GreaterThan => other
            .min()
            .map(|lo| NumberConstraint::at_least(lo + BigInt::one())),
        ComparisonOperator::GreaterThanOrEqual => {
            other.min().map(|lo| NumberConstraint::at_least(lo.clone()))
        }
    }
}

/// Learns operand-symbol constraints for one side of a comparison.
///
/// `holds` selects the branch: `true` learns under the comparison as
/// written, `false` under its negation. Returns `None` when the branch is
/// infeasible given the state's existing constraints.
pub(crate) fn learn_from_comparison(
    cfg: &ControlFlowGraph,
    classifier: &CollectionClassifier,
    state: &ProgramState,
    operator: ComparisonOperator,
    left: OperationId,
    right: OperationId,
    holds: bool,
) -> Option<ProgramState> {
    let operator = if holds { operator } else { operator.negated() };
    let state = learn_side(cfg, classifier, state.clone(), operator, left, right)?;
    learn_side(cfg, classifier, state, operator.flipped(), right, left)
}

/// Learns what `target <operator> other` implies about `target`'s symbol.
fn learn_side(
    cfg: &ControlFlowGraph,
    classifier: &CollectionClassifier,
    state: ProgramState,
    operator: ComparisonOperator,
    target: OperationId,
    other: OperationId,
) -> Option<ProgramState> {
    if let Some(collection) = resolve_size_access(cfg, classifier, target) {
        return learn_emptiness(state, operator, target, other, collection);
    }
    let Some(symbol) = resolve_symbol(cfg, target) else {
        return Some(state);
    };
    let other_value = state.value_of(other).cloned().unwrap_or_default();

    match operator {
        ComparisonOperator::Equals => {
            let mut state = state;
            if let Some(object) = other_value.object() {
                state = merge_symbol(state, symbol, object)?;
            }
            if let Some(boolean) = other_value.boolean() {
                state = merge_symbol(state, symbol, boolean)?;
            }
            if let Some(number) = other_value.number() {
                state = merge_symbol(state, symbol, number.clone())?;
            }
            Some(state)
        }
        ComparisonOperator::NotEquals => {
            let mut state = state;
            if let Some(object) = other_value.object() {
                if let Some(opposite) = object.opposite().constraint() {
                    state = merge_symbol(state, symbol, opposite)?;
                }
            }
            if let Some(boolean) = other_value.boolean() {
                let nullable = cfg
                    .symbol(symbol)
                    .is_some_and(|s| s.hint() == TypeHint::NullableBoolean);
                if !nullable {
                    state = merge_symbol(state, symbol, boolean.opposite())?;
                }
                // A nullable boolean that is not `true` may still be null
                // rather than false; learning the opposite would be unsound.
            }
            if let Some(excluded) = other_value.number().and_then(NumberConstraint::single_value) {
                if let Some(existing) = state.number_constraint(symbol) {
                    let narrowed = existing.excluding(excluded)?;
                    state = state.with_symbol_constraint(symbol, narrowed);
                }
            }
            Some(state)
        }
        ComparisonOperator::LessThan
        | ComparisonOperator::LessThanOrEqual
        | ComparisonOperator::GreaterThan
        | ComparisonOperator::GreaterThanOrEqual => {
            let Some(number) = other_value.number() else {
                return Some(state);
            };
            match implied_interval(operator, number) {
                Some(implied) => merge_symbol(state, symbol, implied),
                None => Some(state),
            }
        }
    }
}

/// Learns an emptiness constraint from a size comparison.
///
/// The constraint lands on the collection's own symbol, not on the size
/// value: a size forced to zero makes the collection `Empty`, a size forced
/// to at least one makes it `NotEmpty`.
fn learn_emptiness(
    state: ProgramState,
    operator: ComparisonOperator,
    size_operation: OperationId,
    other: OperationId,
    collection: SymbolId,
) -> Option<ProgramState> {
    let Some(other_number) = state.number_constraint(other).cloned() else {
        return Some(state);
    };
    // Element counts are never negative.
    let size = state
        .number_constraint(size_operation)
        .cloned()
        .unwrap_or_else(|| NumberConstraint::at_least(0));

    let learned = match operator {
        ComparisonOperator::NotEquals => match other_number.single_value() {
            Some(excluded) => size.excluding(excluded)?,
            None => size,
        },
        _ => match implied_interval(operator, &other_number) {
            Some(implied) => size.intersect(&implied)?,
            None => size,
        },
    };

    if learned.single_value().is_some_and(Zero::is_zero) {
        merge_symbol(state, collection, CollectionConstraint::Empty)
    } else if learned.min().is_some_and(|lo| lo >= &BigInt::one()) {
        merge_symbol(state, collection, CollectionConstraint::NotEmpty)
    } else {
        Some(state)
    }
}

/// Checks whether existing constraints already decide a comparison.
pub(crate) fn determine_comparison(
    state: &ProgramState,
    operator: ComparisonOperator,
    left: OperationId,
    right: OperationId,
) -> Option<bool> {
    let left_value = state.value_of(left).cloned().unwrap_or_default();
    let right_value = state.value_of(right).cloned().unwrap_or_default();

    if operator.is_equality() {
        let equal = if let (Some(a), Some(b)) = (left_value.object(), right_value.object()) {
            use crate::constraint::ObjectConstraint::{NotNull, Null};
            match (a, b) {
                (Null, Null) => Some(true),
                (Null, NotNull) | (NotNull, Null) => Some(false),
                // Two non-null references may still differ.
                (NotNull, NotNull) => None,
            }
        } else if let (Some(a), Some(b)) = (left_value.boolean(), right_value.boolean()) {
            Some(a == b)
        } else if let (Some(a), Some(b)) = (left_value.number(), right_value.number()) {
            if let (Some(x), Some(y)) = (a.single_value(), b.single_value()) {
                Some(x == y)
            } else if a.is_disjoint(b) {
                Some(false)
            } else {
                None
            }
        } else {
            None
        };
        return equal.map(|e| e == (operator == ComparisonOperator::Equals));
    }

    let (a, b) = (left_value.number()?, right_value.number()?);
    match operator {
        ComparisonOperator::LessThan => {
            if a.is_strictly_below(b) {
                Some(true)
            } else if bound_le(b.max(), a.min()) {
                // Every right value is at most every left value.
                Some(false)
            } else {
                None
            }
        }
        ComparisonOperator::LessThanOrEqual => {
            if bound_le(a.max(), b.min()) {
                Some(true)
            } else if b.is_strictly_below(a) {
                Some(false)
            } else {
                None
            }
        }
        ComparisonOperator::GreaterThan => {
            if a.is_strictly_above(b) {
                Some(true)
            } else if bound_le(a.max(), b.min()) {
                Some(false)
            } else {
                None
            }
        }
        ComparisonOperator::GreaterThanOrEqual => {
            if bound_le(b.max(), a.min()) {
                Some(true)
            } else if a.is_strictly_below(b) {
                Some(false)
            } else {
                None
            }
        }
        ComparisonOperator::Equals | ComparisonOperator::NotEquals => None,
    }
}

/// `true` when both bounds are finite and `a <= b`.
fn bound_le(a: Option<&BigInt>, b: Option<&BigInt>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a <= b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::{CfgBuilder, Literal, Symbol, SymbolKind, Terminator},
        constraint::{BoolConstraint, CollectionConstraint, ObjectConstraint},
    };

    /// Builds a single-block graph with `symbol <op> literal` wired up, and
    /// a state where the literal operation is already evaluated.
    fn comparison_fixture(
        symbol: Symbol,
        literal: Literal,
    ) -> (ControlFlowGraph, SymbolId, OperationId, OperationId, ProgramState) {
        let mut builder = CfgBuilder::new();
        let block = builder.block();
        let sym = builder.symbol(symbol);
        let read = builder.operation(OperationKind::SymbolRead(sym));
        let lit = builder.operation(OperationKind::Literal(literal.clone()));
        builder.append(block, read).unwrap();
        builder.append(block, lit).unwrap();
        builder
            .terminate(block, Terminator::Return { value: None })
            .unwrap();
        let cfg = builder.finish(block).unwrap();

        let state = match literal {
            Literal::Null => ProgramState::empty()
                .with_operation_constraint(lit, ObjectConstraint::Null),
            Literal::Bool(b) => ProgramState::empty()
                .with_operation_constraint(lit, BoolConstraint::from(b)),
            Literal::Number(n) => ProgramState::empty()
                .with_operation_constraint(lit, NumberConstraint::exact(n)),
            Literal::String(_) => ProgramState::empty()
                .with_operation_constraint(lit, ObjectConstraint::NotNull),
        };
        (cfg, sym, read, lit, state)
    }

    #[test]
    fn test_null_equality_learning() {
        let (cfg, sym, read, lit, state) = comparison_fixture(
            Symbol::new("x", SymbolKind::Local, TypeHint::Reference),
            Literal::Null,
        );
        let classifier = CollectionClassifier::default();

        let on_true = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::Equals,
            read,
            lit,
            true,
        )
        .unwrap();
        assert_eq!(on_true.object_constraint(sym), Some(ObjectConstraint::Null));

        let on_false = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::Equals,
            read,
            lit,
            false,
        )
        .unwrap();
        assert_eq!(
            on_false.object_constraint(sym),
            Some(ObjectConstraint::NotNull)
        );
    }

    #[test]
    fn test_not_equal_to_non_null_learns_nothing() {
        let (cfg, sym, read, lit, state) = comparison_fixture(
            Symbol::new("x", SymbolKind::Local, TypeHint::Reference),
            Literal::String("hello".into()),
        );
        let classifier = CollectionClassifier::default();

        // `x != "hello"` proves nothing about x's nullability.
        let learned = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::NotEquals,
            read,
            lit,
            true,
        )
        .unwrap();
        assert_eq!(learned.object_constraint(sym), None);
    }

    #[test]
    fn test_nullable_boolean_guard() {
        let (cfg, sym, read, lit, state) = comparison_fixture(
            Symbol::new("maybe", SymbolKind::Local, TypeHint::NullableBoolean),
            Literal::Bool(true),
        );
        let classifier = CollectionClassifier::default();

        // `maybe != true` is satisfied by null too; refusing to learn False.
        let learned = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::NotEquals,
            read,
            lit,
            true,
        )
        .unwrap();
        assert_eq!(learned.bool_constraint(sym), None);

        // A plain boolean symbol does learn the opposite.
        let (cfg, sym, read, lit, state) = comparison_fixture(
            Symbol::new("flag", SymbolKind::Local, TypeHint::Boolean),
            Literal::Bool(true),
        );
        let learned = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::NotEquals,
            read,
            lit,
            true,
        )
        .unwrap();
        assert_eq!(learned.bool_constraint(sym), Some(BoolConstraint::False));
    }

    #[test]
    fn test_relational_narrowing() {
        let (cfg, sym, read, lit, state) = comparison_fixture(
            Symbol::new("x", SymbolKind::Local, TypeHint::Integer),
            Literal::Number(5.into()),
        );
        let classifier = CollectionClassifier::default();

        // `x > 5` true: x in [6, +inf); false: x in (-inf, 5].
        let on_true = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::GreaterThan,
            read,
            lit,
            true,
        )
        .unwrap();
        assert_eq!(
            on_true.number_constraint(sym),
            Some(&NumberConstraint::at_least(6))
        );

        let on_false = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::GreaterThan,
            read,
            lit,
            false,
        )
        .unwrap();
        assert_eq!(
            on_false.number_constraint(sym),
            Some(&NumberConstraint::at_most(5))
        );
    }

    #[test]
    fn test_relational_flip_for_right_hand_symbol() {
        let (cfg, sym, read, lit, state) = comparison_fixture(
            Symbol::new("x", SymbolKind::Local, TypeHint::Integer),
            Literal::Number(10.into()),
        );
        let classifier = CollectionClassifier::default();

        // `10 < x` learns x >= 11.
        let learned = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::LessThan,
            lit,
            read,
            true,
        )
        .unwrap();
        assert_eq!(
            learned.number_constraint(sym),
            Some(&NumberConstraint::at_least(11))
        );
    }

    #[test]
    fn test_contradictory_relational_side_is_infeasible() {
        let (cfg, sym, read, lit, state) = comparison_fixture(
            Symbol::new("x", SymbolKind::Local, TypeHint::Integer),
            Literal::Number(5.into()),
        );
        let classifier = CollectionClassifier::default();
        let state = state.with_symbol_constraint(sym, NumberConstraint::at_most(0));

        // x <= 0 cannot satisfy x > 5.
        assert!(learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::GreaterThan,
            read,
            lit,
            true,
        )
        .is_none());
    }

    #[test]
    fn test_collection_emptiness_learning() {
        let mut builder = CfgBuilder::new();
        let block = builder.block();
        let list = builder.symbol(
            Symbol::new("items", SymbolKind::Local, TypeHint::Reference).with_type_name("List"),
        );
        let count = builder.operation(OperationKind::PropertyRead {
            instance: list,
            property: "Count".into(),
        });
        let zero = builder.operation(OperationKind::Literal(Literal::Number(0.into())));
        builder.append(block, count).unwrap();
        builder.append(block, zero).unwrap();
        builder
            .terminate(block, Terminator::Return { value: None })
            .unwrap();
        let cfg = builder.finish(block).unwrap();
        let classifier = CollectionClassifier::default();

        let state =
            ProgramState::empty().with_operation_constraint(zero, NumberConstraint::exact(0));

        // `items.Count == 0` true: Empty; false: NotEmpty.
        let on_true = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::Equals,
            count,
            zero,
            true,
        )
        .unwrap();
        assert_eq!(
            on_true.collection_constraint(list),
            Some(CollectionConstraint::Empty)
        );

        let on_false = learn_from_comparison(
            &cfg,
            &classifier,
            &state,
            ComparisonOperator::Equals,
            count,
            zero,
            false,
        )
        .unwrap();
        assert_eq!(
            on_false.collection_constraint(list),
            Some(CollectionConstraint::NotEmpty)
        );
    }

    #[test]
    fn test_determine_comparison() {
        let (_, _, read, lit, state) = comparison_fixture(
            Symbol::new("x", SymbolKind::Local, TypeHint::Integer),
            Literal::Number(5.into()),
        );
        let state = state.with_operation_constraint(read, NumberConstraint::at_least(6));

        assert_eq!(
            determine_comparison(&state, ComparisonOperator::GreaterThan, read, lit),
            Some(true)
        );
        assert_eq!(
            determine_comparison(&state, ComparisonOperator::LessThanOrEqual, read, lit),
            Some(false)
        );
        assert_eq!(
            determine_comparison(&state, ComparisonOperator::Equals, read, lit),
            None
        );

        let narrowed = state.with_operation_constraint(read, NumberConstraint::exact(5));
        assert_eq!(
            determine_comparison(&narrowed, ComparisonOperator::Equals, read, lit),
            Some(true)
        );
        assert_eq!(
            determine_comparison(&narrowed, ComparisonOperator::NotEquals, read, lit),
            Some(false)
        );
    }
}
