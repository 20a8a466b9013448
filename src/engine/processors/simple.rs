//! Transfer functions for operations without decisions.

use crate::{
    arith,
    cfg::{BinaryOperator, Literal, Operation, OperationKind, SymbolId},
    constraint::{BoolConstraint, CollectionConstraint, ConstraintDomain, NumberConstraint},
    engine::dispatch::OpContext,
    state::{ProgramState, SymbolicValue},
};

/// Processes a non-branching operation: one state in, one state out.
pub(crate) fn process(
    ctx: &OpContext<'_>,
    operation: &Operation,
    state: ProgramState,
) -> ProgramState {
    let id = operation.id();
    match operation.kind() {
        OperationKind::Literal(literal) => state.with_value(id, literal_value(literal)),

        OperationKind::SymbolRead(symbol) => match state.value_of(*symbol).cloned() {
            Some(value) => state.with_value(id, value),
            None => state,
        },

        OperationKind::Assignment { target, value } => {
            match state.value_of(*value).cloned() {
                Some(value) => {
                    let state = state.with_value(*target, value.clone());
                    state.with_value(id, value)
                }
                // Overwriting with an unknown value clears stale knowledge.
                None => state.without_value(*target),
            }
        }

        OperationKind::Conversion { operand, .. } => match state.value_of(*operand).cloned() {
            Some(value) => state.with_value(id, value),
            None => state,
        },

        OperationKind::Increment { target } => step_symbol(ctx, state, *target, BinaryOperator::Add),
        OperationKind::Decrement { target } => {
            step_symbol(ctx, state, *target, BinaryOperator::Subtract)
        }

        OperationKind::Binary {
            operator,
            left,
            right,
        } => {
            let (Some(left), Some(right)) =
                (state.number_constraint(*left), state.number_constraint(*right))
            else {
                return state;
            };
            let result = if ctx.in_loop {
                arith::calculate_in_loop(*operator, left, right)
            } else {
                arith::calculate(*operator, left, right)
            };
            match result {
                Some(interval) => state.with_operation_constraint(id, interval),
                None => state,
            }
        }

        OperationKind::PropertyRead { instance, property } => {
            let classifier = ctx.config.classifier();
            let is_size = classifier.is_size_accessor(property)
                && ctx
                    .cfg
                    .symbol(*instance)
                    .is_some_and(|symbol| classifier.is_collection(symbol));
            if !is_size {
                return state;
            }
            let interval = match state.collection_constraint(*instance) {
                Some(CollectionConstraint::Empty) => NumberConstraint::exact(0),
                Some(CollectionConstraint::NotEmpty) => NumberConstraint::at_least(1),
                None => NumberConstraint::at_least(0),
            };
            state.with_operation_constraint(id, interval)
        }

        OperationKind::ObjectCreation { .. } => state.with_value(id, SymbolicValue::not_null()),

        // Decision-bearing kinds are routed elsewhere; fall through
        // untouched per the under-specified-operand rule.
        OperationKind::Comparison { .. }
        | OperationKind::LogicalNot { .. }
        | OperationKind::PatternTest { .. }
        | OperationKind::Invocation { .. } => state,
    }
}

/// The symbolic value of a literal.
fn literal_value(literal: &Literal) -> SymbolicValue {
    match literal {
        Literal::Null => SymbolicValue::null(),
        Literal::Bool(value) => {
            SymbolicValue::empty().with_constraint(BoolConstraint::from(*value).into())
        }
        Literal::Number(value) => {
            SymbolicValue::empty().with_constraint(NumberConstraint::exact(value.clone()).into())
        }
        Literal::String(_) => SymbolicValue::not_null(),
    }
}

/// Shifts a symbol's interval by one in either direction.
///
/// Inside a loop only the widening variant applies; when it yields nothing
/// the stale interval is dropped rather than kept falsely narrow.
fn step_symbol(
    ctx: &OpContext<'_>,
    state: ProgramState,
    symbol: SymbolId,
    operator: BinaryOperator,
) -> ProgramState {
    let Some(current) = state.number_constraint(symbol).cloned() else {
        return state;
    };
    let one = NumberConstraint::exact(1);
    let stepped = if ctx.in_loop {
        arith::calculate_in_loop(operator, &current, &one)
    } else {
        arith::calculate(operator, &current, &one)
    };

    let value = state
        .value_of(symbol)
        .cloned()
        .unwrap_or_default()
        .without(ConstraintDomain::Number);
    let value = match stepped {
        Some(interval) => value.with_constraint(interval.into()),
        None => value,
    };
    state.with_value(symbol, value)
}
