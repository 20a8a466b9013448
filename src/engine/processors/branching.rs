//! Transfer functions for boolean-producing decisions.
//!
//! A branching operation attaches its boolean outcome to the operation
//! itself so the explorer can filter states per branch edge later. When
//! existing constraints already decide the outcome, a single state comes
//! out. Otherwise the processor computes, independently per side, what each
//! relevant operand symbol would gain under "true" and under "false", and
//! emits two hypothesis states - or the unchanged input when neither side
//! learns anything, avoiding needless forking.
//!
//! The two sides are computed independently on purpose: the processor does
//! not cross-check one side's constraints against the other's. A side that
//! contradicts pre-existing knowledge surfaces as infeasible on its own.

use crate::{
    cfg::{ComparisonOperator, Operation, OperationId, OperationKind, PatternKind},
    constraint::{BoolConstraint, Nullability, ObjectConstraint},
    engine::{dispatch::OpContext, learn},
    state::{ProgramState, ProgramStates},
};

/// Processes a decision operation: one determined state or two hypotheses.
pub(crate) fn process(
    ctx: &OpContext<'_>,
    operation: &Operation,
    state: ProgramState,
) -> ProgramStates {
    match operation.kind() {
        OperationKind::Comparison {
            operator,
            left,
            right,
        } => comparison(ctx, operation.id(), *operator, *left, *right, state),
        OperationKind::LogicalNot { operand } => logical_not(ctx, operation.id(), *operand, state),
        OperationKind::PatternTest { operand, pattern } => {
            pattern_test(ctx, operation.id(), *operand, *pattern, state)
        }
        _ => ProgramStates::single(state),
    }
}

fn comparison(
    ctx: &OpContext<'_>,
    id: OperationId,
    operator: ComparisonOperator,
    left: OperationId,
    right: OperationId,
    state: ProgramState,
) -> ProgramStates {
    if let Some(outcome) = learn::determine_comparison(&state, operator, left, right) {
        return ProgramStates::single(
            state.with_operation_constraint(id, BoolConstraint::from(outcome)),
        );
    }

    let classifier = ctx.config.classifier();
    let on_true =
        learn::learn_from_comparison(ctx.cfg, classifier, &state, operator, left, right, true);
    let on_false =
        learn::learn_from_comparison(ctx.cfg, classifier, &state, operator, left, right, false);

    match (on_true, on_false) {
        (Some(true_state), Some(false_state)) => {
            if true_state == state && false_state == state {
                // Nothing learnable on either side.
                ProgramStates::single(state)
            } else {
                ProgramStates::pair(
                    true_state.with_operation_constraint(id, BoolConstraint::True),
                    false_state.with_operation_constraint(id, BoolConstraint::False),
                )
            }
        }
        // One side contradicts existing knowledge: the other side holds.
        (Some(true_state), None) => {
            ProgramStates::single(true_state.with_operation_constraint(id, BoolConstraint::True))
        }
        (None, Some(false_state)) => {
            ProgramStates::single(false_state.with_operation_constraint(id, BoolConstraint::False))
        }
        (None, None) => ProgramStates::single(state),
    }
}

fn logical_not(
    ctx: &OpContext<'_>,
    id: OperationId,
    operand: OperationId,
    state: ProgramState,
) -> ProgramStates {
    if let Some(known) = state.bool_constraint(operand) {
        return ProgramStates::single(state.with_operation_constraint(id, known.opposite()));
    }

    let symbol = learn::resolve_symbol(ctx.cfg, operand);
    let assume = |truth: BoolConstraint| {
        let mut side = state.with_operation_constraint(operand, truth);
        if let Some(symbol) = symbol {
            side = side.with_symbol_constraint(symbol, truth);
        }
        side.with_operation_constraint(id, truth.opposite())
    };

    // The negation is true exactly when the operand is false.
    ProgramStates::pair(assume(BoolConstraint::False), assume(BoolConstraint::True))
}

fn pattern_test(
    ctx: &OpContext<'_>,
    id: OperationId,
    operand: OperationId,
    pattern: PatternKind,
    state: ProgramState,
) -> ProgramStates {
    use ObjectConstraint::{NotNull, Null};

    let known = state.object_constraint(operand);
    let determined = match (pattern, known) {
        (PatternKind::Discard, _) => Some(true),
        (PatternKind::Null, Some(Null)) | (PatternKind::NotNull, Some(NotNull)) => Some(true),
        (PatternKind::Null, Some(NotNull)) | (PatternKind::NotNull, Some(Null)) => Some(false),
        (PatternKind::Type { .. }, Some(Null)) => Some(false),
        (
            PatternKind::Type {
                operand_compatible: true,
            },
            Some(NotNull),
        ) => Some(true),
        _ => None,
    };
    if let Some(outcome) = determined {
        return ProgramStates::single(
            state.with_operation_constraint(id, BoolConstraint::from(outcome)),
        );
    }

    // What matching / failing the pattern proves about the operand.
    let (on_true, on_false) = match pattern {
        PatternKind::Null => (Nullability::Null, Nullability::NotNull),
        PatternKind::NotNull => (Nullability::NotNull, Nullability::Null),
        PatternKind::Type { operand_compatible } => (
            Nullability::NotNull,
            // An incompatible value can fail the test while non-null.
            if operand_compatible {
                Nullability::Null
            } else {
                Nullability::Unknown
            },
        ),
        PatternKind::Discard => (Nullability::Unknown, Nullability::Unknown),
    };

    let symbol = learn::resolve_symbol(ctx.cfg, operand);
    let apply = |truth: bool, nullability: Nullability| {
        let mut side = state.with_operation_constraint(id, BoolConstraint::from(truth));
        if let Some(constraint) = nullability.constraint() {
            side = side.with_operation_constraint(operand, constraint);
            if let Some(symbol) = symbol {
                side = side.with_symbol_constraint(symbol, constraint);
            }
        }
        side
    };

    ProgramStates::pair(apply(true, on_true), apply(false, on_false))
}
