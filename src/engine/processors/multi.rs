//! Transfer functions for operations with inherently uncertain outcomes.

use log::debug;

use crate::{
    cfg::{ConversionKind, Operation, OperationId, OperationKind, SymbolId},
    constraint::{CollectionConstraint, ConstraintDomain, ObjectConstraint},
    engine::dispatch::OpContext,
    state::{ProgramState, ProgramStates},
};

/// Processes an uncertain-outcome operation: zero to N states out.
pub(crate) fn process(
    ctx: &OpContext<'_>,
    operation: &Operation,
    state: ProgramState,
) -> ProgramStates {
    match operation.kind() {
        OperationKind::Conversion {
            kind: ConversionKind::TryDowncast,
            operand,
        } => downcast(operation.id(), *operand, state),
        OperationKind::Invocation {
            instance, method, ..
        } => invocation(ctx, operation.id(), *instance, method, state),
        _ => ProgramStates::single(state),
    }
}

/// An `as`-style downcast yields null on failure.
///
/// A null operand stays null. Any other operand produces both hypotheses:
/// the cast succeeded (non-null result) or failed (null result).
fn downcast(id: OperationId, operand: OperationId, state: ProgramState) -> ProgramStates {
    match state.object_constraint(operand) {
        Some(ObjectConstraint::Null) => {
            ProgramStates::single(state.with_operation_constraint(id, ObjectConstraint::Null))
        }
        _ => ProgramStates::pair(
            state.with_operation_constraint(id, ObjectConstraint::NotNull),
            state.with_operation_constraint(id, ObjectConstraint::Null),
        ),
    }
}

/// Invocation effects: receiver dereference, collection mutators, and
/// nullability-ambiguous results.
fn invocation(
    ctx: &OpContext<'_>,
    id: OperationId,
    instance: Option<SymbolId>,
    method: &str,
    state: ProgramState,
) -> ProgramStates {
    let classifier = ctx.config.classifier();
    let mut state = state;

    if let Some(receiver) = instance {
        // A completed member call proves the receiver was dereferenceable.
        let receiver_value = state.value_of(receiver).cloned().unwrap_or_default();
        let Some(dereferenced) =
            receiver_value.merge_constraint(ObjectConstraint::NotNull.into())
        else {
            // Calling through a known-null receiver has no normal
            // continuation; the path dies here.
            debug!("call to {method} on null receiver {receiver}: no continuation");
            return ProgramStates::none();
        };
        state = state.with_value(receiver, dereferenced);

        if ctx
            .cfg
            .symbol(receiver)
            .is_some_and(|symbol| classifier.is_collection(symbol))
        {
            if classifier.is_adding_method(method) {
                state = state.with_symbol_constraint(receiver, CollectionConstraint::NotEmpty);
            } else if classifier.is_clearing_method(method) {
                state = state.with_symbol_constraint(receiver, CollectionConstraint::Empty);
            } else if classifier.is_removing_method(method) {
                // Removal may or may not empty the collection.
                let value = state
                    .value_of(receiver)
                    .cloned()
                    .unwrap_or_default()
                    .without(ConstraintDomain::Collection);
                state = state.with_value(receiver, value);
            }
        }
    }

    if classifier.is_null_ambiguous_method(method) {
        ProgramStates::pair(
            state.with_operation_constraint(id, ObjectConstraint::NotNull),
            state.with_operation_constraint(id, ObjectConstraint::Null),
        )
    } else {
        ProgramStates::single(state)
    }
}
