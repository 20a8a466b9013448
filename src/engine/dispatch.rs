//! Routes operation nodes to their processor archetype.
//!
//! The mapping from [`OperationKind`] to archetype is a single exhaustive
//! match without a wildcard arm: adding an operation variant fails to
//! compile until a processor decision is made for it.

use crate::{
    cfg::{ControlFlowGraph, ConversionKind, Operation, OperationKind},
    engine::{
        processors::{branching, multi, simple},
        EngineConfig,
    },
    state::{ProgramState, ProgramStates},
};

/// Everything a processor may consult while transforming a state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpContext<'a> {
    /// The graph being walked; used to resolve operand references.
    pub cfg: &'a ControlFlowGraph,
    /// Budgets and classification tables.
    pub config: &'a EngineConfig,
    /// `true` while processing a block inside a natural loop; selects the
    /// widening arithmetic variant.
    pub in_loop: bool,
}

/// The three processor contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Archetype {
    /// One state in, exactly one state out, no decision.
    Simple,
    /// One state in, one determined or two hypothesis states out.
    Branching,
    /// One state in, zero to N states out for inherently uncertain
    /// outcomes.
    Multi,
}

/// Classifies an operation by processor archetype.
pub(crate) const fn archetype(kind: &OperationKind) -> Archetype {
    match kind {
        OperationKind::Literal(_)
        | OperationKind::SymbolRead(_)
        | OperationKind::Assignment { .. }
        | OperationKind::Increment { .. }
        | OperationKind::Decrement { .. }
        | OperationKind::Binary { .. }
        | OperationKind::PropertyRead { .. }
        | OperationKind::ObjectCreation { .. } => Archetype::Simple,
        OperationKind::Conversion {
            kind: ConversionKind::TryDowncast,
            ..
        } => Archetype::Multi,
        OperationKind::Conversion { .. } => Archetype::Simple,
        OperationKind::Comparison { .. }
        | OperationKind::LogicalNot { .. }
        | OperationKind::PatternTest { .. } => Archetype::Branching,
        OperationKind::Invocation { .. } => Archetype::Multi,
    }
}

/// Applies the operation's transfer function to one input state.
pub(crate) fn process(
    ctx: &OpContext<'_>,
    operation: &Operation,
    state: ProgramState,
) -> ProgramStates {
    match archetype(operation.kind()) {
        Archetype::Simple => ProgramStates::single(simple::process(ctx, operation, state)),
        Archetype::Branching => branching::process(ctx, operation, state),
        Archetype::Multi => multi::process(ctx, operation, state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::{Literal, OperationId, PatternKind};

    #[test]
    fn test_archetype_classification() {
        assert_eq!(
            archetype(&OperationKind::Literal(Literal::Null)),
            Archetype::Simple
        );
        assert_eq!(
            archetype(&OperationKind::Conversion {
                kind: ConversionKind::Implicit,
                operand: OperationId::new(0),
            }),
            Archetype::Simple
        );
        assert_eq!(
            archetype(&OperationKind::Conversion {
                kind: ConversionKind::TryDowncast,
                operand: OperationId::new(0),
            }),
            Archetype::Multi
        );
        assert_eq!(
            archetype(&OperationKind::PatternTest {
                operand: OperationId::new(0),
                pattern: PatternKind::Null,
            }),
            Archetype::Branching
        );
        assert_eq!(
            archetype(&OperationKind::Invocation {
                instance: None,
                method: "Frobnicate".into(),
                arguments: Vec::new(),
            }),
            Archetype::Multi
        );
    }
}
