//! The symbolic execution engine: dispatcher, processors and driver.
//!
//! [`SymbolicEngine`] walks the control flow graph of one analyzed unit,
//! tracking per-value constraints across multiple explored execution
//! states. The walk is single-threaded and synchronous; independent units
//! can be analyzed concurrently by the host because program states are
//! immutable and nothing mutable is shared between walks.
//!
//! # Usage
//!
//! ```rust
//! use pathscope::cfg::{CfgBuilder, Literal, OperationKind, Terminator};
//! use pathscope::engine::SymbolicEngine;
//! use pathscope::constraint::BoolConstraint;
//!
//! let mut builder = CfgBuilder::new();
//! let block = builder.block();
//! let flag = builder.operation(OperationKind::Literal(Literal::Bool(true)));
//! builder.append(block, flag)?;
//! builder.terminate(block, Terminator::Return { value: Some(flag) })?;
//! let cfg = builder.finish(block)?;
//!
//! let results = SymbolicEngine::new().analyze(&cfg);
//! assert_eq!(
//!     results.bool_constraint_at(flag, flag),
//!     Some(BoolConstraint::True)
//! );
//! assert!(!results.is_truncated());
//! # Ok::<(), pathscope::Error>(())
//! ```

mod config;
pub(crate) mod dispatch;
pub(crate) mod explorer;
pub(crate) mod learn;
pub(crate) mod processors;

pub use config::{CollectionClassifier, EngineConfig};

use crate::{
    cfg::{ControlFlowGraph, OperationId},
    constraint::{
        BoolConstraint, CollectionConstraint, NumberConstraint, ObjectConstraint,
    },
    state::{ProgramState, ValueKey},
};

/// Per-operation constraint facts produced by one walk.
///
/// For every operation the results hold the deduplicated set of program
/// states valid right after that operation. The per-domain queries return a
/// constraint only when **every** state at that point agrees - a fact that
/// holds on some paths only is not a fact.
///
/// When [`is_truncated`](Self::is_truncated) reports `true` the state
/// budget was exceeded somewhere and absent constraints must be read as
/// "unknown", never as "definitely false".
#[derive(Debug, Clone)]
pub struct AnalysisResults {
    states: Vec<Vec<ProgramState>>,
    truncated: bool,
}

impl AnalysisResults {
    pub(crate) fn new(operation_count: usize) -> Self {
        Self {
            states: vec![Vec::new(); operation_count],
            truncated: false,
        }
    }

    pub(crate) fn record(&mut self, operation: OperationId, state: &ProgramState) {
        if let Some(slot) = self.states.get_mut(operation.index()) {
            if !slot.contains(state) {
                slot.push(state.clone());
            }
        }
    }

    pub(crate) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Returns `true` if a budget cut the exploration short.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The states valid immediately after `operation`.
    ///
    /// Empty for operations never reached.
    #[must_use]
    pub fn states_at(&self, operation: OperationId) -> &[ProgramState] {
        self.states
            .get(operation.index())
            .map_or(&[], Vec::as_slice)
    }

    /// The nullability of `key` at `operation`, when all states agree.
    #[must_use]
    pub fn object_constraint_at(
        &self,
        operation: OperationId,
        key: impl Into<ValueKey>,
    ) -> Option<ObjectConstraint> {
        let key = key.into();
        self.agreed(operation, |state| state.object_constraint(key))
    }

    /// The boolean truth of `key` at `operation`, when all states agree.
    #[must_use]
    pub fn bool_constraint_at(
        &self,
        operation: OperationId,
        key: impl Into<ValueKey>,
    ) -> Option<BoolConstraint> {
        let key = key.into();
        self.agreed(operation, |state| state.bool_constraint(key))
    }

    /// The numeric interval of `key` at `operation`, when all states agree.
    #[must_use]
    pub fn number_constraint_at(
        &self,
        operation: OperationId,
        key: impl Into<ValueKey>,
    ) -> Option<NumberConstraint> {
        let key = key.into();
        self.agreed(operation, |state| state.number_constraint(key).cloned())
    }

    /// The emptiness of `key` at `operation`, when all states agree.
    #[must_use]
    pub fn collection_constraint_at(
        &self,
        operation: OperationId,
        key: impl Into<ValueKey>,
    ) -> Option<CollectionConstraint> {
        let key = key.into();
        self.agreed(operation, |state| state.collection_constraint(key))
    }

    /// A fact agreed on by every state at the given point.
    fn agreed<T: PartialEq>(
        &self,
        operation: OperationId,
        fact: impl Fn(&ProgramState) -> Option<T>,
    ) -> Option<T> {
        let states = self.states_at(operation);
        let (first, rest) = states.split_first()?;
        let value = fact(first)?;
        rest.iter()
            .all(|state| fact(state).as_ref() == Some(&value))
            .then_some(value)
    }
}

/// The path-sensitive symbolic execution engine.
///
/// An engine instance is a configuration holder; [`analyze`](Self::analyze)
/// performs one complete walk and returns the per-operation constraint
/// facts. The engine never fails: malformed graphs are rejected earlier by
/// [`CfgBuilder`](crate::cfg::CfgBuilder), and resource exhaustion yields
/// truncated partial results.
#[derive(Debug, Clone, Default)]
pub struct SymbolicEngine {
    config: EngineConfig,
}

impl SymbolicEngine {
    /// Creates an engine with default budgets and classification tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub const fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Walks the graph and returns per-operation constraint facts.
    #[must_use]
    pub fn analyze(&self, cfg: &ControlFlowGraph) -> AnalysisResults {
        explorer::Explorer::new(cfg, &self.config).run()
    }
}
