//! # pathscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used
//! types from the pathscope library. Import it to get quick access to the
//! essentials for building graphs and querying analysis results.
//!
//! # Usage
//!
//! ```rust
//! use pathscope::prelude::*;
//!
//! let mut builder = CfgBuilder::new();
//! let block = builder.block();
//! builder.terminate(block, Terminator::Return { value: None })?;
//! let cfg = builder.finish(block)?;
//!
//! let results = SymbolicEngine::new().analyze(&cfg);
//! assert!(!results.is_truncated());
//! # Ok::<(), pathscope::Error>(())
//! ```

pub use crate::{
    cfg::{
        BasicBlock, BinaryOperator, BlockId, CfgBuilder, ComparisonOperator, ControlFlowGraph,
        ConversionKind, Literal, Operation, OperationId, OperationKind, PatternKind, Symbol,
        SymbolId, SymbolKind, Terminator, TypeHint,
    },
    constraint::{
        BoolConstraint, CollectionConstraint, Constraint, ConstraintDomain, Nullability,
        NumberConstraint, ObjectConstraint,
    },
    engine::{AnalysisResults, CollectionClassifier, EngineConfig, SymbolicEngine},
    state::{ProgramState, ProgramStates, SymbolicValue, ValueKey},
    Error, Result,
};
