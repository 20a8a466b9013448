//! The three per-operation transfer-function archetypes.
//!
//! - [`simple`] - one state in, exactly one state out, no decision.
//! - [`branching`] - one state in; either the boolean outcome is already
//!   determined and a single annotated state comes out, or two hypothesis
//!   states carrying the constraints each operand symbol would gain under
//!   "true" and "false".
//! - [`multi`] - one state in, zero to N states out for operations with
//!   inherently uncertain outcomes (ambiguous downcasts, calls with
//!   multiple nullability outcomes).
//!
//! Under-specified operands are never an error: a processor that cannot
//! resolve what it needs returns the unchanged input state.

pub(crate) mod branching;
pub(crate) mod multi;
pub(crate) mod simple;
