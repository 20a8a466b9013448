// Copyright 2026 The pathscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # pathscope
//!
//! A path-sensitive symbolic execution engine for control flow graph based
//! program analysis. `pathscope` walks the CFG of one analyzed program unit
//! (a method, a property accessor), tracks per-value constraints across
//! multiple explored execution states, and forks and filters those states
//! at branches to discover provably-true and provably-false conditions.
//!
//! ## Features
//!
//! - **Constraint domains** - independent lattices for nullability, boolean
//!   truth, numeric intervals (arbitrary precision) and collection
//!   emptiness
//! - **Immutable program states** - persistent, structurally shared state
//!   maps so forking at every branch costs the delta, not the state
//! - **Exact interval arithmetic** - sign-aware multiplication, quadrant
//!   division, remainder and bitwise bounds with loop-aware widening
//! - **Branch learning** - equality, relational, collection-emptiness and
//!   pattern-test constraint derivation per branch side
//! - **Explosion control** - state deduplication plus soft revisit, state
//!   and step budgets producing truncated partial results instead of
//!   failures
//!
//! ## Quick Start
//!
//! Build a graph through [`cfg::CfgBuilder`], run
//! [`engine::SymbolicEngine::analyze`] and query the returned
//! [`engine::AnalysisResults`]:
//!
//! ```rust
//! use pathscope::prelude::*;
//!
//! // if (x > 5) { ... } else { ... }
//! let mut builder = CfgBuilder::new();
//! let entry = builder.block();
//! let then_block = builder.block();
//! let else_block = builder.block();
//!
//! let x = builder.symbol(Symbol::new("x", SymbolKind::Parameter, TypeHint::Integer));
//! let read = builder.operation(OperationKind::SymbolRead(x));
//! let five = builder.operation(OperationKind::Literal(Literal::Number(5.into())));
//! let compare = builder.operation(OperationKind::Comparison {
//!     operator: ComparisonOperator::GreaterThan,
//!     left: read,
//!     right: five,
//! });
//! for op in [read, five, compare] {
//!     builder.append(entry, op)?;
//! }
//! builder.terminate(entry, Terminator::Branch {
//!     condition: compare,
//!     true_target: then_block,
//!     false_target: else_block,
//! })?;
//!
//! let then_probe = builder.operation(OperationKind::SymbolRead(x));
//! builder.append(then_block, then_probe)?;
//! builder.terminate(then_block, Terminator::Return { value: None })?;
//! let else_probe = builder.operation(OperationKind::SymbolRead(x));
//! builder.append(else_block, else_probe)?;
//! builder.terminate(else_block, Terminator::Return { value: None })?;
//!
//! let cfg = builder.finish(entry)?;
//! let results = SymbolicEngine::new().analyze(&cfg);
//!
//! // The true branch narrowed x to [6, +inf), the false branch to (-inf, 5].
//! assert_eq!(
//!     results.number_constraint_at(then_probe, x),
//!     Some(NumberConstraint::at_least(6))
//! );
//! assert_eq!(
//!     results.number_constraint_at(else_probe, x),
//!     Some(NumberConstraint::at_most(5))
//! );
//! # Ok::<(), pathscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `pathscope` is organized into focused modules:
//!
//! - [`cfg`] - the input model: symbols, typed operation nodes, basic
//!   blocks and the validating graph builder
//! - [`constraint`] - the four constraint domains
//! - [`state`] - symbolic values and persistent program states
//! - [`arith`] - the interval/bitwise arithmetic calculator
//! - [`engine`] - dispatcher, processor archetypes, branch learning and
//!   the state-space explorer
//! - [`prelude`] - convenient re-exports of the common types
//!
//! ## Scope
//!
//! The engine analyzes one unit at a time and owns neither parsing nor
//! reporting: the host front-end assigns symbol and operation identities
//! and supplies the CFG; the host rule catalog consumes the per-operation
//! constraint facts. The engine deliberately trades completeness for
//! termination and low false positives - exploration budgets truncate
//! pathological state growth, and truncated results must be treated as
//! "unknown" by consumers.

pub(crate) mod utils;

pub mod arith;
pub mod cfg;
pub mod constraint;
pub mod engine;
pub mod prelude;
pub mod state;

mod error;

/// `pathscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] used by every
/// fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `pathscope` Error type
///
/// Construction-time validation errors; see [`Error`] for the variants.
pub use error::Error;
