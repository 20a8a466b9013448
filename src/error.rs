use thiserror::Error;

/// The generic Error type covering everything this library can return.
///
/// Errors only arise while constructing the input control flow graph: the
/// engine itself never fails. Under-specified operands flow through
/// unchanged, a provably-zero divisor simply yields no constraint, and
/// state-space explosion soft-fails into truncated partial results.
#[derive(Error, Debug)]
pub enum Error {
    /// The graph under construction has no blocks.
    #[error("The control flow graph is empty")]
    Empty,

    /// The graph under construction is structurally malformed, e.g. a
    /// block without a terminator or a doubly terminated block.
    #[error("Invalid graph - {0}")]
    InvalidGraph(String),

    /// A block, operation or symbol reference does not resolve within the
    /// graph under construction.
    #[error("Invalid reference - {0}")]
    InvalidReference(String),
}
