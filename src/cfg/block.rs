//! Basic blocks and their terminators.

use std::fmt;

use crate::cfg::OperationId;

/// Identifier of a [`BasicBlock`] within one control flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

impl BlockId {
    /// Creates a block identifier from a raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// How control leaves a basic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminator {
    /// Unconditional transfer to another block.
    Jump(BlockId),
    /// Two-way conditional transfer based on a boolean condition
    /// operation evaluated within the block.
    Branch {
        /// The operation whose boolean outcome decides the edge.
        condition: OperationId,
        /// Successor when the condition holds.
        true_target: BlockId,
        /// Successor when the condition does not hold.
        false_target: BlockId,
    },
    /// Exit from the analyzed unit.
    Return {
        /// The returned operation, if any.
        value: Option<OperationId>,
    },
}

impl Terminator {
    /// Returns the successor blocks in edge order.
    ///
    /// A branch whose targets coincide reports the target once.
    #[must_use]
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Self::Jump(target) => vec![*target],
            Self::Branch {
                true_target,
                false_target,
                ..
            } => {
                if true_target == false_target {
                    vec![*true_target]
                } else {
                    vec![*true_target, *false_target]
                }
            }
            Self::Return { .. } => Vec::new(),
        }
    }

    /// Returns `true` if this terminator is a conditional branch.
    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::Branch { .. })
    }
}

/// A maximal straight-line sequence of operations with a single terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    id: BlockId,
    operations: Vec<OperationId>,
    terminator: Terminator,
}

impl BasicBlock {
    /// Creates a block from its ordered operations and terminator.
    #[must_use]
    pub const fn new(id: BlockId, operations: Vec<OperationId>, terminator: Terminator) -> Self {
        Self {
            id,
            operations,
            terminator,
        }
    }

    /// The identity of this block.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// The operations of this block in evaluation order.
    #[must_use]
    pub fn operations(&self) -> &[OperationId] {
        &self.operations
    }

    /// How control leaves this block.
    #[must_use]
    pub const fn terminator(&self) -> &Terminator {
        &self.terminator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successors() {
        let jump = Terminator::Jump(BlockId::new(3));
        assert_eq!(jump.successors(), vec![BlockId::new(3)]);

        let branch = Terminator::Branch {
            condition: OperationId::new(0),
            true_target: BlockId::new(1),
            false_target: BlockId::new(2),
        };
        assert_eq!(branch.successors(), vec![BlockId::new(1), BlockId::new(2)]);
        assert!(branch.is_branch());

        let degenerate = Terminator::Branch {
            condition: OperationId::new(0),
            true_target: BlockId::new(1),
            false_target: BlockId::new(1),
        };
        assert_eq!(degenerate.successors(), vec![BlockId::new(1)]);

        assert!(Terminator::Return { value: None }.successors().is_empty());
    }
}
