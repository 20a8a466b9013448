//! Control flow graph construction and analysis.
//!
//! This module provides the [`ControlFlowGraph`] the engine walks and the
//! validating [`CfgBuilder`] hosts use to construct it. Derived structures
//! (reverse postorder, dominators, natural loops) are computed lazily and
//! cached, so the cost is only paid by walks that need them.

use std::{
    collections::HashSet,
    sync::OnceLock,
};

use crate::{
    cfg::{BasicBlock, BlockId, Operation, OperationId, OperationKind, Symbol, SymbolId, Terminator},
    Error, Result,
};

/// Loop structure derived from the graph's back edges.
#[derive(Debug)]
struct LoopInfo {
    /// Indices of loop header blocks.
    headers: HashSet<usize>,
    /// Indices of all blocks inside some natural loop (headers included).
    body: HashSet<usize>,
    /// Back edges as `(tail, header)` pairs.
    back_edges: Vec<(BlockId, BlockId)>,
}

/// The control flow graph of one analyzed unit.
///
/// Blocks contain ordered, typed operation nodes; branch blocks expose the
/// condition operation plus their successor edges. The graph is immutable
/// once built: the engine never mutates it, so independent units can be
/// analyzed concurrently by the host.
///
/// # Construction
///
/// Build a graph through [`CfgBuilder`]:
///
/// ```rust
/// use pathscope::cfg::{CfgBuilder, Literal, OperationKind, Terminator};
///
/// let mut builder = CfgBuilder::new();
/// let block = builder.block();
/// let value = builder.operation(OperationKind::Literal(Literal::Bool(true)));
/// builder.append(block, value)?;
/// builder.terminate(block, Terminator::Return { value: Some(value) })?;
/// let cfg = builder.finish(block)?;
/// assert_eq!(cfg.block_count(), 1);
/// # Ok::<(), pathscope::Error>(())
/// ```
#[derive(Debug)]
pub struct ControlFlowGraph {
    symbols: Vec<Symbol>,
    operations: Vec<Operation>,
    blocks: Vec<BasicBlock>,
    entry: BlockId,
    predecessors: Vec<Vec<BlockId>>,
    rpo: OnceLock<Vec<BlockId>>,
    loops: OnceLock<LoopInfo>,
}

impl ControlFlowGraph {
    /// The entry block of the unit.
    #[must_use]
    pub const fn entry(&self) -> BlockId {
        self.entry
    }

    /// Number of blocks in the graph.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of operation nodes in the graph.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Number of symbols in the symbol table.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Looks up a block by identity.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// Looks up an operation node by identity.
    #[must_use]
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.index())
    }

    /// Looks up a symbol by identity.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// The successor blocks of `block` in edge order.
    #[must_use]
    pub fn successors(&self, block: BlockId) -> Vec<BlockId> {
        self.block(block)
            .map_or_else(Vec::new, |b| b.terminator().successors())
    }

    /// The predecessor blocks of `block`.
    #[must_use]
    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.predecessors
            .get(block.index())
            .map_or(&[], Vec::as_slice)
    }

    /// Reachable blocks in reverse postorder.
    ///
    /// Visiting blocks in this order processes every predecessor of a block
    /// before the block itself, except along back edges.
    #[must_use]
    pub fn reverse_postorder(&self) -> &[BlockId] {
        self.rpo.get_or_init(|| {
            let mut postorder = Vec::with_capacity(self.blocks.len());
            let mut visited = vec![false; self.blocks.len()];
            // Iterative DFS; the second stack entry tracks the next successor.
            let mut stack = vec![(self.entry, 0usize)];
            visited[self.entry.index()] = true;
            while let Some((block, next)) = stack.pop() {
                let succs = self.successors(block);
                if let Some(&succ) = succs.get(next) {
                    stack.push((block, next + 1));
                    if !visited[succ.index()] {
                        visited[succ.index()] = true;
                        stack.push((succ, 0));
                    }
                } else {
                    postorder.push(block);
                }
            }
            postorder.reverse();
            postorder
        })
    }

    /// Returns `true` if `block` lies inside some natural loop.
    ///
    /// Used by the explorer to select the loop-aware arithmetic variant.
    #[must_use]
    pub fn is_in_loop(&self, block: BlockId) -> bool {
        self.loop_info().body.contains(&block.index())
    }

    /// Returns `true` if `block` is the header of a natural loop.
    #[must_use]
    pub fn is_loop_header(&self, block: BlockId) -> bool {
        self.loop_info().headers.contains(&block.index())
    }

    /// The back edges of the graph as `(tail, header)` pairs.
    #[must_use]
    pub fn back_edges(&self) -> &[(BlockId, BlockId)] {
        &self.loop_info().back_edges
    }

    /// Returns `true` if the graph contains at least one loop.
    #[must_use]
    pub fn has_loops(&self) -> bool {
        !self.loop_info().back_edges.is_empty()
    }

    fn loop_info(&self) -> &LoopInfo {
        self.loops.get_or_init(|| self.compute_loops())
    }

    /// Finds back edges via dominators and floods the natural loop bodies.
    fn compute_loops(&self) -> LoopInfo {
        let rpo = self.reverse_postorder();
        let idom = self.compute_idoms(rpo);

        let mut info = LoopInfo {
            headers: HashSet::new(),
            body: HashSet::new(),
            back_edges: Vec::new(),
        };

        for &block in rpo {
            for succ in self.successors(block) {
                if self.dominates(&idom, succ.index(), block.index()) {
                    info.back_edges.push((block, succ));
                    info.headers.insert(succ.index());
                    self.collect_loop_body(succ, block, &mut info.body);
                }
            }
        }
        info
    }

    /// Iterative dominator computation over the reverse postorder.
    ///
    /// Returns the immediate dominator index per block; unreachable blocks
    /// get `None`.
    fn compute_idoms(&self, rpo: &[BlockId]) -> Vec<Option<usize>> {
        let mut rpo_number = vec![usize::MAX; self.blocks.len()];
        for (number, block) in rpo.iter().enumerate() {
            rpo_number[block.index()] = number;
        }

        let mut idom: Vec<Option<usize>> = vec![None; self.blocks.len()];
        idom[self.entry.index()] = Some(self.entry.index());

        let mut changed = true;
        while changed {
            changed = false;
            for &block in rpo.iter().skip(1) {
                let mut new_idom: Option<usize> = None;
                for &pred in self.predecessors(block) {
                    if idom[pred.index()].is_none() {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => pred.index(),
                        Some(current) => {
                            intersect(&idom, &rpo_number, current, pred.index())
                        }
                    });
                }
                if new_idom.is_some() && idom[block.index()] != new_idom {
                    idom[block.index()] = new_idom;
                    changed = true;
                }
            }
        }
        idom
    }

    /// Returns `true` if `a` dominates `b` under the given idom tree.
    fn dominates(&self, idom: &[Option<usize>], a: usize, b: usize) -> bool {
        let entry = self.entry.index();
        let mut current = b;
        loop {
            if current == a {
                return true;
            }
            if current == entry {
                return false;
            }
            match idom[current] {
                Some(parent) if parent != current => current = parent,
                _ => return false,
            }
        }
    }

    /// Collects the natural loop of the back edge `tail -> header`.
    fn collect_loop_body(&self, header: BlockId, tail: BlockId, body: &mut HashSet<usize>) {
        body.insert(header.index());
        let mut worklist = vec![tail];
        while let Some(block) = worklist.pop() {
            if body.insert(block.index()) {
                worklist.extend(self.predecessors(block).iter().copied());
            }
        }
    }
}

/// Two-finger intersection on the dominator tree.
fn intersect(idom: &[Option<usize>], rpo_number: &[usize], mut a: usize, mut b: usize) -> usize {
    while a != b {
        while rpo_number[a] > rpo_number[b] {
            a = idom[a].expect("processed block has an idom");
        }
        while rpo_number[b] > rpo_number[a] {
            b = idom[b].expect("processed block has an idom");
        }
    }
    a
}

/// Incrementally constructs a validated [`ControlFlowGraph`].
///
/// Symbols, operations and blocks are registered first; blocks are then
/// filled and terminated. [`finish`](Self::finish) validates every
/// cross-reference and rejects malformed graphs instead of letting the
/// engine observe them.
#[derive(Debug, Default)]
pub struct CfgBuilder {
    symbols: Vec<Symbol>,
    operations: Vec<Operation>,
    block_operations: Vec<Vec<OperationId>>,
    terminators: Vec<Option<Terminator>>,
}

impl CfgBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a symbol and returns its identity.
    pub fn symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    /// Registers an operation node and returns its identity.
    pub fn operation(&mut self, kind: OperationKind) -> OperationId {
        let id = OperationId::new(self.operations.len());
        self.operations.push(Operation::new(id, kind));
        id
    }

    /// Reserves a new, empty basic block.
    pub fn block(&mut self) -> BlockId {
        let id = BlockId::new(self.block_operations.len());
        self.block_operations.push(Vec::new());
        self.terminators.push(None);
        id
    }

    /// Appends an operation to a block's evaluation sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] when `block` or `operation` was
    /// not created by this builder.
    pub fn append(&mut self, block: BlockId, operation: OperationId) -> Result<()> {
        if operation.index() >= self.operations.len() {
            return Err(Error::InvalidReference(format!(
                "unknown operation {operation}"
            )));
        }
        self.block_operations
            .get_mut(block.index())
            .ok_or_else(|| Error::InvalidReference(format!("unknown block {block}")))?
            .push(operation);
        Ok(())
    }

    /// Sets a block's terminator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] for an unknown block and
    /// [`Error::InvalidGraph`] when the block is already terminated.
    pub fn terminate(&mut self, block: BlockId, terminator: Terminator) -> Result<()> {
        let slot = self
            .terminators
            .get_mut(block.index())
            .ok_or_else(|| Error::InvalidReference(format!("unknown block {block}")))?;
        if slot.is_some() {
            return Err(Error::InvalidGraph(format!(
                "block {block} is already terminated"
            )));
        }
        *slot = Some(terminator);
        Ok(())
    }

    /// Validates the accumulated graph and produces the immutable CFG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] for a graph without blocks,
    /// [`Error::InvalidGraph`] for an unterminated block and
    /// [`Error::InvalidReference`] for any dangling block, operation or
    /// symbol reference.
    pub fn finish(self, entry: BlockId) -> Result<ControlFlowGraph> {
        if self.block_operations.is_empty() {
            return Err(Error::Empty);
        }
        if entry.index() >= self.block_operations.len() {
            return Err(Error::InvalidReference(format!("unknown entry {entry}")));
        }

        for operation in &self.operations {
            self.check_operation(operation)?;
        }

        let block_count = self.block_operations.len();
        let mut blocks = Vec::with_capacity(block_count);
        let mut predecessors: Vec<Vec<BlockId>> = vec![Vec::new(); block_count];

        for (index, (operations, terminator)) in self
            .block_operations
            .into_iter()
            .zip(self.terminators)
            .enumerate()
        {
            let id = BlockId::new(index);
            let terminator = terminator
                .ok_or_else(|| Error::InvalidGraph(format!("block {id} has no terminator")))?;
            for target in terminator.successors() {
                if target.index() >= block_count {
                    return Err(Error::InvalidReference(format!(
                        "block {id} targets unknown block {target}"
                    )));
                }
                predecessors[target.index()].push(id);
            }
            if let Terminator::Branch { condition, .. } = &terminator {
                if condition.index() >= self.operations.len() {
                    return Err(Error::InvalidReference(format!(
                        "block {id} branches on unknown operation {condition}"
                    )));
                }
            }
            blocks.push(BasicBlock::new(id, operations, terminator));
        }

        Ok(ControlFlowGraph {
            symbols: self.symbols,
            operations: self.operations,
            blocks,
            entry,
            predecessors,
            rpo: OnceLock::new(),
            loops: OnceLock::new(),
        })
    }

    /// Validates the cross-references of a single operation node.
    fn check_operation(&self, operation: &Operation) -> Result<()> {
        let id = operation.id();
        let check_op = |operand: OperationId| {
            if operand.index() >= self.operations.len() {
                Err(Error::InvalidReference(format!(
                    "operation {id} references unknown operation {operand}"
                )))
            } else {
                Ok(())
            }
        };
        let check_sym = |symbol: SymbolId| {
            if symbol.index() >= self.symbols.len() {
                Err(Error::InvalidReference(format!(
                    "operation {id} references unknown symbol {symbol}"
                )))
            } else {
                Ok(())
            }
        };

        match operation.kind() {
            OperationKind::Literal(_) | OperationKind::ObjectCreation { .. } => {}
            OperationKind::SymbolRead(symbol) => check_sym(*symbol)?,
            OperationKind::Assignment { target, value } => {
                check_sym(*target)?;
                check_op(*value)?;
            }
            OperationKind::Conversion { operand, .. }
            | OperationKind::LogicalNot { operand }
            | OperationKind::PatternTest { operand, .. } => check_op(*operand)?,
            OperationKind::Increment { target } | OperationKind::Decrement { target } => {
                check_sym(*target)?;
            }
            OperationKind::Binary { left, right, .. }
            | OperationKind::Comparison { left, right, .. } => {
                check_op(*left)?;
                check_op(*right)?;
            }
            OperationKind::PropertyRead { instance, .. } => check_sym(*instance)?,
            OperationKind::Invocation {
                instance,
                arguments,
                ..
            } => {
                if let Some(instance) = instance {
                    check_sym(*instance)?;
                }
                for &argument in arguments {
                    check_op(argument)?;
                }
            }
        }

        if let OperationKind::ObjectCreation { arguments } = operation.kind() {
            for &argument in arguments {
                check_op(argument)?;
            }
        }
        Ok(())
    }
}
