//! The CFG driver: worklist-based state-space exploration.
//!
//! The explorer visits every reachable operation, keeping per-block input
//! state sets. Blocks are seeded in reverse postorder and re-enqueued when
//! new states reach them. At a branch terminator the condition operation's
//! boolean constraint splits and filters the state set per outgoing edge;
//! an edge whose filtered set is empty is pruned as unreachable.
//!
//! # Termination and budgets
//!
//! States are deduplicated per block by structural equality, so loops whose
//! state set stabilizes stop on their own. Three soft budgets bound the
//! rest: a per-path block revisit count (carried in the state's loop
//! metadata), a per-block cap on distinct states, and a global step budget.
//! Exceeding any of them truncates further exploration and flags the
//! results as truncated - a soundness/termination trade-off, not an error.

use std::collections::{HashSet, VecDeque};

use bitflags::bitflags;
use log::{debug, trace};

use crate::{
    cfg::{BlockId, ControlFlowGraph, Terminator},
    constraint::BoolConstraint,
    engine::{
        dispatch::{self, OpContext},
        learn, AnalysisResults, EngineConfig,
    },
    state::ProgramState,
};

bitflags! {
    /// Precomputed per-block properties consulted on every visit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct BlockFlags: u8 {
        /// Reachable from the entry block.
        const REACHABLE = 1;
        /// Inside some natural loop body.
        const IN_LOOP = 1 << 1;
        /// Header of a natural loop.
        const LOOP_HEADER = 1 << 2;
    }
}

/// Worklist-driven walker over one control flow graph.
pub(crate) struct Explorer<'a> {
    cfg: &'a ControlFlowGraph,
    config: &'a EngineConfig,
    flags: Vec<BlockFlags>,
    /// States queued per block, not yet processed.
    pending: Vec<Vec<ProgramState>>,
    /// States already processed per block, for deduplication.
    seen: Vec<HashSet<ProgramState>>,
    worklist: VecDeque<usize>,
    in_worklist: Vec<bool>,
    steps: usize,
    stopped: bool,
    results: AnalysisResults,
}

impl<'a> Explorer<'a> {
    pub(crate) fn new(cfg: &'a ControlFlowGraph, config: &'a EngineConfig) -> Self {
        let block_count = cfg.block_count();
        let mut flags = vec![BlockFlags::empty(); block_count];
        for &block in cfg.reverse_postorder() {
            flags[block.index()] |= BlockFlags::REACHABLE;
        }
        for index in 0..block_count {
            let block = BlockId::new(index);
            if cfg.is_in_loop(block) {
                flags[index] |= BlockFlags::IN_LOOP;
            }
            if cfg.is_loop_header(block) {
                flags[index] |= BlockFlags::LOOP_HEADER;
            }
        }

        Self {
            cfg,
            config,
            flags,
            pending: vec![Vec::new(); block_count],
            seen: vec![HashSet::new(); block_count],
            worklist: VecDeque::new(),
            in_worklist: vec![false; block_count],
            steps: 0,
            stopped: false,
            results: AnalysisResults::new(cfg.operation_count()),
        }
    }

    /// Runs the walk to completion (or budget exhaustion).
    pub(crate) fn run(mut self) -> AnalysisResults {
        // A fresh empty state seeds the entry block.
        self.enqueue(self.cfg.entry(), vec![ProgramState::empty()]);

        while let Some(block_index) = self.worklist.pop_front() {
            if self.stopped {
                break;
            }
            self.in_worklist[block_index] = false;
            let states = std::mem::take(&mut self.pending[block_index]);
            for state in states {
                if self.stopped {
                    break;
                }
                self.visit_block(block_index, state);
            }
        }
        self.results
    }

    /// Processes one input state through one block.
    fn visit_block(&mut self, block_index: usize, state: ProgramState) {
        let block_id = BlockId::new(block_index);

        // Deduplicate against every state this block has already processed;
        // this is what makes loops with a stable fixpoint terminate.
        if !self.seen[block_index].insert(state.clone()) {
            trace!("{block_id}: state coalesced");
            return;
        }
        if self.seen[block_index].len() > self.config.max_states_per_block() {
            debug!("{block_id}: state cap exceeded, truncating");
            self.results.mark_truncated();
            return;
        }

        let state = state.with_visit(block_id);
        if state.visit_count(block_id) > self.config.max_block_visits() {
            debug!("{block_id}: revisit budget exhausted, truncating");
            self.results.mark_truncated();
            return;
        }

        let Some(block) = self.cfg.block(block_id) else {
            return;
        };
        let ctx = OpContext {
            cfg: self.cfg,
            config: self.config,
            in_loop: self.flags[block_index].contains(BlockFlags::IN_LOOP),
        };

        let mut current = vec![state];
        for &op_id in block.operations() {
            let Some(operation) = self.cfg.operation(op_id) else {
                continue;
            };
            let mut next = Vec::new();
            for state in current {
                if self.steps >= self.config.max_steps() {
                    debug!("step budget exhausted, stopping exploration");
                    self.results.mark_truncated();
                    self.stopped = true;
                    return;
                }
                self.steps += 1;
                next.extend(dispatch::process(&ctx, operation, state));
            }
            if next.len() > self.config.max_states_per_block() {
                debug!("{block_id}: hypothesis explosion at {op_id}, truncating");
                next.truncate(self.config.max_states_per_block());
                self.results.mark_truncated();
            }
            for state in &next {
                self.results.record(op_id, state);
            }
            if next.is_empty() {
                trace!("{block_id}: every hypothesis infeasible at {op_id}");
                return;
            }
            current = next;
        }

        self.apply_terminator(block_id, block.terminator().clone(), current);
    }

    /// Propagates the block's final states across its outgoing edges.
    fn apply_terminator(
        &mut self,
        block_id: BlockId,
        terminator: Terminator,
        states: Vec<ProgramState>,
    ) {
        match terminator {
            Terminator::Jump(target) => self.enqueue(target, states),
            Terminator::Branch {
                condition,
                true_target,
                false_target,
            } => {
                let mut true_states = Vec::new();
                let mut false_states = Vec::new();
                let symbol = learn::resolve_symbol(self.cfg, condition);

                for state in states {
                    match state.bool_constraint(condition) {
                        Some(BoolConstraint::True) => true_states.push(state),
                        Some(BoolConstraint::False) => false_states.push(state),
                        None => {
                            // Undecided condition: fork, attaching the edge's
                            // truth value to the condition (and its symbol).
                            for (truth, side) in [
                                (BoolConstraint::True, &mut true_states),
                                (BoolConstraint::False, &mut false_states),
                            ] {
                                let mut forked = state.with_operation_constraint(condition, truth);
                                if let Some(symbol) = symbol {
                                    forked = forked.with_symbol_constraint(symbol, truth);
                                }
                                side.push(forked);
                            }
                        }
                    }
                }

                if true_states.is_empty() {
                    debug!("pruned unreachable edge {block_id} -> {true_target}");
                }
                if false_states.is_empty() {
                    debug!("pruned unreachable edge {block_id} -> {false_target}");
                }
                self.enqueue(true_target, true_states);
                self.enqueue(false_target, false_states);
            }
            Terminator::Return { .. } => {}
        }
    }

    /// Queues states at a block and schedules it for processing.
    ///
    /// Operation bindings are block-local and dropped at the edge, so that
    /// states differing only in spent intermediate results coalesce.
    fn enqueue(&mut self, target: BlockId, states: Vec<ProgramState>) {
        if states.is_empty() {
            return;
        }
        let index = target.index();
        self.pending[index]
            .extend(states.into_iter().map(|state| state.without_operations()));
        if !self.in_worklist[index] {
            self.in_worklist[index] = true;
            self.worklist.push_back(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::{CfgBuilder, Literal, OperationKind};

    #[test]
    fn test_block_flags_precomputation() {
        // entry -> header <-> body, header -> exit
        let mut builder = CfgBuilder::new();
        let entry = builder.block();
        let header = builder.block();
        let body = builder.block();
        let exit = builder.block();
        let condition = builder.operation(OperationKind::Literal(Literal::Bool(true)));
        builder.append(header, condition).unwrap();
        builder.terminate(entry, Terminator::Jump(header)).unwrap();
        builder
            .terminate(
                header,
                Terminator::Branch {
                    condition,
                    true_target: body,
                    false_target: exit,
                },
            )
            .unwrap();
        builder.terminate(body, Terminator::Jump(header)).unwrap();
        builder
            .terminate(exit, Terminator::Return { value: None })
            .unwrap();
        let cfg = builder.finish(entry).unwrap();
        let config = EngineConfig::default();

        let explorer = Explorer::new(&cfg, &config);
        assert!(explorer.flags[entry.index()].contains(BlockFlags::REACHABLE));
        assert!(!explorer.flags[entry.index()].contains(BlockFlags::IN_LOOP));
        assert!(explorer.flags[header.index()]
            .contains(BlockFlags::IN_LOOP | BlockFlags::LOOP_HEADER));
        assert!(explorer.flags[body.index()].contains(BlockFlags::IN_LOOP));
        assert!(!explorer.flags[exit.index()].contains(BlockFlags::IN_LOOP));
    }
}
