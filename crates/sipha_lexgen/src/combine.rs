//! # Combined Recognizer
//!
//! Merges the per-pattern machines of one lexical mode into the automata a
//! lexer is generated from:
//!
//! - one forward DFA whose states carry the origins of every pattern that
//!   can be in progress there, reduced to those that can still decide a
//!   match;
//! - one backward DFA checking all pre-contexts at once, with every origin
//!   kept since each pre-context is an independent condition;
//! - the backward detectors of ambiguous post-contexts.

use crate::automaton::{LexingMode, MachineId, PatternId, StateMachine};
use crate::context::CompilationContext;
use crate::determinize::determinize;
use crate::error::{CompileError, Result};
use crate::minimize::minimize;
use crate::ops::parallelize_branches;
use compact_str::CompactString;
use std::collections::BTreeMap;

/// A compiled pattern with its action, as handed over by the mode layer.
#[derive(Debug, Clone)]
pub struct PatternActionInfo<A> {
    pub pattern: CompactString,
    pub machine: StateMachine,
    pub action: A,
    /// `(inheritance_level, pattern_id)`, lower is higher priority
    pub priority: (u32, u32),
}

impl<A> PatternActionInfo<A> {
    #[must_use]
    pub fn new(pattern: &str, machine: StateMachine, action: A, priority: (u32, u32)) -> Self {
        Self {
            pattern: CompactString::new(pattern),
            machine,
            action,
            priority,
        }
    }
}

/// Per-pattern record of a [`Recognizer`], indexed by [`PatternId`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CompiledPattern<A> {
    pub id: PatternId,
    pub pattern: CompactString,
    pub action: A,
    pub priority: (u32, u32),
    pub pre_context_id: Option<MachineId>,
    pub begin_of_line: bool,
    /// Set when the match end is restored from a stored position
    pub post_context_id: Option<MachineId>,
    /// Dense index among the patterns with a `post_context_id`, i.e. the
    /// slot of the stored position in the generated lexer
    pub post_context_index: Option<usize>,
    /// Set when the match end is found by a backward detector
    pub backward_detector_id: Option<MachineId>,
}

/// The automata of one lexical mode and their pattern table.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Recognizer<A> {
    forward: StateMachine,
    pre_contexts: Option<StateMachine>,
    backward_detectors: BTreeMap<MachineId, StateMachine>,
    patterns: Vec<CompiledPattern<A>>,
}

impl<A> Recognizer<A> {
    #[must_use]
    pub const fn forward(&self) -> &StateMachine {
        &self.forward
    }

    #[must_use]
    pub const fn pre_contexts(&self) -> Option<&StateMachine> {
        self.pre_contexts.as_ref()
    }

    #[must_use]
    pub const fn backward_detectors(&self) -> &BTreeMap<MachineId, StateMachine> {
        &self.backward_detectors
    }

    #[must_use]
    pub fn backward_detector(&self, id: MachineId) -> Option<&StateMachine> {
        self.backward_detectors.get(&id)
    }

    #[must_use]
    pub fn patterns(&self) -> &[CompiledPattern<A>] {
        &self.patterns
    }

    #[must_use]
    pub fn pattern(&self, id: PatternId) -> Option<&CompiledPattern<A>> {
        self.patterns.get(id.index())
    }

    /// Number of stored input positions the generated lexer needs.
    #[must_use]
    pub fn post_context_count(&self) -> usize {
        self.patterns.iter().filter(|p| p.post_context_index.is_some()).count()
    }

    /// Every automaton with the mode it runs in.
    pub fn automata(&self) -> impl Iterator<Item = (LexingMode, &StateMachine)> + '_ {
        std::iter::once((LexingMode::Forward, &self.forward))
            .chain(self.pre_contexts.iter().map(|sm| (LexingMode::Backward, sm)))
            .chain(
                self.backward_detectors
                    .values()
                    .map(|sm| (LexingMode::BackwardPositionDetect, sm)),
            )
    }
}

/// Combine the patterns of one mode.
///
/// Patterns are ranked by `priority`; the rank becomes the [`PatternId`]
/// carried by the origins. The input machines are consumed; the combined
/// automata work on copies with fresh state ids, so the same machine may
/// appear more than once.
///
/// # Errors
///
/// [`CompileError::NoPatterns`] for an empty list.
pub fn combine<A>(ctx: &mut CompilationContext, mut patterns: Vec<PatternActionInfo<A>>) -> Result<Recognizer<A>> {
    if patterns.is_empty() {
        return Err(CompileError::NoPatterns);
    }
    patterns.sort_by_key(|p| p.priority);

    let mut branches = Vec::with_capacity(patterns.len());
    let mut pre_branches = Vec::new();
    let mut backward_detectors = BTreeMap::new();
    let mut table = Vec::with_capacity(patterns.len());
    let mut post_context_count = 0;

    for (rank, info) in patterns.into_iter().enumerate() {
        let id = PatternId(u32::try_from(rank).unwrap_or(u32::MAX));
        let PatternActionInfo {
            pattern,
            machine,
            action,
            priority,
        } = info;

        let mut forward = machine.clone_with_new_state_ids(ctx);
        forward.mark_state_origins(id);

        if let Some(pre) = machine.pre_context() {
            let mut pre = pre.clone_with_new_state_ids(ctx);
            pre.mark_state_origins(id);
            pre_branches.push(pre);
        }
        if let Some(detector) = machine.backward_detector() {
            backward_detectors
                .entry(detector.id())
                .or_insert_with(|| detector.clone());
        }

        let post_context_index = machine.post_context_id().map(|_| {
            post_context_count += 1;
            post_context_count - 1
        });
        table.push(CompiledPattern {
            id,
            pattern,
            action,
            priority,
            pre_context_id: machine.pre_context().map(StateMachine::id),
            begin_of_line: machine
                .states()
                .any(|s| s.is_acceptance() && s.core().begin_of_line),
            post_context_id: machine.post_context_id(),
            post_context_index,
            backward_detector_id: machine.backward_detector().map(StateMachine::id),
        });

        forward.set_pre_context(None);
        forward.set_backward_detector(None);
        forward.set_post_context_id(None);
        branches.push(forward);
    }

    let union = parallelize_branches(ctx, branches);
    let mut dfa = determinize(ctx, &union);
    for state in dfa.states_mut() {
        state.origins_mut().filter_dominated();
    }
    let forward = minimize(ctx, &dfa);

    let pre_contexts = if pre_branches.is_empty() {
        None
    } else {
        let union = parallelize_branches(ctx, pre_branches);
        let dfa = determinize(ctx, &union);
        Some(minimize(ctx, &dfa))
    };

    Ok(Recognizer {
        forward,
        pre_contexts,
        backward_detectors,
        patterns: table,
    })
}
