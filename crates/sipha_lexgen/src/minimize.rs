//! # Minimization
//!
//! Partition refinement that never merges states with different acceptance
//! semantics.
//!
//! The initial partition separates states by acceptance and by the patterns
//! (and context roles) of their significant origins: acceptance of pattern A
//! is never equivalent to acceptance of pattern B. Blocks are then split until
//! every member of a block reaches the same blocks on the same codes as the
//! block's first member. Singleton blocks are never examined again.

use crate::automaton::{MachineId, Origin, OriginList, PatternId, State, StateCore, StateId, StateMachine};
use crate::context::CompilationContext;
use crate::set::NumberSet;
use hashbrown::HashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// What an origin contributes to a state's behavior, without the source state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct OriginRole {
    pattern_id: PatternId,
    is_acceptance: bool,
    store_input_position: bool,
    pre_context_id: Option<MachineId>,
    post_context_id: Option<MachineId>,
    begin_of_line: bool,
    backward_detector_id: Option<MachineId>,
}

impl From<&Origin> for OriginRole {
    fn from(origin: &Origin) -> Self {
        Self {
            pattern_id: origin.pattern_id,
            is_acceptance: origin.is_acceptance,
            store_input_position: origin.store_input_position,
            pre_context_id: origin.pre_context_id,
            post_context_id: origin.post_context_id,
            begin_of_line: origin.begin_of_line,
            backward_detector_id: origin.backward_detector_id,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum InitialKey {
    /// Machines with origins: acceptance plus the sorted roles of all
    /// accepting or position-storing origins
    Origins(bool, SmallVec<[OriginRole; 4]>),
    /// Single-pattern machines without origins: the core flags
    Core(StateCore),
}

fn initial_key(state: &State) -> InitialKey {
    if state.origins().is_empty() {
        return InitialKey::Core(state.core().clone());
    }
    let mut roles: SmallVec<[OriginRole; 4]> = state
        .origins()
        .iter()
        .filter(|o| o.is_acceptance || o.store_input_position)
        .map(OriginRole::from)
        .collect();
    roles.sort_unstable();
    roles.dedup();
    InitialKey::Origins(state.is_acceptance(), roles)
}

/// Minimal DFA equivalent to `sm`, preserving per-pattern acceptance.
///
/// Each block keeps the id of its first member (the initial state for the
/// initial block) and carries the merged core flags and origins of all
/// members. The result keeps `sm`'s machine id and context data.
///
/// # Panics
///
/// Panics if `sm` is not deterministic.
#[must_use]
pub fn minimize(ctx: &mut CompilationContext, sm: &StateMachine) -> StateMachine {
    assert!(sm.is_deterministic(), "{}: minimize requires a DFA", sm.id());
    ctx.metrics_mut().minimizations += 1;

    let ids: Vec<StateId> = sm.state_ids().collect();
    let index_of: HashMap<StateId, usize, ahash::RandomState> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();

    let mut block_of: Vec<usize> = vec![0; ids.len()];
    let mut blocks: Vec<Vec<usize>> = Vec::new();
    let mut block_by_key: HashMap<InitialKey, usize, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    for (i, id) in ids.iter().enumerate() {
        let key = initial_key(sm.state(*id));
        let block = *block_by_key.entry(key).or_insert_with(|| {
            blocks.push(Vec::new());
            blocks.len() - 1
        });
        blocks[block].push(i);
        block_of[i] = block;
    }

    loop {
        let mut split = false;
        let mut b = 0;
        while b < blocks.len() {
            if blocks[b].len() > 1 {
                let mut groups: Vec<Vec<usize>> = Vec::new();
                let mut group_by_signature: HashMap<Vec<(usize, NumberSet)>, usize, ahash::RandomState> =
                    HashMap::with_hasher(ahash::RandomState::new());
                for &member in &blocks[b] {
                    let signature = transition_signature(sm.state(ids[member]), &index_of, &block_of);
                    let group = *group_by_signature.entry(signature).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[group].push(member);
                }
                if groups.len() > 1 {
                    split = true;
                    let mut groups = groups.into_iter();
                    if let Some(first) = groups.next() {
                        blocks[b] = first;
                    }
                    for group in groups {
                        let new_block = blocks.len();
                        for &member in &group {
                            block_of[member] = new_block;
                        }
                        blocks.push(group);
                    }
                }
            }
            b += 1;
        }
        if !split {
            break;
        }
    }

    rebuild(ctx, sm, &ids, &index_of, &block_of, &blocks)
}

/// Target blocks of a state with the codes leading to each, block-ordered.
fn transition_signature(
    state: &State,
    index_of: &HashMap<StateId, usize, ahash::RandomState>,
    block_of: &[usize],
) -> Vec<(usize, NumberSet)> {
    let mut by_block: BTreeMap<usize, NumberSet> = BTreeMap::new();
    for (target, set) in state.transitions().iter() {
        let block = block_of[index_of[&target]];
        by_block.entry(block).or_default().unite_with(set);
    }
    by_block.into_iter().collect()
}

/// One state per block, each under a fresh id; the machine id and context
/// data carry over.
fn rebuild(
    ctx: &mut CompilationContext,
    sm: &StateMachine,
    ids: &[StateId],
    index_of: &HashMap<StateId, usize, ahash::RandomState>,
    block_of: &[usize],
    blocks: &[Vec<usize>],
) -> StateMachine {
    let init_block = block_of[index_of[&sm.init_state_id()]];
    let new_ids: Vec<StateId> = blocks.iter().map(|_| ctx.new_state_id()).collect();

    let build = |b: usize| -> State {
        let mut core = StateCore::default();
        let mut origins = OriginList::new();
        for &member in &blocks[b] {
            let state = sm.state(ids[member]);
            core.merge(state.core());
            origins.merge(state.origins());
        }
        let mut state = State::with_info(new_ids[b], core, origins);
        let source = sm.state(ids[blocks[b][0]]);
        for (target, set) in source.transitions().iter() {
            let target_block = block_of[index_of[&target]];
            state.transitions_mut().add(set, new_ids[target_block]);
        }
        state
    };

    let mut result = StateMachine::with_init_state(sm.id(), build(init_block));
    result.copy_context_from(sm);
    for b in (0..blocks.len()).filter(|b| *b != init_block) {
        result.insert_state(build(b));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::PatternId;
    use crate::determinize::determinize;
    use crate::ops::{parallelize, parallelize_branches};
    use crate::testing::dfa_accepts_str;

    #[test]
    fn test_merges_equivalent_tails() {
        let mut ctx = CompilationContext::default();
        let xa = StateMachine::from_str_sequence(&mut ctx, "xa");
        let ya = StateMachine::from_str_sequence(&mut ctx, "ya");
        let nfa = parallelize(&mut ctx, &[&xa, &ya]);
        let dfa = determinize(&mut ctx, &nfa);
        let min = minimize(&mut ctx, &dfa);

        assert!(min.state_count() < dfa.state_count());
        assert_eq!(min.state_count(), 3);
        assert_eq!(min.id(), dfa.id());
        let dfa_ids: Vec<StateId> = dfa.state_ids().collect();
        assert!(min.state_ids().all(|id| !dfa_ids.contains(&id)));
        assert!(min.is_deterministic());
        min.assert_consistency();
        for input in ["xa", "ya", "x", "a", "xay"] {
            assert_eq!(dfa_accepts_str(&min, input), dfa_accepts_str(&dfa, input));
        }
    }

    #[test]
    fn test_never_merges_different_patterns() {
        let mut ctx = CompilationContext::default();
        let mut xa = StateMachine::from_str_sequence(&mut ctx, "xa");
        let mut ya = StateMachine::from_str_sequence(&mut ctx, "ya");
        xa.mark_state_origins(PatternId(0));
        ya.mark_state_origins(PatternId(1));
        let nfa = parallelize_branches(&mut ctx, vec![xa, ya]);
        let dfa = determinize(&mut ctx, &nfa);
        let min = minimize(&mut ctx, &dfa);

        let accepting: Vec<_> = min
            .states()
            .filter(|s| s.is_acceptance())
            .map(|s| s.origins().acceptance_pattern_ids())
            .collect();
        assert_eq!(accepting.len(), 2);
        assert!(accepting.iter().all(|ids| ids.len() == 1));
    }

    #[test]
    fn test_minimal_machine_is_stable() {
        let mut ctx = CompilationContext::default();
        let sm = StateMachine::from_str_sequence(&mut ctx, "abc");
        let once = minimize(&mut ctx, &sm);
        let twice = minimize(&mut ctx, &once);
        assert_eq!(once.state_count(), 4);
        assert_eq!(once, twice);
    }

    #[test]
    #[should_panic(expected = "requires a DFA")]
    fn test_rejects_nfa() {
        let mut ctx = CompilationContext::default();
        let a = StateMachine::from_str_sequence(&mut ctx, "a");
        let nfa = parallelize(&mut ctx, &[&a]);
        let _ = minimize(&mut ctx, &nfa);
    }
}
