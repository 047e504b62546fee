//! # Determinization
//!
//! Subset construction over integer code sets.
//!
//! Instead of iterating over a finite alphabet, each DFA state asks its NFA
//! member states for their [elementary trigger sets](trigger_sets): the
//! partition of all codes by the combination of target states they reach.
//! Every epsilon-closure combination is mapped to exactly one DFA state
//! through a combination cache, so a combination reached along different
//! routes converges onto the same state.

pub mod trigger_sets;

pub use trigger_sets::{StateCombination, elementary_trigger_sets};

use crate::automaton::{OriginList, State, StateCore, StateId, StateMachine};
use crate::context::CompilationContext;
use crate::minimize::minimize;
use crate::set::NumberSet;
use hashbrown::HashMap;
use std::collections::BTreeMap;

/// DFA for the language of `sm`.
///
/// The result keeps `sm`'s machine id and context data; its states have
/// fresh ids. Each DFA state carries the merged core flags and origins of
/// every NFA state it stands for.
#[must_use]
pub fn determinize(ctx: &mut CompilationContext, sm: &StateMachine) -> StateMachine {
    ctx.metrics_mut().determinizations += 1;

    let mut closures: HashMap<StateId, StateCombination, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    let mut dfa_ids: HashMap<StateCombination, StateId, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());

    let init_combination = sm.epsilon_closure(&[sm.init_state_id()]);
    let init_id = ctx.new_state_id();
    let mut result = StateMachine::with_init_state(sm.id(), merged_state(sm, init_id, &init_combination));
    result.copy_context_from(sm);
    dfa_ids.insert(init_combination.clone(), init_id);

    let mut worklist: Vec<StateCombination> = vec![init_combination];
    while let Some(combination) = worklist.pop() {
        let from = dfa_ids[&combination];

        let mut by_closure: BTreeMap<StateCombination, NumberSet> = BTreeMap::new();
        for (set, targets) in elementary_trigger_sets(sm, &combination) {
            let closure = closure_of_all(sm, &targets, &mut closures);
            by_closure.entry(closure).or_default().unite_with(&set);
        }

        for (target_combination, set) in by_closure {
            let target = match dfa_ids.get(&target_combination) {
                Some(id) => *id,
                None => {
                    let id = ctx.new_state_id();
                    result.insert_state(merged_state(sm, id, &target_combination));
                    dfa_ids.insert(target_combination.clone(), id);
                    worklist.push(target_combination);
                    id
                }
            };
            result.add_transition(from, set, target);
        }
    }

    result
}

/// Determinize, then minimize.
#[must_use]
pub fn beautify(ctx: &mut CompilationContext, sm: &StateMachine) -> StateMachine {
    let dfa = determinize(ctx, sm);
    minimize(ctx, &dfa)
}

fn closure_of_all(
    sm: &StateMachine,
    targets: &[StateId],
    cache: &mut HashMap<StateId, StateCombination, ahash::RandomState>,
) -> StateCombination {
    let mut result = StateCombination::new();
    for &target in targets {
        let closure = cache
            .entry(target)
            .or_insert_with(|| sm.epsilon_closure(&[target]));
        result.extend_from_slice(closure);
    }
    result.sort_unstable();
    result.dedup();
    result
}

fn merged_state(sm: &StateMachine, id: StateId, members: &[StateId]) -> State {
    let mut core = StateCore::default();
    let mut origins = OriginList::new();
    for &member in members {
        let state = sm.state(member);
        core.merge(state.core());
        origins.merge(state.origins());
    }
    State::with_info(id, core, origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::PatternId;
    use crate::ops::{parallelize, parallelize_branches, repeat, sequentialize};
    use crate::testing::{dfa_accepts_str, nfa_accepts_str};

    #[test]
    fn test_determinize_union_with_shared_prefix() {
        let mut ctx = CompilationContext::default();
        let ab = StateMachine::from_str_sequence(&mut ctx, "ab");
        let ac = StateMachine::from_str_sequence(&mut ctx, "ac");
        let nfa = parallelize(&mut ctx, &[&ab, &ac]);
        let dfa = determinize(&mut ctx, &nfa);

        assert!(dfa.is_deterministic());
        dfa.assert_consistency();
        for input in ["ab", "ac", "a", "abc", "b", ""] {
            assert_eq!(dfa_accepts_str(&dfa, input), nfa_accepts_str(&nfa, input), "{input}");
        }
        // init, after 'a', one acceptance state per branch
        assert_eq!(dfa.state_count(), 4);
    }

    #[test]
    fn test_determinize_keeps_machine_id() {
        let mut ctx = CompilationContext::default();
        let x = StateMachine::from_str_sequence(&mut ctx, "x");
        let nfa = repeat(&mut ctx, &x, 1, None);
        let dfa = determinize(&mut ctx, &nfa);
        assert_eq!(dfa.id(), nfa.id());
        assert!(!dfa.accepts_empty());
        assert!(dfa_accepts_str(&dfa, "xxxx"));
        assert_eq!(ctx.metrics().determinizations, 1);
    }

    #[test]
    fn test_determinize_merges_origins() {
        let mut ctx = CompilationContext::default();
        let mut a = StateMachine::from_str_sequence(&mut ctx, "a");
        let mut ab = StateMachine::from_str_sequence(&mut ctx, "ab");
        a.mark_state_origins(PatternId(0));
        ab.mark_state_origins(PatternId(1));
        let nfa = parallelize_branches(&mut ctx, vec![a, ab]);
        let dfa = determinize(&mut ctx, &nfa);

        let init = dfa.init_state();
        let after_a = init.transitions().target_for('a' as i64).unwrap();
        let state = dfa.state(after_a);
        assert!(state.is_acceptance());
        assert_eq!(state.origins().acceptance_pattern_ids().as_slice(), &[PatternId(0)]);
        assert!(state.origins().iter().any(|o| o.pattern_id == PatternId(1)));
    }

    #[test]
    fn test_beautify_minimizes() {
        let mut ctx = CompilationContext::default();
        let a = StateMachine::from_str_sequence(&mut ctx, "xa");
        let b = StateMachine::from_str_sequence(&mut ctx, "ya");
        let union = parallelize(&mut ctx, &[&a, &b]);
        let tail = StateMachine::from_str_sequence(&mut ctx, "z");
        let nfa = sequentialize(&mut ctx, &[&union, &tail], false);
        let dfa = beautify(&mut ctx, &nfa);
        // init -[xy]-> 1 -a-> 2 -z-> 3
        assert_eq!(dfa.state_count(), 4);
        assert!(dfa_accepts_str(&dfa, "xaz"));
        assert!(dfa_accepts_str(&dfa, "yaz"));
    }
}
