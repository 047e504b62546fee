use crate::automaton::{StateId, StateMachine};
use crate::set::{Interval, NumberSet};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Sorted, duplicate-free set of state ids; the identity of a DFA state
/// during subset construction.
pub type StateCombination = SmallVec<[StateId; 8]>;

/// Partition the triggers of all `members` so that every part leads to one
/// unique combination of target states.
///
/// Sweeps over all interval boundaries of all outgoing trigger sets, keeping
/// a count of how many open intervals lead to each target. Between two
/// consecutive boundaries the set of targets is constant; segments with equal
/// target sets are united. Codes without any transition are left out.
#[must_use]
pub fn elementary_trigger_sets(
    sm: &StateMachine,
    members: &[StateId],
) -> Vec<(NumberSet, StateCombination)> {
    let mut events: Vec<(i64, bool, StateId)> = Vec::new();
    for &id in members {
        for (target, set) in sm.state(id).transitions().iter() {
            for interval in set.intervals() {
                events.push((interval.begin, true, target));
                events.push((interval.end, false, target));
            }
        }
    }
    events.sort_unstable_by_key(|(position, _, _)| *position);

    let mut open: BTreeMap<StateId, u32> = BTreeMap::new();
    let mut groups: BTreeMap<StateCombination, NumberSet> = BTreeMap::new();
    let mut i = 0;
    while i < events.len() {
        let position = events[i].0;
        while i < events.len() && events[i].0 == position {
            let (_, opens, target) = events[i];
            if opens {
                *open.entry(target).or_insert(0) += 1;
            } else if let Some(count) = open.get_mut(&target) {
                *count -= 1;
                if *count == 0 {
                    open.remove(&target);
                }
            }
            i += 1;
        }
        if let Some(&(next, _, _)) = events.get(i)
            && !open.is_empty()
        {
            let targets: StateCombination = open.keys().copied().collect();
            groups
                .entry(targets)
                .or_default()
                .add_interval(Interval::new(position, next));
        }
    }

    groups.into_iter().map(|(targets, set)| (set, targets)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;

    #[test]
    fn test_overlapping_triggers_are_split() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::new(&mut ctx);
        let init = sm.init_state_id();
        let a = sm.create_state(&mut ctx, true);
        let b = sm.create_state(&mut ctx, true);
        sm.add_transition(init, Interval::new(0, 10), a);
        sm.add_transition(init, Interval::new(5, 15), b);

        let sets = elementary_trigger_sets(&sm, &[init]);
        assert_eq!(sets.len(), 3);
        let lookup = |targets: &[StateId]| {
            sets.iter()
                .find(|(_, t)| t.as_slice() == targets)
                .map(|(set, _)| set.clone())
                .unwrap()
        };
        assert_eq!(lookup(&[a]), NumberSet::from_interval(Interval::new(0, 5)));
        assert_eq!(lookup(&[a, b]), NumberSet::from_interval(Interval::new(5, 10)));
        assert_eq!(lookup(&[b]), NumberSet::from_interval(Interval::new(10, 15)));
    }

    #[test]
    fn test_equal_target_sets_are_united() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::new(&mut ctx);
        let init = sm.init_state_id();
        let other = sm.create_state(&mut ctx, false);
        let a = sm.create_state(&mut ctx, true);
        sm.add_transition(init, 'a', a);
        sm.add_transition(init, 'c', a);
        sm.add_transition(other, 'a', a);

        let sets = elementary_trigger_sets(&sm, &[init, other]);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].0, NumberSet::from_codes(['a' as i64, 'c' as i64]));
        assert_eq!(sets[0].1.as_slice(), &[a]);
    }

    #[test]
    fn test_no_transitions() {
        let mut ctx = CompilationContext::default();
        let sm = StateMachine::new(&mut ctx);
        assert!(elementary_trigger_sets(&sm, &[sm.init_state_id()]).is_empty());
    }
}
