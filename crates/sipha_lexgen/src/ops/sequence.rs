use crate::automaton::StateMachine;
use crate::context::CompilationContext;

/// Concatenation of `machines`, in order.
///
/// Every input is cloned, so the result shares no state ids with them. The
/// acceptance states of machine *i* get an epsilon transition to the initial
/// state of machine *i+1*. Unless `leave_intermediate_acceptance` is set,
/// only the acceptance states of the last machine remain accepting.
///
/// An empty list yields the machine that matches only the empty string.
#[must_use]
pub fn sequentialize(
    ctx: &mut CompilationContext,
    machines: &[&StateMachine],
    leave_intermediate_acceptance: bool,
) -> StateMachine {
    let clones = machines.iter().map(|sm| sm.clone_with_new_ids(ctx)).collect();
    sequentialize_owned(ctx, clones, leave_intermediate_acceptance)
}

/// [`sequentialize`] for machines the caller gives up; their states are
/// moved instead of cloned. The result keeps the first machine's id.
#[must_use]
pub fn sequentialize_owned(
    ctx: &mut CompilationContext,
    machines: Vec<StateMachine>,
    leave_intermediate_acceptance: bool,
) -> StateMachine {
    let mut iter = machines.into_iter();
    let Some(mut result) = iter.next() else {
        return StateMachine::empty_match(ctx);
    };
    for next in iter {
        result.mount_to_acceptance_states(next.init_state_id(), !leave_intermediate_acceptance);
        result.absorb(next);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::nfa_accepts_str;

    #[test]
    fn test_sequentialize_concatenates() {
        let mut ctx = CompilationContext::default();
        let a = StateMachine::from_str_sequence(&mut ctx, "ab");
        let b = StateMachine::from_str_sequence(&mut ctx, "c");
        let sm = sequentialize(&mut ctx, &[&a, &b], false);
        assert!(nfa_accepts_str(&sm, "abc"));
        assert!(!nfa_accepts_str(&sm, "ab"));
        assert!(!nfa_accepts_str(&sm, "c"));
        for id in sm.state_ids() {
            assert!(!a.contains_state(id) && !b.contains_state(id));
        }
        sm.assert_consistency();
    }

    #[test]
    fn test_sequentialize_leaves_intermediate_acceptance() {
        let mut ctx = CompilationContext::default();
        let a = StateMachine::from_str_sequence(&mut ctx, "a");
        let b = StateMachine::from_str_sequence(&mut ctx, "b");
        let sm = sequentialize(&mut ctx, &[&a, &b], true);
        assert!(nfa_accepts_str(&sm, "a"));
        assert!(nfa_accepts_str(&sm, "ab"));
        assert!(!nfa_accepts_str(&sm, "b"));
    }

    #[test]
    fn test_sequentialize_empty_list_matches_empty() {
        let mut ctx = CompilationContext::default();
        let sm = sequentialize(&mut ctx, &[], false);
        assert!(sm.accepts_empty());
        assert_eq!(sm.state_count(), 1);
    }
}
