use crate::automaton::{State, StateId, StateMachine};
use crate::context::CompilationContext;
use hashbrown::HashMap;

/// Machine for the reversed language of `sm`.
///
/// Every edge is reversed, a fresh initial state epsilon-links to (the copies
/// of) the old acceptance states, and the old initial state becomes the only
/// acceptance state. Origins and context flags are not carried over.
#[must_use]
pub fn invert(ctx: &mut CompilationContext, sm: &StateMachine) -> StateMachine {
    let mut result = StateMachine::new(ctx);
    let init = result.init_state_id();

    let mut map: HashMap<StateId, StateId, ahash::RandomState> =
        HashMap::with_capacity_and_hasher(sm.state_count(), ahash::RandomState::new());
    for id in sm.state_ids() {
        let new_id = ctx.new_state_id();
        result.insert_state(State::new(new_id, false));
        map.insert(id, new_id);
    }

    for state in sm.states() {
        let from = map[&state.id()];
        if state.is_acceptance() {
            result.add_epsilon_transition(init, from);
        }
        for (target, set) in state.transitions().iter() {
            result.add_transition(map[&target], set, from);
        }
        for target in state.transitions().epsilon_targets() {
            result.add_epsilon_transition(map[target], from);
        }
    }

    result.state_mut(map[&sm.init_state_id()]).set_acceptance(true);
    result.delete_orphaned_states();
    result
}
