use crate::automaton::StateMachine;
use crate::context::CompilationContext;

/// Union of `machines`.
///
/// The inputs are cloned. A fresh initial state epsilon-links to every
/// clone's initial state; every clone's acceptance states lose their
/// acceptance and epsilon-link to one fresh terminal state, which is the only
/// acceptance state of the result.
///
/// An empty list yields a machine that matches nothing.
#[must_use]
pub fn parallelize(ctx: &mut CompilationContext, machines: &[&StateMachine]) -> StateMachine {
    let clones = machines.iter().map(|sm| sm.clone_with_new_ids(ctx)).collect();
    parallelize_owned(ctx, clones)
}

/// [`parallelize`] for machines the caller gives up.
#[must_use]
pub fn parallelize_owned(ctx: &mut CompilationContext, machines: Vec<StateMachine>) -> StateMachine {
    let mut result = StateMachine::new(ctx);
    if machines.is_empty() {
        return result;
    }
    let init = result.init_state_id();
    let terminal = result.create_state(ctx, true);
    for mut sm in machines {
        sm.mount_to_acceptance_states(terminal, true);
        let branch = result.absorb(sm);
        result.add_epsilon_transition(init, branch);
    }
    result
}

/// Union that keeps every branch's own acceptance states.
///
/// Only a fresh initial state is added. Used wherever the acceptance states
/// carry per-pattern information that a common terminal would blur: the
/// combination of patterns and of pre-contexts.
#[must_use]
pub fn parallelize_branches(ctx: &mut CompilationContext, machines: Vec<StateMachine>) -> StateMachine {
    let mut result = StateMachine::new(ctx);
    let init = result.init_state_id();
    for sm in machines {
        let branch = result.absorb(sm);
        result.add_epsilon_transition(init, branch);
    }
    result
}
