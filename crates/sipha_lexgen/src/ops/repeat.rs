use super::sequence::sequentialize_owned;
use crate::automaton::StateMachine;
use crate::context::CompilationContext;

/// `sm{min,max}`; `max == None` means unbounded.
///
/// Built from clones of `sm`: `min` forced copies, then either `max - min`
/// optional copies that keep their acceptance, or a Kleene closure.
///
/// # Panics
///
/// Panics if `max < min`. The parser rejects such ranges before they get here.
#[must_use]
pub fn repeat(ctx: &mut CompilationContext, sm: &StateMachine, min: u32, max: Option<u32>) -> StateMachine {
    if let Some(max) = max {
        assert!(max >= min, "repetition range {{{min},{max}}} is inverted");
        if max == 0 {
            return StateMachine::empty_match(ctx);
        }
    }

    match max {
        Some(max) => {
            let forced = if min == 0 {
                StateMachine::empty_match(ctx)
            } else {
                let copies = (0..min).map(|_| sm.clone_with_new_ids(ctx)).collect();
                sequentialize_owned(ctx, copies, false)
            };
            let mut parts = Vec::with_capacity((max - min) as usize + 1);
            parts.push(forced);
            parts.extend((min..max).map(|_| sm.clone_with_new_ids(ctx)));
            sequentialize_owned(ctx, parts, true)
        }
        None if min == 0 => {
            let loop_part = sm.clone_with_new_ids(ctx);
            kleene_closure(ctx, loop_part, true)
        }
        None => {
            let mut parts: Vec<StateMachine> = (1..min).map(|_| sm.clone_with_new_ids(ctx)).collect();
            let loop_part = sm.clone_with_new_ids(ctx);
            parts.push(kleene_closure(ctx, loop_part, false));
            sequentialize_owned(ctx, parts, false)
        }
    }
}

/// Wrap `sm` into a loop.
///
/// A fresh initial state leads to the loop head (`sm`'s initial state), every
/// acceptance state links back to the loop head and forward to a fresh
/// terminal state. With `bypass` the initial state also links directly to the
/// terminal, so zero iterations are accepted.
#[must_use]
pub fn kleene_closure(ctx: &mut CompilationContext, sm: StateMachine, bypass: bool) -> StateMachine {
    let mut result = StateMachine::new(ctx);
    let init = result.init_state_id();
    let terminal = result.create_state(ctx, true);
    let head = sm.init_state_id();
    let ends = sm.acceptance_state_ids();

    result.absorb(sm);
    result.add_epsilon_transition(init, head);
    for end in ends {
        let state = result.state_mut(end);
        state.set_acceptance(false);
        state.transitions_mut().add_epsilon(head);
        state.transitions_mut().add_epsilon(terminal);
    }
    if bypass {
        result.add_epsilon_transition(init, terminal);
    }
    result
}
