//! Ambiguity tests for post-contexts and the philosophical cut.
//!
//! All dives walk two DFAs in lock step over the pairs of transitions whose
//! triggers intersect. They use explicit work stacks; the forward and
//! backward tests also keep a visited set of state pairs, so cycles in both
//! machines terminate.

use crate::automaton::{StateId, StateMachine};
use crate::context::CompilationContext;
use crate::determinize::beautify;
use crate::ops::invert;
use crate::set::NumberSet;
use hashbrown::HashSet;
use smallvec::SmallVec;

/// True if, starting from an acceptance state of `core`, some path through
/// `core` that ends in acceptance again is also a valid path of `post` from
/// its initial state.
///
/// In that case characters of the post-context may as well continue the
/// core, and the position stored at the end of the core is unreliable.
/// Both machines must be deterministic.
#[must_use]
pub fn detect_forward(core: &StateMachine, post: &StateMachine) -> bool {
    let mut visited: HashSet<(StateId, StateId), ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    let mut stack: Vec<(StateId, StateId)> = core
        .acceptance_state_ids()
        .into_iter()
        .map(|id| (id, post.init_state_id()))
        .collect();

    while let Some(pair) = stack.pop() {
        if !visited.insert(pair) {
            continue;
        }
        let (core_id, post_id) = pair;
        let post_transitions = post.state(post_id).transitions();
        for (core_target, core_set) in core.state(core_id).transitions().iter() {
            for (post_target, post_set) in post_transitions.iter() {
                if !core_set.has_intersection(post_set) {
                    continue;
                }
                if core.state(core_target).is_acceptance() {
                    return true;
                }
                stack.push((core_target, post_target));
            }
        }
    }
    false
}

/// True if, walking backwards from the end of the post-context, it cannot
/// be decided where the core ended: the forward test applied to the
/// inverted machines.
#[must_use]
pub fn detect_backward(ctx: &mut CompilationContext, core: &StateMachine, post: &StateMachine) -> bool {
    let inverted_core = invert(ctx, core);
    let inverted_core = beautify(ctx, &inverted_core);
    let inverted_post = invert(ctx, post);
    let inverted_post = beautify(ctx, &inverted_post);
    detect_forward(&inverted_post, &inverted_core)
}

/// Trim `post` so that the core is matched greedily.
///
/// Walks `core` from its acceptance states together with `post` from its
/// initial state. Any `post` transition that intersects a parallel `core`
/// transition and leads back to a `post` state already on the current path
/// loses the intersecting codes. This turns `x+/x+` into `x+/x`.
///
/// The result is a heuristic, not a proof of the intended semantics;
/// callers report a warning whenever it is applied. `core` must be
/// deterministic.
#[must_use]
pub fn philosophical_cut(ctx: &mut CompilationContext, core: &StateMachine, post: &StateMachine) -> StateMachine {
    ctx.metrics_mut().philosophical_cuts += 1;
    let mut post = post.clone();
    let post_init = post.init_state_id();

    let mut stack: Vec<(StateId, StateId, SmallVec<[StateId; 8]>)> = core
        .acceptance_state_ids()
        .into_iter()
        .map(|id| (id, post_init, SmallVec::from_slice(&[post_init])))
        .collect();

    while let Some((core_id, post_id, path)) = stack.pop() {
        let post_edges: SmallVec<[(StateId, NumberSet); 4]> = post
            .state(post_id)
            .transitions()
            .iter()
            .map(|(target, set)| (target, set.clone()))
            .collect();
        for (core_target, core_set) in core.state(core_id).transitions().iter() {
            for (post_target, post_set) in &post_edges {
                if !core_set.has_intersection(post_set) {
                    continue;
                }
                if path.contains(post_target) {
                    post.state_mut(post_id)
                        .transitions_mut()
                        .subtract(*post_target, core_set);
                    continue;
                }
                let mut next_path = path.clone();
                next_path.push(*post_target);
                stack.push((core_target, *post_target, next_path));
            }
        }
    }

    post.delete_orphaned_states();
    beautify(ctx, &post)
}
