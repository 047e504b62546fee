use super::ambiguity::{detect_backward, detect_forward, philosophical_cut};
use crate::automaton::StateMachine;
use crate::context::CompilationContext;
use crate::determinize::beautify;
use crate::error::{CompileError, Result, WarningKind};
use crate::minimize::minimize;
use crate::ops::invert;
use compact_str::CompactString;

/// Append the post-context `post` to `core`.
///
/// The match still ends where `core` ends. Two ways to find that position:
///
/// - Normally the position is stored when a former acceptance state of
///   `core` is entered (`store_input_position`) and restored when an
///   acceptance state of the post-context is reached. Both carry the
///   machine's id as `post_context_id`.
/// - If characters of `post` could also continue `core` (forward
///   ambiguity), the stored position is unreliable. The acceptance states
///   then carry a `backward_detector_id` instead and the inverted post-context
///   is attached as the machine's backward detector. If the post-context is
///   ambiguous backwards as well, the philosophical cut is applied to it
///   first (or [`CompileError::AmbiguousPostContext`] is returned when the
///   configuration forbids that).
///
/// A post-context that matches the empty string is dropped with a warning.
/// The result is a DFA with `core`'s machine id.
///
/// # Errors
///
/// [`CompileError::AmbiguousPostContext`] as described above.
pub fn attach_post_context(
    ctx: &mut CompilationContext,
    core: StateMachine,
    post: &StateMachine,
) -> Result<StateMachine> {
    if post.accepts_empty() {
        ctx.warn(WarningKind::PostContextMatchesEmpty);
        return Ok(core);
    }

    let core = beautify(ctx, &core);
    let post = beautify(ctx, post);

    if !detect_forward(&core, &post) {
        return Ok(mount_with_stored_position(ctx, core, &post));
    }

    let post = if detect_backward(ctx, &core, &post) {
        if !ctx.config().allow_philosophical_cut {
            return Err(CompileError::AmbiguousPostContext {
                pattern: CompactString::new(ctx.current_pattern().unwrap_or_default()),
            });
        }
        ctx.warn(WarningKind::PhilosophicalCut);
        philosophical_cut(ctx, &core, &post)
    } else {
        post
    };
    Ok(mount_with_backward_detector(ctx, core, &post))
}

fn mount_with_stored_position(ctx: &mut CompilationContext, core: StateMachine, post: &StateMachine) -> StateMachine {
    let id = core.id();
    let mut result = core;
    let core_ends = result.acceptance_state_ids();

    let post = post.clone_with_new_ids(ctx);
    result.mount_to_acceptance_states(post.init_state_id(), true);
    result.absorb(post);

    for end in core_ends {
        let core = result.state_mut(end).core_mut();
        core.store_input_position = true;
        core.post_context_id = Some(id);
    }
    for end in result.acceptance_state_ids() {
        let core = result.state_mut(end).core_mut();
        core.store_input_position = false;
        core.post_context_id = Some(id);
    }
    result.set_post_context_id(Some(id));
    beautify(ctx, &result)
}

fn mount_with_backward_detector(ctx: &mut CompilationContext, core: StateMachine, post: &StateMachine) -> StateMachine {
    let detector = backward_detector(ctx, post);
    let mut result = core;

    let post = post.clone_with_new_ids(ctx);
    result.mount_to_acceptance_states(post.init_state_id(), true);
    result.absorb(post);

    for end in result.acceptance_state_ids() {
        result.state_mut(end).core_mut().backward_detector_id = Some(detector.id());
    }
    let mut result = beautify(ctx, &result);
    result.set_backward_detector(Some(detector));
    result
}

/// DFA that, run backwards from the end of a match, stops at the end of the
/// core: the inverted post-context, pruned after its first acceptance.
///
/// The detector only runs after the forward machine has matched the
/// post-context, so the input always fits the inverted post-context. Its
/// non-acceptance states therefore get their drop-out codes filled with
/// neighbouring transitions and never need a drop-out check.
#[must_use]
pub fn backward_detector(ctx: &mut CompilationContext, post: &StateMachine) -> StateMachine {
    let inverted = invert(ctx, post);
    let mut detector = beautify(ctx, &inverted);
    detector.prune_after_acceptance();
    for state in detector.states_mut() {
        if !state.is_acceptance() {
            state.transitions_mut().fill_drop_out_with_adjacent_targets();
        }
    }
    minimize(ctx, &detector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileConfig;
    use crate::ops::repeat;
    use crate::testing::dfa_accepts_str;

    fn plus(ctx: &mut CompilationContext, text: &str) -> StateMachine {
        let base = StateMachine::from_str_sequence(ctx, text);
        let nfa = repeat(ctx, &base, 1, None);
        beautify(ctx, &nfa)
    }

    #[test]
    fn test_plain_post_context_stores_position() {
        let mut ctx = CompilationContext::default();
        let core = StateMachine::from_str_sequence(&mut ctx, "foo");
        let core_id = core.id();
        let post = StateMachine::from_str_sequence(&mut ctx, "bar");
        let sm = attach_post_context(&mut ctx, core, &post).unwrap();

        assert_eq!(sm.id(), core_id);
        assert_eq!(sm.post_context_id(), Some(core_id));
        assert!(sm.backward_detector().is_none());
        assert!(dfa_accepts_str(&sm, "foobar"));
        assert!(!dfa_accepts_str(&sm, "foo"));

        let stores = sm.states().filter(|s| s.core().store_input_position).count();
        assert_eq!(stores, 1);
        for state in sm.states().filter(|s| s.is_acceptance()) {
            assert_eq!(state.core().post_context_id, Some(core_id));
            assert!(!state.core().store_input_position);
        }
        sm.assert_consistency();
    }

    #[test]
    fn test_pseudo_ambiguous_post_context_gets_detector() {
        let mut ctx = CompilationContext::default();
        let core = plus(&mut ctx, "x");
        let post = StateMachine::from_str_sequence(&mut ctx, "x");
        let sm = attach_post_context(&mut ctx, core, &post).unwrap();

        let detector = sm.backward_detector().expect("detector");
        assert!(sm.post_context_id().is_none());
        for state in sm.states().filter(|s| s.is_acceptance()) {
            assert_eq!(state.core().backward_detector_id, Some(detector.id()));
        }
        assert!(ctx.warnings().is_empty());
        assert!(dfa_accepts_str(&sm, "xx"));
        assert!(!dfa_accepts_str(&sm, "x"));
        assert!(dfa_accepts_str(detector, "x"));
        detector.assert_consistency();
    }

    #[test]
    fn test_doubly_ambiguous_post_context_warns() {
        let mut ctx = CompilationContext::default();
        ctx.set_current_pattern(Some("x+/x+"));
        let core = plus(&mut ctx, "x");
        let post = plus(&mut ctx, "x");
        let sm = attach_post_context(&mut ctx, core, &post).unwrap();

        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.warnings()[0].kind, WarningKind::PhilosophicalCut);
        assert!(sm.is_deterministic());
        assert!(sm.orphaned_state_ids().is_empty());
        assert!(sm.backward_detector().is_some());
    }

    #[test]
    fn test_doubly_ambiguous_post_context_can_be_an_error() {
        let mut ctx = CompilationContext::new(CompileConfig::default().with_philosophical_cut(false));
        ctx.set_current_pattern(Some("x+/x+"));
        let core = plus(&mut ctx, "x");
        let post = plus(&mut ctx, "x");
        let err = attach_post_context(&mut ctx, core, &post).unwrap_err();
        assert_eq!(
            err,
            CompileError::AmbiguousPostContext {
                pattern: "x+/x+".into()
            }
        );
    }

    #[test]
    fn test_empty_post_context_is_dropped() {
        let mut ctx = CompilationContext::default();
        let core = StateMachine::from_str_sequence(&mut ctx, "a");
        let base = StateMachine::from_str_sequence(&mut ctx, "b");
        let post = repeat(&mut ctx, &base, 0, None);
        let sm = attach_post_context(&mut ctx, core.clone(), &post).unwrap();
        assert_eq!(sm, core);
        assert_eq!(ctx.warnings()[0].kind, WarningKind::PostContextMatchesEmpty);
    }

    #[test]
    fn test_backward_detector_never_drops_out_before_acceptance() {
        let mut ctx = CompilationContext::default();
        let post = StateMachine::from_str_sequence(&mut ctx, "ab");
        let detector = backward_detector(&mut ctx, &post);
        for state in detector.states().filter(|s| !s.is_acceptance()) {
            assert!(state.transitions().drop_out_set().is_empty());
        }
        for state in detector.states().filter(|s| s.is_acceptance()) {
            assert!(state.transitions().is_empty());
        }
    }
}
