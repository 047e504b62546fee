use super::line::begin_of_line_trigger;
use crate::automaton::StateMachine;
use crate::context::CompilationContext;
use crate::determinize::beautify;
use crate::error::WarningKind;
use crate::minimize::minimize;
use crate::ops::{invert, sequentialize_owned};

/// Condition `core` on the pre-context `pre`.
///
/// `core` keeps its structure. `pre` is inverted (so it can be run backwards
/// from the match start), determinized, pruned after acceptance and
/// minimized, then stored as `core`'s pre-context; every acceptance state of
/// `core` gets `pre_context_id` set to its id.
///
/// With `begin_of_line`, the inverted pre-context must additionally be
/// followed (backwards) by a newline or the begin of the stream.
///
/// A pre-context that matches the empty string is dropped with a warning;
/// `begin_of_line` then still applies as a plain flag.
#[must_use]
pub fn attach_pre_context(
    ctx: &mut CompilationContext,
    mut core: StateMachine,
    pre: &StateMachine,
    begin_of_line: bool,
) -> StateMachine {
    if pre.accepts_empty() {
        ctx.warn(WarningKind::PreContextMatchesEmpty);
        if begin_of_line {
            super::line::mark_begin_of_line(&mut core);
        }
        return core;
    }

    let mut inverted = invert(ctx, pre);
    if begin_of_line {
        let newline = StateMachine::from_trigger(ctx, begin_of_line_trigger());
        inverted = sequentialize_owned(ctx, vec![inverted, newline], false);
    }
    let mut pre_dfa = beautify(ctx, &inverted);
    pre_dfa.prune_after_acceptance();
    let pre_dfa = minimize(ctx, &pre_dfa);

    let pre_id = pre_dfa.id();
    for end in core.acceptance_state_ids() {
        core.state_mut(end).core_mut().pre_context_id = Some(pre_id);
    }
    core.set_pre_context(Some(pre_dfa));
    core
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::repeat;
    use crate::set::BOF_CODE;
    use crate::testing::{dfa_accepts, dfa_accepts_str};

    #[test]
    fn test_pre_context_is_inverted_and_tagged() {
        let mut ctx = CompilationContext::default();
        let core = StateMachine::from_str_sequence(&mut ctx, "b");
        let pre = StateMachine::from_str_sequence(&mut ctx, "xa");
        let sm = attach_pre_context(&mut ctx, core, &pre, false);

        let pre_dfa = sm.pre_context().expect("pre-context");
        assert!(dfa_accepts_str(pre_dfa, "ax"));
        assert!(!dfa_accepts_str(pre_dfa, "xa"));
        for state in sm.states().filter(|s| s.is_acceptance()) {
            assert_eq!(state.core().pre_context_id, Some(pre_dfa.id()));
        }
        pre_dfa.assert_consistency();
    }

    #[test]
    fn test_pre_context_pruned_after_acceptance() {
        let mut ctx = CompilationContext::default();
        let core = StateMachine::from_str_sequence(&mut ctx, "b");
        let base = StateMachine::from_str_sequence(&mut ctx, "a");
        let pre = repeat(&mut ctx, &base, 1, None);
        let sm = attach_pre_context(&mut ctx, core, &pre, false);
        let pre_dfa = sm.pre_context().expect("pre-context");
        assert_eq!(pre_dfa.state_count(), 2);
    }

    #[test]
    fn test_pre_context_with_begin_of_line() {
        let mut ctx = CompilationContext::default();
        let core = StateMachine::from_str_sequence(&mut ctx, "b");
        let pre = StateMachine::from_str_sequence(&mut ctx, "a");
        let sm = attach_pre_context(&mut ctx, core, &pre, true);
        let pre_dfa = sm.pre_context().expect("pre-context");
        assert!(dfa_accepts(pre_dfa, &['a' as i64, '\n' as i64]));
        assert!(dfa_accepts(pre_dfa, &['a' as i64, BOF_CODE]));
        assert!(!dfa_accepts(pre_dfa, &['a' as i64]));
    }

    #[test]
    fn test_empty_pre_context_is_dropped() {
        let mut ctx = CompilationContext::default();
        let core = StateMachine::from_str_sequence(&mut ctx, "b");
        let base = StateMachine::from_str_sequence(&mut ctx, "a");
        let pre = repeat(&mut ctx, &base, 0, Some(1));
        let sm = attach_pre_context(&mut ctx, core, &pre, true);
        assert!(sm.pre_context().is_none());
        assert_eq!(ctx.warnings()[0].kind, WarningKind::PreContextMatchesEmpty);
        assert!(sm.states().filter(|s| s.is_acceptance()).all(|s| s.core().begin_of_line));
    }
}
