//! Begin- and end-of-line conditions.
//!
//! `^` alone is a flag on the acceptance states, checked by looking at the
//! previous character. `$` is a post-context of its own: a newline or the
//! end of the stream.

use crate::automaton::StateMachine;
use crate::context::CompilationContext;
use crate::determinize::beautify;
use crate::ops::parallelize_owned;
use crate::set::{BOF_CODE, EOF_CODE, NumberSet};

const NEWLINE: i64 = '\n' as i64;
const CARRIAGE_RETURN: i64 = '\r' as i64;

/// Set `begin_of_line` on every acceptance state.
pub fn mark_begin_of_line(sm: &mut StateMachine) {
    for state in sm.states_mut() {
        if state.is_acceptance() {
            state.core_mut().begin_of_line = true;
        }
    }
}

/// Codes that, read backwards before a match, make it start a line.
#[must_use]
pub fn begin_of_line_trigger() -> NumberSet {
    NumberSet::from_codes([NEWLINE, BOF_CODE])
}

/// Post-context machine for `$`: `\n` or end of stream, and with
/// `dos_carriage_return_newline` also `\r\n`.
#[must_use]
pub fn end_of_line_machine(ctx: &mut CompilationContext) -> StateMachine {
    let newline = StateMachine::from_trigger(ctx, NumberSet::from_codes([NEWLINE, EOF_CODE]));
    if !ctx.config().dos_carriage_return_newline {
        return newline;
    }
    let dos = StateMachine::from_codes(ctx, &[CARRIAGE_RETURN, NEWLINE]);
    let union = parallelize_owned(ctx, vec![newline, dos]);
    beautify(ctx, &union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileConfig;
    use crate::testing::dfa_accepts;

    #[test]
    fn test_end_of_line_machine() {
        let mut ctx = CompilationContext::default();
        let sm = end_of_line_machine(&mut ctx);
        assert!(dfa_accepts(&sm, &[NEWLINE]));
        assert!(dfa_accepts(&sm, &[EOF_CODE]));
        assert!(!dfa_accepts(&sm, &[CARRIAGE_RETURN, NEWLINE]));
    }

    #[test]
    fn test_end_of_line_machine_dos() {
        let mut ctx = CompilationContext::new(CompileConfig::default().with_dos_newlines(true));
        let sm = end_of_line_machine(&mut ctx);
        assert!(dfa_accepts(&sm, &[NEWLINE]));
        assert!(dfa_accepts(&sm, &[CARRIAGE_RETURN, NEWLINE]));
        assert!(!dfa_accepts(&sm, &[CARRIAGE_RETURN]));
    }

    #[test]
    fn test_mark_begin_of_line() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::from_str_sequence(&mut ctx, "ab");
        mark_begin_of_line(&mut sm);
        for state in sm.states() {
            assert_eq!(state.core().begin_of_line, state.is_acceptance());
        }
    }
}
