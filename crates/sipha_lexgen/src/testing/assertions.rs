use super::simulate::{dfa_accepts_str, nfa_accepts_str};
use crate::automaton::StateMachine;

/// Assertion helpers for state machines
pub trait MachineAssertions {
    /// Assert that the machine accepts exactly `text`
    fn assert_accepts(&self, text: &str);
    /// Assert that the machine does not accept `text`
    fn assert_rejects(&self, text: &str);
    /// Assert that the machine is a DFA without orphaned states
    fn assert_clean_dfa(&self);
}

impl MachineAssertions for StateMachine {
    fn assert_accepts(&self, text: &str) {
        let accepted = if self.is_deterministic() {
            dfa_accepts_str(self, text)
        } else {
            nfa_accepts_str(self, text)
        };
        assert!(accepted, "Expected {text:?} to be accepted by:\n{self}");
    }

    fn assert_rejects(&self, text: &str) {
        let accepted = if self.is_deterministic() {
            dfa_accepts_str(self, text)
        } else {
            nfa_accepts_str(self, text)
        };
        assert!(!accepted, "Expected {text:?} to be rejected by:\n{self}");
    }

    fn assert_clean_dfa(&self) {
        assert!(self.is_deterministic(), "Expected a DFA, got:\n{self}");
        let orphans = self.orphaned_state_ids();
        assert!(orphans.is_empty(), "Orphaned states {orphans:?} in:\n{self}");
        self.assert_consistency();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;

    #[test]
    fn test_assertions_on_nfa_and_dfa() {
        let mut ctx = CompilationContext::default();
        let nfa = StateMachine::from_str_sequence(&mut ctx, "ab");
        nfa.assert_accepts("ab");
        nfa.assert_rejects("a");
        nfa.assert_clean_dfa();
    }

    #[test]
    #[should_panic(expected = "to be accepted")]
    fn test_failed_assertion_panics() {
        let mut ctx = CompilationContext::default();
        let sm = StateMachine::from_str_sequence(&mut ctx, "ab");
        sm.assert_accepts("ba");
    }
}
