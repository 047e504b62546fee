//! # Reference Simulation
//!
//! Runs compiled automata directly on input, the way generated lexer code
//! would: longest match with pattern priority, pre-contexts checked by
//! walking backwards from the match start, post-contexts resolved from
//! stored positions or by a backward detector.
//!
//! Positions are indices into the code slice, so for text input they count
//! characters, not bytes.

use crate::automaton::{MachineId, PatternId, State, StateId, StateMachine};
use crate::combine::Recognizer;
use crate::set::{BOF_CODE, EOF_CODE};
use hashbrown::HashMap;

const NEWLINE: i64 = '\n' as i64;

/// The codes of `text`, one per character.
#[must_use]
pub fn codes(text: &str) -> Vec<i64> {
    text.chars().map(|c| i64::from(u32::from(c))).collect()
}

/// True if the NFA `sm` accepts exactly `input`.
#[must_use]
pub fn nfa_accepts(sm: &StateMachine, input: &[i64]) -> bool {
    let mut current = sm.epsilon_closure(&[sm.init_state_id()]);
    for &code in input {
        let next: Vec<StateId> = current
            .iter()
            .flat_map(|&id| sm.state(id).transitions().targets_for(code))
            .collect();
        if next.is_empty() {
            return false;
        }
        current = sm.epsilon_closure(&next);
    }
    current.iter().any(|&id| sm.state(id).is_acceptance())
}

#[must_use]
pub fn nfa_accepts_str(sm: &StateMachine, text: &str) -> bool {
    nfa_accepts(sm, &codes(text))
}

/// The state the DFA `sm` is in after reading `input`, if it does not drop
/// out before.
#[must_use]
pub fn dfa_run_codes(sm: &StateMachine, input: &[i64]) -> Option<StateId> {
    input.iter().try_fold(sm.init_state_id(), |state, &code| {
        sm.state(state).transitions().target_for(code)
    })
}

#[must_use]
pub fn dfa_run(sm: &StateMachine, text: &str) -> Option<StateId> {
    dfa_run_codes(sm, &codes(text))
}

/// True if the DFA `sm` accepts exactly `input`.
#[must_use]
pub fn dfa_accepts(sm: &StateMachine, input: &[i64]) -> bool {
    dfa_run_codes(sm, input).is_some_and(|id| sm.state(id).is_acceptance())
}

#[must_use]
pub fn dfa_accepts_str(sm: &StateMachine, text: &str) -> bool {
    dfa_accepts(sm, &codes(text))
}

/// One recognized lexeme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub pattern_id: PatternId,
    pub start: usize,
    pub end: usize,
}

/// Drives a [`Recognizer`] over code input.
#[derive(Debug)]
pub struct Simulator<'r, A> {
    recognizer: &'r Recognizer<A>,
}

impl<'r, A> Simulator<'r, A> {
    #[must_use]
    pub const fn new(recognizer: &'r Recognizer<A>) -> Self {
        Self { recognizer }
    }

    /// The lexeme starting at `start`, or `None` if no pattern matches there.
    ///
    /// `EOF_CODE` is offered once after the last code, so `$` can match at
    /// the end of the input without consuming anything.
    #[must_use]
    pub fn longest_match(&self, input: &[i64], start: usize) -> Option<Lexeme> {
        let forward = self.recognizer.forward();
        let mut state = forward.init_state_id();
        let mut pos = start;
        let mut end_of_stream_fed = false;
        let mut stored: HashMap<MachineId, usize, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        let mut best = None;

        loop {
            let current = forward.state(state);
            for origin in current.origins().iter().filter(|o| o.store_input_position) {
                if let Some(id) = origin.post_context_id {
                    stored.insert(id, pos);
                }
            }
            if let Some(lexeme) = self.accepted(current, input, start, pos, &stored) {
                best = Some(lexeme);
            }

            let code = match input.get(pos) {
                Some(&code) => code,
                None if !end_of_stream_fed => EOF_CODE,
                None => break,
            };
            let Some(next) = current.transitions().target_for(code) else {
                break;
            };
            state = next;
            if pos < input.len() {
                pos += 1;
            } else {
                end_of_stream_fed = true;
            }
        }
        best
    }

    /// Split `input` into lexemes. `None` if some position matches no pattern.
    #[must_use]
    pub fn tokenize(&self, input: &[i64]) -> Option<Vec<Lexeme>> {
        let mut lexemes = Vec::new();
        let mut start = 0;
        while start < input.len() {
            let lexeme = self.longest_match(input, start)?;
            if lexeme.end <= start {
                return None;
            }
            start = lexeme.end;
            lexemes.push(lexeme);
        }
        Some(lexemes)
    }

    /// [`tokenize`](Self::tokenize) on text, returning the action and the
    /// matched text of every lexeme.
    #[must_use]
    pub fn tokenize_str(&self, text: &str) -> Option<Vec<(&'r A, String)>> {
        let chars: Vec<char> = text.chars().collect();
        let lexemes = self.tokenize(&codes(text))?;
        lexemes
            .into_iter()
            .map(|lexeme| {
                let pattern = self.recognizer.pattern(lexeme.pattern_id)?;
                Some((&pattern.action, chars[lexeme.start..lexeme.end].iter().collect::<String>()))
            })
            .collect()
    }

    /// The highest-priority accepting origin of `state` whose conditions hold.
    fn accepted(
        &self,
        state: &State,
        input: &[i64],
        start: usize,
        pos: usize,
        stored: &HashMap<MachineId, usize, ahash::RandomState>,
    ) -> Option<Lexeme> {
        for origin in state.origins().iter().filter(|o| o.is_acceptance) {
            if origin.begin_of_line && !(start == 0 || input[start - 1] == NEWLINE) {
                continue;
            }
            if origin.pre_context_id.is_some() && !self.pre_context_holds(origin.pattern_id, input, start) {
                continue;
            }
            let end = if let Some(id) = origin.post_context_id {
                match stored.get(&id) {
                    Some(&end) => end,
                    None => continue,
                }
            } else if let Some(id) = origin.backward_detector_id {
                self.core_end(id, input, start, pos)
            } else {
                pos
            };
            return Some(Lexeme {
                pattern_id: origin.pattern_id,
                start,
                end,
            });
        }
        None
    }

    /// Walk the combined pre-context machine backwards from `start` until
    /// `pattern_id` accepts or the machine drops out. The begin of the
    /// stream is offered once as `BOF_CODE`.
    fn pre_context_holds(&self, pattern_id: PatternId, input: &[i64], start: usize) -> bool {
        let Some(pre) = self.recognizer.pre_contexts() else {
            return false;
        };
        let mut state = pre.init_state_id();
        let mut pos = start;
        let mut begin_of_stream_fed = false;
        loop {
            let current = pre.state(state);
            if current
                .origins()
                .iter()
                .any(|o| o.is_acceptance && o.pattern_id == pattern_id)
            {
                return true;
            }
            let code = match pos {
                0 if begin_of_stream_fed => return false,
                0 => BOF_CODE,
                _ => input[pos - 1],
            };
            let Some(next) = current.transitions().target_for(code) else {
                return false;
            };
            state = next;
            if pos == 0 {
                begin_of_stream_fed = true;
            } else {
                pos -= 1;
            }
        }
    }

    /// Run backward detector `id` from `end` towards `start`; its first
    /// acceptance marks the end of the core.
    fn core_end(&self, id: MachineId, input: &[i64], start: usize, end: usize) -> usize {
        let Some(detector) = self.recognizer.backward_detector(id) else {
            return end;
        };
        let mut state = detector.init_state_id();
        let mut pos = end.min(input.len());
        while pos > start {
            let Some(next) = detector.state(state).transitions().target_for(input[pos - 1]) else {
                break;
            };
            state = next;
            pos -= 1;
            if detector.state(state).is_acceptance() {
                return pos;
            }
        }
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::{PatternActionInfo, combine};
    use crate::context::CompilationContext;
    use crate::regex::compile;

    fn recognizer(patterns: &[&'static str]) -> Recognizer<&'static str> {
        let mut ctx = CompilationContext::default();
        let infos = patterns
            .iter()
            .zip(0_u32..)
            .map(|(&pattern, id)| {
                let machine = compile(&mut ctx, pattern).unwrap();
                PatternActionInfo::new(pattern, machine, pattern, (0, id))
            })
            .collect();
        combine(&mut ctx, infos).unwrap()
    }

    fn lex(recognizer: &Recognizer<&'static str>, text: &str) -> Vec<(&'static str, String)> {
        Simulator::new(recognizer)
            .tokenize_str(text)
            .expect("input is fully tokenized")
            .into_iter()
            .map(|(action, lexeme)| (*action, lexeme))
            .collect()
    }

    #[test]
    fn test_helpers() {
        let mut ctx = CompilationContext::default();
        let sm = compile(&mut ctx, "ab+").unwrap();
        assert!(dfa_accepts_str(&sm, "abbb"));
        assert!(!dfa_accepts_str(&sm, "a"));
        assert!(dfa_run(&sm, "ac").is_none());
        assert!(nfa_accepts_str(&sm, "ab"));
    }

    #[test]
    fn test_longest_match_wins() {
        let r = recognizer(&["a", "ab"]);
        assert_eq!(lex(&r, "ab"), vec![("ab", "ab".to_owned())]);
        assert_eq!(lex(&r, "aab"), vec![("a", "a".to_owned()), ("ab", "ab".to_owned())]);
    }

    #[test]
    fn test_priority_on_equal_length() {
        let r = recognizer(&["if", "[a-z]+", " "]);
        let tokens = lex(&r, "if iff");
        assert_eq!(
            tokens,
            vec![
                ("if", "if".to_owned()),
                (" ", " ".to_owned()),
                ("[a-z]+", "iff".to_owned())
            ]
        );
    }

    #[test]
    fn test_post_context_restores_position() {
        let r = recognizer(&["a/b", "b"]);
        assert_eq!(lex(&r, "ab"), vec![("a/b", "a".to_owned()), ("b", "b".to_owned())]);
        assert!(Simulator::new(&r).tokenize_str("a").is_none());
    }

    #[test]
    fn test_backward_detector_finds_core_end() {
        let r = recognizer(&["x+/x", "x"]);
        assert_eq!(lex(&r, "xxx"), vec![("x+/x", "xx".to_owned()), ("x", "x".to_owned())]);
    }

    #[test]
    fn test_pre_context_and_begin_of_line() {
        let r = recognizer(&["x/a/", "^b", "[a-z]", "\\n"]);
        assert_eq!(lex(&r, "xa"), vec![("[a-z]", "x".to_owned()), ("x/a/", "a".to_owned())]);
        assert_eq!(lex(&r, "ya"), vec![("[a-z]", "y".to_owned()), ("[a-z]", "a".to_owned())]);
        assert_eq!(lex(&r, "b"), vec![("^b", "b".to_owned())]);
        assert_eq!(
            lex(&r, "bb\nb"),
            vec![
                ("^b", "b".to_owned()),
                ("[a-z]", "b".to_owned()),
                ("\\n", "\n".to_owned()),
                ("^b", "b".to_owned())
            ]
        );
    }

    #[test]
    fn test_end_of_line() {
        let r = recognizer(&["a$", "[a-z]", "\\n"]);
        assert_eq!(lex(&r, "aa"), vec![("[a-z]", "a".to_owned()), ("a$", "a".to_owned())]);
        assert_eq!(
            lex(&r, "a\na"),
            vec![("a$", "a".to_owned()), ("\\n", "\n".to_owned()), ("a$", "a".to_owned())]
        );
    }
}
