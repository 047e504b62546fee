//! Recursive-descent parser from pattern text to NFAs.
//!
//! ```text
//! pattern    := '^'? conditional '$'?
//! conditional:= expression
//!             | expression '/' expression
//!             | expression '/' expression '/' expression?
//! expression := sequence ('|' sequence)*
//! sequence   := postfix+
//! postfix    := primary ('*' | '+' | '?' | '{' m (',' n?)? '}')*
//! ```
//!
//! A pattern ends at the first unescaped whitespace.

use super::charset::Atom;
use super::cursor::Cursor;
use super::definitions::Definitions;
use super::escape::{Escape, parse_escape};
use super::properties::PropertyLookup;
use crate::automaton::StateMachine;
use crate::context::CompilationContext;
use crate::error::{CompileError, RegexSyntaxError, Result, SyntaxErrorKind};
use crate::ops::{parallelize_owned, repeat, sequentialize_owned};
use crate::set::{Interval, NumberSet};
use compact_str::CompactString;
use smallvec::SmallVec;

/// A pattern split into its parts. All machines are NFAs.
#[derive(Debug)]
pub struct ParsedPattern {
    pub pre_context: Option<StateMachine>,
    pub core: StateMachine,
    pub post_context: Option<StateMachine>,
    /// Leading `^`
    pub begin_of_line: bool,
    /// Trailing `$`
    pub end_of_line: bool,
}

impl ParsedPattern {
    #[must_use]
    pub const fn has_contexts(&self) -> bool {
        self.pre_context.is_some() || self.post_context.is_some() || self.begin_of_line || self.end_of_line
    }
}

pub(crate) type Parsed<'p, T> = Result<(T, Cursor<'p>)>;

pub(crate) struct Parser<'p, 'c> {
    pub(super) ctx: &'c mut CompilationContext,
    pub(super) text: &'p str,
    definitions: &'p Definitions,
    properties: &'p dyn PropertyLookup,
}

impl<'p, 'c> Parser<'p, 'c> {
    pub(crate) fn new(
        ctx: &'c mut CompilationContext,
        text: &'p str,
        definitions: &'p Definitions,
        properties: &'p dyn PropertyLookup,
    ) -> Self {
        Self {
            ctx,
            text,
            definitions,
            properties,
        }
    }

    pub(super) fn error(&self, at: usize, kind: SyntaxErrorKind) -> CompileError {
        RegexSyntaxError::new(self.text, at, kind).into()
    }

    pub(super) fn domain(&self) -> Interval {
        self.ctx.config().character_domain
    }

    pub(crate) fn parse_pattern(&mut self) -> Result<ParsedPattern> {
        if self.text.trim().is_empty() {
            return Err(self.error(0, SyntaxErrorKind::EmptyPattern));
        }

        let mut cur = Cursor::new(self.text);
        let begin_of_line = match cur.eat('^') {
            Some(next) => {
                cur = next;
                true
            }
            None => false,
        };

        let (first, next) = self.parse_expression(cur)?;
        cur = next;
        let (pre_context, core, post_context) = match cur.eat('/') {
            None => (None, first, None),
            Some(next) => {
                let (second, next) = self.parse_expression(next)?;
                cur = next;
                match cur.eat('/') {
                    None => (None, first, Some(second)),
                    Some(next) => {
                        cur = next;
                        if at_pattern_end(cur) || cur.peek() == Some('$') {
                            (Some(first), second, None)
                        } else {
                            let (third, next) = self.parse_expression(cur)?;
                            cur = next;
                            (Some(first), second, Some(third))
                        }
                    }
                }
            }
        };

        if cur.peek() == Some('/') {
            return Err(self.error(
                cur.position(),
                SyntaxErrorKind::context_conflict("a pattern has at most a pre- and a post-context"),
            ));
        }
        let end_of_line = match cur.eat('$') {
            Some(next) => {
                if post_context.is_some() {
                    return Err(self.error(
                        cur.position(),
                        SyntaxErrorKind::context_conflict("'$' cannot follow a post-context"),
                    ));
                }
                cur = next;
                true
            }
            None => false,
        };

        let rest = cur.skip_whitespace();
        if !rest.is_at_end() {
            return Err(self.error(rest.position(), SyntaxErrorKind::TrailingInput));
        }

        Ok(ParsedPattern {
            pre_context,
            core,
            post_context,
            begin_of_line,
            end_of_line,
        })
    }

    fn parse_expression(&mut self, cur: Cursor<'p>) -> Parsed<'p, StateMachine> {
        let (first, mut cur) = self.parse_sequence(cur)?;
        let mut branches = vec![first];
        while let Some(next) = cur.eat('|') {
            let (branch, after) = self.parse_sequence(next)?;
            branches.push(branch);
            cur = after;
        }
        let machine = if branches.len() == 1 {
            branches.swap_remove(0)
        } else {
            parallelize_owned(self.ctx, branches)
        };
        Ok((machine, cur))
    }

    fn parse_sequence(&mut self, mut cur: Cursor<'p>) -> Parsed<'p, StateMachine> {
        let mut parts = Vec::new();
        while !ends_sequence(cur) {
            let (part, next) = self.parse_postfix(cur)?;
            parts.push(part);
            cur = next;
        }
        let machine = match parts.len() {
            0 => return Err(self.error(cur.position(), SyntaxErrorKind::MissingOperand)),
            1 => parts.swap_remove(0),
            _ => sequentialize_owned(self.ctx, parts, false),
        };
        Ok((machine, cur))
    }

    fn parse_postfix(&mut self, cur: Cursor<'p>) -> Parsed<'p, StateMachine> {
        let (mut machine, mut cur) = self.parse_primary(cur)?;
        loop {
            let (min, max, next) = match cur.peek() {
                Some('*') => (0, None, cur.advance()),
                Some('+') => (1, None, cur.advance()),
                Some('?') => (0, Some(1), cur.advance()),
                Some('{') if starts_repetition(cur) => self.parse_repetition_range(cur)?,
                _ => break,
            };
            let copies = max.unwrap_or(min).max(min).max(1) as usize;
            let estimate = machine.state_count().saturating_mul(copies);
            let limit = self.ctx.config().max_states;
            if estimate > limit {
                let kind = SyntaxErrorKind::PatternTooLarge { estimate, limit };
                return Err(self.error(cur.position(), kind));
            }
            machine = repeat(self.ctx, &machine, min, max);
            cur = next;
        }
        Ok((machine, cur))
    }

    /// `{m}`, `{m,}`, `{m,n}` and `{,n}`
    fn parse_repetition_range(&self, cur: Cursor<'p>) -> Result<(u32, Option<u32>, Cursor<'p>)> {
        let start = cur.position();
        let unterminated = || self.error(start, SyntaxErrorKind::UnterminatedRepetition);

        let (min_digits, after_min) = cur.advance().take_while(|c| c.is_ascii_digit());
        let min = self.parse_count(min_digits, cur.advance().position())?;
        if let Some(next) = after_min.eat('}') {
            return Ok((min, Some(min), next));
        }
        let after_comma = after_min.eat(',').ok_or_else(unterminated)?;
        let (max_digits, after_max) = after_comma.take_while(|c| c.is_ascii_digit());
        let next = after_max.eat('}').ok_or_else(unterminated)?;

        let max = if max_digits.is_empty() {
            None
        } else {
            Some(self.parse_count(max_digits, after_comma.position())?)
        };
        if let Some(max) = max
            && max < min
        {
            return Err(self.error(start, SyntaxErrorKind::InvalidRepetitionRange { min, max }));
        }
        Ok((min, max, next))
    }

    /// A repetition count, `0` for no digits. Counts above the configured
    /// limit are rejected at `at`, including those that overflow `u32`.
    fn parse_count(&self, digits: &str, at: usize) -> Result<u32> {
        if digits.is_empty() {
            return Ok(0);
        }
        let limit = self.ctx.config().max_repetition;
        match digits.parse::<u32>() {
            Ok(count) if count <= limit => Ok(count),
            _ => Err(self.error(
                at,
                SyntaxErrorKind::RepetitionTooLarge {
                    count: CompactString::new(digits),
                    limit,
                },
            )),
        }
    }

    fn parse_primary(&mut self, cur: Cursor<'p>) -> Parsed<'p, StateMachine> {
        let start = cur.position();
        let Some(c) = cur.peek() else {
            return Err(self.error(start, SyntaxErrorKind::MissingOperand));
        };
        match c {
            '"' => {
                let (codes, next) = self.parse_string_codes(cur)?;
                Ok((StateMachine::from_codes(self.ctx, &codes), next))
            }
            '[' => {
                let (set, next) = if cur.starts_with("[:") {
                    self.parse_set_expression(cur)?
                } else {
                    self.parse_character_set(cur)?
                };
                Ok((self.set_machine(set, start)?, next))
            }
            '{' if starts_repetition(cur) => Err(self.error(start, SyntaxErrorKind::MissingOperand)),
            '{' => self.parse_reference(cur),
            '(' => self.parse_group(cur),
            '.' => {
                let set = self.dot_set();
                Ok((StateMachine::from_trigger(self.ctx, set), cur.advance()))
            }
            '\\' => {
                let (atom, next) = self.parse_escape_atom(cur)?;
                let machine = match atom {
                    Atom::Code(code) => StateMachine::from_trigger(self.ctx, code),
                    Atom::Set(set) => self.set_machine(set, start)?,
                };
                Ok((machine, next))
            }
            '*' | '+' | '?' => Err(self.error(start, SyntaxErrorKind::MissingOperand)),
            '}' | ']' | '$' | '^' => Err(self.error(start, SyntaxErrorKind::unexpected_character(c))),
            c => Ok((StateMachine::from_trigger(self.ctx, c), cur.advance())),
        }
    }

    fn parse_group(&mut self, cur: Cursor<'p>) -> Parsed<'p, StateMachine> {
        let start = cur.position();
        let (machine, next) = self.parse_expression(cur.advance())?;
        match next.peek() {
            Some(')') => Ok((machine, next.advance())),
            Some('/') => Err(self.error(
                next.position(),
                SyntaxErrorKind::context_conflict("contexts are not allowed inside a group"),
            )),
            _ => Err(self.error(start, SyntaxErrorKind::UnterminatedGroup)),
        }
    }

    /// `{name}`: a fresh copy of a definition
    fn parse_reference(&mut self, cur: Cursor<'p>) -> Parsed<'p, StateMachine> {
        let start = cur.position();
        let (name, after) = cur.advance().take_while(|c| c.is_alphanumeric() || c == '_');
        let next = match after.eat('}') {
            Some(next) if !name.is_empty() => next,
            _ => return Err(self.error(start, SyntaxErrorKind::UnterminatedReference)),
        };
        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| CompileError::unknown_definition(name))?;
        Ok((definition.clone_with_new_ids(self.ctx), next))
    }

    /// The code points of a `"..."` literal.
    pub(super) fn parse_string_codes(&mut self, cur: Cursor<'p>) -> Parsed<'p, SmallVec<[i64; 16]>> {
        let start = cur.position();
        let mut codes = SmallVec::new();
        let mut cur = cur.advance();
        loop {
            match cur.peek() {
                None => return Err(self.error(start, SyntaxErrorKind::UnterminatedString)),
                Some('"') => return Ok((codes, cur.advance())),
                Some('\\') => {
                    let at = cur.position();
                    let (atom, next) = self.parse_escape_atom(cur)?;
                    let code = match atom {
                        Atom::Code(code) => Some(code),
                        Atom::Set(set) => set.minimum().filter(|_| set.len() == 1),
                    };
                    let Some(code) = code else {
                        let escape = CompactString::new(&self.text[at..next.position()]);
                        return Err(self.error(at, SyntaxErrorKind::unknown_escape(escape)));
                    };
                    codes.push(code);
                    cur = next;
                }
                Some(c) => {
                    codes.push(i64::from(u32::from(c)));
                    cur = cur.advance();
                }
            }
        }
    }

    /// An escape sequence as code or set, with properties resolved.
    pub(super) fn parse_escape_atom(&mut self, cur: Cursor<'p>) -> Parsed<'p, Atom> {
        let (escape, next) = parse_escape(cur, self.domain())?;
        let atom = match escape {
            Escape::Code(code) => Atom::Code(code),
            Escape::Set(set) => Atom::Set(set),
            Escape::Property { name, value } => Atom::Set(self.properties.lookup(name, value)?),
        };
        Ok((atom, next))
    }

    /// `.`: everything in the domain but newline
    pub(super) fn dot_set(&self) -> NumberSet {
        let mut set = NumberSet::from_interval(self.domain());
        set.cut_code(i64::from(u32::from('\n')));
        set
    }

    fn set_machine(&mut self, set: NumberSet, at: usize) -> Result<StateMachine> {
        if set.is_empty() {
            return Err(self.error(at, SyntaxErrorKind::EmptyCharacterSet));
        }
        Ok(StateMachine::from_trigger(self.ctx, set))
    }
}

fn at_pattern_end(cur: Cursor<'_>) -> bool {
    cur.peek().is_none_or(char::is_whitespace)
}

fn ends_sequence(cur: Cursor<'_>) -> bool {
    match cur.peek() {
        None | Some('|' | ')' | '/') => true,
        Some('$') => at_pattern_end(cur.advance()),
        Some(c) => c.is_whitespace(),
    }
}

fn starts_repetition(cur: Cursor<'_>) -> bool {
    cur.peek() == Some('{') && cur.peek_second().is_some_and(|c| c.is_ascii_digit() || c == ',')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileConfig;
    use crate::regex::properties::NoProperties;
    use crate::testing::nfa_accepts_str;

    fn parse(ctx: &mut CompilationContext, text: &str) -> Result<ParsedPattern> {
        let definitions = Definitions::new();
        Parser::new(ctx, text, &definitions, &NoProperties).parse_pattern()
    }

    fn syntax_kind(text: &str) -> SyntaxErrorKind {
        let mut ctx = CompilationContext::default();
        let err = parse(&mut ctx, text).unwrap_err();
        err.as_syntax().expect("syntax error").kind().clone()
    }

    #[test]
    fn test_alternation_and_sequence() {
        let mut ctx = CompilationContext::default();
        let parsed = parse(&mut ctx, "ab|cd*").unwrap();
        assert!(!parsed.has_contexts());
        assert!(nfa_accepts_str(&parsed.core, "ab"));
        assert!(nfa_accepts_str(&parsed.core, "c"));
        assert!(nfa_accepts_str(&parsed.core, "cddd"));
        assert!(!nfa_accepts_str(&parsed.core, "abd"));
    }

    #[test]
    fn test_repetition_ranges() {
        let mut ctx = CompilationContext::default();
        let parsed = parse(&mut ctx, "a{2,3}").unwrap();
        assert!(!nfa_accepts_str(&parsed.core, "a"));
        assert!(nfa_accepts_str(&parsed.core, "aa"));
        assert!(nfa_accepts_str(&parsed.core, "aaa"));
        assert!(!nfa_accepts_str(&parsed.core, "aaaa"));

        let parsed = parse(&mut ctx, "a{2}").unwrap();
        assert!(nfa_accepts_str(&parsed.core, "aa"));
        assert!(!nfa_accepts_str(&parsed.core, "aaa"));

        let parsed = parse(&mut ctx, "(ab){1,}").unwrap();
        assert!(nfa_accepts_str(&parsed.core, "ababab"));

        let parsed = parse(&mut ctx, "x{,2}").unwrap();
        assert!(nfa_accepts_str(&parsed.core, ""));
        assert!(!nfa_accepts_str(&parsed.core, "xxx"));
    }

    #[test]
    fn test_repetition_limits() {
        assert_eq!(
            syntax_kind("a{4294967296}"),
            SyntaxErrorKind::RepetitionTooLarge {
                count: "4294967296".into(),
                limit: 1000
            }
        );
        assert_eq!(
            syntax_kind("a{2,1001}"),
            SyntaxErrorKind::RepetitionTooLarge {
                count: "1001".into(),
                limit: 1000
            }
        );

        let config = CompileConfig::default().with_max_repetition(4);
        let mut ctx = CompilationContext::new(config);
        assert!(parse(&mut ctx, "a{4}").is_ok());
        let err = parse(&mut ctx, "xa{5}").unwrap_err();
        assert_eq!(err.as_syntax().unwrap().position(), 3);

        let config = CompileConfig::default().with_max_states(50);
        let mut ctx = CompilationContext::new(config);
        assert!(parse(&mut ctx, "(ab){3}").is_ok());
        let err = parse(&mut ctx, "(ab){4}{10}").unwrap_err();
        assert!(matches!(
            err.as_syntax().unwrap().kind(),
            SyntaxErrorKind::PatternTooLarge { limit: 50, .. }
        ));
    }

    #[test]
    fn test_strings_and_dot() {
        let mut ctx = CompilationContext::default();
        let parsed = parse(&mut ctx, "\"a|b\\n\".").unwrap();
        assert!(nfa_accepts_str(&parsed.core, "a|b\nz"));
        assert!(!nfa_accepts_str(&parsed.core, "a|b\n\n"));
    }

    #[test]
    fn test_contexts_are_split() {
        let mut ctx = CompilationContext::default();
        let parsed = parse(&mut ctx, "^x/y/z").unwrap();
        assert!(parsed.begin_of_line);
        assert!(nfa_accepts_str(parsed.pre_context.as_ref().unwrap(), "x"));
        assert!(nfa_accepts_str(&parsed.core, "y"));
        assert!(nfa_accepts_str(parsed.post_context.as_ref().unwrap(), "z"));

        let parsed = parse(&mut ctx, "x/y/$").unwrap();
        assert!(parsed.pre_context.is_some());
        assert!(parsed.post_context.is_none());
        assert!(parsed.end_of_line);

        let parsed = parse(&mut ctx, "y/z").unwrap();
        assert!(parsed.pre_context.is_none());
        assert!(nfa_accepts_str(parsed.post_context.as_ref().unwrap(), "z"));
    }

    #[test]
    fn test_pattern_ends_at_whitespace() {
        let mut ctx = CompilationContext::default();
        let parsed = parse(&mut ctx, "ab$   ").unwrap();
        assert!(parsed.end_of_line);
        assert!(nfa_accepts_str(&parsed.core, "ab"));
        assert_eq!(syntax_kind("ab cd"), SyntaxErrorKind::TrailingInput);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(syntax_kind(""), SyntaxErrorKind::EmptyPattern);
        assert_eq!(syntax_kind("   "), SyntaxErrorKind::EmptyPattern);
        assert_eq!(syntax_kind("*a"), SyntaxErrorKind::MissingOperand);
        assert_eq!(syntax_kind("a|"), SyntaxErrorKind::MissingOperand);
        assert_eq!(syntax_kind("(ab"), SyntaxErrorKind::UnterminatedGroup);
        assert_eq!(syntax_kind("\"ab"), SyntaxErrorKind::UnterminatedString);
        assert_eq!(syntax_kind("a{2"), SyntaxErrorKind::UnterminatedRepetition);
        assert_eq!(syntax_kind("a{3,2}"), SyntaxErrorKind::InvalidRepetitionRange { min: 3, max: 2 });
        assert_eq!(syntax_kind("{name"), SyntaxErrorKind::UnterminatedReference);
        assert_eq!(syntax_kind("a$b"), SyntaxErrorKind::unexpected_character('$'));
        assert!(matches!(syntax_kind("a/b$"), SyntaxErrorKind::ContextConflict { .. }));
        assert!(matches!(syntax_kind("a/b/c/d"), SyntaxErrorKind::ContextConflict { .. }));
        assert!(matches!(syntax_kind("(a/b)"), SyntaxErrorKind::ContextConflict { .. }));
    }

    #[test]
    fn test_error_position() {
        let mut ctx = CompilationContext::default();
        let err = parse(&mut ctx, "ab(cd").unwrap_err();
        assert_eq!(err.as_syntax().unwrap().position(), 2);
    }

    #[test]
    fn test_unknown_definition() {
        let mut ctx = CompilationContext::default();
        let err = parse(&mut ctx, "{digit}+").unwrap_err();
        assert_eq!(err, CompileError::unknown_definition("digit"));
    }

    #[test]
    fn test_property_without_database() {
        let mut ctx = CompilationContext::default();
        let err = parse(&mut ctx, "\\P{Greek}").unwrap_err();
        assert!(matches!(err, CompileError::Property(_)));
    }
}
