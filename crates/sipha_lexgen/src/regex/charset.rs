//! Character sets `[...]` and set expressions `[: op(...) :]`.

use super::cursor::Cursor;
use super::escape::{digit_class, space_class, word_class};
use super::parser::{Parsed, Parser};
use crate::error::SyntaxErrorKind;
use crate::set::{Interval, NumberSet};
use compact_str::CompactString;

/// A single code or a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Code(i64),
    Set(NumberSet),
}

impl Atom {
    #[must_use]
    pub fn into_set(self) -> NumberSet {
        match self {
            Self::Code(code) => NumberSet::from_code(code),
            Self::Set(set) => set,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOperation {
    Union,
    Intersection,
    Difference,
    Inverse,
}

impl SetOperation {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "union" => Some(Self::Union),
            "intersection" => Some(Self::Intersection),
            "difference" => Some(Self::Difference),
            "inverse" => Some(Self::Inverse),
            _ => None,
        }
    }

    fn apply(self, operands: &[NumberSet], domain: Interval) -> NumberSet {
        let union_of = |sets: &[NumberSet]| sets.iter().fold(NumberSet::new(), |acc, set| acc.union(set));
        match (self, operands) {
            (_, []) => NumberSet::new(),
            (Self::Union, all) => union_of(all),
            (Self::Intersection, [first, rest @ ..]) => rest.iter().fold(first.clone(), |acc, set| acc.intersection(set)),
            (Self::Difference, [first, rest @ ..]) => first.difference(&union_of(rest)),
            (Self::Inverse, all) => union_of(all).inverse_within(domain),
        }
    }
}

/// POSIX class names usable as set expression operands
fn posix_class(name: &str) -> Option<NumberSet> {
    let ascii = |intervals: &[(char, char)]| {
        NumberSet::from_intervals(intervals.iter().map(|&(first, last)| Interval::from(first..=last)))
    };
    let set = match name {
        "alpha" => ascii(&[('a', 'z'), ('A', 'Z')]),
        "digit" => digit_class(),
        "alnum" => ascii(&[('a', 'z'), ('A', 'Z'), ('0', '9')]),
        "upper" => ascii(&[('A', 'Z')]),
        "lower" => ascii(&[('a', 'z')]),
        "xdigit" => ascii(&[('0', '9'), ('a', 'f'), ('A', 'F')]),
        "space" => space_class(),
        "blank" => ascii(&[(' ', ' '), ('\t', '\t')]),
        "cntrl" => ascii(&[('\0', '\u{1F}'), ('\u{7F}', '\u{7F}')]),
        "punct" => ascii(&[('!', '/'), (':', '@'), ('[', '`'), ('{', '~')]),
        "graph" => ascii(&[('!', '~')]),
        "print" => ascii(&[(' ', '~')]),
        "word" => word_class(),
        _ => return None,
    };
    Some(set)
}

impl<'p> Parser<'p, '_> {
    /// `[abc]`, `[a-z]`, `[^...]`
    pub(super) fn parse_character_set(&mut self, cur: Cursor<'p>) -> Parsed<'p, NumberSet> {
        let start = cur.position();
        let mut cur = cur.advance();
        let negated = match cur.eat('^') {
            Some(next) => {
                cur = next;
                true
            }
            None => false,
        };

        let mut set = NumberSet::new();
        loop {
            match cur.peek() {
                None => return Err(self.error(start, SyntaxErrorKind::UnterminatedCharacterSet)),
                Some(']') => {
                    cur = cur.advance();
                    break;
                }
                Some(_) => {
                    let item_start = cur.position();
                    let (atom, next) = self.parse_set_atom(cur, start)?;
                    cur = next;
                    let range_first = match atom {
                        Atom::Code(code) if is_range_dash(cur) => code,
                        atom => {
                            set.unite_with(&atom.into_set());
                            continue;
                        }
                    };
                    let dash = cur.position();
                    let (last, next) = self.parse_set_atom(cur.advance(), start)?;
                    let Atom::Code(range_last) = last else {
                        return Err(self.error(dash, SyntaxErrorKind::unexpected_character('-')));
                    };
                    if range_last < range_first {
                        return Err(self.error(
                            item_start,
                            SyntaxErrorKind::InvalidCharacterRange {
                                first: range_first,
                                last: range_last,
                            },
                        ));
                    }
                    set.add_interval(Interval::inclusive(range_first, range_last));
                    cur = next;
                }
            }
        }

        if negated {
            set = set.inverse_within(self.domain());
        }
        Ok((set, cur))
    }

    fn parse_set_atom(&mut self, cur: Cursor<'p>, set_start: usize) -> Parsed<'p, Atom> {
        match cur.peek() {
            None => Err(self.error(set_start, SyntaxErrorKind::UnterminatedCharacterSet)),
            Some('\\') => self.parse_escape_atom(cur),
            Some('[') if cur.starts_with("[:") => {
                let (set, next) = self.parse_set_expression(cur)?;
                Ok((Atom::Set(set), next))
            }
            Some(c) => Ok((Atom::Code(i64::from(u32::from(c))), cur.advance())),
        }
    }

    /// `[: expression :]`
    pub(super) fn parse_set_expression(&mut self, cur: Cursor<'p>) -> Parsed<'p, NumberSet> {
        let start = cur.position();
        let inner = cur.advance().advance();
        let (set, after) = self.parse_set_operand(inner, start)?;
        match after.skip_whitespace().eat_str(":]") {
            Some(next) => Ok((set, next)),
            None => Err(self.error(start, SyntaxErrorKind::UnterminatedSetExpression)),
        }
    }

    fn parse_set_operand(&mut self, cur: Cursor<'p>, expr_start: usize) -> Parsed<'p, NumberSet> {
        let cur = cur.skip_whitespace();
        let at = cur.position();
        match cur.peek() {
            None => Err(self.error(expr_start, SyntaxErrorKind::UnterminatedSetExpression)),
            Some('[') if cur.starts_with("[:") => self.parse_set_expression(cur),
            Some('[') => self.parse_character_set(cur),
            Some('\\') => {
                let (atom, next) = self.parse_escape_atom(cur)?;
                Ok((atom.into_set(), next))
            }
            Some('"') => {
                let (codes, next) = self.parse_string_codes(cur)?;
                Ok((NumberSet::from_codes(codes), next))
            }
            Some('.') => Ok((self.dot_set(), cur.advance())),
            Some(c) if c.is_ascii_alphabetic() => {
                let (name, after) = cur.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                let unknown = || SyntaxErrorKind::UnknownSetOperation {
                    name: CompactString::new(name),
                };
                match after.skip_whitespace().eat('(') {
                    Some(args) => {
                        let operation = SetOperation::from_name(name).ok_or_else(|| self.error(at, unknown()))?;
                        self.parse_set_operation(operation, args, expr_start)
                    }
                    None => match posix_class(name) {
                        Some(set) => Ok((set, after)),
                        None => Err(self.error(at, unknown())),
                    },
                }
            }
            Some(c) => Err(self.error(at, SyntaxErrorKind::unexpected_character(c))),
        }
    }

    /// Operands of `operation` up to the closing parenthesis
    fn parse_set_operation(
        &mut self,
        operation: SetOperation,
        cur: Cursor<'p>,
        expr_start: usize,
    ) -> Parsed<'p, NumberSet> {
        let mut cur = cur.skip_whitespace();
        if cur.peek() == Some(')') {
            return Err(self.error(cur.position(), SyntaxErrorKind::MissingOperand));
        }

        let mut operands = Vec::new();
        loop {
            let (set, next) = self.parse_set_operand(cur, expr_start)?;
            operands.push(set);
            let next = next.skip_whitespace();
            if let Some(after) = next.eat(',') {
                cur = after;
            } else if let Some(after) = next.eat(')') {
                cur = after;
                break;
            } else {
                return Err(match next.peek() {
                    None => self.error(expr_start, SyntaxErrorKind::UnterminatedSetExpression),
                    Some(c) => self.error(next.position(), SyntaxErrorKind::unexpected_character(c)),
                });
            }
        }
        Ok((operation.apply(&operands, self.domain()), cur))
    }
}

/// A `-` between two set members (not directly before the closing `]`)
fn is_range_dash(cur: Cursor<'_>) -> bool {
    cur.peek() == Some('-') && cur.peek_second().is_some_and(|c| c != ']')
}
