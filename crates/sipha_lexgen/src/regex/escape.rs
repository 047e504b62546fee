//! Backslash sequences.

use super::cursor::Cursor;
use crate::error::{RegexSyntaxError, SyntaxErrorKind};
use crate::set::{Interval, NumberSet};
use compact_str::{CompactString, format_compact};

const MAX_CODE_POINT: i64 = 0x10_FFFF;

/// Characters that only stand for themselves when escaped
const META_CHARACTERS: &str = "\\\"/.|*+?()[]{}^$-:=";

/// What a backslash sequence stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escape<'a> {
    /// A single code point
    Code(i64),
    /// A character class such as `\d`
    Set(NumberSet),
    /// `\P{name=value}` / `\P{value}`; `\N{...}` is the `na` property
    Property { name: &'a str, value: Option<&'a str> },
}

/// Parse the escape sequence starting at the backslash under `cur`.
///
/// `domain` bounds the complemented classes `\D`, `\S` and `\W`.
///
/// # Errors
///
/// Unknown escapes, malformed code points and unterminated property
/// expressions.
pub fn parse_escape(cur: Cursor<'_>, domain: Interval) -> Result<(Escape<'_>, Cursor<'_>), RegexSyntaxError> {
    let start = cur.position();
    let error = |kind| RegexSyntaxError::new(cur.text(), start, kind);

    let Some(body) = cur.eat('\\') else {
        return Err(error(SyntaxErrorKind::unknown_escape(CompactString::default())));
    };
    let Some((c, next)) = body.bump() else {
        return Err(error(SyntaxErrorKind::unknown_escape("\\".into())));
    };

    let code = |value: u32| Ok((Escape::Code(i64::from(value)), next));
    match c {
        'a' => code(0x07),
        'b' => code(0x08),
        'f' => code(0x0C),
        'n' => code(0x0A),
        'r' => code(0x0D),
        't' => code(0x09),
        'v' => code(0x0B),
        'x' => hex_code_point(next, 2).ok_or_else(|| error(invalid_digits(next, 2))),
        'X' => hex_code_point(next, 4).ok_or_else(|| error(invalid_digits(next, 4))),
        'U' => hex_code_point(next, 6).ok_or_else(|| error(invalid_digits(next, 6))),
        '0' => {
            let (digits, after) = next.take_up_to(3, |d| d.is_digit(8));
            let value = if digits.is_empty() {
                0
            } else {
                i64::from_str_radix(digits, 8).map_err(|_| error(invalid_digits(next, 3)))?
            };
            Ok((Escape::Code(value), after))
        }
        'd' => Ok((Escape::Set(digit_class()), next)),
        'D' => Ok((Escape::Set(digit_class().inverse_within(domain)), next)),
        's' => Ok((Escape::Set(space_class()), next)),
        'S' => Ok((Escape::Set(space_class().inverse_within(domain)), next)),
        'w' => Ok((Escape::Set(word_class()), next)),
        'W' => Ok((Escape::Set(word_class().inverse_within(domain)), next)),
        'P' => {
            let (content, after) = braced(next).ok_or_else(|| error(SyntaxErrorKind::UnterminatedProperty))?;
            let escape = match content.split_once('=') {
                Some((name, value)) => Escape::Property {
                    name: name.trim(),
                    value: Some(value.trim()),
                },
                None => Escape::Property {
                    name: content.trim(),
                    value: None,
                },
            };
            Ok((escape, after))
        }
        'N' => {
            let (content, after) = braced(next).ok_or_else(|| error(SyntaxErrorKind::UnterminatedProperty))?;
            Ok((
                Escape::Property {
                    name: "na",
                    value: Some(content.trim()),
                },
                after,
            ))
        }
        c if META_CHARACTERS.contains(c) || c.is_whitespace() => Ok((Escape::Code(i64::from(u32::from(c))), next)),
        other => Err(error(SyntaxErrorKind::unknown_escape(format_compact!("\\{other}")))),
    }
}

/// Exactly `width` hex digits forming a valid code point.
fn hex_code_point(cur: Cursor<'_>, width: usize) -> Option<(Escape<'_>, Cursor<'_>)> {
    let (digits, after) = cur.take_up_to(width, |d| d.is_ascii_hexdigit());
    if digits.len() != width {
        return None;
    }
    let value = i64::from_str_radix(digits, 16).ok()?;
    (value <= MAX_CODE_POINT).then_some((Escape::Code(value), after))
}

fn invalid_digits(cur: Cursor<'_>, width: usize) -> SyntaxErrorKind {
    let (digits, _) = cur.take_up_to(width, |c| !c.is_whitespace());
    SyntaxErrorKind::invalid_code_point(CompactString::new(digits))
}

/// `{content}` with the cursor behind the closing brace.
fn braced(cur: Cursor<'_>) -> Option<(&str, Cursor<'_>)> {
    let inner = cur.eat('{')?;
    let (content, after) = inner.take_while(|c| c != '}');
    Some((content, after.eat('}')?))
}

#[must_use]
pub fn digit_class() -> NumberSet {
    NumberSet::from_interval(('0'..='9').into())
}

#[must_use]
pub fn space_class() -> NumberSet {
    NumberSet::from_codes([' ', '\t', '\n', '\u{0B}', '\u{0C}', '\r'].map(|c| i64::from(u32::from(c))))
}

#[must_use]
pub fn word_class() -> NumberSet {
    let mut set = NumberSet::from_interval(('a'..='z').into());
    set.add_interval(('A'..='Z').into());
    set.add_interval(('0'..='9').into());
    set.add_code(i64::from(u32::from('_')));
    set
}
