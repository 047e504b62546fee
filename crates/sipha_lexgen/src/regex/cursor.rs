/// Read position in a pattern.
///
/// A cursor is `Copy`; parse functions take one by value and hand back the
/// advanced copy, so backtracking is just keeping the old value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte offset into the pattern
    #[must_use]
    pub const fn position(self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn text(self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn rest(self) -> &'a str {
        &self.text[self.pos..]
    }

    #[must_use]
    pub fn is_at_end(self) -> bool {
        self.pos >= self.text.len()
    }

    #[must_use]
    pub fn peek(self) -> Option<char> {
        self.rest().chars().next()
    }

    #[must_use]
    pub fn peek_second(self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    #[must_use]
    pub fn starts_with(self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// The next character and the cursor behind it.
    #[must_use]
    pub fn bump(self) -> Option<(char, Self)> {
        let c = self.peek()?;
        Some((
            c,
            Self {
                text: self.text,
                pos: self.pos + c.len_utf8(),
            },
        ))
    }

    /// Skip one character; stays put at the end.
    #[must_use]
    pub fn advance(self) -> Self {
        self.bump().map_or(self, |(_, next)| next)
    }

    /// The cursor behind `c` if `c` comes next.
    #[must_use]
    pub fn eat(self, c: char) -> Option<Self> {
        match self.bump() {
            Some((found, next)) if found == c => Some(next),
            _ => None,
        }
    }

    #[must_use]
    pub fn eat_str(self, prefix: &str) -> Option<Self> {
        self.starts_with(prefix).then(|| Self {
            text: self.text,
            pos: self.pos + prefix.len(),
        })
    }

    #[must_use]
    pub fn skip_whitespace(self) -> Self {
        self.take_while(char::is_whitespace).1
    }

    /// The longest prefix whose characters satisfy `pred`, and the cursor
    /// behind it.
    #[must_use]
    pub fn take_while(self, pred: impl Fn(char) -> bool) -> (&'a str, Self) {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        (
            &rest[..len],
            Self {
                text: self.text,
                pos: self.pos + len,
            },
        )
    }

    /// At most `max` characters satisfying `pred`.
    #[must_use]
    pub fn take_up_to(self, max: usize, pred: impl Fn(char) -> bool) -> (&'a str, Self) {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .take(max)
            .take_while(|&(_, c)| pred(c))
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        (
            &rest[..len],
            Self {
                text: self.text,
                pos: self.pos + len,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_navigation() {
        let cur = Cursor::new("aé b");
        assert_eq!(cur.peek(), Some('a'));
        assert_eq!(cur.peek_second(), Some('é'));
        let cur = cur.advance().advance();
        assert_eq!(cur.position(), 3);
        assert_eq!(cur.peek(), Some(' '));
        let cur = cur.skip_whitespace();
        assert_eq!(cur.rest(), "b");
        assert!(cur.advance().is_at_end());
        assert!(cur.advance().advance().is_at_end());
    }

    #[test]
    fn test_take_helpers() {
        let cur = Cursor::new("12345x");
        let (digits, rest) = cur.take_while(|c| c.is_ascii_digit());
        assert_eq!(digits, "12345");
        assert_eq!(rest.peek(), Some('x'));

        let (two, rest) = cur.take_up_to(2, |c| c.is_ascii_digit());
        assert_eq!(two, "12");
        assert_eq!(rest.position(), 2);

        let (none, _) = Cursor::new("x1").take_up_to(3, |c| c.is_ascii_digit());
        assert_eq!(none, "");
    }

    #[test]
    fn test_eat() {
        let cur = Cursor::new("[:x:]");
        assert!(cur.eat('(').is_none());
        assert_eq!(cur.eat_str("[:").map(Cursor::rest), Some("x:]"));
    }
}
