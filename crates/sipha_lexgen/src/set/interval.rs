use std::fmt;

/// Half-open range `[begin, end)` over input codes.
///
/// `begin == end` denotes the empty interval. The full line `[MIN, MAX)` stands
/// in for `[-inf, +inf)`, which is what [`NumberSet::inverse`] complements in.
///
/// [`NumberSet::inverse`]: super::NumberSet::inverse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Interval {
    pub begin: i64,
    pub end: i64,
}

impl Interval {
    /// Stand-in for minus infinity.
    pub const MIN: i64 = i64::MIN;
    /// Stand-in for plus infinity (exclusive).
    pub const MAX: i64 = i64::MAX;

    /// Create `[begin, end)`. An inverted range is normalized to empty.
    #[must_use]
    pub const fn new(begin: i64, end: i64) -> Self {
        if end < begin {
            Self { begin, end: begin }
        } else {
            Self { begin, end }
        }
    }

    /// The interval holding exactly `code`.
    #[must_use]
    pub const fn single(code: i64) -> Self {
        Self {
            begin: code,
            end: code + 1,
        }
    }

    /// `[first, last]`, both ends included.
    #[must_use]
    pub const fn inclusive(first: i64, last: i64) -> Self {
        Self::new(first, last + 1)
    }

    /// The whole number line.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            begin: Self::MIN,
            end: Self::MAX,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    #[must_use]
    pub const fn contains(&self, code: i64) -> bool {
        self.begin <= code && code < self.end
    }

    /// Number of codes covered, saturating for unbounded intervals.
    #[must_use]
    pub const fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.end.abs_diff(self.begin)
        }
    }

    /// True when both share at least one code.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// True when the two could be coalesced into a single interval
    /// (overlapping or directly adjacent).
    #[must_use]
    pub const fn touches(&self, other: &Self) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }

    /// Common part, possibly empty.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self::new(self.begin.max(other.begin), self.end.min(other.end))
    }
}

impl From<std::ops::Range<i64>> for Interval {
    fn from(range: std::ops::Range<i64>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<std::ops::RangeInclusive<char>> for Interval {
    fn from(range: std::ops::RangeInclusive<char>) -> Self {
        Self::inclusive(i64::from(u32::from(*range.start())), i64::from(u32::from(*range.end())))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("[]");
        }
        let last = self.end - 1;
        if self.begin == last {
            write_code(f, self.begin)
        } else {
            f.write_str("[")?;
            write_code(f, self.begin)?;
            f.write_str(", ")?;
            write_code(f, last)?;
            f.write_str("]")
        }
    }
}

/// Render a single code the way transition dumps show it.
pub(crate) fn write_code(f: &mut fmt::Formatter<'_>, code: i64) -> fmt::Result {
    match code {
        Interval::MIN => f.write_str("-oo"),
        c if c == Interval::MAX - 1 => f.write_str("oo"),
        super::EOF_CODE => f.write_str("EOF"),
        super::BOF_CODE => f.write_str("BOF"),
        c => match u32::try_from(c).ok().and_then(char::from_u32) {
            Some(ch) if ch.is_ascii_graphic() => write!(f, "'{ch}'"),
            _ => write!(f, "{c:#x}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_empty() {
        assert!(Interval::new(5, 5).is_empty());
        assert!(Interval::new(7, 3).is_empty());
        assert!(!Interval::single(3).is_empty());
    }

    #[test]
    fn test_interval_touches_adjacent() {
        let a = Interval::new(0, 5);
        let b = Interval::new(5, 9);
        assert!(a.touches(&b));
        assert!(!a.overlaps(&b));
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn test_interval_from_char_range() {
        let iv = Interval::from('a'..='c');
        assert_eq!(iv, Interval::new(97, 100));
        assert_eq!(iv.len(), 3);
    }

    #[test]
    fn test_interval_display() {
        assert_eq!(Interval::single('x' as i64).to_string(), "'x'");
        assert_eq!(Interval::from('a'..='z').to_string(), "['a', 'z']");
        assert_eq!(Interval::single(super::super::EOF_CODE).to_string(), "EOF");
    }
}
