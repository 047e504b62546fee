use super::Interval;
use smallvec::SmallVec;
use std::fmt;

/// Set of input codes as a sorted list of disjoint, non-touching intervals.
///
/// Every mutating operation re-establishes the canonical form, so two sets
/// holding the same codes always compare (and hash) equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct NumberSet {
    intervals: SmallVec<[Interval; 4]>,
}

impl NumberSet {
    /// The empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The set holding every code on the number line.
    #[must_use]
    pub fn all() -> Self {
        Self::from_interval(Interval::all())
    }

    #[must_use]
    pub fn from_interval(interval: Interval) -> Self {
        let mut set = Self::new();
        set.add_interval(interval);
        set
    }

    #[must_use]
    pub fn from_code(code: i64) -> Self {
        Self::from_interval(Interval::single(code))
    }

    /// Build from arbitrary (unsorted, overlapping) intervals.
    #[must_use]
    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let mut set = Self {
            intervals: intervals.into_iter().collect(),
        };
        set.clean();
        set
    }

    /// Build from single codes, e.g. the characters of a string.
    #[must_use]
    pub fn from_codes(codes: impl IntoIterator<Item = i64>) -> Self {
        Self::from_intervals(codes.into_iter().map(Interval::single))
    }

    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.intervals.len() == 1 && self.intervals[0] == Interval::all()
    }

    #[must_use]
    pub fn contains(&self, code: i64) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.end <= code);
        self.intervals.get(idx).is_some_and(|iv| iv.contains(code))
    }

    /// Smallest code in the set.
    #[must_use]
    pub fn minimum(&self) -> Option<i64> {
        self.intervals.first().map(|iv| iv.begin)
    }

    /// Number of codes, saturating.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.intervals
            .iter()
            .fold(0u64, |acc, iv| acc.saturating_add(iv.len()))
    }

    /// Insert `interval`, coalescing with every interval it overlaps or touches.
    pub fn add_interval(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }
        let start = self.intervals.partition_point(|iv| iv.end < interval.begin);
        let mut end = start;
        let mut merged = interval;
        while end < self.intervals.len() && self.intervals[end].begin <= merged.end {
            merged.begin = merged.begin.min(self.intervals[end].begin);
            merged.end = merged.end.max(self.intervals[end].end);
            end += 1;
        }
        self.intervals.drain(start..end);
        self.intervals.insert(start, merged);
    }

    pub fn add_code(&mut self, code: i64) {
        self.add_interval(Interval::single(code));
    }

    /// Remove every code of `interval`.
    pub fn cut_interval(&mut self, interval: Interval) {
        if interval.is_empty() || !self.intervals.iter().any(|iv| iv.overlaps(&interval)) {
            return;
        }
        let mut result: SmallVec<[Interval; 4]> = SmallVec::with_capacity(self.intervals.len() + 1);
        for iv in &self.intervals {
            if !iv.overlaps(&interval) {
                result.push(*iv);
                continue;
            }
            let left = Interval::new(iv.begin, interval.begin);
            if !left.is_empty() {
                result.push(left);
            }
            let right = Interval::new(interval.end, iv.end);
            if !right.is_empty() {
                result.push(right);
            }
        }
        self.intervals = result;
    }

    pub fn cut_code(&mut self, code: i64) {
        self.cut_interval(Interval::single(code));
    }

    /// Re-establish the canonical form after bulk insertion.
    pub fn clean(&mut self) {
        self.intervals.retain(|iv| !iv.is_empty());
        if self.intervals.len() < 2 {
            return;
        }
        self.intervals.sort_unstable();
        let mut result: SmallVec<[Interval; 4]> = SmallVec::with_capacity(self.intervals.len());
        for iv in self.intervals.drain(..) {
            match result.last_mut() {
                Some(last) if last.end >= iv.begin => last.end = last.end.max(iv.end),
                _ => result.push(iv),
            }
        }
        self.intervals = result;
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = Self {
            intervals: self
                .intervals
                .iter()
                .chain(other.intervals.iter())
                .copied()
                .collect(),
        };
        result.clean();
        result
    }

    pub fn unite_with(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.intervals.clone_from(&other.intervals);
            return;
        }
        *self = self.union(other);
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = Self::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = self.intervals[i];
            let b = other.intervals[j];
            let common = a.intersection(&b);
            if !common.is_empty() {
                result.intervals.push(common);
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        result
    }

    pub fn intersect_with(&mut self, other: &Self) {
        *self = self.intersection(other);
    }

    #[must_use]
    pub fn has_intersection(&self, other: &Self) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = self.intervals[i];
            let b = other.intervals[j];
            if a.overlaps(&b) {
                return true;
            }
            if a.end < b.end {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        self.intersection(&other.inverse())
    }

    pub fn subtract(&mut self, other: &Self) {
        *self = self.difference(other);
    }

    /// Complement within `[-inf, +inf)`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut result = Self::new();
        let mut previous_end = Interval::MIN;
        for iv in &self.intervals {
            if iv.begin > previous_end {
                result.intervals.push(Interval::new(previous_end, iv.begin));
            }
            previous_end = iv.end;
        }
        if previous_end < Interval::MAX {
            result.intervals.push(Interval::new(previous_end, Interval::MAX));
        }
        result
    }

    /// Complement within `domain` only.
    #[must_use]
    pub fn inverse_within(&self, domain: Interval) -> Self {
        self.inverse().intersection(&Self::from_interval(domain))
    }

    #[must_use]
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.difference(self).is_empty()
    }

    /// Iterate over every single code. Only sensible for bounded sets.
    pub fn codes(&self) -> impl Iterator<Item = i64> + '_ {
        self.intervals.iter().flat_map(|iv| iv.begin..iv.end)
    }
}

impl From<Interval> for NumberSet {
    fn from(interval: Interval) -> Self {
        Self::from_interval(interval)
    }
}

impl FromIterator<Interval> for NumberSet {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self::from_intervals(iter)
    }
}

impl fmt::Display for NumberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.intervals.is_empty() {
            return f.write_str("<empty>");
        }
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{iv}")?;
        }
        Ok(())
    }
}
