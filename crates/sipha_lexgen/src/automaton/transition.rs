use super::StateId;
use crate::set::{Interval, NumberSet};
use hashbrown::HashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// What triggers a transition: a single interval or a whole set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Single(Interval),
    Set(NumberSet),
}

impl Trigger {
    #[must_use]
    pub fn into_set(self) -> NumberSet {
        match self {
            Self::Single(interval) => NumberSet::from_interval(interval),
            Self::Set(set) => set,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(interval) => interval.is_empty(),
            Self::Set(set) => set.is_empty(),
        }
    }
}

impl From<i64> for Trigger {
    fn from(code: i64) -> Self {
        Self::Single(Interval::single(code))
    }
}

impl From<char> for Trigger {
    fn from(c: char) -> Self {
        Self::from(i64::from(u32::from(c)))
    }
}

impl From<Interval> for Trigger {
    fn from(interval: Interval) -> Self {
        Self::Single(interval)
    }
}

impl From<NumberSet> for Trigger {
    fn from(set: NumberSet) -> Self {
        Self::Set(set)
    }
}

impl From<&NumberSet> for Trigger {
    fn from(set: &NumberSet) -> Self {
        Self::Set(set.clone())
    }
}

/// Outgoing edges of one state: target -> trigger set, plus epsilon targets.
///
/// In a deterministic machine the trigger sets of one map are pairwise
/// disjoint and there are no epsilon targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TransitionMap {
    targets: BTreeMap<StateId, NumberSet>,
    epsilon: SmallVec<[StateId; 2]>,
}

impl TransitionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `trigger -> target`, uniting with an existing edge to the same target.
    pub fn add(&mut self, trigger: impl Into<Trigger>, target: StateId) {
        let trigger = trigger.into();
        if trigger.is_empty() {
            return;
        }
        match self.targets.get_mut(&target) {
            Some(existing) => match trigger {
                Trigger::Single(interval) => existing.add_interval(interval),
                Trigger::Set(set) => existing.unite_with(&set),
            },
            None => {
                self.targets.insert(target, trigger.into_set());
            }
        }
    }

    pub fn add_epsilon(&mut self, target: StateId) {
        if !self.epsilon.contains(&target) {
            self.epsilon.push(target);
        }
    }

    /// Targets with their trigger sets, ordered by target id.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &NumberSet)> + '_ {
        self.targets.iter().map(|(id, set)| (*id, set))
    }

    #[must_use]
    pub fn epsilon_targets(&self) -> &[StateId] {
        &self.epsilon
    }

    #[must_use]
    pub fn get(&self, target: StateId) -> Option<&NumberSet> {
        self.targets.get(&target)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// No character transitions and no epsilon transitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.epsilon.is_empty()
    }

    /// The target reached on `code`. Meaningful for deterministic maps.
    #[must_use]
    pub fn target_for(&self, code: i64) -> Option<StateId> {
        self.targets
            .iter()
            .find_map(|(id, set)| set.contains(code).then_some(*id))
    }

    /// Every target reached on `code`.
    pub fn targets_for(&self, code: i64) -> impl Iterator<Item = StateId> + '_ {
        self.targets
            .iter()
            .filter(move |(_, set)| set.contains(code))
            .map(|(id, _)| *id)
    }

    /// Union of all trigger sets.
    #[must_use]
    pub fn trigger_union(&self) -> NumberSet {
        self.targets
            .values()
            .fold(NumberSet::new(), |acc, set| acc.union(set))
    }

    /// Codes on which the state has no transition.
    #[must_use]
    pub fn drop_out_set(&self) -> NumberSet {
        self.trigger_union().inverse()
    }

    /// True when there are no epsilon edges and the trigger sets are disjoint.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        if !self.epsilon.is_empty() {
            return false;
        }
        let sets: SmallVec<[&NumberSet; 8]> = self.targets.values().collect();
        for (i, a) in sets.iter().enumerate() {
            if sets[i + 1..].iter().any(|b| a.has_intersection(b)) {
                return false;
            }
        }
        true
    }

    /// Remove `set` from the edge to `target`; the edge disappears when empty.
    pub fn subtract(&mut self, target: StateId, set: &NumberSet) {
        if let Some(existing) = self.targets.get_mut(&target) {
            existing.subtract(set);
            if existing.is_empty() {
                self.targets.remove(&target);
            }
        }
    }

    /// Remove `code` from every edge. Returns true if anything was cut.
    pub fn cut_code(&mut self, code: i64) -> bool {
        let mut changed = false;
        for set in self.targets.values_mut() {
            if set.contains(code) {
                set.cut_code(code);
                changed = true;
            }
        }
        self.targets.retain(|_, set| !set.is_empty());
        changed
    }

    pub fn clear(&mut self) {
        self.targets.clear();
        self.epsilon.clear();
    }

    pub fn remove_target(&mut self, target: StateId) {
        self.targets.remove(&target);
        self.epsilon.retain(|id| *id != target);
    }

    /// Rename every target through `map`. Targets missing from `map` are kept.
    #[must_use]
    pub fn relabeled(&self, map: &HashMap<StateId, StateId, ahash::RandomState>) -> Self {
        let mut result = Self::new();
        for (target, set) in &self.targets {
            let new_target = map.get(target).copied().unwrap_or(*target);
            result.add(set, new_target);
        }
        for target in &self.epsilon {
            result.add_epsilon(map.get(target).copied().unwrap_or(*target));
        }
        result
    }

    /// Let every code without a transition go to the target of the nearest
    /// interval below it (or above it, before the first interval).
    ///
    /// Used where drop-out is known to be impossible: afterwards the state
    /// triggers on every code and needs no range check for the gaps.
    pub fn fill_drop_out_with_adjacent_targets(&mut self) {
        let mut pieces: Vec<(Interval, StateId)> = self
            .targets
            .iter()
            .flat_map(|(target, set)| set.intervals().iter().map(move |iv| (*iv, *target)))
            .collect();
        if pieces.is_empty() {
            return;
        }
        pieces.sort_unstable_by_key(|(iv, _)| iv.begin);

        let mut fills: Vec<(Interval, StateId)> = Vec::new();
        let (first, first_target) = pieces[0];
        if first.begin > Interval::MIN {
            fills.push((Interval::new(Interval::MIN, first.begin), first_target));
        }
        for pair in pieces.windows(2) {
            let (lower, lower_target) = pair[0];
            let (upper, _) = pair[1];
            if lower.end < upper.begin {
                fills.push((Interval::new(lower.end, upper.begin), lower_target));
            }
        }
        if let Some(&(last, last_target)) = pieces.last()
            && last.end < Interval::MAX
        {
            fills.push((Interval::new(last.end, Interval::MAX), last_target));
        }
        for (interval, target) in fills {
            self.add(interval, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_unites_same_target() {
        let mut map = TransitionMap::new();
        map.add('a', StateId(1));
        map.add('b', StateId(1));
        map.add('x', StateId(2));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(StateId(1)).map(NumberSet::len), Some(2));
        assert_eq!(map.target_for('b' as i64), Some(StateId(1)));
        assert_eq!(map.target_for('c' as i64), None);
    }

    #[test]
    fn test_deterministic_detection() {
        let mut map = TransitionMap::new();
        map.add(Interval::from('a'..='m'), StateId(1));
        map.add(Interval::from('n'..='z'), StateId(2));
        assert!(map.is_deterministic());
        map.add('c', StateId(3));
        assert!(!map.is_deterministic());

        let mut eps = TransitionMap::new();
        eps.add_epsilon(StateId(4));
        assert!(!eps.is_deterministic());
    }

    #[test]
    fn test_cut_code_removes_empty_edges() {
        let mut map = TransitionMap::new();
        map.add(0i64, StateId(1));
        map.add(Interval::new(0, 10), StateId(2));
        assert!(map.cut_code(0));
        assert_eq!(map.len(), 1);
        assert!(!map.cut_code(0));
    }

    #[test]
    fn test_fill_drop_out() {
        let mut map = TransitionMap::new();
        map.add('b', StateId(1));
        map.add('x', StateId(2));
        map.fill_drop_out_with_adjacent_targets();
        assert!(map.drop_out_set().is_empty());
        assert_eq!(map.target_for('a' as i64), Some(StateId(1)));
        assert_eq!(map.target_for('c' as i64), Some(StateId(1)));
        assert_eq!(map.target_for('y' as i64), Some(StateId(2)));
        assert!(map.is_deterministic());
    }
}
