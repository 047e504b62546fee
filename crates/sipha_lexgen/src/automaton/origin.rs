use super::{MachineId, PatternId, StateCore, StateId};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Which pattern state contributed to a state of a combined machine, and
/// with which acceptance and context semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Origin {
    pub pattern_id: PatternId,
    pub source_state_id: StateId,
    pub is_acceptance: bool,
    pub store_input_position: bool,
    pub pre_context_id: Option<MachineId>,
    pub post_context_id: Option<MachineId>,
    pub begin_of_line: bool,
    pub backward_detector_id: Option<MachineId>,
}

impl Origin {
    /// Snapshot of `core` as contributed by `pattern_id`'s state `source_state_id`.
    #[must_use]
    pub const fn from_core(pattern_id: PatternId, source_state_id: StateId, core: &StateCore) -> Self {
        Self {
            pattern_id,
            source_state_id,
            is_acceptance: core.acceptance,
            store_input_position: core.store_input_position,
            pre_context_id: core.pre_context_id,
            post_context_id: core.post_context_id,
            begin_of_line: core.begin_of_line,
            backward_detector_id: core.backward_detector_id,
        }
    }

    /// Acceptance that depends on neither a pre-context nor begin-of-line.
    #[must_use]
    pub const fn is_unconditional_acceptance(&self) -> bool {
        self.is_acceptance && self.pre_context_id.is_none() && !self.begin_of_line
    }

    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        self.pre_context_id.is_some() || self.begin_of_line
    }
}

impl Ord for Origin {
    /// Acceptance first, then lower (higher priority) pattern ids.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .is_acceptance
            .cmp(&self.is_acceptance)
            .then_with(|| self.pattern_id.cmp(&other.pattern_id))
            .then_with(|| self.source_state_id.cmp(&other.source_state_id))
            .then_with(|| other.store_input_position.cmp(&self.store_input_position))
            .then_with(|| self.pre_context_id.cmp(&other.pre_context_id))
            .then_with(|| self.post_context_id.cmp(&other.post_context_id))
            .then_with(|| self.begin_of_line.cmp(&other.begin_of_line))
            .then_with(|| self.backward_detector_id.cmp(&other.backward_detector_id))
    }
}

impl PartialOrd for Origin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sorted, duplicate-free list of origins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct OriginList {
    origins: SmallVec<[Origin; 2]>,
}

impl OriginList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, origin: Origin) {
        if let Err(pos) = self.origins.binary_search(&origin) {
            self.origins.insert(pos, origin);
        }
    }

    pub fn merge(&mut self, other: &Self) {
        for origin in &other.origins {
            self.add(origin.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Origin> + '_ {
        self.origins.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Origin] {
        &self.origins
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn clear(&mut self) {
        self.origins.clear();
    }

    /// The origin that decides the action when this state is the last
    /// acceptance reached and every condition holds.
    #[must_use]
    pub fn dominant(&self) -> Option<&Origin> {
        self.origins.iter().find(|o| o.is_acceptance)
    }

    /// Sorted, distinct pattern ids of the accepting origins.
    #[must_use]
    pub fn acceptance_pattern_ids(&self) -> SmallVec<[PatternId; 4]> {
        let mut ids: SmallVec<[PatternId; 4]> = self
            .origins
            .iter()
            .filter(|o| o.is_acceptance)
            .map(|o| o.pattern_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Sorted, distinct pattern ids of the origins that store the input position.
    #[must_use]
    pub fn position_storing_pattern_ids(&self) -> SmallVec<[PatternId; 4]> {
        let mut ids: SmallVec<[PatternId; 4]> = self
            .origins
            .iter()
            .filter(|o| o.store_input_position)
            .map(|o| o.pattern_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Drop origins that can never decide a match at runtime.
    ///
    /// Accepting origins are kept up to and including the first unconditional
    /// one; every later accepting origin loses against it. Non-accepting origins
    /// survive only if they store the input position for a post-context.
    pub fn filter_dominated(&mut self) {
        let mut unconditional_found = false;
        self.origins.retain(|origin| {
            if origin.is_acceptance {
                if unconditional_found {
                    return false;
                }
                if origin.is_unconditional_acceptance() {
                    unconditional_found = true;
                }
                true
            } else {
                origin.store_input_position
            }
        });
    }
}

impl FromIterator<Origin> for OriginList {
    fn from_iter<I: IntoIterator<Item = Origin>>(iter: I) -> Self {
        let mut list = Self::new();
        for origin in iter {
            list.add(origin);
        }
        list
    }
}
