use super::{MachineId, OriginList, StateId, TransitionMap};

/// Acceptance and context flags of a single state.
///
/// Inside a single-pattern machine these flags are authoritative. Once a
/// machine has been combined with others, the per-pattern truth lives in the
/// state's [`OriginList`] and the core only says whether *any* pattern accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct StateCore {
    pub acceptance: bool,
    /// Entering this state marks a possible end of the core pattern.
    pub store_input_position: bool,
    pub pre_context_id: Option<MachineId>,
    pub begin_of_line: bool,
    /// Acceptance is the end of a post-context; the match ends at the stored position.
    pub post_context_id: Option<MachineId>,
    /// Acceptance is the end of an ambiguous post-context; the end of the core
    /// is found by running this backward detector.
    pub backward_detector_id: Option<MachineId>,
}

impl StateCore {
    /// Fold another core into this one (subset construction, state merging).
    pub fn merge(&mut self, other: &Self) {
        self.acceptance |= other.acceptance;
        self.store_input_position |= other.store_input_position;
        self.begin_of_line |= other.begin_of_line;
        self.pre_context_id = self.pre_context_id.or(other.pre_context_id);
        self.post_context_id = self.post_context_id.or(other.post_context_id);
        self.backward_detector_id = self.backward_detector_id.or(other.backward_detector_id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct State {
    id: StateId,
    core: StateCore,
    transitions: TransitionMap,
    origins: OriginList,
}

impl State {
    #[must_use]
    pub fn new(id: StateId, acceptance: bool) -> Self {
        Self {
            id,
            core: StateCore {
                acceptance,
                ..StateCore::default()
            },
            transitions: TransitionMap::new(),
            origins: OriginList::new(),
        }
    }

    /// A state with the given core and origins, but no transitions.
    #[must_use]
    pub fn with_info(id: StateId, core: StateCore, origins: OriginList) -> Self {
        Self {
            id,
            core,
            transitions: TransitionMap::new(),
            origins,
        }
    }

    #[must_use]
    pub const fn id(&self) -> StateId {
        self.id
    }

    #[must_use]
    pub const fn is_acceptance(&self) -> bool {
        self.core.acceptance
    }

    pub const fn set_acceptance(&mut self, acceptance: bool) {
        self.core.acceptance = acceptance;
    }

    #[must_use]
    pub const fn core(&self) -> &StateCore {
        &self.core
    }

    pub const fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    #[must_use]
    pub const fn transitions(&self) -> &TransitionMap {
        &self.transitions
    }

    pub const fn transitions_mut(&mut self) -> &mut TransitionMap {
        &mut self.transitions
    }

    pub(crate) fn set_transitions(&mut self, transitions: TransitionMap) {
        self.transitions = transitions;
    }

    #[must_use]
    pub const fn origins(&self) -> &OriginList {
        &self.origins
    }

    pub const fn origins_mut(&mut self) -> &mut OriginList {
        &mut self.origins
    }

    /// Merge the core metadata and origins of `other` into this state.
    /// Transitions are not touched.
    pub fn merge(&mut self, other: &Self) {
        self.core.merge(&other.core);
        self.origins.merge(&other.origins);
    }
}
