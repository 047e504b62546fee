use super::{MachineId, Origin, PatternId, State, StateId, Trigger};
use crate::context::CompilationContext;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// A finite automaton over integer codes.
///
/// States live in an id-keyed map; transitions refer to states by id only.
/// Besides the states, a machine carries the context machinery attached to
/// it: the inverted pre-context, the post-context id and the backward
/// detector for ambiguous post-contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct StateMachine {
    id: MachineId,
    init_state_id: StateId,
    states: BTreeMap<StateId, State>,
    pre_context: Option<Box<StateMachine>>,
    post_context_id: Option<MachineId>,
    backward_detector: Option<Box<StateMachine>>,
}

impl StateMachine {
    /// A machine with a single, non-accepting initial state. Matches nothing.
    #[must_use]
    pub fn new(ctx: &mut CompilationContext) -> Self {
        let id = ctx.new_machine_id();
        let init = ctx.new_state_id();
        Self::with_init_state(id, State::new(init, false))
    }

    /// A machine whose initial state is `init`.
    #[must_use]
    pub fn with_init_state(id: MachineId, init: State) -> Self {
        let init_state_id = init.id();
        let mut states = BTreeMap::new();
        states.insert(init_state_id, init);
        Self {
            id,
            init_state_id,
            states,
            pre_context: None,
            post_context_id: None,
            backward_detector: None,
        }
    }

    /// A machine that matches only the empty string.
    #[must_use]
    pub fn empty_match(ctx: &mut CompilationContext) -> Self {
        let mut sm = Self::new(ctx);
        let init = sm.init_state_id;
        sm.state_mut(init).set_acceptance(true);
        sm
    }

    /// `init --trigger--> acceptance`
    #[must_use]
    pub fn from_trigger(ctx: &mut CompilationContext, trigger: impl Into<Trigger>) -> Self {
        let mut sm = Self::new(ctx);
        let target = sm.create_state(ctx, true);
        sm.add_transition(sm.init_state_id, trigger, target);
        sm
    }

    /// A chain of transitions matching exactly `codes`.
    #[must_use]
    pub fn from_codes(ctx: &mut CompilationContext, codes: &[i64]) -> Self {
        let mut sm = Self::new(ctx);
        let mut current = sm.init_state_id;
        for &code in codes {
            let next = sm.create_state(ctx, false);
            sm.add_transition(current, code, next);
            current = next;
        }
        sm.state_mut(current).set_acceptance(true);
        sm
    }

    /// A chain of transitions matching exactly `text`.
    #[must_use]
    pub fn from_str_sequence(ctx: &mut CompilationContext, text: &str) -> Self {
        let codes: SmallVec<[i64; 16]> = text.chars().map(|c| i64::from(u32::from(c))).collect();
        Self::from_codes(ctx, &codes)
    }

    #[must_use]
    pub const fn id(&self) -> MachineId {
        self.id
    }

    #[must_use]
    pub const fn init_state_id(&self) -> StateId {
        self.init_state_id
    }

    #[must_use]
    pub fn init_state(&self) -> &State {
        self.state(self.init_state_id)
    }

    /// # Panics
    ///
    /// Panics if `id` is not a state of this machine.
    #[must_use]
    pub fn state(&self, id: StateId) -> &State {
        self.states
            .get(&id)
            .unwrap_or_else(|| panic!("state {id} not in {}", self.id))
    }

    /// # Panics
    ///
    /// Panics if `id` is not a state of this machine.
    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        let machine = self.id;
        self.states
            .get_mut(&id)
            .unwrap_or_else(|| panic!("state {id} not in {machine}"))
    }

    #[must_use]
    pub fn get_state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    #[must_use]
    pub fn contains_state(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    /// States in ascending id order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.values()
    }

    pub fn states_mut(&mut self) -> impl Iterator<Item = &mut State> + '_ {
        self.states.values_mut()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn create_state(&mut self, ctx: &mut CompilationContext, acceptance: bool) -> StateId {
        let id = ctx.new_state_id();
        self.states.insert(id, State::new(id, acceptance));
        id
    }

    /// Insert a fully built state. Its id must be fresh for this machine.
    pub(crate) fn insert_state(&mut self, state: State) {
        let id = state.id();
        let previous = self.states.insert(id, state);
        assert!(previous.is_none(), "state {id} inserted twice into {}", self.id);
    }

    pub fn add_transition(&mut self, from: StateId, trigger: impl Into<Trigger>, to: StateId) {
        self.state_mut(from).transitions_mut().add(trigger, to);
    }

    pub fn add_epsilon_transition(&mut self, from: StateId, to: StateId) {
        self.state_mut(from).transitions_mut().add_epsilon(to);
    }

    /// Move every state of `other` into this machine. Returns the id of
    /// `other`'s initial state. Machine-level context data of `other` is dropped.
    pub(crate) fn absorb(&mut self, other: Self) -> StateId {
        let init = other.init_state_id;
        for (_, state) in other.states {
            self.insert_state(state);
        }
        init
    }

    #[must_use]
    pub fn acceptance_state_ids(&self) -> Vec<StateId> {
        self.states
            .values()
            .filter(|s| s.is_acceptance())
            .map(State::id)
            .collect()
    }

    #[must_use]
    pub fn has_acceptance_states(&self) -> bool {
        self.states.values().any(State::is_acceptance)
    }

    /// All states reachable from `start` through epsilon transitions,
    /// `start` included. Sorted ascending.
    #[must_use]
    pub fn epsilon_closure(&self, start: &[StateId]) -> SmallVec<[StateId; 8]> {
        let mut closure: HashSet<StateId, ahash::RandomState> =
            HashSet::with_hasher(ahash::RandomState::new());
        let mut stack: Vec<StateId> = Vec::with_capacity(start.len());
        for &id in start {
            if closure.insert(id) {
                stack.push(id);
            }
        }

        while let Some(id) = stack.pop() {
            for &next in self.state(id).transitions().epsilon_targets() {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }

        let mut result: SmallVec<[StateId; 8]> = closure.into_iter().collect();
        result.sort_unstable();
        result
    }

    /// True if the machine accepts the empty string.
    #[must_use]
    pub fn accepts_empty(&self) -> bool {
        self.epsilon_closure(&[self.init_state_id])
            .iter()
            .any(|id| self.state(*id).is_acceptance())
    }

    /// No epsilon transitions and disjoint triggers in every state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.states.values().all(|s| s.transitions().is_deterministic())
    }

    #[must_use]
    pub fn has_origins(&self) -> bool {
        self.states.values().any(|s| !s.origins().is_empty())
    }

    /// States reachable from the initial state.
    #[must_use]
    pub fn reachable_state_ids(&self) -> HashSet<StateId, ahash::RandomState> {
        let mut reached: HashSet<StateId, ahash::RandomState> =
            HashSet::with_hasher(ahash::RandomState::new());
        let mut stack = vec![self.init_state_id];
        reached.insert(self.init_state_id);
        while let Some(id) = stack.pop() {
            let transitions = self.state(id).transitions();
            let targets = transitions
                .iter()
                .map(|(target, _)| target)
                .chain(transitions.epsilon_targets().iter().copied());
            for target in targets {
                if reached.insert(target) {
                    stack.push(target);
                }
            }
        }
        reached
    }

    /// States that cannot be reached from the initial state.
    #[must_use]
    pub fn orphaned_state_ids(&self) -> Vec<StateId> {
        let reached = self.reachable_state_ids();
        self.states
            .keys()
            .filter(|id| !reached.contains(*id))
            .copied()
            .collect()
    }

    /// Remove unreachable states. Returns the number removed.
    pub fn delete_orphaned_states(&mut self) -> usize {
        let orphans = self.orphaned_state_ids();
        for id in &orphans {
            self.states.remove(id);
        }
        orphans.len()
    }

    /// Copy of this machine under a fresh machine id with fresh state ids.
    ///
    /// Origins, context flags and the attached pre-context and backward
    /// detector are kept; the post-context id is renamed along with the
    /// machine if it referred to this machine.
    #[must_use]
    pub fn clone_with_new_ids(&self, ctx: &mut CompilationContext) -> Self {
        let id = ctx.new_machine_id();
        let mut copy = self.clone_with_new_state_ids(ctx);
        copy.id = id;
        for state in copy.states.values_mut() {
            if state.core().post_context_id == Some(self.id) {
                state.core_mut().post_context_id = Some(id);
            }
        }
        if copy.post_context_id == Some(self.id) {
            copy.post_context_id = Some(id);
        }
        copy
    }

    /// Copy of this machine with fresh state ids. The machine id and
    /// everything referring to it stay as they are.
    #[must_use]
    pub fn clone_with_new_state_ids(&self, ctx: &mut CompilationContext) -> Self {
        let mut map: HashMap<StateId, StateId, ahash::RandomState> =
            HashMap::with_capacity_and_hasher(self.states.len(), ahash::RandomState::new());
        for &old in self.states.keys() {
            map.insert(old, ctx.new_state_id());
        }

        let mut states = BTreeMap::new();
        for (old, state) in &self.states {
            let new_id = map[old];
            let mut copy = State::with_info(new_id, state.core().clone(), state.origins().clone());
            copy.set_transitions(state.transitions().relabeled(&map));
            states.insert(new_id, copy);
        }

        Self {
            id: self.id,
            init_state_id: map[&self.init_state_id],
            states,
            pre_context: self.pre_context.clone(),
            post_context_id: self.post_context_id,
            backward_detector: self.backward_detector.clone(),
        }
    }

    /// Epsilon-link every acceptance state to `target`. With
    /// `cancel_acceptance`, the linked states stop being acceptance states.
    pub fn mount_to_acceptance_states(&mut self, target: StateId, cancel_acceptance: bool) {
        for id in self.acceptance_state_ids() {
            if id == target {
                continue;
            }
            let state = self.state_mut(id);
            state.transitions_mut().add_epsilon(target);
            if cancel_acceptance {
                state.set_acceptance(false);
            }
        }
    }

    /// Replace every state's origins by a single origin naming `pattern_id`
    /// and the state itself.
    pub fn mark_state_origins(&mut self, pattern_id: PatternId) {
        for state in self.states.values_mut() {
            let origin = Origin::from_core(pattern_id, state.id(), state.core());
            let origins = state.origins_mut();
            origins.clear();
            origins.add(origin);
        }
    }

    /// Remove `code` from every transition; states that became unreachable
    /// are deleted. Returns true if any transition contained `code`.
    pub fn cut_code(&mut self, code: i64) -> bool {
        let mut changed = false;
        for state in self.states.values_mut() {
            changed |= state.transitions_mut().cut_code(code);
        }
        if changed {
            self.delete_orphaned_states();
        }
        changed
    }

    /// Drop every outgoing transition of acceptance states: once reached,
    /// nothing behind them matters.
    pub fn prune_after_acceptance(&mut self) {
        for state in self.states.values_mut() {
            if state.is_acceptance() {
                state.transitions_mut().clear();
            }
        }
        self.delete_orphaned_states();
    }

    /// Check the structural invariants.
    ///
    /// # Panics
    ///
    /// Panics if the initial state is missing, if a transition targets a
    /// state outside the machine, or if there are orphaned states.
    pub fn assert_consistency(&self) {
        assert!(
            self.states.contains_key(&self.init_state_id),
            "{}: init state {} missing",
            self.id,
            self.init_state_id
        );
        for state in self.states.values() {
            let transitions = state.transitions();
            for (target, set) in transitions.iter() {
                assert!(
                    self.states.contains_key(&target),
                    "{}: state {} targets missing state {target}",
                    self.id,
                    state.id()
                );
                assert!(!set.is_empty(), "{}: empty trigger in state {}", self.id, state.id());
            }
            for target in transitions.epsilon_targets() {
                assert!(
                    self.states.contains_key(target),
                    "{}: state {} has epsilon to missing state {target}",
                    self.id,
                    state.id()
                );
            }
        }
        let orphans = self.orphaned_state_ids();
        assert!(orphans.is_empty(), "{}: orphaned states {orphans:?}", self.id);
    }

    #[must_use]
    pub fn pre_context(&self) -> Option<&Self> {
        self.pre_context.as_deref()
    }

    pub fn set_pre_context(&mut self, pre_context: Option<Self>) {
        self.pre_context = pre_context.map(Box::new);
    }

    #[must_use]
    pub const fn post_context_id(&self) -> Option<MachineId> {
        self.post_context_id
    }

    pub const fn set_post_context_id(&mut self, id: Option<MachineId>) {
        self.post_context_id = id;
    }

    #[must_use]
    pub fn backward_detector(&self) -> Option<&Self> {
        self.backward_detector.as_deref()
    }

    pub fn set_backward_detector(&mut self, detector: Option<Self>) {
        self.backward_detector = detector.map(Box::new);
    }

    /// Copy machine-level context data (pre-context, post-context id,
    /// backward detector) from `other`.
    pub(crate) fn copy_context_from(&mut self, other: &Self) {
        self.pre_context.clone_from(&other.pre_context);
        self.post_context_id = other.post_context_id;
        self.backward_detector.clone_from(&other.backward_detector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::Interval;

    #[test]
    fn test_from_str_sequence() {
        let mut ctx = CompilationContext::default();
        let sm = StateMachine::from_str_sequence(&mut ctx, "abc");
        assert_eq!(sm.state_count(), 4);
        assert_eq!(sm.acceptance_state_ids().len(), 1);
        assert!(sm.is_deterministic());
        assert!(!sm.accepts_empty());
        sm.assert_consistency();
    }

    #[test]
    fn test_epsilon_closure_follows_chains() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::new(&mut ctx);
        let a = sm.create_state(&mut ctx, false);
        let b = sm.create_state(&mut ctx, true);
        let init = sm.init_state_id();
        sm.add_epsilon_transition(init, a);
        sm.add_epsilon_transition(a, b);
        sm.add_epsilon_transition(b, init);

        let closure = sm.epsilon_closure(&[init]);
        assert_eq!(closure.as_slice(), &[init, a, b]);
        assert!(sm.accepts_empty());
        assert!(!sm.is_deterministic());
    }

    #[test]
    fn test_orphans_detected_and_deleted() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::from_str_sequence(&mut ctx, "a");
        let orphan = sm.create_state(&mut ctx, true);
        assert_eq!(sm.orphaned_state_ids(), vec![orphan]);
        assert_eq!(sm.delete_orphaned_states(), 1);
        sm.assert_consistency();
    }

    #[test]
    #[should_panic(expected = "orphaned states")]
    fn test_assert_consistency_panics_on_orphans() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::from_str_sequence(&mut ctx, "a");
        sm.create_state(&mut ctx, false);
        sm.assert_consistency();
    }

    #[test]
    fn test_clone_with_new_ids_is_disjoint() {
        let mut ctx = CompilationContext::default();
        let sm = StateMachine::from_str_sequence(&mut ctx, "ab");
        let copy = sm.clone_with_new_ids(&mut ctx);
        assert_ne!(sm.id(), copy.id());
        assert_eq!(sm.state_count(), copy.state_count());
        for id in copy.state_ids() {
            assert!(!sm.contains_state(id));
        }
        copy.assert_consistency();
    }

    #[test]
    fn test_cut_code_removes_dead_branches() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::new(&mut ctx);
        let zero = sm.create_state(&mut ctx, true);
        let letter = sm.create_state(&mut ctx, true);
        let init = sm.init_state_id();
        sm.add_transition(init, 0i64, zero);
        sm.add_transition(init, Interval::from('a'..='z'), letter);

        assert!(sm.cut_code(0));
        assert!(!sm.contains_state(zero));
        assert!(sm.contains_state(letter));
        sm.assert_consistency();
    }

    #[test]
    fn test_mark_state_origins() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::from_str_sequence(&mut ctx, "ab");
        sm.mark_state_origins(PatternId(4));
        assert!(sm.has_origins());
        for state in sm.states() {
            assert_eq!(state.origins().len(), 1);
            let origin = &state.origins().as_slice()[0];
            assert_eq!(origin.pattern_id, PatternId(4));
            assert_eq!(origin.source_state_id, state.id());
            assert_eq!(origin.is_acceptance, state.is_acceptance());
        }
    }

    #[test]
    fn test_prune_after_acceptance() {
        let mut ctx = CompilationContext::default();
        let mut sm = StateMachine::from_str_sequence(&mut ctx, "ab");
        let first = sm
            .init_state()
            .transitions()
            .target_for('a' as i64)
            .unwrap();
        sm.state_mut(first).set_acceptance(true);
        sm.prune_after_acceptance();
        assert_eq!(sm.state_count(), 2);
        sm.assert_consistency();
    }
}
