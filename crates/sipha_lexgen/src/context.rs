//! # Compilation Context
//!
//! State shared by every construction step of one compilation run: the
//! configuration, the id allocators, the warning sink and the metrics.
//!
//! State ids are allocated monotonically and are never reused while the
//! context lives, so states of independently built machines can be merged
//! into one map without renaming. Dropping the context ends the run.

use crate::automaton::{MachineId, StateId};
use crate::config::CompileConfig;
use crate::error::{CompileMetrics, CompileWarning, WarningKind};
use compact_str::CompactString;

#[derive(Debug, Default)]
pub struct CompilationContext {
    config: CompileConfig,
    next_state_id: u32,
    next_machine_id: u32,
    current_pattern: Option<CompactString>,
    warnings: Vec<CompileWarning>,
    metrics: CompileMetrics,
}

impl CompilationContext {
    #[must_use]
    pub fn new(config: CompileConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Allocate a fresh state id.
    ///
    /// # Panics
    ///
    /// Panics when more than `u32::MAX` states are allocated in one run.
    pub fn new_state_id(&mut self) -> StateId {
        let id = StateId(self.next_state_id);
        self.next_state_id = self
            .next_state_id
            .checked_add(1)
            .unwrap_or_else(|| panic!("state id space exhausted"));
        self.metrics.states_created += 1;
        id
    }

    /// Allocate a fresh machine id.
    ///
    /// # Panics
    ///
    /// Panics when more than `u32::MAX` machines are allocated in one run.
    pub fn new_machine_id(&mut self) -> MachineId {
        let id = MachineId(self.next_machine_id);
        self.next_machine_id = self
            .next_machine_id
            .checked_add(1)
            .unwrap_or_else(|| panic!("machine id space exhausted"));
        self.metrics.machines_created += 1;
        id
    }

    /// Attribute subsequent warnings to `pattern` (or to nothing).
    pub fn set_current_pattern(&mut self, pattern: Option<&str>) {
        self.current_pattern = pattern.map(CompactString::new);
    }

    #[must_use]
    pub fn current_pattern(&self) -> Option<&str> {
        self.current_pattern.as_deref()
    }

    /// Record a warning-level diagnostic for the current pattern.
    pub fn warn(&mut self, kind: WarningKind) {
        let warning = CompileWarning::warning(self.current_pattern.clone(), kind);
        self.warnings.push(warning);
    }

    /// Record an info-level diagnostic for the current pattern.
    pub fn info(&mut self, kind: WarningKind) {
        let warning = CompileWarning::info(self.current_pattern.clone(), kind);
        self.warnings.push(warning);
    }

    pub fn push_warning(&mut self, warning: CompileWarning) {
        self.warnings.push(warning);
    }

    #[must_use]
    pub fn warnings(&self) -> &[CompileWarning] {
        &self.warnings
    }

    /// Drain the warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<CompileWarning> {
        std::mem::take(&mut self.warnings)
    }

    #[must_use]
    pub const fn metrics(&self) -> &CompileMetrics {
        &self.metrics
    }

    pub(crate) const fn metrics_mut(&mut self) -> &mut CompileMetrics {
        &mut self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ctx = CompilationContext::default();
        let a = ctx.new_state_id();
        let b = ctx.new_state_id();
        assert!(a < b);
        let m = ctx.new_machine_id();
        let n = ctx.new_machine_id();
        assert!(m < n);
        assert_eq!(ctx.metrics().states_created, 2);
        assert_eq!(ctx.metrics().machines_created, 2);
    }

    #[test]
    fn test_warnings_attributed_to_current_pattern() {
        let mut ctx = CompilationContext::default();
        ctx.set_current_pattern(Some("a/b?"));
        ctx.warn(WarningKind::PostContextMatchesEmpty);
        ctx.set_current_pattern(None);
        ctx.warn(WarningKind::PhilosophicalCut);

        let warnings = ctx.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].pattern.as_deref(), Some("a/b?"));
        assert_eq!(warnings[1].pattern, None);
        assert!(ctx.warnings().is_empty());
    }
}
