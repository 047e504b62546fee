use std::fmt;

/// Identifier of a state.
///
/// Allocated by [`CompilationContext`](crate::CompilationContext) and unique for
/// the whole compilation run, so states of independently built machines can be
/// merged into one map without renaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct StateId(pub u32);

/// Identifier of a state machine, unique per compilation run.
///
/// Post-context, pre-context and backward-detector references are machine ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct MachineId(pub u32);

/// Dense index of a pattern inside one combined recognizer.
///
/// Lower ids have higher priority: the driver assigns them in the order of
/// `(inheritance_level, pattern_id)` before combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct PatternId(pub u32);

impl PatternId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sm{}", self.0)
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}
