//! # Automaton Data Model
//!
//! States, transition maps, origins and state machines.
//!
//! ## Overview
//!
//! - [`StateMachine`] owns its [`State`]s in an id-keyed map. Nothing holds a
//!   reference to another state or machine; all cross references are ids.
//! - [`TransitionMap`] maps target states to the [`NumberSet`](crate::set::NumberSet)
//!   that triggers them, plus epsilon targets (NFAs only).
//! - [`Origin`]s record which pattern state contributed to a state of a
//!   combined machine. Their order is the match priority.
//!
//! State and machine ids come from the
//! [`CompilationContext`](crate::CompilationContext) and never collide
//! within one compilation run.

mod display;
pub mod ids;
pub mod machine;
pub mod origin;
pub mod state;
pub mod transition;

pub use ids::{MachineId, PatternId, StateId};
pub use machine::StateMachine;
pub use origin::{Origin, OriginList};
pub use state::{State, StateCore};
pub use transition::{TransitionMap, Trigger};

/// Direction and purpose a machine is run with by the generated lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum LexingMode {
    /// The main recognizer, reading ahead
    Forward,
    /// Pre-context check, reading backwards from the match start
    Backward,
    /// End-of-core search for ambiguous post-contexts, reading backwards
    /// from the match end
    BackwardPositionDetect,
}
