//! # Testing Utilities
//!
//! Helpers for testing compiled patterns and recognizers.
//!
//! ## Simulation
//!
//! [`Simulator`] runs a [`Recognizer`](crate::Recognizer) on input the way a
//! generated lexer would, so tests can check behavior instead of automaton
//! shapes. The `*_accepts*` and `dfa_run*` functions do the same for single
//! machines.
//!
//! ## Random Patterns
//!
//! [`RegexGenerator`] produces small patterns and inputs for property-based
//! tests and fuzzing.

pub mod assertions;
pub mod generators;
pub mod simulate;

pub use assertions::*;
pub use generators::*;
pub use simulate::*;
