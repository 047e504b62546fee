//! # Sipha Lexgen
//!
//! The automaton core of a lexical analyzer generator: compiles regular
//! expressions into deterministic, minimal state machines and combines the
//! patterns of a lexical mode into the automata a longest-match lexer is
//! generated from.
//!
//! ## Overview
//!
//! - **Code sets**: interval arithmetic over Unicode code points and the
//!   special begin/end-of-stream codes
//! - **Pattern compiler**: a regex dialect with definitions, property
//!   lookups, set expressions and line anchors
//! - **Contexts**: pre-contexts (`pre/core/`) and post-contexts
//!   (`core/post`) that condition a match without becoming part of it,
//!   including post-contexts whose end-of-core position is ambiguous
//! - **Determinization and minimization** that keep track of which pattern
//!   every state belongs to
//! - **Combination** of all patterns of a mode, with priority resolution
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sipha_lexgen::RecognizerBuilder;
//! use sipha_lexgen::testing::Simulator;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind { Number, Ident, Space }
//!
//! let mode = RecognizerBuilder::new()
//!     .define("digit", "[0-9]")
//!     .pattern("{digit}+", Kind::Number)
//!     .pattern("[a-z]+", Kind::Ident)
//!     .pattern("[ ]+", Kind::Space)
//!     .build()?;
//!
//! for warning in &mode.warnings {
//!     eprintln!("{warning}");
//! }
//!
//! // The forward DFA, the combined pre-context DFA and the backward
//! // detectors, each tagged with the direction it runs in.
//! for (mode_of_use, machine) in mode.recognizer.automata() {
//!     println!("{mode_of_use:?}\n{machine}");
//! }
//!
//! let tokens = Simulator::new(&mode.recognizer).tokenize_str("abc 42");
//! ```
//!
//! ## Lower-level use
//!
//! Every construction step takes a [`CompilationContext`], which owns the
//! configuration, allocates state and machine ids and collects warnings:
//!
//! ```rust,ignore
//! use sipha_lexgen::{CompilationContext, PatternActionInfo, combine, regex};
//!
//! let mut ctx = CompilationContext::default();
//! let keyword = regex::compile(&mut ctx, "if")?;
//! let ident = regex::compile(&mut ctx, "[a-z]+/[ (]")?;
//! let recognizer = combine(&mut ctx, vec![
//!     PatternActionInfo::new("if", keyword, "KEYWORD", (0, 0)),
//!     PatternActionInfo::new("[a-z]+/[ (]", ident, "IDENT", (0, 1)),
//! ])?;
//! ```
//!
//! ## Modules
//!
//! - [`set`] - Intervals and code sets
//! - [`automaton`] - States, transitions, origins and machines
//! - [`regex`] - Pattern parsing and compilation
//! - [`ops`] - Sequence, union, repetition and inversion
//! - [`contexts`] - Pre-/post-contexts and line anchors
//! - [`determinize`] - Subset construction
//! - [`minimize`] - Origin-aware minimization
//! - [`combine`] - Combination of the patterns of a mode
//! - [`error`] - Errors, warnings and diagnostics
//! - [`testing`] - Simulation and generators for tests

pub mod automaton;
pub mod builder;
pub mod combine;
pub mod config;
pub mod context;
pub mod contexts;
pub mod determinize;
pub mod error;
pub mod minimize;
pub mod ops;
pub mod regex;
pub mod set;
pub mod testing;

// Re-export commonly used types
pub use automaton::{
    LexingMode, MachineId, Origin, OriginList, PatternId, State, StateCore, StateId, StateMachine,
    TransitionMap,
};
pub use builder::{CompiledMode, RecognizerBuilder};
pub use combine::{CompiledPattern, PatternActionInfo, Recognizer, combine};
pub use config::CompileConfig;
pub use context::CompilationContext;
pub use error::{
    CompileError, CompileMetrics, CompileWarning, PropertyError, RegexSyntaxError, Result, Severity,
    SyntaxErrorKind, WarningKind,
};
pub use regex::{Definitions, NoProperties, PatternCompiler, PropertyLookup, PropertyTable};
pub use set::{BOF_CODE, EOF_CODE, Interval, NumberSet};

#[cfg(feature = "unicode")]
pub use regex::IdentProperties;
