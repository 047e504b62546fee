//! # Structural Combinators
//!
//! Concatenation, union, repetition and inversion of state machines. All of
//! them produce NFAs (with epsilon transitions); run
//! [`beautify`](crate::determinize::beautify) to get a minimal DFA back.
//!
//! The borrowing variants clone their inputs so the same machine can be used
//! in several places; the `_owned` variants move the states instead.

pub mod inverse;
pub mod parallel;
pub mod repeat;
pub mod sequence;

pub use inverse::invert;
pub use parallel::{parallelize, parallelize_branches, parallelize_owned};
pub use repeat::{kleene_closure, repeat};
pub use sequence::{sequentialize, sequentialize_owned};
