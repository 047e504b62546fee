//! # Code Sets
//!
//! Interval arithmetic over input codes. A [`NumberSet`] labels every
//! transition of every automaton and is also how character classes and
//! Unicode property values are represented.
//!
//! Two codes outside the character domain have special meaning:
//!
//! - [`EOF_CODE`]: the end of the input stream, used by the `$` context.
//! - [`BOF_CODE`]: the begin of the input stream, used when `^` is combined
//!   with an explicit pre-context that is walked backwards.

pub mod interval;
pub mod number_set;

pub use interval::Interval;
pub use number_set::NumberSet;

/// Pseudo code for "end of stream".
pub const EOF_CODE: i64 = -1;

/// Pseudo code for "begin of stream".
pub const BOF_CODE: i64 = -2;

/// Unicode code points `[0, 0x110000)`.
pub const UNICODE_DOMAIN: Interval = Interval {
    begin: 0,
    end: 0x11_0000,
};
