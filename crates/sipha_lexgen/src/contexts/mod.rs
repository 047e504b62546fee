//! # Context Attachment
//!
//! Pre-contexts (`pre/core/`), post-contexts (`core/post`) and the trivial
//! begin/end-of-line conditions (`^core`, `core$`).
//!
//! Neither context is consumed by a match. A pre-context is verified by
//! running its inverted machine backwards from the match start; a
//! post-context is matched forward and the match end is then reset to the
//! end of the core, either from a stored position or, for post-contexts
//! where that position is ambiguous, by a backward detector.

pub mod ambiguity;
pub mod line;
pub mod post;
pub mod pre;

pub use ambiguity::{detect_backward, detect_forward, philosophical_cut};
pub use line::{begin_of_line_trigger, end_of_line_machine, mark_begin_of_line};
pub use post::{attach_post_context, backward_detector};
pub use pre::attach_pre_context;
