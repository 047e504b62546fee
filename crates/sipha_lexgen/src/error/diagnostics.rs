//! # Diagnostic Utilities
//!
//! Rendering of syntax errors against the pattern text they came from.

use crate::error::{CompileError, RegexSyntaxError};
use std::fmt::Write;

/// Render the error message, the pattern and a caret under the error position.
///
/// ```text
/// Unterminated character set at offset 2, near "[a-z"
///   ab[a-z
///     ^
/// ```
#[must_use]
pub fn format_with_context(pattern: &str, error: &RegexSyntaxError) -> String {
    let mut result = String::new();
    let _ = write!(result, "{error}");

    // Caret column counts characters, not bytes
    let position = error.position().min(pattern.len());
    let column = pattern
        .char_indices()
        .take_while(|(offset, _)| *offset < position)
        .count();
    let line: String = pattern
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    result.push_str("\n  ");
    result.push_str(&line);
    result.push_str("\n  ");
    result.push_str(&" ".repeat(column));
    result.push('^');
    result
}

/// Like [`format_with_context`] for any compile error; non-syntax errors are
/// rendered as their message only.
#[must_use]
pub fn format_compile_error(pattern: &str, error: &CompileError) -> String {
    match error.as_syntax() {
        Some(syntax) => format_with_context(pattern, syntax),
        None => error.to_string(),
    }
}
