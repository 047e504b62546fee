//! # Error Types
//!
//! Errors and warnings produced while compiling patterns into automata.
//!
//! ## Overview
//!
//! - [`RegexSyntaxError`]: malformed pattern text, with the byte offset and the
//!   offending excerpt. Parsing stops at the first one.
//! - [`CompileError`]: everything that aborts the compilation of a pattern or of
//!   a whole pattern set.
//! - [`CompileWarning`]: recoverable issues. Compilation proceeds with a
//!   downgraded or heuristic result and the warning is recorded in the
//!   [`CompilationContext`](crate::CompilationContext).
//!
//! Broken internal invariants (orphaned states after an algorithm step, an
//! accepting initial state in a pattern automaton) are bugs in this crate, not
//! in the input, and panic instead of returning an error.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich error reporting.

pub mod diagnostics;

use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Longest excerpt of pattern text carried by a syntax error.
pub const MAX_EXCERPT_CHARS: usize = 32;

/// Malformed pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("{kind} at offset {position}, near \"{excerpt}\"")]
pub struct RegexSyntaxError {
    /// Byte offset into the pattern text
    pub position: usize,
    /// Pattern text from `position` on, truncated
    pub excerpt: CompactString,
    #[source]
    pub kind: SyntaxErrorKind,
}

impl RegexSyntaxError {
    #[must_use]
    pub fn new(pattern: &str, position: usize, kind: SyntaxErrorKind) -> Self {
        let position = position.min(pattern.len());
        let excerpt = pattern
            .get(position..)
            .unwrap_or_default()
            .chars()
            .take(MAX_EXCERPT_CHARS)
            .collect();
        Self {
            position,
            excerpt,
            kind,
        }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }
}

/// Types of pattern syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum SyntaxErrorKind {
    #[error("Unterminated character set")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unterminated_set)))]
    UnterminatedCharacterSet,

    #[error("Unterminated string")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unterminated_string)))]
    UnterminatedString,

    #[error("Unterminated property expression")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unterminated_property)))]
    UnterminatedProperty,

    #[error("Missing closing ')'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unterminated_group)))]
    UnterminatedGroup,

    #[error("Unterminated repetition range")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unterminated_repetition)))]
    UnterminatedRepetition,

    #[error("Unterminated definition reference")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unterminated_reference)))]
    UnterminatedReference,

    #[error("Unterminated set expression, expected ':]'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unterminated_set_expression)))]
    UnterminatedSetExpression,

    #[error("Invalid repetition range {{{min},{max}}}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::invalid_repetition)))]
    InvalidRepetitionRange { min: u32, max: u32 },

    #[error("Repetition count {count} exceeds the limit of {limit}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::repetition_too_large)))]
    RepetitionTooLarge { count: CompactString, limit: u32 },

    #[error("Repetition would expand to about {estimate} states, the limit is {limit}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::pattern_too_large)))]
    PatternTooLarge { estimate: usize, limit: usize },

    #[error("Invalid character range {first}-{last}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::invalid_range)))]
    InvalidCharacterRange { first: i64, last: i64 },

    #[error("Unknown escape sequence: {escape}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unknown_escape)))]
    UnknownEscape { escape: CompactString },

    #[error("Invalid code point: {digits}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::invalid_code_point)))]
    InvalidCodePoint { digits: CompactString },

    #[error("Missing operand")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::missing_operand)))]
    MissingOperand,

    #[error("Unexpected character: '{found}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unexpected_char)))]
    UnexpectedCharacter { found: char },

    #[error("Empty pattern")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::empty_pattern)))]
    EmptyPattern,

    #[error("Character set is empty")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::empty_set)))]
    EmptyCharacterSet,

    #[error("Unknown set operation: {name}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::unknown_set_operation)))]
    UnknownSetOperation { name: CompactString },

    #[error("Trailing input after pattern")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::trailing_input)))]
    TrailingInput,

    #[error("Conflicting contexts: {reason}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(regex::context_conflict)))]
    ContextConflict { reason: CompactString },
}

impl SyntaxErrorKind {
    #[must_use]
    pub const fn unexpected_character(found: char) -> Self {
        Self::UnexpectedCharacter { found }
    }

    #[must_use]
    pub const fn unknown_escape(escape: CompactString) -> Self {
        Self::UnknownEscape { escape }
    }

    #[must_use]
    pub const fn invalid_code_point(digits: CompactString) -> Self {
        Self::InvalidCodePoint { digits }
    }

    #[must_use]
    pub fn context_conflict(reason: &str) -> Self {
        Self::ContextConflict {
            reason: CompactString::new(reason),
        }
    }
}

/// Failed property lookup (`\P{...}`, `\N{...}`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("Property lookup failed for {name}{}: {reason}", .value.as_ref().map(|v| format!("={v}")).unwrap_or_default())]
pub struct PropertyError {
    pub name: CompactString,
    pub value: Option<CompactString>,
    pub reason: CompactString,
}

impl PropertyError {
    #[must_use]
    pub fn new(name: &str, value: Option<&str>, reason: &str) -> Self {
        Self {
            name: CompactString::new(name),
            value: value.map(CompactString::new),
            reason: CompactString::new(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum CompileError {
    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Syntax(#[from] RegexSyntaxError),

    #[error("Pattern '{pattern}' matches the empty string")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(compile::empty_match)))]
    EmptyMatch { pattern: CompactString },

    #[error("Unknown definition '{name}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(compile::unknown_definition)))]
    UnknownDefinition { name: CompactString },

    #[error("Definition '{name}' must not contain pre- or post-contexts")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(compile::definition_with_context)))]
    DefinitionWithContext { name: CompactString },

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(compile::property)))]
    Property(#[from] PropertyError),

    #[error("Post context of '{pattern}' is ambiguous in both directions")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(compile::ambiguous_post_context),
            help("enable `allow_philosophical_cut` or rewrite the post context")
        )
    )]
    AmbiguousPostContext { pattern: CompactString },

    #[error("No patterns to combine")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(compile::no_patterns)))]
    NoPatterns,
}

impl CompileError {
    #[must_use]
    pub fn empty_match(pattern: &str) -> Self {
        Self::EmptyMatch {
            pattern: CompactString::new(pattern),
        }
    }

    #[must_use]
    pub fn unknown_definition(name: &str) -> Self {
        Self::UnknownDefinition {
            name: CompactString::new(name),
        }
    }

    /// The syntax error, if this is one.
    #[must_use]
    pub const fn as_syntax(&self) -> Option<&RegexSyntaxError> {
        match self {
            Self::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Recoverable issue found while compiling a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CompileWarning {
    /// Text of the pattern being compiled, if any
    pub pattern: Option<CompactString>,
    pub kind: WarningKind,
    pub severity: Severity,
}

impl CompileWarning {
    #[must_use]
    pub const fn new(pattern: Option<CompactString>, kind: WarningKind, severity: Severity) -> Self {
        Self {
            pattern,
            kind,
            severity,
        }
    }

    #[must_use]
    pub const fn warning(pattern: Option<CompactString>, kind: WarningKind) -> Self {
        Self::new(pattern, kind, Severity::Warning)
    }

    #[must_use]
    pub const fn info(pattern: Option<CompactString>, kind: WarningKind) -> Self {
        Self::new(pattern, kind, Severity::Info)
    }
}

impl std::fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        };
        match &self.pattern {
            Some(pattern) => write!(f, "{label}: {} (in '{pattern}')", self.kind),
            None => write!(f, "{label}: {}", self.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum WarningKind {
    #[error("post context requires philosophical cut, handle with care")]
    PhilosophicalCut,

    #[error("post context matches the empty string and is ignored")]
    PostContextMatchesEmpty,

    #[error("pre context matches the empty string and is ignored")]
    PreContextMatchesEmpty,

    #[error("buffer limit code {code:#x} removed from pattern")]
    BufferLimitCodeExcluded { code: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Severity {
    Warning,
    Info,
    Hint,
}

/// Counters collected over one compilation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompileMetrics {
    pub states_created: usize,
    pub machines_created: usize,
    pub determinizations: usize,
    pub minimizations: usize,
    pub philosophical_cuts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_excerpt_truncated() {
        let pattern = format!("ab[{}", "x".repeat(100));
        let err = RegexSyntaxError::new(&pattern, 2, SyntaxErrorKind::UnterminatedCharacterSet);
        assert_eq!(err.position(), 2);
        assert_eq!(err.excerpt.chars().count(), MAX_EXCERPT_CHARS);
        assert!(err.excerpt.starts_with("[x"));
    }

    #[test]
    fn test_syntax_error_display() {
        let err = RegexSyntaxError::new("a{3,1}", 1, SyntaxErrorKind::InvalidRepetitionRange { min: 3, max: 1 });
        let text = err.to_string();
        assert!(text.contains("{3,1}"));
        assert!(text.contains("offset 1"));
    }

    #[test]
    fn test_position_clamped_to_pattern() {
        let err = RegexSyntaxError::new("abc", 10, SyntaxErrorKind::EmptyPattern);
        assert_eq!(err.position(), 3);
        assert!(err.excerpt.is_empty());
    }

    #[test]
    fn test_compile_error_from_syntax() {
        let err: CompileError = RegexSyntaxError::new("(", 1, SyntaxErrorKind::UnterminatedGroup).into();
        assert!(err.as_syntax().is_some());
        assert!(CompileError::NoPatterns.as_syntax().is_none());
    }

    #[test]
    fn test_property_error_display() {
        let err = PropertyError::new("GC", Some("Lu"), "unknown");
        assert_eq!(err.to_string(), "Property lookup failed for GC=Lu: unknown");
        let err = PropertyError::new("Greek", None, "unknown");
        assert_eq!(err.to_string(), "Property lookup failed for Greek: unknown");
    }

    #[test]
    fn test_warning_display() {
        let warning = CompileWarning::warning(Some("x+/x+".into()), WarningKind::PhilosophicalCut);
        let text = warning.to_string();
        assert!(text.starts_with("warning:"));
        assert!(text.contains("x+/x+"));
    }
}
