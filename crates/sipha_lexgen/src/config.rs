use crate::set::{Interval, UNICODE_DOMAIN};

/// Configuration for pattern compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// Code that is cut out of every transition (the buffer limit sentinel
    /// of the generated lexer). `None` disables the cut.
    pub buffer_limit_code: Option<i64>,

    /// `$` also accepts `\r\n`
    pub dos_carriage_return_newline: bool,

    /// Universe for `.`, negated character sets and `inverse(...)`
    pub character_domain: Interval,

    /// Resolve post contexts that are ambiguous in both directions with the
    /// philosophical cut (and a warning) instead of failing
    pub allow_philosophical_cut: bool,

    /// Largest count accepted in `{m}`, `{m,}` and `{m,n}`
    pub max_repetition: u32,

    /// Largest NFA a single repetition may expand to, in states
    pub max_states: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            buffer_limit_code: Some(0),
            dos_carriage_return_newline: false,
            character_domain: UNICODE_DOMAIN,
            allow_philosophical_cut: true,
            max_repetition: 1000,
            max_states: 100_000,
        }
    }
}

impl CompileConfig {
    #[must_use]
    pub const fn with_buffer_limit_code(mut self, code: Option<i64>) -> Self {
        self.buffer_limit_code = code;
        self
    }

    #[must_use]
    pub const fn with_dos_newlines(mut self, enabled: bool) -> Self {
        self.dos_carriage_return_newline = enabled;
        self
    }

    #[must_use]
    pub const fn with_character_domain(mut self, domain: Interval) -> Self {
        self.character_domain = domain;
        self
    }

    #[must_use]
    pub const fn with_philosophical_cut(mut self, allowed: bool) -> Self {
        self.allow_philosophical_cut = allowed;
        self
    }

    #[must_use]
    pub const fn with_max_repetition(mut self, limit: u32) -> Self {
        self.max_repetition = limit;
        self
    }

    #[must_use]
    pub const fn with_max_states(mut self, limit: usize) -> Self {
        self.max_states = limit;
        self
    }
}
