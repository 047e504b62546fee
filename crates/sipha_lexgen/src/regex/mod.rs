//! # Pattern Compiler
//!
//! Turns the text of one pattern into a state machine ready for
//! combination.
//!
//! ## Syntax
//!
//! | Form | Meaning |
//! |------|---------|
//! | `ab`, `a\|b`, `(a)` | sequence, alternative, grouping |
//! | `a*`, `a+`, `a?`, `a{m}`, `a{m,}`, `a{m,n}` | repetition |
//! | `"text"` | literal string, escapes allowed |
//! | `[a-z]`, `[^...]` | character set, negated within the character domain |
//! | `[: union(...) :]` | set expression: `union`, `intersection`, `difference`, `inverse`, POSIX class names |
//! | `.` | any code in the domain but newline |
//! | `\n`, `\x41`, `\X00e9`, `\U01F600`, `\0101` | code escapes |
//! | `\d`, `\s`, `\w` and upper-case complements | ASCII classes |
//! | `\P{name=value}`, `\P{value}`, `\N{name}` | property lookups |
//! | `{name}` | reference to a definition |
//! | `^core`, `core$` | begin / end of line |
//! | `pre/core/`, `core/post`, `pre/core/post` | pre- and post-context |
//!
//! Unescaped whitespace ends the pattern.
//!
//! ## Pipeline
//!
//! Parse into NFAs, cut the buffer limit code, determinize and minimize
//! the core, reject a core that matches the empty string, then attach the
//! post-context (or `$`) and finally the pre-context (or `^`).

mod charset;
pub mod cursor;
pub mod definitions;
pub mod escape;
mod parser;
pub mod properties;

pub use charset::Atom;
pub use cursor::Cursor;
pub use definitions::Definitions;
pub use escape::Escape;
pub use parser::ParsedPattern;
pub use properties::{NoProperties, PropertyLookup, PropertyTable};

#[cfg(feature = "unicode")]
pub use properties::IdentProperties;

use crate::automaton::StateMachine;
use crate::context::CompilationContext;
use crate::contexts::{attach_post_context, attach_pre_context, end_of_line_machine, mark_begin_of_line};
use crate::determinize::beautify;
use crate::error::{CompileError, Result, WarningKind};
use parser::Parser;

/// Compiles patterns against a set of definitions and a property source.
#[derive(Clone, Copy)]
pub struct PatternCompiler<'a> {
    definitions: &'a Definitions,
    properties: &'a dyn PropertyLookup,
}

impl std::fmt::Debug for PatternCompiler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCompiler")
            .field("definitions", &self.definitions.len())
            .finish_non_exhaustive()
    }
}

impl<'a> PatternCompiler<'a> {
    #[must_use]
    pub const fn new(definitions: &'a Definitions, properties: &'a dyn PropertyLookup) -> Self {
        Self {
            definitions,
            properties,
        }
    }

    /// Parse `text` without any post-processing.
    ///
    /// # Errors
    ///
    /// Syntax errors, unknown definitions and failed property lookups.
    pub fn parse(&self, ctx: &mut CompilationContext, text: &str) -> Result<ParsedPattern> {
        Parser::new(ctx, text, self.definitions, self.properties).parse_pattern()
    }

    /// Compile `text` into a DFA with its context machinery attached.
    ///
    /// Warnings raised on the way are attributed to `text`.
    ///
    /// # Errors
    ///
    /// Everything [`parse`](Self::parse) reports, plus
    /// [`CompileError::EmptyMatch`] when the core matches the empty string
    /// and [`CompileError::AmbiguousPostContext`] when the philosophical cut
    /// is disabled but needed.
    pub fn compile(&self, ctx: &mut CompilationContext, text: &str) -> Result<StateMachine> {
        ctx.set_current_pattern(Some(text));
        let result = self.compile_parts(ctx, text);
        ctx.set_current_pattern(None);
        result
    }

    fn compile_parts(&self, ctx: &mut CompilationContext, text: &str) -> Result<StateMachine> {
        let ParsedPattern {
            pre_context,
            mut core,
            post_context,
            begin_of_line,
            end_of_line,
        } = self.parse(ctx, text)?;

        exclude_buffer_limit(ctx, &mut core);
        let core = beautify(ctx, &core);
        if core.accepts_empty() {
            return Err(CompileError::empty_match(text));
        }

        let post_context = match post_context {
            Some(mut post) => {
                exclude_buffer_limit(ctx, &mut post);
                Some(post)
            }
            None if end_of_line => Some(end_of_line_machine(ctx)),
            None => None,
        };
        let mut machine = match post_context {
            Some(post) => attach_post_context(ctx, core, &post)?,
            None => core,
        };

        match pre_context {
            Some(mut pre) => {
                exclude_buffer_limit(ctx, &mut pre);
                machine = attach_pre_context(ctx, machine, &pre, begin_of_line);
            }
            None if begin_of_line => mark_begin_of_line(&mut machine),
            None => {}
        }

        assert!(
            !machine.init_state().is_acceptance(),
            "{}: init state accepts",
            machine.id()
        );
        Ok(machine)
    }
}

/// Compile `text` without definitions or properties.
///
/// # Errors
///
/// See [`PatternCompiler::compile`].
pub fn compile(ctx: &mut CompilationContext, text: &str) -> Result<StateMachine> {
    let definitions = Definitions::new();
    PatternCompiler::new(&definitions, &NoProperties).compile(ctx, text)
}

/// Remove the buffer limit code from every transition of `sm`.
pub(crate) fn exclude_buffer_limit(ctx: &mut CompilationContext, sm: &mut StateMachine) {
    if let Some(code) = ctx.config().buffer_limit_code
        && sm.cut_code(code)
    {
        ctx.info(WarningKind::BufferLimitCodeExcluded { code });
    }
}
