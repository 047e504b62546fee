use super::exclude_buffer_limit;
use super::parser::Parser;
use super::properties::PropertyLookup;
use crate::automaton::StateMachine;
use crate::context::CompilationContext;
use crate::determinize::beautify;
use crate::error::{CompileError, Result};
use compact_str::CompactString;
use hashbrown::HashMap;

/// Named sub-patterns, referenced as `{name}`.
///
/// Each definition is stored as a DFA without origins or contexts. A
/// reference expands to a copy with fresh ids, so one definition can be
/// used any number of times, also within the same pattern. Definitions may
/// match the empty string; only complete patterns may not.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    machines: HashMap<CompactString, StateMachine, ahash::RandomState>,
}

impl Definitions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and register it as `name`, replacing an earlier
    /// definition of that name. `pattern` may reference definitions made
    /// before.
    ///
    /// # Errors
    ///
    /// Syntax and property errors of `pattern`, and
    /// [`CompileError::DefinitionWithContext`] if it has a pre- or
    /// post-context or a line anchor.
    pub fn define(
        &mut self,
        ctx: &mut CompilationContext,
        name: &str,
        pattern: &str,
        properties: &dyn PropertyLookup,
    ) -> Result<()> {
        let parsed = Parser::new(ctx, pattern, self, properties).parse_pattern()?;
        if parsed.has_contexts() {
            return Err(CompileError::DefinitionWithContext {
                name: CompactString::new(name),
            });
        }
        let mut core = parsed.core;
        exclude_buffer_limit(ctx, &mut core);
        let machine = beautify(ctx, &core);
        self.machines.insert(CompactString::new(name), machine);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StateMachine> {
        self.machines.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.machines.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.machines.keys().map(CompactString::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::properties::NoProperties;
    use crate::testing::dfa_accepts_str;

    #[test]
    fn test_define_and_reference() {
        let mut ctx = CompilationContext::default();
        let mut definitions = Definitions::new();
        definitions.define(&mut ctx, "digit", "[0-9]", &NoProperties).unwrap();
        definitions
            .define(&mut ctx, "number", "{digit}+(\\.{digit}*)?", &NoProperties)
            .unwrap();
        assert_eq!(definitions.len(), 2);

        let number = definitions.get("number").unwrap();
        assert!(number.is_deterministic());
        assert!(dfa_accepts_str(number, "12.5"));
        assert!(dfa_accepts_str(number, "12."));
        assert!(!dfa_accepts_str(number, ".5"));
    }

    #[test]
    fn test_definition_may_match_empty() {
        let mut ctx = CompilationContext::default();
        let mut definitions = Definitions::new();
        definitions.define(&mut ctx, "ws", "[ \\t]*", &NoProperties).unwrap();
        assert!(definitions.get("ws").unwrap().accepts_empty());
    }

    #[test]
    fn test_definition_with_context_is_rejected() {
        let mut ctx = CompilationContext::default();
        let mut definitions = Definitions::new();
        let err = definitions.define(&mut ctx, "bad", "a/b", &NoProperties).unwrap_err();
        assert_eq!(err, CompileError::DefinitionWithContext { name: "bad".into() });
        let err = definitions.define(&mut ctx, "bad", "^a", &NoProperties).unwrap_err();
        assert_eq!(err, CompileError::DefinitionWithContext { name: "bad".into() });
        assert!(!definitions.contains("bad"));
    }
}
