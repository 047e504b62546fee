use crate::combine::{PatternActionInfo, Recognizer, combine};
use crate::config::CompileConfig;
use crate::context::CompilationContext;
use crate::error::{CompileMetrics, CompileWarning, Result};
use crate::regex::{Definitions, NoProperties, PatternCompiler, PropertyLookup};
use compact_str::CompactString;
use smallvec::SmallVec;

/// Collects definitions and patterns of one lexical mode and compiles them
/// in a single run.
///
/// Patterns added with [`pattern`](Self::pattern) rank in insertion order;
/// [`inherited_pattern`](Self::inherited_pattern) places a pattern on an
/// explicit inheritance level, lower levels winning.
pub struct RecognizerBuilder<A> {
    config: CompileConfig,
    definitions: SmallVec<[(CompactString, CompactString); 8]>,
    rules: SmallVec<[Rule<A>; 16]>,
    properties: Option<Box<dyn PropertyLookup>>,
}

struct Rule<A> {
    pattern: CompactString,
    action: A,
    priority: (u32, u32),
}

/// Result of [`RecognizerBuilder::build`]
#[derive(Debug)]
pub struct CompiledMode<A> {
    pub recognizer: Recognizer<A>,
    pub warnings: Vec<CompileWarning>,
    pub metrics: CompileMetrics,
}

impl<A> Default for RecognizerBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> RecognizerBuilder<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CompileConfig::default(),
            definitions: SmallVec::new(),
            rules: SmallVec::new(),
            properties: None,
        }
    }

    #[must_use]
    pub const fn config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    /// Register `{name}`. Definitions are compiled in the order given.
    #[must_use]
    pub fn define(mut self, name: &str, pattern: &str) -> Self {
        self.definitions
            .push((CompactString::new(name), CompactString::new(pattern)));
        self
    }

    #[must_use]
    pub fn pattern(self, pattern: &str, action: A) -> Self {
        self.inherited_pattern(0, pattern, action)
    }

    #[must_use]
    pub fn inherited_pattern(mut self, level: u32, pattern: &str, action: A) -> Self {
        let id = u32::try_from(self.rules.len()).unwrap_or(u32::MAX);
        self.rules.push(Rule {
            pattern: CompactString::new(pattern),
            action,
            priority: (level, id),
        });
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: impl PropertyLookup + 'static) -> Self {
        self.properties = Some(Box::new(properties));
        self
    }

    /// Compile every definition and pattern and combine the patterns.
    ///
    /// # Errors
    ///
    /// The first error of any definition or pattern, or
    /// [`CompileError::NoPatterns`](crate::CompileError::NoPatterns).
    pub fn build(self) -> Result<CompiledMode<A>> {
        let mut ctx = CompilationContext::new(self.config);
        let properties: &dyn PropertyLookup = self.properties.as_deref().unwrap_or(&NoProperties);

        let mut definitions = Definitions::new();
        for (name, pattern) in &self.definitions {
            definitions.define(&mut ctx, name, pattern, properties)?;
        }

        let compiler = PatternCompiler::new(&definitions, properties);
        let mut infos = Vec::with_capacity(self.rules.len());
        for rule in self.rules {
            let machine = compiler.compile(&mut ctx, &rule.pattern)?;
            infos.push(PatternActionInfo::new(&rule.pattern, machine, rule.action, rule.priority));
        }

        let recognizer = combine(&mut ctx, infos)?;
        Ok(CompiledMode {
            recognizer,
            warnings: ctx.take_warnings(),
            metrics: *ctx.metrics(),
        })
    }
}
