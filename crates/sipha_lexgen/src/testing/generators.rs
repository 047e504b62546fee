//! # Random Pattern Generation
//!
//! Generators for small regular expressions and matching input, for
//! property-based tests and fuzzing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sipha_lexgen::testing::{GeneratorConfig, RegexGenerator};
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn minimize_is_idempotent(seed in any::<u64>()) {
//!         let pattern = RegexGenerator::new(GeneratorConfig::default().with_seed(seed)).generate();
//!         // compile, minimize twice, compare
//!     }
//! }
//! ```

/// Configuration for pattern generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum nesting depth of groups
    pub max_depth: usize,
    /// Maximum number of items in a sequence or alternation
    pub max_repetitions: usize,
    /// Probability of adding a postfix operator (0.0 to 1.0)
    pub optional_probability: f64,
    /// Characters patterns and inputs are built from
    pub alphabet: Vec<char>,
    /// Seed for reproducible generation
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_repetitions: 3,
            optional_probability: 0.3,
            alphabet: vec!['a', 'b', 'c'],
            seed: None,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_alphabet(mut self, alphabet: &[char]) -> Self {
        self.alphabet = alphabet.to_vec();
        self
    }
}

/// Generates pattern text over the configured alphabet.
///
/// Output uses sequences, `|`, groups, `*`, `+`, `?`, bounded repetition and
/// character sets. Generated patterns are syntactically valid but may match
/// the empty string.
#[derive(Debug, Clone)]
pub struct RegexGenerator {
    config: GeneratorConfig,
    rng: SimpleRng,
}

impl RegexGenerator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = config.seed.map_or_else(SimpleRng::new, SimpleRng::with_seed);
        Self { config, rng }
    }

    /// A fresh pattern
    pub fn generate(&mut self) -> String {
        let mut out = String::new();
        self.generate_alternation(0, &mut out);
        out
    }

    /// Random input of at most `max_len` characters from the alphabet.
    pub fn input(&mut self, max_len: usize) -> String {
        let len = self.below(max_len + 1);
        (0..len).map(|_| self.letter()).collect()
    }

    fn generate_alternation(&mut self, depth: usize, out: &mut String) {
        let branches = 1 + self.below(self.config.max_repetitions.max(1));
        for i in 0..branches {
            if i > 0 {
                out.push('|');
            }
            self.generate_sequence(depth, out);
        }
    }

    fn generate_sequence(&mut self, depth: usize, out: &mut String) {
        let items = 1 + self.below(self.config.max_repetitions.max(1));
        for _ in 0..items {
            self.generate_postfix(depth, out);
        }
    }

    fn generate_postfix(&mut self, depth: usize, out: &mut String) {
        self.generate_primary(depth, out);
        if self.rng.next_f64() >= self.config.optional_probability {
            return;
        }
        match self.below(5) {
            0 => out.push('*'),
            1 => out.push('+'),
            2 => out.push('?'),
            3 => {
                let min = self.below(3);
                out.push_str(&format!("{{{min}}}"));
            }
            _ => {
                let min = self.below(2);
                let max = min + 1 + self.below(2);
                out.push_str(&format!("{{{min},{max}}}"));
            }
        }
    }

    fn generate_primary(&mut self, depth: usize, out: &mut String) {
        let choice = if depth >= self.config.max_depth { 0 } else { self.below(4) };
        match choice {
            1 => {
                out.push('(');
                self.generate_alternation(depth + 1, out);
                out.push(')');
            }
            2 => {
                out.push('[');
                let count = 1 + self.below(self.config.alphabet.len().max(1));
                for _ in 0..count {
                    let c = self.letter();
                    out.push(c);
                }
                out.push(']');
            }
            _ => {
                let c = self.letter();
                out.push(c);
            }
        }
    }

    fn letter(&mut self) -> char {
        let alphabet = &self.config.alphabet;
        if alphabet.is_empty() {
            return 'a';
        }
        let index = self.rng.below(alphabet.len());
        alphabet[index]
    }

    fn below(&mut self, bound: usize) -> usize {
        self.rng.below(bound)
    }
}

/// Small deterministic XorShift generator
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleRng {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: 0x853c_49e6_748f_ea9b,
        }
    }

    /// A zero seed would make XorShift stick at zero and is replaced.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        if seed == 0 { Self::new() } else { Self { state: seed } }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    /// Uniform-ish value in `0..bound`; 0 for an empty range.
    pub fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;
    use crate::regex::PatternCompiler;
    use crate::regex::{Definitions, NoProperties};

    #[test]
    fn test_simple_rng() {
        let mut rng = SimpleRng::with_seed(12345);
        let v1 = rng.next_u64();
        let v2 = rng.next_u64();
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_rng_determinism() {
        let mut rng1 = SimpleRng::with_seed(12345);
        let mut rng2 = SimpleRng::with_seed(12345);
        assert_eq!(rng1.next_u64(), rng2.next_u64());
        assert_eq!(rng1.next_u64(), rng2.next_u64());
        assert_ne!(SimpleRng::with_seed(0).next_u64(), 0);
    }

    #[test]
    fn test_generated_patterns_parse() {
        let definitions = Definitions::new();
        let compiler = PatternCompiler::new(&definitions, &NoProperties);
        for seed in 1..50 {
            let mut generator = RegexGenerator::new(GeneratorConfig::default().with_seed(seed));
            let pattern = generator.generate();
            let mut ctx = CompilationContext::default();
            assert!(compiler.parse(&mut ctx, &pattern).is_ok(), "pattern {pattern:?}");
            assert!(generator.input(4).chars().count() <= 4);
        }
    }
}
