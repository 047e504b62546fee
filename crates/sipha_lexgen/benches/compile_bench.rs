//! Compilation benchmarks
//!
//! Measures the pipeline stages on patterns of growing size and the
//! combination of a realistic lexical mode.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sipha_lexgen::determinize::determinize;
use sipha_lexgen::minimize::minimize;
use sipha_lexgen::{CompilationContext, Definitions, NoProperties, PatternCompiler, RecognizerBuilder, regex};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Keyword,
    Ident,
    Number,
    Str,
    Comment,
    Operator,
    Space,
}

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "fn", "for", "if", "impl", "in", "let",
    "loop", "match", "mod", "pub", "return", "struct", "trait", "type", "use", "where", "while",
];

fn bench_regex_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("regex_compile");
    for pattern in [
        "[a-zA-Z_][a-zA-Z0-9_]*",
        "[0-9]+(\\.[0-9]+)?([eE][+\\-]?[0-9]+)?",
        "\\\"([^\\\"\\\\\\n]|\\\\.)*\\\"",
        "(a|b)*abb(a|b){4}",
        "[a-z]+/[ ]*\\(",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(pattern), pattern, |b, pattern| {
            b.iter(|| {
                let mut ctx = CompilationContext::default();
                regex::compile(&mut ctx, black_box(pattern))
            });
        });
    }
    group.finish();
}

fn bench_subset_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("determinize_minimize");
    let definitions = Definitions::new();
    let compiler = PatternCompiler::new(&definitions, &NoProperties);

    // (a|b)*a(a|b){n} has an exponential DFA.
    for n in [2_usize, 4, 6, 8] {
        let pattern = format!("(a|b)*a(a|b){{{n}}}");
        let mut ctx = CompilationContext::default();
        let Ok(parsed) = compiler.parse(&mut ctx, &pattern) else {
            continue;
        };
        let nfa = parsed.core;
        group.bench_with_input(BenchmarkId::new("determinize", n), &nfa, |b, nfa| {
            b.iter(|| {
                let mut ctx = CompilationContext::default();
                determinize(&mut ctx, black_box(nfa))
            });
        });

        let dfa = determinize(&mut ctx, &nfa);
        group.bench_with_input(BenchmarkId::new("minimize", n), &dfa, |b, dfa| {
            b.iter(|| {
                let mut ctx = CompilationContext::default();
                minimize(&mut ctx, black_box(dfa))
            });
        });
    }
    group.finish();
}

fn bench_mode_combination(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");
    group.measurement_time(Duration::from_secs(10));

    for keyword_count in [4_usize, 12, KEYWORDS.len()] {
        group.bench_with_input(
            BenchmarkId::new("keywords", keyword_count),
            &keyword_count,
            |b, &keyword_count| {
                b.iter(|| {
                    let mut builder = RecognizerBuilder::new()
                        .define("digit", "[0-9]")
                        .define("alpha", "[a-zA-Z_]");
                    for keyword in &KEYWORDS[..keyword_count] {
                        builder = builder.pattern(keyword, Kind::Keyword);
                    }
                    builder
                        .pattern("{alpha}({alpha}|{digit})*", Kind::Ident)
                        .pattern("{digit}+", Kind::Number)
                        .pattern("\\\"([^\\\"\\n]|\\\\.)*\\\"", Kind::Str)
                        .pattern("\\/\\/[^\\n]*", Kind::Comment)
                        .pattern("[-+*\\/=<>!]=?|[(){};,.]", Kind::Operator)
                        .pattern("[ \\t\\n]+", Kind::Space)
                        .build()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_regex_compile,
    bench_subset_construction,
    bench_mode_combination
);
criterion_main!(benches);
