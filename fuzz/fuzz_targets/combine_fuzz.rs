#![no_main]
use libfuzzer_sys::fuzz_target;
use sipha_lexgen::testing::Simulator;
use sipha_lexgen::RecognizerBuilder;

// Newline-separated patterns followed by a tab and the input to tokenize.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (patterns, input) = text.split_once('\t').unwrap_or((text, ""));
    let mut builder = RecognizerBuilder::new();
    for (index, pattern) in patterns.lines().take(8).enumerate() {
        builder = builder.pattern(pattern, index);
    }
    let Ok(mode) = builder.build() else {
        return;
    };
    if let Some(tokens) = Simulator::new(&mode.recognizer).tokenize_str(input) {
        let rebuilt: String = tokens.into_iter().map(|(_, lexeme)| lexeme).collect();
        assert_eq!(rebuilt, input);
    }
});
