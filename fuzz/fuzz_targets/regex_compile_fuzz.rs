#![no_main]
use libfuzzer_sys::fuzz_target;
use sipha_lexgen::testing::MachineAssertions;
use sipha_lexgen::{CompilationContext, regex};

// Arbitrary pattern text must compile or fail with an error, never panic.
fuzz_target!(|data: &[u8]| {
    let Ok(pattern) = std::str::from_utf8(data) else {
        return;
    };
    if pattern.len() > 256 {
        return;
    }
    let mut ctx = CompilationContext::default();
    if let Ok(machine) = regex::compile(&mut ctx, pattern) {
        machine.assert_clean_dfa();
        assert!(!machine.init_state().is_acceptance());
    }
});
