#![no_main]

use libfuzzer_sys::fuzz_target;
use sbx_core::ColorClass;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Accepted input always has exactly twelve fields.
    if input.parse::<ColorClass>().is_ok() {
        assert_eq!(input.split_whitespace().count(), 12);
    }
});
