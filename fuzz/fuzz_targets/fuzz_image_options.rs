#![no_main]

use libfuzzer_sys::fuzz_target;
use sbx_layout::options::{Tokenizer, TokenizerState, parse};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let options = parse(Some(input));
    assert!(options.width >= -1);
    assert!(options.height >= -1);
    assert_eq!(options.width == -1, options.height == -1);
    if !options.shadow.enabled {
        assert_eq!(options.shadow, Default::default());
    }

    let mut tokenizer = Tokenizer::new(input);
    for token in tokenizer.by_ref() {
        assert!(!token.key.is_empty());
        assert!(!token.key.contains([';', '=', ' ']));
    }
    assert_eq!(tokenizer.state(), TokenizerState::End);
});
