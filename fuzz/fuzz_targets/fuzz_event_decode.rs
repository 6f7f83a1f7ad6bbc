#![no_main]

use libfuzzer_sys::fuzz_target;
use sbx_core::event::{BackendEvent, EventType, SUBCODE_MASK, decode, encode};

fuzz_target!(|input: (u32, u32)| {
    let (raw, action_type) = input;
    let Ok(event) = decode(raw, action_type) else {
        return;
    };
    let category = match event {
        BackendEvent::Access(_) => EventType::ACCESS,
        BackendEvent::Mouse(_) => EventType::MOUSE,
        BackendEvent::Key(_) => EventType::KEY,
    };
    assert_eq!(encode(category, raw & SUBCODE_MASK) & !SUBCODE_MASK, category.bits());
});
