#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sbx_core::Size;
use sbx_layout::{Fill, ImageOptions, LayoutPlan, plan};

#[derive(Debug, Arbitrary)]
struct Input {
    natural: (u16, u16),
    container: (u16, u16),
    fill: u8,
}

fuzz_target!(|input: Input| {
    let fill = match input.fill % 3 {
        0 => Fill::InSize,
        1 => Fill::OverSize,
        _ => Fill::FitSize,
    };
    let options = ImageOptions {
        aspect: true,
        fill,
        ..ImageOptions::default()
    };
    let natural = Size::new(u32::from(input.natural.0), u32::from(input.natural.1));
    let container = Size::new(u32::from(input.container.0), u32::from(input.container.1));

    match plan(natural, None, Some(container), &options) {
        Ok(LayoutPlan::Snapshot(crop)) => {
            assert_eq!(crop.viewport, container);
            assert!(!crop.scaled.is_empty());
            if fill == Fill::InSize {
                assert!(crop.scaled.width <= container.width);
                assert!(crop.scaled.height <= container.height);
            }
        }
        Ok(other) => panic!("fill mode produced {other:?}"),
        Err(err) => assert!(err.container.is_empty() || err.scaled.is_empty() || err.natural.is_empty()),
    }
});
