//! Log output of the dispatcher.

use std::time::Duration;

use sbx_core::Size;
use sbx_core::event::{self, EventInfo, EventType};
use sbx_harness::fixtures::{write_layout, write_png};
use sbx_harness::{ManualClock, MemoryBuffer, RecordingToolkit};
use sbx_runtime::{Backend, BackendConfig};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn image_and_stale_input_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let layout = write_layout(dir.path(), "w.layout").unwrap();
    let png = write_png(dir.path(), "a.png", 6, 6).unwrap();
    let clock = ManualClock::at(Duration::from_secs(50));

    let mut backend = Backend::new(RecordingToolkit::new(), BackendConfig::default())
        .unwrap()
        .with_clock(clock);
    let h = backend
        .create(&layout, "main", Box::new(MemoryBuffer::new(Size::new(2, 2))))
        .unwrap();
    assert!(logs_contain("handle created"));

    backend
        .update_image(h, None, "icon", png.to_str().unwrap(), None)
        .unwrap();
    assert!(logs_contain("image swallowed"));

    let stale = EventInfo::pointer(0.0, 0.0, Duration::from_secs(1));
    backend
        .feed_event(h, event::encode(EventType::MOUSE, event::mouse::MOVE), &stale)
        .unwrap();
    assert!(logs_contain("dropping stale mouse event"));

    backend.destroy(h).unwrap();
    assert!(logs_contain("handle destroyed"));
    assert!(!logs_contain("records discarded"));
}
