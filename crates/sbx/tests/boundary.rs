//! Status codes seen by the host through the facade.

use sbx::prelude::*;
use sbx_harness::fixtures::write_layout;
use sbx_harness::{MemoryBuffer, RecordingToolkit};

#[test]
fn operations_collapse_to_stable_codes() {
    let dir = tempfile::tempdir().unwrap();
    let layout = write_layout(dir.path(), "w.layout").unwrap();
    let mut backend = Backend::new(RecordingToolkit::new(), BackendConfig::default()).unwrap();
    let h = backend
        .create(&layout, "main", Box::new(MemoryBuffer::new(Size::new(4, 4))))
        .unwrap();

    assert_eq!(sbx::code_of(&backend.update_text(h, None, "t", "hi")), 0);
    assert_eq!(
        sbx::code_of(&backend.update_text(h, Some("nope"), "t", "hi")),
        -1
    );
    assert_eq!(
        sbx::code_of(&backend.update_color(h, None, "c", "1 2 3")),
        -2
    );
    assert_eq!(
        sbx::code_of(&backend.update_script(h, None, None, "s", "/nonexistent/x", "main")),
        -4
    );

    backend.destroy(h).unwrap();
    assert_eq!(
        sbx::code_of(&backend.feed_event(h, EventType::KEY.bits() | 1, &EventInfo::default())),
        Status::NotExist.code()
    );
}
