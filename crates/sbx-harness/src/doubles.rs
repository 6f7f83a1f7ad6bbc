#![forbid(unsafe_code)]

//! Pixel buffer, shadow and clock doubles.
//!
//! Each double hands out a cloneable probe sharing its state, so a test can
//! keep observing it after the double itself was boxed into a backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use sbx_core::Size;
use sbx_layout::Shadow;
use sbx_runtime::{Clock, PixelBuffer, ShadowEffect, ToolkitError};
use sbx_scene::ObjectRef;

// ---------------------------------------------------------------------------
// MemoryBuffer
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct BufferState {
    size: Size,
    published: Vec<u8>,
    held: bool,
    acquires: u32,
    releases: u32,
    fail_acquire: bool,
}

/// Heap-backed [`PixelBuffer`] that tracks acquire/release pairing.
///
/// Pixels written while held are published to the probe on release, the
/// way a shared buffer becomes visible to its reader.
#[derive(Debug)]
pub struct MemoryBuffer {
    pixels: Vec<u8>,
    state: Rc<RefCell<BufferState>>,
}

/// Observer of a [`MemoryBuffer`].
#[derive(Debug, Clone)]
pub struct BufferProbe {
    state: Rc<RefCell<BufferState>>,
}

impl MemoryBuffer {
    #[must_use]
    pub fn new(size: Size) -> Self {
        let state = BufferState {
            size,
            ..BufferState::default()
        };
        Self {
            pixels: vec![0; (size.area() * 4) as usize],
            state: Rc::new(RefCell::new(state)),
        }
    }

    #[must_use]
    pub fn probe(&self) -> BufferProbe {
        BufferProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl BufferProbe {
    #[must_use]
    pub fn size(&self) -> Size {
        self.state.borrow().size
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.state.borrow().held
    }

    /// `(acquires, releases)`.
    #[must_use]
    pub fn counts(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.acquires, state.releases)
    }

    /// Pixels as of the last release.
    #[must_use]
    pub fn published(&self) -> Vec<u8> {
        self.state.borrow().published.clone()
    }

    /// Make following acquisitions fail.
    pub fn fail_acquire(&self, fail: bool) {
        self.state.borrow_mut().fail_acquire = fail;
    }
}

impl PixelBuffer for MemoryBuffer {
    fn size(&self) -> Size {
        self.state.borrow().size
    }

    fn resize(&mut self, size: Size) {
        self.state.borrow_mut().size = size;
        self.pixels = vec![0; (size.area() * 4) as usize];
    }

    fn acquire(&mut self) -> Result<(), ToolkitError> {
        let mut state = self.state.borrow_mut();
        if state.fail_acquire {
            return Err(ToolkitError::Fault {
                message: "buffer busy".into(),
            });
        }
        if state.held {
            return Err(ToolkitError::Fault {
                message: "buffer acquired twice".into(),
            });
        }
        state.held = true;
        state.acquires += 1;
        Ok(())
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.held = false;
        state.releases += 1;
        state.published.clone_from(&self.pixels);
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

// ---------------------------------------------------------------------------
// RecordingShadow
// ---------------------------------------------------------------------------

/// [`ShadowEffect`] that records what it was asked to apply.
#[derive(Debug, Clone, Default)]
pub struct RecordingShadow {
    applied: Rc<RefCell<Vec<(ObjectRef, Shadow)>>>,
}

impl RecordingShadow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn applied(&self) -> Vec<(ObjectRef, Shadow)> {
        self.applied.borrow().clone()
    }
}

impl ShadowEffect for RecordingShadow {
    fn apply(&mut self, content: ObjectRef, shadow: &Shadow) -> bool {
        self.applied.borrow_mut().push((content, *shadow));
        true
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// [`Clock`] that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn at(now: Duration) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
