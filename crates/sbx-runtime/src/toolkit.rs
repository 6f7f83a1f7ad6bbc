#![forbid(unsafe_code)]

//! Collaborator traits: the boundary between the dispatcher and the
//! rendering toolkit that actually owns objects, pixels and input.
//!
//! The dispatcher never creates, paints or deletes anything itself. It asks
//! a [`Toolkit`] to, and mirrors the results in the handle's scene graph.
//! Time flows through [`Clock`] so tests can pin it.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use image::RgbaImage;
use sbx_core::event::{AccessAction, KeyAction, MouseAction};
use sbx_core::{ColorClass, SbxError, Size};
use sbx_layout::Shadow;
use sbx_scene::ObjectRef;

/// Failure reported by a toolkit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolkitError {
    /// The toolkit could not allocate the object.
    OutOfMemory,
    /// A layout file or group could not be loaded.
    Load { message: String },
    /// Any other toolkit failure.
    Fault { message: String },
}

impl fmt::Display for ToolkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "toolkit out of memory"),
            Self::Load { message } => write!(f, "layout load failed: {message}"),
            Self::Fault { message } => write!(f, "toolkit fault: {message}"),
        }
    }
}

impl std::error::Error for ToolkitError {}

impl From<ToolkitError> for SbxError {
    fn from(err: ToolkitError) -> Self {
        match err {
            ToolkitError::OutOfMemory => SbxError::oom("toolkit allocation"),
            ToolkitError::Load { message } => SbxError::io("layout", message),
            ToolkitError::Fault { message } => SbxError::fault(message),
        }
    }
}

/// Image content handed to the toolkit for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageNode {
    /// A scalable image shown at `size`.
    Scaled {
        pixels: RgbaImage,
        size: Size,
        /// Ask the toolkit to preserve the aspect ratio on resize.
        keep_aspect: bool,
    },
    /// A static pixel snapshot shown at its own size.
    Snapshot { pixels: RgbaImage },
}

impl ImageNode {
    /// Displayed size.
    #[must_use]
    pub fn size(&self) -> Size {
        match self {
            Self::Scaled { size, .. } => *size,
            Self::Snapshot { pixels } => Size::new(pixels.width(), pixels.height()),
        }
    }
}

/// The rendering toolkit.
///
/// Object deletion cascades inside the toolkit; [`Toolkit::delete`] returns
/// every object that was destroyed as a consequence, in the order the
/// toolkit destroyed them.
pub trait Toolkit {
    /// Load `group` from a layout file and return the new object.
    fn load_layout(&mut self, path: &Path, group: &str) -> Result<ObjectRef, ToolkitError>;

    /// Delete `object` and everything swallowed into it.
    fn delete(&mut self, object: ObjectRef) -> Vec<ObjectRef>;

    /// Place `content` into `part` of `container`.
    fn part_swallow(
        &mut self,
        container: ObjectRef,
        part: &str,
        content: ObjectRef,
    ) -> Result<(), ToolkitError>;

    /// Remove and return whatever is swallowed into `part`.
    fn part_unswallow(&mut self, container: ObjectRef, part: &str) -> Option<ObjectRef>;

    /// Current geometry of `part`, if the part exists.
    fn part_geometry(&self, object: ObjectRef, part: &str) -> Option<Size>;

    fn part_text_set(&mut self, object: ObjectRef, part: &str, text: &str);

    /// Set or clear the accessibility description attached to `part`.
    fn set_access_description(&mut self, object: ObjectRef, part: &str, description: Option<&str>);

    /// Emit `signal` with `source` as its origin.
    fn signal_emit(&mut self, object: ObjectRef, signal: &str, source: &str);

    fn part_drag_value_set(&mut self, object: ObjectRef, part: &str, x: f64, y: f64);

    fn resize(&mut self, object: ObjectRef, size: Size);

    fn create_image(&mut self, node: ImageNode) -> Result<ObjectRef, ToolkitError>;

    fn set_color_class(&mut self, object: ObjectRef, class: &str, colors: &ColorClass);

    fn feed_mouse(
        &mut self,
        object: ObjectRef,
        action: MouseAction,
        x: f64,
        y: f64,
        timestamp: Duration,
    );

    /// Deliver a key event. `false` when nothing consumed it.
    fn feed_key(&mut self, object: ObjectRef, action: KeyAction, key_code: u32) -> bool;

    /// Perform an accessibility action. `false` when it could not be
    /// carried out.
    fn access_action(&mut self, object: ObjectRef, action: AccessAction, x: f64, y: f64) -> bool;

    /// Paint `object` into `target`, an RGBA buffer of `size`.
    fn paint(&mut self, object: ObjectRef, target: &mut [u8], size: Size)
    -> Result<(), ToolkitError>;
}

/// Shared pixel storage the toolkit paints into.
///
/// Access to [`PixelBuffer::pixels_mut`] is only valid between `acquire`
/// and `release`; the dispatcher goes through [`crate::BufferGuard`].
pub trait PixelBuffer {
    fn size(&self) -> Size;

    fn resize(&mut self, size: Size);

    /// Lock the buffer for writing.
    fn acquire(&mut self) -> Result<(), ToolkitError>;

    fn release(&mut self);

    fn pixels_mut(&mut self) -> &mut [u8];
}

/// Optional drop-shadow capability.
pub trait ShadowEffect {
    /// Apply `shadow` to `content`. Returns whether anything was applied.
    fn apply(&mut self, content: ObjectRef, shadow: &Shadow) -> bool;
}

/// Shadow capability for toolkits without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShadow;

impl ShadowEffect for NoShadow {
    fn apply(&mut self, _content: ObjectRef, _shadow: &Shadow) -> bool {
        false
    }
}

/// Wall-clock source shared by event timestamps and synthetic ids.
pub trait Clock {
    /// Time since the Unix epoch.
    fn now(&self) -> Duration;
}

/// [`Clock`] reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .unwrap_or_default()
    }
}
