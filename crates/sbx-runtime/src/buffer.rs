#![forbid(unsafe_code)]

//! Scoped access to the shared pixel buffer.

use sbx_core::Size;

use crate::toolkit::{PixelBuffer, ToolkitError};

/// Holds a [`PixelBuffer`] acquired; releases it on drop.
///
/// The pixel slice borrows from the guard, so it cannot outlive the
/// release.
pub struct BufferGuard<'a> {
    buffer: &'a mut dyn PixelBuffer,
}

impl<'a> BufferGuard<'a> {
    /// Acquire `buffer`.
    ///
    /// # Errors
    ///
    /// Whatever [`PixelBuffer::acquire`] reports; the buffer is not held.
    pub fn acquire(buffer: &'a mut dyn PixelBuffer) -> Result<Self, ToolkitError> {
        buffer.acquire()?;
        tracing::trace!(target: "sbx.dispatch", "pixel buffer acquired");
        Ok(Self { buffer })
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.buffer.size()
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.buffer.pixels_mut()
    }
}

impl Drop for BufferGuard<'_> {
    fn drop(&mut self) {
        self.buffer.release();
        tracing::trace!(target: "sbx.dispatch", "pixel buffer released");
    }
}

impl std::fmt::Debug for BufferGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferGuard")
            .field("size", &self.buffer.size())
            .finish()
    }
}
