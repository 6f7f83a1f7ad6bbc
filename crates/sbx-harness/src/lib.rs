#![forbid(unsafe_code)]

//! Test doubles for scriptbox.
//!
//! - [`RecordingToolkit`]: in-memory object tree with a configurable
//!   cascade order for deletions.
//! - [`MemoryBuffer`], [`RecordingShadow`], [`ManualClock`]: collaborator
//!   doubles with shared probes.
//! - [`fixtures`]: PNG and layout files on disk.

pub mod doubles;
pub mod fixtures;
pub mod toolkit;

pub use doubles::{BufferProbe, ManualClock, MemoryBuffer, RecordingShadow};
pub use toolkit::{Call, DestroyOrder, ObjectKind, RecordedObject, RecordingToolkit};
