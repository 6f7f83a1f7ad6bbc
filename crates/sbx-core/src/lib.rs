#![forbid(unsafe_code)]

//! Core: status codes, event encoding, color classes, geometry, logging.
//!
//! # Role in scriptbox
//! `sbx-core` is the vocabulary shared by every other crate. It has no
//! knowledge of nodes, layouts or the toolkit; it only defines the values
//! that cross the function-call boundary with the hosting process.
//!
//! # Primary responsibilities
//! - **Status / SbxError**: the closed status set and the error type that
//!   collapses into it.
//! - **Event encoding**: raw bitmask decoding for access, mouse and key events.
//! - **Color classes**: the twelve-integer color-class string format.
//! - **Logging**: subscriber bootstrap honoring `SBX_LOG`.

pub mod color;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod status;

pub use color::{ColorClass, ColorClassError, Rgba};
pub use geometry::{Rect, Size};
pub use status::{EventStatus, Result, SbxError, Status};
