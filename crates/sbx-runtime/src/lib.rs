#![forbid(unsafe_code)]

//! Update dispatcher for scriptbox.
//!
//! # Role in scriptbox
//! The hosting process drives widgets through a narrow command surface:
//! load a script, update a text, swap an image, swallow a sub-layout, feed
//! input, render. [`Backend`] implements that surface on top of a
//! [`Toolkit`], keeping one [`sbx_scene::SceneGraph`] per [`Handle`] in step
//! with the objects the toolkit creates and destroys.
//!
//! # Collaborators
//! - [`Toolkit`]: object creation, swallowing, painting, input delivery.
//! - [`PixelBuffer`]: shared backing memory, accessed through [`BufferGuard`].
//! - [`sbx_layout::ImageLoader`]: image decoding.
//! - [`ShadowEffect`]: optional drop-shadow capability.
//! - [`Clock`]: wall time for input staleness and synthetic ids.

pub mod backend;
pub mod buffer;
pub mod config;
pub mod event_feed;
pub mod handle;
pub mod ids;
pub mod toolkit;

pub use backend::Backend;
pub use buffer::BufferGuard;
pub use config::{BackendConfig, ConfigError};
pub use event_feed::StalenessFilter;
pub use handle::{Handle, HandleId};
pub use ids::SyntheticIds;
pub use toolkit::{
    Clock, ImageNode, NoShadow, PixelBuffer, ShadowEffect, SystemClock, Toolkit, ToolkitError,
};
