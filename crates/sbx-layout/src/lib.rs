#![forbid(unsafe_code)]

//! Image placement for scriptbox.
//!
//! # Role in scriptbox
//! Script authors attach an option string to every image update. This
//! crate parses that string ([`options`]), decides how the decoded image
//! fits the target part ([`engine`]), and, for the cover/contain fill
//! modes, bakes the cropped result into a fresh buffer ([`snapshot`]).
//! Decoding sits behind the [`ImageLoader`] trait ([`loader`]).
//!
//! Nothing here touches the toolkit; the runtime turns a [`LayoutPlan`]
//! into toolkit calls.

pub mod engine;
pub mod loader;
pub mod options;
pub mod snapshot;

pub use engine::{CropPlan, LayoutError, LayoutPlan, fill_factor, plan};
pub use loader::{DecodedImage, ImageCrateLoader, ImageLoader, LoadError, is_readable};
pub use options::{Fill, ImageOptions, Shadow, parse as parse_options};
pub use snapshot::{SnapshotError, bake};
