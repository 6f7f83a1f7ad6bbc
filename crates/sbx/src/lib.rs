#![forbid(unsafe_code)]

//! scriptbox public facade crate.
//!
//! Re-exports the types a host needs to drive widgets, plus the helpers
//! that sit on the function-call boundary: [`code_of`] collapses any
//! operation result into its stable status code, and [`init_logging`]
//! installs the subscriber configured by [`BackendConfig`].
//!
//! ```
//! use sbx::prelude::*;
//!
//! let ok: sbx::Result<()> = Ok(());
//! assert_eq!(sbx::code_of(&ok), 0);
//!
//! let missing: sbx::Result<()> = Err(SbxError::not_found(Some("clock")));
//! assert_eq!(sbx::code_of(&missing), Status::NotExist.code());
//! ```

// --- Core re-exports -------------------------------------------------------

pub use sbx_core::event::{ActionType, EventInfo, EventType};
pub use sbx_core::logging::LoggingError;
pub use sbx_core::{ColorClass, EventStatus, Rect, Result, SbxError, Size, Status};

// --- Scene / layout re-exports ---------------------------------------------

pub use sbx_layout::{Fill, ImageCrateLoader, ImageLoader, ImageOptions, LayoutPlan, Shadow};
pub use sbx_scene::{Lifecycle, ObjectRef, SceneGraph};

// --- Runtime re-exports ----------------------------------------------------

pub use sbx_runtime::{
    Backend, BackendConfig, BufferGuard, Clock, ConfigError, Handle, HandleId, ImageNode,
    NoShadow, PixelBuffer, ShadowEffect, SystemClock, Toolkit, ToolkitError,
};

/// Status code of an operation result, as reported across the boundary.
#[must_use]
pub fn code_of<T>(result: &Result<T>) -> i32 {
    Status::from_result(result).code()
}

/// Install the global subscriber with `config.log_filter` as the fallback
/// filter. `SBX_LOG` takes precedence.
pub fn init_logging(config: &BackendConfig) -> std::result::Result<(), LoggingError> {
    sbx_core::logging::init(&config.log_filter)
}

pub mod prelude {
    pub use crate::{
        Backend, BackendConfig, EventInfo, EventStatus, EventType, HandleId, PixelBuffer, Result,
        SbxError, Size, Status, Toolkit,
    };

    pub use crate::{core, layout, runtime, scene};
}

pub use sbx_core as core;
pub use sbx_layout as layout;
pub use sbx_runtime as runtime;
pub use sbx_scene as scene;
