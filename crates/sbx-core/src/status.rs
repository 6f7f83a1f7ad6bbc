#![forbid(unsafe_code)]

//! Status codes and the workspace error type.
//!
//! Every public backend operation returns `Result<_, SbxError>`. At the
//! function-call boundary the result collapses into one of the closed
//! [`Status`] codes; accessibility and key operations additionally report an
//! [`EventStatus`].

use std::fmt;

use thiserror::Error;

/// Result alias used across scriptbox crates.
pub type Result<T> = std::result::Result<T, SbxError>;

/// Closed set of status codes reported to the hosting process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum Status {
    /// Success.
    None = 0,
    /// The addressed node or handle does not exist.
    NotExist = -1,
    /// An argument was malformed or a layout was degenerate.
    InvalidParameter = -2,
    /// The toolkit or the bookkeeping reached an inconsistent state.
    Fault = -3,
    /// A file could not be read or decoded.
    IoError = -4,
    /// An allocation failed.
    OutOfMemory = -5,
}

impl Status {
    /// Raw code passed across the function-call boundary.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Parse a raw code; unknown codes yield `None`.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            -1 => Some(Self::NotExist),
            -2 => Some(Self::InvalidParameter),
            -3 => Some(Self::Fault),
            -4 => Some(Self::IoError),
            -5 => Some(Self::OutOfMemory),
            _ => None,
        }
    }

    /// Collapse an operation result into a status code.
    #[must_use]
    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::None,
            Err(err) => err.status(),
        }
    }

    /// True for [`Status::None`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::NotExist => "not-exist",
            Self::InvalidParameter => "invalid-parameter",
            Self::Fault => "fault",
            Self::IoError => "io-error",
            Self::OutOfMemory => "out-of-memory",
        };
        f.write_str(name)
    }
}

/// Outcome of an accessibility or key action fed to the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventStatus {
    /// The action was performed.
    Done,
    /// Highlight could not move before the first item.
    First,
    /// Highlight could not move past the last item.
    Last,
    /// The toolkit rejected the action.
    Error,
}

/// Errors raised by backend operations.
#[derive(Debug, Error)]
pub enum SbxError {
    #[error("node not found: {id}")]
    NodeNotFound { id: String },

    #[error("handle not found: {handle}")]
    HandleNotFound { handle: u32 },

    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("out of memory: {context}")]
    OutOfMemory { context: String },

    #[error("fault: {message}")]
    Fault { message: String },
}

impl SbxError {
    /// Status code reported for this error.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::NodeNotFound { .. } | Self::HandleNotFound { .. } => Status::NotExist,
            Self::InvalidParameter { .. } => Status::InvalidParameter,
            Self::Io { .. } => Status::IoError,
            Self::OutOfMemory { .. } => Status::OutOfMemory,
            Self::Fault { .. } => Status::Fault,
        }
    }

    /// Node lookup failure. `None` names the root node.
    #[must_use]
    pub fn not_found(id: Option<&str>) -> Self {
        Self::NodeNotFound {
            id: id.unwrap_or("<root>").to_string(),
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn oom(context: impl Into<String>) -> Self {
        Self::OutOfMemory {
            context: context.into(),
        }
    }

    #[must_use]
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_raw_values() {
        for status in [
            Status::None,
            Status::NotExist,
            Status::InvalidParameter,
            Status::Fault,
            Status::IoError,
            Status::OutOfMemory,
        ] {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::from_code(7), None);
    }

    #[test]
    fn errors_map_to_closed_status_set() {
        assert_eq!(SbxError::not_found(Some("clock")).status(), Status::NotExist);
        assert_eq!(
            SbxError::HandleNotFound { handle: 3 }.status(),
            Status::NotExist
        );
        assert_eq!(SbxError::invalid("bad").status(), Status::InvalidParameter);
        assert_eq!(SbxError::io("a.png", "gone").status(), Status::IoError);
        assert_eq!(SbxError::oom("pixels").status(), Status::OutOfMemory);
        assert_eq!(SbxError::fault("lost").status(), Status::Fault);
    }

    #[test]
    fn root_lookup_failure_names_root() {
        let err = SbxError::not_found(None);
        assert_eq!(err.to_string(), "node not found: <root>");
    }

    #[test]
    fn from_result_collapses_errors() {
        let ok: Result<u8> = Ok(1);
        let err: Result<u8> = Err(SbxError::io("x", "y"));
        assert_eq!(Status::from_result(&ok), Status::None);
        assert_eq!(Status::from_result(&err), Status::IoError);
    }
}
