#![forbid(unsafe_code)]

//! Scene bookkeeping: node registry and hierarchy tracker.
//!
//! # Role in scriptbox
//! Every handle owns one [`SceneGraph`]. The graph mirrors the toolkit
//! objects scriptbox created for that handle (the root layout and every
//! sub-layout swallowed into a part), records which part each child was
//! swallowed into, and reclaims its records as the toolkit reports
//! destruction, in whatever order those reports arrive.
//!
//! Image content swallowed into parts is not tracked here; only nodes that
//! can be addressed by id are.

use std::fmt;

use sbx_core::SbxError;

pub mod graph;
pub mod node;
pub mod registry;

pub use graph::{DestroyOutcome, SceneGraph, SceneStats};
pub use node::{ChildEdge, Lifecycle, NodeId, ObjectRef};
pub use registry::NodeRegistry;

/// Errors raised by scene bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A node without id was attached while a root already exists.
    RootExists { root: NodeId },
    /// The toolkit object is already tracked.
    DuplicateObject { object: ObjectRef },
    /// The requested parent is pending deletion or reclaimed.
    ParentUnavailable { parent: NodeId },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootExists { root } => write!(f, "root node already exists ({root})"),
            Self::DuplicateObject { object } => write!(f, "{object} is already tracked"),
            Self::ParentUnavailable { parent } => write!(f, "parent {parent} is not alive"),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<SceneError> for SbxError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::RootExists { .. } => SbxError::invalid(err.to_string()),
            SceneError::DuplicateObject { .. } | SceneError::ParentUnavailable { .. } => {
                SbxError::fault(err.to_string())
            }
        }
    }
}
