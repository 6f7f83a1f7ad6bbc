#![forbid(unsafe_code)]

//! One loaded script instance.

use std::fmt;
use std::path::{Path, PathBuf};

use sbx_scene::{NodeId, SceneGraph};

use crate::event_feed::StalenessFilter;
use crate::toolkit::PixelBuffer;

/// Key of a [`Handle`] inside its [`crate::Backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u32);

impl HandleId {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// State owned by one loaded script: its file, its scene graph, its
/// backing buffer and the mouse latch.
pub struct Handle {
    pub(crate) file: PathBuf,
    pub(crate) group: String,
    pub(crate) category: Option<String>,
    pub(crate) graph: SceneGraph,
    pub(crate) buffer: Box<dyn PixelBuffer>,
    pub(crate) input: StalenessFilter,
}

impl Handle {
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// The root layout node while it is alive.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.graph.find(None)
    }

    #[must_use]
    pub fn buffer(&self) -> &dyn PixelBuffer {
        self.buffer.as_ref()
    }

    #[must_use]
    pub fn mouse_down(&self) -> bool {
        self.input.is_latched()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("file", &self.file)
            .field("group", &self.group)
            .field("category", &self.category)
            .field("nodes", &self.graph.live_count())
            .field("buffer", &self.buffer.size())
            .field("mouse_down", &self.input.is_latched())
            .finish()
    }
}
