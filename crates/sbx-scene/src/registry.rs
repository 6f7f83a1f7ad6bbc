#![forbid(unsafe_code)]

//! Id-keyed lookup of live scene nodes for one handle.
//!
//! Entries are kept in insertion order and scanned linearly. A handle
//! carries tens of named parts at most, so lookups stay cheap without an
//! index, and the scan order gives duplicate ids a well-defined winner: the
//! first node registered under an id shadows later ones until it is removed.
//!
//! # Usage
//!
//! ```
//! use sbx_scene::{ObjectRef, SceneGraph};
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.attach(ObjectRef::from_raw(1), None, None).unwrap();
//! assert_eq!(graph.registry().find(None), Some(root));
//! assert_eq!(graph.registry().find(Some("clock")), None);
//! ```

use crate::SceneError;
use crate::node::NodeId;

#[derive(Debug, Clone)]
struct Entry {
    node: NodeId,
    id: Option<String>,
}

/// Insertion-ordered registry of live nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    entries: Vec<Entry>,
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `id`.
    ///
    /// Fails with [`SceneError::RootExists`] when `id` is `None` and a root
    /// is already registered; the registry is unchanged in that case.
    pub fn register(&mut self, node: NodeId, id: Option<&str>) -> Result<(), SceneError> {
        if id.is_none() {
            if let Some(root) = self.root() {
                return Err(SceneError::RootExists { root });
            }
        }
        self.entries.push(Entry {
            node,
            id: id.map(str::to_string),
        });
        Ok(())
    }

    /// Look up a node. `None` resolves to the root; otherwise the first
    /// node registered under `id` wins.
    #[must_use]
    pub fn find(&self, id: Option<&str>) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|entry| entry.id.as_deref() == id)
            .map(|entry| entry.node)
    }

    /// The node registered without an id, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.find(None)
    }

    /// True if some live node carries `id`.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.find(Some(id)).is_some()
    }

    /// Remove `node`. Returns `false` if it was not registered.
    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.entries.iter().position(|entry| entry.node == node) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered `(node, id)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Option<&str>)> {
        self.entries
            .iter()
            .map(|entry| (entry.node, entry.id.as_deref()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
