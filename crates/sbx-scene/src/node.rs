#![forbid(unsafe_code)]

//! Node identifiers and per-node bookkeeping.

use std::fmt;

/// Opaque handle to a toolkit-drawable object.
///
/// The toolkit owns the object; scriptbox only compares and forwards these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(u64);

impl ObjectRef {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Stable arena key for a scene node.
///
/// The generation changes every time a slot is recycled, so a `NodeId` kept
/// past reclamation never aliases a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}v{}", self.index, self.generation)
    }
}

/// Lifecycle of a node record.
///
/// ```text
/// Alive ──destroy (children left)──▶ PendingDelete ──last child gone──▶ Reclaimed
///   └──────────destroy (no children)─────────────────────────────────▶ Reclaimed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Alive,
    PendingDelete,
    Reclaimed,
}

/// A `(child, slot)` edge in a parent's child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEdge {
    pub node: NodeId,
    /// Part name the child was swallowed into.
    pub slot: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SceneNode {
    pub(crate) object: ObjectRef,
    pub(crate) id: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<ChildEdge>,
    pub(crate) lifecycle: Lifecycle,
}

impl SceneNode {
    pub(crate) fn new(object: ObjectRef, id: Option<&str>, parent: Option<NodeId>) -> Self {
        Self {
            object,
            id: id.map(str::to_string),
            parent,
            children: Vec::new(),
            lifecycle: Lifecycle::Alive,
        }
    }
}
