#![forbid(unsafe_code)]

//! Hierarchy tracker over arena-indexed scene nodes.
//!
//! # Design
//!
//! Nodes live in a slot arena addressed by generational [`NodeId`]s; slots
//! are recycled through a free list (the same shape as the layout
//! dependency graph). Each record carries an explicit [`Lifecycle`]:
//!
//! - **Alive**: registered, may gain children.
//! - **PendingDelete**: the toolkit destroyed the object while children were
//!   still attached; the record waits for its last child to go.
//! - **Reclaimed**: the slot is freed and its generation bumped.
//!
//! # Destruction order
//!
//! Destruction notifications arrive from the toolkit in any order. A parent
//! may be destroyed before or after its children; both orders converge to
//! the same final state with every record reclaimed exactly once:
//!
//! ```
//! use sbx_scene::{Lifecycle, ObjectRef, SceneGraph};
//!
//! let mut graph = SceneGraph::new();
//! let p = graph.attach(ObjectRef::from_raw(1), None, None).unwrap();
//! let c = graph.attach(ObjectRef::from_raw(2), Some("c"), Some((p, "slot"))).unwrap();
//!
//! graph.request_destroy(ObjectRef::from_raw(1));
//! assert_eq!(graph.lifecycle(p), Lifecycle::PendingDelete);
//!
//! graph.request_destroy(ObjectRef::from_raw(2));
//! assert_eq!(graph.lifecycle(p), Lifecycle::Reclaimed);
//! assert_eq!(graph.lifecycle(c), Lifecycle::Reclaimed);
//! assert_eq!(graph.live_count(), 0);
//! ```

use rustc_hash::FxHashMap;

use crate::SceneError;
use crate::node::{ChildEdge, Lifecycle, NodeId, ObjectRef, SceneNode};
use crate::registry::NodeRegistry;

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// Counters describing reclamation activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    /// Records reclaimed since creation.
    pub reclaimed_total: u64,
    /// Records currently waiting on children.
    pub pending: usize,
    /// Records currently alive.
    pub alive: usize,
}

/// Result of a destruction notification for a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyOutcome {
    /// The node bound to the destroyed object.
    pub node: NodeId,
    /// State of that node after the notification.
    pub state: Lifecycle,
    /// A pending parent reclaimed because this was its last child.
    pub parent_reclaimed: Option<NodeId>,
}

/// Parent/child bookkeeping for the nodes of one handle.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    registry: NodeRegistry,
    by_object: FxHashMap<ObjectRef, NodeId>,
    reclaimed_total: u64,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id registry of live nodes.
    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Look up a live node by id; `None` is the root.
    #[must_use]
    pub fn find(&self, id: Option<&str>) -> Option<NodeId> {
        self.registry.find(id)
    }

    /// Track a freshly created toolkit object.
    ///
    /// With a parent, the node is appended to the parent's children under
    /// `slot`. Fails without side effects when a second root is attached,
    /// when the object is already tracked, or when the parent is no longer
    /// alive.
    pub fn attach(
        &mut self,
        object: ObjectRef,
        id: Option<&str>,
        parent: Option<(NodeId, &str)>,
    ) -> Result<NodeId, SceneError> {
        if self.by_object.contains_key(&object) {
            return Err(SceneError::DuplicateObject { object });
        }
        if let Some((parent, _)) = parent {
            if self.lifecycle(parent) != Lifecycle::Alive {
                return Err(SceneError::ParentUnavailable { parent });
            }
        }

        let node = self.peek_slot();
        self.registry.register(node, id)?;
        self.commit_slot(node, SceneNode::new(object, id, parent.map(|(p, _)| p)));
        self.by_object.insert(object, node);

        if let Some((parent, slot)) = parent {
            if let Some(record) = self.record_mut(parent) {
                record.children.push(ChildEdge {
                    node,
                    slot: slot.to_string(),
                });
            }
        }

        tracing::debug!(
            target: "sbx.scene",
            node = %node,
            object = %object,
            id = id.unwrap_or("<root>"),
            parent = ?parent.map(|(p, _)| p),
            "node attached"
        );
        Ok(node)
    }

    /// Handle the toolkit's object-destroyed notification.
    ///
    /// Returns `None` for objects this graph does not track (images and
    /// other leaf content, or repeated notifications).
    pub fn request_destroy(&mut self, object: ObjectRef) -> Option<DestroyOutcome> {
        let node = self.by_object.remove(&object)?;
        self.registry.remove(node);

        let parent = self.detach_from_parent(node);

        let childless = self.record(node).is_some_and(|r| r.children.is_empty());
        let state = if childless {
            self.reclaim(node);
            Lifecycle::Reclaimed
        } else {
            if let Some(record) = self.record_mut(node) {
                record.lifecycle = Lifecycle::PendingDelete;
            }
            tracing::debug!(
                target: "sbx.scene",
                node = %node,
                children = self.children(node).len(),
                "node destroyed with children attached; reclamation deferred"
            );
            Lifecycle::PendingDelete
        };

        let parent_reclaimed = parent.filter(|&p| self.reclaim_if_drained(p));

        Some(DestroyOutcome {
            node,
            state,
            parent_reclaimed,
        })
    }

    /// Current lifecycle state. Unknown or stale ids report `Reclaimed`.
    #[must_use]
    pub fn lifecycle(&self, node: NodeId) -> Lifecycle {
        self.record(node)
            .map_or(Lifecycle::Reclaimed, |record| record.lifecycle)
    }

    /// Toolkit object bound to a node that has not been reclaimed.
    #[must_use]
    pub fn object(&self, node: NodeId) -> Option<ObjectRef> {
        self.record(node).map(|record| record.object)
    }

    /// Id of a node that has not been reclaimed.
    #[must_use]
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.record(node).and_then(|record| record.id.as_deref())
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.record(node).and_then(|record| record.parent)
    }

    /// Children in attach order; empty for unknown nodes.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[ChildEdge] {
        self.record(node)
            .map_or(&[][..], |record| record.children.as_slice())
    }

    /// First child swallowed into `slot`.
    #[must_use]
    pub fn child_in_slot(&self, parent: NodeId, slot: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .find(|edge| edge.slot == slot)
            .map(|edge| edge.node)
    }

    /// Live node bound to `object`.
    #[must_use]
    pub fn node_for_object(&self, object: ObjectRef) -> Option<NodeId> {
        self.by_object.get(&object).copied()
    }

    /// Records not yet reclaimed (alive or pending).
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    #[must_use]
    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            reclaimed_total: self.reclaimed_total,
            ..SceneStats::default()
        };
        for record in self.slots.iter().filter_map(|slot| slot.node.as_ref()) {
            match record.lifecycle {
                Lifecycle::Alive => stats.alive += 1,
                Lifecycle::PendingDelete => stats.pending += 1,
                Lifecycle::Reclaimed => {}
            }
        }
        stats
    }

    /// Drop every remaining record. Returns how many were discarded.
    ///
    /// Used at handle teardown when the toolkit never reported some
    /// destructions.
    pub fn clear(&mut self) -> usize {
        let discarded = self.live_count();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(index as u32);
            }
        }
        self.registry.clear();
        self.by_object.clear();
        discarded
    }

    fn detach_from_parent(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.record_mut(node)?.parent.take()?;
        if let Some(record) = self.record_mut(parent) {
            if let Some(pos) = record.children.iter().position(|edge| edge.node == node) {
                record.children.remove(pos);
            }
        }
        Some(parent)
    }

    fn reclaim_if_drained(&mut self, node: NodeId) -> bool {
        let drained = self
            .record(node)
            .is_some_and(|r| r.lifecycle == Lifecycle::PendingDelete && r.children.is_empty());
        if drained {
            self.reclaim(node);
        }
        drained
    }

    fn reclaim(&mut self, node: NodeId) {
        let Some(slot) = self.slots.get_mut(node.index() as usize) else {
            return;
        };
        if slot.generation != node.generation() {
            return;
        }
        let Some(record) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(node.index());
        self.reclaimed_total += 1;
        tracing::debug!(
            target: "sbx.scene",
            node = %node,
            id = record.id.as_deref().unwrap_or("<root>"),
            "node reclaimed"
        );
    }

    fn peek_slot(&self) -> NodeId {
        match self.free_list.last() {
            Some(&index) => NodeId::new(index, self.slots[index as usize].generation),
            None => NodeId::new(self.slots.len() as u32, 0),
        }
    }

    fn commit_slot(&mut self, node: NodeId, record: SceneNode) {
        let index = node.index() as usize;
        if index == self.slots.len() {
            self.slots.push(Slot::default());
        } else {
            self.free_list.pop();
        }
        self.slots[index].node = Some(record);
    }

    fn record(&self, node: NodeId) -> Option<&SceneNode> {
        let slot = self.slots.get(node.index() as usize)?;
        if slot.generation != node.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn record_mut(&mut self, node: NodeId) -> Option<&mut SceneNode> {
        let slot = self.slots.get_mut(node.index() as usize)?;
        if slot.generation != node.generation() {
            return None;
        }
        slot.node.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(raw: u64) -> ObjectRef {
        ObjectRef::from_raw(raw)
    }

    fn family() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let p = graph.attach(obj(1), None, None).unwrap();
        let c1 = graph.attach(obj(2), Some("c1"), Some((p, "left"))).unwrap();
        let c2 = graph.attach(obj(3), Some("c2"), Some((p, "right"))).unwrap();
        (graph, p, c1, c2)
    }

    #[test]
    fn attach_links_both_directions() {
        let (graph, p, c1, c2) = family();
        assert_eq!(graph.parent(c1), Some(p));
        assert_eq!(graph.parent(c2), Some(p));
        let slots: Vec<_> = graph.children(p).iter().map(|e| e.slot.as_str()).collect();
        assert_eq!(slots, vec!["left", "right"]);
        assert_eq!(graph.child_in_slot(p, "right"), Some(c2));
    }

    #[test]
    fn cascading_delete_reclaims_parent_once() {
        let (mut graph, p, c1, c2) = family();

        let out = graph.request_destroy(obj(2)).unwrap();
        assert_eq!(out.state, Lifecycle::Reclaimed);
        assert_eq!(graph.lifecycle(p), Lifecycle::Alive);
        assert_eq!(graph.children(p).len(), 1);
        assert_eq!(graph.children(p)[0].node, c2);

        let out = graph.request_destroy(obj(1)).unwrap();
        assert_eq!(out.state, Lifecycle::PendingDelete);
        assert_eq!(graph.lifecycle(p), Lifecycle::PendingDelete);
        assert_eq!(graph.find(None), None);

        let out = graph.request_destroy(obj(3)).unwrap();
        assert_eq!(out.state, Lifecycle::Reclaimed);
        assert_eq!(out.parent_reclaimed, Some(p));
        assert_eq!(graph.lifecycle(p), Lifecycle::Reclaimed);
        assert_eq!(graph.lifecycle(c1), Lifecycle::Reclaimed);
        assert_eq!(graph.stats().reclaimed_total, 3);
        assert_eq!(graph.live_count(), 0);
    }

    #[test]
    fn children_first_order_converges() {
        let (mut graph, _, _, _) = family();
        graph.request_destroy(obj(3));
        graph.request_destroy(obj(2));
        let out = graph.request_destroy(obj(1)).unwrap();
        assert_eq!(out.state, Lifecycle::Reclaimed);
        assert_eq!(graph.stats().reclaimed_total, 3);
        assert_eq!(graph.live_count(), 0);
    }

    #[test]
    fn repeated_notification_is_ignored() {
        let (mut graph, _, _, _) = family();
        assert!(graph.request_destroy(obj(2)).is_some());
        assert!(graph.request_destroy(obj(2)).is_none());
        assert_eq!(graph.stats().reclaimed_total, 1);
    }

    #[test]
    fn unknown_object_is_ignored() {
        let (mut graph, _, _, _) = family();
        assert!(graph.request_destroy(obj(99)).is_none());
        assert_eq!(graph.live_count(), 3);
    }

    #[test]
    fn second_root_fails_without_side_effects() {
        let (mut graph, p, _, _) = family();
        let err = graph.attach(obj(7), None, None).unwrap_err();
        assert_eq!(err, SceneError::RootExists { root: p });
        assert_eq!(graph.live_count(), 3);
        assert!(graph.node_for_object(obj(7)).is_none());

        // The peeked slot was not consumed.
        let d = graph.attach(obj(8), Some("d"), None).unwrap();
        assert_eq!(d.index(), 3);
    }

    #[test]
    fn pending_parent_rejects_new_children() {
        let (mut graph, p, _, _) = family();
        graph.request_destroy(obj(1));
        let err = graph.attach(obj(9), Some("late"), Some((p, "x"))).unwrap_err();
        assert_eq!(err, SceneError::ParentUnavailable { parent: p });
    }

    #[test]
    fn duplicate_object_is_rejected() {
        let (mut graph, _, _, _) = family();
        let err = graph.attach(obj(2), Some("again"), None).unwrap_err();
        assert_eq!(err, SceneError::DuplicateObject { object: obj(2) });
    }

    #[test]
    fn recycled_slot_does_not_alias_stale_id() {
        let (mut graph, p, c1, _) = family();
        graph.request_destroy(obj(2));
        let fresh = graph.attach(obj(4), Some("c3"), Some((p, "left"))).unwrap();
        assert_eq!(fresh.index(), c1.index());
        assert_ne!(fresh, c1);
        assert_eq!(graph.lifecycle(c1), Lifecycle::Reclaimed);
        assert_eq!(graph.object(c1), None);
        assert_eq!(graph.object(fresh), Some(obj(4)));
    }

    #[test]
    fn detach_removes_first_identity_match_only() {
        let mut graph = SceneGraph::new();
        let p = graph.attach(obj(1), None, None).unwrap();
        let a = graph.attach(obj(2), Some("a"), Some((p, "s"))).unwrap();
        let b = graph.attach(obj(3), Some("b"), Some((p, "s"))).unwrap();
        graph.request_destroy(obj(2));
        assert_eq!(graph.child_in_slot(p, "s"), Some(b));
        assert_eq!(graph.lifecycle(a), Lifecycle::Reclaimed);
    }

    #[test]
    fn grandchild_keeps_pending_child_alive() {
        let mut graph = SceneGraph::new();
        let root = graph.attach(obj(1), None, None).unwrap();
        let mid = graph.attach(obj(2), Some("mid"), Some((root, "a"))).unwrap();
        let leaf = graph.attach(obj(3), Some("leaf"), Some((mid, "b"))).unwrap();

        graph.request_destroy(obj(1));
        assert_eq!(graph.lifecycle(root), Lifecycle::PendingDelete);

        // mid detaches from root at its own destruction, draining root,
        // but still waits on leaf.
        let out = graph.request_destroy(obj(2)).unwrap();
        assert_eq!(out.parent_reclaimed, Some(root));
        assert_eq!(graph.lifecycle(root), Lifecycle::Reclaimed);
        assert_eq!(graph.lifecycle(mid), Lifecycle::PendingDelete);
        assert_eq!(graph.parent(mid), None);

        graph.request_destroy(obj(3));
        assert_eq!(graph.lifecycle(mid), Lifecycle::Reclaimed);
        assert_eq!(graph.lifecycle(leaf), Lifecycle::Reclaimed);
    }

    #[test]
    fn clear_discards_remaining_records() {
        let (mut graph, p, _, _) = family();
        graph.request_destroy(obj(1));
        assert_eq!(graph.clear(), 3);
        assert_eq!(graph.live_count(), 0);
        assert_eq!(graph.lifecycle(p), Lifecycle::Reclaimed);
        assert!(graph.registry().is_empty());
    }
}
