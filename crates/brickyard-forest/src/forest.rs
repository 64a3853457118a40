//! Forest registry: the flat node collection of one editing surface and the
//! views derived from it.
//!
//! The registry is the ground truth for nodes and their links. The root set
//! and the free-socket set are *derived*: they are recomputed by a full scan
//! after every structural change and cached until the next one, so readers
//! between pointer events always see a view consistent with the links.

use std::collections::BTreeMap;

use brickyard_core::Point;
use serde::{Deserialize, Serialize};

use crate::{ForestError, Node, NodeId, NodeKind, ParentLink, Side, Socket, VisualLayer};

pub(crate) const LOG_TARGET: &str = "brickyard.forest";

/// Derived root and free-socket sets, both in ascending ID order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForestViews {
    pub roots: Vec<NodeId>,
    /// Every unoccupied operator socket; each is drawn as "available".
    pub free_sockets: Vec<Socket>,
}

/// Read-only state handed to the visual layer after a structural change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestSnapshot {
    /// Monotonic count of structural changes applied so far.
    pub revision: u64,
    /// Deterministic hash over node kinds and links (positions excluded).
    pub state_hash: u64,
    pub node_count: usize,
    pub roots: Vec<NodeId>,
    pub free_sockets: Vec<Socket>,
}

/// The node registry for one editing surface, bound to its visual layer.
#[derive(Debug)]
pub struct Forest<H> {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
    views: ForestViews,
    revision: u64,
    pub(crate) host: H,
}

impl<H: Default + VisualLayer> Default for Forest<H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<H: VisualLayer> Forest<H> {
    /// An empty forest presented through `host`.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: NodeId::MIN,
            views: ForestViews::default(),
            revision: 0,
            host,
        }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Lookup a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Iterate nodes in ascending ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// ID the next spawned node will receive.
    #[must_use]
    pub const fn next_id(&self) -> NodeId {
        self.next_id
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Cached root set as of the last structural change.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.views.roots
    }

    /// Cached free-socket set as of the last structural change.
    #[must_use]
    pub fn free_sockets(&self) -> &[Socket] {
        &self.views.free_sockets
    }

    #[must_use]
    pub fn views(&self) -> &ForestViews {
        &self.views
    }

    /// Recompute the root and free-socket sets by full scan.
    ///
    /// Pure: does not touch the cache. `O(node_count)`.
    #[must_use]
    pub fn derive_views(&self) -> ForestViews {
        let mut views = ForestViews::default();
        for node in self.nodes.values() {
            if node.is_root() {
                views.roots.push(node.id());
            }
            if node.is_operator() {
                views.free_sockets.extend(
                    Side::ALL
                        .into_iter()
                        .filter(|side| !node.has_child(*side))
                        .map(|side| Socket::new(node.id(), side)),
                );
            }
        }
        views
    }

    /// Current state for diagnostics and the visual layer.
    #[must_use]
    pub fn snapshot(&self) -> ForestSnapshot {
        ForestSnapshot {
            revision: self.revision,
            state_hash: self.state_hash(),
            node_count: self.nodes.len(),
            roots: self.views.roots.clone(),
            free_sockets: self.views.free_sockets.clone(),
        }
    }

    /// Deterministic structural hash of kinds and links.
    ///
    /// Positions are excluded so dragging a root does not change the hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                *hash ^= u64::from(*byte);
                *hash = hash.wrapping_mul(PRIME);
            }
        }

        fn mix_opt_id(hash: &mut u64, value: Option<NodeId>) {
            match value {
                Some(id) => {
                    mix_bytes(hash, &[1]);
                    mix_bytes(hash, &id.get().to_le_bytes());
                }
                None => mix_bytes(hash, &[0]),
            }
        }

        let mut hash = OFFSET_BASIS;
        for node in self.nodes.values() {
            mix_bytes(&mut hash, &node.id().get().to_le_bytes());
            let kind_tag = match node.kind() {
                NodeKind::Operator(op) => op.name(),
                NodeKind::Placeholder => "placeholder",
            };
            mix_bytes(&mut hash, kind_tag.as_bytes());
            mix_opt_id(&mut hash, node.parent().map(|link| link.parent));
            mix_bytes(
                &mut hash,
                &[node.parent().map_or(0, |link| link.side as u8 + 1)],
            );
            mix_opt_id(&mut hash, node.children().left);
            mix_opt_id(&mut hash, node.children().right);
        }
        hash
    }

    /// Register a new node as a root at `position` and give it a handle.
    ///
    /// A non-finite position is replaced by the origin with a warning; the
    /// node is still created.
    pub fn spawn(
        &mut self,
        kind: impl Into<NodeKind>,
        position: Point,
    ) -> Result<NodeId, ForestError> {
        let kind = kind.into();
        let id = self.next_id;
        self.next_id = id.checked_next()?;

        let mut node = Node::new(id, kind, Point::ORIGIN);
        if let Err(err) = node.set_position(position) {
            tracing::warn!(target: LOG_TARGET, code = err.code(), "{err}");
        }
        self.host.spawn_handle(&node);
        let _ = self.nodes.insert(id, node);
        tracing::debug!(target: LOG_TARGET, node = %id, ?kind, "spawned node");
        self.structural_change();
        Ok(id)
    }

    /// Detach a node from its parent and children, then discard it.
    ///
    /// Former children become roots at their rendered locations.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, ForestError> {
        let node = self.require(id)?;
        let parent = node.parent();
        let children = node.children();

        if let Some(link) = parent {
            self.unlink(link.parent, link.side)?;
        }
        for (side, _) in children.iter() {
            self.unlink(id, side)?;
        }

        self.host.discard_handle(id);
        let removed = self
            .nodes
            .remove(&id)
            .ok_or(ForestError::MissingNode { node_id: id })?;
        tracing::debug!(target: LOG_TARGET, node = %id, "removed node");
        self.structural_change();
        Ok(removed)
    }

    /// Move a node and its handle.
    ///
    /// Fails closed: a non-finite position moves the node to the origin and
    /// returns [`ForestError::InvalidPosition`].
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), ForestError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ForestError::MissingNode { node_id: id })?;
        let result = node.set_position(position);
        let applied = node.position();
        self.host.place(id, applied);
        if let Err(err) = &result {
            tracing::warn!(target: LOG_TARGET, code = err.code(), "{err}");
        }
        result
    }

    /// Parent link of a node, if it has one.
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<ParentLink> {
        self.nodes.get(&id).and_then(Node::parent)
    }

    /// True if `id` is registered and its `side` socket holds a child.
    #[must_use]
    pub fn has_child(&self, id: NodeId, side: Side) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.has_child(side))
    }

    /// True if `id` is registered and both of its sockets are occupied.
    #[must_use]
    pub fn is_full(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|node| node.children().is_full())
    }

    /// Topmost ancestor of `id` (itself when it is a root).
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.nodes.get(&id)?;
        // Bounded by node count so a corrupted chain cannot spin forever.
        for _ in 0..=self.nodes.len() {
            match cursor.parent() {
                Some(link) => cursor = self.nodes.get(&link.parent)?,
                None => return Some(cursor.id()),
            }
        }
        None
    }

    /// True if `ancestor` lies strictly above `node` on its parent chain.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = self.parent_of(node);
        for _ in 0..=self.nodes.len() {
            match cursor {
                Some(link) if link.parent == ancestor => return true,
                Some(link) => cursor = self.parent_of(link.parent),
                None => return false,
            }
        }
        false
    }

    /// `id` and all of its descendants, pre-order, left before right.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(node_id);
            let children = node.children();
            stack.extend(children.right);
            stack.extend(children.left);
        }
        out
    }

    /// One human-readable line per node, in ID order, for debug output.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        self.nodes
            .values()
            .map(|node| {
                let kind = match node.kind() {
                    NodeKind::Operator(op) => op.label(),
                    NodeKind::Placeholder => "PLACEHOLDER",
                };
                match node.parent() {
                    Some(link) => format!("{} {kind} in {}", node.id(), link.socket()),
                    None => format!(
                        "{} {kind} root at ({}, {})",
                        node.id(),
                        node.position().x,
                        node.position().y
                    ),
                }
            })
            .collect()
    }

    pub(crate) fn require(&self, id: NodeId) -> Result<&Node, ForestError> {
        self.nodes
            .get(&id)
            .ok_or(ForestError::MissingNode { node_id: id })
    }

    pub(crate) fn require_mut(&mut self, id: NodeId) -> Result<&mut Node, ForestError> {
        self.nodes
            .get_mut(&id)
            .ok_or(ForestError::MissingNode { node_id: id })
    }

    /// Refresh the derived views and tell the visual layer.
    pub(crate) fn structural_change(&mut self) {
        self.revision = self.revision.saturating_add(1);
        self.views = self.derive_views();
        let snapshot = self.snapshot();
        self.host.on_structural_change(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeadlessLayer, OperatorKind};

    fn forest() -> Forest<HeadlessLayer> {
        Forest::new(HeadlessLayer)
    }

    #[test]
    fn spawn_allocates_sequential_ids_and_registers_roots() {
        let mut forest = forest();
        let a = forest
            .spawn(OperatorKind::And, Point::new(10.0, 10.0))
            .expect("spawn");
        let b = forest
            .spawn(NodeKind::Placeholder, Point::new(20.0, 20.0))
            .expect("spawn");
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(forest.roots(), &[a, b]);
        assert_eq!(
            forest.free_sockets(),
            &[Socket::new(a, Side::Left), Socket::new(a, Side::Right)],
            "placeholders contribute no sockets"
        );
        assert_eq!(forest.revision(), 2);
    }

    #[test]
    fn spawn_with_invalid_position_lands_at_origin() {
        let mut forest = forest();
        let id = forest
            .spawn(OperatorKind::Or, Point::new(f64::INFINITY, 3.0))
            .expect("spawn still succeeds");
        assert_eq!(forest.node(id).map(Node::position), Some(Point::ORIGIN));
    }

    #[test]
    fn exhausted_ids_reject_spawn_without_changes() {
        let mut forest = forest();
        let first = forest.spawn(OperatorKind::And, Point::ORIGIN).expect("spawn");
        let last = NodeId::new(u64::MAX).expect("non-zero");
        forest.next_id = last;
        let before = forest.snapshot();

        let err = forest
            .spawn(OperatorKind::Or, Point::new(1.0, 1.0))
            .expect_err("no ids left");
        assert_eq!(err, ForestError::NodeIdOverflow { current: last });
        assert_eq!(forest.snapshot(), before);
        assert_eq!(forest.next_id(), last);
        assert_eq!(forest.nodes().map(Node::id).collect::<Vec<_>>(), vec![first]);
    }

    #[test]
    fn set_position_reports_invalid_coordinates() {
        let mut forest = forest();
        let id = forest
            .spawn(OperatorKind::Or, Point::new(5.0, 5.0))
            .expect("spawn");
        assert_eq!(forest.set_position(id, Point::new(7.0, 8.0)), Ok(()));
        assert!(matches!(
            forest.set_position(id, Point::new(f64::NAN, 8.0)),
            Err(ForestError::InvalidPosition { .. })
        ));
        assert_eq!(forest.node(id).map(Node::position), Some(Point::ORIGIN));
        assert!(matches!(
            forest.set_position(NodeId::new(99).expect("non-zero"), Point::ORIGIN),
            Err(ForestError::MissingNode { .. })
        ));
    }

    #[test]
    fn derived_views_are_idempotent() {
        let mut forest = forest();
        let x = forest.spawn(OperatorKind::And, Point::ORIGIN).expect("x");
        let y = forest.spawn(OperatorKind::Or, Point::ORIGIN).expect("y");
        forest.attach_child(x, y, Side::Left).expect("attach");
        let first = forest.derive_views();
        let second = forest.derive_views();
        assert_eq!(first, second);
        assert_eq!(&first, forest.views());
    }

    #[test]
    fn state_hash_ignores_positions_but_tracks_links() {
        let mut forest = forest();
        let x = forest.spawn(OperatorKind::And, Point::ORIGIN).expect("x");
        let y = forest.spawn(OperatorKind::Or, Point::ORIGIN).expect("y");
        let before = forest.state_hash();
        forest
            .set_position(x, Point::new(300.0, 300.0))
            .expect("move");
        assert_eq!(forest.state_hash(), before);
        forest.attach_child(x, y, Side::Right).expect("attach");
        assert_ne!(forest.state_hash(), before);
    }

    #[test]
    fn remove_detaches_parent_and_children_first() {
        let mut forest = forest();
        let x = forest.spawn(OperatorKind::And, Point::ORIGIN).expect("x");
        let y = forest.spawn(OperatorKind::Or, Point::ORIGIN).expect("y");
        let z = forest.spawn(OperatorKind::Not, Point::ORIGIN).expect("z");
        forest.attach_child(x, y, Side::Left).expect("x<-y");
        forest.attach_child(y, z, Side::Right).expect("y<-z");

        let removed = forest.remove(y).expect("remove");
        assert!(removed.is_root());
        assert_eq!(removed.children(), crate::Children::default());
        assert!(!forest.contains(y));
        assert_eq!(forest.node(x).and_then(|n| n.children().left), None);
        assert_eq!(forest.parent_of(z), None);
        assert_eq!(forest.roots(), &[x, z]);
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn ancestry_queries_follow_parent_chain() {
        let mut forest = forest();
        let x = forest.spawn(OperatorKind::And, Point::ORIGIN).expect("x");
        let y = forest.spawn(OperatorKind::Or, Point::ORIGIN).expect("y");
        let z = forest.spawn(OperatorKind::Not, Point::ORIGIN).expect("z");
        let w = forest.spawn(OperatorKind::Not, Point::ORIGIN).expect("w");
        forest.attach_child(x, y, Side::Left).expect("x<-y");
        forest.attach_child(y, z, Side::Left).expect("y<-z");
        forest.attach_child(x, w, Side::Right).expect("x<-w");

        assert!(forest.is_ancestor(x, z));
        assert!(!forest.is_ancestor(z, x));
        assert!(!forest.is_ancestor(w, z));
        assert_eq!(forest.root_of(z), Some(x));
        assert_eq!(forest.subtree(x), vec![x, y, z, w]);
        assert_eq!(forest.subtree(y), vec![y, z]);
    }

    #[test]
    fn summary_lists_every_node() {
        let mut forest = forest();
        let x = forest
            .spawn(OperatorKind::And, Point::new(1.0, 2.0))
            .expect("x");
        let y = forest.spawn(OperatorKind::Or, Point::ORIGIN).expect("y");
        forest.attach_child(x, y, Side::Left).expect("attach");
        assert_eq!(
            forest.summary(),
            vec![
                "#1 AND root at (1, 2)".to_string(),
                "#2 OR in #1.left".to_string(),
            ]
        );
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut forest = forest();
        let _ = forest.spawn(OperatorKind::And, Point::ORIGIN).expect("x");
        let json = serde_json::to_value(forest.snapshot()).expect("serialize");
        assert_eq!(json["revision"], 1);
        assert_eq!(json["roots"], serde_json::json!([1]));
        assert_eq!(
            json["free_sockets"],
            serde_json::json!([
                {"owner": 1, "side": "left"},
                {"owner": 1, "side": "right"}
            ])
        );
    }
}
