//! Seam between the forest and whatever draws it.
//!
//! The forest never reads layout internals. It asks the visual layer for
//! geometry (what is under the pointer, where a handle or socket is on
//! screen) and commands it after structural changes (nest this handle, pull
//! that one back out, raise it, redraw decorations).

use brickyard_core::Point;

use crate::{ForestSnapshot, Node, NodeId, Side, Socket};

/// Host-side presentation of a forest.
///
/// Geometry queries are required. Commands default to no-ops so read-only or
/// headless hosts only implement what they render.
pub trait VisualLayer {
    /// Node whose handle sits under `point`, topmost first.
    fn locate_node_at(&self, point: Point) -> Option<NodeId>;

    /// Current on-screen top-left of a node's handle, wherever it is nested.
    fn visual_origin(&self, node: NodeId) -> Option<Point>;

    /// Current on-screen center of a socket.
    fn visual_center(&self, socket: Socket) -> Option<Point>;

    /// Create a handle for a freshly spawned node at its stored position.
    fn spawn_handle(&mut self, _node: &Node) {}

    /// Drop the handle of a removed node.
    fn discard_handle(&mut self, _node: NodeId) {}

    /// Move a root handle to an absolute position.
    fn place(&mut self, _node: NodeId, _position: Point) {}

    /// Raise a root handle above every other handle.
    fn bring_to_front(&mut self, _node: NodeId) {}

    /// Reparent `child`'s handle into `parent`'s socket so it flows with it.
    fn nest_under(&mut self, _parent: NodeId, _side: Side, _child: NodeId) {}

    /// Pull a handle back out to independent, absolutely positioned layout.
    fn restore_independent_layout(&mut self, _node: NodeId) {}

    /// Highlight the drop candidate, or clear the highlight with `None`.
    fn highlight_socket(&mut self, _socket: Option<Socket>) {}

    /// Fired after every spawn, removal, attach, and detach.
    fn on_structural_change(&mut self, _snapshot: &ForestSnapshot) {}
}

/// A visual layer with no screen.
///
/// Every geometry query answers `None`, so detached nodes land at the origin
/// and no socket is ever within reach. Useful for scripting forests and for
/// structural tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessLayer;

impl VisualLayer for HeadlessLayer {
    fn locate_node_at(&self, _point: Point) -> Option<NodeId> {
        None
    }

    fn visual_origin(&self, _node: NodeId) -> Option<Point> {
        None
    }

    fn visual_center(&self, _socket: Socket) -> Option<Point> {
        None
    }
}
