#![forbid(unsafe_code)]

//! In-memory scene that lays out node handles on a fixed grid.
//!
//! Every handle is a `NODE_WIDTH` x `NODE_HEIGHT` box. Root handles sit at
//! their absolute position; nested handles sit at their parent's origin plus
//! the slot offset of the socket they occupy, so a whole tree moves with its
//! root. Sockets are `SOCKET_WIDTH` x `SOCKET_HEIGHT` boxes at the same slot
//! offsets.

use std::collections::BTreeMap;

use brickyard_core::{Bounds, Offset, Point};
use brickyard_forest::{ForestSnapshot, Node, NodeId, Side, Socket, VisualLayer};
use serde::Serialize;

pub const NODE_WIDTH: f64 = 160.0;
pub const NODE_HEIGHT: f64 = 64.0;
pub const SOCKET_WIDTH: f64 = 56.0;
pub const SOCKET_HEIGHT: f64 = 32.0;

const LOG_TARGET: &str = "brickyard.harness";

/// Top-left of a socket slot relative to its owner's origin.
#[must_use]
pub const fn slot_offset(side: Side) -> Offset {
    match side {
        Side::Left => Offset::new(8.0, 24.0),
        Side::Right => Offset::new(96.0, 24.0),
    }
}

/// Layout command received from the forest, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LayerCommand {
    Spawn { node: NodeId, x: f64, y: f64 },
    Discard { node: NodeId },
    Place { node: NodeId, x: f64, y: f64 },
    BringToFront { node: NodeId },
    NestUnder { parent: NodeId, side: Side, child: NodeId },
    RestoreIndependentLayout { node: NodeId },
    Highlight { socket: Option<Socket> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Handle {
    position: Point,
    nested_in: Option<Socket>,
    z: u64,
}

/// A [`VisualLayer`] with deterministic geometry and a command log.
#[derive(Debug, Default)]
pub struct SceneLayer {
    handles: BTreeMap<NodeId, Handle>,
    next_z: u64,
    highlighted: Option<Socket>,
    commands: Vec<LayerCommand>,
    snapshots: Vec<ForestSnapshot>,
}

impl SceneLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far.
    #[must_use]
    pub fn commands(&self) -> &[LayerCommand] {
        &self.commands
    }

    /// Drain the command log.
    pub fn take_commands(&mut self) -> Vec<LayerCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Command log as JSON lines.
    #[must_use]
    pub fn commands_jsonl(&self) -> String {
        self.commands
            .iter()
            .filter_map(|command| serde_json::to_string(command).ok())
            .map(|line| line + "\n")
            .collect()
    }

    /// Socket currently drawn as the drop candidate.
    #[must_use]
    pub const fn highlighted(&self) -> Option<Socket> {
        self.highlighted
    }

    /// Every snapshot received through `on_structural_change`.
    #[must_use]
    pub fn snapshots(&self) -> &[ForestSnapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn last_snapshot(&self) -> Option<&ForestSnapshot> {
        self.snapshots.last()
    }

    /// True when the node's handle is laid out inside a parent socket.
    #[must_use]
    pub fn is_nested(&self, node: NodeId) -> bool {
        self.handles
            .get(&node)
            .is_some_and(|handle| handle.nested_in.is_some())
    }

    /// Root handles from bottom to top.
    #[must_use]
    pub fn stacking_order(&self) -> Vec<NodeId> {
        let mut roots: Vec<(u64, NodeId)> = self
            .handles
            .iter()
            .filter(|(_, handle)| handle.nested_in.is_none())
            .map(|(id, handle)| (handle.z, *id))
            .collect();
        roots.sort_unstable();
        roots.into_iter().map(|(_, id)| id).collect()
    }

    /// On-screen box of a node's handle.
    #[must_use]
    pub fn handle_bounds(&self, node: NodeId) -> Option<Bounds> {
        self.visual_origin(node)
            .map(|origin| Bounds::at(origin, NODE_WIDTH, NODE_HEIGHT))
    }

    /// On-screen box of a socket slot.
    #[must_use]
    pub fn socket_bounds(&self, socket: Socket) -> Option<Bounds> {
        self.visual_origin(socket.owner).map(|origin| {
            Bounds::at(
                origin.translate(slot_offset(socket.side)),
                SOCKET_WIDTH,
                SOCKET_HEIGHT,
            )
        })
    }

    /// Hex digest of every handle's resolved geometry and stacking.
    #[must_use]
    pub fn scene_checksum(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (id, handle) in &self.handles {
            let origin = self.visual_origin(*id).unwrap_or(Point::ORIGIN);
            hasher.update(&id.get().to_le_bytes());
            hasher.update(&origin.x.to_le_bytes());
            hasher.update(&origin.y.to_le_bytes());
            hasher.update(&handle.z.to_le_bytes());
            let nested = handle
                .nested_in
                .map_or_else(String::new, |socket| socket.to_string());
            hasher.update(nested.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Nesting depth and the z of the root the handle is drawn under.
    fn stacking_key(&self, node: NodeId) -> Option<(u64, usize)> {
        let mut depth = 0;
        let mut cursor = self.handles.get(&node)?;
        while let Some(socket) = cursor.nested_in {
            depth += 1;
            if depth > self.handles.len() {
                return None;
            }
            cursor = self.handles.get(&socket.owner)?;
        }
        Some((cursor.z, depth))
    }

    fn raise(&mut self) -> u64 {
        self.next_z += 1;
        self.next_z
    }
}

impl VisualLayer for SceneLayer {
    fn locate_node_at(&self, point: Point) -> Option<NodeId> {
        self.handles
            .keys()
            .filter(|id| {
                self.handle_bounds(**id)
                    .is_some_and(|bounds| bounds.contains(point))
            })
            .filter_map(|id| self.stacking_key(*id).map(|key| (key, *id)))
            .max()
            .map(|(_, id)| id)
    }

    fn visual_origin(&self, node: NodeId) -> Option<Point> {
        let mut offset = Offset::ZERO;
        let mut cursor = self.handles.get(&node)?;
        for _ in 0..=self.handles.len() {
            match cursor.nested_in {
                Some(socket) => {
                    let slot = slot_offset(socket.side);
                    offset = Offset::new(offset.dx + slot.dx, offset.dy + slot.dy);
                    cursor = self.handles.get(&socket.owner)?;
                }
                None => return Some(cursor.position.translate(offset)),
            }
        }
        None
    }

    fn visual_center(&self, socket: Socket) -> Option<Point> {
        self.socket_bounds(socket).map(|bounds| bounds.center())
    }

    fn spawn_handle(&mut self, node: &Node) {
        let z = self.raise();
        let position = node.position();
        let _ = self.handles.insert(
            node.id(),
            Handle {
                position,
                nested_in: None,
                z,
            },
        );
        self.commands.push(LayerCommand::Spawn {
            node: node.id(),
            x: position.x,
            y: position.y,
        });
    }

    fn discard_handle(&mut self, node: NodeId) {
        let _ = self.handles.remove(&node);
        self.commands.push(LayerCommand::Discard { node });
    }

    fn place(&mut self, node: NodeId, position: Point) {
        if let Some(handle) = self.handles.get_mut(&node) {
            handle.position = position;
        }
        self.commands.push(LayerCommand::Place {
            node,
            x: position.x,
            y: position.y,
        });
    }

    fn bring_to_front(&mut self, node: NodeId) {
        let z = self.raise();
        if let Some(handle) = self.handles.get_mut(&node) {
            handle.z = z;
        }
        self.commands.push(LayerCommand::BringToFront { node });
    }

    fn nest_under(&mut self, parent: NodeId, side: Side, child: NodeId) {
        if let Some(handle) = self.handles.get_mut(&child) {
            handle.nested_in = Some(Socket::new(parent, side));
            handle.position = Point::ORIGIN;
        }
        self.commands
            .push(LayerCommand::NestUnder { parent, side, child });
    }

    fn restore_independent_layout(&mut self, node: NodeId) {
        if let Some(handle) = self.handles.get_mut(&node) {
            handle.nested_in = None;
        }
        self.commands
            .push(LayerCommand::RestoreIndependentLayout { node });
    }

    fn highlight_socket(&mut self, socket: Option<Socket>) {
        self.highlighted = socket;
        self.commands.push(LayerCommand::Highlight { socket });
    }

    fn on_structural_change(&mut self, snapshot: &ForestSnapshot) {
        tracing::trace!(
            target: LOG_TARGET,
            revision = snapshot.revision,
            roots = snapshot.roots.len(),
            free_sockets = snapshot.free_sockets.len(),
            "structural change"
        );
        self.snapshots.push(snapshot.clone());
    }
}
