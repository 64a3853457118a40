//! Node identity, operator vocabulary, sockets, and per-node link state.
//!
//! A [`Node`] only stores its *local* view of the tree: an optional parent
//! link and two child slots. Keeping both sides of every link consistent is
//! the job of the attachment protocol on [`crate::Forest`]; nothing here
//! mutates links.

use std::fmt;
use std::str::FromStr;

use brickyard_core::Point;
use serde::{Deserialize, Serialize};

use crate::ForestError;

/// Stable identifier for forest nodes.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node ID.
    pub const MIN: Self = Self(1);

    /// Create a new node ID, rejecting 0.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, ForestError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(ForestError::NodeIdOverflow { current: self });
        };
        Ok(Self(next))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Binary boolean operator carried by an operator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    And,
    Or,
    Not,
}

impl OperatorKind {
    /// Every operator in display order.
    pub const ALL: [Self; 3] = [Self::And, Self::Or, Self::Not];

    /// Lowercase name used in configuration and identifiers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }

    /// Uppercase label drawn on the node handle.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

impl FromStr for OperatorKind {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForestError::UnknownOperator {
                name: s.to_string(),
            })
    }
}

/// What a node is.
///
/// Only operators own sockets; placeholders are free-floating draggable
/// handles that can never be nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "operator", rename_all = "snake_case")]
pub enum NodeKind {
    Operator(OperatorKind),
    Placeholder,
}

impl NodeKind {
    /// True for operator nodes, the only kind with sockets.
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(self, Self::Operator(_))
    }

    /// Operator carried by this kind, if any.
    #[must_use]
    pub const fn operator(self) -> Option<OperatorKind> {
        match self {
            Self::Operator(op) => Some(op),
            Self::Placeholder => None,
        }
    }
}

impl From<OperatorKind> for NodeKind {
    fn from(op: OperatorKind) -> Self {
        Self::Operator(op)
    }
}

/// One of the two named child slots of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, left first.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// The opposite side.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named attachment point on an operator node.
///
/// Ordered by owner then side, which is also the nearest-socket tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Socket {
    pub owner: NodeId,
    pub side: Side,
}

impl Socket {
    #[must_use]
    pub const fn new(owner: NodeId, side: Side) -> Self {
        Self { owner, side }
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.side)
    }
}

/// The child's half of a link: which parent, and which socket of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentLink {
    pub parent: NodeId,
    pub side: Side,
}

impl ParentLink {
    /// The parent socket this link occupies.
    #[must_use]
    pub const fn socket(self) -> Socket {
        Socket::new(self.parent, self.side)
    }
}

/// The parent's half of its links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Children {
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl Children {
    /// Child in the given slot.
    #[must_use]
    pub const fn get(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn slot_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Occupied slots, left first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, NodeId)> + '_ {
        Side::ALL
            .into_iter()
            .filter_map(|side| self.get(side).map(|child| (side, child)))
    }

    /// True when both slots are occupied.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

/// One node of the forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    position: Point,
    parent: Option<ParentLink>,
    children: Children,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, position: Point) -> Self {
        Self {
            id,
            kind,
            position,
            parent: None,
            children: Children::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Shorthand for `self.kind().is_operator()`.
    #[must_use]
    pub const fn is_operator(&self) -> bool {
        self.kind.is_operator()
    }

    /// Stored position. Only meaningful while the node is a root; attached
    /// nodes are laid out by their parent and sit at the origin.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub const fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    #[must_use]
    pub const fn children(&self) -> Children {
        self.children
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub const fn has_child(&self, side: Side) -> bool {
        self.children.get(side).is_some()
    }

    /// Set the stored position, failing closed.
    ///
    /// A non-finite coordinate forces the node to [`Point::ORIGIN`] and
    /// reports [`ForestError::InvalidPosition`].
    pub fn set_position(&mut self, position: Point) -> Result<(), ForestError> {
        if position.is_finite() {
            self.position = position;
            return Ok(());
        }
        self.position = Point::ORIGIN;
        Err(ForestError::InvalidPosition {
            node_id: self.id,
            x: position.x,
            y: position.y,
        })
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ParentLink>) {
        self.parent = parent;
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        *self.children.slot_mut(side) = child;
    }
}
