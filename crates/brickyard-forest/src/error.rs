//! Forest error model.
//!
//! Every variant is local and non-fatal: the rejected operation is a no-op
//! and the forest is left as it was, with the single exception of
//! [`ForestError::InvalidPosition`], which still forces the node to the
//! origin.

use std::fmt;

use crate::{NodeId, Socket};

/// Structured reasons a forest operation was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ForestError {
    /// The child is already linked under some parent.
    AlreadyHasParent {
        child: NodeId,
        parent: NodeId,
    },
    /// The target socket already holds a child.
    SocketOccupied {
        socket: Socket,
        occupant: NodeId,
    },
    /// A node cannot be attached to itself.
    SelfAttachment {
        node_id: NodeId,
    },
    /// The socket to detach from is already free.
    NoSuchChildToDetach {
        socket: Socket,
    },
    /// The node to detach is already a root.
    NoParentToDetach {
        node_id: NodeId,
    },
    /// A coordinate was NaN or infinite; the node was moved to the origin.
    InvalidPosition {
        node_id: NodeId,
        x: f64,
        y: f64,
    },
    /// The node ID is not registered in this forest.
    MissingNode {
        node_id: NodeId,
    },
    /// Placeholders have no sockets and cannot be nested.
    NotAnOperator {
        node_id: NodeId,
    },
    /// The attach would make a node its own ancestor.
    AncestorConflict {
        ancestor: NodeId,
        descendant: NodeId,
    },
    /// No operator has this name.
    UnknownOperator {
        name: String,
    },
    NodeIdOverflow {
        current: NodeId,
    },
}

impl ForestError {
    /// Stable short code used as a structured log field.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AlreadyHasParent { .. } => "already_has_parent",
            Self::SocketOccupied { .. } => "socket_occupied",
            Self::SelfAttachment { .. } => "self_attachment",
            Self::NoSuchChildToDetach { .. } => "no_such_child_to_detach",
            Self::NoParentToDetach { .. } => "no_parent_to_detach",
            Self::InvalidPosition { .. } => "invalid_position",
            Self::MissingNode { .. } => "missing_node",
            Self::NotAnOperator { .. } => "not_an_operator",
            Self::AncestorConflict { .. } => "ancestor_conflict",
            Self::UnknownOperator { .. } => "unknown_operator",
            Self::NodeIdOverflow { .. } => "node_id_overflow",
        }
    }
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyHasParent { child, parent } => {
                write!(f, "node {child} already has parent {parent}")
            }
            Self::SocketOccupied { socket, occupant } => {
                write!(f, "socket {socket} is already occupied by {occupant}")
            }
            Self::SelfAttachment { node_id } => {
                write!(f, "node {node_id} cannot be attached to itself")
            }
            Self::NoSuchChildToDetach { socket } => {
                write!(f, "no child in socket {socket} to detach")
            }
            Self::NoParentToDetach { node_id } => {
                write!(f, "node {node_id} has no parent to detach")
            }
            Self::InvalidPosition { node_id, x, y } => write!(
                f,
                "node {node_id} position ({x}, {y}) is not finite; reset to origin"
            ),
            Self::MissingNode { node_id } => write!(f, "node {node_id} not found"),
            Self::NotAnOperator { node_id } => {
                write!(f, "node {node_id} is not an operator and has no sockets")
            }
            Self::AncestorConflict {
                ancestor,
                descendant,
            } => write!(
                f,
                "operation would create cycle: node {ancestor} is an ancestor of {descendant}"
            ),
            Self::UnknownOperator { name } => write!(f, "unknown operator {name:?}"),
            Self::NodeIdOverflow { current } => write!(f, "node id overflow after {current}"),
        }
    }
}

impl std::error::Error for ForestError {}
