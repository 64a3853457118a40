#![forbid(unsafe_code)]

//! Attachment-tree engine for the brickyard logic editor.
//!
//! A [`Forest`] is the flat collection of binary operator [`Node`]s on one
//! editing surface. Every link between two nodes is recorded on both ends
//! (the parent's socket and the child's parent link), and the attachment
//! protocol ([`Forest::attach_child`], [`Forest::detach_parent`], ...)
//! keeps those two halves consistent: a call either writes both or neither.
//!
//! The root set and the free-socket set are derived from the links and
//! refreshed after every structural change, at which point the forest hands
//! its [`VisualLayer`] a [`ForestSnapshot`].
//!
//! # Example
//!
//! ```
//! use brickyard_forest::{Forest, HeadlessLayer, OperatorKind, Point, Side};
//!
//! let mut forest = Forest::new(HeadlessLayer);
//! let and = forest.spawn(OperatorKind::And, Point::new(40.0, 40.0))?;
//! let or = forest.spawn(OperatorKind::Or, Point::new(300.0, 40.0))?;
//!
//! forest.attach_child(and, or, Side::Left)?;
//! assert_eq!(forest.roots(), &[and]);
//!
//! assert_eq!(forest.detach_parent(or)?, and);
//! assert_eq!(forest.roots(), &[and, or]);
//! # Ok::<(), brickyard_forest::ForestError>(())
//! ```

mod attach;
pub mod error;
pub mod forest;
pub mod invariant;
pub mod node;
pub mod socket;
pub mod visual;

pub use brickyard_core::Point;
pub use error::ForestError;
pub use forest::{Forest, ForestSnapshot, ForestViews};
pub use invariant::{
    ForestInvariantCode, ForestInvariantIssue, ForestInvariantReport, ForestInvariantSeverity,
};
pub use node::{Children, Node, NodeId, NodeKind, OperatorKind, ParentLink, Side, Socket};
pub use socket::{SOCKET_CAPTURE_RADIUS, SocketCandidate, nearest_socket};
pub use visual::{HeadlessLayer, VisualLayer};
