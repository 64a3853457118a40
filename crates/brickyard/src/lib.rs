#![forbid(unsafe_code)]

//! Brickyard public facade.
//!
//! Brickyard is the core of a drag-and-drop editor for trees of binary logic
//! operators (AND, OR, NOT). Users spawn operator nodes on a surface, drag
//! them around, and snap them into each other's left/right sockets to build
//! expressions. This crate wires the pieces together:
//!
//! - [`forest`]: nodes, the two-sided attachment protocol, derived root and
//!   free-socket views, and the [`VisualLayer`] seam to whatever draws them.
//! - [`drag`]: the pointer drag session that detaches, tracks the nearest
//!   socket, and reattaches.
//! - [`Editor`]: one surface holding both, configured by [`EditorConfig`].
//!
//! # Quick start
//!
//! ```
//! use brickyard::prelude::*;
//!
//! let mut editor = Editor::with_defaults(HeadlessLayer);
//! let and = editor.spawn_operator("and", Point::new(40.0, 40.0))?;
//! let or = editor.spawn(OperatorKind::Or, Point::new(300.0, 40.0))?;
//! editor.attach_child(and, or, Side::Right)?;
//! assert_eq!(editor.forest().roots(), &[and]);
//! # Ok::<(), brickyard::Error>(())
//! ```

pub mod config;
pub mod editor;
pub mod error;

pub use config::{ConfigError, DEFAULT_LOG_FILTER, EditorConfig, LoggingConfig};
pub use editor::Editor;
pub use error::{Error, Result};

pub use brickyard_core::{Bounds, Offset, Point};
pub use brickyard_drag::{
    DragConfig, DragEffect, DragNoopReason, DragSession, DragState, DragTransition, PointerButton,
};
pub use brickyard_forest::{
    Forest, ForestError, ForestSnapshot, HeadlessLayer, Node, NodeId, NodeKind, OperatorKind,
    Side, Socket, VisualLayer,
};

pub use brickyard_core as core;
pub use brickyard_drag as drag;
pub use brickyard_forest as forest;

/// Common imports for editor hosts.
pub mod prelude {
    pub use crate::{
        DragEffect, Editor, EditorConfig, Error, HeadlessLayer, NodeId, NodeKind, OperatorKind,
        Point, PointerButton, Result, Side, Socket, VisualLayer,
    };

    pub use crate::{core, drag, forest};
}
