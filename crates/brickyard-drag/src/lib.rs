#![forbid(unsafe_code)]

//! Pointer-driven reparenting for brickyard forests.
//!
//! A [`DragSession`] turns host pointer events into forest operations:
//! grabbing a nested node detaches it, moving it tracks the nearest free
//! socket within [`DragConfig::capture_radius`], and releasing it attaches it
//! there. Pointer IDs and buttons are checked the same way a browser
//! pointer-capture adapter would, so stray events from a second pointer
//! cannot disturb an active gesture.

pub mod config;
pub mod session;

pub use config::{DragConfig, DragConfigError, PointerButton};
pub use session::{DragEffect, DragNoopReason, DragSession, DragState, DragTransition};
