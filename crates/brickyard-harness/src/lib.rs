#![forbid(unsafe_code)]

//! Test harness for brickyard editors.
//!
//! [`SceneLayer`] stands in for a real rendering surface: it keeps handle
//! geometry in memory, answers the forest's geometry queries from it, and
//! logs every layout command so tests can assert on both the resulting
//! scene and the exact command sequence.

pub mod scene;

pub use scene::{
    LayerCommand, NODE_HEIGHT, NODE_WIDTH, SOCKET_HEIGHT, SOCKET_WIDTH, SceneLayer, slot_offset,
};
