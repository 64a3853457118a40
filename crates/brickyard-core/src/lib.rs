#![forbid(unsafe_code)]

//! Core: geometry primitives shared by every brickyard crate.
//!
//! # Role in brickyard
//! `brickyard-core` is the leaf crate. It owns the screen-space [`Point`],
//! [`Offset`], and [`Bounds`] types that the forest, the drag session, and
//! visual hosts exchange, plus an optional JSON logging bootstrap behind the
//! `tracing-json` feature.

pub mod geometry;

#[cfg(feature = "tracing-json")]
pub mod logging;

pub use geometry::{Bounds, Offset, Point};
