//! Shared geometry, colour, channel, and error types for the `ninedraw`
//! `/dev/draw` compositor. Every other `draw9-*` crate depends on this one.

pub mod channel;
pub mod color;
pub mod error;
pub mod geom;

pub use channel::Channel;
pub use color::{Color32, Rgba8};
pub use error::{DrawError, DrawResult};
pub use geom::{Point, Rect};
