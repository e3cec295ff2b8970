//! The opcode dispatch loop: decodes a `/dev/draw` command buffer, drives
//! the image store, font cache, and rasterizer primitives, and accumulates
//! a refresh rectangle for the host to drain.

pub mod config;
pub mod opcode;
pub mod rasterizer;
pub mod refresh;

pub use config::EngineConfig;
pub use rasterizer::Rasterizer;
pub use refresh::RefreshRect;
