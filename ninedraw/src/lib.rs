//! `ninedraw` — a browser-resident compositor reproducing the server side
//! of Plan 9's `/dev/draw` graphics device.
//!
//! This crate is a thin facade over the `draw9-*` layer crates: it re-exports
//! the public seam described in SPEC_FULL.md §8 — [`Rasterizer::process`]
//! and [`Rasterizer::take_refresh`] — which is exactly what an external
//! transport, file-server protocol, or HTTP/WebSocket bridge would call
//! across. None of those collaborators live in this crate; see spec.md §1.

pub use draw9_engine::{EngineConfig, Rasterizer, RefreshRect};
pub use draw9_font::{BitmapFallback, FallbackDrawer, MockFallback};
pub use draw9_gfx::{Image, ImageStore, Operator, Screen};
pub use draw9_proto::{Channel, Color32, DrawError, DrawResult, Point, Rect, Rgba8};
