//! Shared error kinds.
//!
//! The teacher expresses per-domain failures as small C-ABI-friendly enums
//! (`CompositorError`, `VideoError` in `video/src/graphics.rs`,
//! `abi::CompositorError` consumed by `video/src/compositor_context.rs`)
//! returned from `Result<T, E>`. This generalizes that pattern to a single
//! `thiserror`-derived enum (`thiserror` is the ecosystem's idiomatic
//! equivalent once `std` is available, per `kas-soft`'s dependency on it)
//! covering exactly the kinds spec.md §7 names.

use thiserror::Error;

/// Every way a command buffer can fail to execute, per spec.md §7.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DrawError {
    /// Truncated buffer, unknown opcode, or a delta-coord that would read
    /// past the end of the buffer.
    #[error("malformed command stream: {0}")]
    MalformedStream(String),

    /// An id that does not name a known image.
    #[error("unknown image id {0}")]
    UnknownImage(i32),

    /// A font id with no registered glyph table.
    #[error("unknown font id {0}")]
    UnknownFont(i32),

    /// A glyph index, rectangle, or byte count outside its valid range.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// Surface or glyph table allocation failed.
    #[error("allocation failed: {0}")]
    AllocationFailure(String),

    /// An attempt to free or invalidly resize the display image (id 0).
    #[error("display invariant violated: {0}")]
    DisplayInvariant(String),
}

pub type DrawResult<T> = Result<T, DrawError>;
