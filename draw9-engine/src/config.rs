//! Engine configuration.
//!
//! SPEC_FULL.md "Ambient Stack — Configuration": "a small `EngineConfig`
//! (initial display size, default channel) passed to `Rasterizer::new`,
//! mirroring the teacher's `lib/src/testing/config.rs` pattern of a plain
//! struct with `Default`." Per spec.md §6, "No CLI, no environment
//! variables inside the core" — this struct is the only way to parameterize
//! a `Rasterizer`.

use draw9_proto::Channel;

/// Parameters fixed at construction time; everything else arrives over the
/// command stream.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Initial width/height of the display image (id 0).
    pub display_width: i32,
    pub display_height: i32,
    /// Channel the display surface reports through `Init`/ctl records
    /// before any `alloc` touches it.
    pub default_channel: Channel,
    /// The ASCII label `Init` reports, NUL-padded to 128 bytes.
    pub label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display_width: 640,
            display_height: 480,
            default_channel: Channel::Xrgb32,
            label: "ninedraw".to_string(),
        }
    }
}
