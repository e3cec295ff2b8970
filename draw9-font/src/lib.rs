//! Font glyph cache and string-drawing, plus the pluggable fallback
//! text-drawer capability used when a font has no loaded glyphs.

pub mod draw;
pub mod fallback;
pub mod font;
pub mod glyph;

pub use draw::{draw_string, fill_rect};
pub use fallback::{BitmapFallback, FallbackDrawer, MockFallback};
pub use font::{Font, FontCache};
pub use glyph::GlyphMetrics;
