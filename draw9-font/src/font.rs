//! The per-font glyph metrics table and the cache keyed by backing-image id.
//!
//! spec.md §4.4: "A font is keyed by the id of its backing image. Cache
//! policy is none: the server decides when to evict by reusing indices via
//! `loadchar`." There's no teacher analogue (the teacher's bitmap font in
//! `canvas_font.rs` is a single fixed built-in face with no cache at all);
//! this is new code grounded in the cache-table shape spec.md §3 spells
//! out directly.

use std::collections::HashMap;

use draw9_proto::{DrawError, DrawResult};

use crate::glyph::GlyphMetrics;

/// A loaded font: glyph metrics keyed by index, plus ascent/height.
#[derive(Clone, Debug)]
pub struct Font {
    pub ascent: u16,
    pub height: u16,
    glyphs: Vec<GlyphMetrics>,
}

impl Font {
    /// `InitFont(font_id, n, ascent)`: allocates a metrics table of size
    /// `n + 1` (the extra slot is the sentinel), all zeroed, and sets
    /// `height = ascent` (spec.md §4.3, "InitFont").
    pub fn new(n: u16, ascent: u16) -> Self {
        Self {
            ascent,
            height: ascent,
            glyphs: vec![GlyphMetrics::default(); n as usize + 1],
        }
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len() - 1
    }

    pub fn glyph(&self, index: u16) -> DrawResult<GlyphMetrics> {
        if index as usize >= self.glyph_count() {
            return Err(DrawError::OutOfRange(format!(
                "glyph index {index} >= {}",
                self.glyph_count()
            )));
        }
        Ok(self.glyphs[index as usize])
    }

    /// `next_x` for `index`'s glyph, i.e. `glyphs[index + 1].x` — the
    /// sentinel bound that closes off the glyph's source rectangle.
    pub fn next_x(&self, index: u16) -> DrawResult<u16> {
        self.glyphs
            .get(index as usize + 1)
            .map(|g| g.x)
            .ok_or(DrawError::OutOfRange(format!(
                "glyph index {index} has no sentinel"
            )))
    }

    /// `LoadChar(font_id, src_id, index, r, p, left, width)`: stores the
    /// metrics for `index` and advances the sentinel at `index + 1` to
    /// `r.max.x`, growing `height` to cover `r.max.y` if needed (spec.md
    /// §4.3, "LoadChar").
    pub fn load_char(
        &mut self,
        index: u16,
        x: u16,
        top: u8,
        bottom: u8,
        left: i8,
        width: u8,
        sentinel_x: u16,
    ) -> DrawResult<()> {
        let count = self.glyph_count();
        if index as usize >= count {
            return Err(DrawError::OutOfRange(format!(
                "loadchar index {index} >= {count}"
            )));
        }
        self.glyphs[index as usize] = GlyphMetrics {
            x,
            top,
            bottom,
            left,
            width,
        };
        self.glyphs[index as usize + 1].x = sentinel_x;
        self.height = self.height.max(bottom as u16);
        Ok(())
    }

    /// spec.md §4.3, "Fallback": true once any real glyph (indices
    /// `0..n`, excluding the sentinel) has been given a nonzero advance.
    pub fn has_any_glyph(&self) -> bool {
        self.glyphs[..self.glyph_count()]
            .iter()
            .any(|g| g.width != 0)
    }
}

/// Fonts indexed by the id of their backing image. Eviction happens only
/// when the backing image is freed (spec.md §3, "Ownership": "a font
/// entry is deleted when its backing image is freed").
#[derive(Default)]
pub struct FontCache {
    fonts: HashMap<i32, Font>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, font_id: i32, n: u16, ascent: u16) {
        self.fonts.insert(font_id, Font::new(n, ascent));
    }

    pub fn get(&self, font_id: i32) -> Option<&Font> {
        self.fonts.get(&font_id)
    }

    pub fn get_mut(&mut self, font_id: i32) -> Option<&mut Font> {
        self.fonts.get_mut(&font_id)
    }

    /// Drops the font keyed by `font_id`, if any. Called whenever the
    /// rasterizer frees the corresponding image.
    pub fn on_image_freed(&mut self, font_id: i32) {
        self.fonts.remove(&font_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_font_zeroes_table_with_sentinel() {
        let f = Font::new(3, 10);
        assert_eq!(f.glyph_count(), 3);
        assert_eq!(f.height, 10);
        assert!(!f.has_any_glyph());
    }

    #[test]
    fn load_char_sets_metrics_and_sentinel() {
        let mut f = Font::new(2, 8);
        f.load_char(0, 0, 0, 8, 0, 4, 4).unwrap();
        let g = f.glyph(0).unwrap();
        assert_eq!(g.width, 4);
        assert_eq!(f.next_x(0).unwrap(), 4);
        assert!(f.has_any_glyph());
    }

    #[test]
    fn load_char_grows_height_to_max_bottom() {
        let mut f = Font::new(1, 8);
        f.load_char(0, 0, 0, 20, 0, 4, 4).unwrap();
        assert_eq!(f.height, 20);
    }

    #[test]
    fn load_char_rejects_out_of_range_index() {
        let mut f = Font::new(1, 8);
        assert!(f.load_char(5, 0, 0, 8, 0, 4, 4).is_err());
    }

    #[test]
    fn glyph_rejects_sentinel_index() {
        let mut f = Font::new(2, 8);
        f.load_char(0, 0, 0, 8, 0, 4, 4).unwrap();
        assert!(f.glyph(0).is_ok());
        assert!(f.glyph(2).is_err());
        assert!(f.glyph(5).is_err());
    }

    #[test]
    fn font_cache_drops_font_when_image_freed() {
        let mut cache = FontCache::new();
        cache.init(5, 1, 8);
        assert!(cache.get(5).is_some());
        cache.on_image_freed(5);
        assert!(cache.get(5).is_none());
    }

    #[test]
    fn pen_advances_by_exactly_glyph_width() {
        let mut f = Font::new(1, 8);
        f.load_char(0, 0, 0, 8, 0, 7, 10).unwrap();
        assert_eq!(f.glyph(0).unwrap().width, 7);
    }
}
