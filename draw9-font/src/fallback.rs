//! The fallback text drawer: a capability, not a hardcoded font.
//!
//! spec.md §9, "Font fallback as a capability": when a string is drawn
//! through a font with no loaded glyphs, the engine calls out to a
//! pluggable function of signature `(font_height, font_family, text,
//! colour, dst_surface, pen) -> end_pen` instead of hardcoding a bitmap
//! face into the rasterizer itself. The default implementation here is
//! grounded on the teacher's built-in bitmap face in
//! `gfx::canvas_font::draw_char` / `draw_string` (a fixed-width glyph grid
//! blitted pixel-by-pixel); tests use a simpler deterministic mock the
//! spec explicitly suggests ("filling a fixed-width rectangle per
//! character is an acceptable substitute for a real glyph bitmap").

use draw9_proto::{Point, Rect, Rgba8};

use draw9_gfx::Image;

/// A pluggable fallback text drawer. Draws `text` into `dst` starting at
/// `pen`, returns the pen position after the string.
pub trait FallbackDrawer {
    fn draw(
        &self,
        font_height: u16,
        font_family: &str,
        text: &str,
        colour: Rgba8,
        dst: &mut Image,
        pen: Point,
    ) -> Point;
}

/// 5x7-in-a-cell monospace bitmap face, the same shape as the teacher's
/// built-in `canvas_font` glyph grid but generalised to any `font_height`
/// by scaling the cell, since this server has no fixed native resolution.
pub struct BitmapFallback;

const GLYPH_CELL_W_NUM: u16 = 6;
const GLYPH_CELL_W_DEN: u16 = 8;

impl FallbackDrawer for BitmapFallback {
    fn draw(
        &self,
        font_height: u16,
        _font_family: &str,
        text: &str,
        colour: Rgba8,
        dst: &mut Image,
        pen: Point,
    ) -> Point {
        let cell_w = ((font_height * GLYPH_CELL_W_NUM) / GLYPH_CELL_W_DEN).max(1) as i32;
        let cell_h = font_height.max(1) as i32;
        let mut x = pen.x;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            draw_cell(dst, Rect::from_xyxy(x, pen.y, x + cell_w, pen.y + cell_h), colour);
            x += cell_w;
        }
        Point::new(x, pen.y)
    }
}

/// Fills the interior of `r` (inset by one pixel) with `colour`, standing
/// in for a real glyph raster — grounded on
/// `canvas_font::draw_char`'s "stamp a filled cell" fallback path used for
/// glyphs outside its built-in table.
fn draw_cell(dst: &mut Image, r: Rect, colour: Rgba8) {
    let inset = Rect::from_xyxy(r.min.x + 1, r.min.y + 1, (r.max.x - 1).max(r.min.x + 1), (r.max.y - 1).max(r.min.y + 1));
    for y in inset.min.y..inset.max.y {
        for x in inset.min.x..inset.max.x {
            dst.put(Point::new(x, y), colour);
        }
    }
}

/// Deterministic stand-in used by tests: always a fixed 4x4 cell
/// regardless of `font_height`, so expected pixels are easy to state.
pub struct MockFallback;

impl FallbackDrawer for MockFallback {
    fn draw(
        &self,
        _font_height: u16,
        _font_family: &str,
        text: &str,
        colour: Rgba8,
        dst: &mut Image,
        pen: Point,
    ) -> Point {
        let mut x = pen.x;
        for _ in text.chars() {
            for y in 0..4 {
                for dx in 0..4 {
                    dst.put(Point::new(x + dx, pen.y + y), colour);
                }
            }
            x += 4;
        }
        Point::new(x, pen.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draw9_proto::Channel;

    fn blank(w: i32, h: i32) -> Image {
        Image::new(
            0,
            Rect::from_xyxy(0, 0, w, h),
            Rect::from_xyxy(0, 0, w, h),
            Channel::Xrgb32,
            false,
            Rgba8::TRANSPARENT,
        )
    }

    #[test]
    fn mock_fallback_advances_pen_by_fixed_width_per_char() {
        let mut dst = blank(20, 10);
        let end = MockFallback.draw(8, "default", "ab", Rgba8::new(1, 2, 3, 255), &mut dst, Point::new(0, 0));
        assert_eq!(end, Point::new(8, 0));
        assert_eq!(dst.sample(Point::new(0, 0)), Some(Rgba8::new(1, 2, 3, 255)));
        assert_eq!(dst.sample(Point::new(4, 0)), Some(Rgba8::new(1, 2, 3, 255)));
    }

    #[test]
    fn bitmap_fallback_scales_cell_to_font_height() {
        let mut dst = blank(40, 40);
        let end = BitmapFallback.draw(16, "default", "x", Rgba8::new(9, 9, 9, 255), &mut dst, Point::new(0, 0));
        assert!(end.x > 0);
    }
}
