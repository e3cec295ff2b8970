//! Glyph compositing: turns a string plus a font's metrics table into
//! pixel writes on a destination image. spec.md §4.3, "String".
//!
//! Grounded on the teacher's `canvas_font::draw_string`, which walks a
//! string one glyph at a time and advances a pen; generalised here to
//! read glyph rectangles out of a loaded [`Font`] rather than a hardcoded
//! table, and to treat the glyph raster as an alpha mask composited
//! through the rasterizer's operator rather than an opaque blit (spec.md
//! §4.3: "the font image's alpha (or, for non-alpha channels, coverage
//! implied by the glyph rectangle) acts as a mask; ink takes its colour
//! from sampling `src` at `sp`, not from the font image itself").

use draw9_proto::{Point, Rect, Rgba8};

use draw9_gfx::operator::composite;
use draw9_gfx::{Image, Operator};

use crate::font::Font;

/// Draws `text` against `font`, whose backing glyph raster lives in
/// `font_image`. Ink colour is sampled from `src` at `sp` (held fixed,
/// per spec.md's "String" — `sp` does not advance with the pen, matching
/// Plan 9's single-colour string draws). `bg` optionally fills the full
/// string's bounding box first, sampled from `bg_src`/`bgp`. Returns the
/// pen position after the last glyph, i.e. `(pen_x, p.y)`.
#[allow(clippy::too_many_arguments)]
pub fn draw_string(
    dst: &mut Image,
    clip: Rect,
    font: &Font,
    font_image: &Image,
    text_glyphs: &[u16],
    p: Point,
    src: &Image,
    sp: Point,
    op: Operator,
    bg: Option<(&Image, Point)>,
) -> Point {
    if let Some((bg_src, bgp)) = bg {
        let total_width: i32 = text_glyphs
            .iter()
            .filter_map(|&idx| font_glyph_advance(font, idx))
            .sum();
        let bg_rect = Rect::from_xyxy(
            p.x,
            p.y - font.ascent as i32,
            p.x + total_width,
            p.y - font.ascent as i32 + font.height as i32,
        );
        fill_rect(dst, clip, bg_rect, bg_src, bgp, op);
    }

    let mut pen_x = p.x;
    for &index in text_glyphs {
        let Ok(glyph) = font.glyph(index) else {
            continue;
        };
        let Ok(next_x) = font.next_x(index) else {
            continue;
        };
        if glyph.is_empty_slot(next_x) {
            continue;
        }

        let glyph_rect = Rect::from_xyxy(
            glyph.x as i32,
            glyph.top as i32,
            next_x as i32,
            glyph.bottom as i32,
        );
        let dst_origin = Point::new(pen_x + glyph.left as i32, p.y - font.ascent as i32 + glyph.top as i32);

        for gy in glyph_rect.min.y..glyph_rect.max.y {
            for gx in glyph_rect.min.x..glyph_rect.max.x {
                let Some(mask_px) = font_image.sample(Point::new(gx, gy)) else {
                    continue;
                };
                if mask_px.a == 0 {
                    continue;
                }
                let dst_p = dst_origin + (Point::new(gx, gy) - glyph_rect.min);
                if !clip.contains(dst_p) {
                    continue;
                }
                let mut ink = src.sample(sp).unwrap_or(Rgba8::TRANSPARENT);
                ink.a = ((ink.a as u32 * mask_px.a as u32) / 255) as u8;
                let under = dst.sample(dst_p).unwrap_or(Rgba8::TRANSPARENT);
                dst.put(dst_p, composite(op, ink, under));
            }
        }

        pen_x += glyph.width as i32;
    }

    Point::new(pen_x, p.y)
}

fn font_glyph_advance(font: &Font, index: u16) -> Option<i32> {
    let glyph = font.glyph(index).ok()?;
    let next_x = font.next_x(index).ok()?;
    if glyph.is_empty_slot(next_x) {
        return Some(0);
    }
    Some(glyph.width as i32)
}

/// Fills `r` (clipped to `clip`) on `dst` by sampling colour from `src`
/// starting at `sp`, composited through `op`. Shared by [`draw_string`]'s
/// own background fill and by callers that draw a background rectangle
/// for a string on a path that doesn't otherwise go through this module
/// (e.g. the fallback text drawer).
pub fn fill_rect(dst: &mut Image, clip: Rect, r: Rect, src: &Image, sp: Point, op: Operator) {
    let r = r.intersect(&clip);
    if r.is_empty() {
        return;
    }
    for y in r.min.y..r.max.y {
        for x in r.min.x..r.max.x {
            let p = Point::new(x, y);
            let Some(color) = src.sample(sp + (p - r.min)) else {
                continue;
            };
            let under = dst.sample(p).unwrap_or(Rgba8::TRANSPARENT);
            dst.put(p, composite(op, color, under));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draw9_proto::Channel;

    fn blank(w: i32, h: i32, fill: Rgba8) -> Image {
        Image::new(0, Rect::from_xyxy(0, 0, w, h), Rect::from_xyxy(0, 0, w, h), Channel::Xrgb32, false, fill)
    }

    #[test]
    fn draws_single_glyph_and_advances_pen() {
        let mut font = Font::new(1, 8);
        font.load_char(0, 0, 0, 8, 0, 4, 4).unwrap();

        let mut font_image = blank(4, 8, Rgba8::TRANSPARENT);
        for y in 0..8 {
            for x in 0..4 {
                font_image.put(Point::new(x, y), Rgba8::new(0, 0, 0, 0xFF));
            }
        }

        let src = Image::new(1, Rect::from_xyxy(0, 0, 1, 1), Rect::from_xyxy(0, 0, 1, 1), Channel::Xrgb32, true, Rgba8::new(9, 9, 9, 0xFF));
        let mut dst = blank(20, 20, Rgba8::TRANSPARENT);
        let clip = Rect::from_xyxy(0, 0, 20, 20);

        let end = draw_string(&mut dst, clip, &font, &font_image, &[0], Point::new(2, 8), &src, Point::ZERO, Operator::SoverD, None);
        assert_eq!(end, Point::new(6, 8));
        assert_eq!(dst.sample(Point::new(2, 0)), Some(Rgba8::new(9, 9, 9, 0xFF)));
    }

    #[test]
    fn empty_glyph_slot_does_not_advance_pen() {
        let font = Font::new(1, 8);
        let font_image = blank(4, 8, Rgba8::TRANSPARENT);
        let src = Image::new(1, Rect::from_xyxy(0, 0, 1, 1), Rect::from_xyxy(0, 0, 1, 1), Channel::Xrgb32, true, Rgba8::new(9, 9, 9, 0xFF));
        let mut dst = blank(20, 20, Rgba8::TRANSPARENT);
        let clip = Rect::from_xyxy(0, 0, 20, 20);

        let end = draw_string(&mut dst, clip, &font, &font_image, &[0], Point::new(2, 8), &src, Point::ZERO, Operator::SoverD, None);
        assert_eq!(end, Point::new(2, 8));
    }
}
