//! Compositing primitives: blit, line, ellipse, arc, polygon.
//!
//! Grounded on the teacher's `gfx::canvas_ops` (Bresenham line, midpoint
//! circle, scanline-filled triangle), generalized in three ways the
//! teacher's single-surface-overwrite model doesn't need: every write goes
//! through [`crate::operator::composite`] under the rasterizer's current
//! operator, every destination pixel is intersected with `clipr(dst)`
//! (spec.md §4.3, "Clip discipline"), and colour comes from sampling a
//! source image (`src.sample(sp + offset)`, honouring replication) rather
//! than a literal `Color32` argument.

use draw9_proto::{Point, Rect, Rgba8};

use crate::image::Image;
use crate::operator::{composite, Operator};

/// The rectangle every drawing opcode is clipped to: `clipr(dst) ∩ r(dst)`
/// (spec.md §4.3).
fn effective_clip(dst: &Image) -> Rect {
    dst.clipr.intersect(&dst.r)
}

/// Composites `color` onto `dst` at `p` under `op`, clipped to
/// `effective_clip(dst)`. The shared inner step for every primitive below.
fn blend_pixel(dst: &mut Image, p: Point, color: Rgba8, op: Operator, clip: Rect) {
    if !clip.contains(p) {
        return;
    }
    let under = dst.sample(p).unwrap_or(Rgba8::TRANSPARENT);
    dst.put(p, composite(op, color, under));
}

/// `draw` / opcode `d`: blits `r` worth of pixels from `src` (optionally
/// masked by `mask`) into `dst`. spec.md §4.3, "Blit".
///
/// `src` and `mask` are borrowed immutably and may not alias `dst` — the
/// caller ([`draw9_engine`]) is responsible for cloning when `src_id` or
/// `mask_id` equals `dst_id` (self-blits read the pre-draw state, which a
/// clone naturally provides).
pub fn blit(
    dst: &mut Image,
    src: &Image,
    mask: Option<&Image>,
    r: Rect,
    sp: Point,
    mp: Point,
    op: Operator,
) -> Option<Rect> {
    let clip = effective_clip(dst).intersect(&r);
    if clip.is_empty() {
        return None;
    }
    for y in clip.min.y..clip.max.y {
        for x in clip.min.x..clip.max.x {
            let dst_p = Point::new(x, y);
            let src_p = sp + (dst_p - r.min);
            let Some(mut color) = src.sample(src_p) else {
                continue;
            };
            if let Some(mask_img) = mask {
                let mask_p = mp + (dst_p - r.min);
                let coverage = mask_img.sample(mask_p).map(|m| m.a).unwrap_or(0);
                color.a = ((color.a as u32 * coverage as u32) / 255) as u8;
            }
            blend_pixel(dst, dst_p, color, op, clip);
        }
    }
    Some(clip)
}

/// `line` / opcode `L`. Stroke width `max(1, 2*radius)`; endcaps are
/// approximated as square for every `end0`/`end1` value (spec.md §4.3
/// permits approximating "arrow" as round — this implementation treats
/// every cap alike, which is a conservative specialisation of that
/// allowance; round/disc caps additionally round the two ends).
pub fn line(
    dst: &mut Image,
    p0: Point,
    p1: Point,
    round_caps: bool,
    radius: i32,
    color: Rgba8,
    op: Operator,
) -> Option<Rect> {
    let clip = effective_clip(dst);
    if clip.is_empty() {
        return None;
    }
    let half = radius.max(0);
    let stroke = |dst: &mut Image, cx: i32, cy: i32| {
        for dy in -half..=half {
            for dx in -half..=half {
                if round_caps && dx * dx + dy * dy > half * half {
                    continue;
                }
                blend_pixel(dst, Point::new(cx + dx, cy + dy), color, op, clip);
            }
        }
    };

    let dx = (p1.x - p0.x).abs();
    let dy = -(p1.y - p0.y).abs();
    let sx = if p0.x < p1.x { 1 } else { -1 };
    let sy = if p0.y < p1.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut cx, mut cy) = (p0.x, p0.y);
    let mut bbox: Option<Rect> = None;
    loop {
        stroke(dst, cx, cy);
        bbox = Some(match bbox {
            Some(b) => b.union(&Rect::from_xyxy(cx - half, cy - half, cx + half + 1, cy + half + 1)),
            None => Rect::from_xyxy(cx - half, cy - half, cx + half + 1, cy + half + 1),
        });
        if cx == p1.x && cy == p1.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += sx;
        }
        if e2 <= dx {
            err += dx;
            cy += sy;
        }
    }
    bbox.map(|b| b.intersect(&clip))
}

/// `ellipse` / `ellipsefill`, opcodes `e` / `E`. `thick < 0` (or the `E`
/// opcode) means filled; angle parameters are accepted by the engine layer
/// but ignored here since they only matter for arcs (spec.md §4.3).
pub fn ellipse(
    dst: &mut Image,
    center: Point,
    a: i32,
    b: i32,
    thick: i32,
    color: Rgba8,
    op: Operator,
) -> Option<Rect> {
    let clip = effective_clip(dst);
    if clip.is_empty() || a <= 0 || b <= 0 {
        return None;
    }
    let filled = thick < 0;
    let thick = thick.max(1);

    let inside = |x: i32, y: i32, ra: i32, rb: i32| -> bool {
        if ra <= 0 || rb <= 0 {
            return false;
        }
        // Normalised ellipse test scaled to avoid floats in the hot loop.
        let rx = ra as i64;
        let ry = rb as i64;
        let nx = x as i64;
        let ny = y as i64;
        (nx * nx * ry * ry + ny * ny * rx * rx) <= rx * rx * ry * ry
    };

    for y in -b..=b {
        for x in -a..=a {
            let hit = if filled {
                inside(x, y, a, b)
            } else {
                inside(x, y, a, b) && !inside(x, y, a - thick, b - thick)
            };
            if hit {
                blend_pixel(dst, center + Point::new(x, y), color, op, clip);
            }
        }
    }
    let bbox = Rect::from_xyxy(center.x - a, center.y - b, center.x + a + 1, center.y + b + 1);
    Some(bbox.intersect(&clip))
}

/// `arc`, opcode `a`. `alpha` is the extent and `phi` the start angle, both
/// in 64ths of a degree; positive `alpha` sweeps counter-clockwise from
/// `phi` (spec.md §9, "Arc angles"). Negative `thick` draws a filled pie
/// slice closed by a line to the centre.
#[allow(clippy::too_many_arguments)]
pub fn arc(
    dst: &mut Image,
    center: Point,
    a: i32,
    b: i32,
    thick: i32,
    alpha_64deg: i32,
    phi_64deg: i32,
    color: Rgba8,
    op: Operator,
) -> Option<Rect> {
    let clip = effective_clip(dst);
    if clip.is_empty() || a <= 0 || b <= 0 {
        return None;
    }
    let filled = thick < 0;
    let thick = thick.max(1);

    let phi = (phi_64deg as f64 / 64.0).to_radians();
    let alpha = (alpha_64deg as f64 / 64.0).to_radians();
    let (start, end) = if alpha >= 0.0 {
        (phi, phi + alpha)
    } else {
        (phi + alpha, phi)
    };
    let span = end - start;

    let angle_in_range = |x: i32, y: i32| -> bool {
        // Counter-clockwise in a Y-down pixel grid means negating y before
        // calling atan2, so increasing angle matches increasing `phi`.
        let mut theta = (-(y as f64)).atan2(x as f64);
        if theta < start {
            theta += std::f64::consts::TAU;
        }
        theta >= start && theta <= start + span.max(0.0).min(std::f64::consts::TAU)
    };

    let ellipse_inside = |x: i32, y: i32, ra: i32, rb: i32| -> bool {
        if ra <= 0 || rb <= 0 {
            return false;
        }
        let rx = ra as i64;
        let ry = rb as i64;
        let nx = x as i64;
        let ny = y as i64;
        (nx * nx * ry * ry + ny * ny * rx * rx) <= rx * rx * ry * ry
    };

    for y in -b..=b {
        for x in -a..=a {
            if x == 0 && y == 0 {
                if filled {
                    blend_pixel(dst, center, color, op, clip);
                }
                continue;
            }
            if !angle_in_range(x, y) {
                continue;
            }
            let hit = if filled {
                ellipse_inside(x, y, a, b)
            } else {
                ellipse_inside(x, y, a, b) && !ellipse_inside(x, y, a - thick, b - thick)
            };
            if hit {
                blend_pixel(dst, center + Point::new(x, y), color, op, clip);
            }
        }
    }
    let bbox = Rect::from_xyxy(center.x - a, center.y - b, center.x + a + 1, center.y + b + 1);
    Some(bbox.intersect(&clip))
}

/// Winding rule for filled polygons (spec.md §4.3, "Polygon").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Winding {
    EvenOdd,
    NonZero,
}

/// `poly`, opcode `p`: outline through consecutive points (not closed
/// automatically — callers repeat the first point to close the shape, as
/// the wire format does).
pub fn poly_outline(
    dst: &mut Image,
    points: &[Point],
    radius: i32,
    color: Rgba8,
    op: Operator,
) -> Option<Rect> {
    let mut bbox: Option<Rect> = None;
    for w in points.windows(2) {
        if let Some(r) = line(dst, w[0], w[1], radius > 0, radius, color, op) {
            bbox = Some(match bbox {
                Some(b) => b.union(&r),
                None => r,
            });
        }
    }
    bbox
}

/// `fillpoly`, opcode `P`: scanline fill honouring the even-odd or
/// non-zero winding rule.
pub fn poly_fill(
    dst: &mut Image,
    points: &[Point],
    winding: Winding,
    color: Rgba8,
    op: Operator,
) -> Option<Rect> {
    let clip = effective_clip(dst);
    if points.len() < 3 || clip.is_empty() {
        return None;
    }
    let min_y = points.iter().map(|p| p.y).min().unwrap().max(clip.min.y);
    let max_y = points.iter().map(|p| p.y).max().unwrap().min(clip.max.y - 1);
    let min_x = points.iter().map(|p| p.x).min().unwrap();
    let max_x = points.iter().map(|p| p.x).max().unwrap();

    let mut touched = false;
    for y in min_y..=max_y {
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if a.y == b.y {
                continue;
            }
            let (lo, hi, dir) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
            if y >= lo.y && y < hi.y {
                let t = (y - lo.y) as f64 / (hi.y - lo.y) as f64;
                let x = lo.x as f64 + t * (hi.x - lo.x) as f64;
                crossings.push((x, dir));
            }
        }
        crossings.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        match winding {
            Winding::EvenOdd => {
                let mut i = 0;
                while i + 1 < crossings.len() {
                    fill_span(dst, y, crossings[i].0, crossings[i + 1].0, color, op, clip);
                    touched = true;
                    i += 2;
                }
            }
            Winding::NonZero => {
                let mut wind = 0;
                let mut span_start: Option<f64> = None;
                for &(x, dir) in &crossings {
                    let was_inside = wind != 0;
                    wind += dir;
                    let now_inside = wind != 0;
                    if !was_inside && now_inside {
                        span_start = Some(x);
                    } else if was_inside && !now_inside {
                        if let Some(start) = span_start.take() {
                            fill_span(dst, y, start, x, color, op, clip);
                            touched = true;
                        }
                    }
                }
            }
        }
    }

    if !touched {
        return None;
    }
    Some(Rect::from_xyxy(min_x, min_y, max_x + 1, max_y + 1).intersect(&clip))
}

fn fill_span(dst: &mut Image, y: i32, x0: f64, x1: f64, color: Rgba8, op: Operator, clip: Rect) {
    let xi0 = x0.round() as i32;
    let xi1 = x1.round() as i32;
    for x in xi0..xi1 {
        blend_pixel(dst, Point::new(x, y), color, op, clip);
    }
}
