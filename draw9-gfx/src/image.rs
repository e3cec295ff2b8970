//! The retained image: a rectangular RGBA8 surface plus the geometry and
//! channel metadata spec.md §3 assigns it.
//!
//! Grounded on the teacher's `video::graphics::GraphicsContext` / the
//! `Canvas` trait it implements (`abi::draw::Canvas`): width/height/pitch
//! accessors and a row-span fill primitive. Per spec.md §9's design note
//! ("prefer a single concrete surface type... to keep the inner loop
//! monomorphic"), this is a plain struct rather than a trait, replacing
//! the teacher's `Canvas` abstraction instead of implementing it.

use draw9_proto::{Channel, Point, Rect, Rgba8};

/// An image owned by the [`crate::store::ImageStore`].
#[derive(Clone, Debug)]
pub struct Image {
    pub id: i32,
    /// Origin and extent rectangle in global coordinates.
    pub r: Rect,
    /// Subset of `r` used as destination clip.
    pub clipr: Rect,
    pub repl: bool,
    pub chan: Channel,
    pub screen_id: i32,
    pixels: Vec<Rgba8>,
}

impl Image {
    /// Creates a new image of `r`'s extent, filled with `fill`.
    pub fn new(id: i32, r: Rect, clipr: Rect, chan: Channel, repl: bool, fill: Rgba8) -> Self {
        let w = r.width().max(0) as usize;
        let h = r.height().max(0) as usize;
        Self {
            id,
            r,
            clipr,
            repl,
            chan,
            screen_id: 0,
            pixels: vec![fill; w * h],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.r.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.r.height()
    }

    /// Resizes the surface in place to `r`'s extent, preserving no
    /// existing content (used only for id 0, whose resize is a hard reset
    /// per spec.md §4.2).
    pub fn reset_extent(&mut self, r: Rect, fill: Rgba8) {
        let w = r.width().max(0) as usize;
        let h = r.height().max(0) as usize;
        self.r = r;
        self.clipr = r;
        self.pixels = vec![fill; w * h];
    }

    /// Reads the pixel at global coordinate `p`, honouring replication:
    /// when `self.repl` is set, `p` is wrapped modulo the image's extent
    /// (spec.md §4.3, "the offset is taken modulo `src` extent").
    pub fn sample(&self, p: Point) -> Option<Rgba8> {
        let w = self.width();
        let h = self.height();
        if w <= 0 || h <= 0 {
            return None;
        }
        let (local_x, local_y) = if self.repl {
            (
                (p.x - self.r.min.x).rem_euclid(w),
                (p.y - self.r.min.y).rem_euclid(h),
            )
        } else {
            let lx = p.x - self.r.min.x;
            let ly = p.y - self.r.min.y;
            if lx < 0 || ly < 0 || lx >= w || ly >= h {
                return None;
            }
            (lx, ly)
        };
        self.pixels.get(local_y as usize * w as usize + local_x as usize).copied()
    }

    /// Writes the pixel at global coordinate `p`. A no-op outside `r`.
    pub fn put(&mut self, p: Point, color: Rgba8) {
        let w = self.width();
        let h = self.height();
        let lx = p.x - self.r.min.x;
        let ly = p.y - self.r.min.y;
        if lx < 0 || ly < 0 || lx >= w || ly >= h {
            return;
        }
        let idx = ly as usize * w as usize + lx as usize;
        self.pixels[idx] = color;
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Renders the 144-byte ASCII ctl record spec.md §6 describes: 12
    /// fields of 12 right-justified, space-padded characters each.
    pub fn ctl_record(&self, client_id: i32) -> String {
        let mut out = String::with_capacity(144);
        let field = |out: &mut String, s: &str| {
            debug_assert!(s.len() <= 12);
            for _ in 0..(12 - s.len()) {
                out.push(' ');
            }
            out.push_str(s);
        };
        field(&mut out, &client_id.to_string());
        field(&mut out, &self.id.to_string());
        field(&mut out, self.chan.token());
        field(&mut out, if self.repl { "1" } else { "0" });
        field(&mut out, &self.r.min.x.to_string());
        field(&mut out, &self.r.min.y.to_string());
        field(&mut out, &self.r.max.x.to_string());
        field(&mut out, &self.r.max.y.to_string());
        field(&mut out, &self.clipr.min.x.to_string());
        field(&mut out, &self.clipr.min.y.to_string());
        field(&mut out, &self.clipr.max.x.to_string());
        field(&mut out, &self.clipr.max.y.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Rect {
        Rect::from_xyxy(x0, y0, x1, y1)
    }

    #[test]
    fn put_and_sample_round_trip() {
        let mut img = Image::new(
            1,
            rect(0, 0, 4, 4),
            rect(0, 0, 4, 4),
            Channel::Xrgb32,
            false,
            Rgba8::TRANSPARENT,
        );
        img.put(Point::new(2, 3), Rgba8::new(1, 2, 3, 4));
        assert_eq!(img.sample(Point::new(2, 3)), Some(Rgba8::new(1, 2, 3, 4)));
    }

    #[test]
    fn replicated_sample_wraps_modulo_extent() {
        let mut img = Image::new(
            2,
            rect(0, 0, 2, 2),
            rect(0, 0, 2, 2),
            Channel::Xrgb32,
            true,
            Rgba8::TRANSPARENT,
        );
        img.put(Point::new(1, 1), Rgba8::new(9, 9, 9, 9));
        assert_eq!(img.sample(Point::new(3, 1)), Some(Rgba8::new(9, 9, 9, 9)));
        assert_eq!(img.sample(Point::new(1, 3)), Some(Rgba8::new(9, 9, 9, 9)));
        assert_eq!(img.sample(Point::new(-1, -1)), Some(Rgba8::new(9, 9, 9, 9)));
    }

    #[test]
    fn non_repl_sample_out_of_bounds_is_none() {
        let img = Image::new(
            3,
            rect(0, 0, 2, 2),
            rect(0, 0, 2, 2),
            Channel::Xrgb32,
            false,
            Rgba8::TRANSPARENT,
        );
        assert_eq!(img.sample(Point::new(5, 5)), None);
    }

    #[test]
    fn ctl_record_is_144_bytes() {
        let img = Image::new(
            7,
            rect(0, 0, 10, 20),
            rect(0, 0, 10, 20),
            Channel::Xrgb32,
            false,
            Rgba8::TRANSPARENT,
        );
        let rec = img.ctl_record(1);
        assert_eq!(rec.len(), 144);
        let last_field = &rec[132..144];
        assert_eq!(last_field.trim_start(), "20");
        assert_eq!(last_field.len(), 12);
    }
}
