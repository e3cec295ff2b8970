//! Opcode dispatch loop: the 45%-share "Rasterizer" component.
//!
//! spec.md §4.3. Grounded on the teacher's `video::compositor_context`
//! message-pump pattern (a `match` over a small command tag driving state
//! mutation on a context struct) generalized from Wayland request codes to
//! the 26 `/dev/draw` opcodes in spec.md §6's table.

use std::collections::HashMap;

use draw9_codec::{Reader, Writer};
use draw9_font::{BitmapFallback, FallbackDrawer, FontCache};
use draw9_gfx::{raster, Image, ImageStore, Operator, RefreshMethod, RefreshTracker, DISPLAY_ID};
use draw9_proto::{Channel, Color32, DrawError, DrawResult, Point, Rect, Rgba8};
use log::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::opcode;
use crate::refresh::RefreshRect;

/// Height used for the platform fallback when no font is registered at all
/// for a `string` opcode's `font_id` (as opposed to a font that's
/// registered but empty, which uses its own real `height`).
const UNREGISTERED_FONT_FALLBACK_HEIGHT: u16 = 12;

/// The core opcode-dispatch engine: owns the image/screen/font tables, the
/// sticky compositing operator, and the refresh accumulator. `process`
/// drives a whole command buffer to completion; nothing suspends midway
/// (spec.md §5).
pub struct Rasterizer {
    store: ImageStore,
    fonts: FontCache,
    current_op: Operator,
    refresh: RefreshTracker,
    names: HashMap<String, i32>,
    fallback: Box<dyn FallbackDrawer>,
    label: String,
}

impl Rasterizer {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_fallback(config, Box::new(BitmapFallback))
    }

    /// Constructs a rasterizer with an explicit fallback text drawer —
    /// used by tests to supply a deterministic mock (spec.md §9, "Font
    /// fallback as a capability").
    pub fn with_fallback(config: EngineConfig, fallback: Box<dyn FallbackDrawer>) -> Self {
        Self {
            store: ImageStore::new(config.display_width, config.display_height, config.default_channel),
            fonts: FontCache::new(),
            current_op: Operator::default(),
            refresh: RefreshTracker::new(),
            names: HashMap::new(),
            fallback,
            label: config.label,
        }
    }

    /// Drains the accumulated refresh rectangle, the `flush` side of
    /// spec.md §4.3's "Flush" entry. `None` if nothing has been drawn to
    /// the display since the last drain (spec.md §8, property 8).
    pub fn take_refresh(&mut self) -> Option<RefreshRect> {
        self.refresh.take().map(RefreshRect)
    }

    /// Renders the 144-byte ctl record for `id` (SPEC_FULL.md "Supplemented
    /// Features — ctl-record formatting").
    pub fn ctl(&self, id: i32, client_id: i32) -> DrawResult<String> {
        Ok(self.store.lookup(id)?.ctl_record(client_id))
    }

    /// Only mutations targeting the display surface feed the refresh
    /// accumulator — spec.md §4.3, "Flush": "the bounding box of all
    /// refresh events *targeted at id 0*".
    fn note_refresh(&mut self, target_id: i32, bbox: Option<Rect>) {
        if target_id == DISPLAY_ID {
            if let Some(r) = bbox {
                self.refresh.add(r);
            }
        }
    }

    /// Runs every command in `buf` to completion, returning the
    /// concatenated response bytes for opcodes that produce one (`string`,
    /// `stringbg`, `load`, `loadcompressed`, `unload`, `init`). Any error
    /// aborts the whole buffer: earlier effects stand (spec.md §7).
    pub fn process(&mut self, buf: &[u8]) -> DrawResult<Vec<u8>> {
        let mut reader = Reader::new(buf);
        let mut out = Writer::new();
        while !reader.is_empty() {
            let op = reader.read_u8()?;
            trace!("dispatch opcode {:#04x}", op);
            self.dispatch(op, &mut reader, &mut out)?;
        }
        Ok(out.into_bytes())
    }

    fn dispatch(&mut self, op: u8, r: &mut Reader, out: &mut Writer) -> DrawResult<()> {
        match op {
            opcode::ALLOC_IMAGE => self.op_alloc_image(r)?,
            opcode::ALLOC_SCREEN => self.op_alloc_screen(r)?,
            opcode::FREE_SCREEN => self.op_free_screen(r)?,
            opcode::FREE_IMAGE => self.op_free_image(r)?,
            opcode::DRAW => self.op_draw(r)?,
            opcode::LINE => self.op_line(r)?,
            opcode::ELLIPSE => self.op_ellipse(r, false)?,
            opcode::FILLED_ELLIPSE => self.op_ellipse(r, true)?,
            opcode::ARC => self.op_arc(r)?,
            opcode::POLYGON => self.op_poly(r, false)?,
            opcode::FILLED_POLYGON => self.op_poly(r, true)?,
            opcode::STRING => self.op_string(r, out, false)?,
            opcode::STRING_BG => self.op_string(r, out, true)?,
            opcode::LOAD_IMAGE => self.op_load(r, out, false)?,
            opcode::LOAD_IMAGE_COMPRESSED => self.op_load(r, out, true)?,
            opcode::UNLOAD_IMAGE => self.op_unload(r, out)?,
            opcode::ORIGIN => self.op_origin(r)?,
            opcode::SET_CLIP => self.op_set_clip(r)?,
            opcode::SET_OPERATOR => self.op_set_operator(r)?,
            opcode::TOP => self.op_layer(r)?,
            opcode::BOTTOM => self.op_layer(r)?,
            opcode::NAME_GLOBAL => self.op_name(r)?,
            opcode::NAME_LOCAL => self.op_name(r)?,
            opcode::INIT_FONT => self.op_init_font(r)?,
            opcode::LOAD_CHAR => self.op_load_char(r)?,
            opcode::INIT => self.op_init(out)?,
            opcode::FLUSH => {
                debug!("flush (no-op: host drains via take_refresh)");
            }
            other => {
                return Err(DrawError::MalformedStream(format!(
                    "unknown opcode {other:#04x}"
                )))
            }
        }

        if is_drawing_opcode(op) {
            self.current_op = Operator::default();
        }
        Ok(())
    }

    // -- image/screen table opcodes -----------------------------------

    #[allow(clippy::too_many_arguments)]
    fn op_alloc_image(&mut self, r: &mut Reader) -> DrawResult<()> {
        let id = r.read_i32()?;
        let screen_id = r.read_i32()?;
        let refresh = r.read_u8()?;
        let chan_raw = r.read_u32()?;
        let repl = r.read_u8()? != 0;
        let rect = r.read_rect()?;
        let clipr = r.read_rect()?;
        let color = r.read_u32()?;

        let chan = Channel::from_u32(chan_raw)
            .ok_or_else(|| DrawError::MalformedStream(format!("unknown channel {chan_raw}")))?;
        debug!("alloc image {id} chan={chan:?} r={rect:?}");
        self.store.alloc(
            id,
            screen_id,
            RefreshMethod::from_byte(refresh),
            chan,
            repl,
            rect,
            clipr,
            Color32::from_u32(color).to_rgba(),
        )
    }

    fn op_alloc_screen(&mut self, r: &mut Reader) -> DrawResult<()> {
        let id = r.read_i32()?;
        let image_id = r.read_i32()?;
        let fill_id = r.read_i32()?;
        let public = r.read_u8()? != 0;
        self.store.alloc_screen(id, image_id, fill_id, public);
        Ok(())
    }

    fn op_free_screen(&mut self, r: &mut Reader) -> DrawResult<()> {
        let id = r.read_i32()?;
        self.store.free_screen(id);
        Ok(())
    }

    fn op_free_image(&mut self, r: &mut Reader) -> DrawResult<()> {
        let id = r.read_i32()?;
        self.store.free(id)?;
        self.fonts.on_image_freed(id);
        Ok(())
    }

    // -- drawing opcodes -------------------------------------------------

    fn op_draw(&mut self, r: &mut Reader) -> DrawResult<()> {
        let dst_id = r.read_i32()?;
        let src_id = r.read_i32()?;
        let mask_id = r.read_i32()?;
        let rect = r.read_rect()?;
        let sp = r.read_point()?;
        let mp = r.read_point()?;

        let src = self.store.lookup(src_id)?.clone();
        let mask = if mask_id != 0 {
            Some(self.store.lookup(mask_id)?.clone())
        } else {
            None
        };
        let dst = self.store.lookup_mut(dst_id)?;
        let bbox = raster::blit(dst, &src, mask.as_ref(), rect, sp, mp, self.current_op);
        self.note_refresh(dst_id, bbox);
        Ok(())
    }

    fn op_line(&mut self, r: &mut Reader) -> DrawResult<()> {
        let dst_id = r.read_i32()?;
        let p0 = r.read_point()?;
        let p1 = r.read_point()?;
        let end0 = r.read_u8()?;
        let end1 = r.read_u8()?;
        let radius = r.read_i32()?;
        let src_id = r.read_i32()?;
        let sp = r.read_point()?;

        let src = self.store.lookup(src_id)?.clone();
        let color = src.sample(sp).unwrap_or(Rgba8::TRANSPARENT);
        let round_caps = (end0 & 0x1F != 0) || (end1 & 0x1F != 0);
        let dst = self.store.lookup_mut(dst_id)?;
        let bbox = raster::line(dst, p0, p1, round_caps, radius, color, self.current_op);
        self.note_refresh(dst_id, bbox);
        Ok(())
    }

    fn op_ellipse(&mut self, r: &mut Reader, filled: bool) -> DrawResult<()> {
        let dst_id = r.read_i32()?;
        let center = r.read_point()?;
        let a = r.read_i32()?;
        let b = r.read_i32()?;
        let mut thick = r.read_i32()?;
        let _alpha = r.read_i32()?;
        let _phi = r.read_i32()?;
        let src_id = r.read_i32()?;
        let sp = r.read_point()?;

        if filled {
            thick = -1;
        }
        let src = self.store.lookup(src_id)?.clone();
        let color = src.sample(sp).unwrap_or(Rgba8::TRANSPARENT);
        let dst = self.store.lookup_mut(dst_id)?;
        let bbox = raster::ellipse(dst, center, a, b, thick, color, self.current_op);
        self.note_refresh(dst_id, bbox);
        Ok(())
    }

    fn op_arc(&mut self, r: &mut Reader) -> DrawResult<()> {
        let dst_id = r.read_i32()?;
        let center = r.read_point()?;
        let a = r.read_i32()?;
        let b = r.read_i32()?;
        let thick = r.read_i32()?;
        let alpha = r.read_i32()?;
        let phi = r.read_i32()?;
        let src_id = r.read_i32()?;
        let sp = r.read_point()?;

        let src = self.store.lookup(src_id)?.clone();
        let color = src.sample(sp).unwrap_or(Rgba8::TRANSPARENT);
        let dst = self.store.lookup_mut(dst_id)?;
        let bbox = raster::arc(dst, center, a, b, thick, alpha, phi, color, self.current_op);
        self.note_refresh(dst_id, bbox);
        Ok(())
    }

    fn op_poly(&mut self, r: &mut Reader, filled: bool) -> DrawResult<()> {
        let dst_id = r.read_i32()?;
        let n = r.read_u16()?;
        let field_b = r.read_u8()?; // end0 (outline) / wind (filled)
        let _field_c = r.read_u8()?; // end1 (outline) / unused (filled)
        let radius = r.read_i32()?; // radius (outline) / unused (filled)
        let src_id = r.read_i32()?;
        let sp = r.read_point()?;
        let points = read_points(r, n as usize + 1)?;

        let src = self.store.lookup(src_id)?.clone();
        let color = src.sample(sp).unwrap_or(Rgba8::TRANSPARENT);
        let dst = self.store.lookup_mut(dst_id)?;
        let bbox = if filled {
            let winding = if field_b == 0 {
                raster::Winding::EvenOdd
            } else {
                raster::Winding::NonZero
            };
            raster::poly_fill(dst, &points, winding, color, self.current_op)
        } else {
            raster::poly_outline(dst, &points, radius, color, self.current_op)
        };
        self.note_refresh(dst_id, bbox);
        Ok(())
    }

    /// `string`/`stringbg`, spec.md §4.3 "String". Returns the final pen
    /// point as an 8-byte response regardless of which path (cached glyphs
    /// vs. fallback) drew it.
    fn op_string(&mut self, r: &mut Reader, out: &mut Writer, with_bg: bool) -> DrawResult<()> {
        let dst_id = r.read_i32()?;
        let src_id = r.read_i32()?;
        let font_id = r.read_i32()?;
        let p = r.read_point()?;
        let clipr_param = r.read_rect()?;
        let sp = r.read_point()?;
        let n = r.read_u16()?;
        let bg = if with_bg {
            let bg_id = r.read_i32()?;
            let bgp = r.read_point()?;
            Some((bg_id, bgp))
        } else {
            None
        };
        let mut indices = Vec::with_capacity(n as usize);
        for _ in 0..n {
            indices.push(r.read_u16()?);
        }

        let src = self.store.lookup(src_id)?.clone();
        let clip = {
            let dst = self.store.lookup(dst_id)?;
            dst.clipr.intersect(&dst.r).intersect(&clipr_param)
        };

        let has_cached_glyphs = self
            .fonts
            .get(font_id)
            .map(|f| f.has_any_glyph())
            .unwrap_or(false);

        if has_cached_glyphs {
            let font = self.fonts.get(font_id).expect("checked above");
            for &idx in &indices {
                if idx as usize >= font.glyph_count() {
                    return Err(DrawError::OutOfRange(format!(
                        "string: glyph index {idx} >= {}",
                        font.glyph_count()
                    )));
                }
            }
        }

        let (end, touched) = if has_cached_glyphs {
            let font = self.fonts.get(font_id).expect("checked above").clone();
            let font_image = self.store.lookup(font_id)?.clone();
            let bg_pair = match bg {
                Some((bg_id, bgp)) => Some((self.store.lookup(bg_id)?.clone(), bgp)),
                None => None,
            };
            let dst = self.store.lookup_mut(dst_id)?;
            let end = draw9_font::draw_string(
                dst,
                clip,
                &font,
                &font_image,
                &indices,
                p,
                &src,
                sp,
                self.current_op,
                bg_pair.as_ref().map(|(img, pt)| (img, *pt)),
            );
            let bbox = Rect::from_xyxy(
                p.x.min(end.x),
                p.y - font.ascent as i32,
                end.x.max(p.x + 1),
                p.y - font.ascent as i32 + font.height as i32,
            );
            (end, bbox)
        } else {
            warn!("string: font {font_id} has no cached glyphs, using fallback drawer");
            let height = self
                .fonts
                .get(font_id)
                .map(|f| f.height)
                .unwrap_or(UNREGISTERED_FONT_FALLBACK_HEIGHT);
            let text: String = indices
                .iter()
                .filter_map(|&idx| char::from_u32(idx as u32))
                .collect();
            let colour = src.sample(sp).unwrap_or(Rgba8::TRANSPARENT);

            if let Some((bg_id, bgp)) = bg {
                // The fallback drawer picks its own cell width, so the
                // background's advance isn't known up front: measure it
                // with a zero-sized probe image (out-of-bounds `put`s are
                // no-ops) before filling, so the fill happens under the
                // text rather than over it.
                let chan = self.store.lookup(dst_id)?.chan;
                let mut probe = Image::new(
                    dst_id,
                    Rect::from_xyxy(0, 0, 0, 0),
                    Rect::from_xyxy(0, 0, 0, 0),
                    chan,
                    false,
                    Rgba8::TRANSPARENT,
                );
                let probe_end = self.fallback.draw(height, "default", &text, colour, &mut probe, p);
                let bg_rect = Rect::from_xyxy(
                    p.x.min(probe_end.x),
                    p.y,
                    probe_end.x.max(p.x + 1),
                    p.y + height as i32,
                );
                let bg_img = self.store.lookup(bg_id)?.clone();
                let dst = self.store.lookup_mut(dst_id)?;
                draw9_font::fill_rect(dst, clip, bg_rect, &bg_img, bgp, self.current_op);
            }

            let dst = self.store.lookup_mut(dst_id)?;
            let end = self.fallback.draw(height, "default", &text, colour, dst, p);
            let bbox = Rect::from_xyxy(p.x.min(end.x), p.y, end.x.max(p.x + 1), p.y + height as i32);
            (end, bbox)
        };

        self.note_refresh(dst_id, Some(touched).filter(|r| !r.is_empty()));
        out.write_point(end);
        Ok(())
    }

    // -- pixel IO ---------------------------------------------------------

    fn op_load(&mut self, r: &mut Reader, out: &mut Writer, compressed: bool) -> DrawResult<()> {
        let id = r.read_i32()?;
        let rect = r.read_rect()?;
        let data = r.take_rest();
        let consumed = data.len() as i32;

        let chan = self.store.lookup(id)?.chan;
        let width = rect.width();
        let height = rect.height().max(0);
        let needed = draw9_pixels::pixel_row_bytes(chan, width) * height as usize;

        let raw = if compressed {
            let decoded = draw9_pixels::rle_decode_limited(data, needed)?;
            if decoded.len() < needed {
                return Err(DrawError::MalformedStream(
                    "compressed load did not fill destination raster".into(),
                ));
            }
            decoded
        } else {
            if data.len() < needed {
                return Err(DrawError::MalformedStream(format!(
                    "load needs {needed} bytes, got {}",
                    data.len()
                )));
            }
            data[..needed].to_vec()
        };

        let row_bytes = draw9_pixels::pixel_row_bytes(chan, width);
        let dst = self.store.lookup_mut(id)?;
        for y in 0..height {
            let row = &raw[y as usize * row_bytes..(y as usize + 1) * row_bytes];
            let pixels = draw9_pixels::decode_row(chan, width, row)?;
            for (x, px) in pixels.into_iter().enumerate() {
                dst.put(Point::new(rect.min.x + x as i32, rect.min.y + y), px);
            }
        }
        self.note_refresh(id, Some(rect).filter(|r| !r.is_empty()));
        out.write_i32(consumed);
        Ok(())
    }

    fn op_unload(&mut self, r: &mut Reader, out: &mut Writer) -> DrawResult<()> {
        let id = r.read_i32()?;
        let rect = r.read_rect()?;
        let img = self.store.lookup(id)?;
        let width = rect.width();
        for y in rect.min.y..rect.max.y {
            let mut row = Vec::with_capacity(width.max(0) as usize);
            for x in rect.min.x..rect.max.x {
                row.push(img.sample(Point::new(x, y)).unwrap_or(Rgba8::TRANSPARENT));
            }
            out.write_bytes(&draw9_pixels::encode_row(img.chan, &row));
        }
        Ok(())
    }

    // -- state opcodes ----------------------------------------------------

    /// `origin`. spec.md §9 flags this opcode's semantics as an open
    /// question ("protocol-heavy... consult the upstream Plan 9
    /// specification"); this implementation follows Plan 9's documented
    /// `originmsg` behaviour directly: translate the image's extent and
    /// clip rectangles by `new - old`, leaving its pixel content addressed
    /// identically (images are indexed relative to `r.min`, so this moves
    /// the image in the global coordinate space without touching a single
    /// pixel) — see DESIGN.md "origin opcode".
    fn op_origin(&mut self, r: &mut Reader) -> DrawResult<()> {
        let id = r.read_i32()?;
        let old = r.read_point()?;
        let new = r.read_point()?;
        let delta = new - old;
        let img = self.store.lookup_mut(id)?;
        img.r = img.r.translate(delta);
        img.clipr = img.clipr.translate(delta);
        Ok(())
    }

    fn op_set_clip(&mut self, r: &mut Reader) -> DrawResult<()> {
        let id = r.read_i32()?;
        let repl = r.read_u8()? != 0;
        let clipr = r.read_rect()?;
        self.store.set_clip(id, repl, clipr)
    }

    fn op_set_operator(&mut self, r: &mut Reader) -> DrawResult<()> {
        let raw = r.read_u8()?;
        self.current_op = Operator::from_u8(raw)
            .ok_or_else(|| DrawError::MalformedStream(format!("unknown operator {raw}")))?;
        Ok(())
    }

    /// `top`/`bottom`: advisory layering (spec.md §3, "layering order is
    /// advisory"). The ids are consumed to keep the stream position
    /// correct; no ordering is modelled since [`draw9_gfx::Screen`] has no
    /// order field to update.
    fn op_layer(&mut self, r: &mut Reader) -> DrawResult<()> {
        let n = r.read_u16()?;
        for _ in 0..n {
            let _id = r.read_i32()?;
        }
        Ok(())
    }

    /// `name`/`namelocal`: binds `name` to `id`. spec.md §4.3: "registering
    /// a name on an unknown id materialises that id as an alias of the
    /// display surface" — read as: the *name* becomes an alias for id 0
    /// when the id it was given doesn't exist yet.
    fn op_name(&mut self, r: &mut Reader) -> DrawResult<()> {
        let id = r.read_i32()?;
        let name = r.read_string()?.to_string();
        let resolved = if self.store.contains(id) { id } else { DISPLAY_ID };
        self.names.insert(name, resolved);
        Ok(())
    }

    pub fn lookup_name(&self, name: &str) -> Option<i32> {
        self.names.get(name).copied()
    }

    /// True if `font_id` has at least one glyph with a nonzero advance
    /// (SPEC_FULL.md "Supplemented Features"; exercised directly by tests
    /// that want to assert the cache populated without going through a
    /// `string` draw).
    pub fn fonts_has_glyph(&self, font_id: i32) -> bool {
        self.fonts
            .get(font_id)
            .map(|f| f.has_any_glyph())
            .unwrap_or(false)
    }

    // -- font opcodes -------------------------------------------------------

    fn op_init_font(&mut self, r: &mut Reader) -> DrawResult<()> {
        let font_id = r.read_i32()?;
        let n = r.read_u16()?;
        let ascent = r.read_u16()?;
        if !self.store.contains(font_id) {
            return Err(DrawError::UnknownImage(font_id));
        }
        self.fonts.init(font_id, n, ascent);
        Ok(())
    }

    fn op_load_char(&mut self, r: &mut Reader) -> DrawResult<()> {
        let font_id = r.read_i32()?;
        let src_id = r.read_i32()?;
        let index = r.read_u16()?;
        let rect = r.read_rect()?;
        let p = r.read_point()?;
        let left = r.read_u8()? as i8;
        let width = r.read_u8()?;

        if self.fonts.get(font_id).is_none() {
            return Err(DrawError::UnknownFont(font_id));
        }
        let src = self.store.lookup(src_id)?.clone();
        let font_image = self.store.lookup_mut(font_id)?;
        raster::blit(font_image, &src, None, rect, p, Point::ZERO, Operator::S);

        let font = self.fonts.get_mut(font_id).expect("checked above");
        font.load_char(
            index,
            rect.min.x as u16,
            rect.min.y as u8,
            rect.max.y as u8,
            left,
            width,
            rect.max.x as u16,
        )
    }

    fn op_init(&mut self, out: &mut Writer) -> DrawResult<()> {
        let display = self.store.lookup(DISPLAY_ID)?;
        out.write_i32(DISPLAY_ID);
        out.write_i32(display.chan.to_u32() as i32);
        let mut label_bytes = [0u8; 128];
        let bytes = self.label.as_bytes();
        let n = bytes.len().min(128);
        label_bytes[..n].copy_from_slice(&bytes[..n]);
        out.write_bytes(&label_bytes);
        out.write_i32(display.r.min.x);
        out.write_i32(display.r.min.y);
        out.write_i32(display.r.max.x);
        out.write_i32(display.r.max.y);
        Ok(())
    }
}

fn is_drawing_opcode(op: u8) -> bool {
    matches!(
        op,
        opcode::DRAW
            | opcode::LINE
            | opcode::ELLIPSE
            | opcode::FILLED_ELLIPSE
            | opcode::ARC
            | opcode::POLYGON
            | opcode::FILLED_POLYGON
            | opcode::STRING
            | opcode::STRING_BG
    )
}

/// Reads `count` points via delta-coord, seeding separate x/y accumulators
/// at zero for this point array (spec.md §9, "Polygon coord seed").
fn read_points(r: &mut Reader, count: usize) -> DrawResult<Vec<Point>> {
    let mut prev_x = 0i32;
    let mut prev_y = 0i32;
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let x = r.read_delta_coord(&mut prev_x)?;
        let y = r.read_delta_coord(&mut prev_y)?;
        points.push(Point::new(x, y));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use draw9_codec::Writer as CmdWriter;

    fn config() -> EngineConfig {
        EngineConfig {
            display_width: 4,
            display_height: 4,
            default_channel: Channel::Xrgb32,
            label: "test".to_string(),
        }
    }

    fn alloc_cmd(id: i32, chan: Channel, repl: bool, r: Rect, clipr: Rect, color: Color32) -> Vec<u8> {
        let mut w = CmdWriter::new();
        w.write_u8(opcode::ALLOC_IMAGE);
        w.write_i32(id);
        w.write_i32(0);
        w.write_u8(0);
        w.write_u32(chan.to_u32());
        w.write_u8(repl as u8);
        w.write_point(r.min);
        w.write_point(r.max);
        w.write_point(clipr.min);
        w.write_point(clipr.max);
        w.write_u32(color.to_u32());
        w.into_bytes()
    }

    fn draw_cmd(dst: i32, src: i32, mask: i32, r: Rect, sp: Point, mp: Point) -> Vec<u8> {
        let mut w = CmdWriter::new();
        w.write_u8(opcode::DRAW);
        w.write_i32(dst);
        w.write_i32(src);
        w.write_i32(mask);
        w.write_point(r.min);
        w.write_point(r.max);
        w.write_point(sp);
        w.write_point(mp);
        w.into_bytes()
    }

    #[test]
    fn flat_fill_scenario() {
        // spec.md §8 scenario 1.
        let mut engine = Rasterizer::new(config());
        let mut buf = alloc_cmd(
            1,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::new(0xFF, 0, 0, 0xFF),
        );
        buf.extend(draw_cmd(
            0,
            1,
            0,
            Rect::from_xyxy(0, 0, 4, 4),
            Point::ZERO,
            Point::ZERO,
        ));
        engine.process(&buf).unwrap();

        let ctl = engine.ctl(0, 1).unwrap();
        assert_eq!(ctl.len(), 144);
        let refresh = engine.take_refresh().unwrap();
        assert_eq!(refresh.0, Rect::from_xyxy(0, 0, 4, 4));
    }

    #[test]
    fn second_flush_without_drawing_is_empty() {
        let mut engine = Rasterizer::new(config());
        let buf = alloc_cmd(
            1,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::new(0, 0xFF, 0, 0xFF),
        );
        engine.process(&buf).unwrap();
        assert!(engine.take_refresh().is_none());
    }

    #[test]
    fn operator_resets_to_soverd_after_drawing() {
        let mut w = CmdWriter::new();
        w.write_u8(opcode::SET_OPERATOR);
        w.write_u8(Operator::S as u8);
        let mut engine = Rasterizer::new(config());
        engine.process(&w.into_bytes()).unwrap();
        assert_eq!(engine.current_op, Operator::S);

        let draw = draw_cmd(0, 0, 0, Rect::from_xyxy(0, 0, 1, 1), Point::ZERO, Point::ZERO);
        engine.process(&draw).unwrap();
        assert_eq!(engine.current_op, Operator::SoverD);
    }

    #[test]
    fn glyph_rendering_scenario() {
        // spec.md §8 scenario 4.
        let mut engine = Rasterizer::new(config());
        let mut buf = alloc_cmd(
            5,
            Channel::Xrgb32,
            false,
            Rect::from_xyxy(0, 0, 4, 10),
            Rect::from_xyxy(0, 0, 4, 10),
            Color32::TRANSPARENT,
        );
        buf.extend(alloc_cmd(
            6,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::BLACK,
        ));
        buf.extend(alloc_cmd(
            7,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::WHITE,
        ));
        {
            let mut w = CmdWriter::new();
            w.write_u8(opcode::INIT_FONT);
            w.write_i32(5);
            w.write_u16(1);
            w.write_u16(8);
            buf.extend(w.into_bytes());
        }
        {
            let mut w = CmdWriter::new();
            w.write_u8(opcode::LOAD_CHAR);
            w.write_i32(5);
            w.write_i32(6);
            w.write_u16(0);
            w.write_point(Point::new(0, 0));
            w.write_point(Point::new(4, 8));
            w.write_point(Point::ZERO);
            w.write_u8(0i8 as u8);
            w.write_u8(4);
            buf.extend(w.into_bytes());
        }
        engine.process(&buf).unwrap();
        assert!(engine.fonts_has_glyph(5));

        let mut w = CmdWriter::new();
        w.write_u8(opcode::STRING);
        w.write_i32(0);
        w.write_i32(7);
        w.write_i32(5);
        w.write_point(Point::new(0, 8));
        w.write_point(Rect::from_xyxy(0, 0, 32, 16).min);
        w.write_point(Rect::from_xyxy(0, 0, 32, 16).max);
        w.write_point(Point::ZERO);
        w.write_u16(1);
        w.write_u16(0);
        let response = engine.process(&w.into_bytes()).unwrap();
        assert_eq!(response.len(), 8);
        assert_eq!(i32::from_le_bytes(response[0..4].try_into().unwrap()), 4);
        assert_eq!(i32::from_le_bytes(response[4..8].try_into().unwrap()), 8);
    }

    #[test]
    fn stringbg_fills_background_on_fallback_path() {
        // spec.md §4.3: "Background variant first fills a rectangle ...
        // with colour from bg_id at bgp" — this must hold even when the
        // font has no cached glyphs and the fallback drawer is used.
        use draw9_font::MockFallback;

        let mut engine = Rasterizer::with_fallback(config(), Box::new(MockFallback));
        let mut buf = alloc_cmd(
            5,
            Channel::Xrgb32,
            false,
            Rect::from_xyxy(0, 0, 20, 20),
            Rect::from_xyxy(0, 0, 20, 20),
            Color32::TRANSPARENT,
        );
        buf.extend(alloc_cmd(
            6,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::BLACK,
        ));
        buf.extend(alloc_cmd(
            7,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::WHITE,
        ));
        {
            let mut w = CmdWriter::new();
            w.write_u8(opcode::INIT_FONT);
            w.write_i32(5);
            w.write_u16(1);
            w.write_u16(8);
            buf.extend(w.into_bytes());
        }
        engine.process(&buf).unwrap();
        assert!(!engine.fonts_has_glyph(5));

        let mut w = CmdWriter::new();
        w.write_u8(opcode::STRING_BG);
        w.write_i32(5);
        w.write_i32(7);
        w.write_i32(5);
        w.write_point(Point::new(0, 0));
        w.write_point(Rect::from_xyxy(0, 0, 20, 20).min);
        w.write_point(Rect::from_xyxy(0, 0, 20, 20).max);
        w.write_point(Point::ZERO);
        w.write_u16(1);
        w.write_i32(6);
        w.write_point(Point::ZERO);
        w.write_u16(b'a' as u16);
        engine.process(&w.into_bytes()).unwrap();

        // MockFallback stamps a 4x4 opaque white cell at (0,0); below
        // that, still inside the background's 4x8 band, must show the
        // black background fill rather than whatever was there before.
        let dst = engine.store.lookup(5).unwrap();
        assert_eq!(dst.sample(Point::new(0, 0)), Some(Rgba8::new(0xFF, 0xFF, 0xFF, 0xFF)));
        assert_eq!(dst.sample(Point::new(0, 7)), Some(Rgba8::new(0, 0, 0, 0xFF)));
    }

    #[test]
    fn string_with_out_of_range_glyph_index_is_fatal() {
        // spec.md §7: "OutOfRange — glyph index >= n", distinct from the
        // empty-slot skip.
        let mut engine = Rasterizer::new(config());
        let mut buf = alloc_cmd(
            5,
            Channel::Xrgb32,
            false,
            Rect::from_xyxy(0, 0, 4, 10),
            Rect::from_xyxy(0, 0, 4, 10),
            Color32::TRANSPARENT,
        );
        buf.extend(alloc_cmd(
            6,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::BLACK,
        ));
        buf.extend(alloc_cmd(
            7,
            Channel::Xrgb32,
            true,
            Rect::from_xyxy(0, 0, 1, 1),
            Rect::from_xyxy(0, 0, 1, 1),
            Color32::WHITE,
        ));
        {
            let mut w = CmdWriter::new();
            w.write_u8(opcode::INIT_FONT);
            w.write_i32(5);
            w.write_u16(1);
            w.write_u16(8);
            buf.extend(w.into_bytes());
        }
        {
            let mut w = CmdWriter::new();
            w.write_u8(opcode::LOAD_CHAR);
            w.write_i32(5);
            w.write_i32(6);
            w.write_u16(0);
            w.write_point(Point::new(0, 0));
            w.write_point(Point::new(4, 8));
            w.write_point(Point::ZERO);
            w.write_u8(0i8 as u8);
            w.write_u8(4);
            buf.extend(w.into_bytes());
        }
        engine.process(&buf).unwrap();
        assert!(engine.fonts_has_glyph(5));

        let mut w = CmdWriter::new();
        w.write_u8(opcode::STRING);
        w.write_i32(0);
        w.write_i32(7);
        w.write_i32(5);
        w.write_point(Point::new(0, 8));
        w.write_point(Rect::from_xyxy(0, 0, 32, 16).min);
        w.write_point(Rect::from_xyxy(0, 0, 32, 16).max);
        w.write_point(Point::ZERO);
        w.write_u16(1);
        w.write_u16(1); // index 1, but this font only has index 0 (n = 1)
        assert!(matches!(
            engine.process(&w.into_bytes()),
            Err(DrawError::OutOfRange(_))
        ));
    }
}
