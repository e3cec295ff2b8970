//! The image/screen table.
//!
//! spec.md §4.2. Grounded on `video::compositor_context::CompositorContext`'s
//! role as owner of a numeric-id-keyed surface table, generalized from a
//! Wayland-style client/surface map to Plan 9's flat image/screen id space.

use std::collections::HashMap;

use draw9_proto::{Channel, DrawError, DrawResult, Point, Rect, Rgba8};

use crate::image::Image;
use crate::screen::Screen;

/// The `refresh` byte on `alloc` selects how the host is notified of
/// mutations. spec.md §9 ("Open question"): "the minimum useful behaviour
/// is to honour only the no-refresh mode and record the other values for
/// later." `NoRefresh` disables automatic accumulation for that image;
/// `Screen`/`Backup` are accepted and stored but behave identically to
/// `NoRefresh` today — see DESIGN.md.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RefreshMethod {
    #[default]
    NoRefresh,
    Screen,
    Backup,
}

impl RefreshMethod {
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => Self::Screen,
            2 => Self::Backup,
            _ => Self::NoRefresh,
        }
    }
}

/// The id reserved for the visible display (spec.md §3: "Id 0 is reserved
/// for the visible display; creation is implicit at startup and free is
/// forbidden").
pub const DISPLAY_ID: i32 = 0;

pub struct ImageStore {
    images: HashMap<i32, Image>,
    screens: HashMap<i32, Screen>,
    refresh_methods: HashMap<i32, RefreshMethod>,
}

impl ImageStore {
    /// Creates the store with the display image already materialised at
    /// `DISPLAY_ID`, per spec.md §3's "implicit at startup" rule.
    pub fn new(initial_width: i32, initial_height: i32, default_chan: Channel) -> Self {
        let r = Rect::from_origin_size(Point::ZERO, initial_width.max(0), initial_height.max(0));
        let display = Image::new(DISPLAY_ID, r, r, default_chan, false, Rgba8::TRANSPARENT);
        let mut images = HashMap::new();
        images.insert(DISPLAY_ID, display);
        Self {
            images,
            screens: HashMap::new(),
            refresh_methods: HashMap::new(),
        }
    }

    pub fn lookup(&self, id: i32) -> DrawResult<&Image> {
        self.images.get(&id).ok_or(DrawError::UnknownImage(id))
    }

    pub fn lookup_mut(&mut self, id: i32) -> DrawResult<&mut Image> {
        self.images.get_mut(&id).ok_or(DrawError::UnknownImage(id))
    }

    pub fn contains(&self, id: i32) -> bool {
        self.images.contains_key(&id)
    }

    /// `alloc(id, screen_id, refresh, chan, repl, r, clipr, color)`:
    /// creates or replaces image `id`. spec.md §4.2: "If `id` is already
    /// present, replace it; replacement must not affect the display
    /// surface" — enforced here by refusing to replace `DISPLAY_ID` via
    /// this path; callers resize the display only through
    /// [`Self::resize_display`].
    #[allow(clippy::too_many_arguments)]
    pub fn alloc(
        &mut self,
        id: i32,
        screen_id: i32,
        refresh: RefreshMethod,
        chan: Channel,
        repl: bool,
        r: Rect,
        clipr: Rect,
        color: Rgba8,
    ) -> DrawResult<()> {
        if id == DISPLAY_ID {
            return Err(DrawError::DisplayInvariant(
                "alloc may not replace the display image".into(),
            ));
        }
        if !r.is_valid() || clipr.min.x < r.min.x
            || clipr.min.y < r.min.y
            || clipr.max.x > r.max.x
            || clipr.max.y > r.max.y
        {
            return Err(DrawError::OutOfRange(format!(
                "clip {clipr:?} is not a subset of extent {r:?}"
            )));
        }
        let mut img = Image::new(id, r, clipr, chan, repl, color);
        img.screen_id = screen_id;
        self.images.insert(id, img);
        self.refresh_methods.insert(id, refresh);
        Ok(())
    }

    /// `free(id)`: destroys image `id`. No-op for id 0 per spec.md §4.2;
    /// callers (the font cache) are responsible for dropping any font
    /// keyed by `id` when this returns `Ok`.
    pub fn free(&mut self, id: i32) -> DrawResult<()> {
        if id == DISPLAY_ID {
            return Ok(());
        }
        self.images.remove(&id);
        self.refresh_methods.remove(&id);
        Ok(())
    }

    /// `set_clip(id, repl, clipr)`: updates clip rectangle and replication
    /// flag atomically.
    pub fn set_clip(&mut self, id: i32, repl: bool, clipr: Rect) -> DrawResult<()> {
        let img = self.lookup_mut(id)?;
        if clipr.min.x < img.r.min.x
            || clipr.min.y < img.r.min.y
            || clipr.max.x > img.r.max.x
            || clipr.max.y > img.r.max.y
        {
            return Err(DrawError::OutOfRange(format!(
                "clip {clipr:?} is not a subset of extent {:?}",
                img.r
            )));
        }
        img.clipr = clipr;
        img.repl = repl;
        Ok(())
    }

    /// `resize_display(w, h)`: resizes id 0's surface to `(w, h)`; clip and
    /// extent rectangles grow to match with origin `(0, 0)`.
    pub fn resize_display(&mut self, w: i32, h: i32) -> DrawResult<()> {
        if w <= 0 || h <= 0 {
            return Err(DrawError::DisplayInvariant(format!(
                "display resize to non-positive extent {w}x{h}"
            )));
        }
        let r = Rect::from_origin_size(Point::ZERO, w, h);
        let display = self
            .images
            .get_mut(&DISPLAY_ID)
            .expect("display image always present");
        display.reset_extent(r, Rgba8::TRANSPARENT);
        Ok(())
    }

    pub fn alloc_screen(&mut self, id: i32, image_id: i32, fill_id: i32, public: bool) {
        self.screens.insert(id, Screen::new(id, image_id, fill_id, public));
    }

    pub fn free_screen(&mut self, id: i32) {
        self.screens.remove(&id);
    }

    pub fn lookup_screen(&self, id: i32) -> Option<&Screen> {
        self.screens.get(&id)
    }

    pub fn refresh_method(&self, id: i32) -> RefreshMethod {
        self.refresh_methods.get(&id).copied().unwrap_or_default()
    }
}
