//! Colour representations.
//!
//! `Color32` is lifted directly from the teacher's `abi::draw::Color32`:
//! 0xAARRGGBB, alpha in the most significant byte. spec.md §3 specifies the
//! same layout for allocation colours ("32-bit value with byte order A, R,
//! G, B most-significant to least-significant").

/// Canonical allocation-colour representation: 0xAARRGGBB.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Color32(pub u32);

impl Color32 {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }
    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }
    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_u32(v: u32) -> Self {
        Self(v)
    }

    /// Straight RGBA8 tuple, matching the internal surface representation.
    #[inline]
    pub const fn to_rgba(self) -> Rgba8 {
        Rgba8 {
            r: self.red(),
            g: self.green(),
            b: self.blue(),
            a: self.alpha(),
        }
    }
}

/// Straight (non-premultiplied) RGBA8 pixel — the internal surface format
/// every `Channel` is converted to and from (spec.md §4.5, "Straight
/// alpha").
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn from_color(c: Color32) -> Self {
        c.to_rgba()
    }

    #[inline]
    pub const fn to_color(self) -> Color32 {
        Color32::new(self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_rgba() {
        let c = Color32::new(0x11, 0x22, 0x33, 0xAA);
        assert_eq!(c.to_rgba().to_color(), c);
    }

    #[test]
    fn byte_order_is_argb_msb_first() {
        let c = Color32(0xFFFF0000);
        assert_eq!(c.alpha(), 0xFF);
        assert_eq!(c.red(), 0xFF);
        assert_eq!(c.green(), 0x00);
        assert_eq!(c.blue(), 0x00);
    }
}
