//! Plan 9 channel descriptors.
//!
//! Grounded on the teacher's `abi::pixel::PixelFormat`: a small `repr(u32)`
//! enum with explicit discriminants and a `from_u32` constructor. Generalized
//! from the teacher's six framebuffer formats to the fourteen channel
//! descriptors spec.md §3 enumerates.
//!
//! The discriminant values below are this crate's own stable wire encoding
//! for the `chan` field of `alloc`/`init` (spec.md doesn't pin exact
//! numeric codes, only the named set) — see DESIGN.md "Channel wire
//! encoding".

/// A Plan 9 channel descriptor naming a pixel format.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Grey1 = 0,
    Grey2 = 1,
    Grey4 = 2,
    Grey8 = 3,
    Cmap8 = 4,
    Rgb15 = 5,
    Rgb16 = 6,
    Rgb24 = 7,
    Bgr24 = 8,
    Rgba32 = 9,
    Argb32 = 10,
    Xrgb32 = 11,
    Abgr32 = 12,
    Xbgr32 = 13,
}

impl Channel {
    #[inline]
    pub fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => Self::Grey1,
            1 => Self::Grey2,
            2 => Self::Grey4,
            3 => Self::Grey8,
            4 => Self::Cmap8,
            5 => Self::Rgb15,
            6 => Self::Rgb16,
            7 => Self::Rgb24,
            8 => Self::Bgr24,
            9 => Self::Rgba32,
            10 => Self::Argb32,
            11 => Self::Xrgb32,
            12 => Self::Abgr32,
            13 => Self::Xbgr32,
            _ => return None,
        })
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// The Plan 9-style channel token used in ctl records, e.g. `x8r8g8b8`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Grey1 => "k1",
            Self::Grey2 => "k2",
            Self::Grey4 => "k4",
            Self::Grey8 => "k8",
            Self::Cmap8 => "m8",
            Self::Rgb15 => "x1r5g5b5",
            Self::Rgb16 => "r5g6b5",
            Self::Rgb24 => "r8g8b8",
            Self::Bgr24 => "b8g8r8",
            Self::Rgba32 => "r8g8b8a8",
            Self::Argb32 => "a8r8g8b8",
            Self::Xrgb32 => "x8r8g8b8",
            Self::Abgr32 => "a8b8g8r8",
            Self::Xbgr32 => "x8b8g8r8",
        }
    }

    pub fn from_token(s: &str) -> Option<Self> {
        Some(match s {
            "k1" => Self::Grey1,
            "k2" => Self::Grey2,
            "k4" => Self::Grey4,
            "k8" => Self::Grey8,
            "m8" => Self::Cmap8,
            "x1r5g5b5" => Self::Rgb15,
            "r5g6b5" => Self::Rgb16,
            "r8g8b8" => Self::Rgb24,
            "b8g8r8" => Self::Bgr24,
            "r8g8b8a8" => Self::Rgba32,
            "a8r8g8b8" => Self::Argb32,
            "x8r8g8b8" => Self::Xrgb32,
            "a8b8g8r8" => Self::Abgr32,
            "x8b8g8r8" => Self::Xbgr32,
            _ => return None,
        })
    }
}

impl Default for Channel {
    #[inline]
    fn default() -> Self {
        Self::Xrgb32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u32() {
        for v in 0..14u32 {
            let c = Channel::from_u32(v).unwrap();
            assert_eq!(c.to_u32(), v);
        }
        assert!(Channel::from_u32(14).is_none());
    }

    #[test]
    fn token_round_trips() {
        for v in 0..14u32 {
            let c = Channel::from_u32(v).unwrap();
            assert_eq!(Channel::from_token(c.token()), Some(c));
        }
    }
}
