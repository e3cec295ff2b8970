//! The refresh notification wire record.
//!
//! spec.md §6: "a 16-byte record, four little-endian i32s: minX, minY,
//! maxX, maxY." [`crate::rasterizer::Rasterizer::take_refresh`] hands the
//! host a [`RefreshRect`] rather than raw bytes; callers that need the
//! wire form call [`RefreshRect::to_bytes`].

use draw9_proto::Rect;

/// A drained refresh rectangle, ready to notify the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RefreshRect(pub Rect);

impl RefreshRect {
    /// The 16-byte little-endian record spec.md §6 describes.
    pub fn to_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.0.min.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.0.min.y.to_le_bytes());
        out[8..12].copy_from_slice(&self.0.max.x.to_le_bytes());
        out[12..16].copy_from_slice(&self.0.max.y.to_le_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draw9_proto::Point;

    #[test]
    fn encodes_four_little_endian_longs() {
        let r = RefreshRect(Rect::new(Point::new(1, 2), Point::new(3, 4)));
        let bytes = r.to_bytes();
        assert_eq!(&bytes[0..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &4i32.to_le_bytes());
    }
}
