//! Plan 9 image RLE codec.
//!
//! spec.md §4.5: a command byte selects between a repeat run and a literal
//! run. `0x00..=0x7F` (`n`) means "repeat the next byte `n+1` times";
//! `0x80..=0xFF` (`n`) means "`(n & 0x7F) + 1` literal bytes follow
//! verbatim". There's no teacher crate for this; it's new code in the
//! corpus's idiom (a plain `Vec<u8>` accumulator, `MalformedStream` on
//! truncation), mirroring the decode-with-bounds-checks style of
//! [`crate::convert`] and `draw9_codec::reader::Reader`.

use draw9_proto::{DrawError, DrawResult};

const MAX_RUN: usize = 128;

/// Decodes a Plan 9 RLE-compressed byte stream in full.
pub fn decode(src: &[u8]) -> DrawResult<Vec<u8>> {
    decode_limited(src, usize::MAX)
}

/// Decodes `src`, stopping as soon as `limit` output bytes have been
/// produced and discarding the rest of the input. spec.md §4.5: "Decoding
/// stops when the destination raster (rows × stride) is full. Trailing
/// input is permitted." Used by the `load`/`Y` opcode, whose compressed
/// payload runs to the end of the command buffer but whose destination
/// rectangle fixes the exact byte count needed.
pub fn decode_limited(src: &[u8], limit: usize) -> DrawResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < src.len() && out.len() < limit {
        let cmd = src[i];
        i += 1;
        if cmd & 0x80 == 0 {
            let count = cmd as usize + 1;
            if i >= src.len() {
                return Err(DrawError::MalformedStream(
                    "rle repeat run missing byte".into(),
                ));
            }
            let byte = src[i];
            i += 1;
            out.resize(out.len() + count, byte);
        } else {
            let count = (cmd & 0x7F) as usize + 1;
            if i + count > src.len() {
                return Err(DrawError::MalformedStream(
                    "rle literal run overruns buffer".into(),
                ));
            }
            out.extend_from_slice(&src[i..i + count]);
            i += count;
        }
    }
    out.truncate(limit);
    Ok(out)
}

/// Encodes `src` into the Plan 9 RLE format, choosing repeat runs for any
/// span of 3 or more identical bytes and literal runs otherwise. Not the
/// only valid encoding of a given byte stream, but [`decode`] inverts it
/// exactly.
pub fn encode(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0usize;
    let mut literal_start = 0usize;

    let flush_literal = |out: &mut Vec<u8>, src: &[u8], start: usize, end: usize| {
        let mut s = start;
        while s < end {
            let chunk = (end - s).min(MAX_RUN);
            out.push(0x80 | (chunk - 1) as u8);
            out.extend_from_slice(&src[s..s + chunk]);
            s += chunk;
        }
    };

    while i < src.len() {
        let byte = src[i];
        let mut run = 1;
        while i + run < src.len() && src[i + run] == byte && run < MAX_RUN {
            run += 1;
        }
        if run >= 3 {
            flush_literal(&mut out, src, literal_start, i);
            out.push((run - 1) as u8);
            out.push(byte);
            i += run;
            literal_start = i;
        } else {
            i += run;
        }
    }
    flush_literal(&mut out, src, literal_start, src.len());
    out
}
