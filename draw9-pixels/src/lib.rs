//! Channel pixel-format conversion and the Plan 9 image RLE codec used by
//! `alloc`'s `load`/`unload`/`readimage` payloads.

pub mod convert;
pub mod rle;

pub use convert::{decode_row, encode_row, pixel_row_bytes};
pub use rle::{decode as rle_decode, decode_limited as rle_decode_limited, encode as rle_encode};
