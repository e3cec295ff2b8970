//! Opcode byte assignments, spec.md §6.

pub const ALLOC_IMAGE: u8 = 0x62; // b
pub const ALLOC_SCREEN: u8 = 0x41; // A
pub const FREE_SCREEN: u8 = 0x46; // F
pub const FREE_IMAGE: u8 = 0x66; // f
pub const DRAW: u8 = 0x64; // d
pub const LINE: u8 = 0x4C; // L
pub const ELLIPSE: u8 = 0x65; // e
pub const FILLED_ELLIPSE: u8 = 0x45; // E
pub const ARC: u8 = 0x61; // a
pub const POLYGON: u8 = 0x70; // p
pub const FILLED_POLYGON: u8 = 0x50; // P
pub const STRING: u8 = 0x73; // s
pub const STRING_BG: u8 = 0x78; // x
pub const LOAD_IMAGE: u8 = 0x79; // y
pub const LOAD_IMAGE_COMPRESSED: u8 = 0x59; // Y
pub const UNLOAD_IMAGE: u8 = 0x72; // r
pub const ORIGIN: u8 = 0x6F; // o
pub const SET_CLIP: u8 = 0x63; // c
pub const SET_OPERATOR: u8 = 0x4F; // O
pub const TOP: u8 = 0x74; // t
pub const BOTTOM: u8 = 0x42; // B
pub const NAME_GLOBAL: u8 = 0x4E; // N
pub const NAME_LOCAL: u8 = 0x6E; // n
pub const INIT_FONT: u8 = 0x69; // i
pub const LOAD_CHAR: u8 = 0x6C; // l
pub const INIT: u8 = 0x49; // I
pub const FLUSH: u8 = 0x76; // v
