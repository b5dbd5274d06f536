//! Decoder for the uncompressed true-colour subset of the TGA format used by
//! UI texture assets.
//!
//! The layout of a supported file is this:
//!
//! ```text,ignore
//!                   <────── 8 bits ──────>
//!                   ┌────────────────────┐
//!        ┌──── 0x00 | id length          |
//!        |     0x01 | colour map type    |
//!        |     0x02 | data type (== 2)   |
//!        |     0x03 | colour map origin  | u16
//!        |     0x05 | colour map length  | u16
//! Header ┤     0x07 | colour map depth   |
//!        |     0x08 | x origin           | u16
//!        |     0x0A | y origin           | u16
//!        |     0x0C | width              | u16
//!        |     0x0E | height             | u16
//!        |     0x10 | bits per pixel     |
//!        └──── 0x11 | image descriptor   | bit 5 = top-left origin
//!        ┌──── 0x12 | image id           | `id length` bytes
//! Pixels ┤          | B G R (A) ...      | bottom-up rows unless bit 5
//!        └───────── └────────────────────┘
//! ```
//!
//! All multi-byte fields are little-endian. Output from [`decode`] is always
//! tightly packed RGBA8 with the origin at the top-left.

mod decode;
mod header;

pub use crate::decode::*;
pub use crate::header::*;

use thiserror::Error;

/// Bytes per pixel of every decoded image
pub const RGBA_CHANNELS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TgaError {
    /// The data type or pixel depth is not one this decoder handles
    #[error("unsupported texture format: {0}")]
    UnsupportedFormat(String),
    /// The buffer ends before the header or pixel payload does
    #[error("texture data truncated: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
}
