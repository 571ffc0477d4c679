//! Codec for the `.TGR` game-asset sprite container: an IFF-framed `FORM TGAR` holding a
//! header, an optional palette, and one RLE-encoded `FRAM` chunk per sprite frame.
//!
//! IFF chunk framing is big-endian; everything inside a chunk body (header fields, palette
//! entries, opcode payloads) is little-endian. See [`file::TgrFile`] for the decode entry
//! point and [`file::TgrFileBuilder`] for encoding.

extern crate byteorder;

pub mod error;
pub mod file;
pub mod frame;
pub mod header;
pub mod iff;
pub mod line;
pub mod metadata;
pub mod palette;
pub mod pixel;
pub mod playercolor;

pub use error::{Result, TgrError};
pub use file::{TgrFile, TgrFileBuilder};
pub use header::{Animation, FrameRect, Header};
pub use line::{DecodeContext, LineEncoder};
pub use metadata::SpriteMetadata;
pub use palette::Palette;
pub use pixel::Pixel;
pub use playercolor::PlayerColorTable;
