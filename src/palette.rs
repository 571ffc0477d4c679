//! Component D: the `PALT` chunk — a flat table of direct-colour pixels, referenced by a
//! 1-based index from indexed-colour opcode streams.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::Result;
use crate::pixel::Pixel;

/// A loaded colour palette.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Pixel>,
}

impl Palette {
    pub fn from_entries(entries: Vec<Pixel>) -> Self {
        Palette { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a 1-based on-disk palette index. Index `0` is the reserved/skipped entry (§7)
    /// and also returns `None`, same as an out-of-range index; callers decide whether `None` is
    /// fatal (see the line decoder, which treats an out-of-range index as
    /// [`crate::error::TgrError::Truncated`] but never calls this with `0` to begin with).
    pub fn get(&self, one_based_index: u8) -> Option<Pixel> {
        let zero_based = one_based_index.checked_sub(1)?;
        self.entries.get(usize::from(zero_based)).copied()
    }

    /// Read a `PALT` body from `reader`, which must be positioned at its first byte.
    pub fn load<R: Read>(reader: &mut R) -> Result<Palette> {
        let count = reader.read_u16::<LittleEndian>()?;
        let mut pad = [0u8; 2];
        reader.read_exact(&mut pad)?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw = reader.read_u16::<LittleEndian>()?;
            entries.push(Pixel::from_565(raw));
        }

        Ok(Palette { entries })
    }

    /// Write a `PALT` body. Symmetric with [`Palette::load`] — see DESIGN.md for why this path
    /// is unvalidated against a captured sample.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        writer.write_all(&[0u8; 2])?;
        for pixel in &self.entries {
            writer.write_u16::<LittleEndian>(pixel.to_565())?;
        }
        Ok(())
    }
}
