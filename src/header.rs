//! Component C: the `HEDR` chunk — everything about a `.TGR` file except its pixels.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::{Result, TgrError};

/// One entry in the header's per-frame table: the frame's inclusive bounding rectangle on the
/// overall sprite canvas, and the absolute file offset of its `FRAM` chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameRect {
    pub ulx: u16,
    pub uly: u16,
    pub lrx: u16,
    pub lry: u16,
    pub offset: u32,
}

impl FrameRect {
    pub fn width(&self) -> u16 {
        self.lrx - self.ulx + 1
    }

    pub fn height(&self) -> u16 {
        self.lry - self.uly + 1
    }
}

/// One entry in the animation table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Animation {
    pub start_frame: u16,
    pub frame_count: u16,
    pub animation_count: u16,
}

/// The decoded `HEDR` body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub bits_per_px: u8,
    pub indexed_colour: bool,
    pub offset_flag: u8,
    pub size: (u16, u16),
    pub hotspot: (u16, u16),
    pub bounding_box: (u16, u16, u16, u16),
    pub palette_offset: u32,
    pub frames: Vec<FrameRect>,
    pub animations: Vec<Animation>,
}

impl Header {
    pub fn framecount(&self) -> u16 {
        self.frames.len() as u16
    }

    /// Read a `HEDR` body from `reader`, which must be positioned at its first byte.
    pub fn load<R: Read>(reader: &mut R) -> Result<Header> {
        let version = reader.read_u32::<LittleEndian>()?;
        let framecount = reader.read_u16::<LittleEndian>()?;
        let bits_per_px = reader.read_u8()?;
        let _pad = reader.read_u8()?;

        let _pad = reader.read_u8()?;
        let index_mode = reader.read_u8()?;
        let offset_flag = reader.read_u8()?;
        let _pad = reader.read_u8()?;

        let size = (reader.read_u16::<LittleEndian>()?, reader.read_u16::<LittleEndian>()?);
        let hotspot = (reader.read_u16::<LittleEndian>()?, reader.read_u16::<LittleEndian>()?);
        let bounding_box = (
            reader.read_u16::<LittleEndian>()?,
            reader.read_u16::<LittleEndian>()?,
            reader.read_u16::<LittleEndian>()?,
            reader.read_u16::<LittleEndian>()?,
        );

        let mut reserved = [0u8; 8];
        reader.read_exact(&mut reserved)?;
        let palette_offset = reader.read_u32::<LittleEndian>()?;

        if bits_per_px != 8 && bits_per_px != 16 {
            return Err(TgrError::UnsupportedBitDepth(bits_per_px));
        }

        let mut frames = Vec::with_capacity(framecount as usize);
        for _ in 0..framecount {
            let ulx = reader.read_u16::<LittleEndian>()?;
            let uly = reader.read_u16::<LittleEndian>()?;
            let lrx = reader.read_u16::<LittleEndian>()?;
            let lry = reader.read_u16::<LittleEndian>()?;
            let offset = reader.read_u32::<LittleEndian>()?;
            frames.push(FrameRect { ulx, uly, lrx, lry, offset });
        }

        let anim_count = reader.read_u16::<LittleEndian>()?;
        if anim_count > 6 {
            log::warn!("animation table declares {anim_count} entries, more than the usual 6");
        }
        let mut animations = Vec::with_capacity(anim_count as usize);
        for _ in 0..anim_count {
            let start_frame = reader.read_u16::<LittleEndian>()?;
            let frame_count = reader.read_u16::<LittleEndian>()?;
            let animation_count = reader.read_u16::<LittleEndian>()?;
            animations.push(Animation { start_frame, frame_count, animation_count });
        }

        let indexed_colour = index_mode & 0x7F == 0x1A;
        if indexed_colour && bits_per_px != 8 {
            log::warn!("index_mode marks this file as indexed but bits_per_px is {bits_per_px}");
        }

        Ok(Header {
            version,
            bits_per_px,
            indexed_colour,
            offset_flag,
            size,
            hotspot,
            bounding_box,
            palette_offset,
            frames,
            animations,
        })
    }

    /// Size, in bytes, of the fixed-layout portion of the body (everything before the per-frame
    /// table).
    const FIXED_LEN: u32 = 40;

    /// Total length, in bytes, the per-frame table occupies.
    fn frame_table_len(&self) -> u32 {
        self.frames.len() as u32 * 12
    }

    /// Total length, in bytes, the animation table (count prefix + entries + even-count pad)
    /// occupies.
    fn anim_table_len(&self) -> u32 {
        let mut len = 2 + self.animations.len() as u32 * 6;
        if self.animations.len() % 2 == 0 {
            len += 2;
        }
        len
    }

    /// The absolute file offset of the first `FRAM` chunk's header, given this header's frame
    /// and animation table sizes. `12` is the `FORM` header, `8` the `HEDR` chunk header.
    pub fn offset_to_first_frame(&self) -> u32 {
        12 + 8 + Self::FIXED_LEN + self.frame_table_len() + self.anim_table_len() + 8
    }

    /// Write this header's `HEDR` body (the chunk's big-endian type/length envelope is added
    /// by the caller via [`crate::iff::write_form`]).
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u16::<LittleEndian>(self.framecount())?;
        writer.write_u8(self.bits_per_px)?;
        writer.write_u8(0)?;

        writer.write_u8(0)?;
        let index_mode = if self.indexed_colour { 0x1A } else { 0 };
        writer.write_u8(index_mode)?;
        writer.write_u8(self.offset_flag)?;
        writer.write_u8(0)?;

        writer.write_u16::<LittleEndian>(self.size.0)?;
        writer.write_u16::<LittleEndian>(self.size.1)?;
        writer.write_u16::<LittleEndian>(self.hotspot.0)?;
        writer.write_u16::<LittleEndian>(self.hotspot.1)?;
        writer.write_u16::<LittleEndian>(self.bounding_box.0)?;
        writer.write_u16::<LittleEndian>(self.bounding_box.1)?;
        writer.write_u16::<LittleEndian>(self.bounding_box.2)?;
        writer.write_u16::<LittleEndian>(self.bounding_box.3)?;

        writer.write_all(&[0u8; 8])?;
        writer.write_u32::<LittleEndian>(self.palette_offset)?;

        for frame in &self.frames {
            writer.write_u16::<LittleEndian>(frame.ulx)?;
            writer.write_u16::<LittleEndian>(frame.uly)?;
            writer.write_u16::<LittleEndian>(frame.lrx)?;
            writer.write_u16::<LittleEndian>(frame.lry)?;
            writer.write_u32::<LittleEndian>(frame.offset)?;
        }

        writer.write_u16::<LittleEndian>(self.animations.len() as u16)?;
        for anim in &self.animations {
            writer.write_u16::<LittleEndian>(anim.start_frame)?;
            writer.write_u16::<LittleEndian>(anim.frame_count)?;
            writer.write_u16::<LittleEndian>(anim.animation_count)?;
        }
        if self.animations.len() % 2 == 0 {
            writer.write_all(&[0u8; 2])?;
        }

        Ok(())
    }
}
