//! Component I: glue code — decode a byte stream into per-frame rasters, or encode rasters
//! plus metadata back into a `.TGR` byte stream.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::error::{user_error, Result, TgrError};
use crate::frame;
use crate::header::{Animation, FrameRect, Header};
use crate::iff;
use crate::line::{DecodeContext, LineEncoder};
use crate::palette::Palette;
use crate::pixel::Pixel;
use crate::playercolor::PlayerColorTable;

/// A decoded `.TGR` file: its header, optional palette, and the raw bytes frames are lazily
/// decoded from.
pub struct TgrFile {
    pub header: Header,
    pub palette: Option<Palette>,
    bytes: Vec<u8>,
}

impl TgrFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TgrFile> {
        let bytes = fs::read(path)?;
        Self::from_mem(bytes)
    }

    pub fn from_mem(bytes: Vec<u8>) -> Result<TgrFile> {
        let mut cursor = Cursor::new(&bytes[..]);
        let form = iff::parse_form(&mut cursor)?;
        if &form.form_type != b"TGAR" {
            return Err(TgrError::InvalidFormType);
        }

        let hedr_chunk = form.find(b"HEDR").ok_or(TgrError::Truncated)?;
        let hedr_range = hedr_chunk.data_offset as usize..(hedr_chunk.data_offset + u64::from(hedr_chunk.length)) as usize;
        let mut hedr_reader = Cursor::new(&bytes[hedr_range]);
        let header = Header::load(&mut hedr_reader)?;

        let palette = if header.indexed_colour {
            let palt_chunk = form.find(b"PALT").ok_or(TgrError::Truncated)?;
            let palt_range =
                palt_chunk.data_offset as usize..(palt_chunk.data_offset + u64::from(palt_chunk.length)) as usize;
            let mut palt_reader = Cursor::new(&bytes[palt_range]);
            Some(Palette::load(&mut palt_reader)?)
        } else {
            None
        };

        Ok(TgrFile { header, palette, bytes })
    }

    pub fn framecount(&self) -> u16 {
        self.header.framecount()
    }

    pub fn size(&self) -> (u16, u16) {
        self.header.size
    }

    pub fn hotspot(&self) -> (u16, u16) {
        self.header.hotspot
    }

    pub fn bounding_box(&self) -> (u16, u16, u16, u16) {
        self.header.bounding_box
    }

    pub fn is_indexed(&self) -> bool {
        self.header.indexed_colour
    }

    pub fn animations(&self) -> &[Animation] {
        &self.header.animations
    }

    /// Decode one frame. Returns `None` for a padding frame (no raster, see
    /// [`frame::is_padding_frame`]).
    pub fn decode_frame(
        &self,
        index: usize,
        player_colors: &PlayerColorTable,
        player: u8,
        fx_error_fix: bool,
    ) -> Result<Option<Vec<Pixel>>> {
        let Some(rect) = self.header.frames.get(index) else {
            return user_error("frame index out of range");
        };

        if frame::is_padding_frame(rect) {
            return Ok(None);
        }

        let mut cursor = Cursor::new(&self.bytes[rect.offset as usize..]);
        let ctx = DecodeContext {
            bits_per_px: self.header.bits_per_px,
            palette: self.palette.as_ref(),
            player_colors,
            player,
            fx_error_fix,
        };

        let pixels = frame::decode_frame(&mut cursor, rect.width(), rect.height(), &ctx)?;
        Ok(Some(pixels))
    }

    /// Decode every frame in order.
    pub fn decode_frames(
        &self,
        player_colors: &PlayerColorTable,
        player: u8,
        fx_error_fix: bool,
    ) -> Result<Vec<Option<Vec<Pixel>>>> {
        (0..self.header.frames.len())
            .map(|i| self.decode_frame(i, player_colors, player, fx_error_fix))
            .collect()
    }
}

/// The tight inclusive bounding rectangle of every pixel with `alpha > 0`, or `None` if the
/// raster is entirely transparent.
pub fn tight_bounding_box(raster: &[Pixel], width: u16, height: u16) -> Option<(u16, u16, u16, u16)> {
    let mut bounds: Option<(u16, u16, u16, u16)> = None;
    for y in 0..height {
        for x in 0..width {
            let pixel = raster[usize::from(y) * usize::from(width) + usize::from(x)];
            if pixel.alpha == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)),
            });
        }
    }
    bounds
}

enum FrameSource {
    Padding,
    Raster { rect: (u16, u16, u16, u16), raster: Vec<Pixel> },
}

/// Builds a `.TGR` byte stream from per-frame rasters and sprite metadata.
pub struct TgrFileBuilder {
    bits_per_px: u8,
    size: (u16, u16),
    hotspot: (u16, u16),
    bounding_box: (u16, u16, u16, u16),
    animations: Vec<Animation>,
    palette: Option<Palette>,
    frames: Vec<FrameSource>,
}

impl TgrFileBuilder {
    pub fn new(bits_per_px: u8, size: (u16, u16)) -> Result<TgrFileBuilder> {
        if bits_per_px != 8 && bits_per_px != 16 {
            return Err(TgrError::UnsupportedBitDepth(bits_per_px));
        }
        Ok(TgrFileBuilder {
            bits_per_px,
            size,
            hotspot: (0, 0),
            bounding_box: (0, 0, size.0.saturating_sub(1), size.1.saturating_sub(1)),
            animations: Vec::new(),
            palette: None,
            frames: Vec::new(),
        })
    }

    pub fn hotspot(mut self, hotspot: (u16, u16)) -> Self {
        self.hotspot = hotspot;
        self
    }

    pub fn bounding_box(mut self, bounding_box: (u16, u16, u16, u16)) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    pub fn animations(mut self, animations: Vec<Animation>) -> Result<Self> {
        if animations.len() > 6 {
            return Err(TgrError::EncodeOverflow("animation table holds at most 6 entries"));
        }
        self.animations = animations;
        Ok(self)
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Add a frame occupying inclusive rectangle `(ulx, uly, lrx, lry)` on the overall canvas.
    /// `raster` must be exactly `(lrx-ulx+1) * (lry-uly+1)` pixels, row-major.
    pub fn add_frame(mut self, rect: (u16, u16, u16, u16), raster: Vec<Pixel>) -> Self {
        self.frames.push(FrameSource::Raster { rect, raster });
        self
    }

    /// Add a zero-length padding frame (keeps a slot's index stable with no image).
    pub fn add_padding_frame(mut self) -> Self {
        self.frames.push(FrameSource::Padding);
        self
    }

    /// Encode the accumulated frames into a complete `.TGR` byte stream.
    pub fn encode(self, encoder: &LineEncoder) -> Result<Vec<u8>> {
        if self.frames.is_empty() {
            return user_error("a TGR file needs at least one frame");
        }

        let mut frame_payloads = Vec::with_capacity(self.frames.len());
        let mut frame_rects = Vec::with_capacity(self.frames.len());

        for source in &self.frames {
            match source {
                FrameSource::Padding => {
                    frame_payloads.push(Vec::new());
                    frame_rects.push((0u16, 0u16, 0u16, 0u16));
                }
                FrameSource::Raster { rect, raster } => {
                    let (ulx, uly, lrx, lry) = *rect;
                    let width = lrx - ulx + 1;
                    let height = lry - uly + 1;
                    let payload = frame::encode_frame(raster, width, height, encoder)?;
                    frame_payloads.push(payload);
                    frame_rects.push(*rect);
                }
            }
        }

        let hotspot = if self.hotspot == (0, 0) && self.frames.len() > 1 {
            let (ulx, uly, lrx, lry) = frame_rects[0];
            let width = lrx - ulx + 1;
            let height = lry - uly + 1;
            (width / 2 + ulx, height)
        } else {
            self.hotspot
        };

        let mut header = Header {
            version: 4,
            bits_per_px: self.bits_per_px,
            indexed_colour: self.bits_per_px == 8,
            offset_flag: 0,
            size: self.size,
            hotspot,
            bounding_box: self.bounding_box,
            palette_offset: 0,
            frames: frame_rects
                .iter()
                .map(|&(ulx, uly, lrx, lry)| FrameRect { ulx, uly, lrx, lry, offset: 0 })
                .collect(),
            animations: self.animations,
        };

        let mut running_offset = u64::from(header.offset_to_first_frame());
        for (i, payload) in frame_payloads.iter().enumerate() {
            header.frames[i].offset = running_offset as u32;
            running_offset += 8 + payload.len() as u64;
        }

        let mut hedr_bytes = Vec::new();
        header.encode(&mut hedr_bytes)?;

        let mut palt_bytes = Vec::new();
        if let Some(palette) = &self.palette {
            palette.encode(&mut palt_bytes)?;
        }

        let mut children: Vec<(&[u8; 4], &[u8])> = Vec::with_capacity(2 + frame_payloads.len());
        children.push((b"HEDR", &hedr_bytes[..]));
        if self.palette.is_some() {
            children.push((b"PALT", &palt_bytes[..]));
        }
        for payload in &frame_payloads {
            children.push((b"FRAM", &payload[..]));
        }

        let mut out = Vec::new();
        iff::write_form(&mut out, b"TGAR", &children)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel;

    fn solid_frame(w: u16, h: u16, p: Pixel) -> Vec<Pixel> {
        vec![p; usize::from(w) * usize::from(h)]
    }

    #[test]
    fn round_trip_single_frame_file() {
        let raster = solid_frame(2, 2, Pixel::opaque(12, 34, 56));
        let bytes = TgrFileBuilder::new(16, (2, 2))
            .unwrap()
            .bounding_box((0, 0, 1, 1))
            .add_frame((0, 0, 1, 1), raster.clone())
            .encode(&LineEncoder::new())
            .unwrap();

        let file = TgrFile::from_mem(bytes).unwrap();
        assert_eq!(file.framecount(), 1);
        assert_eq!(file.size(), (2, 2));

        let players = PlayerColorTable::default_player_two();
        let decoded = file.decode_frame(0, &players, 2, false).unwrap().unwrap();
        for (original, got) in raster.iter().zip(decoded.iter()) {
            assert_eq!(original.to_565(), got.to_565());
        }
    }

    #[test]
    fn padding_frame_round_trips_to_none() {
        let raster = solid_frame(1, 1, Pixel::opaque(1, 2, 3));
        let bytes = TgrFileBuilder::new(16, (1, 1))
            .unwrap()
            .add_frame((0, 0, 0, 0), raster)
            .add_padding_frame()
            .encode(&LineEncoder::new())
            .unwrap();

        let file = TgrFile::from_mem(bytes).unwrap();
        assert_eq!(file.framecount(), 2);
        let players = PlayerColorTable::default_player_two();
        assert!(file.decode_frame(1, &players, 2, false).unwrap().is_none());
    }

    #[test]
    fn hotspot_defaults_to_bottom_centre_of_first_frame() {
        let raster = solid_frame(4, 2, Pixel::opaque(1, 1, 1));
        let bytes = TgrFileBuilder::new(16, (4, 2))
            .unwrap()
            .add_frame((0, 0, 3, 1), raster.clone())
            .add_frame((0, 0, 3, 1), raster)
            .encode(&LineEncoder::new())
            .unwrap();

        let file = TgrFile::from_mem(bytes).unwrap();
        assert_eq!(file.hotspot(), (2, 2));
    }

    #[test]
    fn tight_bounding_box_of_sparse_raster() {
        let mut raster = vec![pixel::TRANSPARENCY; 9];
        raster[4] = Pixel::opaque(1, 1, 1);
        let bounds = tight_bounding_box(&raster, 3, 3).unwrap();
        assert_eq!(bounds, (1, 1, 1, 1));
    }

    #[test]
    fn entirely_transparent_raster_has_no_bounding_box() {
        let raster = vec![pixel::TRANSPARENCY; 9];
        assert!(tight_bounding_box(&raster, 3, 3).is_none());
    }
}
