//! Component H: the frame driver — loops scanlines into/out of one `FRAM` chunk's payload.

use byteorder::ReadBytesExt;
use std::io::Read;

use crate::error::{Result, TgrError};
use crate::header::FrameRect;
use crate::line::{decode_line, DecodeContext, LineEncoder};
use crate::pixel::{self, Pixel};

/// A frame rectangle of `(0, 0, 0, 0)` is a sentinel, not a real 1x1 image: it marks an unused
/// slot in the frame table and decodes/encodes as a zero-byte `FRAM` chunk.
pub fn is_padding_frame(rect: &FrameRect) -> bool {
    rect.ulx == 0 && rect.uly == 0 && rect.lrx == 0 && rect.lry == 0
}

/// Read one variable-width length field, returning `(value, bytes_consumed)`. `Ok(None)` means
/// the stream ended cleanly before this field's first byte — the frame driver treats that as
/// "no more lines", not an error.
fn read_var_len<R: Read>(reader: &mut R) -> Result<Option<(u32, usize)>> {
    let mut first = [0u8; 1];
    if reader.read(&mut first)? == 0 {
        return Ok(None);
    }
    if first[0] & 0x80 != 0 {
        let second = reader.read_u8()?;
        let value = ((u16::from(first[0]) << 8) | u16::from(second)) & 0x7FFF;
        Ok(Some((u32::from(value), 2)))
    } else {
        Ok(Some((u32::from(first[0]), 1)))
    }
}

/// Decode a frame body: `height` scanlines of `width` pixels each, row-major. Shorter-than-
/// declared frames (the stream runs out before `height` rows are produced) are padded with
/// transparency rather than treated as an error.
pub fn decode_frame<R: Read>(
    reader: &mut R,
    width: u16,
    height: u16,
    ctx: &DecodeContext,
) -> Result<Vec<Pixel>> {
    let mut pixels = Vec::with_capacity(usize::from(width) * usize::from(height));
    let mut rows_decoded: u16 = 0;

    for _ in 0..height {
        let Some((total_length, total_width)) = read_var_len(reader)? else {
            break;
        };
        let offset = reader.read_u8()?;
        let Some((pixel_length, ct_width)) = read_var_len(reader)? else {
            return Err(TgrError::Truncated);
        };

        let header_length = (total_width + 1 + ct_width) as u32;
        let data_length = total_length.checked_sub(header_length).ok_or(TgrError::Truncated)?;

        let mut row = decode_line(reader, u16::from(offset), pixel_length as u16, data_length, ctx)?;
        if row.len() != usize::from(width) {
            log::warn!("line produced {} pixels, frame width is {width}", row.len());
            row.resize(usize::from(width), pixel::TRANSPARENCY);
        }
        pixels.extend(row);
        rows_decoded += 1;
    }

    if rows_decoded < height {
        log::debug!("frame produced {rows_decoded} of {height} declared rows; padding remainder");
        for _ in rows_decoded..height {
            pixels.extend(std::iter::repeat(pixel::TRANSPARENCY).take(usize::from(width)));
        }
    }

    Ok(pixels)
}

/// Encode a frame body: `raster` is `width * height` pixels, row-major. Returns the `FRAM`
/// chunk's payload, already padded to a 4-byte multiple.
pub fn encode_frame(raster: &[Pixel], width: u16, height: u16, encoder: &LineEncoder) -> Result<Vec<u8>> {
    if raster.len() != usize::from(width) * usize::from(height) {
        // `got`'s second component is the number of full rows of `width` the raster actually
        // supplies (floor division), not a second independent dimension — the caller only hands
        // us a flat buffer, so a true width/height pair for what we got doesn't exist.
        let got_rows = if width == 0 {
            0
        } else {
            (raster.len() / usize::from(width)).min(usize::from(u16::MAX)) as u16
        };
        return Err(TgrError::FrameSizeMismatch { expected: (width, height), got: (width, got_rows) });
    }

    let mut buf = Vec::with_capacity(raster.len() * 2);
    for row in raster.chunks_exact(usize::from(width)) {
        buf.extend_from_slice(&encoder.encode_line(row)?);
    }

    let remainder = buf.len() % 4;
    if remainder != 0 {
        buf.extend(std::iter::repeat(0u8).take(4 - remainder));
    }

    Ok(buf)
}

/// Equivalent of [`encode_frame`] using the baseline encoder (no player-colour detection).
pub fn encode_frame_baseline(raster: &[Pixel], width: u16, height: u16) -> Result<Vec<u8>> {
    encode_frame(raster, width, height, &LineEncoder::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;
    use crate::playercolor::PlayerColorTable;
    use std::io::Cursor;

    fn ctx<'a>(palette: &'a Palette, players: &'a PlayerColorTable) -> DecodeContext<'a> {
        DecodeContext { bits_per_px: 16, palette: Some(palette), player_colors: players, player: 2, fx_error_fix: false }
    }

    #[test]
    fn round_trip_small_frame() {
        let palette = Palette::default();
        let players = PlayerColorTable::default_player_two();

        let raster = vec![
            Pixel::opaque(10, 20, 30),
            Pixel::opaque(10, 20, 30),
            pixel::TRANSPARENCY,
            Pixel::opaque(1, 2, 3),
        ];
        let encoded = encode_frame_baseline(&raster, 2, 2).unwrap();
        assert_eq!(encoded.len() % 4, 0);

        let mut cursor = Cursor::new(encoded);
        let decode_ctx = ctx(&palette, &players);
        let decoded = decode_frame(&mut cursor, 2, 2, &decode_ctx).unwrap();

        for (original, got) in raster.iter().zip(decoded.iter()) {
            assert_eq!(original.alpha == 0, got.alpha == 0);
            if original.alpha != 0 {
                assert_eq!(original.to_565(), got.to_565());
            }
        }
    }

    #[test]
    fn short_stream_pads_remaining_rows() {
        let palette = Palette::default();
        let players = PlayerColorTable::default_player_two();
        let decode_ctx = ctx(&palette, &players);

        let mut cursor = Cursor::new(Vec::<u8>::new());
        let decoded = decode_frame(&mut cursor, 3, 2, &decode_ctx).unwrap();
        assert_eq!(decoded.len(), 6);
        assert!(decoded.iter().all(|p| p.alpha == 0));
    }

    #[test]
    fn padding_frame_detection() {
        let rect = FrameRect { ulx: 0, uly: 0, lrx: 0, lry: 0, offset: 0 };
        assert!(is_padding_frame(&rect));
        let rect = FrameRect { ulx: 0, uly: 0, lrx: 0, lry: 1, offset: 0 };
        assert!(!is_padding_frame(&rect));
    }

    #[test]
    fn raster_size_mismatch_is_an_error() {
        let err = encode_frame_baseline(&[Pixel::opaque(0, 0, 0)], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            TgrError::FrameSizeMismatch { expected: (2, 2), got: (2, 0) }
        ));
    }
}
