//! Component F: the per-line opcode decoder.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

use crate::error::{user_error, Result, TgrError};
use crate::palette::Palette;
use crate::pixel::{self, Pixel};
use crate::playercolor::PlayerColorTable;

/// Everything the line decoder needs to know about the surrounding file, threaded through as an
/// explicit parameter rather than touched via module-scope globals.
pub struct DecodeContext<'a> {
    pub bits_per_px: u8,
    pub palette: Option<&'a Palette>,
    pub player_colors: &'a PlayerColorTable,
    pub player: u8,
    pub fx_error_fix: bool,
}

fn next_pixel<R: Read>(reader: &mut R, ctx: &DecodeContext) -> Result<Pixel> {
    if ctx.bits_per_px == 8 {
        let index = reader.read_u8()?;
        let Some(palette) = ctx.palette else {
            return user_error("indexed line with no palette");
        };
        palette.get(index).ok_or(TgrError::Truncated)
    } else {
        let raw = reader.read_u16::<LittleEndian>()?;
        Ok(Pixel::from_565(raw))
    }
}

/// Decode one scanline's opcode payload into a flat pixel run.
///
/// `reader` must be positioned at the first opcode byte (the three-field line header has
/// already been consumed by the caller, see [`crate::frame`]). `data_length` is the number of
/// payload bytes making up this line's body.
pub fn decode_line<R: Read>(
    reader: &mut R,
    transparent_pixels: u16,
    pixel_length: u16,
    data_length: u32,
    ctx: &DecodeContext,
) -> Result<Vec<Pixel>> {
    let mut outbuf = Vec::with_capacity(pixel_length as usize);
    for _ in 0..transparent_pixels {
        outbuf.push(pixel::TRANSPARENCY);
    }

    let mut consumed: u32 = 0;
    while consumed < data_length {
        let opcode = reader.read_u8()?;
        consumed += 1;

        if ctx.fx_error_fix && (opcode == 0x7F || opcode == 0xFD) {
            outbuf.push(pixel::FX_ERROR_FIX_PIXEL);
            continue;
        }

        let flag = opcode >> 5;
        let n = opcode & 0x1F;

        match flag {
            0b000 => {
                for _ in 0..n {
                    outbuf.push(pixel::TRANSPARENCY);
                }
            }
            0b001 => {
                let p = next_pixel(reader, ctx)?;
                consumed += u32::from(ctx.bits_per_px) / 8;
                for _ in 0..n {
                    outbuf.push(p);
                }
            }
            0b010 => {
                for _ in 0..n {
                    outbuf.push(next_pixel(reader, ctx)?);
                    consumed += u32::from(ctx.bits_per_px) / 8;
                }
            }
            0b011 => {
                let alpha_raw = reader.read_u8()?;
                consumed += 1;
                let alpha = pixel::expand_alpha5(alpha_raw);
                let mut p = next_pixel(reader, ctx)?;
                consumed += u32::from(ctx.bits_per_px) / 8;
                p.alpha = alpha;
                for _ in 0..n {
                    outbuf.push(p);
                }
            }
            0b100 => {
                let mut p = next_pixel(reader, ctx)?;
                consumed += u32::from(ctx.bits_per_px) / 8;
                p.alpha = pixel::expand_alpha5(n);
                outbuf.push(p);
            }
            0b101 => {
                for _ in 0..n {
                    outbuf.push(pixel::SHADOW);
                }
            }
            0b110 => {
                outbuf.push(ctx.player_colors.get(ctx.player, n)?);
            }
            0b111 => {
                let read_length = (usize::from(n) + 1) / 2;
                let mut bytes = vec![0u8; read_length];
                reader.read_exact(&mut bytes)?;
                consumed += read_length as u32;

                for (i, byte) in bytes.iter().enumerate() {
                    let first = (byte >> 3) & 0b1_1111 | 1;
                    outbuf.push(ctx.player_colors.get(ctx.player, first)?);
                    if n % 2 == 0 || i < bytes.len() - 1 {
                        let second = (byte << 1) & 0b1_1111 | 1;
                        outbuf.push(ctx.player_colors.get(ctx.player, second)?);
                    }
                }
            }
            _ => {
                log::warn!("unsupported opcode flag {flag} in byte 0x{opcode:02x}");
            }
        }
    }

    if outbuf.len() < pixel_length as usize {
        log::debug!(
            "line produced {} pixels, padding to declared length {}",
            outbuf.len(),
            pixel_length
        );
        outbuf.resize(pixel_length as usize, pixel::TRANSPARENCY);
    }

    Ok(outbuf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ctx() -> (Palette, PlayerColorTable) {
        (Palette::default(), PlayerColorTable::default_player_two())
    }

    #[test]
    fn solid_run_black() {
        let (palette, players) = ctx();
        let decode_ctx = DecodeContext {
            bits_per_px: 16,
            palette: Some(&palette),
            player_colors: &players,
            player: 2,
            fx_error_fix: false,
        };
        let mut cursor = Cursor::new(vec![0x20, 0x00, 0x00]);
        let out = decode_line(&mut cursor, 0, 1, 3, &decode_ctx).unwrap();
        assert_eq!(out, vec![Pixel::opaque(0, 0, 0)]);
    }

    #[test]
    fn transparent_prefix_then_pad() {
        let (palette, players) = ctx();
        let decode_ctx = DecodeContext {
            bits_per_px: 16,
            palette: Some(&palette),
            player_colors: &players,
            player: 2,
            fx_error_fix: false,
        };
        let mut cursor = Cursor::new(vec![0x20, 0x00, 0x00]);
        let out = decode_line(&mut cursor, 4, 6, 3, &decode_ctx).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(&out[0..4], &[pixel::TRANSPARENCY; 4]);
        assert_eq!(out[4], Pixel::opaque(0, 0, 0));
        assert_eq!(out[5], pixel::TRANSPARENCY);
    }

    #[test]
    fn literal_run_of_three() {
        let (palette, players) = ctx();
        let decode_ctx = DecodeContext {
            bits_per_px: 16,
            palette: Some(&palette),
            player_colors: &players,
            player: 2,
            fx_error_fix: false,
        };
        let mut bytes = vec![0x43];
        bytes.extend_from_slice(&0xF800u16.to_le_bytes());
        bytes.extend_from_slice(&0x07E0u16.to_le_bytes());
        bytes.extend_from_slice(&0x001Fu16.to_le_bytes());
        let len = bytes.len() as u32;
        let mut cursor = Cursor::new(bytes);
        let out = decode_line(&mut cursor, 0, 3, len, &decode_ctx).unwrap();
        assert_eq!(out, vec![Pixel::opaque(255, 0, 0), Pixel::opaque(0, 255, 0), Pixel::opaque(0, 0, 255)]);
    }

    #[test]
    fn translucent_run() {
        let (palette, players) = ctx();
        let decode_ctx = DecodeContext {
            bits_per_px: 16,
            palette: Some(&palette),
            player_colors: &players,
            player: 2,
            fx_error_fix: false,
        };
        let mut bytes = vec![0x62, 0x10];
        bytes.extend_from_slice(&0xFFFFu16.to_le_bytes());
        let len = bytes.len() as u32;
        let mut cursor = Cursor::new(bytes);
        let out = decode_line(&mut cursor, 0, 2, len, &decode_ctx).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].red, 255);
        assert_eq!(out[0].alpha, 132);
        assert_eq!(out[1], out[0]);
    }

    #[test]
    fn packed_player_color() {
        let mut players = PlayerColorTable::empty();
        for shade in 0..32u8 {
            players.insert(2, shade, Pixel::opaque(shade, shade, shade));
        }
        let palette = Palette::default();
        let decode_ctx = DecodeContext {
            bits_per_px: 16,
            palette: Some(&palette),
            player_colors: &players,
            player: 2,
            fx_error_fix: false,
        };
        let bytes = vec![0xE4, 0xAB, 0xCD];
        let len = bytes.len() as u32;
        let mut cursor = Cursor::new(bytes);
        let out = decode_line(&mut cursor, 0, 4, len, &decode_ctx).unwrap();
        let shades: Vec<u8> = out.iter().map(|p| p.red).collect();
        assert_eq!(shades, vec![21, 23, 25, 27]);
    }

    #[test]
    fn fx_error_fix_sentinel() {
        let (palette, players) = ctx();
        let decode_ctx = DecodeContext {
            bits_per_px: 16,
            palette: Some(&palette),
            player_colors: &players,
            player: 2,
            fx_error_fix: true,
        };
        let mut cursor = Cursor::new(vec![0x7F]);
        let out = decode_line(&mut cursor, 0, 1, 1, &decode_ctx).unwrap();
        assert_eq!(out, vec![pixel::FX_ERROR_FIX_PIXEL]);
    }

    #[test]
    fn indexed_solid_run_with_on_disk_index_zero_does_not_panic() {
        let palette = Palette::from_entries(vec![Pixel::opaque(1, 2, 3)]);
        let players = PlayerColorTable::default_player_two();
        let decode_ctx = DecodeContext {
            bits_per_px: 8,
            palette: Some(&palette),
            player_colors: &players,
            player: 2,
            fx_error_fix: false,
        };
        // flag 001 (solid run), n=1, followed by on-disk palette index 0.
        let mut cursor = Cursor::new(vec![0x21, 0x00]);
        let err = decode_line(&mut cursor, 0, 1, 2, &decode_ctx).unwrap_err();
        assert!(matches!(err, TgrError::Truncated));
    }
}
