//! Component G: the per-line opcode encoder.

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Result, TgrError};
use crate::pixel::{self, Pixel};
use crate::playercolor::PlayerColorTable;

/// Count further pixels after `pos` equal to `line[pos]`, capped so the resulting run length
/// (this count + 1) never exceeds 31.
fn look_ahead_matching(line: &[Pixel], pos: usize) -> usize {
    let mut collected = 0;
    while pos + collected + 1 < line.len() && line[pos] == line[pos + collected + 1] {
        collected += 1;
        if collected == 30 {
            break;
        }
    }
    collected
}

/// Count a run of distinct opaque pixels starting at `pos`: stops at the first repeated pair,
/// the first non-opaque pixel, end of line, or 31 pixels.
fn look_ahead_distinct(line: &[Pixel], pos: usize) -> usize {
    if pos == line.len() - 1 {
        return 1;
    }
    let mut collected = 0;
    loop {
        if pos + collected + 1 >= line.len() {
            break;
        }
        let this_pixel = line[pos + collected];
        let next_pixel = line[pos + collected + 1];
        if this_pixel == next_pixel || this_pixel.alpha != 255 {
            break;
        }
        collected += 1;
        if collected == 31 {
            break;
        }
    }
    // A singleton opaque pixel whose neighbour differs still needs to be emitted; the loop
    // above only counts *additional* matches, so floor at 1 to keep the caller progressing.
    collected.max(1)
}

fn encode_line_header(offset: u8, ct_pixels: usize, body: &[u8]) -> Result<Vec<u8>> {
    if ct_pixels > 0x7FFF {
        return Err(TgrError::EncodeOverflow("ct_pixels exceeds 15-bit field"));
    }
    if body.len() > 0x7FFA {
        return Err(TgrError::EncodeOverflow("line body exceeds 15-bit field"));
    }

    let mut header_length = 3usize;
    let pfc_wide = ct_pixels > 0x7F;
    if pfc_wide {
        header_length += 1;
    }
    let lfc_wide = body.len() + header_length > 0x7F;
    if lfc_wide {
        header_length += 1;
    }
    let total_length = body.len() + header_length;

    let mut out = Vec::with_capacity(total_length);
    if lfc_wide {
        out.write_u16::<BigEndian>(total_length as u16 | 0x8000)?;
    } else {
        out.write_u8(total_length as u8)?;
    }
    out.write_u8(offset)?;
    if pfc_wide {
        out.write_u16::<BigEndian>(ct_pixels as u16 | 0x8000)?;
    } else {
        out.write_u8(ct_pixels as u8)?;
    }
    out.extend_from_slice(body);
    Ok(out)
}

fn find_player_shade(table: &PlayerColorTable, player: u8, pixel: Pixel) -> Option<u8> {
    (0..=31u8).find(|&shade| table.get(player, shade).map(|p| p == pixel).unwrap_or(false))
}

/// Encode one scanline of opaque-to-translucent RGBA pixels into a complete line record
/// (variable-width header plus opcode body). This is the baseline encoder: it never emits the
/// shadow (`101`), single player-colour (`110`) or packed player-colour (`111`) opcode
/// families — see [`LineEncoder::with_player_color_detection`] for the opt-in that does.
pub fn encode_line(line: &[Pixel]) -> Result<Vec<u8>> {
    encode_line_with(line, None)
}

fn encode_line_with(line: &[Pixel], player_colors: Option<(&PlayerColorTable, u8)>) -> Result<Vec<u8>> {
    let leading = line.iter().take_while(|p| p.alpha == 0).count();
    if leading > 0xFF {
        return Err(TgrError::EncodeOverflow("leading transparent offset exceeds 8-bit field"));
    }
    let offset = leading as u8;

    if leading == line.len() {
        return encode_line_header(offset, 0, &[]);
    }

    let body_estimate = line.len() * 2 + line.len() / 31;
    let mut body = Vec::with_capacity(body_estimate);
    let mut ct_pixels: usize = 0;
    let mut pos = leading;

    while pos < line.len() {
        let p = line[pos];

        if p.alpha == 0 {
            let run = look_ahead_matching(line, pos) + 1;
            if pos + run >= line.len() {
                break;
            }
            body.push((run & 0x1F) as u8);
            pos += run;
            ct_pixels += run;
        } else if p.alpha < 255 {
            let run = look_ahead_matching(line, pos) + 1;
            let a5 = pixel::compress_alpha5(p.alpha);
            if run == 1 {
                body.push((0b100 << 5) | (a5 & 0x1F));
                body.extend_from_slice(&p.to_565().to_le_bytes());
            } else {
                body.push((0b011 << 5) | (run as u8 & 0x1F));
                body.push(a5);
                body.extend_from_slice(&p.to_565().to_le_bytes());
            }
            pos += run;
            ct_pixels += run;
        } else {
            let matching = look_ahead_matching(line, pos);
            if matching > 0 {
                let run = matching + 1;
                body.push((0b001 << 5) | (run as u8 & 0x1F));
                body.extend_from_slice(&p.to_565().to_le_bytes());
                pos += run;
                ct_pixels += run;
            } else {
                let shade = player_colors.and_then(|(table, player)| find_player_shade(table, player, p));
                if let Some(shade) = shade {
                    body.push((0b110 << 5) | (shade & 0x1F));
                    pos += 1;
                    ct_pixels += 1;
                } else {
                    let run = look_ahead_distinct(line, pos);
                    body.push((0b010 << 5) | (run as u8 & 0x1F));
                    for pixel in &line[pos..pos + run] {
                        body.extend_from_slice(&pixel.to_565().to_le_bytes());
                    }
                    pos += run;
                    ct_pixels += run;
                }
            }
        }
    }

    encode_line_header(offset, ct_pixels, &body)
}

/// A configurable scanline encoder. The baseline [`encode_line`] free function is equivalent to
/// `LineEncoder::new()`; this type exists for the optional player-colour detection pass.
#[derive(Clone, Copy, Default)]
pub struct LineEncoder<'a> {
    player_colors: Option<(&'a PlayerColorTable, u8)>,
}

impl<'a> LineEncoder<'a> {
    pub fn new() -> Self {
        LineEncoder { player_colors: None }
    }

    /// Enable detection of pixels that exactly match a shade in `table` for `player`: such
    /// pixels are encoded as single player-colour opcodes (`110`) instead of literal colour.
    pub fn with_player_color_detection(mut self, table: &'a PlayerColorTable, player: u8) -> Self {
        self.player_colors = Some((table, player));
        self
    }

    pub fn encode_line(&self, line: &[Pixel]) -> Result<Vec<u8>> {
        encode_line_with(line, self.player_colors)
    }
}
