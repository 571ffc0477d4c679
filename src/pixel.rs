//! RGBA pixels and conversion to/from the on-disk 5-6-5 direct colour form.

/// An 8-bit-per-channel RGBA pixel.
///
/// This is the only representation consumers of this crate ever see; the on-disk 5-6-5 or
/// palette-indexed forms are converted to/from this type at the line-decoder/encoder boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Pixel { red, green, blue, alpha }
    }

    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Pixel { red, green, blue, alpha: 0xFF }
    }

    /// Decode a little-endian 5-6-5 half-word into an opaque pixel.
    ///
    /// Channel expansion uses rational rounding (`round(c / max * 255)`), the only form this
    /// crate implements — see DESIGN.md for why the shift-only variant is not ported.
    pub fn from_565(half_word: u16) -> Self {
        let blue = expand_channel(half_word & 0b1_1111, 31);
        let green = expand_channel((half_word >> 5) & 0b11_1111, 63);
        let red = expand_channel((half_word >> 11) & 0b1_1111, 31);
        Pixel::opaque(red, green, blue)
    }

    /// Encode this pixel's RGB channels as a little-endian 5-6-5 half-word. Alpha is dropped.
    pub fn to_565(self) -> u16 {
        let r5 = compress_channel(self.red, 31);
        let g6 = compress_channel(self.green, 63);
        let b5 = compress_channel(self.blue, 31);
        (r5 << 11) | (g6 << 5) | b5
    }
}

fn expand_channel(raw: u16, max: u16) -> u8 {
    ((u32::from(raw) * 255 + u32::from(max) / 2) / u32::from(max)) as u8
}

fn compress_channel(value: u8, max: u16) -> u16 {
    ((u32::from(value) * u32::from(max) + 127) / 255) as u16
}

/// The raster colour used to denote a known-transparent pixel.
pub const TRANSPARENCY: Pixel = Pixel::new(0x00, 0xFF, 0xFF, 0x00);

/// Half-alpha black, emitted by the shadow-run opcode.
pub const SHADOW: Pixel = Pixel::new(0, 0, 0, 0x80);

/// Magenta transparent pixel emitted for the `fx_error_fix` sentinel opcode bytes.
pub const FX_ERROR_FIX_PIXEL: Pixel = Pixel::new(0xFF, 0x00, 0xFF, 0x00);

/// Expand a 5-bit alpha field (as carried by the translucent-run and single-translucent
/// opcodes) to an 8-bit alpha value.
pub fn expand_alpha5(raw: u8) -> u8 {
    expand_channel(u16::from(raw & 0b1_1111), 31)
}

/// Compress an 8-bit alpha value down to the 5-bit field used by the translucent opcodes.
pub fn compress_alpha5(alpha: u8) -> u8 {
    compress_channel(alpha, 31) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_black_and_white() {
        assert_eq!(Pixel::from_565(0x0000), Pixel::opaque(0, 0, 0));
        assert_eq!(Pixel::from_565(0xFFFF), Pixel::opaque(255, 255, 255));
    }

    #[test]
    fn channel_round_trip_within_quantisation_error() {
        for c in 0u16..=255 {
            let c = c as u8;
            let five_bit = compress_channel(c, 31);
            let back = expand_channel(five_bit, 31);
            assert!((i32::from(back) - i32::from(c)).abs() <= 255 / 31 + 1);
        }
    }

    #[test]
    fn primary_colors() {
        // 0xF800 = red, 0x07E0 = green, 0x001F = blue (as used in the spec's literal examples).
        assert_eq!(Pixel::from_565(0xF800), Pixel::opaque(255, 0, 0));
        assert_eq!(Pixel::from_565(0x07E0), Pixel::opaque(0, 255, 0));
        assert_eq!(Pixel::from_565(0x001F), Pixel::opaque(0, 0, 255));
    }

    #[test]
    fn alpha5_round_trip() {
        assert_eq!(expand_alpha5(0x10), 132);
        assert_eq!(compress_alpha5(expand_alpha5(0x1F)), 0x1F);
    }
}
