#![no_main]
use libfuzzer_sys::fuzz_target;
use tgr::line::{decode_line, DecodeContext};
use tgr::{Palette, PlayerColorTable};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let bits_per_px = if data[0] & 1 == 0 { 16 } else { 8 };
    let transparent_pixels = u16::from(data[1]);
    let pixel_length = u16::from(data[2]).wrapping_mul(u16::from(data[3]).max(1));
    let body = &data[4..];

    let palette = Palette::from_entries(vec![tgr::Pixel::opaque(0, 0, 0); 256]);
    let players = PlayerColorTable::default_player_two();
    let ctx = DecodeContext {
        bits_per_px,
        palette: Some(&palette),
        player_colors: &players,
        player: 2,
        fx_error_fix: data[0] & 2 != 0,
    };

    let mut cursor = std::io::Cursor::new(body);
    let _ = decode_line(&mut cursor, transparent_pixels, pixel_length, body.len() as u32, &ctx);
});
