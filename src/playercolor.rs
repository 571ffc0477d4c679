//! Component E: the player-colour ramp, loaded from an external `COLORS.INI`.

use std::collections::HashMap;
use std::path::Path;

use ini::Ini;

use crate::error::{user_error, Result, TgrError};
use crate::pixel::Pixel;

/// `(player_id, shade_id) -> Pixel`, loaded from `COLORS.INI`'s `[PlayerColors]` section.
#[derive(Clone, Debug, Default)]
pub struct PlayerColorTable {
    shades: HashMap<(u8, u8), Pixel>,
}

impl PlayerColorTable {
    pub fn empty() -> Self {
        PlayerColorTable { shades: HashMap::new() }
    }

    pub fn insert(&mut self, player: u8, shade: u8, pixel: Pixel) {
        self.shades.insert((player, shade), pixel);
    }

    pub fn get(&self, player: u8, shade: u8) -> Result<Pixel> {
        self.shades
            .get(&(player, shade))
            .copied()
            .ok_or(TgrError::UnknownPlayerColor { player, shade })
    }

    /// Load `[PlayerColors]` keys of the form `color_<N>_shade_<M> = R,G,B` from an INI file.
    /// Keys that don't match are skipped, same as the original loader's best-effort parse.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<PlayerColorTable> {
        let Ok(ini) = Ini::load_from_file(path.as_ref()) else {
            return user_error("COLORS.INI could not be parsed");
        };
        let mut table = PlayerColorTable::empty();

        if let Some(section) = ini.section(Some("PlayerColors")) {
            for (key, value) in section.iter() {
                if let Some((player, shade)) = parse_key(key) {
                    if let Some(pixel) = parse_rgb(value) {
                        table.insert(player, shade, pixel);
                    } else {
                        log::warn!("COLORS.INI key {key} has an unparsable value {value:?}");
                    }
                }
            }
        }

        Ok(table)
    }

    /// The built-in player-2 (blue) fallback ramp, usable without touching the filesystem.
    pub fn default_player_two() -> PlayerColorTable {
        let mut table = PlayerColorTable::empty();
        for (shade, rgb) in PLAYER_TWO_FALLBACK.iter().enumerate() {
            table.insert(2, shade as u8, Pixel::opaque(rgb.0, rgb.1, rgb.2));
        }
        table
    }
}

fn parse_key(key: &str) -> Option<(u8, u8)> {
    let rest = key.strip_prefix("color_")?;
    let (player_str, shade_str) = rest.split_once("_shade_")?;
    let player = player_str.parse().ok()?;
    let shade = shade_str.parse().ok()?;
    Some((player, shade))
}

fn parse_rgb(value: &str) -> Option<Pixel> {
    let mut parts = value.trim().splitn(3, ',');
    let red = parts.next()?.trim().parse().ok()?;
    let green = parts.next()?.trim().parse().ok()?;
    let blue = parts.next()?.trim().parse().ok()?;
    Some(Pixel::opaque(red, green, blue))
}

/// A blue ramp for player 2, 32 shades, darkest to brightest. Values are a plausible linear
/// ramp; no captured `COLORS.INI` ships in this workspace to copy exact values from.
const PLAYER_TWO_FALLBACK: [(u8, u8, u8); 32] = build_fallback_ramp();

const fn build_fallback_ramp() -> [(u8, u8, u8); 32] {
    let mut ramp = [(0u8, 0u8, 0u8); 32];
    let mut i = 0;
    while i < 32 {
        let level = (i * 255 / 31) as u8;
        ramp[i] = (0, 0, level);
        i += 1;
    }
    ramp
}
