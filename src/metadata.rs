//! The in-memory shape of a sprite's `sprite.ini` — read on pack, written on unpack by an
//! external CLI collaborator. This crate only defines the struct; it does not parse or
//! serialize the INI file itself (see DESIGN.md).

use crate::header::Animation;

/// `[BitDepth]`, `[HotSpot]`, `[BoundingBox]` and up to six `[Animation0..5]` sections of a
/// sprite's companion metadata file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteMetadata {
    pub bits_per_px: u8,
    pub hotspot: (u16, u16),
    pub bounding_box: (u16, u16, u16, u16),
    pub animations: Vec<Animation>,
}

impl SpriteMetadata {
    pub fn new(bits_per_px: u8, hotspot: (u16, u16), bounding_box: (u16, u16, u16, u16)) -> Self {
        SpriteMetadata { bits_per_px, hotspot, bounding_box, animations: Vec::new() }
    }

    /// `[Animations]` caps out at six slots (`Animation0`..`Animation5`); a seventh entry has
    /// nowhere to go in the INI shape this struct mirrors.
    pub fn with_animations(mut self, animations: Vec<Animation>) -> Self {
        self.animations = animations;
        self
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_roundtrips_fields() {
        let metadata = SpriteMetadata::new(16, (12, 20), (0, 0, 63, 63))
            .with_animations(vec![Animation { start_frame: 0, frame_count: 4, animation_count: 4 }]);
        assert_eq!(metadata.bits_per_px, 16);
        assert_eq!(metadata.hotspot, (12, 20));
        assert_eq!(metadata.animation_count(), 1);
    }
}
