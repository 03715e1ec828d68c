//! # Palettes and Tiles
//!
//! Bulk uploads into palette RAM and the character (tile pixel) blocks of
//! VRAM. Like OAM, these are read by the display while it draws; upload during
//! vblank or with the layers using them switched off.
//!
//! ## Memory layout
//!
//! ```text
//! 0x0500_0000  background palette   256 colours
//! 0x0500_0200  sprite palette       256 colours
//! 0x0600_0000  background tiles     char blocks 0-3, 16 KiB each
//! 0x0601_0000  sprite tiles         char blocks 4-5, 16 KiB each
//! ```
//!
//! Background screen blocks ([`tile_map`](crate::tile_map)) share the first
//! 64 KiB with background tiles.
//!
//! Colours are 15-bit BGR: `0bBBBBB_GGGGG_RRRRR`, see [`rgb15`].

use log::debug;
use volatile_register::RW;

use crate::{background::TileBank, error::Error};

const PALETTE_BASE: usize = 0x0500_0000;
const VRAM_BASE: usize = 0x0600_0000;

pub const PALETTE_LENGTH: usize = 256;

const CHAR_BLOCK_WORDS: usize = 0x4000 / 4;
const BACKGROUND_TILE_WORDS: usize = 4 * CHAR_BLOCK_WORDS;
const SPRITE_TILE_WORDS: usize = 2 * CHAR_BLOCK_WORDS;

/// Packs 5-bit red, green and blue into a palette colour.
pub const fn rgb15(r: u8, g: u8, b: u8) -> u16 {
    (r as u16 & 0x1F) | ((g as u16 & 0x1F) << 5) | ((b as u16 & 0x1F) << 10)
}

/// Sprite character block, counted from `0x0601_0000`.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpriteTileBank {
    Bank0 = 0,
    Bank1 = 1,
}

#[repr(C)]
pub struct PaletteMemory {
    background: [RW<u16>; PALETTE_LENGTH],
    sprite: [RW<u16>; PALETTE_LENGTH],
}

impl PaletteMemory {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> &'static PaletteMemory {
        unsafe { &*(PALETTE_BASE as *const PaletteMemory) }
    }
}

#[repr(C)]
pub struct CharacterMemory {
    background: [RW<u32>; BACKGROUND_TILE_WORDS],
    sprite: [RW<u32>; SPRITE_TILE_WORDS],
}

impl CharacterMemory {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> &'static CharacterMemory {
        unsafe { &*(VRAM_BASE as *const CharacterMemory) }
    }
}

/// Palette and tile uploads.
pub struct VideoMemory {
    palettes: &'static PaletteMemory,
    tiles: &'static CharacterMemory,
}

impl VideoMemory {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> VideoMemory {
        unsafe { Self::from_memory(PaletteMemory::new(), CharacterMemory::new()) }
    }

    pub(crate) fn from_memory(palettes: &'static PaletteMemory, tiles: &'static CharacterMemory) -> VideoMemory {
        VideoMemory { palettes, tiles }
    }

    pub fn upload_background_palette(&self, colours: &[u16; PALETTE_LENGTH]) {
        debug!("uploading background palette");
        copy(&self.palettes.background, colours);
    }

    pub fn upload_sprite_palette(&self, colours: &[u16; PALETTE_LENGTH]) {
        debug!("uploading sprite palette");
        copy(&self.palettes.sprite, colours);
    }

    /// Copies tile pixel data to the start of a background tile bank.
    ///
    /// The data may run on into the following banks, but not past the end of
    /// background VRAM.
    pub fn upload_background_tiles(&self, bank: TileBank, data: &[u32]) -> Result<(), Error> {
        debug!("uploading {} words of background tiles to {:?}", data.len(), bank);
        let start = bank as usize * CHAR_BLOCK_WORDS;
        let target = self.tiles.background[start..]
            .get(..data.len())
            .ok_or(Error::TileDataOverflow { bank: bank as u8, len: data.len() })?;
        copy(target, data);
        Ok(())
    }

    /// Copies tile pixel data to the start of a sprite tile bank.
    ///
    /// Bank 1 is the only one usable in the bitmap modes (3-5), where bank 0
    /// holds the frame buffer.
    pub fn upload_sprite_tiles(&self, bank: SpriteTileBank, data: &[u32]) -> Result<(), Error> {
        debug!("uploading {} words of sprite tiles to {:?}", data.len(), bank);
        let start = bank as usize * CHAR_BLOCK_WORDS;
        let target = self.tiles.sprite[start..]
            .get(..data.len())
            .ok_or(Error::TileDataOverflow { bank: bank as u8, len: data.len() })?;
        copy(target, data);
        Ok(())
    }
}

#[inline(always)]
fn copy<T: Copy>(target: &[RW<T>], data: &[T]) {
    for (cell, &value) in target.iter().zip(data) {
        unsafe { cell.write(value) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake;

    fn video() -> (&'static PaletteMemory, &'static CharacterMemory, VideoMemory) {
        let palettes = fake::<PaletteMemory>();
        let tiles = fake::<CharacterMemory>();
        (palettes, tiles, VideoMemory::from_memory(palettes, tiles))
    }

    #[test]
    fn layout_matches_hardware() {
        assert_eq!(core::mem::offset_of!(PaletteMemory, sprite), 0x200);
        assert_eq!(core::mem::offset_of!(CharacterMemory, sprite), 0x1_0000);
        assert_eq!(size_of::<CharacterMemory>(), 0x1_8000);
    }

    #[test]
    fn rgb15_packs_channels() {
        assert_eq!(rgb15(31, 0, 0), 0x001F);
        assert_eq!(rgb15(0, 31, 0), 0x03E0);
        assert_eq!(rgb15(0, 0, 31), 0x7C00);
        assert_eq!(rgb15(0xFF, 0, 0), 0x001F);
    }

    #[test]
    fn palettes_go_to_their_halves() {
        let (palettes, _, video) = video();
        let mut colours = [0u16; PALETTE_LENGTH];
        colours[1] = rgb15(31, 31, 31);
        colours[255] = rgb15(1, 2, 3);

        video.upload_sprite_palette(&colours);

        assert_eq!(palettes.sprite[1].read(), 0x7FFF);
        assert_eq!(palettes.sprite[255].read(), rgb15(1, 2, 3));
        assert!(palettes.background.iter().all(|c| c.read() == 0));

        video.upload_background_palette(&colours);
        assert_eq!(palettes.background[1].read(), 0x7FFF);
    }

    #[test]
    fn background_tiles_land_at_bank_stride() {
        let (_, tiles, video) = video();

        video.upload_background_tiles(TileBank::Bank2, &[0xDEAD_BEEF, 0x1234_5678]).unwrap();

        assert_eq!(tiles.background[2 * CHAR_BLOCK_WORDS].read(), 0xDEAD_BEEF);
        assert_eq!(tiles.background[2 * CHAR_BLOCK_WORDS + 1].read(), 0x1234_5678);
        assert_eq!(tiles.background[2 * CHAR_BLOCK_WORDS - 1].read(), 0);
    }

    #[test]
    fn background_tiles_may_span_banks_but_not_overflow() {
        let (_, tiles, video) = video();
        let data = vec![7u32; CHAR_BLOCK_WORDS + 1];

        video.upload_background_tiles(TileBank::Bank2, &data).unwrap();
        assert_eq!(tiles.background[3 * CHAR_BLOCK_WORDS].read(), 7);

        assert_eq!(
            video.upload_background_tiles(TileBank::Bank3, &data),
            Err(Error::TileDataOverflow { bank: 3, len: CHAR_BLOCK_WORDS + 1 })
        );
        assert_eq!(tiles.sprite[0].read(), 0);
    }

    #[test]
    fn sprite_tiles_use_sprite_blocks() {
        let (_, tiles, video) = video();

        video.upload_sprite_tiles(SpriteTileBank::Bank1, &[42]).unwrap();
        assert_eq!(tiles.sprite[CHAR_BLOCK_WORDS].read(), 42);
        assert_eq!(tiles.sprite[0].read(), 0);

        let data = vec![1u32; SPRITE_TILE_WORDS];
        assert!(video.upload_sprite_tiles(SpriteTileBank::Bank0, &data).is_ok());
        assert!(video.upload_sprite_tiles(SpriteTileBank::Bank1, &data).is_err());
    }
}
