//! # Tile Maps
//!
//! A background's tile map lives in **screen blocks**: 2 KiB units of VRAM
//! holding 32×32 [`ScreenEntry`] words each. VRAM has room for 32 of them,
//! starting at `0x0600_0000` (they share the space with tile pixel data, so
//! keep maps and tiles apart).
//!
//! ## Multi-block layouts
//!
//! Backgrounds bigger than 32×32 tiles use consecutive blocks after their
//! screen base block. The layout is not a plain row-major 64-wide map:
//!
//! ```text
//!  64×32              32×64          64×64
//! ┌──────┬──────┐    ┌──────┐       ┌──────┬──────┐
//! │ base │ +1   │    │ base │       │ base │ +1   │
//! └──────┴──────┘    ├──────┤       ├──────┼──────┤
//!                    │ +1   │       │ +2   │ +3   │
//!                    └──────┘       └──────┴──────┘
//! ```
//!
//! Within a block, entry `(x, y)` is at `(x % 32) + 32 * (y % 32)`.
//!
//! ## Screen entries
//!
//! | Bits  | Field           |
//! |-------|-----------------|
//! | 0-9   | Tile id         |
//! | 10    | Horizontal flip |
//! | 11    | Vertical flip   |
//! | 12-15 | Palette bank    |

use bit_field::BitField;
use volatile_register::RW;

use crate::{background::ScreenBaseBlock, bits::with_bits, error::Error};

const TILE_MAP_BASE: usize = 0x0600_0000;

/// Entries per screen block.
pub const SCREEN_BLOCK_ENTRIES: usize = 1024;
pub const SCREEN_BLOCK_COUNT: usize = 32;

/// Tiles along one side of a screen block.
const BLOCK_TILES: u16 = 32;

/// Background map layouts, in tiles.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackgroundSize {
    /// 256×256 pixels, one block.
    Size32x32 = 0,
    /// 512×256 pixels, two blocks side by side.
    Size64x32 = 1,
    /// 256×512 pixels, two blocks stacked.
    Size32x64 = 2,
    /// 512×512 pixels, four blocks in a 2×2 square.
    Size64x64 = 3,
}

impl BackgroundSize {
    /// Decodes the size field of a background control register.
    ///
    /// Only the low two bits are looked at, so every input maps to a layout.
    pub fn from_bits(bits: u16) -> BackgroundSize {
        match bits & 0b11 {
            0 => BackgroundSize::Size32x32,
            1 => BackgroundSize::Size64x32,
            2 => BackgroundSize::Size32x64,
            3 => BackgroundSize::Size64x64,
            _ => unreachable!("background size is a 2-bit field"),
        }
    }

    /// Number of screen blocks the layout occupies.
    pub const fn blocks(self) -> u16 {
        match self {
            BackgroundSize::Size32x32 => 1,
            BackgroundSize::Size64x32 | BackgroundSize::Size32x64 => 2,
            BackgroundSize::Size64x64 => 4,
        }
    }

    /// Width and height in tiles.
    pub const fn tiles(self) -> (u16, u16) {
        match self {
            BackgroundSize::Size32x32 => (32, 32),
            BackgroundSize::Size64x32 => (64, 32),
            BackgroundSize::Size32x64 => (32, 64),
            BackgroundSize::Size64x64 => (64, 64),
        }
    }

    /// Which of the layout's blocks holds tile `(x, y)`, counted from the
    /// screen base block.
    ///
    /// Coordinates are expected inside [`tiles`](Self::tiles); outside it the
    /// result points at a neighbouring map.
    pub const fn block_offset(self, x: u16, y: u16) -> u16 {
        match self {
            BackgroundSize::Size32x32 => 0,
            BackgroundSize::Size64x32 => (x >= BLOCK_TILES) as u16,
            BackgroundSize::Size32x64 => (y >= BLOCK_TILES) as u16,
            BackgroundSize::Size64x64 => x / BLOCK_TILES + 2 * (y / BLOCK_TILES),
        }
    }
}

/// Position of tile `(x, y)` inside its screen block, 0-1023.
#[inline]
pub const fn in_block_offset(x: u16, y: u16) -> u16 {
    x % BLOCK_TILES + BLOCK_TILES * (y % BLOCK_TILES)
}

/// Index of the entry for tile `(x, y)`, in 16-bit words from the start of
/// tile map memory.
#[inline]
pub const fn entry_index(base: ScreenBaseBlock, size: BackgroundSize, x: u16, y: u16) -> usize {
    let block = base.get() as usize + size.block_offset(x, y) as usize;
    SCREEN_BLOCK_ENTRIES * block + in_block_offset(x, y) as usize
}

/// One tile map word.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ScreenEntry(u16);

impl ScreenEntry {
    /// Packs a screen entry.
    ///
    /// `tile_id` is cut to 10 bits and `palette_bank` to 4; ids past 1023
    /// silently wrap around to the start of the tile bank.
    pub const fn new(tile_id: u16, hflip: bool, vflip: bool, palette_bank: u8) -> ScreenEntry {
        let mut bits = with_bits(0, tile_id, 10, 0);
        bits = with_bits(bits, hflip as u16, 1, 10);
        bits = with_bits(bits, vflip as u16, 1, 11);
        bits = with_bits(bits, palette_bank as u16, 4, 12);
        ScreenEntry(bits)
    }

    pub const fn from_bits(bits: u16) -> ScreenEntry {
        ScreenEntry(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn tile_id(self) -> u16 {
        self.0.get_bits(0..10)
    }

    pub fn hflip(self) -> bool {
        self.0.get_bit(10)
    }

    pub fn vflip(self) -> bool {
        self.0.get_bit(11)
    }

    pub fn palette_bank(self) -> u8 {
        self.0.get_bits(12..16) as u8
    }
}

#[repr(C)]
pub struct TileMapMemory {
    entries: [RW<u16>; SCREEN_BLOCK_ENTRIES * SCREEN_BLOCK_COUNT],
}

impl TileMapMemory {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> &'static TileMapMemory {
        unsafe { &*(TILE_MAP_BASE as *const TileMapMemory) }
    }
}

/// Writer for screen entries in VRAM.
pub struct TileMap {
    memory: &'static TileMapMemory,
}

impl TileMap {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> TileMap {
        Self::from_memory(unsafe { TileMapMemory::new() })
    }

    pub(crate) fn from_memory(memory: &'static TileMapMemory) -> TileMap {
        TileMap { memory }
    }

    /// Writes the entry for tile `(x, y)` of a background whose map starts at
    /// `base` and has layout `size`.
    ///
    /// Fails only if the layout runs past the last screen block, e.g. a 64×64
    /// map based at block 30.
    pub fn set_tile(
        &self,
        base: ScreenBaseBlock,
        size: BackgroundSize,
        x: u16,
        y: u16,
        entry: ScreenEntry,
    ) -> Result<(), Error> {
        let index = entry_index(base, size, x, y);
        let cell = self.memory.entries.get(index).ok_or(Error::TileMapOverflow {
            block: index / SCREEN_BLOCK_ENTRIES,
        })?;
        unsafe { cell.write(entry.bits()) };
        Ok(())
    }

    /// Fills every entry of a layout with the same word.
    pub fn fill(&self, base: ScreenBaseBlock, size: BackgroundSize, entry: ScreenEntry) -> Result<(), Error> {
        let (width, height) = size.tiles();
        for y in 0..height {
            for x in 0..width {
                self.set_tile(base, size, x, y, entry)?;
            }
        }
        Ok(())
    }
}
