//! # Background Control
//!
//! Each of the four backgrounds has a control register (BG0CNT-BG3CNT at
//! `0x0400_0008`, 2 bytes apart):
//!
//! | Bits  | Field             | Setter                                   |
//! |-------|-------------------|------------------------------------------|
//! | 0-1   | Priority          | [`Background::set_priority`]             |
//! | 2-3   | Tile bank         | [`Background::set_tile_bank`]            |
//! | 7     | Colour mode       | [`Background::set_colour_mode`]          |
//! | 8-12  | Screen base block | [`Background::set_screen_base_block`]    |
//! | 14-15 | Size              | [`Background::set_size`]                 |
//!
//! Every setter rewrites only its own field; the rest of the register is kept.
//!
//! ## Screen base block
//!
//! The screen base block is where the background's tile map starts. Only 32
//! blocks exist, so the field is range checked at two levels:
//!
//! ```ignore
//! // Checked at compile time: `ScreenBaseBlock::new::<32>()` does not build.
//! bg.set_screen_base_block(ScreenBaseBlock::new::<30>());
//!
//! // Checked at runtime.
//! bg.set_screen_base_block(ScreenBaseBlock::try_from(level.map_block)?);
//!
//! // Not checked at all: the caller has already validated the value.
//! unsafe { bg.set_screen_base_block_unchecked(block) };
//! ```

use log::trace;
use volatile_register::RW;

use crate::{bits::set_bits, error::Error, tile_map::BackgroundSize};

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackgroundNumber {
    Bg0 = 0,
    Bg1 = 1,
    Bg2 = 2,
    Bg3 = 3,
}

/// Palette depth of a background's tiles.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackgroundColourMode {
    /// 16 colours per tile, palette bank chosen per screen entry.
    Bpp4 = 0,
    /// 256 colours.
    Bpp8 = 1,
}

/// One of the four 16 KiB character blocks holding background tile pixels.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileBank {
    Bank0 = 0,
    Bank1 = 1,
    Bank2 = 2,
    Bank3 = 3,
}

/// A screen block index that is known to be in range (0-31).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScreenBaseBlock(u8);

impl ScreenBaseBlock {
    pub const COUNT: u8 = 32;

    /// Builds a block from a constant. Out-of-range values fail to compile.
    ///
    /// ```
    /// use lostgba::ScreenBaseBlock;
    ///
    /// assert_eq!(ScreenBaseBlock::new::<0>().get(), 0);
    /// assert_eq!(ScreenBaseBlock::new::<31>().get(), 31);
    /// ```
    ///
    /// ```compile_fail
    /// let _ = lostgba::ScreenBaseBlock::new::<32>();
    /// ```
    pub const fn new<const BLOCK: u8>() -> ScreenBaseBlock {
        const { assert!(BLOCK < ScreenBaseBlock::COUNT, "screen base block must be between 0 and 31") };
        ScreenBaseBlock(BLOCK)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ScreenBaseBlock {
    type Error = Error;

    fn try_from(block: u8) -> Result<Self, Self::Error> {
        if block < Self::COUNT {
            Ok(ScreenBaseBlock(block))
        } else {
            Err(Error::ScreenBlockOutOfRange(block))
        }
    }
}

/// Access to one background control register.
///
/// Borrowed from [`Display::background`](crate::display::Display::background).
pub struct Background<'a> {
    control: &'a RW<u16>,
}

impl<'a> Background<'a> {
    pub(crate) fn new(control: &'a RW<u16>) -> Self {
        Self { control }
    }

    /// Drawing priority, 0 (front) to 3 (back). Masked to 2 bits.
    #[inline]
    pub fn set_priority(&self, priority: u8) {
        set_bits(self.control, priority as u16, 2, 0);
    }

    /// Character block the background's tiles are read from.
    #[inline]
    pub fn set_tile_bank(&self, bank: TileBank) {
        set_bits(self.control, bank as u16, 2, 2);
    }

    #[inline]
    pub fn set_colour_mode(&self, mode: BackgroundColourMode) {
        set_bits(self.control, mode as u16, 1, 7);
    }

    /// Screen block the background's tile map starts at.
    #[inline]
    pub fn set_screen_base_block(&self, block: ScreenBaseBlock) {
        trace!("screen base block {}", block.get());
        set_bits(self.control, block.get() as u16, 5, 8);
    }

    /// Writes a raw screen base block without validation.
    ///
    /// # Safety
    ///
    /// `block` must be at most 31. Larger values are truncated to 5 bits and
    /// point the background at whatever map lives in that block instead.
    #[inline]
    pub unsafe fn set_screen_base_block_unchecked(&self, block: u8) {
        set_bits(self.control, block as u16, 5, 8);
    }

    /// Map layout. Bigger layouts take more screen blocks after the base block.
    #[inline]
    pub fn set_size(&self, size: BackgroundSize) {
        set_bits(self.control, size as u16, 2, 14);
    }

    /// The layout currently programmed into the register.
    #[inline]
    pub fn size(&self) -> BackgroundSize {
        BackgroundSize::from_bits(self.control.read() >> 14)
    }

    /// The screen base block currently programmed into the register.
    #[inline]
    pub fn screen_base_block(&self) -> ScreenBaseBlock {
        ScreenBaseBlock(((self.control.read() >> 8) & 0b1_1111) as u8)
    }
}
