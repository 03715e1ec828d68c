//! # Display Registers
//!
//! The display block at `0x0400_0000` selects the graphics mode, switches
//! layers on and off, and reports where the scanout currently is.
//!
//! ## DISPCNT (`0x0400_0000`)
//!
//! | Bits  | Field                                               |
//! |-------|-----------------------------------------------------|
//! | 0-2   | Graphics mode ([`GraphicsMode`])                    |
//! | 6     | Sprite tile mapping (always 1D here)                |
//! | 8-11  | BG0-BG3 enable ([`DisplayLayers`])                  |
//! | 12    | Sprite layer enable                                 |
//!
//! DISPCNT has no other bits software cares about, so [`Display::set_mode`]
//! overwrites it in one go instead of going through [`set_bits`](crate::bits::set_bits).
//!
//! ## DISPSTAT (`0x0400_0004`)
//!
//! | Bit | Flag             | Effect                                   |
//! |-----|------------------|------------------------------------------|
//! | 0   | `IN_VBLANK`      | Set by hardware during vblank            |
//! | 1   | `IN_HBLANK`      | Set by hardware during hblank            |
//! | 2   | `VCOUNT_MATCH`   | Set by hardware on a vcount match        |
//! | 3   | `VBLANK_IRQ`     | Raise an interrupt at vblank             |
//! | 4   | `HBLANK_IRQ`     | Raise an interrupt at hblank             |
//! | 5   | `VCOUNT_IRQ`     | Raise an interrupt on a vcount match     |
//!
//! The IRQ bits are managed by [`InterruptController::enable_type`](crate::interrupt::InterruptController::enable_type).

use log::debug;
use volatile_register::{RO, RW};

use crate::background::{Background, BackgroundNumber};

const DISPLAY_REGISTERS: usize = 0x0400_0000;

/// Sprite tiles are laid out linearly instead of as a 32×32 tile sheet.
const OBJ_1D_MAPPING: u16 = 1 << 6;

pub const SCREEN_WIDTH: u16 = 240;
pub const SCREEN_HEIGHT: u16 = 160;

bitflags::bitflags! {
    /// Layer enable bits of DISPCNT.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct DisplayLayers: u16 {
        const BG0 = 1 << 8;
        const BG1 = 1 << 9;
        const BG2 = 1 << 10;
        const BG3 = 1 << 11;
        /// Sprites.
        const OBJ = 1 << 12;
    }

    /// DISPSTAT flags.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct DisplayStatus: u16 {
        const IN_VBLANK    = 1 << 0;
        const IN_HBLANK    = 1 << 1;
        const VCOUNT_MATCH = 1 << 2;
        const VBLANK_IRQ   = 1 << 3;
        const HBLANK_IRQ   = 1 << 4;
        const VCOUNT_IRQ   = 1 << 5;
    }
}

/// Which backgrounds exist, and what kind they are, depends on the mode.
///
/// | mode | BG0 | BG1 | BG2    | BG3    |
/// |------|-----|-----|--------|--------|
/// | 0    | reg | reg | reg    | reg    |
/// | 1    | reg | reg | affine | -      |
/// | 2    | -   | -   | affine | affine |
///
/// Modes 3-5 are bitmap modes drawn through BG2.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GraphicsMode {
    Mode0 = 0,
    Mode1 = 1,
    Mode2 = 2,
    /// 240×160, 16-bit colour bitmap.
    Mode3 = 3,
    /// 240×160, 8-bit paletted bitmap.
    Mode4 = 4,
    /// 160×128, 16-bit colour bitmap.
    Mode5 = 5,
}

/// Everything written to DISPCNT by [`Display::set_mode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GraphicsSettings {
    pub mode: GraphicsMode,
    pub layers: DisplayLayers,
}

impl GraphicsSettings {
    /// The DISPCNT word for these settings.
    pub const fn bits(&self) -> u16 {
        (self.mode as u16 & 0b111) | OBJ_1D_MAPPING | self.layers.bits()
    }
}

#[repr(C)]
pub struct DisplayRegisters {
    pub(crate) control: RW<u16>,
    _green_swap: RW<u16>,
    pub(crate) status: RW<u16>,
    pub(crate) vcount: RO<u16>,
    pub(crate) background_control: [RW<u16>; 4],
}

impl DisplayRegisters {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> &'static DisplayRegisters {
        unsafe { &*(DISPLAY_REGISTERS as *const DisplayRegisters) }
    }
}

/// Display mode, status and background control.
pub struct Display {
    regs: &'static DisplayRegisters,
}

impl Display {
    /// # Safety
    ///
    /// Create at most one `Display`, and only on the GBA.
    pub unsafe fn new() -> Display {
        Self::from_registers(unsafe { DisplayRegisters::new() })
    }

    pub(crate) fn from_registers(regs: &'static DisplayRegisters) -> Display {
        Display { regs }
    }

    /// Selects the graphics mode and enabled layers.
    #[inline]
    pub fn set_mode(&self, settings: GraphicsSettings) {
        debug!("display mode {:?}, layers {:?}", settings.mode, settings.layers);
        unsafe { self.regs.control.write(settings.bits()) };
    }

    #[inline]
    pub fn status(&self) -> DisplayStatus {
        DisplayStatus::from_bits_truncate(self.regs.status.read())
    }

    /// The scanline currently being drawn (0-227; 160 and up is vblank).
    #[inline]
    pub fn vcount(&self) -> u16 {
        self.regs.vcount.read() & 0xFF
    }

    /// Control register access for one background.
    #[inline]
    pub fn background(&self, number: BackgroundNumber) -> Background<'_> {
        Background::new(&self.regs.background_control[number as usize])
    }

    pub(crate) fn status_register(&self) -> &'static RW<u16> {
        &self.regs.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake, peek};

    #[test]
    fn register_block_matches_hardware_layout() {
        assert_eq!(size_of::<DisplayRegisters>(), 0x10);
        assert_eq!(core::mem::offset_of!(DisplayRegisters, status), 0x04);
        assert_eq!(core::mem::offset_of!(DisplayRegisters, background_control), 0x08);
    }

    #[test]
    fn set_mode_packs_mode_layers_and_mapping() {
        let regs = fake::<DisplayRegisters>();
        let display = Display::from_registers(regs);

        display.set_mode(GraphicsSettings {
            mode: GraphicsMode::Mode0,
            layers: DisplayLayers::BG0 | DisplayLayers::OBJ,
        });
        assert_eq!(peek(regs, 0), 0b0001_0001_0100_0000);

        display.set_mode(GraphicsSettings {
            mode: GraphicsMode::Mode1,
            layers: DisplayLayers::BG2,
        });
        assert_eq!(peek(regs, 0), 0b0000_0100_0100_0001);
    }

    #[test]
    fn status_and_vcount_read_hardware_bits() {
        let regs = fake::<DisplayRegisters>();
        let display = Display::from_registers(regs);
        unsafe {
            regs.status.write(0b1001);
            (&regs.vcount as *const RO<u16> as *mut u16).write_volatile(0xAB_A0);
        }

        assert_eq!(display.status(), DisplayStatus::IN_VBLANK | DisplayStatus::VBLANK_IRQ);
        assert_eq!(display.vcount(), 0xA0);
    }
}
