//! # lostgba
//!
//! Hardware abstraction layer for the Game Boy Advance display and interrupt
//! hardware. Game code configures backgrounds, sprites, tiles and palettes
//! through typed setters instead of raw addresses and hand-packed bits.
//!
//! ## Frame loop
//!
//! ```ignore
//! let mut gba = unsafe { Gba::init() };
//!
//! gba.display.set_mode(GraphicsSettings {
//!     mode: GraphicsMode::Mode0,
//!     layers: DisplayLayers::BG0 | DisplayLayers::OBJ,
//! });
//!
//! let bg = gba.display.background(BackgroundNumber::Bg0);
//! bg.set_size(BackgroundSize::Size32x32);
//! bg.set_screen_base_block(ScreenBaseBlock::new::<30>());
//!
//! gba.objects.hide_all();
//! loop {
//!     gba.keypad.update();
//!     gba.objects.attribute_mut(0).set_position(x, y);
//!
//!     // waits for vblank, then copies the sprite table to OAM
//!     gba.end_frame();
//! }
//! ```
//!
//! ## Modules
//!
//! | Module          | Hardware                                          |
//! |-----------------|---------------------------------------------------|
//! | [`bits`]        | Read-modify-write of packed register fields       |
//! | [`display`]     | Display control/status registers                  |
//! | [`background`]  | Per-background control registers                  |
//! | [`tile_map`]    | Screen-block addressing and screen entries        |
//! | [`object`]      | Sprite attribute shadow table and OAM commit      |
//! | [`interrupt`]   | Interrupt dispatch and enable masks               |
//! | [`system_call`] | BIOS calls (vblank wait)                          |
//! | [`video`]       | Palette and tile uploads                          |
//! | [`input`]       | Keypad                                            |
//! | [`console`]     | One-shot bring-up owning everything above         |

#![cfg_attr(not(test), no_std)]

pub mod background;
pub mod bits;
pub mod boot;
pub mod console;
pub mod display;
pub mod error;
pub mod input;
pub mod interrupt;
pub mod object;
pub mod system_call;
pub mod tile_map;
pub mod video;

#[cfg(test)]
pub(crate) mod testing;

pub use background::{Background, BackgroundColourMode, BackgroundNumber, ScreenBaseBlock, TileBank};
pub use console::Gba;
pub use display::{Display, DisplayLayers, GraphicsMode, GraphicsSettings};
pub use error::Error;
pub use input::{Key, Keypad};
pub use interrupt::{InterruptController, InterruptKind, frame_count};
pub use object::{ObjectAttributeMemory, ObjectAttributeTable};
pub use tile_map::{BackgroundSize, ScreenEntry, TileMap};
