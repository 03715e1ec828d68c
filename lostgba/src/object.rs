//! # Sprites (Objects)
//!
//! Sprite descriptors live in OAM at `0x0700_0000`: 128 entries of four
//! 16-bit words. OAM is read by the display hardware while it draws, so game
//! code never writes it directly. Instead it edits an [`ObjectAttributeTable`]
//! in RAM and copies the whole table over during vblank with
//! [`ObjectAttributeTable::commit`]:
//!
//! ```ignore
//! let whale = gba.objects.attribute_mut(0);
//! whale.set_shape(ObjectShape::Square);
//! whale.set_size(ObjectSize::Size16);
//! whale.set_position(x, y);
//!
//! system_call::wait_for_vblank();
//! gba.objects.commit(gba.oam);
//! ```
//!
//! ## Attribute layout
//!
//! | Word  | Bits  | Field                                    |
//! |-------|-------|------------------------------------------|
//! | attr0 | 0-7   | Y                                        |
//! | attr0 | 8-9   | Display mode ([`ObjectDisplayMode`])     |
//! | attr0 | 10-11 | Graphics mode ([`ObjectGraphicsMode`])   |
//! | attr0 | 12    | Mosaic                                   |
//! | attr0 | 13    | Colour mode ([`ObjectColourMode`])       |
//! | attr0 | 14-15 | Shape ([`ObjectShape`])                  |
//! | attr1 | 0-8   | X                                        |
//! | attr1 | 9-13  | Affine index (affine display modes)      |
//! | attr1 | 12    | Horizontal flip (normal display mode)    |
//! | attr1 | 13    | Vertical flip (normal display mode)      |
//! | attr1 | 14-15 | Size ([`ObjectSize`])                    |
//! | attr2 | 0-9   | Tile id                                  |
//! | attr2 | 10-11 | Priority                                 |
//! | attr2 | 12-15 | Palette bank                             |
//!
//! ## Affine entries
//!
//! The fourth word of every attribute entry is not part of the sprite. The
//! hardware stores the 32 affine matrices in those filler words instead:
//! matrix `n` is spread over entries `4n..4n+3`.
//!
//! ```text
//! entry 4n   : attr0 attr1 attr2 pa
//! entry 4n+1 : attr0 attr1 attr2 pb
//! entry 4n+2 : attr0 attr1 attr2 pc
//! entry 4n+3 : attr0 attr1 attr2 pd
//! ```
//!
//! [`ObjectAttributeMut`] and [`ObjectAffineMut`] are two views over the same
//! table, so an affine write shows up in the filler words of those attribute
//! entries and vice versa.

use bit_field::BitField;
use log::trace;
use volatile_register::WO;

use crate::bits::with_bits;

const OAM_BASE: usize = 0x0700_0000;

pub const OBJECT_COUNT: usize = 128;
pub const AFFINE_COUNT: usize = 32;
const WORDS_PER_OBJECT: usize = 4;
const FILLER: usize = 3;

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectDisplayMode {
    Normal = 0,
    Affine = 1,
    Hidden = 2,
    /// Affine, with the clipping box doubled so rotated corners stay visible.
    DoubleAffine = 3,
}

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectGraphicsMode {
    Normal = 0,
    /// Semi-transparent.
    Alpha = 1,
    /// Drawn into the object window instead of the screen.
    Window = 2,
}

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectColourMode {
    Bpp4 = 0,
    Bpp8 = 1,
}

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectShape {
    Square = 0,
    Wide = 1,
    Tall = 2,
}

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectSize {
    Size8 = 0,
    Size16 = 1,
    Size32 = 2,
    Size64 = 3,
}

impl ObjectShape {
    /// Sprite size in pixels for this shape. Nothing checks that the tiles
    /// behind a sprite actually cover this area.
    pub const fn dimensions(self, size: ObjectSize) -> (u16, u16) {
        match (self, size) {
            (ObjectShape::Square, ObjectSize::Size8) => (8, 8),
            (ObjectShape::Square, ObjectSize::Size16) => (16, 16),
            (ObjectShape::Square, ObjectSize::Size32) => (32, 32),
            (ObjectShape::Square, ObjectSize::Size64) => (64, 64),
            (ObjectShape::Wide, ObjectSize::Size8) => (16, 8),
            (ObjectShape::Wide, ObjectSize::Size16) => (32, 8),
            (ObjectShape::Wide, ObjectSize::Size32) => (32, 16),
            (ObjectShape::Wide, ObjectSize::Size64) => (64, 32),
            (ObjectShape::Tall, ObjectSize::Size8) => (8, 16),
            (ObjectShape::Tall, ObjectSize::Size16) => (8, 32),
            (ObjectShape::Tall, ObjectSize::Size32) => (16, 32),
            (ObjectShape::Tall, ObjectSize::Size64) => (32, 64),
        }
    }
}

/// A 2×2 transform in 8.8 fixed point: `256` is `1.0`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ObjectAffine {
    pub pa: i16,
    pub pb: i16,
    pub pc: i16,
    pub pd: i16,
}

impl ObjectAffine {
    pub const IDENTITY: ObjectAffine = ObjectAffine { pa: 256, pb: 0, pc: 0, pd: 256 };
}

/// Hardware OAM. Write-only as far as this crate is concerned.
#[repr(C)]
pub struct ObjectAttributeMemory {
    words: [WO<u16>; OBJECT_COUNT * WORDS_PER_OBJECT],
}

impl ObjectAttributeMemory {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> &'static ObjectAttributeMemory {
        unsafe { &*(OAM_BASE as *const ObjectAttributeMemory) }
    }
}

/// RAM copy of OAM.
///
/// Starts zeroed, which is a visible 8×8 sprite at (0, 0) for every entry:
/// hide what you don't use, e.g. with [`hide_all`](Self::hide_all).
pub struct ObjectAttributeTable {
    entries: [[u16; WORDS_PER_OBJECT]; OBJECT_COUNT],
}

impl Default for ObjectAttributeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectAttributeTable {
    pub const fn new() -> Self {
        Self {
            entries: [[0; WORDS_PER_OBJECT]; OBJECT_COUNT],
        }
    }

    /// Read view of sprite `index`. Panics if `index >= 128`.
    #[inline]
    pub fn attribute(&self, index: usize) -> ObjectAttribute<'_> {
        ObjectAttribute { words: &self.entries[index] }
    }

    /// Write view of sprite `index`. Panics if `index >= 128`.
    #[inline]
    pub fn attribute_mut(&mut self, index: usize) -> ObjectAttributeMut<'_> {
        ObjectAttributeMut { words: &mut self.entries[index] }
    }

    /// Affine matrix `index`. Panics if `index >= 32`.
    pub fn affine(&self, index: usize) -> ObjectAffine {
        assert!(index < AFFINE_COUNT);
        let filler = |k: usize| self.entries[index * 4 + k][FILLER] as i16;
        ObjectAffine {
            pa: filler(0),
            pb: filler(1),
            pc: filler(2),
            pd: filler(3),
        }
    }

    /// Write view of affine matrix `index`. Panics if `index >= 32`.
    pub fn affine_mut(&mut self, index: usize) -> ObjectAffineMut<'_> {
        assert!(index < AFFINE_COUNT);
        ObjectAffineMut { table: self, index }
    }

    /// Sets every sprite's display mode to [`ObjectDisplayMode::Hidden`].
    pub fn hide_all(&mut self) {
        for index in 0..OBJECT_COUNT {
            self.attribute_mut(index).set_display_mode(ObjectDisplayMode::Hidden);
        }
    }

    /// Copies the whole table, affine matrices included, to OAM.
    ///
    /// Only call this while the display is not drawing sprites: during vblank
    /// or with the display forced blank. Anywhere else the hardware reads a
    /// half-written table and the frame tears; there is no error for this.
    pub fn commit(&self, oam: &ObjectAttributeMemory) {
        trace!("committing {} object attributes", OBJECT_COUNT);
        let words = self.entries.iter().flatten();
        for (cell, &word) in oam.words.iter().zip(words) {
            unsafe { cell.write(word) };
        }
    }
}

/// Read-only view of one sprite.
#[derive(Copy, Clone)]
pub struct ObjectAttribute<'a> {
    words: &'a [u16; WORDS_PER_OBJECT],
}

impl ObjectAttribute<'_> {
    pub fn attr0(&self) -> u16 {
        self.words[0]
    }

    pub fn attr1(&self) -> u16 {
        self.words[1]
    }

    pub fn attr2(&self) -> u16 {
        self.words[2]
    }

    pub fn x(&self) -> u16 {
        self.words[1].get_bits(0..9)
    }

    pub fn y(&self) -> u16 {
        self.words[0].get_bits(0..8)
    }

    pub fn is_hidden(&self) -> bool {
        self.words[0].get_bits(8..10) == ObjectDisplayMode::Hidden as u16
    }

    pub fn tile_id(&self) -> u16 {
        self.words[2].get_bits(0..10)
    }
}

/// Setters for one sprite's attributes.
pub struct ObjectAttributeMut<'a> {
    words: &'a mut [u16; WORDS_PER_OBJECT],
}

impl ObjectAttributeMut<'_> {
    #[inline(always)]
    fn set(&mut self, word: usize, value: u16, width: u16, shift: u16) {
        self.words[word] = with_bits(self.words[word], value, width, shift);
    }

    /// Moves the sprite's top-left corner to `(x, y)`.
    ///
    /// The hardware coordinates are 9-bit X and 8-bit Y and wrap around, so
    /// negative values are how a sprite is placed partly off the left or top
    /// edge: `y = -5` is stored as 251 and drawn 5 pixels above the screen.
    #[inline]
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.set(0, y as u16, 8, 0);
        self.set(1, x as u16, 9, 0);
    }

    #[inline]
    pub fn set_display_mode(&mut self, mode: ObjectDisplayMode) {
        self.set(0, mode as u16, 2, 8);
    }

    #[inline]
    pub fn set_graphics_mode(&mut self, mode: ObjectGraphicsMode) {
        self.set(0, mode as u16, 2, 10);
    }

    #[inline]
    pub fn set_mosaic(&mut self, enabled: bool) {
        self.set(0, enabled as u16, 1, 12);
    }

    #[inline]
    pub fn set_colour_mode(&mut self, mode: ObjectColourMode) {
        self.set(0, mode as u16, 1, 13);
    }

    #[inline]
    pub fn set_shape(&mut self, shape: ObjectShape) {
        self.set(0, shape as u16, 2, 14);
    }

    /// Affine matrix used in the affine display modes. Masked to 5 bits.
    ///
    /// Shares bits with the flip flags, which only apply in normal mode.
    #[inline]
    pub fn set_affine_index(&mut self, index: u8) {
        self.set(1, index as u16, 5, 9);
    }

    #[inline]
    pub fn set_hflip(&mut self, hflip: bool) {
        self.set(1, hflip as u16, 1, 12);
    }

    #[inline]
    pub fn set_vflip(&mut self, vflip: bool) {
        self.set(1, vflip as u16, 1, 13);
    }

    #[inline]
    pub fn set_size(&mut self, size: ObjectSize) {
        self.set(1, size as u16, 2, 14);
    }

    /// First tile of the sprite in sprite tile memory. Masked to 10 bits.
    #[inline]
    pub fn set_tile(&mut self, tile_id: u16) {
        self.set(2, tile_id, 10, 0);
    }

    /// 0 (front) to 3 (back). Masked to 2 bits.
    #[inline]
    pub fn set_priority(&mut self, priority: u8) {
        self.set(2, priority as u16, 2, 10);
    }

    /// 16-colour palette bank for 4bpp sprites. Masked to 4 bits.
    #[inline]
    pub fn set_palette_bank(&mut self, bank: u8) {
        self.set(2, bank as u16, 4, 12);
    }
}

/// Setters for one affine matrix, stored in the filler words of four sprites.
pub struct ObjectAffineMut<'a> {
    table: &'a mut ObjectAttributeTable,
    index: usize,
}

impl ObjectAffineMut<'_> {
    #[inline(always)]
    fn filler(&mut self, k: usize) -> &mut u16 {
        &mut self.table.entries[self.index * 4 + k][FILLER]
    }

    pub fn set_pa(&mut self, pa: i16) {
        *self.filler(0) = pa as u16;
    }

    pub fn set_pb(&mut self, pb: i16) {
        *self.filler(1) = pb as u16;
    }

    pub fn set_pc(&mut self, pc: i16) {
        *self.filler(2) = pc as u16;
    }

    pub fn set_pd(&mut self, pd: i16) {
        *self.filler(3) = pd as u16;
    }

    pub fn set(&mut self, affine: ObjectAffine) {
        self.set_pa(affine.pa);
        self.set_pb(affine.pb);
        self.set_pc(affine.pc);
        self.set_pd(affine.pd);
    }
}
