//! # Keypad
//!
//! KEYINPUT (`0x0400_0130`) holds one bit per key, **0 while pressed**.
//! [`Keypad`] inverts it once per frame so everything else can think in
//! "1 = pressed", and keeps the previous frame around for edge detection.
//!
//! ```ignore
//! gba.keypad.update();
//! if gba.keypad.just_pressed(Key::A) {
//!     whale.blow();
//! }
//! ```

use bit_field::BitField;
use volatile_register::RO;

const KEY_INPUT: usize = 0x0400_0130;

/// Only the low ten bits of KEYINPUT are keys.
const KEY_MASK: u16 = 0x03FF;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
    R,
    L,
}

impl Key {
    const fn idx(&self) -> usize {
        match self {
            Key::A => 0,
            Key::B => 1,
            Key::Select => 2,
            Key::Start => 3,
            Key::Right => 4,
            Key::Left => 5,
            Key::Up => 6,
            Key::Down => 7,
            Key::R => 8,
            Key::L => 9,
        }
    }
}

/// Latched key state.
pub struct Keypad {
    register: &'static RO<u16>,
    pub keys: u16,
    pub keys_last: u16,
}

impl Keypad {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> Keypad {
        Self::from_register(unsafe { &*(KEY_INPUT as *const RO<u16>) })
    }

    pub(crate) fn from_register(register: &'static RO<u16>) -> Keypad {
        Keypad {
            register,
            keys: 0,
            keys_last: 0,
        }
    }

    /// Reads the keypad. Call once per frame so every query in a frame agrees.
    #[inline]
    pub fn update(&mut self) {
        self.keys_last = self.keys;
        self.keys = !self.register.read() & KEY_MASK;
    }

    #[inline]
    pub fn is_down(&self, key: Key) -> bool {
        self.keys.get_bit(key.idx())
    }

    #[inline]
    pub fn was_down(&self, key: Key) -> bool {
        self.keys_last.get_bit(key.idx())
    }

    /// Returns true only on the frame the key was first pressed (edge-trigger).
    #[inline]
    pub fn just_pressed(&self, key: Key) -> bool {
        self.is_down(key) && !self.was_down(key)
    }

    /// Returns true only on the frame the key was released (edge-trigger).
    #[inline]
    pub fn just_released(&self, key: Key) -> bool {
        !self.is_down(key) && self.was_down(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake;

    fn press(register: &RO<u16>, keys: &[Key]) {
        let mut raw = 0xFFFFu16;
        for key in keys {
            raw.set_bit(key.idx(), false);
        }
        unsafe { (register as *const RO<u16> as *mut u16).write_volatile(raw) };
    }

    #[test]
    fn active_low_bits_become_pressed_keys() {
        let register = fake::<RO<u16>>();
        let mut keypad = Keypad::from_register(register);

        press(register, &[Key::A, Key::L]);
        keypad.update();

        assert!(keypad.is_down(Key::A));
        assert!(keypad.is_down(Key::L));
        assert!(!keypad.is_down(Key::B));
        assert_eq!(keypad.keys, 0b10_0000_0001);
    }

    #[test]
    fn edges_are_reported_for_one_update() {
        let register = fake::<RO<u16>>();
        let mut keypad = Keypad::from_register(register);

        press(register, &[]);
        keypad.update();
        press(register, &[Key::Up]);
        keypad.update();
        assert!(keypad.just_pressed(Key::Up));

        keypad.update();
        assert!(keypad.is_down(Key::Up));
        assert!(!keypad.just_pressed(Key::Up));

        press(register, &[]);
        keypad.update();
        assert!(keypad.just_released(Key::Up));
        keypad.update();
        assert!(!keypad.just_released(Key::Up));
    }
}
