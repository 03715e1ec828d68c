//! # Packed register fields
//!
//! Almost every GBA video register packs several small fields into one
//! 16-bit word. [`set_bits`] rewrites one field in place and leaves the rest
//! of the register alone.
//!
//! ```text
//!  15            shift+width    shift           0
//! ┌──────────────┬──────────────┬───────────────┐
//! │  preserved   │  value&mask  │   preserved   │
//! └──────────────┴──────────────┴───────────────┘
//! ```
//!
//! `shift + width` must not exceed 16. Nothing checks this: an out-of-range
//! write silently corrupts the neighbouring field, exactly like the hardware
//! would if you packed the bits by hand.

use volatile_register::RW;

/// A mask with the low `width` bits set.
#[inline(always)]
pub const fn ones(width: u16) -> u16 {
    ((1u32 << width) - 1) as u16
}

/// Returns `word` with `value` (masked to `width` bits) placed at `shift`.
#[inline(always)]
pub const fn with_bits(word: u16, value: u16, width: u16, shift: u16) -> u16 {
    let mask = ones(width);
    let field = ((mask as u32) << shift) as u16;
    (word & !field) | ((((value & mask) as u32) << shift) as u16)
}

/// Writes `value` into the `width`-bit field at `shift` of a hardware register.
///
/// Exactly one volatile read and one volatile write. The interrupt dispatch
/// routine never touches the registers this is used on, so the pair cannot be
/// torn on this single-core machine.
#[inline(always)]
pub fn set_bits(register: &RW<u16>, value: u16, width: u16, shift: u16) {
    unsafe { register.modify(|word| with_bits(word, value, width, shift)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake;
    use proptest::prelude::*;

    #[test]
    fn ones_covers_full_width() {
        assert_eq!(ones(0), 0);
        assert_eq!(ones(1), 0b1);
        assert_eq!(ones(5), 0b1_1111);
        assert_eq!(ones(16), 0xFFFF);
    }

    #[test]
    fn writes_field_into_register() {
        let reg = fake::<RW<u16>>();
        unsafe { reg.write(0xFFFF) };
        set_bits(reg, 0b00_000, 5, 8);
        assert_eq!(reg.read(), 0b1110_0000_1111_1111);

        set_bits(reg, 0b10_101, 5, 8);
        assert_eq!(reg.read(), 0b1111_0101_1111_1111);
    }

    #[test]
    fn oversized_value_is_truncated() {
        assert_eq!(with_bits(0, 0b111, 2, 0), 0b11);
        assert_eq!(with_bits(0, 0xFFFF, 4, 12), 0xF000);
    }

    proptest! {
        #[test]
        fn only_target_field_changes(
            seed in any::<u16>(),
            value in any::<u16>(),
            (width, shift) in (1u16..=16).prop_flat_map(|w| (Just(w), 0..=(16 - w)))
        ) {
            let reg = fake::<RW<u16>>();
            unsafe { reg.write(seed) };

            set_bits(reg, value, width, shift);
            let after = reg.read();

            let field = ((ones(width) as u32) << shift) as u16;
            prop_assert_eq!(after & !field, seed & !field, "bits outside the field changed");
            prop_assert_eq!((after & field) >> shift, value & ones(width));
        }
    }
}
