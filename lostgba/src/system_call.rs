//! # BIOS Calls
//!
//! The BIOS exposes its routines through software interrupts. The call number
//! goes in the `swi` immediate, which sits in a different place for Thumb and
//! ARM code.
//!
//! Off the console (host builds and tests) there is no BIOS, and these calls
//! return immediately.

/// `VBlankIntrWait`: halt until the dispatch routine has acknowledged a vblank.
///
/// Requires the interrupt dispatch routine to be installed and vblank
/// interrupts enabled, otherwise the CPU never wakes up. Prefer
/// [`InterruptController::wait_for_vblank`](crate::interrupt::InterruptController::wait_for_vblank),
/// which can only be reached after installation.
#[inline(always)]
pub fn wait_for_vblank() {
    #[cfg(all(target_arch = "arm", target_feature = "thumb-mode"))]
    unsafe {
        core::arch::asm!(
            "swi #0x05",
            out("r0") _,
            out("r1") _,
            out("r2") _,
            out("r3") _,
            options(nostack, preserves_flags),
        );
    }

    #[cfg(all(target_arch = "arm", not(target_feature = "thumb-mode")))]
    unsafe {
        core::arch::asm!(
            "swi #0x050000",
            out("r0") _,
            out("r1") _,
            out("r2") _,
            out("r3") _,
            options(nostack, preserves_flags),
        );
    }

    #[cfg(not(target_arch = "arm"))]
    log::trace!("no BIOS on this target, vblank wait skipped");
}
