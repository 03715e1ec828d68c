//! Bare-metal runtime pieces.
//!
//! The cartridge header, `crt0` and linker script come from the game's build;
//! this crate only supplies the panic handler, behind the `panic-handler`
//! feature so a game can bring its own.

#[cfg(all(feature = "panic-handler", target_arch = "arm", target_os = "none"))]
use core::panic::PanicInfo;

#[cfg(all(feature = "panic-handler", target_arch = "arm", target_os = "none"))]
#[panic_handler]
fn panic(_panic: &PanicInfo<'_>) -> ! {
    // interrupts off, so the BIOS can't pull us out of the halt loop
    unsafe { core::ptr::write_volatile(0x0400_0208 as *mut u16, 0) };
    loop {}
}
