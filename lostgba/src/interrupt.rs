//! # Interrupts
//!
//! The BIOS takes every hardware interrupt first and then jumps to whatever
//! address is stored at `0x0300_7FFC`. [`InterruptController::init`] puts the
//! crate's dispatch routine there; until that has happened, enabling an
//! interrupt or waiting for one hangs the console with no way to tell why.
//! The controller therefore starts out [`Uninitialized`] and only grows the
//! enable/wait methods once `init` has been called:
//!
//! ```ignore
//! let irq = unsafe { InterruptController::new(&display) };
//! let mut irq = irq.init();
//! irq.enable_type(InterruptKind::VBlank);
//! irq.enable_globally();
//!
//! loop {
//!     irq.wait_for_vblank();
//!     // safe to touch OAM and VRAM
//! }
//! ```
//!
//! Skipping `init` is a build error:
//!
//! ```compile_fail
//! use lostgba::display::Display;
//! use lostgba::interrupt::{InterruptController, InterruptKind, Uninitialized};
//!
//! let display = unsafe { Display::new() };
//! let mut irq = unsafe { InterruptController::<Uninitialized>::new(&display) };
//! irq.enable_type(InterruptKind::VBlank);
//! ```
//!
//! ## Registers
//!
//! | Register | Address       | Description                                 |
//! |----------|---------------|---------------------------------------------|
//! | IE       | `0x0400_0200` | Which interrupts may fire                   |
//! | IF       | `0x0400_0202` | Pending interrupts, write 1 to acknowledge  |
//! | IME      | `0x0400_0208` | Master enable                               |
//! | IFBIOS   | `0x0300_7FF8` | Acknowledgments seen by BIOS wait calls     |
//! | ISR      | `0x0300_7FFC` | Address of the dispatch routine             |
//!
//! ## Dispatch
//!
//! The dispatch routine services `IE & IF`, acknowledges it in IF and ORs it
//! into IFBIOS, which is what `VBlankIntrWait` polls. Only vblank does any
//! work of its own (it counts frames, see [`frame_count`]); the other kinds
//! are acknowledged and otherwise left alone.

use core::{
    marker::PhantomData,
    sync::atomic::{AtomicU32, Ordering},
};

use log::{debug, warn};
use volatile_register::RW;

use crate::{bits::set_bits, display::Display, system_call};

const INTERRUPT_REGISTERS: usize = 0x0400_0200;
const BIOS_INTERRUPT_AREA: usize = 0x0300_7FF8;

/// DISPSTAT bits asking the display to raise its interrupts.
const DISPSTAT_VBLANK_IRQ: u16 = 3;
const DISPSTAT_HBLANK_IRQ: u16 = 4;
const DISPSTAT_VCOUNT_IRQ: u16 = 5;

/// Vblanks serviced by the dispatch routine.
static VBLANK_COUNT: AtomicU32 = AtomicU32::new(0);

bitflags::bitflags! {
    /// IE/IF bits. Bit 7 (serial) is left out: the link port is not supported.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct InterruptFlags: u16 {
        const VBLANK    = 1 << 0;
        const HBLANK    = 1 << 1;
        const VCOUNT    = 1 << 2;
        const TIMER0    = 1 << 3;
        const TIMER1    = 1 << 4;
        const TIMER2    = 1 << 5;
        const TIMER3    = 1 << 6;
        const DMA0      = 1 << 8;
        const DMA1      = 1 << 9;
        const DMA2      = 1 << 10;
        const DMA3      = 1 << 11;
        const KEYPAD    = 1 << 12;
        const CARTRIDGE = 1 << 13;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InterruptKind {
    /// Enabling this also sets DISPSTAT's vblank IRQ bit.
    VBlank,
    /// Enabling this also sets DISPSTAT's hblank IRQ bit.
    HBlank,
    /// Enabling this also sets DISPSTAT's vcount IRQ bit. The line to match
    /// is not configured here.
    VCount,
    Timer0,
    Timer1,
    Timer2,
    Timer3,
    Dma0,
    Dma1,
    Dma2,
    Dma3,
    Keypad,
    Cartridge,
}

impl InterruptKind {
    pub const ALL: [InterruptKind; 13] = [
        InterruptKind::VBlank,
        InterruptKind::HBlank,
        InterruptKind::VCount,
        InterruptKind::Timer0,
        InterruptKind::Timer1,
        InterruptKind::Timer2,
        InterruptKind::Timer3,
        InterruptKind::Dma0,
        InterruptKind::Dma1,
        InterruptKind::Dma2,
        InterruptKind::Dma3,
        InterruptKind::Keypad,
        InterruptKind::Cartridge,
    ];

    #[inline(always)]
    pub const fn flag(self) -> InterruptFlags {
        match self {
            InterruptKind::VBlank => InterruptFlags::VBLANK,
            InterruptKind::HBlank => InterruptFlags::HBLANK,
            InterruptKind::VCount => InterruptFlags::VCOUNT,
            InterruptKind::Timer0 => InterruptFlags::TIMER0,
            InterruptKind::Timer1 => InterruptFlags::TIMER1,
            InterruptKind::Timer2 => InterruptFlags::TIMER2,
            InterruptKind::Timer3 => InterruptFlags::TIMER3,
            InterruptKind::Dma0 => InterruptFlags::DMA0,
            InterruptKind::Dma1 => InterruptFlags::DMA1,
            InterruptKind::Dma2 => InterruptFlags::DMA2,
            InterruptKind::Dma3 => InterruptFlags::DMA3,
            InterruptKind::Keypad => InterruptFlags::KEYPAD,
            InterruptKind::Cartridge => InterruptFlags::CARTRIDGE,
        }
    }
}

#[repr(C)]
pub struct InterruptRegisters {
    enabled: RW<u16>,
    requested: RW<u16>,
    _wait_control: [RW<u16>; 2],
    master_enable: RW<u16>,
}

impl InterruptRegisters {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> &'static InterruptRegisters {
        unsafe { &*(INTERRUPT_REGISTERS as *const InterruptRegisters) }
    }
}

/// The two words at the top of IWRAM that the BIOS reserves for interrupts.
#[repr(C)]
pub struct BiosInterruptArea {
    acknowledged: RW<u16>,
    _reserved: RW<u16>,
    /// Addresses are 32 bits on the GBA; a fixed-width cell keeps this slot
    /// at `0x0300_7FFC` whatever the target.
    handler: RW<u32>,
}

impl BiosInterruptArea {
    /// # Safety
    ///
    /// Only meaningful on the GBA itself.
    pub unsafe fn new() -> &'static BiosInterruptArea {
        unsafe { &*(BIOS_INTERRUPT_AREA as *const BiosInterruptArea) }
    }
}

/// Dispatch routine not installed yet.
pub struct Uninitialized;
/// Dispatch routine installed.
pub struct Initialized;

pub struct InterruptController<State = Initialized> {
    regs: &'static InterruptRegisters,
    bios: &'static BiosInterruptArea,
    display_status: &'static RW<u16>,
    _state: PhantomData<State>,
}

impl InterruptController<Uninitialized> {
    /// # Safety
    ///
    /// Create at most one controller, and only on the GBA.
    pub unsafe fn new(display: &Display) -> InterruptController<Uninitialized> {
        unsafe {
            Self::from_registers(
                InterruptRegisters::new(),
                BiosInterruptArea::new(),
                display.status_register(),
            )
        }
    }

    pub(crate) fn from_registers(
        regs: &'static InterruptRegisters,
        bios: &'static BiosInterruptArea,
        display_status: &'static RW<u16>,
    ) -> InterruptController<Uninitialized> {
        InterruptController {
            regs,
            bios,
            display_status,
            _state: PhantomData,
        }
    }

    /// Installs the dispatch routine in the BIOS handler slot.
    pub fn init(self) -> InterruptController<Initialized> {
        let address = dispatch_address();
        debug!("installing interrupt dispatch at {:#x}", address);
        unsafe { self.bios.handler.write(address) };
        InterruptController {
            regs: self.regs,
            bios: self.bios,
            display_status: self.display_status,
            _state: PhantomData,
        }
    }
}

impl InterruptController<Initialized> {
    /// Lets `kind` fire, once interrupts are also enabled globally.
    pub fn enable_type(&mut self, kind: InterruptKind) {
        debug!("enabling {:?} interrupts", kind);
        match kind {
            InterruptKind::VBlank => set_bits(self.display_status, 1, 1, DISPSTAT_VBLANK_IRQ),
            InterruptKind::HBlank => set_bits(self.display_status, 1, 1, DISPSTAT_HBLANK_IRQ),
            InterruptKind::VCount => set_bits(self.display_status, 1, 1, DISPSTAT_VCOUNT_IRQ),
            // timers, DMA, keypad and cartridge are raised from their own
            // control registers, which belong to whoever programs them
            _ => {}
        }
        unsafe { self.regs.enabled.modify(|mask| mask | kind.flag().bits()) };
    }

    /// Sets the master enable. Nothing fires before this.
    pub fn enable_globally(&mut self) {
        debug!("interrupts enabled");
        unsafe { self.regs.master_enable.write(1) };
    }

    pub fn enabled(&self) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(self.regs.enabled.read())
    }

    /// Halts until the next vblank interrupt has been serviced.
    ///
    /// Hangs forever if vblank interrupts (or the master enable) are off.
    pub fn wait_for_vblank(&self) {
        if !self.enabled().contains(InterruptFlags::VBLANK) || self.regs.master_enable.read() == 0 {
            warn!("waiting for vblank with vblank interrupts disabled");
        }
        system_call::wait_for_vblank();
    }
}

/// Number of vblank interrupts serviced so far. Wraps after 2^32 frames.
pub fn frame_count() -> u32 {
    VBLANK_COUNT.load(Ordering::Relaxed)
}

/// Where the BIOS finds [`irq_dispatch`].
fn dispatch_address() -> u32 {
    irq_dispatch as *const () as usize as u32
}

/// The routine the BIOS jumps to. Runs in ARM state from IWRAM, and so does
/// everything it calls.
#[cfg_attr(target_arch = "arm", instruction_set(arm::a32))]
#[cfg_attr(target_arch = "arm", unsafe(link_section = ".iwram"))]
extern "C" fn irq_dispatch() {
    unsafe { service(InterruptRegisters::new(), BiosInterruptArea::new()) };
}

/// Services and acknowledges every pending, enabled interrupt.
#[cfg_attr(target_arch = "arm", instruction_set(arm::a32))]
#[cfg_attr(target_arch = "arm", unsafe(link_section = ".iwram"))]
pub(crate) fn service(regs: &InterruptRegisters, bios: &BiosInterruptArea) -> InterruptFlags {
    let raised = regs.enabled.read() & regs.requested.read();
    let pending = InterruptFlags::from_bits_truncate(raised);

    for kind in InterruptKind::ALL {
        if pending.contains(kind.flag()) {
            handle(kind);
        }
    }

    unsafe {
        regs.requested.write(raised);
        bios.acknowledged.modify(|mask| mask | raised);
    }
    pending
}

#[inline(always)]
#[cfg_attr(target_arch = "arm", instruction_set(arm::a32))]
fn handle(kind: InterruptKind) {
    match kind {
        // the dispatch routine is the only writer and is never re-entered
        InterruptKind::VBlank => {
            let frames = VBLANK_COUNT.load(Ordering::Relaxed);
            VBLANK_COUNT.store(frames.wrapping_add(1), Ordering::Relaxed);
        }
        InterruptKind::HBlank
        | InterruptKind::VCount
        | InterruptKind::Timer0
        | InterruptKind::Timer1
        | InterruptKind::Timer2
        | InterruptKind::Timer3
        | InterruptKind::Dma0
        | InterruptKind::Dma1
        | InterruptKind::Dma2
        | InterruptKind::Dma3
        | InterruptKind::Keypad
        | InterruptKind::Cartridge => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayRegisters, DisplayStatus};
    use crate::testing::fake;

    struct Fakes {
        regs: &'static InterruptRegisters,
        bios: &'static BiosInterruptArea,
        display: Display,
    }

    fn fakes() -> Fakes {
        Fakes {
            regs: fake::<InterruptRegisters>(),
            bios: fake::<BiosInterruptArea>(),
            display: Display::from_registers(fake::<DisplayRegisters>()),
        }
    }

    fn controller(f: &Fakes) -> InterruptController<Uninitialized> {
        InterruptController::<Uninitialized>::from_registers(f.regs, f.bios, f.display.status_register())
    }

    #[test]
    fn register_block_matches_hardware_layout() {
        assert_eq!(core::mem::offset_of!(InterruptRegisters, requested), 0x02);
        assert_eq!(core::mem::offset_of!(InterruptRegisters, master_enable), 0x08);
        assert_eq!(core::mem::offset_of!(BiosInterruptArea, handler), 0x04);
        assert_eq!(size_of::<BiosInterruptArea>(), 0x08);
    }

    #[test]
    fn flags_follow_hardware_bits() {
        assert_eq!(InterruptKind::VBlank.flag().bits(), 1);
        assert_eq!(InterruptKind::Timer3.flag().bits(), 1 << 6);
        assert_eq!(InterruptKind::Dma0.flag().bits(), 1 << 8);
        assert_eq!(InterruptKind::Cartridge.flag().bits(), 1 << 13);

        let all = InterruptKind::ALL
            .iter()
            .fold(InterruptFlags::empty(), |acc, kind| acc | kind.flag());
        assert_eq!(all, InterruptFlags::all());
    }

    #[test]
    fn init_installs_dispatch_before_anything_is_enabled() {
        let f = fakes();
        let irq = controller(&f);
        assert_eq!(f.bios.handler.read(), 0);

        let mut irq = irq.init();
        assert_ne!(dispatch_address(), 0);
        assert_eq!(f.bios.handler.read(), dispatch_address());
        assert_eq!(f.regs.enabled.read(), 0);
        assert_eq!(f.regs.master_enable.read(), 0);

        irq.enable_type(InterruptKind::VBlank);
        irq.enable_globally();

        assert_eq!(irq.enabled(), InterruptFlags::VBLANK);
        assert_eq!(f.regs.master_enable.read(), 1);
        assert!(f.display.status().contains(DisplayStatus::VBLANK_IRQ));
    }

    #[test]
    fn enabling_accumulates_and_configures_display() {
        let f = fakes();
        let mut irq = controller(&f).init();
        unsafe { f.display.status_register().write(DisplayStatus::IN_VBLANK.bits()) };

        irq.enable_type(InterruptKind::HBlank);
        irq.enable_type(InterruptKind::Dma2);
        irq.enable_type(InterruptKind::VCount);

        assert_eq!(
            irq.enabled(),
            InterruptFlags::HBLANK | InterruptFlags::DMA2 | InterruptFlags::VCOUNT
        );
        assert_eq!(
            f.display.status(),
            DisplayStatus::IN_VBLANK | DisplayStatus::HBLANK_IRQ | DisplayStatus::VCOUNT_IRQ
        );
    }

    #[test]
    fn service_acknowledges_enabled_and_raised() {
        let f = fakes();
        let frames = frame_count();
        unsafe {
            f.regs.enabled.write((InterruptFlags::VBLANK | InterruptFlags::TIMER1).bits());
            f.regs.requested.write((InterruptFlags::VBLANK | InterruptFlags::KEYPAD).bits());
            f.bios.acknowledged.write(InterruptFlags::DMA3.bits());
        }

        let serviced = service(f.regs, f.bios);

        assert_eq!(serviced, InterruptFlags::VBLANK);
        assert_eq!(f.regs.requested.read(), InterruptFlags::VBLANK.bits());
        assert_eq!(
            f.bios.acknowledged.read(),
            (InterruptFlags::VBLANK | InterruptFlags::DMA3).bits()
        );
        assert!(frame_count() > frames);
    }

    #[test]
    fn service_with_nothing_pending_acknowledges_nothing() {
        let f = fakes();
        unsafe { f.regs.requested.write(InterruptFlags::HBLANK.bits()) };

        assert_eq!(service(f.regs, f.bios), InterruptFlags::empty());
        assert_eq!(f.bios.acknowledged.read(), 0);
    }
}
