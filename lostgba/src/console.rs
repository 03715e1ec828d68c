use log::debug;

use crate::{
    display::Display,
    input::Keypad,
    interrupt::{InterruptController, InterruptKind, Uninitialized},
    object::{ObjectAttributeMemory, ObjectAttributeTable},
    tile_map::TileMap,
    video::VideoMemory,
};

/// Every piece of hardware this crate drives, brought up and ready for a
/// vblank-paced frame loop.
pub struct Gba {
    pub display: Display,
    pub interrupts: InterruptController,
    pub tile_map: TileMap,
    pub video: VideoMemory,
    /// RAM copy of OAM, copied over by [`end_frame`](Self::end_frame).
    pub objects: ObjectAttributeTable,
    pub oam: &'static ObjectAttributeMemory,
    pub keypad: Keypad,
}

impl Gba {
    /// Installs the interrupt dispatch routine and enables vblank interrupts.
    ///
    /// The object table starts zeroed; hide the sprites you don't use before
    /// the first [`end_frame`](Self::end_frame).
    ///
    /// # Safety
    ///
    /// Call once, on the GBA, before anything else in this crate.
    pub unsafe fn init() -> Gba {
        unsafe {
            let display = Display::new();
            let interrupts = InterruptController::<Uninitialized>::new(&display);
            Self::bring_up(
                display,
                interrupts,
                TileMap::new(),
                VideoMemory::new(),
                ObjectAttributeMemory::new(),
                Keypad::new(),
            )
        }
    }

    pub(crate) fn bring_up(
        display: Display,
        interrupts: InterruptController<Uninitialized>,
        tile_map: TileMap,
        video: VideoMemory,
        oam: &'static ObjectAttributeMemory,
        keypad: Keypad,
    ) -> Gba {
        let mut interrupts = interrupts.init();
        interrupts.enable_type(InterruptKind::VBlank);
        interrupts.enable_globally();
        debug!("console up");

        Gba {
            display,
            interrupts,
            tile_map,
            video,
            objects: ObjectAttributeTable::new(),
            oam,
            keypad,
        }
    }

    /// Waits for vblank, then copies the object table to OAM.
    pub fn end_frame(&mut self) {
        self.interrupts.wait_for_vblank();
        self.objects.commit(self.oam);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        display::{DisplayRegisters, DisplayStatus},
        interrupt::{BiosInterruptArea, InterruptFlags, InterruptRegisters},
        object::ObjectDisplayMode,
        testing::{fake, peek},
        tile_map::TileMapMemory,
        video::{CharacterMemory, PaletteMemory},
    };

    fn gba() -> Gba {
        let display = Display::from_registers(fake::<DisplayRegisters>());
        let interrupts = InterruptController::<Uninitialized>::from_registers(
            fake::<InterruptRegisters>(),
            fake::<BiosInterruptArea>(),
            display.status_register(),
        );
        Gba::bring_up(
            display,
            interrupts,
            TileMap::from_memory(fake::<TileMapMemory>()),
            VideoMemory::from_memory(fake::<PaletteMemory>(), fake::<CharacterMemory>()),
            fake::<ObjectAttributeMemory>(),
            Keypad::from_register(fake()),
        )
    }

    #[test]
    fn bring_up_enables_vblank_interrupts() {
        let gba = gba();

        assert_eq!(gba.interrupts.enabled(), InterruptFlags::VBLANK);
        assert!(gba.display.status().contains(DisplayStatus::VBLANK_IRQ));
    }

    #[test]
    fn end_frame_commits_objects() {
        let mut gba = gba();
        gba.objects.hide_all();
        gba.objects.attribute_mut(0).set_display_mode(ObjectDisplayMode::Normal);
        gba.objects.attribute_mut(0).set_position(96, 32);
        assert_eq!(peek(gba.oam, 0), 0);

        gba.end_frame();

        assert_eq!(peek(gba.oam, 0), 32);
        assert_eq!(peek(gba.oam, 1), 96);
        assert_eq!(peek(gba.oam, 4) >> 8, ObjectDisplayMode::Hidden as u16);
    }
}
