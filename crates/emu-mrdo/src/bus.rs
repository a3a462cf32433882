//! Board hardware and the CPU's view of it.

use emu_core::{Bus, InputLine, OPEN_BUS};
use log::debug;
use mmi_pal16r6::ProtectionLatch;

use crate::map::{Region, SPRITE_RAM_SIZE, TILE_RAM_SIZE, WORK_RAM_SIZE, decode};
use crate::screen::ScreenTiming;

pub(crate) const SOUND_CHIPS: usize = 2;
pub(crate) const INPUT_PORTS: usize = 4;

pub(crate) struct Board {
    pub rom: Vec<u8>,
    pub tile_ram: Vec<u8>,
    pub sprite_ram: Vec<u8>,
    pub work_ram: Vec<u8>,

    pub protection: ProtectionLatch,
    pub screen: ScreenTiming,
    /// IRQ0, raised at the start of VBLANK.
    pub irq: InputLine,
    /// HL as of the start of the current instruction.
    pub hl: u16,

    pub flip_screen: bool,
    pub scroll_x: u8,
    /// Scroll Y as the playfield sees it: the value is negated when the
    /// screen was flipped at the time of the write.
    pub scroll_y: u8,
    /// Active-low input ports: P1, P2, DSW1, DSW2.
    pub inputs: [u8; INPUT_PORTS],
    /// Last byte written to each SN76489.
    pub sound: [u8; SOUND_CHIPS],
    pub sound_writes: u64,
}

impl Board {
    pub fn new(rom: Vec<u8>, protection: ProtectionLatch) -> Self {
        Self {
            rom,
            tile_ram: vec![0; TILE_RAM_SIZE],
            sprite_ram: vec![0; SPRITE_RAM_SIZE],
            work_ram: vec![0; WORK_RAM_SIZE],
            protection,
            screen: ScreenTiming::new(),
            irq: InputLine::new(),
            hl: 0,
            flip_screen: false,
            scroll_x: 0,
            scroll_y: 0,
            inputs: [0xFF; INPUT_PORTS],
            sound: [0; SOUND_CHIPS],
            sound_writes: 0,
        }
    }

    /// Power-on state for everything reset reaches. RAM and input ports
    /// keep their contents.
    pub fn reset(&mut self) {
        self.protection.reset();
        self.screen.reset();
        self.irq.clear();
        self.hl = 0;
        self.flip_screen = false;
        self.scroll_x = 0;
        self.scroll_y = 0;
        self.sound = [0; SOUND_CHIPS];
    }
}

pub(crate) struct MrDoBus<'a> {
    pub board: &'a mut Board,
}

impl Bus for MrDoBus<'_> {
    fn read(&mut self, address: u16) -> u8 {
        let board = &*self.board;
        match decode(address) {
            Region::Rom(offset) => board.rom.get(offset).copied().unwrap_or(OPEN_BUS),
            Region::TileRam(offset) => board.tile_ram[offset],
            Region::Protection => board.protection.read(&board.rom, board.hl),
            Region::Input(port) => board.inputs[port],
            Region::WorkRam(offset) => board.work_ram[offset],
            Region::SpriteRam(_)
            | Region::FlipScreen
            | Region::Sound(_)
            | Region::ScrollX
            | Region::ScrollY
            | Region::Unused => {
                debug!("unmapped read at {address:#06X}");
                OPEN_BUS
            }
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        let board = &mut *self.board;
        match decode(address) {
            Region::TileRam(offset) => {
                board.tile_ram[offset] = value;
                // The PAL clock is the tile RAM write enable.
                board.protection.clock(value);
            }
            Region::SpriteRam(offset) => board.sprite_ram[offset] = value,
            // Bits 1-3 select playfield priority; the game never sets them.
            Region::FlipScreen => board.flip_screen = value & 1 != 0,
            Region::Sound(chip) => {
                board.sound[chip] = value;
                board.sound_writes += 1;
            }
            Region::WorkRam(offset) => board.work_ram[offset] = value,
            Region::ScrollX => board.scroll_x = value,
            Region::ScrollY => {
                board.scroll_y = if board.flip_screen {
                    value.wrapping_neg()
                } else {
                    value
                };
            }
            Region::Rom(_) => {}
            Region::Protection | Region::Input(_) | Region::Unused => {
                debug!("unmapped write {value:#04X} at {address:#06X}");
            }
        }
    }
}
