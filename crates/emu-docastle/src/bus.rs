//! Board hardware shared by the two CPUs, and one bus adapter per CPU.
//!
//! Bus accesses never touch the scheduler directly. Latch commits and NMI
//! requests are recorded on the board and the machine acts on them once
//! the instruction that caused them has finished.

use emu_core::{Bus, InputLine, OPEN_BUS};
use log::debug;
use motorola_6845::Crtc6845;

use crate::DoCastleVariant;
use crate::adpcm::AdpcmControl;
use crate::inputs::InputMux;
use crate::latch::{LatchBridge, LatchEvent};
use crate::map::{
    MAIN_RAM_SIZE, MainRegion, SPRITE_RAM_SIZE, SUB_RAM_SIZE, SubRegion, VIDEO_RAM_SIZE,
    decode_main, decode_sub,
};
use crate::raster::RasterEdgeDetector;

/// CRTC address register port on the main CPU.
const CRTC_ADDRESS_PORT: u8 = 0x00;
/// CRTC data register port on the main CPU.
const CRTC_DATA_PORT: u8 = 0x02;

/// Number of SN76489A sound chips on the sub CPU.
pub const SOUND_CHIPS: usize = 4;

pub(crate) struct Board {
    pub variant: DoCastleVariant,
    pub main_rom: Vec<u8>,
    pub sub_rom: Vec<u8>,
    pub main_ram: Vec<u8>,
    pub sprite_ram: Vec<u8>,
    pub video_ram: Vec<u8>,
    pub colour_ram: Vec<u8>,
    pub sub_ram: Vec<u8>,

    pub latch: LatchBridge,
    pub inputs: InputMux,
    pub crtc: Crtc6845,
    pub raster: RasterEdgeDetector,
    pub adpcm: AdpcmControl,
    /// Last byte written to each sound chip.
    pub sound: [u8; SOUND_CHIPS],
    pub sound_writes: u64,
    pub watchdog_writes: u64,

    /// Main CPU IRQ, following the CRTC VSYNC output.
    pub main_irq: InputLine,
    /// Sub CPU IRQ, raised by the MA6 edge detector.
    pub sub_irq: InputLine,

    /// The main CPU wrote latch byte 8 during the current instruction.
    pub main_commit: bool,
    /// The sub CPU wrote latch byte 8 during the current instruction.
    pub sub_commit: bool,
    /// The main CPU hit the NMI trigger during the current instruction.
    pub nmi_request: bool,
}

impl Board {
    pub fn new(variant: DoCastleVariant, main_rom: Vec<u8>, sub_rom: Vec<u8>) -> Self {
        Self {
            variant,
            main_rom,
            sub_rom,
            main_ram: vec![0; MAIN_RAM_SIZE],
            sprite_ram: vec![0; SPRITE_RAM_SIZE],
            video_ram: vec![0; VIDEO_RAM_SIZE],
            colour_ram: vec![0; VIDEO_RAM_SIZE],
            sub_ram: vec![0; SUB_RAM_SIZE],
            latch: LatchBridge::new(),
            inputs: InputMux::new(),
            crtc: Crtc6845::new(),
            raster: RasterEdgeDetector::new(),
            adpcm: AdpcmControl::new(),
            sound: [0; SOUND_CHIPS],
            sound_writes: 0,
            watchdog_writes: 0,
            main_irq: InputLine::new(),
            sub_irq: InputLine::new(),
            main_commit: false,
            sub_commit: false,
            nmi_request: false,
        }
    }

    /// Power-on state for everything reset reaches. RAM keeps its contents.
    pub fn reset(&mut self) {
        self.latch.reset();
        self.inputs.reset();
        self.crtc.reset();
        self.raster.reset();
        self.adpcm.reset();
        self.main_irq.clear();
        self.sub_irq.clear();
        self.main_commit = false;
        self.sub_commit = false;
        self.nmi_request = false;
    }

    /// React to one CRTC character clock's worth of output changes.
    pub fn after_crtc_tick(&mut self) {
        if let Some(ma) = self.crtc.take_hsync_edge() {
            if self.raster.on_horizontal_sync(ma) {
                self.sub_irq.hold();
            }
        }

        match (self.crtc.vsync(), self.main_irq.is_active()) {
            (true, false) => self.main_irq.assert(),
            (false, true) => self.main_irq.clear(),
            _ => {}
        }
    }
}

fn rom_byte(rom: &[u8], offset: usize) -> u8 {
    rom.get(offset).copied().unwrap_or(OPEN_BUS)
}

/// The main CPU's view of the board.
pub(crate) struct MainBus<'a> {
    pub board: &'a mut Board,
}

impl Bus for MainBus<'_> {
    fn read(&mut self, address: u16) -> u8 {
        let board = &mut *self.board;
        match decode_main(board.variant, address) {
            MainRegion::Rom(offset) => rom_byte(&board.main_rom, offset),
            MainRegion::Ram(offset) => board.main_ram[offset],
            MainRegion::SpriteRam(offset) => board.sprite_ram[offset],
            MainRegion::Latch(offset) => board.latch.read_main(offset),
            MainRegion::VideoRam(offset) => board.video_ram[offset],
            MainRegion::ColourRam(offset) => board.colour_ram[offset],
            MainRegion::Adpcm => board.adpcm.read_status(),
            MainRegion::Watchdog | MainRegion::NmiTrigger | MainRegion::Unmapped => {
                debug!("main: unmapped read at {address:#06X}");
                OPEN_BUS
            }
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        let board = &mut *self.board;
        match decode_main(board.variant, address) {
            MainRegion::Ram(offset) => board.main_ram[offset] = value,
            MainRegion::SpriteRam(offset) => board.sprite_ram[offset] = value,
            MainRegion::Latch(offset) => {
                if board.latch.write_main(offset, value) == LatchEvent::Commit {
                    board.main_commit = true;
                }
            }
            MainRegion::Watchdog => board.watchdog_writes += 1,
            MainRegion::VideoRam(offset) => board.video_ram[offset] = value,
            MainRegion::ColourRam(offset) => board.colour_ram[offset] = value,
            MainRegion::Adpcm => board.adpcm.write(value),
            MainRegion::NmiTrigger => board.nmi_request = true,
            MainRegion::Rom(_) => {}
            MainRegion::Unmapped => {
                debug!("main: unmapped write {value:#04X} at {address:#06X}");
            }
        }
    }

    fn io_write(&mut self, port: u16, value: u8) {
        match port as u8 {
            CRTC_ADDRESS_PORT => self.board.crtc.write_address(value),
            CRTC_DATA_PORT => self.board.crtc.write_data(value),
            other => debug!("main: unmapped I/O write {value:#04X} to port {other:#04X}"),
        }
    }
}

/// The sub CPU's view of the board.
pub(crate) struct SubBus<'a> {
    pub board: &'a mut Board,
}

impl Bus for SubBus<'_> {
    fn read(&mut self, address: u16) -> u8 {
        let board = &mut *self.board;
        match decode_sub(board.variant, address) {
            SubRegion::Rom(offset) => rom_byte(&board.sub_rom, offset),
            SubRegion::Ram(offset) => board.sub_ram[offset],
            SubRegion::Latch(offset) => board.latch.read_sub(offset),
            SubRegion::Inputs(offset) => board.inputs.read(offset),
            SubRegion::Sound(_) | SubRegion::Unmapped => {
                debug!("sub: unmapped read at {address:#06X}");
                OPEN_BUS
            }
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        let board = &mut *self.board;
        match decode_sub(board.variant, address) {
            SubRegion::Ram(offset) => board.sub_ram[offset] = value,
            SubRegion::Latch(offset) => {
                if board.latch.write_sub(offset, value) == LatchEvent::Commit {
                    board.sub_commit = true;
                }
            }
            SubRegion::Inputs(offset) => board.inputs.write(offset),
            SubRegion::Sound(chip) => {
                board.sound[chip] = value;
                board.sound_writes += 1;
            }
            SubRegion::Rom(_) => {}
            SubRegion::Unmapped => {
                debug!("sub: unmapped write {value:#04X} at {address:#06X}");
            }
        }
    }
}
