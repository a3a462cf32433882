//! Top-level Mr. Do! system.
//!
//! The Z80 drives the timeline. After each instruction the beam counters
//! catch up through a [`ClockPhase`] from CPU cycles to pixel clocks,
//! raising or dropping IRQ0 as they cross the VBLANK boundaries.

use emu_core::{ClockPhase, InputLine, Observable, Tickable, Ticks, Value};
use log::info;
use mmi_pal16r6::ProtectionLatch;

use crate::bus::{Board, INPUT_PORTS, MrDoBus, SOUND_CHIPS};
use crate::config::{BoardRevision, ConfigError, Crystals, MrDoConfig};
use crate::cpu::MainCpu;
use crate::map::TILE_PAGE_SIZE;
use crate::screen::{ScreenTiming, VblankEdge};

/// Input ports at $A000-$A003. All are active low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPort {
    P1,
    P2,
    Dsw1,
    Dsw2,
}

impl InputPort {
    const fn index(self) -> usize {
        match self {
            Self::P1 => 0,
            Self::P2 => 1,
            Self::Dsw1 => 2,
            Self::Dsw2 => 3,
        }
    }
}

/// One of the two tile layers in $8000-$8FFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Colour RAM at $8000, field RAM at $8400.
    Background,
    /// Colour RAM at $8800, field RAM at $8C00.
    Foreground,
}

impl Layer {
    /// Offset of the layer's colour page within tile RAM. The field page
    /// follows it.
    const fn base(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Foreground => 2 * TILE_PAGE_SIZE,
        }
    }
}

/// Board state at one instant, for inspection or serialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardSnapshot {
    pub revision: BoardRevision,
    pub crystals: Crystals,
    pub time: Ticks,
    pub frame: u64,
    pub protection: ProtectionLatch,
    pub screen: ScreenTiming,
    pub irq: InputLine,
    pub flip_screen: bool,
    pub scroll_x: u8,
    pub scroll_y: u8,
    pub inputs: [u8; INPUT_PORTS],
    pub sound: [u8; SOUND_CHIPS],
}

/// Mr. Do! board with its CPU.
pub struct MrDo<C: MainCpu> {
    cpu: C,
    board: Board,
    revision: BoardRevision,
    crystals: Crystals,
    pixel_phase: ClockPhase,
    time: Ticks,
    frame_count: u64,
}

impl<C: MainCpu> MrDo<C> {
    /// Build the board around a CPU core.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a bad ROM, or
    /// [`ConfigError::Protection`] if the PAL is enabled without equations.
    pub fn new(config: MrDoConfig, cpu: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let protection = ProtectionLatch::new(config.protection)?;

        Ok(Self {
            cpu,
            board: Board::new(config.rom, protection),
            revision: config.revision,
            crystals: config.crystals,
            pixel_phase: ClockPhase::new(
                config.crystals.cpu_clock(),
                config.crystals.pixel_clock(),
            ),
            time: Ticks::ZERO,
            frame_count: 0,
        })
    }

    /// Run one video frame.
    pub fn run_frame(&mut self) {
        self.run_for(self.crystals.cycles_per_frame());
        self.frame_count += 1;
    }

    /// Run for `duration` CPU cycles.
    pub fn run_for(&mut self, duration: Ticks) {
        self.run_until(self.time + duration);
    }

    /// Run up to `target` CPU cycles since reset. The last instruction may
    /// end a few cycles past it.
    pub fn run_until(&mut self, target: Ticks) {
        while self.time < target {
            self.step();
        }
    }

    /// Execute one instruction and bring the beam up to date.
    pub fn step(&mut self) -> u32 {
        self.board.irq.deliver(&mut self.cpu);
        self.board.hl = self.cpu.hl();
        let cycles = self
            .cpu
            .step(&mut MrDoBus {
                board: &mut self.board,
            })
            .max(1);
        self.time += Ticks::from(cycles);

        let pixels = self.pixel_phase.advance(Ticks::from(cycles));
        for _ in 0..pixels {
            self.board.screen.tick();
            match self.board.screen.take_vblank_edge() {
                // Held: the CPU's acknowledge clears it.
                Some(VblankEdge::Start) => self.board.irq.hold(),
                Some(VblankEdge::End) => self.board.irq.clear(),
                None => {}
            }
        }
        cycles
    }

    /// Reset the CPU and the board. RAM contents survive.
    pub fn reset(&mut self) {
        info!("{:?} board reset", self.revision);
        self.cpu.reset();
        self.board.reset();
        self.pixel_phase.reset();
        self.time = Ticks::ZERO;
        self.frame_count = 0;
    }

    #[must_use]
    pub fn revision(&self) -> BoardRevision {
        self.revision
    }

    #[must_use]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    #[must_use]
    pub fn protection(&self) -> &ProtectionLatch {
        &self.board.protection
    }

    #[must_use]
    pub fn screen(&self) -> &ScreenTiming {
        &self.board.screen
    }

    pub fn set_input(&mut self, port: InputPort, value: u8) {
        self.board.inputs[port.index()] = value;
    }

    /// Colour RAM of `layer`.
    #[must_use]
    pub fn colour_ram(&self, layer: Layer) -> &[u8] {
        self.tile_page(layer.base())
    }

    /// Tile codes of `layer`.
    #[must_use]
    pub fn field_ram(&self, layer: Layer) -> &[u8] {
        self.tile_page(layer.base() + TILE_PAGE_SIZE)
    }

    fn tile_page(&self, start: usize) -> &[u8] {
        self.board
            .tile_ram
            .get(start..start + TILE_PAGE_SIZE)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn sprite_ram(&self) -> &[u8] {
        &self.board.sprite_ram
    }

    #[must_use]
    pub fn flip_screen(&self) -> bool {
        self.board.flip_screen
    }

    #[must_use]
    pub fn scroll(&self) -> (u8, u8) {
        (self.board.scroll_x, self.board.scroll_y)
    }

    /// Last byte written to each SN76489.
    #[must_use]
    pub fn sound_latches(&self) -> [u8; SOUND_CHIPS] {
        self.board.sound
    }

    /// Writes to either SN76489 since power-on.
    #[must_use]
    pub fn sound_writes(&self) -> u64 {
        self.board.sound_writes
    }

    #[must_use]
    pub fn now(&self) -> Ticks {
        self.time
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn cycles_per_frame(&self) -> Ticks {
        self.crystals.cycles_per_frame()
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            revision: self.revision,
            crystals: self.crystals,
            time: self.time,
            frame: self.frame_count,
            protection: self.board.protection.clone(),
            screen: self.board.screen.clone(),
            irq: self.board.irq,
            flip_screen: self.board.flip_screen,
            scroll_x: self.board.scroll_x,
            scroll_y: self.board.scroll_y,
            inputs: self.board.inputs,
            sound: self.board.sound,
        }
    }
}

impl<C: MainCpu> Observable for MrDo<C> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("protection.") {
            return self.board.protection.query(rest);
        }
        match path {
            "time" => Some(self.time.get().into()),
            "frame" => Some(self.frame_count.into()),
            "cpu.pc" => Some(self.cpu.pc().into()),
            "cpu.hl" => Some(self.cpu.hl().into()),
            "irq" => Some(self.board.irq.is_active().into()),
            "screen.line" => Some(self.board.screen.line().into()),
            "screen.pixel" => Some(self.board.screen.pixel().into()),
            "screen.vblank" => Some(self.board.screen.in_vblank().into()),
            "flip_screen" => Some(self.board.flip_screen.into()),
            "scroll_x" => Some(self.board.scroll_x.into()),
            "scroll_y" => Some(self.board.scroll_y.into()),
            "sound.writes" => Some(self.board.sound_writes.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "time",
            "frame",
            "cpu.pc",
            "cpu.hl",
            "irq",
            "screen.line",
            "screen.pixel",
            "screen.vblank",
            "flip_screen",
            "scroll_x",
            "scroll_y",
            "sound.writes",
            "protection.<protection_paths>",
        ]
    }
}
