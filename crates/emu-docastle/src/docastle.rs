//! Top-level Do's Castle system.
//!
//! Both Z80s run at 4 MHz and share one timeline in CPU cycles. The 6845
//! runs from the 9.828 MHz video crystal divided by 16; it is a third
//! scheduler task whose slices are converted to character clocks.
//!
//! # Latch handshake
//!
//! When the main CPU writes latch byte 8 the real board pulls its WAIT
//! line until the sub CPU writes its own byte 8. Here the main CPU is
//! suspended on [`LATCH_TRIGGER`] instead: the sub CPU's commit fires the
//! trigger and the main CPU resumes at that moment. If the sub CPU never
//! commits, the main CPU resumes after the configured timeout (500 cycles
//! by default). That timeout is a known inaccuracy: hardware would wait
//! forever.

use emu_core::{
    ClockPhase, Cpu, InputLine, MasterClock, Observable, Resume, Scheduler, Slice, TaskId,
    Tickable, Ticks, TriggerId, Value,
};
use log::{info, trace};
use motorola_6845::Crtc6845;

use crate::adpcm::AdpcmControl;
use crate::bus::{Board, MainBus, SOUND_CHIPS, SubBus};
use crate::config::{ConfigError, DoCastleConfig, DoCastleVariant};
use crate::inputs::InputMux;
use crate::latch::{LATCH_SIZE, LatchBridge};
use crate::raster::RasterEdgeDetector;

/// Both CPUs run from the 4 MHz master crystal.
pub const CPU_CLOCK: MasterClock = MasterClock::new(4_000_000);
/// Video crystal.
pub const VIDEO_CLOCK: MasterClock = MasterClock::new(9_828_000);
/// 6845 character clock.
pub const CHARACTER_CLOCK: MasterClock = VIDEO_CLOCK.divided(16);

const PIXEL_CLOCK: MasterClock = VIDEO_CLOCK.divided(2);
const PIXELS_PER_LINE: u64 = 312;
const LINES_PER_FRAME: u64 = 264;

/// CPU cycles per video frame (312 x 264 pixel clocks at 4.914 MHz).
pub const CYCLES_PER_FRAME: Ticks =
    ClockPhase::new(CPU_CLOCK, PIXEL_CLOCK).source_cycles(PIXELS_PER_LINE * LINES_PER_FRAME);

/// Wake channel between the two latch commits.
pub const LATCH_TRIGGER: TriggerId = TriggerId(500);

/// Longest slice any task runs before the others catch up.
const SCHEDULER_QUANTUM: Ticks = Ticks::new(64);

/// Board state at one instant, for inspection or serialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardSnapshot {
    pub variant: DoCastleVariant,
    pub time: Ticks,
    pub frame: u64,
    pub main_suspended: bool,
    pub latch: LatchBridge,
    pub raster: RasterEdgeDetector,
    pub crtc: Crtc6845,
    pub inputs: InputMux,
    pub adpcm: AdpcmControl,
    pub main_irq: InputLine,
    pub sub_irq: InputLine,
    pub sound: [u8; SOUND_CHIPS],
}

/// Do's Castle board with its two CPUs.
pub struct DoCastle<C: Cpu> {
    main: C,
    sub: C,
    board: Board,
    scheduler: Scheduler,
    main_task: TaskId,
    sub_task: TaskId,
    video_task: TaskId,
    video_phase: ClockPhase,
    latch_timeout: Ticks,
    /// Time every task has been asked to reach.
    target: Ticks,
    frame_count: u64,
}

impl<C: Cpu> DoCastle<C> {
    /// Build the board around two CPU cores.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`DoCastleConfig::validate`].
    pub fn new(config: DoCastleConfig, main: C, sub: C) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut scheduler = Scheduler::new(SCHEDULER_QUANTUM);
        let main_task = scheduler.add_task("main");
        let sub_task = scheduler.add_task("sub");
        let video_task = scheduler.add_task("crtc");

        Ok(Self {
            main,
            sub,
            board: Board::new(config.variant, config.main_rom, config.sub_rom),
            scheduler,
            main_task,
            sub_task,
            video_task,
            video_phase: ClockPhase::new(CPU_CLOCK, CHARACTER_CLOCK),
            latch_timeout: config.latch_timeout,
            target: Ticks::ZERO,
            frame_count: 0,
        })
    }

    /// Run one video frame.
    pub fn run_frame(&mut self) {
        self.run_for(CYCLES_PER_FRAME);
        self.frame_count += 1;
    }

    /// Run every task forward by `duration` CPU cycles.
    pub fn run_for(&mut self, duration: Ticks) {
        self.run_until(self.target + duration);
    }

    /// Run every task up to `target` (in CPU cycles since reset). A CPU
    /// may finish a few cycles past it, since instructions are not split.
    pub fn run_until(&mut self, target: Ticks) {
        self.target = self.target.max(target);
        while let Some(slice) = self.scheduler.next_slice(self.target) {
            if slice.task == self.main_task {
                self.run_main(slice);
            } else if slice.task == self.sub_task {
                self.run_sub(slice);
            } else {
                self.run_video(slice);
            }
        }
    }

    /// Reset both CPUs and the board. RAM contents survive, as on hardware.
    pub fn reset(&mut self) {
        info!("{:?} board reset", self.board.variant);
        self.main.reset();
        self.sub.reset();
        self.board.reset();
        self.scheduler.reset();
        self.video_phase.reset();
        self.target = Ticks::ZERO;
        self.frame_count = 0;
    }

    fn run_main(&mut self, slice: Slice) {
        let end = slice.end();
        let mut now = slice.start;
        while now < end {
            self.board.main_irq.deliver(&mut self.main);
            let cycles = self.main.step(&mut MainBus {
                board: &mut self.board,
            });
            now += Ticks::from(cycles.max(1));

            if std::mem::take(&mut self.board.nmi_request) {
                trace!("main pulses sub NMI at {}", now.get());
                self.sub.nmi();
            }
            if std::mem::take(&mut self.board.main_commit) {
                self.scheduler.finish_slice(self.main_task, now);
                self.scheduler.spin_until_trigger(
                    self.main_task,
                    LATCH_TRIGGER,
                    now,
                    self.latch_timeout,
                );
                return;
            }
        }
        self.scheduler.finish_slice(self.main_task, now);
    }

    fn run_sub(&mut self, slice: Slice) {
        let end = slice.end();
        let mut now = slice.start;
        while now < end {
            self.board.sub_irq.deliver(&mut self.sub);
            let cycles = self.sub.step(&mut SubBus {
                board: &mut self.board,
            });
            now += Ticks::from(cycles.max(1));

            if std::mem::take(&mut self.board.sub_commit) {
                self.scheduler.trigger(LATCH_TRIGGER, now);
                break;
            }
        }
        self.scheduler.finish_slice(self.sub_task, now);
    }

    fn run_video(&mut self, slice: Slice) {
        let characters = self.video_phase.advance(slice.budget);
        for _ in 0..characters {
            self.board.crtc.tick();
            self.board.after_crtc_tick();
        }
        self.scheduler.finish_slice(self.video_task, slice.end());
    }

    #[must_use]
    pub fn variant(&self) -> DoCastleVariant {
        self.board.variant
    }

    #[must_use]
    pub fn main_cpu(&self) -> &C {
        &self.main
    }

    #[must_use]
    pub fn sub_cpu(&self) -> &C {
        &self.sub
    }

    pub fn main_cpu_mut(&mut self) -> &mut C {
        &mut self.main
    }

    pub fn sub_cpu_mut(&mut self) -> &mut C {
        &mut self.sub
    }

    #[must_use]
    pub fn latch(&self) -> &LatchBridge {
        &self.board.latch
    }

    #[must_use]
    pub fn crtc(&self) -> &Crtc6845 {
        &self.board.crtc
    }

    #[must_use]
    pub fn raster(&self) -> &RasterEdgeDetector {
        &self.board.raster
    }

    /// Set an input port's active-low value (see [`crate::inputs`]).
    pub fn set_input(&mut self, port: usize, value: u8) {
        self.board.inputs.set_port(port, value);
    }

    #[must_use]
    pub fn flip_screen(&self) -> bool {
        self.board.inputs.flip_screen()
    }

    #[must_use]
    pub fn video_ram(&self) -> &[u8] {
        &self.board.video_ram
    }

    #[must_use]
    pub fn colour_ram(&self) -> &[u8] {
        &self.board.colour_ram
    }

    #[must_use]
    pub fn sprite_ram(&self) -> &[u8] {
        &self.board.sprite_ram
    }

    /// Last byte written to each SN76489A.
    #[must_use]
    pub fn sound_latches(&self) -> [u8; SOUND_CHIPS] {
        self.board.sound
    }

    /// Writes to any SN76489A since power-on.
    #[must_use]
    pub fn sound_writes(&self) -> u64 {
        self.board.sound_writes
    }

    #[must_use]
    pub fn watchdog_writes(&self) -> u64 {
        self.board.watchdog_writes
    }

    /// Time of the task furthest behind.
    #[must_use]
    pub fn now(&self) -> Ticks {
        self.scheduler.now()
    }

    #[must_use]
    pub fn main_time(&self) -> Ticks {
        self.scheduler.local_time(self.main_task)
    }

    #[must_use]
    pub fn sub_time(&self) -> Ticks {
        self.scheduler.local_time(self.sub_task)
    }

    /// True while the main CPU waits on the latch.
    #[must_use]
    pub fn is_main_suspended(&self) -> bool {
        self.scheduler.is_suspended(self.main_task)
    }

    /// How the main CPU's last latch wait ended.
    #[must_use]
    pub fn main_last_resume(&self) -> Option<Resume> {
        self.scheduler.last_resume(self.main_task)
    }

    #[must_use]
    pub fn latch_timeout(&self) -> Ticks {
        self.latch_timeout
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            variant: self.board.variant,
            time: self.now(),
            frame: self.frame_count,
            main_suspended: self.is_main_suspended(),
            latch: self.board.latch.clone(),
            raster: self.board.raster,
            crtc: self.board.crtc.clone(),
            inputs: self.board.inputs.clone(),
            adpcm: self.board.adpcm.clone(),
            main_irq: self.board.main_irq,
            sub_irq: self.board.sub_irq,
            sound: self.board.sound,
        }
    }
}

/// Parse a latch byte index from a query path segment.
fn latch_index(rest: &str) -> Option<usize> {
    rest.parse().ok().filter(|&i| i < LATCH_SIZE)
}

impl<C: Cpu> Observable for DoCastle<C> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("crtc.") {
            self.board.crtc.query(rest)
        } else if let Some(rest) = path.strip_prefix("latch.to_sub.") {
            latch_index(rest).map(|i| self.board.latch.to_sub()[i].into())
        } else if let Some(rest) = path.strip_prefix("latch.to_main.") {
            latch_index(rest).map(|i| self.board.latch.to_main()[i].into())
        } else {
            match path {
                "time" => Some(self.now().get().into()),
                "frame" => Some(self.frame_count.into()),
                "main.pc" => Some(self.main.pc().into()),
                "main.time" => Some(self.main_time().get().into()),
                "main.suspended" => Some(self.is_main_suspended().into()),
                "main.irq" => Some(self.board.main_irq.is_active().into()),
                "sub.pc" => Some(self.sub.pc().into()),
                "sub.time" => Some(self.sub_time().get().into()),
                "sub.irq" => Some(self.board.sub_irq.is_active().into()),
                "latch.to_sub" => Some(self.board.latch.to_sub().as_slice().into()),
                "latch.to_main" => Some(self.board.latch.to_main().as_slice().into()),
                "raster.level" => Some(self.board.raster.level().into()),
                "flip_screen" => Some(self.flip_screen().into()),
                "watchdog" => Some(self.board.watchdog_writes.into()),
                "sound.writes" => Some(self.board.sound_writes.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "time",
            "frame",
            "main.pc",
            "main.time",
            "main.suspended",
            "main.irq",
            "sub.pc",
            "sub.time",
            "sub.irq",
            "latch.to_sub",
            "latch.to_sub.<0-8>",
            "latch.to_main",
            "latch.to_main.<0-8>",
            "raster.level",
            "flip_screen",
            "watchdog",
            "sound.writes",
            "crtc.<crtc_paths>",
        ]
    }
}
