//! A bus-driving CPU double for board tests.
//!
//! Boards here never run real program code in their tests; they run
//! short scripts of bus accesses instead, so a test can state exactly
//! which addresses a CPU touches and when.

use std::collections::VecDeque;

use crate::{Bus, Cpu};

/// Cycles charged for each scripted bus access.
pub const ACCESS_CYCLES: u32 = 4;

/// One scripted CPU action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Read memory, recording the value.
    Read(u16),
    /// Write memory.
    Write(u16, u8),
    /// Write an I/O port.
    IoWrite(u16, u8),
    /// Burn cycles without touching the bus.
    Idle(u32),
    /// Load the HL register pair.
    LoadHl(u16),
    /// Re-enable maskable interrupts (accepting one disables them).
    EnableInterrupts,
}

/// Register view of a [`ScriptedCpu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptedRegisters {
    pub pc: u32,
    pub hl: u16,
}

/// A CPU that executes a fixed list of [`Op`]s, one per step.
///
/// Interrupt handlers are scripts too: when an NMI (or an accepted IRQ)
/// arrives, its handler ops run ahead of the main script. Accepting an IRQ
/// masks further ones until an [`Op::EnableInterrupts`] runs. With an empty
/// script the CPU idles as if halted.
#[derive(Debug, Clone)]
pub struct ScriptedCpu {
    program: Vec<Op>,
    queue: VecDeque<Op>,
    regs: ScriptedRegisters,
    reads: Vec<(u16, u8)>,
    nmi_handler: Vec<Op>,
    irq_handler: Vec<Op>,
    nmi_pending: bool,
    interrupts_enabled: bool,
    nmis_taken: u32,
    interrupts_taken: u32,
    cycles: u64,
}

impl ScriptedCpu {
    #[must_use]
    pub fn new(program: Vec<Op>) -> Self {
        let queue = program.iter().copied().collect();
        Self {
            program,
            queue,
            regs: ScriptedRegisters::default(),
            reads: Vec::new(),
            nmi_handler: Vec::new(),
            irq_handler: Vec::new(),
            nmi_pending: false,
            interrupts_enabled: true,
            nmis_taken: 0,
            interrupts_taken: 0,
            cycles: 0,
        }
    }

    /// Ops to run whenever an NMI is taken.
    #[must_use]
    pub fn with_nmi_handler(mut self, ops: Vec<Op>) -> Self {
        self.nmi_handler = ops;
        self
    }

    /// Ops to run whenever a maskable interrupt is accepted.
    #[must_use]
    pub fn with_irq_handler(mut self, ops: Vec<Op>) -> Self {
        self.irq_handler = ops;
        self
    }

    pub fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.interrupts_enabled = enabled;
    }

    /// Every `(address, value)` read so far, in order.
    #[must_use]
    pub fn reads(&self) -> &[(u16, u8)] {
        &self.reads
    }

    /// Values read from `address`, in order.
    #[must_use]
    pub fn reads_from(&self, address: u16) -> Vec<u8> {
        self.reads
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, v)| *v)
            .collect()
    }

    #[must_use]
    pub fn nmis_taken(&self) -> u32 {
        self.nmis_taken
    }

    #[must_use]
    pub fn interrupts_taken(&self) -> u32 {
        self.interrupts_taken
    }

    /// Total cycles consumed.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Ops still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// HL as of the last executed op.
    #[must_use]
    pub fn hl(&self) -> u16 {
        self.regs.hl
    }

    fn push_handler(&mut self, handler: &[Op]) {
        for op in handler.iter().rev() {
            self.queue.push_front(*op);
        }
    }
}

impl Cpu for ScriptedCpu {
    type Registers = ScriptedRegisters;

    fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.nmis_taken += 1;
            let handler = self.nmi_handler.clone();
            self.push_handler(&handler);
        }

        let op = self.queue.pop_front();
        if op.is_some() {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }

        let cycles = match op {
            Some(Op::Read(address)) => {
                let value = bus.read(address);
                self.reads.push((address, value));
                ACCESS_CYCLES
            }
            Some(Op::Write(address, value)) => {
                bus.write(address, value);
                ACCESS_CYCLES
            }
            Some(Op::IoWrite(port, value)) => {
                bus.io_write(port, value);
                ACCESS_CYCLES
            }
            Some(Op::Idle(cycles)) => cycles.max(1),
            Some(Op::LoadHl(value)) => {
                self.regs.hl = value;
                ACCESS_CYCLES
            }
            Some(Op::EnableInterrupts) => {
                self.interrupts_enabled = true;
                ACCESS_CYCLES
            }
            None => ACCESS_CYCLES,
        };

        self.cycles += u64::from(cycles);
        cycles
    }

    fn pc(&self) -> u32 {
        self.regs.pc
    }

    fn registers(&self) -> ScriptedRegisters {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.queue.is_empty()
    }

    fn interrupt(&mut self) -> bool {
        if !self.interrupts_enabled {
            return false;
        }
        self.interrupts_enabled = false;
        self.interrupts_taken += 1;
        let handler = self.irq_handler.clone();
        self.push_handler(&handler);
        true
    }

    fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    fn reset(&mut self) {
        self.queue = self.program.iter().copied().collect();
        self.regs = ScriptedRegisters::default();
        self.nmi_pending = false;
        self.interrupts_enabled = true;
    }
}
