use emu_core::Cpu;

/// The Z80 as the Mr. Do! board sees it.
///
/// Boards without the PAL answer the protection read with the ROM byte
/// at HL, so the board needs HL as well as the bus.
pub trait MainCpu: Cpu {
    /// Current HL register pair.
    fn hl(&self) -> u16;
}

#[cfg(any(test, feature = "test-utils"))]
impl MainCpu for emu_core::testing::ScriptedCpu {
    fn hl(&self) -> u16 {
        self.registers().hl
    }
}
