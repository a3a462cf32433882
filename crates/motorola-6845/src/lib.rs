//! Motorola 6845 CRT Controller.
//!
//! The 6845 generates display timing: memory addresses (MA0-13) for the
//! character being displayed, the row address within the character
//! (RA0-4), and horizontal and vertical sync. It does not fetch or draw
//! anything itself; the board uses MA/RA to address its video RAM.
//!
//! # Registers
//!
//! | Reg | Name                 | Bits | Access |
//! |-----|----------------------|------|--------|
//! | R0  | Horizontal total - 1 | 8    | W      |
//! | R1  | Horizontal displayed | 8    | W      |
//! | R2  | HSYNC position       | 8    | W      |
//! | R3  | Sync widths (V:H)    | 4:4  | W      |
//! | R4  | Vertical total - 1   | 7    | W      |
//! | R5  | Vertical adjust      | 5    | W      |
//! | R6  | Vertical displayed   | 7    | W      |
//! | R7  | VSYNC position       | 7    | W      |
//! | R8  | Interlace and skew   | 8    | W      |
//! | R9  | Max scan line        | 5    | W      |
//! | R10 | Cursor start         | 7    | W      |
//! | R11 | Cursor end           | 5    | W      |
//! | R12 | Start address (H)    | 6    | W      |
//! | R13 | Start address (L)    | 8    | W      |
//! | R14 | Cursor (H)           | 6    | R/W    |
//! | R15 | Cursor (L)           | 8    | R/W    |
//! | R16 | Light pen (H)        | 6    | R      |
//! | R17 | Light pen (L)        | 8    | R      |
//!
//! Boards that never read the chip back get the stored values from
//! [`Crtc6845::register`].
//!
//! # Timing
//!
//! [`Crtc6845::tick`] advances one character clock. HSYNC rises at the
//! character where the horizontal counter equals R2 and lasts R3\[3:0\]
//! characters (zero means no HSYNC). VSYNC rises at the first scan line of
//! character row R7 and lasts R3\[7:4\] scan lines (zero means 16). After
//! R4 + 1 rows and R5 adjust lines a new frame starts and MA reloads from
//! R12:R13.
//!
//! Interlace (R8) and light pen strobes are not modelled; their registers
//! are stored so software can read back what it wrote.

use emu_core::{Observable, Tickable, Value};
use log::debug;

/// Number of addressable registers.
pub const REGISTER_COUNT: usize = 18;

/// Bits implemented in each register.
const WRITE_MASK: [u8; REGISTER_COUNT] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0x7F, 0x1F, 0x7F, 0x7F, 0xF3, 0x1F, 0x7F, 0x1F, 0x3F, 0xFF, 0x3F, 0xFF,
    0x3F, 0xFF,
];

const R0_HTOTAL: usize = 0;
const R1_HDISPLAYED: usize = 1;
const R2_HSYNC_POS: usize = 2;
const R3_SYNC_WIDTH: usize = 3;
const R4_VTOTAL: usize = 4;
const R5_VADJUST: usize = 5;
const R6_VDISPLAYED: usize = 6;
const R7_VSYNC_POS: usize = 7;
const R9_MAX_SCAN: usize = 9;
const R12_START_HI: usize = 12;
const R13_START_LO: usize = 13;
const R14_CURSOR_HI: usize = 14;
const R15_CURSOR_LO: usize = 15;

/// MA is 14 bits wide.
const MA_MASK: u16 = 0x3FFF;

/// Motorola 6845 CRT Controller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crtc6845 {
    regs: [u8; REGISTER_COUNT],
    /// Register selected by the address register.
    selected: u8,

    /// Character within the current line.
    hcount: u8,
    /// Scan line within the current character row.
    row_scan: u8,
    /// Character row within the frame.
    row: u8,
    /// Scan line within the vertical adjust period, if in it.
    adjust_line: Option<u8>,
    /// MA at the first character of the current row.
    line_address: u16,

    hsync: bool,
    hsync_left: u8,
    vsync: bool,
    vsync_left: u8,

    /// MA sampled at the last HSYNC rising edge, until taken.
    hsync_edge: Option<u16>,
    frame_complete: bool,
    frames: u64,
}

impl Default for Crtc6845 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crtc6845 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: [0; REGISTER_COUNT],
            selected: 0,
            hcount: 0,
            row_scan: 0,
            row: 0,
            adjust_line: None,
            line_address: 0,
            hsync: false,
            hsync_left: 0,
            vsync: false,
            vsync_left: 0,
            hsync_edge: None,
            frame_complete: false,
            frames: 0,
        }
    }

    /// Select the register the data port accesses.
    pub fn write_address(&mut self, value: u8) {
        self.selected = value & 0x1F;
    }

    /// Write the selected register.
    pub fn write_data(&mut self, value: u8) {
        let index = usize::from(self.selected);
        match WRITE_MASK.get(index) {
            Some(&mask) => self.regs[index] = value & mask,
            None => debug!("6845: write {value:#04X} to missing register R{index}"),
        }
    }

    /// Current register value, regardless of readability.
    #[must_use]
    pub fn register(&self, index: usize) -> u8 {
        self.regs.get(index).copied().unwrap_or(0)
    }

    /// Memory address of the current character.
    #[must_use]
    pub fn ma(&self) -> u16 {
        self.line_address.wrapping_add(u16::from(self.hcount)) & MA_MASK
    }

    /// Row address (scan line within the character row).
    #[must_use]
    pub fn ra(&self) -> u8 {
        if self.adjust_line.is_some() {
            0
        } else {
            self.row_scan
        }
    }

    #[must_use]
    pub fn hsync(&self) -> bool {
        self.hsync
    }

    #[must_use]
    pub fn vsync(&self) -> bool {
        self.vsync
    }

    /// True while the beam is inside the displayed area.
    #[must_use]
    pub fn display_enabled(&self) -> bool {
        self.adjust_line.is_none()
            && self.hcount < self.regs[R1_HDISPLAYED]
            && self.row < self.regs[R6_VDISPLAYED]
    }

    /// Cursor address from R14:R15.
    #[must_use]
    pub fn cursor_address(&self) -> u16 {
        u16::from_be_bytes([self.regs[R14_CURSOR_HI], self.regs[R15_CURSOR_LO]])
    }

    /// Display start address from R12:R13.
    #[must_use]
    pub fn start_address(&self) -> u16 {
        u16::from_be_bytes([self.regs[R12_START_HI], self.regs[R13_START_LO]])
    }

    /// MA at the most recent HSYNC rising edge, cleared by the call.
    pub fn take_hsync_edge(&mut self) -> Option<u16> {
        self.hsync_edge.take()
    }

    /// True once per completed frame, cleared by the call.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Character clocks in one frame with the current register values.
    #[must_use]
    pub fn characters_per_frame(&self) -> u64 {
        let per_line = u64::from(self.regs[R0_HTOTAL]) + 1;
        let rows = u64::from(self.regs[R4_VTOTAL]) + 1;
        let scans = u64::from(self.regs[R9_MAX_SCAN]) + 1;
        let lines = rows * scans + u64::from(self.regs[R5_VADJUST]);
        per_line * lines
    }

    /// Restart the counters and drop both syncs. Registers and the
    /// address register keep their values.
    pub fn reset(&mut self) {
        *self = Self {
            regs: self.regs,
            selected: self.selected,
            ..Self::new()
        };
    }

    fn hsync_width(&self) -> u8 {
        self.regs[R3_SYNC_WIDTH] & 0x0F
    }

    fn vsync_width(&self) -> u8 {
        match self.regs[R3_SYNC_WIDTH] >> 4 {
            0 => 16,
            width => width,
        }
    }

    fn end_of_line(&mut self) {
        if self.vsync {
            self.vsync_left -= 1;
            if self.vsync_left == 0 {
                self.vsync = false;
            }
        }

        if let Some(line) = self.adjust_line {
            let line = line + 1;
            if line >= self.regs[R5_VADJUST] {
                self.start_frame();
            } else {
                self.adjust_line = Some(line);
            }
        } else if self.row_scan >= self.regs[R9_MAX_SCAN] {
            self.row_scan = 0;
            self.line_address = self
                .line_address
                .wrapping_add(u16::from(self.regs[R1_HDISPLAYED]))
                & MA_MASK;
            if self.row >= self.regs[R4_VTOTAL] {
                if self.regs[R5_VADJUST] == 0 {
                    self.start_frame();
                } else {
                    self.adjust_line = Some(0);
                }
            } else {
                self.row += 1;
            }
        } else {
            self.row_scan += 1;
        }

        self.start_vsync_if_due();
    }

    /// Raise VSYNC on the first scan line of row R7.
    fn start_vsync_if_due(&mut self) {
        if self.adjust_line.is_none()
            && !self.vsync
            && self.row_scan == 0
            && self.row == self.regs[R7_VSYNC_POS]
        {
            self.vsync = true;
            self.vsync_left = self.vsync_width();
        }
    }

    fn start_frame(&mut self) {
        self.row = 0;
        self.row_scan = 0;
        self.adjust_line = None;
        self.line_address = self.start_address() & MA_MASK;
        self.frame_complete = true;
        self.frames += 1;
    }
}

impl Tickable for Crtc6845 {
    /// Advance one character clock.
    fn tick(&mut self) {
        // The power-on line has no end of line before it.
        if self.hcount == 0 {
            self.start_vsync_if_due();
        }
        if self.hsync {
            self.hsync_left -= 1;
            if self.hsync_left == 0 {
                self.hsync = false;
            }
        }
        if !self.hsync && self.hcount == self.regs[R2_HSYNC_POS] && self.hsync_width() > 0 {
            self.hsync = true;
            self.hsync_left = self.hsync_width();
            self.hsync_edge = Some(self.ma());
        }

        if self.hcount >= self.regs[R0_HTOTAL] {
            self.hcount = 0;
            self.end_of_line();
        } else {
            self.hcount += 1;
        }
    }
}

impl Observable for Crtc6845 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "ma" => Some(self.ma().into()),
            "ra" => Some(self.ra().into()),
            "hsync" => Some(self.hsync().into()),
            "vsync" => Some(self.vsync.into()),
            "display" => Some(self.display_enabled().into()),
            "hcount" => Some(self.hcount.into()),
            "row" => Some(self.row.into()),
            "frames" => Some(self.frames.into()),
            _ => {
                let index: usize = path.strip_prefix('r')?.parse().ok()?;
                self.regs.get(index).map(|&v| v.into())
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ma", "ra", "hsync", "vsync", "display", "hcount", "row", "frames", "r0", "r1", "r2",
            "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
            "r16", "r17",
        ]
    }
}
