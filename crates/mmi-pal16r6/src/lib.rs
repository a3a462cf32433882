//! MMI PAL16R6 protection device replica.
//!
//! The PAL16R6 has eight inputs feeding a fuse-programmed AND array and six
//! registered outputs. Boards used read-protected parts as copy protection:
//! the CPU writes a byte somewhere the PAL can see it, the PAL latches a
//! function of that byte on the write strobe, and the game later reads the
//! registered outputs back and checks them.
//!
//! The fuse map of a protected part cannot be read directly. The tables
//! here are sum-of-products equations recovered from dumps, and they are
//! reproduced bit for bit: any deviation is a bug.
//!
//! # Pin mapping (Mr. Do! U001)
//!
//! | PAL input | Data bit |
//! |-----------|----------|
//! | I2        | D7       |
//! | I3        | D6       |
//! | I4        | D5       |
//! | I5        | D4       |
//! | I6        | D3       |
//! | I7        | D2 (not used by any product term) |
//! | I8        | D1       |
//! | I9        | D0       |
//!
//! Registered outputs R13..R18 land on data bits 1..6; bits 0 and 7 read
//! as logical zero. The latch stores the complement of the logical sum
//! because the registered outputs are active-low.

mod equations;
mod latch;

pub use equations::{EquationTable, MRDO_U001, ProductTerm, UNUSED_INPUT_MASK};
pub use latch::{POWER_ON_OUTPUT, ProtectionConfig, ProtectionError, ProtectionLatch};
