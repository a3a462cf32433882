//! Memory and I/O bus interface.

/// Value returned by reads nothing on the board drives.
///
/// The data bus on these boards has pull-ups, so undriven reads float
/// high.
pub const OPEN_BUS: u8 = 0xFF;

/// Memory and I/O bus interface.
///
/// A CPU sees its board only through this trait. Each board implements
/// one adapter per CPU, because every processor decodes its own address
/// map over the shared hardware.
pub trait Bus {
    /// Read a byte from the given memory address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given memory address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from an I/O port. Boards without port-mapped devices
    /// leave this floating.
    fn io_read(&mut self, port: u16) -> u8 {
        let _ = port;
        OPEN_BUS
    }

    /// Write a byte to an I/O port.
    fn io_write(&mut self, port: u16, value: u8) {
        let _ = (port, value);
    }
}
