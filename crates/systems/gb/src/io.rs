//! Memory-mapped peripheral interface.

/// A peripheral that owns a set of I/O port addresses.
///
/// Addresses passed in are full bus addresses (e.g. `0xFF05`); the address
/// space only forwards addresses the device owns.
pub trait IoDevice {
    /// Read a register. Must not advance the device's timing state.
    fn read(&self, addr: u16) -> u8;

    /// Write a register
    fn write(&mut self, addr: u16, val: u8);

    /// Return to power-on state
    fn reset(&mut self);
}
