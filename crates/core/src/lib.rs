//! Core emulator primitives and traits.
//!
//! Reusable pieces shared by the handheld system crate: the [`Memory`] bus
//! trait, the [`logging`] facility, and the audio building blocks in [`apu`].

pub mod apu;
pub mod logging;

/// A CPU-visible 16-bit address space.
///
/// Implementors decode every address in `0x0000..=0xFFFF`. Composite 16-bit
/// accesses are little-endian and built from two byte accesses, low byte first.
pub trait Memory {
    /// Read a byte from the bus
    fn read(&self, addr: u16) -> u8;

    /// Write a byte to the bus
    fn write(&mut self, addr: u16, val: u8);

    /// Inspect a byte without side effects (debuggers, tracers).
    fn peek(&self, addr: u16) -> u8 {
        self.read(addr)
    }

    fn read16(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn write16(&mut self, addr: u16, val: u16) {
        self.write(addr, (val & 0xFF) as u8);
        self.write(addr.wrapping_add(1), (val >> 8) as u8);
    }
}
