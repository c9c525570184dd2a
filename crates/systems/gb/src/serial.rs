//! Serial port (`$FF01 SB`, `$FF02 SC`)
//!
//! No link partner is emulated: an internally clocked transfer shifts in
//! 0xFF over 8 bits at 8192 Hz and then raises the serial interrupt.
//! Externally clocked transfers never complete.

use crate::io::IoDevice;
use crate::memory_map::{SB, SC};

/// 8 bits at 8192 Hz
const TRANSFER_CYCLES: u32 = 8 * 512;

const TRANSFER_START: u8 = 0x80;
const INTERNAL_CLOCK: u8 = 0x01;

#[derive(Debug, Clone, Default)]
pub struct Serial {
    data: u8,
    control: u8,
    elapsed: u32,
}

impl Serial {
    pub fn new() -> Self {
        Self::default()
    }

    fn transferring(&self) -> bool {
        self.control & (TRANSFER_START | INTERNAL_CLOCK) == TRANSFER_START | INTERNAL_CLOCK
    }

    /// Advance by `cycles`; returns true when a transfer completes.
    pub fn step(&mut self, cycles: u32) -> bool {
        if !self.transferring() {
            return false;
        }
        self.elapsed += cycles;
        if self.elapsed < TRANSFER_CYCLES {
            return false;
        }
        self.data = 0xFF;
        self.control &= !TRANSFER_START;
        self.elapsed = 0;
        true
    }
}

impl IoDevice for Serial {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            SB => self.data,
            SC => self.control | 0x7E,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match addr {
            SB => self.data = val,
            SC => {
                self.control = val & (TRANSFER_START | INTERNAL_CLOCK);
                self.elapsed = 0;
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
