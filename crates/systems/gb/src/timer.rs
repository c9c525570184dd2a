//! Game Boy Timer implementation
//!
//! # Timer Registers
//!
//! - `$FF04 (DIV)`: Divider register - upper byte of the 16-bit system counter, write resets it
//! - `$FF05 (TIMA)`: Timer counter - increments at the rate selected by TAC
//! - `$FF06 (TMA)`: Timer modulo - loaded into TIMA on overflow
//! - `$FF07 (TAC)`: Timer control
//!   - Bit 2: Timer enable (0=stop, 1=run)
//!   - Bits 1-0: Clock select
//!     - 00: 4096 Hz (CPU clock / 1024)
//!     - 01: 262144 Hz (CPU clock / 16)
//!     - 10: 65536 Hz (CPU clock / 64)
//!     - 11: 16384 Hz (CPU clock / 256)
//!
//! # Implementation
//!
//! TIMA increments on each falling edge of one bit of the system counter
//! (bit 9, 3, 5 or 7 depending on the clock select). Resetting DIV while that
//! bit is high therefore produces an extra TIMA increment, as on hardware.

use crate::io::IoDevice;
use crate::memory_map::{DIV, TAC, TIMA, TMA};

/// System counter bit watched for each TAC clock select
const TAC_BITS: [u32; 4] = [9, 3, 5, 7];

/// Game Boy Timer
#[derive(Debug, Clone, Default)]
pub struct Timer {
    /// 16-bit system counter, DIV is its upper byte
    counter: u16,
    tima: u8,
    tma: u8,
    /// Lower 3 bits of TAC
    tac: u8,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    fn enabled(&self) -> bool {
        self.tac & 0x04 != 0
    }

    fn watched_bit(&self) -> u32 {
        TAC_BITS[(self.tac & 0x03) as usize]
    }

    /// Increment TIMA; returns true on overflow (TIMA reloaded from TMA)
    fn increment_tima(&mut self) -> bool {
        let (next, overflow) = self.tima.overflowing_add(1);
        self.tima = if overflow { self.tma } else { next };
        overflow
    }

    /// Advance by `cycles` CPU cycles.
    ///
    /// Returns true if TIMA overflowed and a timer interrupt should be requested.
    pub fn step(&mut self, cycles: u32) -> bool {
        let start = self.counter as u32;
        let end = start + cycles;
        self.counter = end as u16;

        if !self.enabled() {
            return false;
        }

        // Falling edges of bit n happen once every 2^(n+1) cycles
        let shift = self.watched_bit() + 1;
        let edges = (end >> shift) - (start >> shift);
        let mut interrupt = false;
        for _ in 0..edges {
            interrupt |= self.increment_tima();
        }
        interrupt
    }

    pub fn div(&self) -> u8 {
        (self.counter >> 8) as u8
    }
}

impl IoDevice for Timer {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            DIV => self.div(),
            TIMA => self.tima,
            TMA => self.tma,
            TAC => self.tac | 0xF8, // Upper 5 bits always read as 1
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match addr {
            DIV => {
                let falling = self.enabled() && (self.counter >> self.watched_bit()) & 1 != 0;
                self.counter = 0;
                if falling {
                    self.increment_tima();
                }
            }
            TIMA => self.tima = val,
            TMA => self.tma = val,
            TAC => self.tac = val & 0x07,
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
