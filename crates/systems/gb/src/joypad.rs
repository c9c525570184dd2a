//! Joypad register (P1, `$FF00`)
//!
//! - Bit 5: Select action buttons (0=select)
//! - Bit 4: Select direction keys (0=select)
//! - Bits 3-0: Input, active low (0=pressed)
//!
//! Bits 7-6 always read as 1.

use crate::io::IoDevice;

/// Button bits for [`Joypad::set_pressed`]
pub mod button {
    pub const RIGHT: u8 = 0x01;
    pub const LEFT: u8 = 0x02;
    pub const UP: u8 = 0x04;
    pub const DOWN: u8 = 0x08;
    pub const A: u8 = 0x10;
    pub const B: u8 = 0x20;
    pub const SELECT: u8 = 0x40;
    pub const START: u8 = 0x80;
}

#[derive(Debug, Clone)]
pub struct Joypad {
    /// P1 bits 5-4 as last written
    select: u8,
    /// Pressed buttons, 1 = pressed (see [`button`])
    pressed: u8,
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            select: 0x30,
            pressed: 0,
        }
    }

    /// Update the pressed button mask.
    ///
    /// Returns true if any button went from released to pressed, which
    /// raises the joypad interrupt.
    pub fn set_pressed(&mut self, pressed: u8) -> bool {
        let newly_pressed = pressed & !self.pressed;
        self.pressed = pressed;
        newly_pressed != 0
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDevice for Joypad {
    fn read(&self, _addr: u16) -> u8 {
        let mut lines = 0u8;
        if self.select & 0x10 == 0 {
            lines |= self.pressed & 0x0F;
        }
        if self.select & 0x20 == 0 {
            lines |= self.pressed >> 4;
        }
        0xC0 | self.select | (!lines & 0x0F)
    }

    fn write(&mut self, _addr: u16, val: u8) {
        self.select = val & 0x30;
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
