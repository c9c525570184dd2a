//! LCD controller register file (`$FF40-$FF4B`)
//!
//! Only the CPU-visible registers are modelled; there is no pixel pipeline.
//! `$FF46` (DMA) sits inside this block but is owned by the OAM DMA unit.

use crate::io::IoDevice;

const LCDC: u16 = 0xFF40;
const STAT: u16 = 0xFF41;
const SCY: u16 = 0xFF42;
const SCX: u16 = 0xFF43;
const LY: u16 = 0xFF44;
const LYC: u16 = 0xFF45;
const BGP: u16 = 0xFF47;
const OBP0: u16 = 0xFF48;
const OBP1: u16 = 0xFF49;
const WY: u16 = 0xFF4A;
const WX: u16 = 0xFF4B;

/// STAT bits 6-3 are writable; 2-0 are driven by the LCD.
const STAT_WRITABLE: u8 = 0x78;

#[derive(Debug, Clone)]
pub struct Ppu {
    /// LCD Control (0xFF40)
    pub lcdc: u8,
    /// LCD Status (0xFF41)
    pub stat: u8,
    /// Scroll Y (0xFF42)
    pub scy: u8,
    /// Scroll X (0xFF43)
    pub scx: u8,
    /// LY (LCD Y coordinate, 0xFF44), read-only from the bus
    pub ly: u8,
    /// LY Compare (0xFF45)
    pub lyc: u8,
    /// BG Palette (0xFF47)
    pub bgp: u8,
    /// OBJ Palette 0 (0xFF48)
    pub obp0: u8,
    /// OBJ Palette 1 (0xFF49)
    pub obp1: u8,
    /// Window Y (0xFF4A)
    pub wy: u8,
    /// Window X (0xFF4B)
    pub wx: u8,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            lcdc: 0,
            stat: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            wy: 0,
            wx: 0,
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDevice for Ppu {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            LCDC => self.lcdc,
            STAT => self.stat | 0x80,
            SCY => self.scy,
            SCX => self.scx,
            LY => self.ly,
            LYC => self.lyc,
            BGP => self.bgp,
            OBP0 => self.obp0,
            OBP1 => self.obp1,
            WY => self.wy,
            WX => self.wx,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match addr {
            LCDC => self.lcdc = val,
            STAT => self.stat = (self.stat & !STAT_WRITABLE) | (val & STAT_WRITABLE),
            SCY => self.scy = val,
            SCX => self.scx = val,
            LYC => self.lyc = val,
            BGP => self.bgp = val,
            OBP0 => self.obp0 = val,
            OBP1 => self.obp1 = val,
            WY => self.wy = val,
            WX => self.wx = val,
            // LY is read-only
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_round_trip() {
        let mut ppu = Ppu::new();
        for (addr, val) in [
            (LCDC, 0x91),
            (SCY, 0x12),
            (SCX, 0x34),
            (LYC, 0x90),
            (BGP, 0xFC),
            (OBP0, 0xE4),
            (OBP1, 0x1B),
            (WY, 0x40),
            (WX, 0x07),
        ] {
            ppu.write(addr, val);
            assert_eq!(ppu.read(addr), val, "register {:04X}", addr);
        }
    }

    #[test]
    fn test_ly_is_read_only() {
        let mut ppu = Ppu::new();
        ppu.ly = 0x45;
        ppu.write(LY, 0x00);
        assert_eq!(ppu.read(LY), 0x45);
    }

    #[test]
    fn test_stat_masks() {
        let mut ppu = Ppu::new();
        ppu.stat = 0x03; // mode bits set by the LCD
        ppu.write(STAT, 0xFF);
        assert_eq!(ppu.read(STAT), 0xFB);
        ppu.write(STAT, 0x00);
        assert_eq!(ppu.read(STAT), 0x83);
    }

    #[test]
    fn test_reset_clears_registers() {
        let mut ppu = Ppu::new();
        ppu.write(LCDC, 0x91);
        ppu.ly = 10;
        ppu.reset();
        assert_eq!(ppu.read(LCDC), 0);
        assert_eq!(ppu.read(LY), 0);
    }
}
