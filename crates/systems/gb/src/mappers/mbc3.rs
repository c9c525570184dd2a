//! MBC3 (Memory Bank Controller 3)
//!
//! Supports up to 2MB ROM and 32KB RAM. The real-time clock is not emulated:
//! its registers hold whatever was last written and latching is a no-op.
//!
//! # Register Map
//!
//! - 0x0000-0x1FFF: RAM and Timer Enable (0x_A enables)
//! - 0x2000-0x3FFF: ROM Bank Number (7 bits, 0 reads as 1)
//! - 0x4000-0x5FFF: RAM Bank Number (0-3) or RTC Register Select (0x08-0x0C)
//! - 0x6000-0x7FFF: Latch Clock Data (0x00 then 0x01)

use super::Banks;
use dmg_core::logging::{log, LogCategory, LogLevel};

const RTC_FIRST: u8 = 0x08;
const RTC_LAST: u8 = 0x0C;

#[derive(Debug)]
pub struct Mbc3 {
    pub(super) banks: Banks,
    ram_rtc_enabled: bool,
    rom_bank: u8,
    /// RAM bank or RTC register selector
    select: u8,
    /// Seconds, minutes, hours, day low, day high/flags
    rtc: [u8; 5],
    last_latch_write: u8,
}

impl Mbc3 {
    pub fn new(banks: Banks) -> Self {
        Self {
            banks,
            ram_rtc_enabled: false,
            rom_bank: 1,
            select: 0,
            rtc: [0; 5],
            last_latch_write: 0xFF,
        }
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        let bank = if addr < 0x4000 {
            0
        } else {
            self.rom_bank.max(1) as usize
        };
        self.banks.read_rom(bank, addr)
    }

    pub fn write_rom(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_rtc_enabled = val & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.rom_bank = val & 0x7F,
            0x4000..=0x5FFF => self.select = val & 0x0F,
            0x6000..=0x7FFF => {
                if self.last_latch_write == 0x00 && val == 0x01 {
                    log(LogCategory::Stubs, LogLevel::Debug, || {
                        "MBC3 clock latch ignored, RTC not emulated".to_string()
                    });
                }
                self.last_latch_write = val;
            }
            _ => {}
        }
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_rtc_enabled {
            return 0xFF;
        }
        match self.select {
            0x00..=0x03 => self.banks.read_ram(self.select as usize, addr),
            RTC_FIRST..=RTC_LAST => self.rtc[(self.select - RTC_FIRST) as usize],
            _ => 0xFF,
        }
    }

    pub fn write_ram(&mut self, addr: u16, val: u8) {
        if !self.ram_rtc_enabled {
            return;
        }
        match self.select {
            0x00..=0x03 => self.banks.write_ram(self.select as usize, addr, val),
            RTC_FIRST..=RTC_LAST => {
                log(LogCategory::Stubs, LogLevel::Trace, || {
                    format!("MBC3 RTC register {:02X} = {:02X}", self.select, val)
                });
                self.rtc[(self.select - RTC_FIRST) as usize] = val;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_banking() {
        let mut rom = vec![0; 0x100000]; // 64 banks
        for bank in 0..64 {
            rom[bank * 0x4000] = bank as u8;
        }
        let mut mbc = Mbc3::new(Banks::new(rom, vec![]));

        assert_eq!(mbc.read_rom(0x0000), 0);
        assert_eq!(mbc.read_rom(0x4000), 1);

        mbc.write_rom(0x2000, 63);
        assert_eq!(mbc.read_rom(0x4000), 63);

        mbc.write_rom(0x2000, 0);
        assert_eq!(mbc.read_rom(0x4000), 1);
    }

    #[test]
    fn test_ram_banking() {
        let mut ram = vec![0; 0x8000];
        for bank in 0..4 {
            ram[bank * 0x2000] = bank as u8;
        }
        let mut mbc = Mbc3::new(Banks::new(vec![0; 0x8000], ram));

        assert_eq!(mbc.read_ram(0xA000), 0xFF);
        mbc.write_rom(0x0000, 0x0A);
        for bank in 0..4 {
            mbc.write_rom(0x4000, bank);
            assert_eq!(mbc.read_ram(0xA000), bank);
        }

        mbc.write_rom(0x4000, 2);
        mbc.write_ram(0xA001, 0x42);
        assert_eq!(mbc.read_ram(0xA001), 0x42);
    }

    #[test]
    fn test_rtc_registers_hold_values() {
        let mut mbc = Mbc3::new(Banks::new(vec![0; 0x8000], vec![]));
        mbc.write_rom(0x0000, 0x0A);

        for (reg, val) in [(0x08, 0x2A), (0x09, 0x1F), (0x0A, 0x17), (0x0B, 0xFF), (0x0C, 0x01)] {
            mbc.write_rom(0x4000, reg);
            mbc.write_ram(0xA000, val);
            assert_eq!(mbc.read_ram(0xA000), val, "RTC register {:02X}", reg);
        }

        // Latching changes nothing
        mbc.write_rom(0x6000, 0x00);
        mbc.write_rom(0x6000, 0x01);
        mbc.write_rom(0x4000, 0x08);
        assert_eq!(mbc.read_ram(0xA000), 0x2A);
    }

    #[test]
    fn test_unmapped_selector_reads_open_bus() {
        let mut mbc = Mbc3::new(Banks::new(vec![0; 0x8000], vec![0; 0x2000]));
        mbc.write_rom(0x0000, 0x0A);
        mbc.write_rom(0x4000, 0x05);
        mbc.write_ram(0xA000, 0x12);
        assert_eq!(mbc.read_ram(0xA000), 0xFF);
    }
}
