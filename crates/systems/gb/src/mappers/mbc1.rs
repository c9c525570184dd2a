//! MBC1 (Memory Bank Controller 1)
//!
//! Supports up to 2MB ROM and 32KB RAM with banking.
//!
//! # Banking Modes
//!
//! - Mode 0: bank 0 fixed at `$0000-$3FFF`, RAM bank 0 only
//! - Mode 1: the 2-bit register also selects bank 0/32/64/96 for
//!   `$0000-$3FFF` and the RAM bank
//!
//! # Register Map
//!
//! - 0x0000-0x1FFF: RAM Enable (0x_A enables)
//! - 0x2000-0x3FFF: ROM Bank Number (lower 5 bits, 0 reads as 1)
//! - 0x4000-0x5FFF: RAM Bank Number / ROM Bank Number (upper 2 bits)
//! - 0x6000-0x7FFF: Banking Mode Select

use super::Banks;

#[derive(Debug)]
pub struct Mbc1 {
    pub(super) banks: Banks,
    ram_enabled: bool,
    rom_bank: u8,
    /// 2-bit secondary register
    upper: u8,
    mode: u8,
}

impl Mbc1 {
    pub fn new(banks: Banks) -> Self {
        Self {
            banks,
            ram_enabled: false,
            rom_bank: 1,
            upper: 0,
            mode: 0,
        }
    }

    fn lower_rom_bank(&self) -> usize {
        if self.mode == 1 {
            (self.upper as usize) << 5
        } else {
            0
        }
    }

    fn upper_rom_bank(&self) -> usize {
        let low = match self.rom_bank & 0x1F {
            0 => 1,
            bank => bank as usize,
        };
        low | ((self.upper as usize) << 5)
    }

    fn ram_bank(&self) -> usize {
        if self.mode == 1 {
            self.upper as usize
        } else {
            0
        }
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        let bank = if addr < 0x4000 {
            self.lower_rom_bank()
        } else {
            self.upper_rom_bank()
        };
        self.banks.read_rom(bank, addr)
    }

    pub fn write_rom(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = val & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.rom_bank = val & 0x1F,
            0x4000..=0x5FFF => self.upper = val & 0x03,
            0x6000..=0x7FFF => self.mode = val & 0x01,
            _ => {}
        }
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        self.banks.read_ram(self.ram_bank(), addr)
    }

    pub fn write_ram(&mut self, addr: u16, val: u8) {
        if self.ram_enabled {
            self.banks.write_ram(self.ram_bank(), addr, val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ROM with each bank's first byte set to its number
    fn marked_rom(banks: usize) -> Vec<u8> {
        let mut rom = vec![0; banks * 0x4000];
        for bank in 0..banks {
            rom[bank * 0x4000] = bank as u8;
        }
        rom
    }

    #[test]
    fn test_rom_banking() {
        let mut mbc = Mbc1::new(Banks::new(marked_rom(32), vec![]));

        assert_eq!(mbc.read_rom(0x0000), 0);
        assert_eq!(mbc.read_rom(0x4000), 1);

        mbc.write_rom(0x2000, 5);
        assert_eq!(mbc.read_rom(0x4000), 5);

        // Bank 0 is not selectable, maps to bank 1
        mbc.write_rom(0x2000, 0);
        assert_eq!(mbc.read_rom(0x4000), 1);

        mbc.write_rom(0x2000, 0x1F);
        assert_eq!(mbc.read_rom(0x4000), 31);
    }

    #[test]
    fn test_upper_rom_bits() {
        let mut mbc = Mbc1::new(Banks::new(marked_rom(128), vec![]));
        mbc.write_rom(0x2000, 1);

        for (upper, bank) in [(1, 33), (2, 65), (3, 97)] {
            mbc.write_rom(0x4000, upper);
            assert_eq!(mbc.read_rom(0x4000), bank);
        }
    }

    #[test]
    fn test_mode_1_remaps_bank_0() {
        let mut mbc = Mbc1::new(Banks::new(marked_rom(128), vec![]));

        mbc.write_rom(0x4000, 1);
        assert_eq!(mbc.read_rom(0x0000), 0);

        mbc.write_rom(0x6000, 1);
        assert_eq!(mbc.read_rom(0x0000), 32);

        mbc.write_rom(0x4000, 2);
        assert_eq!(mbc.read_rom(0x0000), 64);
    }

    #[test]
    fn test_bank_wraps_to_rom_size() {
        let mut mbc = Mbc1::new(Banks::new(marked_rom(8), vec![]));
        mbc.write_rom(0x2000, 9);
        assert_eq!(mbc.read_rom(0x4000), 1);
    }

    #[test]
    fn test_ram_enable() {
        let mut mbc = Mbc1::new(Banks::new(vec![0; 0x8000], vec![0; 0x2000]));

        assert_eq!(mbc.read_ram(0xA000), 0xFF);
        mbc.write_rom(0x0000, 0x0A);
        mbc.write_ram(0xA000, 0x42);
        assert_eq!(mbc.read_ram(0xA000), 0x42);

        // Disabled: reads float, writes dropped
        mbc.write_rom(0x0000, 0x00);
        mbc.write_ram(0xA000, 0x99);
        assert_eq!(mbc.read_ram(0xA000), 0xFF);

        mbc.write_rom(0x0000, 0x0A);
        assert_eq!(mbc.read_ram(0xA000), 0x42);
    }

    #[test]
    fn test_ram_banking() {
        let mut ram = vec![0; 0x8000];
        for bank in 0..4 {
            ram[bank * 0x2000] = bank as u8;
        }
        let mut mbc = Mbc1::new(Banks::new(vec![0; 0x8000], ram));
        mbc.write_rom(0x0000, 0x0A);

        // Mode 0 pins RAM bank 0
        mbc.write_rom(0x4000, 1);
        assert_eq!(mbc.read_ram(0xA000), 0);

        mbc.write_rom(0x6000, 1);
        for bank in 0..4 {
            mbc.write_rom(0x4000, bank);
            assert_eq!(mbc.read_ram(0xA000), bank);
        }
    }

    #[test]
    fn test_no_ram() {
        let mut mbc = Mbc1::new(Banks::new(vec![0; 0x8000], vec![]));
        mbc.write_rom(0x0000, 0x0A);
        mbc.write_ram(0xA000, 0x42);
        assert_eq!(mbc.read_ram(0xA000), 0xFF);
    }
}
