//! MBC5 (Memory Bank Controller 5)
//!
//! Supports up to 8MB ROM and 128KB RAM. Unlike MBC1/MBC3, ROM bank 0 can be
//! mapped at `$4000-$7FFF`.
//!
//! # Register Map
//!
//! - 0x0000-0x1FFF: RAM Enable (0x_A enables)
//! - 0x2000-0x2FFF: ROM Bank Number (lower 8 bits)
//! - 0x3000-0x3FFF: ROM Bank Number (bit 8)
//! - 0x4000-0x5FFF: RAM Bank Number (4 bits)

use super::Banks;

#[derive(Debug)]
pub struct Mbc5 {
    pub(super) banks: Banks,
    ram_enabled: bool,
    /// 9-bit ROM bank
    rom_bank: u16,
    ram_bank: u8,
}

impl Mbc5 {
    pub fn new(banks: Banks) -> Self {
        Self {
            banks,
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
        }
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        let bank = if addr < 0x4000 {
            0
        } else {
            self.rom_bank as usize
        };
        self.banks.read_rom(bank, addr)
    }

    pub fn write_rom(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = val & 0x0F == 0x0A,
            0x2000..=0x2FFF => self.rom_bank = (self.rom_bank & 0x100) | val as u16,
            0x3000..=0x3FFF => self.rom_bank = (self.rom_bank & 0xFF) | ((val as u16 & 1) << 8),
            0x4000..=0x5FFF => self.ram_bank = val & 0x0F,
            _ => {}
        }
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        self.banks.read_ram(self.ram_bank as usize, addr)
    }

    pub fn write_ram(&mut self, addr: u16, val: u8) {
        if self.ram_enabled {
            self.banks.write_ram(self.ram_bank as usize, addr, val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_bank_0_selectable() {
        let mut rom = vec![0; 0x10000];
        for bank in 0..4 {
            rom[bank * 0x4000] = 0x10 + bank as u8;
        }
        let mut mbc = Mbc5::new(Banks::new(rom, vec![]));

        assert_eq!(mbc.read_rom(0x4000), 0x11);
        mbc.write_rom(0x2000, 0);
        assert_eq!(mbc.read_rom(0x4000), 0x10);
        mbc.write_rom(0x2000, 3);
        assert_eq!(mbc.read_rom(0x4000), 0x13);
    }

    #[test]
    fn test_9bit_rom_banking() {
        let mut rom = vec![0; 512 * 0x4000]; // 8MB
        rom[0x100 * 0x4000] = 0xAA;
        rom[0x1FF * 0x4000] = 0xBB;
        let mut mbc = Mbc5::new(Banks::new(rom, vec![]));

        mbc.write_rom(0x2000, 0x00);
        mbc.write_rom(0x3000, 0x01);
        assert_eq!(mbc.read_rom(0x4000), 0xAA);

        mbc.write_rom(0x2000, 0xFF);
        assert_eq!(mbc.read_rom(0x4000), 0xBB);

        // Low byte write keeps bit 8
        mbc.write_rom(0x2000, 0x00);
        assert_eq!(mbc.read_rom(0x4000), 0xAA);
    }

    #[test]
    fn test_ram_banking_wraps() {
        let mut ram = vec![0; 0x8000]; // 4 banks
        for bank in 0..4 {
            ram[bank * 0x2000] = bank as u8;
        }
        let mut mbc = Mbc5::new(Banks::new(vec![0; 0x8000], ram));

        assert_eq!(mbc.read_ram(0xA000), 0xFF);
        mbc.write_rom(0x0000, 0x0A);

        mbc.write_rom(0x4000, 3);
        assert_eq!(mbc.read_ram(0xA000), 3);
        mbc.write_rom(0x4000, 5);
        assert_eq!(mbc.read_ram(0xA000), 1);
    }

    #[test]
    fn test_ram_enable_gates_writes() {
        let mut mbc = Mbc5::new(Banks::new(vec![0; 0x8000], vec![0; 0x2000]));
        mbc.write_ram(0xA000, 0x42);
        mbc.write_rom(0x0000, 0x0A);
        assert_eq!(mbc.read_ram(0xA000), 0x00);
        mbc.write_ram(0xA000, 0x42);
        assert_eq!(mbc.read_ram(0xA000), 0x42);
    }
}
