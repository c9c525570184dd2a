//! Cartridge without a bank controller.
//!
//! 32KB of ROM mapped directly, plus up to 8KB of RAM on the few boards that
//! carry it. Writes to the ROM range are ignored.

use super::Banks;

#[derive(Debug)]
pub struct RomOnly {
    pub(super) banks: Banks,
}

impl RomOnly {
    pub fn new(banks: Banks) -> Self {
        Self { banks }
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        let bank = if addr < 0x4000 { 0 } else { 1 };
        self.banks.read_rom(bank, addr)
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        self.banks.read_ram(0, addr)
    }

    pub fn write_ram(&mut self, addr: u16, val: u8) {
        self.banks.write_ram(0, addr, val);
    }
}
