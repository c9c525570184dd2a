//! Game Boy Memory Bank Controllers (MBCs)
//!
//! A [`Mapper`] owns the cartridge ROM and external RAM and answers the bus
//! for `$0000-$7FFF` and `$A000-$BFFF`. Writes into the ROM range program the
//! controller's banking registers.

mod mbc1;
mod mbc3;
mod mbc5;
mod rom_only;

pub use mbc1::Mbc1;
pub use mbc3::Mbc3;
pub use mbc5::Mbc5;
pub use rom_only::RomOnly;

use crate::GbError;
use dmg_core::logging::{log, LogCategory, LogLevel};
use std::fs;
use std::path::{Path, PathBuf};

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;
const EXTERNAL_RAM: u16 = 0xA000;

/// ROM image and external RAM, addressed by bank
#[derive(Debug)]
pub struct Banks {
    rom: Vec<u8>,
    ram: Vec<u8>,
}

impl Banks {
    pub fn new(rom: Vec<u8>, ram: Vec<u8>) -> Self {
        Self { rom, ram }
    }

    pub fn rom_bank_count(&self) -> usize {
        self.rom.len().div_ceil(ROM_BANK_SIZE).max(1)
    }

    pub fn ram_bank_count(&self) -> usize {
        self.ram.len().div_ceil(RAM_BANK_SIZE).max(1)
    }

    /// Read `addr` (`$0000-$7FFF`) from ROM `bank`, wrapped to the image size
    pub fn read_rom(&self, bank: usize, addr: u16) -> u8 {
        let bank = bank % self.rom_bank_count();
        let offset = bank * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1));
        self.rom.get(offset).copied().unwrap_or(0xFF)
    }

    fn ram_offset(&self, bank: usize, addr: u16) -> usize {
        let bank = bank % self.ram_bank_count();
        bank * RAM_BANK_SIZE + (addr.wrapping_sub(EXTERNAL_RAM) as usize & (RAM_BANK_SIZE - 1))
    }

    /// Read `addr` (`$A000-$BFFF`) from RAM `bank`; 0xFF past the end
    pub fn read_ram(&self, bank: usize, addr: u16) -> u8 {
        let offset = self.ram_offset(bank, addr);
        self.ram.get(offset).copied().unwrap_or(0xFF)
    }

    pub fn write_ram(&mut self, bank: usize, addr: u16, val: u8) {
        let offset = self.ram_offset(bank, addr);
        if let Some(byte) = self.ram.get_mut(offset) {
            *byte = val;
        }
    }
}

/// Bank controller variants
#[derive(Debug)]
pub enum Mbc {
    RomOnly(RomOnly),
    Mbc1(Mbc1),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Mbc {
    fn banks(&self) -> &Banks {
        match self {
            Mbc::RomOnly(m) => &m.banks,
            Mbc::Mbc1(m) => &m.banks,
            Mbc::Mbc3(m) => &m.banks,
            Mbc::Mbc5(m) => &m.banks,
        }
    }

    fn banks_mut(&mut self) -> &mut Banks {
        match self {
            Mbc::RomOnly(m) => &mut m.banks,
            Mbc::Mbc1(m) => &mut m.banks,
            Mbc::Mbc3(m) => &mut m.banks,
            Mbc::Mbc5(m) => &mut m.banks,
        }
    }
}

/// Cartridge mapper attached to the address space
#[derive(Debug)]
pub struct Mapper {
    mbc: Mbc,
    /// Where battery-backed RAM is persisted, if anywhere
    save_path: Option<PathBuf>,
}

impl Mapper {
    /// Create a mapper from ROM data and cartridge type
    pub fn from_cart(rom: Vec<u8>, ram: Vec<u8>, cart_type: u8) -> Self {
        let banks = Banks::new(rom, ram);
        let mbc = match cart_type {
            0x00 | 0x08 | 0x09 => Mbc::RomOnly(RomOnly::new(banks)), // ROM (+RAM +BATTERY)
            0x01..=0x03 => Mbc::Mbc1(Mbc1::new(banks)),              // MBC1 (+RAM +BATTERY)
            0x0F..=0x13 => Mbc::Mbc3(Mbc3::new(banks)),              // MBC3 (+TIMER +RAM +BATTERY)
            0x19..=0x1E => Mbc::Mbc5(Mbc5::new(banks)),              // MBC5 (+RUMBLE +RAM +BATTERY)
            _ => {
                log(LogCategory::Cartridge, LogLevel::Warn, || {
                    format!("unsupported cartridge type {:02X}, running as plain ROM", cart_type)
                });
                Mbc::RomOnly(RomOnly::new(banks))
            }
        };
        Self {
            mbc,
            save_path: None,
        }
    }

    /// Persist external RAM to `path` on [`save_ram`](Self::save_ram)
    pub fn with_battery(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => match &self.mbc {
                Mbc::RomOnly(m) => m.read_rom(addr),
                Mbc::Mbc1(m) => m.read_rom(addr),
                Mbc::Mbc3(m) => m.read_rom(addr),
                Mbc::Mbc5(m) => m.read_rom(addr),
            },
            0xA000..=0xBFFF => match &self.mbc {
                Mbc::RomOnly(m) => m.read_ram(addr),
                Mbc::Mbc1(m) => m.read_ram(addr),
                Mbc::Mbc3(m) => m.read_ram(addr),
                Mbc::Mbc5(m) => m.read_ram(addr),
            },
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x7FFF => match &mut self.mbc {
                Mbc::RomOnly(_) => {}
                Mbc::Mbc1(m) => m.write_rom(addr, val),
                Mbc::Mbc3(m) => m.write_rom(addr, val),
                Mbc::Mbc5(m) => m.write_rom(addr, val),
            },
            0xA000..=0xBFFF => match &mut self.mbc {
                Mbc::RomOnly(m) => m.write_ram(addr, val),
                Mbc::Mbc1(m) => m.write_ram(addr, val),
                Mbc::Mbc3(m) => m.write_ram(addr, val),
                Mbc::Mbc5(m) => m.write_ram(addr, val),
            },
            _ => {}
        }
    }

    /// Get the controller name
    pub fn name(&self) -> &'static str {
        match self.mbc {
            Mbc::RomOnly(_) => "ROM",
            Mbc::Mbc1(_) => "MBC1",
            Mbc::Mbc3(_) => "MBC3",
            Mbc::Mbc5(_) => "MBC5",
        }
    }

    /// External RAM contents
    pub fn ram(&self) -> &[u8] {
        &self.mbc.banks().ram
    }

    /// Overwrite external RAM from a save image. Extra bytes are ignored and a
    /// short image leaves the remaining RAM untouched.
    pub fn load_ram(&mut self, data: &[u8]) {
        let ram = &mut self.mbc.banks_mut().ram;
        let len = data.len().min(ram.len());
        ram[..len].copy_from_slice(&data[..len]);
    }

    /// Flush external RAM to the battery save file.
    ///
    /// A no-op for cartridges without a battery or without RAM.
    pub fn save_ram(&self) -> Result<(), GbError> {
        let Some(path) = &self.save_path else {
            return Ok(());
        };
        if self.ram().is_empty() {
            return Ok(());
        }
        fs::write(path, self.ram()).map_err(|e| GbError::io(path, e))?;
        log(LogCategory::Cartridge, LogLevel::Info, || {
            format!("saved {} bytes of cartridge RAM to {}", self.ram().len(), path.display())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapper_from_cart_type() {
        for (cart_type, name) in [
            (0x00, "ROM"),
            (0x08, "ROM"),
            (0x01, "MBC1"),
            (0x02, "MBC1"),
            (0x03, "MBC1"),
            (0x0F, "MBC3"),
            (0x11, "MBC3"),
            (0x13, "MBC3"),
            (0x19, "MBC5"),
            (0x1B, "MBC5"),
            (0x1E, "MBC5"),
        ] {
            let mapper = Mapper::from_cart(vec![0; 0x8000], vec![], cart_type);
            assert_eq!(mapper.name(), name, "type {:02X}", cart_type);
        }
    }

    #[test]
    fn test_unknown_type_runs_as_rom() {
        let mapper = Mapper::from_cart(vec![0; 0x8000], vec![], 0x05);
        assert_eq!(mapper.name(), "ROM");
        let mapper = Mapper::from_cart(vec![0; 0x8000], vec![], 0xAA);
        assert_eq!(mapper.name(), "ROM");
    }

    #[test]
    fn test_mapper_delegation() {
        let mut rom = vec![0; 0x8000];
        rom[0] = 0xAA;
        rom[0x4000] = 0xBB;

        let mapper = Mapper::from_cart(rom, vec![], 0x00);

        assert_eq!(mapper.read(0x0000), 0xAA);
        assert_eq!(mapper.read(0x4000), 0xBB);
        assert_eq!(mapper.read(0xA000), 0xFF);
    }

    #[test]
    fn test_banks_wrap_and_pad() {
        let mut rom = vec![0; 0x8000];
        rom[0x4000] = 0x11;
        let banks = Banks::new(rom, vec![]);
        assert_eq!(banks.rom_bank_count(), 2);
        assert_eq!(banks.ram_bank_count(), 1);
        assert_eq!(banks.read_rom(3, 0x4000), 0x11);
        assert_eq!(banks.read_ram(0, 0xA000), 0xFF);

        let banks = Banks::new(vec![0x22; 0x100], vec![0; 0x800]);
        assert_eq!(banks.read_rom(0, 0x00FF), 0x22);
        assert_eq!(banks.read_rom(0, 0x0100), 0xFF);
        assert_eq!(banks.read_ram(0, 0xA800), 0xFF);
    }

    #[test]
    fn test_load_ram_clamps_length() {
        let mut mapper = Mapper::from_cart(vec![0; 0x8000], vec![0; 4], 0x03);
        mapper.load_ram(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(mapper.ram(), &[1, 2, 3, 4]);
        mapper.load_ram(&[9]);
        assert_eq!(mapper.ram(), &[9, 2, 3, 4]);
    }

    #[test]
    fn test_save_without_battery_is_noop() {
        let mapper = Mapper::from_cart(vec![0; 0x8000], vec![0; 0x2000], 0x02);
        assert!(mapper.save_path().is_none());
        assert!(mapper.save_ram().is_ok());
    }

    #[test]
    fn test_save_ram_writes_file() {
        let path = std::env::temp_dir().join(format!("dmg_mapper_{}.sav", std::process::id()));
        let mut mapper =
            Mapper::from_cart(vec![0; 0x8000], vec![0; 0x2000], 0x03).with_battery(&path);
        mapper.write(0x0000, 0x0A);
        mapper.write(0xA010, 0x5A);
        mapper.save_ram().unwrap();

        let saved = fs::read(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(saved.len(), 0x2000);
        assert_eq!(saved[0x10], 0x5A);
    }
}
