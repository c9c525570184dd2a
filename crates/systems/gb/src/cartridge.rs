//! Cartridge image parsing
//!
//! # Header
//!
//! ```text
//! $0134-$0143  Title (upper case ASCII, zero padded)
//! $0147        Cartridge type (mapper and extra hardware)
//! $0148        ROM size
//! $0149        External RAM size
//! ```
//!
//! Images too short to hold a header are accepted and run as plain ROM.

use crate::mappers::Mapper;
use crate::GbError;
use std::fs;
use std::path::Path;

const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x144;
const CART_TYPE: usize = 0x147;
const RAM_SIZE: usize = 0x149;
const HEADER_END: usize = 0x150;

/// Cartridge types with a battery keeping external RAM alive
const BATTERY_TYPES: [u8; 10] = [0x03, 0x06, 0x09, 0x0D, 0x0F, 0x10, 0x13, 0x1B, 0x1E, 0xFF];

/// A parsed cartridge image
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
    title: String,
    cart_type: u8,
    ram_size: usize,
}

impl Cartridge {
    /// Parse a ROM image
    pub fn from_bytes(rom: Vec<u8>) -> Result<Self, GbError> {
        if rom.is_empty() {
            return Err(GbError::EmptyImage);
        }

        if rom.len() < HEADER_END {
            return Ok(Self {
                rom,
                title: String::new(),
                cart_type: 0x00,
                ram_size: 0,
            });
        }

        let title = rom[TITLE_START..TITLE_END]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect::<String>()
            .trim()
            .to_string();

        let ram_size = match rom[RAM_SIZE] {
            0x02 => 8 * 1024,
            0x03 => 32 * 1024,
            0x04 => 128 * 1024,
            0x05 => 64 * 1024,
            // 0x01 is unused by licensed cartridges
            _ => 0,
        };

        Ok(Self {
            cart_type: rom[CART_TYPE],
            rom,
            title,
            ram_size,
        })
    }

    /// Read and parse a ROM file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GbError> {
        let path = path.as_ref();
        let rom = fs::read(path).map_err(|e| GbError::io(path, e))?;
        Self::from_bytes(rom)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cart_type(&self) -> u8 {
        self.cart_type
    }

    pub fn rom_size(&self) -> usize {
        self.rom.len()
    }

    /// External RAM size in bytes
    pub fn ram_size(&self) -> usize {
        self.ram_size
    }

    pub fn has_battery(&self) -> bool {
        BATTERY_TYPES.contains(&self.cart_type)
    }

    /// One-line summary for logs and front ends
    pub fn info(&self) -> String {
        let title = if self.title.is_empty() {
            "(untitled)"
        } else {
            &self.title
        };
        format!(
            "{} [type {:02X}, {} KiB ROM, {} KiB RAM{}]",
            title,
            self.cart_type,
            self.rom.len() / 1024,
            self.ram_size / 1024,
            if self.has_battery() { ", battery" } else { "" }
        )
    }

    /// Build the mapper for this cartridge with zeroed external RAM
    pub fn into_mapper(self) -> Mapper {
        let ram = vec![0; self.ram_size];
        Mapper::from_cart(self.rom, ram, self.cart_type)
    }
}
