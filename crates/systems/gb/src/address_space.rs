//! Game Boy address space.
//!
//! Owns the directly mapped memories (video RAM, two work RAM banks, OAM,
//! high RAM), the interrupt registers, and every memory-mapped peripheral.
//! Each access is decoded through [`memory_map::decode`] and, inside the I/O
//! block, through the [`memory_map::IO_PORTS`] table.
//!
//! # Memory Map
//!
//! ```text
//! $0000-$7FFF  Cartridge ROM (mapper)
//! $8000-$9FFF  Video RAM (8KB)
//! $A000-$BFFF  External RAM (mapper)
//! $C000-$CFFF  Work RAM Bank 0 (4KB)
//! $D000-$DFFF  Work RAM Bank 1 (4KB)
//! $E000-$FDFF  Echo RAM (mirror of $C000-$DDFF)
//! $FE00-$FE9F  OAM (160 bytes)
//! $FEA0-$FEFF  Not usable (reads 0, writes ignored)
//! $FF00-$FF7F  I/O Registers
//! $FF80-$FFFE  High RAM
//! $FFFF        Interrupt Enable Register
//! ```
//!
//! Accessing the cartridge ranges before a cartridge is loaded is a bug in the
//! caller and panics. [`Memory::peek`] is the exception: it reads open bus
//! (0xFF) so debuggers and the DMA unit can look anywhere.

use crate::apu::GbApu;
use crate::cartridge::Cartridge;
use crate::config::GbConfig;
use crate::dma::OamDma;
use crate::interrupt;
use crate::io::IoDevice;
use crate::joypad::Joypad;
use crate::mappers::Mapper;
use crate::memory_map::{self, IoPort, Region};
use crate::ppu::Ppu;
use crate::serial::Serial;
use crate::timer::Timer;
use crate::GbError;
use dmg_core::logging::{log, LogCategory, LogLevel};
use dmg_core::Memory;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// IF bits 5-7 do not exist and read as 1
const IF_UNUSED: u8 = 0xE0;

/// Game Boy memory bus
pub struct AddressSpace {
    vram: [u8; 0x2000],
    wram0: [u8; 0x1000],
    wram1: [u8; 0x1000],
    oam: [u8; 0xA0],
    /// `$FF80-$FFFF`; the last byte is shadowed by IE
    hram: [u8; 0x80],
    /// Interrupt Enable register
    ie: u8,
    /// Interrupt Flag register, low 5 bits
    if_reg: u8,
    /// KEY1 bit 0, stored but inert
    speed_mode: u8,
    /// Cartridge mapper (handles ROM/RAM banking)
    mapper: Option<Mapper>,
    cartridge_info: Option<String>,
    config: GbConfig,
    pub apu: GbApu,
    pub ppu: Ppu,
    pub timer: Timer,
    pub joypad: Joypad,
    pub serial: Serial,
    pub dma: OamDma,
}

impl AddressSpace {
    pub fn new() -> Self {
        Self::with_config(GbConfig::default())
    }

    /// Create an address space using `config` for battery saves.
    ///
    /// Logging settings are process-wide; apply them with [`GbConfig::apply`].
    pub fn with_config(config: GbConfig) -> Self {
        Self {
            vram: [0; 0x2000],
            wram0: [0; 0x1000],
            wram1: [0; 0x1000],
            oam: [0; 0xA0],
            hram: [0; 0x80],
            ie: 0,
            if_reg: 0,
            speed_mode: 0,
            mapper: None,
            cartridge_info: None,
            config,
            apu: GbApu::new(),
            ppu: Ppu::new(),
            timer: Timer::new(),
            joypad: Joypad::new(),
            serial: Serial::new(),
            dma: OamDma::new(),
        }
    }

    pub fn config(&self) -> &GbConfig {
        &self.config
    }

    /// Peripheral owning an I/O address, if any
    pub fn device(&self, addr: u16) -> Option<&dyn IoDevice> {
        match memory_map::io_port(addr) {
            IoPort::Joypad => Some(&self.joypad),
            IoPort::Serial => Some(&self.serial),
            IoPort::Timer => Some(&self.timer),
            IoPort::Audio => Some(&self.apu),
            IoPort::Video => Some(&self.ppu),
            IoPort::OamDma => Some(&self.dma),
            IoPort::InterruptFlag | IoPort::SpeedMode | IoPort::Unmapped => None,
        }
    }

    pub fn device_mut(&mut self, addr: u16) -> Option<&mut dyn IoDevice> {
        match memory_map::io_port(addr) {
            IoPort::Joypad => Some(&mut self.joypad),
            IoPort::Serial => Some(&mut self.serial),
            IoPort::Timer => Some(&mut self.timer),
            IoPort::Audio => Some(&mut self.apu),
            IoPort::Video => Some(&mut self.ppu),
            IoPort::OamDma => Some(&mut self.dma),
            IoPort::InterruptFlag | IoPort::SpeedMode | IoPort::Unmapped => None,
        }
    }

    /// Set bit `bit` (see [`interrupt`]) of the interrupt flag register
    pub fn request_interrupt(&mut self, bit: u8) {
        log(LogCategory::Interrupts, LogLevel::Trace, || {
            format!("request IF bit {}", bit)
        });
        let flags = self.read(memory_map::IF);
        self.write(memory_map::IF, flags | (1 << bit));
    }

    /// Interrupts both requested and enabled
    pub fn pending_interrupts(&self) -> u8 {
        self.if_reg & self.ie & 0x1F
    }

    /// Update the pressed button mask (see [`crate::joypad::button`]).
    ///
    /// A newly pressed button requests the joypad interrupt.
    pub fn set_buttons(&mut self, pressed: u8) {
        if self.joypad.set_pressed(pressed) {
            self.request_interrupt(interrupt::JOYPAD);
        }
    }

    /// Advance the peripherals by `cycles` CPU cycles
    pub fn tick(&mut self, cycles: u32) {
        if self.timer.step(cycles) {
            self.request_interrupt(interrupt::TIMER);
        }
        if self.serial.step(cycles) {
            self.request_interrupt(interrupt::SERIAL);
        }
        self.apu.step(cycles);

        for index in self.dma.step(cycles) {
            let byte = self.peek(self.dma.source_address(index));
            self.oam[index as usize] = byte;
        }
    }

    pub fn has_cartridge(&self) -> bool {
        self.mapper.is_some()
    }

    /// Summary of the loaded cartridge header
    pub fn cartridge_info(&self) -> Option<&str> {
        self.cartridge_info.as_deref()
    }

    pub fn mapper(&self) -> Option<&Mapper> {
        self.mapper.as_ref()
    }

    /// Load a ROM file, replacing (and first flushing) any current cartridge.
    ///
    /// Battery-backed RAM is restored from the cartridge's `.sav` file when
    /// battery saves are enabled and the file exists.
    pub fn load_cartridge(&mut self, path: impl AsRef<Path>) -> Result<(), GbError> {
        let path = path.as_ref();
        self.save_ram()?;
        let cartridge = Cartridge::load(path)?;
        let save_path = (self.config.battery_saves && cartridge.has_battery())
            .then(|| self.config.save_path_for(path));
        self.attach(cartridge, save_path)
    }

    /// Load a ROM image from memory. No battery file is associated.
    pub fn load_cartridge_bytes(&mut self, rom: Vec<u8>) -> Result<(), GbError> {
        self.save_ram()?;
        let cartridge = Cartridge::from_bytes(rom)?;
        self.attach(cartridge, None)
    }

    fn attach(&mut self, cartridge: Cartridge, save_path: Option<PathBuf>) -> Result<(), GbError> {
        let info = cartridge.info();
        log(LogCategory::Cartridge, LogLevel::Info, || format!("loaded {}", info));

        let mut mapper = cartridge.into_mapper();
        if let Some(path) = save_path {
            match fs::read(&path) {
                Ok(data) => {
                    mapper.load_ram(&data);
                    log(LogCategory::Cartridge, LogLevel::Info, || {
                        format!("restored cartridge RAM from {}", path.display())
                    });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(GbError::io(path, e)),
            }
            mapper = mapper.with_battery(path);
        }

        self.mapper = Some(mapper);
        self.cartridge_info = Some(info);
        Ok(())
    }

    /// Flush battery-backed cartridge RAM to disk
    pub fn save_ram(&self) -> Result<(), GbError> {
        match &self.mapper {
            Some(mapper) => mapper.save_ram(),
            None => Ok(()),
        }
    }

    /// Power-on state: memories and registers zeroed, cartridge detached,
    /// peripherals reset. Cartridge RAM is not flushed.
    pub fn reset(&mut self) {
        self.vram.fill(0);
        self.wram0.fill(0);
        self.wram1.fill(0);
        self.oam.fill(0);
        self.hram.fill(0);
        self.ie = 0;
        self.if_reg = 0;
        self.speed_mode = 0;
        self.mapper = None;
        self.cartridge_info = None;

        self.timer.reset();
        self.joypad.reset();
        self.serial.reset();
        self.dma.reset();
        self.apu.reset();
        self.ppu.reset();
    }

    fn mapper_mut(&mut self, addr: u16) -> &mut Mapper {
        match self.mapper.as_mut() {
            Some(mapper) => mapper,
            None => no_cartridge(addr),
        }
    }

    fn read_echo(&self, offset: u16) -> u8 {
        if offset < 0x1000 {
            self.wram0[offset as usize]
        } else {
            self.wram1[(offset - 0x1000) as usize]
        }
    }

    /// Shared decode for `read` and `peek`; `inspect` suppresses diagnostics
    /// and the missing-cartridge panic.
    fn fetch(&self, addr: u16, inspect: bool) -> u8 {
        let (region, offset) = memory_map::decode(addr);
        match region {
            Region::CartridgeRom | Region::ExternalRam => match &self.mapper {
                Some(mapper) => mapper.read(addr),
                None if inspect => 0xFF,
                None => no_cartridge(addr),
            },
            Region::VideoRam => self.vram[offset as usize],
            Region::WorkRam0 => self.wram0[offset as usize],
            Region::WorkRam1 => self.wram1[offset as usize],
            Region::EchoRam => self.read_echo(offset),
            Region::Oam => self.oam[offset as usize],
            Region::Unusable => {
                if !inspect {
                    log(LogCategory::Bus, LogLevel::Debug, || {
                        format!("read from unusable area @{:04X}", addr)
                    });
                }
                0
            }
            Region::Io => self.fetch_io(addr, inspect),
            Region::HighRam => self.hram[offset as usize],
            Region::InterruptEnable => self.ie,
        }
    }

    fn fetch_io(&self, addr: u16, inspect: bool) -> u8 {
        match memory_map::io_port(addr) {
            IoPort::InterruptFlag => self.if_reg | IF_UNUSED,
            // No double-speed mode: KEY1 reads as 0
            IoPort::SpeedMode => 0,
            _ => match self.device(addr) {
                Some(device) => device.read(addr),
                None => {
                    if !inspect {
                        log(LogCategory::Bus, LogLevel::Debug, || {
                            format!("unmapped I/O read @{:04X}", addr)
                        });
                    }
                    0
                }
            },
        }
    }

    fn store_io(&mut self, addr: u16, val: u8) {
        match memory_map::io_port(addr) {
            IoPort::InterruptFlag => self.if_reg = val & !IF_UNUSED,
            IoPort::SpeedMode => self.speed_mode = val & 0x01,
            _ => match self.device_mut(addr) {
                Some(device) => device.write(addr, val),
                None => log(LogCategory::Bus, LogLevel::Debug, || {
                    format!("unmapped I/O write {:02X} @{:04X}", val, addr)
                }),
            },
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for AddressSpace {
    fn read(&self, addr: u16) -> u8 {
        self.fetch(addr, false)
    }

    fn write(&mut self, addr: u16, val: u8) {
        let (region, offset) = memory_map::decode(addr);
        match region {
            Region::CartridgeRom | Region::ExternalRam => self.mapper_mut(addr).write(addr, val),
            Region::VideoRam => self.vram[offset as usize] = val,
            Region::WorkRam0 => self.wram0[offset as usize] = val,
            Region::WorkRam1 => self.wram1[offset as usize] = val,
            Region::EchoRam => {
                if offset < 0x1000 {
                    self.wram0[offset as usize] = val;
                } else {
                    self.wram1[(offset - 0x1000) as usize] = val;
                }
            }
            Region::Oam => self.oam[offset as usize] = val,
            Region::Unusable => log(LogCategory::Bus, LogLevel::Debug, || {
                format!("write {:02X} to unusable area @{:04X} dropped", val, addr)
            }),
            Region::Io => self.store_io(addr, val),
            Region::HighRam => self.hram[offset as usize] = val,
            Region::InterruptEnable => self.ie = val,
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        self.fetch(addr, true)
    }
}

#[cold]
fn no_cartridge(addr: u16) -> ! {
    panic!("cartridge access at {:04X} with no cartridge loaded", addr)
}
