//! Game Boy (DMG) memory and peripheral subsystem.
//!
//! [`AddressSpace`] routes every CPU bus access to the backing RAM arrays, the
//! cartridge mapper, or one of the memory-mapped peripherals: the audio unit
//! (which drives the LFSR noise channel from `dmg_core`), the video register
//! file, timer, joypad, serial port, and OAM DMA unit.
//!
//! ```no_run
//! use dmg_system::{AddressSpace, Memory};
//!
//! let mut bus = AddressSpace::new();
//! bus.load_cartridge("tetris.gb")?;
//! bus.write(0xC000, 0x42);
//! assert_eq!(bus.read(0xE000), 0x42);
//! bus.tick(4);
//! # Ok::<(), dmg_system::GbError>(())
//! ```

pub mod address_space;
pub mod apu;
pub mod cartridge;
pub mod config;
pub mod dma;
pub mod io;
pub mod joypad;
pub mod mappers;
pub mod memory_map;
pub mod ppu;
pub mod serial;
pub mod timer;

pub use address_space::AddressSpace;
pub use cartridge::Cartridge;
pub use config::GbConfig;
pub use dmg_core::Memory;
pub use io::IoDevice;
pub use mappers::Mapper;

use std::path::PathBuf;

/// Interrupt flag bit indices, as passed to [`AddressSpace::request_interrupt`]
pub mod interrupt {
    pub const VBLANK: u8 = 0;
    pub const LCD_STAT: u8 = 1;
    pub const TIMER: u8 = 2;
    pub const SERIAL: u8 = 3;
    pub const JOYPAD: u8 = 4;
}

#[derive(thiserror::Error, Debug)]
pub enum GbError {
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cartridge image is empty")]
    EmptyImage,
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl GbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GbError::Io {
            path: path.into(),
            source,
        }
    }
}
