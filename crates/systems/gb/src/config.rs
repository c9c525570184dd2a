//! Runtime configuration, loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid configuration:
//!
//! ```json
//! {
//!   "battery_saves": true,
//!   "save_dir": "saves",
//!   "logging": { "global": "warn", "cartridge": "info", "rate_limit": 60 }
//! }
//! ```

use crate::GbError;
use dmg_core::logging::{LogCategory, LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log levels per category. `off` for a category defers to `global`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub global: LogLevel,
    pub bus: LogLevel,
    pub apu: LogLevel,
    pub cartridge: LogLevel,
    pub interrupts: LogLevel,
    pub stubs: LogLevel,
    /// Write log output here instead of stderr
    pub log_file: Option<PathBuf>,
    /// Messages per category per second
    pub rate_limit: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global: LogLevel::Off,
            bus: LogLevel::Off,
            apu: LogLevel::Off,
            cartridge: LogLevel::Off,
            interrupts: LogLevel::Off,
            stubs: LogLevel::Off,
            log_file: None,
            rate_limit: 60,
        }
    }
}

impl LoggingConfig {
    /// Push these settings into the process-wide [`LogConfig`]
    pub fn apply(&self) -> Result<(), GbError> {
        let config = LogConfig::global();
        config.set_global_level(self.global);
        for (category, level) in [
            (LogCategory::Bus, self.bus),
            (LogCategory::APU, self.apu),
            (LogCategory::Cartridge, self.cartridge),
            (LogCategory::Interrupts, self.interrupts),
            (LogCategory::Stubs, self.stubs),
        ] {
            config.set_level(category, level);
        }
        config.set_rate_limit(self.rate_limit);

        match &self.log_file {
            Some(path) => config
                .set_log_file(path.clone())
                .map_err(|e| GbError::io(path, e))?,
            None => config.clear_log_file(),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbConfig {
    /// Persist battery-backed cartridge RAM to `.sav` files
    pub battery_saves: bool,
    /// Directory for `.sav` files; next to the ROM when unset
    pub save_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Default for GbConfig {
    fn default() -> Self {
        Self {
            battery_saves: true,
            save_dir: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl GbConfig {
    pub fn from_json(json: &str) -> Result<Self, GbError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GbError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| GbError::io(path, e))?;
        Self::from_json(&contents)
    }

    /// Apply process-wide settings (logging)
    pub fn apply(&self) -> Result<(), GbError> {
        self.logging.apply()
    }

    /// Battery save file for the ROM at `rom`
    pub fn save_path_for(&self, rom: &Path) -> PathBuf {
        match &self.save_dir {
            Some(dir) => {
                let mut name = rom.file_stem().unwrap_or(rom.as_os_str()).to_os_string();
                name.push(".sav");
                dir.join(name)
            }
            None => rom.with_extension("sav"),
        }
    }
}
