//! Centralized logging for the emulator core.
//!
//! Every diagnostic the core emits goes through [`log`], filtered by a
//! per-category level with a global fallback.
//!
//! # Architecture
//!
//! - **LogConfig**: process-wide configuration held in atomics
//! - **LogLevel**: Off < Error < Warn < Info < Debug < Trace
//! - **LogCategory**: Bus, APU, Cartridge, Interrupts, Stubs
//! - **log()**: lazy, rate-limited output to stderr or a log file
//!
//! # Performance
//!
//! The message closure only runs when the category is enabled, so a disabled
//! diagnostic on the bus hot path costs two atomic loads. File output is handed
//! to a background writer thread so emulation never waits on disk.
//!
//! # Usage
//!
//! ```rust
//! use dmg_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Bus, LogLevel::Debug, || {
//!     format!("unmapped read @{:04X}", 0xFF03)
//! });
//! ```

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for the emulated components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Address decoding, unmapped and unusable accesses
    Bus,
    /// Sound registers and channel state
    APU,
    /// Cartridge loading, mapper selection, battery RAM
    Cartridge,
    /// Interrupt requests
    Interrupts,
    /// Unimplemented hardware features
    Stubs,
}

const CATEGORY_COUNT: usize = 5;

impl LogCategory {
    pub const ALL: [LogCategory; CATEGORY_COUNT] = [
        LogCategory::Bus,
        LogCategory::APU,
        LogCategory::Cartridge,
        LogCategory::Interrupts,
        LogCategory::Stubs,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-category message budget over a fixed one-second window.
#[derive(Debug, Default, Clone, Copy)]
struct Window {
    opened: Option<Instant>,
    emitted: usize,
    dropped: usize,
}

struct RateLimiter {
    max_per_window: AtomicUsize,
    window: Duration,
    windows: Mutex<[Window; CATEGORY_COUNT]>,
}

/// Outcome of a rate-limit check
#[derive(Debug, PartialEq, Eq)]
struct Admission {
    allowed: bool,
    /// Messages dropped in the previous window, reported once
    dropped: Option<usize>,
}

impl RateLimiter {
    fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            max_per_window: AtomicUsize::new(max_per_window),
            window,
            windows: Mutex::new([Window::default(); CATEGORY_COUNT]),
        }
    }

    fn admit(&self, category: LogCategory, now: Instant) -> Admission {
        let max = self.max_per_window.load(Ordering::Relaxed);
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let w = &mut windows[category.index()];

        let mut dropped = None;
        let expired = w
            .opened
            .map_or(true, |opened| now.duration_since(opened) >= self.window);
        if expired {
            if w.dropped > 0 {
                dropped = Some(w.dropped);
            }
            *w = Window {
                opened: Some(now),
                emitted: 0,
                dropped: 0,
            };
        }

        if w.emitted < max {
            w.emitted += 1;
            Admission {
                allowed: true,
                dropped,
            }
        } else {
            w.dropped += 1;
            Admission {
                allowed: false,
                dropped,
            }
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    global_level: AtomicU8,
    levels: [AtomicU8; CATEGORY_COUNT],
    file_sink: Mutex<Option<Sender<String>>>,
    file_enabled: AtomicBool,
    limiter: RateLimiter,
}

impl LogConfig {
    /// All logging off, 60 messages per category per second
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: std::array::from_fn(|_| AtomicU8::new(LogLevel::Off as u8)),
            file_sink: Mutex::new(None),
            file_enabled: AtomicBool::new(false),
            limiter: RateLimiter::new(60, Duration::from_secs(1)),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category level other than Off overrides the global level.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let category_level = self.level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.global_level()
        }
    }

    /// Reset all levels to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    /// Set the maximum number of messages per category per second
    pub fn set_rate_limit(&self, max_per_second: usize) {
        self.limiter
            .max_per_window
            .store(max_per_second, Ordering::Relaxed);
    }

    pub fn rate_limit(&self) -> usize {
        self.limiter.max_per_window.load(Ordering::Relaxed)
    }

    /// Route output to a file, written from a background thread.
    ///
    /// Replaces any previous sink; the old writer thread exits once its
    /// channel is dropped.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                while let Ok(message) = receiver.recv() {
                    let _ = writeln!(file, "{}", message);
                    let _ = file.flush();
                }
            })?;

        let mut sink = match self.file_sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *sink = Some(sender);
        self.file_enabled.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stop logging to file and go back to stderr
    pub fn clear_log_file(&self) {
        let mut sink = match self.file_sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *sink = None;
        self.file_enabled.store(false, Ordering::Relaxed);
    }

    fn write_message(&self, message: String) {
        if self.file_enabled.load(Ordering::Relaxed) {
            let sink = match self.file_sink.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(sender) = sink.as_ref() {
                if let Err(failed) = sender.send(message) {
                    eprintln!("{}", failed.0);
                }
                return;
            }
        }
        eprintln!("{}", message);
    }
}

/// Log a message with the specified category and level.
///
/// `message_fn` runs only when the category is enabled at `level` and the
/// category still has budget in the current one-second window. Messages over
/// budget are counted and summarised when the next window opens.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let admission = config.limiter.admit(category, Instant::now());
    if let Some(count) = admission.dropped {
        config.write_message(format!(
            "[{:?}] rate limit exceeded, {} message(s) dropped",
            category, count
        ));
    }
    if admission.allowed {
        config.write_message(format!("[{:?}] {}", category, message_fn()));
    }
}
