//! Game Boy APU (Audio Processing Unit) front end.
//!
//! Drives the LFSR noise channel from `dmg_core` with an 8-step frame
//! sequencer and exposes the sound register block to the bus.
//!
//! ## Register Map
//!
//! - **$FF10-$FF1E**: Pulse and wave channel registers (stored raw)
//! - **$FF1F**: NR40, unused (reads 0xFF)
//! - **$FF20-$FF23**: Noise (NR41-NR44)
//! - **$FF24-$FF25**: Master volume and panning (stored raw)
//! - **$FF26**: Sound on/off (NR52)
//! - **$FF30-$FF3F**: Wave pattern RAM
//!
//! ## Timing
//!
//! - CPU clock: 4.194304 MHz
//! - Frame sequencer: 512 Hz (every 8192 cycles)
//! - Length counter: 256 Hz (even frame sequencer steps)
//! - Envelope: 64 Hz (step 7)

use crate::io::IoDevice;
use dmg_core::apu::{DcBlocker, FrameSequencer, NoiseChannel};
use dmg_core::logging::{log, LogCategory, LogLevel};

const BASE: u16 = 0xFF10;
const NR40: u16 = 0xFF1F;
const NR41: u16 = 0xFF20;
const NR44: u16 = 0xFF23;
const NR52: u16 = 0xFF26;
const WAVE_RAM: u16 = 0xFF30;
const END: u16 = 0xFF3F;

const POWER: u8 = 0x80;
const NOISE_ON: u8 = 0x08;

/// Audio unit with the noise channel
#[derive(Debug)]
pub struct GbApu {
    pub noise: NoiseChannel,
    sequencer: FrameSequencer,
    /// Raw storage for `$FF10-$FF3F` outside the noise registers
    regs: [u8; (END - BASE + 1) as usize],
    power_on: bool,
    dc_filter: DcBlocker,
}

impl GbApu {
    pub fn new() -> Self {
        Self {
            noise: NoiseChannel::new(),
            sequencer: FrameSequencer::new(),
            regs: [0; (END - BASE + 1) as usize],
            power_on: true,
            dc_filter: DcBlocker::new(),
        }
    }

    pub fn is_powered(&self) -> bool {
        self.power_on
    }

    /// Next frame sequencer step (0-7)
    pub fn frame_step(&self) -> u8 {
        self.sequencer.current_step()
    }

    /// Advance by `cycles` CPU cycles
    pub fn step(&mut self, cycles: u32) {
        if !self.power_on {
            return;
        }
        self.noise.advance(cycles);

        let noise = &mut self.noise;
        self.sequencer.advance(cycles, |step| {
            if FrameSequencer::clocks_length(step) {
                noise.clock_length();
            }
            if FrameSequencer::clocks_envelope(step) {
                noise.clock_envelope();
            }
        });
    }

    /// Current output level in `[-1.0, 1.0]` after DC removal
    pub fn sample(&mut self) -> f32 {
        let level = if self.power_on {
            self.noise.current_sample() as f32 / 15.0
        } else {
            0.0
        };
        self.dc_filter.process(level)
    }

    fn power_off(&mut self) {
        self.noise.reset();
        self.sequencer.reset();
        let wave = (WAVE_RAM - BASE) as usize;
        self.regs[..wave].fill(0);
        self.power_on = false;
    }
}

impl Default for GbApu {
    fn default() -> Self {
        Self::new()
    }
}

impl IoDevice for GbApu {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            NR40 => 0xFF,
            NR41..=NR44 => self.noise.read_register((addr - NR41) as usize),
            NR52 => {
                let power = if self.power_on { POWER } else { 0 };
                let noise = if self.noise.is_enabled() { NOISE_ON } else { 0 };
                power | 0x70 | noise
            }
            BASE..=END => self.regs[(addr - BASE) as usize],
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        // Only NR52 and wave RAM respond while powered off
        if !self.power_on && addr != NR52 && addr < WAVE_RAM {
            log(LogCategory::APU, LogLevel::Trace, || {
                format!("write {:02X} @{:04X} ignored, APU off", val, addr)
            });
            return;
        }

        match addr {
            NR40 => {}
            NR41..=NR44 => {
                let step = self.sequencer.current_step();
                self.noise.write_register((addr - NR41) as usize, val, step);
            }
            NR52 => {
                let on = val & POWER != 0;
                if self.power_on && !on {
                    log(LogCategory::APU, LogLevel::Debug, || "power off".to_string());
                    self.power_off();
                } else if !self.power_on && on {
                    log(LogCategory::APU, LogLevel::Debug, || "power on".to_string());
                    self.sequencer.reset();
                    self.power_on = true;
                }
            }
            BASE..=END => self.regs[(addr - BASE) as usize] = val,
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
