//! Volume envelope generator.
//!
//! Configured from an envelope register laid out as `VVVV DPPP`:
//! initial volume, direction (1 = up), and period in frame-sequencer
//! envelope ticks. A period of 0 freezes the volume.

use super::FrameSequencer;

/// Reload value used when the period is 0
const ZERO_PERIOD_RELOAD: i16 = 8;

/// Envelope generator component.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Volume loaded on trigger (register bits 7-4)
    initial_volume: u8,
    /// +1 or -1 (register bit 3)
    direction: i8,
    /// Register bits 2-0
    period: u8,
    /// Ticks until the next volume step
    counter: i16,
    /// Current output volume (0-15)
    volume: u8,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            initial_volume: 0,
            direction: -1,
            period: 0,
            counter: 0,
            volume: 0,
        }
    }

    /// Decode an envelope register write
    pub fn write(&mut self, val: u8) {
        self.initial_volume = (val >> 4) & 0x0F;
        self.direction = if val & 0x08 != 0 { 1 } else { -1 };
        self.period = val & 0x07;
        self.volume = self.initial_volume;
    }

    /// Reload the counter and return the period it was reloaded from.
    fn reload(&mut self) -> u8 {
        self.counter = if self.period != 0 {
            self.period as i16
        } else {
            ZERO_PERIOD_RELOAD
        };
        self.period
    }

    /// Restart the envelope on channel trigger.
    ///
    /// When the frame sequencer is about to clock the envelope, the counter
    /// starts one tick longer.
    pub fn trigger(&mut self, frame_step: u8) {
        self.reload();
        if FrameSequencer::clocks_envelope(frame_step) {
            self.counter += 1;
        }
        self.volume = self.initial_volume;
    }

    /// Envelope tick from the frame sequencer (64 Hz)
    pub fn clock(&mut self) {
        self.counter -= 1;
        if self.counter <= 0 && self.reload() != 0 {
            let next = self.volume as i8 + self.direction;
            if (0..=15).contains(&next) {
                self.volume = next as u8;
            }
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn counter(&self) -> i16 {
        self.counter
    }

    pub fn period(&self) -> u8 {
        self.period
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
