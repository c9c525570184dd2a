//! Length counter used to cut a channel off after a fixed duration.
//!
//! The counter is clocked at 256 Hz by the frame sequencer's even steps and
//! only counts while the channel's length-enable bit is set.

use super::FrameSequencer;

/// Value loaded when a channel is triggered with an expired counter
pub const MAX_LENGTH: u8 = 64;

/// Length counter component.
#[derive(Debug, Clone, Default)]
pub struct LengthCounter {
    value: u8,
}

impl LengthCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload an expired counter on channel trigger.
    ///
    /// If the frame sequencer's next step does not clock length, the reload
    /// lands on 63 instead of 64.
    pub fn trigger(&mut self, frame_step: u8) {
        if self.value == 0 {
            self.value = MAX_LENGTH;
            if !FrameSequencer::clocks_length(frame_step) {
                self.value -= 1;
            }
        }
    }

    /// Length tick. Returns true when this tick expired the counter.
    pub fn clock(&mut self, length_enabled: bool) -> bool {
        if length_enabled && self.value != 0 {
            self.value -= 1;
            return self.value == 0;
        }
        false
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.value > 0
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}
