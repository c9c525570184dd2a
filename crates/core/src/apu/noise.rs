//! Noise channel with a Linear Feedback Shift Register (LFSR).
//!
//! The noise channel generates pseudo-random noise for percussion and sound
//! effects. It is programmed through four registers:
//!
//! ```text
//! Index  Register  Layout      Meaning
//! 0      NR41      --LL LLLL   Length (stored, write-only)
//! 1      NR42      VVVV DPPP   Initial volume, envelope direction, period
//! 2      NR43      SSSS WDDD   Clock shift, width mode, divisor code
//! 3      NR44      TL-- ----   Trigger, length enable
//! ```
//!
//! The LFSR is shifted every `DIVISORS[code] << shift` cycles. Its feedback bit
//! is the XOR of bits 0 and 1, written into bit 14 (and bit 6 in width mode,
//! which shortens the sequence to 127 steps).

use super::{Envelope, LengthCounter};

/// Base period in cycles for each divisor code
pub const DIVISORS: [u16; 8] = [8, 16, 32, 48, 64, 80, 96, 112];

/// Trigger bit of NR44
pub const TRIGGER: u8 = 0x80;

/// Length-enable bit of NR44
pub const LENGTH_ENABLE: u8 = 0x40;

/// Bits that read back as 1 for each register
const READ_MASKS: [u8; 4] = [0xFF, 0x00, 0x00, 0xBF];

/// LFSR value after trigger (all 15 bits set)
const LFSR_SEED: u16 = 0x7FFF;

/// Number of channel registers
pub const REGISTER_COUNT: usize = 4;

/// Noise channel that generates pseudo-random noise.
#[derive(Debug, Clone)]
pub struct NoiseChannel {
    /// Raw register values as last written (trigger bit cleared)
    regs: [u8; REGISTER_COUNT],
    /// Channel running; independent of the DAC
    enabled: bool,
    envelope: Envelope,
    length: LengthCounter,
    /// NR43 bits 7-4
    clock_shift: u8,
    /// NR43 bit 3: 7-bit sequence when set
    width_mode: bool,
    /// NR43 bits 2-0
    divisor_code: u8,
    /// 15-bit shift register
    lfsr: u16,
    /// Cycles remaining until the next LFSR shift
    divider: i32,
}

impl NoiseChannel {
    pub fn new() -> Self {
        Self {
            regs: [0; REGISTER_COUNT],
            enabled: false,
            envelope: Envelope::new(),
            length: LengthCounter::new(),
            clock_shift: 0,
            width_mode: false,
            divisor_code: 0,
            lfsr: 0,
            divider: 0,
        }
    }

    /// Power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// DAC power: volume or direction bits of NR42 set
    pub fn dac_enabled(&self) -> bool {
        self.regs[1] & 0xF8 != 0
    }

    /// Write channel register `index` (0-3).
    ///
    /// `frame_step` is the frame sequencer's current step, consulted when the
    /// write triggers the channel.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a channel register.
    pub fn write_register(&mut self, index: usize, val: u8, frame_step: u8) {
        match index {
            0 => self.regs[0] = val,
            1 => {
                self.regs[1] = val;
                self.envelope.write(val);
                if !self.dac_enabled() {
                    self.enabled = false;
                }
            }
            2 => {
                self.regs[2] = val;
                self.divisor_code = val & 0x07;
                self.width_mode = val & 0x08 != 0;
                self.clock_shift = (val >> 4) & 0x0F;
            }
            3 => {
                self.regs[3] = val & !TRIGGER;
                if val & TRIGGER != 0 {
                    self.trigger(frame_step);
                }
            }
            _ => panic!("noise channel has no register {}", index),
        }
    }

    /// Read channel register `index` (0-3) with its open-bus bits set.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a channel register.
    pub fn read_register(&self, index: usize) -> u8 {
        match index {
            0..=3 => self.regs[index] | READ_MASKS[index],
            _ => panic!("noise channel has no register {}", index),
        }
    }

    fn trigger(&mut self, frame_step: u8) {
        self.enabled = true;
        self.length.trigger(frame_step);
        self.divider = DIVISORS[self.divisor_code as usize] as i32;
        self.envelope.trigger(frame_step);
        self.lfsr = LFSR_SEED;
        if !self.dac_enabled() {
            self.enabled = false;
        }
    }

    fn period(&self) -> i32 {
        (DIVISORS[self.divisor_code as usize] as i32) << self.clock_shift
    }

    /// Run the channel for `cycles` clock cycles, shifting the LFSR once for
    /// every elapsed period.
    pub fn advance(&mut self, cycles: u32) {
        self.divider -= cycles as i32;
        while self.divider <= 0 {
            self.divider += self.period();
            self.shift_lfsr();
        }
    }

    fn shift_lfsr(&mut self) {
        let feedback = (self.lfsr ^ (self.lfsr >> 1)) & 1;
        self.lfsr = (self.lfsr >> 1) | (feedback << 14);
        if self.width_mode {
            self.lfsr = (self.lfsr & !0x40) | (feedback << 6);
        }
    }

    /// Length tick from the frame sequencer (256 Hz)
    pub fn clock_length(&mut self) {
        let length_enabled = self.regs[3] & LENGTH_ENABLE != 0;
        if self.length.clock(length_enabled) {
            self.enabled = false;
        }
    }

    /// Envelope tick from the frame sequencer (64 Hz)
    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current DAC input level (0-15).
    ///
    /// Full envelope volume while LFSR bit 0 is clear, silence while it is set
    /// or while the channel is disabled.
    pub fn current_sample(&self) -> u8 {
        if !self.enabled {
            return 0;
        }
        self.envelope.volume() * (!self.lfsr & 1) as u8
    }

    pub fn length_counter(&self) -> u8 {
        self.length.value()
    }

    pub fn envelope_volume(&self) -> u8 {
        self.envelope.volume()
    }

    pub fn lfsr(&self) -> u16 {
        self.lfsr
    }
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triggered(envelope: u8, polynomial: u8, frame_step: u8) -> NoiseChannel {
        let mut noise = NoiseChannel::new();
        noise.write_register(1, envelope, frame_step);
        noise.write_register(2, polynomial, frame_step);
        noise.write_register(3, TRIGGER, frame_step);
        noise
    }

    #[test]
    fn trigger_enables_channel_and_seeds_lfsr() {
        let noise = triggered(0xF0, 0x00, 0);
        assert!(noise.is_enabled());
        assert_eq!(noise.lfsr(), 0x7FFF);
        assert_eq!(noise.divider, 8);
        assert_eq!(noise.envelope_volume(), 15);
    }

    #[test]
    fn trigger_bit_is_not_stored() {
        let mut noise = triggered(0xF0, 0x00, 0);
        noise.write_register(3, TRIGGER | LENGTH_ENABLE, 0);
        assert_eq!(noise.regs[3], LENGTH_ENABLE);
        assert_eq!(noise.read_register(3), 0xFF);
    }

    #[test]
    fn trigger_with_dac_off_stays_disabled() {
        let noise = triggered(0x00, 0x00, 0);
        assert!(!noise.is_enabled());
        // Triggering still reseeds the LFSR
        assert_eq!(noise.lfsr(), 0x7FFF);
    }

    #[test]
    fn direction_bit_alone_powers_dac() {
        let noise = triggered(0x08, 0x00, 0);
        assert!(noise.dac_enabled());
        assert!(noise.is_enabled());
    }

    #[test]
    fn envelope_write_with_dac_off_disables_channel() {
        let mut noise = triggered(0xF0, 0x00, 0);
        assert!(noise.is_enabled());
        noise.write_register(1, 0x07, 0);
        assert!(!noise.is_enabled());
    }

    #[test]
    fn advance_one_period_shifts_once() {
        let mut noise = triggered(0xF0, 0x00, 0);
        noise.advance(8);
        // feedback = 1 ^ 1 = 0 goes into bit 14
        assert_eq!(noise.lfsr(), 0x3FFF);
        assert_eq!(noise.divider, 8);

        noise.advance(7);
        assert_eq!(noise.lfsr(), 0x3FFF);
        noise.advance(1);
        assert_eq!(noise.lfsr(), 0x1FFF);
    }

    #[test]
    fn advance_past_several_periods_shifts_each_time() {
        let mut a = triggered(0xF0, 0x00, 0);
        let mut b = a.clone();

        a.advance(8 * 5);
        for _ in 0..5 {
            b.advance(8);
        }
        assert_eq!(a.lfsr(), b.lfsr());
        assert_eq!(a.divider, b.divider);
    }

    #[test]
    fn clock_shift_scales_period() {
        // Divisor code 1 (16 cycles), shift 2: 64 cycles per shift after the first
        let mut noise = triggered(0xF0, 0x21, 0);
        assert_eq!(noise.divider, 16);
        noise.advance(16);
        assert_eq!(noise.lfsr(), 0x3FFF);
        assert_eq!(noise.divider, 64);
        noise.advance(63);
        assert_eq!(noise.lfsr(), 0x3FFF);
        noise.advance(1);
        assert_eq!(noise.lfsr(), 0x1FFF);
    }

    #[test]
    fn feedback_is_xor_of_low_bits() {
        let mut noise = triggered(0xF0, 0x00, 0);
        noise.lfsr = 0b01;
        noise.advance(8);
        assert_eq!(noise.lfsr(), 1 << 14);

        noise.lfsr = 0b11;
        noise.advance(8);
        assert_eq!(noise.lfsr(), 0b01);
    }

    #[test]
    fn width_mode_copies_feedback_into_bit_6() {
        let mut noise = triggered(0xF0, 0x08, 0);
        noise.lfsr = 0b01;
        noise.advance(8);
        assert_eq!(noise.lfsr(), (1 << 14) | (1 << 6));

        noise.lfsr = 0x7FFF;
        noise.advance(8);
        // feedback 0 clears bit 6
        assert_eq!(noise.lfsr(), 0x3FFF & !0x40);
    }

    #[test]
    fn width_mode_repeats_every_127_shifts() {
        let mut noise = triggered(0xF0, 0x08, 0);
        let mut seen = Vec::new();
        for _ in 0..254 {
            noise.advance(8);
            seen.push(noise.lfsr() & 0x7F);
        }
        assert_eq!(seen[..127], seen[127..]);
    }

    #[test]
    fn length_reloads_to_64_on_length_step() {
        let mut noise = NoiseChannel::new();
        noise.write_register(0, 0x00, 0);
        noise.write_register(1, 0xF0, 0);
        noise.write_register(3, TRIGGER, 0);
        assert_eq!(noise.length_counter(), 64);
    }

    #[test]
    fn length_reloads_to_63_on_other_steps() {
        let mut noise = NoiseChannel::new();
        noise.write_register(0, 0x00, 3);
        noise.write_register(1, 0xF0, 3);
        noise.write_register(3, TRIGGER, 3);
        assert_eq!(noise.length_counter(), 63);
    }

    #[test]
    fn length_expiry_disables_channel() {
        let mut noise = triggered(0xF0, 0x00, 0);
        noise.write_register(3, LENGTH_ENABLE, 0);

        for _ in 0..63 {
            noise.clock_length();
        }
        assert!(noise.is_enabled());
        noise.clock_length();
        assert!(!noise.is_enabled());
        assert_eq!(noise.length_counter(), 0);
    }

    #[test]
    fn length_does_not_count_when_disabled_bit_clear() {
        let mut noise = triggered(0xF0, 0x00, 0);
        for _ in 0..100 {
            noise.clock_length();
        }
        assert!(noise.is_enabled());
        assert_eq!(noise.length_counter(), 64);
    }

    #[test]
    fn envelope_counter_gains_a_tick_when_triggered_before_step_7() {
        let noise = triggered(0xF3, 0x00, 7);
        assert_eq!(noise.envelope.counter(), 4);
        let noise = triggered(0xF3, 0x00, 6);
        assert_eq!(noise.envelope.counter(), 3);
    }

    #[test]
    fn envelope_steps_volume() {
        let mut noise = triggered(0x81, 0x00, 0); // volume 8, down, period 1
        noise.clock_envelope();
        assert_eq!(noise.envelope_volume(), 7);
        noise.clock_envelope();
        assert_eq!(noise.envelope_volume(), 6);
    }

    #[test]
    fn sample_follows_lfsr_bit_0() {
        let mut noise = triggered(0xC0, 0x00, 0);
        noise.lfsr = 0x7FFE;
        assert_eq!(noise.current_sample(), 12);
        noise.lfsr = 0x7FFF;
        assert_eq!(noise.current_sample(), 0);
    }

    #[test]
    fn disabled_channel_is_silent() {
        let mut noise = triggered(0xF0, 0x00, 0);
        noise.lfsr = 0x7FFE;
        noise.enabled = false;
        assert_eq!(noise.current_sample(), 0);

        let fresh = NoiseChannel::new();
        assert_eq!(fresh.current_sample(), 0);
    }

    #[test]
    fn registers_read_with_open_bus_bits() {
        let mut noise = NoiseChannel::new();
        noise.write_register(0, 0x15, 0);
        noise.write_register(1, 0xA3, 0);
        noise.write_register(2, 0x5C, 0);
        noise.write_register(3, 0x40, 0);

        assert_eq!(noise.read_register(0), 0xFF);
        assert_eq!(noise.read_register(1), 0xA3);
        assert_eq!(noise.read_register(2), 0x5C);
        assert_eq!(noise.read_register(3), 0xFF);

        noise.write_register(3, 0x00, 0);
        assert_eq!(noise.read_register(3), 0xBF);
    }

    #[test]
    #[should_panic(expected = "no register 4")]
    fn reading_unknown_register_panics() {
        NoiseChannel::new().read_register(4);
    }

    #[test]
    #[should_panic(expected = "no register 7")]
    fn writing_unknown_register_panics() {
        NoiseChannel::new().write_register(7, 0, 0);
    }

    #[test]
    fn registers_survive_disable() {
        let mut noise = triggered(0xF0, 0x35, 0);
        noise.write_register(1, 0x00, 0);
        assert!(!noise.is_enabled());
        assert_eq!(noise.read_register(2), 0x35);
    }
}
