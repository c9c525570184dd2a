//! Core APU (Audio Processing Unit) components.
//!
//! Building blocks for the handheld's sound hardware. A concrete audio unit
//! owns the channels and a [`FrameSequencer`] and forwards the sequencer's
//! length and envelope clocks to them.
//!
//! ## Components
//!
//! - **Noise Channel**: 15-bit LFSR noise with envelope and length gating
//! - **Envelope**: periodic volume ramp up or down, clamped to 0-15
//! - **Length Counter**: 64-step countdown that silences a channel
//! - **Frame Sequencer**: 512 Hz, 8-step clock for length, sweep and envelope
//! - **DC Blocker**: per-stream high-pass filter for the mixed output

pub mod dc_filter;
pub mod envelope;
pub mod frame_sequencer;
pub mod length_counter;
pub mod noise;

pub use dc_filter::DcBlocker;
pub use envelope::Envelope;
pub use frame_sequencer::FrameSequencer;
pub use length_counter::LengthCounter;
pub use noise::NoiseChannel;
