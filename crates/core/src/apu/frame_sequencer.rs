//! Frame sequencer that drives the length counter, sweep, and envelope units.
//!
//! The sequencer steps at 512 Hz (every 8192 cycles of the 4.194304 MHz clock)
//! through eight steps:
//!
//! ```text
//! Step   Length   Sweep   Envelope
//! 0      clock    -       -
//! 1      -        -       -
//! 2      clock    clock   -
//! 3      -        -       -
//! 4      clock    -       -
//! 5      -        -       -
//! 6      clock    clock   -
//! 7      -        -       clock
//! ```

/// Cycles between two frame sequencer steps
pub const CYCLES_PER_STEP: u32 = 8192;

/// 8-step frame sequencer.
///
/// `current_step` is the index of the step that fires next. Channels query it
/// on trigger to reproduce the length and envelope alignment quirks.
#[derive(Debug, Clone, Default)]
pub struct FrameSequencer {
    cycles: u32,
    step: u8,
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index (0-7) of the next step to fire
    pub fn current_step(&self) -> u8 {
        self.step
    }

    pub fn clocks_length(step: u8) -> bool {
        step % 2 == 0
    }

    pub fn clocks_sweep(step: u8) -> bool {
        step == 2 || step == 6
    }

    pub fn clocks_envelope(step: u8) -> bool {
        step == 7
    }

    /// Advance by `cycles`, calling `on_step` with the index of every step that fires.
    pub fn advance<F>(&mut self, cycles: u32, mut on_step: F)
    where
        F: FnMut(u8),
    {
        self.cycles += cycles;
        while self.cycles >= CYCLES_PER_STEP {
            self.cycles -= CYCLES_PER_STEP;
            let fired = self.step;
            self.step = (self.step + 1) & 7;
            on_step(fired);
        }
    }

    pub fn reset(&mut self) {
        self.cycles = 0;
        self.step = 0;
    }
}
