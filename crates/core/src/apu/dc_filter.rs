//! DC-blocking high-pass filter.
//!
//! `y[n] = x[n] - x[n-1] + R * y[n-1]` with R = 0.999. Each output stream owns
//! its own filter so several emulated units never share history.

const POLE: f32 = 0.999;

#[derive(Debug, Clone, Default)]
pub struct DcBlocker {
    last_input: f32,
    last_output: f32,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one sample
    pub fn process(&mut self, sample: f32) -> f32 {
        let output = sample - self.last_input + POLE * self.last_output;
        self.last_input = sample;
        self.last_output = output;
        output
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
