//! Per-voice envelope cursor

use crate::module::Envelope;

/// Cursor over an instrument envelope
///
/// Holds the value produced on the last tick and the frame (tick since
/// note start) the next tick will read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeRunner {
    /// Current envelope value
    pub value: f64,
    /// Next frame to read
    pub frame: u16,
}

impl EnvelopeRunner {
    /// Runner parked at the start with a neutral value
    pub const fn new(value: f64) -> Self {
        Self { value, frame: 0 }
    }

    /// Rewind to the first frame with a neutral value
    pub fn reset(&mut self, value: f64) {
        self.value = value;
        self.frame = 0;
    }

    /// Read the current frame and advance one tick
    ///
    /// While `sustain` is held the cursor parks on the sustain point. The
    /// loop range wraps the cursor back to the loop start.
    pub fn advance(&mut self, envelope: &Envelope, sustain: bool) {
        self.value = envelope.value_at(self.frame);

        let held = sustain
            && envelope
                .sustain_tick()
                .is_some_and(|tick| self.frame >= tick);
        if !held {
            self.frame = self.frame.saturating_add(1);
        }

        if let Some((loop_start, loop_end)) = envelope.loop_ticks()
            && self.frame >= loop_end
        {
            self.frame = loop_start;
        }
    }
}

impl Default for EnvelopeRunner {
    fn default() -> Self {
        Self::new(1.0)
    }
}
