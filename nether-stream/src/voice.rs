//! Voice (channel) playback state
//!
//! One voice per module channel. Voices never own instruments: they keep an
//! index into the module's instrument table and resolve it on demand.

use crate::envelope::EnvelopeRunner;
use crate::module::{CompiledModule, EffectKey, Instrument, InstrumentSample, NoteKind, PatternNote};
use crate::utils::{PERIOD_PER_SEMITONE, clamp_unit, pan_gains, period_to_frequency};

/// Neutral panning (centre)
pub const PAN_CENTER: f64 = 0.5;

/// Per-voice playback state
#[derive(Clone, Debug)]
pub struct Voice {
    // Note
    /// Instrument index (None = silent)
    pub instrument: Option<usize>,
    /// Active sample index within the instrument
    pub sample: usize,
    /// Current note number (0 = none)
    pub note: u8,
    /// Current linear period
    pub period: f64,
    /// Effect table slice of the current row
    pub effect: EffectKey,

    // Sample playback
    /// Fractional cursor into the active sample
    pub sample_offset: f64,
    /// Cursor advance per output frame
    pub sample_step: f64,
    /// Ping-pong direction (true = moving towards loop start)
    pub reverse: bool,

    // Volume and panning
    /// Channel volume (0.0-1.0)
    pub volume: f64,
    /// Panning (0.0 = left, 0.5 = centre, 1.0 = right)
    pub panning: f64,
    /// Release fadeout multiplier (1.0 until released)
    pub fadeout_volume: f64,
    /// Stereo gains recomputed once per tick
    pub computed_volume: [f64; 2],
    /// Key is held (envelope sustain active)
    pub sustain: bool,

    // Arpeggio
    pub arpeggio_running: bool,
    pub arpeggio_ticked: bool,
    /// Semitone offset applied to the period
    pub arpeggio_note_offset: f64,

    /// Volume slide per tick (effect memory)
    pub volume_slide_value: f64,

    // Envelopes
    pub volume_envelope: EnvelopeRunner,
    pub panning_envelope: EnvelopeRunner,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            instrument: None,
            sample: 0,
            note: 0,
            period: 0.0,
            effect: EffectKey::EMPTY,
            sample_offset: 0.0,
            sample_step: 0.0,
            reverse: false,
            volume: 0.0,
            panning: PAN_CENTER,
            fadeout_volume: 1.0,
            computed_volume: [0.0; 2],
            sustain: false,
            arpeggio_running: false,
            arpeggio_ticked: false,
            arpeggio_note_offset: 0.0,
            volume_slide_value: 0.0,
            volume_envelope: EnvelopeRunner::new(1.0),
            panning_envelope: EnvelopeRunner::new(PAN_CENTER),
        }
    }
}

impl Voice {
    /// Reset voice to default state (in place, no reallocation)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resolve the bound instrument
    pub fn instrument<'m>(&self, module: &'m CompiledModule) -> Option<&'m Instrument> {
        module.instrument(self.instrument?)
    }

    /// Resolve the sample being played
    pub fn active_sample<'m>(&self, module: &'m CompiledModule) -> Option<&'m InstrumentSample> {
        self.instrument(module)?.samples.get(self.sample)
    }

    fn reset_envelopes(&mut self) {
        self.fadeout_volume = 1.0;
        self.volume_envelope.reset(1.0);
        self.panning_envelope.reset(PAN_CENTER);
    }

    /// Apply a row note to this voice
    ///
    /// Row note states:
    ///
    /// ```text
    /// [note] [instrument]
    ///  no     no          keep playing the current note (if any)
    ///  no     yes         "ghost instrument" (keeps the sample offset)
    ///  yes    no          "ghost note" (keeps the volume)
    ///  yes    yes         normal note play
    /// ```
    ///
    /// A note portamento on the row still binds the row's instrument but
    /// keeps the pitch, cursor and volume untouched.
    pub fn assign_note(&mut self, note: &PatternNote, module: &CompiledModule) {
        self.effect = note.effect;
        let kind = note.kind();

        if kind == NoteKind::Empty {
            // Let a finished one-shot go quiet for good
            if let Some(sample) = self.active_sample(module)
                && self.sample_offset >= sample.len() as f64
            {
                self.instrument = None;
            }
            return;
        }

        let has_note_portamento = note.has_note_portamento();

        if let Some(index) = note.instrument {
            self.instrument = Some(index as usize);
        }

        if !has_note_portamento && note.has_period() {
            self.period = note.period;
            self.note = note.note;
            self.sample_offset = 0.0;
            self.reverse = false;
        }

        let Some(instr) = self.instrument(module) else {
            return;
        };
        let (default_volume, default_panning) = (instr.volume, instr.panning);
        self.sample = instr.sample_for_note(self.note);

        self.sustain = true;
        self.reset_envelopes();
        // Portamento only bends the pitch
        let keeps_volume = kind == NoteKind::Ghost || has_note_portamento;
        if !keeps_volume {
            self.volume = default_volume;
        }
        self.panning = default_panning;
    }

    /// Release the key
    ///
    /// Without a volume envelope there is nothing to fade, so the note is
    /// silenced at once.
    pub fn key_off(&mut self, module: &CompiledModule) {
        self.sustain = false;
        if !self
            .instrument(module)
            .is_some_and(|instr| instr.volume_envelope_on())
        {
            self.volume = 0.0;
        }
    }

    /// Advance envelope runners and the release fadeout by one tick
    pub fn tick_envelopes(&mut self, module: &CompiledModule) {
        let Some(instr) = self.instrument(module) else {
            return;
        };

        if instr.volume_envelope_on() {
            self.volume_envelope.advance(&instr.volume_envelope, self.sustain);
            if !self.sustain {
                self.fadeout_volume = (self.fadeout_volume - instr.volume_fadeout_step).max(0.0);
            }
        }
        if instr.panning_envelope.is_enabled() {
            self.panning_envelope.advance(&instr.panning_envelope, self.sustain);
        }
    }

    /// Recompute the stereo gains for this tick
    pub fn update_gains(&mut self, global_volume: f64, module: &CompiledModule) {
        let (envelope_volume, pan) = match self.instrument(module) {
            Some(instr) => {
                let envelope_volume = if instr.volume_envelope_on() {
                    self.volume_envelope.value
                } else {
                    1.0
                };
                let pan = if instr.panning_envelope.is_enabled() {
                    envelope_pan(self.panning, self.panning_envelope.value)
                } else {
                    self.panning
                };
                (envelope_volume, pan)
            }
            None => (1.0, self.panning),
        };

        let gain = clamp_unit(global_volume * self.volume * self.fadeout_volume * envelope_volume);
        let (left, right) = pan_gains(pan);
        self.computed_volume = [gain * left, gain * right];
    }

    /// Recompute the per-frame cursor step from the period and arpeggio
    pub fn update_sample_step(&mut self, sample_rate: u32) {
        let period = self.period - PERIOD_PER_SEMITONE * self.arpeggio_note_offset;
        self.sample_step = period_to_frequency(period) / sample_rate as f64;
    }
}

/// Modulate a pan position by a panning envelope value
///
/// The envelope swings around the channel panning, limited by the distance
/// to the nearest edge so the result stays in [0, 1].
fn envelope_pan(panning: f64, envelope: f64) -> f64 {
    let headroom = PAN_CENTER - (panning - PAN_CENTER).abs();
    (panning + (envelope - PAN_CENTER) * headroom * 2.0).clamp(0.0, 1.0)
}
