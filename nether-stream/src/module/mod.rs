//! Compiled module: the engine-ready song layout
//!
//! A [`CompiledModule`] is produced once by the module compiler and is never
//! mutated afterwards. Streams hold it through an `Arc`, so any number of
//! streams can play the same module on different threads.
//!
//! # Layout
//!
//! ```text
//!  pattern_order ──► Pattern ──► PatternNote ──┬─► instrument index ──► Instrument
//!                                              │                          └─► InstrumentSample
//!                                              └─► EffectKey ──► effect_table[offset..offset+len]
//! ```

mod effects;
mod instrument;
mod pattern;

pub use effects::{EffectCommand, EffectKey};
pub use instrument::{
    Envelope, EnvelopeFlags, EnvelopePoint, Instrument, InstrumentSample, LoopType,
};
pub use pattern::{NoteFlags, NoteKind, Pattern, PatternNote};

use crate::utils::note_to_period;

/// Engine-ready tracker module
#[derive(Debug, Clone, Default)]
pub struct CompiledModule {
    /// Module name
    pub name: String,
    /// Number of channels (voices) the patterns address
    pub num_channels: usize,
    /// Module default tempo (BPM), 0 = unset
    pub default_bpm: u16,
    /// Module default speed (ticks per row), 0 = unset
    pub default_ticks_per_row: u16,
    /// Order index playback resumes from when looping
    pub restart_position: usize,
    /// Patterns in play order
    pub pattern_order: Vec<Pattern>,
    /// Flat effect command table
    pub effect_table: Vec<EffectCommand>,
    /// Instrument definitions
    pub instruments: Vec<Instrument>,
}

impl CompiledModule {
    /// Get the pattern at the given order position
    pub fn pattern(&self, order: usize) -> Option<&Pattern> {
        self.pattern_order.get(order)
    }

    /// Number of entries in the play order
    pub fn song_length(&self) -> usize {
        self.pattern_order.len()
    }

    /// Effect commands addressed by a key
    ///
    /// Keys produced by the compiler are always in range; a stray key reads
    /// as no commands.
    pub fn effects(&self, key: EffectKey) -> &[EffectCommand] {
        self.effect_table.get(key.range()).unwrap_or(&[])
    }

    /// Get an instrument by index
    pub fn instrument(&self, index: usize) -> Option<&Instrument> {
        self.instruments.get(index)
    }

    /// Append commands to the effect table and return their key
    ///
    /// Used while assembling a module; a compiled module is not modified
    /// once handed to a stream.
    pub fn push_effects(&mut self, commands: &[EffectCommand]) -> EffectKey {
        if commands.is_empty() {
            return EffectKey::EMPTY;
        }
        let offset = self.effect_table.len() as u32;
        self.effect_table.extend_from_slice(commands);
        EffectKey::new(offset, commands.len() as u16)
    }

    /// Compile a row note: store its effects and resolve its period and flags
    ///
    /// Note 0 compiles to a note without a pitch.
    pub fn compile_note(
        &mut self,
        note: u8,
        instrument: Option<u16>,
        effects: &[EffectCommand],
    ) -> PatternNote {
        let mut flags = NoteFlags::empty();
        if effects.iter().any(EffectCommand::is_note_portamento) {
            flags |= NoteFlags::HAS_NOTE_PORTAMENTO;
        }
        PatternNote {
            note,
            period: note_to_period(note, 0),
            instrument,
            effect: self.push_effects(effects),
            flags,
        }
    }
}
