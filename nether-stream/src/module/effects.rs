//! Effect command table entries
//!
//! The module compiler flattens every note's effect column into one shared
//! table. Notes address their commands through an [`EffectKey`] slice.

use std::ops::Range;

/// Decoded effect command with op-specific operands
///
/// Operands are already scaled by the compiler: volumes are in [0, 1] and
/// slides are per-tick deltas on that scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectCommand {
    // =========================================================================
    // Interpreted by the engine
    // =========================================================================
    /// Set channel volume
    /// XM: Cxx, volume column 10-50
    SetVolume(f64),

    /// Release the note on the given tick (0 = at row start)
    /// XM: Kxx, note 97
    KeyOff { tick: u8 },

    /// Per-tick volume delta, 0.0 recalls the previous slide
    /// XM: Axy
    VolumeSlide(f64),

    /// Semitone offsets cycled on ticks 0, 1, 2
    /// XM: 0xy
    Arpeggio([u8; 3]),

    /// Jump to a row of the next pattern
    /// XM: Dxx
    PatternBreak { row: u8 },

    // =========================================================================
    // Carried in the table but not interpreted
    // =========================================================================
    /// XM: 1xx
    PortamentoUp(f64),

    /// XM: 2xx
    PortamentoDown(f64),

    /// Slide towards the note's period without retriggering
    /// XM: 3xx
    NotePortamento(f64),

    /// XM: 4xy
    Vibrato { speed: u8, depth: f64 },

    /// XM: 8xx
    SetPanning(f64),

    /// XM: 9xx
    SampleOffset(u32),
}

impl EffectCommand {
    /// Whether this command suppresses the pitch snap of its note
    pub fn is_note_portamento(&self) -> bool {
        matches!(self, EffectCommand::NotePortamento(_))
    }
}

/// Slice of the effect table owned by a pattern note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectKey {
    /// First command index
    pub offset: u32,
    /// Number of commands
    pub len: u16,
}

impl EffectKey {
    /// Key that addresses no commands
    pub const EMPTY: Self = Self { offset: 0, len: 0 };

    pub const fn new(offset: u32, len: u16) -> Self {
        Self { offset, len }
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index range into the effect table
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.len as usize
    }
}
