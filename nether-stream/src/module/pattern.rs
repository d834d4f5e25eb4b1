//! Pattern and note data structures

use bitflags::bitflags;

use super::effects::EffectKey;

/// Compiled pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Number of rows (1-256)
    pub num_rows: usize,
    /// Number of channels per row
    pub num_channels: usize,
    /// Note data, row-major: `notes[row * num_channels + channel]`
    pub notes: Vec<PatternNote>,
}

impl Pattern {
    /// Create a pattern filled with empty notes
    pub fn empty(num_rows: usize, num_channels: usize) -> Self {
        Self {
            num_rows,
            num_channels,
            notes: vec![PatternNote::default(); num_rows * num_channels],
        }
    }

    /// All notes of one row, None past the last row
    pub fn row(&self, row: usize) -> Option<&[PatternNote]> {
        if row >= self.num_rows {
            return None;
        }
        let offset = row * self.num_channels;
        self.notes.get(offset..offset + self.num_channels)
    }

    /// Mutable access to a note, for building patterns
    pub fn note_mut(&mut self, row: usize, channel: usize) -> Option<&mut PatternNote> {
        if row >= self.num_rows || channel >= self.num_channels {
            return None;
        }
        self.notes.get_mut(row * self.num_channels + channel)
    }
}

bitflags! {
    /// Per-note properties resolved by the module compiler
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NoteFlags: u8 {
        /// The note's effects include a note portamento, so the pitch and
        /// sample cursor must not snap to the new note
        const HAS_NOTE_PORTAMENTO = 0b0000_0001;
    }
}

/// How a row note interacts with the voice it lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// No note, no instrument: keep playing
    Empty,
    /// Note and instrument: full retrigger
    Normal,
    /// Note only: retrigger with the current instrument, keep the volume
    Ghost,
    /// Instrument only: swap the instrument, keep the pitch and cursor
    GhostInstrument,
}

/// Single compiled note in a pattern
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatternNote {
    /// Note value (1 = C-0 .. 96 = B-7, 0 = none)
    pub note: u8,
    /// Linear period of the note (0.0 = none)
    pub period: f64,
    /// Instrument index into the module (None = keep current)
    pub instrument: Option<u16>,
    /// Effect table slice
    pub effect: EffectKey,
    /// Compiler-resolved properties
    pub flags: NoteFlags,
}

impl PatternNote {
    /// Check if this note carries a pitch
    pub fn has_period(&self) -> bool {
        self.period != 0.0
    }

    /// Check if this has an instrument
    pub fn has_instrument(&self) -> bool {
        self.instrument.is_some()
    }

    /// Check if the note addresses any effect commands
    pub fn has_effect(&self) -> bool {
        !self.effect.is_empty()
    }

    pub fn has_note_portamento(&self) -> bool {
        self.flags.contains(NoteFlags::HAS_NOTE_PORTAMENTO)
    }

    /// Classify the note by note/instrument presence
    pub fn kind(&self) -> NoteKind {
        match (self.has_period(), self.has_instrument()) {
            (false, false) => NoteKind::Empty,
            (true, true) => NoteKind::Normal,
            (true, false) => NoteKind::Ghost,
            (false, true) => NoteKind::GhostInstrument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_empty() {
        let pattern = Pattern::empty(64, 8);
        assert_eq!(pattern.num_rows, 64);
        assert_eq!(pattern.notes.len(), 64 * 8);
        assert_eq!(pattern.row(0).map(<[_]>::len), Some(8));
        assert_eq!(pattern.row(63).map(<[_]>::len), Some(8));
        assert!(pattern.row(64).is_none());
    }

    #[test]
    fn test_pattern_row_major_layout() {
        let mut pattern = Pattern::empty(4, 3);
        if let Some(note) = pattern.note_mut(2, 1) {
            note.note = 49;
        }
        assert_eq!(pattern.notes[2 * 3 + 1].note, 49);
        assert_eq!(pattern.row(2).map(|row| row[1].note), Some(49));
        assert!(pattern.row(4).is_none());
        assert!(pattern.note_mut(0, 3).is_none());
    }

    #[test]
    fn test_short_note_buffer_has_no_rows() {
        let pattern = Pattern {
            num_rows: 4,
            num_channels: 2,
            notes: vec![PatternNote::default(); 5],
        };
        assert!(pattern.row(2).is_none());
        assert!(pattern.row(1).is_some());
    }

    #[test]
    fn test_note_kind() {
        let empty = PatternNote::default();
        assert_eq!(empty.kind(), NoteKind::Empty);

        let normal = PatternNote {
            note: 49,
            period: 4608.0,
            instrument: Some(0),
            ..Default::default()
        };
        assert_eq!(normal.kind(), NoteKind::Normal);

        let ghost = PatternNote {
            instrument: None,
            ..normal
        };
        assert_eq!(ghost.kind(), NoteKind::Ghost);

        let ghost_instrument = PatternNote {
            note: 0,
            period: 0.0,
            ..normal
        };
        assert_eq!(ghost_instrument.kind(), NoteKind::GhostInstrument);
    }

    #[test]
    fn test_note_portamento_flag() {
        let note = PatternNote {
            flags: NoteFlags::HAS_NOTE_PORTAMENTO,
            ..Default::default()
        };
        assert!(note.has_note_portamento());
        assert!(!PatternNote::default().has_note_portamento());
        assert!(!PatternNote::default().has_effect());
    }
}
