//! Order, row and tick advancement

use tracing::{debug, trace};

use super::Stream;
use super::effects::{apply_row_effects, apply_tick_effects};

/// Kind of a deferred position change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    /// Continue at a row of the following pattern
    PatternBreak,
}

/// Position change executed at the next row boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingJump {
    pub kind: JumpKind,
    /// Target order index
    pub pattern: usize,
    /// Target row
    pub row: usize,
}

impl Stream {
    /// Advance playback by one tick
    ///
    /// Returns false once the song has ended.
    pub(super) fn advance_tick(&mut self) -> bool {
        if self.finished {
            return false;
        }
        if self.row_ticks_remaining == 0 && !self.advance_row() {
            return false;
        }

        self.tick_index = self.timing.ticks_per_row - self.row_ticks_remaining;
        self.row_ticks_remaining -= 1;

        let module = &*self.module;
        let tick = self.tick_index;
        for voice in &mut self.voices {
            voice.tick_envelopes(module);
            voice.update_gains(self.volume_scaling, module);

            voice.arpeggio_ticked = false;
            if !voice.effect.is_empty() {
                apply_tick_effects(voice, module.effects(voice.effect), tick, module);
            }
            if voice.arpeggio_running && !voice.arpeggio_ticked {
                voice.arpeggio_running = false;
                voice.arpeggio_note_offset = 0.0;
            }

            voice.update_sample_step(self.timing.sample_rate);
        }
        true
    }

    /// Step to the next row, executing any pending jump
    ///
    /// Returns false once the song has ended.
    pub(super) fn advance_row(&mut self) -> bool {
        let row = match self.jump.take() {
            None if self.pattern_rows_remaining == 0 => {
                let next = self.pattern_index.map_or(0, |index| index + 1);
                if !self.select_pattern(next) {
                    return false;
                }
                0
            }
            None => self.row_index + 1,
            Some(jump) => {
                trace!(kind = ?jump.kind, pattern = jump.pattern, row = jump.row, "executing jump");
                if !self.select_pattern(jump.pattern) {
                    return false;
                }
                jump.row
            }
        };

        let module = &*self.module;
        let Some(order) = self.pattern_index else {
            return false;
        };
        let Some(pattern) = module.pattern(order) else {
            return false;
        };

        // Rows past the end of the pattern restart it
        self.row_index = if row < pattern.num_rows { row } else { 0 };
        self.pattern_rows_remaining = pattern.num_rows.saturating_sub(self.row_index + 1);
        self.row_ticks_remaining = self.timing.ticks_per_row;
        self.tick_index = 0;

        // Channels the pattern does not cover read as empty notes
        let notes = pattern.row(self.row_index).unwrap_or(&[]);
        for (channel, voice) in self.voices.iter_mut().enumerate() {
            let note = notes.get(channel).copied().unwrap_or_default();
            voice.assign_note(&note, module);

            if !note.has_effect() {
                continue;
            }
            if let Some(target_row) = apply_row_effects(voice, module.effects(voice.effect), module)
            {
                self.jump = Some(PendingJump {
                    kind: JumpKind::PatternBreak,
                    pattern: order + 1,
                    row: target_row as usize,
                });
            }
        }
        true
    }

    /// Make an order entry current
    ///
    /// Past the end of the order the song either ends or, when looping,
    /// resumes at the module's restart position.
    fn select_pattern(&mut self, order: usize) -> bool {
        let song_length = self.module.song_length();
        let order = if order < song_length {
            order
        } else if self.looping && song_length > 0 {
            let restart = if self.module.restart_position < song_length {
                self.module.restart_position
            } else {
                0
            };
            debug!(restart, "song looped");
            restart
        } else {
            debug!(order, song_length, "end of song");
            self.finished = true;
            return false;
        };

        trace!(order, "pattern selected");
        self.pattern_index = Some(order);
        self.pattern_rows_remaining = self.module.pattern_order[order].num_rows;
        true
    }
}
