//! Pull-based PCM stream over a compiled module
//!
//! Playback is driven entirely by [`Stream::fill`]: each call advances the
//! sequencer tick by tick and renders whole ticks of interleaved stereo
//! 16-bit little-endian PCM. The [`io::Read`] impl sits on top of it and
//! accepts buffers of any size.
//!
//! - `sequencer`: order/row/tick advancement and pattern jumps
//! - `effects`: row-scoped and tick-scoped effect interpretation
//! - `mixer`: per-frame voice mixing and sample loop handling

mod effects;
mod mixer;
mod sequencer;


use std::io;
use std::sync::Arc;

use tracing::debug;

use crate::config::{StreamConfig, Timing};
use crate::error::StreamError;
use crate::module::CompiledModule;
use crate::utils::clamp_unit;
use crate::voice::Voice;

pub use sequencer::{JumpKind, PendingJump};

/// Static facts about a configured stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// PCM bytes produced per tick; `fill` buffers should be a multiple
    pub bytes_per_tick: usize,
    /// Output sample rate (Hz)
    pub sample_rate: u32,
    /// Effective tempo
    pub bpm: u16,
    /// Effective speed
    pub ticks_per_row: u16,
    /// Number of voices mixed
    pub num_voices: usize,
    /// Entries in the play order
    pub song_length: usize,
}

/// Playback position (order entry, row, tick)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub order: usize,
    pub row: usize,
    pub tick: u16,
}

/// Module playback stream
pub struct Stream {
    module: Arc<CompiledModule>,
    timing: Timing,
    volume_scaling: f64,
    looping: bool,
    voices: Vec<Voice>,

    // Sequencer state
    pattern_index: Option<usize>,
    pattern_rows_remaining: usize,
    row_index: usize,
    row_ticks_remaining: u16,
    tick_index: u16,
    jump: Option<PendingJump>,
    finished: bool,

    // One rendered tick held back for reads shorter than a tick
    read_buf: Vec<u8>,
    read_pos: usize,
    read_len: usize,
}

impl Stream {
    /// Configure a stream for a module
    ///
    /// Tempo, speed and sample rate are fixed here; only the global volume
    /// can change afterwards.
    pub fn new(module: Arc<CompiledModule>, config: StreamConfig) -> Result<Self, StreamError> {
        let timing = config.resolve(&module)?;
        debug!(
            module = %module.name,
            channels = module.num_channels,
            song_length = module.song_length(),
            "stream created"
        );

        Ok(Self {
            voices: vec![Voice::default(); module.num_channels],
            module,
            timing,
            volume_scaling: config.clamped_volume(),
            looping: config.looping,
            pattern_index: None,
            pattern_rows_remaining: 0,
            row_index: 0,
            row_ticks_remaining: 0,
            tick_index: 0,
            jump: None,
            finished: false,
            read_buf: vec![0; timing.bytes_per_tick],
            read_pos: 0,
            read_len: 0,
        })
    }

    /// Set the global volume scaling, clamped into [0, 1] (NaN = silence)
    pub fn set_volume(&mut self, volume: f64) {
        self.volume_scaling = clamp_unit(volume);
    }

    /// Current global volume scaling
    pub fn volume(&self) -> f64 {
        self.volume_scaling
    }

    /// PCM bytes per tick
    pub fn bytes_per_tick(&self) -> usize {
        self.timing.bytes_per_tick
    }

    /// Resolved timing
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// The module being played
    pub fn module(&self) -> &Arc<CompiledModule> {
        &self.module
    }

    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            bytes_per_tick: self.timing.bytes_per_tick,
            sample_rate: self.timing.sample_rate,
            bpm: self.timing.bpm,
            ticks_per_row: self.timing.ticks_per_row,
            num_voices: self.voices.len(),
            song_length: self.module.song_length(),
        }
    }

    /// Position of the last rendered tick (None before the first tick)
    pub fn position(&self) -> Option<Position> {
        let order = self.pattern_index?;
        Some(Position {
            order,
            row: self.row_index,
            tick: self.tick_index,
        })
    }

    /// Whether the song has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Render as many whole ticks as fit into `out`
    ///
    /// Returns the number of bytes written, always a multiple of
    /// [`bytes_per_tick`](Self::bytes_per_tick). A buffer shorter than one
    /// tick yields `Some(0)`. Returns `None` once the song is over and
    /// nothing was written. Bytes held back by a short `read` are not
    /// included.
    pub fn fill(&mut self, out: &mut [u8]) -> Option<usize> {
        if self.finished {
            return None;
        }

        let bytes_per_tick = self.timing.bytes_per_tick;
        let mut written = 0;
        while out.len() - written >= bytes_per_tick {
            if !self.advance_tick() {
                break;
            }
            self.render_tick(&mut out[written..written + bytes_per_tick]);
            written += bytes_per_tick;
        }

        if written == 0 && self.finished {
            None
        } else {
            Some(written)
        }
    }

    /// Restart playback from the first row of the first pattern
    ///
    /// Voices are reset in place, so the output after a rewind is identical
    /// to that of a freshly created stream with the same volume.
    pub fn rewind(&mut self) {
        self.pattern_index = None;
        self.pattern_rows_remaining = 0;
        self.row_index = 0;
        self.row_ticks_remaining = 0;
        self.tick_index = 0;
        self.jump = None;
        self.finished = false;
        self.read_pos = 0;
        self.read_len = 0;
        for voice in &mut self.voices {
            voice.reset();
        }
    }
}

impl io::Read for Stream {
    /// Reads PCM bytes; end of song reads as `Ok(0)`
    ///
    /// Buffers of at least one tick get whole ticks rendered straight into
    /// them. Shorter buffers are served from a rendered tick kept in the
    /// stream, so any buffer size works with `read_to_end` and `io::copy`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.read_pos == self.read_len {
            if buf.len() >= self.timing.bytes_per_tick {
                return Ok(self.fill(buf).unwrap_or(0));
            }
            if !self.advance_tick() {
                return Ok(0);
            }
            let mut tick = std::mem::take(&mut self.read_buf);
            self.render_tick(&mut tick);
            self.read_buf = tick;
            self.read_pos = 0;
            self.read_len = self.read_buf.len();
        }

        let n = buf.len().min(self.read_len - self.read_pos);
        buf[..n].copy_from_slice(&self.read_buf[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        Ok(n)
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("module", &self.module.name)
            .field("timing", &self.timing)
            .field("volume_scaling", &self.volume_scaling)
            .field("position", &self.position())
            .field("finished", &self.finished)
            .finish()
    }
}
