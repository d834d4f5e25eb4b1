//! Nether-Stream: pull-based tracker module playback
//!
//! Renders a [`CompiledModule`] into interleaved stereo 16-bit PCM at
//! 44100 Hz, one tick at a time, on the caller's thread.
//!
//! # Architecture
//!
//! ```text
//!   Arc<CompiledModule> ──┐      StreamConfig (bpm, speed, volume, looping)
//!                         ▼             │
//!                 ┌─────────────────────▼──────┐
//!                 │           Stream           │
//!                 │  sequencer ─► row effects  │
//!                 │      │                     │
//!                 │      ▼                     │
//!                 │  tick effects ─► voices    │
//!                 │      │                     │
//!                 │      ▼                     │
//!                 │    mixer ─► [u8] PCM       │
//!                 └────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nether_stream::{CompiledModule, Stream, StreamConfig};
//!
//! # fn load() -> CompiledModule { CompiledModule::default() }
//! let module = Arc::new(load());
//! let mut stream = Stream::new(module, StreamConfig::default())?;
//!
//! let mut buf = vec![0u8; stream.bytes_per_tick() * 16];
//! while let Some(n) = stream.fill(&mut buf) {
//!     // hand buf[..n] to the audio device
//!     # let _ = n;
//! }
//! # Ok::<(), nether_stream::StreamError>(())
//! ```

mod config;
mod envelope;
mod error;
pub mod module;
mod stream;
mod utils;
mod voice;

pub use config::{StreamConfig, Timing};
pub use envelope::EnvelopeRunner;
pub use error::StreamError;
pub use module::{
    CompiledModule, EffectCommand, EffectKey, Envelope, EnvelopeFlags, EnvelopePoint, Instrument,
    InstrumentSample, LoopType, NoteFlags, NoteKind, Pattern, PatternNote,
};
pub use stream::{JumpKind, PendingJump, Position, Stream, StreamInfo};
pub use utils::{clamp_unit, note_to_period, pan_gains, period_to_frequency, samples_per_tick};
pub use voice::Voice;

// =============================================================================
// Output format
// =============================================================================

/// The only supported output sample rate (Hz)
pub const SUPPORTED_SAMPLE_RATE: u32 = 44100;

/// Bytes per stereo frame (2 channels * 16-bit)
pub const BYTES_PER_FRAME: usize = 4;

/// Gain applied to every voice before summing, leaves room for several
/// full-scale voices before clipping
pub const MIXER_HEADROOM: f64 = 0.25;

// =============================================================================
// Defaults
// =============================================================================

/// Tempo used when neither the config nor the module sets one
pub const DEFAULT_BPM: u16 = 120;

/// Speed used when neither the config nor the module sets one
pub const DEFAULT_TICKS_PER_ROW: u16 = 6;

/// Default global volume scaling
pub const DEFAULT_VOLUME: f64 = 0.8;
