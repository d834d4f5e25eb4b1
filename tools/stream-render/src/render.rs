//! Stream to WAV rendering

use std::path::Path;

use anyhow::{Context, Result};
use nether_stream::{BYTES_PER_FRAME, Stream, StreamConfig};
use tracing::{debug, info};

use crate::cli::Overrides;

/// Ticks rendered per `fill` call
const TICKS_PER_FILL: usize = 16;

/// Outcome of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    /// Stereo frames written
    pub frames: u64,
    /// Ticks rendered
    pub ticks: u64,
    /// The song ended before the time limit
    pub finished: bool,
}

/// Load the config file (if any) and apply command line overrides
pub fn build_config(path: Option<&Path>, overrides: Overrides) -> Result<StreamConfig> {
    let mut config = match path {
        Some(path) => StreamConfig::load(path)
            .with_context(|| format!("Failed to load stream config {}", path.display()))?,
        None => StreamConfig::default(),
    };

    if let Some(bpm) = overrides.bpm {
        config.bpm = bpm;
    }
    if let Some(ticks_per_row) = overrides.ticks_per_row {
        config.ticks_per_row = ticks_per_row;
    }
    if let Some(volume) = overrides.volume {
        config.volume = volume;
    }
    if overrides.looping {
        config.looping = true;
    }
    Ok(config)
}

/// Render a stream into a 16-bit stereo WAV file
///
/// Stops at the end of the song or once `max_seconds` of audio (rounded up
/// to a whole tick) have been written.
pub fn render_wav(stream: &mut Stream, path: &Path, max_seconds: f64) -> Result<RenderSummary> {
    let timing = stream.timing();
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: timing.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let max_frames = (max_seconds.max(0.0) * f64::from(timing.sample_rate)) as u64;
    let samples_per_tick = timing.samples_per_tick as u64;
    let mut buf = vec![0u8; timing.bytes_per_tick * TICKS_PER_FILL];
    let mut frames = 0u64;
    let mut ticks = 0u64;

    let finished = loop {
        if frames >= max_frames {
            break false;
        }
        let ticks_left = (max_frames - frames).div_ceil(samples_per_tick);
        let len = buf
            .len()
            .min(ticks_left as usize * timing.bytes_per_tick);

        let Some(written) = stream.fill(&mut buf[..len]) else {
            break true;
        };
        for sample in buf[..written].chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
        }
        frames += (written / BYTES_PER_FRAME) as u64;
        ticks += (written / timing.bytes_per_tick) as u64;
        debug!(frames, ticks, "rendered chunk");
    };

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize {}", path.display()))?;

    let summary = RenderSummary {
        frames,
        ticks,
        finished,
    };
    info!(
        frames,
        ticks,
        finished,
        seconds = frames as f64 / f64::from(timing.sample_rate),
        "render complete"
    );
    Ok(summary)
}
