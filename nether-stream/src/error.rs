//! Stream configuration error types

use std::path::PathBuf;

use crate::SUPPORTED_SAMPLE_RATE;

/// Errors raised while configuring a stream
///
/// Playback itself never fails; every variant is reported before any
/// playback state is built.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Requested output sample rate is not supported
    #[error("unsupported sample rate {0} (only {rate} is supported)", rate = SUPPORTED_SAMPLE_RATE)]
    UnsupportedSampleRate(u32),

    /// Config file could not be read
    #[error("failed to read stream config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for a stream config
    #[error("invalid stream config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
