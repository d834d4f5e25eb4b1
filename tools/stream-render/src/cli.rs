//! CLI command definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stream-render")]
#[command(about = "Render tracker modules to WAV through nether-stream")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the built-in demo song to a 16-bit stereo WAV file
    Render {
        /// Output WAV path
        #[arg(long, short, default_value = "demo.wav")]
        out: PathBuf,

        /// Stream config TOML (flags below override its values)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Beats per minute
        #[arg(long)]
        bpm: Option<u16>,

        /// Ticks per pattern row
        #[arg(long)]
        ticks_per_row: Option<u16>,

        /// Global volume (0.0-1.0)
        #[arg(long)]
        volume: Option<f64>,

        /// Loop the song from its restart position
        #[arg(long = "loop")]
        looping: bool,

        /// Stop after this many seconds of audio
        #[arg(long, default_value_t = 120.0)]
        max_seconds: f64,
    },

    /// Print stream timing for the built-in demo song
    Info {
        /// Stream config TOML
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

/// Stream settings given on the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub bpm: Option<u16>,
    pub ticks_per_row: Option<u16>,
    pub volume: Option<f64>,
    pub looping: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::parse_from([
            "stream-render",
            "render",
            "--out",
            "song.wav",
            "--bpm",
            "140",
            "--volume",
            "0.5",
            "--loop",
            "--max-seconds",
            "10",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Render {
                out,
                bpm,
                volume,
                looping,
                max_seconds,
                ticks_per_row,
                config,
            } => {
                assert_eq!(out, PathBuf::from("song.wav"));
                assert_eq!(bpm, Some(140));
                assert_eq!(volume, Some(0.5));
                assert!(looping);
                assert_eq!(max_seconds, 10.0);
                assert_eq!(ticks_per_row, None);
                assert_eq!(config, None);
            }
            Commands::Info { .. } => panic!("expected render"),
        }
    }
}
