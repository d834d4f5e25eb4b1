//! Stream Render Tool
//!
//! Renders tracker songs through nether-stream into WAV files, for checking
//! engine output without an audio device.

mod cli;
mod demo;
mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nether_stream::{Stream, StreamConfig};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, Overrides};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Render {
            out,
            config,
            bpm,
            ticks_per_row,
            volume,
            looping,
            max_seconds,
        } => {
            let overrides = Overrides {
                bpm,
                ticks_per_row,
                volume,
                looping,
            };
            let config = render::build_config(config.as_deref(), overrides)?;
            let mut stream = open_demo(config)?;

            let summary = render::render_wav(&mut stream, &out, max_seconds)?;
            println!(
                "Wrote {} ({} ticks, {:.2}s{})",
                out.display(),
                summary.ticks,
                summary.frames as f64 / f64::from(stream.timing().sample_rate),
                if summary.finished { "" } else { ", truncated" }
            );
        }
        Commands::Info { config } => {
            let config = render::build_config(config.as_deref(), Overrides::default())?;
            print_info(&open_demo(config)?);
        }
    }

    Ok(())
}

fn open_demo(config: StreamConfig) -> Result<Stream> {
    Stream::new(Arc::new(demo::demo_module()), config).context("Failed to configure stream")
}

fn print_info(stream: &Stream) {
    let info = stream.info();
    println!("Module:         {}", stream.module().name);
    println!("Song length:    {} patterns", info.song_length);
    println!("Voices:         {}", info.num_voices);
    println!("Sample rate:    {} Hz", info.sample_rate);
    println!("BPM:            {}", info.bpm);
    println!("Ticks per row:  {}", info.ticks_per_row);
    println!("Bytes per tick: {}", info.bytes_per_tick);
    println!("Volume:         {:.2}", stream.volume());
}
