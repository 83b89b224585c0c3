use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::*;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sm_frames::Background;

use crate::pipeline::MuxConfig;

mod pipeline;

/// Muxes a directory of still frames into a single MP4 file.
#[derive(Parser, Debug)]
#[command(name = "stillmux", version)]
struct Cli {
    /// Directory holding the .png and .svg frames.
    #[arg(long, env = "STILLMUX_FRAMES")]
    frames: PathBuf,

    /// Path of the MP4 file to create.
    #[arg(long, env = "STILLMUX_OUTPUT")]
    output: PathBuf,

    /// Frames per second, also used as the track timescale.
    #[arg(
        long,
        env = "STILLMUX_FPS",
        default_value_t = 16,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    fps: u32,

    /// Colour SVG frames are drawn onto, as RRGGBB or RRGGBBAA.
    #[arg(long, env = "STILLMUX_BACKGROUND", default_value_t = Background::default())]
    background: Background,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();
    debug!(?cli);

    let config = MuxConfig::new(cli.frames, cli.output, cli.fps, cli.background)?;
    let report = pipeline::run(&config)?;

    info!(
        "wrote {} ({} frames, {} bytes, {:.3}s of playback) in {:?}",
        report.output.display(),
        report.frames,
        report.bytes,
        report.duration_secs,
        report.elapsed
    );

    Ok(())
}
