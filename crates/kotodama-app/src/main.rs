//! Kotodama - floating word-glyph emotion visualizer
//!
//! Words drift, fade, and bounce through a 3D volume over an animated
//! emotion-colored gradient. Words and emotion scores normally come from
//! upstream collaborators (face reading, word generation); here they
//! arrive on the command line.
//!
//! Usage:
//!   kotodama --words "希望,不安" --emotions "happy=0.8,sad=0.2"

mod app;
mod palette;

use anyhow::{Context, Result};
use app::VisualizerApp;
use clap::Parser;
use kotodama_core::KotodamaError;
use kotodama_runtime::{AppConfig, PerformanceProfiler};
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "kotodama")]
#[command(about = "Floating word-glyph emotion visualizer")]
struct Args {
    /// Words to float, comma-separated
    #[arg(long, default_value = "希望,不安,期待,記憶")]
    words: String,

    /// Emotion intensities as name=value pairs, comma-separated
    #[arg(long, default_value = "calm=0.6")]
    emotions: String,

    /// Path to the config file
    #[arg(long, default_value = "kotodama.toml")]
    config: PathBuf,

    /// Override the config's font path
    #[arg(long)]
    font: Option<String>,

    /// Start in stereoscopic (dual-viewport) mode
    #[arg(long)]
    stereo: bool,

    /// Launch fullscreen
    #[arg(long)]
    fullscreen: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config).context("Failed to load config")?;
    if let Some(font) = args.font {
        config.font = font;
    }

    let words: Vec<String> = args
        .words
        .split(',')
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect();
    let emotions = palette::parse_emotions(&args.emotions);

    // No GPU adapter: the 3D path never starts. Show the words as plain
    // text instead.
    if !kotodama_render::probe_adapter() {
        let err = KotodamaError::Capability("no GPU-accelerated adapter available".into());
        eprintln!("[app] {err}");
        println!("{}", words.join("  "));
        return Ok(());
    }

    let tier = PerformanceProfiler::probe();
    let colors = palette::palette_for(&emotions);

    println!("Controls:");
    println!("  S        - Toggle stereo view");
    println!("  F11      - Toggle fullscreen");
    println!("  Escape   - Exit");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let stereo = args.stereo || config.stereo;
    let mut app = VisualizerApp::new(config, words, colors, tier, stereo, args.fullscreen);
    event_loop.run_app(&mut app)?;

    Ok(())
}
