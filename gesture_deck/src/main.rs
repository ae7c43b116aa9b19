//! gesture_deck — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gesture_deck::app::{run, AppConfig, QUICK_QUESTION};
use gesture_deck::config::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "gesture_deck", about = "Draw tarot cards with hand gestures")]
struct Args {
    /// Engine thresholds and timings (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip hand tracking; drive the session with clicks and the T key.
    #[arg(long)]
    touch: bool,

    /// Seed for card orientations (default: clock).
    #[arg(long)]
    seed: Option<u64>,

    /// Start straight into a daily reading without prompting.
    #[arg(long)]
    quick: bool,

    /// Use the built-in card meanings instead of the reading service.
    #[arg(long)]
    offline: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Deck — Hand-Drawn Tarot Selection           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Tracking: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Tracking: mouse simulation  (use --features leap for hardware)");
    println!();

    let engine = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos() as u64)
    });

    let question = if args.quick {
        println!("  Quick-start: daily card, \"{}\"\n", QUICK_QUESTION);
        String::new()
    } else {
        read_line("  What is your question? (Enter to let the cards speak): ").trim().to_string()
    };

    let cfg = AppConfig {
        engine,
        touch: args.touch,
        seed,
        quick: args.quick,
        question,
        offline: args.offline,
        ..AppConfig::default()
    };

    println!();
    println!("  Opening visualizer window…");
    println!();

    run(cfg).map_err(anyhow::Error::msg)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
