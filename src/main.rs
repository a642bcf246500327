#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::fs::File;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use band_life::{BandLife, BandLifeConfig, TerminalSink, TextSink, load_seed};
use clap::Parser;
use log::info;

/// Conway's Game of Life on a torus, advanced by banded worker threads
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Seed file: row count, column count, live cell count, then `col row` pairs
    #[arg(short, long)]
    config: PathBuf,

    /// Number of generations to simulate
    #[arg(short, long, default_value_t = 20)]
    turns: u64,

    /// Delay between frames in milliseconds
    #[arg(short, long, default_value_t = 100)]
    delay: u64,

    /// Number of worker threads
    #[arg(short = 'p', long, default_value = "2")]
    threads: NonZeroUsize,

    /// Stream frames as plain text instead of animating the terminal
    #[arg(long)]
    headless: bool,

    /// Exit right after the final frame instead of waiting for a key
    #[arg(long)]
    no_pause: bool,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Log level used when `RUST_LOG` is unset.
///
/// stderr shares the terminal the animation draws on, so unless logs go to a
/// file or frames are plain text only warnings and errors are let through.
fn default_log_filter(headless: bool, log_file: Option<&Path>) -> &'static str {
    if headless || log_file.is_some() {
        "info"
    } else {
        "warn"
    }
}

fn init_logging(headless: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = default_log_filter(headless, log_file);
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.format_timestamp_micros().init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.headless, args.log_file.as_deref())?;

    info!("config file: {}", args.config.display());
    info!("number of turns: {}", args.turns);
    info!("delay between turns: {} ms", args.delay);
    info!("worker threads: {}", args.threads);

    let grid = load_seed(&args.config).context("error initializing the world")?;
    let config = BandLifeConfig::default()
        .thread_count(args.threads.get())
        .turn_delay(Duration::from_millis(args.delay));
    let mut engine = BandLife::with_config(grid, config);

    if args.headless {
        let mut sink = TextSink::new(io::stdout());
        engine.run(args.turns, &mut sink)?;
    } else {
        let mut sink = TerminalSink::stdout().context("failed to set up the terminal")?;
        engine.run(args.turns, &mut sink)?;
        if !args.no_pause {
            sink.pause_for_key()?;
        }
        sink.close()?;
    }

    info!(
        "finished at generation {} with population {}",
        engine.generation(),
        engine.population()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_mode_keeps_info_off_the_screen() {
        assert_eq!(default_log_filter(false, None), "warn");
        assert_eq!(default_log_filter(false, Some(Path::new("run.log"))), "info");
        assert_eq!(default_log_filter(true, None), "info");
    }

    #[test]
    fn cli_defaults() {
        let args = Args::parse_from(["band-life", "-c", "seed.txt"]);
        assert_eq!(args.turns, 20);
        assert_eq!(args.delay, 100);
        assert_eq!(args.threads.get(), 2);
        assert!(!args.headless && args.log_file.is_none());
    }
}
