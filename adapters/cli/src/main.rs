#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Lanecraft session headlessly.
//!
//! Snapshots are written to stdout as one JSON document per line; logs go to
//! stderr and honour `RUST_LOG`.

mod script;

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use lanecraft_session::{GameSession, SessionDriver};
use lanecraft_world::{snapshot::Snapshot, SessionBlueprint};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::script::Script;

/// Headless Lanecraft simulation runner.
#[derive(Parser, Debug)]
#[command(name = "lanecraft", author, version, about, long_about = None)]
struct Args {
    /// Session blueprint in TOML (default: built-in two-lane map)
    #[arg(long)]
    blueprint: Option<PathBuf>,

    /// Number of ticks to simulate in headless mode
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Milliseconds per headless tick (default: derived from the tick rate)
    #[arg(long)]
    dt: Option<f64>,

    /// Run the threaded driver for this many wall-clock seconds instead
    #[arg(long)]
    realtime: Option<f64>,

    /// JSON-lines file of commands, each tagged with the tick it precedes
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let blueprint = load_blueprint(args.blueprint.as_deref())?;
    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };
    let session = GameSession::new(&blueprint).context("failed to build the game session")?;

    match args.realtime {
        Some(seconds) => run_realtime(session, &script, seconds),
        None => {
            let dt = match args.dt {
                Some(dt) => {
                    ensure!(
                        dt.is_finite() && dt >= 0.0,
                        "--dt must be a finite, non-negative number of milliseconds, got {dt}"
                    );
                    dt
                }
                None => session.tick_interval().as_secs_f64() * 1000.0,
            };
            run_headless(session, &script, args.ticks, dt)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_blueprint(path: Option<&Path>) -> Result<SessionBlueprint> {
    let Some(path) = path else {
        return Ok(SessionBlueprint::reference());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read blueprint {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse blueprint {}", path.display()))
}

fn run_headless(mut session: GameSession, script: &Script, ticks: u64, dt: f64) -> Result<()> {
    info!(target: "lanecraft_cli", ticks, dt, "running headless session");
    let mut out = BufWriter::new(io::stdout().lock());
    for tick in 0..ticks {
        for command in script.due(tick) {
            let _ = session.dispatch(command.clone());
        }
        let snapshot = session.tick_with(dt);
        write_snapshot(&mut out, &snapshot)?;
    }
    out.flush().context("failed to flush snapshots")
}

fn run_realtime(session: GameSession, script: &Script, seconds: f64) -> Result<()> {
    let wall = Duration::try_from_secs_f64(seconds.max(0.0))
        .context("realtime duration is out of range")?;
    let interval = session.tick_interval();
    let commands = session.commands();
    info!(target: "lanecraft_cli", seconds, "running realtime session");

    let driver = SessionDriver::spawn(session);
    driver.start();

    let entries = script.entries().to_vec();
    let started = Instant::now();
    let feeder = thread::spawn(move || {
        for entry in entries {
            let at = interval.saturating_mul(u32::try_from(entry.tick).unwrap_or(u32::MAX));
            if at > wall {
                break;
            }
            thread::sleep(at.saturating_sub(started.elapsed()));
            let _ = commands.dispatch(entry.command);
        }
    });

    thread::sleep(wall);
    let session = driver.shutdown()?;
    if feeder.join().is_err() {
        warn!(target: "lanecraft_cli", "script feeder panicked");
    }

    let mut out = BufWriter::new(io::stdout().lock());
    write_snapshot(&mut out, &session.snapshot())?;
    out.flush().context("failed to flush snapshot")
}

fn write_snapshot(out: &mut impl Write, snapshot: &Snapshot) -> Result<()> {
    serde_json::to_writer(&mut *out, snapshot).context("failed to encode snapshot")?;
    writeln!(out).context("failed to write snapshot")
}
