use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use call_relay::config::RelayConfig;
use call_relay::relay::{CallRecord, CallSnapshot, CallStateRelay, EpochClock};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "relay_cli",
    about = "Deterministic call-state replay harness for the relay core"
)]
struct Cli {
    /// Optional JSON config file controlling diagnostics behavior
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON script of call snapshots and print emitted records
    Replay {
        #[arg(long)]
        script: PathBuf,
        /// Print relay diagnostics after the replay
        #[arg(long, default_value_t = false)]
        stats: bool,
    },
    /// Run a built-in single-call demo sequence
    Demo,
}

/// One scripted notification: the snapshot plus the epoch time at which
/// the relay should believe it arrived.
#[derive(Debug, Deserialize)]
struct ScriptStep {
    at: f64,
    call: CallSnapshot,
}

fn main() -> ExitCode {
    call_relay::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => RelayConfig::load_from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RelayConfig::default(),
    };

    match cli.command {
        Commands::Replay { script, stats } => run_replay(&config, &script, stats),
        Commands::Demo => run_demo(&config),
    }
}

fn scripted_relay(config: &RelayConfig) -> (CallStateRelay, Arc<Mutex<f64>>) {
    let time = Arc::new(Mutex::new(0.0_f64));
    let handle = Arc::clone(&time);
    let clock: EpochClock = Arc::new(move || *handle.lock().unwrap());

    // Replays are for inspection; always trace what goes through.
    let relay_config = RelayConfig {
        trace_notifications: true,
        ..config.clone()
    };

    let relay = CallStateRelay::with_config_and_clock(&relay_config, clock);
    (relay, time)
}

fn run_replay(config: &RelayConfig, script: &Path, stats: bool) -> Result<ExitCode> {
    let contents = fs::read_to_string(script)
        .with_context(|| format!("reading script {}", script.display()))?;
    let steps: Vec<ScriptStep> =
        serde_json::from_str(&contents).with_context(|| "parsing replay script")?;

    let (relay, time) = scripted_relay(config);
    let (tx, mut rx) = mpsc::unbounded_channel();
    relay.set_sink(Some(tx));

    for step in &steps {
        *time.lock().unwrap() = step.at;
        relay.on_call_changed(step.call);
    }

    while let Ok(record) = rx.try_recv() {
        emit_record(&record)?;
    }

    if stats {
        let snapshot = relay.stats_snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(ExitCode::from(0))
}

fn run_demo(config: &RelayConfig) -> Result<ExitCode> {
    let id = Uuid::new_v4();
    let ringing = CallSnapshot {
        id,
        is_outgoing: true,
        has_connected: false,
        has_ended: false,
        is_on_hold: false,
    };
    let connected = CallSnapshot {
        has_connected: true,
        ..ringing
    };
    let ended = CallSnapshot {
        has_ended: true,
        ..connected
    };

    let (relay, time) = scripted_relay(config);
    let (tx, mut rx) = mpsc::unbounded_channel();
    relay.set_sink(Some(tx));

    relay.on_call_changed(ringing);
    *time.lock().unwrap() = 2.5;
    relay.on_call_changed(connected);

    // Mid-call pull query, the way a shell asks for state on startup.
    *time.lock().unwrap() = 10.0;
    for record in relay.active_call_info() {
        println!("active: {}", serde_json::to_string(&record)?);
    }

    *time.lock().unwrap() = 14.0;
    relay.on_call_changed(ended);

    while let Ok(record) = rx.try_recv() {
        emit_record(&record)?;
    }

    Ok(ExitCode::from(0))
}

fn emit_record(record: &CallRecord) -> Result<()> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}
