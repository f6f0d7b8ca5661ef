//! Video wall mapper: command-line entry point.
//!
//! Loads the settings file, the persisted mapping and the host's device
//! snapshot, then runs one operator action against a [`MappingSession`].
//!
//! # Usage
//!
//! ```text
//! wall-mapper [--config <FILE>] <COMMAND>
//!
//! Commands:
//!   status                   Reconcile with the assigned devices and show progress
//!   merge <FILE>...          Merge recorded detections, one file per picture
//!   reset                    Clear every mapped display
//!   saved                    Acknowledge that the host saved the setup
//!   replay <DIR> [--cycles N]  Run the webcam loop over a directory of recordings
//!   init-config [--force]    Write a settings file with the defaults
//! ```
//!
//! `RUST_LOG` overrides the `[mapper] log_level` setting.
//!
//! Only the mapping itself is stored between runs.  The detection pause set
//! by `reset` and the unsaved-assignment flag live in the session of one
//! command, so `saved` only reports what the host is about to do.
//!
//! # Architecture overview
//!
//! ```text
//! main()
//!  └─ load AppConfig, mapping.json, devices.json
//!  └─ MappingSession::new()  -- owns the mapping, saves on change
//!  └─ command
//!       ├─ merge   → MappingSession::merge per recording
//!       └─ replay  → CaptureCycle::run (ScriptedFrameSource + RecordedDetector)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wall_mapper::application::capture_cycle::{CaptureCycle, CaptureSettings};
use wall_mapper::application::mapping_session::MappingSession;
use wall_mapper::infrastructure::capture::scripted::ScriptedFrameSource;
use wall_mapper::infrastructure::detector::recorded::{load_detection, RecordedDetector};
use wall_mapper::infrastructure::storage::config::{self, AppConfig};
use wall_mapper::infrastructure::storage::devices::load_devices;
use wall_mapper::infrastructure::storage::mapping_store::{load_mapping, JsonMappingStore};
use wall_mapper::infrastructure::storage::StoreError;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Maps the displays of a video wall from pictures of their markers.
#[derive(Debug, Parser)]
#[command(name = "wall-mapper", version)]
struct Cli {
    /// Settings file.  Defaults to `config.toml` in the platform config directory.
    #[arg(long, env = "WALL_MAPPER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile with the assigned devices and show mapping progress.
    Status,
    /// Merge recorded detections in the order given.
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Clear every mapped display.
    ///
    /// Detection pauses for the rest of this run only; the next command
    /// starts unpaused.
    Reset,
    /// Acknowledge that the host saved the setup and is updating devices.
    ///
    /// Acts on this run only: pause and assignment state are not stored
    /// between commands.
    Saved,
    /// Run the periodic capture loop over a directory of recordings.
    Replay {
        dir: PathBuf,
        /// Stop after this many cycles.
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// Write a settings file with the default values.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_file_path()?,
    };
    let app_config = config::load_config_from(&config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.mapper.log_level)),
        )
        .init();

    info!("video wall mapper starting with {}", config_path.display());

    if let Command::InitConfig { force } = cli.command {
        return init_config(&config_path, force);
    }

    let mut session = open_session(&app_config)?;

    match cli.command {
        Command::Status => {}
        Command::Merge { files } => {
            for file in &files {
                let detection = load_detection(file)?;
                let result = session.merge(&detection);
                info!(
                    "{}: {} marker(s), {} new display(s)",
                    file.display(),
                    result.marker_count,
                    result.added_count
                );
            }
        }
        Command::Reset => session.reset_mapping(),
        Command::Saved => session.acknowledge_save(),
        Command::Replay { dir, cycles } => {
            session = replay(session, &dir, CaptureSettings::from(&app_config.capture), cycles)
                .await?;
        }
        // Handled before the session opens.
        Command::InitConfig { .. } => {}
    }

    print_report(&session);
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", path.display());
    }
    config::save_config_to(&AppConfig::default(), path)
        .with_context(|| format!("writing settings to {}", path.display()))?;
    println!("wrote default settings to {}", path.display());
    Ok(())
}

/// Loads the mapping and reconciles it with the host's device snapshot.
fn open_session(app_config: &AppConfig) -> anyhow::Result<MappingSession> {
    let storage = &app_config.storage;
    let mapping = load_mapping(&storage.mapping_file)?;
    let store = JsonMappingStore::new(&storage.mapping_file);
    let mut session = MappingSession::new(mapping, Box::new(store));

    match load_devices(&storage.devices_file) {
        Ok(devices) => {
            session.observe_assignment(&devices);
        }
        Err(StoreError::Io { path, source }) if source.kind() == std::io::ErrorKind::NotFound => {
            warn!("no device snapshot at {}; keeping stored screens", path.display());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(session)
}

async fn replay(
    session: MappingSession,
    dir: &Path,
    settings: CaptureSettings,
    cycles: Option<usize>,
) -> anyhow::Result<MappingSession> {
    let detector = RecordedDetector::from_dir(dir)?;
    let source = ScriptedFrameSource::new(detector.frame_dimensions());
    let mut cycle = CaptureCycle::new(source, detector);

    let stop = cycle.stop_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; stopping capture");
                stop.stop();
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let shared = Arc::new(Mutex::new(session));
    if let Err(e) = cycle.run(Arc::clone(&shared), settings, cycles).await {
        error!("replay ended early: {e}");
    }

    Arc::try_unwrap(shared)
        .map(Mutex::into_inner)
        .map_err(|_| anyhow::anyhow!("mapping session still shared after replay"))
}

fn print_report(session: &MappingSession) {
    println!("{}", session.status());
    for (serial, progress) in session.progress() {
        println!("  {serial}: {progress}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
