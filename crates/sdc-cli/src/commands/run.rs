//! Run command - live background driven by JSON-lines events on stdin

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use sdc_core::{
    Background, Config, Host, HostEvent, KeyValueStore, SweepReport, SystemClock,
};
use sdc_platform::{FileStorage, MemoryStorage, RecordingDeletion, TabRegistry, TokioTimer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Run command arguments
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// State file (default: platform data directory)
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, conflicts_with = "state")]
    pub ephemeral: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run_live(config, args))
}

fn open_storage(args: &RunArgs) -> Result<Arc<dyn KeyValueStore>> {
    if args.ephemeral {
        return Ok(Arc::new(MemoryStorage::new()));
    }

    let Some(path) = args.state.clone().or_else(super::default_state_path) else {
        warn!("No data directory available, keeping state in memory");
        return Ok(Arc::new(MemoryStorage::new()));
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let storage = FileStorage::open(&path)
        .with_context(|| format!("Failed to open state file {}", path.display()))?;
    info!(path = %path.display(), "Using state file");
    Ok(Arc::new(storage))
}

async fn run_live(config: Config, args: RunArgs) -> Result<()> {
    let storage = open_storage(&args)?;
    let (timer, mut alarms) = TokioTimer::new();
    let tabs = Arc::new(TabRegistry::new());
    let deletion = Arc::new(RecordingDeletion::new());

    let host = Host {
        tabs: tabs.clone(),
        deletion: deletion.clone(),
        storage,
        timer: Arc::new(timer),
        clock: Arc::new(SystemClock),
    };
    let background = Background::new(&config, host).context("Failed to build background")?;
    background.start().context("Failed to start background")?;
    print_removals(&deletion);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Waiting for events on stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        if let Err(e) = handle_line(&background, &tabs, &line) {
                            warn!("{:#}", e);
                        }
                    }
                    None => {
                        info!("End of input, shutting down...");
                        break;
                    }
                }
            }
            Some(name) = alarms.recv() => {
                if let Err(e) = background.on_alarm(&name) {
                    warn!(alarm = %name, "Alarm handler failed: {}", e);
                }
            }
            _ = &mut ctrl_c => {
                info!("Received interrupt signal, shutting down...");
                break;
            }
        }
        print_removals(&deletion);
    }

    background.on_suspend();
    print_removals(&deletion);
    Ok(())
}

/// Parse one input line and dispatch it
///
/// Blank lines and `#` comments are skipped. Tab URLs and closures are
/// mirrored into `tabs` before the background sees the event.
pub fn handle_line(
    background: &Background,
    tabs: &TabRegistry,
    line: &str,
) -> Result<Option<SweepReport>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let event: HostEvent =
        serde_json::from_str(line).with_context(|| format!("Invalid event: {line}"))?;
    debug!(kind = event.kind(), "Received event");

    match &event {
        HostEvent::TabUpdated {
            tab_id,
            url: Some(url),
        } => tabs.navigate(*tab_id, url),
        HostEvent::TabRemoved { tab_id } => {
            tabs.close(*tab_id);
        }
        _ => {}
    }

    background
        .handle(&event)
        .with_context(|| format!("Failed to handle {} event", event.kind()))
}

fn print_removals(deletion: &RecordingDeletion) {
    for request in deletion.take() {
        println!(
            "{} {} [{}]",
            "remove".bold(),
            request.scope,
            request.data_types
        );
    }
}
