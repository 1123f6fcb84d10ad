//! CLI commands

pub mod completions;
pub mod config;
pub mod domain;
pub mod replay;
pub mod run;

use anyhow::{Context, Result};
use clap::Subcommand;
use sdc_core::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the background live against JSON-lines events on stdin
    Run(run::RunArgs),

    /// Replay a scripted browsing session in simulated time
    Replay(replay::ReplayArgs),

    /// Show how URLs map to hostnames, root domains and the whitelist
    Domain(domain::DomainArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Project directories used for config discovery and default state
pub(crate) fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "self-destructing-cache")
}

/// Load the configuration to run with
///
/// An explicit path must exist. Without one the usual locations are
/// searched, falling back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match config::find_config_file() {
            Some(found) => {
                debug!(path = %found.display(), "Using discovered config file");
                Config::load(&found)
                    .with_context(|| format!("Failed to load config from {}", found.display()))?
            }
            None => Config::default(),
        },
    };

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Default location of the persisted state file
pub fn default_state_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("state.json"))
}
