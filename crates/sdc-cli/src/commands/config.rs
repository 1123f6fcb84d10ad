//! Config command - configuration management

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sdc_core::config::{Browser, Config};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{default_state_path, project_dirs};

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Config file to show (default: detect)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show the defaults for this browser instead
        #[arg(short, long)]
        browser: Option<String>,
    },

    /// Generate a configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "sdc.toml")]
        output: PathBuf,

        /// Browser to generate the configuration for
        #[arg(short, long, default_value = "chrome")]
        browser: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config and state file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs, global_config: Option<&Path>) -> Result<()> {
    match args.action {
        ConfigAction::Show { file, browser } => {
            show_config(file.as_deref().or(global_config), browser.as_deref())
        }
        ConfigAction::Generate {
            output,
            browser,
            force,
        } => generate_config(&output, &browser, force),
        ConfigAction::Validate { file } => validate_config(&file),
        ConfigAction::Paths => show_paths(),
    }
}

fn show_config(file: Option<&Path>, browser: Option<&str>) -> Result<()> {
    let config = if let Some(name) = browser {
        let browser = Browser::from_name(name).with_context(|| format!("Unknown browser: {name}"))?;
        Config::for_browser(browser)
    } else {
        super::load_config(file)?
    };

    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{toml_str}");
    Ok(())
}

fn generate_config(output: &Path, browser_name: &str, force: bool) -> Result<()> {
    let browser = Browser::from_name(browser_name)
        .with_context(|| format!("Unknown browser: {browser_name}"))?;

    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let config = Config::for_browser(browser);
    let toml_str = config.to_toml().context("Failed to serialize config")?;

    // Add header comment
    let content = format!(
        "# Self-destructing cache configuration\n\
         # Generated for browser: {browser}\n\
         # Whitelisted origins keep their cookies and site data\n\n\
         {toml_str}"
    );

    std::fs::write(output, content)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!(path = %output.display(), "Generated config file");
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: &Path) -> Result<()> {
    let config = Config::load(file)
        .with_context(|| format!("Failed to load config from {}", file.display()))?;

    config.validate().context("Configuration validation failed")?;
    let whitelist = config.whitelist()?;

    println!("{} Configuration is valid", "✓".green());
    println!("  Browser: {}", config.general.browser);
    println!(
        "  Whitelist: {} origins, {} root domains",
        whitelist.origins().len(),
        whitelist.len()
    );
    println!("  Grace period: {}s", config.schedule.grace_period_secs);
    println!(
        "  Sweep: first after {}s, then every {}s",
        config.schedule.sweep_delay_secs, config.schedule.sweep_interval_secs
    );
    println!("  Reset on startup: {}", config.deletion.reset_on_startup);

    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();

    for (index, path) in config_candidates().iter().enumerate() {
        println!("  {}. {}", index + 1, path.display());
    }

    println!();
    println!("Default state file:");
    println!();
    match default_state_path() {
        Some(path) => println!("  {}", path.display()),
        None => println!("  (no home directory; state is kept in memory)"),
    }

    Ok(())
}

fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("sdc.toml"), PathBuf::from("config.toml")];
    if let Some(dirs) = project_dirs() {
        candidates.push(dirs.config_dir().join("config.toml"));
    }
    candidates
}

/// First existing config file among the search paths
pub fn find_config_file() -> Option<PathBuf> {
    config_candidates().into_iter().find(|path| path.exists())
}
