//! Logging initialization
//!
//! Logs go to stderr so command output on stdout stays clean.

use anyhow::{Context, Result};
use sdc_core::config::LoggingConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::{Args, LogFormat};

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Default level when `RUST_LOG` is unset
    pub level: Level,
    /// Output format
    pub format: LogFormat,
    /// Extra plain-text (or JSON) log file
    pub file: Option<PathBuf>,
    /// Include targets, thread ids and source locations
    pub detail: u8,
}

impl LogSettings {
    /// Combine command-line flags with the `[logging]` config section
    ///
    /// Flags win; the config file fills in what they leave unset.
    pub fn resolve(args: &Args, config: &LoggingConfig) -> Self {
        let level = if args.quiet {
            Level::ERROR
        } else {
            match args.verbose {
                0 => config.level.parse().unwrap_or(Level::INFO),
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };

        let format = if args.log_format == LogFormat::Text && config.json_format {
            LogFormat::Json
        } else {
            args.log_format
        };

        Self {
            level,
            format,
            file: args
                .log_file
                .clone()
                .or_else(|| config.file.as_ref().map(PathBuf::from)),
            detail: args.verbose,
        }
    }
}

/// Initialize logging
pub fn init(settings: &LogSettings) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(settings.level.into())
        .from_env_lossy();

    let log_file = settings
        .file
        .as_ref()
        .map(|path| {
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))
        })
        .transpose()?;

    match settings.format {
        LogFormat::Text => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(settings.detail >= 2)
                    .with_thread_ids(settings.detail >= 3)
                    .with_file(settings.detail >= 3)
                    .with_line_number(settings.detail >= 3),
            );

            if let Some(file) = log_file {
                subscriber
                    .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                    .init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr));

            if let Some(file) = log_file {
                subscriber
                    .with(fmt::layer().json().with_writer(Arc::new(file)))
                    .init();
            } else {
                subscriber.init();
            }
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
