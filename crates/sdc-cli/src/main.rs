//! Self-destructing cache CLI
//!
//! Runs the background logic against replayed or live browser events.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use sdc_core::config::LoggingConfig;
use tracing::{debug, error};

use args::Args;
use commands::Command;

fn main() -> Result<()> {
    let args = Args::parse();

    // The logging section comes from the same file the command will load;
    // a broken file is reported by the command itself.
    let logging_config = commands::load_config(args.config.as_deref())
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    logging::init(&logging::LogSettings::resolve(&args, &logging_config))?;
    debug!(?args, "Parsed arguments");

    if !args.quiet && matches!(args.command, None | Some(Command::Run(_))) {
        print_banner();
    }

    let result = run(args);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args) -> Result<()> {
    let config = args.config.as_deref();
    match args.command {
        Some(Command::Run(run_args)) => commands::run::execute(run_args, config),
        Some(Command::Replay(replay_args)) => commands::replay::execute(replay_args, config),
        Some(Command::Domain(domain_args)) => commands::domain::execute(domain_args, config),
        Some(Command::Config(config_args)) => commands::config::execute(config_args, config),
        Some(Command::Completions(comp_args)) => commands::completions::execute(comp_args),
        None => commands::run::execute(commands::run::RunArgs::default(), config),
    }
}

fn print_banner() {
    use colored::Colorize;

    eprintln!();
    eprintln!(
        "{} {}",
        "self-destructing cache".green().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    eprintln!("{}", "events on stdin, removals on stdout".dimmed());
    eprintln!();
}
