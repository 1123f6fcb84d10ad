//! Completions command - shell completion scripts for `sdc`
//!
//! ```text
//! sdc completions bash > ~/.local/share/bash-completion/completions/sdc
//! sdc completions zsh --output ~/.zfunc/_sdc
//! ```

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

use crate::args::Args as CliArgs;

/// Completions command arguments
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Write the script to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Shells clap can complete for
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    Powershell,
    Elvish,
}

impl From<ShellType> for Shell {
    fn from(shell: ShellType) -> Self {
        match shell {
            ShellType::Bash => Shell::Bash,
            ShellType::Zsh => Shell::Zsh,
            ShellType::Fish => Shell::Fish,
            ShellType::Powershell => Shell::PowerShell,
            ShellType::Elvish => Shell::Elvish,
        }
    }
}

/// Write the completion script for `shell` to `out`
pub fn render(shell: ShellType, out: &mut dyn Write) {
    let mut cmd = CliArgs::command();
    let bin_name = cmd.get_name().to_string();
    generate(Shell::from(shell), &mut cmd, bin_name, out);
}

/// Execute completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    match args.output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            render(args.shell, &mut file);
            info!(path = %path.display(), shell = ?args.shell, "Wrote completions");
        }
        None => render(args.shell, &mut io::stdout()),
    }
    Ok(())
}
