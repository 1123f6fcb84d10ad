//! Domain command - inspect hostname and whitelist handling

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sdc_core::domain::{hostname_of, root_domain_of};
use sdc_core::Whitelist;
use std::path::Path;

/// Domain command arguments
#[derive(Args, Debug)]
pub struct DomainArgs {
    /// URLs to inspect
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,
}

/// How one URL is treated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Tracked and destroyed after going inactive
    Tracked {
        /// Hostname without `www.`
        hostname: String,
        /// Approximate root domain
        root: String,
    },
    /// Root domain is whitelisted
    Whitelisted {
        /// Hostname without `www.`
        hostname: String,
        /// Approximate root domain
        root: String,
    },
    /// Not an HTTP(S) URL with a host
    Ignored {
        /// Why the URL is ignored
        reason: String,
    },
}

/// Classify a URL
pub fn inspect(url: &str, whitelist: &Whitelist) -> Verdict {
    match hostname_of(url) {
        Ok(hostname) => {
            let root = root_domain_of(&hostname);
            if whitelist.contains_root(&root) {
                Verdict::Whitelisted { hostname, root }
            } else {
                Verdict::Tracked { hostname, root }
            }
        }
        Err(e) => Verdict::Ignored {
            reason: e.to_string(),
        },
    }
}

/// Execute domain command
pub fn execute(args: DomainArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let whitelist = config.whitelist()?;

    for url in &args.urls {
        match inspect(url, &whitelist) {
            Verdict::Tracked { hostname, root } => {
                println!("{url}");
                println!("  hostname: {hostname}");
                println!("  root:     {root}");
                println!("  status:   {}", "destroyed when inactive".yellow());
            }
            Verdict::Whitelisted { hostname, root } => {
                println!("{url}");
                println!("  hostname: {hostname}");
                println!("  root:     {root}");
                println!("  status:   {}", "whitelisted".green());
            }
            Verdict::Ignored { reason } => {
                println!("{url}");
                println!("  status:   {} ({reason})", "ignored".dimmed());
            }
        }
    }

    Ok(())
}
