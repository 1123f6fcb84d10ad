//! Replay command - run a scripted browsing session in simulated time
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   { "at": 0,     "action": "open",     "tab": 1, "url": "https://example.com/" },
//!   { "at": 5000,  "action": "navigate", "tab": 1, "url": "https://other.org/" },
//!   { "at": 9000,  "action": "close",    "tab": 1 },
//!   { "at": 20000, "action": "restart" }
//! ]
//! ```
//!
//! `at` is milliseconds since the start of the session. The destroy-data
//! alarm fires at the times a real periodic alarm would between steps.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use sdc_core::state::ScheduledDomainMap;
use sdc_core::{
    Background, Config, Host, KeyValueStore, ManualClock, RemovalRequest, TabId,
};
use sdc_platform::{FileStorage, ManualTimer, MemoryStorage, RecordingDeletion, TabRegistry};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Replay command arguments
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script file (JSON array of steps)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Persist state to this file instead of memory
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Keep simulating until this time (ms); defaults to the last step
    /// plus the grace period and one sweep interval
    #[arg(long, value_name = "MS")]
    pub until: Option<u64>,
}

/// One scripted step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    /// Milliseconds since session start
    pub at: u64,
    /// What happens
    #[serde(flatten)]
    pub action: Action,
}

/// Browser activity a step can simulate
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    /// Open a new tab at a URL
    Open {
        /// Tab identifier
        tab: TabId,
        /// Initial URL
        url: String,
    },
    /// Point a tab at a new URL
    Navigate {
        /// Tab identifier
        tab: TabId,
        /// New URL
        url: String,
    },
    /// Switch to a tab
    Activate {
        /// Tab identifier
        tab: TabId,
    },
    /// Close a tab
    Close {
        /// Tab identifier
        tab: TabId,
    },
    /// Restart the browser; the background is rebuilt over the same storage
    Restart,
    /// Reinstall or update the extension
    Install,
}

/// A removal request and when it was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Session time (ms)
    pub at: u64,
    /// The request
    pub request: RemovalRequest,
}

/// What a replay produced
#[derive(Debug, Clone)]
pub struct ReplayResult {
    /// Every removal request, in order
    pub removals: Vec<Removal>,
    /// Domains still scheduled when the replay ended
    pub scheduled: ScheduledDomainMap,
    /// Session time the replay ended at
    pub ended_at: u64,
}

/// Parse a script and check that steps are in time order
pub fn parse_script(content: &str) -> Result<Vec<Step>> {
    let steps: Vec<Step> = serde_json::from_str(content).context("Invalid replay script")?;

    if let Some(pair) = steps.windows(2).find(|pair| pair[1].at < pair[0].at) {
        bail!(
            "Replay steps must be in time order: step at {}ms follows step at {}ms",
            pair[1].at,
            pair[0].at
        );
    }
    Ok(steps)
}

/// Drives a background through scripted steps
struct Replayer {
    config: Config,
    clock: ManualClock,
    tabs: Arc<TabRegistry>,
    deletion: Arc<RecordingDeletion>,
    storage: Arc<dyn KeyValueStore>,
    timer: Arc<ManualTimer>,
    background: Background,
    removals: Vec<Removal>,
}

impl Replayer {
    fn new(config: Config, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let clock = ManualClock::new(0);
        let tabs = Arc::new(TabRegistry::new());
        let deletion = Arc::new(RecordingDeletion::new());
        let timer = Arc::new(ManualTimer::new(Arc::new(clock.clone())));

        let background = Self::boot(&config, &clock, &tabs, &deletion, &storage, &timer)?;
        let mut replayer = Self {
            config,
            clock,
            tabs,
            deletion,
            storage,
            timer,
            background,
            removals: Vec::new(),
        };
        replayer.collect();
        Ok(replayer)
    }

    fn boot(
        config: &Config,
        clock: &ManualClock,
        tabs: &Arc<TabRegistry>,
        deletion: &Arc<RecordingDeletion>,
        storage: &Arc<dyn KeyValueStore>,
        timer: &Arc<ManualTimer>,
    ) -> Result<Background> {
        let host = Host {
            tabs: tabs.clone(),
            deletion: deletion.clone(),
            storage: Arc::clone(storage),
            timer: timer.clone(),
            clock: Arc::new(clock.clone()),
        };
        let background = Background::new(config, host).context("Failed to build background")?;
        if let Err(e) = background.start() {
            warn!("Background start failed: {}", e);
        }
        Ok(background)
    }

    fn now(&self) -> u64 {
        use sdc_core::Clock;
        self.clock.now_millis()
    }

    /// Move removals issued so far into the log, stamped with the current time
    fn collect(&mut self) {
        let at = self.now();
        self.removals.extend(
            self.deletion
                .take()
                .into_iter()
                .map(|request| Removal { at, request }),
        );
    }

    /// Fire every alarm due up to `until`, then stop the clock there
    fn advance_to(&mut self, until: u64) {
        let now = self.now();
        if until <= now {
            return;
        }

        for (at, name) in self.timer.fires_between(now, until) {
            self.clock.set(at);
            match self.background.on_alarm(&name) {
                Ok(Some(report)) if !report.is_empty() => {
                    debug!(at, swept = report.outcomes.len(), "Alarm swept");
                }
                Ok(_) => {}
                Err(e) => warn!(at, "Alarm handler failed: {}", e),
            }
            self.collect();
        }

        self.clock.set(until);
    }

    fn apply(&mut self, step: &Step) -> Result<()> {
        self.advance_to(step.at);
        debug!(at = step.at, action = ?step.action, "Replaying step");

        let result = match &step.action {
            Action::Open { tab, url } | Action::Navigate { tab, url } => {
                self.tabs.navigate(*tab, url);
                self.background.on_tab_updated(*tab, Some(url))
            }
            Action::Activate { tab } => self.background.on_tab_activated(*tab),
            Action::Close { tab } => {
                self.tabs.close(*tab);
                self.background.on_tab_removed(*tab)
            }
            Action::Restart => {
                self.background.on_suspend();
                self.background = Self::boot(
                    &self.config,
                    &self.clock,
                    &self.tabs,
                    &self.deletion,
                    &self.storage,
                    &self.timer,
                )?;
                self.background.on_startup();
                Ok(())
            }
            Action::Install => {
                self.background.on_installed();
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(at = step.at, "Step failed: {}", e);
        }

        self.collect();
        Ok(())
    }

    fn finish(mut self, until: u64) -> Result<ReplayResult> {
        self.advance_to(until);
        Ok(ReplayResult {
            scheduled: self.background.store().scheduled_domains()?,
            ended_at: self.now(),
            removals: self.removals,
        })
    }
}

/// Run steps against a fresh background over `storage`
pub fn replay(
    config: Config,
    storage: Arc<dyn KeyValueStore>,
    steps: &[Step],
    until: Option<u64>,
) -> Result<ReplayResult> {
    let settle = (config.schedule.grace_period() + config.schedule.sweep_interval()).as_millis() as u64;
    let last = steps.last().map_or(0, |step| step.at);
    let until = until.unwrap_or(last + settle);

    let mut replayer = Replayer::new(config, storage)?;
    for step in steps {
        replayer.apply(step)?;
    }
    replayer.finish(until.max(last))
}

/// Execute replay command
pub fn execute(args: ReplayArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;

    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let steps = parse_script(&content)?;

    let storage: Arc<dyn KeyValueStore> = match &args.state {
        Some(path) => Arc::new(
            FileStorage::open(path)
                .with_context(|| format!("Failed to open state file {}", path.display()))?,
        ),
        None => Arc::new(MemoryStorage::new()),
    };

    info!(steps = steps.len(), browser = %config.general.browser, "Replaying script");
    let result = replay(config, storage, &steps, args.until)?;
    print_result(&result);
    Ok(())
}

fn format_at(at: u64) -> String {
    format!("{:>5}.{:03}s", at / 1000, at % 1000)
}

fn print_result(result: &ReplayResult) {
    for removal in &result.removals {
        let cookies = if removal.request.includes_cookies() {
            "with cookies".red()
        } else {
            "keeping cookies".green()
        };
        println!(
            "{} {} {} [{}]",
            format_at(removal.at).dimmed(),
            "remove".bold(),
            removal.request.scope,
            cookies
        );
        println!("{:>11} {}", "", removal.request.data_types.to_string().dimmed());
    }

    println!();
    println!(
        "{} removal request(s) in {}",
        result.removals.len(),
        format_at(result.ended_at).trim()
    );
    if !result.scheduled.is_empty() {
        println!("Still scheduled:");
        for (hostname, due_at) in &result.scheduled {
            println!("  {hostname} (due at {})", format_at(*due_at).trim());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdc_core::{DataTypes, RemovalScope};
    use tempfile::TempDir;

    fn config() -> Config {
        let mut config = Config::default();
        config.whitelist.origins = vec!["https://mail.google.com".to_string()];
        config.deletion.reset_on_startup = false;
        config
    }

    fn run(script: &str, until: Option<u64>) -> ReplayResult {
        let steps = parse_script(script).unwrap();
        replay(config(), Arc::new(MemoryStorage::new()), &steps, until).unwrap()
    }

    #[test]
    fn test_parse_script() {
        let steps = parse_script(
            r#"[
                {"at": 0, "action": "open", "tab": 1, "url": "https://example.com/"},
                {"at": 10, "action": "activate", "tab": 1},
                {"at": 20, "action": "restart"}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].action, Action::Activate { tab: 1 });
        assert_eq!(steps[2].action, Action::Restart);
    }

    #[test]
    fn test_parse_script_rejects_out_of_order_steps() {
        let err = parse_script(
            r#"[{"at": 50, "action": "install"}, {"at": 10, "action": "install"}]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("time order"));
    }

    #[test]
    fn test_parse_script_rejects_unknown_action() {
        assert!(parse_script(r#"[{"at": 0, "action": "print", "tab": 1}]"#).is_err());
    }

    #[test]
    fn test_closed_tab_destroyed_on_next_alarm() {
        let result = run(
            r#"[
                {"at": 0, "action": "open", "tab": 1, "url": "https://shop.example.com/"},
                {"at": 5000, "action": "close", "tab": 1}
            ]"#,
            None,
        );

        // due at 65s, alarms at 60s and 120s
        assert_eq!(result.removals.len(), 1);
        let removal = &result.removals[0];
        assert_eq!(removal.at, 120_000);
        assert!(removal.request.includes_cookies());
        assert_eq!(
            removal.request.scope.entries()[0],
            "https://shop.example.com".to_string()
        );
        assert!(result.scheduled.is_empty());
    }

    #[test]
    fn test_returning_in_time_keeps_data() {
        let result = run(
            r#"[
                {"at": 0, "action": "open", "tab": 1, "url": "https://example.com/"},
                {"at": 1000, "action": "navigate", "tab": 1, "url": "https://example.org/"},
                {"at": 30000, "action": "navigate", "tab": 1, "url": "https://example.com/"}
            ]"#,
            None,
        );

        assert!(result
            .removals
            .iter()
            .all(|r| !r.request.scope.entries().contains(&"https://example.com".to_string())));
        let hosts: Vec<_> = result
            .removals
            .iter()
            .map(|r| r.request.scope.entries()[0].clone())
            .collect();
        assert_eq!(hosts, vec!["https://example.org".to_string()]);
    }

    #[test]
    fn test_sibling_tab_keeps_cookies() {
        let result = run(
            r#"[
                {"at": 0, "action": "open", "tab": 1, "url": "https://sub.example.com/"},
                {"at": 0, "action": "open", "tab": 2, "url": "https://other.example.com/"},
                {"at": 1000, "action": "close", "tab": 1}
            ]"#,
            None,
        );

        assert_eq!(result.removals.len(), 1);
        assert!(!result.removals[0].request.includes_cookies());
    }

    #[test]
    fn test_install_resets_everything_but_whitelist() {
        let mut config = config();
        config.deletion.reset_on_startup = true;
        let steps = parse_script(r#"[{"at": 0, "action": "install"}]"#).unwrap();
        let result = replay(config, Arc::new(MemoryStorage::new()), &steps, Some(0)).unwrap();

        assert_eq!(result.removals.len(), 1);
        assert_eq!(
            result.removals[0].request.scope,
            RemovalScope::ExcludeOrigins(vec!["https://mail.google.com".into()])
        );
        assert_eq!(result.removals[0].request.data_types, DataTypes::all());
    }

    #[test]
    fn test_until_cuts_session_short() {
        let result = run(
            r#"[
                {"at": 0, "action": "open", "tab": 1, "url": "https://example.com/"},
                {"at": 1000, "action": "close", "tab": 1}
            ]"#,
            Some(30_000),
        );
        assert!(result.removals.is_empty());
        assert!(result.scheduled.contains_key("example.com"));
        assert_eq!(result.ended_at, 30_000);
    }

    #[test]
    fn test_restart_keeps_schedule_in_file_state() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");
        let steps = parse_script(
            r#"[
                {"at": 0, "action": "open", "tab": 1, "url": "https://example.com/"},
                {"at": 1000, "action": "close", "tab": 1},
                {"at": 2000, "action": "restart"}
            ]"#,
        )
        .unwrap();

        let storage = Arc::new(FileStorage::open(&state).unwrap());
        let result = replay(config(), storage, &steps, Some(2_000)).unwrap();
        assert!(result.scheduled.contains_key("example.com"));

        let reopened = FileStorage::open(&state).unwrap();
        assert!(reopened.get("scheduledDomains").unwrap().is_some());
    }

    #[test]
    fn test_format_at() {
        assert_eq!(format_at(61_000).trim(), "61.000s");
        assert_eq!(format_at(5).trim(), "0.005s");
    }
}
