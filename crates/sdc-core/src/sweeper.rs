//! Destruction sweeper
//!
//! Runs on every tick of the destroy-data alarm. Whitelist and active-tab
//! membership are re-checked here, not only when a hostname was scheduled.

use crate::clock::Clock;
use crate::config::Browser;
use crate::domain::{is_within, root_domain_of};
use crate::error::Result;
use crate::host::DataDeletion;
use crate::removal::{DataTypes, RemovalRequest};
use crate::state::StateStore;
use crate::whitelist::Whitelist;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a sweep did with one scheduled hostname
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Not due yet; left scheduled
    Pending,
    /// Root domain is whitelisted; unscheduled
    Whitelisted,
    /// Still open in a tab; unscheduled without deleting
    StillActive,
    /// Data removed and unscheduled
    Destroyed {
        /// Whether cookies were part of the removal
        include_cookies: bool,
    },
    /// Host refused the removal; unscheduled anyway
    DeletionFailed {
        /// Whether cookies were part of the removal
        include_cookies: bool,
    },
    /// Persisted state could not be read or written; retried next sweep
    StateUnavailable,
}

/// Result of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Time the sweep ran (epoch ms)
    pub now: u64,
    /// Outcome for every hostname that was scheduled when the sweep began
    pub outcomes: Vec<(String, SweepOutcome)>,
}

impl SweepReport {
    /// Outcome for a hostname, if it was looked at
    pub fn outcome(&self, hostname: &str) -> Option<SweepOutcome> {
        self.outcomes
            .iter()
            .find(|(host, _)| host == hostname)
            .map(|(_, outcome)| *outcome)
    }

    /// Hostnames whose data was removed
    pub fn destroyed(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|(host, outcome)| match outcome {
            SweepOutcome::Destroyed { .. } => Some(host.as_str()),
            _ => None,
        })
    }

    /// Whether the sweep had nothing to look at
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Processes due entries of the scheduled domain map
pub struct Sweeper {
    store: Arc<StateStore>,
    whitelist: Arc<Whitelist>,
    deletion: Arc<dyn DataDeletion>,
    clock: Arc<dyn Clock>,
    browser: Browser,
    site_data: DataTypes,
}

impl Sweeper {
    /// Create a sweeper removing the default site data categories
    pub fn new(
        store: Arc<StateStore>,
        whitelist: Arc<Whitelist>,
        deletion: Arc<dyn DataDeletion>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            whitelist,
            deletion,
            clock,
            browser: Browser::default(),
            site_data: DataTypes::site_data(),
        }
    }

    /// Address sites the way `browser` expects
    pub fn with_browser(mut self, browser: Browser) -> Self {
        self.browser = browser;
        self
    }

    /// Remove these categories for destroyed sites (cookies are added separately)
    pub fn with_site_data(mut self, site_data: DataTypes) -> Self {
        self.site_data = site_data - DataTypes::COOKIES;
        self
    }

    /// Process every scheduled hostname once
    ///
    /// A failure on one hostname is logged and does not stop the others.
    pub fn sweep(&self) -> Result<SweepReport> {
        let now = self.clock.now_millis();
        let scheduled = self.store.scheduled_domains()?;

        let mut report = SweepReport {
            now,
            outcomes: Vec::with_capacity(scheduled.len()),
        };
        if scheduled.is_empty() {
            return Ok(report);
        }

        debug!(count = scheduled.len(), "Processing domains scheduled for destruction");

        for (hostname, due_at) in scheduled {
            let outcome = self.process(&hostname, due_at, now).unwrap_or_else(|e| {
                warn!(hostname = %hostname, "Failed to process scheduled domain: {}", e);
                SweepOutcome::StateUnavailable
            });
            report.outcomes.push((hostname, outcome));
        }

        Ok(report)
    }

    fn process(&self, hostname: &str, due_at: u64, now: u64) -> Result<SweepOutcome> {
        if now < due_at {
            return Ok(SweepOutcome::Pending);
        }

        let root = root_domain_of(hostname);
        if self.whitelist.contains_root(&root) {
            self.store.unschedule(hostname)?;
            debug!(hostname, root = %root, "Skipping whitelisted domain");
            return Ok(SweepOutcome::Whitelisted);
        }

        let active = self.store.active_tabs()?;
        if active.values().any(|host| host == hostname) {
            self.store.unschedule(hostname)?;
            debug!(hostname, "Skipping domain that is still active");
            return Ok(SweepOutcome::StillActive);
        }

        let include_cookies = !active.values().any(|host| is_within(host, &root));
        let request = self.site_request(hostname, &root, include_cookies);

        let outcome = match self.deletion.remove(&request) {
            Ok(()) => {
                info!(hostname, include_cookies, "Destroyed site data");
                SweepOutcome::Destroyed { include_cookies }
            }
            Err(e) => {
                warn!(hostname, "Failed to destroy site data: {}", e);
                SweepOutcome::DeletionFailed { include_cookies }
            }
        };

        self.store.unschedule(hostname)?;
        Ok(outcome)
    }

    /// Build the removal for one hostname
    pub fn site_request(&self, hostname: &str, root: &str, include_cookies: bool) -> RemovalRequest {
        let mut data_types = self.site_data;
        if include_cookies {
            data_types |= DataTypes::COOKIES;
        }
        RemovalRequest::new(
            self.browser.site_scope(hostname, root, include_cookies),
            data_types,
        )
    }
}
