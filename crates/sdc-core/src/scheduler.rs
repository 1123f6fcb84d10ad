//! Destruction scheduling
//!
//! Puts hostnames on (and takes them off) the scheduled domain map.

use crate::clock::Clock;
use crate::error::Result;
use crate::state::StateStore;
use crate::whitelist::Whitelist;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default delay between a domain going inactive and becoming due
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);

/// Result of asking for a hostname to be scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Entry written with this due time (epoch ms)
    Scheduled {
        /// When the hostname becomes eligible for destruction
        due_at: u64,
    },
    /// Root domain is whitelisted; nothing written
    Exempt,
}

/// Writes and clears schedule entries
pub struct Scheduler {
    store: Arc<StateStore>,
    whitelist: Arc<Whitelist>,
    clock: Arc<dyn Clock>,
    grace_period: Duration,
}

impl Scheduler {
    /// Create a scheduler with the default grace period
    pub fn new(store: Arc<StateStore>, whitelist: Arc<Whitelist>, clock: Arc<dyn Clock>) -> Self {
        Self::with_grace_period(store, whitelist, clock, DEFAULT_GRACE_PERIOD)
    }

    /// Create a scheduler with a custom grace period
    pub fn with_grace_period(
        store: Arc<StateStore>,
        whitelist: Arc<Whitelist>,
        clock: Arc<dyn Clock>,
        grace_period: Duration,
    ) -> Self {
        Self {
            store,
            whitelist,
            clock,
            grace_period,
        }
    }

    /// Grace period in use
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Schedule a hostname for destruction after the grace period
    ///
    /// Re-scheduling restarts the countdown. Whitelisted hostnames are never
    /// written.
    pub fn schedule_for_destruction(&self, hostname: &str) -> Result<ScheduleOutcome> {
        if self.whitelist.is_exempt(hostname) {
            return Ok(ScheduleOutcome::Exempt);
        }

        let due_at = self
            .clock
            .now_millis()
            .saturating_add(self.grace_period.as_millis() as u64);
        self.store.schedule(hostname, due_at)?;

        info!(hostname, due_at, "Scheduled for destruction");
        Ok(ScheduleOutcome::Scheduled { due_at })
    }

    /// Cancel a pending destruction; true if one existed
    pub fn unschedule(&self, hostname: &str) -> Result<bool> {
        let removed = self.store.unschedule(hostname)?;
        if removed {
            debug!(hostname, "Unscheduled");
        }
        Ok(removed)
    }
}
