//! Tab lifecycle tracking
//!
//! Keeps the active tab map in step with tab events and hands hostnames
//! that stop being shown to the scheduler.

use crate::domain::{hostname_of, is_web_url};
use crate::error::Result;
use crate::host::{TabId, TabQuery};
use crate::scheduler::Scheduler;
use crate::state::StateStore;
use std::sync::Arc;
use tracing::{debug, trace};

/// Reacts to tab activation, navigation and removal
pub struct TabTracker {
    store: Arc<StateStore>,
    scheduler: Arc<Scheduler>,
    tabs: Arc<dyn TabQuery>,
}

impl TabTracker {
    /// Create a tracker
    pub fn new(store: Arc<StateStore>, scheduler: Arc<Scheduler>, tabs: Arc<dyn TabQuery>) -> Self {
        Self {
            store,
            scheduler,
            tabs,
        }
    }

    /// A tab became the active tab of its window
    pub fn on_tab_activated(&self, tab_id: TabId) -> Result<()> {
        debug!(tab_id, "Tab activated");

        let Some(tab) = self.tabs.get(tab_id)? else {
            trace!(tab_id, "Activated tab no longer exists");
            return Ok(());
        };
        let Some(url) = tab.url.as_deref() else {
            return Ok(());
        };
        if !is_web_url(url) {
            return Ok(());
        }

        self.on_navigated(tab_id, url)
    }

    /// A tab's properties changed; only URL changes matter
    pub fn on_tab_updated(&self, tab_id: TabId, url: Option<&str>) -> Result<()> {
        let Some(url) = url else {
            return Ok(());
        };
        if !is_web_url(url) {
            return Ok(());
        }

        debug!(tab_id, url, "Tab changed url");
        self.on_navigated(tab_id, url)
    }

    /// A tab now shows `url`
    ///
    /// The hostname it showed before is scheduled if it differs, and any
    /// pending destruction of the new hostname is cancelled.
    pub fn on_navigated(&self, tab_id: TabId, url: &str) -> Result<()> {
        let current = match hostname_of(url) {
            Ok(hostname) => hostname,
            Err(e) if e.is_invalid_url() => {
                trace!(tab_id, "Ignoring navigation: {}", e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let previous = self.store.set_active_tab(tab_id, &current)?;
        if let Some(previous) = previous.filter(|previous| *previous != current) {
            self.scheduler.schedule_for_destruction(&previous)?;
        }
        self.scheduler.unschedule(&current)?;

        self.store.dump();
        Ok(())
    }

    /// A tab was closed
    pub fn on_tab_removed(&self, tab_id: TabId) -> Result<()> {
        debug!(tab_id, "Tab removed");

        let Some(hostname) = self.store.active_tab(tab_id)? else {
            return Ok(());
        };

        self.scheduler.schedule_for_destruction(&hostname)?;
        self.store.unset_active_tab(tab_id)?;

        self.store.dump();
        Ok(())
    }
}
