//! Tab registry
//!
//! Mirror of the browser's open tabs, kept up to date by whoever feeds tab
//! events to the background.

use dashmap::DashMap;
use sdc_core::{Tab, TabId, TabQuery};

/// Open tabs and their current URL
#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: DashMap<TabId, Option<String>>,
}

impl TabRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab, or point an existing tab at a new URL
    pub fn open(&self, tab_id: TabId, url: Option<&str>) {
        self.tabs.insert(tab_id, url.map(str::to_string));
    }

    /// Point a tab at a new URL; unknown tabs are opened
    pub fn navigate(&self, tab_id: TabId, url: &str) {
        self.open(tab_id, Some(url));
    }

    /// Close a tab; true if it was open
    pub fn close(&self, tab_id: TabId) -> bool {
        self.tabs.remove(&tab_id).is_some()
    }

    /// Check whether a tab is open
    pub fn contains(&self, tab_id: TabId) -> bool {
        self.tabs.contains_key(&tab_id)
    }

    /// Number of open tabs
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Check if no tab is open
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl TabQuery for TabRegistry {
    fn get(&self, tab_id: TabId) -> sdc_core::Result<Option<Tab>> {
        Ok(self.tabs.get(&tab_id).map(|entry| Tab {
            id: tab_id,
            url: entry.value().clone(),
        }))
    }
}
