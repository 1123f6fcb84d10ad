//! In-memory host used by the integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use sdc_core::{
    Background, Config, DataDeletion, Error, Host, KeyValueStore, ManualClock, PeriodicTimer,
    RemovalRequest, Result, Tab, TabId, TabQuery,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Tabs, storage, removals and alarms of a pretend browser
#[derive(Default)]
pub struct FakeBrowser {
    tabs: Mutex<HashMap<TabId, String>>,
    storage: Mutex<HashMap<String, Value>>,
    removals: Mutex<Vec<RemovalRequest>>,
    alarms: Mutex<Vec<(String, Duration, Duration)>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeBrowser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self, tab_id: TabId, url: &str) {
        self.tabs.lock().insert(tab_id, url.to_string());
    }

    pub fn close(&self, tab_id: TabId) {
        self.tabs.lock().remove(&tab_id);
    }

    /// Make removals whose scope mentions `entry` fail
    pub fn fail_for(&self, entry: &str) {
        self.failing.lock().insert(entry.to_string());
    }

    pub fn removals(&self) -> Vec<RemovalRequest> {
        self.removals.lock().clone()
    }

    pub fn alarms(&self) -> Vec<(String, Duration, Duration)> {
        self.alarms.lock().clone()
    }

    pub fn stored(&self, key: &str) -> Option<Value> {
        self.storage.lock().get(key).cloned()
    }
}

impl TabQuery for FakeBrowser {
    fn get(&self, tab_id: TabId) -> Result<Option<Tab>> {
        Ok(self.tabs.lock().get(&tab_id).map(|url| Tab::new(tab_id, url.clone())))
    }
}

impl DataDeletion for FakeBrowser {
    fn remove(&self, request: &RemovalRequest) -> Result<()> {
        let failing = self.failing.lock();
        if request.scope.entries().iter().any(|e| failing.contains(e)) {
            return Err(Error::deletion(request.scope.to_string(), "simulated failure"));
        }
        self.removals.lock().push(request.clone());
        Ok(())
    }
}

impl KeyValueStore for FakeBrowser {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.storage.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.storage.lock().insert(key.to_string(), value);
        Ok(())
    }
}

impl PeriodicTimer for FakeBrowser {
    fn register(&self, name: &str, first_fire: Duration, period: Duration) -> Result<()> {
        self.alarms.lock().push((name.to_string(), first_fire, period));
        Ok(())
    }
}

/// Host bundle where every collaborator is `browser`
pub fn host(browser: &Arc<FakeBrowser>, clock: &ManualClock) -> Host {
    Host {
        tabs: browser.clone(),
        deletion: browser.clone(),
        storage: browser.clone(),
        timer: browser.clone(),
        clock: Arc::new(clock.clone()),
    }
}

/// Config whitelisting only `https://mail.google.com`
pub fn config() -> Config {
    let mut config = Config::default();
    config.whitelist.origins = vec!["https://mail.google.com".to_string()];
    config.schedule.sweep_on_start = false;
    config
}

pub fn background(browser: &Arc<FakeBrowser>, clock: &ManualClock) -> Background {
    Background::new(&config(), host(browser, clock)).expect("valid config")
}
