//! Persisted bookkeeping state
//!
//! Both maps live in the host's key-value storage and are written through on
//! every mutation, so a suspended and restarted background sees the same
//! state. Each read-modify-write of a map runs under one lock with no
//! suspension point between the read and the write.

use crate::error::Result;
use crate::host::{KeyValueStore, TabId};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, enabled, Level};

/// Tab id -> hostname of every tab showing an HTTP(S) page
pub type ActiveTabMap = BTreeMap<TabId, String>;

/// Hostname -> due time (epoch ms) of every domain pending destruction
pub type ScheduledDomainMap = BTreeMap<String, u64>;

/// Keys used in the host's key-value storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    /// [`ActiveTabMap`]
    ActiveTabs,
    /// [`ScheduledDomainMap`]
    ScheduledDomains,
    /// Epoch ms of the last alarm delivery
    LastHeartbeat,
}

impl StorageKey {
    /// Key string in storage
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::ActiveTabs => "activeTabs",
            StorageKey::ScheduledDomains => "scheduledDomains",
            StorageKey::LastHeartbeat => "lastHeartbeat",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transactional access to the persisted maps
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
    txn: Mutex<()>,
}

impl StateStore {
    /// Wrap a key-value store
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            txn: Mutex::new(()),
        }
    }

    fn read<T: DeserializeOwned + Default>(&self, key: StorageKey) -> Result<T> {
        match self.kv.get(key.as_str())? {
            Some(value) if !value.is_null() => Ok(serde_json::from_value(value)?),
            _ => Ok(T::default()),
        }
    }

    fn write<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<()> {
        self.kv.set(key.as_str(), serde_json::to_value(value)?)
    }

    /// Read, mutate and write back the active tab map as one transaction
    pub fn update_active_tabs<R>(&self, f: impl FnOnce(&mut ActiveTabMap) -> R) -> Result<R> {
        let _txn = self.txn.lock();
        let mut tabs: ActiveTabMap = self.read(StorageKey::ActiveTabs)?;
        let result = f(&mut tabs);
        self.write(StorageKey::ActiveTabs, &tabs)?;
        Ok(result)
    }

    /// Read, mutate and write back the scheduled domain map as one transaction
    pub fn update_scheduled<R>(
        &self,
        f: impl FnOnce(&mut ScheduledDomainMap) -> R,
    ) -> Result<R> {
        let _txn = self.txn.lock();
        let mut scheduled: ScheduledDomainMap = self.read(StorageKey::ScheduledDomains)?;
        let result = f(&mut scheduled);
        self.write(StorageKey::ScheduledDomains, &scheduled)?;
        Ok(result)
    }

    /// Snapshot of the active tab map
    pub fn active_tabs(&self) -> Result<ActiveTabMap> {
        let _txn = self.txn.lock();
        self.read(StorageKey::ActiveTabs)
    }

    /// Hostname currently recorded for a tab
    pub fn active_tab(&self, tab_id: TabId) -> Result<Option<String>> {
        Ok(self.active_tabs()?.remove(&tab_id))
    }

    /// Record the hostname for a tab, returning the one it replaces
    pub fn set_active_tab(&self, tab_id: TabId, hostname: &str) -> Result<Option<String>> {
        self.update_active_tabs(|tabs| tabs.insert(tab_id, hostname.to_string()))
    }

    /// Forget a tab, returning its hostname
    pub fn unset_active_tab(&self, tab_id: TabId) -> Result<Option<String>> {
        self.update_active_tabs(|tabs| tabs.remove(&tab_id))
    }

    /// Snapshot of the scheduled domain map
    pub fn scheduled_domains(&self) -> Result<ScheduledDomainMap> {
        let _txn = self.txn.lock();
        self.read(StorageKey::ScheduledDomains)
    }

    /// Set the due time of a hostname, overwriting any previous one
    pub fn schedule(&self, hostname: &str, due_at: u64) -> Result<Option<u64>> {
        self.update_scheduled(|scheduled| scheduled.insert(hostname.to_string(), due_at))
    }

    /// Remove a hostname from the schedule; true if it was present
    pub fn unschedule(&self, hostname: &str) -> Result<bool> {
        self.update_scheduled(|scheduled| scheduled.remove(hostname).is_some())
    }

    /// Epoch ms of the last alarm delivery
    pub fn last_heartbeat(&self) -> Result<Option<u64>> {
        let _txn = self.txn.lock();
        self.read(StorageKey::LastHeartbeat)
    }

    /// Record an alarm delivery
    pub fn set_last_heartbeat(&self, millis: u64) -> Result<()> {
        let _txn = self.txn.lock();
        self.write(StorageKey::LastHeartbeat, &millis)
    }

    /// Log both maps at debug level
    pub fn dump(&self) {
        if !enabled!(Level::DEBUG) {
            return;
        }

        match (self.active_tabs(), self.scheduled_domains()) {
            (Ok(active), Ok(scheduled)) => {
                debug!(?active, ?scheduled, "state dump");
            }
            (Err(e), _) | (_, Err(e)) => debug!("state dump unavailable: {}", e),
        }
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockKeyValueStore;
    use crate::testing::{backed_kv, MemoryData};
    use serde_json::{json, Value};

    fn backed_store() -> (StateStore, MemoryData) {
        let data = MemoryData::default();
        let kv = backed_kv(Arc::clone(&data), Arc::default());
        (StateStore::new(kv), data)
    }

    #[test]
    fn test_empty_storage_reads_default() {
        let (store, _) = backed_store();
        assert!(store.active_tabs().unwrap().is_empty());
        assert!(store.scheduled_domains().unwrap().is_empty());
        assert_eq!(store.last_heartbeat().unwrap(), None);
    }

    #[test]
    fn test_set_active_tab_returns_previous() {
        let (store, _) = backed_store();
        assert_eq!(store.set_active_tab(1, "example.com").unwrap(), None);
        assert_eq!(
            store.set_active_tab(1, "other.com").unwrap(),
            Some("example.com".to_string())
        );
        assert_eq!(store.active_tab(1).unwrap(), Some("other.com".to_string()));
        assert_eq!(store.unset_active_tab(1).unwrap(), Some("other.com".to_string()));
        assert_eq!(store.active_tab(1).unwrap(), None);
    }

    #[test]
    fn test_writes_go_through() {
        let (store, data) = backed_store();
        store.set_active_tab(7, "example.com").unwrap();
        store.schedule("other.com", 60_000).unwrap();
        store.set_last_heartbeat(42).unwrap();

        let data = data.lock();
        assert_eq!(data["activeTabs"], json!({"7": "example.com"}));
        assert_eq!(data["scheduledDomains"], json!({"other.com": 60_000}));
        assert_eq!(data["lastHeartbeat"], json!(42));
    }

    #[test]
    fn test_schedule_overwrites_and_unschedule_is_idempotent() {
        let (store, _) = backed_store();
        store.schedule("example.com", 1).unwrap();
        assert_eq!(store.schedule("example.com", 2).unwrap(), Some(1));
        assert_eq!(store.scheduled_domains().unwrap()["example.com"], 2);
        assert!(store.unschedule("example.com").unwrap());
        assert!(!store.unschedule("example.com").unwrap());
    }

    #[test]
    fn test_reads_existing_state() {
        let (store, data) = backed_store();
        data.lock()
            .insert("activeTabs".into(), json!({"3": "example.com", "4": "other.com"}));
        let tabs = store.active_tabs().unwrap();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[&3], "example.com");
    }

    #[test]
    fn test_null_value_reads_default() {
        let (store, data) = backed_store();
        data.lock().insert("scheduledDomains".into(), Value::Null);
        assert!(store.scheduled_domains().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_value_is_error() {
        let (store, data) = backed_store();
        data.lock().insert("scheduledDomains".into(), json!(["not", "a", "map"]));
        assert!(store.scheduled_domains().is_err());
    }

    #[test]
    fn test_storage_failure_propagates() {
        let mut kv = MockKeyValueStore::new();
        kv.expect_get()
            .returning(|key| Err(crate::Error::storage(key, "unavailable")));
        let store = StateStore::new(Arc::new(kv));
        assert!(store.set_active_tab(1, "example.com").is_err());
    }

    #[test]
    fn test_refused_write_leaves_state_unchanged() {
        let data = MemoryData::default();
        let failing = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let store = StateStore::new(backed_kv(Arc::clone(&data), Arc::clone(&failing)));
        store.schedule("example.com", 1).unwrap();

        failing.store(1, std::sync::atomic::Ordering::SeqCst);
        assert!(store.unschedule("example.com").is_err());
        assert!(store.scheduled_domains().unwrap().contains_key("example.com"));
        assert!(store.unschedule("example.com").unwrap());
    }
}
