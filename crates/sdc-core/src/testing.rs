//! Shared fixtures for unit tests

use crate::error::Error;
use crate::host::MockKeyValueStore;
use crate::state::StateStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backing map of a mocked key-value store
pub(crate) type MemoryData = Arc<Mutex<HashMap<String, Value>>>;

/// Mocked key-value store that keeps values in memory
pub(crate) fn memory_kv() -> Arc<MockKeyValueStore> {
    backed_kv(MemoryData::default(), Arc::default())
}

/// Mocked key-value store over `data`
///
/// While `failing_sets` is above zero each `set` is refused and counts it
/// down by one.
pub(crate) fn backed_kv(data: MemoryData, failing_sets: Arc<AtomicUsize>) -> Arc<MockKeyValueStore> {
    let mut kv = MockKeyValueStore::new();

    let reader = Arc::clone(&data);
    kv.expect_get()
        .returning(move |key| Ok(reader.lock().get(key).cloned()));
    kv.expect_set().returning(move |key, value| {
        let refused = failing_sets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(Error::storage(key, "write refused"));
        }
        data.lock().insert(key.to_string(), value);
        Ok(())
    });

    Arc::new(kv)
}

/// State store over [`memory_kv`]
pub(crate) fn memory_store() -> Arc<StateStore> {
    Arc::new(StateStore::new(memory_kv()))
}
