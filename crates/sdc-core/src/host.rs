//! Host capabilities consumed by the core
//!
//! These traits define what the browser runtime must provide. Concrete
//! implementations live in `sdc-platform`; tests use mocks.

use crate::error::Result;
use crate::removal::RemovalRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser tab identifier
pub type TabId = i64;

/// A tab as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Tab identifier
    pub id: TabId,
    /// Current URL, if the host exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Tab {
    /// Create a tab pointing at `url`
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: Some(url.into()),
        }
    }
}

/// Tab lookup
#[cfg_attr(test, mockall::automock)]
pub trait TabQuery: Send + Sync {
    /// Look up a tab; `None` if it no longer exists
    fn get(&self, tab_id: TabId) -> Result<Option<Tab>>;
}

/// Browsing-data removal
///
/// Fire-and-forget from the core's point of view: a failure is logged and
/// never retried.
#[cfg_attr(test, mockall::automock)]
pub trait DataDeletion: Send + Sync {
    /// Remove the requested data
    fn remove(&self, request: &RemovalRequest) -> Result<()>;
}

/// Process-wide key-value storage that survives background suspension
///
/// Writes must be durable once `set` returns.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;
}

/// Recurring alarm scheduler
///
/// Firing is delivered back to the core as
/// [`Background::on_alarm`](crate::Background::on_alarm).
#[cfg_attr(test, mockall::automock)]
pub trait PeriodicTimer: Send + Sync {
    /// Register (or replace) a named alarm
    fn register(&self, name: &str, first_fire: Duration, period: Duration) -> Result<()>;
}
