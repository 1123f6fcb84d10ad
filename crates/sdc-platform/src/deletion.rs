//! Recording data deletion
//!
//! Stands in for the browser's browsing-data API: every request is logged
//! and kept for inspection. Hosts can be marked as failing to exercise the
//! error path.

use crate::error::PlatformError;
use dashmap::DashSet;
use parking_lot::Mutex;
use sdc_core::{DataDeletion, RemovalRequest};
use tracing::info;

/// Records removal requests instead of performing them
#[derive(Debug, Default)]
pub struct RecordingDeletion {
    requests: Mutex<Vec<RemovalRequest>>,
    failing: DashSet<String>,
}

impl RecordingDeletion {
    /// Create a recorder that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse requests whose scope contains `entry`
    pub fn fail_for(&self, entry: impl Into<String>) {
        self.failing.insert(entry.into());
    }

    /// Requests accepted so far
    pub fn requests(&self) -> Vec<RemovalRequest> {
        self.requests.lock().clone()
    }

    /// Take the accepted requests, leaving the record empty
    pub fn take(&self) -> Vec<RemovalRequest> {
        std::mem::take(&mut *self.requests.lock())
    }
}

impl DataDeletion for RecordingDeletion {
    fn remove(&self, request: &RemovalRequest) -> sdc_core::Result<()> {
        if request
            .scope
            .entries()
            .iter()
            .any(|entry| self.failing.contains(entry))
        {
            return Err(PlatformError::RemovalRefused {
                scope: request.scope.to_string(),
            }
            .into());
        }

        info!(scope = %request.scope, data = %request.data_types, "Removing browsing data");
        self.requests.lock().push(request.clone());
        Ok(())
    }
}
