//! Startup reset
//!
//! Clears browsing data for every origin except the whitelisted ones.

use crate::host::DataDeletion;
use crate::removal::{DataTypes, RemovalRequest, RemovalScope};
use crate::whitelist::Whitelist;
use std::sync::Arc;
use tracing::{info, warn};

/// Removes everything outside the whitelist
pub struct StartupReset {
    whitelist: Arc<Whitelist>,
    deletion: Arc<dyn DataDeletion>,
    data_types: DataTypes,
}

impl StartupReset {
    /// Create a reset removing every data category
    pub fn new(whitelist: Arc<Whitelist>, deletion: Arc<dyn DataDeletion>) -> Self {
        Self {
            whitelist,
            deletion,
            data_types: DataTypes::full_reset(),
        }
    }

    /// Remove only these categories
    pub fn with_data_types(mut self, data_types: DataTypes) -> Self {
        self.data_types = data_types;
        self
    }

    /// The request `destroy_all` sends
    pub fn request(&self) -> RemovalRequest {
        RemovalRequest::new(
            RemovalScope::ExcludeOrigins(self.whitelist.origins().to_vec()),
            self.data_types,
        )
    }

    /// Remove all data outside the whitelist; true on success
    ///
    /// A failure is logged and otherwise ignored.
    pub fn destroy_all(&self) -> bool {
        let request = self.request();
        match self.deletion.remove(&request) {
            Ok(()) => {
                info!(data = %request.data_types, "All cookies and data destroyed");
                true
            }
            Err(e) => {
                warn!("Startup reset failed: {}", e);
                false
            }
        }
    }
}
