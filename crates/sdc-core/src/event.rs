//! Events delivered by the host
//!
//! JSON form, one object per event:
//!
//! ```json
//! {"type": "tabUpdated", "tabId": 3, "url": "https://example.com/"}
//! {"type": "alarm", "name": "destroy-data"}
//! ```

use crate::host::TabId;
use serde::{Deserialize, Serialize};

/// Lifecycle, alarm and tab events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    /// Browser profile started
    Startup,
    /// Extension installed or updated
    Installed,
    /// Background is about to be suspended
    Suspend,
    /// A registered alarm fired
    Alarm {
        /// Alarm name
        name: String,
    },
    /// A tab became active in its window
    TabActivated {
        /// Tab identifier
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    /// A tab's properties changed
    TabUpdated {
        /// Tab identifier
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// New URL, present only when the URL changed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// A tab was closed
    TabRemoved {
        /// Tab identifier
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
}

impl HostEvent {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::Startup => "startup",
            HostEvent::Installed => "installed",
            HostEvent::Suspend => "suspend",
            HostEvent::Alarm { .. } => "alarm",
            HostEvent::TabActivated { .. } => "tabActivated",
            HostEvent::TabUpdated { .. } => "tabUpdated",
            HostEvent::TabRemoved { .. } => "tabRemoved",
        }
    }
}
