//! Browser flavours
//!
//! Chromium-based browsers address browsing-data removal by origin, Firefox
//! by hostname.

use crate::domain::www_of;
use crate::error::{Error, Result};
use crate::removal::RemovalScope;
use serde::{Deserialize, Serialize};

/// Browser the background runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    /// Chrome, Edge, Brave and other Chromium builds
    #[default]
    Chrome,
    /// Firefox
    Firefox,
}

impl Browser {
    /// Parse a browser name
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse()
    }

    /// Get browser name
    pub fn name(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
        }
    }

    /// Scope of a per-site removal
    ///
    /// With cookies the scope widens to the root domain, since that is where
    /// a site usually sets them.
    pub fn site_scope(&self, hostname: &str, root: &str, include_cookies: bool) -> RemovalScope {
        match self {
            Browser::Chrome => {
                let mut origins = vec![format!("https://{hostname}"), format!("http://{hostname}")];
                if include_cookies {
                    let www = www_of(root);
                    origins.push(format!("https://{www}"));
                    origins.push(format!("http://{www}"));
                }
                RemovalScope::Origins(origins)
            }
            Browser::Firefox => {
                let mut hostnames = vec![hostname.to_string()];
                if include_cookies && root != hostname {
                    hostnames.push(root.to_string());
                }
                RemovalScope::Hostnames(hostnames)
            }
        }
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" | "edge" | "brave" => Ok(Browser::Chrome),
            "firefox" | "gecko" => Ok(Browser::Firefox),
            _ => Err(Error::config_value(
                "general.browser",
                format!("Unknown browser: {s}"),
            )),
        }
    }
}
