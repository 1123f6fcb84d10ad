//! Configuration management for the self-destructing cache
//!
//! Provides a strongly-typed configuration system with TOML support
//! and browser presets.

mod browser;

pub use browser::Browser;

use crate::error::{Error, Result};
use crate::removal::{DataCategory, DataTypes};
use crate::whitelist::Whitelist;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Origins whose data survives by default
pub const DEFAULT_WHITELIST: &[&str] = &[
    // Proton
    "https://account-api.proton.me",
    "https://account.proton.me",
    "https://calendar.proton.me",
    "https://drive.proton.me/",
    "https://mail.proton.me",
    "https://pass.proton.me/",
    "https://www.proton.me",
    "https://app.simplelogin.io",
    // Google
    "https://accounts.google.com",
    "https://calendar.google.com",
    "https://keep.google.com",
    "https://mail.google.com",
    "https://myaccount.google.com",
    // Microsoft
    "https://myaccount.microsoft.com",
    "https://www.bing.com",
    "https://www.live.com",
    "https://www.office.com",
    "https://www.sharepoint.de",
    // Notion
    "https://www.notion.so",
    // Dev
    "https://www.github.com",
    // Others
    "https://myprivacy.dpgmedia.nl",
    "https://nzbgeek.info",
    "https://www.1password.com",
    "https://www.linkedin.com",
    "https://www.miro.com",
    "https://www.nos.nl",
    "https://www.nu.nl",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General application settings
    pub general: GeneralConfig,

    /// Sites that are never destroyed
    pub whitelist: WhitelistConfig,

    /// Grace period and sweep timing
    pub schedule: ScheduleConfig,

    /// What gets removed
    pub deletion: DeletionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Default configuration for a browser
    pub fn for_browser(browser: Browser) -> Self {
        let mut config = Self::default();
        config.general.browser = browser;
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schedule.grace_period_secs == 0 {
            return Err(Error::config_value(
                "schedule.grace_period_secs",
                "Must be greater than 0",
            ));
        }
        if self.schedule.sweep_interval_secs == 0 {
            return Err(Error::config_value(
                "schedule.sweep_interval_secs",
                "Must be greater than 0",
            ));
        }

        if self.deletion.site_data.is_empty() {
            return Err(Error::config_value(
                "deletion.site_data",
                "At least one data category is required",
            ));
        }
        // Cookies are decided per sweep, never configured for site removals
        if self.deletion.site_data.contains(&DataCategory::Cookies) {
            return Err(Error::config_value(
                "deletion.site_data",
                "Must not contain cookies",
            ));
        }
        if self.deletion.reset_on_startup && self.deletion.reset_data.is_empty() {
            return Err(Error::config_value(
                "deletion.reset_data",
                "At least one data category is required when reset_on_startup is enabled",
            ));
        }

        self.whitelist()?;
        Ok(())
    }

    /// Build the whitelist from the configured origins
    pub fn whitelist(&self) -> Result<Whitelist> {
        Whitelist::from_origins(&self.whitelist.origins)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Configuration name
    pub name: String,
    /// Browser flavour used to address removals
    pub browser: Browser,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            browser: Browser::Chrome,
        }
    }
}

/// Whitelist configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitelistConfig {
    /// Origin URLs; their root domains are exempt from destruction
    pub origins: Vec<String>,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            origins: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay before an inactive domain becomes due
    pub grace_period_secs: u64,
    /// Delay before the first sweep alarm
    pub sweep_delay_secs: u64,
    /// Period of the sweep alarm
    pub sweep_interval_secs: u64,
    /// Sweep once when the background starts
    pub sweep_on_start: bool,
}

impl ScheduleConfig {
    /// Grace period as a duration
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// First alarm delay as a duration
    pub fn sweep_delay(&self) -> Duration {
        Duration::from_secs(self.sweep_delay_secs)
    }

    /// Alarm period as a duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 60,
            sweep_delay_secs: 60,
            sweep_interval_secs: 60,
            sweep_on_start: true,
        }
    }
}

/// Deletion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletionConfig {
    /// Categories removed for a destroyed site (cookies are added per sweep)
    pub site_data: Vec<DataCategory>,
    /// Categories removed by the startup reset
    pub reset_data: Vec<DataCategory>,
    /// Reset everything except whitelisted origins on startup and install
    pub reset_on_startup: bool,
}

impl DeletionConfig {
    /// Site data categories as flags
    pub fn site_data_types(&self) -> DataTypes {
        DataTypes::from_categories(&self.site_data)
    }

    /// Reset categories as flags
    pub fn reset_data_types(&self) -> DataTypes {
        DataTypes::from_categories(&self.reset_data)
    }
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            site_data: DataTypes::site_data().categories(),
            reset_data: DataTypes::full_reset().categories(),
            reset_on_startup: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log file path (None = stderr only)
    pub file: Option<String>,
    /// Enable JSON format logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json_format: false,
        }
    }
}
