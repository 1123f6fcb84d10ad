//! # Self-Destructing Cache Core
//!
//! Platform-independent core of a browser background that destroys the
//! cookies and site data of domains shortly after the user stops visiting
//! them.
//!
//! ## Architecture
//!
//! This crate provides:
//! - **Domain extraction** - Hostnames and approximate root domains
//! - **Tab tracking** - Which hostname every tab currently shows
//! - **Scheduling** - Due times for domains that went inactive
//! - **Sweeping** - Periodic destruction of due domains
//! - **Startup reset** - Everything except the whitelist is cleared
//! - **Configuration** - TOML configuration with browser presets
//!
//! Host capabilities (tabs, data removal, storage, alarms) are traits in
//! [`host`], implemented by `sdc-platform`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sdc_core::{Background, Config, HostEvent};
//! # fn host() -> sdc_core::Host { unimplemented!() }
//!
//! let config = Config::load("config.toml")?;
//! let background = Background::new(&config, host())?;
//!
//! background.start()?;
//! background.handle(&HostEvent::TabUpdated {
//!     tab_id: 1,
//!     url: Some("https://example.com/".into()),
//! })?;
//! # Ok::<(), sdc_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod host;
pub mod removal;
pub mod scheduler;
pub mod startup;
pub mod state;
pub mod sweeper;
pub mod tracker;
pub mod whitelist;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use background::{Background, Host, DESTROY_DATA_ALARM};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Browser, Config};
pub use error::{Error, Result};
pub use event::HostEvent;
pub use host::{DataDeletion, KeyValueStore, PeriodicTimer, Tab, TabId, TabQuery};
pub use removal::{DataCategory, DataTypes, RemovalRequest, RemovalScope};
pub use scheduler::{ScheduleOutcome, Scheduler};
pub use startup::StartupReset;
pub use state::StateStore;
pub use sweeper::{SweepOutcome, SweepReport, Sweeper};
pub use tracker::TabTracker;
pub use whitelist::Whitelist;
