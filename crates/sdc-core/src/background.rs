//! Background dispatcher
//!
//! Wires the tracker, scheduler, sweeper and startup reset to one set of host
//! collaborators and serializes every handler. A handler runs to completion
//! before the next one starts, so tab events and sweeps never interleave.

use crate::clock::Clock;
use crate::config::{Browser, Config};
use crate::error::Result;
use crate::event::HostEvent;
use crate::host::{DataDeletion, KeyValueStore, PeriodicTimer, TabId, TabQuery};
use crate::scheduler::Scheduler;
use crate::startup::StartupReset;
use crate::state::StateStore;
use crate::sweeper::{SweepReport, Sweeper};
use crate::tracker::TabTracker;
use crate::whitelist::Whitelist;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Name of the recurring sweep alarm
pub const DESTROY_DATA_ALARM: &str = "destroy-data";

/// Host collaborators the background runs against
#[derive(Clone)]
pub struct Host {
    /// Tab lookup
    pub tabs: Arc<dyn TabQuery>,
    /// Browsing-data removal
    pub deletion: Arc<dyn DataDeletion>,
    /// Persistent key-value storage
    pub storage: Arc<dyn KeyValueStore>,
    /// Alarm registration
    pub timer: Arc<dyn PeriodicTimer>,
    /// Wall clock
    pub clock: Arc<dyn Clock>,
}

/// The self-destructing cache background
pub struct Background {
    store: Arc<StateStore>,
    whitelist: Arc<Whitelist>,
    tracker: TabTracker,
    sweeper: Sweeper,
    reset: StartupReset,
    timer: Arc<dyn PeriodicTimer>,
    clock: Arc<dyn Clock>,
    browser: Browser,
    sweep_delay: Duration,
    sweep_interval: Duration,
    sweep_on_start: bool,
    reset_on_startup: bool,
    serial: Mutex<()>,
}

impl Background {
    /// Build a background from configuration and host collaborators
    ///
    /// Persisted state already in `host.storage` is picked up as is.
    pub fn new(config: &Config, host: Host) -> Result<Self> {
        config.validate()?;

        let whitelist = Arc::new(config.whitelist()?);
        let store = Arc::new(StateStore::new(host.storage));

        let scheduler = Arc::new(Scheduler::with_grace_period(
            Arc::clone(&store),
            Arc::clone(&whitelist),
            Arc::clone(&host.clock),
            config.schedule.grace_period(),
        ));
        let tracker = TabTracker::new(Arc::clone(&store), scheduler, host.tabs);
        let sweeper = Sweeper::new(
            Arc::clone(&store),
            Arc::clone(&whitelist),
            Arc::clone(&host.deletion),
            Arc::clone(&host.clock),
        )
        .with_browser(config.general.browser)
        .with_site_data(config.deletion.site_data_types());
        let reset = StartupReset::new(Arc::clone(&whitelist), host.deletion)
            .with_data_types(config.deletion.reset_data_types());

        Ok(Self {
            store,
            whitelist,
            tracker,
            sweeper,
            reset,
            timer: host.timer,
            clock: host.clock,
            browser: config.general.browser,
            sweep_delay: config.schedule.sweep_delay(),
            sweep_interval: config.schedule.sweep_interval(),
            sweep_on_start: config.schedule.sweep_on_start,
            reset_on_startup: config.deletion.reset_on_startup,
            serial: Mutex::new(()),
        })
    }

    /// Register the sweep alarm and optionally sweep once right away
    pub fn start(&self) -> Result<Option<SweepReport>> {
        let _serial = self.serial.lock();

        self.timer
            .register(DESTROY_DATA_ALARM, self.sweep_delay, self.sweep_interval)?;
        info!(
            browser = %self.browser,
            whitelisted = self.whitelist.len(),
            interval_secs = self.sweep_interval.as_secs(),
            "Background started"
        );

        if self.sweep_on_start {
            return self.sweeper.sweep().map(Some);
        }
        Ok(None)
    }

    /// An alarm fired
    ///
    /// Every delivery is recorded as a heartbeat; only the sweep alarm
    /// triggers a sweep.
    pub fn on_alarm(&self, name: &str) -> Result<Option<SweepReport>> {
        let _serial = self.serial.lock();

        self.store.set_last_heartbeat(self.clock.now_millis())?;
        if name != DESTROY_DATA_ALARM {
            debug!(alarm = name, "Ignoring unknown alarm");
            return Ok(None);
        }

        self.sweeper.sweep().map(Some)
    }

    /// The browser profile started
    pub fn on_startup(&self) -> bool {
        let _serial = self.serial.lock();
        info!("Browser started");
        self.reset()
    }

    /// The extension was installed or updated
    pub fn on_installed(&self) -> bool {
        let _serial = self.serial.lock();
        info!("Extension installed");
        self.reset()
    }

    fn reset(&self) -> bool {
        if !self.reset_on_startup {
            debug!("Startup reset disabled");
            return false;
        }
        self.reset.destroy_all()
    }

    /// The background is about to be suspended
    pub fn on_suspend(&self) {
        let _serial = self.serial.lock();
        info!("Background suspending");
    }

    /// A tab became active
    pub fn on_tab_activated(&self, tab_id: TabId) -> Result<()> {
        let _serial = self.serial.lock();
        self.tracker.on_tab_activated(tab_id)
    }

    /// A tab changed; `url` is present only when the URL changed
    pub fn on_tab_updated(&self, tab_id: TabId, url: Option<&str>) -> Result<()> {
        let _serial = self.serial.lock();
        self.tracker.on_tab_updated(tab_id, url)
    }

    /// A tab was closed
    pub fn on_tab_removed(&self, tab_id: TabId) -> Result<()> {
        let _serial = self.serial.lock();
        self.tracker.on_tab_removed(tab_id)
    }

    /// Dispatch a host event
    ///
    /// Returns the sweep report when the event caused a sweep.
    pub fn handle(&self, event: &HostEvent) -> Result<Option<SweepReport>> {
        match event {
            HostEvent::Startup => {
                self.on_startup();
            }
            HostEvent::Installed => {
                self.on_installed();
            }
            HostEvent::Suspend => self.on_suspend(),
            HostEvent::Alarm { name } => return self.on_alarm(name),
            HostEvent::TabActivated { tab_id } => self.on_tab_activated(*tab_id)?,
            HostEvent::TabUpdated { tab_id, url } => {
                self.on_tab_updated(*tab_id, url.as_deref())?;
            }
            HostEvent::TabRemoved { tab_id } => self.on_tab_removed(*tab_id)?,
        }
        Ok(None)
    }

    /// Persisted state
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Whitelist in effect
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::{MockDataDeletion, MockPeriodicTimer, MockTabQuery};
    use crate::removal::RemovalScope;
    use crate::sweeper::SweepOutcome;
    use crate::testing::memory_kv;

    fn host(deletion: MockDataDeletion, timer: MockPeriodicTimer, clock: &ManualClock) -> Host {
        Host {
            tabs: Arc::new(MockTabQuery::new()),
            deletion: Arc::new(deletion),
            storage: memory_kv(),
            timer: Arc::new(timer),
            clock: Arc::new(clock.clone()),
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.whitelist.origins = vec!["https://mail.google.com".to_string()];
        config
    }

    #[test]
    fn test_start_registers_alarm_and_sweeps() {
        let mut timer = MockPeriodicTimer::new();
        timer
            .expect_register()
            .withf(|name, first, period| {
                name == DESTROY_DATA_ALARM
                    && *first == Duration::from_secs(60)
                    && *period == Duration::from_secs(60)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let clock = ManualClock::new(0);
        let background = Background::new(&config(), host(MockDataDeletion::new(), timer, &clock)).unwrap();
        let report = background.start().unwrap();
        assert!(report.is_some_and(|r| r.is_empty()));
    }

    #[test]
    fn test_start_without_sweep() {
        let mut timer = MockPeriodicTimer::new();
        timer.expect_register().returning(|_, _, _| Ok(()));

        let mut config = config();
        config.schedule.sweep_on_start = false;
        let clock = ManualClock::new(0);
        let background = Background::new(&config, host(MockDataDeletion::new(), timer, &clock)).unwrap();
        assert!(background.start().unwrap().is_none());
    }

    #[test]
    fn test_unknown_alarm_only_records_heartbeat() {
        let clock = ManualClock::new(5_000);
        let background = Background::new(
            &config(),
            host(MockDataDeletion::new(), MockPeriodicTimer::new(), &clock),
        )
        .unwrap();

        assert!(background.on_alarm("something-else").unwrap().is_none());
        assert_eq!(background.store().last_heartbeat().unwrap(), Some(5_000));
    }

    #[test]
    fn test_navigation_then_sweep_destroys() {
        let mut deletion = MockDataDeletion::new();
        deletion
            .expect_remove()
            .withf(|request| {
                request.includes_cookies()
                    && request.scope.entries().contains(&"https://example.com".to_string())
            })
            .times(1)
            .returning(|_| Ok(()));

        let clock = ManualClock::new(0);
        let background =
            Background::new(&config(), host(deletion, MockPeriodicTimer::new(), &clock)).unwrap();

        background.on_tab_updated(1, Some("https://example.com/")).unwrap();
        background.on_tab_updated(1, Some("https://other.org/")).unwrap();

        clock.advance(Duration::from_secs(30));
        let report = background.on_alarm(DESTROY_DATA_ALARM).unwrap().unwrap();
        assert_eq!(report.outcome("example.com"), Some(SweepOutcome::Pending));

        clock.advance(Duration::from_secs(31));
        let report = background.on_alarm(DESTROY_DATA_ALARM).unwrap().unwrap();
        assert_eq!(
            report.outcome("example.com"),
            Some(SweepOutcome::Destroyed { include_cookies: true })
        );
    }

    #[test]
    fn test_startup_and_install_reset() {
        let mut deletion = MockDataDeletion::new();
        deletion
            .expect_remove()
            .withf(|request| {
                request.scope
                    == RemovalScope::ExcludeOrigins(vec!["https://mail.google.com".into()])
            })
            .times(2)
            .returning(|_| Ok(()));

        let clock = ManualClock::new(0);
        let background =
            Background::new(&config(), host(deletion, MockPeriodicTimer::new(), &clock)).unwrap();
        assert!(background.handle(&HostEvent::Startup).unwrap().is_none());
        assert!(background.handle(&HostEvent::Installed).unwrap().is_none());
    }

    #[test]
    fn test_reset_disabled() {
        let mut deletion = MockDataDeletion::new();
        deletion.expect_remove().never();

        let mut config = config();
        config.deletion.reset_on_startup = false;
        let clock = ManualClock::new(0);
        let background =
            Background::new(&config, host(deletion, MockPeriodicTimer::new(), &clock)).unwrap();
        assert!(!background.on_startup());
    }

    #[test]
    fn test_handle_dispatches_tab_events() {
        let clock = ManualClock::new(0);
        let background = Background::new(
            &config(),
            host(MockDataDeletion::new(), MockPeriodicTimer::new(), &clock),
        )
        .unwrap();

        background
            .handle(&HostEvent::TabUpdated {
                tab_id: 4,
                url: Some("https://www.example.com/".into()),
            })
            .unwrap();
        assert_eq!(
            background.store().active_tab(4).unwrap(),
            Some("example.com".to_string())
        );

        background.handle(&HostEvent::TabRemoved { tab_id: 4 }).unwrap();
        assert!(background
            .store()
            .scheduled_domains()
            .unwrap()
            .contains_key("example.com"));

        background.handle(&HostEvent::Suspend).unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config();
        config.schedule.sweep_interval_secs = 0;
        let clock = ManualClock::new(0);
        let result = Background::new(
            &config,
            host(MockDataDeletion::new(), MockPeriodicTimer::new(), &clock),
        );
        assert!(result.is_err());
    }
}
