//! Periodic alarm drivers
//!
//! [`TokioTimer`] runs real intervals and delivers fired alarm names over a
//! channel. [`ManualTimer`] only remembers registrations and answers which
//! alarms fall due inside a window of simulated time.

use crate::error::PlatformError;
use dashmap::DashMap;
use parking_lot::Mutex;
use sdc_core::{Clock, PeriodicTimer};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

fn check_period(name: &str, period: Duration) -> sdc_core::Result<()> {
    if period.is_zero() {
        return Err(sdc_core::Error::Timer(format!(
            "alarm '{name}' needs a non-zero period"
        )));
    }
    Ok(())
}

/// Alarms backed by tokio intervals
pub struct TokioTimer {
    sender: mpsc::UnboundedSender<String>,
    tasks: DashMap<String, JoinHandle<()>>,
}

impl TokioTimer {
    /// Create a timer and the receiver that fired alarm names arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                tasks: DashMap::new(),
            },
            receiver,
        )
    }

    /// Stop an alarm; true if it was registered
    pub fn cancel(&self, name: &str) -> bool {
        match self.tasks.remove(name) {
            Some((_, task)) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl PeriodicTimer for TokioTimer {
    fn register(&self, name: &str, first_fire: Duration, period: Duration) -> sdc_core::Result<()> {
        check_period(name, period)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| PlatformError::NoRuntime(name.to_string()))?;

        let sender = self.sender.clone();
        let alarm = name.to_string();
        let task = runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + first_fire, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if sender.send(alarm.clone()).is_err() {
                    break;
                }
            }
        });

        if let Some(previous) = self.tasks.insert(name.to_string(), task) {
            previous.abort();
        }
        debug!(
            alarm = name,
            first_fire_secs = first_fire.as_secs(),
            period_secs = period.as_secs(),
            "Alarm registered"
        );
        Ok(())
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().abort();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    first_at: u64,
    period: u64,
}

/// Alarms computed against a simulated clock
pub struct ManualTimer {
    clock: Arc<dyn Clock>,
    alarms: Mutex<BTreeMap<String, Registration>>,
}

impl ManualTimer {
    /// Create a timer measuring registrations from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            alarms: Mutex::new(BTreeMap::new()),
        }
    }

    /// Names of registered alarms
    pub fn registered(&self) -> Vec<String> {
        self.alarms.lock().keys().cloned().collect()
    }

    /// Fire times in `(after, until]`, in time order
    pub fn fires_between(&self, after: u64, until: u64) -> Vec<(u64, String)> {
        let mut fires = Vec::new();

        for (name, registration) in self.alarms.lock().iter() {
            let Registration { first_at, period } = *registration;
            let mut at = if after < first_at {
                first_at
            } else {
                first_at + ((after - first_at) / period + 1) * period
            };
            while at <= until {
                fires.push((at, name.clone()));
                at += period;
            }
        }

        fires.sort();
        fires
    }
}

impl PeriodicTimer for ManualTimer {
    fn register(&self, name: &str, first_fire: Duration, period: Duration) -> sdc_core::Result<()> {
        check_period(name, period)?;
        let registration = Registration {
            first_at: self.clock.now_millis() + first_fire.as_millis() as u64,
            period: period.as_millis() as u64,
        };
        self.alarms.lock().insert(name.to_string(), registration);
        debug!(alarm = name, first_at = registration.first_at, "Alarm registered");
        Ok(())
    }
}
