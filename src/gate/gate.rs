use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{
    config::GateConfig,
    message::{status_message, StatusMessage},
    poller::PollerHandle,
    status::OperatingStatus,
};
use crate::{
    error::{ConfigError, GateError, GatedOperation},
    timing::{
        clock::{Clock, SystemClock},
        schedule::Schedule,
    },
};

const EVENT_CAPACITY: usize = 16;

/// Last evaluation. Exists only once the gate is initialized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GateState {
    pub status: OperatingStatus,
    pub last_checked_at: DateTime<Tz>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub from: OperatingStatus,
    pub to: OperatingStatus,
    pub at: DateTime<Tz>,
}

/// Everything the UI layer needs, taken from a single evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GateSnapshot {
    pub status: OperatingStatus,
    pub message: StatusMessage,
    pub next_open_time: Option<DateTime<Tz>>,
    pub can_add_to_cart: bool,
    pub can_checkout: bool,
    pub last_checked_at: DateTime<Tz>,
}

/// Decides whether cart and checkout operations are currently permitted.
///
/// The gate refuses to answer until `init` (or `start`) has run. Permission
/// checks always re-evaluate the clock, so they never act on a stale status;
/// the periodic poll exists to emit `StatusChange` events for renderers.
pub struct StoreHoursGate {
    schedule: Schedule,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    state: Mutex<Option<GateState>>,
    events: broadcast::Sender<StatusChange>,
}

impl StoreHoursGate {
    pub fn new(config: &GateConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let schedule = config.schedule()?;
        let poll_interval = config.poll_interval()?;
        // Also catches a bad timezone when the caller supplied its own clock.
        config.timezone()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            schedule,
            clock,
            poll_interval,
            state: Mutex::new(None),
            events,
        })
    }

    pub fn with_system_clock(config: &GateConfig) -> Result<Self, ConfigError> {
        let clock = SystemClock::new(config.timezone()?);
        Self::new(config, Arc::new(clock))
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now()
    }

    /// First evaluation. Calling it again behaves like `refresh`.
    pub fn init(&self) -> OperatingStatus {
        let mut guard = self.lock();
        if let Some(state) = guard.as_mut() {
            return self.apply(state).0;
        }
        let now = self.clock.now();
        let status = self.schedule.compute_status(&now);
        *guard = Some(GateState {
            status,
            last_checked_at: now,
        });
        info!(status = %status, at = %now, "store hours gate initialized");
        status
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Re-evaluates the clock. Emits a `StatusChange` only when the status differs
    /// from the cached one.
    pub fn refresh(&self) -> Result<Option<StatusChange>, GateError> {
        self.evaluate().map(|(_, change)| change)
    }

    /// The cached status from the last evaluation.
    pub fn status(&self) -> Result<OperatingStatus, GateError> {
        self.state().map(|state| state.status)
    }

    pub fn message(&self) -> Result<StatusMessage, GateError> {
        self.status().map(status_message)
    }

    pub fn last_checked_at(&self) -> Result<DateTime<Tz>, GateError> {
        self.state().map(|state| state.last_checked_at)
    }

    pub fn next_open_time(&self) -> Result<Option<DateTime<Tz>>, GateError> {
        self.snapshot().map(|snapshot| snapshot.next_open_time)
    }

    pub fn snapshot(&self) -> Result<GateSnapshot, GateError> {
        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(GateError::NotInitialized)?;
        let (status, now, _) = self.apply(state);
        let open = status.is_open();
        Ok(GateSnapshot {
            status,
            message: status_message(status),
            next_open_time: self.schedule.next_reopening(&now),
            can_add_to_cart: open,
            can_checkout: open,
            last_checked_at: state.last_checked_at,
        })
    }

    pub fn can_add_to_cart(&self) -> Result<bool, GateError> {
        self.evaluate().map(|(status, _)| status.is_open())
    }

    pub fn can_checkout(&self) -> Result<bool, GateError> {
        self.evaluate().map(|(status, _)| status.is_open())
    }

    /// Like `can_add_to_cart`, but a closed store is an error carrying the
    /// message to show the user.
    pub fn ensure_can_add_to_cart(&self) -> Result<(), GateError> {
        self.ensure_open(GatedOperation::AddToCart)
    }

    pub fn ensure_can_checkout(&self) -> Result<(), GateError> {
        self.ensure_open(GatedOperation::Checkout)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.events.subscribe()
    }

    /// Initializes the gate if needed and re-evaluates it every poll interval
    /// until the returned handle is stopped or dropped.
    pub fn start(self: &Arc<Self>) -> PollerHandle {
        self.init();
        PollerHandle::spawn(Arc::clone(self))
    }

    fn ensure_open(&self, operation: GatedOperation) -> Result<(), GateError> {
        let (status, _) = self.evaluate()?;
        if status.is_open() {
            return Ok(());
        }
        warn!(operation = %operation, status = %status, "operation blocked while store is closed");
        Err(GateError::Closed {
            operation,
            status,
            message: status_message(status),
        })
    }

    fn evaluate(&self) -> Result<(OperatingStatus, Option<StatusChange>), GateError> {
        let mut guard = self.lock();
        let state = guard.as_mut().ok_or(GateError::NotInitialized)?;
        let (status, _, change) = self.apply(state);
        Ok((status, change))
    }

    /// Runs with the state lock held, so a check and a transition never interleave.
    /// Returns the clock reading the status was computed from.
    fn apply(
        &self,
        state: &mut GateState,
    ) -> (OperatingStatus, DateTime<Tz>, Option<StatusChange>) {
        let now = self.clock.now();
        let status = self.schedule.compute_status(&now);
        if now > state.last_checked_at {
            state.last_checked_at = now;
        }
        if state.status == status {
            return (status, now, None);
        }

        let change = StatusChange {
            from: state.status,
            to: status,
            at: now,
        };
        state.status = status;
        info!(from = %change.from, to = %change.to, at = %now, "store status changed");
        // No receivers is fine.
        let _ = self.events.send(change.clone());
        (status, now, Some(change))
    }

    fn state(&self) -> Result<GateState, GateError> {
        (*self.lock()).ok_or(GateError::NotInitialized)
    }

    fn lock(&self) -> MutexGuard<'_, Option<GateState>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
