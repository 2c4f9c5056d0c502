//! Standing rules that can suppress a whole scene tick.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::environment::{DayNight, HostProbe};

/// Outcome of evaluating a [`StandingPolicy`] once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PolicyVerdict {
    Allowed,
    SuppressedByNight,
    SuppressedByDay,
    SuppressedByHostUp,
}

impl PolicyVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyVerdict::Allowed)
    }
}

/// Exclusion conditions configured once at startup and evaluated every tick.
///
/// ```
/// use lively_lights::{PolicyVerdict, StandingPolicy};
///
/// # block_on(async {
/// let policy = StandingPolicy::default();
/// assert_eq!(policy.evaluate().await, PolicyVerdict::Allowed);
/// # });
/// # fn block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct StandingPolicy {
    not_at_night: bool,
    not_during_daytime: bool,
    not_host_up: Option<String>,
    turn_off: bool,
    day_night: Option<Arc<dyn DayNight>>,
    probe: Option<Arc<dyn HostProbe>>,
}

impl fmt::Debug for StandingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandingPolicy")
            .field("not_at_night", &self.not_at_night)
            .field("not_during_daytime", &self.not_during_daytime)
            .field("not_host_up", &self.not_host_up)
            .field("turn_off", &self.turn_off)
            .finish()
    }
}

impl StandingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress ticks while the oracle reports night.
    pub fn not_at_night(mut self, day_night: Arc<dyn DayNight>) -> Self {
        self.not_at_night = true;
        self.day_night = Some(day_night);
        self
    }

    /// Suppress ticks while the oracle reports day.
    pub fn not_during_daytime(mut self, day_night: Arc<dyn DayNight>) -> Self {
        self.not_during_daytime = true;
        self.day_night = Some(day_night);
        self
    }

    /// Suppress ticks while `address` answers the probe.
    pub fn not_host_up(mut self, address: &str, probe: Arc<dyn HostProbe>) -> Self {
        self.not_host_up = Some(address.to_string());
        self.probe = Some(probe);
        self
    }

    /// Switch the lights off while a tick is suppressed.
    pub fn turn_off(mut self, turn_off: bool) -> Self {
        self.turn_off = turn_off;
        self
    }

    pub fn turns_off(&self) -> bool {
        self.turn_off
    }

    /// Evaluate every configured condition now. Nothing is cached.
    pub async fn evaluate(&self) -> PolicyVerdict {
        if let Some(day_night) = &self.day_night {
            if self.not_at_night && day_night.is_night() {
                debug!("suppressed: it is night");
                return PolicyVerdict::SuppressedByNight;
            }
            if self.not_during_daytime && day_night.is_day() {
                debug!("suppressed: it is day");
                return PolicyVerdict::SuppressedByDay;
            }
        }

        if let (Some(address), Some(probe)) = (&self.not_host_up, &self.probe) {
            if probe.is_up(address).await {
                debug!("suppressed: host {address} is up");
                return PolicyVerdict::SuppressedByHostUp;
            }
        }

        PolicyVerdict::Allowed
    }
}
