//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::bridge::Bridge;
use crate::environment::{DayNight, HostProbe};
use crate::errors::Error;
use crate::light::Light;
use crate::payload::LightState;
use crate::runtime::{BoxFuture, Instant};
use crate::types::LightId;

pub(crate) fn id(value: u32) -> LightId {
    LightId::create(value).unwrap()
}

/// Bridge serving a fixed set of lights and recording every command.
#[derive(Debug, Default)]
pub(crate) struct MockBridge {
    lights: Mutex<Vec<(LightId, bool)>>,
    queries: Mutex<HashMap<LightId, usize>>,
    list_calls: Mutex<usize>,
    sent: Mutex<Vec<(LightId, LightState, Instant)>>,
    failing: AtomicBool,
}

impl MockBridge {
    pub(crate) fn new(lights: &[(u32, bool)]) -> Self {
        let bridge = MockBridge::default();
        bridge.set_lights(lights);
        bridge
    }

    pub(crate) fn set_lights(&self, lights: &[(u32, bool)]) {
        *self.lights.lock() = lights
            .iter()
            .map(|&(light_id, reachable)| (id(light_id), reachable))
            .collect();
    }

    /// Make every query fail like an unreachable bridge.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn queries(&self, light_id: u32) -> usize {
        self.queries.lock().get(&id(light_id)).copied().unwrap_or(0)
    }

    pub(crate) fn list_calls(&self) -> usize {
        *self.list_calls.lock()
    }

    pub(crate) fn sent(&self) -> Vec<(LightId, LightState)> {
        self.sent
            .lock()
            .iter()
            .map(|(light_id, state, _)| (*light_id, state.clone()))
            .collect()
    }

    pub(crate) fn sent_at(&self) -> Vec<(LightId, LightState, Instant)> {
        self.sent.lock().clone()
    }

    pub(crate) fn sent_to(&self, light_id: u32) -> Vec<LightState> {
        self.sent()
            .into_iter()
            .filter(|(sent_id, _)| *sent_id == id(light_id))
            .map(|(_, state)| state)
            .collect()
    }

    fn check_failing(&self) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Bridge {
                address: "/lights".to_string(),
                description: "bridge unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl Bridge for MockBridge {
    fn send_light_state<'a>(
        &'a self,
        light_id: LightId,
        state: &'a LightState,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            self.check_failing()?;
            self.sent
                .lock()
                .push((light_id, state.clone(), Instant::now()));
            Ok(())
        })
    }

    fn query_light(&self, light_id: LightId) -> BoxFuture<'_, Result<Light, Error>> {
        Box::pin(async move {
            *self.queries.lock().entry(light_id).or_default() += 1;
            self.check_failing()?;
            let reachable = self
                .lights
                .lock()
                .iter()
                .find(|(known, _)| *known == light_id)
                .map(|(_, reachable)| *reachable);
            match reachable {
                Some(reachable) => Ok(Light::new(light_id, None, reachable)),
                None => Err(Error::Bridge {
                    address: format!("/lights/{light_id}"),
                    description: format!("resource, /lights/{light_id}, not available"),
                }),
            }
        })
    }

    fn list_lights(&self) -> BoxFuture<'_, Result<Vec<Light>, Error>> {
        Box::pin(async move {
            *self.list_calls.lock() += 1;
            self.check_failing()?;
            Ok(self
                .lights
                .lock()
                .iter()
                .map(|&(light_id, reachable)| Light::new(light_id, None, reachable))
                .collect())
        })
    }
}

#[derive(Debug)]
pub(crate) struct FixedDayNight {
    day: AtomicBool,
}

impl FixedDayNight {
    pub(crate) fn day() -> Self {
        FixedDayNight {
            day: AtomicBool::new(true),
        }
    }

    pub(crate) fn night() -> Self {
        FixedDayNight {
            day: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_day(&self, day: bool) {
        self.day.store(day, Ordering::SeqCst);
    }
}

impl DayNight for FixedDayNight {
    fn is_day(&self) -> bool {
        self.day.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub(crate) struct FixedProbe {
    up: AtomicBool,
    probed: Mutex<Vec<String>>,
}

impl FixedProbe {
    pub(crate) fn new(up: bool) -> Self {
        FixedProbe {
            up: AtomicBool::new(up),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    pub(crate) fn probed(&self) -> Vec<String> {
        self.probed.lock().clone()
    }
}

impl HostProbe for FixedProbe {
    fn is_up<'a>(&'a self, address: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            self.probed.lock().push(address.to_string());
            self.up.load(Ordering::SeqCst)
        })
    }
}
