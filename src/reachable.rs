//! Which lights a scene may touch right now.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::bridge::Bridge;
use crate::cache::TtlCache;
use crate::errors::Error;
use crate::light::Light;
use crate::payload::LightState;
use crate::policy::StandingPolicy;
use crate::types::LightId;

type Result<T> = std::result::Result<T, Error>;

/// Tracks the reachability of lights with a read-through TTL cache and
/// applies the standing policy on every call.
///
/// Shared between the Breath supervisor and its workers, so every cache is
/// internally synchronized.
pub struct ReachableLights {
    bridge: Arc<dyn Bridge>,
    policy: StandingPolicy,
    light_ids: Option<Vec<LightId>>,
    refresh_interval: Duration,
    reachability: TtlCache<LightId, Light>,
    known_lights: TtlCache<(), Vec<LightId>>,
    turned_off: TtlCache<LightId, ()>,
}

impl ReachableLights {
    pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

    /// Track every light known to the bridge, without policy.
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        let interval = Self::DEFAULT_REFRESH_INTERVAL;
        ReachableLights {
            bridge,
            policy: StandingPolicy::default(),
            light_ids: None,
            refresh_interval: interval,
            reachability: TtlCache::new(interval),
            known_lights: TtlCache::new(interval),
            turned_off: TtlCache::new(interval),
        }
    }

    /// Restrict tracking to these lights, in this order.
    pub fn with_light_ids(mut self, light_ids: Vec<LightId>) -> Self {
        self.light_ids = Some(light_ids);
        self
    }

    pub fn with_policy(mut self, policy: StandingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the caches, so call it before the first query.
    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self.reachability = TtlCache::new(refresh_interval);
        self.known_lights = TtlCache::new(refresh_interval);
        self.turned_off = TtlCache::new(refresh_interval);
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn bridge(&self) -> &Arc<dyn Bridge> {
        &self.bridge
    }

    pub fn policy(&self) -> &StandingPolicy {
        &self.policy
    }

    /// Whether the bridge reports the light as reachable.
    ///
    /// An answer younger than the refresh interval is reused. A failed query
    /// is returned as an error and leaves the cache untouched.
    pub async fn is_reachable(&self, light_id: LightId) -> Result<bool> {
        self.light(light_id).await.map(|light| light.reachable())
    }

    async fn light(&self, light_id: LightId) -> Result<Light> {
        self.reachability
            .get_or_refresh(light_id, || async move {
                let light = self.bridge.query_light(light_id).await?;
                debug!("light {light_id} reachable: {}", light.reachable());
                Ok::<_, Error>(light)
            })
            .await
    }

    /// The configured lights, or every light known to the bridge.
    ///
    /// Listing the bridge also refreshes the reachability of every light it
    /// returns.
    async fn candidate_ids(&self) -> Result<Vec<LightId>> {
        if let Some(light_ids) = &self.light_ids {
            return Ok(light_ids.clone());
        }
        self.known_lights
            .get_or_refresh((), || async {
                let lights = self.bridge.list_lights().await?;
                let light_ids: Vec<LightId> = lights.iter().map(Light::light_id).collect();
                for light in lights {
                    self.reachability.insert(light.light_id(), light);
                }
                Ok::<_, Error>(light_ids)
            })
            .await
    }

    /// The lights usable this tick, in configured (or bridge) order.
    ///
    /// Returns nothing while the standing policy suppresses the tick, and
    /// switches the lights off if the policy asks for it, at most once per
    /// light per refresh interval. A light whose query fails is skipped for
    /// this tick only.
    pub async fn get_light_objects(&self) -> Result<Vec<Light>> {
        let verdict = self.policy.evaluate().await;
        if !verdict.is_allowed() {
            debug!("standing policy: {verdict}");
            if self.policy.turns_off() {
                self.turn_off().await?;
            }
            return Ok(Vec::new());
        }

        let mut lights = Vec::new();
        for light_id in self.candidate_ids().await? {
            match self.light(light_id).await {
                Ok(light) if light.reachable() => lights.push(light),
                Ok(_) => {}
                Err(e) => warn!("skipping light {light_id} this tick: {e}"),
            }
        }
        Ok(lights)
    }

    /// Same as [`ReachableLights::get_light_objects`], projected to ids.
    pub async fn get_light_ids(&self) -> Result<Vec<LightId>> {
        Ok(self
            .get_light_objects()
            .await?
            .iter()
            .map(Light::light_id)
            .collect())
    }

    /// One pass over the lights usable now. The set is computed once; call
    /// again for a fresh pass.
    pub async fn iter(&self) -> Result<std::vec::IntoIter<Light>> {
        Ok(self.get_light_objects().await?.into_iter())
    }

    async fn turn_off(&self) -> Result<()> {
        let off = LightState::off();
        for light_id in self.candidate_ids().await? {
            let sent = self
                .turned_off
                .get_or_refresh(light_id, || async {
                    info!("turning off light {light_id}");
                    self.bridge.send_light_state(light_id, &off).await
                })
                .await;
            if let Err(e) = sent {
                warn!("failed to turn off light {light_id}: {e}");
            }
        }
        Ok(())
    }
}
