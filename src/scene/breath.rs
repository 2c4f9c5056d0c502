//! Every light fades independently between random colors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::task::JoinHandle;

use super::{Deadline, Property, Result, Scene, SceneContext, SceneCore, SceneVariant, send_logged};
use crate::errors::Error;
use crate::payload::LightState;
use crate::random;
use crate::reachable::ReachableLights;
use crate::runtime::Cancel;
use crate::types::{Brightness, Hue, LightId, Range, Saturation, Seconds, TransitionTime};

/// Pause added after every transition before the next command.
const SETTLE_TIME: Duration = Duration::from_millis(200);

/// One worker per reachable light picks a random time span, hue and
/// brightness, fades to it, waits and repeats until its light is no longer
/// reachable.
pub struct Breath {
    core: SceneCore,
    brightness_range: Option<Range<Brightness>>,
    hue_range: Option<Range<Hue>>,
    time_range: Option<Range<Seconds>>,
}

#[derive(Debug, Clone, Copy)]
struct Ranges {
    brightness: Range<Brightness>,
    hue: Range<Hue>,
    time: Range<Seconds>,
}

fn set_brightness_range(scene: &mut Breath, value: &Value) -> Result<()> {
    scene.brightness_range = Some(Range::parse("brightness_range", value)?);
    Ok(())
}

fn set_hue_range(scene: &mut Breath, value: &Value) -> Result<()> {
    scene.hue_range = Some(Range::parse("hue_range", value)?);
    Ok(())
}

fn set_time_range(scene: &mut Breath, value: &Value) -> Result<()> {
    scene.time_range = Some(Range::parse("time_range", value)?);
    Ok(())
}

const PROPERTIES: &[Property<Breath>] = &[
    ("brightness_range", set_brightness_range),
    ("hue_range", set_hue_range),
    ("time_range", set_time_range),
];

impl Breath {
    pub fn new(context: SceneContext) -> Self {
        Breath {
            core: SceneCore::new(context),
            brightness_range: None,
            hue_range: None,
            time_range: None,
        }
    }

    fn ranges(&self) -> Result<Ranges> {
        let unset = |name: &str| Error::Configuration(format!("{name} is not set"));
        Ok(Ranges {
            brightness: self.brightness_range.ok_or_else(|| unset("brightness_range"))?,
            hue: self.hue_range.ok_or_else(|| unset("hue_range"))?,
            time: self.time_range.ok_or_else(|| unset("time_range"))?,
        })
    }
}

impl Scene for Breath {
    const VARIANT: SceneVariant = SceneVariant::Breath;

    fn properties() -> &'static [Property<Self>] {
        PROPERTIES
    }

    fn core(&self) -> &SceneCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SceneCore {
        &mut self.core
    }

    fn fill_defaults(&mut self) {
        self.brightness_range.get_or_insert_with(random::brightness_range);
        self.hue_range.get_or_insert_with(random::hue_range);
        self.time_range.get_or_insert_with(random::time_range);
    }

    fn check(&self) -> Result<()> {
        let ranges = self.ranges()?;
        TransitionTime::try_from(ranges.time.max())?;
        Ok(())
    }

    /// Reconcile workers once per refresh interval: start one for every
    /// reachable light without a live worker, leave the others alone.
    async fn run(&mut self, deadline: &Deadline) -> Result<()> {
        let ranges = self.ranges()?;
        let context = self.core.context();
        let interval = context.lights().refresh_interval();
        let workers_cancel = Cancel::new();
        let mut workers: HashMap<LightId, JoinHandle<()>> = HashMap::new();

        while !deadline.is_over() {
            for light_id in context.reachable_ids().await {
                let alive = workers
                    .get(&light_id)
                    .is_some_and(|worker| !worker.is_finished());
                if alive {
                    continue;
                }
                debug!("starting breath worker for light {light_id}");
                let worker = tokio::spawn(breathe(
                    context.lights().clone(),
                    light_id,
                    ranges,
                    workers_cancel.clone(),
                ));
                workers.insert(light_id, worker);
            }

            let span = deadline.remaining().map_or(interval, |left| left.min(interval));
            if !deadline.sleep(span).await {
                break;
            }
        }

        workers_cancel.cancel();
        for (light_id, result) in futures::future::join_all(
            workers
                .into_iter()
                .map(|(light_id, worker)| async move { (light_id, worker.await) }),
        )
        .await
        {
            if let Err(e) = result {
                warn!("breath worker for light {light_id} failed: {e}");
            }
        }
        Ok(())
    }
}

async fn breathe(lights: Arc<ReachableLights>, light_id: LightId, ranges: Ranges, cancel: Cancel) {
    let saturation = Saturation::new();
    while !cancel.is_cancelled() {
        match lights.is_reachable(light_id).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!("stopping breath worker for light {light_id}: {e}");
                break;
            }
        }

        let span = random::seconds_between(ranges.time);
        let mut state = LightState::new();
        state
            .hue(&random::hue_between(ranges.hue))
            .brightness(&random::brightness_between(ranges.brightness))
            .saturation(&saturation);
        match TransitionTime::try_from(span) {
            Ok(transition_time) => {
                state.transition_time(&transition_time);
            }
            Err(e) => debug!("light {light_id} fades without transition time: {e}"),
        }
        send_logged(lights.bridge().as_ref(), light_id, &state).await;

        if !cancel.sleep(span.as_duration() + SETTLE_TIME).await {
            break;
        }
    }
    debug!("breath worker for light {light_id} stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::{context, properties};
    use crate::testing::{MockBridge, id};
    use serde_json::json;

    fn breath(bridge: &Arc<MockBridge>) -> Breath {
        let mut scene = Breath::new(context(bridge));
        scene
            .configure(&properties(json!({
                "brightness_range": [10, 20],
                "hue_range": [1000, 2000],
                "time_range": [1, 2],
            })))
            .unwrap();
        scene
    }

    #[test]
    fn test_defaults_are_valid() {
        let bridge = Arc::new(MockBridge::new(&[]));
        let mut scene = Breath::new(context(&bridge));
        scene.validate().unwrap();
        assert!(scene.brightness_range.is_some());
        assert!(scene.hue_range.is_some());
        assert!(scene.time_range.is_some());
    }

    #[test]
    fn test_invalid_range() {
        let bridge = Arc::new(MockBridge::new(&[]));
        let mut scene = Breath::new(context(&bridge));
        let err = scene
            .configure(&properties(json!({"hue_range": [2000, 1000]})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref field, .. } if field == "hue_range"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_worker_per_light() {
        let bridge = Arc::new(MockBridge::new(&[(1, true), (2, true)]));
        let mut scene = breath(&bridge);

        let actual = scene.start(Some(Duration::from_secs(150))).await.unwrap();
        assert!(actual >= Duration::from_secs(150));

        for light in [1, 2] {
            let times: Vec<_> = bridge
                .sent_at()
                .into_iter()
                .filter(|(light_id, _, _)| *light_id == id(light))
                .map(|(_, _, at)| at)
                .collect();
            assert!(times.len() >= 150 / 3, "{} commands", times.len());
            for pair in times.windows(2) {
                assert!(pair[1] - pair[0] >= Duration::from_millis(1200));
            }
        }

        for state in bridge.sent_to(1) {
            let hue = state.get_hue().unwrap();
            assert!((1000..=2000).contains(&hue));
            let bri = state.get_brightness().unwrap();
            assert!((10..=20).contains(&bri));
            assert_eq!(state.get_saturation(), Some(254));
            let ticks = state.get_transition_time().unwrap();
            assert!((10..=20).contains(&ticks));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_light_stops_worker() {
        let bridge = Arc::new(MockBridge::new(&[(1, true), (2, false)]));
        let mut scene = breath(&bridge);

        scene.start(Some(Duration::from_secs(30))).await.unwrap();
        assert!(!bridge.sent_to(1).is_empty());
        assert!(bridge.sent_to(2).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_workers() {
        let bridge = Arc::new(MockBridge::new(&[(1, true)]));
        let mut scene = breath(&bridge);
        let cancel = scene.core().context().cancel().clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            cancel.cancel();
        });
        let actual = scene.start(None).await.unwrap();
        assert!(actual < Duration::from_secs(6));
        assert_eq!(scene.state(), crate::scene::SceneState::Finished);
    }
}
