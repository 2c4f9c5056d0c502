//! Timed light animations.
//!
//! Every scene goes through the same lifecycle:
//!
//! 1. construction ([`SceneState::Unconfigured`]), optionally followed by
//!    explicit properties through [`Scene::configure`];
//! 2. [`Scene::set_defaults`] fills every property left unset with a random
//!    legal value ([`SceneState::Configured`]);
//! 3. [`Scene::validate`] checks the cross-field invariants
//!    ([`SceneState::Validated`]);
//! 4. [`Scene::start`] runs the animation until the optional duration is
//!    over or the context is cancelled ([`SceneState::Running`], then
//!    [`SceneState::Finished`]).
//!
//! Scene variants declare their properties in a static table mapping the
//! property name to a setter that validates the loosely typed value.

mod breath;
mod pendulum;
mod sequence;

pub use breath::Breath;
pub use pendulum::Pendulum;
pub use sequence::Sequence;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde_json::{Map, Value};

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::payload::LightState;
use crate::reachable::ReachableLights;
use crate::runtime::{Cancel, Instant};
use crate::types::{LightId, Seconds};

type Result<T> = std::result::Result<T, Error>;

/// Name of a scene implementation, as used in scene configs and on the
/// command line.
///
/// ```
/// use std::str::FromStr;
/// use lively_lights::SceneVariant;
///
/// assert_eq!(SceneVariant::from_str("pendulum").unwrap(), SceneVariant::Pendulum);
/// assert_eq!(SceneVariant::Breath.to_string(), "breath");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum SceneVariant {
    Breath,
    Pendulum,
    Sequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum SceneState {
    Unconfigured,
    Configured,
    Validated,
    Running,
    Finished,
}

/// A property name and the setter validating its value.
pub type Property<S> = (&'static str, fn(&mut S, &Value) -> Result<()>);

/// Collaborators shared by every scene of one run.
#[derive(Clone)]
pub struct SceneContext {
    bridge: Arc<dyn Bridge>,
    lights: Arc<ReachableLights>,
    cancel: Cancel,
}

impl SceneContext {
    pub fn new(lights: Arc<ReachableLights>) -> Self {
        SceneContext {
            bridge: lights.bridge().clone(),
            lights,
            cancel: Cancel::new(),
        }
    }

    /// Use an externally owned cancellation signal, e.g. one tied to Ctrl-C.
    pub fn with_cancel(mut self, cancel: Cancel) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn lights(&self) -> &Arc<ReachableLights> {
        &self.lights
    }

    pub fn cancel(&self) -> &Cancel {
        &self.cancel
    }

    /// Send a state, logging instead of failing.
    pub(crate) async fn send(&self, light_id: LightId, state: &LightState) {
        send_logged(self.bridge.as_ref(), light_id, state).await
    }

    /// Ids usable this tick; none when the tracker fails.
    pub(crate) async fn reachable_ids(&self) -> Vec<LightId> {
        self.lights.get_light_ids().await.unwrap_or_else(|e| {
            warn!("no lights this tick: {e}");
            Vec::new()
        })
    }
}

pub(crate) async fn send_logged(bridge: &dyn Bridge, light_id: LightId, state: &LightState) {
    if let Err(e) = bridge.send_light_state(light_id, state).await {
        warn!("failed to update light {light_id}: {e}");
    }
}

/// Wall-clock accounting of one scene run.
#[derive(Debug)]
pub struct Deadline {
    started: Instant,
    duration: Option<Duration>,
    cancel: Cancel,
}

impl Deadline {
    pub(crate) fn new(duration: Option<Duration>, cancel: Cancel) -> Self {
        Deadline {
            started: Instant::now(),
            duration,
            cancel,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.duration
            .map(|duration| duration.saturating_sub(self.elapsed()))
    }

    /// The duration is used up, or the run was cancelled.
    pub fn is_over(&self) -> bool {
        self.cancel.is_cancelled() || self.remaining() == Some(Duration::ZERO)
    }

    /// Whether waiting `span` from now would reach the end of the duration.
    pub fn would_overrun(&self, span: Duration) -> bool {
        self.cancel.is_cancelled()
            || self
                .duration
                .is_some_and(|duration| self.elapsed() + span >= duration)
    }

    /// Returns `false` if the run was cancelled while sleeping.
    pub async fn sleep(&self, span: Duration) -> bool {
        self.cancel.sleep(span).await
    }

    /// Wait for whatever is left of the duration.
    pub(crate) async fn sleep_out(&self) {
        if let Some(remaining) = self.remaining().filter(|r| !r.is_zero()) {
            self.cancel.sleep(remaining).await;
        }
    }
}

/// Shortest tick a scene is shrunk to.
const MIN_SLEEP: f64 = 0.1;

/// Halve sleep and transition time together until one tick fits into the
/// duration.
pub(crate) fn fit_to_duration(
    sleep: Seconds,
    transition: Seconds,
    duration: Option<Duration>,
) -> (Seconds, Seconds) {
    let Some(limit) = duration.map(|d| d.as_secs_f64()) else {
        return (sleep, transition);
    };

    let (mut sleep, mut transition) = (sleep, transition);
    while sleep.value() > limit && sleep.value() / 2.0 >= MIN_SLEEP {
        sleep = sleep.scale(0.5);
        transition = transition.scale(0.5);
    }
    (sleep, transition)
}

/// Shared bookkeeping of a scene instance.
pub struct SceneCore {
    context: SceneContext,
    state: SceneState,
    actual_duration: Option<Duration>,
}

impl SceneCore {
    pub(crate) fn new(context: SceneContext) -> Self {
        SceneCore {
            context,
            state: SceneState::Unconfigured,
            actual_duration: None,
        }
    }

    pub fn context(&self) -> &SceneContext {
        &self.context
    }
}

pub trait Scene: Send + Sized + 'static {
    const VARIANT: SceneVariant;

    fn properties() -> &'static [Property<Self>];

    fn core(&self) -> &SceneCore;

    fn core_mut(&mut self) -> &mut SceneCore;

    /// Fill every unset property with a random legal value.
    fn fill_defaults(&mut self);

    /// Check invariants spanning several properties.
    fn check(&self) -> Result<()>;

    /// The animation loop. Returns at the next check point after the
    /// deadline is over.
    fn run(&mut self, deadline: &Deadline) -> impl Future<Output = Result<()>> + Send;

    fn variant(&self) -> SceneVariant {
        Self::VARIANT
    }

    fn state(&self) -> SceneState {
        self.core().state
    }

    /// Wall-clock time of the last finished run.
    fn actual_duration(&self) -> Option<Duration> {
        self.core().actual_duration
    }

    /// Set one property by name, validating its value.
    ///
    /// A validated scene goes back to [`SceneState::Configured`], so the next
    /// [`Scene::start`] checks the configuration again.
    fn set_property(&mut self, name: &str, value: &Value) -> Result<()> {
        let (_, setter) = Self::properties()
            .iter()
            .find(|(property, _)| *property == name)
            .ok_or_else(|| Error::invalid_property(&Self::VARIANT.to_string(), name))?;
        setter(self, value)?;
        if self.state() > SceneState::Configured {
            self.core_mut().state = SceneState::Configured;
        }
        Ok(())
    }

    /// Set every property of the map. Fails on the first unknown name or
    /// invalid value.
    fn configure(&mut self, properties: &Map<String, Value>) -> Result<()> {
        for (name, value) in properties {
            self.set_property(name, value)?;
        }
        Ok(())
    }

    fn set_defaults(&mut self) {
        self.fill_defaults();
        self.core_mut().state = SceneState::Configured;
    }

    /// Apply defaults if needed and check the configuration. Nothing is sent.
    fn validate(&mut self) -> Result<()> {
        if self.state() < SceneState::Configured {
            self.set_defaults();
        }
        self.check()?;
        self.core_mut().state = SceneState::Validated;
        Ok(())
    }

    /// Run the scene, for `duration` if given, and return the time it took.
    ///
    /// With a duration the returned time is never shorter than requested,
    /// unless the run is cancelled.
    fn start(&mut self, duration: Option<Duration>) -> impl Future<Output = Result<Duration>> + Send {
        async move {
            if self.state() < SceneState::Validated {
                self.validate()?;
            }

            let deadline = Deadline::new(duration, self.core().context.cancel.clone());
            self.core_mut().state = SceneState::Running;
            match duration {
                Some(duration) => info!("starting scene {} for {:?}", Self::VARIANT, duration),
                None => info!("starting scene {}", Self::VARIANT),
            }

            let result = self.run(&deadline).await;
            if result.is_ok() {
                deadline.sleep_out().await;
            }

            let actual = deadline.elapsed();
            let core = self.core_mut();
            core.state = SceneState::Finished;
            core.actual_duration = Some(actual);
            info!("finished scene {} after {:?}", Self::VARIANT, actual);
            result.map(|_| actual)
        }
    }
}

/// Any scene variant, picked at runtime by name.
pub enum SceneKind {
    Breath(Breath),
    Pendulum(Pendulum),
    Sequence(Sequence),
}

macro_rules! dispatch {
    ($self:expr, $scene:ident => $body:expr) => {
        match $self {
            SceneKind::Breath($scene) => $body,
            SceneKind::Pendulum($scene) => $body,
            SceneKind::Sequence($scene) => $body,
        }
    };
}

impl SceneKind {
    pub fn new(variant: SceneVariant, context: SceneContext) -> Self {
        match variant {
            SceneVariant::Breath => SceneKind::Breath(Breath::new(context)),
            SceneVariant::Pendulum => SceneKind::Pendulum(Pendulum::new(context)),
            SceneVariant::Sequence => SceneKind::Sequence(Sequence::new(context)),
        }
    }

    /// Fails with [`Error::UnknownSceneVariant`] for an unknown name.
    pub fn from_name(name: &str, context: SceneContext) -> Result<Self> {
        let variant = name
            .parse::<SceneVariant>()
            .map_err(|_| Error::UnknownSceneVariant(name.to_string()))?;
        Ok(Self::new(variant, context))
    }

    /// Construct and configure in one go.
    pub fn with_properties(
        name: &str,
        properties: &Map<String, Value>,
        context: SceneContext,
    ) -> Result<Self> {
        let mut scene = Self::from_name(name, context)?;
        scene.configure(properties)?;
        Ok(scene)
    }

    pub fn variant(&self) -> SceneVariant {
        dispatch!(self, scene => scene.variant())
    }

    pub fn state(&self) -> SceneState {
        dispatch!(self, scene => scene.state())
    }

    pub fn actual_duration(&self) -> Option<Duration> {
        dispatch!(self, scene => scene.actual_duration())
    }

    pub fn configure(&mut self, properties: &Map<String, Value>) -> Result<()> {
        dispatch!(self, scene => scene.configure(properties))
    }

    pub fn set_defaults(&mut self) {
        dispatch!(self, scene => scene.set_defaults())
    }

    pub fn validate(&mut self) -> Result<()> {
        dispatch!(self, scene => scene.validate())
    }

    pub async fn start(&mut self, duration: Option<Duration>) -> Result<Duration> {
        dispatch!(self, scene => scene.start(duration).await)
    }
}
