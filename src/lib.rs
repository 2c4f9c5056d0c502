//! # lively_lights
//!
//! Timed color and brightness scenes for smart lights behind a Hue bridge.
//!
//! A scene is a parametrized animation (breathing colors, two groups of
//! lights swinging between two colors, a color sequence) that runs for a
//! given duration against the lights that are reachable at each tick.
//! Standing rules can suppress scenes at night, during the day or while
//! another host on the network is up.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lively_lights::{HueBridge, ReachableLights, Scene, SceneContext, Sequence};
//!
//! async fn rainbow() -> Result<(), lively_lights::Error> {
//!     let bridge = Arc::new(HueBridge::new("192.168.1.2", "username")?);
//!     let lights = Arc::new(ReachableLights::new(bridge));
//!
//!     let mut scene = Sequence::new(SceneContext::new(lights));
//!     scene.set_property("hue_sequence", &serde_json::json!([0, 21845, 43690]))?;
//!     scene.set_property("brightness", &serde_json::json!(254))?;
//!     scene.start(Some(Duration::from_secs(60))).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Validated parameters**: [`Brightness`], [`Hue`], [`Saturation`],
//!   [`LightId`], [`Seconds`] and [`TransitionTime`] only hold legal values
//! - **Scenes**: [`Breath`], [`Pendulum`] and [`Sequence`], or any of them by
//!   name through [`SceneKind`]
//! - **Reachability**: [`ReachableLights`] caches which lights respond and
//!   applies a [`StandingPolicy`]
//! - **Batches**: [`Launcher`] runs lists of [`SceneConfig`]s, in order or
//!   shuffled, once or forever
//! - **Environment**: sunrise and sunset with [`SolarDayNight`], host
//!   presence with [`AddressProbe`]
//!
//! ## Runtime
//!
//! The library runs on tokio. Every wait goes through [`runtime::Cancel`],
//! so a running scene stops at its next check point once cancelled.

mod bridge;
mod cache;
mod config;
mod environment;
mod errors;
mod history;
mod launcher;
mod light;
mod payload;
mod policy;
pub mod random;
mod reachable;
pub mod runtime;
mod scene;
mod status;
mod types;

#[cfg(test)]
mod testing;

// Re-export public API
pub use bridge::{Bridge, HueBridge};
pub use cache::TtlCache;
pub use config::{Configuration, DEFAULT_ENV_PREFIX, LogLevel};
pub use environment::{AddressProbe, DayNight, HostProbe, Location, SolarDayNight, SunTimes};
pub use errors::Error;
pub use history::{HistoryEntry, HistorySummary, RequestHistory, RequestMethod};
pub use launcher::{Launcher, SceneConfig};
pub use light::Light;
pub use payload::LightState;
pub use policy::{PolicyVerdict, StandingPolicy};
pub use reachable::ReachableLights;
pub use scene::{
    Breath, Deadline, Pendulum, Property, Scene, SceneContext, SceneCore, SceneKind, SceneState,
    SceneVariant, Sequence,
};
pub use status::LightStatus;
pub use types::{
    Brightness, Hue, LightId, Parameter, Range, Saturation, Seconds, TransitionTime, parse_list,
};
