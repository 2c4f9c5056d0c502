//! Two groups of lights swinging between two colors.

use log::info;
use serde_json::Value;

use super::{Deadline, Property, Result, Scene, SceneContext, SceneCore, SceneVariant, fit_to_duration};
use crate::errors::Error;
use crate::payload::LightState;
use crate::random;
use crate::types::{
    Brightness, Hue, LightId, Parameter, Saturation, Seconds, TransitionTime, parse_list,
};

pub struct Pendulum {
    core: SceneCore,
    color1: Option<Hue>,
    color2: Option<Hue>,
    lights1: Option<Vec<LightId>>,
    lights2: Option<Vec<LightId>>,
    sleep_time: Option<Seconds>,
    transition_time: Option<Seconds>,
}

fn set_color1(scene: &mut Pendulum, value: &Value) -> Result<()> {
    scene.color1 = Some(Hue::parse("color1", value)?);
    Ok(())
}

fn set_color2(scene: &mut Pendulum, value: &Value) -> Result<()> {
    scene.color2 = Some(Hue::parse("color2", value)?);
    Ok(())
}

fn set_lights1(scene: &mut Pendulum, value: &Value) -> Result<()> {
    scene.lights1 = Some(parse_list("lights1", value)?);
    Ok(())
}

fn set_lights2(scene: &mut Pendulum, value: &Value) -> Result<()> {
    scene.lights2 = Some(parse_list("lights2", value)?);
    Ok(())
}

fn set_sleep_time(scene: &mut Pendulum, value: &Value) -> Result<()> {
    scene.sleep_time = Some(Seconds::parse("sleep_time", value)?);
    Ok(())
}

fn set_transition_time(scene: &mut Pendulum, value: &Value) -> Result<()> {
    scene.transition_time = Some(Seconds::parse("transition_time", value)?);
    Ok(())
}

const PROPERTIES: &[Property<Pendulum>] = &[
    ("color1", set_color1),
    ("color2", set_color2),
    ("lights1", set_lights1),
    ("lights2", set_lights2),
    ("sleep_time", set_sleep_time),
    ("transition_time", set_transition_time),
];

struct Swing {
    color1: Hue,
    color2: Hue,
    sleep_time: Seconds,
    transition_time: Seconds,
}

impl Pendulum {
    pub fn new(context: SceneContext) -> Self {
        Pendulum {
            core: SceneCore::new(context),
            color1: None,
            color2: None,
            lights1: None,
            lights2: None,
            sleep_time: None,
            transition_time: None,
        }
    }

    fn swing(&self) -> Result<Swing> {
        let unset = |name: &str| Error::Configuration(format!("{name} is not set"));
        Ok(Swing {
            color1: self.color1.ok_or_else(|| unset("color1"))?,
            color2: self.color2.ok_or_else(|| unset("color2"))?,
            sleep_time: self.sleep_time.ok_or_else(|| unset("sleep_time"))?,
            transition_time: self.transition_time.ok_or_else(|| unset("transition_time"))?,
        })
    }

    /// Missing groups are made up from the lights reachable now: both
    /// missing splits them randomly, one missing takes those not in the other.
    async fn groups(&self) -> (Vec<LightId>, Vec<LightId>) {
        let rest = |reachable: Vec<LightId>, taken: &[LightId]| -> Vec<LightId> {
            reachable.into_iter().filter(|id| !taken.contains(id)).collect()
        };
        match (&self.lights1, &self.lights2) {
            (Some(lights1), Some(lights2)) => (lights1.clone(), lights2.clone()),
            (Some(lights1), None) => {
                let reachable = self.core.context().reachable_ids().await;
                (lights1.clone(), rest(reachable, lights1.as_slice()))
            }
            (None, Some(lights2)) => {
                let reachable = self.core.context().reachable_ids().await;
                (rest(reachable, lights2.as_slice()), lights2.clone())
            }
            (None, None) => random::split_lights(&self.core.context().reachable_ids().await),
        }
    }
}

impl Scene for Pendulum {
    const VARIANT: SceneVariant = SceneVariant::Pendulum;

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
        self.color1.get_or_insert_with(random::hue);
        self.color2.get_or_insert_with(random::hue);
        self.sleep_time.get_or_insert_with(|| random::seconds(4.0, 8.0));
        self.transition_time.get_or_insert_with(|| random::seconds(1.0, 3.0));
    }

    fn check(&self) -> Result<()> {
        let swing = self.swing()?;
        if swing.transition_time >= swing.sleep_time {
            return Err(Error::Configuration(format!(
                "transition_time ({}) must be shorter than sleep_time ({})",
                swing.transition_time, swing.sleep_time
            )));
        }
        for (name, group) in [("lights1", &self.lights1), ("lights2", &self.lights2)] {
            if group.as_ref().is_some_and(Vec::is_empty) {
                return Err(Error::Configuration(format!("{name} is empty")));
            }
        }
        TransitionTime::try_from(swing.transition_time)?;
        Ok(())
    }

    /// Each half swing sends one color to each group, then waits unless the
    /// wait would reach the end of the duration.
    async fn run(&mut self, deadline: &Deadline) -> Result<()> {
        let swing = self.swing()?;
        let (sleep_time, transition_time) =
            fit_to_duration(swing.sleep_time, swing.transition_time, deadline.duration());
        if sleep_time != swing.sleep_time {
            info!("shrinking sleep_time to {sleep_time} and transition_time to {transition_time}");
        }
        let transition_time = TransitionTime::try_from(transition_time)?;
        let (lights1, lights2) = self.groups().await;
        let context = self.core.context();

        let brightness = Brightness::new();
        let saturation = Saturation::new();
        let mut colors = (swing.color1, swing.color2);
        loop {
            let reachable = context.reachable_ids().await;
            for (group, color) in [(&lights1, colors.0), (&lights2, colors.1)] {
                let mut state = LightState::new();
                state
                    .hue(&color)
                    .brightness(&brightness)
                    .saturation(&saturation)
                    .transition_time(&transition_time);
                for light_id in group.iter().filter(|light_id| reachable.contains(*light_id)) {
                    context.send(*light_id, &state).await;
                }
            }
            colors = (colors.1, colors.0);

            if deadline.would_overrun(sleep_time.as_duration())
                || !deadline.sleep(sleep_time.as_duration()).await
            {
                break;
            }
        }
        Ok(())
    }
}
