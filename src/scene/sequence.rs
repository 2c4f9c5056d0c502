//! All lights stepping through a list of colors together.

use log::info;
use serde_json::Value;

use super::{Deadline, Property, Result, Scene, SceneContext, SceneCore, SceneVariant, fit_to_duration};
use crate::errors::Error;
use crate::payload::LightState;
use crate::random;
use crate::types::{Brightness, Hue, Parameter, Saturation, Seconds, TransitionTime, parse_list};

/// Number of random hues used when no sequence is configured.
const DEFAULT_SEQUENCE_LEN: usize = 4;

pub struct Sequence {
    core: SceneCore,
    brightness: Option<Brightness>,
    hue_sequence: Option<Vec<Hue>>,
    sleep_time: Option<Seconds>,
    transition_time: Option<Seconds>,
}

fn set_brightness(scene: &mut Sequence, value: &Value) -> Result<()> {
    scene.brightness = Some(Brightness::parse("brightness", value)?);
    Ok(())
}

fn set_hue_sequence(scene: &mut Sequence, value: &Value) -> Result<()> {
    scene.hue_sequence = Some(parse_list("hue_sequence", value)?);
    Ok(())
}

fn set_sleep_time(scene: &mut Sequence, value: &Value) -> Result<()> {
    scene.sleep_time = Some(Seconds::parse("sleep_time", value)?);
    Ok(())
}

fn set_transition_time(scene: &mut Sequence, value: &Value) -> Result<()> {
    scene.transition_time = Some(Seconds::parse("transition_time", value)?);
    Ok(())
}

const PROPERTIES: &[Property<Sequence>] = &[
    ("brightness", set_brightness),
    ("hue_sequence", set_hue_sequence),
    ("sleep_time", set_sleep_time),
    ("transition_time", set_transition_time),
];

struct Steps {
    brightness: Brightness,
    hue_sequence: Vec<Hue>,
    sleep_time: Seconds,
    transition_time: Seconds,
}

impl Sequence {
    pub fn new(context: SceneContext) -> Self {
        Sequence {
            core: SceneCore::new(context),
            brightness: None,
            hue_sequence: None,
            sleep_time: None,
            transition_time: None,
        }
    }

    fn steps(&self) -> Result<Steps> {
        let unset = |name: &str| Error::Configuration(format!("{name} is not set"));
        Ok(Steps {
            brightness: self.brightness.ok_or_else(|| unset("brightness"))?,
            hue_sequence: self
                .hue_sequence
                .clone()
                .ok_or_else(|| unset("hue_sequence"))?,
            sleep_time: self.sleep_time.ok_or_else(|| unset("sleep_time"))?,
            transition_time: self.transition_time.ok_or_else(|| unset("transition_time"))?,
        })
    }
}

impl Scene for Sequence {
    const VARIANT: SceneVariant = SceneVariant::Sequence;

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
        self.brightness.get_or_insert_with(|| random::brightness(100, Brightness::MAX));
        self.hue_sequence
            .get_or_insert_with(|| random::hue_sequence(DEFAULT_SEQUENCE_LEN));
        self.sleep_time.get_or_insert_with(|| random::seconds(4.0, 8.0));
        self.transition_time.get_or_insert_with(|| random::seconds(1.0, 3.0));
    }

    fn check(&self) -> Result<()> {
        let steps = self.steps()?;
        if steps.hue_sequence.is_empty() {
            return Err(Error::Configuration("hue_sequence is empty".to_string()));
        }
        if steps.transition_time >= steps.sleep_time {
            return Err(Error::Configuration(format!(
                "transition_time ({}) must be shorter than sleep_time ({})",
                steps.transition_time, steps.sleep_time
            )));
        }
        TransitionTime::try_from(steps.transition_time)?;
        Ok(())
    }

    /// Every hue goes to all reachable lights, followed by one sleep. The
    /// deadline is checked after every single command.
    async fn run(&mut self, deadline: &Deadline) -> Result<()> {
        let steps = self.steps()?;
        let (sleep_time, transition_time) =
            fit_to_duration(steps.sleep_time, steps.transition_time, deadline.duration());
        if sleep_time != steps.sleep_time {
            info!("shrinking sleep_time to {sleep_time} and transition_time to {transition_time}");
        }
        let transition_time = TransitionTime::try_from(transition_time)?;
        let context = self.core.context();
        let saturation = Saturation::new();

        'scene: for hue in steps.hue_sequence.iter().cycle() {
            let mut state = LightState::new();
            state
                .hue(hue)
                .brightness(&steps.brightness)
                .saturation(&saturation)
                .transition_time(&transition_time);

            for light_id in context.reachable_ids().await {
                context.send(light_id, &state).await;
                if deadline.is_over() {
                    break 'scene;
                }
            }

            if deadline.would_overrun(sleep_time.as_duration())
                || !deadline.sleep(sleep_time.as_duration()).await
            {
                break;
            }
        }
        Ok(())
    }
}
