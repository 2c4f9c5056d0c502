//! State payload for Hue lights.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, Hue, Saturation, TransitionTime};

/// A state object to send to a light.
///
/// States can contain multiple attributes that will be applied to the light in
/// a single request. Only the attributes that are set are serialized.
///
/// ```
/// use lively_lights::{Brightness, Hue, LightState, TransitionTime};
///
/// let mut state = LightState::new();
/// state
///     .hue(&Hue::new(46920))
///     .brightness(&Brightness::create(100).unwrap())
///     .transition_time(&TransitionTime::from_seconds(2.0).unwrap());
/// assert_eq!(
///     serde_json::to_value(&state).unwrap(),
///     serde_json::json!({"hue": 46920, "bri": 100, "transitiontime": 20})
/// );
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LightState {
    pub(crate) on: Option<bool>,
    #[serde(rename = "bri")]
    pub(crate) brightness: Option<u8>,
    pub(crate) hue: Option<u16>,
    #[serde(rename = "sat")]
    pub(crate) saturation: Option<u8>,
    #[serde(rename = "transitiontime")]
    pub(crate) transition_time: Option<u16>,
}

impl LightState {
    /// Create a new empty state.
    ///
    /// At least one attribute must be set for the state to be valid.
    ///
    /// ```
    /// use lively_lights::LightState;
    ///
    /// assert_eq!(LightState::new().is_valid(), false);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// The state sent to switch a light off.
    pub fn off() -> Self {
        LightState {
            on: Some(false),
            ..Self::default()
        }
    }

    /// Check if this state contains at least one attribute.
    ///
    /// A transition time alone is not valid; it must come with a change.
    pub fn is_valid(&self) -> bool {
        self.on.is_some()
            || self.brightness.is_some()
            || self.hue.is_some()
            || self.saturation.is_some()
    }

    pub fn on(&mut self, on: bool) -> &mut Self {
        self.on = Some(on);
        self
    }

    pub fn brightness(&mut self, brightness: &Brightness) -> &mut Self {
        self.brightness = Some(brightness.value);
        self
    }

    pub fn hue(&mut self, hue: &Hue) -> &mut Self {
        self.hue = Some(hue.value);
        self
    }

    pub fn saturation(&mut self, saturation: &Saturation) -> &mut Self {
        self.saturation = Some(saturation.value);
        self
    }

    pub fn transition_time(&mut self, transition_time: &TransitionTime) -> &mut Self {
        self.transition_time = Some(transition_time.ticks());
        self
    }

    pub fn get_on(&self) -> Option<bool> {
        self.on
    }

    pub fn get_brightness(&self) -> Option<u8> {
        self.brightness
    }

    pub fn get_hue(&self) -> Option<u16> {
        self.hue
    }

    pub fn get_saturation(&self) -> Option<u8> {
        self.saturation
    }

    pub fn get_transition_time(&self) -> Option<u16> {
        self.transition_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_off() {
        let state = LightState::off();
        assert!(state.is_valid());
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({"on": false}));
    }

    #[test]
    fn test_transition_time_alone_is_invalid() {
        let mut state = LightState::new();
        state.transition_time(&TransitionTime::from_seconds(1.0).unwrap());
        assert!(!state.is_valid());
        state.saturation(&Saturation::new());
        assert!(state.is_valid());
    }
}
