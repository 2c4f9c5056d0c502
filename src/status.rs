//! Light status as reported by the bridge.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, Hue, Saturation};

/// The `state` block of a light description returned by the bridge.
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct LightStatus {
    #[serde(default)]
    on: bool,
    #[serde(rename = "bri")]
    brightness: Option<u8>,
    hue: Option<u16>,
    #[serde(rename = "sat")]
    saturation: Option<u8>,
    #[serde(default)]
    reachable: bool,
}

impl LightStatus {
    pub(crate) fn with_reachable(reachable: bool) -> Self {
        LightStatus {
            reachable,
            ..Self::default()
        }
    }

    /// Check if the light is switched on.
    pub fn on(&self) -> bool {
        self.on
    }

    /// Check if the light currently responds to the bridge.
    pub fn reachable(&self) -> bool {
        self.reachable
    }

    pub fn brightness(&self) -> Option<Brightness> {
        self.brightness.and_then(Brightness::create)
    }

    pub fn hue(&self) -> Option<Hue> {
        self.hue.map(Hue::new)
    }

    pub fn saturation(&self) -> Option<Saturation> {
        self.saturation.and_then(Saturation::create)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_bridge_state() {
        let status: LightStatus = serde_json::from_value(json!({
            "on": true,
            "bri": 190,
            "hue": 31927,
            "sat": 254,
            "effect": "none",
            "xy": [0.4116, 0.5161],
            "ct": 293,
            "alert": "none",
            "colormode": "hs",
            "reachable": true
        }))
        .unwrap();

        assert!(status.on());
        assert!(status.reachable());
        assert_eq!(status.brightness().unwrap().value(), 190);
        assert_eq!(status.hue().unwrap().value(), 31927);
        assert_eq!(status.saturation().unwrap().value(), 254);
    }

    #[test]
    fn test_missing_fields() {
        let status: LightStatus = serde_json::from_value(json!({"on": false})).unwrap();
        assert!(!status.reachable());
        assert!(status.hue().is_none());
    }
}
