//! Bridge-side fade duration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Parameter, Result, Seconds, coerce_float};
use crate::errors::Error;

/// Fade duration of a state change in deciseconds, the wire unit of the bridge.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransitionTime(u16);

impl TransitionTime {
    const RANGE_TICKS: &'static str = "a number of seconds between 0 and 6553.5";

    /// Convert seconds to the nearest tick.
    ///
    /// # Examples
    ///
    /// ```
    /// use lively_lights::TransitionTime;
    ///
    /// assert_eq!(TransitionTime::from_seconds(2.3).unwrap().ticks(), 23);
    /// assert_eq!(TransitionTime::from_seconds(6553.5).unwrap().ticks(), 65535);
    /// assert!(TransitionTime::from_seconds(6553.6).is_err());
    /// assert!(TransitionTime::from_seconds(-1.0).is_err());
    /// ```
    pub fn from_seconds(seconds: f64) -> Result<Self> {
        let ticks = (seconds * 10.0).round();
        if ticks.is_finite() && (0.0..=f64::from(u16::MAX)).contains(&ticks) {
            Ok(TransitionTime(ticks as u16))
        } else {
            Err(Error::invalid_parameter(
                Self::NAME,
                Self::RANGE_TICKS,
                seconds,
            ))
        }
    }

    pub fn ticks(&self) -> u16 {
        self.0
    }
}

impl TryFrom<Seconds> for TransitionTime {
    type Error = Error;

    fn try_from(seconds: Seconds) -> Result<Self> {
        Self::from_seconds(seconds.value())
    }
}

impl Parameter for TransitionTime {
    const NAME: &'static str = "transition_time";
    const RANGE: &'static str = Self::RANGE_TICKS;

    fn parse(field: &str, value: &Value) -> Result<Self> {
        let seconds = coerce_float(field, Self::RANGE, value)?;
        Self::from_seconds(seconds).map_err(|_| Error::invalid_parameter(field, Self::RANGE, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversion() {
        assert_eq!(TransitionTime::validate(&json!(0)).unwrap().ticks(), 0);
        assert_eq!(TransitionTime::validate(&json!(10)).unwrap().ticks(), 100);
        assert_eq!(TransitionTime::validate(&json!(2.9)).unwrap().ticks(), 29);
        assert_eq!(
            TransitionTime::validate(&json!("6553.5")).unwrap().ticks(),
            65535
        );
    }

    #[test]
    fn test_out_of_range() {
        assert!(TransitionTime::validate(&json!(6553.6)).is_err());
        assert!(TransitionTime::validate(&json!(-1)).is_err());
        assert!(TransitionTime::validate(&json!("lol")).is_err());
    }
}
