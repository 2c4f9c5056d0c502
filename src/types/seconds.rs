//! Non-negative time spans.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Parameter, Result, coerce_float};
use crate::errors::Error;

/// A non-negative, finite number of seconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(f64);

impl Seconds {
    /// Returns None for negative or non-finite input.
    ///
    /// # Examples
    ///
    /// ```
    /// use lively_lights::Seconds;
    ///
    /// assert!(Seconds::create(0.0).is_some());
    /// assert!(Seconds::create(2.3).is_some());
    /// assert!(Seconds::create(-1.0).is_none());
    /// assert!(Seconds::create(f64::NAN).is_none());
    /// ```
    pub fn create(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Seconds(value))
        } else {
            None
        }
    }

    pub fn from_duration(duration: Duration) -> Self {
        Seconds(duration.as_secs_f64())
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.0)
    }

    /// Multiply by a non-negative factor.
    pub(crate) fn scale(&self, factor: f64) -> Self {
        Seconds((self.0 * factor).max(0.0))
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s", self.0)
    }
}

impl Parameter for Seconds {
    const NAME: &'static str = "time";
    const RANGE: &'static str = "a number of seconds greater or equal to 0";

    fn parse(field: &str, value: &Value) -> Result<Self> {
        let float = coerce_float(field, Self::RANGE, value)?;
        Seconds::create(float).ok_or_else(|| Error::invalid_parameter(field, Self::RANGE, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse() {
        assert_eq!(Seconds::validate(&json!(0)).unwrap().value(), 0.0);
        assert_eq!(Seconds::validate(&json!("0")).unwrap().value(), 0.0);
        assert_eq!(Seconds::validate(&json!(2.3)).unwrap().value(), 2.3);
        assert!(Seconds::validate(&json!(-1)).is_err());
        assert!(Seconds::validate(&json!("lol")).is_err());
    }

    #[test]
    fn test_duration() {
        let seconds = Seconds::create(1.5).unwrap();
        assert_eq!(seconds.as_duration(), Duration::from_millis(1500));
        assert_eq!(seconds.scale(0.5).value(), 0.75);
    }
}
