//! Hue of a light.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Parameter, Result, coerce_int};
use crate::errors::Error;

/// Hue of a light, a wrapping position on the color wheel from 0 to 65535.
///
/// Both 0 and 65535 are red, 25500 is green and 46920 is blue.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Hue {
    pub(crate) value: u16,
}

impl Hue {
    pub const MIN: u16 = 0;
    pub const MAX: u16 = 65535;

    /// Every `u16` is a legal hue.
    pub fn new(value: u16) -> Self {
        Hue { value }
    }

    pub fn value(&self) -> u16 {
        self.value
    }
}

impl From<u16> for Hue {
    fn from(value: u16) -> Self {
        Hue::new(value)
    }
}

impl Parameter for Hue {
    const NAME: &'static str = "hue";
    const RANGE: &'static str = "an integer between 0 and 65535";

    /// # Examples
    ///
    /// ```
    /// use lively_lights::{Hue, Parameter};
    /// use serde_json::json;
    ///
    /// assert_eq!(Hue::validate(&json!(65535)).unwrap().value(), 65535);
    /// assert!(Hue::validate(&json!(65536)).is_err());
    /// assert!(Hue::validate(&json!(-1)).is_err());
    /// ```
    fn parse(field: &str, value: &Value) -> Result<Self> {
        let int = coerce_int(field, Self::RANGE, value)?;
        u16::try_from(int)
            .map(Hue::new)
            .map_err(|_| Error::invalid_parameter(field, Self::RANGE, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid() {
        assert_eq!(Hue::validate(&json!(0)).unwrap().value(), 0);
        assert_eq!(Hue::validate(&json!("0")).unwrap().value(), 0);
        assert_eq!(Hue::validate(&json!("65535")).unwrap().value(), 65535);
        assert_eq!(Hue::validate(&json!(2.9)).unwrap().value(), 2);
    }

    #[test]
    fn test_invalid() {
        assert!(Hue::validate(&json!(-1)).is_err());
        assert!(Hue::validate(&json!(65536)).is_err());
        assert!(Hue::validate(&json!("lol")).is_err());
    }
}
