//! Color saturation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Parameter, Result, coerce_int};
use crate::errors::Error;

/// Saturation of the light. 254 is the most saturated (colored) and 0 is
/// the least saturated (white).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Saturation {
    pub(crate) value: u8,
}

impl Default for Saturation {
    fn default() -> Self {
        Self::new()
    }
}

impl Saturation {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 254;

    /// Fully saturated.
    pub fn new() -> Self {
        Saturation { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value exceeds 254.
    pub fn create(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Saturation { value })
        } else {
            None
        }
    }
}

impl Parameter for Saturation {
    const NAME: &'static str = "saturation";
    const RANGE: &'static str = "an integer between 0 and 254";

    fn parse(field: &str, value: &Value) -> Result<Self> {
        let int = coerce_int(field, Self::RANGE, value)?;
        u8::try_from(int)
            .ok()
            .and_then(Saturation::create)
            .ok_or_else(|| Error::invalid_parameter(field, Self::RANGE, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bounds() {
        assert_eq!(Saturation::validate(&json!(0)).unwrap().value(), 0);
        assert_eq!(Saturation::validate(&json!(254)).unwrap().value(), 254);
        assert!(Saturation::validate(&json!(255)).is_err());
        assert!(Saturation::validate(&json!(-1)).is_err());
    }

    #[test]
    fn test_float_is_cut() {
        assert_eq!(Saturation::validate(&json!(2.9)).unwrap().value(), 2);
    }
}
