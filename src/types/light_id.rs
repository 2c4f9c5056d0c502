//! Bridge-assigned light identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Parameter, Result, coerce_int};
use crate::errors::Error;

/// Identifier of a light, assigned by the bridge and starting with 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightId(u32);

impl LightId {
    /// Returns None for 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use lively_lights::LightId;
    ///
    /// assert!(LightId::create(0).is_none());
    /// assert_eq!(LightId::create(3).unwrap().value(), 3);
    /// ```
    pub fn create(value: u32) -> Option<Self> {
        if value >= 1 { Some(LightId(value)) } else { None }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LightId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Self::NAME, &Value::String(s.to_string()))
    }
}

impl Parameter for LightId {
    const NAME: &'static str = "light_id";
    const RANGE: &'static str = "an integer greater or equal to 1";

    fn parse(field: &str, value: &Value) -> Result<Self> {
        let int = coerce_int(field, Self::RANGE, value)?;
        u32::try_from(int)
            .ok()
            .and_then(LightId::create)
            .ok_or_else(|| Error::invalid_parameter(field, Self::RANGE, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse() {
        assert_eq!(LightId::validate(&json!(1)).unwrap().value(), 1);
        assert_eq!(LightId::validate(&json!("1")).unwrap().value(), 1);
        assert_eq!(LightId::validate(&json!(2.9)).unwrap().value(), 2);
        assert!(LightId::validate(&json!(0)).is_err());
        assert!(LightId::validate(&json!("lol")).is_err());
        assert_eq!("7".parse::<LightId>().unwrap().value(), 7);
    }
}
