//! Brightness control for Hue lights.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Parameter, Result, coerce_int};
use crate::errors::Error;

/// Brightness level from 1 (the minimum the light is capable of) to 254.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new()
    }
}

impl Brightness {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 254;

    /// Full brightness.
    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is outside valid range (1-254).
    ///
    /// # Examples
    ///
    /// ```
    /// use lively_lights::Brightness;
    ///
    /// assert!(Brightness::create(0).is_none());
    /// assert!(Brightness::create(1).is_some());
    /// assert!(Brightness::create(254).is_some());
    /// assert!(Brightness::create(255).is_none());
    /// ```
    pub fn create(value: u8) -> Option<Self> {
        if Self::is_valid(i64::from(value)) {
            Some(Brightness { value })
        } else {
            None
        }
    }

    fn is_valid(value: i64) -> bool {
        (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value)
    }
}

impl Parameter for Brightness {
    const NAME: &'static str = "brightness";
    const RANGE: &'static str = "an integer between 1 and 254";

    fn parse(field: &str, value: &Value) -> Result<Self> {
        let int = coerce_int(field, Self::RANGE, value)?;
        if Self::is_valid(int) {
            Ok(Brightness { value: int as u8 })
        } else {
            Err(Error::invalid_parameter(field, Self::RANGE, value))
        }
    }
}
