//! Paired range and list validators.

use serde::Serialize;
use serde_json::Value;

use super::{Parameter, Result};
use crate::errors::Error;

/// An ordered pair of parameters with `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range<T> {
    min: T,
    max: T,
}

impl<T: Parameter> Range<T> {
    const RANGE: &'static str = "a list of exactly 2 values with min < max";

    /// # Examples
    ///
    /// ```
    /// use lively_lights::{Hue, Range};
    ///
    /// assert!(Range::new(Hue::new(1), Hue::new(2)).is_ok());
    /// assert!(Range::new(Hue::new(2), Hue::new(2)).is_err());
    /// ```
    pub fn new(min: T, max: T) -> Result<Self> {
        if min < max {
            Ok(Range { min, max })
        } else {
            Err(Error::invalid_parameter(
                T::NAME,
                Self::RANGE,
                format!("({min:?}, {max:?})"),
            ))
        }
    }

    /// For bounds already known to be ordered.
    pub(crate) fn from_ordered(min: T, max: T) -> Self {
        debug_assert!(min < max);
        Range { min, max }
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    /// Validate both ends of a 2-element list and their order.
    pub fn parse(field: &str, value: &Value) -> Result<Self> {
        let invalid = || Error::invalid_parameter(field, Self::RANGE, value);
        let [min, max] = value.as_array().map(Vec::as_slice).ok_or_else(invalid)? else {
            return Err(invalid());
        };
        let min = T::parse(field, min)?;
        let max = T::parse(field, max)?;
        if min < max {
            Ok(Range { min, max })
        } else {
            Err(invalid())
        }
    }
}

/// Validate every entry of a list, preserving order. An empty list is valid.
pub fn parse_list<T: Parameter>(field: &str, value: &Value) -> Result<Vec<T>> {
    value
        .as_array()
        .ok_or_else(|| Error::invalid_parameter(field, "a list of values", value))?
        .iter()
        .map(|entry| T::parse(field, entry))
        .collect()
}
