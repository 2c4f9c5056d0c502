//! Value types for light control parameters.
//!
//! Every physical parameter a scene can be configured with has its own type
//! that can only hold a value inside the legal range of the bridge API.
//! Loosely typed input (numbers, numeric strings, as found in scene config
//! files and on the command line) is coerced through [`Parameter::parse`],
//! which truncates floats where the target is an integer quantity.

mod brightness;
mod hue;
mod light_id;
mod range;
mod saturation;
mod seconds;
mod transition_time;

pub use brightness::Brightness;
pub use hue::Hue;
pub use light_id::LightId;
pub use range::{Range, parse_list};
pub use saturation::Saturation;
pub use seconds::Seconds;
pub use transition_time::TransitionTime;

use serde_json::Value;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// A validated physical parameter.
pub trait Parameter: Sized + Copy + PartialOrd + std::fmt::Debug {
    /// Field name used in error messages when no better one is known.
    const NAME: &'static str;

    /// Human readable legal range, used in error messages.
    const RANGE: &'static str;

    /// Coerce and validate a loosely typed value for the named field.
    fn parse(field: &str, value: &Value) -> Result<Self>;

    /// Coerce and validate a loosely typed value under [`Parameter::NAME`].
    fn validate(value: &Value) -> Result<Self> {
        Self::parse(Self::NAME, value)
    }
}

/// Integer coercion: integers pass, floats are truncated, numeric strings are parsed.
pub(crate) fn coerce_int(field: &str, range: &str, value: &Value) -> Result<i64> {
    let coerced = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };
    coerced.ok_or_else(|| Error::invalid_parameter(field, range, value))
}

/// Float coercion: numbers pass, numeric strings are parsed.
pub(crate) fn coerce_float(field: &str, range: &str, value: &Value) -> Result<f64> {
    let coerced = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    coerced
        .filter(|f| f.is_finite())
        .ok_or_else(|| Error::invalid_parameter(field, range, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_int_truncates() {
        assert_eq!(coerce_int("x", "", &json!(2.9)).unwrap(), 2);
        assert_eq!(coerce_int("x", "", &json!(-2.9)).unwrap(), -2);
        assert_eq!(coerce_int("x", "", &json!("17")).unwrap(), 17);
        assert_eq!(coerce_int("x", "", &json!("2.3")).unwrap(), 2);
    }

    #[test]
    fn test_coerce_rejects_non_numeric() {
        assert!(coerce_int("x", "", &json!("lol")).is_err());
        assert!(coerce_int("x", "", &json!(null)).is_err());
        assert!(coerce_float("x", "", &json!([1])).is_err());
        assert!(coerce_float("x", "", &json!(true)).is_err());
    }
}
