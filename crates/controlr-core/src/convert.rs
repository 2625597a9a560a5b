// ── Property value conversion ──
//
// Device properties are loosely typed: booleans arrive as `true`, `1`,
// or `"1"` depending on firmware, temperatures as integers or floats.
// Everything here is pure so the adapter stays a thin sequence of reads.

use serde_json::Value;

use crate::error::CoreError;

/// Convert a Fahrenheit reading to whole degrees Celsius.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i32 {
    round_half_up((fahrenheit - 32.0) * 5.0 / 9.0)
}

/// Convert whole degrees Celsius to whole degrees Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: i32) -> i32 {
    round_half_up(f64::from(celsius) * 9.0 / 5.0 + 32.0)
}

/// Round to the nearest integer, halves toward positive infinity
/// (-0.5 becomes 0, 2.5 becomes 3).
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

/// Interpret a property value as a boolean.
///
/// `null` reads as false (properties that were never reported).
pub fn value_as_bool(property: &str, value: &Value) -> Result<bool, CoreError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => n
            .as_f64()
            .map(|f| f != 0.0)
            .ok_or_else(|| unexpected(property, value, "a boolean")),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" => Ok(true),
            "false" | "off" | "" => Ok(false),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f != 0.0)
                .ok_or_else(|| unexpected(property, value, "a boolean")),
        },
        Value::Array(_) | Value::Object(_) => Err(unexpected(property, value, "a boolean")),
    }
}

/// Interpret a property value as a number.
pub fn value_as_f64(property: &str, value: &Value) -> Result<f64, CoreError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| unexpected(property, value, "a number")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| unexpected(property, value, "a number")),
        _ => Err(unexpected(property, value, "a number")),
    }
}

fn unexpected(property: &str, value: &Value, expected: &'static str) -> CoreError {
    CoreError::UnexpectedValue {
        property: property.to_owned(),
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn known_temperatures() {
        assert_eq!(celsius_to_fahrenheit(35), 95);
        assert_eq!(celsius_to_fahrenheit(85), 185);
        assert_eq!(celsius_to_fahrenheit(49), 120);
        assert_eq!(fahrenheit_to_celsius(120.0), 49);
        assert_eq!(fahrenheit_to_celsius(95.0), 35);
        assert_eq!(fahrenheit_to_celsius(140.0), 60);
    }

    #[test]
    fn celsius_round_trip_within_one_degree() {
        for c in 0..=100 {
            let back = fahrenheit_to_celsius(f64::from(celsius_to_fahrenheit(c)));
            assert!((back - c).abs() <= 1, "{c}°C came back as {back}°C");
            // Multiples of 5 land on whole Fahrenheit degrees.
            if c % 5 == 0 {
                assert_eq!(back, c);
            }
        }
    }

    #[test]
    fn loose_booleans() {
        assert!(value_as_bool("p", &json!(true)).unwrap());
        assert!(value_as_bool("p", &json!(1)).unwrap());
        assert!(value_as_bool("p", &json!("1")).unwrap());
        assert!(value_as_bool("p", &json!("true")).unwrap());
        assert!(!value_as_bool("p", &json!(0)).unwrap());
        assert!(!value_as_bool("p", &json!("0")).unwrap());
        assert!(!value_as_bool("p", &json!(null)).unwrap());
        assert!(!value_as_bool("p", &json!(false)).unwrap());
    }

    #[test]
    fn structured_values_are_rejected() {
        let err = value_as_bool("set_recirculation_enabled", &json!({ "on": 1 })).unwrap_err();
        match err {
            CoreError::UnexpectedValue { property, .. } => {
                assert_eq!(property, "set_recirculation_enabled");
            }
            other => panic!("expected UnexpectedValue, got: {other:?}"),
        }
        assert!(value_as_bool("p", &json!("maybe")).is_err());
        assert!(value_as_f64("p", &json!(null)).is_err());
        assert!(value_as_f64("p", &json!([1])).is_err());
    }

    #[test]
    fn loose_numbers() {
        assert!((value_as_f64("p", &json!(120)).unwrap() - 120.0).abs() < f64::EPSILON);
        assert!((value_as_f64("p", &json!(98.6)).unwrap() - 98.6).abs() < f64::EPSILON);
        assert!((value_as_f64("p", &json!(" 125 ")).unwrap() - 125.0).abs() < f64::EPSILON);
    }

    #[test]
    fn halves_round_toward_positive_infinity() {
        // 27.5 °F is exactly -2.5 °C.
        assert_eq!(fahrenheit_to_celsius(27.5), -2);
        // 36.5 °F is 2.5 °C.
        assert_eq!(fahrenheit_to_celsius(36.5), 3);
        assert_eq!(fahrenheit_to_celsius(-40.0), -40);
    }

    #[test]
    fn non_finite_strings_are_rejected() {
        for raw in ["NaN", "inf", "-infinity"] {
            assert!(value_as_f64("p", &json!(raw)).is_err(), "{raw} read as a number");
            assert!(value_as_bool("p", &json!(raw)).is_err(), "{raw} read as a boolean");
        }
    }
}
