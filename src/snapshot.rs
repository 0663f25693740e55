//! Sensor snapshot as served by the backend's `/data` endpoint.
//!
//! A snapshot is decoded in one step: either all three fields are present
//! with the expected types or the whole payload is rejected.

use crate::error::FetchError;
use crate::surface::Target;
use serde::Deserialize;
use std::fmt;

/// Fan speed as reported by the backend, either a duty value or a label
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FanSpeed {
    Level(f64),
    Label(String),
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanSpeed::Level(level) => write!(f, "{}", unsigned_zero(*level)),
            FanSpeed::Label(label) => f.write_str(label),
        }
    }
}

/// `-0.0` prints as "-0"; show it as plain zero
fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// One reading of the three sensor values
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorSnapshot {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub fan_speed: FanSpeed,
}

impl SensorSnapshot {
    /// Decode a response body into a snapshot
    pub fn decode(body: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))
    }

    /// Display texts for every target, units appended
    pub fn texts(&self) -> [(Target, String); 3] {
        [
            (Target::Temperature, format!("{}°C", unsigned_zero(self.temperature))),
            (Target::Humidity, format!("{}%", unsigned_zero(self.humidity))),
            (Target::FanSpeed, self.fan_speed.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_fan_label() {
        let snapshot =
            SensorSnapshot::decode(br#"{"temperature":21.5,"humidity":40,"fan_speed":"low"}"#)
                .unwrap();
        assert_eq!(snapshot.temperature, 21.5);
        assert_eq!(snapshot.humidity, 40.0);
        assert_eq!(snapshot.fan_speed, FanSpeed::Label("low".to_string()));
    }

    #[test]
    fn test_texts_append_units() {
        let snapshot = SensorSnapshot {
            temperature: 21.5,
            humidity: 40.0,
            fan_speed: FanSpeed::Level(512.0),
        };
        let texts = snapshot.texts();
        assert_eq!(texts[0], (Target::Temperature, "21.5°C".to_string()));
        assert_eq!(texts[1], (Target::Humidity, "40%".to_string()));
        assert_eq!(texts[2], (Target::FanSpeed, "512".to_string()));
    }

    #[test]
    fn test_negative_and_fractional_values() {
        let snapshot =
            SensorSnapshot::decode(br#"{"temperature":-3.25,"humidity":99.9,"fan_speed":0.5}"#)
                .unwrap();
        let texts = snapshot.texts();
        assert_eq!(texts[0].1, "-3.25°C");
        assert_eq!(texts[1].1, "99.9%");
        assert_eq!(texts[2].1, "0.5");

        let snapshot =
            SensorSnapshot::decode(br#"{"temperature":-0.0,"humidity":-0.0,"fan_speed":-0.0}"#)
                .unwrap();
        let texts = snapshot.texts();
        assert_eq!(texts[0].1, "0°C");
        assert_eq!(texts[1].1, "0%");
        assert_eq!(texts[2].1, "0");
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = SensorSnapshot::decode(br#"{"temperature":21.5,"humidity":40}"#).unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err =
            SensorSnapshot::decode(br#"{"temperature":"warm","humidity":40,"fan_speed":1}"#)
                .unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = SensorSnapshot::decode(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }
}
