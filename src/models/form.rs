//! Raw workout form input and its validation.
//!
//! Form values arrive untrusted, either as text or as numbers. Text is
//! coerced the way a browser's unary `+` would: blank means zero, anything
//! unparseable becomes NaN and fails the finiteness check. Values that are
//! neither text nor numbers also become NaN.

use crate::error::{AppError, Result};
use crate::models::workout::{WorkoutFields, WorkoutKind};
use serde::Deserialize;

/// Message shown to the user when validation fails.
pub const INVALID_INPUT_MESSAGE: &str = "Inputs have to be positive numbers!";

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
    /// Any other JSON value (null, boolean, array, object)
    Other(serde_json::Value),
}

impl Default for FormValue {
    fn default() -> Self {
        FormValue::Text(String::new())
    }
}

impl FormValue {
    pub fn to_number(&self) -> f64 {
        match self {
            FormValue::Number(n) => *n,
            FormValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse().unwrap_or(f64::NAN)
                }
            }
            FormValue::Other(_) => f64::NAN,
        }
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

/// Submitted workout form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormInput {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub distance: FormValue,
    #[serde(default)]
    pub duration: FormValue,
    #[serde(default)]
    pub cadence: FormValue,
    #[serde(default)]
    pub elevation: FormValue,
}

impl FormInput {
    pub fn running(
        distance: impl Into<FormValue>,
        duration: impl Into<FormValue>,
        cadence: impl Into<FormValue>,
    ) -> Self {
        Self {
            kind: WorkoutKind::Running.as_str().to_string(),
            distance: distance.into(),
            duration: duration.into(),
            cadence: cadence.into(),
            elevation: FormValue::default(),
        }
    }

    pub fn cycling(
        distance: impl Into<FormValue>,
        duration: impl Into<FormValue>,
        elevation: impl Into<FormValue>,
    ) -> Self {
        Self {
            kind: WorkoutKind::Cycling.as_str().to_string(),
            distance: distance.into(),
            duration: duration.into(),
            cadence: FormValue::default(),
            elevation: elevation.into(),
        }
    }

    /// Validate into workout fields.
    ///
    /// Running requires distance, duration and cadence to be finite and
    /// strictly positive. Cycling requires all three finite but only
    /// distance and duration positive: zero or negative elevation is allowed.
    pub fn validate(&self) -> Result<WorkoutFields> {
        let kind: WorkoutKind = self
            .kind
            .parse()
            .map_err(|e: crate::models::workout::UnknownKind| {
                AppError::InvalidInput(e.to_string())
            })?;

        let distance = self.distance.to_number();
        let duration = self.duration.to_number();

        match kind {
            WorkoutKind::Running => {
                let cadence = self.cadence.to_number();
                check(&[distance, duration, cadence], &[distance, duration, cadence])?;
                Ok(WorkoutFields::running(distance, duration, cadence))
            }
            WorkoutKind::Cycling => {
                let elevation = self.elevation.to_number();
                check(&[distance, duration, elevation], &[distance, duration])?;
                Ok(WorkoutFields::cycling(distance, duration, elevation))
            }
        }
    }
}

fn check(finite: &[f64], positive: &[f64]) -> Result<()> {
    if finite.iter().all(|v| v.is_finite()) && positive.iter().all(|v| *v > 0.0) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(INVALID_INPUT_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workout::KindMetric;

    #[test]
    fn test_valid_running_text_fields() {
        let fields = FormInput::running("5.2", " 24 ", "178").validate().unwrap();
        assert_eq!(fields, WorkoutFields::running(5.2, 24.0, 178.0));
    }

    #[test]
    fn test_running_rejects_zero_cadence() {
        let err = FormInput::running(5.0, 20.0, 0.0).validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_field_is_zero_and_rejected() {
        assert!(FormInput::running("", "20", "170").validate().is_err());
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert!(FormInput::running("abc", "20", "170").validate().is_err());
        assert!(FormInput::running("inf", "20", "170").validate().is_err());
        assert!(FormInput::cycling("10", "NaN", "0").validate().is_err());
    }

    #[test]
    fn test_cycling_allows_zero_and_negative_elevation() {
        let flat = FormInput::cycling(10.0, 30.0, 0.0).validate().unwrap();
        assert_eq!(flat.metric, KindMetric::ElevationGain(0.0));

        let downhill = FormInput::cycling(10.0, 30.0, -40.0).validate().unwrap();
        assert_eq!(downhill.metric, KindMetric::ElevationGain(-40.0));
    }

    #[test]
    fn test_cycling_requires_finite_elevation() {
        assert!(FormInput::cycling("10", "30", "lots").validate().is_err());
    }

    #[test]
    fn test_cycling_ignores_cadence_field() {
        let mut input = FormInput::cycling(10.0, 30.0, 100.0);
        input.cadence = FormValue::from("garbage");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let input = FormInput {
            kind: "rowing".to_string(),
            ..FormInput::running(1.0, 1.0, 1.0)
        };
        assert!(matches!(
            input.validate().unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_deserialize_mixed_values() {
        let input: FormInput = serde_json::from_str(
            r#"{"type":"running","distance":"5","duration":25,"cadence":"180"}"#,
        )
        .unwrap();
        assert_eq!(input.elevation, FormValue::default());
        assert_eq!(
            input.validate().unwrap(),
            WorkoutFields::running(5.0, 25.0, 180.0)
        );
    }

    #[test]
    fn test_null_and_boolean_values_are_rejected_by_validation() {
        let input: FormInput = serde_json::from_str(
            r#"{"type":"running","distance":null,"duration":true,"cadence":"180"}"#,
        )
        .unwrap();
        assert!(matches!(input.distance, FormValue::Other(_)));
        assert!(matches!(
            input.validate().unwrap_err(),
            AppError::InvalidInput(msg) if msg == INVALID_INPUT_MESSAGE
        ));

        let ride: FormInput = serde_json::from_str(
            r#"{"type":"cycling","distance":12,"duration":40,"elevation":[1]}"#,
        )
        .unwrap();
        assert!(ride.validate().is_err());
    }
}
