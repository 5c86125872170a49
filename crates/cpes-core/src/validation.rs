//! ---
//! cpes_section: "01-domain-model"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Data-level validation rules for sensor readings."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::reading::SensorReading;

/// Minimum chilled-water differential for a physically meaningful reading.
pub const MIN_DELTA_T: f64 = 2.0;

/// Machine-readable reason a reading was rejected by the validation rules.
///
/// Rejection is a data outcome, not an error: invalid readings are retained
/// with their reason code and excluded from derived aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// ΔT at or below [`MIN_DELTA_T`], usually a bypass or sensor fault.
    DeltaTTooLow,
    /// Chilled or condenser water flow reported as zero or negative.
    NonPositiveFlow,
    /// Chiller power reported as zero or negative.
    NonPositivePower,
    /// A derived divisor collapsed to a degenerate value; the field names it.
    DegenerateDivisor(String),
}

impl InvalidReason {
    pub fn code(&self) -> String {
        match self {
            InvalidReason::DeltaTTooLow => "delta_t_too_low".to_owned(),
            InvalidReason::NonPositiveFlow => "non_positive_flow".to_owned(),
            InvalidReason::NonPositivePower => "non_positive_power".to_owned(),
            InvalidReason::DegenerateDivisor(field) => format!("degenerate_divisor:{field}"),
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for InvalidReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delta_t_too_low" => Ok(InvalidReason::DeltaTTooLow),
            "non_positive_flow" => Ok(InvalidReason::NonPositiveFlow),
            "non_positive_power" => Ok(InvalidReason::NonPositivePower),
            other => match other.strip_prefix("degenerate_divisor:") {
                Some(field) if !field.is_empty() => {
                    Ok(InvalidReason::DegenerateDivisor(field.to_owned()))
                }
                _ => Err(format!("unknown invalid-reason code: {other}")),
            },
        }
    }
}

impl Serialize for InvalidReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for InvalidReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(de::Error::custom)
    }
}

/// Apply the validation rules in a fixed order and return the first failure.
pub fn validate_reading(reading: &SensorReading) -> Option<InvalidReason> {
    if reading.chw_flow_rate <= 0.0 {
        return Some(InvalidReason::NonPositiveFlow);
    }
    if matches!(reading.cond_flow_rate, Some(flow) if flow <= 0.0) {
        return Some(InvalidReason::NonPositiveFlow);
    }
    if reading.chiller_power_kw <= 0.0 {
        return Some(InvalidReason::NonPositivePower);
    }
    if reading.delta_t() <= MIN_DELTA_T {
        return Some(InvalidReason::DeltaTTooLow);
    }
    None
}
