//! ---
//! cpes_section: "01-domain-model"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Derived efficiency metrics and benchmark bands."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::InvalidReason;

/// Chiller-only efficiency band keyed on kW/TR, exclusive upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChillerBand {
    Excellent,
    Efficient,
    Average,
    Poor,
}

impl ChillerBand {
    pub fn classify(kw_per_tr: f64) -> Self {
        if kw_per_tr < 0.60 {
            ChillerBand::Excellent
        } else if kw_per_tr < 0.75 {
            ChillerBand::Efficient
        } else if kw_per_tr < 0.85 {
            ChillerBand::Average
        } else {
            ChillerBand::Poor
        }
    }
}

/// Plant-level efficiency band including auxiliaries, exclusive upper bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantBand {
    Excellent,
    Good,
    Poor,
}

impl PlantBand {
    pub fn classify(plant_kw_per_tr: f64) -> Self {
        if plant_kw_per_tr < 0.75 {
            PlantBand::Excellent
        } else if plant_kw_per_tr < 0.95 {
            PlantBand::Good
        } else {
            PlantBand::Poor
        }
    }

    /// Upper bound of the acceptable band; above this the plant is Poor.
    pub const GOOD_UPPER_BOUND: f64 = 0.95;
}

/// Cooling tower approach band in °C above wet bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproachBand {
    Excellent,
    Acceptable,
    Poor,
}

impl ApproachBand {
    pub fn classify(approach: f64) -> Self {
        if approach < 4.0 {
            ApproachBand::Excellent
        } else if approach <= 6.0 {
            ApproachBand::Acceptable
        } else {
            ApproachBand::Poor
        }
    }
}

/// Typical cooling tower range window in °C.
pub const TOWER_RANGE_TYPICAL: (f64, f64) = (4.0, 8.0);

/// Full derived-metric record for one sensor reading.
///
/// Every field that depends on a divisor or on optional instrumentation is
/// `Option`: an invalid reading keeps its `delta_t` and reason code but no
/// derived figures, and a reading without condenser sensors has no tower
/// figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub timestamp: DateTime<Utc>,
    pub valid: bool,
    #[serde(default)]
    pub invalid_reason: Option<InvalidReason>,
    pub delta_t: f64,
    pub cooling_load_kw: Option<f64>,
    pub cooling_capacity_tr: Option<f64>,
    pub chiller_kw_per_tr: Option<f64>,
    pub cop: Option<f64>,
    pub chiller_band: Option<ChillerBand>,
    /// Total plant power and its efficiency figures. When no auxiliary power
    /// is metered these degrade to chiller-only values and
    /// `aux_power_metered` is false.
    pub plant_power_kw: Option<f64>,
    pub plant_kw_per_tr: Option<f64>,
    pub plant_cop: Option<f64>,
    pub plant_band: Option<PlantBand>,
    pub aux_power_metered: bool,
    pub tower_range: Option<f64>,
    pub tower_approach: Option<f64>,
    pub approach_band: Option<ApproachBand>,
    pub tower_range_typical: Option<bool>,
    pub heat_rejected_kw: Option<f64>,
    pub energy_cost_per_hour: Option<f64>,
    pub co2_kg_per_hour: Option<f64>,
    pub potential_savings_percent: Option<f64>,
    pub potential_savings_per_year: Option<f64>,
}

impl DerivedMetrics {
    /// Build the record for a reading that failed validation. Only the raw
    /// differential survives; everything derived is absent.
    pub fn invalid(timestamp: DateTime<Utc>, delta_t: f64, reason: InvalidReason) -> Self {
        Self {
            timestamp,
            valid: false,
            invalid_reason: Some(reason),
            delta_t,
            cooling_load_kw: None,
            cooling_capacity_tr: None,
            chiller_kw_per_tr: None,
            cop: None,
            chiller_band: None,
            plant_power_kw: None,
            plant_kw_per_tr: None,
            plant_cop: None,
            plant_band: None,
            aux_power_metered: false,
            tower_range: None,
            tower_approach: None,
            approach_band: None,
            tower_range_typical: None,
            heat_rejected_kw: None,
            energy_cost_per_hour: None,
            co2_kg_per_hour: None,
            potential_savings_percent: None,
            potential_savings_per_year: None,
        }
    }
}
