//! ---
//! cpes_section: "04-advisory"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Formula-based optimization recommendations."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use cpes_core::{metrics::PlantBand, DerivedMetrics, SensorReading};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum chilled water supply setpoint a reset will recommend.
const MAX_CHW_SUPPLY_SETPOINT: f64 = 8.0;

/// Estimated efficiency gain per °C of supply temperature reset.
const SAVINGS_PER_DEGREE_RESET_PCT: f64 = 2.5;

/// Below this ΔT the loop is over-pumping or bypassing.
const LOW_DELTA_T: f64 = 4.0;

/// Target loop differential a flow reduction aims for.
const TARGET_DELTA_T: f64 = 5.0;

/// Tower approach bands driving maintenance advice.
const APPROACH_ADVISORY: f64 = 4.0;
const APPROACH_CRITICAL: f64 = 6.0;

/// Chiller load band where staging is considered healthy, in percent.
const LOAD_BAND_PCT: (f64, f64) = (65.0, 80.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ChwSupplyReset,
    FlowReduction,
    TowerMaintenance,
    StagingChange,
}

/// One advisory action. Advisory only: nothing here actuates equipment, and
/// anything that would move a setpoint carries `requires_confirmation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: ActionKind,
    pub priority: Priority,
    pub message: String,
    pub rationale: String,
    pub estimated_savings_percent: Option<f64>,
    pub requires_confirmation: bool,
}

/// Run every rule against one evaluated reading and return the hits sorted
/// by priority, highest first. Rules are independent: each inspects the
/// metrics on its own, and an invalid record produces no advice at all.
pub fn advise(
    reading: &SensorReading,
    metrics: &DerivedMetrics,
    rated_capacity_kw: Option<f64>,
) -> Vec<Recommendation> {
    if !metrics.valid {
        return Vec::new();
    }

    let mut recommendations = Vec::new();
    if let Some(rec) = chw_supply_reset(reading, metrics) {
        recommendations.push(rec);
    }
    if let Some(rec) = flow_reduction(reading, metrics) {
        recommendations.push(rec);
    }
    if let Some(rec) = tower_maintenance(metrics) {
        recommendations.push(rec);
    }
    if let Some(rec) = staging_change(metrics, rated_capacity_kw) {
        recommendations.push(rec);
    }

    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    debug!(hits = recommendations.len(), "advisory rules evaluated");
    recommendations
}

fn chw_supply_reset(reading: &SensorReading, metrics: &DerivedMetrics) -> Option<Recommendation> {
    let plant_kw_per_tr = metrics.plant_kw_per_tr?;
    if plant_kw_per_tr <= PlantBand::GOOD_UPPER_BOUND
        || reading.chw_supply_temp >= MAX_CHW_SUPPLY_SETPOINT
    {
        return None;
    }
    let headroom = MAX_CHW_SUPPLY_SETPOINT - reading.chw_supply_temp;
    let savings = headroom * SAVINGS_PER_DEGREE_RESET_PCT;
    Some(Recommendation {
        action: ActionKind::ChwSupplyReset,
        priority: Priority::Medium,
        message: format!(
            "Raise CHW supply setpoint by {headroom:.1} °C to {MAX_CHW_SUPPLY_SETPOINT:.1} °C"
        ),
        rationale: format!(
            "Plant kW/TR is {plant_kw_per_tr:.3}, above the acceptable band. Each °C of \
             supply reset recovers roughly {SAVINGS_PER_DEGREE_RESET_PCT}% compressor power; \
             verify the cooling load tolerates warmer water."
        ),
        estimated_savings_percent: Some(savings),
        requires_confirmation: true,
    })
}

fn flow_reduction(reading: &SensorReading, metrics: &DerivedMetrics) -> Option<Recommendation> {
    if metrics.delta_t >= LOW_DELTA_T {
        return None;
    }
    let target_flow = reading.chw_flow_rate * (metrics.delta_t / TARGET_DELTA_T);
    let savings = 5.0 + (TARGET_DELTA_T - metrics.delta_t) * 2.0;
    Some(Recommendation {
        action: ActionKind::FlowReduction,
        priority: Priority::Medium,
        message: format!(
            "Reduce CHW flow from {:.1} to {target_flow:.1} L/s",
            reading.chw_flow_rate
        ),
        rationale: format!(
            "Loop ΔT is {:.1} °C, signalling over-pumping or coil bypass. Trimming flow \
             toward a {TARGET_DELTA_T:.0} °C ΔT saves about {savings:.1}% of pump energy \
             on the cube law.",
            metrics.delta_t
        ),
        estimated_savings_percent: Some(savings),
        requires_confirmation: true,
    })
}

fn tower_maintenance(metrics: &DerivedMetrics) -> Option<Recommendation> {
    let approach = metrics.tower_approach?;
    if approach > APPROACH_CRITICAL {
        Some(Recommendation {
            action: ActionKind::TowerMaintenance,
            priority: Priority::High,
            message: "Inspect cooling tower fill and fan airflow".to_owned(),
            rationale: format!(
                "Tower approach is {approach:.1} °C against a {APPROACH_CRITICAL:.0} °C \
                 critical threshold, indicating fouling or starved airflow. High condenser \
                 water temperature raises compressor lift across every operating hour."
            ),
            estimated_savings_percent: None,
            requires_confirmation: false,
        })
    } else if approach >= APPROACH_ADVISORY {
        Some(Recommendation {
            action: ActionKind::TowerMaintenance,
            priority: Priority::Low,
            message: "Schedule cooling tower inspection".to_owned(),
            rationale: format!(
                "Tower approach is {approach:.1} °C, above the {APPROACH_ADVISORY:.0} °C \
                 excellent band. Performance is deteriorating but not yet critical."
            ),
            estimated_savings_percent: None,
            requires_confirmation: false,
        })
    } else {
        None
    }
}

fn staging_change(
    metrics: &DerivedMetrics,
    rated_capacity_kw: Option<f64>,
) -> Option<Recommendation> {
    let rated = rated_capacity_kw?;
    if rated <= 0.0 {
        return None;
    }
    let load_pct = metrics.cooling_load_kw? / rated * 100.0;
    if (LOAD_BAND_PCT.0..=LOAD_BAND_PCT.1).contains(&load_pct) {
        return None;
    }
    let message = if load_pct < LOAD_BAND_PCT.0 {
        "Consider de-staging a chiller".to_owned()
    } else {
        "Consider staging an additional chiller".to_owned()
    };
    Some(Recommendation {
        action: ActionKind::StagingChange,
        priority: Priority::Medium,
        message,
        rationale: format!(
            "Chiller load is {load_pct:.0}% of rated capacity, outside the \
             {:.0}-{:.0}% band where centrifugal machines run at their best kW/TR.",
            LOAD_BAND_PCT.0, LOAD_BAND_PCT.1
        ),
        estimated_savings_percent: None,
        requires_confirmation: true,
    })
}
