//! ---
//! cpes_section: "02-calculation-engine"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Compressor lift, part-load, and affinity-law diagnostics."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use crate::errors::{CalcEngineError, Result};

/// Design compressor lift in °C for a water-cooled centrifugal machine.
pub const BASELINE_LIFT_C: f64 = 9.0;

/// Compressor power penalty per °C of lift above baseline.
const LIFT_PENALTY_PER_C: f64 = 0.03;

/// Compressor lift: condenser saturation minus evaporator saturation.
pub fn compressor_lift(cond_sat_temp: f64, evap_sat_temp: f64) -> f64 {
    cond_sat_temp - evap_sat_temp
}

/// Estimated percent power penalty for operating above baseline lift.
/// Roughly 3% per °C; lift at or below baseline costs nothing.
pub fn lift_penalty_percent(lift: f64) -> f64 {
    ((lift - BASELINE_LIFT_C) * LIFT_PENALTY_PER_C * 100.0).max(0.0)
}

/// Part-load ratio of actual cooling duty against rated capacity.
pub fn part_load_ratio(actual_load_kw: f64, rated_capacity_kw: f64) -> Result<f64> {
    if rated_capacity_kw <= 0.0 {
        return Err(CalcEngineError::NonPositiveRatedCapacity);
    }
    Ok((actual_load_kw / rated_capacity_kw).clamp(0.0, 1.2))
}

/// Relative kW/TR multiplier across the part-load curve.
///
/// Quadratic fit with its minimum near 80% PLR; lightly loaded machines run
/// noticeably worse than their nameplate figure.
pub fn plr_efficiency_modifier(plr: f64) -> f64 {
    0.1 * plr * plr - 0.25 * plr + 1.15
}

/// Affinity (cube) law: power at a new shaft speed given a reference point.
pub fn affinity_power(power_at_rated_kw: f64, rated_speed: f64, new_speed: f64) -> Result<f64> {
    if rated_speed <= 0.0 {
        return Err(CalcEngineError::NonPositiveRatedSpeed);
    }
    let ratio = (new_speed / rated_speed).max(0.0);
    Ok(power_at_rated_kw * ratio.powi(3))
}

/// Percent power penalty attributed to a fouled or airflow-starved tower,
/// banded on approach temperature.
pub fn tower_approach_penalty_percent(approach: f64) -> f64 {
    if approach <= 5.0 {
        0.0
    } else if approach <= 7.0 {
        3.0
    } else if approach <= 9.0 {
        6.0
    } else {
        10.0
    }
}
