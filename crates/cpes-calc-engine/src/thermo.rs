//! ---
//! cpes_section: "02-calculation-engine"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Core thermodynamic and financial metric derivation."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use cpes_core::{
    metrics::{ApproachBand, ChillerBand, DerivedMetrics, PlantBand, TOWER_RANGE_TYPICAL},
    validation::{validate_reading, InvalidReason},
    FinancialParams, SensorReading, KW_PER_TR, SPECIFIC_HEAT_WATER,
};

/// Smallest divisor treated as physically meaningful. Anything smaller marks
/// the record degenerate instead of producing an infinity.
const DIVISOR_FLOOR: f64 = 1e-9;

/// Derive the full metric record for a single reading.
///
/// Total over its input domain: bad sensor data yields an invalid record
/// with a reason code, never a panic or an `Err`. Calling this twice on the
/// same reading produces identical output.
pub fn compute(reading: &SensorReading, financial: &FinancialParams) -> DerivedMetrics {
    let delta_t = reading.delta_t();

    if let Some(reason) = validate_reading(reading) {
        return DerivedMetrics::invalid(reading.timestamp, delta_t, reason);
    }

    // Cooling Load (kW) = 4.186 x Flow (L/s) x dT (°C)
    let cooling_load_kw = SPECIFIC_HEAT_WATER * reading.chw_flow_rate * delta_t;
    let cooling_capacity_tr = cooling_load_kw / KW_PER_TR;

    if cooling_capacity_tr <= DIVISOR_FLOOR {
        return DerivedMetrics::invalid(
            reading.timestamp,
            delta_t,
            InvalidReason::DegenerateDivisor("cooling_capacity_tr".to_owned()),
        );
    }

    let chiller_kw_per_tr = reading.chiller_power_kw / cooling_capacity_tr;
    let cop = cooling_load_kw / reading.chiller_power_kw;

    let aux_power_metered = reading.aux_power_kw().is_some();
    let plant_power_kw = reading.plant_power_kw();
    if plant_power_kw <= DIVISOR_FLOOR {
        return DerivedMetrics::invalid(
            reading.timestamp,
            delta_t,
            InvalidReason::DegenerateDivisor("plant_power_kw".to_owned()),
        );
    }
    let plant_kw_per_tr = plant_power_kw / cooling_capacity_tr;
    let plant_cop = cooling_load_kw / plant_power_kw;

    let tower_range = match (reading.cond_inlet_temp, reading.cond_outlet_temp) {
        (Some(inlet), Some(outlet)) => Some(inlet - outlet),
        _ => None,
    };
    let tower_approach = match (reading.cond_outlet_temp, reading.wet_bulb_temp) {
        (Some(outlet), Some(wet_bulb)) => Some(outlet - wet_bulb),
        _ => None,
    };
    let heat_rejected_kw = match (tower_range, reading.cond_flow_rate) {
        (Some(range), Some(flow)) if range > 0.0 => Some(SPECIFIC_HEAT_WATER * flow * range),
        _ => None,
    };
    let tower_range_typical = tower_range
        .map(|range| (TOWER_RANGE_TYPICAL.0..=TOWER_RANGE_TYPICAL.1).contains(&range));

    let energy_cost_per_hour = plant_power_kw * financial.tariff_per_kwh;
    let co2_kg_per_hour = plant_power_kw * financial.co2_kg_per_kwh;

    // Savings against the retrofit baseline, clamped at zero: a plant already
    // beating the baseline has nothing to recover.
    let (potential_savings_percent, potential_savings_per_year) =
        if plant_kw_per_tr > financial.baseline_plant_kw_per_tr {
            let savings_pct =
                (plant_kw_per_tr - financial.baseline_plant_kw_per_tr) / plant_kw_per_tr * 100.0;
            let baseline_power = financial.baseline_plant_kw_per_tr * cooling_capacity_tr;
            let power_savings = plant_power_kw - baseline_power;
            let yearly =
                (power_savings * financial.yearly_hours() * financial.tariff_per_kwh).max(0.0);
            (savings_pct, yearly)
        } else {
            (0.0, 0.0)
        };

    DerivedMetrics {
        timestamp: reading.timestamp,
        valid: true,
        invalid_reason: None,
        delta_t,
        cooling_load_kw: Some(cooling_load_kw),
        cooling_capacity_tr: Some(cooling_capacity_tr),
        chiller_kw_per_tr: Some(chiller_kw_per_tr),
        cop: Some(cop),
        chiller_band: Some(ChillerBand::classify(chiller_kw_per_tr)),
        plant_power_kw: Some(plant_power_kw),
        plant_kw_per_tr: Some(plant_kw_per_tr),
        plant_cop: Some(plant_cop),
        plant_band: Some(PlantBand::classify(plant_kw_per_tr)),
        aux_power_metered,
        tower_range,
        tower_approach,
        approach_band: tower_approach.map(ApproachBand::classify),
        tower_range_typical,
        heat_rejected_kw,
        energy_cost_per_hour: Some(energy_cost_per_hour),
        co2_kg_per_hour: Some(co2_kg_per_hour),
        potential_savings_percent: Some(potential_savings_percent),
        potential_savings_per_year: Some(potential_savings_per_year),
    }
}
