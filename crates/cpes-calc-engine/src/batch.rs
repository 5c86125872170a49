//! ---
//! cpes_section: "02-calculation-engine"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Batch evaluation of reading streams with summary aggregates."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use cpes_core::{DerivedMetrics, FinancialParams, SensorReading};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    errors::{CalcEngineError, Result},
    thermo,
};

/// One evaluated reading: the raw snapshot next to its derived figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub reading: SensorReading,
    pub metrics: DerivedMetrics,
}

/// Aggregates over a batch. Averages cover valid records only; absent when
/// the batch held no valid record at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub record_count: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub duration_hours: f64,
    pub avg_chiller_kw_per_tr: Option<f64>,
    pub avg_plant_kw_per_tr: Option<f64>,
    pub avg_cop: Option<f64>,
    pub avg_cooling_load_kw: Option<f64>,
    /// Plant-level energy over the batch, integrating chiller plus metered
    /// auxiliary power over the timestep.
    pub total_energy_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEvaluation {
    pub records: Vec<MetricsRecord>,
    pub summary: BatchSummary,
}

/// Evaluate a stream of readings taken `timestep_minutes` apart.
pub fn evaluate(
    readings: &[SensorReading],
    financial: &FinancialParams,
    timestep_minutes: f64,
) -> Result<BatchEvaluation> {
    if readings.is_empty() {
        return Err(CalcEngineError::EmptyBatch);
    }
    if timestep_minutes <= 0.0 {
        return Err(CalcEngineError::NonPositiveTimestep);
    }

    let records: Vec<MetricsRecord> = readings
        .iter()
        .map(|reading| MetricsRecord {
            reading: reading.clone(),
            metrics: thermo::compute(reading, financial),
        })
        .collect();

    let summary = summarize(&records, timestep_minutes);
    info!(
        records = summary.record_count,
        valid = summary.valid_count,
        "batch evaluation complete"
    );

    Ok(BatchEvaluation { records, summary })
}

fn summarize(records: &[MetricsRecord], timestep_minutes: f64) -> BatchSummary {
    let valid: Vec<&MetricsRecord> = records.iter().filter(|r| r.metrics.valid).collect();

    let mean = |extract: fn(&DerivedMetrics) -> Option<f64>| -> Option<f64> {
        let values: Vec<f64> = valid.iter().filter_map(|r| extract(&r.metrics)).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    };

    let total_energy_kwh = valid
        .iter()
        .map(|r| {
            let power = r
                .metrics
                .plant_power_kw
                .unwrap_or(r.reading.chiller_power_kw);
            power * timestep_minutes / 60.0
        })
        .sum();

    BatchSummary {
        record_count: records.len(),
        valid_count: valid.len(),
        invalid_count: records.len() - valid.len(),
        duration_hours: records.len() as f64 * timestep_minutes / 60.0,
        avg_chiller_kw_per_tr: mean(|m| m.chiller_kw_per_tr),
        avg_plant_kw_per_tr: mean(|m| m.plant_kw_per_tr),
        avg_cop: mean(|m| m.cop),
        avg_cooling_load_kw: mean(|m| m.cooling_load_kw),
        total_energy_kwh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use cpes_core::ReadingSource;

    fn reading(offset_minutes: i64, delta_t: f64) -> SensorReading {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        SensorReading {
            timestamp: start + Duration::minutes(offset_minutes),
            chw_supply_temp: 7.0,
            chw_return_temp: 7.0 + delta_t,
            chw_flow_rate: 50.0,
            cond_inlet_temp: None,
            cond_outlet_temp: None,
            cond_flow_rate: None,
            ambient_temp: 32.0,
            wet_bulb_temp: None,
            chiller_power_kw: 180.0,
            chw_pump_power_kw: None,
            cw_pump_power_kw: None,
            tower_fan_power_kw: None,
            tower_fan_speed_pct: None,
            source: ReadingSource::Simulation,
        }
    }

    #[test]
    fn empty_batch_is_an_error() {
        let result = evaluate(&[], &FinancialParams::default(), 5.0);
        assert!(matches!(result, Err(CalcEngineError::EmptyBatch)));
    }

    #[test]
    fn invalid_records_are_kept_but_excluded_from_aggregates() {
        let readings = vec![reading(0, 5.0), reading(5, 1.0), reading(10, 5.0)];
        let evaluation = evaluate(&readings, &FinancialParams::default(), 5.0).unwrap();
        assert_eq!(evaluation.summary.record_count, 3);
        assert_eq!(evaluation.summary.valid_count, 2);
        assert_eq!(evaluation.summary.invalid_count, 1);
        // invalid middle record contributes no energy and no average
        assert!((evaluation.summary.total_energy_kwh - 2.0 * 180.0 * 5.0 / 60.0).abs() < 1e-9);
        let expected_load = 4.186 * 50.0 * 5.0;
        assert!((evaluation.summary.avg_cooling_load_kw.unwrap() - expected_load).abs() < 0.05);
    }

    #[test]
    fn summary_energy_is_plant_level_when_auxiliaries_are_metered() {
        let mut with_aux = reading(0, 5.0);
        with_aux.chw_pump_power_kw = Some(10.0);
        with_aux.tower_fan_power_kw = Some(5.0);
        let evaluation = evaluate(&[with_aux], &FinancialParams::default(), 5.0).unwrap();
        let expected = (180.0 + 10.0 + 5.0) * 5.0 / 60.0;
        assert!((evaluation.summary.total_energy_kwh - expected).abs() < 1e-9);
    }

    #[test]
    fn all_invalid_batch_has_no_averages() {
        let readings = vec![reading(0, 1.0), reading(5, 0.5)];
        let evaluation = evaluate(&readings, &FinancialParams::default(), 5.0).unwrap();
        assert_eq!(evaluation.summary.valid_count, 0);
        assert_eq!(evaluation.summary.avg_cop, None);
        assert_eq!(evaluation.summary.total_energy_kwh, 0.0);
    }
}
