//! ---
//! cpes_section: "02-calculation-engine"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Flattened CSV export of readings with derived metrics, and CSV upload parsing."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use cpes_core::{
    metrics::{ApproachBand, ChillerBand, PlantBand},
    validation::InvalidReason,
    ReadingSource, SensorReading,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{batch::MetricsRecord, errors::Result};

/// One CSV row: sensor fields followed by derived fields, in a fixed column
/// order shared by simulation output and uploaded data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatRecord {
    pub timestamp: DateTime<Utc>,
    pub source: ReadingSource,
    pub chw_supply_temp: f64,
    pub chw_return_temp: f64,
    pub chw_flow_rate: f64,
    pub cond_inlet_temp: Option<f64>,
    pub cond_outlet_temp: Option<f64>,
    pub cond_flow_rate: Option<f64>,
    pub ambient_temp: f64,
    pub wet_bulb_temp: Option<f64>,
    pub chiller_power_kw: f64,
    pub chw_pump_power_kw: Option<f64>,
    pub cw_pump_power_kw: Option<f64>,
    pub tower_fan_power_kw: Option<f64>,
    pub tower_fan_speed_pct: Option<f64>,
    pub valid: bool,
    pub invalid_reason: Option<InvalidReason>,
    pub delta_t: f64,
    pub cooling_load_kw: Option<f64>,
    pub cooling_capacity_tr: Option<f64>,
    pub chiller_kw_per_tr: Option<f64>,
    pub cop: Option<f64>,
    pub chiller_band: Option<ChillerBand>,
    pub plant_power_kw: Option<f64>,
    pub plant_kw_per_tr: Option<f64>,
    pub plant_cop: Option<f64>,
    pub plant_band: Option<PlantBand>,
    pub tower_range: Option<f64>,
    pub tower_approach: Option<f64>,
    pub approach_band: Option<ApproachBand>,
    pub heat_rejected_kw: Option<f64>,
    pub energy_cost_per_hour: Option<f64>,
    pub co2_kg_per_hour: Option<f64>,
    pub potential_savings_per_year: Option<f64>,
}

impl From<&MetricsRecord> for FlatRecord {
    fn from(record: &MetricsRecord) -> Self {
        let r = &record.reading;
        let m = &record.metrics;
        Self {
            timestamp: r.timestamp,
            source: r.source,
            chw_supply_temp: r.chw_supply_temp,
            chw_return_temp: r.chw_return_temp,
            chw_flow_rate: r.chw_flow_rate,
            cond_inlet_temp: r.cond_inlet_temp,
            cond_outlet_temp: r.cond_outlet_temp,
            cond_flow_rate: r.cond_flow_rate,
            ambient_temp: r.ambient_temp,
            wet_bulb_temp: r.wet_bulb_temp,
            chiller_power_kw: r.chiller_power_kw,
            chw_pump_power_kw: r.chw_pump_power_kw,
            cw_pump_power_kw: r.cw_pump_power_kw,
            tower_fan_power_kw: r.tower_fan_power_kw,
            tower_fan_speed_pct: r.tower_fan_speed_pct,
            valid: m.valid,
            invalid_reason: m.invalid_reason.clone(),
            delta_t: m.delta_t,
            cooling_load_kw: m.cooling_load_kw,
            cooling_capacity_tr: m.cooling_capacity_tr,
            chiller_kw_per_tr: m.chiller_kw_per_tr,
            cop: m.cop,
            chiller_band: m.chiller_band,
            plant_power_kw: m.plant_power_kw,
            plant_kw_per_tr: m.plant_kw_per_tr,
            plant_cop: m.plant_cop,
            plant_band: m.plant_band,
            tower_range: m.tower_range,
            tower_approach: m.tower_approach,
            approach_band: m.approach_band,
            heat_rejected_kw: m.heat_rejected_kw,
            energy_cost_per_hour: m.energy_cost_per_hour,
            co2_kg_per_hour: m.co2_kg_per_hour,
            potential_savings_per_year: m.potential_savings_per_year,
        }
    }
}

/// Write evaluated records as CSV with a header row.
pub fn write_csv<W: Write>(records: &[MetricsRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(FlatRecord::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Sensor-only row shape accepted on upload. Header names match the export
/// columns so an exported file round-trips as an upload.
#[derive(Debug, Deserialize)]
struct UploadRow {
    timestamp: DateTime<Utc>,
    chw_supply_temp: f64,
    chw_return_temp: f64,
    chw_flow_rate: f64,
    #[serde(default)]
    cond_inlet_temp: Option<f64>,
    #[serde(default)]
    cond_outlet_temp: Option<f64>,
    #[serde(default)]
    cond_flow_rate: Option<f64>,
    ambient_temp: f64,
    #[serde(default)]
    wet_bulb_temp: Option<f64>,
    chiller_power_kw: f64,
    #[serde(default)]
    chw_pump_power_kw: Option<f64>,
    #[serde(default)]
    cw_pump_power_kw: Option<f64>,
    #[serde(default)]
    tower_fan_power_kw: Option<f64>,
    #[serde(default)]
    tower_fan_speed_pct: Option<f64>,
}

/// Result of parsing an uploaded CSV: parsed readings plus a count of rows
/// that could not be interpreted. Malformed rows are skipped, not fatal.
#[derive(Debug)]
pub struct UploadOutcome {
    pub readings: Vec<SensorReading>,
    pub skipped_rows: usize,
}

/// Parse uploaded CSV sensor data, tagging each reading with the upload
/// source.
pub fn read_upload<R: Read>(reader: R) -> Result<UploadOutcome> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut readings = Vec::new();
    let mut skipped_rows = 0usize;
    for (index, row) in csv_reader.deserialize::<UploadRow>().enumerate() {
        match row {
            Ok(row) => readings.push(SensorReading {
                timestamp: row.timestamp,
                chw_supply_temp: row.chw_supply_temp,
                chw_return_temp: row.chw_return_temp,
                chw_flow_rate: row.chw_flow_rate,
                cond_inlet_temp: row.cond_inlet_temp,
                cond_outlet_temp: row.cond_outlet_temp,
                cond_flow_rate: row.cond_flow_rate,
                ambient_temp: row.ambient_temp,
                wet_bulb_temp: row.wet_bulb_temp,
                chiller_power_kw: row.chiller_power_kw,
                chw_pump_power_kw: row.chw_pump_power_kw,
                cw_pump_power_kw: row.cw_pump_power_kw,
                tower_fan_power_kw: row.tower_fan_power_kw,
                tower_fan_speed_pct: row.tower_fan_speed_pct,
                source: ReadingSource::Upload,
            }),
            Err(err) => {
                warn!(row = index + 1, error = %err, "skipping malformed upload row");
                skipped_rows += 1;
            }
        }
    }

    Ok(UploadOutcome {
        readings,
        skipped_rows,
    })
}
