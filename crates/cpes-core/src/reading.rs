//! ---
//! cpes_section: "01-domain-model"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Sensor reading record shared across simulation, upload, and API paths."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin of a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReadingSource {
    #[default]
    Simulation,
    Upload,
    Manual,
}

/// One timestamped snapshot of plant instrumentation.
///
/// Condenser-side and auxiliary-power fields are optional: a minimally
/// instrumented site reports only the chilled-water loop and chiller power.
/// Absent fields suppress the derived metrics that depend on them, they never
/// default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    /// Chilled water supply temperature in °C.
    pub chw_supply_temp: f64,
    /// Chilled water return temperature in °C.
    pub chw_return_temp: f64,
    /// Chilled water flow rate in L/s.
    pub chw_flow_rate: f64,
    #[serde(default)]
    pub cond_inlet_temp: Option<f64>,
    #[serde(default)]
    pub cond_outlet_temp: Option<f64>,
    /// Condenser water flow rate in L/s.
    #[serde(default)]
    pub cond_flow_rate: Option<f64>,
    pub ambient_temp: f64,
    #[serde(default)]
    pub wet_bulb_temp: Option<f64>,
    /// Chiller compressor power draw in kW.
    pub chiller_power_kw: f64,
    #[serde(default)]
    pub chw_pump_power_kw: Option<f64>,
    #[serde(default)]
    pub cw_pump_power_kw: Option<f64>,
    #[serde(default)]
    pub tower_fan_power_kw: Option<f64>,
    /// Cooling tower fan speed in percent of rated.
    #[serde(default)]
    pub tower_fan_speed_pct: Option<f64>,
    #[serde(default)]
    pub source: ReadingSource,
}

impl SensorReading {
    /// Chilled water temperature differential (return minus supply).
    pub fn delta_t(&self) -> f64 {
        self.chw_return_temp - self.chw_supply_temp
    }

    /// Sum of the auxiliary power meters that are present, if any.
    pub fn aux_power_kw(&self) -> Option<f64> {
        let meters = [
            self.chw_pump_power_kw,
            self.cw_pump_power_kw,
            self.tower_fan_power_kw,
        ];
        if meters.iter().all(Option::is_none) {
            return None;
        }
        Some(meters.iter().flatten().sum())
    }

    /// Total plant power: chiller plus whatever auxiliaries are metered.
    pub fn plant_power_kw(&self) -> f64 {
        self.chiller_power_kw + self.aux_power_kw().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading() -> SensorReading {
        SensorReading {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            chw_supply_temp: 7.0,
            chw_return_temp: 12.0,
            chw_flow_rate: 50.0,
            cond_inlet_temp: Some(35.0),
            cond_outlet_temp: Some(30.0),
            cond_flow_rate: Some(60.0),
            ambient_temp: 32.0,
            wet_bulb_temp: Some(26.0),
            chiller_power_kw: 180.0,
            chw_pump_power_kw: Some(22.0),
            cw_pump_power_kw: None,
            tower_fan_power_kw: Some(11.0),
            tower_fan_speed_pct: Some(80.0),
            source: ReadingSource::Manual,
        }
    }

    #[test]
    fn aux_power_sums_present_meters_only() {
        let r = reading();
        assert_eq!(r.aux_power_kw(), Some(33.0));
        assert!((r.plant_power_kw() - 213.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aux_power_is_none_when_nothing_metered() {
        let mut r = reading();
        r.chw_pump_power_kw = None;
        r.tower_fan_power_kw = None;
        assert_eq!(r.aux_power_kw(), None);
        assert!((r.plant_power_kw() - r.chiller_power_kw).abs() < f64::EPSILON);
    }

    #[test]
    fn optional_fields_default_on_deserialize() {
        let json = r#"{
            "timestamp": "2026-03-01T12:00:00Z",
            "chw_supply_temp": 7.0,
            "chw_return_temp": 12.0,
            "chw_flow_rate": 50.0,
            "ambient_temp": 32.0,
            "chiller_power_kw": 180.0
        }"#;
        let r: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(r.wet_bulb_temp, None);
        assert_eq!(r.source, ReadingSource::Simulation);
        assert!((r.delta_t() - 5.0).abs() < f64::EPSILON);
    }
}
