//! ---
//! cpes_section: "01-domain-model"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Tariff and emissions parameters used by the financial calculations."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

fn default_tariff() -> f64 {
    8.0
}

fn default_operating_hours() -> f64 {
    16.0
}

fn default_operating_days() -> f64 {
    300.0
}

fn default_baseline_plant_kw_per_tr() -> f64 {
    0.85
}

fn default_co2_factor() -> f64 {
    0.82
}

/// Tariff, schedule, and emissions assumptions behind cost and savings
/// figures. Defaults reflect a typical Indian commercial installation and
/// can be overridden per request or in the application config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialParams {
    /// Electricity tariff in ₹/kWh.
    #[serde(default = "default_tariff")]
    pub tariff_per_kwh: f64,
    #[serde(default = "default_operating_hours")]
    pub operating_hours_per_day: f64,
    #[serde(default = "default_operating_days")]
    pub operating_days_per_year: f64,
    /// Plant kW/TR an achievable retrofit is benchmarked against.
    #[serde(default = "default_baseline_plant_kw_per_tr")]
    pub baseline_plant_kw_per_tr: f64,
    /// Grid emission factor in kg CO₂ per kWh.
    #[serde(default = "default_co2_factor")]
    pub co2_kg_per_kwh: f64,
}

impl Default for FinancialParams {
    fn default() -> Self {
        Self {
            tariff_per_kwh: default_tariff(),
            operating_hours_per_day: default_operating_hours(),
            operating_days_per_year: default_operating_days(),
            baseline_plant_kw_per_tr: default_baseline_plant_kw_per_tr(),
            co2_kg_per_kwh: default_co2_factor(),
        }
    }
}

impl FinancialParams {
    pub fn validate(&self) -> Result<()> {
        if self.tariff_per_kwh <= 0.0 {
            return Err(anyhow!("tariff_per_kwh must be positive"));
        }
        if !(0.0..=24.0).contains(&self.operating_hours_per_day)
            || self.operating_hours_per_day == 0.0
        {
            return Err(anyhow!("operating_hours_per_day must be in (0, 24]"));
        }
        if !(0.0..=366.0).contains(&self.operating_days_per_year)
            || self.operating_days_per_year == 0.0
        {
            return Err(anyhow!("operating_days_per_year must be in (0, 366]"));
        }
        if self.baseline_plant_kw_per_tr <= 0.0 {
            return Err(anyhow!("baseline_plant_kw_per_tr must be positive"));
        }
        if self.co2_kg_per_kwh < 0.0 {
            return Err(anyhow!("co2_kg_per_kwh must not be negative"));
        }
        Ok(())
    }

    /// Scheduled operating hours per year.
    pub fn yearly_hours(&self) -> f64 {
        self.operating_hours_per_day * self.operating_days_per_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_commercial_tariff_assumptions() {
        let params = FinancialParams::default();
        assert!((params.tariff_per_kwh - 8.0).abs() < f64::EPSILON);
        assert!((params.yearly_hours() - 4800.0).abs() < f64::EPSILON);
        assert!((params.baseline_plant_kw_per_tr - 0.85).abs() < f64::EPSILON);
        assert!((params.co2_kg_per_kwh - 0.82).abs() < f64::EPSILON);
        params.validate().unwrap();
    }

    #[test]
    fn out_of_range_schedule_rejected() {
        let mut params = FinancialParams::default();
        params.operating_hours_per_day = 25.0;
        assert!(params.validate().is_err());
        params.operating_hours_per_day = 16.0;
        params.tariff_per_kwh = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let params: FinancialParams = toml::from_str("tariff_per_kwh = 6.5").unwrap();
        assert!((params.tariff_per_kwh - 6.5).abs() < f64::EPSILON);
        assert!((params.operating_days_per_year - 300.0).abs() < f64::EPSILON);
    }
}
