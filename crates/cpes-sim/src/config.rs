//! ---
//! cpes_section: "03-simulation"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Simulation run parameters and their range validation."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use cpes_core::config::SimulationDefaults;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SimError};

fn default_duration_hours() -> u32 {
    24
}

fn default_timestep_minutes() -> u32 {
    5
}

fn default_chw_supply_setpoint() -> f64 {
    7.0
}

fn default_chw_return_setpoint() -> f64 {
    12.0
}

fn default_load_factor() -> f64 {
    0.75
}

fn default_ambient_temp_base() -> f64 {
    32.0
}

fn default_fouling_rate() -> f64 {
    0.0005
}

fn default_include_fouling() -> bool {
    true
}

/// Parameters of one simulated run. Out-of-range values are a caller error
/// and are rejected before any data is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_duration_hours")]
    pub duration_hours: u32,
    #[serde(default = "default_timestep_minutes")]
    pub timestep_minutes: u32,
    #[serde(default = "default_chw_supply_setpoint")]
    pub chw_supply_setpoint: f64,
    #[serde(default = "default_chw_return_setpoint")]
    pub chw_return_setpoint: f64,
    /// Fraction of rated plant load reached at the daily peak.
    #[serde(default = "default_load_factor")]
    pub load_factor: f64,
    /// Daily mean dry-bulb temperature in °C.
    #[serde(default = "default_ambient_temp_base")]
    pub ambient_temp_base: f64,
    /// Whether exchanger fouling drift applies over the run.
    #[serde(default = "default_include_fouling")]
    pub include_fouling: bool,
    /// Efficiency degradation per elapsed simulated hour.
    #[serde(default = "default_fouling_rate")]
    pub fouling_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_hours: default_duration_hours(),
            timestep_minutes: default_timestep_minutes(),
            chw_supply_setpoint: default_chw_supply_setpoint(),
            chw_return_setpoint: default_chw_return_setpoint(),
            load_factor: default_load_factor(),
            ambient_temp_base: default_ambient_temp_base(),
            include_fouling: default_include_fouling(),
            fouling_rate: default_fouling_rate(),
        }
    }
}

impl SimulationConfig {
    /// Seed a run config from the application-level defaults.
    pub fn from_defaults(defaults: &SimulationDefaults) -> Self {
        Self {
            duration_hours: defaults.duration_hours,
            timestep_minutes: defaults.timestep_minutes,
            load_factor: defaults.load_factor,
            ..Self::default()
        }
    }

    pub fn total_steps(&self) -> usize {
        ((self.duration_hours * 60) / self.timestep_minutes) as usize
    }

    pub fn target_delta_t(&self) -> f64 {
        self.chw_return_setpoint - self.chw_supply_setpoint
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=168).contains(&self.duration_hours) {
            return Err(SimError::InvalidConfig(
                "duration_hours must be in 1..=168".to_owned(),
            ));
        }
        if !(1..=60).contains(&self.timestep_minutes) {
            return Err(SimError::InvalidConfig(
                "timestep_minutes must be in 1..=60".to_owned(),
            ));
        }
        if !(4.0..=12.0).contains(&self.chw_supply_setpoint) {
            return Err(SimError::InvalidConfig(
                "chw_supply_setpoint must be in 4..=12 °C".to_owned(),
            ));
        }
        if !(8.0..=16.0).contains(&self.chw_return_setpoint) {
            return Err(SimError::InvalidConfig(
                "chw_return_setpoint must be in 8..=16 °C".to_owned(),
            ));
        }
        if self.target_delta_t() < 3.0 {
            return Err(SimError::InvalidConfig(
                "return setpoint must sit at least 3 °C above supply".to_owned(),
            ));
        }
        if !(0.3..=1.0).contains(&self.load_factor) {
            return Err(SimError::InvalidConfig(
                "load_factor must be in 0.3..=1.0".to_owned(),
            ));
        }
        if !(20.0..=45.0).contains(&self.ambient_temp_base) {
            return Err(SimError::InvalidConfig(
                "ambient_temp_base must be in 20..=45 °C".to_owned(),
            ));
        }
        if !(0.0..=0.1).contains(&self.fouling_rate) {
            return Err(SimError::InvalidConfig(
                "fouling_rate must be in 0.0..=0.1 per hour".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_and_cover_a_day() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.total_steps(), 288);
        assert!((config.target_delta_t() - 5.0).abs() < f64::EPSILON);
        assert!(config.include_fouling);
    }

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let config: SimulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());

        let config: SimulationConfig =
            serde_json::from_str(r#"{"include_fouling": false}"#).unwrap();
        assert!(!config.include_fouling);
        assert!((config.fouling_rate - 0.0005).abs() < f64::EPSILON);
    }

    #[test]
    fn each_range_bound_is_enforced() {
        let mut config = SimulationConfig {
            duration_hours: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = SimulationConfig {
            timestep_minutes: 61,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = SimulationConfig {
            load_factor: 1.01,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = SimulationConfig {
            ambient_temp_base: 46.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = SimulationConfig {
            fouling_rate: 0.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = SimulationConfig {
            chw_supply_setpoint: 10.0,
            chw_return_setpoint: 12.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
