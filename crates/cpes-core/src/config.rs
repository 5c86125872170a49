//! ---
//! cpes_section: "01-domain-model"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Application configuration loading and validation."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::financial::FinancialParams;

fn default_log_filter() -> String {
    "info".to_owned()
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_listen() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default api address")
}

fn default_store_path() -> PathBuf {
    PathBuf::from("target/data/readings.log")
}

fn default_sim_seed() -> u64 {
    0xC001u64
}

fn default_sim_duration_hours() -> u32 {
    24
}

fn default_sim_timestep_minutes() -> u32 {
    5
}

fn default_sim_load_factor() -> f64 {
    0.75
}

/// Primary configuration object for the CPES runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub simulation: SimulationDefaults,
    #[serde(default)]
    pub financial: FinancialParams,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "CPES_CONFIG";

    /// Load configuration from disk, respecting the `CPES_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.financial.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_listen")]
    pub listen: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            listen: default_api_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Baseline simulation parameters used when a request omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationDefaults {
    #[serde(default = "default_sim_seed")]
    pub seed: u64,
    #[serde(default = "default_sim_duration_hours")]
    pub duration_hours: u32,
    #[serde(default = "default_sim_timestep_minutes")]
    pub timestep_minutes: u32,
    #[serde(default = "default_sim_load_factor")]
    pub load_factor: f64,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            seed: default_sim_seed(),
            duration_hours: default_sim_duration_hours(),
            timestep_minutes: default_sim_timestep_minutes(),
            load_factor: default_sim_load_factor(),
        }
    }
}

impl SimulationDefaults {
    pub fn validate(&self) -> Result<()> {
        if !(1..=168).contains(&self.duration_hours) {
            return Err(anyhow!("simulation duration_hours must be in 1..=168"));
        }
        if !(1..=60).contains(&self.timestep_minutes) {
            return Err(anyhow!("simulation timestep_minutes must be in 1..=60"));
        }
        if !(0.3..=1.0).contains(&self.load_factor) {
            return Err(anyhow!("simulation load_factor must be in 0.3..=1.0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config.api.listen, default_api_listen());
        assert_eq!(config.simulation.timestep_minutes, 5);
        assert_eq!(config.store.path, default_store_path());
    }

    #[test]
    fn out_of_range_simulation_defaults_rejected() {
        let result = "[simulation]\nload_factor = 0.1".parse::<AppConfig>();
        assert!(result.is_err());
        let result = "[simulation]\nduration_hours = 200".parse::<AppConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn load_with_source_reports_the_chosen_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[financial]\ntariff_per_kwh = 9.5").unwrap();
        let loaded = AppConfig::load_with_source(&[file.path()]).unwrap();
        assert_eq!(loaded.source, file.path());
        assert!((loaded.config.financial.tariff_per_kwh - 9.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_candidates_produce_error() {
        let result = AppConfig::load(&[Path::new("does/not/exist.toml")]);
        assert!(result.is_err());
    }
}
