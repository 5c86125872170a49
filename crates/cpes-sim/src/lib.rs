//! ---
//! cpes_section: "03-simulation"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Simulation runtime: synthetic data engine and scenario runner."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
pub mod config;
pub mod engine;
pub mod errors;
pub mod scenario;

pub use config::SimulationConfig;
pub use engine::{SimulationEngine, SimulationRun};
pub use errors::{Result, SimError};
pub use scenario::{run_scenario, Scenario, ScenarioOutcome};
