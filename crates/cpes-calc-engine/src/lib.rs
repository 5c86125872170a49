//! ---
//! cpes_section: "02-calculation-engine"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Thermodynamic, diagnostic, and financial calculation routines."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
pub mod advanced;
pub mod batch;
pub mod errors;
pub mod export;
pub mod thermo;

pub use batch::{BatchEvaluation, BatchSummary, MetricsRecord};
pub use errors::{CalcEngineError, Result};
pub use thermo::compute;

use cpes_core::{FinancialParams, SensorReading};

/// Evaluate a full stream of readings and summarize it. Convenience wrapper
/// over [`batch::evaluate`] used by the API and CLI surfaces.
pub fn evaluate_readings(
    readings: &[SensorReading],
    financial: &FinancialParams,
    timestep_minutes: f64,
) -> Result<BatchEvaluation> {
    batch::evaluate(readings, financial, timestep_minutes)
}
