//! ---
//! cpes_section: "02-calculation-engine"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Error types for the calculation engine."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalcEngineError>;

#[derive(Debug, Error)]
pub enum CalcEngineError {
    #[error("cannot evaluate an empty batch of readings")]
    EmptyBatch,
    #[error("timestep must be greater than zero minutes")]
    NonPositiveTimestep,
    #[error("rated speed must be greater than zero")]
    NonPositiveRatedSpeed,
    #[error("rated capacity must be greater than zero")]
    NonPositiveRatedCapacity,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
