//! ---
//! cpes_section: "03-simulation"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Error types for the simulation crate."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("simulation cancelled after {completed} of {total} steps")]
    Cancelled { completed: usize, total: usize },
    #[error(transparent)]
    Calc(#[from] cpes_calc_engine::CalcEngineError),
}
