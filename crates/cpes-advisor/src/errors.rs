//! ---
//! cpes_section: "04-advisory"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Error types for the advisory crate."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Debug, Error)]
pub enum AdvisorError {
    /// The upstream efficiency model is not reachable or not trained.
    /// Recoverable: formula-based rules keep running without it.
    #[error("efficiency model unavailable")]
    ModelUnavailable,
    #[error("insufficient training data: {available} valid samples, need {required}")]
    InsufficientTrainingData { available: usize, required: usize },
}
