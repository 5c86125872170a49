//! ---
//! cpes_section: "04-advisory"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Advisory rule engine and efficiency-model boundary."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
pub mod errors;
pub mod features;
pub mod model;
pub mod rules;

pub use errors::{AdvisorError, Result};
pub use features::{training_set, FeatureVector, TrainingSet, MIN_TRAINING_SAMPLES};
pub use model::{model_insights, AnomalyVerdict, EfficiencyModel, ModelInsights, NoopModel};
pub use rules::{advise, ActionKind, Priority, Recommendation};
