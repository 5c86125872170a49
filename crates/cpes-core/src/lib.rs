//! ---
//! cpes_section: "01-domain-model"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Shared domain types and validation rules for the chiller plant."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
pub mod config;
pub mod financial;
pub mod metrics;
pub mod reading;
pub mod validation;

pub use config::AppConfig;
pub use financial::FinancialParams;
pub use metrics::{ApproachBand, ChillerBand, DerivedMetrics, PlantBand};
pub use reading::{ReadingSource, SensorReading};
pub use validation::{validate_reading, InvalidReason};

/// Specific heat of water in kJ/(kg.°C), used for all water-side load math.
pub const SPECIFIC_HEAT_WATER: f64 = 4.186;

/// One ton of refrigeration expressed in kW.
pub const KW_PER_TR: f64 = 3.517;
