//! ---
//! cpes_section: "04-advisory"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Feature extraction for the efficiency-model boundary."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use cpes_core::{DerivedMetrics, SensorReading};
use serde::{Deserialize, Serialize};

use crate::errors::{AdvisorError, Result};

/// Minimum valid samples a training set must carry.
pub const MIN_TRAINING_SAMPLES: usize = 20;

/// Input vector for efficiency prediction and anomaly scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub chw_supply_temp: f64,
    pub chw_return_temp: f64,
    pub chw_flow_rate: f64,
    pub ambient_temp: f64,
    pub cooling_load_kw: f64,
}

impl FeatureVector {
    /// Extract features from an evaluated record. Invalid records carry no
    /// usable target and are excluded.
    pub fn from_record(reading: &SensorReading, metrics: &DerivedMetrics) -> Option<Self> {
        if !metrics.valid {
            return None;
        }
        Some(Self {
            chw_supply_temp: reading.chw_supply_temp,
            chw_return_temp: reading.chw_return_temp,
            chw_flow_rate: reading.chw_flow_rate,
            ambient_temp: reading.ambient_temp,
            cooling_load_kw: metrics.cooling_load_kw?,
        })
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.chw_supply_temp,
            self.chw_return_temp,
            self.chw_flow_rate,
            self.ambient_temp,
            self.cooling_load_kw,
        ]
    }
}

/// Feature matrix with its kW/TR targets, ready to hand to a model trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f64>,
}

/// Build a training set from evaluated records, skipping invalid ones.
/// Fails when fewer than [`MIN_TRAINING_SAMPLES`] usable samples remain.
pub fn training_set<'a, I>(records: I) -> Result<TrainingSet>
where
    I: IntoIterator<Item = (&'a SensorReading, &'a DerivedMetrics)>,
{
    let mut features = Vec::new();
    let mut targets = Vec::new();
    for (reading, metrics) in records {
        let (Some(vector), Some(kw_per_tr)) = (
            FeatureVector::from_record(reading, metrics),
            metrics.chiller_kw_per_tr,
        ) else {
            continue;
        };
        features.push(vector);
        targets.push(kw_per_tr);
    }

    if features.len() < MIN_TRAINING_SAMPLES {
        return Err(AdvisorError::InsufficientTrainingData {
            available: features.len(),
            required: MIN_TRAINING_SAMPLES,
        });
    }
    Ok(TrainingSet { features, targets })
}
