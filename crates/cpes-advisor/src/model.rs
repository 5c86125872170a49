//! ---
//! cpes_section: "04-advisory"
//! cpes_subsection: "module"
//! cpes_type: "source"
//! cpes_scope: "code"
//! cpes_description: "Efficiency model trait boundary with graceful degradation."
//! cpes_version: "v0.0.0-prealpha"
//! cpes_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{AdvisorError, Result};
use crate::features::FeatureVector;

/// Anomaly verdict from a model: whether the operating point looks unusual
/// and how strongly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub is_anomaly: bool,
    pub score: f64,
}

/// Boundary to an externally trained efficiency model.
///
/// Implementations live outside this workspace; the advisory pipeline only
/// consumes predictions and must keep working when none is available.
pub trait EfficiencyModel: Send + Sync {
    /// Predict chiller kW/TR for the given operating point.
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Score the operating point for anomaly.
    fn anomaly_score(&self, features: &FeatureVector) -> Result<AnomalyVerdict>;
}

/// Stand-in used when no model has been wired up. Every call reports the
/// model unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopModel;

impl EfficiencyModel for NoopModel {
    fn predict(&self, _features: &FeatureVector) -> Result<f64> {
        Err(AdvisorError::ModelUnavailable)
    }

    fn anomaly_score(&self, _features: &FeatureVector) -> Result<AnomalyVerdict> {
        Err(AdvisorError::ModelUnavailable)
    }
}

/// Model output attached to an advisory response. `degraded` marks that the
/// model could not be consulted; formula-based advice is unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelInsights {
    pub predicted_kw_per_tr: Option<f64>,
    pub anomaly: Option<AnomalyVerdict>,
    pub degraded: bool,
}

/// Consult the model, downgrading any failure to an absent insight.
pub fn model_insights(model: &dyn EfficiencyModel, features: &FeatureVector) -> ModelInsights {
    let predicted = match model.predict(features) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, "efficiency model prediction unavailable");
            None
        }
    };
    let anomaly = match model.anomaly_score(features) {
        Ok(verdict) => Some(verdict),
        Err(err) => {
            warn!(error = %err, "efficiency model anomaly scoring unavailable");
            None
        }
    };
    ModelInsights {
        predicted_kw_per_tr: predicted,
        anomaly,
        degraded: predicted.is_none() || anomaly.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel;

    impl EfficiencyModel for FixedModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64> {
            Ok(0.62)
        }

        fn anomaly_score(&self, _features: &FeatureVector) -> Result<AnomalyVerdict> {
            Ok(AnomalyVerdict {
                is_anomaly: false,
                score: 0.12,
            })
        }
    }

    fn features() -> FeatureVector {
        FeatureVector {
            chw_supply_temp: 7.0,
            chw_return_temp: 12.0,
            chw_flow_rate: 50.0,
            ambient_temp: 32.0,
            cooling_load_kw: 1046.5,
        }
    }

    #[test]
    fn noop_model_degrades_without_failing() {
        let insights = model_insights(&NoopModel, &features());
        assert!(insights.degraded);
        assert_eq!(insights.predicted_kw_per_tr, None);
        assert_eq!(insights.anomaly, None);
    }

    #[test]
    fn working_model_reports_full_insights() {
        let insights = model_insights(&FixedModel, &features());
        assert!(!insights.degraded);
        assert_eq!(insights.predicted_kw_per_tr, Some(0.62));
        assert!(!insights.anomaly.unwrap().is_anomaly);
    }
}
