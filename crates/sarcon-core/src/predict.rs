//! Prediction entry point
//!
//! Encodes one observation for each outcome and asks that outcome's
//! classifier for a probability. Every outcome gets its own typed result;
//! one failed outcome never hides the others.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use thiserror::Error;

use crate::error::{InferenceError, SchemaError};
use crate::observation::ClinicalObservation;
use crate::registry::ModelRegistry;
use crate::schema::{Outcome, RevisionId};

/// Probability of one complication for one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPrediction {
    pub outcome: Outcome,
    /// Positive-class probability in [0, 1]
    pub probability: f64,
    /// Probability as a percentage, rounded to two decimals
    pub percent: f64,
}

impl RiskPrediction {
    pub fn new(outcome: Outcome, probability: f64) -> Self {
        Self {
            outcome,
            probability,
            percent: (probability * 10_000.0).round() / 100.0,
        }
    }

    /// Progress-bar value, always within [0, 100].
    pub fn progress(&self) -> f64 {
        self.percent.clamp(0.0, 100.0)
    }

    /// One-line summary in the form `Minor Risk: 12.5%`.
    pub fn summary(&self) -> String {
        format!("{} Risk: {}%", self.outcome.label(), self.percent)
    }
}

/// Why one outcome could not be predicted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("No model loaded for {0}")]
    ModelUnavailable(Outcome),
}

impl PredictionError {
    /// Short machine-readable kind for JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema_mismatch",
            Self::Inference(_) => "inference_error",
            Self::ModelUnavailable(_) => "model_unavailable",
        }
    }
}

/// Result of predicting every outcome for one observation.
#[derive(Debug, Clone)]
pub struct RiskReport {
    pub revision: RevisionId,
    pub generated_at: DateTime<Utc>,
    pub results: BTreeMap<Outcome, Result<RiskPrediction, PredictionError>>,
}

impl RiskReport {
    pub fn get(&self, outcome: Outcome) -> Option<&Result<RiskPrediction, PredictionError>> {
        self.results.get(&outcome)
    }

    /// Successful predictions in report order.
    pub fn predictions(&self) -> impl Iterator<Item = &RiskPrediction> {
        self.results.values().filter_map(|r| r.as_ref().ok())
    }

    /// Failed outcomes with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (Outcome, &PredictionError)> {
        self.results
            .iter()
            .filter_map(|(o, r)| r.as_ref().err().map(|e| (*o, e)))
    }

    pub fn is_complete(&self) -> bool {
        self.results.values().all(|r| r.is_ok())
    }
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    outcome: Outcome,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorView<'a>>,
}

#[derive(Serialize)]
struct ErrorView<'a> {
    kind: &'a str,
    message: String,
}

impl Serialize for RiskReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let outcomes: Vec<OutcomeView<'_>> = self
            .results
            .iter()
            .map(|(outcome, result)| match result {
                Ok(p) => OutcomeView {
                    outcome: *outcome,
                    label: outcome.label(),
                    probability: Some(p.probability),
                    percent: Some(p.percent),
                    error: None,
                },
                Err(e) => OutcomeView {
                    outcome: *outcome,
                    label: outcome.label(),
                    probability: None,
                    percent: None,
                    error: Some(ErrorView {
                        kind: e.kind(),
                        message: e.to_string(),
                    }),
                },
            })
            .collect();

        let mut state = serializer.serialize_struct("RiskReport", 3)?;
        state.serialize_field("revision", &self.revision)?;
        state.serialize_field("generated_at", &self.generated_at.to_rfc3339())?;
        state.serialize_field("outcomes", &outcomes)?;
        state.end()
    }
}

/// Predict one outcome.
pub fn predict_outcome(
    registry: &ModelRegistry,
    observation: &ClinicalObservation,
    outcome: Outcome,
) -> Result<RiskPrediction, PredictionError> {
    let classifier = registry
        .get(outcome)
        .ok_or(PredictionError::ModelUnavailable(outcome))?;
    let features = registry.encoder().encode_outcome(observation, outcome)?;
    let probability = classifier.predict_probability(&features)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(InferenceError::ProbabilityOutOfRange(probability).into());
    }
    Ok(RiskPrediction::new(outcome, probability))
}

/// Predict one outcome given by name.
///
/// An unrecognized name is a [`SchemaError::SchemaMismatch`].
pub fn predict_named(
    registry: &ModelRegistry,
    observation: &ClinicalObservation,
    outcome: &str,
) -> Result<RiskPrediction, PredictionError> {
    let schema = registry.revision().revision().schema_by_name(outcome)?;
    predict_outcome(registry, observation, schema.outcome)
}

/// Predict all five outcomes.
pub fn predict_all(registry: &ModelRegistry, observation: &ClinicalObservation) -> RiskReport {
    let results = Outcome::ALL
        .into_iter()
        .map(|outcome| {
            let result = predict_outcome(registry, observation, outcome);
            if let Err(e) = &result {
                tracing::warn!("Prediction failed for {}: {}", outcome, e);
            }
            (outcome, result)
        })
        .collect();

    RiskReport {
        revision: registry.revision(),
        generated_at: Utc::now(),
        results,
    }
}
