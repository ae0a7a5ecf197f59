//! Classifier seam
//!
//! The prediction path only ever sees a [`Classifier`]: a trained binary
//! model that maps one feature vector to the probability of the positive
//! class. Artifacts on disk are turned into classifiers by [`artifact`].

pub mod artifact;

pub use artifact::{LogisticModel, ModelArtifact, ModelSpec, TreeEnsemble, TreeNode};

use crate::error::InferenceError;

/// A trained binary classifier.
pub trait Classifier: Send + Sync {
    /// Number of features the model was trained on
    fn n_features(&self) -> usize;

    /// Probability of the positive class for one feature vector
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Short identifier of the model family
    fn kind(&self) -> &str;
}

/// Reject vectors of the wrong length or with non-finite entries.
pub fn check_features(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: features.len(),
        });
    }
    if let Some(pos) = features.iter().position(|x| !x.is_finite()) {
        return Err(InferenceError::NonFinite(format!("feature {}", pos)));
    }
    Ok(())
}

/// Reject model outputs that are not probabilities.
pub fn check_probability(p: f64) -> Result<f64, InferenceError> {
    if !p.is_finite() {
        return Err(InferenceError::NonFinite("model output".to_string()));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(InferenceError::ProbabilityOutOfRange(p));
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_features() {
        assert!(check_features(3, &[1.0, 2.0, 3.0]).is_ok());
        assert_eq!(
            check_features(3, &[1.0, 2.0]),
            Err(InferenceError::ShapeMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(
            check_features(2, &[1.0, f64::INFINITY]),
            Err(InferenceError::NonFinite(_))
        ));
    }

    #[test]
    fn test_check_probability() {
        assert_eq!(check_probability(0.0), Ok(0.0));
        assert_eq!(check_probability(1.0), Ok(1.0));
        assert_eq!(
            check_probability(1.2),
            Err(InferenceError::ProbabilityOutOfRange(1.2))
        );
        assert!(check_probability(f64::NAN).is_err());
    }
}
