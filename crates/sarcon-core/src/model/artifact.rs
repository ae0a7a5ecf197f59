//! Model artifact format
//!
//! Artifacts are JSON documents, one per outcome:
//!
//! ```json
//! {
//!   "outcome": "minor",
//!   "revision": "v2-ordinal",
//!   "feature_names": ["ladder", "location", "bmi", "tt", "tw", "tl", "nart"],
//!   "model": {
//!     "kind": "logistic",
//!     "intercept": -2.4,
//!     "coefficients": [0.31, 0.05, 0.04, 0.12, 0.08, 0.06, 0.7]
//!   }
//! }
//! ```
//!
//! `feature_names` is optional. When present it must equal the pinned
//! schema's expanded names, which catches artifacts exported with a
//! different column order than the label claims.
//!
//! Tree ensembles use `"kind": "tree_ensemble"` with `n_features` and a list
//! of `trees`, each a flat node list rooted at index 0:
//!
//! ```json
//! { "split": { "feature": 2, "threshold": 30.0, "left": 1, "right": 2 } }
//! { "leaf": { "probability": 0.18 } }
//! ```
//!
//! A sample goes left when `x[feature] <= threshold`. Child indices must be
//! greater than their parent's.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{check_features, check_probability, Classifier};
use crate::error::{InferenceError, ModelLoadError, SchemaError};
use crate::schema::{Outcome, RevisionId};

/// A model artifact as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub outcome: Outcome,
    pub revision: RevisionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub model: ModelSpec,
}

/// Supported model families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    /// Parse an artifact from JSON text.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, ModelLoadError> {
        serde_json::from_str(json).map_err(|e| ModelLoadError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse an artifact file.
    pub fn from_path(path: &Path) -> Result<Self, ModelLoadError> {
        let origin = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| ModelLoadError::Io {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_json(&json, &origin)
    }

    pub fn n_features(&self) -> usize {
        match &self.model {
            ModelSpec::Logistic(m) => m.coefficients.len(),
            ModelSpec::TreeEnsemble(m) => m.n_features,
        }
    }

    /// Check the artifact against the revision it names.
    pub fn check_schema(&self) -> Result<(), SchemaError> {
        let revision = self.revision.revision();
        let expected = revision.width(self.outcome);
        let actual = self.n_features();
        if expected != actual {
            return Err(SchemaError::WidthMismatch {
                outcome: self.outcome.to_string(),
                expected,
                actual,
            });
        }

        if let Some(names) = &self.feature_names {
            let pinned = revision.feature_names(self.outcome);
            if *names != pinned {
                return Err(SchemaError::SchemaMismatch(format!(
                    "{} artifact feature names {:?} differ from {} schema {:?}",
                    self.outcome, names, self.revision, pinned
                )));
            }
        }
        Ok(())
    }

    /// Validate internal structure and build the classifier.
    pub fn into_classifier(self, origin: &str) -> Result<Box<dyn Classifier>, ModelLoadError> {
        let invalid = |message: String| ModelLoadError::Invalid {
            path: origin.to_string(),
            message,
        };
        match self.model {
            ModelSpec::Logistic(m) => {
                m.validate().map_err(invalid)?;
                Ok(Box::new(m))
            }
            ModelSpec::TreeEnsemble(m) => {
                m.validate().map_err(invalid)?;
                Ok(Box::new(m))
            }
        }
    }
}

/// Logistic regression: p = 1 / (1 + exp(-(intercept + w·x)))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LogisticModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("logistic model has no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("logistic model has non-finite parameters".to_string());
        }
        Ok(())
    }
}

impl Classifier for LogisticModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_features(self.coefficients.len(), features)?;
        let z: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        check_probability(1.0 / (1.0 + (-z).exp()))
    }

    fn kind(&self) -> &str {
        "logistic"
    }
}

/// Averaged ensemble of binary threshold trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub trees: Vec<Vec<TreeNode>>,
}

/// A tree node in a flat node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("tree ensemble has no trees".to_string());
        }
        for (t, nodes) in self.trees.iter().enumerate() {
            if nodes.is_empty() {
                return Err(format!("tree {} is empty", t));
            }
            for (i, node) in nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.n_features {
                            return Err(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, i, feature, self.n_features
                            ));
                        }
                        if !threshold.is_finite() {
                            return Err(format!("tree {} node {} has non-finite threshold", t, i));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= nodes.len() {
                                return Err(format!(
                                    "tree {} node {} has invalid child {}",
                                    t, i, child
                                ));
                            }
                        }
                    }
                    TreeNode::Leaf { probability } => {
                        if !(0.0..=1.0).contains(probability) {
                            return Err(format!(
                                "tree {} leaf {} has probability {}",
                                t, i, probability
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_tree(nodes: &[TreeNode], features: &[f64]) -> Result<f64, InferenceError> {
        let mut index = 0;
        for _ in 0..=nodes.len() {
            match nodes.get(index) {
                Some(TreeNode::Leaf { probability }) => return Ok(*probability),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or_else(|| {
                        InferenceError::Model(format!("split on missing feature {}", feature))
                    })?;
                    index = if *value <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => {
                    return Err(InferenceError::Model(format!(
                        "tree node {} out of range",
                        index
                    )))
                }
            }
        }
        Err(InferenceError::Model("tree walk did not reach a leaf".to_string()))
    }
}

impl Classifier for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_features(self.n_features, features)?;
        let mut total = 0.0;
        for tree in &self.trees {
            total += Self::predict_tree(tree, features)?;
        }
        check_probability(total / self.trees.len() as f64)
    }

    fn kind(&self) -> &str {
        "tree_ensemble"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGISTIC: &str = r#"{
        "outcome": "seroma",
        "revision": "v2-ordinal",
        "feature_names": ["ladder", "location", "bmi", "tl", "tw"],
        "model": {
            "kind": "logistic",
            "intercept": 0.0,
            "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0]
        }
    }"#;

    #[test]
    fn test_parse_logistic() {
        let artifact = ModelArtifact::from_json(LOGISTIC, "seroma.json").unwrap();
        assert_eq!(artifact.outcome, Outcome::Seroma);
        assert_eq!(artifact.revision, RevisionId::V2Ordinal);
        assert!(artifact.check_schema().is_ok());

        let model = artifact.into_classifier("seroma.json").unwrap();
        assert_eq!(model.kind(), "logistic");
        let p = model.predict_probability(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_probability() {
        let model = LogisticModel::new(-1.0, vec![0.5, 0.25]);
        let p = model.predict_probability(&[2.0, 4.0]).unwrap();
        // z = -1 + 1 + 1 = 1
        assert!((p - 1.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_shape_mismatch() {
        let model = LogisticModel::new(0.0, vec![1.0; 7]);
        assert_eq!(
            model.predict_probability(&[1.0; 19]),
            Err(InferenceError::ShapeMismatch {
                expected: 7,
                actual: 19
            })
        );
    }

    #[test]
    fn test_width_mismatch() {
        let json = LOGISTIC.replace(
            r#""feature_names": ["ladder", "location", "bmi", "tl", "tw"],"#,
            "",
        );
        let json = json.replace(
            "[0.0, 0.0, 0.0, 0.0, 0.0]",
            "[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]",
        );
        let artifact = ModelArtifact::from_json(&json, "seroma.json").unwrap();
        assert_eq!(
            artifact.check_schema(),
            Err(SchemaError::WidthMismatch {
                outcome: "seroma".to_string(),
                expected: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_feature_name_order_mismatch() {
        let json = LOGISTIC.replace(
            r#"["ladder", "location", "bmi", "tl", "tw"]"#,
            r#"["ladder", "bmi", "location", "tl", "tw"]"#,
        );
        let artifact = ModelArtifact::from_json(&json, "seroma.json").unwrap();
        assert!(matches!(
            artifact.check_schema(),
            Err(SchemaError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let json = LOGISTIC.replace("\"logistic\"", "\"svm\"");
        assert!(matches!(
            ModelArtifact::from_json(&json, "seroma.json"),
            Err(ModelLoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_tree_ensemble() {
        let json = r#"{
            "outcome": "implant-device",
            "revision": "v3-ordinal",
            "model": {
                "kind": "tree_ensemble",
                "n_features": 5,
                "trees": [
                    [
                        { "split": { "feature": 0, "threshold": 5.0, "left": 1, "right": 2 } },
                        { "leaf": { "probability": 0.1 } },
                        { "leaf": { "probability": 0.5 } }
                    ],
                    [
                        { "leaf": { "probability": 0.3 } }
                    ]
                ]
            }
        }"#;
        let artifact = ModelArtifact::from_json(json, "id.json").unwrap();
        assert!(artifact.check_schema().is_ok());
        let model = artifact.into_classifier("id.json").unwrap();

        let thin = model.predict_probability(&[4.0, 3.0, 3.0, 0.0, 3.0]).unwrap();
        assert!((thin - 0.2).abs() < 1e-12);
        let thick = model.predict_probability(&[8.0, 3.0, 3.0, 0.0, 3.0]).unwrap();
        assert!((thick - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_tree_backward_link_rejected() {
        let ensemble = TreeEnsemble {
            n_features: 1,
            trees: vec![vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 1,
                },
                TreeNode::Leaf { probability: 0.5 },
            ]],
        };
        let artifact = ModelArtifact {
            outcome: Outcome::Minor,
            revision: RevisionId::V2Ordinal,
            feature_names: None,
            model: ModelSpec::TreeEnsemble(ensemble),
        };
        assert!(matches!(
            artifact.into_classifier("minor.json"),
            Err(ModelLoadError::Invalid { .. })
        ));
    }
}
