//! Model registry
//!
//! Holds the five loaded classifiers for one schema revision. Built once at
//! startup and handed to the prediction entry point; nothing here is global.
//!
//! Artifacts are looked up as `{dir}/{stem}.json` with the stems `minor`,
//! `major`, `ssi`, `id` and `seroma`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::encoder::FeatureEncoder;
use crate::error::{ModelLoadError, SchemaError};
use crate::model::{Classifier, ModelArtifact};
use crate::schema::{Outcome, RevisionId};

/// Where a registered model came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Loaded from an artifact file
    Artifact(PathBuf),
    /// Registered in code
    Programmatic,
}

struct RegisteredModel {
    classifier: Box<dyn Classifier>,
    source: ModelSource,
}

/// Loaded classifiers keyed by outcome, all pinned to one revision
pub struct ModelRegistry {
    revision: RevisionId,
    models: BTreeMap<Outcome, RegisteredModel>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new(revision: RevisionId) -> Self {
        Self {
            revision,
            models: BTreeMap::new(),
        }
    }

    /// Load every outcome's artifact from a directory.
    ///
    /// With `require_all` a missing artifact is an error. Otherwise it is
    /// skipped with a warning and the outcome reports as unavailable.
    pub fn load_from_directory(
        dir: &Path,
        revision: RevisionId,
        require_all: bool,
    ) -> Result<Self, ModelLoadError> {
        let mut registry = Self::new(revision);

        for outcome in Outcome::ALL {
            let path = artifact_path(dir, outcome);
            if !path.is_file() {
                if require_all {
                    return Err(ModelLoadError::Missing(path.display().to_string()));
                }
                tracing::warn!("No {} model at {:?}, skipping", outcome, path);
                continue;
            }
            registry.load_artifact(&path)?;
        }

        tracing::info!(
            "Loaded {} of {} models for revision {} from {:?}",
            registry.count(),
            Outcome::ALL.len(),
            revision,
            dir
        );
        Ok(registry)
    }

    /// Load one artifact file and register it under the outcome it declares.
    pub fn load_artifact(&mut self, path: &Path) -> Result<Outcome, ModelLoadError> {
        let origin = path.display().to_string();
        let artifact = ModelArtifact::from_path(path)?;
        let schema_err = |source: SchemaError| ModelLoadError::Schema {
            path: origin.clone(),
            source,
        };

        if artifact.revision != self.revision {
            return Err(schema_err(SchemaError::SchemaMismatch(format!(
                "artifact was trained for {} but the registry is pinned to {}",
                artifact.revision, self.revision
            ))));
        }
        let named = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(Outcome::from_name);
        if let Some(named) = named.filter(|n| *n != artifact.outcome) {
            return Err(schema_err(SchemaError::SchemaMismatch(format!(
                "{} artifact declares outcome {}",
                named, artifact.outcome
            ))));
        }
        artifact.check_schema().map_err(schema_err)?;

        let outcome = artifact.outcome;
        let classifier = artifact.into_classifier(&origin)?;
        tracing::debug!(
            "Loaded {} model ({}, {} features) from {:?}",
            outcome,
            classifier.kind(),
            classifier.n_features(),
            path
        );
        self.insert(outcome, classifier, ModelSource::Artifact(path.to_path_buf()));
        Ok(outcome)
    }

    /// Register a classifier in code.
    ///
    /// The classifier's width must match the pinned schema for the outcome.
    pub fn register(
        &mut self,
        outcome: Outcome,
        classifier: Box<dyn Classifier>,
    ) -> Result<(), SchemaError> {
        let expected = self.revision.revision().width(outcome);
        if classifier.n_features() != expected {
            return Err(SchemaError::WidthMismatch {
                outcome: outcome.to_string(),
                expected,
                actual: classifier.n_features(),
            });
        }
        self.insert(outcome, classifier, ModelSource::Programmatic);
        Ok(())
    }

    fn insert(&mut self, outcome: Outcome, classifier: Box<dyn Classifier>, source: ModelSource) {
        if self.models.contains_key(&outcome) {
            tracing::warn!("Replacing registered {} model", outcome);
        }
        self.models
            .insert(outcome, RegisteredModel { classifier, source });
    }

    /// Get the classifier for an outcome
    pub fn get(&self, outcome: Outcome) -> Option<&dyn Classifier> {
        self.models.get(&outcome).map(|m| m.classifier.as_ref())
    }

    /// Get the source of an outcome's model
    pub fn source(&self, outcome: Outcome) -> Option<&ModelSource> {
        self.models.get(&outcome).map(|m| &m.source)
    }

    pub fn revision(&self) -> RevisionId {
        self.revision
    }

    /// Encoder matching the registry's revision
    pub fn encoder(&self) -> FeatureEncoder {
        FeatureEncoder::new(self.revision)
    }

    /// Outcomes with a loaded model, in report order
    pub fn outcomes(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.models.keys().copied()
    }

    /// Outcomes without a loaded model
    pub fn missing(&self) -> Vec<Outcome> {
        Outcome::ALL
            .into_iter()
            .filter(|o| !self.models.contains_key(o))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.models.len()
    }

    pub fn contains(&self, outcome: Outcome) -> bool {
        self.models.contains_key(&outcome)
    }

    /// Whether all five outcomes have a model
    pub fn is_complete(&self) -> bool {
        self.models.len() == Outcome::ALL.len()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let models: BTreeMap<_, _> = self
            .models
            .iter()
            .map(|(outcome, m)| (outcome.name(), m.classifier.kind()))
            .collect();
        f.debug_struct("ModelRegistry")
            .field("revision", &self.revision)
            .field("models", &models)
            .finish()
    }
}

/// Artifact path for an outcome inside a model directory
pub fn artifact_path(dir: &Path, outcome: Outcome) -> PathBuf {
    dir.join(format!("{}.json", outcome.artifact_stem()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogisticModel;

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::new(RevisionId::V3OneHot);
        assert_eq!(registry.count(), 0);
        assert_eq!(registry.missing().len(), 5);
        assert!(!registry.is_complete());
    }

    #[test]
    fn test_register_checks_width() {
        let mut registry = ModelRegistry::new(RevisionId::V3OneHot);
        let narrow = Box::new(LogisticModel::new(0.0, vec![0.1; 7]));
        assert_eq!(
            registry.register(Outcome::Minor, narrow),
            Err(SchemaError::WidthMismatch {
                outcome: "minor".to_string(),
                expected: 19,
                actual: 7
            })
        );

        let wide = Box::new(LogisticModel::new(0.0, vec![0.1; 19]));
        assert!(registry.register(Outcome::Minor, wide).is_ok());
        assert!(registry.contains(Outcome::Minor));
        assert_eq!(registry.source(Outcome::Minor), Some(&ModelSource::Programmatic));
    }

    #[test]
    fn test_artifact_paths() {
        let dir = Path::new("/models");
        assert_eq!(
            artifact_path(dir, Outcome::ImplantDevice),
            PathBuf::from("/models/id.json")
        );
        assert_eq!(
            artifact_path(dir, Outcome::Ssi),
            PathBuf::from("/models/ssi.json")
        );
    }

    #[test]
    fn test_debug_lists_models() {
        let mut registry = ModelRegistry::new(RevisionId::V2Ordinal);
        registry
            .register(Outcome::Seroma, Box::new(LogisticModel::new(0.0, vec![0.0; 5])))
            .unwrap();
        let debug = format!("{:?}", registry);
        assert!(debug.contains("seroma"));
        assert!(debug.contains("logistic"));
    }
}
