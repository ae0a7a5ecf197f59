//! SaRcoN Core - Soft-tissue Sarcoma Reconstruction Nomogram
//!
//! Predicts five postoperative complication risks for limb-sparing
//! extremity soft-tissue sarcoma surgery from nine clinical inputs:
//!
//! - **Observation**: the form inputs and their boundary validation
//! - **Schema**: per-outcome feature layouts, pinned per revision
//! - **Encoder**: observation → numeric vector for one outcome
//! - **Model**: the classifier seam and the JSON artifact format
//! - **Registry**: the five loaded classifiers, built once at startup
//! - **Predict**: per-outcome typed results aggregated into a report
//! - **Config**: TOML and environment configuration
//!
//! # Example
//!
//! ```
//! use sarcon_core::{ClinicalObservation, Dimensions, FeatureEncoder, LadderStage, Location};
//! use sarcon_core::{Radiotherapy, RevisionId};
//!
//! let obs = ClinicalObservation::new(
//!     Location::Hand,
//!     LadderStage::LocalFlap,
//!     24.5,
//!     Dimensions {
//!         tumor_length: 3.0,
//!         tumor_width: 2.0,
//!         tumor_thickness: 1.5,
//!         limb_segment_length: 10.0,
//!         limb_segment_thickness: 4.0,
//!     },
//!     Radiotherapy::No,
//! )
//! .unwrap();
//!
//! let encoder = FeatureEncoder::new(RevisionId::V2Ordinal);
//! assert_eq!(
//!     encoder.encode(&obs, "minor").unwrap(),
//!     vec![3.0, 2.0, 24.5, 1.5, 2.0, 3.0, 0.0]
//! );
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod model;
pub mod observation;
pub mod predict;
pub mod registry;
pub mod schema;

pub use config::SarconConfig;
pub use encoder::FeatureEncoder;
pub use error::{
    ConfigError, InferenceError, InputError, ModelLoadError, Result, SarconError, SchemaError,
};
pub use model::{Classifier, LogisticModel, ModelArtifact, ModelSpec, TreeEnsemble};
pub use observation::{
    ClinicalObservation, Dimensions, LadderStage, Location, ObservationInput, Radiotherapy,
};
pub use predict::{predict_all, predict_named, predict_outcome, PredictionError, RiskPrediction, RiskReport};
pub use registry::{ModelRegistry, ModelSource};
pub use schema::{Encoding, FeatureSpec, Field, LocationLevels, Outcome, OutcomeSchema, RevisionId, SchemaRevision};
