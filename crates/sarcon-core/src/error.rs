//! Error types for sarcon-core

use thiserror::Error;

/// Result type alias for sarcon operations
pub type Result<T> = std::result::Result<T, SarconError>;

/// Main error type for sarcon operations
#[derive(Error, Debug)]
pub enum SarconError {
    /// Schema lookup or shape errors
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Out-of-range or unparseable form input
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    /// Classifier rejected the vector or failed internally
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Model artifact could not be loaded
    #[error("Model load error: {0}")]
    ModelLoad(#[from] ModelLoadError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Schema-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Outcome name or feature layout does not match any pinned schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Artifact or request names a revision we do not ship
    #[error("Unknown schema revision: {0}")]
    UnknownRevision(String),

    /// Artifact width differs from the pinned schema width
    #[error("Schema width mismatch for {outcome}: schema has {expected} features, artifact has {actual}")]
    WidthMismatch {
        outcome: String,
        expected: usize,
        actual: usize,
    },
}

/// Input validation errors (InvalidInput)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// Numeric value outside its accepted range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Length or thickness below zero
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// NaN or infinite numeric value
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// Numeric field that does not parse as a number
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    /// Categorical value not in the option list
    #[error("Unknown {field} option: {value}")]
    UnknownOption { field: &'static str, value: String },
}

/// Classifier invocation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Vector length differs from what the model was trained on
    #[error("Expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Input or output contains NaN or infinity
    #[error("Non-finite value in {0}")]
    NonFinite(String),

    /// Model returned something that is not a probability
    #[error("Probability out of range: {0}")]
    ProbabilityOutOfRange(f64),

    /// Any other failure raised by the model
    #[error("Model failure: {0}")]
    Model(String),
}

/// Model artifact load errors
#[derive(Error, Debug)]
pub enum ModelLoadError {
    /// IO error reading the artifact
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    /// Artifact is not valid JSON for a known model kind
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// Artifact is well-formed but contradicts the pinned schema
    #[error("Schema error in {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },

    /// Artifact is internally inconsistent (e.g. broken tree links)
    #[error("Invalid model in {path}: {message}")]
    Invalid { path: String, message: String },

    /// Required artifact file is absent
    #[error("Missing model artifact: {0}")]
    Missing(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("IO error: {0}")]
    Io(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(String),

    /// Value is out of valid range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}
