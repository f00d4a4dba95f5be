//! Error types shared across the crate.

use thiserror::Error;

/// Failures raised by the preprocessing transformers.
///
/// Configuration errors surface from constructors, shape errors from
/// `transform`. Neither is ever swallowed inside a transformer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessError {
    /// A transformer was configured with a value it cannot work with.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The input array does not satisfy the transformer's shape contract.
    #[error("shape mismatch in {step}: {reason}")]
    ShapeMismatch { step: &'static str, reason: String },
}

impl PreprocessError {
    pub(crate) fn shape(step: &'static str, reason: impl Into<String>) -> Self {
        PreprocessError::ShapeMismatch { step, reason: reason.into() }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        PreprocessError::InvalidConfiguration(reason.into())
    }
}

/// Failures raised while loading a model artifact or running a prediction.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("input width mismatch: model expects {expected} features, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("record is missing feature '{0}'")]
    MissingFeature(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Failures raised by an inference entrypoint.
#[derive(Error, Debug)]
pub enum EntrypointError {
    /// The payload does not have the shape the entrypoint expects.
    #[error("invalid payload: {0}")]
    Payload(String),

    /// The payload was well-formed but its content cannot be processed.
    #[error("input rejected: {0}")]
    Rejected(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
}

impl EntrypointError {
    pub(crate) fn payload(reason: impl Into<String>) -> Self {
        EntrypointError::Payload(reason.into())
    }
}

/// Failures raised while loading the service configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("either a config file or an entrypoint is required")]
    MissingEntrypoint,
}

/// Failures raised while reading sensor readings from CSV.
#[derive(Error, Debug)]
pub enum ReadingsError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: '{value}' is not a valid number")]
    NotANumber { row: usize, value: String },

    #[error("row {row}: expected {expected} columns, got {actual}")]
    Ragged { row: usize, expected: usize, actual: usize },

    #[error("CSV contains no data rows")]
    Empty,
}
