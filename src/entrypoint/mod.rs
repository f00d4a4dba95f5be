//! Inference-server entrypoints.
//!
//! An entrypoint receives a JSON payload and returns a JSON result. Failures
//! are typed; [`process_or_none`] turns them into a logged `None` for callers
//! that speak the null-sentinel convention.

pub mod board_inspection;
pub mod soft_sensor;
pub mod state_identifier;
pub mod vision_classifier;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::EntrypointError;
use crate::model::ModelArtifact;

pub use board_inspection::BoardInspection;
pub use soft_sensor::SoftSensor;
pub use state_identifier::StateIdentifier;
pub use vision_classifier::VisionClassifier;

pub trait Entrypoint: Send + Sync {
    fn name(&self) -> &'static str;

    fn process_input(&self, payload: &Value) -> Result<Value, EntrypointError>;

    /// Applies runtime parameters pushed by the server. Entrypoints without
    /// tunable parameters accept and ignore them.
    fn update_parameters(&mut self, params: &Value) -> Result<(), EntrypointError> {
        debug!(entrypoint = self.name(), ?params, "no tunable parameters, ignoring");
        Ok(())
    }
}

/// Runs the entrypoint, logging any failure and mapping it to `None`.
pub fn process_or_none(entrypoint: &dyn Entrypoint, payload: &Value) -> Option<Value> {
    match entrypoint.process_input(payload) {
        Ok(result) => Some(result),
        Err(e) => {
            error!(entrypoint = entrypoint.name(), "exception when processing input: {}", e);
            None
        }
    }
}

/// The entrypoints this crate can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum EntrypointKind {
    StateIdentifier,
    BatchStateIdentifier,
    SoftSensor,
    BoardInspection,
    VisionClassifier,
}

impl EntrypointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrypointKind::StateIdentifier => "state_identifier",
            EntrypointKind::BatchStateIdentifier => "batch_state_identifier",
            EntrypointKind::SoftSensor => "soft_sensor",
            EntrypointKind::BoardInspection => "board_inspection",
            EntrypointKind::VisionClassifier => "vision_classifier",
        }
    }

    pub fn needs_model(&self) -> bool {
        !matches!(self, EntrypointKind::BoardInspection)
    }
}

impl fmt::Display for EntrypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntrypointKind {
    type Err = EntrypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_owned()))
            .map_err(|_| EntrypointError::payload(format!("unknown entrypoint '{}'", s)))
    }
}

/// Loads the model (if the entrypoint needs one) and builds an owned
/// entrypoint around it.
pub fn load_entrypoint(
    kind: EntrypointKind,
    model_path: Option<&Path>,
) -> Result<Box<dyn Entrypoint>, EntrypointError> {
    if !kind.needs_model() {
        return Ok(Box::new(BoardInspection::default()));
    }
    let path = model_path.ok_or_else(|| {
        EntrypointError::payload(format!("entrypoint '{}' requires a model path", kind))
    })?;
    let artifact = ModelArtifact::load_json(path)?;

    Ok(match kind {
        EntrypointKind::StateIdentifier => {
            Box::new(StateIdentifier::new(artifact.into_predictor()?, false))
        }
        EntrypointKind::BatchStateIdentifier => {
            Box::new(StateIdentifier::new(artifact.into_predictor()?, true))
        }
        EntrypointKind::SoftSensor => Box::new(SoftSensor::new(artifact.into_linear_regression()?)),
        EntrypointKind::VisionClassifier => {
            Box::new(VisionClassifier::new(artifact.into_network()?)?)
        }
        EntrypointKind::BoardInspection => Box::new(BoardInspection::default()),
    })
}

/// Reads a numeric field. A null reading maps to `NaN`; an absent one is an
/// error.
pub(crate) fn reading(record: &Value, key: &str) -> Result<f64, EntrypointError> {
    match record.get(key) {
        Some(Value::Null) => Ok(f64::NAN),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| EntrypointError::payload(format!("'{}' is not a number: {}", key, v))),
        None => Err(EntrypointError::payload(format!("record is missing '{}'", key))),
    }
}
