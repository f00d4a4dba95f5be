use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ModelError;
use crate::model::linear::LinearRegression;
use crate::model::network::Network;
use crate::model::predictor::{PipelinePredictor, Predictor};
use crate::preprocessing::PipelineSpec;

/// A saved model, tagged by `kind` in JSON.
///
/// Loading an artifact is the one explicit initialization step: the caller
/// owns the resulting handle and passes it to whatever processes payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Network(Network),
    LinearRegression(LinearRegression),
    /// Preprocessing steps followed by a nested estimator.
    Pipeline {
        preprocessing: PipelineSpec,
        estimator: Box<ModelArtifact>,
    },
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Network(_) => "network",
            ModelArtifact::LinearRegression(_) => "linear_regression",
            ModelArtifact::Pipeline { .. } => "pipeline",
        }
    }

    /// Structural checks that serde cannot express: layer chaining, label
    /// counts, coefficient counts and preprocessing configuration.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::Network(n) => n.validate(),
            ModelArtifact::LinearRegression(m) => m.validate(),
            ModelArtifact::Pipeline { preprocessing, estimator } => {
                preprocessing.build()?;
                estimator.validate()
            }
        }
    }

    /// Reads and validates an artifact from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<ModelArtifact, ModelError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        artifact.validate()?;
        info!(path = %path.display(), kind = artifact.kind(), "model loaded");
        Ok(artifact)
    }

    /// Serializes the artifact to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Turns the artifact into an owned predictor handle.
    pub fn into_predictor(self) -> Result<Box<dyn Predictor>, ModelError> {
        Ok(match self {
            ModelArtifact::Network(n) => {
                n.validate()?;
                Box::new(n)
            }
            ModelArtifact::LinearRegression(m) => {
                m.validate()?;
                Box::new(m)
            }
            ModelArtifact::Pipeline { preprocessing, estimator } => {
                let pipeline = preprocessing.build()?;
                Box::new(PipelinePredictor::new(pipeline, estimator.into_predictor()?))
            }
        })
    }

    pub fn into_network(self) -> Result<Network, ModelError> {
        match self {
            ModelArtifact::Network(n) => Ok(n),
            other => Err(ModelError::InvalidModel(format!(
                "expected a network, found {}",
                other.kind()
            ))),
        }
    }

    pub fn into_linear_regression(self) -> Result<LinearRegression, ModelError> {
        match self {
            ModelArtifact::LinearRegression(m) => Ok(m),
            other => Err(ModelError::InvalidModel(format!(
                "expected a linear_regression, found {}",
                other.kind()
            ))),
        }
    }

    /// One line per component, used by the `inspect` command.
    pub fn summary(&self) -> Vec<String> {
        match self {
            ModelArtifact::Network(n) => {
                let mut lines = vec![format!(
                    "network: {} layers, {} inputs -> {} outputs",
                    n.layers.len(),
                    n.input_size(),
                    n.output_size()
                )];
                for (i, layer) in n.layers.iter().enumerate() {
                    lines.push(format!(
                        "  layer {}: {} -> {} ({:?})",
                        i,
                        layer.input_size(),
                        layer.size(),
                        layer.activation
                    ));
                }
                if let Some(labels) = n.output_labels() {
                    lines.push(format!("  labels: {}", labels.join(", ")));
                }
                lines
            }
            ModelArtifact::LinearRegression(m) => vec![format!(
                "linear_regression: features [{}], intercept {}",
                m.feature_names.join(", "),
                m.intercept
            )],
            ModelArtifact::Pipeline { preprocessing, estimator } => {
                let steps: Vec<String> = preprocessing
                    .steps
                    .iter()
                    .map(|s| serde_json::to_string(s).unwrap_or_default())
                    .collect();
                let mut lines = vec![format!("pipeline: {} steps", steps.len())];
                lines.extend(steps.into_iter().map(|s| format!("  {}", s)));
                lines.extend(estimator.summary());
                lines
            }
        }
    }
}
