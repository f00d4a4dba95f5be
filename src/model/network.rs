use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::math::samples::Samples;
use crate::model::layer::DenseLayer;
use crate::model::metadata::ModelMetadata;
use crate::model::predictor::{Prediction, Predictor};

/// Winning class of a classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub index: usize,
    pub probability: f64,
    pub label: String,
}

/// A pretrained feed-forward network, inference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<DenseLayer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Network, ModelError> {
        let network = Network { layers, metadata: None };
        network.validate()?;
        Ok(network)
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Checks that every layer is consistent and feeds the next one.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidModel("network has no layers".into()));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size() != pair[1].input_size() {
                return Err(ModelError::InvalidModel(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].size(),
                    i + 1,
                    pair[1].input_size()
                )));
            }
        }
        if let Some(labels) = self.output_labels() {
            if labels.len() != self.output_size() {
                return Err(ModelError::InvalidModel(format!(
                    "{} output labels for {} outputs",
                    labels.len(),
                    self.output_size()
                )));
            }
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::size)
    }

    pub fn output_labels(&self) -> Option<&[String]> {
        self.metadata.as_ref().and_then(|m| m.output_labels.as_deref())
    }

    /// Label for output `index`, falling back to the index itself.
    pub fn label_for(&self, index: usize) -> String {
        self.output_labels()
            .and_then(|labels| labels.get(index))
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }

    pub fn forward(&self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if input.len() != self.input_size() {
            return Err(ModelError::InputWidth {
                expected: self.input_size(),
                actual: input.len(),
            });
        }
        let mut current = input.to_owned();
        for layer in &self.layers {
            current = layer.forward(current.view());
        }
        Ok(current)
    }

    /// Runs one input and returns the most probable class.
    pub fn classify(&self, input: ArrayView1<'_, f64>) -> Result<Classification, ModelError> {
        let output = self.forward(input)?;
        let index = argmax(output.view());
        Ok(Classification {
            index,
            probability: output[index],
            label: self.label_for(index),
        })
    }
}

impl Predictor for Network {
    fn predict(&self, input: &Samples) -> Result<Vec<Prediction>, ModelError> {
        let features = input.as_single("network")?;
        features
            .rows()
            .into_iter()
            .map(|row| {
                let output = self.forward(row)?;
                Ok(if output.len() == 1 {
                    Prediction::Value(output[0])
                } else {
                    Prediction::Label(self.label_for(argmax(output.view())))
                })
            })
            .collect()
    }
}

/// Index of the maximum element.
fn argmax(v: ArrayView1<'_, f64>) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
