use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::activation::ActivationFunction;

/// A fully connected layer: `activation(x · W + b)`.
///
/// `weights` is `(input_size, size)`, `biases` has length `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
    pub activation: ActivationFunction,
}

impl DenseLayer {
    pub fn from_parts(
        weights: Array2<f64>,
        biases: Array1<f64>,
        activation: ActivationFunction,
    ) -> Result<DenseLayer, ModelError> {
        let layer = DenseLayer { weights, biases, activation };
        layer.validate()?;
        Ok(layer)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.biases.len() != self.weights.ncols() {
            return Err(ModelError::InvalidModel(format!(
                "layer has {} biases for {} neurons",
                self.biases.len(),
                self.weights.ncols()
            )));
        }
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn forward(&self, input: ArrayView1<'_, f64>) -> Array1<f64> {
        self.activation.apply(input.dot(&self.weights) + &self.biases)
    }
}
