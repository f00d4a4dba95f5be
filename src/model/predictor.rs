use serde::Serialize;

use crate::error::ModelError;
use crate::math::samples::Samples;
use crate::preprocessing::{Pipeline, Transformer};

/// One model output per feature row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prediction {
    /// Class label from a classifier.
    Label(String),
    /// Numeric output from a regressor or single-output network.
    Value(f64),
}

/// Anything that maps input samples to one prediction per feature row.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: &Samples) -> Result<Vec<Prediction>, ModelError>;
}

/// Preprocessing chain followed by an estimator, the shape most saved models
/// take.
pub struct PipelinePredictor {
    preprocessing: Pipeline,
    estimator: Box<dyn Predictor>,
}

impl PipelinePredictor {
    pub fn new(preprocessing: Pipeline, estimator: Box<dyn Predictor>) -> Self {
        PipelinePredictor { preprocessing, estimator }
    }

    pub fn preprocessing(&self) -> &Pipeline {
        &self.preprocessing
    }
}

impl Predictor for PipelinePredictor {
    fn predict(&self, input: &Samples) -> Result<Vec<Prediction>, ModelError> {
        let features = self.preprocessing.transform(input)?;
        self.estimator.predict(&features)
    }
}
