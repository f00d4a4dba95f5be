use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::math::samples::Samples;
use crate::model::predictor::{Prediction, Predictor};

/// Ordinary linear regression over named features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub feature_names: Vec<String>,
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Array1<f64>,
        intercept: f64,
    ) -> Result<LinearRegression, ModelError> {
        let model = LinearRegression { feature_names, coefficients, intercept };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names.len() != self.coefficients.len() {
            return Err(ModelError::InvalidModel(format!(
                "{} feature names for {} coefficients",
                self.feature_names.len(),
                self.coefficients.len()
            )));
        }
        Ok(())
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        if row.len() != self.coefficients.len() {
            return Err(ModelError::InputWidth {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }
        Ok(row.dot(&self.coefficients) + self.intercept)
    }

    /// Predicts from a JSON object keyed by feature name. Extra keys are
    /// ignored; a missing or non-numeric feature is an error.
    pub fn predict_record(&self, record: &Map<String, Value>) -> Result<f64, ModelError> {
        let row = self
            .feature_names
            .iter()
            .map(|name| {
                record
                    .get(name)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ModelError::MissingFeature(name.clone()))
            })
            .collect::<Result<Array1<f64>, _>>()?;
        self.predict_row(row.view())
    }
}

impl Predictor for LinearRegression {
    fn predict(&self, input: &Samples) -> Result<Vec<Prediction>, ModelError> {
        let features = input.as_single("linear_regression")?;
        features
            .rows()
            .into_iter()
            .map(|row| self.predict_row(row).map(Prediction::Value))
            .collect()
    }
}
