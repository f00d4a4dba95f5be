use ndarray::Axis;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::entrypoint::{reading, Entrypoint};
use crate::error::EntrypointError;
use crate::math::samples::Samples;
use crate::model::Predictor;

/// Phase keys read from every measurement, in channel order.
pub const CHANNEL_KEYS: [&str; 3] = ["ph1", "ph2", "ph3"];

/// Classifies the operating state of a machine from three-phase readings.
///
/// The payload carries `json_data`, a JSON document (usually as a string)
/// whose `measurements` list holds `{"ph1", "ph2", "ph3"}` records. Null
/// readings become `NaN` so the model's fill step can handle them.
///
/// In batch mode the readings are handed over as a single `(1, n, 3)` batch
/// and the one prediction is returned. Otherwise they form an `(n, 3)` series;
/// the latest window's prediction is reported as `prediction`, with the full
/// list under `predictions` when the series spans several windows.
pub struct StateIdentifier {
    predictor: Box<dyn Predictor>,
    batched: bool,
}

impl StateIdentifier {
    pub fn new(predictor: Box<dyn Predictor>, batched: bool) -> Self {
        StateIdentifier { predictor, batched }
    }

    pub fn is_batched(&self) -> bool {
        self.batched
    }

    fn measurements(payload: &Value) -> Result<Vec<Value>, EntrypointError> {
        let json_data = match payload.get("json_data") {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)?,
            Some(obj @ Value::Object(_)) => obj.clone(),
            Some(other) => {
                return Err(EntrypointError::payload(format!(
                    "'json_data' must be a JSON string or object, got {}",
                    other
                )))
            }
            None => return Err(EntrypointError::payload("payload is missing 'json_data'")),
        };
        match json_data.get("measurements") {
            Some(Value::Array(items)) if !items.is_empty() => Ok(items.clone()),
            Some(Value::Array(_)) => Err(EntrypointError::payload("'measurements' is empty")),
            _ => Err(EntrypointError::payload("'json_data' has no 'measurements' list")),
        }
    }

    fn samples(&self, measurements: &[Value]) -> Result<Samples, EntrypointError> {
        let rows = measurements
            .iter()
            .map(|item| {
                CHANNEL_KEYS
                    .iter()
                    .map(|key| reading(item, key))
                    .collect::<Result<Vec<f64>, _>>()
            })
            .collect::<Result<Vec<Vec<f64>>, _>>()?;
        let series = Samples::from_rows(&rows)?.into_single("state_identifier")?;
        Ok(if self.batched {
            Samples::Batch(series.insert_axis(Axis(0)))
        } else {
            Samples::Single(series)
        })
    }
}

impl Entrypoint for StateIdentifier {
    fn name(&self) -> &'static str {
        if self.batched {
            "batch_state_identifier"
        } else {
            "state_identifier"
        }
    }

    fn process_input(&self, payload: &Value) -> Result<Value, EntrypointError> {
        let measurements = Self::measurements(payload)?;
        let samples = self.samples(&measurements)?;
        debug!(shape = ?samples.shape(), missing = samples.count_missing(), "built input samples");

        let predictions = self.predictor.predict(&samples)?;
        let latest = match (self.batched, predictions.first(), predictions.last()) {
            (true, Some(first), _) => first,
            (false, _, Some(last)) => last,
            _ => return Err(EntrypointError::Rejected("model produced no prediction".into())),
        };
        info!(entrypoint = self.name(), readings = measurements.len(), prediction = ?latest, "state identified");

        let mut result = json!({ "prediction": latest });
        if !self.batched && predictions.len() > 1 {
            result["predictions"] = json!(predictions);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::Prediction;

    /// Reports the input shape, one prediction per row for 2-D input.
    struct ShapeEcho;

    impl Predictor for ShapeEcho {
        fn predict(&self, input: &Samples) -> Result<Vec<Prediction>, ModelError> {
            let label = format!("{:?}", input.shape());
            let rows = if input.ndim() == 2 { input.shape()[0] } else { 1 };
            Ok(vec![Prediction::Label(label); rows])
        }
    }

    fn payload(measurements: Value) -> Value {
        json!({ "json_data": json!({ "measurements": measurements }).to_string() })
    }

    #[test]
    fn test_batch_mode_builds_one_batch() {
        let ep = StateIdentifier::new(Box::new(ShapeEcho), true);
        let out = ep
            .process_input(&payload(json!([
                {"ph1": 1.0, "ph2": 2.0, "ph3": 3.0},
                {"ph1": 1.5, "ph2": null, "ph3": 3.5}
            ])))
            .unwrap();
        assert_eq!(out, json!({"prediction": "[1, 2, 3]"}));
    }

    #[test]
    fn test_single_mode_lists_all_predictions() {
        let ep = StateIdentifier::new(Box::new(ShapeEcho), false);
        let out = ep
            .process_input(&payload(json!([
                {"ph1": 1.0, "ph2": 2.0, "ph3": 3.0},
                {"ph1": 1.0, "ph2": 2.0, "ph3": 3.0}
            ])))
            .unwrap();
        assert_eq!(out["prediction"], "[2, 3]");
        assert_eq!(out["predictions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_data_may_be_an_object() {
        let ep = StateIdentifier::new(Box::new(ShapeEcho), true);
        let p = json!({"json_data": {"measurements": [{"ph1": 0, "ph2": 0, "ph3": 0}]}});
        assert!(ep.process_input(&p).is_ok());
    }

    #[test]
    fn test_missing_phase_is_payload_error() {
        let ep = StateIdentifier::new(Box::new(ShapeEcho), true);
        let err = ep
            .process_input(&payload(json!([{"ph1": 1.0, "ph2": 2.0}])))
            .unwrap_err();
        assert!(matches!(err, EntrypointError::Payload(_)));
    }

    #[test]
    fn test_malformed_json_data() {
        let ep = StateIdentifier::new(Box::new(ShapeEcho), true);
        let err = ep.process_input(&json!({"json_data": "{not json"})).unwrap_err();
        assert!(matches!(err, EntrypointError::Json(_)));
        assert!(ep.process_input(&json!({})).is_err());
        assert!(ep.process_input(&payload(json!([]))).is_err());
    }
}
