use serde_json::{json, Value};
use tracing::info;

use crate::entrypoint::{reading, Entrypoint};
use crate::error::EntrypointError;
use crate::model::LinearRegression;

/// Target phC level the flow control steers towards.
pub const DEFAULT_PHC_MEAN: f64 = 9.0;

/// Soft sensor for the phC concentration, driving two valves.
///
/// Each payload record is scored by a linear model. The flow-control ratio is
/// `mean(predicted phC) / phC_mean`; valve A is opened by that ratio and valve
/// B closed by it, starting from the positions in the last record.
pub struct SoftSensor {
    model: LinearRegression,
    phc_mean: f64,
}

impl SoftSensor {
    pub fn new(model: LinearRegression) -> Self {
        SoftSensor { model, phc_mean: DEFAULT_PHC_MEAN }
    }

    pub fn phc_mean(&self) -> f64 {
        self.phc_mean
    }
}

impl Entrypoint for SoftSensor {
    fn name(&self) -> &'static str {
        "soft_sensor"
    }

    fn process_input(&self, payload: &Value) -> Result<Value, EntrypointError> {
        let records = payload
            .as_array()
            .ok_or_else(|| EntrypointError::payload("payload must be a list of records"))?;
        let last = records
            .last()
            .ok_or_else(|| EntrypointError::payload("payload contains no records"))?;

        let mut predictions = Vec::with_capacity(records.len());
        for record in records {
            let fields = record
                .as_object()
                .ok_or_else(|| EntrypointError::payload(format!("record is not an object: {}", record)))?;
            predictions.push(self.model.predict_record(fields)?);
        }

        let predicted_phc = predictions.iter().sum::<f64>() / predictions.len() as f64;
        let ratio = predicted_phc / self.phc_mean;
        if !ratio.is_normal() {
            return Err(EntrypointError::Rejected(format!(
                "flow control ratio {} cannot steer the valves",
                ratio
            )));
        }

        let valve_a = reading(last, "valve_position_A")? * ratio;
        let valve_b = reading(last, "valve_position_B")? / ratio;
        info!(records = records.len(), predicted_phc, ratio, "valve positions adjusted");

        Ok(json!({
            "valve_control_A": valve_a,
            "valve_control_B": valve_b,
            "predicted_phC": predicted_phc,
        }))
    }

    fn update_parameters(&mut self, params: &Value) -> Result<(), EntrypointError> {
        let Some(value) = params.get("phC_mean") else {
            return Ok(());
        };
        match value.as_f64() {
            Some(v) if v.is_finite() && v > 0.0 => {
                info!(phc_mean = v, "phC target updated");
                self.phc_mean = v;
                Ok(())
            }
            _ => Err(EntrypointError::payload(format!(
                "'phC_mean' must be a positive number, got {}",
                value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sensor() -> SoftSensor {
        // phC = 2 * temperature_C
        SoftSensor::new(
            LinearRegression::new(vec!["temperature_C".into()], array![2.0], 0.0).unwrap(),
        )
    }

    #[test]
    fn test_valves_follow_ratio() {
        let payload = json!([
            {"temperature_C": 4.0, "valve_position_A": 1.0, "valve_position_B": 1.0},
            {"temperature_C": 5.0, "valve_position_A": 2.0, "valve_position_B": 3.0}
        ]);
        let out = sensor().process_input(&payload).unwrap();
        // mean phC = 9.0, ratio = 1.0
        assert_relative_eq!(out["predicted_phC"].as_f64().unwrap(), 9.0);
        assert_relative_eq!(out["valve_control_A"].as_f64().unwrap(), 2.0);
        assert_relative_eq!(out["valve_control_B"].as_f64().unwrap(), 3.0);
    }

    #[test]
    fn test_updated_target() {
        let mut s = sensor();
        s.update_parameters(&json!({"phC_mean": 4.5})).unwrap();
        let payload = json!([{"temperature_C": 4.5, "valve_position_A": 1.0, "valve_position_B": 1.0}]);
        let out = s.process_input(&payload).unwrap();
        // ratio = 9.0 / 4.5 = 2.0
        assert_relative_eq!(out["valve_control_A"].as_f64().unwrap(), 2.0);
        assert_relative_eq!(out["valve_control_B"].as_f64().unwrap(), 0.5);
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let mut s = sensor();
        assert!(s.update_parameters(&json!({"phC_mean": -1.0})).is_err());
        assert!(s.update_parameters(&json!({"other": 1})).is_ok());
        assert_eq!(s.phc_mean(), DEFAULT_PHC_MEAN);
    }

    #[test]
    fn test_empty_and_malformed_payloads() {
        let s = sensor();
        assert!(s.process_input(&json!([])).is_err());
        assert!(s.process_input(&json!({"temperature_C": 1.0})).is_err());
        let missing_valve = json!([{"temperature_C": 4.5, "valve_position_A": 1.0}]);
        assert!(matches!(s.process_input(&missing_valve), Err(EntrypointError::Payload(_))));
    }

    #[test]
    fn test_zero_ratio_is_rejected() {
        let payload = json!([{"temperature_C": 0.0, "valve_position_A": 1.0, "valve_position_B": 1.0}]);
        assert!(matches!(sensor().process_input(&payload), Err(EntrypointError::Rejected(_))));
    }
}
