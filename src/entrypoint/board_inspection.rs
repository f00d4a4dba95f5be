use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::entrypoint::Entrypoint;
use crate::error::EntrypointError;

/// Thresholds for judging a circuit board from detector output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionConfig {
    /// Detections at or below this score are ignored.
    pub score_threshold: f64,
    pub hole_label: i64,
    pub scratch_label: i64,
    /// A good board shows exactly this many holes and no scratches.
    pub expected_holes: usize,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        InspectionConfig {
            score_threshold: 0.8,
            hole_label: 1,
            scratch_label: 2,
            expected_holes: 8,
        }
    }
}

/// Post-processing for an object detector: counts confident holes and
/// scratches and grades the board `OK` or `DAMAGED`.
#[derive(Debug, Clone, Default)]
pub struct BoardInspection {
    config: InspectionConfig,
}

impl BoardInspection {
    pub fn new(config: InspectionConfig) -> Self {
        BoardInspection { config }
    }

    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }
}

fn numbers<'a>(payload: &'a Value, key: &str) -> Result<&'a Vec<Value>, EntrypointError> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| EntrypointError::payload(format!("payload is missing the '{}' list", key)))
}

impl Entrypoint for BoardInspection {
    fn name(&self) -> &'static str {
        "board_inspection"
    }

    fn process_input(&self, payload: &Value) -> Result<Value, EntrypointError> {
        let iuid = match payload.get("iuid") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "unknown".to_owned(),
            Some(other) => other.to_string(),
        };
        let scores = numbers(payload, "scores")?;
        let labels = numbers(payload, "labels")?;
        if labels.len() < scores.len() {
            return Err(EntrypointError::payload(format!(
                "{} scores but only {} labels",
                scores.len(),
                labels.len()
            )));
        }

        let mut holes = 0usize;
        let mut scratches = 0usize;
        for (score, label) in scores.iter().zip(labels) {
            let score = score
                .as_f64()
                .ok_or_else(|| EntrypointError::payload(format!("score {} is not a number", score)))?;
            if score <= self.config.score_threshold {
                continue;
            }
            match label.as_i64() {
                Some(l) if l == self.config.hole_label => holes += 1,
                Some(l) if l == self.config.scratch_label => scratches += 1,
                Some(_) => {}
                None => {
                    return Err(EntrypointError::payload(format!("label {} is not an integer", label)))
                }
            }
        }

        let prediction = if holes == self.config.expected_holes && scratches == 0 {
            "OK"
        } else {
            "DAMAGED"
        };
        let message = format!(
            "The board with id '{}' contains {} holes and {} scratches.",
            iuid, holes, scratches
        );
        if prediction == "OK" {
            info!(%iuid, holes, scratches, "board passed inspection");
        } else {
            warn!(%iuid, holes, scratches, "board damaged");
        }

        let result = json!({
            "prediction": prediction,
            "holes": holes,
            "scratches": scratches,
            "message": message,
        });
        Ok(json!({
            "prediction": prediction,
            "result": result.to_string(),
        }))
    }

    fn update_parameters(&mut self, params: &Value) -> Result<(), EntrypointError> {
        if let Some(v) = params.get("score_threshold") {
            match v.as_f64() {
                Some(t) if (0.0..=1.0).contains(&t) => self.config.score_threshold = t,
                _ => {
                    return Err(EntrypointError::payload(format!(
                        "'score_threshold' must lie in [0, 1], got {}",
                        v
                    )))
                }
            }
        }
        if let Some(v) = params.get("expected_holes") {
            let count = v.as_u64().ok_or_else(|| {
                EntrypointError::payload(format!("'expected_holes' must be a count, got {}", v))
            })?;
            self.config.expected_holes = count as usize;
        }
        Ok(())
    }
}
