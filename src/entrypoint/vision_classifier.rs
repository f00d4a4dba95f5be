use ndarray::Array1;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::entrypoint::Entrypoint;
use crate::error::{EntrypointError, ModelError};
use crate::model::{InputType, Network};

pub const DEFAULT_WIDTH: u32 = 224;
pub const DEFAULT_HEIGHT: u32 = 224;
const CHANNELS: usize = 3;
const SCALE: f64 = 255.0;

#[derive(Debug, Deserialize)]
struct ImageDetail {
    #[serde(default)]
    id: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    /// Interleaved RGB8 pixels, row by row.
    image: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct VisionPayload {
    detail: Vec<ImageDetail>,
}

/// Image classifier fed by a vision connector.
///
/// Images arrive already decoded to RGB8 under `vision_payload.detail`. Any
/// image whose size differs from the model's input is dropped with a warning
/// and the whole payload is rejected.
pub struct VisionClassifier {
    network: Network,
    width: u32,
    height: u32,
}

impl VisionClassifier {
    /// Takes the expected image size from the network's metadata, defaulting
    /// to 224x224, and checks it against the first layer.
    pub fn new(network: Network) -> Result<Self, EntrypointError> {
        let (width, height) = match network.metadata.as_ref().and_then(|m| m.input_type.as_ref()) {
            Some(InputType::ImageRgb { width, height }) => (*width, *height),
            _ => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
        };
        let expected = width as usize * height as usize * CHANNELS;
        if network.input_size() != expected {
            return Err(ModelError::InputWidth { expected, actual: network.input_size() }.into());
        }
        Ok(VisionClassifier { network, width, height })
    }

    fn classify(&self, detail: &ImageDetail) -> Result<Value, EntrypointError> {
        let iuid = detail.id.clone().unwrap_or_else(|| "no-id".to_owned());
        let width = detail.width.unwrap_or(self.width);
        let height = detail.height.unwrap_or(self.height);
        if width != self.width || height != self.height {
            warn!(%iuid, width, height, "image dropped because of wrong size");
            return Err(EntrypointError::Rejected(format!(
                "image {} was dropped because of wrong size {} x {}",
                iuid, width, height
            )));
        }
        let expected = width as usize * height as usize * CHANNELS;
        if detail.image.len() != expected {
            return Err(EntrypointError::Rejected(format!(
                "image {} carries {} bytes, expected {} RGB values",
                iuid,
                detail.image.len(),
                expected
            )));
        }

        let input: Array1<f64> = detail.image.iter().map(|&b| f64::from(b) / SCALE).collect();
        let c = self.network.classify(input.view())?;
        debug!(%iuid, index = c.index, probability = c.probability, "image classified");
        Ok(json!({
            "iuid": iuid,
            "index": c.index,
            "probability": c.probability,
            "label": c.label,
        }))
    }
}

impl Entrypoint for VisionClassifier {
    fn name(&self) -> &'static str {
        "vision_classifier"
    }

    fn process_input(&self, payload: &Value) -> Result<Value, EntrypointError> {
        let raw = payload
            .get("vision_payload")
            .ok_or_else(|| EntrypointError::payload("payload is missing 'vision_payload'"))?;
        let vision: VisionPayload = serde_json::from_value(raw.clone())?;
        if vision.detail.is_empty() {
            return Err(EntrypointError::payload("'vision_payload' has no images"));
        }
        let classifications = vision
            .detail
            .iter()
            .map(|d| self.classify(d))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(json!({ "classifications": classifications }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivationFunction, DenseLayer, ModelMetadata};
    use ndarray::Array2;

    /// 2x1 image; class 0 for a dark image, class 1 for a bright one.
    fn tiny_network() -> Network {
        let mut weights = Array2::<f64>::zeros((6, 2));
        weights.column_mut(0).fill(-1.0);
        weights.column_mut(1).fill(1.0);
        let layer = DenseLayer::from_parts(
            weights,
            ndarray::array![3.0, -3.0],
            ActivationFunction::Softmax,
        )
        .unwrap();
        Network::from_layers(vec![layer]).unwrap().with_metadata(ModelMetadata {
            input_type: Some(InputType::ImageRgb { width: 2, height: 1 }),
            output_labels: Some(vec!["dark".into(), "bright".into()]),
            ..ModelMetadata::default()
        })
    }

    fn payload(image: Vec<u8>, width: u32) -> Value {
        json!({"vision_payload": {"detail": [
            {"id": "cam-1", "width": width, "height": 1, "image": image}
        ]}})
    }

    #[test]
    fn test_bright_image() {
        let ep = VisionClassifier::new(tiny_network()).unwrap();
        let out = ep.process_input(&payload(vec![255; 6], 2)).unwrap();
        let c = &out["classifications"][0];
        assert_eq!(c["iuid"], "cam-1");
        assert_eq!(c["label"], "bright");
        assert_eq!(c["index"], 1);
    }

    #[test]
    fn test_dark_image() {
        let ep = VisionClassifier::new(tiny_network()).unwrap();
        let out = ep.process_input(&payload(vec![0; 6], 2)).unwrap();
        assert_eq!(out["classifications"][0]["label"], "dark");
    }

    #[test]
    fn test_wrong_size_is_rejected() {
        let ep = VisionClassifier::new(tiny_network()).unwrap();
        let err = ep.process_input(&payload(vec![0; 9], 3)).unwrap_err();
        assert!(matches!(err, EntrypointError::Rejected(_)));
        let err = ep.process_input(&payload(vec![0; 5], 2)).unwrap_err();
        assert!(matches!(err, EntrypointError::Rejected(_)));
    }

    #[test]
    fn test_network_width_must_match_image() {
        let mut net = tiny_network();
        net.metadata = None;
        // 6 inputs cannot take a 224x224 RGB image.
        assert!(VisionClassifier::new(net).is_err());
    }

    #[test]
    fn test_missing_vision_payload() {
        let ep = VisionClassifier::new(tiny_network()).unwrap();
        assert!(ep.process_input(&json!({"detail": []})).is_err());
    }
}
