use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PreprocessError;
use crate::math::samples::Samples;
use crate::preprocessing::aggregation::Aggregation;
use crate::preprocessing::downsample::DownsamplingTransformer;
use crate::preprocessing::fill::{FillMissingValues, FillValue};
use crate::preprocessing::reshape::Reshape;
use crate::preprocessing::sum_columns::SumColumns;
use crate::preprocessing::transformer::Transformer;
use crate::preprocessing::window::WindowTransformer;

/// An ordered chain of transformers applied left to right.
#[derive(Debug, Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transformer>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { steps: Vec::new() }
    }

    /// Appends a step, builder style.
    pub fn with_step<T: Transformer + 'static>(mut self, step: T) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn push(&mut self, step: Box<dyn Transformer>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Transformer for Pipeline {
    fn name(&self) -> &'static str {
        "pipeline"
    }

    fn transform(&self, input: &Samples) -> Result<Samples, PreprocessError> {
        let mut current = input.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
            debug!(step = step.name(), shape = ?current.shape(), "pipeline step done");
        }
        Ok(current)
    }
}

/// JSON description of a single pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepSpec {
    FillMissing { value: FillValue },
    SumColumns,
    Reshape { columns: usize },
    Window { window_size: usize, step_size: usize },
    Downsample { nbr_items: usize, agg_func: String },
}

impl StepSpec {
    /// Constructs the configured transformer, validating its parameters.
    pub fn build(&self) -> Result<Box<dyn Transformer>, PreprocessError> {
        Ok(match self {
            StepSpec::FillMissing { value } => {
                Box::new(FillMissingValues::from_value(value.clone())?)
            }
            StepSpec::SumColumns => Box::new(SumColumns::new()),
            StepSpec::Reshape { columns } => Box::new(Reshape::new(*columns)?),
            StepSpec::Window { window_size, step_size } => {
                Box::new(WindowTransformer::new(*window_size, *step_size)?)
            }
            StepSpec::Downsample { nbr_items, agg_func } => {
                let agg: Aggregation = agg_func.parse()?;
                Box::new(DownsamplingTransformer::new(*nbr_items, agg)?)
            }
        })
    }
}

/// A serializable pipeline description, saved alongside model weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub steps: Vec<StepSpec>,
}

impl PipelineSpec {
    /// Builds every step up front, so a bad configuration fails before any
    /// data is seen.
    pub fn build(&self) -> Result<Pipeline, PreprocessError> {
        let mut pipeline = Pipeline::new();
        for step in &self.steps {
            pipeline.push(step.build()?);
        }
        Ok(pipeline)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `PipelineSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<std::path::Path>) -> std::io::Result<PipelineSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, Array3};

    fn spec_from(json: &str) -> PipelineSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_series_chain() {
        let pipeline = Pipeline::new()
            .with_step(FillMissingValues::from_value(FillValue::Number(0.0)).unwrap())
            .with_step(SumColumns::new())
            .with_step(WindowTransformer::new(2, 2).unwrap());

        let input = array![
            [1.0, 1.0, 1.0],
            [f64::NAN, 2.0, 2.0],
            [3.0, 3.0, 3.0],
            [4.0, 4.0, 4.0]
        ];
        let out = pipeline.transform(&input.into()).unwrap();
        assert_eq!(out, Samples::Single(array![[3.0, 4.0], [9.0, 12.0]]));
        assert_eq!(pipeline.step_names(), vec!["fill_missing", "sum_columns", "window"]);
    }

    #[test]
    fn test_spec_parses_and_builds() {
        let spec = spec_from(
            r#"{"steps": [
                {"type": "fill_missing", "value": "ffill"},
                {"type": "sum_columns"},
                {"type": "reshape", "columns": 1},
                {"type": "downsample", "nbr_items": 2, "agg_func": "mean"},
                {"type": "window", "window_size": 3, "step_size": 3}
            ]}"#,
        );
        let pipeline = spec.build().unwrap();
        assert_eq!(pipeline.len(), 5);

        // 1 batch of 10 readings -> 10 sums -> 9 rolling means -> 3 windows of 3
        let input = Array3::from_shape_fn((1, 10, 3), |(_, r, _)| r as f64);
        let out = pipeline.transform(&input.into()).unwrap().into_single("test").unwrap();
        assert_eq!(out.dim(), (3, 3));
        assert_eq!(out.row(0).to_vec(), vec![1.5, 4.5, 7.5]);
    }

    #[test]
    fn test_spec_rejects_bad_fill_at_build_time() {
        let spec = spec_from(r#"{"steps": [{"type": "fill_missing", "value": "zero"}]}"#);
        assert!(matches!(spec.build(), Err(PreprocessError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_spec_rejects_unknown_aggregation() {
        let spec = spec_from(
            r#"{"steps": [{"type": "downsample", "nbr_items": 2, "agg_func": "mode"}]}"#,
        );
        assert!(spec.build().is_err());
    }

    #[test]
    fn test_error_names_failing_step() {
        let pipeline = Pipeline::new()
            .with_step(SumColumns::new())
            .with_step(WindowTransformer::new(8, 1).unwrap());
        let err = pipeline.transform(&Array2::<f64>::zeros((4, 3)).into()).unwrap_err();
        assert!(matches!(err, PreprocessError::ShapeMismatch { step: "window", .. }));
    }

    #[test]
    fn test_spec_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let path = path.to_str().unwrap();
        let spec = PipelineSpec {
            steps: vec![
                StepSpec::FillMissing { value: FillValue::Name("bfill".into()) },
                StepSpec::Window { window_size: 4, step_size: 1 },
            ],
        };
        spec.save_json(path).unwrap();
        assert_eq!(PipelineSpec::load_json(path).unwrap(), spec);
    }
}
