//! Stateless transformers that turn raw sensor rows into feature vectors.
//!
//! The usual chain is: fill missing values, sum channels, reshape, downsample,
//! window. Each step can be used alone or composed in a [`Pipeline`].

pub mod aggregation;
pub mod downsample;
pub mod features;
pub mod fill;
pub mod pipeline;
pub mod reshape;
pub mod sum_columns;
pub mod transformer;
pub mod window;

pub use aggregation::Aggregation;
pub use downsample::DownsamplingTransformer;
pub use features::{negative_sum_of_changes, positive_sum_of_changes};
pub use fill::{FillMissingValues, FillStrategy, FillValue};
pub use pipeline::{Pipeline, PipelineSpec, StepSpec};
pub use reshape::Reshape;
pub use sum_columns::SumColumns;
pub use transformer::Transformer;
pub use window::WindowTransformer;
