pub mod error;
pub mod math;
pub mod preprocessing;
pub mod model;
pub mod entrypoint;
pub mod config;
pub mod logging;
pub mod readings;

// Convenience re-exports
pub use math::samples::Samples;
pub use error::{ConfigError, EntrypointError, ModelError, PreprocessError, ReadingsError};
pub use preprocessing::pipeline::{Pipeline, PipelineSpec, StepSpec};
pub use preprocessing::transformer::Transformer;
pub use model::{ModelArtifact, Network, Prediction, Predictor};
pub use entrypoint::{load_entrypoint, process_or_none, Entrypoint, EntrypointKind};
pub use config::ServiceConfig;
