pub mod activation;
pub mod artifact;
pub mod layer;
pub mod linear;
pub mod metadata;
pub mod network;
pub mod predictor;

pub use activation::ActivationFunction;
pub use artifact::ModelArtifact;
pub use layer::DenseLayer;
pub use linear::LinearRegression;
pub use metadata::{InputType, ModelMetadata};
pub use network::{Classification, Network};
pub use predictor::{PipelinePredictor, Prediction, Predictor};
