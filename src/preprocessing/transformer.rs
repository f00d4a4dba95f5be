use std::fmt;

use crate::error::PreprocessError;
use crate::math::samples::Samples;

/// A stateless array transformation with a scikit-style fit/transform shape.
///
/// Parameters are fixed at construction; constructors validate them and fail
/// with [`PreprocessError::InvalidConfiguration`]. Nothing is learned from
/// data, so `fit` hands back the same configured instance.
pub trait Transformer: fmt::Debug + Send + Sync {
    /// Short identifier used in logs and shape errors.
    fn name(&self) -> &'static str;

    /// Applies the transformation. The input is never modified.
    fn transform(&self, input: &Samples) -> Result<Samples, PreprocessError>;

    fn fit(self, _input: &Samples) -> Self
    where
        Self: Sized,
    {
        self
    }

    fn fit_transform(self, input: &Samples) -> Result<(Self, Samples), PreprocessError>
    where
        Self: Sized,
    {
        let fitted = self.fit(input);
        let output = fitted.transform(input)?;
        Ok((fitted, output))
    }
}
