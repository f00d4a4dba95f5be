use ndarray::Array2;

use crate::error::PreprocessError;
use crate::math::samples::Samples;
use crate::preprocessing::transformer::Transformer;

/// Row-major flatten of any input into `(len / columns, columns)`.
///
/// Bridges batched outputs, such as the `(1, frames, rows)` channel sums, into
/// the 2-D layout the windowing steps expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reshape {
    columns: usize,
}

impl Reshape {
    pub fn new(columns: usize) -> Result<Self, PreprocessError> {
        if columns == 0 {
            return Err(PreprocessError::config("reshape columns must be at least 1"));
        }
        Ok(Reshape { columns })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

impl Transformer for Reshape {
    fn name(&self) -> &'static str {
        "reshape"
    }

    fn transform(&self, input: &Samples) -> Result<Samples, PreprocessError> {
        let len = input.len();
        if len % self.columns != 0 {
            return Err(PreprocessError::shape(
                self.name(),
                format!("{} values do not split into rows of {}", len, self.columns),
            ));
        }
        Array2::from_shape_vec((len / self.columns, self.columns), input.to_flat_vec())
            .map(Samples::Single)
            .map_err(|e| PreprocessError::shape(self.name(), e.to_string()))
    }
}
