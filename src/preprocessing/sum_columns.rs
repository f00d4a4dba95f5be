use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use crate::error::PreprocessError;
use crate::math::samples::Samples;
use crate::preprocessing::transformer::Transformer;

/// Number of channels the reducer expects (three phases of a reading).
pub const CHANNELS: usize = 3;

/// Collapses three channels into their per-row sum.
///
/// 2-D `(rows, 3)` becomes `(rows, 1)`. Batched `(frames, rows, 3)` becomes
/// `(1, frames, rows)`: the per-frame `(rows, 1)` results reinterpreted in
/// row-major order, so `out[0, f, r]` is the sum for frame `f`, row `r`.
/// Downstream consumers rely on that leading axis of length one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SumColumns;

impl SumColumns {
    pub fn new() -> Self {
        SumColumns
    }

    fn check_channels(&self, columns: usize) -> Result<(), PreprocessError> {
        if columns != CHANNELS {
            return Err(PreprocessError::shape(
                self.name(),
                format!("expected exactly {} columns, got {}", CHANNELS, columns),
            ));
        }
        Ok(())
    }

    fn sum_2d(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PreprocessError> {
        self.check_channels(x.ncols())?;
        Ok(x.sum_axis(Axis(1)).insert_axis(Axis(1)))
    }
}

impl Transformer for SumColumns {
    fn name(&self) -> &'static str {
        "sum_columns"
    }

    fn transform(&self, input: &Samples) -> Result<Samples, PreprocessError> {
        match input {
            Samples::Single(x) => self.sum_2d(x.view()).map(Samples::Single),
            Samples::Batch(x) => {
                let (frames, rows, columns) = x.dim();
                self.check_channels(columns)?;
                let mut out = Array3::<f64>::zeros((1, frames, rows));
                for (f, slice) in x.outer_iter().enumerate() {
                    out.slice_mut(s![0, f, ..]).assign(&slice.sum_axis(Axis(1)));
                }
                Ok(Samples::Batch(out))
            }
        }
    }
}
