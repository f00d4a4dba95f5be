use ndarray::{s, Array2, ArrayView2};
use tracing::debug;

use crate::error::PreprocessError;
use crate::math::samples::Samples;
use crate::preprocessing::aggregation::Aggregation;
use crate::preprocessing::transformer::Transformer;

/// Rolling reduction over blocks of `nbr_items` consecutive readings.
///
/// Every offset is used (stride one), so `n` rows become
/// `n - nbr_items + 1` rows; channels stay side by side as columns.
#[derive(Debug, Clone)]
pub struct DownsamplingTransformer {
    nbr_items: usize,
    agg_func: Aggregation,
}

impl DownsamplingTransformer {
    pub fn new(nbr_items: usize, agg_func: Aggregation) -> Result<Self, PreprocessError> {
        if nbr_items == 0 {
            return Err(PreprocessError::config("nbr_items must be at least 1"));
        }
        Ok(DownsamplingTransformer { nbr_items, agg_func })
    }

    pub fn nbr_items(&self) -> usize {
        self.nbr_items
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.agg_func
    }

    fn downsampled(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PreprocessError> {
        let (rows, channels) = x.dim();
        if rows < self.nbr_items {
            return Err(PreprocessError::shape(
                self.name(),
                format!("{} rows cannot fill a block of {}", rows, self.nbr_items),
            ));
        }
        let blocks = rows - self.nbr_items + 1;
        let k = self.nbr_items;
        let out = Array2::from_shape_fn((blocks, channels), |(j, ch)| {
            self.agg_func.apply(x.slice(s![j..j + k, ch]))
        });
        debug!(rows, channels, blocks, agg = ?self.agg_func, "downsampled samples");
        Ok(out)
    }
}

impl Transformer for DownsamplingTransformer {
    fn name(&self) -> &'static str {
        "downsample"
    }

    fn transform(&self, input: &Samples) -> Result<Samples, PreprocessError> {
        let x = input.as_single(self.name())?;
        self.downsampled(x).map(Samples::Single)
    }
}
