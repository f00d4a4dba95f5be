use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ndarray::ArrayView1;

use crate::error::PreprocessError;
use crate::preprocessing::features::{negative_sum_of_changes, positive_sum_of_changes};

/// User-supplied reduction of a block of readings to one value.
pub type AggregateFn = Arc<dyn Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync>;

/// Reduction applied to each downsampling block.
///
/// Named variants can be written in JSON by their snake_case name. Blocks are
/// never empty, so every variant sees at least one value. A `Custom` function
/// must return a single scalar for any non-empty view.
#[derive(Clone)]
pub enum Aggregation {
    Mean,
    Median,
    Min,
    Max,
    Sum,
    /// Population standard deviation.
    Std,
    PositiveSumOfChanges,
    NegativeSumOfChanges,
    Custom(AggregateFn),
}

impl Aggregation {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync + 'static,
    {
        Aggregation::Custom(Arc::new(f))
    }

    pub fn apply(&self, block: ArrayView1<'_, f64>) -> f64 {
        match self {
            Aggregation::Mean => block.sum() / block.len() as f64,
            Aggregation::Median => median(block),
            Aggregation::Min => extreme(block, f64::INFINITY, f64::min),
            Aggregation::Max => extreme(block, f64::NEG_INFINITY, f64::max),
            Aggregation::Sum => block.sum(),
            Aggregation::Std => block.std(0.0),
            Aggregation::PositiveSumOfChanges => positive_sum_of_changes(block),
            Aggregation::NegativeSumOfChanges => negative_sum_of_changes(block),
            Aggregation::Custom(f) => f(block),
        }
    }

    /// The JSON name, or `None` for a custom function.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Aggregation::Mean => Some("mean"),
            Aggregation::Median => Some("median"),
            Aggregation::Min => Some("min"),
            Aggregation::Max => Some("max"),
            Aggregation::Sum => Some("sum"),
            Aggregation::Std => Some("std"),
            Aggregation::PositiveSumOfChanges => Some("positive_sum_of_changes"),
            Aggregation::NegativeSumOfChanges => Some("negative_sum_of_changes"),
            Aggregation::Custom(_) => None,
        }
    }
}

fn has_missing(block: &ArrayView1<'_, f64>) -> bool {
    block.iter().any(|v| v.is_nan())
}

// `f64::min`/`f64::max` skip NaN, so a missing reading is checked for first.
fn extreme(block: ArrayView1<'_, f64>, init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if has_missing(&block) {
        return f64::NAN;
    }
    block.iter().copied().fold(init, pick)
}

fn median(block: ArrayView1<'_, f64>) -> f64 {
    if has_missing(&block) {
        return f64::NAN;
    }
    let mut sorted = block.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl FromStr for Aggregation {
    type Err = PreprocessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Aggregation::Mean),
            "median" => Ok(Aggregation::Median),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "sum" => Ok(Aggregation::Sum),
            "std" => Ok(Aggregation::Std),
            "positive_sum_of_changes" => Ok(Aggregation::PositiveSumOfChanges),
            "negative_sum_of_changes" => Ok(Aggregation::NegativeSumOfChanges),
            other => Err(PreprocessError::config(format!("unknown aggregation '{}'", other))),
        }
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("custom"))
    }
}
