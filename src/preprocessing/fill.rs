use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayViewMut1, ArrayViewMut2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::PreprocessError;
use crate::math::samples::Samples;
use crate::preprocessing::transformer::Transformer;

/// How missing (`NaN`) cells are replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillStrategy {
    /// Replace every missing cell with a fixed value.
    Constant(f64),
    /// Propagate the last valid value down the column (`"ffill"`).
    Forward,
    /// Propagate the next valid value up the column (`"bfill"`).
    Backward,
}

impl FromStr for FillStrategy {
    type Err = PreprocessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ffill" => Ok(FillStrategy::Forward),
            "bfill" => Ok(FillStrategy::Backward),
            other => Err(PreprocessError::config(format!(
                "fill value must be a number or \"bfill\" or \"ffill\", got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillStrategy::Constant(v) => write!(f, "{}", v),
            FillStrategy::Forward => f.write_str("ffill"),
            FillStrategy::Backward => f.write_str("bfill"),
        }
    }
}

/// Fill configuration as written in JSON: either a number or a strategy name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Name(String),
}

impl TryFrom<FillValue> for FillStrategy {
    type Error = PreprocessError;

    fn try_from(value: FillValue) -> Result<Self, Self::Error> {
        match value {
            FillValue::Number(v) => Ok(FillStrategy::Constant(v)),
            FillValue::Name(name) => name.parse(),
        }
    }
}

impl From<FillStrategy> for FillValue {
    fn from(strategy: FillStrategy) -> Self {
        match strategy {
            FillStrategy::Constant(v) => FillValue::Number(v),
            other => FillValue::Name(other.to_string()),
        }
    }
}

/// Replaces missing values column by column.
///
/// 3-D input is filled slice by slice along the first axis; values never
/// propagate from one slice into the next. Leading gaps under forward-fill and
/// trailing gaps under backward-fill have no source value and stay `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct FillMissingValues {
    strategy: FillStrategy,
}

impl FillMissingValues {
    pub fn new(strategy: FillStrategy) -> Result<Self, PreprocessError> {
        if let FillStrategy::Constant(v) = strategy {
            if v.is_nan() {
                return Err(PreprocessError::config("fill constant must not be NaN"));
            }
        }
        Ok(FillMissingValues { strategy })
    }

    pub fn from_value(value: FillValue) -> Result<Self, PreprocessError> {
        FillMissingValues::new(FillStrategy::try_from(value)?)
    }

    pub fn strategy(&self) -> FillStrategy {
        self.strategy
    }

    fn fill_2d(&self, mut x: ArrayViewMut2<'_, f64>) {
        for column in x.axis_iter_mut(Axis(1)) {
            match self.strategy {
                FillStrategy::Constant(value) => fill_constant(column, value),
                FillStrategy::Forward => fill_forward(column),
                FillStrategy::Backward => fill_backward(column),
            }
        }
    }
}

fn fill_constant(mut column: ArrayViewMut1<'_, f64>, value: f64) {
    column.iter_mut().filter(|v| v.is_nan()).for_each(|v| *v = value);
}

fn fill_forward(mut column: ArrayViewMut1<'_, f64>) {
    let mut last: Option<f64> = None;
    for v in column.iter_mut() {
        if v.is_nan() {
            if let Some(prev) = last {
                *v = prev;
            }
        } else {
            last = Some(*v);
        }
    }
}

fn fill_backward(mut column: ArrayViewMut1<'_, f64>) {
    let mut next: Option<f64> = None;
    for v in column.iter_mut().rev() {
        if v.is_nan() {
            if let Some(following) = next {
                *v = following;
            }
        } else {
            next = Some(*v);
        }
    }
}

impl Transformer for FillMissingValues {
    fn name(&self) -> &'static str {
        "fill_missing"
    }

    fn transform(&self, input: &Samples) -> Result<Samples, PreprocessError> {
        let mut output = input.clone();
        match &mut output {
            Samples::Single(x) => self.fill_2d(x.view_mut()),
            Samples::Batch(x) => {
                for slice in x.outer_iter_mut() {
                    self.fill_2d(slice);
                }
            }
        }
        Ok(output)
    }
}
