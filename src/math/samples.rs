use ndarray::{Array2, Array3, ArrayView2};

use crate::error::PreprocessError;

/// A multi-channel reading sequence handed through the preprocessing chain.
///
/// `Single` is `(rows = time steps, columns = channels)`; `Batch` stacks
/// several such sequences along a leading axis. Missing readings are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Single(Array2<f64>),
    Batch(Array3<f64>),
}

impl Samples {
    /// Builds a 2-D sample sequence from row vectors.
    ///
    /// Every row must have the same width; an empty slice yields a `(0, 0)`
    /// array.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Samples, PreprocessError> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(PreprocessError::shape(
                "samples",
                format!("row {} has {} values, expected {}", idx, row.len(), cols),
            ));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows.len(), cols), flat)
            .map(Samples::Single)
            .map_err(|e| PreprocessError::shape("samples", e.to_string()))
    }

    pub fn ndim(&self) -> usize {
        match self {
            Samples::Single(_) => 2,
            Samples::Batch(_) => 3,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Samples::Single(a) => a.shape(),
            Samples::Batch(a) => a.shape(),
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        match self {
            Samples::Single(a) => a.len(),
            Samples::Batch(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `NaN` cells.
    pub fn count_missing(&self) -> usize {
        match self {
            Samples::Single(a) => a.iter().filter(|v| v.is_nan()).count(),
            Samples::Batch(a) => a.iter().filter(|v| v.is_nan()).count(),
        }
    }

    /// Borrows the 2-D array, failing for batched input.
    pub fn as_single(&self, step: &'static str) -> Result<ArrayView2<'_, f64>, PreprocessError> {
        match self {
            Samples::Single(a) => Ok(a.view()),
            Samples::Batch(a) => Err(PreprocessError::shape(
                step,
                format!("expected 2-D input, got 3-D array of shape {:?}", a.shape()),
            )),
        }
    }

    pub fn into_single(self, step: &'static str) -> Result<Array2<f64>, PreprocessError> {
        match self {
            Samples::Single(a) => Ok(a),
            Samples::Batch(a) => Err(PreprocessError::shape(
                step,
                format!("expected 2-D input, got 3-D array of shape {:?}", a.shape()),
            )),
        }
    }

    /// Elements in row-major order.
    pub fn to_flat_vec(&self) -> Vec<f64> {
        match self {
            Samples::Single(a) => a.iter().copied().collect(),
            Samples::Batch(a) => a.iter().copied().collect(),
        }
    }
}

impl From<Array2<f64>> for Samples {
    fn from(a: Array2<f64>) -> Self {
        Samples::Single(a)
    }
}

impl From<Array3<f64>> for Samples {
    fn from(a: Array3<f64>) -> Self {
        Samples::Batch(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_rows_builds_single() {
        let s = Samples::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(s.shape(), &[3, 2]);
        assert_eq!(s, Samples::Single(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]));
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let err = Samples::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, PreprocessError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_batch_is_not_single() {
        let s = Samples::Batch(Array3::zeros((1, 2, 3)));
        assert_eq!(s.ndim(), 3);
        assert!(s.as_single("test").is_err());
    }

    #[test]
    fn test_count_missing() {
        let s = Samples::Single(array![[f64::NAN, 1.0], [2.0, f64::NAN]]);
        assert_eq!(s.count_missing(), 2);
    }
}
