use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::error::PreprocessError;
use crate::math::samples::Samples;
use crate::preprocessing::transformer::Transformer;

/// Sliding-window reshaper.
///
/// Turns `(n, channels)` into one row per window of `window_size` consecutive
/// readings, advancing `step_size` rows between windows. Output columns are
/// grouped by channel: `out[k, ch * window_size + i] = x[i + k * step_size, ch]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTransformer {
    window_size: usize,
    step_size: usize,
}

impl WindowTransformer {
    pub fn new(window_size: usize, step_size: usize) -> Result<Self, PreprocessError> {
        if window_size == 0 {
            return Err(PreprocessError::config("window_size must be at least 1"));
        }
        if step_size == 0 {
            return Err(PreprocessError::config("step_size must be at least 1"));
        }
        Ok(WindowTransformer { window_size, step_size })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }

    /// Number of windows produced from `rows` readings, or `None` when the
    /// sequence is shorter than one window.
    pub fn window_count(&self, rows: usize) -> Option<usize> {
        rows.checked_sub(self.window_size)
            .map(|span| span / self.step_size + 1)
    }

    fn windowed(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PreprocessError> {
        let (rows, channels) = x.dim();
        let count = self.window_count(rows).ok_or_else(|| {
            PreprocessError::shape(
                self.name(),
                format!("{} rows cannot fill a window of {}", rows, self.window_size),
            )
        })?;

        let w = self.window_size;
        let s = self.step_size;
        let out = Array2::from_shape_fn((count, w * channels), |(k, col)| {
            let (ch, i) = (col / w, col % w);
            x[[i + k * s, ch]]
        });
        debug!(rows, channels, windows = count, "windowed samples");
        Ok(out)
    }
}

impl Transformer for WindowTransformer {
    fn name(&self) -> &'static str {
        "window"
    }

    fn transform(&self, input: &Samples) -> Result<Samples, PreprocessError> {
        let x = input.as_single(self.name())?;
        self.windowed(x).map(Samples::Single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn run(t: &WindowTransformer, x: Array2<f64>) -> Array2<f64> {
        t.transform(&x.into()).unwrap().into_single("test").unwrap()
    }

    #[test]
    fn test_ten_by_three_gives_four_by_nine() {
        let x = Array2::from_shape_fn((10, 3), |(r, c)| (r * 10 + c) as f64);
        let out = run(&WindowTransformer::new(3, 2).unwrap(), x);
        assert_eq!(out.dim(), (4, 9));
        // First window of channel 0 covers rows 0..3, second window starts at row 2.
        assert_eq!(out.row(0).to_vec()[..3], [0.0, 10.0, 20.0]);
        assert_eq!(out.row(1).to_vec()[..3], [20.0, 30.0, 40.0]);
        // Channel 2 occupies the last three columns.
        assert_eq!(out.row(3).to_vec()[6..], [62.0, 72.0, 82.0]);
    }

    #[test]
    fn test_single_channel_overlapping_windows() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let out = run(&WindowTransformer::new(2, 1).unwrap(), x);
        assert_eq!(out, array![[1.0, 2.0], [2.0, 3.0], [3.0, 4.0], [4.0, 5.0]]);
    }

    #[test]
    fn test_step_larger_than_window_skips_rows() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let out = run(&WindowTransformer::new(2, 3).unwrap(), x);
        assert_eq!(out, array![[0.0, 1.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_unit_window_is_identity() {
        let x = Array2::from_shape_fn((6, 4), |(r, c)| (r as f64) - (c as f64) * 0.5);
        let out = run(&WindowTransformer::new(1, 1).unwrap(), x.clone());
        assert_eq!(out, x);
    }

    #[test]
    fn test_row_and_column_counts() {
        for (n, w, s) in [(10, 3, 2), (7, 7, 1), (50, 5, 5), (11, 4, 3)] {
            let x = Array2::<f64>::zeros((n, 2));
            let out = run(&WindowTransformer::new(w, s).unwrap(), x);
            assert_eq!(out.nrows(), (n - w) / s + 1);
            assert_eq!(out.ncols(), w * 2);
        }
    }

    #[test]
    fn test_short_sequence_is_shape_mismatch() {
        let t = WindowTransformer::new(5, 1).unwrap();
        let err = t.transform(&Array2::<f64>::zeros((4, 3)).into()).unwrap_err();
        assert!(matches!(err, PreprocessError::ShapeMismatch { step: "window", .. }));
    }

    #[test]
    fn test_batch_input_is_shape_mismatch() {
        let t = WindowTransformer::new(2, 1).unwrap();
        assert!(t.transform(&Array3::<f64>::zeros((1, 4, 3)).into()).is_err());
    }

    #[test]
    fn test_zero_sizes_are_invalid_configuration() {
        assert!(matches!(
            WindowTransformer::new(0, 1),
            Err(PreprocessError::InvalidConfiguration(_))
        ));
        assert!(WindowTransformer::new(3, 0).is_err());
    }
}
