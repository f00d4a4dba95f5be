//! Scalar features over a single channel.

use ndarray::ArrayView1;

/// Sum over the positive consecutive changes in `x`.
///
/// Differences are clipped to `[0, inf)` before summing. Sequences with fewer
/// than two values have no differences and yield `0.0`.
pub fn positive_sum_of_changes(x: ArrayView1<'_, f64>) -> f64 {
    changes(x).map(|d| d.clamp(0.0, f64::INFINITY)).sum()
}

/// Sum over the negative consecutive changes in `x`.
///
/// Differences are clipped to `(-inf, 0]`, so the result is never positive.
/// Sequences with fewer than two values yield `0.0`.
pub fn negative_sum_of_changes(x: ArrayView1<'_, f64>) -> f64 {
    changes(x).map(|d| d.clamp(f64::NEG_INFINITY, 0.0)).sum()
}

// clamp() keeps NaN, so a gap in the series poisons the sum.
fn changes<'a>(x: ArrayView1<'a, f64>) -> impl Iterator<Item = f64> + 'a {
    x.into_iter().zip(x.into_iter().skip(1)).map(|(a, b)| b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_known_sequence() {
        // diffs = [2, -1, 3, -1]
        let x = array![1.0, 3.0, 2.0, 5.0, 4.0];
        assert_eq!(positive_sum_of_changes(x.view()), 5.0);
        assert_eq!(negative_sum_of_changes(x.view()), -2.0);
    }

    #[test]
    fn test_telescoping_sum() {
        let x = array![0.3, -1.2, 4.5, 4.5, 2.0, 7.25, -3.0, 0.0];
        let total = positive_sum_of_changes(x.view()) + negative_sum_of_changes(x.view());
        assert_abs_diff_eq!(total, x[x.len() - 1] - x[0], epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_lengths_are_zero() {
        let empty = Array1::<f64>::zeros(0);
        let one = array![42.0];
        assert_eq!(positive_sum_of_changes(empty.view()), 0.0);
        assert_eq!(negative_sum_of_changes(empty.view()), 0.0);
        assert_eq!(positive_sum_of_changes(one.view()), 0.0);
        assert_eq!(negative_sum_of_changes(one.view()), 0.0);
    }

    #[test]
    fn test_monotonic_sequences() {
        let rising = array![1.0, 2.0, 4.0, 8.0];
        assert_eq!(positive_sum_of_changes(rising.view()), 7.0);
        assert_eq!(negative_sum_of_changes(rising.view()), 0.0);
    }

    #[test]
    fn test_nan_propagates() {
        let x = array![1.0, f64::NAN, 3.0];
        assert!(positive_sum_of_changes(x.view()).is_nan());
    }
}
