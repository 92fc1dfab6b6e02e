//! # Broken Stick Reference Model
//!
//! Null distribution for component magnitudes: a unit stick broken at `N - 1`
//! uniformly random points, with the pieces ranked by length. The expected
//! length of the `k`-th largest piece is
//!
//! ```text
//! b_k = (1 / N) * sum_{j = k}^{N} 1 / j
//! ```
//!
//! A component is worth keeping when its observed share beats `b_k` at its rank.

use log::debug;
use ndarray::{Array1, ArrayView1};
use num_traits::{Float, ToPrimitive};

use crate::error::{RetentionError, RetentionResult};
use crate::utils::{positive_count, total_magnitude, MagnitudeSequence};

/// Expected magnitudes under the broken-stick model, in descending rank order.
///
/// Immutable once built. One instance can be reused for every sequence of
/// length `n_factors`.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenStickModel<T: Float> {
    expected: Array1<T>,
    scale: T,
}

impl<T: Float> BrokenStickModel<T> {
    /// Builds the unit-stick model for `num_factors` components.
    ///
    /// `num_factors` must be a positive integer; anything else (including
    /// fractional values) fails with `InvalidArgument`.
    pub fn new<K: ToPrimitive>(num_factors: K) -> RetentionResult<Self> {
        let n = positive_count(num_factors, "num_factors")?;
        Self::with_scale(n, T::one())
    }

    /// Builds a model sized and scaled to `magnitudes`.
    ///
    /// The expected values are multiplied by the sequence's absolute total, so
    /// raw eigenvalues (which sum to the number of variables rather than 1)
    /// can be compared without normalizing them first.
    pub fn from_magnitudes<M>(magnitudes: &M) -> RetentionResult<Self>
    where
        M: MagnitudeSequence<Elem = T> + ?Sized,
    {
        let n = magnitudes.n_components();
        if n == 0 {
            return Err(RetentionError::invalid(
                "magnitudes",
                "cannot build a broken-stick model for an empty sequence",
            ));
        }

        let total = total_magnitude(magnitudes);
        if !total.is_finite() || total <= T::zero() {
            return Err(RetentionError::invalid(
                "magnitudes",
                "absolute total must be positive and finite",
            ));
        }

        Self::with_scale(n, total)
    }

    fn with_scale(n: usize, scale: T) -> RetentionResult<Self> {
        let n_t = T::from(n)
            .ok_or_else(|| RetentionError::invalid("num_factors", "not representable as float"))?;

        // Suffix sums of the harmonic series, filled from the smallest piece up.
        let mut expected = Array1::zeros(n);
        let mut tail = T::zero();
        for k in (0..n).rev() {
            let j = T::from(k + 1)
                .ok_or_else(|| RetentionError::invalid("num_factors", "not representable as float"))?;
            tail = tail + j.recip();
            expected[k] = tail / n_t * scale;
        }

        debug!("Built broken-stick model with {} factors", n);

        Ok(BrokenStickModel { expected, scale })
    }

    pub fn n_factors(&self) -> usize {
        self.expected.len()
    }

    /// Expected magnitude at 0-indexed rank `k`, or `None` past the last rank.
    pub fn expected_value(&self, k: usize) -> Option<T> {
        self.expected.get(k).copied()
    }

    pub fn expected_values(&self) -> ArrayView1<'_, T> {
        self.expected.view()
    }

    /// Total mass the expected values sum to (1 for [`BrokenStickModel::new`]).
    pub fn scale(&self) -> T {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    #[test]
    fn test_small_model_values() {
        let bs = BrokenStickModel::<f64>::new(4).unwrap();

        assert_eq!(bs.n_factors(), 4);
        assert_relative_eq!(bs.expected_value(0).unwrap(), (1.0 + 0.5 + 1.0 / 3.0 + 0.25) / 4.0);
        assert_relative_eq!(bs.expected_value(1).unwrap(), (0.5 + 1.0 / 3.0 + 0.25) / 4.0);
        assert_relative_eq!(bs.expected_value(2).unwrap(), (1.0 / 3.0 + 0.25) / 4.0);
        assert_relative_eq!(bs.expected_value(3).unwrap(), 0.0625);
        assert!(bs.expected_value(4).is_none());
    }

    #[test]
    fn test_single_factor_takes_whole_stick() {
        let bs = BrokenStickModel::<f64>::new(1).unwrap();

        assert_eq!(bs.expected_values().to_vec(), vec![1.0]);
    }

    #[test]
    fn test_values_sum_to_one_and_strictly_descend() {
        for n in [2usize, 10, 100, 1000] {
            let bs = BrokenStickModel::<f64>::new(n).unwrap();
            let vals = bs.expected_values();

            assert_abs_diff_eq!(vals.sum(), 1.0, epsilon = 1e-6);
            for w in vals.windows(2) {
                assert!(w[0] > w[1]);
            }
        }
    }

    #[test]
    fn test_f32_model() {
        let bs = BrokenStickModel::<f32>::new(50).unwrap();

        assert_abs_diff_eq!(bs.expected_values().sum(), 1.0f32, epsilon = 1e-5);
        assert_eq!(bs.scale(), 1.0f32);
    }

    #[test]
    fn test_invalid_num_factors() {
        for err in [
            BrokenStickModel::<f64>::new(0).unwrap_err(),
            BrokenStickModel::<f64>::new(-3).unwrap_err(),
            BrokenStickModel::<f64>::new(2.5).unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_from_magnitudes_rescales_to_total() {
        let eigenvalues = array![2.5, 1.0, 0.3, 0.2];

        let bs = BrokenStickModel::from_magnitudes(&eigenvalues).unwrap();
        let unit = BrokenStickModel::<f64>::new(4).unwrap();

        assert_relative_eq!(bs.scale(), 4.0);
        assert_relative_eq!(bs.expected_values().sum(), 4.0, epsilon = 1e-12);
        for k in 0..4 {
            assert_relative_eq!(
                bs.expected_value(k).unwrap(),
                unit.expected_value(k).unwrap() * 4.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_from_magnitudes_errors() {
        let empty: Vec<f64> = Vec::new();
        assert!(BrokenStickModel::from_magnitudes(&empty).is_err());

        let zeros = vec![0.0, 0.0, 0.0];
        assert!(BrokenStickModel::from_magnitudes(&zeros).is_err());
    }
}
