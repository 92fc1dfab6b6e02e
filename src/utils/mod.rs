use ndarray::{Array1, ArrayBase, Data, Ix1};
use num_traits::{Float, ToPrimitive, Zero};

use crate::error::{RetentionError, RetentionResult};

/// Read-only, indexable sequence of component magnitudes.
///
/// Implemented for slices, vectors and one-dimensional ndarray containers, so
/// eigenvalues coming straight out of a PCA fit can be passed without copying.
pub trait MagnitudeSequence {
    type Elem: Float;

    fn n_components(&self) -> usize;

    fn magnitude(&self, index: usize) -> Self::Elem;

    fn is_empty(&self) -> bool {
        self.n_components() == 0
    }
}

impl<T: Float> MagnitudeSequence for [T] {
    type Elem = T;

    fn n_components(&self) -> usize {
        self.len()
    }

    fn magnitude(&self, index: usize) -> T {
        self[index]
    }
}

impl<T: Float> MagnitudeSequence for Vec<T> {
    type Elem = T;

    fn n_components(&self) -> usize {
        self.len()
    }

    fn magnitude(&self, index: usize) -> T {
        self[index]
    }
}

impl<S> MagnitudeSequence for ArrayBase<S, Ix1>
where
    S: Data,
    S::Elem: Float,
{
    type Elem = S::Elem;

    fn n_components(&self) -> usize {
        self.len()
    }

    fn magnitude(&self, index: usize) -> S::Elem {
        self[index]
    }
}

/// Positions ordered by descending absolute magnitude.
///
/// The sort is stable, so equal magnitudes keep ascending index order and
/// repeated calls on the same input always agree. Comparison uses the IEEE
/// total order, so a NaN ranks ahead of every finite value instead of
/// scrambling the order.
pub fn rank_descending<M>(magnitudes: &M) -> Vec<usize>
where
    M: MagnitudeSequence + ?Sized,
{
    let mut order: Vec<usize> = (0..magnitudes.n_components()).collect();
    order.sort_by(|&a, &b| {
        let lhs = magnitudes.magnitude(a).abs().to_f64().unwrap_or(f64::NAN);
        let rhs = magnitudes.magnitude(b).abs().to_f64().unwrap_or(f64::NAN);
        rhs.total_cmp(&lhs)
    });
    order
}

/// Sum of absolute magnitudes.
pub fn total_magnitude<M>(magnitudes: &M) -> M::Elem
where
    M: MagnitudeSequence + ?Sized,
{
    (0..magnitudes.n_components()).fold(<M::Elem as Zero>::zero(), |acc, i| {
        acc + magnitudes.magnitude(i).abs()
    })
}

/// Each absolute magnitude as a share of the absolute total.
///
/// Fails if a non-empty sequence carries no mass at all.
pub fn proportions<M>(magnitudes: &M) -> RetentionResult<Array1<M::Elem>>
where
    M: MagnitudeSequence + ?Sized,
{
    let n = magnitudes.n_components();
    let total = total_magnitude(magnitudes);
    if n > 0 && total <= <M::Elem as Zero>::zero() {
        return Err(RetentionError::invalid(
            "magnitudes",
            "absolute magnitudes sum to zero",
        ));
    }

    Ok(Array1::from_shape_fn(n, |i| magnitudes.magnitude(i).abs() / total))
}

pub(crate) fn ensure_finite<M>(magnitudes: &M) -> RetentionResult<()>
where
    M: MagnitudeSequence + ?Sized,
{
    for i in 0..magnitudes.n_components() {
        if !magnitudes.magnitude(i).is_finite() {
            return Err(RetentionError::invalid(
                "magnitudes",
                format!("value at index {} is not finite", i),
            ));
        }
    }
    Ok(())
}

/// Accepts any numeric count, rejecting non-positive or fractional values.
pub(crate) fn positive_count<K: ToPrimitive>(value: K, name: &'static str) -> RetentionResult<usize> {
    let as_float = value
        .to_f64()
        .ok_or_else(|| RetentionError::invalid(name, "not representable as a number"))?;
    if !as_float.is_finite() || as_float <= 0.0 || as_float.fract() != 0.0 {
        return Err(RetentionError::invalid(
            name,
            format!("must be a positive integer, got {}", as_float),
        ));
    }

    value
        .to_usize()
        .ok_or_else(|| RetentionError::invalid(name, format!("{} does not fit in usize", as_float)))
}
