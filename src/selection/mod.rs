use ndarray::{Array2, ArrayBase, Axis, Data, Ix2};

use crate::error::{RetentionError, RetentionResult};

/// Keeps only the retained components of a loadings or scores matrix.
///
/// `axis` is the component axis: `Axis(0)` for a components × features matrix
/// (as produced by most PCA fits), `Axis(1)` for a samples × components score
/// matrix. The output follows the order of `retained`.
///
/// An index past the end of `axis` is reported as `DimensionMismatch`, with
/// `actual` set to the number of components the index would require.
pub fn select_components<A, S>(
    matrix: &ArrayBase<S, Ix2>,
    retained: &[usize],
    axis: Axis,
) -> RetentionResult<Array2<A>>
where
    A: Clone,
    S: Data<Elem = A>,
{
    let n_components = matrix.len_of(axis);
    if let Some(&out_of_range) = retained.iter().find(|&&i| i >= n_components) {
        return Err(RetentionError::DimensionMismatch {
            expected: n_components,
            actual: out_of_range + 1,
        });
    }

    Ok(matrix.select(axis, retained))
}
