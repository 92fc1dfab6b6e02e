//! # Retention Criteria
//!
//! Rules deciding which components of a PCA or factor analysis to keep, given
//! their magnitudes (eigenvalues or explained-variance shares).
//!
//! ## Available criteria
//! - [`retain_top_n`]: keep a fixed number of the largest components
//! - [`retain_top_pct`]: keep the smallest set reaching a share of the total
//! - [`retain_kaiser`]: keep components at or above the uniform mean `1 / N`
//! - [`retain_broken_stick`]: keep components beating the broken-stick null
//!
//! Every criterion ranks by absolute magnitude internally, so the input does
//! not need to be sorted. The returned indices are in rank order (largest
//! first, ties by ascending index): the last element is always the weakest
//! retained component.

use log::{debug, trace, warn};
use num_traits::{Float, NumCast, One, ToPrimitive, Zero};

use crate::broken_stick::BrokenStickModel;
use crate::error::{RetentionError, RetentionResult};
use crate::utils::{ensure_finite, positive_count, proportions, rank_descending, MagnitudeSequence};

mod method;

pub use method::RetentionMethod;

/// How [`retain_broken_stick_with`] treats ranks after the first one that
/// fails to beat its expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BrokenStickRule {
    /// Stop at the first rank whose magnitude does not beat the model. The
    /// result is always a prefix of the ranking.
    #[default]
    StopAtFirstFailure,
    /// Each rank is compared on its own; a later rank may still be retained
    /// after an earlier one failed.
    PerRank,
}

/// Keeps the `num_keep` components with the largest absolute magnitude.
///
/// `num_keep` may be any numeric type but must hold a positive integer:
/// `0`, `-1` and `-1.2` fail with `InvalidArgument` before ranking. Asking for
/// more components than exist retains all of them.
pub fn retain_top_n<M, K>(magnitudes: &M, num_keep: K) -> RetentionResult<Vec<usize>>
where
    M: MagnitudeSequence + ?Sized,
    K: ToPrimitive,
{
    let num_keep = positive_count(num_keep, "num_keep")?;
    ensure_finite(magnitudes)?;

    let mut retained = rank_descending(magnitudes);
    retained.truncate(num_keep);

    debug!(
        "top_n retained {} of {} components (num_keep = {})",
        retained.len(),
        magnitudes.n_components(),
        num_keep
    );

    Ok(retained)
}

/// Keeps the smallest rank-ordered prefix whose share of the absolute total
/// reaches `keep_pct`.
///
/// `keep_pct` must lie in `(0, 1]`. With `1.0` every component is kept, even
/// when floating-point rounding leaves the running sum a hair under one.
///
/// # Postconditions
/// - the retained share is at least `keep_pct`
/// - dropping the last retained index would fall below `keep_pct`
/// - no dropped magnitude exceeds a retained one
pub fn retain_top_pct<M>(magnitudes: &M, keep_pct: M::Elem) -> RetentionResult<Vec<usize>>
where
    M: MagnitudeSequence + ?Sized,
{
    let zero = <M::Elem as Zero>::zero();
    let one = <M::Elem as One>::one();
    if !(keep_pct > zero && keep_pct <= one) {
        return Err(RetentionError::invalid(
            "keep_pct",
            format!(
                "must lie in (0, 1], got {}",
                keep_pct.to_f64().unwrap_or(f64::NAN)
            ),
        ));
    }
    ensure_finite(magnitudes)?;

    let shares = proportions(magnitudes)?;
    let order = rank_descending(magnitudes);

    let mut cumulative = zero;
    for (position, &index) in order.iter().enumerate() {
        cumulative = cumulative + shares[index];
        if cumulative >= keep_pct {
            debug!(
                "top_pct retained {} of {} components (share = {:.4})",
                position + 1,
                order.len(),
                cumulative.to_f64().unwrap_or(f64::NAN)
            );
            return Ok(order[..=position].to_vec());
        }
    }

    if !order.is_empty() {
        warn!(
            "top_pct: cumulative share {:e} never reached keep_pct, retaining all {} components",
            cumulative.to_f64().unwrap_or(f64::NAN),
            order.len()
        );
    }

    Ok(order)
}

/// Keeps every component whose absolute magnitude is at least `1 / num_factors`.
///
/// The cutoff is the mean share when the total mass of one is spread evenly
/// over `num_factors` components, so the magnitudes are expected to be
/// normalized (see [`crate::proportions`]). Ties at the cutoff are retained.
pub fn retain_kaiser<M, K>(magnitudes: &M, num_factors: K) -> RetentionResult<Vec<usize>>
where
    M: MagnitudeSequence + ?Sized,
    K: ToPrimitive,
{
    let num_factors = positive_count(num_factors, "num_factors")?;
    ensure_finite(magnitudes)?;

    let cutoff = <M::Elem as NumCast>::from(num_factors)
        .ok_or_else(|| RetentionError::invalid("num_factors", "not representable as float"))?
        .recip();

    let retained: Vec<usize> = rank_descending(magnitudes)
        .into_iter()
        .filter(|&i| magnitudes.magnitude(i).abs() >= cutoff)
        .collect();

    debug!(
        "kaiser retained {} of {} components (cutoff = {:e})",
        retained.len(),
        magnitudes.n_components(),
        cutoff.to_f64().unwrap_or(f64::NAN)
    );

    Ok(retained)
}

/// Keeps the leading components whose magnitudes beat the broken-stick
/// expectation at their rank, stopping at the first rank that does not.
///
/// The retained set is a prefix of the descending ranking, so no dropped
/// component is larger than a retained one. Use [`retain_broken_stick_with`]
/// and [`BrokenStickRule::PerRank`] to judge every rank independently.
///
/// The model must have been built for exactly as many components as
/// `magnitudes` holds, otherwise `DimensionMismatch` is returned.
pub fn retain_broken_stick<M>(
    magnitudes: &M,
    broken_stick: &BrokenStickModel<M::Elem>,
) -> RetentionResult<Vec<usize>>
where
    M: MagnitudeSequence + ?Sized,
{
    retain_broken_stick_with(magnitudes, broken_stick, BrokenStickRule::StopAtFirstFailure)
}

/// Broken-stick retention with an explicit [`BrokenStickRule`].
///
/// Rank `k` is retained when its absolute magnitude is strictly greater than
/// `broken_stick.expected_value(k)`.
pub fn retain_broken_stick_with<M>(
    magnitudes: &M,
    broken_stick: &BrokenStickModel<M::Elem>,
    rule: BrokenStickRule,
) -> RetentionResult<Vec<usize>>
where
    M: MagnitudeSequence + ?Sized,
{
    if broken_stick.n_factors() != magnitudes.n_components() {
        return Err(RetentionError::DimensionMismatch {
            expected: broken_stick.n_factors(),
            actual: magnitudes.n_components(),
        });
    }
    ensure_finite(magnitudes)?;

    let expected = broken_stick.expected_values();
    let mut retained = Vec::new();
    for (rank, index) in rank_descending(magnitudes).into_iter().enumerate() {
        let observed = magnitudes.magnitude(index).abs();
        let exceeds = observed > expected[rank];
        trace!(
            "broken_stick rank {}: index {} observed {:e} expected {:e}",
            rank,
            index,
            observed.to_f64().unwrap_or(f64::NAN),
            expected[rank].to_f64().unwrap_or(f64::NAN)
        );

        if exceeds {
            retained.push(index);
        } else if rule == BrokenStickRule::StopAtFirstFailure {
            break;
        }
    }

    debug!(
        "broken_stick ({:?}) retained {} of {} components",
        rule,
        retained.len(),
        magnitudes.n_components()
    );

    Ok(retained)
}
