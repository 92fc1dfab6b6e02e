use num_traits::NumCast;

use crate::broken_stick::BrokenStickModel;
use crate::error::{RetentionError, RetentionResult};
use crate::retention::{
    retain_broken_stick_with, retain_kaiser, retain_top_n, retain_top_pct, BrokenStickRule,
};
use crate::utils::{proportions, MagnitudeSequence};

/// Retention criterion chosen by configuration.
///
/// Unlike the free functions, [`RetentionMethod::retain`] accepts raw
/// eigenvalues as well as normalized shares: the Kaiser cutoff is applied to
/// the shares, and the broken-stick model is scaled to the sequence's total.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RetentionMethod {
    TopN {
        num_keep: usize,
    },
    TopPct {
        keep_pct: f64,
    },
    /// `num_factors: None` uses the sequence length.
    Kaiser {
        num_factors: Option<usize>,
    },
    BrokenStick {
        rule: BrokenStickRule,
    },
}

impl Default for RetentionMethod {
    fn default() -> Self {
        Self::BrokenStick {
            rule: BrokenStickRule::default(),
        }
    }
}

impl RetentionMethod {
    pub fn retain<M>(&self, magnitudes: &M) -> RetentionResult<Vec<usize>>
    where
        M: MagnitudeSequence + ?Sized,
    {
        match *self {
            RetentionMethod::TopN { num_keep } => retain_top_n(magnitudes, num_keep),
            RetentionMethod::TopPct { keep_pct } => {
                let keep_pct = <M::Elem as NumCast>::from(keep_pct).ok_or_else(|| {
                    RetentionError::invalid("keep_pct", "not representable in magnitude type")
                })?;
                retain_top_pct(magnitudes, keep_pct)
            }
            RetentionMethod::Kaiser { num_factors } => {
                if magnitudes.is_empty() && num_factors.is_none() {
                    return Ok(Vec::new());
                }
                let num_factors = num_factors.unwrap_or_else(|| magnitudes.n_components());
                let shares = proportions(magnitudes)?;
                retain_kaiser(&shares, num_factors)
            }
            RetentionMethod::BrokenStick { rule } => {
                if magnitudes.is_empty() {
                    return Ok(Vec::new());
                }
                let broken_stick = BrokenStickModel::from_magnitudes(magnitudes)?;
                retain_broken_stick_with(magnitudes, &broken_stick, rule)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::retention::retain_broken_stick;
    use crate::retention::tests::{geometric_magnitudes, random_magnitudes};

    #[test]
    fn test_default_is_truncating_broken_stick() {
        assert_eq!(
            RetentionMethod::default(),
            RetentionMethod::BrokenStick {
                rule: BrokenStickRule::StopAtFirstFailure
            }
        );
    }

    #[test]
    fn test_dispatch_matches_free_functions_on_normalized_input() {
        let data = random_magnitudes(100, 5);

        assert_eq!(
            RetentionMethod::TopN { num_keep: 7 }.retain(&data).unwrap(),
            retain_top_n(&data, 7).unwrap()
        );
        assert_eq!(
            RetentionMethod::TopPct { keep_pct: 0.9 }.retain(&data).unwrap(),
            retain_top_pct(&data, 0.9).unwrap()
        );

        let data = geometric_magnitudes(100);
        assert_eq!(
            RetentionMethod::Kaiser { num_factors: None }
                .retain(&data)
                .unwrap()
                .len(),
            22
        );
        let bs = BrokenStickModel::new(100).unwrap();
        assert_eq!(
            RetentionMethod::default().retain(&data).unwrap(),
            retain_broken_stick(&data, &bs).unwrap()
        );
    }

    #[test]
    fn test_raw_eigenvalues() {
        // Correlation-matrix eigenvalues sum to the number of variables.
        let eigenvalues = vec![2.6, 1.1, 0.2, 0.1];

        let kaiser = RetentionMethod::Kaiser { num_factors: None };
        assert_eq!(kaiser.retain(&eigenvalues).unwrap(), vec![0, 1]);

        // Scaled model: 2.083, 1.083, 0.583, 0.25
        let broken_stick = RetentionMethod::default();
        assert_eq!(broken_stick.retain(&eigenvalues).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_f32_magnitudes() {
        let vals = vec![0.5f32, 0.3, 0.2];

        let retained = RetentionMethod::TopPct { keep_pct: 0.75 }.retain(&vals).unwrap();
        assert_eq!(retained, vec![0, 1]);
    }

    #[test]
    fn test_empty_and_invalid() {
        let empty: Vec<f64> = Vec::new();
        assert!(RetentionMethod::default().retain(&empty).unwrap().is_empty());
        assert!(RetentionMethod::Kaiser { num_factors: None }
            .retain(&empty)
            .unwrap()
            .is_empty());

        let vals = vec![0.5, 0.5];
        let err = RetentionMethod::TopN { num_keep: 0 }.retain(&vals).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = RetentionMethod::TopPct { keep_pct: 1.5 }.retain(&vals).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_config() {
        let method: RetentionMethod =
            serde_json::from_str(r#"{"TopPct":{"keep_pct":0.75}}"#).unwrap();
        assert_eq!(method, RetentionMethod::TopPct { keep_pct: 0.75 });

        let json = serde_json::to_string(&RetentionMethod::default()).unwrap();
        assert_eq!(json, r#"{"BrokenStick":{"rule":"StopAtFirstFailure"}}"#);
    }
}
