//! Error types shared by the retention criteria and the broken-stick model.

use thiserror::Error;

pub type RetentionResult<T> = Result<T, RetentionError>;

/// Errors raised while validating retention inputs.
///
/// Every variant is produced before any ranking or accumulation happens, so a
/// failed call never hands back a partial index set.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RetentionError {
    /// A parameter or magnitude lies outside its documented domain.
    ///
    /// Counts such as `num_keep` and `num_factors` must be positive integers,
    /// `keep_pct` must lie in `(0, 1]`, and magnitudes must be finite.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Two sequences that must be aligned position by position differ in length.
    #[error("Dimension mismatch: expected {expected} components, got {actual}")]
    DimensionMismatch {
        /// Length required by the reference (model or matrix axis)
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },
}

/// Coarse error category, for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    DimensionMismatch,
}

impl RetentionError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        RetentionError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RetentionError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            RetentionError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
        }
    }
}
