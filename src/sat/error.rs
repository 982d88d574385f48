//! Error type shared by every stage of the evaluator.
//!
//! All failures here are contract violations from whoever produced the input
//! (the batch loader, the model, or the configuration). Nothing is retried and
//! nothing is replaced with a default: the current batch is abandoned and the
//! error is surfaced to the caller.

use std::io;
use thiserror::Error;

/// Errors raised while loading, decoding or verifying a batch.
#[derive(Error, Debug)]
pub enum EvalError {
    /// A sequence did not have the length the batch declares for it.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Which sequence disagreed.
        what: &'static str,
        /// Length declared by the batch or configuration.
        expected: usize,
        /// Length actually supplied.
        found: usize,
    },

    /// An edge or group key pointed outside the batch.
    #[error("{what} index {index} out of range (bound {bound})")]
    IndexOutOfRange {
        /// Which index space was violated.
        what: &'static str,
        /// The offending index.
        index: usize,
        /// Exclusive upper bound that applied.
        bound: usize,
    },

    /// The decoding mode name is not one of the supported policies.
    #[error("unknown decoding policy '{0}' (expected standard, two-clustering or multiple-assignments)")]
    UnknownPolicy(String),

    /// The model produced output of the wrong kind for the selected policy,
    /// e.g. a single vector per round where pairs were required.
    #[error("decoding policy '{policy}' cannot consume {found}")]
    UnexpectedOutput {
        /// Name of the active policy.
        policy: String,
        /// Description of what was supplied.
        found: &'static str,
    },

    /// Per-formula grouping is inconsistent (non-contiguous, or counts disagree).
    #[error("invalid incidence batch: {0}")]
    InvalidBatch(String),

    /// Malformed DIMACS input.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The prediction source has nothing for a formula in the batch.
    #[error("no prediction recorded for formula '{0}'")]
    MissingPrediction(String),

    /// Reading a formula or predictions file failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A predictions file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    /// Shorthand for a [`EvalError::ShapeMismatch`].
    #[must_use]
    pub const fn shape(what: &'static str, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            found,
        }
    }

    /// Shorthand for a [`EvalError::IndexOutOfRange`].
    #[must_use]
    pub const fn out_of_range(what: &'static str, index: usize, bound: usize) -> Self {
        Self::IndexOutOfRange { what, index, bound }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_shape_mismatch() {
        let e = EvalError::shape("probabilities", 3, 2);
        assert_eq!(
            e.to_string(),
            "shape mismatch in probabilities: expected 3, found 2"
        );
    }

    #[test]
    fn test_display_unknown_policy() {
        let e = EvalError::UnknownPolicy("greedy".to_string());
        assert!(e.to_string().contains("'greedy'"));
    }
}
