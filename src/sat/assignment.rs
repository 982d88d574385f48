//! Turning model probabilities into discrete assignments.
//!
//! Variable `i` is true iff its probability is strictly greater than
//! [`SATISFACTION_THRESHOLD`]; a probability of exactly `0.5` (or `NaN`)
//! decodes to false. [`LiteralTruth`] expands an assignment into the doubled
//! literal layout so clause edges can be looked up directly.

use crate::sat::batch::IncidenceBatch;
use crate::sat::error::{EvalError, Result};
use bit_vec::BitVec;
use std::ops::Range;

/// Probabilities strictly above this decode to true.
pub const SATISFACTION_THRESHOLD: f64 = 0.5;

/// One boolean per variable. Never edited once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Assignment(BitVec);

impl Assignment {
    /// Thresholds every probability. `NaN` decodes to false.
    #[must_use]
    pub fn from_probabilities(probabilities: &[f64]) -> Self {
        Self(
            probabilities
                .iter()
                .map(|&p| p > SATISFACTION_THRESHOLD)
                .collect(),
        )
    }

    /// Decodes a batch-wide probability vector.
    ///
    /// # Errors
    ///
    /// [`EvalError::ShapeMismatch`] if `probabilities` does not hold exactly
    /// one value per variable of `batch`.
    pub fn materialize(batch: &IncidenceBatch, probabilities: &[f64]) -> Result<Self> {
        if probabilities.len() != batch.num_variables() {
            return Err(EvalError::shape(
                "probabilities",
                batch.num_variables(),
                probabilities.len(),
            ));
        }
        Ok(Self::from_probabilities(probabilities))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the variable at batch-wide index `var`.
    #[must_use]
    pub fn value(&self, var: usize) -> Option<bool> {
        self.0.get(var)
    }

    /// Values in variable order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter()
    }

    /// Copy of the variables in `range`, typically one formula's share of a
    /// batch-wide assignment.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self(self.0.iter().skip(range.start).take(range.len()).collect())
    }

    /// Splits a batch-wide assignment into one assignment per formula, in a
    /// single pass.
    ///
    /// # Errors
    ///
    /// [`EvalError::ShapeMismatch`] if the assignment does not cover exactly
    /// the batch's variables.
    pub fn split(&self, batch: &IncidenceBatch) -> Result<Vec<Self>> {
        if self.len() != batch.num_variables() {
            return Err(EvalError::shape("assignment", batch.num_variables(), self.len()));
        }
        let mut bits = self.0.iter();
        Ok(batch
            .variable_counts()
            .iter()
            .map(|&n| Self(bits.by_ref().take(n).collect()))
            .collect())
    }

    /// Positive literal truth at even slots, its complement at odd slots.
    #[must_use]
    pub fn literal_truth(&self) -> LiteralTruth {
        let mut bits = BitVec::with_capacity(self.len() * 2);
        for v in self.iter() {
            bits.push(v);
            bits.push(!v);
        }
        LiteralTruth(bits)
    }
}

impl FromIterator<bool> for Assignment {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Doubled-length truth table indexed by literal slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralTruth(BitVec);

impl LiteralTruth {
    /// Number of literal slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no literal slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Truth of the literal at slot `literal`.
    #[must_use]
    pub fn get(&self, literal: usize) -> Option<bool> {
        self.0.get(literal)
    }
}
