//! Running totals across batches.
//!
//! Totals change only through [`RunningMetrics::accumulate`] (one completed
//! batch) or [`RunningMetrics::merge`] (another worker's totals). Both check
//! their input before touching anything, so a rejected batch leaves the
//! totals exactly as they were.

use crate::sat::decoding::BatchOutcome;
use crate::sat::error::{EvalError, Result};
use crate::sat::log_targets;
use serde::Serialize;

/// Totals accumulated over every batch of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunningMetrics {
    total: usize,
    satisfied: usize,
    diversity: Vec<u64>,
}

impl RunningMetrics {
    /// Empty totals for a curve of `curve_len` round indices.
    #[must_use]
    pub fn new(curve_len: usize) -> Self {
        Self {
            total: 0,
            satisfied: 0,
            diversity: vec![0; curve_len],
        }
    }

    /// Folds one batch in.
    ///
    /// # Errors
    ///
    /// [`EvalError::ShapeMismatch`] if the outcome's diversity curve has the
    /// wrong length or its verdicts do not match its formula count.
    pub fn accumulate(&mut self, outcome: &BatchOutcome) -> Result<()> {
        if outcome.diversity.len() != self.diversity.len() {
            return Err(EvalError::shape(
                "diversity curve",
                self.diversity.len(),
                outcome.diversity.len(),
            ));
        }
        if outcome.solved.len() != outcome.formulas {
            return Err(EvalError::shape("verdicts", outcome.formulas, outcome.solved.len()));
        }

        let solved = outcome.num_solved();
        self.total += outcome.formulas;
        self.satisfied += solved;
        for (acc, &d) in self.diversity.iter_mut().zip(&outcome.diversity) {
            *acc += d as u64;
        }

        log::debug!(
            target: log_targets::METRICS,
            "batch of {} formulas, {solved} solved, running {}/{}",
            outcome.formulas,
            self.satisfied,
            self.total
        );
        Ok(())
    }

    /// Adds another set of totals into this one.
    ///
    /// # Errors
    ///
    /// [`EvalError::ShapeMismatch`] if the curves differ in length.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if other.diversity.len() != self.diversity.len() {
            return Err(EvalError::shape(
                "diversity curve",
                self.diversity.len(),
                other.diversity.len(),
            ));
        }
        self.total += other.total;
        self.satisfied += other.satisfied;
        for (acc, &d) in self.diversity.iter_mut().zip(&other.diversity) {
            *acc += d;
        }
        Ok(())
    }

    /// Formulas seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Formulas solved.
    #[must_use]
    pub const fn satisfied(&self) -> usize {
        self.satisfied
    }

    /// Solve rate and average diversity per round. With no formulas seen
    /// every ratio is `NaN`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn finalize(&self) -> EvalSummary {
        let total = self.total as f64;
        EvalSummary {
            total: self.total,
            satisfied: self.satisfied,
            solve_rate: self.satisfied as f64 / total,
            diversity_curve: self.diversity.iter().map(|&d| d as f64 / total).collect(),
        }
    }
}

/// Final numbers of a run. `NaN` serialises as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    /// Formulas evaluated.
    pub total: usize,
    /// Formulas solved.
    pub satisfied: usize,
    /// `satisfied / total`.
    pub solve_rate: f64,
    /// Average distinct assignments per formula, by round.
    pub diversity_curve: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(solved: Vec<bool>, diversity: Vec<usize>) -> BatchOutcome {
        BatchOutcome {
            formulas: solved.len(),
            solved_by_round: vec![solved.iter().filter(|&&s| s).count()],
            solved,
            diversity,
        }
    }

    #[test]
    fn test_half_solved() {
        let mut metrics = RunningMetrics::new(1);
        metrics.accumulate(&outcome(vec![true, false], vec![0])).unwrap();
        let summary = metrics.finalize();
        assert_eq!(summary.total, 2);
        assert!((summary.solve_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_diversity_curve_is_averaged() {
        let mut metrics = RunningMetrics::new(3);
        metrics.accumulate(&outcome(vec![false, false], vec![2, 3, 4])).unwrap();
        metrics.accumulate(&outcome(vec![false, false], vec![2, 5, 4])).unwrap();
        assert_eq!(metrics.finalize().diversity_curve, vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_empty_run_is_nan() {
        let summary = RunningMetrics::new(2).finalize();
        assert!(summary.solve_rate.is_nan());
        assert!(summary.diversity_curve.iter().all(|d| d.is_nan()));
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"solve_rate\":null"));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut metrics = RunningMetrics::new(1);
        metrics.accumulate(&outcome(vec![true], vec![1])).unwrap();
        assert_eq!(metrics.finalize(), metrics.finalize());
    }

    #[test]
    fn test_rejected_batch_leaves_totals() {
        let mut metrics = RunningMetrics::new(2);
        metrics.accumulate(&outcome(vec![true], vec![1, 1])).unwrap();
        let before = metrics.clone();
        assert!(metrics.accumulate(&outcome(vec![true], vec![1])).is_err());
        assert_eq!(metrics, before);
    }

    #[test]
    fn test_merge_matches_sequential() {
        let a = outcome(vec![true, false], vec![1, 2]);
        let b = outcome(vec![true, true, false], vec![3, 3]);

        let mut sequential = RunningMetrics::new(2);
        sequential.accumulate(&a).unwrap();
        sequential.accumulate(&b).unwrap();

        let mut left = RunningMetrics::new(2);
        left.accumulate(&a).unwrap();
        let mut right = RunningMetrics::new(2);
        right.accumulate(&b).unwrap();
        right.merge(&left).unwrap();

        assert_eq!(right, sequential);
        assert!(right.merge(&RunningMetrics::new(5)).is_err());
    }
}
