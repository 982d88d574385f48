//! Clause and formula satisfaction by segmented reduction.
//!
//! Satisfaction is computed in two flat passes over the batch:
//! 1. every edge contributes its literal's truth to its clause, and each
//!    clause's sum is clamped to 1;
//! 2. every clause contributes its clamped value to its formula, and the
//!    formula is satisfied iff the sum equals its clause count.
//!
//! A clause with no edges sums to 0 and so is never satisfied.

use crate::sat::assignment::LiteralTruth;
use crate::sat::batch::IncidenceBatch;
use crate::sat::error::{EvalError, Result};
use itertools::{EitherOrBoth, Itertools};

/// Sums `values` into `groups` buckets keyed by the parallel `keys` slice.
///
/// # Errors
///
/// - [`EvalError::ShapeMismatch`] if `values` and `keys` differ in length.
/// - [`EvalError::IndexOutOfRange`] if a key is not below `groups`.
pub fn segmented_sum<I>(values: I, keys: &[usize], groups: usize) -> Result<Vec<u32>>
where
    I: IntoIterator<Item = u32>,
{
    let mut sums = vec![0_u32; groups];
    let mut seen = 0;
    let mut mismatched = false;
    for pair in values.into_iter().zip_longest(keys) {
        match pair {
            EitherOrBoth::Both(value, &key) => {
                let slot = sums
                    .get_mut(key)
                    .ok_or(EvalError::out_of_range("group key", key, groups))?;
                *slot += value;
                seen += 1;
            }
            EitherOrBoth::Left(_) => {
                seen += 1;
                mismatched = true;
            }
            EitherOrBoth::Right(_) => mismatched = true,
        }
    }
    if mismatched {
        return Err(EvalError::shape("segmented values", keys.len(), seen));
    }
    Ok(sums)
}

/// Satisfaction of every clause and formula in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Satisfaction {
    /// 0 or 1 per clause.
    pub clauses: Vec<u32>,
    /// One flag per formula.
    pub formulas: Vec<bool>,
}

impl Satisfaction {
    /// Number of satisfied formulas.
    #[must_use]
    pub fn num_satisfied(&self) -> usize {
        self.formulas.iter().filter(|&&s| s).count()
    }
}

/// Per-clause satisfaction, clamped to {0, 1}.
///
/// # Errors
///
/// [`EvalError::IndexOutOfRange`] if an edge names a literal past the end of
/// `truth` or a clause outside the batch.
pub fn clause_satisfaction(batch: &IncidenceBatch, truth: &LiteralTruth) -> Result<Vec<u32>> {
    let literal_values = batch
        .edge_literals()
        .iter()
        .map(|&l| {
            truth
                .get(l)
                .map(u32::from)
                .ok_or(EvalError::out_of_range("literal", l, truth.len()))
        })
        .collect::<Result<Vec<u32>>>()?;

    let mut sums = segmented_sum(literal_values, batch.edge_clauses(), batch.num_clauses())?;
    for s in &mut sums {
        *s = (*s).min(1);
    }
    Ok(sums)
}

/// Full satisfaction report for one decoded assignment.
///
/// # Errors
///
/// [`EvalError::ShapeMismatch`] if `truth` is not exactly the batch's literal
/// count long, plus anything [`clause_satisfaction`] reports.
pub fn evaluate(batch: &IncidenceBatch, truth: &LiteralTruth) -> Result<Satisfaction> {
    if truth.len() != batch.num_literals() {
        return Err(EvalError::shape("literal truth", batch.num_literals(), truth.len()));
    }

    let clauses = clause_satisfaction(batch, truth)?;
    let per_formula = segmented_sum(
        clauses.iter().copied(),
        batch.clause_to_formula(),
        batch.num_formulas(),
    )?;

    let formulas = per_formula
        .iter()
        .zip(batch.clause_counts())
        .map(|(&sum, &count)| sum as usize == count)
        .collect();

    Ok(Satisfaction { clauses, formulas })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Assignment;
    use crate::sat::batch::BatchBuilder;
    use crate::sat::cnf::Cnf;

    fn batch_of(cnfs: &[Cnf]) -> IncidenceBatch {
        cnfs.iter().collect::<BatchBuilder>().build().unwrap()
    }

    fn example() -> Cnf {
        Cnf::new(vec![vec![1, 2], vec![-1, 3]], 3)
    }

    #[test]
    fn test_segmented_sum() {
        let sums = segmented_sum([1, 2, 3, 4], &[0, 2, 0, 2], 3).unwrap();
        assert_eq!(sums, vec![4, 0, 6]);
    }

    #[test]
    fn test_segmented_sum_bad_key() {
        let err = segmented_sum([1], &[3], 3).unwrap_err();
        assert!(matches!(err, EvalError::IndexOutOfRange { index: 3, bound: 3, .. }));
    }

    #[test]
    fn test_segmented_sum_length_mismatch() {
        let err = segmented_sum([1], &[0, 0], 1).unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_segmented_sum_extra_values() {
        let err = segmented_sum([1, 1, 1], &[0], 1).unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { expected: 1, found: 3, .. }));
    }

    #[test]
    fn test_clause_satisfaction_short_truth() {
        let batch = batch_of(&[example()]);
        let truth = Assignment::from_probabilities(&[0.9]).literal_truth();
        let err = clause_satisfaction(&batch, &truth).unwrap_err();
        assert!(matches!(err, EvalError::IndexOutOfRange { bound: 2, .. }));
    }

    #[test]
    fn test_satisfying_assignment() {
        let batch = batch_of(&[example()]);
        let truth = Assignment::from_probabilities(&[0.9, 0.1, 0.9]).literal_truth();
        let sat = evaluate(&batch, &truth).unwrap();
        assert_eq!(sat.clauses, vec![1, 1]);
        assert_eq!(sat.formulas, vec![true]);
    }

    #[test]
    fn test_falsifying_assignment() {
        let batch = batch_of(&[example()]);
        let truth = Assignment::from_probabilities(&[0.1, 0.1, 0.1]).literal_truth();
        let sat = evaluate(&batch, &truth).unwrap();
        assert_eq!(sat.clauses, vec![0, 1]);
        assert_eq!(sat.formulas, vec![false]);
    }

    #[test]
    fn test_clause_with_two_true_literals_is_clamped() {
        let batch = batch_of(&[Cnf::new(vec![vec![1, 2, 3]], 3)]);
        let truth = Assignment::from_probabilities(&[0.9, 0.9, 0.9]).literal_truth();
        assert_eq!(clause_satisfaction(&batch, &truth).unwrap(), vec![1]);
    }

    #[test]
    fn test_empty_clause_never_satisfied() {
        let batch = batch_of(&[Cnf::new(vec![vec![1], vec![]], 1)]);
        for p in [0.0, 1.0] {
            let truth = Assignment::from_probabilities(&[p]).literal_truth();
            let sat = evaluate(&batch, &truth).unwrap();
            assert_eq!(sat.clauses[1], 0);
            assert!(!sat.formulas[0]);
        }
    }

    #[test]
    fn test_formula_without_clauses_is_satisfied() {
        let batch = batch_of(&[Cnf::new(Vec::<Vec<i32>>::new(), 2)]);
        let truth = Assignment::from_probabilities(&[0.0, 0.0]).literal_truth();
        assert_eq!(evaluate(&batch, &truth).unwrap().formulas, vec![true]);
    }

    #[test]
    fn test_mixed_batch() {
        let batch = batch_of(&[example(), Cnf::new(vec![vec![1], vec![-1]], 1)]);
        let truth = Assignment::from_probabilities(&[0.9, 0.1, 0.9, 0.7]).literal_truth();
        let sat = evaluate(&batch, &truth).unwrap();
        assert_eq!(sat.formulas, vec![true, false]);
        assert_eq!(sat.num_satisfied(), 1);
    }

    #[test]
    fn test_truth_length_mismatch() {
        let batch = batch_of(&[example()]);
        let truth = Assignment::from_probabilities(&[0.9]).literal_truth();
        let err = evaluate(&batch, &truth).unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { expected: 6, found: 2, .. }));
    }

    #[test]
    fn test_matches_brute_force_on_random_batches() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..50 {
            let cnfs: Vec<Cnf> = (0..rng.usize(1..6))
                .map(|_| {
                    let vars = rng.usize(1..8);
                    let clauses: Vec<Vec<i32>> = (0..rng.usize(0..10))
                        .map(|_| {
                            (0..rng.usize(0..4))
                                .map(|_| {
                                    let v = rng.i32(1..=vars as i32);
                                    if rng.bool() { v } else { -v }
                                })
                                .collect()
                        })
                        .collect();
                    Cnf::new(clauses, vars)
                })
                .collect();
            let batch = batch_of(&cnfs);
            let probs: Vec<f64> = (0..batch.num_variables()).map(|_| rng.f64()).collect();
            let assignment = Assignment::from_probabilities(&probs);
            let sat = evaluate(&batch, &assignment.literal_truth()).unwrap();

            for (f, cnf) in cnfs.iter().enumerate() {
                let values: Vec<bool> = assignment
                    .slice(batch.variable_range(f))
                    .iter()
                    .collect();
                assert_eq!(sat.formulas[f], cnf.verify(&values));
            }
        }
    }
}
