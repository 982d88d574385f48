//! Decoding policies.
//!
//! A policy decides how many materialise/evaluate rounds a batch goes through
//! and what gets recorded:
//!
//! - `Standard`: one probability vector, one round, one verdict per formula.
//! - `TwoClustering`: each round carries two candidate assignments per formula
//!   (a clustering and its mirror). Only diversity is recorded; these rounds
//!   never credit a formula as solved.
//! - `MultipleAssignments`: each round carries one refined assignment per
//!   formula. A formula counts as solved if any round satisfies it.
//!
//! Diversity is recorded per round index as the sum, over the batch, of the
//! number of distinct assignments seen so far for each formula.

use crate::sat::assignment::Assignment;
use crate::sat::batch::IncidenceBatch;
use crate::sat::distinct::DistinctTracker;
use crate::sat::error::{EvalError, Result};
use crate::sat::log_targets;
use crate::sat::model::ModelOutput;
use crate::sat::satisfaction::evaluate;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Enum representing the decoding policy used for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodingPolicy {
    /// Threshold a single probability vector once.
    #[default]
    Standard,
    /// Two candidate assignments per round; diversity only.
    TwoClustering,
    /// One refined assignment per round; solved if any round satisfies.
    MultipleAssignments,
}

impl DecodingPolicy {
    /// Every policy, in the order they are listed to users.
    pub const ALL: [Self; 3] = [
        Self::Standard,
        Self::TwoClustering,
        Self::MultipleAssignments,
    ];
}

impl Display for DecodingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::TwoClustering => write!(f, "two-clustering"),
            Self::MultipleAssignments => write!(f, "multiple-assignments"),
        }
    }
}

impl FromStr for DecodingPolicy {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "standard" => Ok(Self::Standard),
            "two-clustering" | "2-clustering" | "dual-cluster" => Ok(Self::TwoClustering),
            "multiple-assignments" | "multi-sample-iterative" => Ok(Self::MultipleAssignments),
            _ => Err(EvalError::UnknownPolicy(s.to_string())),
        }
    }
}

/// A policy together with the number of refinement rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodingConfig {
    /// How model output is turned into verdicts.
    pub policy: DecodingPolicy,
    /// Number of refinement rounds `K`. Round 0 is the initial output, so the
    /// model may supply up to `K + 1` rounds.
    pub rounds: usize,
}

impl DecodingConfig {
    /// Config for `policy` with `rounds` refinements.
    #[must_use]
    pub const fn new(policy: DecodingPolicy, rounds: usize) -> Self {
        Self { policy, rounds }
    }

    /// Parses the policy name as well.
    ///
    /// # Errors
    ///
    /// [`EvalError::UnknownPolicy`] for an unrecognised name.
    pub fn parse(policy: &str, rounds: usize) -> Result<Self> {
        Ok(Self::new(policy.parse()?, rounds))
    }

    /// Length of the diversity curve.
    #[must_use]
    pub const fn curve_len(&self) -> usize {
        self.rounds + 1
    }
}

/// What one batch contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Formulas in the batch.
    pub formulas: usize,
    /// Final per-formula verdict under the policy.
    pub solved: Vec<bool>,
    /// Number of formulas solved so far after each supplied round.
    pub solved_by_round: Vec<usize>,
    /// Summed distinct-assignment counts per round index, `curve_len` long.
    pub diversity: Vec<usize>,
}

impl BatchOutcome {
    /// Formulas whose final verdict is solved.
    #[must_use]
    pub fn num_solved(&self) -> usize {
        self.solved.iter().filter(|&&s| s).count()
    }
}

/// Applies a [`DecodingConfig`] to batches.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecodingConfig,
}

impl Decoder {
    /// A decoder for `config`.
    #[must_use]
    pub const fn new(config: DecodingConfig) -> Self {
        Self { config }
    }

    /// The configuration this decoder was built with.
    #[must_use]
    pub const fn config(&self) -> &DecodingConfig {
        &self.config
    }

    /// Runs the configured policy over one batch.
    ///
    /// # Errors
    ///
    /// - [`EvalError::UnexpectedOutput`] if `output` is not the kind the
    ///   policy consumes.
    /// - [`EvalError::ShapeMismatch`] if no rounds, or more than `K + 1`
    ///   rounds, are supplied, or a probability vector has the wrong length.
    /// - Anything the satisfaction evaluator reports.
    pub fn decode(&self, batch: &IncidenceBatch, output: &ModelOutput) -> Result<BatchOutcome> {
        match (self.config.policy, output) {
            (DecodingPolicy::Standard, ModelOutput::Probabilities(p)) => self.standard(batch, p),
            (DecodingPolicy::TwoClustering, ModelOutput::Clusters(rounds)) => {
                self.check_round_count(rounds.len())?;
                self.two_clustering(batch, rounds)
            }
            (DecodingPolicy::MultipleAssignments, ModelOutput::Rounds(rounds)) => {
                self.check_round_count(rounds.len())?;
                self.multiple_assignments(batch, rounds)
            }
            (policy, output) => Err(EvalError::UnexpectedOutput {
                policy: policy.to_string(),
                found: output.kind(),
            }),
        }
    }

    fn check_round_count(&self, supplied: usize) -> Result<()> {
        if supplied == 0 || supplied > self.config.curve_len() {
            return Err(EvalError::shape("rounds", self.config.curve_len(), supplied));
        }
        Ok(())
    }

    fn standard(&self, batch: &IncidenceBatch, probabilities: &[f64]) -> Result<BatchOutcome> {
        let assignment = Assignment::materialize(batch, probabilities)?;
        let satisfaction = evaluate(batch, &assignment.literal_truth())?;
        let solved = satisfaction.num_satisfied();

        Ok(BatchOutcome {
            formulas: batch.num_formulas(),
            solved: satisfaction.formulas,
            solved_by_round: vec![solved],
            diversity: vec![0; self.config.curve_len()],
        })
    }

    fn two_clustering(
        &self,
        batch: &IncidenceBatch,
        rounds: &[[Vec<f64>; 2]],
    ) -> Result<BatchOutcome> {
        let formulas = batch.num_formulas();
        let mut tracker = DistinctTracker::new(formulas);
        let mut diversity = vec![0; self.config.curve_len()];

        for (round, candidates) in rounds.iter().enumerate() {
            for probabilities in candidates {
                let assignment = Assignment::materialize(batch, probabilities)?;
                for (f, part) in assignment.split(batch)?.into_iter().enumerate() {
                    tracker.insert(f, part);
                }
            }
            diversity[round] = tracker.total();
            log::trace!(
                target: log_targets::DECODING,
                "two-clustering round {round}: {} distinct",
                diversity[round]
            );
        }

        Ok(BatchOutcome {
            formulas,
            solved: vec![false; formulas],
            solved_by_round: vec![0; rounds.len()],
            diversity,
        })
    }

    fn multiple_assignments(
        &self,
        batch: &IncidenceBatch,
        rounds: &[Vec<f64>],
    ) -> Result<BatchOutcome> {
        let formulas = batch.num_formulas();
        let mut tracker = DistinctTracker::new(formulas);
        let mut diversity = vec![0; self.config.curve_len()];
        let mut solved = vec![false; formulas];
        let mut solved_by_round = Vec::with_capacity(rounds.len());

        for (round, probabilities) in rounds.iter().enumerate() {
            let assignment = Assignment::materialize(batch, probabilities)?;
            for (f, part) in assignment.split(batch)?.into_iter().enumerate() {
                tracker.insert(f, part);
            }
            diversity[round] = tracker.total();

            let satisfaction = evaluate(batch, &assignment.literal_truth())?;
            for (acc, now) in solved.iter_mut().zip(&satisfaction.formulas) {
                *acc |= *now;
            }
            let so_far = solved.iter().filter(|&&s| s).count();
            solved_by_round.push(so_far);

            log::trace!(
                target: log_targets::DECODING,
                "multiple-assignments round {round}: {} distinct, {so_far}/{formulas} solved",
                diversity[round]
            );
        }

        Ok(BatchOutcome {
            formulas,
            solved,
            solved_by_round,
            diversity,
        })
    }
}
