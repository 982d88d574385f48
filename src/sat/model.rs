//! The boundary to whatever produces variable probabilities.
//!
//! The evaluator never runs a network itself. An [`AssignmentModel`] is asked
//! for output once per batch, and the output shape depends on the policy:
//! one vector for `standard`, a vector per round for `multiple-assignments`,
//! and a pair of vectors per round for `two-clustering`. Every vector is
//! batch-wide: the formulas' probabilities concatenated in batch order.
//!
//! Two sources ship with the crate: [`RecordedPredictions`], read from a JSON
//! file written by the model's own tooling, and [`RandomGuess`], a seeded
//! uniform baseline.

use crate::sat::decoding::{DecodingConfig, DecodingPolicy};
use crate::sat::error::{EvalError, Result};
use crate::sat::loader::NamedBatch;
use crate::sat::log_targets;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw output of a model for one batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// One batch-wide vector.
    Probabilities(Vec<f64>),
    /// One batch-wide vector per round.
    Rounds(Vec<Vec<f64>>),
    /// Two batch-wide candidate vectors per round.
    Clusters(Vec<[Vec<f64>; 2]>),
}

impl ModelOutput {
    /// Short name of the variant, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Probabilities(_) => "a single probability vector",
            Self::Rounds(_) => "one probability vector per round",
            Self::Clusters(_) => "two probability vectors per round",
        }
    }
}

/// Something that produces variable probabilities for a batch.
pub trait AssignmentModel {
    /// Produces output for `batch` in the shape `config.policy` consumes.
    ///
    /// # Errors
    ///
    /// Implementation specific; typically [`EvalError::MissingPrediction`] or
    /// [`EvalError::ShapeMismatch`].
    fn infer(&mut self, batch: &NamedBatch, config: &DecodingConfig) -> Result<ModelOutput>;
}

/// One round of recorded output for one formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundPrediction {
    /// A single probability vector.
    Single(Vec<f64>),
    /// A clustering and its second candidate.
    Pair(Vec<f64>, Vec<f64>),
}

/// Recorded output for one formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaPrediction {
    /// Path relative to the formula root.
    pub name: String,
    /// Rounds in order, round 0 first.
    pub rounds: Vec<RoundPrediction>,
}

/// On-disk layout of a predictions file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionFile {
    /// Every recorded formula.
    pub formulas: Vec<FormulaPrediction>,
}

/// Predictions loaded ahead of time, keyed by formula name.
#[derive(Debug, Clone, Default)]
pub struct RecordedPredictions {
    by_name: FxHashMap<String, Vec<RoundPrediction>>,
}

impl RecordedPredictions {
    /// # Errors
    ///
    /// [`EvalError::Io`] or [`EvalError::Json`] if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let parsed: PredictionFile = serde_json::from_reader(std::io::BufReader::new(file))?;
        log::info!(
            target: log_targets::MODEL,
            "loaded predictions for {} formulas from {}",
            parsed.formulas.len(),
            path.display()
        );
        Ok(Self::from(parsed))
    }

    /// Number of recorded formulas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn rounds_for(&self, name: &str) -> Result<&[RoundPrediction]> {
        self.by_name
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| EvalError::MissingPrediction(name.to_string()))
    }

    /// All formulas of a batch must supply the same number of rounds.
    fn common_round_count(&self, batch: &NamedBatch) -> Result<usize> {
        let mut count = None;
        for name in &batch.names {
            let n = self.rounds_for(name)?.len();
            match count {
                None => count = Some(n),
                Some(c) if c != n => return Err(EvalError::shape("rounds", c, n)),
                Some(_) => {}
            }
        }
        Ok(count.unwrap_or(0))
    }
}

impl From<PredictionFile> for RecordedPredictions {
    fn from(file: PredictionFile) -> Self {
        Self {
            by_name: file
                .formulas
                .into_iter()
                .map(|p| (p.name, p.rounds))
                .collect(),
        }
    }
}

fn append_checked(out: &mut Vec<f64>, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(EvalError::shape("formula probabilities", expected, values.len()));
    }
    out.extend_from_slice(values);
    Ok(())
}

fn unexpected(policy: DecodingPolicy, found: &'static str) -> EvalError {
    EvalError::UnexpectedOutput {
        policy: policy.to_string(),
        found,
    }
}

impl AssignmentModel for RecordedPredictions {
    fn infer(&mut self, batch: &NamedBatch, config: &DecodingConfig) -> Result<ModelOutput> {
        let counts = batch.incidence.variable_counts();
        let total = batch.incidence.num_variables();

        match config.policy {
            // The final round is the model's answer.
            DecodingPolicy::Standard => {
                let mut out = Vec::with_capacity(total);
                for (name, &n) in batch.names.iter().zip(counts) {
                    match self.rounds_for(name)?.last() {
                        Some(RoundPrediction::Single(p)) => append_checked(&mut out, p, n)?,
                        Some(RoundPrediction::Pair(..)) => {
                            return Err(unexpected(config.policy, "a pair of vectors"));
                        }
                        None => return Err(EvalError::MissingPrediction(name.clone())),
                    }
                }
                Ok(ModelOutput::Probabilities(out))
            }
            DecodingPolicy::MultipleAssignments => {
                let rounds = self.common_round_count(batch)?;
                let mut out = vec![Vec::with_capacity(total); rounds];
                for (name, &n) in batch.names.iter().zip(counts) {
                    for (round, prediction) in self.rounds_for(name)?.iter().enumerate() {
                        match prediction {
                            RoundPrediction::Single(p) => append_checked(&mut out[round], p, n)?,
                            RoundPrediction::Pair(..) => {
                                return Err(unexpected(config.policy, "a pair of vectors"));
                            }
                        }
                    }
                }
                Ok(ModelOutput::Rounds(out))
            }
            DecodingPolicy::TwoClustering => {
                let rounds = self.common_round_count(batch)?;
                let mut out: Vec<[Vec<f64>; 2]> =
                    vec![[Vec::with_capacity(total), Vec::with_capacity(total)]; rounds];
                for (name, &n) in batch.names.iter().zip(counts) {
                    for (round, prediction) in self.rounds_for(name)?.iter().enumerate() {
                        match prediction {
                            RoundPrediction::Pair(a, b) => {
                                append_checked(&mut out[round][0], a, n)?;
                                append_checked(&mut out[round][1], b, n)?;
                            }
                            RoundPrediction::Single(_) => {
                                return Err(unexpected(config.policy, "a single vector"));
                            }
                        }
                    }
                }
                Ok(ModelOutput::Clusters(out))
            }
        }
    }
}

/// Uniform random probabilities. For multi-round policies it yields `K + 1`
/// rounds; in two-clustering the second candidate mirrors the first.
#[derive(Debug, Clone)]
pub struct RandomGuess {
    rng: fastrand::Rng,
}

impl RandomGuess {
    /// A generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn vector(&mut self, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.rng.f64()).collect()
    }
}

impl AssignmentModel for RandomGuess {
    fn infer(&mut self, batch: &NamedBatch, config: &DecodingConfig) -> Result<ModelOutput> {
        let n = batch.incidence.num_variables();
        Ok(match config.policy {
            DecodingPolicy::Standard => ModelOutput::Probabilities(self.vector(n)),
            DecodingPolicy::MultipleAssignments => ModelOutput::Rounds(
                (0..config.curve_len()).map(|_| self.vector(n)).collect(),
            ),
            DecodingPolicy::TwoClustering => ModelOutput::Clusters(
                (0..config.curve_len())
                    .map(|_| {
                        let p = self.vector(n);
                        let mirror = p.iter().map(|x| 1.0 - x).collect();
                        [p, mirror]
                    })
                    .collect(),
            ),
        })
    }
}
