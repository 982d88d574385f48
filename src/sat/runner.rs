//! The batch loop: load, infer, decode, accumulate. Strictly sequential.

use crate::sat::decoding::Decoder;
use crate::sat::error::Result;
use crate::sat::loader::NamedBatch;
use crate::sat::log_targets;
use crate::sat::metrics::RunningMetrics;
use crate::sat::model::AssignmentModel;
use std::time::{Duration, Instant};

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Totals over every batch.
    pub metrics: RunningMetrics,
    /// Batches evaluated.
    pub batches: usize,
    /// Wall-clock time spent evaluating.
    pub elapsed: Duration,
}

/// Evaluates every batch in order. The first failing batch aborts the run;
/// it contributes nothing to the returned totals.
///
/// # Errors
///
/// Whatever loading, the model, decoding or accumulation reports.
pub fn evaluate_batches<M, I>(model: &mut M, batches: I, decoder: &Decoder) -> Result<Evaluation>
where
    M: AssignmentModel + ?Sized,
    I: IntoIterator<Item = Result<NamedBatch>>,
{
    let config = decoder.config();
    let mut metrics = RunningMetrics::new(config.curve_len());
    let mut count = 0;
    let start = Instant::now();

    log::info!(
        target: log_targets::DECODING,
        "evaluating with {} decoding, {} rounds",
        config.policy,
        config.rounds
    );

    for batch in batches {
        let batch = batch?;
        let output = model.infer(&batch, config)?;
        let outcome = decoder.decode(&batch.incidence, &output)?;
        metrics.accumulate(&outcome)?;
        count += 1;

        log::debug!(
            target: log_targets::DECODING,
            "batch {count}: {} formulas, {} clauses, {} edges, {} solved",
            batch.len(),
            batch.incidence.num_clauses(),
            batch.incidence.num_edges(),
            outcome.num_solved()
        );
    }

    let elapsed = start.elapsed();
    log::info!(
        target: log_targets::DECODING,
        "{} formulas in {count} batches, {:.3}s",
        metrics.total(),
        elapsed.as_secs_f64()
    );

    Ok(Evaluation {
        metrics,
        batches: count,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::cnf::Cnf;
    use crate::sat::decoding::{DecodingConfig, DecodingPolicy};
    use crate::sat::error::EvalError;
    use crate::sat::model::{ModelOutput, RandomGuess};

    struct Fixed(Vec<f64>);

    impl AssignmentModel for Fixed {
        fn infer(&mut self, _: &NamedBatch, _: &DecodingConfig) -> Result<ModelOutput> {
            Ok(ModelOutput::Probabilities(self.0.clone()))
        }
    }

    fn batch() -> NamedBatch {
        NamedBatch::from_formulas(vec![
            ("sat".to_string(), Cnf::new(vec![vec![1, 2], vec![-1, 3]], 3)),
            ("unsat".to_string(), Cnf::new(vec![vec![1], vec![-1]], 1)),
        ])
        .unwrap()
    }

    #[test]
    fn test_half_solved_run() {
        let decoder = Decoder::new(DecodingConfig::new(DecodingPolicy::Standard, 0));
        let mut model = Fixed(vec![0.9, 0.1, 0.9, 0.9]);
        let eval = evaluate_batches(&mut model, vec![Ok(batch()), Ok(batch())], &decoder).unwrap();
        assert_eq!(eval.batches, 2);
        assert_eq!(eval.metrics.total(), 4);
        let summary = eval.metrics.finalize();
        assert!((summary.solve_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failing_batch_aborts() {
        let decoder = Decoder::new(DecodingConfig::new(DecodingPolicy::Standard, 0));
        let mut model = Fixed(vec![0.9]);
        let err = evaluate_batches(&mut model, vec![Ok(batch())], &decoder).unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_random_model_runs_every_policy() {
        for policy in DecodingPolicy::ALL {
            let decoder = Decoder::new(DecodingConfig::new(policy, 4));
            let mut model = RandomGuess::new(1);
            let eval = evaluate_batches(&mut model, vec![Ok(batch())], &decoder).unwrap();
            let summary = eval.metrics.finalize();
            assert_eq!(summary.total, 2);
            assert_eq!(summary.diversity_curve.len(), 5);
            // The second formula is unsatisfiable under every assignment.
            assert!(summary.satisfied <= 1);
        }
    }

    #[test]
    fn test_no_batches() {
        let decoder = Decoder::new(DecodingConfig::new(DecodingPolicy::Standard, 0));
        let mut model = RandomGuess::new(0);
        let eval = evaluate_batches(&mut model, Vec::<Result<NamedBatch>>::new(), &decoder).unwrap();
        assert_eq!(eval.batches, 0);
        assert!(eval.metrics.finalize().solve_rate.is_nan());
    }
}
