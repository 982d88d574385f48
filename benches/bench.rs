use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sat_decode::sat::assignment::Assignment;
use sat_decode::sat::cnf::Cnf;
use sat_decode::sat::decoding::{Decoder, DecodingConfig, DecodingPolicy};
use sat_decode::sat::loader::NamedBatch;
use sat_decode::sat::model::{AssignmentModel, RandomGuess};
use sat_decode::sat::satisfaction::evaluate;
use std::hint::black_box;

/// Uniform random 3-SAT at the given clause/variable ratio.
fn random_3sat(rng: &mut fastrand::Rng, vars: usize, ratio: f64) -> Cnf {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let clauses = (vars as f64 * ratio) as usize;
    let max = i32::try_from(vars).unwrap_or(i32::MAX);
    Cnf::new(
        (0..clauses).map(|_| {
            (0..3)
                .map(|_| {
                    let v = rng.i32(1..=max);
                    if rng.bool() { v } else { -v }
                })
                .collect::<Vec<_>>()
        }),
        vars,
    )
}

fn random_batch(formulas: usize, vars: usize) -> NamedBatch {
    let mut rng = fastrand::Rng::with_seed(42);
    NamedBatch::from_formulas(
        (0..formulas)
            .map(|i| (format!("{i}.cnf"), random_3sat(&mut rng, vars, 4.26)))
            .collect(),
    )
    .expect("generated batch is well formed")
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Satisfaction");
    for &formulas in &[32, 128, 512] {
        let batch = random_batch(formulas, 100);
        let mut rng = fastrand::Rng::with_seed(1);
        let probs: Vec<f64> = (0..batch.incidence.num_variables())
            .map(|_| rng.f64())
            .collect();
        let truth = Assignment::from_probabilities(&probs).literal_truth();

        group.bench_with_input(BenchmarkId::from_parameter(formulas), &batch, |b, batch| {
            b.iter(|| evaluate(black_box(&batch.incidence), black_box(&truth)));
        });
    }
    group.finish();
}

fn bench_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decoding");
    let batch = random_batch(128, 100);

    for policy in DecodingPolicy::ALL {
        let config = DecodingConfig::new(policy, 16);
        let output = RandomGuess::new(7)
            .infer(&batch, &config)
            .expect("random model always produces output");
        let decoder = Decoder::new(config);

        group.bench_function(policy.to_string(), |b| {
            b.iter(|| decoder.decode(black_box(&batch.incidence), black_box(&output)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluator, bench_policies);
criterion_main!(benches);
