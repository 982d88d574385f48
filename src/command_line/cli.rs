#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use sat_decode::sat::decoding::{DecodingConfig, DecodingPolicy, Decoder};
use sat_decode::sat::error::Result;
use sat_decode::sat::loader::FormulaSet;
use sat_decode::sat::metrics::EvalSummary;
use sat_decode::sat::model::{AssignmentModel, RandomGuess, RecordedPredictions};
use sat_decode::sat::runner::evaluate_batches;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the evaluator.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sat-decode",
    version,
    about = "Decode predicted SAT assignments and verify them against CNF formulas"
)]
pub(crate) struct Cli {
    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    pub command: Commands,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Evaluate predicted assignments against a directory of DIMACS formulas.
    Eval(EvalOptions),

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where variable probabilities come from. Exactly one must be given.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub(crate) struct ModelSource {
    /// JSON file of recorded model predictions, keyed by formula path
    /// relative to `--formulas`.
    #[arg(long)]
    pub(crate) predictions: Option<PathBuf>,

    /// Use seeded uniform random probabilities instead of a model.
    #[arg(long, value_name = "SEED")]
    pub(crate) random: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct EvalOptions {
    /// Directory of `.cnf` files (searched recursively), or a single file.
    #[arg(long)]
    pub(crate) formulas: PathBuf,

    #[command(flatten)]
    pub(crate) model: ModelSource,

    /// Decoding policy: standard, two-clustering or multiple-assignments.
    #[arg(long, default_value_t = DecodingPolicy::Standard)]
    pub(crate) decoding: DecodingPolicy,

    /// Number of refinement rounds `K`; the diversity curve has `K + 1` points.
    #[arg(long, default_value_t = 32)]
    pub(crate) iterations: usize,

    /// Formulas per batch.
    #[arg(long, default_value_t = 512)]
    pub(crate) batch_size: usize,

    /// Only evaluate the first N formulas (in path order).
    #[arg(long)]
    pub(crate) sample_size: Option<usize>,

    /// Print the summary as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    pub(crate) json: bool,
}

/// Everything reported at the end of a run.
#[derive(Debug, Serialize)]
pub(crate) struct Report {
    pub decoding: DecodingConfig,
    pub batches: usize,
    pub summary: EvalSummary,
    pub load_secs: f64,
    pub eval_secs: f64,
    pub allocated_mib: Option<f64>,
    pub resident_mib: Option<f64>,
}

fn load_model(source: &ModelSource) -> Result<Box<dyn AssignmentModel>> {
    if let Some(path) = &source.predictions {
        return Ok(Box::new(RecordedPredictions::from_file(path)?));
    }
    Ok(Box::new(RandomGuess::new(source.random.unwrap_or_default())))
}

/// Allocated and resident memory in MiB, if jemalloc can report them.
fn memory_usage() -> (Option<f64>, Option<f64>) {
    if epoch::advance().is_err() {
        return (None, None);
    }
    let to_mib = |bytes: usize| bytes as f64 / (1024.0 * 1024.0);
    let allocated = stats::allocated::mib()
        .ok()
        .and_then(|m| m.read().ok())
        .map(to_mib);
    let resident = stats::resident::mib()
        .ok()
        .and_then(|m| m.read().ok())
        .map(to_mib);
    (allocated, resident)
}

/// Runs a full evaluation and prints the report.
///
/// # Errors
///
/// Any loading, model, decoding or serialisation error. Nothing is printed
/// for a run that fails part-way.
pub(crate) fn run_eval(opts: &EvalOptions) -> Result<()> {
    let decoder = Decoder::new(DecodingConfig::new(opts.decoding, opts.iterations));

    let time = Instant::now();
    let formulas = FormulaSet::discover(&opts.formulas, opts.sample_size)?;
    let mut model = load_model(&opts.model)?;
    let load_time = time.elapsed();

    let evaluation = evaluate_batches(model.as_mut(), formulas.batches(opts.batch_size), &decoder)?;

    let (allocated_mib, resident_mib) = memory_usage();
    let report = Report {
        decoding: *decoder.config(),
        batches: evaluation.batches,
        summary: evaluation.metrics.finalize(),
        load_secs: load_time.as_secs_f64(),
        eval_secs: evaluation.elapsed.as_secs_f64(),
        allocated_mib,
        resident_mib,
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_stats(&report, load_time, evaluation.elapsed);
    }
    Ok(())
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn format_ratio(value: f64) -> String {
    if value.is_nan() {
        "undefined".to_string()
    } else {
        format!("{value:.4}")
    }
}

fn format_mib(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Prints a summary of the run.
pub(crate) fn print_stats(report: &Report, load_time: Duration, elapsed: Duration) {
    let elapsed_secs = elapsed.as_secs_f64();
    let summary = &report.summary;

    println!("\n=======================[ Evaluation Setup ]==========================");
    stat_line("Load time (s)", format!("{:.3}", load_time.as_secs_f64()));
    stat_line("Decoding", report.decoding.policy.to_string());
    stat_line("Rounds (K)", report.decoding.rounds);
    stat_line("Batches", report.batches);

    println!("========================[ Results ]==================================");
    stat_line_with_rate("Formulas", summary.total, elapsed_secs);
    stat_line("Satisfied", summary.satisfied);
    stat_line("Solve rate", format_ratio(summary.solve_rate));
    stat_line("Memory usage (MiB)", format_mib(report.allocated_mib));
    stat_line("Resident memory (MiB)", format_mib(report.resident_mib));
    stat_line("Solving time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");

    if report.decoding.policy != DecodingPolicy::Standard {
        println!("\nDistinct assignments per formula, by round:");
        for (round, avg) in summary.diversity_curve.iter().enumerate() {
            stat_line(&format!("Round {round}"), format_ratio(*avg));
        }
    }
}
