//! # sat-decode
//!
//! `sat-decode` checks how well a learned model's variable probabilities
//! solve a set of CNF formulas.
//!
//! Formulas are read from DIMACS `.cnf` files, packed into batches, and for
//! each batch the model's output is thresholded (`p > 0.5`) into assignments
//! that are verified clause by clause. Three decoding policies are supported:
//!
//! 1.  **standard**: one assignment per formula.
//! 2.  **two-clustering**: two candidate assignments per round; only the
//!     number of distinct assignments is tracked.
//! 3.  **multiple-assignments**: one refined assignment per round; a formula
//!     counts as solved if any round satisfies it.
//!
//! ## Usage
//!
//! ```sh
//! # Recorded predictions, iterative decoding over 32 rounds
//! sat-decode eval --formulas data/test --predictions preds.json \
//!     --decoding multiple-assignments --iterations 32
//!
//! # Random baseline, JSON output
//! sat-decode eval --formulas data/test --random 0 --json
//!
//! # Shell completions
//! sat-decode completions bash
//! ```
//!
//! Logging goes through `env_logger`; e.g. `RUST_LOG=decoding=debug`.

use crate::command_line::cli::{Cli, Commands, run_eval};
use clap::{CommandFactory, Parser};

mod command_line;

/// Global allocator using `tikv-jemallocator` for potentially better performance
/// and memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval(opts) => {
            if let Err(e) = run_eval(&opts) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }
}
