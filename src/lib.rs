#![deny(missing_docs)]
//! Decoding and verification of learned SAT assignments.
//!
//! A model predicts, for every variable of a batch of CNF formulas, the
//! probability that it is true. This crate turns those probabilities into
//! assignments, checks them against the formulas with flat segmented sums
//! over a packed incidence batch, and reports the solve rate and the
//! per-round diversity of decoded assignments under three decoding policies.

/// The `sat` module holds the incidence batch, the decoding policies, the
/// satisfaction evaluator and the metrics that summarise a run.
pub mod sat;
