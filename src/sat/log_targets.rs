//! Log targets, so output can be narrowed with e.g. `RUST_LOG=decoding=trace`.

/// Formula discovery and DIMACS parsing.
pub const LOADER: &str = "loader";
/// Per-batch and per-round decoding.
pub const DECODING: &str = "decoding";
/// Metric accumulation.
pub const METRICS: &str = "metrics";
/// Model output and recorded predictions.
pub const MODEL: &str = "model";
