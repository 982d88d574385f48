#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod batch;
pub mod cnf;
pub mod decoding;
pub mod dimacs;
pub mod distinct;
pub mod error;
pub mod literal;
pub mod loader;
pub mod log_targets;
pub mod metrics;
pub mod model;
pub mod runner;
pub mod satisfaction;
