#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format.
//!
//! The format typically includes:
//! - Comment lines starting with 'c'.
//! - A problem line `p cnf <num_variables> <num_clauses>`. The variable count
//!   is kept, since a formula may declare variables that occur in no clause.
//!   The clause count is only checked loosely (a warning is logged).
//! - Clauses as whitespace-separated signed integers, each terminated by `0`.
//!   A clause may span several lines, and a lone `0` is an empty clause.
//! - An optional '%' line marking end-of-data.

use crate::sat::cnf::{Clause, Cnf};
use crate::sat::error::{EvalError, Result};
use crate::sat::log_targets;
use std::io::BufRead;
use std::path::Path;

/// Parses DIMACS formatted data from a `BufRead` source.
///
/// # Errors
///
/// - [`EvalError::Io`] if reading fails.
/// - [`EvalError::Parse`] for a malformed problem line or a non-integer token.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf> {
    let mut clauses: Vec<Clause> = Vec::new();
    let mut current = Clause::new();
    let mut declared_vars = 0;
    let mut declared_clauses = None;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_idx + 1;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None | Some(&"c") => {}
            Some(&"p") => {
                let (vars, count) = parse_problem_line(&line, line_no)?;
                declared_vars = vars;
                declared_clauses = Some(count);
            }
            Some(_) => {
                for token in parts {
                    let lit = token.parse::<i32>().map_err(|e| EvalError::Parse {
                        line: line_no,
                        message: format!("failed to parse literal '{token}': {e}"),
                    })?;

                    if lit == 0 {
                        clauses.push(std::mem::take(&mut current));
                    } else {
                        current.push(lit);
                    }
                }
            }
        }
    }

    // Tolerate a missing terminator on the final clause.
    if !current.is_empty() {
        clauses.push(current);
    }

    if let Some(count) = declared_clauses {
        if count != clauses.len() {
            log::warn!(
                target: log_targets::LOADER,
                "problem line declares {count} clauses, found {}",
                clauses.len()
            );
        }
    }

    Ok(Cnf::new(clauses, declared_vars))
}

fn parse_problem_line(line: &str, line_no: usize) -> Result<(usize, usize)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let bad = |message: String| EvalError::Parse {
        line: line_no,
        message,
    };

    match fields.as_slice() {
        ["p", "cnf", vars, clauses] => {
            let vars = vars
                .parse()
                .map_err(|e| bad(format!("bad variable count '{vars}': {e}")))?;
            let clauses = clauses
                .parse()
                .map_err(|e| bad(format!("bad clause count '{clauses}': {e}")))?;
            Ok((vars, clauses))
        }
        _ => Err(bad(format!("malformed problem line '{line}'"))),
    }
}

/// Parses a DIMACS CNF file.
///
/// # Errors
///
/// Returns [`EvalError::Io`] if the file cannot be opened, otherwise whatever
/// [`parse_dimacs`] returns.
pub fn parse_file(file_path: &Path) -> Result<Cnf> {
    let file = std::fs::File::open(file_path)?;
    parse_dimacs(std::io::BufReader::new(file))
}
