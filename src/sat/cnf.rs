//! A single CNF formula as read from disk, before it is packed into a batch.

use crate::sat::literal::DoubleLiteral;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::Display;

/// Signed DIMACS literals of one clause. May be empty.
pub type Clause = SmallVec<[i32; 8]>;

/// A formula in conjunctive normal form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    /// Clauses in file order.
    pub clauses: Vec<Clause>,
    /// Variables `1..=num_vars` may appear.
    pub num_vars: usize,
}

impl Cnf {
    /// Builds a formula from signed literals. The variable count is the
    /// largest variable mentioned, raised to `declared_vars` if that is larger.
    /// A `0` is a DIMACS terminator, not a literal, and is dropped.
    pub fn new<I, J>(clauses: I, declared_vars: usize) -> Self
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = i32>,
    {
        let clauses: Vec<Clause> = clauses
            .into_iter()
            .map(|c| c.into_iter().filter(|&l| l != 0).collect())
            .collect();

        let max_var = clauses
            .iter()
            .flat_map(|c| c.iter())
            .map(|l| l.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);

        Self {
            clauses,
            num_vars: max_var.max(declared_vars),
        }
    }

    /// Two literal slots per variable.
    #[must_use]
    pub const fn num_literals(&self) -> usize {
        self.num_vars * 2
    }

    /// Number of clauses, empty ones included.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Literal slots of every clause, in clause order.
    pub fn literal_slots(&self) -> impl Iterator<Item = (usize, DoubleLiteral)> + '_ {
        self.clauses.iter().enumerate().flat_map(|(c, clause)| {
            clause
                .iter()
                .filter_map(|&l| DoubleLiteral::from_dimacs(l))
                .map(move |lit| (c, lit))
        })
    }

    /// Direct check of a full assignment (`values[i]` is variable `i + 1`).
    /// Empty clauses are never satisfied.
    #[must_use]
    pub fn verify(&self, values: &[bool]) -> bool {
        self.clauses.iter().all(|clause| {
            clause.iter().any(|&l| {
                let v = (l.unsigned_abs() as usize)
                    .checked_sub(1)
                    .and_then(|i| values.get(i))
                    .copied()
                    .unwrap_or(false);
                if l > 0 { v } else { !v }
            })
        })
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            if clause.is_empty() {
                writeln!(f, "0")?;
            } else {
                writeln!(f, "{} 0", clause.iter().join(" "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_vars_from_literals() {
        let cnf = Cnf::new(vec![vec![1, -2], vec![3]], 0);
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.num_literals(), 6);
        assert_eq!(cnf.num_clauses(), 2);
    }

    #[test]
    fn test_declared_vars_wins_when_larger() {
        let cnf = Cnf::new(vec![vec![1]], 5);
        assert_eq!(cnf.num_vars, 5);
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1, 3]], 3);
        assert!(cnf.verify(&[true, false, true]));
        assert!(!cnf.verify(&[false, false, false]));
    }

    #[test]
    fn test_verify_empty_clause() {
        let cnf = Cnf::new(vec![vec![1], vec![]], 1);
        assert!(!cnf.verify(&[true]));
    }

    #[test]
    fn test_zero_is_not_a_literal() {
        let cnf = Cnf::new(vec![vec![1, 0, -2], vec![0]], 2);
        assert_eq!(cnf.clauses[0].as_slice(), &[1, -2]);
        assert!(cnf.clauses[1].is_empty());
        assert_eq!(cnf.literal_slots().count(), 2);
        assert!(Cnf::new(vec![vec![1, 0, -2]], 2).verify(&[false, false]));
        assert!(!Cnf::new(vec![vec![0]], 1).verify(&[true]));
    }

    #[test]
    fn test_display() {
        let cnf = Cnf::new(vec![vec![1, -2], vec![]], 2);
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n0\n");
    }
}
