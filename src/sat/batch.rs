//! The packed incidence representation of several formulas.
//!
//! A batch is a set of parallel arrays rather than one graph per formula.
//! Variables, literals and clauses of all formulas are numbered globally, in
//! formula order, so that every per-clause and per-formula reduction is a
//! single pass over a flat array keyed by group index.
//!
//! Literal numbering uses the doubled convention of
//! [`DoubleLiteral`](crate::sat::literal::DoubleLiteral): formula `f`'s
//! literals occupy `literal_offset(f) .. literal_offset(f) + 2 * vars(f)`.

use crate::sat::cnf::Cnf;
use crate::sat::error::{EvalError, Result};
use std::ops::Range;

/// Exclusive prefix sums of `counts`, with a trailing total.
fn offsets(counts: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(counts.len() + 1);
    let mut acc = 0;
    out.push(acc);
    for &c in counts {
        acc += c;
        out.push(acc);
    }
    out
}

/// Several formulas packed into flat, contiguous arrays.
///
/// Formula `f` owns a contiguous run of variables, literals and clauses;
/// edges connect a global literal index to a global clause index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceBatch {
    variable_counts: Vec<usize>,
    literal_counts: Vec<usize>,
    clause_counts: Vec<usize>,
    /// `(literal, clause)` edge endpoints, global indices.
    edge_literals: Vec<usize>,
    edge_clauses: Vec<usize>,
    clause_to_formula: Vec<usize>,
    variable_offsets: Vec<usize>,
    literal_offsets: Vec<usize>,
    clause_offsets: Vec<usize>,
}

impl IncidenceBatch {
    /// Validates and packs a batch.
    ///
    /// # Errors
    ///
    /// - [`EvalError::ShapeMismatch`] if the per-formula count sequences differ
    ///   in length, if a literal count is not twice the variable count, or if
    ///   `clause_to_formula` does not cover exactly the declared clauses.
    /// - [`EvalError::InvalidBatch`] if `clause_to_formula` is not a run of
    ///   contiguous, non-decreasing groups matching `clause_counts`.
    /// - [`EvalError::IndexOutOfRange`] if an edge references a clause outside
    ///   the batch, or a literal outside the range of the formula owning the
    ///   edge's clause.
    pub fn new(
        variable_counts: Vec<usize>,
        literal_counts: Vec<usize>,
        clause_counts: Vec<usize>,
        edges: Vec<(usize, usize)>,
        clause_to_formula: Vec<usize>,
    ) -> Result<Self> {
        let formulas = variable_counts.len();
        if literal_counts.len() != formulas {
            return Err(EvalError::shape("literal counts", formulas, literal_counts.len()));
        }
        if clause_counts.len() != formulas {
            return Err(EvalError::shape("clause counts", formulas, clause_counts.len()));
        }
        for (&v, &l) in variable_counts.iter().zip(&literal_counts) {
            if l != 2 * v {
                return Err(EvalError::shape("doubled literal count", 2 * v, l));
            }
        }

        let clause_offsets = offsets(&clause_counts);
        let total_clauses = clause_offsets[formulas];
        if clause_to_formula.len() != total_clauses {
            return Err(EvalError::shape(
                "clause-to-formula map",
                total_clauses,
                clause_to_formula.len(),
            ));
        }
        for (f, range) in clause_offsets.windows(2).enumerate() {
            if let Some(c) = (range[0]..range[1]).find(|&c| clause_to_formula[c] != f) {
                return Err(EvalError::InvalidBatch(format!(
                    "clause {c} belongs to formula {} but lies in formula {f}'s block",
                    clause_to_formula[c]
                )));
            }
        }

        let (edge_literals, edge_clauses): (Vec<usize>, Vec<usize>) = edges.into_iter().unzip();

        let batch = Self {
            variable_offsets: offsets(&variable_counts),
            literal_offsets: offsets(&literal_counts),
            clause_offsets,
            variable_counts,
            literal_counts,
            clause_counts,
            edge_literals,
            edge_clauses,
            clause_to_formula,
        };
        batch.check_edges()?;
        Ok(batch)
    }

    fn check_edges(&self) -> Result<()> {
        let total_clauses = self.num_clauses();
        for (&lit, &clause) in self.edge_literals.iter().zip(&self.edge_clauses) {
            if clause >= total_clauses {
                return Err(EvalError::out_of_range("clause", clause, total_clauses));
            }
            let range = self.literal_range(self.clause_to_formula[clause]);
            if !range.contains(&lit) {
                return Err(EvalError::out_of_range("literal", lit, range.end));
            }
        }
        Ok(())
    }

    /// Number of formulas.
    #[must_use]
    pub fn num_formulas(&self) -> usize {
        self.variable_counts.len()
    }

    /// Total variables across the batch.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variable_offsets[self.num_formulas()]
    }

    /// Total literal slots, always twice the variables.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.literal_offsets[self.num_formulas()]
    }

    /// Total clauses across the batch.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clause_offsets[self.num_formulas()]
    }

    /// Total literal-clause edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edge_literals.len()
    }

    /// Variables per formula.
    #[must_use]
    pub fn variable_counts(&self) -> &[usize] {
        &self.variable_counts
    }

    /// Literal slots per formula.
    #[must_use]
    pub fn literal_counts(&self) -> &[usize] {
        &self.literal_counts
    }

    /// Clauses per formula.
    #[must_use]
    pub fn clause_counts(&self) -> &[usize] {
        &self.clause_counts
    }

    /// Owning formula of every clause.
    #[must_use]
    pub fn clause_to_formula(&self) -> &[usize] {
        &self.clause_to_formula
    }

    /// `(literal, clause)` pairs in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edge_literals
            .iter()
            .copied()
            .zip(self.edge_clauses.iter().copied())
    }

    /// Literal side of every edge.
    #[must_use]
    pub fn edge_literals(&self) -> &[usize] {
        &self.edge_literals
    }

    /// Clause side of every edge.
    #[must_use]
    pub fn edge_clauses(&self) -> &[usize] {
        &self.edge_clauses
    }

    /// Global variable indices owned by formula `f`.
    #[must_use]
    pub fn variable_range(&self, f: usize) -> Range<usize> {
        self.variable_offsets[f]..self.variable_offsets[f + 1]
    }

    /// Global literal indices owned by formula `f`.
    #[must_use]
    pub fn literal_range(&self, f: usize) -> Range<usize> {
        self.literal_offsets[f]..self.literal_offsets[f + 1]
    }

    /// Global clause indices owned by formula `f`.
    #[must_use]
    pub fn clause_range(&self, f: usize) -> Range<usize> {
        self.clause_offsets[f]..self.clause_offsets[f + 1]
    }
}

/// Packs parsed formulas into an [`IncidenceBatch`], one formula at a time.
#[derive(Debug, Clone, Default)]
pub struct BatchBuilder {
    variable_counts: Vec<usize>,
    clause_counts: Vec<usize>,
    edges: Vec<(usize, usize)>,
    clause_to_formula: Vec<usize>,
    literal_base: usize,
    clause_base: usize,
}

impl BatchBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `cnf` as the next formula of the batch. Empty clauses are
    /// kept and receive no edges.
    pub fn push(&mut self, cnf: &Cnf) -> &mut Self {
        let f = self.variable_counts.len();

        for (c, lit) in cnf.literal_slots() {
            self.edges
                .push((self.literal_base + lit.index(), self.clause_base + c));
        }
        self.clause_to_formula
            .extend(std::iter::repeat_n(f, cnf.num_clauses()));

        self.variable_counts.push(cnf.num_vars);
        self.clause_counts.push(cnf.num_clauses());
        self.literal_base += cnf.num_literals();
        self.clause_base += cnf.num_clauses();
        self
    }

    /// Formulas pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variable_counts.len()
    }

    /// Whether nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variable_counts.is_empty()
    }

    /// Finishes the batch.
    ///
    /// # Errors
    ///
    /// Anything [`IncidenceBatch::new`] rejects. A batch built only through
    /// [`BatchBuilder::push`] satisfies every invariant.
    pub fn build(self) -> Result<IncidenceBatch> {
        let literal_counts = self.variable_counts.iter().map(|v| v * 2).collect();
        IncidenceBatch::new(
            self.variable_counts,
            literal_counts,
            self.clause_counts,
            self.edges,
            self.clause_to_formula,
        )
    }
}

impl<'a> FromIterator<&'a Cnf> for BatchBuilder {
    fn from_iter<T: IntoIterator<Item = &'a Cnf>>(iter: T) -> Self {
        let mut builder = Self::new();
        for cnf in iter {
            builder.push(cnf);
        }
        builder
    }
}
