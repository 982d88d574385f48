//! Per-formula sets of distinct decoded assignments.
//!
//! Membership is full-vector equality. The hash only picks the bucket;
//! colliding assignments are still compared bit for bit.

use crate::sat::assignment::Assignment;
use rustc_hash::FxHashSet;

/// Distinct assignments seen for one formula.
#[derive(Debug, Clone, Default)]
pub struct DistinctAssignments(FxHashSet<Assignment>);

impl DistinctAssignments {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `assignment` was not seen before.
    pub fn insert(&mut self, assignment: Assignment) -> bool {
        self.0.insert(assignment)
    }

    /// Whether `assignment` has been seen.
    #[must_use]
    pub fn contains(&self, assignment: &Assignment) -> bool {
        self.0.contains(assignment)
    }

    /// Number of distinct assignments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One [`DistinctAssignments`] per formula of a batch.
#[derive(Debug, Clone)]
pub struct DistinctTracker(Vec<DistinctAssignments>);

impl DistinctTracker {
    /// One empty set per formula.
    #[must_use]
    pub fn new(formulas: usize) -> Self {
        Self(vec![DistinctAssignments::new(); formulas])
    }

    /// Records `assignment` for `formula`. Returns whether it was new.
    pub fn insert(&mut self, formula: usize, assignment: Assignment) -> bool {
        self.0[formula].insert(assignment)
    }

    /// Sum of set sizes across all formulas.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().map(DistinctAssignments::len).sum()
    }

    /// Set sizes in formula order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.0.iter().map(DistinctAssignments::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(bits: &[bool]) -> Assignment {
        bits.iter().copied().collect()
    }

    #[test]
    fn test_second_insert_is_noop() {
        let mut set = DistinctAssignments::new();
        assert!(set.insert(assignment(&[true, false])));
        assert_eq!(set.len(), 1);
        assert!(!set.insert(assignment(&[true, false])));
        assert_eq!(set.len(), 1);
        assert!(set.insert(assignment(&[false, true])));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_length_is_part_of_identity() {
        let mut set = DistinctAssignments::new();
        set.insert(assignment(&[false]));
        assert!(!set.contains(&assignment(&[false, false])));
    }

    #[test]
    fn test_tracker_totals() {
        let mut tracker = DistinctTracker::new(2);
        tracker.insert(0, assignment(&[true]));
        tracker.insert(0, assignment(&[true]));
        tracker.insert(1, assignment(&[true]));
        tracker.insert(1, assignment(&[false]));
        assert_eq!(tracker.sizes(), vec![1, 2]);
        assert_eq!(tracker.total(), 3);
    }
}
