#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Doubled literal encoding.
//!
//! Variable `i` owns two literal slots: `2i` for its positive literal and
//! `2i + 1` for its negation. Clause edges store these slot indices directly,
//! so looking up a literal's truth never needs to know its polarity.

use core::ops::{Neg, Not};

/// Zero-based variable index.
pub type Variable = usize;

/// Index of a literal slot in the doubled encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DoubleLiteral(usize);

impl DoubleLiteral {
    /// Literal of `var` with the given polarity (`true` = positive).
    #[must_use]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        if polarity {
            Self(var * 2)
        } else {
            Self(var * 2 + 1)
        }
    }

    /// Converts a signed DIMACS literal (1-based, non-zero) into its slot.
    ///
    /// Returns `None` for `0`, which is a clause terminator, not a literal.
    #[must_use]
    pub const fn from_dimacs(value: i32) -> Option<Self> {
        if value == 0 {
            return None;
        }
        let var = value.unsigned_abs() as usize - 1;
        Some(Self::new(var, value > 0))
    }

    /// The variable this literal belongs to.
    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 / 2
    }

    /// `true` for the positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 % 2 == 0
    }

    /// The opposite literal of the same variable.
    #[must_use]
    pub const fn negated(self) -> Self {
        if self.polarity() {
            Self(self.0 + 1)
        } else {
            Self(self.0 - 1)
        }
    }

    /// Slot index within the owning formula's literal range.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Neg for DoubleLiteral {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for DoubleLiteral {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_neg() {
        assert_eq!(DoubleLiteral::new(1, false).negated(), DoubleLiteral::new(1, true));
        assert_eq!(-DoubleLiteral::new(1, true), DoubleLiteral::new(1, false));
        assert_eq!(!!DoubleLiteral::new(4, true), DoubleLiteral::new(4, true));
    }

    #[test]
    fn test_slots_are_adjacent() {
        assert_eq!(DoubleLiteral::new(3, true).index(), 6);
        assert_eq!(DoubleLiteral::new(3, false).index(), 7);
        assert_eq!(DoubleLiteral::new(3, false).variable(), 3);
    }

    #[test]
    fn test_from_dimacs() {
        assert_eq!(DoubleLiteral::from_dimacs(1), Some(DoubleLiteral::new(0, true)));
        assert_eq!(DoubleLiteral::from_dimacs(-3), Some(DoubleLiteral::new(2, false)));
        assert_eq!(DoubleLiteral::from_dimacs(0), None);
    }
}
