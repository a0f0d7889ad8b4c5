//! Primal/dual bound histories and the relative gap.

use crate::error::{BcdError, BcdResult};

/// Append-only record of dual (lower) and primal (upper) bounds.
///
/// Best values are derived from the histories on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundHistory {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dual bound.
    pub fn push_lower(&mut self, lb: f64) {
        self.lower.push(lb);
    }

    /// Append a primal bound.
    pub fn push_upper(&mut self, ub: f64) {
        self.upper.push(ub);
    }

    /// All dual bounds, in the order recorded.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// All primal bounds, in the order recorded.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Largest dual bound recorded so far.
    pub fn best_lower(&self) -> Option<f64> {
        self.lower.iter().copied().reduce(f64::max)
    }

    /// Smallest primal bound recorded so far.
    pub fn best_upper(&self) -> Option<f64> {
        self.upper.iter().copied().reduce(f64::min)
    }

    /// Number of trailing dual bounds that did not improve on the best
    /// bound before them.
    pub fn trailing_non_improving(&self) -> usize {
        let mut best = f64::NEG_INFINITY;
        let mut streak = 0;
        for &lb in &self.lower {
            if lb >= best {
                best = lb;
                streak = 0;
            } else {
                streak += 1;
            }
        }
        streak
    }

    /// Relative gap `(best_ub - best_lb) / (|best_lb| + eps)`.
    ///
    /// Requires at least one bound of each kind.
    pub fn gap(&self, eps: f64) -> BcdResult<f64> {
        match (self.best_lower(), self.best_upper()) {
            (Some(lb), Some(ub)) => Ok((ub - lb) / (lb.abs() + eps)),
            _ => Err(BcdError::Configuration(format!(
                "gap requested with {} dual and {} primal bounds recorded",
                self.lower.len(),
                self.upper.len()
            ))),
        }
    }

    pub fn clear(&mut self) {
        self.lower.clear();
        self.upper.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_formula() {
        let mut hist = BoundHistory::new();
        for lb in [1.0, 2.0, 1.5] {
            hist.push_lower(lb);
        }
        for ub in [10.0, 8.0] {
            hist.push_upper(ub);
        }

        let expected = (8.0 - 2.0) / (2.0 + 1e-3);
        assert!((hist.gap(1e-3).unwrap() - expected).abs() < 1e-12);
        assert_eq!(hist.best_lower(), Some(2.0));
        assert_eq!(hist.best_upper(), Some(8.0));
    }

    #[test]
    fn test_gap_requires_both_histories() {
        let mut hist = BoundHistory::new();
        assert!(matches!(hist.gap(1e-3), Err(BcdError::Configuration(_))));

        hist.push_lower(1.0);
        assert!(matches!(hist.gap(1e-3), Err(BcdError::Configuration(_))));

        hist.push_upper(3.0);
        assert!(hist.gap(1e-3).is_ok());
    }

    #[test]
    fn test_trailing_streak() {
        let mut hist = BoundHistory::new();
        assert_eq!(hist.trailing_non_improving(), 0);

        for lb in [1.0, 3.0, 2.0, 2.5] {
            hist.push_lower(lb);
        }
        assert_eq!(hist.trailing_non_improving(), 2);

        hist.push_lower(3.0);
        assert_eq!(hist.trailing_non_improving(), 0);
    }
}
