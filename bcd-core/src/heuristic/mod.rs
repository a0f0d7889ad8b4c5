//! Primal heuristics: feasible integral solutions built from BCD iterates.

mod sequential;

pub use sequential::SequentialHeuristic;

use crate::bcd::Iterate;
use crate::error::BcdResult;
use crate::oracle::BlockOracle;
use crate::problem::BlockProblem;
use crate::settings::HeuristicMethod;

/// A linking-feasible 0-1 assignment and its cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    pub x: Vec<Vec<f64>>,
    pub obj: f64,
}

/// Builds an incumbent from the current iterate.
pub trait PrimalHeuristic {
    /// Return a linking-feasible assignment, or `None` if this heuristic
    /// found none.
    fn construct<O: BlockOracle + ?Sized>(
        &mut self,
        prob: &BlockProblem,
        iterate: &Iterate,
        oracle: &mut O,
    ) -> BcdResult<Option<Incumbent>>;
}

/// Accepts the joint iterate itself when it satisfies the linking rows.
///
/// An iterate that still holds seed blocks is never accepted, since those
/// blocks have not been through the oracle.
#[derive(Debug, Clone, Copy)]
pub struct IterateHeuristic {
    /// Allowed violation per linking row.
    pub tol: f64,
}

impl PrimalHeuristic for IterateHeuristic {
    fn construct<O: BlockOracle + ?Sized>(
        &mut self,
        prob: &BlockProblem,
        iterate: &Iterate,
        _oracle: &mut O,
    ) -> BcdResult<Option<Incumbent>> {
        if iterate.is_seed() {
            return Ok(None);
        }
        if iterate.residual(&prob.b).iter().any(|&r| r > self.tol) {
            return Ok(None);
        }
        Ok(Some(Incumbent {
            x: iterate.blocks().to_vec(),
            obj: iterate.total_cost(),
        }))
    }
}

/// Run the heuristic selected by `method`.
pub fn run_heuristic<O: BlockOracle + ?Sized>(
    method: HeuristicMethod,
    tol: f64,
    prob: &BlockProblem,
    iterate: &Iterate,
    oracle: &mut O,
) -> BcdResult<Option<Incumbent>> {
    match method {
        HeuristicMethod::Iterate => IterateHeuristic { tol }.construct(prob, iterate, oracle),
        HeuristicMethod::Sequential => SequentialHeuristic::new(tol).construct(prob, iterate, oracle),
    }
}

/// Best incumbent seen during a solve.
#[derive(Debug, Clone, Default)]
pub struct IncumbentTracker {
    best: Option<Incumbent>,

    /// Number of times the incumbent was replaced.
    pub update_count: u64,
}

impl IncumbentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_incumbent(&self) -> bool {
        self.best.is_some()
    }

    /// Objective of the incumbent, +inf if none.
    pub fn obj_val(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |inc| inc.obj)
    }

    /// Keep `candidate` if it is strictly better. Returns true on improvement.
    pub fn update(&mut self, candidate: Incumbent) -> bool {
        if candidate.obj < self.obj_val() - 1e-9 {
            self.best = Some(candidate);
            self.update_count += 1;
            true
        } else {
            false
        }
    }

    pub fn best(&self) -> Option<&Incumbent> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<Incumbent> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::UnconstrainedOracle;
    use crate::problem::LinkingBlock;

    fn toy() -> BlockProblem {
        BlockProblem::new(
            vec![
                LinkingBlock::from_dense(&[vec![1.0]], vec![-1.0]).unwrap(),
                LinkingBlock::from_dense(&[vec![1.0]], vec![-2.0]).unwrap(),
            ],
            vec![1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_iterate_heuristic() {
        let prob = toy();
        let mut oracle = UnconstrainedOracle;

        let seed = Iterate::ones(&prob);
        let none = run_heuristic(HeuristicMethod::Iterate, 0.0, &prob, &seed, &mut oracle).unwrap();
        assert!(none.is_none());

        let feasible = Iterate::from_blocks(&prob, vec![vec![0.0], vec![1.0]]);
        let inc = run_heuristic(HeuristicMethod::Iterate, 0.0, &prob, &feasible, &mut oracle)
            .unwrap()
            .unwrap();
        assert_eq!(inc.x, vec![vec![0.0], vec![1.0]]);
        assert_eq!(inc.obj, -2.0);
    }

    #[test]
    fn test_iterate_heuristic_skips_seed() {
        // the seed satisfies x0 + x1 <= 2 but was never produced by the oracle
        let prob = BlockProblem::new(toy().blocks, vec![2.0]).unwrap();
        let mut oracle = UnconstrainedOracle;

        let mut it = Iterate::ones(&prob);
        let res = run_heuristic(HeuristicMethod::Iterate, 0.0, &prob, &it, &mut oracle).unwrap();
        assert!(res.is_none());

        it.set_block(&prob, 0, vec![1.0]);
        it.set_block(&prob, 1, vec![1.0]);
        let inc = run_heuristic(HeuristicMethod::Iterate, 0.0, &prob, &it, &mut oracle)
            .unwrap()
            .unwrap();
        assert_eq!(inc.obj, -3.0);
    }

    #[test]
    fn test_incumbent_tracker() {
        let mut tracker = IncumbentTracker::new();
        assert!(!tracker.has_incumbent());
        assert_eq!(tracker.obj_val(), f64::INFINITY);

        assert!(tracker.update(Incumbent { x: vec![vec![1.0]], obj: -1.0 }));
        assert!(!tracker.update(Incumbent { x: vec![vec![0.0]], obj: 0.0 }));
        assert!(tracker.update(Incumbent { x: vec![vec![1.0, 1.0]], obj: -3.0 }));

        assert_eq!(tracker.update_count, 2);
        assert_eq!(tracker.obj_val(), -3.0);
    }
}
