//! Sequential block fixing.
//!
//! Blocks are fixed one at a time, cheapest first, against the linking slack
//! left by the blocks already fixed. A block whose BCD assignment does not
//! fit is re-solved by the oracle with every column that alone overflows the
//! slack priced out; if that still does not fit, the block is fixed to zero.
//! A block still holding its seed value always goes back to the oracle.

use super::{Incumbent, PrimalHeuristic};
use crate::bcd::Iterate;
use crate::error::BcdResult;
use crate::linalg::sparse;
use crate::oracle::{self, BlockOracle};
use crate::problem::{BlockProblem, LinkingBlock};

#[derive(Debug, Clone, Copy)]
pub struct SequentialHeuristic {
    /// Allowed violation per linking row.
    pub tol: f64,
}

impl SequentialHeuristic {
    pub fn new(tol: f64) -> Self {
        Self { tol }
    }

    fn fits(&self, ax: &[f64], slack: &[f64]) -> bool {
        ax.iter().zip(slack).all(|(a, s)| *a <= s + self.tol)
    }

    /// Block cost `c` with columns that overflow `slack` on their own priced
    /// out of any minimizer.
    fn restricted_cost(&self, blk: &LinkingBlock, slack: &[f64]) -> Vec<f64> {
        let prohibitive = 1.0 + blk.c.iter().map(|c| c.abs()).sum::<f64>();
        let mut cost = blk.c.clone();
        for (j, cj) in cost.iter_mut().enumerate() {
            let col = sparse::dense_column(&blk.A, j);
            if !self.fits(&col, slack) {
                *cj = prohibitive;
            }
        }
        cost
    }
}

impl PrimalHeuristic for SequentialHeuristic {
    fn construct<O: BlockOracle + ?Sized>(
        &mut self,
        prob: &BlockProblem,
        iterate: &Iterate,
        oracle: &mut O,
    ) -> BcdResult<Option<Incumbent>> {
        let mut order: Vec<usize> = (0..prob.num_blocks()).collect();
        order.sort_by(|&a, &b| iterate.block_cost(a).total_cmp(&iterate.block_cost(b)));

        let mut slack = prob.b.clone();
        let mut x: Vec<Vec<f64>> = prob
            .blocks
            .iter()
            .map(|blk| vec![0.0; blk.num_vars()])
            .collect();
        let mut resolved = 0usize;

        for idx in order {
            let blk = &prob.blocks[idx];
            let mut xi = iterate.block(idx).to_vec();
            let mut ax = blk.linking_product(&xi);

            if !iterate.is_updated(idx) || !self.fits(&ax, &slack) {
                resolved += 1;
                let cost = self.restricted_cost(blk, &slack);
                xi = oracle::checked_solve(oracle, idx, &cost)?;
                ax = blk.linking_product(&xi);
                if !self.fits(&ax, &slack) {
                    xi.fill(0.0);
                    ax.fill(0.0);
                }
            }

            for (s, a) in slack.iter_mut().zip(&ax) {
                *s -= a;
            }
            x[idx] = xi;
        }

        if !prob.is_linking_feasible(&x, self.tol) {
            log::debug!("sequential heuristic ended linking-infeasible");
            return Ok(None);
        }

        log::trace!("sequential heuristic re-solved {} blocks", resolved);
        let obj = prob.objective(&x);
        Ok(Some(Incumbent { x, obj }))
    }
}
