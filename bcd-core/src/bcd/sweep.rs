//! Gauss-Seidel sweep over the blocks.

use super::step::{block_step, StepParams};
use super::{DualState, Iterate};
use crate::error::BcdResult;
use crate::oracle::BlockOracle;
use crate::problem::BlockProblem;

/// Outcome of one inner sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepResult {
    /// Passes over all blocks actually executed.
    pub inner_iters: usize,

    /// Summed fixed-point residual of the last pass.
    pub eps_fp: f64,

    /// Oracle proposals replaced by zero across all passes.
    pub rejected: usize,
}

/// Run up to `linmax` passes over the blocks in index order, stopping after
/// the first pass whose summed fixed-point residual is below `tol`.
pub fn sweep<O: BlockOracle + ?Sized>(
    prob: &BlockProblem,
    iterate: &mut Iterate,
    dual: &DualState,
    params: &StepParams,
    linmax: usize,
    tol: f64,
    oracle: &mut O,
) -> BcdResult<SweepResult> {
    let mut result = SweepResult {
        inner_iters: 0,
        eps_fp: f64::INFINITY,
        rejected: 0,
    };

    for it in 0..linmax {
        for idx in 0..prob.num_blocks() {
            let step = block_step(prob, iterate, dual, idx, params, oracle)?;
            if !step.accepted {
                result.rejected += 1;
            }
        }
        iterate.resum();

        result.inner_iters = it + 1;
        result.eps_fp = iterate.fixed_point_sum();
        if result.eps_fp < tol {
            log::trace!("sweep settled after {} passes", result.inner_iters);
            break;
        }
    }

    Ok(result)
}
