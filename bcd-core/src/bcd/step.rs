//! Linearized-proximal best response for a single block.

use super::{DualState, Iterate};
use crate::error::{BcdError, BcdResult};
use crate::linalg::{dense, sparse};
use crate::oracle::{self, BlockOracle};
use crate::problem::BlockProblem;
use crate::settings::ProximalRule;

/// Step-size parameters shared by every block in a sweep.
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    /// Proximal step.
    pub tau: f64,

    /// Proximal centre rule.
    pub proximal: ProximalRule,

    /// Extrapolation weight for [`ProximalRule::Extrapolated`].
    pub gamma: f64,
}

/// Outcome of one block update.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStep {
    /// `||x_old - x_new||`.
    pub fixed_point: f64,

    /// Whether the oracle's proposal was kept.
    pub accepted: bool,

    /// `g' x_new` for the assignment actually applied (always <= 0).
    pub linearized_cost: f64,
}

/// Linearized cost
/// `g = c + rho * A' max(r + lambda / rho, 0) + (0.5 - centre) / tau`
/// for block `idx` at the current iterate.
pub fn linearized_cost(
    prob: &BlockProblem,
    iterate: &Iterate,
    dual: &DualState,
    idx: usize,
    params: &StepParams,
) -> BcdResult<Vec<f64>> {
    let blk = &prob.blocks[idx];
    let r = iterate.residual(&prob.b);
    let shifted = dual.shifted_residual(&r);

    let mut g = blk.c.clone();
    sparse::spmv_transpose(&blk.A, &shifted, &mut g, dual.rho, 1.0);

    let x = iterate.block(idx);
    match params.proximal {
        ProximalRule::Linearized => {
            for (gj, xj) in g.iter_mut().zip(x) {
                *gj += (0.5 - xj) / params.tau;
            }
        }
        ProximalRule::Extrapolated => {
            let x_prev = iterate.prev_block(idx);
            for ((gj, xj), pj) in g.iter_mut().zip(x).zip(x_prev) {
                let centre = xj + params.gamma * (xj - pj);
                *gj += (0.5 - centre) / params.tau;
            }
        }
    }

    if !dense::all_finite(&g) {
        return Err(BcdError::Numerical(format!(
            "non-finite linearized cost on block {} (rho = {:e}, tau = {:e})",
            idx, dual.rho, params.tau
        )));
    }
    Ok(g)
}

/// Update block `idx` in place with the oracle's best response.
///
/// A proposal with positive linearized cost is replaced by the all-zero
/// assignment.
pub fn block_step<O: BlockOracle + ?Sized>(
    prob: &BlockProblem,
    iterate: &mut Iterate,
    dual: &DualState,
    idx: usize,
    params: &StepParams,
    oracle: &mut O,
) -> BcdResult<BlockStep> {
    let g = linearized_cost(prob, iterate, dual, idx, params)?;
    let proposal = oracle::checked_solve(oracle, idx, &g)?;

    let lin = dense::dot(&g, &proposal);
    let (x_new, accepted, linearized_cost) = if lin > 0.0 {
        log::trace!("block {}: proposal rejected (g'x = {:+.3e})", idx, lin);
        (vec![0.0; g.len()], false, 0.0)
    } else {
        (proposal, true, lin)
    };

    let fixed_point = iterate.set_block(prob, idx, x_new);
    Ok(BlockStep {
        fixed_point,
        accepted,
        linearized_cost,
    })
}
