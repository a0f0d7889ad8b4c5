//! Block oracles: best-response solvers for a single block.
//!
//! An oracle minimizes a linear cost over one block's own feasible region
//! and returns a 0-1 assignment. The selection "nothing" (all zeros) must
//! always be feasible with cost 0; the acceptance rule of the block step
//! relies on it.

mod knapsack;
mod unconstrained;

pub use knapsack::KnapsackOracle;
pub use unconstrained::UnconstrainedOracle;

use crate::error::{BcdError, BcdResult, OracleError};

/// Tolerance for snapping near-integral oracle output to {0, 1}.
const BINARY_TOL: f64 = 1e-6;

/// Best-response solver for the blocks of a problem.
pub trait BlockOracle {
    /// Return the 0-1 assignment minimizing `cost' x` over block `block`'s
    /// own feasible region. `cost.len()` is the block's column count.
    fn solve_block(&mut self, block: usize, cost: &[f64]) -> Result<Vec<f64>, OracleError>;
}

impl<O: BlockOracle + ?Sized> BlockOracle for &mut O {
    fn solve_block(&mut self, block: usize, cost: &[f64]) -> Result<Vec<f64>, OracleError> {
        (**self).solve_block(block, cost)
    }
}

impl<O: BlockOracle + ?Sized> BlockOracle for Box<O> {
    fn solve_block(&mut self, block: usize, cost: &[f64]) -> Result<Vec<f64>, OracleError> {
        (**self).solve_block(block, cost)
    }
}

/// Oracle backed by a closure.
pub struct FnOracle<F> {
    f: F,
}

impl<F> FnOracle<F>
where
    F: FnMut(usize, &[f64]) -> Result<Vec<f64>, OracleError>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> BlockOracle for FnOracle<F>
where
    F: FnMut(usize, &[f64]) -> Result<Vec<f64>, OracleError>,
{
    fn solve_block(&mut self, block: usize, cost: &[f64]) -> Result<Vec<f64>, OracleError> {
        (self.f)(block, cost)
    }
}

/// Call the oracle and check its answer is a 0-1 vector of the right length.
///
/// Entries within `BINARY_TOL` of 0 or 1 are snapped.
pub(crate) fn checked_solve<O: BlockOracle + ?Sized>(
    oracle: &mut O,
    block: usize,
    cost: &[f64],
) -> BcdResult<Vec<f64>> {
    let mut x = oracle
        .solve_block(block, cost)
        .map_err(|e| BcdError::oracle(block, e))?;

    if x.len() != cost.len() {
        return Err(BcdError::oracle(
            block,
            OracleError::DimensionMismatch {
                expected: cost.len(),
                got: x.len(),
            },
        ));
    }

    for (index, xi) in x.iter_mut().enumerate() {
        if (*xi - 1.0).abs() <= BINARY_TOL {
            *xi = 1.0;
        } else if xi.abs() <= BINARY_TOL {
            *xi = 0.0;
        } else {
            return Err(BcdError::oracle(
                block,
                OracleError::NonBinary { index, value: *xi },
            ));
        }
    }

    Ok(x)
}
