//! Oracle for blocks without local constraints.

use super::BlockOracle;
use crate::error::OracleError;

/// Best response over the full cube `{0,1}^n`: select exactly the columns
/// with negative cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconstrainedOracle;

impl BlockOracle for UnconstrainedOracle {
    fn solve_block(&mut self, _block: usize, cost: &[f64]) -> Result<Vec<f64>, OracleError> {
        Ok(cost
            .iter()
            .map(|&cj| if cj < 0.0 { 1.0 } else { 0.0 })
            .collect())
    }
}
