//! Exact 0-1 knapsack oracle.
//!
//! Each block carries one knapsack row `w' x <= cap` with integer weights.
//! The best response is found by dynamic programming over exact weights.

use super::BlockOracle;
use crate::error::OracleError;

/// Per-block 0-1 knapsack regions.
#[derive(Debug, Clone)]
pub struct KnapsackOracle {
    /// Item weights per block.
    weights: Vec<Vec<u64>>,

    /// Capacity per block.
    capacities: Vec<u64>,
}

impl KnapsackOracle {
    /// Create an oracle with one knapsack row per block.
    pub fn new(weights: Vec<Vec<u64>>, capacities: Vec<u64>) -> Result<Self, OracleError> {
        if weights.len() != capacities.len() {
            return Err(OracleError::Failed(format!(
                "{} weight rows but {} capacities",
                weights.len(),
                capacities.len()
            )));
        }
        Ok(Self { weights, capacities })
    }

    /// Number of blocks this oracle serves.
    pub fn num_blocks(&self) -> usize {
        self.capacities.len()
    }

    /// Check `w' x <= cap` for block `block`.
    pub fn is_feasible(&self, block: usize, x: &[f64]) -> bool {
        match (self.weights.get(block), self.capacities.get(block)) {
            (Some(w), Some(&cap)) => {
                let load: u64 = w
                    .iter()
                    .zip(x.iter())
                    .filter(|&(_, &xj)| xj > 0.5)
                    .fold(0u64, |acc, (&wj, _)| acc.saturating_add(wj));
                load <= cap
            }
            _ => false,
        }
    }
}

impl BlockOracle for KnapsackOracle {
    fn solve_block(&mut self, block: usize, cost: &[f64]) -> Result<Vec<f64>, OracleError> {
        let (w, cap) = match (self.weights.get(block), self.capacities.get(block)) {
            (Some(w), Some(&cap)) => (w, cap),
            _ => {
                return Err(OracleError::Failed(format!(
                    "no knapsack data for block {}",
                    block
                )))
            }
        };
        if w.len() != cost.len() {
            return Err(OracleError::DimensionMismatch {
                expected: w.len(),
                got: cost.len(),
            });
        }
        if cost.iter().any(|c| c.is_nan()) {
            return Err(OracleError::Failed("cost vector contains NaN".to_string()));
        }

        let n = cost.len();
        let mut x = vec![0.0; n];

        // Only items that lower the cost and fit on their own are candidates.
        let items: Vec<usize> = (0..n)
            .filter(|&j| cost[j] < 0.0 && w[j] <= cap)
            .collect();
        if items.is_empty() {
            return Ok(x);
        }

        // No selection weighs more than all candidates together.
        let reach = items.iter().fold(0u64, |acc, &j| acc.saturating_add(w[j]));
        let cap = usize::try_from(cap.min(reach)).map_err(|_| {
            OracleError::Failed(format!(
                "knapsack capacity {} too large for block {}",
                cap.min(reach),
                block
            ))
        })?;

        // best[t]: largest gain with total weight exactly t
        let mut best = vec![f64::NEG_INFINITY; cap + 1];
        best[0] = 0.0;
        let mut keep = vec![vec![false; cap + 1]; items.len()];

        for (k, &j) in items.iter().enumerate() {
            let wj = w[j] as usize;
            let gain = -cost[j];
            for t in (wj..=cap).rev() {
                let cand = best[t - wj] + gain;
                if cand > best[t] {
                    best[t] = cand;
                    keep[k][t] = true;
                }
            }
        }

        // lightest weight attaining the best gain
        let mut t_star = 0;
        for t in 1..=cap {
            if best[t] > best[t_star] {
                t_star = t;
            }
        }

        let mut t = t_star;
        for k in (0..items.len()).rev() {
            if keep[k][t] {
                let j = items[k];
                x[j] = 1.0;
                t -= w[j] as usize;
            }
        }

        Ok(x)
    }
}
