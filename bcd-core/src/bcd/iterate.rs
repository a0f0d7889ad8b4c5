//! Joint block iterate with cached linking and cost products.

use crate::linalg::dense;
use crate::problem::BlockProblem;

/// One 0-1 vector per block plus the cached quantities the sweep reads.
///
/// The per-block caches `A_idx x_idx` and `c_idx' x_idx` are refreshed
/// together with the block whenever it changes. The aggregate `Σ A_idx x_idx`
/// is updated incrementally and re-summed by [`Iterate::resum`].
#[derive(Debug, Clone)]
pub struct Iterate {
    x: Vec<Vec<f64>>,

    /// Block values before their most recent update.
    x_prev: Vec<Vec<f64>>,

    /// A_idx x_idx per block.
    ax: Vec<Vec<f64>>,

    /// c_idx' x_idx per block.
    cx: Vec<f64>,

    /// Σ_idx A_idx x_idx.
    agg: Vec<f64>,

    /// Fixed-point residual of the last update of each block.
    fp: Vec<f64>,

    /// Whether each block holds a value produced by an update
    /// rather than the seed.
    updated: Vec<bool>,
}

impl Iterate {
    /// All-ones seed. No block counts as updated until it is replaced.
    pub fn ones(prob: &BlockProblem) -> Self {
        let x: Vec<Vec<f64>> = prob
            .blocks
            .iter()
            .map(|blk| vec![1.0; blk.num_vars()])
            .collect();
        Self::build(prob, x, false)
    }

    /// Iterate from explicit block vectors, all treated as updated.
    pub fn from_blocks(prob: &BlockProblem, x: Vec<Vec<f64>>) -> Self {
        Self::build(prob, x, true)
    }

    fn build(prob: &BlockProblem, x: Vec<Vec<f64>>, updated: bool) -> Self {
        let ax: Vec<Vec<f64>> = prob
            .blocks
            .iter()
            .zip(x.iter())
            .map(|(blk, xi)| blk.linking_product(xi))
            .collect();
        let cx = prob
            .blocks
            .iter()
            .zip(x.iter())
            .map(|(blk, xi)| blk.cost(xi))
            .collect();

        let mut it = Self {
            x_prev: x.clone(),
            x,
            ax,
            cx,
            agg: vec![0.0; prob.num_linking_rows()],
            fp: vec![0.0; prob.num_blocks()],
            updated: vec![updated; prob.num_blocks()],
        };
        it.resum();
        it
    }

    /// Replace block `idx`, refreshing its caches and the aggregate.
    ///
    /// Returns the fixed-point residual `||x_old - x_new||`.
    pub fn set_block(&mut self, prob: &BlockProblem, idx: usize, x_new: Vec<f64>) -> f64 {
        let blk = &prob.blocks[idx];
        let fp = dense::dist2(&self.x[idx], &x_new);

        if fp > 0.0 {
            let ax_new = blk.linking_product(&x_new);
            for ((a, old), new) in self.agg.iter_mut().zip(&self.ax[idx]).zip(&ax_new) {
                *a += new - old;
            }
            self.ax[idx] = ax_new;
            self.cx[idx] = blk.cost(&x_new);
        }

        self.x_prev[idx] = std::mem::replace(&mut self.x[idx], x_new);
        self.fp[idx] = fp;
        self.updated[idx] = true;
        fp
    }

    /// Recompute the aggregate from the per-block caches.
    pub fn resum(&mut self) {
        self.agg.fill(0.0);
        for ax in &self.ax {
            for (a, v) in self.agg.iter_mut().zip(ax) {
                *a += v;
            }
        }
    }

    /// Aggregate linking residual `Σ A_idx x_idx - b`.
    pub fn residual(&self, b: &[f64]) -> Vec<f64> {
        self.agg.iter().zip(b).map(|(a, bi)| a - bi).collect()
    }

    /// Summed cost `Σ c_idx' x_idx`.
    pub fn total_cost(&self) -> f64 {
        self.cx.iter().sum()
    }

    /// Summed fixed-point residual over blocks.
    pub fn fixed_point_sum(&self) -> f64 {
        self.fp.iter().sum()
    }

    /// True while some block still holds its seed value.
    pub fn is_seed(&self) -> bool {
        self.updated.iter().any(|&u| !u)
    }

    pub fn is_updated(&self, idx: usize) -> bool {
        self.updated[idx]
    }

    pub fn block(&self, idx: usize) -> &[f64] {
        &self.x[idx]
    }

    pub fn prev_block(&self, idx: usize) -> &[f64] {
        &self.x_prev[idx]
    }

    pub fn block_cost(&self, idx: usize) -> f64 {
        self.cx[idx]
    }

    pub fn blocks(&self) -> &[Vec<f64>] {
        &self.x
    }

    pub fn into_blocks(self) -> Vec<Vec<f64>> {
        self.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LinkingBlock;

    fn problem() -> BlockProblem {
        BlockProblem::new(
            vec![
                LinkingBlock::from_dense(&[vec![1.0, 2.0], vec![0.0, 1.0]], vec![-1.0, 3.0]).unwrap(),
                LinkingBlock::from_dense(&[vec![1.0], vec![1.0]], vec![-2.0]).unwrap(),
            ],
            vec![2.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_seed_caches() {
        let prob = problem();
        let it = Iterate::ones(&prob);
        assert_eq!(it.residual(&prob.b), vec![2.0, 1.0]);
        assert!((it.total_cost() - 0.0).abs() < 1e-12);
        assert_eq!(it.fixed_point_sum(), 0.0);
    }

    #[test]
    fn test_set_block_matches_full_recompute() {
        let prob = problem();
        let mut it = Iterate::ones(&prob);

        let fp = it.set_block(&prob, 0, vec![1.0, 0.0]);
        assert!((fp - 1.0).abs() < 1e-12);
        assert_eq!(it.prev_block(0), &[1.0, 1.0]);

        let x = it.blocks().to_vec();
        assert_eq!(it.residual(&prob.b), prob.linking_residual(&x));
        assert!((it.total_cost() - prob.objective(&x)).abs() < 1e-12);

        it.resum();
        assert_eq!(it.residual(&prob.b), prob.linking_residual(&x));
    }

    #[test]
    fn test_unchanged_block_has_zero_residual() {
        let prob = problem();
        let mut it = Iterate::ones(&prob);
        assert_eq!(it.set_block(&prob, 1, vec![1.0]), 0.0);
        assert_eq!(it.block_cost(1), -2.0);
    }

    #[test]
    fn test_seed_until_every_block_updated() {
        let prob = problem();
        let mut it = Iterate::ones(&prob);
        assert!(it.is_seed());

        it.set_block(&prob, 0, vec![0.0, 0.0]);
        assert!(it.is_updated(0));
        assert!(!it.is_updated(1));
        assert!(it.is_seed());

        // an unchanged value still counts as an update
        it.set_block(&prob, 1, vec![1.0]);
        assert!(!it.is_seed());

        let given = Iterate::from_blocks(&prob, vec![vec![0.0, 0.0], vec![0.0]]);
        assert!(!given.is_seed());
    }
}
