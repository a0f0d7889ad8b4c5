//! Seeded block-angular knapsack instances.
//!
//! `num_blocks` vehicles compete for `num_items` jobs. Every block has one
//! column per item; linking row `item` allows the item to be served at most
//! once across blocks. A block's cost for an item is its travel distance
//! minus the item's profit, and each block has its own weight capacity.

use bcd_core::linalg::sparse;
use bcd_core::{BcdResult, BlockProblem, KnapsackOracle, LinkingBlock};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generator parameters.
#[derive(Debug, Clone, Copy)]
pub struct InstanceSpec {
    pub num_blocks: usize,
    pub num_items: usize,
    pub seed: u64,
}

/// A generated problem and the oracle for its block regions.
pub struct Instance {
    pub problem: BlockProblem,
    pub oracle: KnapsackOracle,
}

pub fn generate(spec: InstanceSpec) -> BcdResult<Instance> {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    let n = spec.num_items;

    // item locations and depots on the unit square
    let items: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen(), rng.gen())).collect();
    let profit: Vec<f64> = (0..n).map(|_| rng.gen_range(0.5..1.5)).collect();
    let weight: Vec<u64> = (0..n).map(|_| rng.gen_range(1..=10)).collect();
    let total_weight: u64 = weight.iter().sum();

    let mut blocks = Vec::with_capacity(spec.num_blocks);
    let mut capacities = Vec::with_capacity(spec.num_blocks);
    for _ in 0..spec.num_blocks {
        let depot: (f64, f64) = (rng.gen(), rng.gen());
        let c: Vec<f64> = items
            .iter()
            .zip(&profit)
            .map(|(&(ix, iy), &p)| {
                let dist = ((ix - depot.0).powi(2) + (iy - depot.1).powi(2)).sqrt();
                dist - p
            })
            .collect();

        let a = sparse::from_triplets(n, n, (0..n).map(|j| (j, j, 1.0)));
        blocks.push(LinkingBlock::new(a, c));

        // room for roughly a fair share of the items plus slack
        let share = total_weight / spec.num_blocks.max(1) as u64;
        capacities.push(share + rng.gen_range(0..=share / 2 + 1));
    }

    let problem = BlockProblem::new(blocks, vec![1.0; n])?;
    let oracle = KnapsackOracle::new(vec![weight; spec.num_blocks], capacities)
        .map_err(|e| bcd_core::BcdError::Configuration(e.to_string()))?;

    log::debug!(
        "generated instance: {} blocks, {} items, total weight {}",
        spec.num_blocks,
        n,
        total_weight
    );
    Ok(Instance { problem, oracle })
}
