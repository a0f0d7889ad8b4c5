//! Problem data structures and validation.
//!
//! The solver works with the block-angular 0-1 program
//!
//! ```text
//! minimize    Σ_idx c_idx' x_idx
//! subject to  Σ_idx A_idx x_idx <= b     (linking rows)
//!             x_idx ∈ X_idx ⊆ {0,1}^n_idx (block-local region, oracle only)
//! ```
//!
//! The block-local regions `X_idx` never appear here: they are owned by the
//! [`BlockOracle`](crate::oracle::BlockOracle).
//!
//! # Dimensions
//!
//! - `m`: number of linking rows (length of b, rows of every A_idx)
//! - `n_idx`: column count of block idx (length of c_idx and x_idx)

use crate::error::{BcdError, BcdResult};
use crate::linalg::dense;
use crate::linalg::sparse::{self, SparseCsc};

/// One block of the linking structure: its slice of the linking matrix and
/// its cost vector.
#[derive(Debug, Clone)]
#[allow(non_snake_case)] // A is standard notation
pub struct LinkingBlock {
    /// Linking sub-matrix A_idx (m × n_idx, CSC format)
    pub A: SparseCsc,

    /// Linear cost vector c_idx (length n_idx)
    pub c: Vec<f64>,
}

impl LinkingBlock {
    /// Create a block, converting `a` to CSC storage if needed.
    pub fn new(a: SparseCsc, c: Vec<f64>) -> Self {
        let a = if a.is_csc() { a } else { a.to_csc() };
        Self { A: a, c }
    }

    /// Create a block from dense linking rows.
    ///
    /// All rows must share one length; a mismatch against `c` is left to
    /// [`BlockProblem::validate`].
    pub fn from_dense(rows: &[Vec<f64>], c: Vec<f64>) -> BcdResult<Self> {
        let ncols = rows.first().map_or(c.len(), |row| row.len());
        Ok(Self::new(sparse::from_dense_rows(rows, ncols)?, c))
    }

    /// Number of decision variables in this block.
    pub fn num_vars(&self) -> usize {
        self.c.len()
    }

    /// Block cost c_idx' x_idx.
    pub fn cost(&self, x: &[f64]) -> f64 {
        dense::dot(&self.c, x)
    }

    /// Linking contribution A_idx x_idx.
    pub fn linking_product(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.A.rows()];
        sparse::spmv(&self.A, x, &mut out, 1.0, 0.0);
        out
    }
}

/// Block-angular 0-1 program restricted to what the solver reads.
#[derive(Debug, Clone)]
pub struct BlockProblem {
    /// Blocks in their fixed sweep order.
    pub blocks: Vec<LinkingBlock>,

    /// Shared linking right-hand side b (length m)
    pub b: Vec<f64>,
}

impl BlockProblem {
    /// Create and validate a problem.
    pub fn new(blocks: Vec<LinkingBlock>, b: Vec<f64>) -> BcdResult<Self> {
        let prob = Self { blocks, b };
        prob.validate()?;
        Ok(prob)
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Number of linking rows.
    pub fn num_linking_rows(&self) -> usize {
        self.b.len()
    }

    /// Total number of decision variables across blocks.
    pub fn num_vars(&self) -> usize {
        self.blocks.iter().map(|blk| blk.num_vars()).sum()
    }

    /// Validate dimensions and data.
    pub fn validate(&self) -> BcdResult<()> {
        let m = self.num_linking_rows();

        if self.blocks.is_empty() {
            return Err(BcdError::Configuration(
                "problem has no blocks".to_string(),
            ));
        }

        if !dense::all_finite(&self.b) {
            return Err(BcdError::Configuration(
                "linking right-hand side b has non-finite entries".to_string(),
            ));
        }

        for (idx, blk) in self.blocks.iter().enumerate() {
            if blk.A.rows() != m {
                return Err(BcdError::Configuration(format!(
                    "A[{}] has {} rows, expected {} (length of b)",
                    idx,
                    blk.A.rows(),
                    m
                )));
            }
            if blk.A.cols() != blk.c.len() {
                return Err(BcdError::Configuration(format!(
                    "A[{}] has {} cols but c[{}] has length {}",
                    idx,
                    blk.A.cols(),
                    idx,
                    blk.c.len()
                )));
            }
            if !dense::all_finite(&blk.c) || !dense::all_finite(blk.A.data()) {
                return Err(BcdError::Configuration(format!(
                    "block {} has non-finite cost or linking coefficients",
                    idx
                )));
            }
        }

        Ok(())
    }

    /// Frobenius norm of the full linking matrix [A_0, A_1, ...].
    pub fn linking_frobenius_norm(&self) -> f64 {
        self.blocks
            .iter()
            .map(|blk| sparse::frobenius_norm_sq(&blk.A))
            .sum::<f64>()
            .sqrt()
    }

    /// Total cost Σ c_idx' x_idx.
    pub fn objective(&self, x: &[Vec<f64>]) -> f64 {
        self.blocks
            .iter()
            .zip(x.iter())
            .map(|(blk, xi)| blk.cost(xi))
            .sum()
    }

    /// Linking residual Σ A_idx x_idx - b.
    pub fn linking_residual(&self, x: &[Vec<f64>]) -> Vec<f64> {
        let mut r: Vec<f64> = self.b.iter().map(|&bi| -bi).collect();
        for (blk, xi) in self.blocks.iter().zip(x.iter()) {
            sparse::spmv(&blk.A, xi, &mut r, 1.0, 1.0);
        }
        r
    }

    /// Check Σ A_idx x_idx <= b + tol componentwise.
    pub fn is_linking_feasible(&self, x: &[Vec<f64>], tol: f64) -> bool {
        self.linking_residual(x).iter().all(|&ri| ri <= tol)
    }
}
