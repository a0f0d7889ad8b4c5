//! Outer-iteration measurements.

use super::{DualState, Iterate};
use crate::error::{BcdError, BcdResult};
use crate::linalg::dense;
use crate::problem::BlockProblem;

/// Quantities evaluated after each inner sweep.
#[derive(Debug, Clone)]
pub struct OuterMetrics {
    /// Linking residual `Σ A_idx x_idx - b`.
    pub residual: Vec<f64>,

    /// `Σ c_idx' x_idx`.
    pub cx: f64,

    /// Augmented-Lagrangian value.
    pub lobj: f64,

    /// `||max(residual, 0)||`.
    pub pfeas: f64,

    /// Summed fixed-point residual of the last pass.
    pub eps_fp: f64,
}

impl OuterMetrics {
    /// Evaluate at the current iterate and multiplier.
    pub fn evaluate(prob: &BlockProblem, iterate: &Iterate, dual: &DualState) -> BcdResult<Self> {
        let residual = iterate.residual(&prob.b);
        let cx = iterate.total_cost();
        let pfeas = dense::norm2(&dense::positive_part(&residual));
        let lobj = augmented_lagrangian(cx, &residual, &dual.lambda, dual.rho);

        if !cx.is_finite() || !lobj.is_finite() {
            return Err(BcdError::Numerical(format!(
                "non-finite objective (c'x = {}, lobj = {})",
                cx, lobj
            )));
        }

        Ok(Self {
            residual,
            cx,
            lobj,
            pfeas,
            eps_fp: iterate.fixed_point_sum(),
        })
    }

    /// Feasibility and fixed-point tests for termination.
    #[inline]
    pub fn is_converged(&self, tol_feas: f64, tol_fp: f64) -> bool {
        self.pfeas <= tol_feas && self.eps_fp < tol_fp
    }
}

/// `cx + rho/2 ||max(r + lambda/rho, 0)||² - ||lambda||² / (2 rho)`
pub fn augmented_lagrangian(cx: f64, r: &[f64], lambda: &[f64], rho: f64) -> f64 {
    let penalty: f64 = r
        .iter()
        .zip(lambda)
        .map(|(ri, li)| {
            let s = (ri + li / rho).max(0.0);
            s * s
        })
        .sum();
    let lambda_sq = dense::dot(lambda, lambda);
    cx + 0.5 * rho * penalty - lambda_sq / (2.0 * rho)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LinkingBlock;

    #[test]
    fn test_augmented_lagrangian() {
        // slack row contributes only the multiplier term
        let v = augmented_lagrangian(-1.0, &[0.0, -5.0], &[1.0, 1.0], 1.0);
        // -1 + 0.5 * (1 + 0) - 2 / 2
        assert!((v - (-1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_on_violated_seed() {
        let prob = BlockProblem::new(
            vec![
                LinkingBlock::from_dense(&[vec![1.0]], vec![-1.0]).unwrap(),
                LinkingBlock::from_dense(&[vec![1.0]], vec![-1.0]).unwrap(),
            ],
            vec![1.0],
        )
        .unwrap();
        let it = Iterate::ones(&prob);
        let dual = DualState::new(1.0, 1);

        let m = OuterMetrics::evaluate(&prob, &it, &dual).unwrap();
        assert_eq!(m.residual, vec![1.0]);
        assert!((m.pfeas - 1.0).abs() < 1e-12);
        assert!((m.cx + 2.0).abs() < 1e-12);
        // -2 + 0.5 * 4 - 0.5
        assert!((m.lobj + 0.5).abs() < 1e-12);
        assert!(!m.is_converged(0.0, 1e-4));
    }
}
