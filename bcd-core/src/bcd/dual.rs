//! Penalty weight and linking multiplier.

use crate::error::{BcdError, BcdResult};
use crate::linalg::dense;
use crate::settings::DualMethod;

/// Multiplier/penalty state owned by the outer loop.
#[derive(Debug, Clone)]
pub struct DualState {
    /// Penalty weight (non-decreasing).
    pub rho: f64,

    /// Linking multiplier (componentwise non-negative).
    pub lambda: Vec<f64>,

    /// Residual seen by the previous multiplier update (PDHG only).
    r_prev: Option<Vec<f64>>,
}

impl DualState {
    /// `rho = rho_init`, `lambda = rho_init * 1`.
    pub fn new(rho_init: f64, m: usize) -> Self {
        Self {
            rho: rho_init,
            lambda: vec![rho_init; m],
            r_prev: None,
        }
    }

    /// `max(r + lambda / rho, 0)`.
    pub fn shifted_residual(&self, r: &[f64]) -> Vec<f64> {
        let mut out: Vec<f64> = r
            .iter()
            .zip(&self.lambda)
            .map(|(ri, li)| ri + li / self.rho)
            .collect();
        dense::project_nonneg(&mut out);
        out
    }

    /// Grow the penalty by `sigma` and update the multiplier from the
    /// residual `r` measured before growth.
    pub fn advance(
        &mut self,
        r: &[f64],
        sigma: f64,
        method: DualMethod,
        alpha: f64,
        beta: f64,
    ) -> BcdResult<()> {
        let rho_new = self.rho * sigma;
        if !rho_new.is_finite() {
            return Err(BcdError::Numerical(format!(
                "penalty weight overflowed growing from {:e}",
                self.rho
            )));
        }
        self.rho = rho_new;

        match method {
            DualMethod::Lagrangian => {
                for (li, ri) in self.lambda.iter_mut().zip(r) {
                    *li += rho_new * ri;
                }
            }
            DualMethod::Pdhg => {
                let r_prev = self.r_prev.as_deref().unwrap_or(r);
                for ((li, ri), rpi) in self.lambda.iter_mut().zip(r).zip(r_prev) {
                    let r_bar = ri + beta * (ri - rpi);
                    let l_plus = (*li + rho_new * r_bar).max(0.0);
                    *li = alpha * l_plus + (1.0 - alpha) * *li;
                }
                self.r_prev = Some(r.to_vec());
            }
        }
        dense::project_nonneg(&mut self.lambda);

        if !dense::all_finite(&self.lambda) {
            return Err(BcdError::Numerical(
                "linking multiplier became non-finite".to_string(),
            ));
        }
        Ok(())
    }
}
