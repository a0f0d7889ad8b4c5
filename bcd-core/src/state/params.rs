//! Algorithm parameters and running counters.

use super::BoundHistory;
use crate::error::BcdResult;
use crate::settings::{BcdModes, BcdSettings};

/// Tuning/state store for one solve.
///
/// Holds the damping factor, step parameters, stagnation counters, bound
/// histories and the last computed gap. Created from [`BcdSettings`] and
/// never shared between solves.
#[derive(Debug, Clone, PartialEq)]
pub struct BcdParams {
    // === Configured values ===
    kappa_init: f64,
    stuck_threshold: usize,
    gap_eps: f64,
    modes: BcdModes,

    /// Penalty growth factor.
    pub sigma: f64,

    /// PDHG relaxation.
    pub alpha: f64,

    /// PDHG residual extrapolation.
    pub beta: f64,

    /// Primal extrapolation for the proximal centre.
    pub gamma: f64,

    /// Outer iteration cap.
    pub itermax: usize,

    /// Inner sweep cap.
    pub linmax: usize,

    // === Running state ===
    kappa: f64,
    num_stuck: usize,
    changed: bool,
    iter: usize,
    bounds: BoundHistory,
    gap: Option<f64>,
}

impl BcdParams {
    /// Build the store from settings, resolving mode selectors once.
    pub fn new(settings: &BcdSettings) -> Self {
        Self {
            kappa_init: settings.kappa,
            stuck_threshold: settings.stuck_threshold,
            gap_eps: settings.gap_eps,
            modes: settings.modes(),
            sigma: settings.sigma,
            alpha: settings.alpha,
            beta: settings.beta,
            gamma: settings.gamma,
            itermax: settings.itermax,
            linmax: settings.linmax,
            kappa: settings.kappa,
            num_stuck: 0,
            changed: false,
            iter: 0,
            bounds: BoundHistory::new(),
            gap: None,
        }
    }

    /// Restore counters, histories and `kappa` to their initial values.
    pub fn reset(&mut self) {
        self.kappa = self.kappa_init;
        self.num_stuck = 0;
        self.changed = false;
        self.iter = 0;
        self.bounds.clear();
        self.gap = None;
    }

    /// Re-read configuration (including mode selectors) and reset.
    pub fn reconfigure(&mut self, settings: &BcdSettings) {
        *self = Self::new(settings);
    }

    /// Record a dual bound.
    ///
    /// Returns true when this call triggered stagnation damping.
    pub fn update_bound(&mut self, lb: f64) -> bool {
        let improves = match self.bounds.best_lower() {
            None => true,
            Some(best) => lb >= best,
        };
        self.bounds.push_lower(lb);

        if improves {
            self.changed = true;
            self.num_stuck = 0;
            return false;
        }

        self.changed = false;
        self.num_stuck += 1;
        if self.num_stuck >= self.stuck_threshold {
            self.kappa *= 0.5;
            self.num_stuck = 0;
            return true;
        }
        false
    }

    /// Record a primal bound.
    pub fn update_incumbent(&mut self, ub: f64) {
        self.bounds.push_upper(ub);
    }

    /// Recompute the relative gap from the histories.
    pub fn update_gap(&mut self) -> BcdResult<f64> {
        let gap = self.bounds.gap(self.gap_eps)?;
        self.gap = Some(gap);
        Ok(gap)
    }

    /// Mark one more completed outer iteration.
    pub fn advance(&mut self) {
        self.iter += 1;
    }

    pub fn best_lower_bound(&self) -> Option<f64> {
        self.bounds.best_lower()
    }

    pub fn best_upper_bound(&self) -> Option<f64> {
        self.bounds.best_upper()
    }

    pub fn bounds(&self) -> &BoundHistory {
        &self.bounds
    }

    /// Current damping factor.
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    pub fn kappa_init(&self) -> f64 {
        self.kappa_init
    }

    /// Ratio of current to configured damping; scales the proximal step.
    pub fn damping(&self) -> f64 {
        self.kappa / self.kappa_init
    }

    pub fn num_stuck(&self) -> usize {
        self.num_stuck
    }

    /// Whether the last recorded dual bound improved.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn iter(&self) -> usize {
        self.iter
    }

    /// Last computed gap, if any.
    pub fn gap(&self) -> Option<f64> {
        self.gap
    }

    pub fn modes(&self) -> BcdModes {
        self.modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BcdError;
    use crate::settings::{DualMethod, HeuristicMethod};

    #[test]
    fn test_stagnation_halves_kappa_once() {
        let settings = BcdSettings::default();
        let mut params = BcdParams::new(&settings);

        assert!(!params.update_bound(5.0));
        assert!(params.changed());

        assert!(!params.update_bound(4.0));
        assert!(!params.update_bound(4.5));
        assert_eq!(params.num_stuck(), 2);
        assert!(params.update_bound(3.0));

        assert!((params.kappa() - 0.1).abs() < 1e-15);
        assert_eq!(params.num_stuck(), 0);
        assert!(!params.changed());
        assert_eq!(params.bounds().lower().len(), 4);
    }

    #[test]
    fn test_equal_bound_counts_as_improvement() {
        let mut params = BcdParams::new(&BcdSettings::default());
        params.update_bound(1.0);
        params.update_bound(0.5);
        params.update_bound(1.0);
        assert_eq!(params.num_stuck(), 0);
        assert!(params.changed());
    }

    #[test]
    fn test_gap_tracking() {
        let mut params = BcdParams::new(&BcdSettings::default());
        assert!(matches!(params.update_gap(), Err(BcdError::Configuration(_))));
        assert_eq!(params.gap(), None);

        for lb in [1.0, 2.0, 1.5] {
            params.update_bound(lb);
        }
        params.update_incumbent(10.0);
        params.update_incumbent(8.0);

        let gap = params.update_gap().unwrap();
        assert!((gap - 6.0 / 2.001).abs() < 1e-12);
        assert_eq!(params.gap(), Some(gap));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let settings = BcdSettings::default()
            .with_dual_method(DualMethod::Pdhg)
            .with_primal_heuristic(HeuristicMethod::Sequential);
        let fresh = BcdParams::new(&settings);

        let mut params = fresh.clone();
        for lb in [3.0, 2.0, 1.0, 0.0] {
            params.update_bound(lb);
        }
        params.update_incumbent(4.0);
        params.update_gap().unwrap();
        params.advance();

        params.reset();
        let once = params.clone();
        params.reset();

        assert_eq!(params, once);
        assert_eq!(params, fresh);
        assert_eq!(params.modes().dual_method, DualMethod::Pdhg);
    }

    #[test]
    fn test_reconfigure_rereads_modes() {
        let mut params = BcdParams::new(&BcdSettings::default());
        params.update_bound(1.0);

        params.reconfigure(&BcdSettings::default().with_dual_method(DualMethod::Pdhg));
        assert_eq!(params.modes().dual_method, DualMethod::Pdhg);
        assert!(params.bounds().lower().is_empty());
    }
}
