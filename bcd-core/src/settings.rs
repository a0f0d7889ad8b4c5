//! Configuration settings for the BCD solver.

use crate::error::{BcdError, BcdResult};
use crate::problem::BlockProblem;

/// Rule for updating the linking multiplier after each outer iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DualMethod {
    /// Classic augmented-Lagrangian step: `lambda + rho * r`, projected.
    #[default]
    Lagrangian,

    /// Primal-dual hybrid gradient step on an extrapolated residual
    /// `r + beta * (r - r_prev)`, relaxed by `alpha`.
    Pdhg,
}

/// Provider of feasible integral solutions built from block iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeuristicMethod {
    /// Take the joint BCD iterate as-is when it satisfies the linking rows.
    #[default]
    Iterate,

    /// Fix blocks one at a time in order of increasing cost, re-solving a
    /// block with the oracle when its assignment no longer fits.
    Sequential,
}

/// Centre of the proximal term in the block update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProximalRule {
    /// Centre at the current block iterate.
    #[default]
    Linearized,

    /// Centre at `x + gamma * (x - x_prev)` (indefinite proximal with extrapolation).
    Extrapolated,
}

/// Estimate of the linking-matrix norm used to derive the proximal step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkingNorm {
    /// A fixed constant.
    Fixed(f64),

    /// `scale * ||[A_0, A_1, ...]||_F`.
    Frobenius {
        /// Multiplier applied to the Frobenius norm.
        scale: f64,
    },
}

impl Default for LinkingNorm {
    fn default() -> Self {
        LinkingNorm::Fixed(20.0)
    }
}

impl LinkingNorm {
    /// Resolve the estimate for a problem.
    pub fn resolve(&self, prob: &BlockProblem) -> BcdResult<f64> {
        let norm = match *self {
            LinkingNorm::Fixed(v) => v,
            LinkingNorm::Frobenius { scale } => scale * prob.linking_frobenius_norm(),
        };
        if !(norm.is_finite() && norm > 0.0) {
            return Err(BcdError::Configuration(format!(
                "linking norm estimate must be positive and finite, got {}",
                norm
            )));
        }
        Ok(norm)
    }
}

/// Mode selectors, resolved once per solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BcdModes {
    /// Multiplier update rule.
    pub dual_method: DualMethod,

    /// Heuristic run after every outer iteration (None = disabled).
    pub primal_heuristic: Option<HeuristicMethod>,

    /// Heuristic run once at termination if no incumbent exists.
    pub feasible_provider: HeuristicMethod,
}

/// BCD solver settings.
#[derive(Debug, Clone)]
pub struct BcdSettings {
    // === Iteration limits ===
    /// Maximum number of outer (continuation) iterations.
    pub itermax: usize,

    /// Maximum number of inner sweeps per outer iteration.
    pub linmax: usize,

    /// Time limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    // === Penalty / proximal parameters ===
    /// Seed penalty weight; must be strictly positive.
    pub rho_init: f64,

    /// Penalty growth factor per outer iteration (>= 1).
    pub sigma: f64,

    /// Initial proximal damping factor.
    pub kappa: f64,

    /// Dual relaxation for the PDHG update.
    pub alpha: f64,

    /// Residual extrapolation weight for the PDHG update.
    pub beta: f64,

    /// Primal extrapolation weight for [`ProximalRule::Extrapolated`].
    pub gamma: f64,

    /// Linking-matrix norm estimate.
    pub linking_norm: LinkingNorm,

    /// Proximal centre rule.
    pub proximal: ProximalRule,

    // === Tolerances ===
    /// Summed fixed-point residual below which a sweep (and the solve) stops.
    pub tol_fixed_point: f64,

    /// Primal feasibility tolerance on `||max(Ax - b, 0)||`. Zero requires
    /// exact feasibility, which is attainable for 0-1 iterates.
    pub tol_feas: f64,

    /// Additive guard in the relative gap denominator.
    pub gap_eps: f64,

    /// Consecutive non-improving dual bounds before `kappa` is halved.
    pub stuck_threshold: usize,

    // === Modes ===
    /// Multiplier update rule.
    pub dual_method: DualMethod,

    /// Heuristic run after every outer iteration (None = disabled).
    pub primal_heuristic: Option<HeuristicMethod>,

    /// Heuristic used at termination when no incumbent was found.
    pub feasible_provider: HeuristicMethod,

    // === Output ===
    /// Emit the iteration log.
    pub verbose: bool,

    /// Log frequency (print every N outer iterations).
    pub log_freq: usize,
}

impl Default for BcdSettings {
    fn default() -> Self {
        Self {
            // Limits
            itermax: 10_000,
            linmax: 10,
            time_limit_ms: None,

            // Penalty / proximal
            rho_init: 1e-2,
            sigma: 2.0,
            kappa: 0.2,
            alpha: 1.0,
            beta: 1.0,
            gamma: 0.1,
            linking_norm: LinkingNorm::default(),
            proximal: ProximalRule::default(),

            // Tolerances
            tol_fixed_point: 1e-4,
            tol_feas: 0.0,
            gap_eps: 1e-3,
            stuck_threshold: 3,

            // Modes
            dual_method: DualMethod::default(),
            primal_heuristic: None,
            feasible_provider: HeuristicMethod::default(),

            // Output
            verbose: true,
            log_freq: 1,
        }
    }
}

impl BcdSettings {
    /// Create settings with the iteration log disabled.
    pub fn quiet() -> Self {
        Self {
            verbose: false,
            ..Self::default()
        }
    }

    /// Set the outer iteration cap.
    pub fn with_itermax(mut self, itermax: usize) -> Self {
        self.itermax = itermax;
        self
    }

    /// Set the inner sweep cap.
    pub fn with_linmax(mut self, linmax: usize) -> Self {
        self.linmax = linmax;
        self
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set the seed penalty weight.
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho_init = rho;
        self
    }

    /// Set the penalty growth factor.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the linking-norm estimate.
    pub fn with_linking_norm(mut self, norm: LinkingNorm) -> Self {
        self.linking_norm = norm;
        self
    }

    /// Set the multiplier update rule.
    pub fn with_dual_method(mut self, method: DualMethod) -> Self {
        self.dual_method = method;
        self
    }

    /// Enable a per-iteration primal heuristic.
    pub fn with_primal_heuristic(mut self, method: HeuristicMethod) -> Self {
        self.primal_heuristic = Some(method);
        self
    }

    /// Set the provider used at termination.
    pub fn with_feasible_provider(mut self, method: HeuristicMethod) -> Self {
        self.feasible_provider = method;
        self
    }

    /// Set the proximal centre rule.
    pub fn with_proximal(mut self, rule: ProximalRule) -> Self {
        self.proximal = rule;
        self
    }

    /// Mode selectors carried by these settings.
    pub fn modes(&self) -> BcdModes {
        BcdModes {
            dual_method: self.dual_method,
            primal_heuristic: self.primal_heuristic,
            feasible_provider: self.feasible_provider,
        }
    }

    /// Reject settings the solver cannot run with.
    pub fn validate(&self) -> BcdResult<()> {
        if !(self.rho_init.is_finite() && self.rho_init > 0.0) {
            return Err(BcdError::Configuration(format!(
                "seed penalty weight rho must be positive, got {}",
                self.rho_init
            )));
        }
        if !(self.sigma.is_finite() && self.sigma >= 1.0) {
            return Err(BcdError::Configuration(format!(
                "penalty growth factor sigma must be >= 1, got {}",
                self.sigma
            )));
        }
        if !(self.kappa.is_finite() && self.kappa > 0.0) {
            return Err(BcdError::Configuration(format!(
                "kappa must be positive, got {}",
                self.kappa
            )));
        }
        if self.linmax == 0 {
            return Err(BcdError::Configuration(
                "linmax must allow at least one sweep".to_string(),
            ));
        }
        if !(self.alpha > 0.0 && self.alpha <= 2.0) {
            return Err(BcdError::Configuration(format!(
                "alpha must lie in (0, 2], got {}",
                self.alpha
            )));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) || !(self.gamma.is_finite() && self.gamma >= 0.0)
        {
            return Err(BcdError::Configuration(
                "beta and gamma must be finite and non-negative".to_string(),
            ));
        }
        if !(self.tol_fixed_point >= 0.0) || !(self.tol_feas >= 0.0) || !(self.gap_eps > 0.0) {
            return Err(BcdError::Configuration(
                "tolerances must be non-negative and gap_eps positive".to_string(),
            ));
        }
        if self.stuck_threshold == 0 {
            return Err(BcdError::Configuration(
                "stuck_threshold must be at least 1".to_string(),
            ));
        }
        if let LinkingNorm::Fixed(v) = self.linking_norm {
            if !(v.is_finite() && v > 0.0) {
                return Err(BcdError::Configuration(format!(
                    "linking norm estimate must be positive, got {}",
                    v
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = BcdSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.itermax, 10_000);
        assert_eq!(settings.linmax, 10);
        assert_eq!(settings.linking_norm, LinkingNorm::Fixed(20.0));
        assert_eq!(settings.modes().dual_method, DualMethod::Lagrangian);
        assert_eq!(settings.modes().primal_heuristic, None);
    }

    #[test]
    fn test_non_positive_rho_rejected() {
        for rho in [0.0, -1.0, f64::NAN] {
            let settings = BcdSettings::default().with_rho(rho);
            assert!(matches!(settings.validate(), Err(BcdError::Configuration(_))));
        }
    }

    #[test]
    fn test_shrinking_sigma_rejected() {
        let settings = BcdSettings::default().with_sigma(0.5);
        assert!(matches!(settings.validate(), Err(BcdError::Configuration(_))));
    }

    #[test]
    fn test_zero_linmax_rejected() {
        let settings = BcdSettings::default().with_linmax(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_builder_chain() {
        let settings = BcdSettings::quiet()
            .with_itermax(50)
            .with_dual_method(DualMethod::Pdhg)
            .with_primal_heuristic(HeuristicMethod::Sequential)
            .with_time_limit(1.5);

        assert!(!settings.verbose);
        assert_eq!(settings.itermax, 50);
        assert_eq!(settings.time_limit_ms, Some(1500));
        assert_eq!(
            settings.modes(),
            BcdModes {
                dual_method: DualMethod::Pdhg,
                primal_heuristic: Some(HeuristicMethod::Sequential),
                feasible_provider: HeuristicMethod::Iterate,
            }
        );
    }
}
