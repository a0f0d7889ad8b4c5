//! Outer continuation loop.

use std::time::Instant;

use super::diagnostics::{IterationObserver, IterationRecord};
use super::metrics::OuterMetrics;
use super::step::StepParams;
use super::sweep::sweep;
use super::{DualState, Iterate};
use crate::error::BcdResult;
use crate::heuristic::{run_heuristic, Incumbent, IncumbentTracker};
use crate::oracle::BlockOracle;
use crate::problem::BlockProblem;
use crate::settings::BcdSettings;
use crate::state::BcdParams;

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcdStatus {
    /// Linking rows satisfied and the sweep at a fixed point.
    Converged,

    /// `itermax` outer iterations without convergence.
    IterationLimit,

    /// Time limit reached.
    TimeLimit,
}

impl BcdStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, BcdStatus::Converged)
    }

    /// Returns true if the iterate is not a proven fixed point.
    pub fn is_best_effort(&self) -> bool {
        !self.is_converged()
    }
}

/// Result of a solve.
#[derive(Debug, Clone)]
pub struct BcdSolution {
    pub status: BcdStatus,

    /// Final iterate, one 0-1 vector per block.
    pub x: Vec<Vec<f64>>,

    /// `Σ c_idx' x_idx` at the final iterate.
    pub obj_val: f64,

    /// Augmented-Lagrangian value of the last outer iteration.
    pub lobj: f64,

    /// `||max(Σ A x - b, 0)||` at the final iterate.
    pub pfeas: f64,

    /// Fixed-point residual of the last sweep.
    pub eps_fp: f64,

    /// Final penalty weight.
    pub rho: f64,

    /// Final linking multiplier.
    pub lambda: Vec<f64>,

    /// Outer iterations executed.
    pub outer_iters: usize,

    /// Inner passes executed, summed over outer iterations.
    pub inner_iters: usize,

    /// Dual bounds, one per outer iteration.
    pub lb_history: Vec<f64>,

    /// Primal bounds from heuristics.
    pub ub_history: Vec<f64>,

    /// Last relative gap, if both histories are non-empty.
    pub gap: Option<f64>,

    /// Best linking-feasible assignment found.
    pub incumbent: Option<Incumbent>,

    /// Trailing outer iterations without dual-bound improvement.
    pub stagnant_iters: usize,

    pub solve_time_ms: u64,
}

/// Augmented-Lagrangian BCD driver.
///
/// Owns the iterate, the multiplier/penalty state and the tuning store for a
/// single solve.
pub struct BcdSolver<'a> {
    prob: &'a BlockProblem,
    settings: BcdSettings,
    params: BcdParams,
    iterate: Iterate,
    dual: DualState,
    incumbent: IncumbentTracker,

    /// Proximal step for undamped `kappa`.
    tau_base: f64,

    inner_total: usize,
    start_time: Option<Instant>,
}

impl<'a> BcdSolver<'a> {
    /// Validate inputs and set up the all-ones seed.
    pub fn new(prob: &'a BlockProblem, settings: &BcdSettings) -> BcdResult<Self> {
        settings.validate()?;
        prob.validate()?;

        let norm = settings.linking_norm.resolve(prob)?;
        let tau_base = 1.0 / (norm * norm * settings.rho_init);

        Ok(Self {
            prob,
            settings: settings.clone(),
            params: BcdParams::new(settings),
            iterate: Iterate::ones(prob),
            dual: DualState::new(settings.rho_init, prob.num_linking_rows()),
            incumbent: IncumbentTracker::new(),
            tau_base,
            inner_total: 0,
            start_time: None,
        })
    }

    /// Current proximal step.
    pub fn tau(&self) -> f64 {
        self.tau_base * self.params.damping()
    }

    pub fn params(&self) -> &BcdParams {
        &self.params
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    fn time_limit_exceeded(&self) -> bool {
        match self.settings.time_limit_ms {
            Some(limit) => self.elapsed_ms() >= limit,
            None => false,
        }
    }

    /// Run the continuation loop to termination.
    pub fn solve<O, Obs>(mut self, oracle: &mut O, observer: &mut Obs) -> BcdResult<BcdSolution>
    where
        O: BlockOracle + ?Sized,
        Obs: IterationObserver + ?Sized,
    {
        self.start_time = Some(Instant::now());
        observer.on_start(&self.settings);

        let modes = self.params.modes();
        let mut status = BcdStatus::IterationLimit;
        let mut last: Option<OuterMetrics> = None;

        for k in 0..self.params.itermax {
            let tau = self.tau();
            let step = StepParams {
                tau,
                proximal: self.settings.proximal,
                gamma: self.params.gamma,
            };

            let sw = sweep(
                self.prob,
                &mut self.iterate,
                &self.dual,
                &step,
                self.params.linmax,
                self.settings.tol_fixed_point,
                oracle,
            )?;
            self.inner_total += sw.inner_iters;

            let metrics = OuterMetrics::evaluate(self.prob, &self.iterate, &self.dual)?;

            if self.params.update_bound(metrics.lobj) && self.settings.verbose {
                log::warn!(
                    "dual bound stalled at k = {}; kappa -> {:.3e}",
                    k,
                    self.params.kappa()
                );
            }

            if let Some(method) = modes.primal_heuristic {
                if let Some(inc) =
                    run_heuristic(method, self.settings.tol_feas, self.prob, &self.iterate, oracle)?
                {
                    self.record_incumbent(inc);
                }
            }
            let gap = self.refresh_gap()?;

            observer.on_iteration(&IterationRecord {
                k,
                elapsed: self.elapsed_ms() as f64 / 1000.0,
                cx: metrics.cx,
                lobj: metrics.lobj,
                pfeas: metrics.pfeas,
                eps_fp: metrics.eps_fp,
                rho: self.dual.rho,
                tau,
                inner_iters: sw.inner_iters,
                gap,
            });

            if metrics.is_converged(self.settings.tol_feas, self.settings.tol_fixed_point) {
                status = BcdStatus::Converged;
                last = Some(metrics);
                break;
            }
            if self.time_limit_exceeded() {
                status = BcdStatus::TimeLimit;
                last = Some(metrics);
                break;
            }

            self.dual.advance(
                &metrics.residual,
                self.params.sigma,
                modes.dual_method,
                self.params.alpha,
                self.params.beta,
            )?;
            self.params.advance();
            last = Some(metrics);
        }

        if !self.incumbent.has_incumbent() {
            if let Some(inc) = run_heuristic(
                modes.feasible_provider,
                self.settings.tol_feas,
                self.prob,
                &self.iterate,
                oracle,
            )? {
                self.record_incumbent(inc);
                self.refresh_gap()?;
            }
        }

        let metrics = match last {
            Some(m) => m,
            None => OuterMetrics::evaluate(self.prob, &self.iterate, &self.dual)?,
        };
        let solution = self.finalize(status, metrics);
        observer.on_finish(&solution);
        Ok(solution)
    }

    fn record_incumbent(&mut self, inc: Incumbent) {
        self.params.update_incumbent(inc.obj);
        if self.incumbent.update(inc) && self.settings.verbose {
            log::debug!("new incumbent: obj={:.6e}", self.incumbent.obj_val());
        }
    }

    fn refresh_gap(&mut self) -> BcdResult<Option<f64>> {
        let bounds = self.params.bounds();
        if bounds.lower().is_empty() || bounds.upper().is_empty() {
            return Ok(None);
        }
        self.params.update_gap().map(Some)
    }

    fn finalize(self, status: BcdStatus, metrics: OuterMetrics) -> BcdSolution {
        let solve_time_ms = self.elapsed_ms();
        let bounds = self.params.bounds();
        let lb_history = bounds.lower().to_vec();
        let ub_history = bounds.upper().to_vec();
        let stagnant_iters = bounds.trailing_non_improving();
        let gap = self.params.gap();

        BcdSolution {
            status,
            obj_val: self.iterate.total_cost(),
            x: self.iterate.into_blocks(),
            lobj: metrics.lobj,
            pfeas: metrics.pfeas,
            eps_fp: metrics.eps_fp,
            rho: self.dual.rho,
            lambda: self.dual.lambda,
            outer_iters: lb_history.len(),
            inner_iters: self.inner_total,
            lb_history,
            ub_history,
            gap,
            incumbent: self.incumbent.into_best(),
            stagnant_iters,
            solve_time_ms,
        }
    }
}
