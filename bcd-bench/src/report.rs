//! JSON run summaries.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use bcd_core::{BcdSolution, BcdStatus};
use serde::Serialize;

/// Summary of one benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub num_blocks: usize,
    pub num_items: usize,
    pub seed: u64,
    pub status: String,
    pub converged: bool,
    pub outer_iters: usize,
    pub inner_iters: usize,
    pub obj_val: f64,
    pub pfeas: f64,
    pub final_rho: f64,
    pub best_lower_bound: Option<f64>,
    pub incumbent_obj: Option<f64>,
    pub gap: Option<f64>,
    pub stagnant_iters: usize,
    pub solve_time_ms: u64,
    pub lb_history: Vec<f64>,
    pub ub_history: Vec<f64>,
}

impl RunReport {
    pub fn new(num_blocks: usize, num_items: usize, seed: u64, sol: &BcdSolution) -> Self {
        Self {
            num_blocks,
            num_items,
            seed,
            status: status_name(sol.status).to_string(),
            converged: sol.status.is_converged(),
            outer_iters: sol.outer_iters,
            inner_iters: sol.inner_iters,
            obj_val: sol.obj_val,
            pfeas: sol.pfeas,
            final_rho: sol.rho,
            best_lower_bound: sol.lb_history.iter().copied().reduce(f64::max),
            incumbent_obj: sol.incumbent.as_ref().map(|inc| inc.obj),
            gap: sol.gap,
            stagnant_iters: sol.stagnant_iters,
            solve_time_ms: sol.solve_time_ms,
            lb_history: sol.lb_history.clone(),
            ub_history: sol.ub_history.clone(),
        }
    }

    /// Save to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file {}", path.as_ref().display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write JSON to {}", path.as_ref().display()))?;
        Ok(())
    }
}

fn status_name(status: BcdStatus) -> &'static str {
    match status {
        BcdStatus::Converged => "converged",
        BcdStatus::IterationLimit => "iteration_limit",
        BcdStatus::TimeLimit => "time_limit",
    }
}
