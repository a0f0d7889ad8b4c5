//! Per-iteration records and the observers that consume them.

use std::fmt;
use std::sync::mpsc::Sender;

use super::solve::{BcdSolution, BcdStatus};
use crate::settings::BcdSettings;

const COLUMNS: [(&str, usize); 10] = [
    ("k", 3),
    ("t", 7),
    ("c'x", 9),
    ("lobj", 9),
    ("|Ax - b|", 10),
    ("error", 10),
    ("rho", 10),
    ("tau", 9),
    ("iter", 4),
    ("gap", 9),
];

/// One outer iteration, as reported to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// Outer iteration index.
    pub k: usize,

    /// Wall time since the solve started, in seconds.
    pub elapsed: f64,

    pub cx: f64,
    pub lobj: f64,

    /// Primal feasibility residual.
    pub pfeas: f64,

    /// Fixed-point residual.
    pub eps_fp: f64,

    pub rho: f64,
    pub tau: f64,

    /// Inner passes executed in this outer iteration.
    pub inner_iters: usize,

    /// Relative gap, once both bound histories are non-empty.
    pub gap: Option<f64>,
}

impl fmt::Display for IterationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03} {:.1e} {:+.2e} {:+.2e} {:+.3e} {:+.3e} {:+.3e} {:.2e} {:04}",
            self.k,
            self.elapsed,
            self.cx,
            self.lobj,
            self.pfeas,
            self.eps_fp,
            self.rho,
            self.tau,
            self.inner_iters,
        )?;
        match self.gap {
            Some(gap) => write!(f, " {:+.2e}", gap),
            None => write!(f, " {:^9}", "-"),
        }
    }
}

/// Column header line for the iteration log.
pub fn log_header() -> String {
    COLUMNS
        .iter()
        .map(|(name, width)| format!("{:^width$}", name, width = *width))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Banner printed once per solve: rule, title, rule, header, rule.
pub fn log_banner() -> Vec<String> {
    let header = log_header();
    let rule = "*".repeat(header.len());
    let title = format!("{:^width$}", "BCD for block-angular 0-1 programs", width = header.len());
    vec![rule.clone(), title, rule.clone(), header, rule]
}

/// Consumer of solver progress.
pub trait IterationObserver {
    fn on_start(&mut self, _settings: &BcdSettings) {}

    /// Called once per outer iteration, after the metrics are evaluated.
    fn on_iteration(&mut self, record: &IterationRecord);

    fn on_finish(&mut self, _solution: &BcdSolution) {}
}

impl<T: IterationObserver + ?Sized> IterationObserver for &mut T {
    fn on_start(&mut self, settings: &BcdSettings) {
        (**self).on_start(settings)
    }

    fn on_iteration(&mut self, record: &IterationRecord) {
        (**self).on_iteration(record)
    }

    fn on_finish(&mut self, solution: &BcdSolution) {
        (**self).on_finish(solution)
    }
}

/// Writes the iteration log through the `log` facade.
#[derive(Debug, Clone)]
pub struct LogObserver {
    verbose: bool,
    log_freq: usize,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self {
            verbose: true,
            log_freq: 1,
        }
    }
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IterationObserver for LogObserver {
    fn on_start(&mut self, settings: &BcdSettings) {
        self.verbose = settings.verbose;
        self.log_freq = settings.log_freq.max(1);
        if !self.verbose {
            return;
        }
        for line in log_banner() {
            log::info!("{}", line);
        }
    }

    fn on_iteration(&mut self, record: &IterationRecord) {
        if self.verbose && record.k % self.log_freq == 0 {
            log::info!("{}", record);
        }
    }

    fn on_finish(&mut self, solution: &BcdSolution) {
        if !self.verbose {
            return;
        }
        log::info!(
            "{:?} after {} outer / {} inner iterations | c'x: {:+.6e} | |Ax - b|: {:.3e} | Time: {:.1}s",
            solution.status,
            solution.outer_iters,
            solution.inner_iters,
            solution.obj_val,
            solution.pfeas,
            solution.solve_time_ms as f64 / 1000.0,
        );
        if let Some(gap) = solution.gap {
            log::info!("Gap: {:.2}%", gap * 100.0);
        }
        if solution.status.is_best_effort() && solution.stagnant_iters > 0 {
            log::warn!(
                "dual bound has not improved over the last {} iterations",
                solution.stagnant_iters
            );
        }
    }
}

/// Collects every record; keeps the terminal status.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub records: Vec<IterationRecord>,
    pub status: Option<BcdStatus>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IterationObserver for RecordingObserver {
    fn on_start(&mut self, _settings: &BcdSettings) {
        self.records.clear();
        self.status = None;
    }

    fn on_iteration(&mut self, record: &IterationRecord) {
        self.records.push(record.clone());
    }

    fn on_finish(&mut self, solution: &BcdSolution) {
        self.status = Some(solution.status);
    }
}

/// Calls a closure for every record.
pub struct FnObserver<F> {
    f: F,
}

impl<F: FnMut(&IterationRecord)> FnObserver<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut(&IterationRecord)> IterationObserver for FnObserver<F> {
    fn on_iteration(&mut self, record: &IterationRecord) {
        (self.f)(record)
    }
}

/// Forwards records over an `mpsc` channel.
///
/// A disconnected receiver is ignored; the solve continues.
#[derive(Debug)]
pub struct ChannelObserver {
    tx: Sender<IterationRecord>,
    disconnected: bool,
}

impl ChannelObserver {
    pub fn new(tx: Sender<IterationRecord>) -> Self {
        Self {
            tx,
            disconnected: false,
        }
    }
}

impl IterationObserver for ChannelObserver {
    fn on_iteration(&mut self, record: &IterationRecord) {
        if self.disconnected {
            return;
        }
        if self.tx.send(record.clone()).is_err() {
            log::debug!("iteration channel closed at k = {}", record.k);
            self.disconnected = true;
        }
    }
}
