//! Augmented-Lagrangian block-coordinate descent.
//!
//! Each outer iteration runs a Gauss-Seidel sweep of linearized-proximal
//! block best responses, measures feasibility and the augmented-Lagrangian
//! value, then grows the penalty and updates the linking multiplier.

mod diagnostics;
mod dual;
mod iterate;
mod metrics;
mod solve;
mod step;
mod sweep;

pub use diagnostics::{
    log_banner, log_header, ChannelObserver, FnObserver, IterationObserver, IterationRecord,
    LogObserver, RecordingObserver,
};
pub use dual::DualState;
pub use iterate::Iterate;
pub use metrics::{augmented_lagrangian, OuterMetrics};
pub use solve::{BcdSolution, BcdSolver, BcdStatus};
pub use step::{block_step, linearized_cost, BlockStep, StepParams};
pub use sweep::{sweep, SweepResult};
