//! Augmented-Lagrangian block-coordinate descent for block-angular 0-1
//! programs.
//!
//! The solver targets problems of the form
//!
//! ```text
//! minimize    Σ_idx c_idx' x_idx
//! subject to  Σ_idx A_idx x_idx <= b     (linking rows)
//!             x_idx ∈ X_idx ⊆ {0,1}^n_idx
//! ```
//!
//! where each block-local region `X_idx` is only reachable through a
//! [`BlockOracle`] returning the cheapest 0-1 assignment for a linear cost.
//! The linking rows are moved into an augmented-Lagrangian penalty whose
//! weight grows geometrically; each outer iteration runs Gauss-Seidel sweeps
//! of linearized-proximal block best responses until the iterate stops
//! moving, then updates the multiplier.
//!
//! The result carries the final iterate, a terminal status, the dual/primal
//! bound histories with the relative gap, and the best linking-feasible
//! incumbent found by the configured heuristics.
//!
//! # Example
//!
//! ```ignore
//! use bcd_core::{solve, BcdSettings, BlockProblem, LinkingBlock, UnconstrainedOracle};
//!
//! // x0 + x1 <= 1, each block worth -1 on its own
//! let prob = BlockProblem::new(
//!     vec![
//!         LinkingBlock::from_dense(&[vec![1.0]], vec![-1.0])?,
//!         LinkingBlock::from_dense(&[vec![1.0]], vec![-1.0])?,
//!     ],
//!     vec![1.0],
//! )?;
//!
//! let sol = solve(&prob, &mut UnconstrainedOracle, &BcdSettings::default())?;
//! println!("{:?}: {:?}", sol.status, sol.x);
//! ```

#![allow(clippy::too_many_arguments)]

pub mod bcd;
pub mod error;
pub mod heuristic;
pub mod linalg;
pub mod oracle;
pub mod problem;
pub mod settings;
pub mod state;

pub use bcd::{
    BcdSolution, BcdSolver, BcdStatus, ChannelObserver, FnObserver, IterationObserver,
    IterationRecord, LogObserver, RecordingObserver,
};
pub use error::{BcdError, BcdResult, OracleError};
pub use heuristic::{Incumbent, IterateHeuristic, PrimalHeuristic, SequentialHeuristic};
pub use oracle::{BlockOracle, FnOracle, KnapsackOracle, UnconstrainedOracle};
pub use problem::{BlockProblem, LinkingBlock};
pub use settings::{BcdModes, BcdSettings, DualMethod, HeuristicMethod, LinkingNorm, ProximalRule};
pub use state::{BcdParams, BoundHistory};

/// Solve with the default [`LogObserver`].
pub fn solve<O: BlockOracle + ?Sized>(
    prob: &BlockProblem,
    oracle: &mut O,
    settings: &BcdSettings,
) -> BcdResult<BcdSolution> {
    solve_with_observer(prob, oracle, settings, &mut LogObserver::new())
}

/// Solve, reporting every outer iteration to `observer`.
pub fn solve_with_observer<O, Obs>(
    prob: &BlockProblem,
    oracle: &mut O,
    settings: &BcdSettings,
    observer: &mut Obs,
) -> BcdResult<BcdSolution>
where
    O: BlockOracle + ?Sized,
    Obs: IterationObserver + ?Sized,
{
    BcdSolver::new(prob, settings)?.solve(oracle, observer)
}
