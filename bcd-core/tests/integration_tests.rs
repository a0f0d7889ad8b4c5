//! End-to-end tests for the BCD solver.
//!
//! These run full solves on small hand-built instances and check the
//! terminal state, the bound bookkeeping and error propagation.

use std::sync::mpsc;

use bcd_core::{
    solve_with_observer, BcdError, BcdParams, BcdSettings, BcdStatus, BlockProblem, ChannelObserver,
    DualMethod, FnOracle, HeuristicMethod, LinkingBlock, LinkingNorm, OracleError,
    RecordingObserver, UnconstrainedOracle,
};

/// One linking row x0 + x1 <= 1, both blocks worth -1.
fn two_block_toy() -> BlockProblem {
    BlockProblem::new(
        vec![
            LinkingBlock::from_dense(&[vec![1.0]], vec![-1.0]).unwrap(),
            LinkingBlock::from_dense(&[vec![1.0]], vec![-1.0]).unwrap(),
        ],
        vec![1.0],
    )
    .expect("toy problem is well formed")
}

#[test]
fn test_toy_becomes_feasible_quickly() {
    // Seed [1], [1] violates the row by 1.
    let prob = two_block_toy();
    let settings = BcdSettings {
        rho_init: 1.0,
        linking_norm: LinkingNorm::Fixed(1.0),
        verbose: false,
        ..Default::default()
    };
    let mut obs = RecordingObserver::new();

    let sol = solve_with_observer(&prob, &mut UnconstrainedOracle, &settings, &mut obs)
        .expect("solve failed");

    assert_eq!(sol.status, BcdStatus::Converged);
    assert!(sol.outer_iters <= 5);
    assert_eq!(sol.pfeas, 0.0);
    assert_eq!(sol.x, vec![vec![0.0], vec![1.0]]);
    assert!((sol.obj_val + 1.0).abs() < 1e-12);

    // first record already has a block switched off
    assert_eq!(obs.records[0].pfeas, 0.0);

    // final iterate is feasible, so it becomes the incumbent
    let inc = sol.incumbent.expect("feasible iterate should be kept");
    assert_eq!(inc.x, sol.x);
    assert_eq!(sol.ub_history, vec![-1.0]);
    assert!(sol.gap.expect("gap defined once both bounds exist").abs() < 1e-9);
}

#[test]
fn test_toy_with_default_continuation() {
    let prob = two_block_toy();
    let settings = BcdSettings::quiet();
    let mut obs = RecordingObserver::new();

    let sol = solve_with_observer(&prob, &mut UnconstrainedOracle, &settings, &mut obs)
        .expect("solve failed");

    // rho doubles from 0.01 until the penalty outweighs the block gain
    assert_eq!(sol.status, BcdStatus::Converged);
    assert_eq!(sol.outer_iters, 8);
    assert!((sol.rho - 1.28).abs() < 1e-12);
    assert_eq!(sol.x, vec![vec![0.0], vec![1.0]]);

    assert_eq!(obs.records.len(), sol.outer_iters);
    assert_eq!(sol.lb_history.len(), sol.outer_iters);
    for pair in obs.records.windows(2) {
        assert!(pair[1].rho >= pair[0].rho);
    }
    for rec in &obs.records[..7] {
        assert!((rec.pfeas - 1.0).abs() < 1e-12);
        assert_eq!(rec.inner_iters, 1);
    }
    assert!((obs.records[0].lobj + 1.985).abs() < 1e-9);
    assert!(sol.lambda.iter().all(|&l| l >= 0.0));
}

#[test]
fn test_toy_with_pdhg_dual() {
    let prob = two_block_toy();
    let settings = BcdSettings::quiet().with_dual_method(DualMethod::Pdhg);
    let sol = solve_with_observer(
        &prob,
        &mut UnconstrainedOracle,
        &settings,
        &mut RecordingObserver::new(),
    )
    .expect("solve failed");

    assert!(sol.status.is_converged());
    assert_eq!(sol.pfeas, 0.0);
}

#[test]
fn test_iteration_limit_is_best_effort() {
    let prob = two_block_toy();
    let settings = BcdSettings::quiet().with_itermax(3);
    let sol = solve_with_observer(
        &prob,
        &mut UnconstrainedOracle,
        &settings,
        &mut RecordingObserver::new(),
    )
    .expect("iteration limit is not an error");

    assert_eq!(sol.status, BcdStatus::IterationLimit);
    assert!(sol.status.is_best_effort());
    assert_eq!(sol.outer_iters, 3);
    // grown once per non-terminal iteration
    assert!((sol.rho - 0.08).abs() < 1e-12);
    assert!(sol.incumbent.is_none());
    assert_eq!(sol.gap, None);
}

#[test]
fn test_time_limit() {
    let prob = two_block_toy();
    let settings = BcdSettings::quiet().with_time_limit(0.0);
    let sol = solve_with_observer(
        &prob,
        &mut UnconstrainedOracle,
        &settings,
        &mut RecordingObserver::new(),
    )
    .expect("solve failed");

    assert_eq!(sol.status, BcdStatus::TimeLimit);
    assert_eq!(sol.outer_iters, 1);
    assert_eq!(sol.rho, 0.01);
}

#[test]
fn test_oracle_failure_is_surfaced() {
    let prob = two_block_toy();
    let mut oracle = FnOracle::new(|block: usize, cost: &[f64]| {
        if block == 1 {
            Err(OracleError::NoAssignment("block 1 has no routes".to_string()))
        } else {
            Ok(vec![0.0; cost.len()])
        }
    });

    let res = solve_with_observer(
        &prob,
        &mut oracle,
        &BcdSettings::quiet(),
        &mut RecordingObserver::new(),
    );
    match res {
        Err(BcdError::Oracle { block, source }) => {
            assert_eq!(block, 1);
            assert!(matches!(source, OracleError::NoAssignment(_)));
        }
        other => panic!("expected oracle failure, got {:?}", other.map(|s| s.status)),
    }
}

#[test]
fn test_configuration_errors() {
    let prob = two_block_toy();
    for settings in [
        BcdSettings::quiet().with_rho(0.0),
        BcdSettings::quiet().with_rho(-1.0),
        BcdSettings::quiet().with_linking_norm(LinkingNorm::Fixed(0.0)),
    ] {
        let res = solve_with_observer(
            &prob,
            &mut UnconstrainedOracle,
            &settings,
            &mut RecordingObserver::new(),
        );
        assert!(matches!(res, Err(BcdError::Configuration(_))));
    }

    // blocks and b disagree on the number of linking rows
    let mismatched = BlockProblem::new(
        vec![LinkingBlock::from_dense(&[vec![1.0], vec![1.0]], vec![-1.0]).unwrap()],
        vec![1.0],
    );
    assert!(matches!(mismatched, Err(BcdError::Configuration(_))));

    // dense rows of different lengths
    let ragged = LinkingBlock::from_dense(&[vec![1.0], vec![1.0, 2.0]], vec![-1.0]);
    assert!(matches!(ragged, Err(BcdError::Configuration(_))));

    // gap before any bound
    let mut params = BcdParams::new(&BcdSettings::default());
    assert!(matches!(params.update_gap(), Err(BcdError::Configuration(_))));
}

#[test]
fn test_channel_observer_receives_every_iteration() {
    let prob = two_block_toy();
    let (tx, rx) = mpsc::channel();
    let mut obs = ChannelObserver::new(tx);

    let sol = solve_with_observer(&prob, &mut UnconstrainedOracle, &BcdSettings::quiet(), &mut obs)
        .expect("solve failed");

    let ks: Vec<usize> = rx.try_iter().map(|rec| rec.k).collect();
    assert_eq!(ks, (0..sol.outer_iters).collect::<Vec<_>>());
}

#[test]
fn test_per_iteration_heuristic_feeds_upper_bounds() {
    let prob = two_block_toy();
    let settings = BcdSettings::quiet().with_primal_heuristic(HeuristicMethod::Sequential);
    let mut obs = RecordingObserver::new();

    let sol = solve_with_observer(&prob, &mut UnconstrainedOracle, &settings, &mut obs)
        .expect("solve failed");

    // one incumbent per outer iteration
    assert_eq!(sol.ub_history.len(), sol.outer_iters);
    assert!(obs.records.iter().all(|rec| rec.gap.is_some()));

    let inc = sol.incumbent.expect("sequential heuristic always fits this row");
    assert!(prob.is_linking_feasible(&inc.x, 0.0));
    assert!((inc.obj + 1.0).abs() < 1e-12);
}
