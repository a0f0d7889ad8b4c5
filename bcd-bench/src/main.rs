//! Benchmark CLI for the BCD solver on seeded knapsack instances.

mod instance;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bcd_core::{solve, BcdSettings, DualMethod, HeuristicMethod};
use clap::{Parser, ValueEnum};

use instance::InstanceSpec;
use report::RunReport;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DualChoice {
    Lagrangian,
    Pdhg,
}

impl From<DualChoice> for DualMethod {
    fn from(choice: DualChoice) -> Self {
        match choice {
            DualChoice::Lagrangian => DualMethod::Lagrangian,
            DualChoice::Pdhg => DualMethod::Pdhg,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HeuristicChoice {
    None,
    Iterate,
    Sequential,
}

impl HeuristicChoice {
    fn method(self) -> Option<HeuristicMethod> {
        match self {
            HeuristicChoice::None => None,
            HeuristicChoice::Iterate => Some(HeuristicMethod::Iterate),
            HeuristicChoice::Sequential => Some(HeuristicMethod::Sequential),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "bcd-bench", about = "Run BCD on a seeded block-angular knapsack instance")]
struct Args {
    /// Number of blocks
    #[arg(long, default_value_t = 8)]
    blocks: usize,

    /// Number of items (linking rows)
    #[arg(long, default_value_t = 40)]
    items: usize,

    /// Instance seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Outer iteration cap
    #[arg(long, default_value_t = 200)]
    itermax: usize,

    /// Inner sweep cap
    #[arg(long, default_value_t = 10)]
    linmax: usize,

    /// Seed penalty weight
    #[arg(long, default_value_t = 1e-2)]
    rho: f64,

    /// Penalty growth factor
    #[arg(long, default_value_t = 2.0)]
    sigma: f64,

    /// Multiplier update rule
    #[arg(long, value_enum, default_value_t = DualChoice::Lagrangian)]
    dual: DualChoice,

    /// Per-iteration primal heuristic
    #[arg(long, value_enum, default_value_t = HeuristicChoice::Sequential)]
    heuristic: HeuristicChoice,

    /// Write a JSON run summary to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut inst = instance::generate(InstanceSpec {
        num_blocks: args.blocks,
        num_items: args.items,
        seed: args.seed,
    })
    .context("Failed to generate instance")?;

    let mut settings = BcdSettings::default()
        .with_itermax(args.itermax)
        .with_linmax(args.linmax)
        .with_rho(args.rho)
        .with_sigma(args.sigma)
        .with_dual_method(args.dual.into());
    settings.primal_heuristic = args.heuristic.method();

    let sol = solve(&inst.problem, &mut inst.oracle, &settings).context("Solve failed")?;

    println!("\n{}", "=".repeat(60));
    println!(
        "{} blocks x {} items (seed {})",
        args.blocks, args.items, args.seed
    );
    println!("Status:      {:?}", sol.status);
    println!("Iterations:  {} outer, {} inner", sol.outer_iters, sol.inner_iters);
    println!("c'x:         {:+.6e}", sol.obj_val);
    println!("|Ax - b|:    {:.3e}", sol.pfeas);
    match &sol.incumbent {
        Some(inc) => println!("Incumbent:   {:+.6e}", inc.obj),
        None => println!("Incumbent:   none"),
    }
    if let Some(gap) = sol.gap {
        println!("Gap:         {:.2}%", gap * 100.0);
    }
    println!("Time:        {:.3}s", sol.solve_time_ms as f64 / 1000.0);
    println!("{}", "=".repeat(60));

    if let Some(path) = &args.json {
        RunReport::new(args.blocks, args.items, args.seed, &sol).save_json(path)?;
        log::info!("wrote run summary to {}", path.display());
    }

    Ok(())
}
