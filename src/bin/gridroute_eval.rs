//! Evaluator CLI: independently re-scores a `.lg` route file against the
//! same grid map, capacities, and cost table the router used.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use gridroute::config::Config;
use gridroute::cost;
use gridroute::evaluator::{evaluate, render_table};
use gridroute::parse::{parse_cst, parse_gcl, parse_gmp, parse_lg};

/// Re-score a routed `.lg` file and print per-net and total cost.
#[derive(Debug, Parser)]
#[command(name = "gridroute-eval", version)]
struct Args {
    /// Grid map file (.gmp).
    gmp: PathBuf,
    /// Edge capacity file (.gcl).
    gcl: PathBuf,
    /// Cost table file (.cst).
    cst: PathBuf,
    /// Route file to evaluate (.lg).
    lg: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut grid = parse_gmp(&args.gmp).with_context(|| format!("loading grid map {}", args.gmp.display()))?;
    parse_gcl(&args.gcl, &mut grid).with_context(|| format!("loading capacities {}", args.gcl.display()))?;
    let weights = parse_cst(&args.cst, &mut grid).with_context(|| format!("loading cost table {}", args.cst.display()))?;

    let mut config = Config::new(weights, grid.gcell_size.x, grid.gcell_size.y);
    cost::finalize(&mut grid, &mut config);

    let events = parse_lg(&args.lg).with_context(|| format!("loading route file {}", args.lg.display()))?;
    let report = evaluate(&mut grid, &config, &events);

    println!("{}", render_table(&report));
    Ok(())
}
