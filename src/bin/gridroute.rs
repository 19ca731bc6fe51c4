//! Router CLI: reads a grid map, capacities, and cost table, and writes
//! a routed `.lg` file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use gridroute::config::Config;
use gridroute::cost;
use gridroute::parse::{parse_cst, parse_gcl, parse_gmp};
use gridroute::sequencer;
use gridroute::writer::write_routes;

/// Route every bump-to-bump net between two chips on a GCell grid.
#[derive(Debug, Parser)]
#[command(name = "gridroute", version)]
struct Args {
    /// Grid map file (.gmp): routing area, GCell pitch, chip placement, bumps.
    gmp: PathBuf,
    /// Edge capacity file (.gcl).
    gcl: PathBuf,
    /// Cost table file (.cst).
    cst: PathBuf,
    /// Output route file (.lg).
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut grid = parse_gmp(&args.gmp).with_context(|| format!("loading grid map {}", args.gmp.display()))?;
    parse_gcl(&args.gcl, &mut grid).with_context(|| format!("loading capacities {}", args.gcl.display()))?;
    let weights = parse_cst(&args.cst, &mut grid).with_context(|| format!("loading cost table {}", args.cst.display()))?;

    let mut config = Config::new(weights, grid.gcell_size.x, grid.gcell_size.y);
    cost::finalize(&mut grid, &mut config);

    log::info!("routing {} nets on a {}x{} grid", grid.chip1.bumps.len(), grid.cols, grid.rows);
    let routes = sequencer::solve(&mut grid, &config).context("routing failed")?;

    write_routes(&args.output, &grid, &routes).with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("wrote {} routes to {}", routes.len(), args.output.display());

    Ok(())
}
