//! Orders nets, drives the single-net router, commits edge usage, and
//! falls back to the L-pattern router under time pressure.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{Config, FALLBACK_TIME_BUDGET, SEQUENCER_SEED};
use crate::error::{Result, RouterError};
use crate::geometry::Grid;
use crate::router::{fast_route, Route, SingleNetRouter};

/// Run every net through the router in a seeded-random permutation order,
/// committing each success into `grid`'s edge counters before moving to
/// the next net. Returns the committed routes sorted by `idx` ascending.
pub fn solve(grid: &mut Grid, config: &Config) -> Result<Vec<Route>> {
    solve_with_budget(grid, config, FALLBACK_TIME_BUDGET)
}

/// Same as [`solve`], but with an explicit fallback time budget — exposed
/// so tests can force the L-pattern fallback deterministically.
pub fn solve_with_budget(
    grid: &mut Grid,
    config: &Config,
    fallback_budget: std::time::Duration,
) -> Result<Vec<Route>> {
    let mut indices: Vec<i32> = grid.chip1.bumps.iter().map(|b| b.idx).collect();

    let mut rng = StdRng::seed_from_u64(SEQUENCER_SEED);
    indices.shuffle(&mut rng);

    let mut router = SingleNetRouter::new(grid.cells.len());
    let mut routes = Vec::with_capacity(indices.len());
    let start = Instant::now();

    for idx in indices {
        let source = grid
            .chip1
            .bumps
            .iter()
            .find(|b| b.idx == idx)
            .ok_or_else(|| RouterError::Topology(format!("net {idx} missing from chip1 bumps")))?
            .gcell;
        let target = grid
            .chip2
            .bumps
            .iter()
            .find(|b| b.idx == idx)
            .ok_or_else(|| RouterError::Topology(format!("net {idx} missing from chip2 bumps")))?
            .gcell;

        let route = if start.elapsed() >= fallback_budget {
            log::warn!("time budget exceeded, routing net {idx} with L-pattern fallback");
            fast_route(grid, config, source, target, idx)
                .ok_or(RouterError::SearchFailed { net_idx: idx })?
        } else {
            match router.route_dijkstra(grid, config, source, target, idx) {
                Some(route) => route,
                None => {
                    log::error!("net {idx}: no route found");
                    return Err(RouterError::SearchFailed { net_idx: idx });
                }
            }
        };

        routes.push(route);
    }

    routes.sort_by_key(|r| r.idx);
    Ok(routes)
}
