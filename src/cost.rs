//! Per-cell cost precomputation and the layer-aware transition cost table.

use std::cmp::Ordering;

use crate::config::Config;
use crate::geometry::{CellId, FromDirection, Grid};

/// One of the two orthogonal metal layers. M1 is vertical-only, M2 is
/// horizontal-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    M1,
    M2,
}

/// The four geographic move directions a relaxation step can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Bottom,
    Right,
    Top,
}

impl MoveDirection {
    fn is_horizontal(self) -> bool {
        matches!(self, MoveDirection::Left | MoveDirection::Right)
    }
}

/// Finalize per-cell `gammaM1`, `gammaM2`, and `viaStep`, and compute
/// `maxCellCost`/`medianCellCost` over the *non-zero* observed per-cell
/// costs.
pub fn finalize(grid: &mut Grid, config: &mut Config) {
    let gamma = config.weights.gamma;
    let mut nonzero = Vec::with_capacity(grid.cells.len() * 2);

    for cell in &grid.cells {
        if cell.cost_m1 != 0.0 {
            nonzero.push(cell.cost_m1);
        }
        if cell.cost_m2 != 0.0 {
            nonzero.push(cell.cost_m2);
        }
    }

    let max_cell_cost = nonzero.iter().copied().fold(0.0_f64, f64::max);
    let median_cell_cost = median(&mut nonzero);
    config.finalize_costs(max_cell_cost, median_cell_cost);

    for cell in &mut grid.cells {
        cell.gamma_m1 = gamma * cell.cost_m1;
        cell.gamma_m2 = gamma * cell.cost_m2;
        cell.via_step = config.delta_via_cost + (cell.gamma_m1 + cell.gamma_m2) / 2.0;
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mid = values.len() / 2;
    values.select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    values[mid]
}

/// Result of evaluating one relaxation-step transition: the cost delta to
/// add to `u`'s gScore, and whether the crossed edge was already
/// saturated (for the search-time overflow predictor).
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub delta_cost: f64,
    pub overflow: bool,
}

/// Compute the cost of moving from `u` into neighbor `v` along
/// `move_dir`, given the direction `u` itself was entered from
/// (`from_direction_at_u`). `entering_target` applies the
/// target-adjacency rule: the entering-cell charge at `v` becomes
/// `viaStep(v)` because the net must land on M1.
pub fn transition_cost(
    grid: &Grid,
    config: &Config,
    u: CellId,
    v: CellId,
    move_dir: MoveDirection,
    from_direction_at_u: FromDirection,
    entering_target: bool,
) -> Transition {
    let cell_u = &grid.cells[u];
    let cell_v = &grid.cells[v];

    let is_horizontal_move = move_dir.is_horizontal();
    // `u` is currently "on" M2 if it was itself arrived at via a
    // horizontal step; otherwise (Origin/Bottom/Top) it is on M1.
    let u_on_m2 = matches!(from_direction_at_u, FromDirection::Left | FromDirection::Right);
    let via_needed = is_horizontal_move != u_on_m2;

    let edge_charge = if is_horizontal_move { config.alpha_dx } else { config.alpha_dy };

    let entering_charge = if entering_target {
        cell_v.via_step
    } else if is_horizontal_move {
        cell_v.gamma_m2
    } else {
        cell_v.gamma_m1
    };

    let mut delta_cost = edge_charge + entering_charge;

    if via_needed {
        let prev_gamma_u = if u_on_m2 { cell_u.gamma_m2 } else { cell_u.gamma_m1 };
        delta_cost += cell_u.via_step - prev_gamma_u;
    }

    // Edge-capacity bookkeeping: left-ward consults u.left, right-ward
    // consults v.left (the edge between u and v is v's left edge);
    // bottom-ward consults u.bottom, top-ward consults v.bottom.
    let overflow = match move_dir {
        MoveDirection::Left => cell_u.left_edge_full(),
        MoveDirection::Right => cell_v.left_edge_full(),
        MoveDirection::Bottom => cell_u.bottom_edge_full(),
        MoveDirection::Top => cell_v.bottom_edge_full(),
    };
    if overflow {
        delta_cost += config.beta_half_max;
    }

    Transition { delta_cost, overflow }
}

/// Which layer a move direction travels on.
pub fn layer_for_move(move_dir: MoveDirection) -> Layer {
    if move_dir.is_horizontal() {
        Layer::M2
    } else {
        Layer::M1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_length() {
        let mut v = vec![3.0, 1.0, 2.0];
        assert_eq!(median(&mut v), 2.0);
    }

    #[test]
    fn median_ignores_nothing_but_caller_filters_zeros() {
        let mut v = vec![5.0];
        assert_eq!(median(&mut v), 5.0);
    }

    #[test]
    fn median_of_empty_is_zero() {
        let mut v: Vec<f64> = vec![];
        assert_eq!(median(&mut v), 0.0);
    }
}
