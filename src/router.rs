//! Layer-aware weighted shortest-path search between a single net's two
//! bumps, plus the monotone L-pattern fallback used by the Sequencer
//! under time pressure.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::Config;
use crate::cost::{transition_cost, MoveDirection};
use crate::geometry::{CellId, FromDirection, Grid};

/// A committed route: the net index, the ordered cell path from source to
/// target inclusive, and its total cost.
#[derive(Debug, Clone)]
pub struct Route {
    pub idx: i32,
    pub path: Vec<CellId>,
    pub cost: f64,
}

fn opposite(dir: FromDirection) -> FromDirection {
    match dir {
        FromDirection::Left => FromDirection::Right,
        FromDirection::Right => FromDirection::Left,
        FromDirection::Bottom => FromDirection::Top,
        FromDirection::Top => FromDirection::Bottom,
        FromDirection::Origin => FromDirection::Origin,
    }
}

/// The four geographic neighbor directions, in tie-break inspection
/// order: left, bottom, right, top.
const DIRECTIONS: [FromDirection; 4] = [
    FromDirection::Left,
    FromDirection::Bottom,
    FromDirection::Right,
    FromDirection::Top,
];

fn neighbor_in_direction(grid: &Grid, cell: CellId, dir: FromDirection) -> Option<CellId> {
    match dir {
        FromDirection::Left => grid.cells[cell].left,
        FromDirection::Bottom => grid.cells[cell].bottom,
        FromDirection::Right => grid.cells[cell].right,
        FromDirection::Top => grid.cells[cell].top,
        FromDirection::Origin => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    g_score: f64,
    cell: CellId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the smallest gScore first.
        other
            .g_score
            .partial_cmp(&self.g_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Owns the per-search scratch side tables (a flat array per cell id
/// rather than fields mutated on `GCell` itself) and the Dijkstra/
/// L-pattern routers that share them.
pub struct SingleNetRouter {
    g_score: Vec<f64>,
    parent: Vec<Option<CellId>>,
    from_direction: Vec<FromDirection>,
    closed: Vec<bool>,
}

impl SingleNetRouter {
    pub fn new(cell_count: usize) -> Self {
        Self {
            g_score: vec![f64::INFINITY; cell_count],
            parent: vec![None; cell_count],
            from_direction: vec![FromDirection::Origin; cell_count],
            closed: vec![false; cell_count],
        }
    }

    fn reset(&mut self) {
        self.g_score.iter_mut().for_each(|g| *g = f64::INFINITY);
        self.parent.iter_mut().for_each(|p| *p = None);
        self.from_direction.iter_mut().for_each(|d| *d = FromDirection::Origin);
        self.closed.iter_mut().for_each(|c| *c = false);
    }

    /// Dijkstra (h ≡ 0) over the GCell graph using the layer-aware
    /// transition costs from [`crate::cost`]. Mutates only this router's
    /// own scratch tables; committing edge counters into `grid` happens
    /// in [`Self::route_dijkstra`] via [`Self::commit_path`], the single
    /// authoritative mutation of congestion state.
    pub fn route_dijkstra(
        &mut self,
        grid: &mut Grid,
        config: &Config,
        source: CellId,
        target: CellId,
        idx: i32,
    ) -> Option<Route> {
        self.reset();

        self.g_score[source] = grid.cells[source].gamma_m1;
        self.from_direction[source] = FromDirection::Origin;

        let mut open = BinaryHeap::new();
        open.push(HeapEntry { g_score: self.g_score[source], cell: source });

        while let Some(HeapEntry { g_score, cell: u }) = open.pop() {
            if self.closed[u] {
                continue;
            }
            if g_score > self.g_score[u] {
                // Stale entry: a better path to `u` was already found.
                continue;
            }
            self.closed[u] = true;

            if u == target {
                let path = self.reconstruct(source, target)?;
                let cost = self.g_score[target];
                Self::commit_path(grid, &path);
                return Some(Route { idx, path, cost });
            }

            for &dir in &DIRECTIONS {
                if dir == self.from_direction[u] {
                    // Disallow the immediate U-turn back toward the parent.
                    continue;
                }
                let Some(v) = neighbor_in_direction(grid, u, dir) else { continue };
                if self.closed[v] {
                    continue;
                }

                let move_dir = match dir {
                    FromDirection::Left => MoveDirection::Left,
                    FromDirection::Bottom => MoveDirection::Bottom,
                    FromDirection::Right => MoveDirection::Right,
                    FromDirection::Top => MoveDirection::Top,
                    FromDirection::Origin => unreachable!(),
                };

                let transition = transition_cost(
                    grid,
                    config,
                    u,
                    v,
                    move_dir,
                    self.from_direction[u],
                    v == target,
                );
                let tentative = self.g_score[u] + transition.delta_cost;

                if tentative < self.g_score[v] {
                    self.g_score[v] = tentative;
                    self.parent[v] = Some(u);
                    self.from_direction[v] = opposite(dir);
                    open.push(HeapEntry { g_score: tentative, cell: v });
                }
            }
        }

        None
    }

    /// Returns `None` only if the parent chain is broken, which would mean
    /// `target` was closed without ever being relaxed from `source`.
    fn reconstruct(&self, source: CellId, target: CellId) -> Option<Vec<CellId>> {
        let mut path = vec![target];
        let mut current = target;
        while current != source {
            let p = self.parent[current]?;
            path.push(p);
            current = p;
        }
        path.reverse();
        Some(path)
    }

    /// Walk the reconstructed path and increment each crossed edge's
    /// counter exactly once — the single authoritative mutation of
    /// congestion state. The travel direction for each step is recovered
    /// from the cells' own coordinates rather than the search's
    /// `fromDirection` table, which records the opposite (arrival) sense.
    fn commit_path(grid: &mut Grid, path: &[CellId]) {
        for window in path.windows(2) {
            let (u, v) = (window[0], window[1]);
            let (lu, lv) = (grid.cells[u].lower_left, grid.cells[v].lower_left);
            if lv.x > lu.x {
                grid.cells[v].add_route_left();
            } else if lv.x < lu.x {
                grid.cells[u].add_route_left();
            } else if lv.y > lu.y {
                grid.cells[v].add_route_bottom();
            } else if lv.y < lu.y {
                grid.cells[u].add_route_bottom();
            }
        }
    }
}

/// Monotone "L" router: walk horizontally until `x` matches the target,
/// then vertically. Always succeeds when both source and target are
/// inside the grid; used by the Sequencer once the wall-clock budget is
/// exceeded. Returns `None` if the grid's neighbor links don't reach as
/// far as `target`'s column/row, which would mean `target` lies outside
/// the grid this router was built for.
pub fn fast_route(grid: &mut Grid, config: &Config, source: CellId, target: CellId, idx: i32) -> Option<Route> {
    let mut path = vec![source];
    let mut cost = grid.cells[source].gamma_m1;
    let mut current = source;
    let mut prev_from_direction = FromDirection::Origin;

    let src_col = current % grid.cols;
    let tgt_row = target / grid.cols;
    let tgt_col = target % grid.cols;

    let mut col = src_col;
    while col != tgt_col {
        let move_dir = if tgt_col > col { MoveDirection::Right } else { MoveDirection::Left };
        let next = match move_dir {
            MoveDirection::Right => grid.cells[current].right,
            MoveDirection::Left => grid.cells[current].left,
            _ => unreachable!(),
        }?;

        let entering_target = next == target;
        let transition = transition_cost(grid, config, current, next, move_dir, prev_from_direction, entering_target);
        cost += transition.delta_cost;

        match move_dir {
            MoveDirection::Right => grid.cells[next].add_route_left(),
            MoveDirection::Left => grid.cells[current].add_route_left(),
            _ => unreachable!(),
        }

        prev_from_direction = match move_dir {
            MoveDirection::Right => FromDirection::Left,
            MoveDirection::Left => FromDirection::Right,
            _ => unreachable!(),
        };
        current = next;
        path.push(current);
        col = if tgt_col > col { col + 1 } else { col - 1 };
    }

    let mut row = current / grid.cols;
    while row != tgt_row {
        let move_dir = if tgt_row > row { MoveDirection::Top } else { MoveDirection::Bottom };
        let next = match move_dir {
            MoveDirection::Top => grid.cells[current].top,
            MoveDirection::Bottom => grid.cells[current].bottom,
            _ => unreachable!(),
        }?;

        let entering_target = next == target;
        let transition = transition_cost(grid, config, current, next, move_dir, prev_from_direction, entering_target);
        cost += transition.delta_cost;

        match move_dir {
            MoveDirection::Top => grid.cells[next].add_route_bottom(),
            MoveDirection::Bottom => grid.cells[current].add_route_bottom(),
            _ => unreachable!(),
        }

        prev_from_direction = match move_dir {
            MoveDirection::Top => FromDirection::Bottom,
            MoveDirection::Bottom => FromDirection::Top,
            _ => unreachable!(),
        };
        current = next;
        path.push(current);
        row = if tgt_row > row { row + 1 } else { row - 1 };
    }

    Some(Route { idx, path, cost })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Weights};
    use crate::cost::finalize;
    use crate::geometry::{Bump, Chip, Grid, Point, Size};

    fn uniform_grid(rows: usize, cols: usize, left_cap: u32, bottom_cap: u32) -> (Grid, Config) {
        let chip1 = Chip {
            lower_left: Point::new(0, 0),
            size: Size::new(1, 1),
            bumps: vec![Bump { idx: 0, position: Point::new(0, 0), gcell: 0 }],
        };
        let chip2 = Chip {
            lower_left: Point::new((cols as i64 - 1), 0),
            size: Size::new(1, 1),
            bumps: vec![Bump { idx: 0, position: Point::new(cols as i64 - 1, 0), gcell: 0 }],
        };
        let mut grid = Grid::build(
            Point::new(0, 0),
            Size::new(cols as i64, rows as i64),
            Size::new(1, 1),
            chip1,
            chip2,
        )
        .unwrap();
        for cell in &mut grid.cells {
            cell.cost_m1 = 1.0;
            cell.cost_m2 = 1.0;
            cell.left_edge_capacity = left_cap;
            cell.bottom_edge_capacity = bottom_cap;
        }
        let weights = Weights { alpha: 1.0, beta: 1.0, gamma: 1.0, delta: 1.0, via_cost: 1.0 };
        let mut config = Config::new(weights, 1, 1);
        finalize(&mut grid, &mut config);
        (grid, config)
    }

    #[test]
    fn straight_line_route_has_two_vias() {
        let (mut grid, config) = uniform_grid(3, 3, 10, 10);
        let source = grid.index(0, 0);
        let target = grid.index(2, 0);
        let mut router = SingleNetRouter::new(grid.cells.len());
        let route = router.route_dijkstra(&mut grid, &config, source, target, 0).unwrap();
        assert_eq!(route.path.first().copied(), Some(source));
        assert_eq!(route.path.last().copied(), Some(target));
        assert_eq!(route.path.len(), 3);
    }

    #[test]
    fn colocated_bump_is_trivial_route() {
        let (mut grid, config) = uniform_grid(1, 1, 10, 10);
        let source = grid.index(0, 0);
        let mut router = SingleNetRouter::new(grid.cells.len());
        let route = router.route_dijkstra(&mut grid, &config, source, source, 0).unwrap();
        assert_eq!(route.path, vec![source]);
        assert_eq!(route.cost, grid.cells[source].gamma_m1);
    }

    #[test]
    fn path_has_no_immediate_reversal() {
        let (mut grid, config) = uniform_grid(3, 3, 0, 10);
        let source = grid.index(0, 0);
        let target = grid.index(2, 0);
        let mut router = SingleNetRouter::new(grid.cells.len());
        let route = router.route_dijkstra(&mut grid, &config, source, target, 0).unwrap();
        for w in route.path.windows(3) {
            assert_ne!(w[0], w[2], "route reversed immediately: {:?}", route.path);
        }
    }

    #[test]
    fn saturated_edge_is_routed_around_or_penalized() {
        // 3x3 grid, source (0,0) -> target (2,0), with the edge between
        // (1,0) and (2,0) already saturated (leftEdgeCapacity=0 at column
        // 1 of row 0). The router must still find a path.
        let (mut grid, config) = uniform_grid(3, 3, 10, 10);
        let col1_row0 = grid.index(1, 0);
        grid.cells[col1_row0].left_edge_capacity = 0;
        let source = grid.index(0, 0);
        let target = grid.index(2, 0);
        let mut router = SingleNetRouter::new(grid.cells.len());
        let route = router.route_dijkstra(&mut grid, &config, source, target, 0).unwrap();
        assert_eq!(route.path.first().copied(), Some(source));
        assert_eq!(route.path.last().copied(), Some(target));
    }

    #[test]
    fn fast_route_reaches_target() {
        let (mut grid, config) = uniform_grid(3, 3, 10, 10);
        let source = grid.index(0, 0);
        let target = grid.index(2, 2);
        let route = fast_route(&mut grid, &config, source, target, 0).unwrap();
        assert_eq!(route.path.first().copied(), Some(source));
        assert_eq!(route.path.last().copied(), Some(target));
    }
}
