//! Independent re-scoring of a `.lg` route file against the same
//! `.gmp`/`.gcl`/`.cst` inputs the router used. Uses its own
//! freshly-parsed [`Grid`] so edge counters here are a shadow of the
//! router's, not shared state.

use comfy_table::{Table, presets::UTF8_FULL};

use crate::config::Config;
use crate::geometry::{Grid, Point};
use crate::parse::LgEvent;

/// Per-net WL/overflow/cost tally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetReport {
    pub idx: i32,
    pub wl: i64,
    pub overflow: u32,
    pub cell_cost: f64,
    pub via_count: u32,
    pub total_cost: f64,
}

impl NetReport {
    fn accumulate_into(&self, total: &mut NetReport) {
        total.wl += self.wl;
        total.overflow += self.overflow;
        total.cell_cost += self.cell_cost;
        total.via_count += self.via_count;
        total.total_cost += self.total_cost;
    }
}

pub struct EvalReport {
    pub nets: Vec<NetReport>,
    pub total: NetReport,
}

struct NetCtx {
    report: NetReport,
    check_start: bool,
    pass_via: bool,
    last_m1: bool,
    last_col: usize,
    last_row: usize,
}

fn grid_coord(grid: &Grid, p: Point) -> (usize, usize) {
    let dx = p.x - grid.routing_area_lower_left.x;
    let dy = p.y - grid.routing_area_lower_left.y;
    if dx % grid.gcell_size.x != 0 || dy % grid.gcell_size.y != 0 {
        log::error!("point ({}, {}) is not on a GCell lower-left corner", p.x, p.y);
    }
    ((dx / grid.gcell_size.x) as usize, (dy / grid.gcell_size.y) as usize)
}

/// Re-score every net in `events` against `grid`/`config`, validating
/// start/end points, layer direction, grid alignment, and the
/// terminal-via-to-M1 rule. Violations are logged, never fatal.
pub fn evaluate(grid: &mut Grid, config: &Config, events: &[LgEvent]) -> EvalReport {
    let mut nets = Vec::new();
    let mut ctx: Option<NetCtx> = None;

    for event in events {
        match *event {
            LgEvent::NetStart(idx) => {
                let start_bump = grid.chip1.bumps.iter().find(|b| b.idx == idx);
                let (col, row) = match start_bump {
                    Some(b) => grid_coord(grid, b.position),
                    None => {
                        log::error!("net {idx}: no matching bump on chip 1");
                        (0, 0)
                    }
                };
                ctx = Some(NetCtx {
                    report: NetReport { idx, ..Default::default() },
                    check_start: true,
                    pass_via: false,
                    last_m1: true,
                    last_col: col,
                    last_row: row,
                });
            }
            LgEvent::M1 { x1, y1, x2, y2 } => {
                let Some(c) = ctx.as_mut() else { continue };
                apply_m1(grid, config, c, x1, y1, x2, y2);
            }
            LgEvent::M2 { x1, y1, x2, y2 } => {
                let Some(c) = ctx.as_mut() else { continue };
                apply_m2(grid, config, c, x1, y1, x2, y2);
            }
            LgEvent::Via => {
                let Some(c) = ctx.as_mut() else { continue };
                apply_via(grid, config, c);
            }
            LgEvent::NetEnd => {
                if let Some(c) = ctx.take() {
                    finish_net(grid, &c);
                    nets.push(c.report);
                }
            }
        }
    }

    let mut total = NetReport::default();
    for net in &nets {
        net.accumulate_into(&mut total);
    }
    EvalReport { nets, total }
}

fn apply_m1(grid: &mut Grid, config: &Config, c: &mut NetCtx, x1: i64, y1: i64, x2: i64, y2: i64) {
    if c.check_start {
        let start = grid.cells[grid.index(c.last_col, c.last_row)].lower_left;
        if start.x != x1 || start.y != y1 {
            log::error!("net {}: start point mismatch at ({x1}, {y1})", c.report.idx);
        }
        c.check_start = false;
    }
    if x2 != x1 {
        log::error!("net {}: M1 horizontal routing is forbidden", c.report.idx);
    }
    if y2 == y1 {
        log::error!("net {}: M1 zero-length routing is forbidden", c.report.idx);
    }
    let (x1g, y1g) = grid_coord(grid, Point::new(x1, y1));
    let (_, y2g) = grid_coord(grid, Point::new(x2, y2));

    c.report.wl += (y2 - y1).abs();
    c.report.total_cost += (y2 - y1).abs() as f64 * config.weights.alpha;

    if !c.pass_via {
        let cell = &grid.cells[grid.index(x1g, y1g)];
        c.report.cell_cost += cell.cost_m1;
        c.report.total_cost += cell.gamma_m1;
    }
    c.pass_via = false;

    if y2 > y1 {
        for y in (y1g + 1)..=y2g {
            step_vertical(grid, config, c, x1g, y, true);
        }
        c.last_row = y2g;
    } else {
        let mut y = y1g;
        while y > y2g {
            step_vertical(grid, config, c, x1g, y - 1, false);
            y -= 1;
        }
        c.last_row = y2g;
    }
    c.last_col = x1g;
    c.last_m1 = true;
}

fn step_vertical(grid: &mut Grid, config: &Config, c: &mut NetCtx, x: usize, y: usize, going_up: bool) {
    let cell_idx = grid.index(x, y);
    c.report.cell_cost += grid.cells[cell_idx].cost_m1;
    c.report.total_cost += grid.cells[cell_idx].gamma_m1;

    // Going up: the edge below row `y` is `y`'s own bottom edge.
    // Going down: the edge just climbed is the edge *above* `y`, i.e. `y+1`'s bottom edge.
    let edge_cell = if going_up { cell_idx } else { grid.index(x, y + 1) };
    if grid.cells[edge_cell].bottom_edge_full() {
        c.report.total_cost += config.beta_half_max;
        c.report.overflow += 1;
    }
    grid.cells[edge_cell].add_route_bottom();
}

fn apply_m2(grid: &mut Grid, config: &Config, c: &mut NetCtx, x1: i64, y1: i64, x2: i64, y2: i64) {
    if c.check_start {
        let start = grid.cells[grid.index(c.last_col, c.last_row)].lower_left;
        if start.x != x1 || start.y != y1 {
            log::error!("net {}: start point mismatch at ({x1}, {y1})", c.report.idx);
        }
        c.check_start = false;
    }
    if y2 != y1 {
        log::error!("net {}: M2 vertical routing is forbidden", c.report.idx);
    }
    if x2 == x1 {
        log::error!("net {}: M2 zero-length routing is forbidden", c.report.idx);
    }
    let (x1g, y1g) = grid_coord(grid, Point::new(x1, y1));
    let (x2g, _) = grid_coord(grid, Point::new(x2, y2));

    c.report.wl += (x2 - x1).abs();
    c.report.total_cost += (x2 - x1).abs() as f64 * config.weights.alpha;

    if !c.pass_via {
        let cell = &grid.cells[grid.index(x1g, y1g)];
        c.report.cell_cost += cell.cost_m2;
        c.report.total_cost += cell.gamma_m2;
    }
    c.pass_via = false;

    if x2 > x1 {
        for x in (x1g + 1)..=x2g {
            step_horizontal(grid, config, c, x, y1g, true);
        }
        c.last_col = x2g;
    } else {
        let mut x = x1g;
        while x > x2g {
            step_horizontal(grid, config, c, x - 1, y1g, false);
            x -= 1;
        }
        c.last_col = x2g;
    }
    c.last_row = y1g;
    c.last_m1 = false;
}

fn step_horizontal(grid: &mut Grid, config: &Config, c: &mut NetCtx, x: usize, y: usize, going_right: bool) {
    let cell_idx = grid.index(x, y);
    c.report.cell_cost += grid.cells[cell_idx].cost_m2;
    c.report.total_cost += grid.cells[cell_idx].gamma_m2;

    let edge_cell = if going_right { cell_idx } else { grid.index(x + 1, y) };
    if grid.cells[edge_cell].left_edge_full() {
        c.report.total_cost += config.beta_half_max;
        c.report.overflow += 1;
    }
    grid.cells[edge_cell].add_route_left();
}

fn apply_via(grid: &mut Grid, config: &Config, c: &mut NetCtx) {
    let latest = &grid.cells[grid.index(c.last_col, c.last_row)];
    let (gamma_m1, gamma_m2, cost_m1, cost_m2) = (latest.gamma_m1, latest.gamma_m2, latest.cost_m1, latest.cost_m2);

    if c.last_m1 {
        if !c.check_start {
            c.report.cell_cost -= cost_m1;
            c.report.total_cost -= gamma_m1;
        }
    } else if !c.check_start {
        c.report.cell_cost -= cost_m2;
        c.report.total_cost -= gamma_m2;
    }
    c.report.cell_cost += cost_m1 / 2.0 + cost_m2 / 2.0;
    c.report.total_cost += gamma_m1 / 2.0 + gamma_m2 / 2.0;

    c.report.via_count += 1;
    c.report.total_cost += config.delta_via_cost;
    c.pass_via = true;
}

fn finish_net(grid: &Grid, c: &NetCtx) {
    let end_bump = grid.chip2.bumps.iter().find(|b| b.idx == c.report.idx);
    let latest = grid.cells[grid.index(c.last_col, c.last_row)].lower_left;
    match end_bump {
        Some(b) if b.position.x == latest.x && b.position.y == latest.y => {}
        Some(_) => log::error!(
            "net {}: end point mismatch at ({}, {})",
            c.report.idx,
            latest.x,
            latest.y
        ),
        None => log::error!("net {}: no matching bump on chip 2", c.report.idx),
    }

    let ends_on_m1 = if c.pass_via { !c.last_m1 } else { c.last_m1 };
    if !ends_on_m1 {
        log::error!("net {}: last routing is not M1", c.report.idx);
    }
}

/// Render the per-net and total rows as a formatted table.
pub fn render_table(report: &EvalReport) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Net", "WL", "Overflow", "Cell Cost", "Via Count", "Total Cost"]);

    for net in &report.nets {
        table.add_row(vec![
            net.idx.to_string(),
            net.wl.to_string(),
            net.overflow.to_string(),
            format!("{:.4}", net.cell_cost),
            net.via_count.to_string(),
            format!("{:.4}", net.total_cost),
        ]);
    }
    table.add_row(vec![
        "Total".to_string(),
        report.total.wl.to_string(),
        report.total.overflow.to_string(),
        format!("{:.4}", report.total.cell_cost),
        report.total.via_count.to_string(),
        format!("{:.4}", report.total.total_cost),
    ]);

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Weights;
    use crate::cost::finalize;
    use crate::geometry::{Bump, Chip, Size};

    fn grid_with_one_net() -> (Grid, Config) {
        let chip1 = Chip {
            lower_left: Point::new(0, 0),
            size: Size::new(1, 1),
            bumps: vec![Bump { idx: 0, position: Point::new(0, 0), gcell: 0 }],
        };
        let chip2 = Chip {
            lower_left: Point::new(2, 1),
            size: Size::new(1, 1),
            bumps: vec![Bump { idx: 0, position: Point::new(2, 1), gcell: 0 }],
        };
        let mut grid = Grid::build(Point::new(0, 0), Size::new(3, 2), Size::new(1, 1), chip1, chip2).unwrap();
        for cell in &mut grid.cells {
            cell.cost_m1 = 1.0;
            cell.cost_m2 = 1.0;
            cell.left_edge_capacity = 10;
            cell.bottom_edge_capacity = 10;
        }
        let weights = Weights { alpha: 1.0, beta: 1.0, gamma: 1.0, delta: 1.0, via_cost: 2.0 };
        let mut config = Config::new(weights, 1, 1);
        finalize(&mut grid, &mut config);
        (grid, config)
    }

    #[test]
    fn scores_a_well_formed_net_with_one_via() {
        let (mut grid, config) = grid_with_one_net();
        let events = vec![
            LgEvent::NetStart(0),
            LgEvent::M1 { x1: 0, y1: 0, x2: 0, y2: 1 },
            LgEvent::Via,
            LgEvent::M2 { x1: 0, y1: 1, x2: 2, y2: 1 },
            LgEvent::NetEnd,
        ];
        let report = evaluate(&mut grid, &config, &events);
        assert_eq!(report.nets.len(), 1);
        assert_eq!(report.nets[0].wl, 3);
        assert_eq!(report.nets[0].via_count, 1);
        assert_eq!(report.total.wl, 3);
    }

    #[test]
    fn counts_overflow_when_capacity_is_saturated() {
        let (mut grid, config) = grid_with_one_net();
        let target = grid.index(0, 1);
        grid.cells[target].bottom_edge_capacity = 0;
        let events = vec![
            LgEvent::NetStart(0),
            LgEvent::M1 { x1: 0, y1: 0, x2: 0, y2: 1 },
            LgEvent::Via,
            LgEvent::M2 { x1: 0, y1: 1, x2: 2, y2: 1 },
            LgEvent::NetEnd,
        ];
        let report = evaluate(&mut grid, &config, &events);
        assert_eq!(report.nets[0].overflow, 1);
    }
}
