//! GCell lattice, chip placement, and bump-to-cell binding (component A).

use rustc_hash::FxHashSet;

use crate::error::{Result, RouterError};

/// Integer 2-tuple coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Integer 2-tuple extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub x: i64,
    pub y: i64,
}

impl Size {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Index into the flat GCell arena.
pub type CellId = usize;

/// Which neighbor direction the router arrived from during a single-net
/// search. `Origin` marks the source cell of the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FromDirection {
    #[default]
    Origin,
    Left,
    Bottom,
    Right,
    Top,
}

/// A unit of routing. Static geometry, cost, and capacity fields only —
/// per-search scratch (`gScore`, `parent`, `fromDirection`) lives in the
/// router's own side tables, not here.
#[derive(Debug, Clone)]
pub struct GCell {
    pub lower_left: Point,

    pub cost_m1: f64,
    pub cost_m2: f64,
    pub gamma_m1: f64,
    pub gamma_m2: f64,
    pub via_step: f64,

    pub left_edge_capacity: u32,
    pub bottom_edge_capacity: u32,
    pub left_edge_count: u32,
    pub bottom_edge_count: u32,

    pub left: Option<CellId>,
    pub bottom: Option<CellId>,
    pub right: Option<CellId>,
    pub top: Option<CellId>,
}

impl GCell {
    fn new(lower_left: Point) -> Self {
        Self {
            lower_left,
            cost_m1: 0.0,
            cost_m2: 0.0,
            gamma_m1: 0.0,
            gamma_m2: 0.0,
            via_step: 0.0,
            left_edge_capacity: 0,
            bottom_edge_capacity: 0,
            left_edge_count: 0,
            bottom_edge_count: 0,
            left: None,
            bottom: None,
            right: None,
            top: None,
        }
    }

    pub fn add_route_left(&mut self) {
        self.left_edge_count += 1;
    }

    pub fn add_route_bottom(&mut self) {
        self.bottom_edge_count += 1;
    }

    pub fn left_edge_full(&self) -> bool {
        self.left_edge_count >= self.left_edge_capacity
    }

    pub fn bottom_edge_full(&self) -> bool {
        self.bottom_edge_count >= self.bottom_edge_capacity
    }
}

/// A terminal on a chip: the source or target of a net.
#[derive(Debug, Clone, Copy)]
pub struct Bump {
    pub idx: i32,
    pub position: Point,
    pub gcell: CellId,
}

/// One of the two chips carrying bumps.
#[derive(Debug, Clone, Default)]
pub struct Chip {
    pub lower_left: Point,
    pub size: Size,
    pub bumps: Vec<Bump>,
}

/// The `rows × cols` GCell lattice plus the routing-area framing it sits
/// in, with bumps bound to their cells.
#[derive(Debug, Clone)]
pub struct Grid {
    pub routing_area_lower_left: Point,
    pub routing_area_size: Size,
    pub gcell_size: Size,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<GCell>,
    pub chip1: Chip,
    pub chip2: Chip,
}

impl Grid {
    /// Row-major cell index for grid coordinates `(x, y)` in `0..cols`,
    /// `0..rows`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> CellId {
        y * self.cols + x
    }

    /// Resolve the GCell a physical point lands on, given the routing
    /// area's origin and the GCell pitch.
    fn cell_for_point(&self, p: Point) -> Option<CellId> {
        let dx = p.x - self.routing_area_lower_left.x;
        let dy = p.y - self.routing_area_lower_left.y;
        if dx < 0 || dy < 0 {
            return None;
        }
        let x = (dx / self.gcell_size.x) as usize;
        let y = (dy / self.gcell_size.y) as usize;
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(self.index(x, y))
    }

    /// Build the lattice, wire up reciprocal neighbor links, and bind
    /// every bump of both chips to its GCell.
    pub fn build(
        routing_area_lower_left: Point,
        routing_area_size: Size,
        gcell_size: Size,
        mut chip1: Chip,
        mut chip2: Chip,
    ) -> Result<Self> {
        if gcell_size.x <= 0 || gcell_size.y <= 0 {
            return Err(RouterError::Topology(
                "gcell size must be positive in both axes".into(),
            ));
        }
        if routing_area_size.x % gcell_size.x != 0 || routing_area_size.y % gcell_size.y != 0 {
            return Err(RouterError::Topology(
                "routing area size must be a multiple of gcell size".into(),
            ));
        }

        let cols = (routing_area_size.x / gcell_size.x) as usize;
        let rows = (routing_area_size.y / gcell_size.y) as usize;

        let mut cells = Vec::with_capacity(rows * cols);
        for y in 0..rows {
            for x in 0..cols {
                let lower_left = Point::new(
                    x as i64 * gcell_size.x + routing_area_lower_left.x,
                    y as i64 * gcell_size.y + routing_area_lower_left.y,
                );
                cells.push(GCell::new(lower_left));
            }
        }

        let mut grid = Grid {
            routing_area_lower_left,
            routing_area_size,
            gcell_size,
            rows,
            cols,
            cells,
            chip1: Chip::default(),
            chip2: Chip::default(),
        };

        for y in 0..rows {
            for x in 0..cols {
                let id = grid.index(x, y);
                grid.cells[id].left = if x > 0 { Some(grid.index(x - 1, y)) } else { None };
                grid.cells[id].bottom = if y > 0 { Some(grid.index(x, y - 1)) } else { None };
                grid.cells[id].right = if x + 1 < cols { Some(grid.index(x + 1, y)) } else { None };
                grid.cells[id].top = if y + 1 < rows { Some(grid.index(x, y + 1)) } else { None };
            }
        }

        chip1.bumps.sort_by_key(|b| b.idx);
        chip2.bumps.sort_by_key(|b| b.idx);

        let idx1: FxHashSet<i32> = chip1.bumps.iter().map(|b| b.idx).collect();
        let idx2: FxHashSet<i32> = chip2.bumps.iter().map(|b| b.idx).collect();
        if idx1 != idx2 {
            return Err(RouterError::Topology(
                "chip 1 and chip 2 bump index sets differ".into(),
            ));
        }

        for bump in chip1.bumps.iter_mut().chain(chip2.bumps.iter_mut()) {
            let cell = grid.cell_for_point(bump.position).ok_or_else(|| {
                RouterError::Topology(format!(
                    "bump {} at ({}, {}) falls outside the routing area",
                    bump.idx, bump.position.x, bump.position.y
                ))
            })?;
            bump.gcell = cell;
        }

        grid.chip1 = chip1;
        grid.chip2 = chip2;
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(idx: i32, x: i64, y: i64) -> Bump {
        Bump { idx, position: Point::new(x, y), gcell: 0 }
    }

    #[test]
    fn builds_reciprocal_neighbors() {
        let chip1 = Chip { lower_left: Point::new(0, 0), size: Size::new(1, 1), bumps: vec![bump(0, 0, 0)] };
        let chip2 = Chip { lower_left: Point::new(2, 0), size: Size::new(1, 1), bumps: vec![bump(0, 2, 0)] };
        let grid = Grid::build(Point::new(0, 0), Size::new(3, 3), Size::new(1, 1), chip1, chip2).unwrap();
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.cols, 3);
        let right_of_0 = grid.cells[grid.index(0, 0)].right.unwrap();
        assert_eq!(right_of_0, grid.index(1, 0));
        assert_eq!(grid.cells[right_of_0].left, Some(grid.index(0, 0)));
    }

    #[test]
    fn binds_bumps_to_cells() {
        let chip1 = Chip { lower_left: Point::new(0, 0), size: Size::new(1, 1), bumps: vec![bump(7, 0, 0)] };
        let chip2 = Chip { lower_left: Point::new(2, 0), size: Size::new(1, 1), bumps: vec![bump(7, 2, 0)] };
        let grid = Grid::build(Point::new(0, 0), Size::new(3, 1), Size::new(1, 1), chip1, chip2).unwrap();
        assert_eq!(grid.chip1.bumps[0].gcell, grid.index(0, 0));
        assert_eq!(grid.chip2.bumps[0].gcell, grid.index(2, 0));
    }

    #[test]
    fn rejects_mismatched_bump_indices() {
        let chip1 = Chip { lower_left: Point::new(0, 0), size: Size::new(1, 1), bumps: vec![bump(1, 0, 0)] };
        let chip2 = Chip { lower_left: Point::new(1, 0), size: Size::new(1, 1), bumps: vec![bump(2, 1, 0)] };
        let err = Grid::build(Point::new(0, 0), Size::new(2, 1), Size::new(1, 1), chip1, chip2).unwrap_err();
        assert!(matches!(err, RouterError::Topology(_)));
    }

    #[test]
    fn rejects_non_divisible_routing_area() {
        let chip1 = Chip::default();
        let chip2 = Chip::default();
        let err = Grid::build(Point::new(0, 0), Size::new(5, 4), Size::new(2, 2), chip1, chip2).unwrap_err();
        assert!(matches!(err, RouterError::Topology(_)));
    }
}
