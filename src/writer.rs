//! Serializes committed routes to `.lg` segment form with via insertion.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, RouterError};
use crate::geometry::{CellId, Grid, Point};
use crate::router::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentLayer {
    M1,
    M2,
}

/// A step that changes both coordinates or neither is invalid; `None`
/// signals that condition to the caller, which logs and stops emitting
/// further segments for the net.
fn layer_of_step(u: Point, v: Point) -> Option<SegmentLayer> {
    let dx = v.x != u.x;
    let dy = v.y != u.y;
    match (dx, dy) {
        (true, false) => Some(SegmentLayer::M2),
        (false, true) => Some(SegmentLayer::M1),
        _ => None,
    }
}

/// Write every route to `path` in `.lg` form, coalescing consecutive
/// same-layer steps into one segment and inserting `via` at each layer
/// transition. Routes must already be sorted by `idx` (the Sequencer's
/// final step).
pub fn write_routes(path: &Path, grid: &Grid, routes: &[Route]) -> Result<()> {
    let file = File::create(path).map_err(|source| RouterError::Io { path: path.to_path_buf(), source })?;
    let mut out = BufWriter::new(file);

    for route in routes {
        writeln!(out, "n{}", route.idx).map_err(|source| RouterError::Io { path: path.to_path_buf(), source })?;
        write_net(&mut out, path, grid, route)?;
        writeln!(out, ".end").map_err(|source| RouterError::Io { path: path.to_path_buf(), source })?;
    }

    Ok(())
}

fn cell_point(grid: &Grid, cell: CellId) -> Point {
    grid.cells[cell].lower_left
}

fn write_net<W: Write>(out: &mut W, path: &Path, grid: &Grid, route: &Route) -> Result<()> {
    if route.path.len() < 2 {
        // Colocated source/target: empty-move route, nothing to emit.
        return Ok(());
    }

    let mut run_start = route.path[0];
    let mut run_layer = match layer_of_step(cell_point(grid, route.path[0]), cell_point(grid, route.path[1])) {
        Some(layer) => layer,
        None => {
            log::error!("net {}: invalid first step (not grid-adjacent)", route.idx);
            return Ok(());
        }
    };
    let mut last_cell = route.path[0];
    let mut last_emitted_layer = None;

    // A net always charges gammaM1 at the source, so it starts on M1; if
    // its first physical move is on M2, a via must precede that segment.
    if run_layer == SegmentLayer::M2 {
        writeln!(out, "via").map_err(|source| RouterError::Io { path: path.to_path_buf(), source })?;
    }

    for window in route.path.windows(2) {
        let (u, v) = (window[0], window[1]);
        let layer = match layer_of_step(cell_point(grid, u), cell_point(grid, v)) {
            Some(layer) => layer,
            None => {
                log::error!("net {}: step from cell {} to {} is neither purely horizontal nor vertical", route.idx, u, v);
                break;
            }
        };

        if layer != run_layer {
            emit_segment(out, path, run_layer, cell_point(grid, run_start), cell_point(grid, last_cell))?;
            last_emitted_layer = Some(run_layer);
            writeln!(out, "via").map_err(|source| RouterError::Io { path: path.to_path_buf(), source })?;
            run_start = u;
            run_layer = layer;
        }
        last_cell = v;
    }

    emit_segment(out, path, run_layer, cell_point(grid, run_start), cell_point(grid, last_cell))?;
    last_emitted_layer = Some(run_layer);

    if last_emitted_layer == Some(SegmentLayer::M2) {
        writeln!(out, "via").map_err(|source| RouterError::Io { path: path.to_path_buf(), source })?;
    }

    Ok(())
}

fn emit_segment<W: Write>(out: &mut W, path: &Path, layer: SegmentLayer, start: Point, end: Point) -> Result<()> {
    let name = match layer {
        SegmentLayer::M1 => "M1",
        SegmentLayer::M2 => "M2",
    };
    writeln!(out, "{name} {} {} {} {}", start.x, start.y, end.x, end.y)
        .map_err(|source| RouterError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bump, Chip, Size};
    use std::io::Read as _;

    fn three_cell_grid() -> Grid {
        let chip1 = Chip {
            lower_left: Point::new(0, 0),
            size: Size::new(1, 1),
            bumps: vec![Bump { idx: 0, position: Point::new(0, 0), gcell: 0 }],
        };
        let chip2 = Chip {
            lower_left: Point::new(2, 0),
            size: Size::new(1, 1),
            bumps: vec![Bump { idx: 0, position: Point::new(2, 0), gcell: 0 }],
        };
        Grid::build(Point::new(0, 0), Size::new(3, 1), Size::new(1, 1), chip1, chip2).unwrap()
    }

    #[test]
    fn straight_horizontal_route_has_two_vias() {
        let grid = three_cell_grid();
        let route = Route { idx: 0, path: vec![grid.index(0, 0), grid.index(1, 0), grid.index(2, 0)], cost: 3.0 };
        let tmp = std::env::temp_dir().join("gridroute_writer_test_horizontal.lg");
        write_routes(&tmp, &grid, &[route]).unwrap();
        let mut contents = String::new();
        File::open(&tmp).unwrap().read_to_string(&mut contents).unwrap();
        let via_count = contents.lines().filter(|l| *l == "via").count();
        assert_eq!(via_count, 2);
        assert!(contents.starts_with("n0"));
        assert!(contents.trim_end().ends_with(".end"));
        std::fs::remove_file(&tmp).ok();
    }

    #[test]
    fn colocated_route_emits_no_segments() {
        let grid = three_cell_grid();
        let route = Route { idx: 0, path: vec![grid.index(0, 0)], cost: 1.0 };
        let tmp = std::env::temp_dir().join("gridroute_writer_test_colocated.lg");
        write_routes(&tmp, &grid, &[route]).unwrap();
        let mut contents = String::new();
        File::open(&tmp).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "n0\n.end\n");
        std::fs::remove_file(&tmp).ok();
    }
}
