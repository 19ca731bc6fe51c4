//! `.gcl` capacity parser: per-cell left/bottom edge capacities in
//! row-major order.

use std::path::Path;

use super::{is_blank, parse_token, read_lines};
use crate::error::Result;
use crate::geometry::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Command,
    Capacity,
}

/// Apply the `.ec` capacity block onto an already-built [`Grid`], in
/// row-major `(row 0 first, left-to-right)` order matching
/// [`Grid::build`]'s cell layout.
pub fn parse_gcl(path: &Path, grid: &mut Grid) -> Result<()> {
    let lines = read_lines(path)?;
    let mut state = State::Command;
    let mut loaded = 0usize;
    let total = grid.cells.len();

    for (line_no, raw) in lines.iter().enumerate() {
        if is_blank(raw) {
            continue;
        }
        let mut tokens = raw.split_whitespace();

        match state {
            State::Command => {
                let command = tokens.next().unwrap_or("");
                state = match command {
                    ".ec" => State::Capacity,
                    other => {
                        log::error!("{}:{}: unknown command {other:?}", path.display(), line_no + 1);
                        State::Command
                    }
                };
            }
            State::Capacity => {
                if loaded >= total {
                    log::error!("{}:{}: more capacity rows than GCells", path.display(), line_no + 1);
                    continue;
                }
                if let (Some(left), Some(bottom)) = (
                    parse_token::<u32>(path, line_no, &mut tokens, "left edge capacity"),
                    parse_token::<u32>(path, line_no, &mut tokens, "bottom edge capacity"),
                ) {
                    grid.cells[loaded].left_edge_capacity = left;
                    grid.cells[loaded].bottom_edge_capacity = bottom;
                }
                loaded += 1;
            }
        }
    }

    if loaded != total {
        log::warn!(
            "{}: loaded {loaded} capacity rows, expected {total}",
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Chip, Point, Size};
    use std::io::Write;

    fn write_tmp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn applies_capacities_in_row_major_order() {
        let mut grid =
            Grid::build(Point::new(0, 0), Size::new(2, 2), Size::new(1, 1), Chip::default(), Chip::default()).unwrap();
        let contents = "\
.ec
1 2
3 4
5 6
7 8
";
        let path = write_tmp("gridroute_test.gcl", contents);
        parse_gcl(&path, &mut grid).unwrap();
        assert_eq!(grid.cells[grid.index(0, 0)].left_edge_capacity, 1);
        assert_eq!(grid.cells[grid.index(0, 0)].bottom_edge_capacity, 2);
        assert_eq!(grid.cells[grid.index(1, 1)].left_edge_capacity, 7);
        assert_eq!(grid.cells[grid.index(1, 1)].bottom_edge_capacity, 8);
        std::fs::remove_file(&path).ok();
    }
}
