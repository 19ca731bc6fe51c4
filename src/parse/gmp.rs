//! `.gmp` grid map parser: routing area, GCell pitch, and both chips'
//! placement and bumps.

use std::path::Path;

use super::{is_blank, parse_token, read_lines};
use crate::error::Result;
use crate::geometry::{Bump, Chip, Grid, Point, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Command,
    RoutingArea,
    GCellSize,
    Chip1,
    Bump,
    Chip2,
}

/// Parse a `.gmp` file and build the [`Grid`] it describes (lattice
/// construction plus bump binding happen in [`Grid::build`]).
pub fn parse_gmp(path: &Path) -> Result<Grid> {
    let lines = read_lines(path)?;

    let mut routing_area_lower_left = Point::default();
    let mut routing_area_size = Size::default();
    let mut gcell_size = Size::default();
    let mut chip1 = Chip::default();
    let mut chip2 = Chip::default();
    let mut loading_chip1 = false;

    let mut state = State::Command;

    for (line_no, raw) in lines.iter().enumerate() {
        if is_blank(raw) {
            if state == State::Bump {
                state = State::Command;
            }
            continue;
        }
        let mut tokens = raw.split_whitespace();

        match state {
            State::Command => {
                let command = tokens.next().unwrap_or("");
                state = match command {
                    ".ra" => State::RoutingArea,
                    ".g" => State::GCellSize,
                    ".c" => {
                        if loading_chip1 {
                            loading_chip1 = false;
                            State::Chip2
                        } else {
                            loading_chip1 = true;
                            State::Chip1
                        }
                    }
                    ".b" => State::Bump,
                    other => {
                        log::error!("{}:{}: unknown command {other:?}", path.display(), line_no + 1);
                        State::Command
                    }
                };
            }
            State::RoutingArea => {
                if let (Some(x), Some(y), Some(w), Some(h)) = (
                    parse_token::<i64>(path, line_no, &mut tokens, "routing area x"),
                    parse_token::<i64>(path, line_no, &mut tokens, "routing area y"),
                    parse_token::<i64>(path, line_no, &mut tokens, "routing area width"),
                    parse_token::<i64>(path, line_no, &mut tokens, "routing area height"),
                ) {
                    routing_area_lower_left = Point::new(x, y);
                    routing_area_size = Size::new(w, h);
                }
                state = State::Command;
            }
            State::GCellSize => {
                if let (Some(x), Some(y)) = (
                    parse_token::<i64>(path, line_no, &mut tokens, "gcell size x"),
                    parse_token::<i64>(path, line_no, &mut tokens, "gcell size y"),
                ) {
                    gcell_size = Size::new(x, y);
                }
                state = State::Command;
            }
            State::Chip1 => {
                if let Some(chip) = parse_chip_line(path, line_no, &mut tokens, routing_area_lower_left) {
                    chip1 = chip;
                }
                state = State::Command;
            }
            State::Chip2 => {
                if let Some(chip) = parse_chip_line(path, line_no, &mut tokens, routing_area_lower_left) {
                    chip2 = chip;
                }
                state = State::Command;
            }
            State::Bump => {
                if let (Some(idx), Some(x), Some(y)) = (
                    parse_token::<i32>(path, line_no, &mut tokens, "bump index"),
                    parse_token::<i64>(path, line_no, &mut tokens, "bump x"),
                    parse_token::<i64>(path, line_no, &mut tokens, "bump y"),
                ) {
                    let target = if loading_chip1 { &mut chip1 } else { &mut chip2 };
                    target.bumps.push(Bump {
                        idx,
                        position: Point::new(x + target.lower_left.x, y + target.lower_left.y),
                        gcell: 0,
                    });
                }
                // Stay in Bump state: a blank line (handled above) ends the block.
            }
        }
    }

    Grid::build(routing_area_lower_left, routing_area_size, gcell_size, chip1, chip2)
}

fn parse_chip_line(
    path: &Path,
    line_no: usize,
    tokens: &mut std::str::SplitWhitespace,
    routing_area_lower_left: Point,
) -> Option<Chip> {
    let x = parse_token::<i64>(path, line_no, tokens, "chip x")?;
    let y = parse_token::<i64>(path, line_no, tokens, "chip y")?;
    let w = parse_token::<i64>(path, line_no, tokens, "chip width")?;
    let h = parse_token::<i64>(path, line_no, tokens, "chip height")?;
    Some(Chip {
        lower_left: Point::new(x + routing_area_lower_left.x, y + routing_area_lower_left.y),
        size: Size::new(w, h),
        bumps: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_minimal_grid_map() {
        let contents = "\
.ra 0 0 4 2
.g 1 1
.c 0 0 1 1
.b
0 0 0

.c 3 0 1 1
.b
0 0 0
";
        let path = write_tmp("gridroute_test_minimal.gmp", contents);
        let grid = parse_gmp(&path).unwrap();
        assert_eq!(grid.rows, 2);
        assert_eq!(grid.cols, 4);
        assert_eq!(grid.chip1.bumps[0].gcell, grid.index(0, 0));
        assert_eq!(grid.chip2.bumps[0].gcell, grid.index(3, 0));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn skips_unknown_command_and_keeps_parsing() {
        let contents = "\
.unknown foo
.ra 0 0 2 1
.g 1 1
.c 0 0 1 1
.b
0 0 0

.c 1 0 1 1
.b
0 0 0
";
        let path = write_tmp("gridroute_test_unknown.gmp", contents);
        let grid = parse_gmp(&path).unwrap();
        assert_eq!(grid.cols, 2);
        std::fs::remove_file(&path).ok();
    }
}
