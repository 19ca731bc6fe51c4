//! `.cst` cost table parser: cost-model weights plus the two per-layer
//! cost matrices.
//!
//! The `.l` layer block here does not seed a spurious leading zero into
//! the cost samples used for `maxCellCost`/`medianCellCost` — that
//! statistic is computed later, in [`crate::cost::finalize`], from the
//! cells actually loaded.

use std::path::Path;

use super::{is_blank, parse_token, read_lines};
use crate::config::Weights;
use crate::error::Result;
use crate::geometry::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Command,
    ViaCost,
    Layer,
}

/// Apply the `.alpha`/`.beta`/`.gamma`/`.delta`/`.v`/`.l`/`.l` blocks
/// onto `grid`'s per-cell `cost_m1`/`cost_m2` and return the weights for
/// [`crate::config::Config::new`].
pub fn parse_cst(path: &Path, grid: &mut Grid) -> Result<Weights> {
    let lines = read_lines(path)?;
    let mut weights = Weights::default();
    let mut state = State::Command;
    let mut current_row = 0usize;
    let mut current_layer = 0u8;

    for (line_no, raw) in lines.iter().enumerate() {
        if is_blank(raw) {
            continue;
        }
        let mut tokens = raw.split_whitespace();

        match state {
            State::Command => {
                let command = tokens.next().unwrap_or("");
                state = match command {
                    ".l" => State::Layer,
                    ".v" => State::ViaCost,
                    ".alpha" => {
                        if let Some(v) = parse_token::<f64>(path, line_no, &mut tokens, "alpha") {
                            weights.alpha = v;
                        }
                        State::Command
                    }
                    ".beta" => {
                        if let Some(v) = parse_token::<f64>(path, line_no, &mut tokens, "beta") {
                            weights.beta = v;
                        }
                        State::Command
                    }
                    ".gamma" => {
                        if let Some(v) = parse_token::<f64>(path, line_no, &mut tokens, "gamma") {
                            weights.gamma = v;
                        }
                        State::Command
                    }
                    ".delta" => {
                        if let Some(v) = parse_token::<f64>(path, line_no, &mut tokens, "delta") {
                            weights.delta = v;
                        }
                        State::Command
                    }
                    other => {
                        log::error!("{}:{}: unknown command {other:?}", path.display(), line_no + 1);
                        State::Command
                    }
                };
            }
            State::ViaCost => {
                if let Some(v) = parse_token::<f64>(path, line_no, &mut tokens, "via cost") {
                    weights.via_cost = v;
                }
                state = State::Command;
            }
            State::Layer => {
                if current_row >= grid.rows {
                    log::error!("{}:{}: more cost rows than GCell rows", path.display(), line_no + 1);
                    continue;
                }
                for col in 0..grid.cols {
                    match parse_token::<f64>(path, line_no, &mut tokens, "cell cost") {
                        Some(cost) => {
                            let cell = grid.index(col, current_row);
                            if current_layer == 0 {
                                grid.cells[cell].cost_m1 = cost;
                            } else {
                                grid.cells[cell].cost_m2 = cost;
                            }
                        }
                        None => break,
                    }
                }
                current_row += 1;
                if current_row == grid.rows {
                    current_row = 0;
                    current_layer += 1;
                    state = State::Command;
                }
            }
        }
    }

    Ok(weights)
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
    fn parses_weights_and_both_layers() {
        let mut grid =
            Grid::build(Point::new(0, 0), Size::new(2, 1), Size::new(1, 1), Chip::default(), Chip::default()).unwrap();
        let contents = "\
.alpha 1.5
.beta 2.0
.gamma 0.5
.delta 3.0
.v 4.0
.l
1 2
.l
5 6
";
        let path = write_tmp("gridroute_test.cst", contents);
        let weights = parse_cst(&path, &mut grid).unwrap();
        assert_eq!(weights.alpha, 1.5);
        assert_eq!(weights.via_cost, 4.0);
        assert_eq!(grid.cells[grid.index(0, 0)].cost_m1, 1.0);
        assert_eq!(grid.cells[grid.index(1, 0)].cost_m1, 2.0);
        assert_eq!(grid.cells[grid.index(0, 0)].cost_m2, 5.0);
        assert_eq!(grid.cells[grid.index(1, 0)].cost_m2, 6.0);
        std::fs::remove_file(&path).ok();
    }
}
