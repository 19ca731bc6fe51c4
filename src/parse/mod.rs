//! Line-oriented parsers for the four input/output text formats:
//! `.gmp` grid maps, `.gcl` capacities, `.cst` cost tables, and `.lg`
//! route files (read side, used by the Evaluator).
//!
//! Every parser here applies the same soft-failure discipline: a
//! malformed line is logged and skipped, never aborting the whole file.
//! Only file-not-found is a hard [`RouterError`].

mod cst;
mod gcl;
mod gmp;
mod lg;

pub use cst::parse_cst;
pub use gcl::parse_gcl;
pub use gmp::parse_gmp;
pub use lg::{parse_lg, LgEvent};

use std::fs;
use std::path::Path;

use crate::error::{Result, RouterError};

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| RouterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.lines().map(str::to_owned).collect())
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Parse a whitespace-separated token as `T`, logging and returning
/// `None` on failure (the caller skips the offending line).
fn parse_token<T: std::str::FromStr>(path: &Path, line_no: usize, tokens: &mut std::str::SplitWhitespace, what: &str) -> Option<T> {
    match tokens.next().and_then(|t| t.parse::<T>().ok()) {
        Some(v) => Some(v),
        None => {
            log::error!("{}:{}: expected {what}", path.display(), line_no + 1);
            None
        }
    }
}
