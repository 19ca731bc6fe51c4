//! Error types shared by every fallible entry point in the crate.

use std::path::PathBuf;

/// Top-level error type returned by parsing, routing, and writing.
///
/// Soft/recoverable issues (malformed lines, evaluation diagnostics) are
/// logged in place via the `log` facade and never construct this type;
/// only conditions that abort a solve or a parse outright do.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}:{line}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("topology error: {0}")]
    Topology(String),

    #[error("no route found for net {net_idx}")]
    SearchFailed { net_idx: i32 },
}

pub type Result<T> = std::result::Result<T, RouterError>;
