//! Two-chip bump-to-bump global router on a rectangular GCell grid with
//! two metal layers.

pub mod config;
pub mod cost;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod parse;
pub mod router;
pub mod sequencer;
pub mod writer;

pub use error::{Result, RouterError};
