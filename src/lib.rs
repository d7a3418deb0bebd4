//! Conway's Game of Life on a finite board.
//!
//! [`grid::Grid`] holds one generation, [`engine::advance`] derives the next
//! one, and [`draw`] drives the loop that shows each generation in turn.

pub mod draw;
pub mod engine;
pub mod error;
pub mod grid;
pub mod pattern;

pub use engine::{advance, next_state, Session};
pub use error::{GridError, LoadError};
pub use grid::Grid;
