//! Layout engine: cell geometry, display-row linearization and scroll state.
//!
//! This module handles:
//! - Pre-computing column and row edges as prefix sums
//! - Mapping group points to a flat display-row space
//! - Managing viewport state (scroll position, visible range)
//! - Binary search for cell lookup at content coordinates

mod grid_layout;
mod linear_rows;
mod viewport;

pub use grid_layout::{GridLayout, MIN_COLUMN_WIDTH};
pub use linear_rows::{GroupHeader, LinearRow, LinearRows};
pub use viewport::Viewport;
