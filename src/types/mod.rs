//! Data types shared by the grid's layout, selection, render and interaction layers.

mod address;
mod cell;
mod column;
mod config;
mod group;
mod selection;

pub use address::*;
pub use cell::*;
pub use column::*;
pub use config::*;
pub use group::*;
pub use selection::*;
