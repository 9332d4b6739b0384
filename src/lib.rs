//! **raymaze** generates mazes and looks at them the way a maze crawler game does: from above
//! through a fog of war, and in first person through a grid raycaster.

pub mod cells;
pub mod config;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod grid_iterators;
pub mod pathing;
pub mod raycaster;
pub mod renderers;
pub mod snapshot;
pub mod traversal;
pub mod units;
pub mod utils;
pub mod viewer;
pub mod visibility;
