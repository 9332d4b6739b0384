use error_chain::bail;
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::cells::Coordinate;
use crate::errors::*;
use crate::grid::Grid;

/// A continuous position in grid-cell units: (2.5, 0.5) is the centre of cell (2, 0).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Position {
        Position { x, y }
    }

    pub fn centre_of(coord: Coordinate) -> Position {
        let (x, y) = coord.centre();
        Position { x, y }
    }

    /// The grid cell containing this position.
    ///
    /// Fails with `OutOfBounds` for positions outside [0, width) x [0, height), NaN included.
    pub fn cell_in(&self, grid: &Grid) -> Result<Coordinate> {
        let (w, h) = (grid.width().0, grid.height().0);
        let inside = self.x >= 0.0 && self.y >= 0.0 && self.x < w as f64 && self.y < h as f64;
        if !inside {
            bail!(ErrorKind::OutOfBounds(self.x, self.y, w, h));
        }
        Ok(Coordinate::new(self.x.floor() as u32, self.y.floor() as u32))
    }

    pub fn distance_to(&self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Where the viewer stands and looks. Owned by the caller, the core only reads it.
///
/// Angles are radians measured from the +x (east) axis towards +y (south).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerPose {
    pub position: Position,
    facing: f64,
    pub field_of_view: f64,
}

impl ViewerPose {
    pub fn new(position: Position, facing: f64, field_of_view: f64) -> ViewerPose {
        ViewerPose {
            position,
            facing: normalize_angle(facing),
            field_of_view,
        }
    }

    /// Facing angle, always in [0, 2π).
    #[inline]
    pub fn facing(&self) -> f64 {
        self.facing
    }

    pub fn set_facing(&mut self, facing: f64) {
        self.facing = normalize_angle(facing);
    }
}

/// Wrap an angle into [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let wrapped = angle.rem_euclid(two_pi);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if wrapped >= two_pi {
        0.0
    } else {
        wrapped
    }
}
