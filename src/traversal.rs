//! Digital differential analysis over the grid's cell boundaries.
//!
//! A `GridRay` starts at a continuous position and yields every cell boundary it crosses,
//! nearest first, along with the exact distance travelled to reach it. It knows nothing
//! about walls: the raycaster stops at the first walled crossing, the visibility engine
//! stops once the ray passes its target.

use crate::cells::CompassPrimary;

const CORNER_EPSILON: f64 = 1e-9;

/// One boundary crossing, leaving cell `from` through its `direction` side into `to`.
///
/// Cell indices are signed since a ray may walk off the edge of an open grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Crossing {
    pub from: (i64, i64),
    pub to: (i64, i64),
    pub direction: CompassPrimary,
    /// Distance along the ray from its origin to the crossed boundary.
    pub distance: f64,
    /// The ray passes exactly through a cell corner here. The following crossing
    /// (on the other axis) happens at the same distance.
    pub corner: bool,
}

#[derive(Debug, Clone)]
pub struct GridRay {
    cell: (i64, i64),
    step_x: i64,
    step_y: i64,
    delta_dist_x: f64,
    delta_dist_y: f64,
    side_dist_x: f64,
    side_dist_y: f64,
    direction_x: f64,
    direction_y: f64,
}

impl GridRay {
    /// A ray at `angle` radians, measured from the +x axis towards +y (south).
    pub fn from_angle(origin_x: f64, origin_y: f64, angle: f64) -> GridRay {
        GridRay::from_direction(origin_x, origin_y, angle.cos(), angle.sin())
    }

    /// A ray along (dx, dy), which need not be normalised. A zero direction crosses nothing.
    ///
    /// An axis with no movement gets an infinite side distance, so it is never stepped.
    pub fn from_direction(origin_x: f64, origin_y: f64, dx: f64, dy: f64) -> GridRay {
        let length = (dx * dx + dy * dy).sqrt();
        let (direction_x, direction_y) = (dx / length, dy / length);

        let cell = (origin_x.floor() as i64, origin_y.floor() as i64);

        let (step_x, delta_dist_x, side_dist_x) = axis_setup(origin_x, cell.0, direction_x);
        let (step_y, delta_dist_y, side_dist_y) = axis_setup(origin_y, cell.1, direction_y);

        GridRay {
            cell,
            step_x,
            step_y,
            delta_dist_x,
            delta_dist_y,
            side_dist_x,
            side_dist_y,
            direction_x,
            direction_y,
        }
    }

    /// The unit direction of travel.
    pub fn direction(&self) -> (f64, f64) {
        (self.direction_x, self.direction_y)
    }

    /// The cell the ray is currently in.
    pub fn cell(&self) -> (i64, i64) {
        self.cell
    }
}

fn axis_setup(origin: f64, cell: i64, direction: f64) -> (i64, f64, f64) {
    if direction > 0.0 {
        let delta = 1.0 / direction;
        (1, delta, (cell as f64 + 1.0 - origin) * delta)
    } else if direction < 0.0 {
        let delta = -1.0 / direction;
        (-1, delta, (origin - cell as f64) * delta)
    } else {
        (0, std::f64::INFINITY, std::f64::INFINITY)
    }
}

impl Iterator for GridRay {
    type Item = Crossing;

    fn next(&mut self) -> Option<Crossing> {
        if self.side_dist_x.is_infinite() && self.side_dist_y.is_infinite() {
            return None;
        }

        let from = self.cell;
        let corner = (self.side_dist_x - self.side_dist_y).abs() < CORNER_EPSILON;

        let (direction, distance) = if self.side_dist_x <= self.side_dist_y {
            let distance = self.side_dist_x;
            self.side_dist_x += self.delta_dist_x;
            self.cell.0 += self.step_x;
            let direction = if self.step_x > 0 {
                CompassPrimary::East
            } else {
                CompassPrimary::West
            };
            (direction, distance)
        } else {
            let distance = self.side_dist_y;
            self.side_dist_y += self.delta_dist_y;
            self.cell.1 += self.step_y;
            let direction = if self.step_y > 0 {
                CompassPrimary::South
            } else {
                CompassPrimary::North
            };
            (direction, distance)
        };

        Some(Crossing {
            from,
            to: self.cell,
            direction,
            distance,
            corner,
        })
    }
}
