//! First person projection of the maze: one DDA ray per screen column.

use error_chain::bail;
use log::{trace, warn};
use std::f64::consts::PI;

use crate::cells::{CompassPrimary, Coordinate};
use crate::errors::*;
use crate::grid::Grid;
use crate::traversal::GridRay;
use crate::viewer::{normalize_angle, Position, ViewerPose};

pub const DEFAULT_MAX_RAY_STEPS: usize = 4096;

/// Closest a wall is ever reported, for a viewer standing exactly on a walled boundary line.
pub const MIN_HIT_DISTANCE: f64 = 1e-6;

/// Where a single ray stopped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    /// Distance projected onto the facing direction, free of fisheye distortion.
    pub distance: f64,
    /// Euclidean distance from the viewer to the struck wall along the ray.
    pub raw_distance: f64,
    /// The wall of `cell` that stopped the ray.
    pub side: CompassPrimary,
    /// The cell the ray was in when it struck the wall.
    pub cell: Coordinate,
    pub angle: f64,
    /// Horizontal texture coordinate in [0, 1] along the struck wall, left to right as seen
    /// by the viewer.
    pub wall_offset: f64,
}

impl RayHit {
    /// The direction the visible face of the struck wall looks towards.
    pub fn face(&self) -> CompassPrimary {
        self.side.opposite()
    }

    /// East and west walls run along the y axis.
    pub fn is_vertical_wall(&self) -> bool {
        !self.side.is_vertical_axis()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Raycaster {
    max_steps: usize,
}

impl Default for Raycaster {
    fn default() -> Raycaster {
        Raycaster { max_steps: DEFAULT_MAX_RAY_STEPS }
    }
}

impl Raycaster {
    /// A raycaster giving up on a ray after `max_steps` boundary crossings.
    ///
    /// The bound is raised to `width + height + 2` for larger grids, the most crossings a ray can
    /// make before reaching the outer boundary.
    pub fn with_max_steps(max_steps: usize) -> Raycaster {
        Raycaster { max_steps }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// One hit per screen column, left to right.
    ///
    /// Column `i` looks along `facing - fov/2 + (i / screen_width) * fov`.
    /// Fails with `InvalidFieldOfView` unless the field of view is within (0, π).
    pub fn cast_all(&self, grid: &Grid, pose: &ViewerPose, screen_width: usize) -> Result<Vec<RayHit>> {
        let facing = pose.facing();
        let fov = pose.field_of_view;
        if fov.is_nan() || fov <= 0.0 || fov >= PI {
            bail!(ErrorKind::InvalidFieldOfView(fov));
        }
        let start_angle = facing - fov / 2.0;

        let hits = (0..screen_width)
            .map(|column| {
                let angle = start_angle + (column as f64 / screen_width as f64) * fov;
                self.cast_ray(grid, pose.position, angle, facing, column)
            })
            .collect::<Result<Vec<RayHit>>>()?;

        trace!("cast {} rays from ({:.2}, {:.2}) facing {:.3}",
               hits.len(),
               pose.position.x,
               pose.position.y,
               facing);
        Ok(hits)
    }

    /// Cast a single ray at `angle`, correcting its distance against `facing`.
    ///
    /// `column` only labels the error if the ray never meets a wall. The ray must point less
    /// than a quarter turn away from `facing`, otherwise its corrected distance is not positive.
    pub fn cast_ray(&self,
                    grid: &Grid,
                    origin: Position,
                    angle: f64,
                    facing: f64,
                    column: usize)
                    -> Result<RayHit> {
        origin.cell_in(grid)?;

        let correction = (angle - facing).cos();
        if correction.is_nan() || correction <= 0.0 {
            let offset = normalize_angle(angle - facing);
            bail!(ErrorKind::InvalidFieldOfView(2.0 * offset.min(2.0 * PI - offset)));
        }

        let (w, h) = (grid.width().0 as usize, grid.height().0 as usize);
        let max_steps = self.max_steps.max(w + h + 2);

        let ray = GridRay::from_angle(origin.x, origin.y, angle);
        let (dir_x, dir_y) = ray.direction();

        for crossing in ray.take(max_steps) {
            let struck = grid.coordinate_at(crossing.from.0, crossing.from.1)
                .filter(|coord| {
                    grid.cell(*coord).map_or(false, |cell| cell.has_wall(crossing.direction))
                });

            if let Some(cell) = struck {
                let hit_x = origin.x + crossing.distance * dir_x;
                let hit_y = origin.y + crossing.distance * dir_y;
                let raw_distance = crossing.distance.max(MIN_HIT_DISTANCE);
                return Ok(RayHit {
                    distance: raw_distance * correction,
                    raw_distance,
                    side: crossing.direction,
                    cell,
                    angle,
                    wall_offset: wall_offset(hit_x, hit_y, crossing.direction),
                });
            }
        }

        warn!("ray for column {} at angle {:.4} from ({:.2}, {:.2}) hit no wall in {} steps",
              column,
              angle,
              origin.x,
              origin.y,
              max_steps);
        bail!(ErrorKind::RayEscapedBounds(column, max_steps))
    }
}

/// `Raycaster::cast_all` with the default step bound.
pub fn cast_all(grid: &Grid, pose: &ViewerPose, screen_width: usize) -> Result<Vec<RayHit>> {
    Raycaster::default().cast_all(grid, pose, screen_width)
}

fn wall_offset(hit_x: f64, hit_y: f64, side: CompassPrimary) -> f64 {
    let along = if side.is_vertical_axis() { hit_x } else { hit_y };
    let offset = along - along.floor();
    // faces looking east or south are seen mirrored
    match side.opposite() {
        CompassPrimary::East | CompassPrimary::South => 1.0 - offset,
        CompassPrimary::North | CompassPrimary::West => offset,
    }
}
