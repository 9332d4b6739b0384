//! Fog of war.
//!
//! A cell is visible when its centre lies within the vision radius (Euclidean distance from
//! the viewer's continuous position) and the straight segment from the viewer to that centre
//! crosses no wall. Every visible cell is also marked discovered on the grid, which is how
//! the fog remembers explored corridors between frames.

use log::trace;

use crate::cells::{CompassPrimary, Coordinate};
use crate::errors::*;
use crate::grid::Grid;
use crate::traversal::{Crossing, GridRay};
use crate::utils::{self, FnvHashSet};
use crate::viewer::Position;

pub type VisibleSet = FnvHashSet<Coordinate>;

// Fraction of the vision radius that is drawn at full brightness.
const FULL_BRIGHTNESS_FRACTION: f64 = 0.6;
const EDGE_BRIGHTNESS: f64 = 0.5;
const REMEMBERED_BRIGHTNESS: f64 = 0.2;

const SIGHT_EPSILON: f64 = 1e-9;

/// Cells currently visible from `viewer`, marking each of them discovered.
///
/// The viewer's own cell is always visible. A radius of zero or less (or NaN) sees only that cell.
pub fn compute_visible(grid: &mut Grid, viewer: Position, radius: f64) -> Result<VisibleSet> {
    let viewer_cell = viewer.cell_in(grid)?;

    let mut visible = utils::fnv_hashset(estimated_visible_count(radius));
    visible.insert(viewer_cell);

    if radius > 0.0 {
        let (w, h) = (grid.width().0 as i64, grid.height().0 as i64);
        let reach = radius.ceil().min((w + h) as f64) as i64;
        let (vx, vy) = (viewer_cell.x as i64, viewer_cell.y as i64);

        for y in (vy - reach).max(0)..=(vy + reach).min(h - 1) {
            for x in (vx - reach).max(0)..=(vx + reach).min(w - 1) {
                let candidate = Coordinate::new(x as u32, y as u32);
                if candidate == viewer_cell {
                    continue;
                }
                if viewer.distance_to(Position::centre_of(candidate)) > radius {
                    continue;
                }
                if has_line_of_sight(grid, viewer, candidate) {
                    visible.insert(candidate);
                }
            }
        }
    }

    for coord in &visible {
        grid.mark_discovered(*coord)?;
    }

    trace!("visibility from ({:.2}, {:.2}) radius {}: {} visible, {} discovered",
           viewer.x,
           viewer.y,
           radius,
           visible.len(),
           grid.discovered_count());
    Ok(visible)
}

fn estimated_visible_count(radius: f64) -> usize {
    if radius > 0.0 && radius < 64.0 {
        let r = radius.ceil() as usize;
        (2 * r + 1) * (2 * r + 1)
    } else {
        1
    }
}

/// Does the segment from `viewer` to the centre of `target` avoid every wall?
///
/// Where the segment passes exactly through a cell corner it is blocked only if both ways
/// around the corner are walled.
pub fn has_line_of_sight(grid: &Grid, viewer: Position, target: Coordinate) -> bool {
    let viewer_cell = match viewer.cell_in(grid) {
        Ok(cell) => cell,
        Err(_) => return false,
    };
    if viewer_cell == target {
        return true;
    }

    let target_position = Position::centre_of(target);
    let length = viewer.distance_to(target_position);
    let target_cell = (target.x as i64, target.y as i64);
    let mut ray = GridRay::from_direction(viewer.x,
                                          viewer.y,
                                          target_position.x - viewer.x,
                                          target_position.y - viewer.y);

    while let Some(crossing) = ray.next() {
        if crossing.distance > length + SIGHT_EPSILON {
            return false;
        }

        let landed = if crossing.corner {
            let second = match ray.next() {
                Some(second) => second,
                None => return false,
            };
            if !corner_open(grid, &crossing, &second) {
                return false;
            }
            second.to
        } else {
            if !passage_open(grid, crossing.from, crossing.direction) {
                return false;
            }
            crossing.to
        };

        if landed == target_cell {
            return true;
        }
    }
    false
}

fn passage_open(grid: &Grid, cell: (i64, i64), direction: CompassPrimary) -> bool {
    grid.coordinate_at(cell.0, cell.1)
        .map_or(false, |coord| grid.is_neighbour_linked(coord, direction))
}

fn corner_open(grid: &Grid, first: &Crossing, second: &Crossing) -> bool {
    let via_first = passage_open(grid, first.from, first.direction) &&
                    passage_open(grid, first.to, second.direction);
    let other_side = step(first.from, second.direction);
    let via_second = passage_open(grid, first.from, second.direction) &&
                     passage_open(grid, other_side, first.direction);
    via_first || via_second
}

fn step(cell: (i64, i64), direction: CompassPrimary) -> (i64, i64) {
    match direction {
        CompassPrimary::North => (cell.0, cell.1 - 1),
        CompassPrimary::South => (cell.0, cell.1 + 1),
        CompassPrimary::East => (cell.0 + 1, cell.1),
        CompassPrimary::West => (cell.0 - 1, cell.1),
    }
}

/// Shading level for drawing a cell under fog, from 1.0 (fully lit) to 0.0 (unknown).
///
/// Visible cells are fully lit out to 60% of the radius then fade linearly to 0.5 at the edge.
/// Discovered cells out of sight are dimmed to 0.2.
pub fn cell_visibility(grid: &Grid,
                       visible: &VisibleSet,
                       coord: Coordinate,
                       viewer: Position,
                       radius: f64)
                       -> f64 {
    if visible.contains(&coord) {
        let distance = viewer.distance_to(Position::centre_of(coord));
        let full_brightness = radius * FULL_BRIGHTNESS_FRACTION;
        if radius <= 0.0 || distance <= full_brightness {
            1.0
        } else {
            let fade = ((distance - full_brightness) / (radius - full_brightness)).min(1.0);
            1.0 - fade * (1.0 - EDGE_BRIGHTNESS)
        }
    } else if grid.is_discovered(coord) {
        REMEMBERED_BRIGHTNESS
    } else {
        0.0
    }
}
