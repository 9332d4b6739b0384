//! Thin pixel consumers of the core: a top-down map and a first person view, drawn into RGB
//! images that can be written out as PNG files.

use error_chain::bail;
use image::{Rgb, RgbImage};
use std::path::Path;

use crate::cells::{CompassPrimary, Coordinate};
use crate::errors::*;
use crate::grid::Grid;
use crate::raycaster::RayHit;
use crate::utils::{self, FnvHashSet};
use crate::visibility::{cell_visibility, VisibleSet};
use crate::viewer::Position;

const WALL: Rgb<u8> = Rgb([0x20, 0x20, 0x30]);
const FLOOR: Rgb<u8> = Rgb([0xee, 0xee, 0xe4]);
const PATH: Rgb<u8> = Rgb([0x4a, 0x90, 0xd9]);
const VIEWER: Rgb<u8> = Rgb([0xd9, 0x3a, 0x3a]);
const CEILING: Rgb<u8> = Rgb([0x30, 0x30, 0x40]);
const GROUND: Rgb<u8> = Rgb([0x5a, 0x50, 0x46]);
const WALL_NORTH_SOUTH: Rgb<u8> = Rgb([0xb4, 0xb4, 0xc8]);
const WALL_EAST_WEST: Rgb<u8> = Rgb([0x82, 0x82, 0x96]);

// 1 GiB of RGB pixels
const MAX_IMAGE_BYTES: u64 = 1 << 30;

/// What the viewer currently sees, for shading the top-down map.
#[derive(Debug, Copy, Clone)]
pub struct FogView<'a> {
    pub visible: &'a VisibleSet,
    pub viewer: Position,
    pub radius: f64,
}

/// The maze from above, `cell_pixels` square per cell.
///
/// With fog, cells are darkened by their visibility level and the viewer is marked. Walls of
/// cells never discovered are hidden along with their floor.
/// Fails if the image would be too large to address.
pub fn render_top_down(grid: &Grid,
                       cell_pixels: u32,
                       fog: Option<&FogView>,
                       path: Option<&[Coordinate]>)
                       -> Result<RgbImage> {
    let cell_pixels = cell_pixels.max(2);
    let image_side = |cells: u32| cells.checked_mul(cell_pixels).and_then(|pixels| pixels.checked_add(1));
    let (img_width, img_height) = match (image_side(grid.width().0), image_side(grid.height().0)) {
        (Some(w), Some(h)) if (w as u64) * (h as u64) * 3 <= MAX_IMAGE_BYTES => (w, h),
        _ => bail!("a {}x{} map at {} pixels per cell is too large to render",
                   grid.width().0,
                   grid.height().0,
                   cell_pixels),
    };
    let mut img = RgbImage::from_pixel(img_width, img_height, Rgb([0, 0, 0]));

    let on_path: FnvHashSet<Coordinate> = utils::fnv_hashset_of(path.unwrap_or(&[]));

    for cell in grid.iter() {
        let shade = fog.map_or(1.0, |f| cell_visibility(grid, f.visible, cell, f.viewer, f.radius));
        if shade <= 0.0 {
            continue;
        }

        let x1 = cell.x * cell_pixels;
        let y1 = cell.y * cell_pixels;
        let x2 = x1 + cell_pixels;
        let y2 = y1 + cell_pixels;

        let floor = if on_path.contains(&cell) { PATH } else { FLOOR };
        fill_rect(&mut img, x1, y1, x2, y2, shaded(floor, shade));

        // Each cell draws its own four sides so that fogged neighbours don't hide them.
        let wall = |dir| !grid.is_neighbour_linked(cell, dir);
        if wall(CompassPrimary::North) {
            draw_horizontal(&mut img, x1, x2, y1, WALL);
        }
        if wall(CompassPrimary::South) {
            draw_horizontal(&mut img, x1, x2, y2, WALL);
        }
        if wall(CompassPrimary::West) {
            draw_vertical(&mut img, x1, y1, y2, WALL);
        }
        if wall(CompassPrimary::East) {
            draw_vertical(&mut img, x2, y1, y2, WALL);
        }
    }

    if let Some(f) = fog {
        let centre_x = (f.viewer.x * cell_pixels as f64) as u32;
        let centre_y = (f.viewer.y * cell_pixels as f64) as u32;
        let half = (cell_pixels / 4).max(1);
        fill_rect(&mut img,
                  centre_x.saturating_sub(half),
                  centre_y.saturating_sub(half),
                  centre_x + half,
                  centre_y + half,
                  VIEWER);
    }

    Ok(img)
}

/// One image column per ray hit, wall slices scaled by the inverse of their corrected distance.
/// North/south faces are drawn lighter than east/west ones and everything fades with distance.
pub fn render_first_person(hits: &[RayHit], screen_height: u32) -> RgbImage {
    let screen_width = hits.len() as u32;
    let mut img = RgbImage::new(screen_width.max(1), screen_height.max(1));
    let horizon = screen_height / 2;

    for (column, hit) in hits.iter().enumerate() {
        let column = column as u32;
        let distance = hit.distance.max(1e-3);
        let slice_height = ((screen_height as f64 / distance) as u32).min(screen_height);
        let top = horizon.saturating_sub(slice_height / 2);
        let bottom = (top + slice_height).min(screen_height);

        let base = if hit.is_vertical_wall() {
            WALL_EAST_WEST
        } else {
            WALL_NORTH_SOUTH
        };
        let fade = (1.0 / (1.0 + distance * 0.15)).max(0.25);

        for y in 0..screen_height {
            let colour = if y < top {
                CEILING
            } else if y < bottom {
                shaded(base, fade)
            } else {
                GROUND
            };
            img.put_pixel(column, y, colour);
        }
    }
    img
}

pub fn save_png<P: AsRef<Path>>(img: &RgbImage, path: P) -> Result<()> {
    img.save(path)?;
    Ok(())
}

fn shaded(colour: Rgb<u8>, level: f64) -> Rgb<u8> {
    let level = level.max(0.0).min(1.0);
    let Rgb([r, g, b]) = colour;
    let scale = |c: u8| (c as f64 * level).round() as u8;
    Rgb([scale(r), scale(g), scale(b)])
}

fn fill_rect(img: &mut RgbImage, x1: u32, y1: u32, x2: u32, y2: u32, colour: Rgb<u8>) {
    for y in y1..y2.min(img.height()) {
        for x in x1..x2.min(img.width()) {
            img.put_pixel(x, y, colour);
        }
    }
}

fn draw_horizontal(img: &mut RgbImage, x1: u32, x2: u32, y: u32, colour: Rgb<u8>) {
    if y < img.height() {
        for x in x1..=x2.min(img.width() - 1) {
            img.put_pixel(x, y, colour);
        }
    }
}

fn draw_vertical(img: &mut RgbImage, x: u32, y1: u32, y2: u32, colour: Rgb<u8>) {
    if x < img.width() {
        for y in y1..=y2.min(img.height() - 1) {
            img.put_pixel(x, y, colour);
        }
    }
}
