use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::units::{ColumnIndex, RowIndex, Width};

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub fn new(x: u32, y: u32) -> Coordinate {
        Coordinate { x, y }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, width: Width) -> Coordinate {
        let Width(w) = width;
        let x = index % w as usize;
        let y = index / w as usize;
        Coordinate::new(x as u32, y as u32)
    }

    #[inline]
    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> Coordinate {
        let (ColumnIndex(col), RowIndex(row)) = (col_index, row_index);
        Coordinate::new(col, row)
    }

    /// The continuous position of this cell's centre in grid-cell units.
    #[inline]
    pub fn centre(&self) -> (f64, f64) {
        (self.x as f64 + 0.5, self.y as f64 + 0.5)
    }

    /// Creates a new `Coordinate` offset 1 cell away in the given direction.
    /// Returns None if the `Coordinate` is not representable (north of row 0, west of column 0).
    /// Whether the result is inside a particular grid is for the grid to decide.
    pub fn offset(&self, dir: CompassPrimary) -> Option<Coordinate> {
        let (x, y) = (self.x, self.y);
        match dir {
            CompassPrimary::North => y.checked_sub(1).map(|ny| Coordinate::new(x, ny)),
            CompassPrimary::South => y.checked_add(1).map(|ny| Coordinate::new(x, ny)),
            CompassPrimary::East => x.checked_add(1).map(|nx| Coordinate::new(nx, y)),
            CompassPrimary::West => x.checked_sub(1).map(|nx| Coordinate::new(nx, y)),
        }
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from(x_y_pair: (u32, u32)) -> Coordinate {
        Coordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

/// Wall sides of a cell. North is towards row 0, west towards column 0.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

pub const COMPASS_PRIMARY_DIRECTIONS: [CompassPrimary; 4] = [CompassPrimary::North,
                                                             CompassPrimary::South,
                                                             CompassPrimary::East,
                                                             CompassPrimary::West];

impl CompassPrimary {
    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    /// North and South walls run horizontally, East and West walls run vertically.
    pub fn is_vertical_axis(self) -> bool {
        match self {
            CompassPrimary::North | CompassPrimary::South => true,
            CompassPrimary::East | CompassPrimary::West => false,
        }
    }

    pub fn rand_direction<R: Rng>(rng: &mut R) -> CompassPrimary {
        COMPASS_PRIMARY_DIRECTIONS[rng.gen_range(0..COMPASS_PRIMARY_DIRECTIONS.len())]
    }

    pub fn rand_vertical_direction<R: Rng>(rng: &mut R) -> CompassPrimary {
        if rng.gen() {
            CompassPrimary::North
        } else {
            CompassPrimary::South
        }
    }

    pub fn rand_horizontal_direction<R: Rng>(rng: &mut R) -> CompassPrimary {
        if rng.gen() {
            CompassPrimary::East
        } else {
            CompassPrimary::West
        }
    }
}

/// One maze cell: four wall flags plus the generation and fog of war markers.
///
/// Cells only ever live inside a `Grid`, which keeps the wall flags of adjacent cells symmetric.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Cell {
    pub(crate) north: bool,
    pub(crate) south: bool,
    pub(crate) east: bool,
    pub(crate) west: bool,
    pub(crate) visited: bool,
    pub(crate) discovered: bool,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell {
            north: true,
            south: true,
            east: true,
            west: true,
            visited: false,
            discovered: false,
        }
    }
}

impl Cell {
    #[inline]
    pub fn has_wall(&self, dir: CompassPrimary) -> bool {
        match dir {
            CompassPrimary::North => self.north,
            CompassPrimary::South => self.south,
            CompassPrimary::East => self.east,
            CompassPrimary::West => self.west,
        }
    }

    #[inline]
    pub(crate) fn set_wall(&mut self, dir: CompassPrimary, present: bool) {
        match dir {
            CompassPrimary::North => self.north = present,
            CompassPrimary::South => self.south = present,
            CompassPrimary::East => self.east = present,
            CompassPrimary::West => self.west = present,
        }
    }

    /// Number of open sides, a dead end has exactly one.
    pub fn exits_count(&self) -> usize {
        COMPASS_PRIMARY_DIRECTIONS.iter().filter(|dir| !self.has_wall(**dir)).count()
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[inline]
    pub fn is_discovered(&self) -> bool {
        self.discovered
    }
}
