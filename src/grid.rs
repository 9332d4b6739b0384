use bit_set::BitSet;
use error_chain::bail;
use rand::Rng;
use smallvec::SmallVec;
use std::fmt;

use crate::cells::{Cell, CompassPrimary, Coordinate, COMPASS_PRIMARY_DIRECTIONS};
use crate::errors::*;
use crate::grid_iterators::{BatchIter, BatchIterType, CellIter};
use crate::units::{Height, Width};

pub type CoordinateSmallVec = SmallVec<[Coordinate; 4]>;
pub type CoordinateOptionSmallVec = SmallVec<[Option<Coordinate>; 4]>;
type PassageSmallVec = SmallVec<[(Coordinate, Coordinate); 2]>;

/// A rectangular maze: one `Cell` per coordinate stored densely in row-major order.
///
/// Wall removal always updates both sides of a shared wall, so the wall flags of adjacent
/// cells stay symmetric. The outer boundary walls are never removed through this API.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Grid :: width: {:?}, height: {:?}, passages: {:?}",
               self.width,
               self.height,
               self.passages_count())
    }
}

impl Grid {
    /// A fully walled grid with no visited or discovered cells.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);
        if w <= 1 || h <= 1 {
            bail!(ErrorKind::InvalidDimension(w, h));
        }
        let cells_count = (w as usize)
            .checked_mul(h as usize)
            .ok_or_else(|| Error::from(ErrorKind::InvalidDimension(w, h)))?;

        // too many cells to address or to allocate
        let mut cells = Vec::new();
        cells.try_reserve_exact(cells_count)
            .map_err(|_| Error::from(ErrorKind::InvalidDimension(w, h)))?;
        cells.resize(cells_count, Cell::default());

        Ok(Grid {
            width: w,
            height: h,
            cells,
        })
    }

    /// Rebuild a grid from raw cells. The caller is responsible for wall symmetry.
    pub(crate) fn from_cells(width: Width, height: Height, cells: Vec<Cell>) -> Result<Grid> {
        let mut grid = Grid::new(width, height)?;
        if cells.len() != grid.cells.len() {
            bail!(ErrorKind::MalformedSnapshot(format!("expected {} cells, found {}",
                                                       grid.cells.len(),
                                                       cells.len())));
        }
        grid.cells = cells;
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> Width {
        Width(self.width)
    }

    #[inline]
    pub fn height(&self) -> Height {
        Height(self.height)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Coordinate) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Coordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    /// The coordinate for possibly negative or oversized cell indices, if inside the grid.
    #[inline]
    pub fn coordinate_at(&self, x: i64, y: i64) -> Option<Coordinate> {
        if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
            Some(Coordinate::new(x as u32, y as u32))
        } else {
            None
        }
    }

    pub fn cell(&self, coord: Coordinate) -> Result<&Cell> {
        match self.grid_coordinate_to_index(coord) {
            Some(index) => Ok(&self.cells[index]),
            None => Err(self.out_of_bounds(coord)),
        }
    }

    fn cell_mut(&mut self, coord: Coordinate) -> Result<&mut Cell> {
        match self.grid_coordinate_to_index(coord) {
            Some(index) => Ok(&mut self.cells[index]),
            None => Err(self.out_of_bounds(coord)),
        }
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn out_of_bounds(&self, coord: Coordinate) -> Error {
        ErrorKind::OutOfBounds(coord.x as f64, coord.y as f64, self.width, self.height).into()
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Coordinate {
        let index = rng.gen_range(0..self.size());
        Coordinate::from_row_major_index(index, self.width())
    }

    /// Cells that are to the North, South, East or West of a particular cell, but not
    /// necessarily joined by a passage.
    pub fn neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        COMPASS_PRIMARY_DIRECTIONS.iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn neighbours_at_directions(&self,
                                    coord: Coordinate,
                                    dirs: &[CompassPrimary])
                                    -> CoordinateOptionSmallVec {
        dirs.iter()
            .map(|direction| self.neighbour_at_direction(coord, *direction))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Coordinate,
                                  direction: CompassPrimary)
                                  -> Option<Coordinate> {
        if !self.is_valid_coordinate(coord) {
            return None;
        }
        coord.offset(direction).filter(|neighbour| self.is_valid_coordinate(*neighbour))
    }

    /// The side of `a` that faces `b`.
    ///
    /// Fails with `OutOfBounds` if either coordinate is outside the grid, `NotAdjacent` unless
    /// the two cells differ by exactly one step along exactly one axis.
    pub fn direction_between(&self, a: Coordinate, b: Coordinate) -> Result<CompassPrimary> {
        if !self.is_valid_coordinate(a) {
            return Err(self.out_of_bounds(a));
        }
        if !self.is_valid_coordinate(b) {
            return Err(self.out_of_bounds(b));
        }
        let dx = b.x as i64 - a.x as i64;
        let dy = b.y as i64 - a.y as i64;
        match (dx, dy) {
            (0, -1) => Ok(CompassPrimary::North),
            (0, 1) => Ok(CompassPrimary::South),
            (1, 0) => Ok(CompassPrimary::East),
            (-1, 0) => Ok(CompassPrimary::West),
            _ => bail!(ErrorKind::NotAdjacent(a, b)),
        }
    }

    /// Does a wall separate two adjacent cells?
    pub fn wall_between(&self, a: Coordinate, b: Coordinate) -> Result<bool> {
        let dir = self.direction_between(a, b)?;
        Ok(self.cell(a)?.has_wall(dir))
    }

    /// The wall flag on one side of a cell, boundary sides included.
    #[inline]
    pub fn has_wall(&self, coord: Coordinate, dir: CompassPrimary) -> Result<bool> {
        Ok(self.cell(coord)?.has_wall(dir))
    }

    /// Knock down the wall between two adjacent cells, on both sides. No-op if already open.
    pub fn remove_wall(&mut self, a: Coordinate, b: Coordinate) -> Result<()> {
        let dir = self.direction_between(a, b)?;
        self.cell_mut(a)?.set_wall(dir, false);
        self.cell_mut(b)?.set_wall(dir.opposite(), false);
        Ok(())
    }

    /// Cells that are joined to a particular cell by a passage.
    pub fn links(&self, coord: Coordinate) -> Option<CoordinateSmallVec> {
        let cell = self.cell(coord).ok()?;
        let linked_cells = COMPASS_PRIMARY_DIRECTIONS.iter()
            .filter(|dir| !cell.has_wall(**dir))
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect();
        Some(linked_cells)
    }

    /// Are two cells in the grid joined by a passage?
    pub fn is_linked(&self, a: Coordinate, b: Coordinate) -> bool {
        self.wall_between(a, b).map_or(false, |wall| !wall)
    }

    /// Is there a passage from `coord` into an in-grid neighbour at `direction`?
    pub fn is_neighbour_linked(&self, coord: Coordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false, |neighbour_coord| self.is_linked(coord, neighbour_coord))
    }

    /// Every passage once, as (cell, east or south neighbour) pairs in row-major order.
    pub fn iter_passages(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        self.iter().flat_map(move |coord| {
            [CompassPrimary::East, CompassPrimary::South]
                .iter()
                .filter(|dir| self.is_neighbour_linked(coord, **dir))
                .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
                .map(|neighbour| (coord, neighbour))
                .collect::<PassageSmallVec>()
        })
    }

    /// Number of removed-wall pairs between in-grid cells.
    pub fn passages_count(&self) -> usize {
        self.iter_passages().count()
    }

    /// True iff every wall on the outer edge of the grid is present.
    pub fn is_boundary_walled(&self) -> bool {
        self.iter().all(|coord| {
            COMPASS_PRIMARY_DIRECTIONS.iter()
                .filter(|dir| self.neighbour_at_direction(coord, **dir).is_none())
                .all(|dir| self.cells[self.index_unchecked(coord)].has_wall(*dir))
        })
    }

    /// Flood fill from the first cell: true iff every cell is reachable through passages.
    pub fn is_connected(&self) -> bool {
        let start = Coordinate::new(0, 0);
        let mut seen = BitSet::with_capacity(self.size());
        seen.insert(0);
        let mut frontier = vec![start];

        while let Some(coord) = frontier.pop() {
            if let Some(links) = self.links(coord) {
                for linked in links.iter() {
                    let index = self.index_unchecked(*linked);
                    if seen.insert(index) {
                        frontier.push(*linked);
                    }
                }
            }
        }

        seen.len() == self.size()
    }

    #[inline]
    fn index_unchecked(&self, coord: Coordinate) -> usize {
        coord.y as usize * self.width as usize + coord.x as usize
    }

    pub fn mark_visited(&mut self, coord: Coordinate) -> Result<()> {
        self.cell_mut(coord)?.visited = true;
        Ok(())
    }

    #[inline]
    pub fn is_visited(&self, coord: Coordinate) -> bool {
        self.cell(coord).map_or(false, Cell::is_visited)
    }

    pub fn all_visited(&self) -> bool {
        self.cells.iter().all(Cell::is_visited)
    }

    /// Marks a cell as seen. Discovery is never undone except by `clear_discovered`.
    pub fn mark_discovered(&mut self, coord: Coordinate) -> Result<()> {
        self.cell_mut(coord)?.discovered = true;
        Ok(())
    }

    #[inline]
    pub fn is_discovered(&self, coord: Coordinate) -> bool {
        self.cell(coord).map_or(false, Cell::is_discovered)
    }

    pub fn discovered_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.discovered).count()
    }

    pub fn iter_discovered(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.iter().filter(move |coord| self.cells[self.index_unchecked(*coord)].discovered)
    }

    /// Discover every cell at once (x-ray vision).
    pub fn reveal_all(&mut self) {
        for cell in &mut self.cells {
            cell.discovered = true;
        }
    }

    /// Forget all discovered cells, for an explicit level reset.
    pub fn clear_discovered(&mut self) {
        for cell in &mut self.cells {
            cell.discovered = false;
        }
    }

    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(self.width(), self.size())
    }

    #[inline]
    pub fn iter_row(&self) -> BatchIter {
        BatchIter::new(BatchIterType::Row, self.width(), self.height())
    }

    #[inline]
    pub fn iter_column(&self) -> BatchIter {
        BatchIter::new(BatchIterType::Column, self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {

    use itertools::Itertools;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;
    use std::u32;

    use super::*;

    fn small_grid(w: u32, h: u32) -> Grid {
        Grid::new(Width(w), Height(h)).expect("valid grid dimensions")
    }

    fn gc(x: u32, y: u32) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn too_small_dimensions_are_rejected() {
        for &(w, h) in &[(0, 5), (1, 5), (5, 1), (5, 0), (1, 1)] {
            match Grid::new(Width(w), Height(h)) {
                Err(Error(ErrorKind::InvalidDimension(ew, eh), _)) => assert_eq!((ew, eh), (w, h)),
                other => panic!("expected InvalidDimension, got {:?}", other),
            }
        }
        assert!(Grid::new(Width(2), Height(2)).is_ok());
    }

    #[test]
    fn unallocatable_dimensions_are_rejected() {
        match Grid::new(Width(u32::MAX), Height(u32::MAX)) {
            Err(Error(ErrorKind::InvalidDimension(w, h), _)) => assert_eq!((w, h), (u32::MAX, u32::MAX)),
            other => panic!("expected InvalidDimension, got {:?}", other),
        }
    }

    #[test]
    fn new_grid_is_fully_walled() {
        let g = small_grid(4, 3);
        for coord in g.iter() {
            let cell = g.cell(coord).unwrap();
            assert_eq!(cell.exits_count(), 0);
            assert!(!cell.is_visited());
            assert!(!cell.is_discovered());
        }
        assert_eq!(g.passages_count(), 0);
        assert!(g.is_boundary_walled());
        assert!(!g.is_connected());
    }

    #[test]
    fn neighbour_cells() {
        let g = small_grid(10, 10);

        let check_expected_neighbours = |coord, expected_neighbours: &[Coordinate]| {
            let neighbours: Vec<Coordinate> = g.neighbours(coord).iter().cloned().sorted().collect();
            let expected: Vec<Coordinate> = expected_neighbours.iter().cloned().sorted().collect();
            assert_eq!(neighbours, expected);
        };

        // corners
        check_expected_neighbours(gc(0, 0), &[gc(1, 0), gc(0, 1)]);
        check_expected_neighbours(gc(9, 0), &[gc(8, 0), gc(9, 1)]);
        check_expected_neighbours(gc(0, 9), &[gc(0, 8), gc(1, 9)]);
        check_expected_neighbours(gc(9, 9), &[gc(9, 8), gc(8, 9)]);

        // side element examples
        check_expected_neighbours(gc(1, 0), &[gc(0, 0), gc(1, 1), gc(2, 0)]);
        check_expected_neighbours(gc(0, 1), &[gc(0, 0), gc(0, 2), gc(1, 1)]);
        check_expected_neighbours(gc(9, 8), &[gc(9, 7), gc(9, 9), gc(8, 8)]);

        // Some place with 4 neighbours inside the grid
        check_expected_neighbours(gc(1, 1), &[gc(0, 1), gc(1, 0), gc(2, 1), gc(1, 2)]);
    }

    #[test]
    fn neighbours_at_dirs() {
        let g = small_grid(2, 2);
        let check_neighbours = |coord, dirs: &[CompassPrimary], neighbour_opts: &[Option<Coordinate>]| {
            let neighbour_options = g.neighbours_at_directions(coord, dirs);
            assert_eq!(&*neighbour_options, neighbour_opts);
        };
        check_neighbours(gc(0, 0), &[], &[]);
        check_neighbours(gc(0, 0), &[CompassPrimary::North], &[None]);
        check_neighbours(gc(0, 0),
                         &[CompassPrimary::East, CompassPrimary::South],
                         &[Some(gc(1, 0)), Some(gc(0, 1))]);
        check_neighbours(gc(1, 1),
                         &[CompassPrimary::South, CompassPrimary::East],
                         &[None, None]);
        check_neighbours(gc(1, 1),
                         &[CompassPrimary::West, CompassPrimary::North],
                         &[Some(gc(0, 1)), Some(gc(1, 0))]);
    }

    #[test]
    fn grid_coordinate_as_index() {
        let g = small_grid(3, 3);
        let indices: Vec<Option<usize>> = g.iter().map(|coord| g.grid_coordinate_to_index(coord)).collect();
        let expected = (0..9).map(Some).collect::<Vec<Option<usize>>>();
        assert_eq!(expected, indices);

        assert_eq!(g.grid_coordinate_to_index(gc(2, 3)), None);
        assert_eq!(g.grid_coordinate_to_index(gc(3, 2)), None);
        assert_eq!(g.grid_coordinate_to_index(gc(u32::MAX, u32::MAX)), None);
    }

    #[test]
    fn random_cell() {
        let g = small_grid(4, 3);
        let mut rng = XorShiftRng::seed_from_u64(7);
        for _ in 0..1000 {
            let coord = g.random_cell(&mut rng);
            assert!(g.is_valid_coordinate(coord));
        }
    }

    #[test]
    fn wall_between_validates_input() {
        let g = small_grid(3, 3);

        match g.wall_between(gc(0, 0), gc(3, 0)) {
            Err(Error(ErrorKind::OutOfBounds(..), _)) => (),
            other => panic!("expected OutOfBounds, got {:?}", other),
        }
        match g.wall_between(gc(5, 5), gc(0, 0)) {
            Err(Error(ErrorKind::OutOfBounds(..), _)) => (),
            other => panic!("expected OutOfBounds, got {:?}", other),
        }
        // diagonal, two apart and identical cells are not adjacent
        for &(a, b) in &[(gc(0, 0), gc(1, 1)), (gc(0, 0), gc(2, 0)), (gc(1, 1), gc(1, 1))] {
            match g.wall_between(a, b) {
                Err(Error(ErrorKind::NotAdjacent(ea, eb), _)) => assert_eq!((ea, eb), (a, b)),
                other => panic!("expected NotAdjacent, got {:?}", other),
            }
        }
        assert_eq!(g.wall_between(gc(0, 0), gc(1, 0)).unwrap(), true);
    }

    #[test]
    fn removing_walls_is_symmetric() {
        let mut g = small_grid(4, 4);
        let a = gc(0, 1);
        let b = gc(0, 2);
        let c = gc(0, 3);

        let sorted_links = |grid: &Grid, coord| -> Vec<Coordinate> {
            grid.links(coord).expect("coordinate is invalid").iter().cloned().sorted().collect()
        };

        assert!(!g.is_linked(a, b));
        assert!(sorted_links(&g, a).is_empty());

        g.remove_wall(a, b).expect("remove wall failed");
        assert!(g.is_linked(a, b) && g.is_linked(b, a));
        assert_eq!(g.wall_between(a, b).unwrap(), g.wall_between(b, a).unwrap());
        assert!(!g.cell(a).unwrap().has_wall(CompassPrimary::South));
        assert!(!g.cell(b).unwrap().has_wall(CompassPrimary::North));
        assert_eq!(sorted_links(&g, a), vec![b]);
        assert_eq!(sorted_links(&g, b), vec![a]);

        g.remove_wall(c, b).expect("remove wall failed");
        assert_eq!(sorted_links(&g, b), vec![a, c]);
        assert!(!g.is_linked(a, c));
        assert!(g.is_neighbour_linked(b, CompassPrimary::North));
        assert!(g.is_neighbour_linked(b, CompassPrimary::South));
        assert!(!g.is_neighbour_linked(b, CompassPrimary::East));

        // removing an absent wall changes nothing
        let before = g.clone();
        g.remove_wall(b, a).expect("remove wall failed");
        assert_eq!(before, g);
        assert_eq!(g.passages_count(), 2);
        assert!(g.is_boundary_walled());
    }

    #[test]
    fn connectivity_of_a_hand_carved_grid() {
        let mut g = small_grid(2, 2);
        g.remove_wall(gc(0, 0), gc(1, 0)).unwrap();
        g.remove_wall(gc(1, 0), gc(1, 1)).unwrap();
        assert!(!g.is_connected());
        g.remove_wall(gc(1, 1), gc(0, 1)).unwrap();
        assert!(g.is_connected());
        assert_eq!(g.iter_passages().collect::<Vec<_>>(),
                   vec![(gc(0, 0), gc(1, 0)), (gc(1, 0), gc(1, 1)), (gc(0, 1), gc(1, 1))]);
    }

    #[test]
    fn discovered_markers() {
        let mut g = small_grid(3, 2);
        g.mark_discovered(gc(2, 1)).unwrap();
        g.mark_discovered(gc(0, 0)).unwrap();
        assert_eq!(g.discovered_count(), 2);
        assert_eq!(g.iter_discovered().collect::<Vec<_>>(), vec![gc(0, 0), gc(2, 1)]);
        assert!(g.mark_discovered(gc(3, 0)).is_err());

        g.reveal_all();
        assert_eq!(g.discovered_count(), 6);
        g.clear_discovered();
        assert_eq!(g.discovered_count(), 0);
    }

    #[test]
    fn cell_iter() {
        let g = small_grid(2, 2);
        assert_eq!(g.iter().collect::<Vec<Coordinate>>(),
                   &[gc(0, 0), gc(1, 0), gc(0, 1), gc(1, 1)]);
    }

    #[test]
    fn row_and_column_iter() {
        let g = small_grid(2, 3);
        assert_eq!(g.iter_row().collect::<Vec<Vec<Coordinate>>>(),
                   vec![vec![gc(0, 0), gc(1, 0)], vec![gc(0, 1), gc(1, 1)], vec![gc(0, 2), gc(1, 2)]]);
        assert_eq!(g.iter_column().collect::<Vec<Vec<Coordinate>>>(),
                   vec![vec![gc(0, 0), gc(0, 1), gc(0, 2)], vec![gc(1, 0), gc(1, 1), gc(1, 2)]]);
    }
}
