//! Plain data copy of a grid: enough to rebuild it exactly without replaying generation.

use error_chain::bail;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::cells::{Cell, COMPASS_PRIMARY_DIRECTIONS};
use crate::errors::*;
use crate::grid::Grid;
use crate::units::{Height, Width};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
    #[serde(default)]
    pub discovered: bool,
}

/// Cells are stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CellSnapshot>,
}

impl GridSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<GridSnapshot> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<GridSnapshot> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_json(BufWriter::new(file))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<GridSnapshot> {
        let file = File::open(path)?;
        GridSnapshot::read_json(BufReader::new(file))
    }
}

impl Grid {
    pub fn snapshot(&self) -> GridSnapshot {
        let cells = self.cells()
            .iter()
            .map(|cell| {
                CellSnapshot {
                    north: cell.north,
                    south: cell.south,
                    east: cell.east,
                    west: cell.west,
                    discovered: cell.discovered,
                }
            })
            .collect();

        GridSnapshot {
            width: self.width().0,
            height: self.height().0,
            cells,
        }
    }

    /// Rebuild a grid from a snapshot.
    ///
    /// Fails with `InvalidDimension` for a too small grid, or `MalformedSnapshot` when the cell
    /// count is wrong or two adjacent cells disagree about the wall between them.
    /// Every cell of the rebuilt grid counts as visited.
    pub fn from_snapshot(snapshot: &GridSnapshot) -> Result<Grid> {
        let cells = snapshot.cells
            .iter()
            .map(|cell| {
                Cell {
                    north: cell.north,
                    south: cell.south,
                    east: cell.east,
                    west: cell.west,
                    visited: true,
                    discovered: cell.discovered,
                }
            })
            .collect();
        let grid = Grid::from_cells(Width(snapshot.width), Height(snapshot.height), cells)?;

        for coord in grid.iter() {
            let cell = grid.cell(coord)?;
            for dir in COMPASS_PRIMARY_DIRECTIONS.iter() {
                if let Some(neighbour) = grid.neighbour_at_direction(coord, *dir) {
                    if cell.has_wall(*dir) != grid.cell(neighbour)?.has_wall(dir.opposite()) {
                        bail!(ErrorKind::MalformedSnapshot(format!("asymmetric wall between {:?} and {:?}",
                                                                   coord,
                                                                   neighbour)));
                    }
                }
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::Coordinate;
    use crate::generators::{generate, Algorithm};

    #[test]
    fn snapshot_rebuilds_an_identical_grid() {
        let mut grid = generate(Width(7), Height(5), Algorithm::Sidewinder, Some(21)).unwrap();
        grid.mark_discovered(Coordinate::new(3, 2)).unwrap();

        let json = grid.snapshot().to_json().unwrap();
        let rebuilt = Grid::from_snapshot(&GridSnapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(rebuilt, grid);
        assert!(rebuilt.is_discovered(Coordinate::new(3, 2)));
        assert_eq!(rebuilt.discovered_count(), 1);
    }

    #[test]
    fn snapshot_saves_to_disk() {
        let grid = generate(Width(4), Height(4), Algorithm::Kruskal, Some(3)).unwrap();
        let path = std::env::temp_dir().join(format!("raymaze_snapshot_{}.json", std::process::id()));
        grid.snapshot().save(&path).unwrap();
        let loaded = GridSnapshot::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(Grid::from_snapshot(&loaded).unwrap(), grid);
    }

    #[test]
    fn wrong_cell_count_is_rejected() {
        let mut snapshot = Grid::new(Width(3), Height(3)).unwrap().snapshot();
        snapshot.cells.pop();
        match Grid::from_snapshot(&snapshot) {
            Err(Error(ErrorKind::MalformedSnapshot(_), _)) => (),
            other => panic!("expected MalformedSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn bad_dimensions_are_rejected() {
        let snapshot = GridSnapshot {
            width: 1,
            height: 4,
            cells: vec![],
        };
        match Grid::from_snapshot(&snapshot) {
            Err(Error(ErrorKind::InvalidDimension(1, 4), _)) => (),
            other => panic!("expected InvalidDimension, got {:?}", other),
        }
    }

    #[test]
    fn asymmetric_walls_are_rejected() {
        let mut snapshot = Grid::new(Width(2), Height(2)).unwrap().snapshot();
        snapshot.cells[0].east = false;
        match Grid::from_snapshot(&snapshot) {
            Err(Error(ErrorKind::MalformedSnapshot(reason), _)) => assert!(reason.contains("asymmetric")),
            other => panic!("expected MalformedSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn garbage_json_is_a_json_error() {
        match GridSnapshot::from_json("{\"width\": 3") {
            Err(Error(ErrorKind::Json(_), _)) => (),
            other => panic!("expected Json error, got {:?}", other),
        }
    }
}
