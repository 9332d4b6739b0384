use std::fmt;

use crate::cells::Coordinate;
use crate::units::{ColumnIndex, Height, RowIndex, Width};

/// Row-major iteration over every coordinate of a grid.
#[derive(Copy, Clone)]
pub struct CellIter {
    width: Width,
    current_cell_number: usize,
    cells_count: usize,
}

impl CellIter {
    pub(crate) fn new(width: Width, cells_count: usize) -> CellIter {
        CellIter {
            width,
            current_cell_number: 0,
            cells_count,
        }
    }
}

impl fmt::Debug for CellIter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CellIter :: current_cell_number: {:?}, cells_count: {:?}",
               self.current_cell_number,
               self.cells_count)
    }
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = Coordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = Coordinate::from_row_major_index(self.current_cell_number, self.width);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) enum BatchIterType {
    Row,
    Column,
}

/// Iterates whole rows (north to south) or whole columns (west to east) at a time.
#[derive(Debug, Copy, Clone)]
pub struct BatchIter {
    iter_type: BatchIterType,
    current_index: u32,
    width: Width,
    height: Height,
}

impl BatchIter {
    pub(crate) fn new(iter_type: BatchIterType, width: Width, height: Height) -> BatchIter {
        BatchIter {
            iter_type,
            current_index: 0,
            width,
            height,
        }
    }

    fn batches_count(&self) -> u32 {
        match self.iter_type {
            BatchIterType::Row => self.height.0,
            BatchIterType::Column => self.width.0,
        }
    }
}

impl ExactSizeIterator for BatchIter {} // default impl using size_hint()
impl Iterator for BatchIter {
    type Item = Vec<Coordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.batches_count() {
            return None;
        }

        let index = self.current_index;
        let coords = match self.iter_type {
            BatchIterType::Row => {
                (0..self.width.0)
                    .map(|i| Coordinate::from_row_column_indices(ColumnIndex(i), RowIndex(index)))
                    .collect()
            }
            BatchIterType::Column => {
                (0..self.height.0)
                    .map(|i| Coordinate::from_row_column_indices(ColumnIndex(index), RowIndex(i)))
                    .collect()
            }
        };
        self.current_index += 1;
        Some(coords)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.batches_count() - self.current_index) as usize;
        (remaining, Some(remaining))
    }
}
