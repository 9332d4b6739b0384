use std::fmt;

use crate::cells::{CompassPrimary, Coordinate};
use crate::grid::{CoordinateSmallVec, Grid};
use crate::utils::{self, FnvHashSet};
use crate::visibility::VisibleSet;

pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: &Grid, _: Coordinate) -> String {
        String::from("   ")
    }
}

/// Fog of war overlay: visible cells are clear, remembered cells dimmed, the rest unknown.
#[derive(Debug)]
pub struct FogDisplay<'a> {
    visible: &'a VisibleSet,
    viewer: Option<Coordinate>,
}
impl<'a> FogDisplay<'a> {
    pub fn new(visible: &'a VisibleSet, viewer: Option<Coordinate>) -> FogDisplay<'a> {
        FogDisplay { visible, viewer }
    }
}
impl<'a> GridDisplay for FogDisplay<'a> {
    fn render_cell_body(&self, grid: &Grid, coord: Coordinate) -> String {
        if self.viewer == Some(coord) {
            String::from(" @ ")
        } else if self.visible.contains(&coord) {
            String::from("   ")
        } else if grid.is_discovered(coord) {
            String::from(" · ")
        } else {
            String::from("░░░")
        }
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Coordinate>,
}
impl PathDisplay {
    pub fn new(path: &[Coordinate]) -> Self {
        PathDisplay { on_path_coordinates: utils::fnv_hashset_of(path) }
    }
}
impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, _: &Grid, coord: Coordinate) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

#[derive(Debug)]
pub struct StartEndPointsDisplay {
    start_coordinates: CoordinateSmallVec,
    end_coordinates: CoordinateSmallVec,
}
impl StartEndPointsDisplay {
    pub fn new(starts: CoordinateSmallVec, ends: CoordinateSmallVec) -> StartEndPointsDisplay {
        StartEndPointsDisplay {
            start_coordinates: starts,
            end_coordinates: ends,
        }
    }
}
impl GridDisplay for StartEndPointsDisplay {
    fn render_cell_body(&self, _: &Grid, coord: Coordinate) -> String {

        let contains_coordinate =
            |coordinates: &CoordinateSmallVec| coordinates.iter().any(|&c| c == coord);

        if contains_coordinate(&self.start_coordinates) {
            String::from(" S ")
        } else if contains_coordinate(&self.end_coordinates) {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

/// A grid paired with an optional overlay deciding what each cell body shows.
pub struct GridRender<'a> {
    grid: &'a Grid,
    overlay: Option<&'a dyn GridDisplay>,
}

impl Grid {
    pub fn display_with<'a>(&'a self, overlay: &'a dyn GridDisplay) -> GridRender<'a> {
        GridRender {
            grid: self,
            overlay: Some(overlay),
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let render = GridRender {
            grid: self,
            overlay: None,
        };
        write!(f, "{}", render)
    }
}

impl<'a> fmt::Display for GridRender<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const WALL_L: &str = "╴";
        const WALL_R: &str = "╶";
        const WALL_U: &str = "╵";
        const WALL_D: &str = "╷";
        const WALL_LR_3: &str = "───";
        const WALL_LR: &str = "─";
        const WALL_UD: &str = "│";
        const WALL_LD: &str = "┐";
        const WALL_RU: &str = "└";
        const WALL_LU: &str = "┘";
        const WALL_RD: &str = "┌";
        const WALL_LRU: &str = "┴";
        const WALL_LRD: &str = "┬";
        const WALL_LRUD: &str = "┼";
        const WALL_RUD: &str = "├";
        const WALL_LUD: &str = "┤";
        let default_cell_body = "   ";

        let grid = self.grid;
        let columns_count = grid.width().0 as usize;
        let rows_count = grid.height().0 as usize;

        // Start by special case rendering the text for the north most boundary
        let mut output = String::from(WALL_RD);
        if let Some(first_grid_row) = grid.iter_row().next() {
            for (index, coord) in first_grid_row.iter().enumerate() {
                output.push_str(WALL_LR_3);
                let is_east_open = grid.is_neighbour_linked(*coord, CompassPrimary::East);
                if is_east_open {
                    output.push_str(WALL_LR);
                } else if index == columns_count - 1 {
                    output.push_str(WALL_LD);
                } else {
                    output.push_str(WALL_LRD);
                }
            }
        }
        output.push('\n');

        for (index_row, row) in grid.iter_row().enumerate() {

            let is_last_row = index_row == (rows_count - 1);

            // The west most boundary of the row is a special case.
            // The top section of the cell is done by the previous row.
            let mut row_middle_section_render = String::from(WALL_UD);
            let mut row_bottom_section_render = String::new();

            for (index_column, cell_coord) in row.into_iter().enumerate() {

                let render_cell_side = |direction, passage_clear_text, blocking_wall_text| {
                    if grid.is_neighbour_linked(cell_coord, direction) {
                        passage_clear_text
                    } else {
                        blocking_wall_text
                    }
                };
                let is_first_column = index_column == 0;
                let is_last_column = index_column == (columns_count - 1);
                let east_open = grid.is_neighbour_linked(cell_coord, CompassPrimary::East);
                let south_open = grid.is_neighbour_linked(cell_coord, CompassPrimary::South);

                // Each cell uses the southern wall of the cell above it as its own northern wall,
                // so only the body, the eastern boundary and the southern boundary are drawn here.
                let east_boundary = render_cell_side(CompassPrimary::East, " ", WALL_UD);

                match self.overlay {
                    Some(displayer) => {
                        row_middle_section_render.push_str(&displayer.render_cell_body(grid, cell_coord))
                    }
                    None => row_middle_section_render.push_str(default_cell_body),
                }
                row_middle_section_render.push_str(east_boundary);

                if is_first_column {
                    row_bottom_section_render = if is_last_row {
                        String::from(WALL_RU)
                    } else if south_open {
                        String::from(WALL_UD)
                    } else {
                        String::from(WALL_RUD)
                    };
                }
                let south_boundary = render_cell_side(CompassPrimary::South, "   ", WALL_LR_3);
                row_bottom_section_render.push_str(south_boundary);

                let corner = match (is_last_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                    (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                    (false, false) => {
                        let access_se_from_east =
                            grid.neighbour_at_direction(cell_coord, CompassPrimary::East)
                                .map_or(false, |c| grid.is_neighbour_linked(c, CompassPrimary::South));
                        let access_se_from_south =
                            grid.neighbour_at_direction(cell_coord, CompassPrimary::South)
                                .map_or(false, |c| grid.is_neighbour_linked(c, CompassPrimary::East));
                        let show_right_section = !access_se_from_east;
                        let show_down_section = !access_se_from_south;
                        let show_up_section = !east_open;
                        let show_left_section = !south_open;

                        match (show_left_section,
                               show_right_section,
                               show_up_section,
                               show_down_section) {
                            (true, true, true, true) => WALL_LRUD,
                            (true, true, true, false) => WALL_LRU,
                            (true, true, false, true) => WALL_LRD,
                            (true, false, true, true) => WALL_LUD,
                            (false, true, true, true) => WALL_RUD,
                            (true, true, false, false) => WALL_LR,
                            (false, false, true, true) => WALL_UD,
                            (false, true, true, false) => WALL_RU,
                            (true, false, false, true) => WALL_LD,
                            (true, false, true, false) => WALL_LU,
                            (false, true, false, true) => WALL_RD,
                            (true, false, false, false) => WALL_L,
                            (false, true, false, false) => WALL_R,
                            (false, false, true, false) => WALL_U,
                            (false, false, false, true) => WALL_D,
                            _ => " ",
                        }
                    }
                };

                row_bottom_section_render.push_str(corner);
            }

            output.push_str(&row_middle_section_render);
            output.push('\n');
            output.push_str(&row_bottom_section_render);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Height, Width};
    use crate::utils;

    #[test]
    fn fully_walled_grid_text() {
        let g = Grid::new(Width(2), Height(2)).unwrap();
        let expected = "┌───┬───┐\n│   │   │\n├───┼───┤\n│   │   │\n└───┴───┘\n";
        assert_eq!(format!("{}", g), expected);
    }

    #[test]
    fn carved_grid_text() {
        let mut g = Grid::new(Width(2), Height(2)).unwrap();
        g.remove_wall(Coordinate::new(0, 0), Coordinate::new(1, 0)).unwrap();
        g.remove_wall(Coordinate::new(1, 0), Coordinate::new(1, 1)).unwrap();
        g.remove_wall(Coordinate::new(0, 1), Coordinate::new(1, 1)).unwrap();
        let expected = "┌───────┐\n│       │\n├───╴   │\n│       │\n└───────┘\n";
        assert_eq!(format!("{}", g), expected);
    }

    #[test]
    fn fog_overlay_bodies() {
        let mut g = Grid::new(Width(3), Height(2)).unwrap();
        g.mark_discovered(Coordinate::new(1, 0)).unwrap();
        let mut visible = utils::fnv_hashset(2);
        visible.insert(Coordinate::new(0, 0));
        let fog = FogDisplay::new(&visible, Some(Coordinate::new(2, 1)));

        assert_eq!(fog.render_cell_body(&g, Coordinate::new(0, 0)), "   ");
        assert_eq!(fog.render_cell_body(&g, Coordinate::new(1, 0)), " · ");
        assert_eq!(fog.render_cell_body(&g, Coordinate::new(0, 1)), "░░░");
        assert_eq!(fog.render_cell_body(&g, Coordinate::new(2, 1)), " @ ");

        let text = format!("{}", g.display_with(&fog));
        assert!(text.contains(" @ "));
        assert!(text.contains("░░░"));
    }

    #[test]
    fn start_and_end_markers() {
        let g = Grid::new(Width(3), Height(2)).unwrap();
        let mut starts = CoordinateSmallVec::new();
        starts.push(Coordinate::new(0, 0));
        let mut ends = CoordinateSmallVec::new();
        ends.push(Coordinate::new(2, 1));
        let text = format!("{}", g.display_with(&StartEndPointsDisplay::new(starts, ends)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "│ S │   │   │");
        assert_eq!(lines[3], "│   │   │ E │");
    }

    #[test]
    fn path_overlay_bodies() {
        let g = Grid::new(Width(2), Height(2)).unwrap();
        let path = PathDisplay::new(&[Coordinate::new(1, 1)]);
        assert_eq!(path.render_cell_body(&g, Coordinate::new(1, 1)), " . ");
        assert_eq!(path.render_cell_body(&g, Coordinate::new(0, 1)), "   ");
    }
}
