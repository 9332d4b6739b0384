use std::fmt::{Debug, Display, LowerHex};
use std::ops::Add;

use itertools::Itertools;
use num::traits::{Bounded, One, Unsigned, Zero};
use petgraph::algo::astar;
use petgraph::graphmap::UnGraphMap;
use smallvec::SmallVec;

use crate::cells::Coordinate;
use crate::grid::{CoordinateSmallVec, Grid};
use crate::grid_displays::GridDisplay;
use crate::utils::{self, FnvHashMap};

// Trait (hack) used purely as a generic type parameter alias because it looks ugly to type this out each time
// Note generic parameter type aliases are not in the language.
pub trait MaxDistance
    : Zero + One + Bounded + Unsigned + Add + Debug + Clone + Copy + Display + LowerHex + Ord
    {
}
impl<T: Zero + One + Bounded + Unsigned + Add + Debug + Clone + Copy + Display + LowerHex + Ord> MaxDistance for T {}

/// Flood fill of passage steps from one start cell to every cell reachable from it.
#[derive(Debug, Clone)]
pub struct Distances<MaxDistanceT = u32> {
    start_coordinate: Coordinate,
    distances: FnvHashMap<Coordinate, MaxDistanceT>,
    max_distance: MaxDistanceT,
}

impl<MaxDistanceT: MaxDistance> Distances<MaxDistanceT> {
    /// None if the start coordinate is not on the grid.
    pub fn new(grid: &Grid, start_coordinate: Coordinate) -> Option<Distances<MaxDistanceT>> {
        if !grid.is_valid_coordinate(start_coordinate) {
            return None;
        }

        let mut max = Zero::zero();
        let mut distances = utils::fnv_hashmap(grid.size());
        distances.insert(start_coordinate, Zero::zero());

        // Every step is one from the previous cell, so the first distance recorded for a cell is
        // already its shortest. The distances map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for cell_coord in &frontier {

                let distance_to_cell: MaxDistanceT = match distances.get(cell_coord) {
                    Some(d) => *d,
                    None => continue,
                };
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                let links = grid.links(*cell_coord).unwrap_or_default();
                for link_coordinate in &*links {
                    if !distances.contains_key(link_coordinate) {
                        distances.insert(*link_coordinate, distance_to_cell + One::one());
                        new_frontier.push(*link_coordinate);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Coordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> MaxDistanceT {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: Coordinate) -> Option<MaxDistanceT> {
        self.distances.get(&coord).cloned()
    }

    /// Number of cells reachable from the start, the start included.
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    /// Every cell at the maximum distance, in row-major order.
    pub fn furthest_points_on_grid(&self) -> SmallVec<[Coordinate; 8]> {
        let furthest_distance = self.max();
        self.distances
            .iter()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(coord, _)| *coord)
            .sorted_by_key(|coord| (coord.y, coord.x))
            .collect()
    }
}

impl<MaxDistanceT: MaxDistance> GridDisplay for Distances<MaxDistanceT> {
    fn render_cell_body(&self, _: &Grid, coord: Coordinate) -> String {
        if let Some(d) = self.distances.get(&coord) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}

/// Walk back from `end_point` to the start of the flood fill, always stepping to the linked
/// neighbour closest to the start. None if the end point was never reached.
pub fn shortest_path<MaxDistanceT>(grid: &Grid,
                                   distances_from_start: &Distances<MaxDistanceT>,
                                   end_point: Coordinate)
                                   -> Option<Vec<Coordinate>>
    where MaxDistanceT: MaxDistance
{
    distances_from_start.distance_from_start_to(end_point)?;

    let mut path = vec![end_point];
    let start = distances_from_start.start();
    let mut current_coord = end_point;

    while current_coord != start {

        let current_distance_to_start = distances_from_start.distance_from_start_to(current_coord)?;

        let linked_neighbours = grid.links(current_coord)?;
        let closest_to_start = linked_neighbours.iter()
            .filter_map(|coord| {
                distances_from_start.distance_from_start_to(*coord).map(|d| (*coord, d))
            })
            .min_by_key(|&(_, distance)| distance);

        match closest_to_start {
            Some((closer_coord, closer_distance)) => {
                if closer_distance >= current_distance_to_start {
                    // Not getting any closer to the start, the distances are for another grid.
                    return None;
                }
                current_coord = closer_coord;
                path.push(current_coord);
            }
            // There are no linked neighbours - this input data is broken.
            None => return None,
        }
    }

    path.reverse();
    Some(path)
}

/// The longest route through the maze: flood fill from an arbitrary cell, then again from the
/// furthest cell found. Exact only for perfect mazes, braided mazes get some long path back.
pub fn longest_path(grid: &Grid) -> Option<Vec<Coordinate>> {
    let first_distances = Distances::<u32>::new(grid, Coordinate::new(0, 0))?;

    let long_path_start_coordinate = *first_distances.furthest_points_on_grid().first()?;
    let distances_from_start = Distances::<u32>::new(grid, long_path_start_coordinate)?;
    let end_point = *distances_from_start.furthest_points_on_grid().first()?;

    shortest_path(grid, &distances_from_start, end_point)
}

/// The maze's passages as an undirected graph with one node per cell.
pub fn passage_graph(grid: &Grid) -> UnGraphMap<Coordinate, ()> {
    let mut graph = UnGraphMap::with_capacity(grid.size(), grid.size());
    for coord in grid.iter() {
        graph.add_node(coord);
    }
    for (a, b) in grid.iter_passages() {
        graph.add_edge(a, b, ());
    }
    graph
}

/// A* from `start` to `goal` through the passages, guided by Manhattan distance.
pub fn astar_path(grid: &Grid, start: Coordinate, goal: Coordinate) -> Option<Vec<Coordinate>> {
    if !grid.is_valid_coordinate(start) || !grid.is_valid_coordinate(goal) {
        return None;
    }
    let graph = passage_graph(grid);
    let manhattan = |coord: Coordinate| {
        (coord.x as i64 - goal.x as i64).abs() as u32 + (coord.y as i64 - goal.y as i64).abs() as u32
    };
    astar(&graph, start, |node| node == goal, |_| 1u32, manhattan).map(|(_, path)| path)
}

/// Cells with exactly one passage leading out of them.
pub fn dead_ends(grid: &Grid) -> CoordinateSmallVec {
    grid.iter()
        .filter(|coord| grid.links(*coord).map_or(false, |links| links.len() == 1))
        .collect()
}

#[cfg(test)]
mod tests {

    use std::u32;

    use super::*;
    use crate::generators::{generate, Algorithm};
    use crate::units::{Height, Width};

    type SmallDistances = Distances<u8>;

    static OUT_OF_GRID_COORDINATE: Coordinate = Coordinate {
        x: u32::MAX,
        y: u32::MAX,
    };

    fn gc(x: u32, y: u32) -> Coordinate {
        Coordinate::new(x, y)
    }

    fn open_2x2() -> Grid {
        let mut g = Grid::new(Width(2), Height(2)).unwrap();
        g.remove_wall(gc(0, 0), gc(1, 0)).expect("Link Failed");
        g.remove_wall(gc(0, 0), gc(0, 1)).expect("Link Failed");
        g.remove_wall(gc(1, 0), gc(1, 1)).expect("Link Failed");
        g.remove_wall(gc(0, 1), gc(1, 1)).expect("Link Failed");
        g
    }

    #[test]
    fn distances_construction_requires_valid_start_coordinate() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        assert!(SmallDistances::new(&g, OUT_OF_GRID_COORDINATE).is_none());
    }

    #[test]
    fn distances_to_unreachable_cells_is_none() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        let start_coordinate = gc(1, 1);
        let distances = SmallDistances::new(&g, start_coordinate).unwrap();
        assert_eq!(distances.start(), start_coordinate);
        for coord in g.iter() {
            let d = distances.distance_from_start_to(coord);
            if coord != start_coordinate {
                assert!(d.is_none());
            } else {
                assert_eq!(d, Some(0));
            }
        }
        assert_eq!(distances.distance_from_start_to(OUT_OF_GRID_COORDINATE), None);
        assert_eq!(distances.reachable_count(), 1);
    }

    #[test]
    fn distances_on_open_grid() {
        let g = open_2x2();
        let distances = SmallDistances::new(&g, gc(0, 0)).unwrap();

        assert_eq!(distances.distance_from_start_to(gc(0, 0)), Some(0));
        assert_eq!(distances.distance_from_start_to(gc(1, 0)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(0, 1)), Some(1));
        assert_eq!(distances.distance_from_start_to(gc(1, 1)), Some(2));
        assert_eq!(distances.max(), 2);
        assert_eq!(&*distances.furthest_points_on_grid(), &[gc(1, 1)]);
    }

    #[test]
    fn distances_render_as_hex() {
        let g = open_2x2();
        let distances = Distances::<u32>::new(&g, gc(1, 1)).unwrap();
        assert_eq!(distances.render_cell_body(&g, gc(0, 0)), " 2 ");
        assert_eq!(distances.render_cell_body(&g, gc(1, 1)), " 0 ");
    }

    #[test]
    fn shortest_path_follows_the_passages() {
        let grid = generate(Width(9), Height(7), Algorithm::Prim, Some(17)).unwrap();
        let start = gc(0, 0);
        let end = gc(8, 6);
        let distances = Distances::<u32>::new(&grid, start).unwrap();
        let path = shortest_path(&grid, &distances, end).unwrap();

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert_eq!(path.len() as u32, distances.distance_from_start_to(end).unwrap() + 1);
        assert!(path.windows(2).all(|pair| grid.is_linked(pair[0], pair[1])));

        // a perfect maze has exactly one route, so A* agrees
        assert_eq!(astar_path(&grid, start, end), Some(path));
    }

    #[test]
    fn no_path_to_walled_off_cells() {
        let g = Grid::new(Width(3), Height(3)).unwrap();
        let distances = Distances::<u32>::new(&g, gc(0, 0)).unwrap();
        assert_eq!(shortest_path(&g, &distances, gc(2, 2)), None);
        assert_eq!(astar_path(&g, gc(0, 0), gc(2, 2)), None);
        assert_eq!(astar_path(&g, gc(0, 0), OUT_OF_GRID_COORDINATE), None);
    }

    #[test]
    fn longest_path_spans_the_maze_diameter() {
        let grid = generate(Width(10), Height(10), Algorithm::DepthFirstBacktracker, Some(8)).unwrap();
        let path = longest_path(&grid).unwrap();
        let from_one_end = Distances::<u32>::new(&grid, path[0]).unwrap();
        assert_eq!(from_one_end.max() as usize, path.len() - 1);
        assert!(path.windows(2).all(|pair| grid.is_linked(pair[0], pair[1])));
    }

    #[test]
    fn dead_end_cells() {
        let mut g = Grid::new(Width(3), Height(2)).unwrap();
        g.remove_wall(gc(0, 0), gc(1, 0)).unwrap();
        g.remove_wall(gc(1, 0), gc(2, 0)).unwrap();
        assert_eq!(&*dead_ends(&g), &[gc(0, 0), gc(2, 0)]);
    }
}
