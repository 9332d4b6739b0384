use error_chain::bail;
use log::debug;
use petgraph::unionfind::UnionFind;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cells::{CompassPrimary, Coordinate};
use crate::errors::*;
use crate::grid::{CoordinateSmallVec, Grid};
use crate::units::{Height, Width};
use crate::utils;

/// The closed set of carve strategies.
///
/// Every strategy starts from a fully walled grid, leaves every cell visited and carves a
/// spanning tree: exactly `width * height - 1` passages with a single route between any two cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    DepthFirstBacktracker,
    Prim,
    Kruskal,
    AldousBroder,
    Wilson,
    HuntAndKill,
    BinaryTree,
    Sidewinder,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [Algorithm::DepthFirstBacktracker,
                                     Algorithm::Prim,
                                     Algorithm::Kruskal,
                                     Algorithm::AldousBroder,
                                     Algorithm::Wilson,
                                     Algorithm::HuntAndKill,
                                     Algorithm::BinaryTree,
                                     Algorithm::Sidewinder];

    /// Canonical name, accepted back by `from_str`.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::DepthFirstBacktracker => "DFS-backtracker",
            Algorithm::Prim => "Prim",
            Algorithm::Kruskal => "Kruskal",
            Algorithm::AldousBroder => "Aldous-Broder",
            Algorithm::Wilson => "Wilson",
            Algorithm::HuntAndKill => "Hunt-and-Kill",
            Algorithm::BinaryTree => "Binary-Tree",
            Algorithm::Sidewinder => "Sidewinder",
        }
    }

    /// Carve a maze into a fully walled grid, reporting each carved passage to `on_carve`.
    pub fn carve<R: Rng>(self,
                         grid: &mut Grid,
                         rng: &mut R,
                         on_carve: &mut dyn FnMut(Coordinate, Coordinate))
                         -> Result<()> {
        let mut carver = Carver { grid, on_carve };
        match self {
            Algorithm::DepthFirstBacktracker => depth_first_backtracker(&mut carver, rng),
            Algorithm::Prim => prim(&mut carver, rng),
            Algorithm::Kruskal => kruskal(&mut carver, rng),
            Algorithm::AldousBroder => aldous_broder(&mut carver, rng),
            Algorithm::Wilson => wilson(&mut carver, rng),
            Algorithm::HuntAndKill => hunt_and_kill(&mut carver, rng),
            Algorithm::BinaryTree => binary_tree(&mut carver, rng),
            Algorithm::Sidewinder => sidewinder(&mut carver, rng),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Case insensitive, with `-`, `_` or spaces between words.
    fn from_str(s: &str) -> Result<Algorithm> {
        let normalised = s.trim()
            .to_lowercase()
            .replace(|c: char| c == '_' || c == ' ', "-");
        let algorithm = match normalised.as_str() {
            "dfs-backtracker" | "dfs" | "recursive-backtracker" | "depth-first-backtracker" => {
                Algorithm::DepthFirstBacktracker
            }
            "prim" | "prims" => Algorithm::Prim,
            "kruskal" | "kruskals" => Algorithm::Kruskal,
            "aldous-broder" => Algorithm::AldousBroder,
            "wilson" | "wilsons" => Algorithm::Wilson,
            "hunt-and-kill" | "hunt-kill" => Algorithm::HuntAndKill,
            "binary-tree" | "binary" => Algorithm::BinaryTree,
            "sidewinder" => Algorithm::Sidewinder,
            _ => bail!(ErrorKind::UnknownAlgorithm(s.to_string())),
        };
        Ok(algorithm)
    }
}

/// Generate a maze. A `seed` makes the result reproducible, without one the maze is seeded from
/// system entropy.
pub fn generate(width: Width,
                height: Height,
                algorithm: Algorithm,
                seed: Option<u64>)
                -> Result<Grid> {
    generate_with_observer(width, height, algorithm, seed, &mut |_, _| {})
}

/// `generate`, calling `on_carve(a, b)` for every passage in the order it is carved.
pub fn generate_with_observer(width: Width,
                              height: Height,
                              algorithm: Algorithm,
                              seed: Option<u64>,
                              on_carve: &mut dyn FnMut(Coordinate, Coordinate))
                              -> Result<Grid> {
    let mut grid = Grid::new(width, height)?;
    let mut rng = seeded_rng(seed);

    algorithm.carve(&mut grid, &mut rng, on_carve)?;

    debug_assert!(grid.is_connected());
    debug_assert!(grid.all_visited());
    debug!("generated {}x{} maze with {} (seed {:?}), {} passages",
           width.0,
           height.0,
           algorithm,
           seed,
           grid.passages_count());
    Ok(grid)
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> XorShiftRng {
    match seed {
        Some(seed) => XorShiftRng::seed_from_u64(seed),
        None => XorShiftRng::from_entropy(),
    }
}

/// Open extra walls at dead ends, turning a perfect maze into one with loops.
///
/// Each dead end (a cell with a single exit) is braided with probability `chance` by removing
/// one of its remaining walls to an in-grid neighbour. Returns how many walls were opened.
/// The outer boundary is never touched.
pub fn braid<R: Rng>(grid: &mut Grid, chance: f64, rng: &mut R) -> Result<usize> {
    if chance.is_nan() || chance <= 0.0 {
        return Ok(0);
    }

    let mut opened = 0;
    for coord in grid.iter() {
        let dead_end = grid.cell(coord)?.exits_count() == 1;
        if dead_end && rng.gen::<f64>() < chance {
            let walled_neighbours: CoordinateSmallVec = grid.neighbours(coord)
                .into_iter()
                .filter(|neighbour| !grid.is_linked(coord, *neighbour))
                .collect();
            if let Some(&neighbour) = walled_neighbours.choose(rng) {
                grid.remove_wall(coord, neighbour)?;
                opened += 1;
            }
        }
    }

    debug!("braided {} dead ends at chance {}", opened, chance);
    Ok(opened)
}

/// Wall removal shared by every strategy: marks both cells visited and tells the observer.
struct Carver<'a, 'f> {
    grid: &'a mut Grid,
    on_carve: &'f mut dyn FnMut(Coordinate, Coordinate),
}

impl<'a, 'f> Carver<'a, 'f> {
    fn carve(&mut self, a: Coordinate, b: Coordinate) -> Result<()> {
        self.grid.remove_wall(a, b)?;
        self.grid.mark_visited(a)?;
        self.grid.mark_visited(b)?;
        (self.on_carve)(a, b);
        Ok(())
    }

    fn neighbours_where(&self, coord: Coordinate, visited: bool) -> CoordinateSmallVec {
        self.grid
            .neighbours(coord)
            .into_iter()
            .filter(|neighbour| self.grid.is_visited(*neighbour) == visited)
            .collect()
    }
}

/// Random walk with a stack of the cells on the current path. Carve into a random unvisited
/// neighbour and push it, or pop back to the last cell that still has unvisited neighbours.
/// Gives long winding corridors with few dead ends.
fn depth_first_backtracker<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let start = carver.grid.random_cell(rng);
    carver.grid.mark_visited(start)?;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let unvisited = carver.neighbours_where(current, false);
        match unvisited.choose(rng) {
            Some(&next) => {
                carver.carve(current, next)?;
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
    Ok(())
}

/// Grow the maze outwards from one cell. The frontier holds every wall between a visited and
/// an unvisited cell, and a random one of them is opened each step.
fn prim<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let start = carver.grid.random_cell(rng);
    carver.grid.mark_visited(start)?;
    let mut frontier: Vec<(Coordinate, Coordinate)> = carver.neighbours_where(start, false)
        .into_iter()
        .map(|neighbour| (start, neighbour))
        .collect();

    while !frontier.is_empty() {
        let index = rng.gen_range(0..frontier.len());
        let (inside, outside) = frontier.swap_remove(index);
        if carver.grid.is_visited(outside) {
            continue;
        }

        carver.carve(inside, outside)?;
        frontier.extend(carver.neighbours_where(outside, false)
            .into_iter()
            .map(|neighbour| (outside, neighbour)));
    }
    Ok(())
}

/// Every internal wall in random order, opened whenever it separates two distinct sets of
/// already joined cells.
fn kruskal<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let grid_size = carver.grid.size();
    let mut walls: Vec<(Coordinate, Coordinate)> = Vec::with_capacity(grid_size * 2);
    for coord in carver.grid.iter() {
        for dir in &[CompassPrimary::East, CompassPrimary::South] {
            if let Some(neighbour) = carver.grid.neighbour_at_direction(coord, *dir) {
                walls.push((coord, neighbour));
            }
        }
    }
    walls.shuffle(rng);

    let mut sets = UnionFind::<usize>::new(grid_size);
    for (a, b) in walls {
        let (index_a, index_b) = match (carver.grid.grid_coordinate_to_index(a),
                                        carver.grid.grid_coordinate_to_index(b)) {
            (Some(index_a), Some(index_b)) => (index_a, index_b),
            _ => continue,
        };
        if sets.union(index_a, index_b) {
            carver.carve(a, b)?;
        }
    }
    Ok(())
}

/// Pure random walk, carving only when stepping into a cell for the first time.
/// Unbiased but slow to finish, the last few unvisited cells take a long time to stumble into.
fn aldous_broder<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let mut current = carver.grid.random_cell(rng);
    carver.grid.mark_visited(current)?;
    let mut unvisited_count = carver.grid.size() - 1;

    while unvisited_count > 0 {
        let neighbours = carver.grid.neighbours(current);
        let next = match neighbours.choose(rng) {
            Some(&next) => next,
            None => break,
        };
        if !carver.grid.is_visited(next) {
            carver.carve(current, next)?;
            unvisited_count -= 1;
        }
        current = next;
    }
    Ok(())
}

/// Loop erased random walks. From a random cell outside the maze, wander until the walk hits
/// the maze, erasing any loop the walk makes with itself, then carve the walk into the maze.
/// Unbiased like Aldous-Broder, but quick to finish where Aldous-Broder is slow.
fn wilson<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let first = carver.grid.random_cell(rng);
    carver.grid.mark_visited(first)?;

    let mut outside: Vec<Coordinate> = carver.grid.iter().filter(|c| *c != first).collect();
    let mut path_positions = utils::fnv_hashmap(carver.grid.size());

    while !outside.is_empty() {
        let walk_start = outside[rng.gen_range(0..outside.len())];
        let mut path = vec![walk_start];
        path_positions.clear();
        path_positions.insert(walk_start, 0);

        let mut current = walk_start;
        while !carver.grid.is_visited(current) {
            let neighbours = carver.grid.neighbours(current);
            let next = match neighbours.choose(rng) {
                Some(&next) => next,
                None => break,
            };

            if let Some(&loop_start) = path_positions.get(&next) {
                for erased in path.drain(loop_start + 1..) {
                    path_positions.remove(&erased);
                }
            } else {
                path_positions.insert(next, path.len());
                path.push(next);
            }
            current = next;
        }

        for pair in path.windows(2) {
            carver.carve(pair[0], pair[1])?;
        }
        let grid: &Grid = carver.grid;
        outside.retain(|coord| !grid.is_visited(*coord));
    }
    Ok(())
}

/// Random walk like the backtracker, but at a dead end hunt row by row for the first unvisited
/// cell next to the maze, join it on and walk again from there.
fn hunt_and_kill<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let mut current = carver.grid.random_cell(rng);
    carver.grid.mark_visited(current)?;

    loop {
        let unvisited = carver.neighbours_where(current, false);
        if let Some(&next) = unvisited.choose(rng) {
            carver.carve(current, next)?;
            current = next;
            continue;
        }

        let hunted = carver.grid
            .iter()
            .filter(|coord| !carver.grid.is_visited(*coord))
            .find_map(|coord| {
                let visited_neighbours = carver.neighbours_where(coord, true);
                visited_neighbours.choose(rng).map(|&neighbour| (coord, neighbour))
            });

        match hunted {
            Some((coord, neighbour)) => {
                carver.carve(coord, neighbour)?;
                current = coord;
            }
            None => return Ok(()),
        }
    }
}

/// Visit each cell and carve a passage in one of two perpendicular directions.
/// The two directions are picked once for the entire maze, otherwise we'd end up with areas
/// that have no way in or out and would not be generating a perfect maze.
/// The result has two long unbroken corridors along the boundaries the directions point at.
fn binary_tree<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let directions = [CompassPrimary::rand_vertical_direction(rng),
                      CompassPrimary::rand_horizontal_direction(rng)];

    let cells: Vec<Coordinate> = carver.grid.iter().collect();
    for coord in cells {
        let neighbours: CoordinateSmallVec = carver.grid
            .neighbours_at_directions(coord, &directions)
            .into_iter()
            .flatten()
            .collect();

        if let Some(&link) = neighbours.choose(rng) {
            carver.carve(coord, link)?;
        }
    }
    Ok(())
}

/// Sidewinder works in runs along one axis, in the same order as the cells are visited.
/// Each step either extends the run by carving onwards, or closes the run out by carving a
/// passage from a random member of the run in the perpendicular direction.
/// The boundary line in the close out direction can never close out, so it ends up as one
/// long corridor.
fn sidewinder<R: Rng>(carver: &mut Carver, rng: &mut R) -> Result<()> {
    let runs_are_horizontal = rng.gen();
    let (run_direction, close_out_direction, lines) = if runs_are_horizontal {
        (CompassPrimary::East,
         CompassPrimary::rand_vertical_direction(rng),
         carver.grid.iter_row())
    } else {
        (CompassPrimary::South,
         CompassPrimary::rand_horizontal_direction(rng),
         carver.grid.iter_column())
    };

    for line in lines {
        let mut run = CoordinateSmallVec::new();

        for coord in line {
            run.push(coord);

            let next_in_run = carver.grid.neighbour_at_direction(coord, run_direction);
            let can_close_out =
                carver.grid.neighbour_at_direction(coord, close_out_direction).is_some();

            let should_close_out = match next_in_run {
                None => true,
                Some(_) => can_close_out && rng.gen(),
            };

            if should_close_out {
                if let Some(&member) = run.choose(rng) {
                    if let Some(close_out) =
                        carver.grid.neighbour_at_direction(member, close_out_direction) {
                        carver.carve(member, close_out)?;
                    }
                }
                run.clear();
            } else if let Some(next) = next_in_run {
                carver.carve(coord, next)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, Arbitrary, Gen};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;

    #[derive(Debug, Copy, Clone)]
    struct MazeParams {
        width: u32,
        height: u32,
        algorithm: Algorithm,
        seed: u64,
    }

    impl Arbitrary for MazeParams {
        fn arbitrary(g: &mut Gen) -> MazeParams {
            MazeParams {
                width: 2 + u32::arbitrary(g) % 14,
                height: 2 + u32::arbitrary(g) % 14,
                algorithm: *g.choose(&Algorithm::ALL).unwrap_or(&Algorithm::Prim),
                seed: u64::arbitrary(g),
            }
        }
    }

    impl MazeParams {
        fn generate(&self) -> Grid {
            generate(Width(self.width), Height(self.height), self.algorithm, Some(self.seed))
                .expect("valid maze parameters")
        }
    }

    #[test]
    fn every_maze_is_a_walled_spanning_tree() {
        fn p(params: MazeParams) -> bool {
            let grid = params.generate();
            grid.is_connected() &&
            grid.all_visited() &&
            grid.is_boundary_walled() &&
            grid.passages_count() == (params.width * params.height - 1) as usize
        }
        quickcheck(p as fn(MazeParams) -> bool);
    }

    #[test]
    fn walls_are_symmetric_after_generation() {
        fn p(params: MazeParams) -> bool {
            let grid = params.generate();
            grid.iter().all(|a| {
                grid.neighbours(a).iter().all(|&b| {
                    grid.wall_between(a, b).unwrap() == grid.wall_between(b, a).unwrap()
                })
            })
        }
        quickcheck(p as fn(MazeParams) -> bool);
    }

    #[test]
    fn same_seed_same_maze() {
        for algorithm in Algorithm::ALL.iter() {
            let a = generate(Width(5), Height(5), *algorithm, Some(42)).unwrap();
            let b = generate(Width(5), Height(5), *algorithm, Some(42)).unwrap();
            assert_eq!(a, b, "{} is not deterministic", algorithm);
        }
        let dfs = generate(Width(5), Height(5), Algorithm::DepthFirstBacktracker, Some(42)).unwrap();
        assert_eq!(dfs.passages_count(), 24);
    }

    #[test]
    fn small_dfs_example() {
        let grid = generate(Width(3), Height(3), "DFS-backtracker".parse().unwrap(), Some(1)).unwrap();
        assert!(grid.is_connected());
        assert_eq!(grid.passages_count(), 8);
        assert_eq!(grid, generate(Width(3), Height(3), Algorithm::DepthFirstBacktracker, Some(1)).unwrap());
    }

    #[test]
    fn unseeded_generation_still_satisfies_post_conditions() {
        let grid = generate(Width(12), Height(7), Algorithm::Wilson, None).unwrap();
        assert!(grid.is_connected());
        assert_eq!(grid.passages_count(), 83);
    }

    #[test]
    fn invalid_dimensions_propagate() {
        match generate(Width(1), Height(9), Algorithm::Prim, Some(0)) {
            Err(Error(ErrorKind::InvalidDimension(1, 9), _)) => (),
            other => panic!("expected InvalidDimension, got {:?}", other),
        }
    }

    #[test]
    fn algorithm_names() {
        for algorithm in Algorithm::ALL.iter() {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), *algorithm);
        }
        assert_eq!("dfs".parse::<Algorithm>().unwrap(), Algorithm::DepthFirstBacktracker);
        assert_eq!("Hunt_and_Kill".parse::<Algorithm>().unwrap(), Algorithm::HuntAndKill);
        assert_eq!(" binary tree ".parse::<Algorithm>().unwrap(), Algorithm::BinaryTree);
        assert_eq!("ALDOUS-BRODER".parse::<Algorithm>().unwrap(), Algorithm::AldousBroder);

        match "eller".parse::<Algorithm>() {
            Err(Error(ErrorKind::UnknownAlgorithm(name), _)) => assert_eq!(name, "eller"),
            other => panic!("expected UnknownAlgorithm, got {:?}", other),
        }
    }

    #[test]
    fn observer_sees_every_passage_in_order() {
        let mut carved = vec![];
        let grid = generate_with_observer(Width(6),
                                          Height(4),
                                          Algorithm::HuntAndKill,
                                          Some(9),
                                          &mut |a, b| carved.push((a, b)))
            .unwrap();
        assert_eq!(carved.len(), 23);
        assert!(carved.iter().all(|&(a, b)| grid.is_linked(a, b)));

        // replaying the passages onto a walled grid rebuilds the maze
        let mut replay = Grid::new(Width(6), Height(4)).unwrap();
        for (a, b) in carved {
            replay.remove_wall(a, b).unwrap();
            replay.mark_visited(a).unwrap();
            replay.mark_visited(b).unwrap();
        }
        assert_eq!(replay, grid);
    }

    #[test]
    fn braiding_adds_loops_inside_the_boundary() {
        let mut grid = generate(Width(15), Height(15), Algorithm::DepthFirstBacktracker, Some(4)).unwrap();
        let tree_passages = grid.passages_count();
        let mut rng = XorShiftRng::seed_from_u64(4);

        assert_eq!(braid(&mut grid, 0.0, &mut rng).unwrap(), 0);
        assert_eq!(grid.passages_count(), tree_passages);

        let opened = braid(&mut grid, 1.0, &mut rng).unwrap();
        assert!(opened > 0);
        assert_eq!(grid.passages_count(), tree_passages + opened);
        assert!(grid.is_connected());
        assert!(grid.is_boundary_walled());

        // braiding at certainty leaves no dead ends behind
        assert!(crate::pathing::dead_ends(&grid).is_empty());
    }
}
