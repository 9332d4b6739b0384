use docopt::Docopt;
use log::info;
use serde_derive::Deserialize;
use raymaze::{
    cells::Coordinate,
    config::{Difficulty, LevelConfig},
    grid::Grid,
    grid::CoordinateSmallVec,
    grid_displays::{FogDisplay, PathDisplay, StartEndPointsDisplay},
    pathing,
    renderers::{self, FogView},
    snapshot::GridSnapshot,
    viewer::{Position, ViewerPose},
    visibility,
};
use std::{
    fs::File,
    io,
    io::prelude::*,
};

const USAGE: &str = "Raymaze

Usage:
    raymaze_driver -h | --help
    raymaze_driver [options]
    raymaze_driver load <snapshot> [options]

Options:
    -h --help                Show this screen.
    --config=<path>          Level configuration JSON file. Flags below override its values.
    --difficulty=<d>         Start from a difficulty preset: easy, normal, hard, expert or nightmare.
    --algorithm=<name>       dfs-backtracker, prim, kruskal, aldous-broder, wilson, hunt-and-kill, binary-tree or sidewinder.
    --width=<w>              The maze width in cells.
    --height=<h>             The maze height in cells.
    --seed=<n>               Seed for a reproducible maze.
    --braid=<p>              Chance of opening each dead end, adding loops.
    --fog-radius=<r>         Enable the fog of war with this vision radius.
    --viewer-x=<x>           Viewer x position in cell units [default: 0.5].
    --viewer-y=<y>           Viewer y position in cell units [default: 0.5].
    --facing=<degrees>       Viewer facing, 0 is east and 90 is south [default: 0].
    --show-path              Show the longest path through the maze in the text rendering.
    --show-ends              Mark the two ends of the longest path with S and E.
    --show-distances         Show the passage distance (hex) from the viewer's cell to every cell.
    --text-out=<path>        Write the text rendering to a file instead of stdout.
    --snapshot-out=<path>    Save the maze as snapshot JSON.
    --save-edges=<path>      Serialize the maze graph: line 1 is n(#vertices) m(#edges), then one 1-based vertex pair per passage.
    --map-out=<path>         Render the top-down map to a PNG file.
    --view-out=<path>        Render the first person view to a PNG file.
    --cell-pixels=<n>        Pixel size of one cell on the map [default: 16].
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_load: bool,
    arg_snapshot: String,
    flag_config: Option<String>,
    flag_difficulty: Option<String>,
    flag_algorithm: Option<String>,
    flag_width: Option<u32>,
    flag_height: Option<u32>,
    flag_seed: Option<u64>,
    flag_braid: Option<f64>,
    flag_fog_radius: Option<f64>,
    flag_viewer_x: f64,
    flag_viewer_y: f64,
    flag_facing: f64,
    flag_show_path: bool,
    flag_show_ends: bool,
    flag_show_distances: bool,
    flag_text_out: Option<String>,
    flag_snapshot_out: Option<String>,
    flag_save_edges: Option<String>,
    flag_map_out: Option<String>,
    flag_view_out: Option<String>,
    flag_cell_pixels: u32,
}

mod errors {
    use error_chain::*;
    error_chain! {
        links {
            Maze(::raymaze::errors::Error, ::raymaze::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;
    let config = level_config_from_args(&args)?;

    let mut maze_grid = if args.cmd_load {
        let snapshot = GridSnapshot::load(&args.arg_snapshot)
            .chain_err(|| format!("Failed to load maze snapshot {}", args.arg_snapshot))?;
        Grid::from_snapshot(&snapshot)?
    } else {
        config.build_maze()?
    };
    info!("maze ready: {}x{}, {} passages, {} dead ends",
          maze_grid.width().0,
          maze_grid.height().0,
          maze_grid.passages_count(),
          pathing::dead_ends(&maze_grid).len());

    let pose = ViewerPose::new(Position::new(args.flag_viewer_x, args.flag_viewer_y),
                               args.flag_facing.to_radians(),
                               config.field_of_view());

    let visible = match config.fog_radius() {
        Some(radius) => Some(visibility::compute_visible(&mut maze_grid, pose.position, radius)?),
        None => None,
    };

    let text = if args.flag_show_distances {
        let viewer_cell = pose.position.cell_in(&maze_grid)?;
        let distances = pathing::Distances::<u32>::new(&maze_grid, viewer_cell)
            .ok_or_else(|| Error::from(format!("viewer cell {:?} is not in the maze", viewer_cell)))?;
        format!("{}", maze_grid.display_with(&distances))
    } else if args.flag_show_ends {
        let path = pathing::longest_path(&maze_grid).unwrap_or_default();
        let mut starts = CoordinateSmallVec::new();
        let mut ends = CoordinateSmallVec::new();
        starts.extend(path.first().cloned());
        ends.extend(path.last().cloned());
        format!("{}", maze_grid.display_with(&StartEndPointsDisplay::new(starts, ends)))
    } else if args.flag_show_path {
        let path = pathing::longest_path(&maze_grid).unwrap_or_default();
        format!("{}", maze_grid.display_with(&PathDisplay::new(&path)))
    } else if let Some(ref visible) = visible {
        let viewer_cell = pose.position.cell_in(&maze_grid)?;
        format!("{}", maze_grid.display_with(&FogDisplay::new(visible, Some(viewer_cell))))
    } else {
        format!("{}", maze_grid)
    };
    match args.flag_text_out {
        Some(ref path) => {
            write_text_to_file(&text, path)
                .chain_err(|| format!("Failed to write maze to text file {}", path))?
        }
        None => println!("{}", text),
    }

    if let Some(ref path) = args.flag_snapshot_out {
        maze_grid.snapshot()
            .save(path)
            .chain_err(|| format!("Failed to save maze snapshot {}", path))?;
        info!("snapshot saved to {}", path);
    }

    if let Some(ref path) = args.flag_save_edges {
        save_maze_graph(&maze_grid, path)?;
    }

    if let Some(ref path) = args.flag_map_out {
        let fog = match (visible.as_ref(), config.fog_radius()) {
            (Some(visible), Some(radius)) => {
                Some(FogView {
                    visible,
                    viewer: pose.position,
                    radius,
                })
            }
            _ => None,
        };
        let path_cells = if args.flag_show_path {
            pathing::longest_path(&maze_grid)
        } else {
            None
        };
        let img = renderers::render_top_down(&maze_grid,
                                             args.flag_cell_pixels,
                                             fog.as_ref(),
                                             path_cells.as_ref().map(|p| p.as_slice()))?;
        renderers::save_png(&img, path).chain_err(|| format!("Failed to write map image {}", path))?;
        info!("map saved to {}", path);
    }

    if let Some(ref path) = args.flag_view_out {
        let hits = config.raycaster().cast_all(&maze_grid, &pose, config.screen_width as usize)?;
        let img = renderers::render_first_person(&hits, config.screen_height);
        renderers::save_png(&img, path).chain_err(|| format!("Failed to write view image {}", path))?;
        info!("first person view saved to {}", path);
    }

    Ok(())
}

/// Config file (or difficulty preset, or defaults) with any command line flags layered on top.
fn level_config_from_args(args: &MazeArgs) -> Result<LevelConfig> {
    let mut config = match (&args.flag_config, &args.flag_difficulty) {
        (Some(path), _) => LevelConfig::load(path)?,
        (None, Some(difficulty)) => LevelConfig::for_difficulty(difficulty.parse::<Difficulty>()?),
        (None, None) => LevelConfig::default(),
    };

    if let Some(ref algorithm) = args.flag_algorithm {
        config.algorithm = algorithm.clone();
    }
    if let Some(width) = args.flag_width {
        config.width = width;
    }
    if let Some(height) = args.flag_height {
        config.height = height;
    }
    if args.flag_seed.is_some() {
        config.seed = args.flag_seed;
    }
    if let Some(braid_chance) = args.flag_braid {
        config.braid_chance = braid_chance;
    }
    if let Some(radius) = args.flag_fog_radius {
        config.fog_enabled = true;
        config.vision_radius = radius;
    }
    Ok(config)
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze_grid: &Grid, file_path: &str) -> Result<()> {

    let mut graph_data = String::new();
    graph_data.push_str(&format!("{} {}\n", maze_grid.size(), maze_grid.passages_count()));

    let to_index = |coord: Coordinate| {
        maze_grid.grid_coordinate_to_index(coord)
            .ok_or_else(|| Error::from(format!("passage at invalid coordinate {:?}", coord)))
    };
    for (src, dst) in maze_grid.iter_passages() {
        let src_as_1_based_index = to_index(src)? + 1;
        let dst_as_1_based_index = to_index(dst)? + 1;
        graph_data.push_str(&format!("{} {}\n", src_as_1_based_index, dst_as_1_based_index));
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
