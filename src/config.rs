//! Level settings: maze size and algorithm, fog, and the first person camera.

use error_chain::bail;
use log::debug;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::errors::*;
use crate::generators::{self, Algorithm};
use crate::grid::Grid;
use crate::raycaster::{Raycaster, DEFAULT_MAX_RAY_STEPS};
use crate::units::{Height, Width};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Expert,
    Nightmare,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [Difficulty::Easy,
                                      Difficulty::Normal,
                                      Difficulty::Hard,
                                      Difficulty::Expert,
                                      Difficulty::Nightmare];
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Difficulty> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            "nightmare" => Ok(Difficulty::Nightmare),
            _ => bail!("unknown difficulty '{}'", s),
        }
    }
}

/// Everything needed to build and look at one level.
///
/// Missing fields in a JSON config take their `Default` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: u32,
    pub height: u32,
    pub algorithm: String,
    pub seed: Option<u64>,
    /// Probability of opening each dead end after generation, 0 keeps the maze perfect.
    pub braid_chance: f64,
    pub fog_enabled: bool,
    pub vision_radius: f64,
    /// Degrees.
    pub field_of_view: f64,
    pub screen_width: u32,
    pub screen_height: u32,
    pub max_ray_steps: usize,
}

impl Default for LevelConfig {
    fn default() -> LevelConfig {
        LevelConfig {
            width: 20,
            height: 15,
            algorithm: Algorithm::DepthFirstBacktracker.name().to_string(),
            seed: None,
            braid_chance: 0.0,
            fog_enabled: false,
            vision_radius: 8.0,
            field_of_view: 60.0,
            screen_width: 320,
            screen_height: 200,
            max_ray_steps: DEFAULT_MAX_RAY_STEPS,
        }
    }
}

impl LevelConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> LevelConfig {
        let (width, height, fog_radius, braid_chance) = match difficulty {
            Difficulty::Easy => (20, 15, None, 0.0),
            Difficulty::Normal => (30, 20, Some(8.0), 0.1),
            Difficulty::Hard => (45, 30, Some(5.0), 0.2),
            Difficulty::Expert => (60, 40, Some(4.0), 0.3),
            Difficulty::Nightmare => (80, 50, Some(3.0), 0.4),
        };
        let defaults = LevelConfig::default();
        LevelConfig {
            width,
            height,
            braid_chance,
            fog_enabled: fog_radius.is_some(),
            vision_radius: fog_radius.unwrap_or(defaults.vision_radius),
            ..defaults
        }
    }

    pub fn from_json(json: &str) -> Result<LevelConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<LevelConfig> {
        let path = path.as_ref();
        let file = File::open(path).chain_err(|| format!("unable to open config {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn algorithm(&self) -> Result<Algorithm> {
        self.algorithm.parse()
    }

    /// Field of view in radians.
    pub fn field_of_view(&self) -> f64 {
        self.field_of_view.to_radians()
    }

    /// The fog of war radius, None when the fog is off.
    pub fn fog_radius(&self) -> Option<f64> {
        if self.fog_enabled {
            Some(self.vision_radius)
        } else {
            None
        }
    }

    pub fn raycaster(&self) -> Raycaster {
        Raycaster::with_max_steps(self.max_ray_steps)
    }

    /// Generate the level's maze, braided if configured. One random source feeds both steps so
    /// a seeded config always builds the same level.
    pub fn build_maze(&self) -> Result<Grid> {
        let algorithm = self.algorithm()?;
        let mut grid = Grid::new(Width(self.width), Height(self.height))?;
        let mut rng = generators::seeded_rng(self.seed);

        algorithm.carve(&mut grid, &mut rng, &mut |_, _| {})?;
        let loops = generators::braid(&mut grid, self.braid_chance, &mut rng)?;

        debug!("built {}x{} level with {} (seed {:?}), {} loops added",
               self.width,
               self.height,
               algorithm,
               self.seed,
               loops);
        Ok(grid)
    }
}
