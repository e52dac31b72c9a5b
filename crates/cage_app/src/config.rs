//! Runner configuration

use cage_engine::config::{CageConfig, Config};
use serde::{Deserialize, Serialize};

/// Everything the runner needs: the cage itself plus run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Physics and creature settings
    pub cage: CageConfig,

    /// Run loop settings
    pub run: RunConfig,
}

/// Run loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to simulate
    pub steps: u64,

    /// Ticks between food spawns
    pub food_interval: u64,

    /// No food is spawned while more than this many pellets exist
    pub food_cap: usize,

    /// Seconds before the eater is respawned regardless of energy
    pub episode_seconds: f32,

    /// Interactions per learning episode
    pub max_samples: usize,

    /// Energy lost per second while the eat task runs
    pub decay: f32,

    /// Largest change of the random acceleration command per sample
    pub acceleration_step: f32,

    /// Probability of a jump request per sample
    pub jump_chance: f64,

    /// Seed of the random controller and food placement
    pub seed: u64,

    /// Ticks between progress reports
    pub report_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut cage = CageConfig::default();
        cage.world.damping = 0.15;
        Self {
            cage,
            run: RunConfig::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 3000,
            food_interval: 40,
            food_cap: 80,
            episode_seconds: 30.0,
            max_samples: 100_000,
            decay: 0.01,
            acceleration_step: 0.2,
            jump_chance: 0.02,
            seed: 7,
            report_interval: 100,
        }
    }
}

impl Config for AppConfig {}

impl AppConfig {
    /// Load from `path`, or use the defaults when no path is given
    pub fn load(path: Option<&str>) -> Result<Self, cage_engine::config::ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}
