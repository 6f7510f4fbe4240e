//! Configuration system for crowd simulations.
//!
//! Supports YAML configuration files with sensible defaults. Every section
//! may be omitted from a file and falls back to its default.

use crate::entity::Destination;
use crate::error::ConfigError;
use crate::grid::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub agents: AgentConfig,
    pub destinations: DestinationConfig,
    pub obstacles: ObstacleConfig,
    pub spawn: SpawnConfig,
    pub logging: LoggingConfig,
}

/// Grid dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
}

/// Pedestrian configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Number of agents placed at start
    pub count: usize,
    /// Euclidean radius inside which other agents count as intruders
    pub personal_space_radius: f64,
    /// Number of recently visited cells each agent remembers
    pub memory_limit: usize,
    /// Extra agents allowed above `count` through spawning
    pub spawn_headroom: usize,
}

/// Destination setup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// Number of destinations to generate when randomizing
    pub count: usize,
    /// Ignore `list` and generate random exits
    pub randomize: bool,
    /// Explicit destinations
    pub list: Vec<Destination>,
}

/// Obstacle setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Number of obstacles to generate when randomizing
    pub count: usize,
    /// Ignore `list` and scatter obstacles randomly
    pub randomize: bool,
    /// Explicit obstacle cells
    pub list: Vec<Position>,
}

/// Per-tick spawn roll
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Chance (0.0 - 1.0) that a tick tries to spawn one agent
    pub probability: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Ticks between stats snapshots and log lines
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            count: 10,
            personal_space_radius: 2.0,
            memory_limit: 4,
            spawn_headroom: 10,
        }
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            count: 3,
            randomize: false,
            list: Vec::new(),
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self { probability: 0.2 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

impl DestinationConfig {
    /// Whether destinations are generated rather than taken from `list`
    pub fn generates_random(&self) -> bool {
        self.randomize || self.list.is_empty()
    }

    /// How many destinations the world will end up with
    pub fn effective_count(&self) -> usize {
        if self.generates_random() {
            self.count
        } else {
            self.list.len()
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Maximum number of live agents
    pub fn population_ceiling(&self) -> usize {
        self.agents.count + self.agents.spawn_headroom
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        let (w, h) = (self.world.width, self.world.height);

        if w == 0 || h == 0 {
            return invalid("width and height must be > 0");
        }
        if w > i32::MAX as usize || h > i32::MAX as usize {
            return invalid("width and height must fit in a signed 32-bit coordinate");
        }
        if self.destinations.effective_count() == 0 {
            return invalid("at least one destination is required");
        }
        if !self.agents.personal_space_radius.is_finite() || self.agents.personal_space_radius <= 0.0 {
            return invalid("personal_space_radius must be a positive number");
        }
        if self.agents.memory_limit == 0 {
            return invalid("memory_limit must be > 0");
        }
        if !(0.0..=1.0).contains(&self.spawn.probability) {
            return invalid("spawn probability must be between 0.0 and 1.0");
        }

        let in_bounds = |p: &Position| p.x >= 0 && (p.x as usize) < w && p.y >= 0 && (p.y as usize) < h;

        if !self.destinations.generates_random() {
            if let Some(dest) = self.destinations.list.iter().find(|d| !in_bounds(&d.pos)) {
                return Err(ConfigError::Invalid(format!(
                    "destination {} is outside the {}x{} grid",
                    dest.pos, w, h
                )));
            }
        }

        if !self.obstacles.randomize {
            let mut seen = HashSet::new();
            for pos in &self.obstacles.list {
                if !in_bounds(pos) {
                    return Err(ConfigError::Invalid(format!(
                        "obstacle {} is outside the {}x{} grid",
                        pos, w, h
                    )));
                }
                if !seen.insert(*pos) {
                    return Err(ConfigError::Invalid(format!("duplicate obstacle at {}", pos)));
                }
            }
        }

        Ok(())
    }
}
