//! # CROWDSIM
//!
//! Pedestrian crowd simulator on a discrete grid.
//!
//! ## Features
//!
//! - **Single occupancy**: at most one agent or obstacle per cell
//! - **Personal space**: agents sidestep neighbours with an inverse-proportional repulsion field
//! - **Short memory**: recently visited cells are penalised to stop oscillation
//! - **Exits and waypoints**: agents leave at exits and stop at waypoints
//! - **Metrics**: visit-density heat maps and proximity-zone counts per tick
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crowdsim::{Config, World};
//!
//! let config = Config::default();
//! let mut world = World::new(config).unwrap();
//!
//! // Tick until everyone has arrived, or give up after 1000 ticks
//! let summary = world.run(1000);
//!
//! println!("{}", summary);
//! println!("Agents left: {}", world.live_count());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use crowdsim::Config;
//!
//! let mut config = Config::default();
//! config.agents.count = 40;
//! config.world.width = 30;
//! config.spawn.probability = 0.0;
//! assert!(config.validate().is_ok());
//! ```

pub mod agent;
pub mod config;
pub mod entity;
pub mod error;
pub mod export;
pub mod grid;
pub mod metrics;
pub mod population;
pub mod snapshot;
pub mod stats;
pub mod world;

// Re-export main types
pub use agent::{Agent, AgentId};
pub use config::Config;
pub use entity::{Destination, Obstacle, Preset};
pub use error::{ConfigError, SimError};
pub use grid::{Grid, Position};
pub use world::{RunSummary, World};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(ticks: u64, agents: usize) -> error::Result<BenchmarkResult> {
    use std::time::Instant;

    let mut config = Config::default();
    config.agents.count = agents;
    // Keep the grid roughly a quarter full
    let side = ((agents * 4) as f64).sqrt().ceil().max(20.0) as usize;
    config.world.width = side;
    config.world.height = side;

    let mut world = World::new(config)?;

    let start = Instant::now();
    let summary = world.run(ticks);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        ticks: summary.ticks,
        initial_agents: agents,
        final_agents: world.live_count(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: summary.ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub initial_agents: usize,
    pub final_agents: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Agents: {} -> {}", self.initial_agents, self.final_agents)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        Ok(())
    }
}
