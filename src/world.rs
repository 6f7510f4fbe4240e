//! World simulation engine - tick scheduler and run loop.

use crate::agent::{AgentId, StepOutcome};
use crate::config::Config;
use crate::entity::{Destination, DestinationId, Obstacle};
use crate::error::{Result, SimError};
use crate::grid::{Grid, Occupant, Position};
use crate::metrics::{Metrics, ZoneCounts};
use crate::population::Population;
use crate::snapshot::WorldSnapshot;
use crate::stats::{Stats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The simulation world
pub struct World {
    // Space
    pub grid: Grid,
    pub destinations: Vec<Destination>,
    pub obstacles: Vec<Obstacle>,

    // Agents
    pub population: Population,

    // State
    pub time: u64,

    // Configuration
    pub config: Config,

    // Measurements
    pub metrics: Metrics,
    pub stats: Stats,
    pub stats_history: StatsHistory,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,

    // Per-tick counters, cleared after stats are taken
    arrivals_this_step: usize,
    removals_this_step: usize,
    spawns_this_step: usize,
}

/// Outcome of [`World::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub at_rest: bool,
    pub population: usize,
    pub removed: u64,
    pub spawned: u64,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Run Summary ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "At rest: {}", self.at_rest)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Exited: {}", self.removed)?;
        writeln!(f, "Spawned: {}", self.spawned)?;
        Ok(())
    }
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Grid::new(config.world.width, config.world.height);

        let destinations = build_destinations(&config, &mut rng);
        let obstacles = place_obstacles(&config, &destinations, &mut grid, &mut rng)?;

        let mut population = Population::new(&config.agents);
        population.generate(&mut grid, &destinations, &mut rng)?;

        log::info!(
            "World created: {}x{} grid, {} agents, {} destinations, {} obstacles (seed {})",
            grid.width(),
            grid.height(),
            population.len(),
            destinations.len(),
            obstacles.len(),
            seed
        );

        let mut world = Self {
            grid,
            destinations,
            obstacles,
            population,
            time: 0,
            stats_history: StatsHistory::new(config.logging.stats_interval),
            config,
            metrics: Metrics::new(),
            stats: Stats::new(),
            rng,
            seed,
            arrivals_this_step: 0,
            removals_this_step: 0,
            spawns_this_step: 0,
        };
        world.stats.update(&world.population);

        Ok(world)
    }

    /// Put an extra agent on a chosen cell, outside the spawn policy.
    /// Returns `None` if the cell is blocked or the destination unknown.
    pub fn add_agent(&mut self, pos: Position, destination: DestinationId) -> Option<AgentId> {
        if destination >= self.destinations.len() {
            return None;
        }
        self.population.insert(&mut self.grid, pos, destination)
    }

    /// Advance the simulation by one tick.
    ///
    /// Agents act one after another in ascending id order and each move is
    /// applied to the grid immediately, so later agents see earlier agents'
    /// new cells. Then the spawn roll, then the proximity scan.
    pub fn step(&mut self) {
        // Phase 1: sequential movement
        for id in self.population.ids() {
            let others = self.population.positions_except(id);
            let Some(agent) = self.population.get_mut(id) else {
                continue;
            };
            let destination = &self.destinations[agent.destination];

            let outcome = agent.step(destination, &others, &mut self.grid, &mut self.metrics);

            if let StepOutcome::Arrived { exit } = outcome {
                self.arrivals_this_step += 1;
                if exit {
                    self.population.remove(id, &mut self.grid);
                    self.removals_this_step += 1;
                    log::debug!("Agent {} left through an exit at tick {}", id, self.time);
                }
            }
        }

        // Phase 2: spawn roll
        let p = self.config.spawn.probability;
        if p > 0.0 && self.rng.gen_bool(p) {
            self.spawn_agent();
        }

        // Phase 3: metrics
        let zones = self.metrics.count_intruders(&self.population.positions());
        self.metrics.record_collisions();

        self.time += 1;

        // Phase 4: statistics
        self.update_stats(zones);
    }

    /// Try to spawn one agent next to a random destination
    pub fn spawn_agent(&mut self) -> Option<AgentId> {
        let id = self
            .population
            .spawn(&mut self.grid, &self.destinations, &mut self.rng)?;
        self.spawns_this_step += 1;
        Some(id)
    }

    fn update_stats(&mut self, zones: ZoneCounts) {
        self.stats.time = self.time;
        self.stats.arrivals = self.arrivals_this_step;
        self.stats.removals = self.removals_this_step;
        self.stats.spawns = self.spawns_this_step;
        self.stats.zones = zones;
        self.stats.total_visits = self.metrics.total_visits();
        self.stats.update(&self.population);

        if self.stats_history.is_due(self.time) {
            self.stats_history.record(self.stats.clone());
            log::info!("{}", self.stats.summary());
        }

        self.arrivals_this_step = 0;
        self.removals_this_step = 0;
        self.spawns_this_step = 0;
    }

    /// True when every live agent stood still on its latest evaluation
    pub fn is_at_rest(&self) -> bool {
        self.population.all_at_rest()
    }

    /// Step until the crowd is at rest or `max_ticks` have elapsed
    pub fn run(&mut self, max_ticks: u64) -> RunSummary {
        self.run_with_callback(max_ticks, |_, _| {})
    }

    /// Run with callback for progress updates
    pub fn run_with_callback<F>(&mut self, max_ticks: u64, mut callback: F) -> RunSummary
    where
        F: FnMut(&World, u64),
    {
        let start = self.time;
        let mut at_rest = false;

        for i in 0..max_ticks {
            self.step();
            callback(self, i);
            if self.is_at_rest() {
                at_rest = true;
                log::info!("All agents at rest after tick {}", self.time);
                break;
            }
        }

        RunSummary {
            ticks: self.time - start,
            at_rest,
            population: self.live_count(),
            removed: self.population.removed_total(),
            spawned: self.population.spawned_total(),
        }
    }

    /// Current number of live agents
    pub fn live_count(&self) -> usize {
        self.population.len()
    }

    /// Read-only copy of the current state
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::from_world(self)
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Destinations from the config list, or random exits
fn build_destinations<R: Rng>(config: &Config, rng: &mut R) -> Vec<Destination> {
    if !config.destinations.generates_random() {
        return config.destinations.list.clone();
    }

    // Generated exits stay off the last row and column
    let max_x = (config.world.width as i32 - 1).max(1);
    let max_y = (config.world.height as i32 - 1).max(1);

    (0..config.destinations.count)
        .map(|_| Destination::exit(Position::new(rng.gen_range(0..max_x), rng.gen_range(0..max_y))))
        .collect()
}

/// Put obstacles on the grid, either from the config list or scattered on
/// random free cells that are not destinations
fn place_obstacles<R: Rng>(
    config: &Config,
    destinations: &[Destination],
    grid: &mut Grid,
    rng: &mut R,
) -> Result<Vec<Obstacle>> {
    let cells: Vec<Position> = if config.obstacles.randomize {
        let free: Vec<Position> = grid
            .empty_cells()
            .into_iter()
            .filter(|p| destinations.iter().all(|d| d.pos != *p))
            .collect();
        if free.len() < config.obstacles.count {
            return Err(SimError::Capacity {
                requested: config.obstacles.count,
                available: free.len(),
            });
        }
        free.choose_multiple(rng, config.obstacles.count).copied().collect()
    } else {
        config.obstacles.list.clone()
    };

    let mut obstacles = Vec::with_capacity(cells.len());
    for pos in cells {
        if destinations.iter().any(|d| d.pos == pos) {
            log::warn!("Obstacle at {} covers a destination; agents heading there cannot arrive", pos);
        }
        if grid.place(Occupant::Obstacle(obstacles.len()), pos).is_success() {
            obstacles.push(Obstacle::new(pos));
        } else {
            log::warn!("Skipping obstacle at {}: cell unavailable", pos);
        }
    }

    Ok(obstacles)
}
