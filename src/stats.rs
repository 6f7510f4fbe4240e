//! Statistics tracking for the simulation.

use crate::metrics::{ProximityZone, ZoneCounts};
use crate::population::Population;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Current tick
    pub time: u64,
    /// Live agents after the tick
    pub population: usize,
    /// Agents that attempted movement this tick
    pub moving: usize,
    /// Agents that did not try to move this tick
    pub at_rest: usize,
    /// Arrivals detected this tick
    pub arrivals: usize,
    /// Agents removed at an exit this tick
    pub removals: usize,
    /// Agents spawned this tick
    pub spawns: usize,
    /// Agents removed since the start
    pub removed_total: u64,
    /// Proximity-zone pair counts for this tick
    pub zones: ZoneCounts,
    /// Successful moves since the start
    pub total_visits: u64,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the population-derived fields
    pub fn update(&mut self, population: &Population) {
        self.population = population.len();
        self.moving = population.iter().filter(|a| a.has_moved).count();
        self.at_rest = self.population - self.moving;
        self.removed_total = population.removed_total();
    }

    /// Save stats to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:5} | Pop:{:4} | Moving:{:4} | Arrived:{:3} | Exited:{:5} | Spawned:{:2} | Zones I/P/S: {}/{}/{}",
            self.time,
            self.population,
            self.moving,
            self.arrivals,
            self.removed_total,
            self.spawns,
            self.zones.intimate,
            self.zones.personal,
            self.zones.social,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Whether `time` falls on the recording interval
    pub fn is_due(&self, time: u64) -> bool {
        time % self.interval == 0
    }

    /// Get stats at a specific time (approximate)
    pub fn get_at(&self, time: u64) -> Option<&Stats> {
        let index = (time / self.interval) as usize;
        self.snapshots.get(index)
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.population))
            .collect()
    }

    /// Get a zone's pair count over time
    pub fn zone_series(&self, zone: ProximityZone) -> Vec<(u64, u64)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.zones.get(zone)))
            .collect()
    }

    /// Save history to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
