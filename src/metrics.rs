//! Per-run metrics: cell visit density and proximity-zone counts.

use crate::agent::AgentId;
use crate::grid::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Interpersonal distance bands, checked in order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityZone {
    Intimate,
    Personal,
    Social,
}

impl ProximityZone {
    pub const ALL: [ProximityZone; 3] = [
        ProximityZone::Intimate,
        ProximityZone::Personal,
        ProximityZone::Social,
    ];

    /// Inclusive upper distance bound
    pub fn limit(self) -> f64 {
        match self {
            ProximityZone::Intimate => 2.0,
            ProximityZone::Personal => 5.0,
            ProximityZone::Social => 8.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProximityZone::Intimate => "intimate",
            ProximityZone::Personal => "personal",
            ProximityZone::Social => "social",
        }
    }

    /// First zone whose bound covers `distance`
    pub fn classify(distance: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|zone| distance <= zone.limit())
    }
}

/// Pair counts for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub intimate: u64,
    pub personal: u64,
    pub social: u64,
}

impl ZoneCounts {
    pub fn get(&self, zone: ProximityZone) -> u64 {
        match zone {
            ProximityZone::Intimate => self.intimate,
            ProximityZone::Personal => self.personal,
            ProximityZone::Social => self.social,
        }
    }

    fn bump(&mut self, zone: ProximityZone) {
        match zone {
            ProximityZone::Intimate => self.intimate += 1,
            ProximityZone::Personal => self.personal += 1,
            ProximityZone::Social => self.social += 1,
        }
    }
}

/// Metrics owned by the world and handed to agents when they move
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Cell -> cumulative successful moves into it. Never decremented.
    visited_counts: HashMap<Position, u64>,
    /// Zone -> per-tick pair counts
    intruders_history: BTreeMap<ProximityZone, Vec<u64>>,
    /// Nothing increments this yet; its history is recorded each tick anyway
    collision_count: u64,
    collision_history: Vec<u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            visited_counts: HashMap::new(),
            intruders_history: ProximityZone::ALL.into_iter().map(|z| (z, Vec::new())).collect(),
            collision_count: 0,
            collision_history: Vec::new(),
        }
    }

    /// Count one successful move into `pos`
    #[inline]
    pub fn record_visit(&mut self, pos: Position) {
        *self.visited_counts.entry(pos).or_insert(0) += 1;
    }

    #[inline]
    pub fn visits(&self, pos: Position) -> u64 {
        self.visited_counts.get(&pos).copied().unwrap_or(0)
    }

    pub fn visited_counts(&self) -> &HashMap<Position, u64> {
        &self.visited_counts
    }

    pub fn total_visits(&self) -> u64 {
        self.visited_counts.values().sum()
    }

    /// Visit counts as `height` rows of `width` columns
    pub fn density_matrix(&self, width: usize, height: usize) -> Vec<Vec<u64>> {
        let mut rows = vec![vec![0u64; width]; height];
        for (pos, &count) in &self.visited_counts {
            if pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < width && (pos.y as usize) < height {
                rows[pos.y as usize][pos.x as usize] = count;
            }
        }
        rows
    }

    /// Classify every ordered pair of distinct agents into a proximity zone
    /// and append the totals to the history.
    ///
    /// Both (a, b) and (b, a) are counted, so each unordered pair contributes
    /// two to its zone.
    pub fn count_intruders(&mut self, agents: &[(AgentId, Position)]) -> ZoneCounts {
        let mut counts = ZoneCounts::default();

        for &(id_a, pos_a) in agents {
            for &(id_b, pos_b) in agents {
                if id_a == id_b {
                    continue;
                }
                if let Some(zone) = ProximityZone::classify(pos_a.euclidean(pos_b)) {
                    counts.bump(zone);
                }
            }
        }

        for zone in ProximityZone::ALL {
            self.intruders_history
                .entry(zone)
                .or_default()
                .push(counts.get(zone));
        }
        counts
    }

    /// Append the running collision total for this tick
    pub fn record_collisions(&mut self) {
        self.collision_history.push(self.collision_count);
    }

    pub fn collision_count(&self) -> u64 {
        self.collision_count
    }

    pub fn collision_history(&self) -> &[u64] {
        &self.collision_history
    }

    pub fn intruders_history(&self) -> &BTreeMap<ProximityZone, Vec<u64>> {
        &self.intruders_history
    }

    pub fn zone_history(&self, zone: ProximityZone) -> &[u64] {
        self.intruders_history.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of ticks recorded
    pub fn ticks_recorded(&self) -> usize {
        self.collision_history.len()
    }
}
