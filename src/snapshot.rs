//! Snapshot structures for renderers and plotting tools.
//!
//! These are owned, serializable copies of the simulation state; nothing in
//! them feeds back into the world.

use crate::agent::AgentId;
use crate::entity::{Destination, DestinationId, Obstacle};
use crate::grid::Position;
use crate::metrics::ProximityZone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// View of one agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub pos: Position,
    pub destination: DestinationId,
    /// Recently visited cells, oldest first
    pub trail: Vec<Position>,
    pub has_moved: bool,
    pub reached_destination: bool,
}

/// One visited cell and how often agents stepped into it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitCount {
    pub pos: Position,
    pub count: u64,
}

/// Complete world snapshot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Current tick
    pub time: u64,
    pub width: usize,
    pub height: usize,
    pub agents: Vec<AgentView>,
    pub destinations: Vec<Destination>,
    pub obstacles: Vec<Obstacle>,
    /// Sorted by position
    pub visited_counts: Vec<VisitCount>,
    pub collision_history: Vec<u64>,
    pub intruders_history: BTreeMap<ProximityZone, Vec<u64>>,
    pub at_rest: bool,
}

impl WorldSnapshot {
    /// Create a snapshot from the current world state
    pub fn from_world(world: &crate::World) -> Self {
        let agents = world
            .population
            .iter()
            .map(|a| AgentView {
                id: a.id,
                pos: a.pos,
                destination: a.destination,
                trail: a.memory().iter().copied().collect(),
                has_moved: a.has_moved,
                reached_destination: a.reached_destination,
            })
            .collect();

        let mut visited_counts: Vec<VisitCount> = world
            .metrics
            .visited_counts()
            .iter()
            .map(|(&pos, &count)| VisitCount { pos, count })
            .collect();
        visited_counts.sort_by_key(|v| (v.pos.y, v.pos.x));

        Self {
            time: world.time,
            width: world.grid.width(),
            height: world.grid.height(),
            agents,
            destinations: world.destinations.clone(),
            obstacles: world.obstacles.clone(),
            visited_counts,
            collision_history: world.metrics.collision_history().to_vec(),
            intruders_history: world.metrics.intruders_history().clone(),
            at_rest: world.is_at_rest(),
        }
    }

    /// Agent view by id
    pub fn agent(&self, id: AgentId) -> Option<&AgentView> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
