//! Population lifecycle: initial placement, spawning and removal.

use crate::agent::{Agent, AgentId};
use crate::config::AgentConfig;
use crate::entity::{Destination, DestinationId};
use crate::error::{ConfigError, Result, SimError};
use crate::grid::{Grid, Position};
use rand::seq::SliceRandom;
use rand::Rng;

/// The eight cells surrounding a spawn anchor
const SPAWN_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Live agents in ascending id order
#[derive(Clone, Debug)]
pub struct Population {
    agents: Vec<Agent>,
    next_id: AgentId,
    initial_count: usize,
    ceiling: usize,
    personal_space_radius: f64,
    memory_limit: usize,
    removed_total: u64,
    spawned_total: u64,
}

impl Population {
    /// Empty population sized from config
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            agents: Vec::with_capacity(config.count + config.spawn_headroom),
            next_id: 0,
            initial_count: config.count,
            ceiling: config.count + config.spawn_headroom,
            personal_space_radius: config.personal_space_radius,
            memory_limit: config.memory_limit,
            removed_total: 0,
            spawned_total: 0,
        }
    }

    fn new_agent(&mut self, pos: Position, destination: DestinationId) -> Agent {
        let id = self.next_id;
        self.next_id += 1;
        Agent::new(id, pos, destination, self.personal_space_radius, self.memory_limit)
    }

    /// Place the initial agents on random empty cells, then give each a random
    /// destination (with replacement).
    pub fn generate<R: Rng>(&mut self, grid: &mut Grid, destinations: &[Destination], rng: &mut R) -> Result<()> {
        if destinations.is_empty() {
            return Err(ConfigError::Invalid("cannot assign destinations: none configured".to_string()).into());
        }

        let available = grid.empty_count();
        if available < self.initial_count {
            return Err(SimError::Capacity {
                requested: self.initial_count,
                available,
            });
        }

        let (width, height) = (grid.width() as i32, grid.height() as i32);
        let first = self.agents.len();

        for _ in 0..self.initial_count {
            // Terminates: at least one empty cell is left for every agent still to place
            let pos = loop {
                let candidate = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
                if grid.is_empty(candidate) {
                    break candidate;
                }
            };

            let agent = self.new_agent(pos, 0);
            let placed = grid.place(agent.occupant(), pos);
            debug_assert!(placed.is_success());
            self.agents.push(agent);
        }

        for agent in &mut self.agents[first..] {
            agent.destination = rng.gen_range(0..destinations.len());
        }

        log::debug!("Placed {} agents on a {}x{} grid", self.initial_count, width, height);
        Ok(())
    }

    /// Try to add one agent next to a random destination.
    ///
    /// Returns `None` when the population is at its ceiling or every cell around
    /// the chosen anchor is blocked. The spawned agent's goal is drawn again,
    /// independently of the anchor.
    pub fn spawn<R: Rng>(&mut self, grid: &mut Grid, destinations: &[Destination], rng: &mut R) -> Option<AgentId> {
        if self.agents.len() >= self.ceiling || destinations.is_empty() {
            return None;
        }

        let anchor = destinations[rng.gen_range(0..destinations.len())].pos;

        let mut offsets = SPAWN_OFFSETS;
        offsets.shuffle(rng);

        let Some(pos) = offsets
            .iter()
            .map(|&(dx, dy)| anchor.offset(dx, dy))
            .find(|&p| grid.is_empty(p))
        else {
            log::debug!("Spawn blocked: no free cell around {}", anchor);
            return None;
        };

        let destination = rng.gen_range(0..destinations.len());
        let agent = self.new_agent(pos, destination);
        let id = agent.id;
        let placed = grid.place(agent.occupant(), pos);
        debug_assert!(placed.is_success());
        // Ids only grow, so pushing keeps the order
        self.agents.push(agent);
        self.spawned_total += 1;

        log::debug!("Spawned agent {} at {} heading to destination {}", id, pos, destination);
        Some(id)
    }

    /// Place one agent on a chosen cell. Bypasses the ceiling.
    ///
    /// `destination` must index the world's destination list.
    pub(crate) fn insert(&mut self, grid: &mut Grid, pos: Position, destination: DestinationId) -> Option<AgentId> {
        if !grid.is_empty(pos) {
            return None;
        }
        let agent = self.new_agent(pos, destination);
        let id = agent.id;
        let placed = grid.place(agent.occupant(), pos);
        debug_assert!(placed.is_success());
        self.agents.push(agent);
        Some(id)
    }

    /// Take an agent off the grid and out of the population
    pub fn remove(&mut self, id: AgentId, grid: &mut Grid) -> Option<Agent> {
        let idx = self.index_of(id)?;
        let agent = self.agents.remove(idx);
        grid.remove(agent.occupant());
        self.removed_total += 1;
        Some(agent)
    }

    #[inline]
    fn index_of(&self, id: AgentId) -> Option<usize> {
        self.agents.binary_search_by_key(&id, |a| a.id).ok()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.index_of(id).map(|idx| &self.agents[idx])
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.index_of(id).map(move |idx| &mut self.agents[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Ids in processing order
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id).collect()
    }

    pub fn positions(&self) -> Vec<(AgentId, Position)> {
        self.agents.iter().map(|a| (a.id, a.pos)).collect()
    }

    /// Cells of every agent except `id`
    pub fn positions_except(&self, id: AgentId) -> Vec<Position> {
        self.agents.iter().filter(|a| a.id != id).map(|a| a.pos).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// True when no agent moved on its latest evaluation
    pub fn all_at_rest(&self) -> bool {
        self.agents.iter().all(|a| !a.has_moved)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }
}
