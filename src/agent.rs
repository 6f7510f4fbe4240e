//! Pedestrian agents and their movement policy.
//!
//! Each tick an agent either detects arrival at its destination, walks
//! straight at it when nobody is inside its personal space, or scores its four
//! axis-aligned neighbour cells with a repulsion field and takes the cheapest
//! free one.

use crate::entity::{Destination, DestinationId};
use crate::grid::{Grid, Occupant, Position};
use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Unique agent identifier, never reused within a run
pub type AgentId = u64;

/// Cost added to a candidate cell the agent visited recently
pub const MEMORY_PENALTY: f64 = 100.0;

/// Cost assigned to the destination cell whenever it is a candidate
pub const DESTINATION_COST: f64 = -1.0;

/// The four axis-aligned moves, in candidate evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Evaluation order; ties in cost keep this order
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// A scored neighbour cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub direction: Direction,
    pub pos: Position,
    pub cost: f64,
}

/// What happened to an agent during one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Standing on the destination. `exit` means the agent must be removed.
    Arrived { exit: bool },
    /// Moved into a new cell
    Moved(Position),
    /// Tried to move but every option was blocked
    Stayed,
}

/// A pedestrian on the grid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    // Identity
    pub id: AgentId,

    // Position and goal
    pub pos: Position,
    pub destination: DestinationId,

    pub personal_space_radius: f64,

    // Short-term memory of visited cells, oldest first
    memory: VecDeque<Position>,
    memory_limit: usize,

    // Flags
    pub reached_destination: bool,
    pub has_moved: bool,
    pub alive: bool,
}

impl Agent {
    pub fn new(
        id: AgentId,
        pos: Position,
        destination: DestinationId,
        personal_space_radius: f64,
        memory_limit: usize,
    ) -> Self {
        Self {
            id,
            pos,
            destination,
            personal_space_radius,
            memory: VecDeque::with_capacity(memory_limit + 1),
            memory_limit,
            reached_destination: false,
            has_moved: false,
            alive: true,
        }
    }

    #[inline]
    pub fn occupant(&self) -> Occupant {
        Occupant::Agent(self.id)
    }

    /// Recently visited cells, oldest first
    #[inline]
    pub fn memory(&self) -> &VecDeque<Position> {
        &self.memory
    }

    #[inline]
    pub fn remembers(&self, pos: Position) -> bool {
        self.memory.contains(&pos)
    }

    /// Evaluate one tick.
    ///
    /// `others` holds the current cells of every other live agent, so agents
    /// processed earlier in the same tick are seen at their new positions.
    /// Exit arrivals only flag the agent as dead; the caller takes it off the
    /// grid and out of the population.
    pub fn step(
        &mut self,
        destination: &Destination,
        others: &[Position],
        grid: &mut Grid,
        metrics: &mut Metrics,
    ) -> StepOutcome {
        if self.check_arrival(destination) {
            self.has_moved = false;
            return StepOutcome::Arrived {
                exit: destination.preset.is_exit(),
            };
        }

        self.has_moved = true;

        let intruders = self.intruders(others);
        let moved = if intruders.is_empty() {
            self.approach(destination.pos, grid, metrics)
        } else {
            self.avoid(&intruders, destination.pos, grid, metrics)
        };

        match moved {
            Some(pos) => StepOutcome::Moved(pos),
            None => StepOutcome::Stayed,
        }
    }

    /// Arrival uses Manhattan distance: only the destination cell itself counts
    fn check_arrival(&mut self, destination: &Destination) -> bool {
        if self.pos.manhattan(destination.pos) < 1 {
            self.reached_destination = true;
            if destination.preset.is_exit() {
                self.alive = false;
            }
            true
        } else {
            false
        }
    }

    /// Other agents within the personal-space radius (Euclidean)
    pub fn intruders(&self, others: &[Position]) -> Vec<Position> {
        others
            .iter()
            .copied()
            .filter(|&p| self.pos.euclidean(p) <= self.personal_space_radius)
            .collect()
    }

    /// One step along the axis with the larger gap; ties go along x
    pub fn direct_step(&self, goal: Position) -> Position {
        let dx = goal.x - self.pos.x;
        let dy = goal.y - self.pos.y;
        if dx.abs() >= dy.abs() {
            self.pos.offset(if dx > 0 { 1 } else { -1 }, 0)
        } else {
            self.pos.offset(0, if dy > 0 { 1 } else { -1 })
        }
    }

    fn approach(&mut self, goal: Position, grid: &mut Grid, metrics: &mut Metrics) -> Option<Position> {
        let target = self.direct_step(goal);
        if grid.is_empty(target) && self.relocate(target, grid, metrics) {
            Some(target)
        } else {
            None
        }
    }

    /// In-bounds neighbour cells sorted by ascending cost
    pub fn score_candidates(&self, intruders: &[Position], goal: Position, grid: &Grid) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Direction::ALL
            .iter()
            .filter_map(|&direction| {
                let (dx, dy) = direction.delta();
                let pos = self.pos.offset(dx, dy);
                if !grid.in_bounds(pos) {
                    return None;
                }
                Some(Candidate {
                    direction,
                    pos,
                    cost: self.cell_cost(pos, intruders, goal),
                })
            })
            .collect();

        // Stable: equal costs keep Direction::ALL order
        candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        candidates
    }

    /// Repulsion from intruders plus the backtracking penalty
    pub fn cell_cost(&self, pos: Position, intruders: &[Position], goal: Position) -> f64 {
        if pos == goal {
            return DESTINATION_COST;
        }

        let radius = self.personal_space_radius;
        let mut cost: f64 = intruders
            .iter()
            .map(|&intruder| ((radius - pos.euclidean(intruder)) / radius).clamp(0.0, 1.0))
            .filter(|&proximity| proximity > 0.0)
            .map(|proximity| 1.0 / proximity)
            .sum();

        if self.remembers(pos) {
            cost += MEMORY_PENALTY;
        }
        cost
    }

    fn avoid(
        &mut self,
        intruders: &[Position],
        goal: Position,
        grid: &mut Grid,
        metrics: &mut Metrics,
    ) -> Option<Position> {
        for candidate in self.score_candidates(intruders, goal, grid) {
            if grid.is_empty(candidate.pos) && self.relocate(candidate.pos, grid, metrics) {
                return Some(candidate.pos);
            }
        }
        None
    }

    fn relocate(&mut self, to: Position, grid: &mut Grid, metrics: &mut Metrics) -> bool {
        if !grid.move_to(self.occupant(), to).is_success() {
            return false;
        }
        self.pos = to;
        self.remember(to);
        metrics.record_visit(to);
        true
    }

    /// Push onto the bounded FIFO memory, evicting the oldest cell
    fn remember(&mut self, pos: Position) {
        self.memory.push_back(pos);
        while self.memory.len() > self.memory_limit {
            self.memory.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Preset;

    fn place(grid: &mut Grid, id: AgentId, x: i32, y: i32) -> Agent {
        let agent = Agent::new(id, Position::new(x, y), 0, 2.0, 4);
        assert!(grid.place(agent.occupant(), agent.pos).is_success());
        agent
    }

    #[test]
    fn test_direct_approach() {
        let mut grid = Grid::new(20, 20);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 0, 0);
        let dest = Destination::exit(Position::new(3, 1));

        let outcome = agent.step(&dest, &[], &mut grid, &mut metrics);

        assert_eq!(outcome, StepOutcome::Moved(Position::new(1, 0)));
        assert!(agent.has_moved);
        assert_eq!(grid.occupant_at(Position::new(1, 0)), Some(agent.occupant()));
        assert_eq!(metrics.visits(Position::new(1, 0)), 1);
    }

    #[test]
    fn test_direct_step_axis_choice() {
        let agent = Agent::new(0, Position::new(5, 5), 0, 2.0, 4);

        assert_eq!(agent.direct_step(Position::new(5, 9)), Position::new(5, 6));
        assert_eq!(agent.direct_step(Position::new(1, 4)), Position::new(4, 5));
        // Equal gaps step along x
        assert_eq!(agent.direct_step(Position::new(8, 8)), Position::new(6, 5));
        assert_eq!(agent.direct_step(Position::new(2, 8)), Position::new(4, 5));
    }

    #[test]
    fn test_blocked_direct_step_stays() {
        let mut grid = Grid::new(20, 20);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 0, 0);
        grid.place(Occupant::Obstacle(0), Position::new(1, 0));
        let dest = Destination::exit(Position::new(5, 0));

        let outcome = agent.step(&dest, &[], &mut grid, &mut metrics);

        assert_eq!(outcome, StepOutcome::Stayed);
        assert!(agent.has_moved);
        assert_eq!(agent.pos, Position::new(0, 0));
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn test_arrival_at_exit() {
        let mut grid = Grid::new(10, 10);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 4, 4);
        let dest = Destination::exit(Position::new(4, 4));

        let outcome = agent.step(&dest, &[], &mut grid, &mut metrics);

        assert_eq!(outcome, StepOutcome::Arrived { exit: true });
        assert!(agent.reached_destination);
        assert!(!agent.has_moved);
        assert!(!agent.alive);
    }

    #[test]
    fn test_arrival_at_waypoint_keeps_agent() {
        let mut grid = Grid::new(10, 10);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 4, 4);
        let dest = Destination::new(Position::new(4, 4), Preset::from("waypoint"), Default::default());

        for _ in 0..3 {
            let outcome = agent.step(&dest, &[Position::new(4, 5)], &mut grid, &mut metrics);
            assert_eq!(outcome, StepOutcome::Arrived { exit: false });
            assert!(agent.alive);
            assert!(!agent.has_moved);
            assert_eq!(agent.pos, Position::new(4, 4));
        }
    }

    #[test]
    fn test_memory_bounded_fifo() {
        let mut grid = Grid::new(20, 20);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 0, 0);
        let dest = Destination::exit(Position::new(10, 0));

        for _ in 0..5 {
            agent.step(&dest, &[], &mut grid, &mut metrics);
        }

        assert_eq!(agent.pos, Position::new(5, 0));
        assert_eq!(agent.memory().len(), 4);
        assert!(!agent.remembers(Position::new(1, 0)));
        let trail: Vec<_> = agent.memory().iter().copied().collect();
        assert_eq!(
            trail,
            vec![Position::new(2, 0), Position::new(3, 0), Position::new(4, 0), Position::new(5, 0)]
        );
    }

    #[test]
    fn test_intruder_detection_is_euclidean() {
        let agent = Agent::new(0, Position::new(5, 5), 0, 2.0, 4);
        let others = [
            Position::new(5, 7),  // 2.0
            Position::new(6, 6),  // 1.41
            Position::new(7, 6),  // 2.24
            Position::new(5, 8),  // 3.0
        ];

        let intruders = agent.intruders(&others);
        assert_eq!(intruders, vec![Position::new(5, 7), Position::new(6, 6)]);
    }

    #[test]
    fn test_avoidance_prefers_cell_away_from_intruder() {
        let mut grid = Grid::new(20, 20);
        let mut metrics = Metrics::new();
        let mut a = place(&mut grid, 0, 5, 5);
        let b = place(&mut grid, 1, 5, 6);
        let dest = Destination::exit(Position::new(5, 15));

        let scored = a.score_candidates(&[b.pos], dest.pos, &grid);
        assert_eq!(scored[0].direction, Direction::Down);
        assert_eq!(scored[0].cost, 0.0);
        assert_eq!(scored[1].direction, Direction::Up);
        assert!((scored[1].cost - 1.0).abs() < 1e-12);

        let outcome = a.step(&dest, &[b.pos], &mut grid, &mut metrics);
        assert_eq!(outcome, StepOutcome::Moved(Position::new(5, 4)));
    }

    #[test]
    fn test_repulsion_is_inverse_proportional() {
        let agent = Agent::new(0, Position::new(5, 5), 0, 2.0, 4);
        let goal = Position::new(0, 0);

        // Intruder at distance 1 from the candidate: proximity 0.5, cost 2
        let cost = agent.cell_cost(Position::new(6, 5), &[Position::new(7, 5)], goal);
        assert!((cost - 2.0).abs() < 1e-12);

        // Two intruders add up
        let cost = agent.cell_cost(
            Position::new(6, 5),
            &[Position::new(7, 5), Position::new(6, 6)],
            goal,
        );
        assert!((cost - 4.0).abs() < 1e-12);

        // At or beyond the radius contributes nothing
        let cost = agent.cell_cost(Position::new(6, 5), &[Position::new(8, 5)], goal);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_memory_penalty_and_destination_override() {
        let mut grid = Grid::new(20, 20);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 5, 5);
        let far = Destination::exit(Position::new(5, 10));

        // Walk up once so (5, 6) is remembered
        agent.step(&far, &[], &mut grid, &mut metrics);
        assert_eq!(agent.pos, Position::new(5, 6));
        assert!(agent.remembers(Position::new(5, 6)));

        // The starting cell was never recorded
        assert_eq!(agent.cell_cost(Position::new(5, 5), &[], far.pos), 0.0);
        assert_eq!(agent.cell_cost(Position::new(5, 6), &[], far.pos), MEMORY_PENALTY);
        assert_eq!(
            agent.cell_cost(Position::new(5, 6), &[Position::new(5, 7)], far.pos),
            MEMORY_PENALTY + 2.0
        );

        // The destination wins even if remembered and crowded
        assert_eq!(
            agent.cell_cost(Position::new(5, 6), &[Position::new(5, 7)], Position::new(5, 6)),
            DESTINATION_COST
        );
    }

    #[test]
    fn test_avoidance_skips_occupied_candidates() {
        let mut grid = Grid::new(20, 20);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 5, 5);
        let intruder = place(&mut grid, 1, 5, 6);
        // Block the best cell
        grid.place(Occupant::Obstacle(0), Position::new(5, 4));
        let dest = Destination::exit(Position::new(5, 15));

        let outcome = agent.step(&dest, &[intruder.pos], &mut grid, &mut metrics);

        // Up is occupied by the intruder, so a side cell is taken
        assert_eq!(outcome, StepOutcome::Moved(Position::new(4, 5)));
    }

    #[test]
    fn test_fully_boxed_in_agent_stays() {
        let mut grid = Grid::new(3, 3);
        let mut metrics = Metrics::new();
        let mut agent = place(&mut grid, 0, 1, 1);
        let others: Vec<Position> = [(1, 2), (1, 0), (0, 1), (2, 1)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| place(&mut grid, i as AgentId + 1, x, y).pos)
            .collect();
        let dest = Destination::exit(Position::new(0, 0));

        let outcome = agent.step(&dest, &others, &mut grid, &mut metrics);

        assert_eq!(outcome, StepOutcome::Stayed);
        assert!(agent.has_moved);
        assert_eq!(agent.pos, Position::new(1, 1));
    }

    #[test]
    fn test_corner_candidates_clipped() {
        let grid = Grid::new(5, 5);
        let agent = Agent::new(0, Position::new(0, 0), 0, 2.0, 4);

        let scored = agent.score_candidates(&[Position::new(1, 1)], Position::new(4, 4), &grid);
        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|c| grid.in_bounds(c.pos)));
    }
}
