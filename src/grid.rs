//! Bounded occupancy grid with single-occupant cells.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Integer cell coordinate. Signed so neighbour offsets can step off the grid
/// and be rejected by a bounds check instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell shifted by `(dx, dy)`
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan (taxicab) distance
    #[inline]
    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance
    #[inline]
    pub fn euclidean(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Anything that can hold a grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Agent(AgentId),
    /// Index into the world's obstacle list
    Obstacle(usize),
}

/// Result of a grid mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellResult {
    Success,
    Failed(FailReason),
}

impl CellResult {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, CellResult::Success)
    }
}

/// Why a grid mutation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    Occupied,
    OutOfBounds,
    /// The occupant is not on the grid (move/remove)
    NotOnGrid,
    /// The occupant already holds a cell (place)
    AlreadyPlaced,
}

/// Fixed-size occupancy map.
///
/// Invariant: every cell holds at most one occupant, and `locations` is the
/// exact inverse of `cells`.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    /// cells[y * width + x]
    cells: Vec<Option<Occupant>>,
    locations: HashMap<Occupant, Position>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
            locations: HashMap::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Half-open bounds check: `[0, width) x [0, height)`
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && (pos.x as usize) < self.width && pos.y >= 0 && (pos.y as usize) < self.height
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// True if `pos` is on the grid and unoccupied
    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.index(pos).map_or(false, |idx| self.cells[idx].is_none())
    }

    /// Occupant at `pos`, if any
    #[inline]
    pub fn occupant_at(&self, pos: Position) -> Option<Occupant> {
        self.index(pos).and_then(|idx| self.cells[idx])
    }

    /// Cell held by `occupant`, if it is on the grid
    #[inline]
    pub fn position_of(&self, occupant: Occupant) -> Option<Position> {
        self.locations.get(&occupant).copied()
    }

    /// Put a new occupant on an empty cell
    pub fn place(&mut self, occupant: Occupant, pos: Position) -> CellResult {
        let Some(idx) = self.index(pos) else {
            return CellResult::Failed(FailReason::OutOfBounds);
        };
        if self.locations.contains_key(&occupant) {
            return CellResult::Failed(FailReason::AlreadyPlaced);
        }
        if self.cells[idx].is_some() {
            return CellResult::Failed(FailReason::Occupied);
        }

        self.cells[idx] = Some(occupant);
        self.locations.insert(occupant, pos);
        CellResult::Success
    }

    /// Vacate the occupant's cell and take `to` in one step.
    /// Leaves the grid untouched on failure.
    pub fn move_to(&mut self, occupant: Occupant, to: Position) -> CellResult {
        let Some(from) = self.position_of(occupant) else {
            return CellResult::Failed(FailReason::NotOnGrid);
        };
        let Some(to_idx) = self.index(to) else {
            return CellResult::Failed(FailReason::OutOfBounds);
        };
        if self.cells[to_idx].is_some() {
            return CellResult::Failed(FailReason::Occupied);
        }

        if let Some(from_idx) = self.index(from) {
            self.cells[from_idx] = None;
        }
        self.cells[to_idx] = Some(occupant);
        self.locations.insert(occupant, to);
        CellResult::Success
    }

    /// Vacate the occupant's cell, returning where it was
    pub fn remove(&mut self, occupant: Occupant) -> Option<Position> {
        let pos = self.locations.remove(&occupant)?;
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = None;
        }
        Some(pos)
    }

    /// All unoccupied cells in row-major order
    pub fn empty_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(idx, _)| Position::new((idx % self.width) as i32, (idx / self.width) as i32))
            .collect()
    }

    #[inline]
    pub fn empty_count(&self) -> usize {
        self.cells.len() - self.locations.len()
    }

    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_query() {
        let mut grid = Grid::new(5, 4);
        let pos = Position::new(2, 3);

        assert!(grid.is_empty(pos));
        assert!(grid.place(Occupant::Agent(1), pos).is_success());
        assert!(!grid.is_empty(pos));
        assert_eq!(grid.occupant_at(pos), Some(Occupant::Agent(1)));
        assert_eq!(grid.position_of(Occupant::Agent(1)), Some(pos));
        assert_eq!(grid.empty_count(), 19);
    }

    #[test]
    fn test_single_occupancy() {
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(1, 1);

        assert!(grid.place(Occupant::Agent(1), pos).is_success());
        assert_eq!(
            grid.place(Occupant::Obstacle(0), pos),
            CellResult::Failed(FailReason::Occupied)
        );
        assert_eq!(grid.occupant_at(pos), Some(Occupant::Agent(1)));
        assert_eq!(grid.position_of(Occupant::Obstacle(0)), None);
    }

    #[test]
    fn test_bounds_are_half_open() {
        let mut grid = Grid::new(3, 2);

        assert!(grid.in_bounds(Position::new(2, 1)));
        assert!(!grid.in_bounds(Position::new(3, 1)));
        assert!(!grid.in_bounds(Position::new(2, 2)));
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(!grid.is_empty(Position::new(3, 0)));
        assert_eq!(
            grid.place(Occupant::Agent(7), Position::new(0, -1)),
            CellResult::Failed(FailReason::OutOfBounds)
        );
    }

    #[test]
    fn test_move_vacates_old_cell() {
        let mut grid = Grid::new(5, 5);
        let a = Occupant::Agent(1);
        grid.place(a, Position::new(0, 0));

        assert!(grid.move_to(a, Position::new(1, 0)).is_success());
        assert!(grid.is_empty(Position::new(0, 0)));
        assert_eq!(grid.occupant_at(Position::new(1, 0)), Some(a));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_blocked_move_is_noop() {
        let mut grid = Grid::new(5, 5);
        let a = Occupant::Agent(1);
        let b = Occupant::Agent(2);
        grid.place(a, Position::new(0, 0));
        grid.place(b, Position::new(1, 0));

        assert_eq!(
            grid.move_to(a, Position::new(1, 0)),
            CellResult::Failed(FailReason::Occupied)
        );
        assert_eq!(
            grid.move_to(a, Position::new(-1, 0)),
            CellResult::Failed(FailReason::OutOfBounds)
        );
        assert_eq!(grid.position_of(a), Some(Position::new(0, 0)));
        assert_eq!(grid.position_of(b), Some(Position::new(1, 0)));
    }

    #[test]
    fn test_remove() {
        let mut grid = Grid::new(5, 5);
        let a = Occupant::Agent(3);
        grid.place(a, Position::new(4, 4));

        assert_eq!(grid.remove(a), Some(Position::new(4, 4)));
        assert!(grid.is_empty(Position::new(4, 4)));
        assert_eq!(grid.remove(a), None);
        assert_eq!(
            grid.move_to(a, Position::new(0, 0)),
            CellResult::Failed(FailReason::NotOnGrid)
        );
    }

    #[test]
    fn test_empty_cells_row_major() {
        let mut grid = Grid::new(2, 2);
        grid.place(Occupant::Obstacle(0), Position::new(1, 0));

        assert_eq!(
            grid.empty_cells(),
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]
        );
    }

    #[test]
    fn test_distances() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);

        assert_eq!(a.manhattan(b), 7);
        assert!((a.euclidean(b) - 5.0).abs() < 1e-12);
    }
}
