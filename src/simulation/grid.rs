//! Bounded 2D grid and its occupancy index
//!
//! The grid only indexes agent identities by cell. Agent records live in the
//! world; the grid never decides whether an agent is alive.

use anyhow::Result;
use log::warn;
use std::collections::{BTreeSet, HashMap};

use super::agent::{AgentId, Occupant};
use super::types::{Heading, Position};

/// The shared spatial environment all agents query and mutate
#[derive(Debug, Clone)]
pub struct GridEnvironment {
    width: i32,
    height: i32,

    /// Occupants per cell. Cells with no occupants have no entry.
    cells: HashMap<Position, BTreeSet<AgentId>>,

    /// Reverse index, one cell per agent
    locations: HashMap<AgentId, Position>,
}

impl GridEnvironment {
    /// Create an empty grid. Both dimensions must be positive.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            anyhow::bail!("Grid dimensions must be positive, got {}x{}", width, height);
        }
        Ok(Self {
            width,
            height,
            cells: HashMap::new(),
            locations: HashMap::new(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_valid(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// One step from `pos` along `heading`. The result may lie outside the grid.
    pub fn next_position(&self, pos: Position, heading: Heading) -> Position {
        let (dx, dy) = heading.delta();
        pos.offset(dx, dy)
    }

    /// All agents of kind `K` at `pos`, in ascending id order
    pub fn agents_at<K: Occupant>(&self, pos: Position) -> Vec<K> {
        match self.cells.get(&pos) {
            Some(occupants) => occupants.iter().filter_map(|id| K::from_agent(*id)).collect(),
            None => Vec::new(),
        }
    }

    /// Every agent at `pos`, whatever its kind
    pub fn occupants_at(&self, pos: Position) -> Vec<AgentId> {
        self.cells
            .get(&pos)
            .map(|occupants| occupants.iter().copied().collect())
            .unwrap_or_default()
    }

    /// True if a car or an accident is at `pos`. Traffic lights never block.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.cells
            .get(&pos)
            .is_some_and(|occupants| occupants.iter().any(|id| id.kind().blocks_movement()))
    }

    /// Up to `distance` cells strictly ahead of `pos`, nearest first.
    /// Stops early at the grid boundary.
    pub fn lookahead(&self, pos: Position, heading: Heading, distance: usize) -> Vec<Position> {
        let mut cells = Vec::with_capacity(distance);
        let mut current = pos;
        for _ in 0..distance {
            current = self.next_position(current, heading);
            if !self.is_valid(current) {
                break;
            }
            cells.push(current);
        }
        cells
    }

    /// Where the agent currently is, if placed
    pub fn position_of(&self, id: impl Into<AgentId>) -> Option<Position> {
        self.locations.get(&id.into()).copied()
    }

    /// Number of cells holding at least one agent
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of agents placed on the grid
    pub fn agent_count(&self) -> usize {
        self.locations.len()
    }

    /// Put an agent on the grid. An agent that is already placed is moved,
    /// so it never appears in two cells. Returns false if `pos` is invalid.
    pub fn place(&mut self, id: impl Into<AgentId>, pos: Position) -> bool {
        let id = id.into();
        if !self.is_valid(pos) {
            warn!(
                "Refusing to place {:?} at {}; outside {}x{} grid",
                id, pos, self.width, self.height
            );
            return false;
        }
        if let Some(previous) = self.locations.get(&id).copied() {
            warn!("{:?} placed at {} while already at {}; relocating", id, pos, previous);
            self.detach(id, previous);
        }
        self.attach(id, pos);
        true
    }

    /// Move an agent from `from` to `to`. No-op (returns false) if the agent
    /// is not at `from` or `to` is outside the grid.
    pub fn move_agent(&mut self, id: impl Into<AgentId>, from: Position, to: Position) -> bool {
        let id = id.into();
        if self.locations.get(&id) != Some(&from) {
            warn!(
                "Invariant violation: move of {:?} from {} but it is at {:?}",
                id,
                from,
                self.locations.get(&id)
            );
            return false;
        }
        if !self.is_valid(to) {
            warn!("Refusing to move {:?} to {}; outside grid", id, to);
            return false;
        }
        self.detach(id, from);
        self.attach(id, to);
        true
    }

    /// Take an agent off the grid. No-op (returns false) if it is not at `pos`.
    pub fn remove(&mut self, id: impl Into<AgentId>, pos: Position) -> bool {
        let id = id.into();
        if self.locations.get(&id) != Some(&pos) {
            warn!(
                "Invariant violation: remove of {:?} at {} but it is at {:?}",
                id,
                pos,
                self.locations.get(&id)
            );
            return false;
        }
        self.detach(id, pos);
        true
    }

    fn attach(&mut self, id: AgentId, pos: Position) {
        self.cells.entry(pos).or_default().insert(id);
        self.locations.insert(id, pos);
    }

    fn detach(&mut self, id: AgentId, pos: Position) {
        if let Some(occupants) = self.cells.get_mut(&pos) {
            occupants.remove(&id);
            if occupants.is_empty() {
                self.cells.remove(&pos);
            }
        }
        self.locations.remove(&id);
    }
}
