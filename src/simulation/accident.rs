//! Accidents: temporary obstacles that clear themselves after a countdown

use log::debug;

use super::grid::GridEnvironment;
use super::types::{AccidentId, Position, ACCIDENT_CLEAR_TICKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccidentUpdateResult {
    Active,
    /// Countdown ran out; the accident is off the grid
    Cleared,
}

#[derive(Debug, Clone)]
pub struct SimAccident {
    pub id: AccidentId,
    pub position: Position,
    /// Ticks until cleared
    pub clear_in: i64,
}

impl SimAccident {
    pub fn new(id: AccidentId, position: Position) -> Self {
        Self::with_clear_in(id, position, ACCIDENT_CLEAR_TICKS)
    }

    pub fn with_clear_in(id: AccidentId, position: Position, clear_in: i64) -> Self {
        Self {
            id,
            position,
            clear_in,
        }
    }

    /// A car drove into the accident; restart the countdown
    pub fn reset(&mut self) {
        self.clear_in = ACCIDENT_CLEAR_TICKS;
    }

    pub fn update(&mut self, grid: &mut GridEnvironment) -> AccidentUpdateResult {
        self.clear_in -= 1;
        if self.clear_in > 0 {
            return AccidentUpdateResult::Active;
        }

        debug!("Accident {:?} at {} cleared", self.id, self.position);
        grid.remove(self.id, self.position);
        AccidentUpdateResult::Cleared
    }
}
