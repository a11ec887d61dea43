//! Traffic light phase logic

use log::debug;

use super::types::{LightId, LightParams, Position, Tick};

/// Light states. The automatic cycle is Green -> Yellow -> Red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightColor {
    Green,
    Yellow,
    #[default]
    Red,
}

/// Result of a light update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightUpdateResult {
    Unchanged,
    TurnedYellow,
    /// The light turned red; every other light must be switched to green
    TurnedRed,
}

/// A traffic light. Lights sit on a cell but never block it.
#[derive(Debug, Clone)]
pub struct SimTrafficLight {
    pub id: LightId,
    pub position: Position,
    color: LightColor,
    ticks_at_last_change: Tick,
    pub green_length: Tick,
    pub yellow_length: Tick,
    pub auto: bool,
}

impl SimTrafficLight {
    /// New lights start red with the last change at tick 0
    pub fn new(id: LightId, position: Position, params: LightParams) -> Self {
        Self {
            id,
            position,
            color: LightColor::Red,
            ticks_at_last_change: 0,
            green_length: params.green_length,
            yellow_length: params.yellow_length,
            auto: params.auto,
        }
    }

    pub fn color(&self) -> LightColor {
        self.color
    }

    pub fn ticks_at_last_change(&self) -> Tick {
        self.ticks_at_last_change
    }

    /// Advance the phase machine for `current_tick`
    pub fn update(&mut self, current_tick: Tick) -> LightUpdateResult {
        if !self.auto {
            return LightUpdateResult::Unchanged;
        }

        let elapsed = current_tick.saturating_sub(self.ticks_at_last_change);
        match self.color {
            LightColor::Green if elapsed > self.green_length => {
                self.change_to(LightColor::Yellow, current_tick);
                LightUpdateResult::TurnedYellow
            }
            LightColor::Yellow if elapsed > self.yellow_length => {
                self.change_to(LightColor::Red, current_tick);
                LightUpdateResult::TurnedRed
            }
            // Red only ends through a peer going red or an external override
            _ => LightUpdateResult::Unchanged,
        }
    }

    /// Apply a peer's green broadcast. Returns true if the color changed.
    /// The change tick is left alone, so green time counts from the last
    /// transition this light made itself.
    pub fn receive_green(&mut self) -> bool {
        if self.color == LightColor::Green {
            return false;
        }
        debug!(
            "Light {:?} at {}: {:?} -> Green by broadcast",
            self.id, self.position, self.color
        );
        self.color = LightColor::Green;
        true
    }

    /// Set the color directly, outside the normal cycle.
    /// The change tick is only recorded when the color actually changes.
    pub fn force_color(&mut self, color: LightColor, current_tick: Tick) -> bool {
        if self.color == color {
            return false;
        }
        self.change_to(color, current_tick);
        true
    }

    fn change_to(&mut self, color: LightColor, current_tick: Tick) {
        debug!(
            "Light {:?} at {}: {:?} -> {:?} on tick {}",
            self.id, self.position, self.color, color, current_tick
        );
        self.color = color;
        self.ticks_at_last_change = current_tick;
    }
}
