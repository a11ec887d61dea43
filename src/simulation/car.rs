//! Car movement logic for the grid traffic simulation

use anyhow::Result;
use log::debug;

use super::grid::GridEnvironment;
use super::types::{AccidentId, CarId, CarParams, Heading, Position};

/// Result of a car update indicating what the driver should do with the car
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarUpdateResult {
    /// Car is still on the grid
    Continue,
    /// Car tried to drive off the grid at `at` and has been taken off it
    LeftGrid { at: Position },
    /// Car hit something at `at` and has been taken off the grid.
    /// `accident` is the accident it drove into, whose countdown must be reset.
    Crashed {
        at: Position,
        accident: Option<AccidentId>,
    },
}

impl CarUpdateResult {
    /// Whether the car should be dropped by the driver
    pub fn is_dead(&self) -> bool {
        !matches!(self, CarUpdateResult::Continue)
    }
}

/// A car in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    pub position: Position,
    pub heading: Heading,
    /// Cells per tick, always within `[0, speed_limit]`
    pub speed: f64,
    max_brake: f64,
    max_accel: f64,
    speed_limit: f64,
    alive: bool,
}

impl SimCar {
    /// Create a car. Fails if the parameters are invalid or the initial
    /// speed is outside `[0, speed_limit]`.
    pub fn new(
        id: CarId,
        position: Position,
        heading: Heading,
        speed: f64,
        params: CarParams,
    ) -> Result<Self> {
        params.validate()?;
        if !(0.0..=params.speed_limit).contains(&speed) {
            anyhow::bail!(
                "Initial speed {} outside [0, {}] for car {:?}",
                speed,
                params.speed_limit,
                id
            );
        }
        Ok(Self {
            id,
            position,
            heading,
            speed,
            max_brake: params.max_brake,
            max_accel: params.max_accel,
            speed_limit: params.speed_limit,
            alive: true,
        })
    }

    pub fn params(&self) -> CarParams {
        CarParams::new(self.max_brake, self.max_accel, self.speed_limit)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Distance covered this tick at `speed` plus next tick under full braking
    pub fn braking_distance(&self, speed: f64) -> f64 {
        let next_speed = (speed - self.max_brake).max(0.0);
        speed + next_speed
    }

    /// Run one tick: pick a speed, then drive cell by cell
    pub fn update(&mut self, grid: &mut GridEnvironment) -> CarUpdateResult {
        if !self.alive {
            return CarUpdateResult::Continue;
        }

        self.adjust_speed(grid);

        let steps = self.speed.floor() as usize;
        for _ in 0..steps {
            let next = grid.next_position(self.position, self.heading);

            if !grid.is_valid(next) {
                debug!("Car {:?} left the grid at {}", self.id, next);
                self.die(grid);
                return CarUpdateResult::LeftGrid { at: next };
            }

            let cars = grid.agents_at::<CarId>(next);
            let accidents = grid.agents_at::<AccidentId>(next);
            if !cars.is_empty() || !accidents.is_empty() {
                let accident = accidents.first().copied();
                debug!(
                    "Car {:?} crashed at {} (cars: {:?}, accident: {:?})",
                    self.id, next, cars, accident
                );
                self.die(grid);
                return CarUpdateResult::Crashed { at: next, accident };
            }

            if !grid.move_agent(self.id, self.position, next) {
                // The grid lost track of us; stay put rather than desync
                break;
            }
            self.position = next;
        }

        CarUpdateResult::Continue
    }

    /// Accelerate as much as allowed, then back off one unit at a time while
    /// the braking distance overruns the free space ahead
    fn adjust_speed(&mut self, grid: &GridEnvironment) {
        let min_speed = (self.speed - self.max_brake).max(0.0);
        let max_speed = (self.speed + self.max_accel).min(self.speed_limit);
        let mut target = max_speed;

        let ahead = grid.lookahead(self.position, self.heading, max_speed.floor() as usize);
        if ahead.iter().any(|pos| grid.is_occupied(*pos)) {
            let space_ahead = ahead.iter().take_while(|pos| !grid.is_occupied(**pos)).count() as f64;
            while self.braking_distance(target) > space_ahead && target > min_speed {
                target = (target - 1.0).max(min_speed);
            }
        }

        self.speed = target;
    }

    fn die(&mut self, grid: &mut GridEnvironment) {
        self.alive = false;
        grid.remove(self.id, self.position);
    }
}
