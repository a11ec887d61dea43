//! Main simulation world that ties everything together
//!
//! `SimWorld` is the tick driver: it owns the agent records, the grid and
//! the tick counter. Each tick runs three phases in a fixed order:
//!
//! 1. accidents, ascending id
//! 2. traffic lights, ascending id; green broadcasts from lights that turned
//!    red are applied once the whole phase is done, in emission order
//! 3. cars, ascending id (registration order); an accident reset caused by a
//!    crash is applied before the next car runs
//!
//! Agents that report their own death are dropped at the end of their turn,
//! so they are never visible through the accessors after `tick` returns.

use anyhow::{Context, Result};
use log::info;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use super::accident::{AccidentUpdateResult, SimAccident};
use super::agent::{AgentId, AgentUpdate};
use super::car::{CarUpdateResult, SimCar};
use super::grid::GridEnvironment;
use super::traffic_light::{LightColor, LightUpdateResult, SimTrafficLight};
use super::types::{
    AccidentId, CarId, CarParams, Heading, LightId, LightParams, Position, SimId, Tick,
    ACCIDENT_CLEAR_TICKS,
};

/// Everything that happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    /// Accidents whose countdown ran out
    pub cleared_accidents: Vec<AccidentId>,
    /// Automatic light transitions, in update order
    pub light_changes: Vec<(LightId, LightUpdateResult)>,
    /// Lights switched to green by a peer's broadcast
    pub broadcast_greens: Vec<LightId>,
    /// Cars removed this tick and why
    pub departed_cars: Vec<(CarId, CarUpdateResult)>,
    /// Accidents whose countdown was restarted by a crash
    pub reset_accidents: Vec<AccidentId>,
}

impl TickReport {
    fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }
}

/// Snapshot of world-level counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficSummary {
    pub tick: Tick,
    pub cars: usize,
    pub lights_green: usize,
    pub lights_yellow: usize,
    pub lights_red: usize,
    pub accidents: usize,
    /// 0 when there are no cars
    pub mean_speed: f64,
    /// 0 when there are no cars
    pub max_speed: f64,
}

/// The main simulation world
pub struct SimWorld {
    /// Spatial environment shared by all agents
    grid: GridEnvironment,

    /// All cars, keyed (and therefore updated) by ascending id
    cars: BTreeMap<CarId, SimCar>,

    /// All traffic lights
    lights: BTreeMap<LightId, SimTrafficLight>,

    /// All accidents
    accidents: BTreeMap<AccidentId, SimAccident>,

    /// Next ID to assign
    next_id: usize,

    /// Number of the last completed tick
    tick: Tick,
}

impl SimWorld {
    /// Create an empty world on a `width` x `height` grid
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let grid = GridEnvironment::new(width, height).context("Failed to create world grid")?;
        Ok(Self {
            grid,
            cars: BTreeMap::new(),
            lights: BTreeMap::new(),
            accidents: BTreeMap::new(),
            next_id: 0,
            tick: 0,
        })
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn grid(&self) -> &GridEnvironment {
        &self.grid
    }

    /// Tick counter. 0 before the first tick; the first tick processed is 1.
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Add a car. The cell must be on the grid and free of cars and accidents.
    pub fn add_car(
        &mut self,
        position: Position,
        heading: Heading,
        speed: f64,
        params: CarParams,
    ) -> Result<CarId> {
        if !self.grid.is_valid(position) {
            anyhow::bail!("Car position {} is outside the grid", position);
        }
        if self.grid.is_occupied(position) {
            anyhow::bail!("Car position {} is already occupied", position);
        }

        let id = CarId(self.next_sim_id());
        let car = SimCar::new(id, position, heading, speed, params)
            .with_context(|| format!("Invalid car at {}", position))?;
        self.grid.place(id, position);
        self.cars.insert(id, car);
        Ok(id)
    }

    /// Add a traffic light. Lights may share a cell with anything.
    pub fn add_light(&mut self, position: Position, params: LightParams) -> Result<LightId> {
        if !self.grid.is_valid(position) {
            anyhow::bail!("Light position {} is outside the grid", position);
        }
        if params.green_length == 0 || params.yellow_length == 0 {
            anyhow::bail!("Light phase lengths must be positive: {:?}", params);
        }

        let id = LightId(self.next_sim_id());
        self.grid.place(id, position);
        self.lights.insert(id, SimTrafficLight::new(id, position, params));
        Ok(id)
    }

    /// Add an accident with the default countdown
    pub fn add_accident(&mut self, position: Position) -> Result<AccidentId> {
        self.add_accident_with_clear_in(position, ACCIDENT_CLEAR_TICKS)
    }

    /// Add an accident with an explicit countdown
    pub fn add_accident_with_clear_in(
        &mut self,
        position: Position,
        clear_in: i64,
    ) -> Result<AccidentId> {
        if !self.grid.is_valid(position) {
            anyhow::bail!("Accident position {} is outside the grid", position);
        }

        let id = AccidentId(self.next_sim_id());
        self.grid.place(id, position);
        self.accidents
            .insert(id, SimAccident::with_clear_in(id, position, clear_in));
        Ok(id)
    }

    /// Take an agent out of the simulation. Returns false if it was not registered.
    pub fn remove_agent(&mut self, id: impl Into<AgentId>) -> bool {
        let id = id.into();
        let position = match id {
            AgentId::Car(car_id) => self.cars.remove(&car_id).map(|c| c.position),
            AgentId::Light(light_id) => self.lights.remove(&light_id).map(|l| l.position),
            AgentId::Accident(accident_id) => self.accidents.remove(&accident_id).map(|a| a.position),
        };
        match position {
            Some(position) => {
                self.grid.remove(id, position);
                true
            }
            None => false,
        }
    }

    pub fn car(&self, id: CarId) -> Option<&SimCar> {
        self.cars.get(&id)
    }

    pub fn light(&self, id: LightId) -> Option<&SimTrafficLight> {
        self.lights.get(&id)
    }

    pub fn accident(&self, id: AccidentId) -> Option<&SimAccident> {
        self.accidents.get(&id)
    }

    /// Cars in update order
    pub fn cars(&self) -> impl Iterator<Item = &SimCar> {
        self.cars.values()
    }

    /// Lights in update order
    pub fn lights(&self) -> impl Iterator<Item = &SimTrafficLight> {
        self.lights.values()
    }

    /// Accidents in update order
    pub fn accidents(&self) -> impl Iterator<Item = &SimAccident> {
        self.accidents.values()
    }

    /// Turn automatic cycling on or off for a light
    pub fn set_light_auto(&mut self, id: LightId, auto: bool) -> Result<()> {
        let light = self.lights.get_mut(&id).context("Light not found")?;
        light.auto = auto;
        Ok(())
    }

    /// Override a light's color. Returns whether the color changed.
    pub fn force_light_color(&mut self, id: LightId, color: LightColor) -> Result<bool> {
        let tick = self.tick;
        let light = self.lights.get_mut(&id).context("Light not found")?;
        Ok(light.force_color(color, tick))
    }

    /// Run a single agent's update against the current tick.
    /// The caller applies the result: removal, resets and broadcasts.
    fn update_agent(&mut self, id: AgentId) -> AgentUpdate {
        match id {
            AgentId::Car(car_id) => match self.cars.get_mut(&car_id) {
                Some(car) => AgentUpdate::Car(car.update(&mut self.grid)),
                None => AgentUpdate::Missing,
            },
            AgentId::Light(light_id) => match self.lights.get_mut(&light_id) {
                Some(light) => AgentUpdate::Light(light.update(self.tick)),
                None => AgentUpdate::Missing,
            },
            AgentId::Accident(accident_id) => match self.accidents.get_mut(&accident_id) {
                Some(accident) => AgentUpdate::Accident(accident.update(&mut self.grid)),
                None => AgentUpdate::Missing,
            },
        }
    }

    /// Main simulation tick
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport::new(self.tick);

        self.update_accidents(&mut report);
        self.update_lights(&mut report);
        self.update_cars(&mut report);

        report
    }

    fn update_accidents(&mut self, report: &mut TickReport) {
        let accident_ids: Vec<AccidentId> = self.accidents.keys().copied().collect();

        for accident_id in accident_ids {
            if let AgentUpdate::Accident(AccidentUpdateResult::Cleared) =
                self.update_agent(accident_id.into())
            {
                self.accidents.remove(&accident_id);
                report.cleared_accidents.push(accident_id);
            }
        }
    }

    fn update_lights(&mut self, report: &mut TickReport) {
        let light_ids: Vec<LightId> = self.lights.keys().copied().collect();
        let mut broadcasters = Vec::new();

        for light_id in light_ids {
            if let AgentUpdate::Light(result) = self.update_agent(light_id.into()) {
                if result == LightUpdateResult::Unchanged {
                    continue;
                }
                report.light_changes.push((light_id, result));
                if result == LightUpdateResult::TurnedRed {
                    broadcasters.push(light_id);
                }
            }
        }

        for source in broadcasters {
            self.broadcast_green(source, report);
        }
    }

    /// Switch every light except `source` to green
    fn broadcast_green(&mut self, source: LightId, report: &mut TickReport) {
        for (light_id, light) in self.lights.iter_mut() {
            if *light_id != source && light.receive_green() {
                report.broadcast_greens.push(*light_id);
            }
        }
    }

    fn update_cars(&mut self, report: &mut TickReport) {
        // Collect car IDs to avoid borrow issues
        let car_ids: Vec<CarId> = self.cars.keys().copied().collect();

        for car_id in car_ids {
            let result = match self.update_agent(car_id.into()) {
                AgentUpdate::Car(result) => result,
                _ => continue,
            };
            if !result.is_dead() {
                continue;
            }

            if let CarUpdateResult::Crashed {
                accident: Some(accident_id),
                ..
            } = result
            {
                if let Some(accident) = self.accidents.get_mut(&accident_id) {
                    accident.reset();
                    report.reset_accidents.push(accident_id);
                }
            }

            self.cars.remove(&car_id);
            report.departed_cars.push((car_id, result));
        }
    }

    pub fn summary(&self) -> TrafficSummary {
        let count_color = |color: LightColor| self.lights.values().filter(|l| l.color() == color).count();

        let max_speed = self
            .cars
            .values()
            .map(|car| OrderedFloat(car.speed))
            .max()
            .map(OrderedFloat::into_inner)
            .unwrap_or(0.0);
        let mean_speed = if self.cars.is_empty() {
            0.0
        } else {
            self.cars.values().map(|car| car.speed).sum::<f64>() / self.cars.len() as f64
        };

        TrafficSummary {
            tick: self.tick,
            cars: self.cars.len(),
            lights_green: count_color(LightColor::Green),
            lights_yellow: count_color(LightColor::Yellow),
            lights_red: count_color(LightColor::Red),
            accidents: self.accidents.len(),
            mean_speed,
            max_speed,
        }
    }

    /// Log a summary of the world state
    pub fn log_summary(&self) {
        let summary = self.summary();
        info!("=== Grid Traffic Summary (tick {}) ===", summary.tick);
        info!(
            "Grid: {}x{}, occupied cells: {}",
            self.grid.width(),
            self.grid.height(),
            self.grid.occupied_cells()
        );
        info!(
            "Cars: {}, mean speed {:.2}, max speed {:.2}",
            summary.cars, summary.mean_speed, summary.max_speed
        );
        info!(
            "Lights: {} green, {} yellow, {} red",
            summary.lights_green, summary.lights_yellow, summary.lights_red
        );
        info!("Accidents: {}", summary.accidents);
    }
}
