//! The closed set of agent kinds living on the grid

use super::accident::AccidentUpdateResult;
use super::car::CarUpdateResult;
use super::traffic_light::LightUpdateResult;
use super::types::{AccidentId, CarId, LightId};

/// Kind of agent, used for per-kind queries and phase ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Car,
    TrafficLight,
    Accident,
}

impl AgentKind {
    /// Whether an agent of this kind stops cars from entering its cell
    pub fn blocks_movement(&self) -> bool {
        match self {
            AgentKind::Car | AgentKind::Accident => true,
            AgentKind::TrafficLight => false,
        }
    }
}

/// Identity of any agent. This is what the grid's occupancy index stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentId {
    Car(CarId),
    Light(LightId),
    Accident(AccidentId),
}

impl AgentId {
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentId::Car(_) => AgentKind::Car,
            AgentId::Light(_) => AgentKind::TrafficLight,
            AgentId::Accident(_) => AgentKind::Accident,
        }
    }
}

impl From<CarId> for AgentId {
    fn from(id: CarId) -> Self {
        AgentId::Car(id)
    }
}

impl From<LightId> for AgentId {
    fn from(id: LightId) -> Self {
        AgentId::Light(id)
    }
}

impl From<AccidentId> for AgentId {
    fn from(id: AccidentId) -> Self {
        AgentId::Accident(id)
    }
}

/// A typed agent identity that can be recovered from an [`AgentId`].
/// Lets the grid answer "which cars are here" with `agents_at::<CarId>`.
pub trait Occupant: Copy + Ord + Into<AgentId> {
    fn from_agent(id: AgentId) -> Option<Self>;
}

impl Occupant for CarId {
    fn from_agent(id: AgentId) -> Option<Self> {
        match id {
            AgentId::Car(car_id) => Some(car_id),
            _ => None,
        }
    }
}

impl Occupant for LightId {
    fn from_agent(id: AgentId) -> Option<Self> {
        match id {
            AgentId::Light(light_id) => Some(light_id),
            _ => None,
        }
    }
}

impl Occupant for AccidentId {
    fn from_agent(id: AgentId) -> Option<Self> {
        match id {
            AgentId::Accident(accident_id) => Some(accident_id),
            _ => None,
        }
    }
}

/// Outcome of a single agent update, one variant per kind
#[derive(Debug, Clone, PartialEq)]
pub enum AgentUpdate {
    Car(CarUpdateResult),
    Light(LightUpdateResult),
    Accident(AccidentUpdateResult),
    /// The id was not registered (already removed)
    Missing,
}
