//! Grid traffic simulation
//!
//! Cars, traffic lights and accidents share a bounded grid and update once
//! per tick. `SimWorld` drives the ticks; the behaviors only talk to the
//! `GridEnvironment` and hand cross-agent effects back to the world.

mod accident;
mod agent;
mod car;
mod grid;
mod traffic_light;
mod types;
mod world;

// Re-export public types for external use
pub use accident::{AccidentUpdateResult, SimAccident};
pub use agent::{AgentId, AgentKind, Occupant};
pub use car::{CarUpdateResult, SimCar};
pub use grid::GridEnvironment;
pub use traffic_light::{LightColor, LightUpdateResult, SimTrafficLight};
pub use types::{
    AccidentId, CarId, CarParams, Heading, LightId, LightParams, Position, SimId, Tick,
    ACCIDENT_CLEAR_TICKS, DEFAULT_GREEN_LENGTH, DEFAULT_MAX_ACCEL, DEFAULT_MAX_BRAKE,
    DEFAULT_SPEED_LIMIT, DEFAULT_YELLOW_LENGTH,
};
pub use world::{SimWorld, TickReport, TrafficSummary};
