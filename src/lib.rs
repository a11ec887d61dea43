//! Grid Traffic Simulation Library
//!
//! A discrete-tick, grid-based traffic simulation of cars, traffic lights
//! and accidents.

pub mod simulation;
