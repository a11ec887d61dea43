//! Core types for the grid traffic simulation

use std::fmt;

/// Simulation tick number. The world starts at 0 and the first processed tick is 1.
pub type Tick = u64;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for car IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarId(pub SimId);

/// A wrapper type for traffic light IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub SimId);

/// A wrapper type for accident IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccidentId(pub SimId);

/// A cell on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position displaced by `(dx, dy)`. No bounds check; saturates at the
    /// `i32` range, which always lies outside any grid.
    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction of travel. North is +y, East is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Heading {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Heading {
    /// All headings, clockwise from North
    pub const ALL: [Heading; 8] = [
        Heading::North,
        Heading::NorthEast,
        Heading::East,
        Heading::SouthEast,
        Heading::South,
        Heading::SouthWest,
        Heading::West,
        Heading::NorthWest,
    ];

    /// Unit displacement for one step along this heading
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Heading::North => (0, 1),
            Heading::NorthEast => (1, 1),
            Heading::East => (1, 0),
            Heading::SouthEast => (1, -1),
            Heading::South => (0, -1),
            Heading::SouthWest => (-1, -1),
            Heading::West => (-1, 0),
            Heading::NorthWest => (-1, 1),
        }
    }

    /// Snap an angle in degrees (0 = North, clockwise) to the nearest heading
    pub fn from_degrees(degrees: i32) -> Heading {
        let normalized = degrees.rem_euclid(360);
        let sector = ((normalized + 22) / 45) % 8;
        Heading::ALL[sector as usize]
    }

    /// Angle in degrees (0 = North, clockwise)
    pub fn degrees(&self) -> i32 {
        let index = Heading::ALL
            .iter()
            .position(|h| h == self)
            .unwrap_or_default();
        index as i32 * 45
    }
}

/// Default maximum speed reduction per tick
pub const DEFAULT_MAX_BRAKE: f64 = 1.0;

/// Default maximum speed increase per tick
pub const DEFAULT_MAX_ACCEL: f64 = 1.0;

/// Default speed limit in cells per tick
pub const DEFAULT_SPEED_LIMIT: f64 = 3.0;

/// Default number of ticks a light stays green
pub const DEFAULT_GREEN_LENGTH: Tick = 10;

/// Default number of ticks a light stays yellow
pub const DEFAULT_YELLOW_LENGTH: Tick = 3;

/// Countdown an accident starts with, and is reset to when hit again
pub const ACCIDENT_CLEAR_TICKS: i64 = 5;

/// Driving parameters of a car, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarParams {
    pub max_brake: f64,
    pub max_accel: f64,
    pub speed_limit: f64,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            max_brake: DEFAULT_MAX_BRAKE,
            max_accel: DEFAULT_MAX_ACCEL,
            speed_limit: DEFAULT_SPEED_LIMIT,
        }
    }
}

impl CarParams {
    pub fn new(max_brake: f64, max_accel: f64, speed_limit: f64) -> Self {
        Self {
            max_brake,
            max_accel,
            speed_limit,
        }
    }

    /// Check the parameters are usable. Braking and acceleration may be zero,
    /// the speed limit must be positive.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.max_brake.is_finite() && self.max_accel.is_finite() && self.speed_limit.is_finite()) {
            anyhow::bail!("Car parameters must be finite: {:?}", self);
        }
        if self.max_brake < 0.0 || self.max_accel < 0.0 {
            anyhow::bail!("Car braking and acceleration must be non-negative: {:?}", self);
        }
        if self.speed_limit <= 0.0 {
            anyhow::bail!("Car speed limit must be positive: {:?}", self);
        }
        Ok(())
    }
}

/// Timing parameters of a traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightParams {
    pub green_length: Tick,
    pub yellow_length: Tick,
    /// When false the light never changes on its own
    pub auto: bool,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            green_length: DEFAULT_GREEN_LENGTH,
            yellow_length: DEFAULT_YELLOW_LENGTH,
            auto: true,
        }
    }
}
