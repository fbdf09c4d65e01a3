//! Door configuration from TOML.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::motion::KinematicLimits;

use super::units::{Acceleration, PulseWidth, ServoChannel, Velocity};

/// Default velocity limit in microseconds of pulse width per second.
pub const DEFAULT_MAX_VELOCITY: f64 = 2000.0;

/// Default acceleration limit in microseconds of pulse width per second squared.
pub const DEFAULT_MAX_ACCELERATION: f64 = 3000.0;

/// Named position of a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    /// Door at its `open` pulse width.
    Open,
    /// Door at its `close` pulse width.
    Close,
}

impl DoorState {
    /// Parse a position name as used in commands.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "open" => Some(DoorState::Open),
            "close" => Some(DoorState::Close),
            _ => None,
        }
    }

    /// Position name as used in commands.
    pub fn as_str(self) -> &'static str {
        match self {
            DoorState::Open => "open",
            DoorState::Close => "close",
        }
    }
}

/// Configuration of one servo-driven door.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DoorConfig {
    /// Servo channel driving the door.
    pub servo: ServoChannel,

    /// Pulse width with the door open.
    pub open: PulseWidth,

    /// Pulse width with the door closed. Doors start here.
    pub close: PulseWidth,

    /// Velocity limit for door motion.
    #[serde(default = "default_max_velocity")]
    pub max_velocity: Velocity,

    /// Acceleration limit for door motion.
    #[serde(default = "default_max_acceleration")]
    pub max_acceleration: Acceleration,
}

fn default_max_velocity() -> Velocity {
    Velocity(DEFAULT_MAX_VELOCITY)
}

fn default_max_acceleration() -> Acceleration {
    Acceleration(DEFAULT_MAX_ACCELERATION)
}

impl DoorConfig {
    /// Create a door configuration with the default kinematic limits.
    pub fn new(servo: ServoChannel, open: PulseWidth, close: PulseWidth) -> Self {
        Self {
            servo,
            open,
            close,
            max_velocity: default_max_velocity(),
            max_acceleration: default_max_acceleration(),
        }
    }

    /// Pulse width for a named door position.
    #[inline]
    pub fn pulse_for(&self, state: DoorState) -> PulseWidth {
        match state {
            DoorState::Open => self.open,
            DoorState::Close => self.close,
        }
    }

    /// Kinematic limits for this door's axis.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either limit is not a positive number.
    pub fn limits(&self) -> Result<KinematicLimits> {
        KinematicLimits::new(self.max_velocity, self.max_acceleration)
    }
}
