//! Unit types for physical quantities.
//!
//! Positions are servo pulse widths in microseconds. Velocities and
//! accelerations are expressed in the same position unit per second
//! (squared), so a door moving at 2000 us/s sweeps its pulse width
//! by 2000 microseconds every second.

use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Servo pulse width in microseconds.
///
/// Used for configuration and actuator output. The motion engine works on
/// fractional positions and rounds back to a pulse width per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PulseWidth(pub u16);

impl PulseWidth {
    /// Create a new PulseWidth value.
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the raw value in microseconds.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Get the pulse width as a fractional position.
    #[inline]
    pub fn as_position(self) -> f64 {
        self.0 as f64
    }

    /// Round a fractional position to the nearest pulse width.
    ///
    /// Out-of-range positions saturate at `0` and `u16::MAX`.
    #[inline]
    pub fn from_position(position: f64) -> Self {
        // Float-to-int casts saturate and map NaN to zero.
        Self(libm::round(position) as u16)
    }
}

/// Velocity in position units (microseconds of pulse width) per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Velocity(pub f64);

impl Velocity {
    /// Create a new Velocity value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Mul<f64> for Velocity {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Acceleration in position units per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Acceleration(pub f64);

impl Acceleration {
    /// Create a new Acceleration value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Mul<f64> for Acceleration {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Add for PulseWidth {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for PulseWidth {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// Servo output channel (1 to 18 on a Servo 2040 board).
///
/// Validated at construction to lie within the board's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ServoChannel(u8);

impl ServoChannel {
    /// First servo channel.
    pub const FIRST: Self = Self(1);

    /// Number of servo channels on the board.
    pub const COUNT: u8 = 18;

    /// Create a new ServoChannel with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidServoChannel` if the channel is outside 1..=18.
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        if Self::is_valid(value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidServoChannel(value))
        }
    }

    /// Get the raw channel number.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Zero-based index of this channel.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Check if a value is a valid channel number.
    #[inline]
    pub fn is_valid(value: u8) -> bool {
        (1..=Self::COUNT).contains(&value)
    }
}

impl TryFrom<u8> for ServoChannel {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ServoChannel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u8::deserialize(deserializer)?;
        ServoChannel::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
