//! Configuration module for door-motion.
//!
//! Provides types for loading and validating door configurations
//! from TOML files (with `std` feature) or pre-parsed data.

mod door;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use door::{DoorConfig, DoorState, DEFAULT_MAX_ACCELERATION, DEFAULT_MAX_VELOCITY};
pub use system::{DoorMap, MotionSettings, SystemConfig, DEFAULT_TICK_INTERVAL_US, MAX_DOORS};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, load_config_or_fallback, parse_config};

// Re-export unit types at config level
pub use units::{Acceleration, PulseWidth, ServoChannel, Velocity};
