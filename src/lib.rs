//! # door-motion
//!
//! Ramp-trajectory motion engine for servo-driven door actuators with
//! embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Smooth motion**: Trapezoidal or triangular velocity ramps, quantized to
//!   whole control ticks, that land exactly on target
//! - **Retargeting**: A new target replans from the current position and
//!   velocity without a jump
//! - **Configuration-driven**: Doors, servo channels and limits in TOML files
//! - **embedded-hal 1.0**: Servo pulses through `SetDutyCycle` PWM channels
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use door_motion::{DoorState, DoorSystem};
//!
//! // Load configuration, falling back to the built-in doors
//! let (config, errors) = door_motion::load_config_or_fallback("doors.toml");
//!
//! let mut doors = DoorSystem::from_config(config, servo_bank)?.with_config_errors(errors);
//! doors.set_door("A", DoorState::Open)?;
//!
//! loop {
//!     // every 2.5 ms
//!     doors.tick();
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
extern crate std;

// Core modules
pub mod actuator;
pub mod config;
pub mod door;
pub mod error;
pub mod motion;
pub mod runtime;

// Re-exports for ergonomic API
pub use actuator::{PulseSink, PwmServoBank, ServoPwm};
pub use config::{validate_config, DoorConfig, DoorState, SystemConfig};
pub use door::{Command, CommandMessage, DoorSystem, Response};
pub use error::{Error, ErrorLog, Result};
pub use motion::{plan, Direction, KinematicLimits, MotionAxis, MotionController, MotionPhase, TickReport, TrajectoryPlan};
pub use runtime::{Clock, CommandChannel, ControlLoop, LoopEvent, TickTimer};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, load_config_or_fallback, parse_config};

// Unit types
pub use config::units::{Acceleration, PulseWidth, ServoChannel, Velocity};
