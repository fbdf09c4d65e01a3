//! Door layer for door-motion.
//!
//! Doors have two named positions, `open` and `close`. [`DoorSystem`] turns
//! position requests into motion targets and answers host commands.

mod command;
mod system;

pub use command::{Command, CommandMessage, DoorPositions, DoorRequest, DoorStates, Response};
pub use system::DoorSystem;
