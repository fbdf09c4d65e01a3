//! Motion module for door-motion.
//!
//! Provides ramp trajectory planning, the per-axis integrator, and the
//! multi-axis controller that drives the actuator sink.

mod axis;
mod controller;
mod planner;

pub use axis::MotionAxis;
pub use controller::{MotionController, TickReport, MAX_AXES};
pub use planner::{plan, Direction, KinematicLimits, MotionPhase, TrajectoryPlan};
