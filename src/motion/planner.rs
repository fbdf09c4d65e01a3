//! Ramp trajectory planning.
//!
//! Computes trapezoidal or triangular velocity profiles from the current
//! kinematic state to a target at rest, discretized to a fixed tick period.
//! Rounding the phase durations to whole ticks would make the trajectory miss
//! the target, so the acceleration is corrected to absorb the residual and
//! the profile still ends exactly on target after a known tick count.

use libm::{round, sqrt};

use crate::config::units::{Acceleration, Velocity};
use crate::error::{ConfigError, Error, MotionError, Result};

/// Longest trajectory, in ticks, that a plan may describe.
///
/// Leaves headroom so `total_steps() + 1` never saturates.
pub const MAX_TRAJECTORY_STEPS: u32 = u32::MAX / 2;

/// Direction of actuator motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward increasing position.
    Forward,
    /// Toward decreasing position.
    Reverse,
}

impl Direction {
    /// Get direction from a signed displacement.
    ///
    /// Zero displacement counts as forward.
    #[inline]
    pub fn from_displacement(displacement: f64) -> Self {
        if displacement >= 0.0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// Phase of a trajectory at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Constant acceleration toward peak velocity.
    Accelerating,
    /// Constant peak velocity.
    Cruising,
    /// Constant deceleration to rest at target.
    Decelerating,
    /// Trajectory complete.
    Settled,
}

/// Velocity and acceleration limits of one actuator.
///
/// Both limits are positive and finite by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicLimits {
    max_velocity: f64,
    max_acceleration: f64,
}

impl KinematicLimits {
    /// Create validated limits.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMaxVelocity` or
    /// `ConfigError::InvalidMaxAcceleration` for non-positive or non-finite values.
    pub fn new(max_velocity: Velocity, max_acceleration: Acceleration) -> Result<Self> {
        let (v, a) = (max_velocity.value(), max_acceleration.value());
        if !(v.is_finite() && v > 0.0) {
            return Err(Error::Config(ConfigError::InvalidMaxVelocity(v)));
        }
        if !(a.is_finite() && a > 0.0) {
            return Err(Error::Config(ConfigError::InvalidMaxAcceleration(a)));
        }
        Ok(Self {
            max_velocity: v,
            max_acceleration: a,
        })
    }

    /// Maximum velocity.
    #[inline]
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Maximum acceleration.
    #[inline]
    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    /// Check that a full ramp to the velocity limit lasts at least one tick.
    ///
    /// Shorter ramps round to zero acceleration and deceleration ticks, which
    /// leaves a cruise with no way to stop.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::RampBelowTickResolution` when `max_velocity /
    /// max_acceleration` rounds to zero ticks of `dt`.
    pub fn check_resolution(&self, dt: f64) -> Result<()> {
        if quantize(self.max_velocity / self.max_acceleration, dt) == 0 {
            return Err(Error::Config(ConfigError::RampBelowTickResolution {
                max_velocity: self.max_velocity,
                max_acceleration: self.max_acceleration,
            }));
        }
        Ok(())
    }
}

/// Discretized ramp trajectory.
///
/// Describes motion relative to the position where it was planned; the
/// phase displacement formulas are offsets from that anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPlan {
    /// Ticks in the acceleration phase.
    pub steps_accel: u32,

    /// Ticks at peak velocity.
    pub steps_cruise: u32,

    /// Ticks decelerating to rest at target.
    pub steps_decel: u32,

    /// Acceleration magnitude corrected for tick quantization.
    pub adjusted_acceleration: f64,

    /// Direction from start toward target.
    pub direction: Direction,

    /// Start velocity the plan was solved for (clamped to the velocity limit).
    pub start_velocity: f64,
}

impl TrajectoryPlan {
    /// Create a zero-length plan (no motion).
    pub fn zero(limits: &KinematicLimits) -> Self {
        Self {
            steps_accel: 0,
            steps_cruise: 0,
            steps_decel: 0,
            adjusted_acceleration: limits.max_acceleration,
            direction: Direction::Forward,
            start_velocity: 0.0,
        }
    }

    /// Total number of ticks in the trajectory.
    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.steps_accel
            .saturating_add(self.steps_cruise)
            .saturating_add(self.steps_decel)
    }

    /// Check if this is a zero-length plan.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.total_steps() == 0
    }

    /// Check if the trajectory never reaches a cruise phase.
    #[inline]
    pub fn is_triangular(&self) -> bool {
        self.steps_cruise == 0
    }

    /// Get the phase at a given tick.
    ///
    /// Tick `n` is the position reached after `n` updates, so tick 0 is the
    /// start and tick `total_steps()` is the end of deceleration.
    pub fn phase_at(&self, tick: u32) -> MotionPhase {
        if tick == 0 && self.is_zero() {
            MotionPhase::Settled
        } else if tick <= self.steps_accel && self.steps_accel > 0 {
            MotionPhase::Accelerating
        } else if tick <= self.steps_accel.saturating_add(self.steps_cruise) && self.steps_cruise > 0 {
            MotionPhase::Cruising
        } else if tick <= self.total_steps() {
            MotionPhase::Decelerating
        } else {
            MotionPhase::Settled
        }
    }

    /// Signed acceleration applied during the acceleration phase.
    #[inline]
    fn signed_acceleration(&self) -> f64 {
        self.direction.sign() * self.adjusted_acceleration
    }

    /// Velocity at the end of the acceleration phase.
    #[inline]
    pub fn peak_velocity(&self, dt: f64) -> f64 {
        self.start_velocity + self.signed_acceleration() * self.steps_accel as f64 * dt
    }

    /// Displacement from the anchor after `tick` updates.
    ///
    /// Ticks past the end of the trajectory return the full displacement.
    pub fn displacement_at(&self, tick: u32, dt: f64) -> f64 {
        let acc = self.signed_acceleration();
        let peak = self.peak_velocity(dt);

        let n_accel = tick.min(self.steps_accel);
        let t = n_accel as f64 * dt;
        let mut displacement = self.start_velocity * t + 0.5 * acc * t * t;
        if tick <= self.steps_accel {
            return displacement;
        }

        let n_cruise = (tick - self.steps_accel).min(self.steps_cruise);
        displacement += peak * n_cruise as f64 * dt;
        let cruise_end = self.steps_accel.saturating_add(self.steps_cruise);
        if tick <= cruise_end {
            return displacement;
        }

        let n_decel = (tick - cruise_end).min(self.steps_decel);
        let t = n_decel as f64 * dt;
        displacement + peak * t - 0.5 * acc * t * t
    }

    /// Duration of the trajectory in seconds.
    #[inline]
    pub fn duration_secs(&self, dt: f64) -> f64 {
        self.total_steps() as f64 * dt
    }
}

/// Plan a ramp trajectory from `(start_pos, start_vel)` to `target_pos` at rest.
///
/// # Errors
///
/// Returns `MotionError::InvalidTimeStep` if `dt` is not positive and finite,
/// `MotionError::NonFiniteInput` for NaN or infinite positions or velocity,
/// `ConfigError::RampBelowTickResolution` for limits too fine for `dt`, and
/// `MotionError::TrajectoryTooLong` for moves longer than
/// [`MAX_TRAJECTORY_STEPS`] ticks.
pub fn plan(
    dt: f64,
    start_pos: f64,
    start_vel: f64,
    target_pos: f64,
    limits: &KinematicLimits,
) -> Result<TrajectoryPlan> {
    check_time_step(dt)?;
    if !(start_pos.is_finite() && start_vel.is_finite() && target_pos.is_finite()) {
        return Err(Error::Motion(MotionError::NonFiniteInput));
    }
    limits.check_resolution(dt)?;
    solve(dt, start_pos, start_vel, target_pos, limits)
}

/// Reject time steps the planner cannot divide by.
pub(crate) fn check_time_step(dt: f64) -> Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(Error::Motion(MotionError::InvalidTimeStep(dt)))
    }
}

/// Planner core. Inputs must already be finite, `dt > 0`, and the limits
/// must pass [`KinematicLimits::check_resolution`].
pub(crate) fn solve(
    dt: f64,
    start_pos: f64,
    start_vel: f64,
    target_pos: f64,
    limits: &KinematicLimits,
) -> Result<TrajectoryPlan> {
    let max_vel = limits.max_velocity;
    let max_acc = limits.max_acceleration;

    let direction = Direction::from_displacement(target_pos - start_pos);
    let sign = direction.sign();

    // Solve as if moving toward increasing position.
    let vel = (sign * start_vel).clamp(-max_vel, max_vel);
    let distance = sign * (target_pos - start_pos);

    let d_accel = (max_vel * max_vel - vel * vel) / (2.0 * max_acc);
    let d_decel = (max_vel * max_vel) / (2.0 * max_acc);

    let (t_accel, t_cruise, t_decel) = if distance > d_accel + d_decel {
        // Trapezoidal: reaches max_vel and cruises
        let d_cruise = distance - d_accel - d_decel;
        ((max_vel - vel) / max_acc, d_cruise / max_vel, max_vel / max_acc)
    } else {
        // Triangular: peak velocity stays below max_vel
        let peak = sqrt(max_acc * distance + 0.5 * vel * vel);
        ((peak - vel) / max_acc, 0.0, peak / max_acc)
    };

    let steps: f64 = [t_accel, t_cruise, t_decel]
        .iter()
        .map(|t| round(t / dt).max(0.0))
        .sum();
    if !(steps < MAX_TRAJECTORY_STEPS as f64) {
        return Err(Error::Motion(MotionError::TrajectoryTooLong(target_pos - start_pos)));
    }

    let steps_accel = quantize(t_accel, dt);
    let steps_cruise = quantize(t_cruise, dt);
    let mut steps_decel = quantize(t_decel, dt);

    let zero = TrajectoryPlan::zero(limits);
    if steps_accel == 0 && steps_cruise == 0 && steps_decel == 0 {
        if distance != 0.0 {
            #[cfg(feature = "defmt")]
            defmt::debug!("plan: displacement {} shorter than one tick, settling", distance);
        }
        return Ok(zero);
    }

    // The correction divides by a^2 + 2ab + 2ac - c^2 (in ticks). When that is
    // zero, one more deceleration tick changes it by 2a - 2c - 1, which is odd.
    if correction_denominator(steps_accel, steps_cruise, steps_decel) == 0 {
        #[cfg(feature = "defmt")]
        defmt::debug!("plan: singular quantization, extending deceleration");
        steps_decel += 1;
    }

    let t_accel = steps_accel as f64 * dt;
    let t_cruise = steps_cruise as f64 * dt;
    let t_decel = steps_decel as f64 * dt;
    let duration = t_accel + t_cruise + t_decel;

    let denominator = correction_denominator(steps_accel, steps_cruise, steps_decel) as f64 * dt * dt;
    let adjusted_acceleration = 2.0 * (distance - vel * duration) / denominator;

    Ok(TrajectoryPlan {
        steps_accel,
        steps_cruise,
        steps_decel,
        adjusted_acceleration,
        direction,
        start_velocity: sign * vel,
    })
}

/// Correction denominator in units of `dt^2`, computed exactly.
fn correction_denominator(steps_accel: u32, steps_cruise: u32, steps_decel: u32) -> i128 {
    let (a, b, c) = (steps_accel as i128, steps_cruise as i128, steps_decel as i128);
    a * a + 2 * a * b + 2 * a * c - c * c
}

/// Round a phase duration to whole ticks. Negative durations yield zero.
#[inline]
fn quantize(duration: f64, dt: f64) -> u32 {
    let steps = round(duration / dt);
    if steps > 0.0 {
        steps as u32
    } else {
        0
    }
}
