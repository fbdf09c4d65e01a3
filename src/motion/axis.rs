//! Per-actuator trajectory integrator.

use crate::error::{Error, MotionError, Result};

use super::planner::{self, KinematicLimits, MotionPhase, TrajectoryPlan};

/// The last three sampled positions, newest first.
///
/// Velocity and acceleration are backward differences over this history, so
/// position stays the only state that is ever written.
#[derive(Debug, Clone, Copy)]
struct PositionHistory([f64; 3]);

impl PositionHistory {
    fn at_rest(position: f64) -> Self {
        Self([position; 3])
    }

    #[inline]
    fn push(&mut self, position: f64) {
        self.0 = [position, self.0[0], self.0[1]];
    }

    #[inline]
    fn current(&self) -> f64 {
        self.0[0]
    }

    #[inline]
    fn velocity(&self, dt: f64) -> f64 {
        (self.0[0] - self.0[1]) / dt
    }

    #[inline]
    fn acceleration(&self, dt: f64) -> f64 {
        let previous_velocity = (self.0[1] - self.0[2]) / dt;
        (self.velocity(dt) - previous_velocity) / dt
    }
}

/// One actuator following a ramp trajectory, advanced one tick at a time.
///
/// # Example
///
/// ```rust
/// use door_motion::config::{Acceleration, Velocity};
/// use door_motion::motion::{KinematicLimits, MotionAxis};
///
/// let limits = KinematicLimits::new(Velocity(2000.0), Acceleration(3000.0))?;
/// let mut axis = MotionAxis::new(0.0025, 1898.0, limits)?;
///
/// axis.set_target(1300.0)?;
/// while !axis.at_target() {
///     axis.update();
/// }
/// assert_eq!(axis.position(), 1300.0);
/// # Ok::<(), door_motion::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MotionAxis {
    /// Tick period in seconds.
    dt: f64,

    /// Velocity and acceleration limits.
    limits: KinematicLimits,

    /// Recent positions; the newest is the current position.
    history: PositionHistory,

    /// Position when the current plan was created.
    phase_start_position: f64,

    /// Velocity the current plan starts from.
    phase_start_velocity: f64,

    /// Ticks since the current plan was created, clamped to `total + 1`.
    tick_index: u32,

    /// Requested set-point.
    target: f64,

    /// Current trajectory.
    plan: TrajectoryPlan,
}

impl MotionAxis {
    /// Create an axis at rest at `position`, targeting that same position.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidTimeStep` if `dt` is not positive,
    /// `ConfigError::RampBelowTickResolution` if the limits ramp faster than
    /// one tick, and `MotionError::NonFiniteTarget` if `position` is not finite.
    pub fn new(dt: f64, position: f64, limits: KinematicLimits) -> Result<Self> {
        planner::check_time_step(dt)?;
        limits.check_resolution(dt)?;
        if !position.is_finite() {
            return Err(Error::Motion(MotionError::NonFiniteTarget(position)));
        }

        Ok(Self {
            dt,
            limits,
            history: PositionHistory::at_rest(position),
            phase_start_position: position,
            phase_start_velocity: 0.0,
            tick_index: 0,
            target: position,
            plan: TrajectoryPlan::zero(&limits),
        })
    }

    /// Replace the target and replan from the current position and velocity.
    ///
    /// Position and velocity stay continuous; only the acceleration may jump.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::NonFiniteTarget` for NaN or infinite targets and
    /// `MotionError::TrajectoryTooLong` for moves that would need more than
    /// [`MAX_TRAJECTORY_STEPS`](super::planner::MAX_TRAJECTORY_STEPS) ticks,
    /// leaving the axis untouched.
    pub fn set_target(&mut self, target: f64) -> Result<&TrajectoryPlan> {
        if !target.is_finite() {
            return Err(Error::Motion(MotionError::NonFiniteTarget(target)));
        }

        let position = self.position();
        let velocity = self.velocity();
        let plan = planner::solve(self.dt, position, velocity, target, &self.limits)?;

        self.target = target;
        self.plan = plan;
        self.tick_index = 0;
        self.phase_start_position = position;
        self.phase_start_velocity = plan.start_velocity;

        Ok(&self.plan)
    }

    /// Advance one tick along the current trajectory.
    pub fn update(&mut self) {
        let total = self.plan.total_steps();
        self.tick_index = self
            .tick_index
            .saturating_add(1)
            .min(total.saturating_add(1));

        let next_position = if self.tick_index > total {
            // Terminal clamp: land exactly on target.
            self.target
        } else {
            self.phase_start_position + self.plan.displacement_at(self.tick_index, self.dt)
        };

        self.history.push(next_position);
    }

    /// Check whether the trajectory has completed.
    ///
    /// A zero-length plan that already sits on its target counts as settled
    /// before any update.
    #[inline]
    pub fn at_target(&self) -> bool {
        let total = self.plan.total_steps();
        self.tick_index > total || (total == 0 && self.position() == self.target)
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> f64 {
        self.history.current()
    }

    /// Current velocity (backward difference of positions).
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.history.velocity(self.dt)
    }

    /// Current acceleration (backward difference of velocities).
    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.history.acceleration(self.dt)
    }

    /// Requested set-point.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Signed distance from position to target.
    #[inline]
    pub fn error(&self) -> f64 {
        self.target - self.position()
    }

    /// Current trajectory.
    #[inline]
    pub fn plan(&self) -> &TrajectoryPlan {
        &self.plan
    }

    /// Ticks elapsed in the current trajectory.
    #[inline]
    pub fn tick_index(&self) -> u32 {
        self.tick_index
    }

    /// Updates left before the axis settles.
    #[inline]
    pub fn remaining_steps(&self) -> u32 {
        if self.at_target() {
            0
        } else {
            self.plan
                .total_steps()
                .saturating_add(1)
                .saturating_sub(self.tick_index)
        }
    }

    /// Phase of the trajectory at the current tick.
    pub fn phase(&self) -> MotionPhase {
        if self.at_target() {
            MotionPhase::Settled
        } else if self.plan.is_zero() {
            // Off target with nothing to plan: the next update lands on it
            MotionPhase::Decelerating
        } else if self.tick_index == 0 {
            // Not yet moved on the new plan
            self.plan.phase_at(1)
        } else {
            self.plan.phase_at(self.tick_index)
        }
    }

    /// Position where the current plan started.
    #[inline]
    pub fn phase_start_position(&self) -> f64 {
        self.phase_start_position
    }

    /// Velocity the current plan started from.
    #[inline]
    pub fn phase_start_velocity(&self) -> f64 {
        self.phase_start_velocity
    }

    /// Kinematic limits of this axis.
    #[inline]
    pub fn limits(&self) -> &KinematicLimits {
        &self.limits
    }

    /// Tick period in seconds.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Acceleration, Velocity};
    use crate::error::ConfigError;

    const DT: f64 = 0.0025;

    fn axis_at(position: f64) -> MotionAxis {
        let limits = KinematicLimits::new(Velocity(2000.0), Acceleration(3000.0)).unwrap();
        MotionAxis::new(DT, position, limits).unwrap()
    }

    #[test]
    fn test_new_axis_is_settled() {
        let axis = axis_at(1898.0);

        assert!(axis.at_target());
        assert_eq!(axis.phase(), MotionPhase::Settled);
        assert_eq!(axis.velocity(), 0.0);
        assert_eq!(axis.acceleration(), 0.0);
    }

    #[test]
    fn test_closing_to_opening_run() {
        let mut axis = axis_at(1898.0);
        axis.set_target(1300.0).unwrap();
        let total = axis.plan().total_steps();

        let mut previous = axis.position();
        let mut updates = 0;
        while !axis.at_target() {
            axis.update();
            updates += 1;
            assert!(axis.position() <= previous + 1e-9);
            previous = axis.position();
        }

        assert_eq!(updates, total + 1);
        assert_eq!(axis.position(), 1300.0);
    }

    #[test]
    fn test_at_target_is_monotonic() {
        let mut axis = axis_at(0.0);
        axis.set_target(500.0).unwrap();
        let total = axis.plan().total_steps();

        for _ in 0..total {
            assert!(!axis.at_target());
            axis.update();
        }
        assert!(!axis.at_target());
        axis.update();
        for _ in 0..10 {
            assert!(axis.at_target());
            axis.update();
        }
        assert_eq!(axis.tick_index(), total + 1);
        assert_eq!(axis.position(), 500.0);
    }

    #[test]
    fn test_target_at_current_position() {
        let mut axis = axis_at(1500.0);
        let plan = *axis.set_target(1500.0).unwrap();

        assert!(plan.is_zero());
        assert!(axis.at_target());
    }

    #[test]
    fn test_replan_preserves_position_and_velocity() {
        let mut axis = axis_at(0.0);
        axis.set_target(2000.0).unwrap();
        for _ in 0..100 {
            axis.update();
        }

        let position = axis.position();
        let velocity = axis.velocity();
        assert!(velocity > 0.0);

        axis.set_target(0.0).unwrap();
        assert_eq!(axis.position(), position);
        assert_eq!(axis.velocity(), velocity);
        assert_eq!(axis.phase_start_position(), position);
        assert_eq!(axis.tick_index(), 0);

        while !axis.at_target() {
            axis.update();
        }
        assert_eq!(axis.position(), 0.0);
    }

    #[test]
    fn test_second_target_wins() {
        let mut axis = axis_at(1898.0);
        axis.set_target(1300.0).unwrap();
        let second = *axis.set_target(1600.0).unwrap();

        assert_eq!(axis.plan(), &second);
        assert_eq!(axis.target(), 1600.0);
        assert_eq!(axis.tick_index(), 0);

        let mut updates = 0;
        while !axis.at_target() {
            axis.update();
            updates += 1;
        }
        assert_eq!(updates, second.total_steps() + 1);
        assert_eq!(axis.position(), 1600.0);
    }

    #[test]
    fn test_phases_in_order() {
        let mut axis = axis_at(0.0);
        axis.set_target(3000.0).unwrap();

        assert_eq!(axis.phase(), MotionPhase::Accelerating);

        let mut seen = heapless::Vec::<MotionPhase, 8>::new();
        while !axis.at_target() {
            axis.update();
            let phase = axis.phase();
            if seen.last() != Some(&phase) {
                seen.push(phase).unwrap();
            }
        }

        assert_eq!(
            seen.as_slice(),
            &[
                MotionPhase::Accelerating,
                MotionPhase::Cruising,
                MotionPhase::Decelerating,
                MotionPhase::Settled
            ]
        );
    }

    #[test]
    fn test_non_finite_target_rejected() {
        let mut axis = axis_at(1500.0);

        assert!(matches!(
            axis.set_target(f64::NAN),
            Err(Error::Motion(MotionError::NonFiniteTarget(_)))
        ));
        assert_eq!(axis.target(), 1500.0);
        assert!(axis.at_target());
    }

    #[test]
    fn test_pending_snap_is_not_settled() {
        // Too short to plan any tick: the next update lands on target
        let mut axis = axis_at(100.0);
        axis.set_target(100.001).unwrap();

        assert!(axis.plan().is_zero());
        assert!(!axis.at_target());
        assert_eq!(axis.phase(), MotionPhase::Decelerating);

        axis.update();
        assert!(axis.at_target());
        assert_eq!(axis.position(), 100.001);
        assert_eq!(axis.phase(), MotionPhase::Settled);
    }

    #[test]
    fn test_limits_finer_than_tick_rejected() {
        let limits = KinematicLimits::new(Velocity(1.0), Acceleration(10_000.0)).unwrap();

        assert!(matches!(
            MotionAxis::new(DT, 0.0, limits),
            Err(Error::Config(ConfigError::RampBelowTickResolution { .. }))
        ));
    }

    #[test]
    fn test_overlong_target_rejected() {
        let limits = KinematicLimits::new(Velocity(1.0), Acceleration(1.0)).unwrap();
        let mut axis = MotionAxis::new(DT, 0.0, limits).unwrap();

        assert!(matches!(
            axis.set_target(1.0e9),
            Err(Error::Motion(MotionError::TrajectoryTooLong(_)))
        ));
        assert_eq!(axis.target(), 0.0);
        assert!(axis.at_target());
    }

    #[test]
    fn test_remaining_steps() {
        let mut axis = axis_at(0.0);
        axis.set_target(100.0).unwrap();
        let total = axis.plan().total_steps();

        assert_eq!(axis.remaining_steps(), total + 1);
        axis.update();
        assert_eq!(axis.remaining_steps(), total);
    }
}
