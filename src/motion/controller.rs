//! Multi-axis motion controller.
//!
//! Owns one [`MotionAxis`] per actuator, advances all of them once per
//! control period, and pushes pulse widths to the sink for axes in motion.

use heapless::{String, Vec};

use crate::actuator::PulseSink;
use crate::config::units::{PulseWidth, ServoChannel};
use crate::config::SystemConfig;
use crate::error::{name_of, ActuatorError, ConfigError, Error, MotionError, Result};

use super::axis::MotionAxis;
use super::planner::{self, KinematicLimits};

/// Maximum number of axes a controller can drive (one per servo channel).
pub const MAX_AXES: usize = ServoChannel::COUNT as usize;

/// An axis together with its name and output channel.
#[derive(Debug, Clone)]
struct ControlledAxis {
    name: String<32>,
    channel: ServoChannel,
    axis: MotionAxis,
}

/// Outcome of one control tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Axes that were moving at the start of the tick.
    pub moving: usize,
    /// Pulse widths delivered to the sink.
    pub pulses_sent: usize,
    /// Pulse widths the sink rejected.
    pub sink_faults: usize,
}

impl TickReport {
    /// Check whether every axis was settled.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.moving == 0
    }
}

/// Drives a set of named axes into a [`PulseSink`].
///
/// # Example
///
/// ```rust,ignore
/// use door_motion::{MotionController, SystemConfig};
///
/// let config = SystemConfig::fallback();
/// let mut controller = MotionController::from_config(&config, servo_bank)?;
///
/// controller.set_target("A", 1300.0)?;
/// loop {
///     // every 2.5 ms
///     controller.tick();
/// }
/// ```
pub struct MotionController<S: PulseSink> {
    sink: S,
    dt: f64,
    axes: Vec<ControlledAxis, MAX_AXES>,
}

impl<S: PulseSink> MotionController<S> {
    /// Create a controller with no axes.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidTimeStep` if `dt` is not positive.
    pub fn new(sink: S, dt: f64) -> Result<Self> {
        planner::check_time_step(dt)?;
        Ok(Self {
            sink,
            dt,
            axes: Vec::new(),
        })
    }

    /// Create one axis per configured door, at rest at its closed position.
    ///
    /// Each channel is primed with the closed pulse width and enabled.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid limits, duplicate doors, or sink failures
    /// while priming.
    pub fn from_config(config: &SystemConfig, sink: S) -> Result<Self> {
        let mut controller = Self::new(sink, config.motion.dt())?;

        for (name, door) in config.doors() {
            controller.add_axis(name, door.servo, door.close.as_position(), door.limits()?)?;
            controller.prime(door.servo, door.close)?;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("motion controller ready with {} axes", controller.axes.len());

        Ok(controller)
    }

    fn prime(&mut self, channel: ServoChannel, width: PulseWidth) -> Result<()> {
        let failed = Error::Actuator(ActuatorError::Output(channel.value()));
        self.sink.set_pulse(channel, width).map_err(|_| failed.clone())?;
        self.sink.set_enabled(channel, true).map_err(|_| failed)
    }

    /// Add an axis at rest at `position`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateAxis` if the name is taken and
    /// `ConfigError::TooManyAxes` if the controller is full.
    pub fn add_axis(
        &mut self,
        name: &str,
        channel: ServoChannel,
        position: f64,
        limits: KinematicLimits,
    ) -> Result<()> {
        if self.find(name).is_some() {
            return Err(Error::Config(ConfigError::DuplicateAxis(name_of(name))));
        }

        let axis = MotionAxis::new(self.dt, position, limits)?;
        self.axes
            .push(ControlledAxis {
                name: name_of(name),
                channel,
                axis,
            })
            .map_err(|_| Error::Config(ConfigError::TooManyAxes))
    }

    fn find(&self, name: &str) -> Option<&ControlledAxis> {
        self.axes.iter().find(|a| a.name.as_str() == name)
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut ControlledAxis> {
        self.axes
            .iter_mut()
            .find(|a| a.name.as_str() == name)
            .ok_or_else(|| Error::Motion(MotionError::UnknownAxis(name_of(name))))
    }

    /// Set a new target for a named axis.
    ///
    /// The axis replans immediately; the sink is driven on the next tick.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::UnknownAxis` for an unconfigured name and
    /// `MotionError::NonFiniteTarget` for NaN or infinite targets. Nothing
    /// changes on error.
    pub fn set_target(&mut self, name: &str, target: f64) -> Result<()> {
        let entry = self.find_mut(name)?;
        let _plan = entry.axis.set_target(target)?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "axis {=str}: target {} in {} ticks",
            entry.name.as_str(),
            target,
            _plan.total_steps()
        );

        Ok(())
    }

    /// Advance every axis by one tick.
    ///
    /// Axes that were not settled at the start of the tick send their new
    /// position to the sink; settled axes send nothing. Sink failures are
    /// counted, never propagated.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for entry in self.axes.iter_mut() {
            let was_settled = entry.axis.at_target();
            entry.axis.update();
            if was_settled {
                continue;
            }

            report.moving += 1;
            let width = PulseWidth::from_position(entry.axis.position());
            match self.sink.set_pulse(entry.channel, width) {
                Ok(()) => report.pulses_sent += 1,
                Err(_e) => {
                    report.sink_faults += 1;
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "axis {=str}: pulse {} rejected: {}",
                        entry.name.as_str(),
                        width.value(),
                        defmt::Debug2Format(&_e)
                    );
                }
            }
        }

        report
    }

    /// Current position of every axis, in registration order.
    pub fn positions(&self) -> impl Iterator<Item = (&str, f64)> {
        self.axes.iter().map(|a| (a.name.as_str(), a.axis.position()))
    }

    /// Current position of a named axis.
    pub fn position(&self, name: &str) -> Option<f64> {
        self.find(name).map(|a| a.axis.position())
    }

    /// Check whether a named axis has finished its trajectory.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::UnknownAxis` for an unconfigured name.
    pub fn is_settled(&self, name: &str) -> Result<bool> {
        self.find(name)
            .map(|a| a.axis.at_target())
            .ok_or_else(|| Error::Motion(MotionError::UnknownAxis(name_of(name))))
    }

    /// Check whether every axis has finished its trajectory.
    pub fn all_settled(&self) -> bool {
        self.axes.iter().all(|a| a.axis.at_target())
    }

    /// Get a named axis.
    pub fn axis(&self, name: &str) -> Option<&MotionAxis> {
        self.find(name).map(|a| &a.axis)
    }

    /// Servo channel of a named axis.
    pub fn channel(&self, name: &str) -> Option<ServoChannel> {
        self.find(name).map(|a| a.channel)
    }

    /// List all axis names.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|a| a.name.as_str())
    }

    /// Number of axes.
    #[inline]
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Check if the controller has no axes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Tick period in seconds.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Enable or disable the output of every axis.
    ///
    /// # Errors
    ///
    /// Returns `ActuatorError::Output` for the first channel that fails; the
    /// remaining channels are still attempted.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        let mut first_failure = None;
        for entry in self.axes.iter() {
            if self.sink.set_enabled(entry.channel, enabled).is_err() && first_failure.is_none() {
                first_failure = Some(entry.channel.value());
            }
        }
        match first_failure {
            Some(ch) => Err(Error::Actuator(ActuatorError::Output(ch))),
            None => Ok(()),
        }
    }

    /// Check whether every axis output is enabled.
    pub fn is_enabled(&self) -> bool {
        self.axes.iter().all(|a| self.sink.is_enabled(a.channel))
    }

    /// Get the sink.
    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get the sink mutably.
    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Release the sink.
    pub fn release(self) -> S {
        self.sink
    }
}
