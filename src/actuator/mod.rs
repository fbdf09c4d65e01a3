//! Actuator output for door-motion.
//!
//! The motion engine only ever commands pulse widths. Anything that can put
//! a pulse width on a servo channel implements [`PulseSink`]; [`PwmServoBank`]
//! does so over embedded-hal 1.0 PWM channels.

mod pwm;

pub use pwm::{PwmServoBank, ServoPwm, SERVO_PERIOD_US};

use crate::config::units::{PulseWidth, ServoChannel};

/// Destination for servo pulse-width commands.
pub trait PulseSink {
    /// Error reported by the output.
    type Error: core::fmt::Debug;

    /// Command a pulse width on a channel.
    fn set_pulse(&mut self, channel: ServoChannel, width: PulseWidth) -> Result<(), Self::Error>;

    /// Enable or disable the output of a channel.
    fn set_enabled(&mut self, channel: ServoChannel, enabled: bool) -> Result<(), Self::Error>;

    /// Check whether a channel's output is enabled.
    fn is_enabled(&self, channel: ServoChannel) -> bool;
}

impl<T: PulseSink + ?Sized> PulseSink for &mut T {
    type Error = T::Error;

    #[inline]
    fn set_pulse(&mut self, channel: ServoChannel, width: PulseWidth) -> Result<(), Self::Error> {
        T::set_pulse(self, channel, width)
    }

    #[inline]
    fn set_enabled(&mut self, channel: ServoChannel, enabled: bool) -> Result<(), Self::Error> {
        T::set_enabled(self, channel, enabled)
    }

    #[inline]
    fn is_enabled(&self, channel: ServoChannel) -> bool {
        T::is_enabled(self, channel)
    }
}
