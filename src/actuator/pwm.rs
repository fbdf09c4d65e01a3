//! Servo output over embedded-hal PWM channels.

use embedded_hal::pwm::{Error as _, SetDutyCycle};

use crate::config::units::{PulseWidth, ServoChannel};
use crate::error::{ActuatorError, ConfigError, Error, Result};

use super::PulseSink;

/// Standard hobby-servo frame period (50 Hz) in microseconds.
pub const SERVO_PERIOD_US: u32 = 20_000;

/// One servo driven by a PWM channel.
///
/// A disabled servo outputs a zero duty cycle but remembers its last pulse
/// width, which is restored when it is enabled again.
#[derive(Debug)]
pub struct ServoPwm<P> {
    pwm: P,
    period_us: u32,
    pulse: Option<PulseWidth>,
    enabled: bool,
}

impl<P: SetDutyCycle> ServoPwm<P> {
    /// Wrap a PWM channel running at the standard 50 Hz servo frame rate.
    pub fn new(pwm: P) -> Self {
        Self::with_period(pwm, SERVO_PERIOD_US)
    }

    /// Wrap a PWM channel with a custom frame period in microseconds.
    pub fn with_period(pwm: P, period_us: u32) -> Self {
        Self {
            pwm,
            period_us: period_us.max(1),
            pulse: None,
            enabled: false,
        }
    }

    /// Duty cycle that produces `width` on this channel.
    pub fn duty_for(&self, width: PulseWidth) -> u16 {
        let max = self.pwm.max_duty_cycle() as u32;
        let duty = width.value() as u32 * max / self.period_us;
        duty.min(max) as u16
    }

    /// Last commanded pulse width.
    #[inline]
    pub fn pulse(&self) -> Option<PulseWidth> {
        self.pulse
    }

    /// Check whether the output is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Command a pulse width. Takes effect immediately if enabled.
    pub fn set_pulse(&mut self, width: PulseWidth) -> core::result::Result<(), P::Error> {
        self.pulse = Some(width);
        if self.enabled {
            let duty = self.duty_for(width);
            self.pwm.set_duty_cycle(duty)?;
        }
        Ok(())
    }

    /// Enable or disable the output.
    pub fn set_enabled(&mut self, enabled: bool) -> core::result::Result<(), P::Error> {
        self.enabled = enabled;
        match (enabled, self.pulse) {
            (true, Some(width)) => {
                let duty = self.duty_for(width);
                self.pwm.set_duty_cycle(duty)
            }
            (true, None) => Ok(()),
            (false, _) => self.pwm.set_duty_cycle(0),
        }
    }

    /// Release the underlying PWM channel.
    pub fn release(self) -> P {
        self.pwm
    }
}

/// A bank of PWM servos addressed by servo channel.
///
/// `N` is the number of servos the bank can hold.
#[derive(Debug)]
pub struct PwmServoBank<P, const N: usize> {
    servos: heapless::Vec<(ServoChannel, ServoPwm<P>), N>,
}

impl<P: SetDutyCycle, const N: usize> Default for PwmServoBank<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SetDutyCycle, const N: usize> PwmServoBank<P, N> {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self {
            servos: heapless::Vec::new(),
        }
    }

    /// Bind a PWM channel to a servo channel.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateServoChannel` if the channel is already
    /// bound and `ConfigError::TooManyAxes` if the bank is full.
    pub fn bind(&mut self, channel: ServoChannel, servo: ServoPwm<P>) -> Result<()> {
        if self.servo(channel).is_some() {
            return Err(Error::Config(ConfigError::DuplicateServoChannel(channel.value())));
        }
        self.servos
            .push((channel, servo))
            .map_err(|_| Error::Config(ConfigError::TooManyAxes))
    }

    /// Get the servo bound to a channel.
    pub fn servo(&self, channel: ServoChannel) -> Option<&ServoPwm<P>> {
        self.servos
            .iter()
            .find(|(ch, _)| *ch == channel)
            .map(|(_, s)| s)
    }

    fn servo_mut(&mut self, channel: ServoChannel) -> core::result::Result<&mut ServoPwm<P>, ActuatorError> {
        self.servos
            .iter_mut()
            .find(|(ch, _)| *ch == channel)
            .map(|(_, s)| s)
            .ok_or(ActuatorError::UnknownChannel(channel.value()))
    }

    /// Number of bound servos.
    #[inline]
    pub fn len(&self) -> usize {
        self.servos.len()
    }

    /// Check if no servo is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.servos.is_empty()
    }
}

impl<P: SetDutyCycle, const N: usize> PulseSink for PwmServoBank<P, N> {
    type Error = ActuatorError;

    fn set_pulse(&mut self, channel: ServoChannel, width: PulseWidth) -> core::result::Result<(), ActuatorError> {
        self.servo_mut(channel)?
            .set_pulse(width)
            .map_err(|e| ActuatorError::Pwm {
                channel: channel.value(),
                kind: e.kind(),
            })
    }

    fn set_enabled(&mut self, channel: ServoChannel, enabled: bool) -> core::result::Result<(), ActuatorError> {
        self.servo_mut(channel)?
            .set_enabled(enabled)
            .map_err(|e| ActuatorError::Pwm {
                channel: channel.value(),
                kind: e.kind(),
            })
    }

    fn is_enabled(&self, channel: ServoChannel) -> bool {
        self.servo(channel).map(ServoPwm::is_enabled).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// PWM channel that records the last duty cycle.
    #[derive(Debug, Default)]
    struct FakePwm {
        duty: Option<u16>,
    }

    impl embedded_hal::pwm::ErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            20_000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Infallible> {
            self.duty = Some(duty);
            Ok(())
        }
    }

    #[test]
    fn test_duty_for_pulse() {
        let servo = ServoPwm::new(FakePwm::default());

        // One duty count per microsecond with a 20 000 count timer
        assert_eq!(servo.duty_for(PulseWidth(1500)), 1500);
        assert_eq!(servo.duty_for(PulseWidth(u16::MAX)), 20_000);
    }

    #[test]
    fn test_disabled_servo_keeps_pulse() {
        let mut servo = ServoPwm::new(FakePwm::default());

        servo.set_pulse(PulseWidth(1898)).unwrap();
        assert_eq!(servo.pwm.duty, None);

        servo.set_enabled(true).unwrap();
        assert_eq!(servo.pwm.duty, Some(1898));

        servo.set_enabled(false).unwrap();
        assert_eq!(servo.pwm.duty, Some(0));
        assert_eq!(servo.pulse(), Some(PulseWidth(1898)));
    }

    #[test]
    fn test_bank_routes_by_channel() {
        let mut bank: PwmServoBank<FakePwm, 4> = PwmServoBank::new();
        let ch1 = ServoChannel::new(1).unwrap();
        let ch2 = ServoChannel::new(2).unwrap();
        bank.bind(ch1, ServoPwm::new(FakePwm::default())).unwrap();
        bank.bind(ch2, ServoPwm::new(FakePwm::default())).unwrap();

        bank.set_enabled(ch2, true).unwrap();
        bank.set_pulse(ch2, PulseWidth(1300)).unwrap();

        assert!(bank.is_enabled(ch2));
        assert!(!bank.is_enabled(ch1));
        assert_eq!(bank.servo(ch2).unwrap().pulse(), Some(PulseWidth(1300)));
        assert_eq!(bank.servo(ch1).unwrap().pulse(), None);
    }

    #[test]
    fn test_bank_rejects_unknown_and_duplicate_channels() {
        let mut bank: PwmServoBank<FakePwm, 4> = PwmServoBank::new();
        let ch1 = ServoChannel::new(1).unwrap();
        let ch9 = ServoChannel::new(9).unwrap();
        bank.bind(ch1, ServoPwm::new(FakePwm::default())).unwrap();

        assert_eq!(
            bank.bind(ch1, ServoPwm::new(FakePwm::default())),
            Err(Error::Config(ConfigError::DuplicateServoChannel(1)))
        );
        assert_eq!(
            bank.set_pulse(ch9, PulseWidth(1500)),
            Err(ActuatorError::UnknownChannel(9))
        );
    }
}
