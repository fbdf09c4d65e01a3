//! Cooperative control loop.
//!
//! The loop never blocks: each pass polls the host for one command and ticks
//! the doors when the control period has elapsed. Time and transport are
//! supplied by the platform through [`Clock`] and [`CommandChannel`].

use crate::actuator::PulseSink;
use crate::door::{CommandMessage, DoorSystem, Response};
use crate::error::CommandError;
use crate::motion::TickReport;

/// Monotonic time source.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin.
    fn now_us(&self) -> u64;
}

/// Non-blocking command transport to the host.
pub trait CommandChannel {
    /// Take the next pending message, if any.
    ///
    /// A line that is not an object comes back as
    /// `Err(CommandError::MalformedMessage)` and is answered with a failure.
    fn receive(&mut self) -> Option<Result<CommandMessage, CommandError>>;

    /// Deliver a reply to the host.
    fn send(&mut self, response: &Response);
}

/// Elapsed-time gate for a fixed control period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimer {
    interval_us: u64,
    last_us: Option<u64>,
}

impl TickTimer {
    /// Create a timer that fires every `interval_us` microseconds.
    pub fn new(interval_us: u32) -> Self {
        Self {
            interval_us: u64::from(interval_us.max(1)),
            last_us: None,
        }
    }

    /// Control period in microseconds.
    #[inline]
    pub fn interval_us(&self) -> u64 {
        self.interval_us
    }

    /// Check whether a tick is due at `now_us`, and if so start a new period.
    ///
    /// The first call always fires. A late call fires once; missed periods
    /// are not replayed.
    pub fn due(&mut self, now_us: u64) -> bool {
        match self.last_us {
            Some(last) if now_us.wrapping_sub(last) < self.interval_us => false,
            _ => {
                self.last_us = Some(now_us);
                true
            }
        }
    }
}

/// What happened during one pass of the control loop.
#[derive(Debug, Clone, Default)]
pub struct LoopEvent {
    /// Reply sent for a command received in this pass.
    pub response: Option<Response>,
    /// Tick outcome, if the control period elapsed.
    pub tick: Option<TickReport>,
}

/// The door controller's main loop.
pub struct ControlLoop<S: PulseSink, C, K> {
    doors: DoorSystem<S>,
    channel: C,
    clock: K,
    timer: TickTimer,
}

impl<S, C, K> ControlLoop<S, C, K>
where
    S: PulseSink,
    C: CommandChannel,
    K: Clock,
{
    /// Create a loop ticking at the configured control period.
    pub fn new(doors: DoorSystem<S>, channel: C, clock: K) -> Self {
        let timer = TickTimer::new(doors.config().motion.tick_interval_us);
        Self {
            doors,
            channel,
            clock,
            timer,
        }
    }

    /// Run one pass: answer at most one command, then tick if due.
    pub fn run_once(&mut self) -> LoopEvent {
        let mut event = LoopEvent::default();

        if let Some(received) = self.channel.receive() {
            let rsp = match received {
                Ok(message) => self.doors.handle_message(message),
                Err(e) => self.doors.reject(e),
            };
            self.channel.send(&rsp);
            event.response = Some(rsp);
        }

        if self.timer.due(self.clock.now_us()) {
            event.tick = Some(self.doors.tick());
        }

        event
    }

    /// Run forever.
    pub fn run(&mut self) -> ! {
        #[cfg(feature = "defmt")]
        defmt::info!("control loop running every {} us", self.timer.interval_us());

        loop {
            self.run_once();
        }
    }

    /// Get the door system.
    #[inline]
    pub fn doors(&self) -> &DoorSystem<S> {
        &self.doors
    }

    /// Get the door system mutably.
    #[inline]
    pub fn doors_mut(&mut self) -> &mut DoorSystem<S> {
        &mut self.doors
    }

    /// Get the command channel.
    #[inline]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Get the clock.
    #[inline]
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Take the loop apart.
    pub fn into_parts(self) -> (DoorSystem<S>, C, K) {
        (self.doors, self.channel, self.clock)
    }
}
