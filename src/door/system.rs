//! Door system facade.
//!
//! Maps named door positions onto motion targets and answers host commands.

use crate::actuator::PulseSink;
use crate::config::{validate_config, DoorState, PulseWidth, SystemConfig};
use crate::error::{name_of, truncated, CommandError, Error, ErrorLog, Result};
use crate::motion::{MotionController, TickReport};

use super::command::{Command, CommandMessage, DoorPositions, DoorStates, Response};

/// A set of servo-driven doors behind one motion controller.
///
/// Every door starts closed. Commands move doors between their `open` and
/// `close` pulse widths; the motion itself happens in [`DoorSystem::tick`].
///
/// # Example
///
/// ```rust,ignore
/// use door_motion::{DoorState, DoorSystem, SystemConfig};
///
/// let mut doors = DoorSystem::from_config(SystemConfig::fallback(), servo_bank)?;
/// doors.set_door("A", DoorState::Open)?;
///
/// loop {
///     // every 2.5 ms
///     doors.tick();
/// }
/// ```
pub struct DoorSystem<S: PulseSink> {
    config: SystemConfig,
    controller: MotionController<S>,
    states: DoorStates,
    errors: ErrorLog,
    config_errors: ErrorLog,
}

impl<S: PulseSink> DoorSystem<S> {
    /// Create a door system with every door closed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration is invalid, or an
    /// actuator error if a servo cannot be primed.
    pub fn from_config(config: SystemConfig, sink: S) -> Result<Self> {
        validate_config(&config)?;
        let controller = MotionController::from_config(&config, sink)?;

        let mut states = DoorStates::new();
        for name in config.door_names() {
            let _ = states.insert(name_of(name), DoorState::Close);
        }

        Ok(Self {
            config,
            controller,
            states,
            errors: ErrorLog::new(),
            config_errors: ErrorLog::new(),
        })
    }

    /// Attach the errors collected while loading the configuration.
    pub fn with_config_errors(mut self, errors: ErrorLog) -> Self {
        self.config_errors = errors;
        self
    }

    /// Move a door to a named position.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::DoorNotFound` for an unconfigured door.
    pub fn set_door(&mut self, name: &str, state: DoorState) -> Result<()> {
        let target = self
            .config
            .door(name)
            .map(|door| door.pulse_for(state).as_position())
            .ok_or_else(|| Error::Command(CommandError::DoorNotFound(name_of(name))))?;

        self.controller.set_target(name, target)?;
        if let Some(current) = self.states.get_mut(&name_of(name)) {
            *current = state;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("door {=str} -> {}", name, state);

        Ok(())
    }

    /// Move several doors, given as `(name, position)` pairs.
    ///
    /// Valid entries are applied even if others fail; each failure is
    /// recorded in the error log. Returns `true` if every entry was applied.
    pub fn set_doors<'a, I>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut all_applied = true;
        for (name, position) in entries {
            let result = match DoorState::parse(position) {
                Some(state) => self.set_door(name, state),
                None => Err(Error::Command(CommandError::UnknownPosition {
                    door: name_of(name),
                    position: truncated(position),
                })),
            };
            if let Err(e) = result {
                self.errors.push(e);
                all_applied = false;
            }
        }
        all_applied
    }

    /// Commanded state of a door.
    pub fn door_state(&self, name: &str) -> Option<DoorState> {
        self.states.get(&name_of(name)).copied()
    }

    /// Commanded state of every door.
    #[inline]
    pub fn door_states(&self) -> &DoorStates {
        &self.states
    }

    /// Current pulse width of every door.
    pub fn positions(&self) -> DoorPositions {
        let mut positions = DoorPositions::new();
        for (name, position) in self.controller.positions() {
            let _ = positions.insert(name_of(name), PulseWidth::from_position(position).value());
        }
        positions
    }

    /// Enable every servo output.
    pub fn enable(&mut self) -> Result<()> {
        self.controller.set_enabled(true)
    }

    /// Disable every servo output.
    pub fn disable(&mut self) -> Result<()> {
        self.controller.set_enabled(false)
    }

    /// Check whether every servo output is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.controller.is_enabled()
    }

    /// Advance every door by one control period.
    #[inline]
    pub fn tick(&mut self) -> TickReport {
        self.controller.tick()
    }

    /// Get the configuration in use.
    #[inline]
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Errors collected while loading the configuration.
    #[inline]
    pub fn config_errors(&self) -> &ErrorLog {
        &self.config_errors
    }

    /// Errors recorded by commands since the last failed response.
    #[inline]
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Get the motion controller.
    #[inline]
    pub fn controller(&self) -> &MotionController<S> {
        &self.controller
    }

    /// Get the motion controller mutably.
    #[inline]
    pub fn controller_mut(&mut self) -> &mut MotionController<S> {
        &mut self.controller
    }

    /// Decode and execute a raw command message.
    pub fn handle_message(&mut self, message: CommandMessage) -> Response {
        match Command::try_from(message) {
            Ok(command) => self.handle(&command),
            Err(e) => self.reject(e),
        }
    }

    /// Answer a message that could not be handled with a failure reply.
    pub fn reject(&mut self, error: impl Into<Error>) -> Response {
        self.errors.push(error);
        self.finish(Response::default())
    }

    /// Execute a command.
    pub fn handle(&mut self, command: &Command) -> Response {
        let mut rsp = Response::default();
        match command {
            Command::SetDoors(doors) => {
                self.set_doors(doors.iter().map(|(name, pos)| (name.as_str(), pos.as_str())));
                rsp.doors = Some(self.states.clone());
            }
            Command::GetDoors => rsp.doors = Some(self.states.clone()),
            Command::GetPositions => rsp.positions = Some(self.positions()),
            Command::Enable => {
                if let Err(e) = self.enable() {
                    self.errors.push(e);
                }
            }
            Command::Disable => {
                if let Err(e) = self.disable() {
                    self.errors.push(e);
                }
            }
            Command::IsEnabled => rsp.is_enabled = Some(self.is_enabled()),
            Command::GetConfig => rsp.config = Some(self.config.doors.clone()),
            Command::ConfigErrors => rsp.config_errors = Some(self.config_errors.joined()),
        }
        self.finish(rsp)
    }

    /// Set `ok` from the error log, moving any errors into `err`.
    fn finish(&mut self, mut rsp: Response) -> Response {
        rsp.ok = !self.errors.has_errors();
        if !rsp.ok {
            #[cfg(feature = "defmt")]
            defmt::warn!("command failed with {} errors", self.errors.len());

            rsp.err = Some(self.errors.joined());
            self.errors.clear();
        }
        rsp
    }
}
