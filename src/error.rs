//! Error types for door-motion.
//!
//! Provides unified error handling across configuration, motion planning,
//! actuator output, and command dispatch.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Maximum number of messages kept in an [`ErrorLog`].
pub const MAX_ERROR_MESSAGES: usize = 5;

/// Unified error type for all door-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motion planning or axis error
    Motion(MotionError),
    /// Actuator output error
    Actuator(ActuatorError),
    /// Command decoding or dispatch error
    Command(CommandError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid max velocity (must be finite and > 0)
    InvalidMaxVelocity(f64),
    /// Invalid max acceleration (must be finite and > 0)
    InvalidMaxAcceleration(f64),
    /// Invalid tick interval (must be > 0)
    InvalidTickInterval(u32),
    /// Servo channel outside the supported range
    InvalidServoChannel(u8),
    /// Two doors share the same servo channel
    DuplicateServoChannel(u8),
    /// Pulse width of zero for a door position
    InvalidPulseWidth {
        /// Door name
        door: heapless::String<32>,
        /// Offending pulse width
        width: u16,
    },
    /// An axis with this name is already registered
    DuplicateAxis(heapless::String<32>),
    /// No room for another axis
    TooManyAxes,
    /// Acceleration ramp shorter than one control tick
    RampBelowTickResolution {
        /// Velocity limit
        max_velocity: f64,
        /// Acceleration limit
        max_acceleration: f64,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motion planning and axis errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Target set for an axis that is not configured
    UnknownAxis(heapless::String<32>),
    /// Target position is NaN or infinite
    NonFiniteTarget(f64),
    /// Planner input (position or velocity) is NaN or infinite
    NonFiniteInput,
    /// Time step must be finite and > 0
    InvalidTimeStep(f64),
    /// Trajectory would need more ticks than can be counted
    TrajectoryTooLong(f64),
}

/// Actuator output errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorError {
    /// No output is bound to this servo channel
    UnknownChannel(u8),
    /// PWM peripheral rejected a duty cycle
    Pwm {
        /// Servo channel
        channel: u8,
        /// Error reported by the PWM driver
        kind: embedded_hal::pwm::ErrorKind,
    },
    /// Generic sink failure on a channel
    Output(u8),
}

/// Command decoding and dispatch errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Message is not a JSON object
    MalformedMessage(heapless::String<64>),
    /// Message has no `cmd` field
    MissingCommand,
    /// `cmd` names no known command
    UnknownCommand(heapless::String<32>),
    /// `set_doors` without a `doors` table
    MissingDoors,
    /// Door name not present in configuration
    DoorNotFound(heapless::String<32>),
    /// Door position is neither `open` nor `close`
    UnknownPosition {
        /// Door name
        door: heapless::String<32>,
        /// Requested position
        position: heapless::String<16>,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Actuator(e) => write!(f, "Actuator error: {}", e),
            Error::Command(e) => write!(f, "Command error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMaxVelocity(v) => write!(f, "Invalid max velocity: {}. Must be > 0", v),
            ConfigError::InvalidMaxAcceleration(v) => {
                write!(f, "Invalid max acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidTickInterval(v) => write!(f, "Invalid tick interval: {} us. Must be > 0", v),
            ConfigError::InvalidServoChannel(v) => write!(f, "Servo channel {} out of range", v),
            ConfigError::DuplicateServoChannel(v) => write!(f, "Servo channel {} used by more than one door", v),
            ConfigError::InvalidPulseWidth { door, width } => {
                write!(f, "Door '{}' has invalid pulse width {}", door, width)
            }
            ConfigError::DuplicateAxis(name) => write!(f, "Duplicate axis name: '{}'", name),
            ConfigError::TooManyAxes => write!(f, "Too many axes"),
            ConfigError::RampBelowTickResolution {
                max_velocity,
                max_acceleration,
            } => write!(
                f,
                "Ramp to {} at {} is shorter than one tick",
                max_velocity, max_acceleration
            ),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::UnknownAxis(name) => write!(f, "Axis '{}' not found", name),
            MotionError::NonFiniteTarget(v) => write!(f, "Target {} is not finite", v),
            MotionError::NonFiniteInput => write!(f, "Planner input is not finite"),
            MotionError::InvalidTimeStep(v) => write!(f, "Invalid time step: {}. Must be > 0", v),
            MotionError::TrajectoryTooLong(d) => write!(f, "Move of {} needs too many ticks", d),
        }
    }
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorError::UnknownChannel(ch) => write!(f, "No output bound to servo channel {}", ch),
            ActuatorError::Pwm { channel, kind } => {
                write!(f, "PWM error on servo channel {}: {:?}", channel, kind)
            }
            ActuatorError::Output(ch) => write!(f, "Output failed on servo channel {}", ch),
        }
    }
}

impl CommandError {
    /// Wrap the raw text of a message that did not decode to an object.
    pub fn malformed(raw: &str) -> Self {
        CommandError::MalformedMessage(truncated(raw))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MalformedMessage(msg) => write!(f, "message is not an object: {}", msg),
            CommandError::MissingCommand => write!(f, "message missing cmd"),
            CommandError::UnknownCommand(cmd) => write!(f, "unknown cmd {}", cmd),
            CommandError::MissingDoors => write!(f, "set_doors missing doors"),
            CommandError::DoorNotFound(name) => write!(f, "door {} not found", name),
            CommandError::UnknownPosition { door, position } => {
                write!(f, "door {} has no position {}", door, position)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Error::Actuator(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for ActuatorError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

/// Short name for heapless string conversions that may truncate.
pub(crate) fn name_of(s: &str) -> heapless::String<32> {
    truncated(s)
}

/// Copy as much of `s` as fits into a fixed-capacity string.
pub(crate) fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Bounded list of recent errors.
///
/// Once full, further errors are dropped so the oldest reports survive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorLog {
    entries: heapless::Vec<Error, MAX_ERROR_MESSAGES>,
}

impl ErrorLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error if there is room.
    pub fn push(&mut self, error: impl Into<Error>) {
        let _ = self.entries.push(error.into());
    }

    /// Check whether any error has been recorded.
    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of recorded errors.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over recorded errors, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.entries.iter()
    }

    /// Drop all recorded errors.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render the log as one comma-separated line.
    ///
    /// Output that does not fit is cut off.
    pub fn joined<const N: usize>(&self) -> heapless::String<N> {
        use core::fmt::Write;

        let mut out = heapless::String::new();
        for (i, error) in self.entries.iter().enumerate() {
            if i > 0 && out.push(',').is_err() {
                break;
            }
            if write!(out, "{}", error).is_err() {
                break;
            }
        }
        out
    }
}
