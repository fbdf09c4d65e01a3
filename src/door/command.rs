//! Command and response messages exchanged with the host.
//!
//! The host transport is line-based JSON; each line decodes into a
//! [`CommandMessage`] and each reply encodes a [`Response`]. The framing
//! itself lives outside this crate.

use heapless::{FnvIndexMap, String};
use serde::{Deserialize, Serialize};

use crate::config::{DoorMap, DoorState, MAX_DOORS};
use crate::error::{truncated, CommandError};

/// Requested position per door name, as sent by the host.
pub type DoorRequest = FnvIndexMap<String<32>, String<16>, MAX_DOORS>;

/// Commanded state per door name.
pub type DoorStates = FnvIndexMap<String<32>, DoorState, MAX_DOORS>;

/// Current pulse width per door name.
pub type DoorPositions = FnvIndexMap<String<32>, u16, MAX_DOORS>;

/// Raw command message as decoded from the wire.
///
/// ```json
/// {"cmd": "set_doors", "doors": {"A": "open", "B": "close"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommandMessage {
    /// Command name.
    #[serde(default)]
    pub cmd: Option<String<32>>,

    /// Door table for `set_doors`.
    #[serde(default)]
    pub doors: Option<DoorRequest>,
}

/// A decoded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Move doors to named positions.
    SetDoors(DoorRequest),
    /// Report the commanded state of every door.
    GetDoors,
    /// Report the current pulse width of every door.
    GetPositions,
    /// Enable every servo output.
    Enable,
    /// Disable every servo output.
    Disable,
    /// Report whether every servo output is enabled.
    IsEnabled,
    /// Report the door configuration.
    GetConfig,
    /// Report configuration load errors.
    ConfigErrors,
}

impl TryFrom<CommandMessage> for Command {
    type Error = CommandError;

    fn try_from(message: CommandMessage) -> Result<Self, Self::Error> {
        let cmd = message.cmd.ok_or(CommandError::MissingCommand)?;
        let command = match cmd.as_str() {
            "set_doors" => Command::SetDoors(message.doors.ok_or(CommandError::MissingDoors)?),
            "get_doors" => Command::GetDoors,
            "get_positions" => Command::GetPositions,
            "enable" => Command::Enable,
            "disable" => Command::Disable,
            "is_enabled" => Command::IsEnabled,
            "get_config" => Command::GetConfig,
            "config_errors" => Command::ConfigErrors,
            other => return Err(CommandError::UnknownCommand(truncated(other))),
        };
        Ok(command)
    }
}

/// Reply to a command.
///
/// Only the fields relevant to the command are present on the wire.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    /// Whether the command fully succeeded.
    pub ok: bool,

    /// Comma-separated error messages when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String<128>>,

    /// Commanded door states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors: Option<DoorStates>,

    /// Current door pulse widths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<DoorPositions>,

    /// Whether every servo output is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,

    /// Door configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<DoorMap>,

    /// Configuration load errors, comma-separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_errors: Option<String<128>>,
}

impl Response {
    /// A successful reply with no payload.
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    /// A failed reply carrying an error description.
    pub fn failure(err: String<128>) -> Self {
        Self {
            ok: false,
            err: Some(err),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::name_of;

    fn message(cmd: Option<&str>) -> CommandMessage {
        CommandMessage {
            cmd: cmd.map(truncated),
            doors: None,
        }
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::try_from(message(Some("get_doors"))), Ok(Command::GetDoors));
        assert_eq!(Command::try_from(message(Some("enable"))), Ok(Command::Enable));
        assert_eq!(Command::try_from(message(Some("config_errors"))), Ok(Command::ConfigErrors));
    }

    #[test]
    fn test_missing_and_unknown_command() {
        assert_eq!(Command::try_from(message(None)), Err(CommandError::MissingCommand));
        assert_eq!(
            Command::try_from(message(Some("open_sesame"))),
            Err(CommandError::UnknownCommand(truncated("open_sesame")))
        );
    }

    #[test]
    fn test_set_doors_requires_table() {
        assert_eq!(
            Command::try_from(message(Some("set_doors"))),
            Err(CommandError::MissingDoors)
        );

        let mut doors = DoorRequest::new();
        doors.insert(name_of("A"), truncated("open")).unwrap();
        let msg = CommandMessage {
            cmd: Some(truncated("set_doors")),
            doors: Some(doors.clone()),
        };
        assert_eq!(Command::try_from(msg), Ok(Command::SetDoors(doors)));
    }

    #[test]
    fn test_failure_response() {
        let rsp = Response::failure(truncated("door D not found"));

        assert!(!rsp.ok);
        assert_eq!(rsp.err.as_deref(), Some("door D not found"));
        assert!(rsp.doors.is_none());
    }
}
