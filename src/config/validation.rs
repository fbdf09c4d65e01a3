//! Configuration validation.

use crate::error::{name_of, ConfigError, Error, Result};

use super::system::MAX_DOORS;
use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Tick interval is positive
/// - Door velocity/acceleration limits are positive
/// - Each door's ramp spans at least one tick
/// - Door pulse widths are non-zero
/// - No two doors share a servo channel
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    if config.motion.tick_interval_us == 0 {
        return Err(Error::Config(ConfigError::InvalidTickInterval(
            config.motion.tick_interval_us,
        )));
    }

    let mut channels: heapless::Vec<u8, MAX_DOORS> = heapless::Vec::new();
    for (name, door) in config.doors() {
        validate_door(name, door)?;
        door.limits()?.check_resolution(config.motion.dt())?;

        let channel = door.servo.value();
        if channels.contains(&channel) {
            return Err(Error::Config(ConfigError::DuplicateServoChannel(channel)));
        }
        // Capacity matches the door map, so this cannot overflow.
        let _ = channels.push(channel);
    }

    Ok(())
}

fn validate_door(name: &str, door: &super::DoorConfig) -> Result<()> {
    // Limits must be positive and finite
    door.limits()?;

    for width in [door.open, door.close] {
        if width.value() == 0 {
            return Err(Error::Config(ConfigError::InvalidPulseWidth {
                door: name_of(name),
                width: width.value(),
            }));
        }
    }

    Ok(())
}
