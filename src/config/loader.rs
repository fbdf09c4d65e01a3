//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{truncated, ConfigError, Error, ErrorLog, Result};

use super::SystemConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
///
/// # Example
///
/// ```rust,ignore
/// use door_motion::load_config;
///
/// let config = load_config("doors.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SystemConfig> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::Config(ConfigError::IoError(truncated(&e.to_string()))))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<SystemConfig> {
    let config: SystemConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncated(e.message()))))?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

/// Load configuration, falling back to [`SystemConfig::fallback`] on failure.
///
/// The controller must come up even without a usable configuration file, so
/// any load error is recorded in the returned log instead of being returned.
pub fn load_config_or_fallback<P: AsRef<Path>>(path: P) -> (SystemConfig, ErrorLog) {
    let mut errors = ErrorLog::new();
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            errors.push(e);
            SystemConfig::fallback()
        }
    };
    (config, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[doors.A]
servo = 1
open = 1300
close = 1898
"#;

        let config = parse_config(toml).unwrap();
        let door = config.door("A").unwrap();
        assert_eq!(door.max_velocity.value(), 2000.0);
        assert_eq!(config.motion.tick_interval_us, 2500);
    }

    #[test]
    fn test_parse_with_limits_and_timing() {
        let toml = r#"
[motion]
tick_interval_us = 5000

[doors.front]
servo = 4
open = 1250
close = 1900
max_velocity = 1500.0
max_acceleration = 2500
"#;

        let config = parse_config(toml).unwrap();
        let door = config.door("front").unwrap();
        assert_eq!(door.servo.value(), 4);
        assert_eq!(door.max_acceleration.value(), 2500.0);
        assert_eq!(config.motion.tick_interval_us, 5000);
    }

    #[test]
    fn test_parse_rejects_bad_channel() {
        let toml = r#"
[doors.A]
servo = 42
open = 1300
close = 1898
"#;

        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let (config, errors) = load_config_or_fallback("/nonexistent/doors.toml");

        assert_eq!(config.door_names().count(), 3);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.iter().next(),
            Some(Error::Config(ConfigError::IoError(_)))
        ));
    }
}
