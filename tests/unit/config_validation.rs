//! Unit tests for configuration validation.

use door_motion::config::{validate_config, SystemConfig};
use door_motion::error::{ConfigError, Error};

fn config(toml_str: &str) -> SystemConfig {
    toml::from_str(toml_str).expect("Failed to parse TOML")
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = config(
        r#"
[doors.A]
servo = 1
open = 1300
close = 1898

[doors.B]
servo = 2
open = 1290
close = 1890
"#,
    );

    assert!(validate_config(&config).is_ok());
}

/// Test validation fails when two doors share a servo.
#[test]
fn test_duplicate_servo_channel() {
    let config = config(
        r#"
[doors.A]
servo = 3
open = 1300
close = 1898

[doors.B]
servo = 3
open = 1290
close = 1890
"#,
    );

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::DuplicateServoChannel(3)))
    );
}

/// Test validation fails for a non-positive velocity limit.
#[test]
fn test_invalid_max_velocity() {
    let config = config(
        r#"
[doors.A]
servo = 1
open = 1300
close = 1898
max_velocity = 0.0
"#,
    );

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxVelocity(_)))
    ));
}

/// Test validation fails for a non-positive acceleration limit.
#[test]
fn test_invalid_max_acceleration() {
    let config = config(
        r#"
[doors.A]
servo = 1
open = 1300
close = 1898
max_acceleration = -10.0
"#,
    );

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMaxAcceleration(_)))
    ));
}

/// Test validation fails for a zero pulse width.
#[test]
fn test_zero_pulse_width() {
    let config = config(
        r#"
[doors.A]
servo = 1
open = 0
close = 1898
"#,
    );

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidPulseWidth { width: 0, .. }))
    ));
}

/// Test validation fails for a zero tick interval.
#[test]
fn test_zero_tick_interval() {
    let config = config(
        r#"
[motion]
tick_interval_us = 0
"#,
    );

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidTickInterval(0)))
    );
}

/// Test validation fails when a door reaches full speed within one tick.
#[test]
fn test_ramp_shorter_than_tick() {
    let config = config(
        r#"
[doors.A]
servo = 1
open = 1300
close = 1898
max_velocity = 1.0
max_acceleration = 10000.0
"#,
    );

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::RampBelowTickResolution {
            max_velocity: 1.0,
            max_acceleration: 10000.0,
        }))
    );
}

/// Test that the same limits pass with a finer control period.
#[test]
fn test_ramp_resolution_depends_on_tick() {
    let door = r#"
[doors.A]
servo = 1
open = 1300
close = 1898
max_velocity = 1000.0
max_acceleration = 1000000.0
"#;

    // 1 ms ramp: under one 2.5 ms tick, two 0.5 ms ticks
    let coarse = config(door);
    assert!(matches!(
        validate_config(&coarse),
        Err(Error::Config(ConfigError::RampBelowTickResolution { .. }))
    ));

    let fine = config(&format!("[motion]\ntick_interval_us = 500\n{}", door));
    assert!(validate_config(&fine).is_ok());
}

/// Test that an empty configuration is valid.
#[test]
fn test_empty_config_is_valid() {
    assert!(validate_config(&SystemConfig::default()).is_ok());
}
