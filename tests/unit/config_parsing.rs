//! Unit tests for TOML configuration parsing.

use door_motion::config::{load_config, parse_config, DoorState, SystemConfig};
use door_motion::error::{ConfigError, Error};

/// Test parsing a door with every field given.
#[test]
fn test_parse_door_config() {
    let toml_str = r#"
[doors.hatch]
servo = 7
open = 1100
close = 1950
max_velocity = 1500.0
max_acceleration = 2500.0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let door = config.door("hatch").expect("Door not found");

    assert_eq!(door.servo.value(), 7);
    assert_eq!(door.open.value(), 1100);
    assert_eq!(door.close.value(), 1950);
    assert_eq!(door.max_velocity.value(), 1500.0);
    assert_eq!(door.max_acceleration.value(), 2500.0);
    assert_eq!(door.pulse_for(DoorState::Open).value(), 1100);
}

/// Test that limits and timing fall back to defaults.
#[test]
fn test_parse_defaults() {
    let toml_str = r#"
[doors.A]
servo = 1
open = 1300
close = 1898
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let door = config.door("A").expect("Door not found");

    assert_eq!(config.motion.tick_interval_us, 2500);
    assert!((config.motion.dt() - 0.0025).abs() < 1e-12);
    assert_eq!(door.max_velocity.value(), 2000.0);
    assert_eq!(door.max_acceleration.value(), 3000.0);
}

/// Test that doors keep their file order.
#[test]
fn test_parse_preserves_door_order() {
    let toml_str = r#"
[doors.C]
servo = 3
open = 1300
close = 1890

[doors.A]
servo = 1
open = 1300
close = 1898
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let names: Vec<_> = config.door_names().collect();
    assert_eq!(names, ["C", "A"]);
}

/// Test that an out-of-range servo channel is a parse error.
#[test]
fn test_parse_rejects_bad_servo_channel() {
    let toml_str = r#"
[doors.A]
servo = 19
open = 1300
close = 1898
"#;

    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test that a missing pulse width is a parse error.
#[test]
fn test_parse_rejects_missing_field() {
    let toml_str = r#"
[doors.A]
servo = 1
open = 1300
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test loading a configuration file from disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("door_motion_config_parsing.toml");
    std::fs::write(
        &path,
        r#"
[motion]
tick_interval_us = 5000

[doors.A]
servo = 2
open = 1300
close = 1898
"#,
    )
    .expect("Failed to write config");

    let config = load_config(&path).expect("Failed to load config");
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.motion.tick_interval_us, 5000);
    assert_eq!(config.door("A").unwrap().servo.value(), 2);
}

/// Test that a missing file is an I/O error.
#[test]
fn test_load_missing_file() {
    let result = load_config("/nonexistent/doors.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
}
