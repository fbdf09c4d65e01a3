//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::{Deserialize, Serialize};

use crate::error::name_of;

use super::door::DoorConfig;
use super::units::{PulseWidth, ServoChannel};

/// Maximum number of doors in a configuration.
pub const MAX_DOORS: usize = 32;

/// Default control period in microseconds.
pub const DEFAULT_TICK_INTERVAL_US: u32 = 2500;

/// Named door table.
pub type DoorMap = FnvIndexMap<String<32>, DoorConfig, MAX_DOORS>;

/// Timing of the real-time control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct MotionSettings {
    /// Control period in microseconds.
    #[serde(default = "default_tick_interval_us")]
    pub tick_interval_us: u32,
}

fn default_tick_interval_us() -> u32 {
    DEFAULT_TICK_INTERVAL_US
}

impl MotionSettings {
    /// Control period in seconds.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.tick_interval_us as f64 * 1.0e-6
    }
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            tick_interval_us: DEFAULT_TICK_INTERVAL_US,
        }
    }
}

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SystemConfig {
    /// Control loop timing.
    #[serde(default)]
    pub motion: MotionSettings,

    /// Named door configurations.
    #[serde(default)]
    pub doors: DoorMap,
}

impl SystemConfig {
    /// Built-in configuration used when no valid file is available.
    ///
    /// Three doors `A`, `B` and `C` on servo channels 1 to 3.
    pub fn fallback() -> Self {
        let mut doors = DoorMap::new();
        for (name, servo, open, close) in [("A", 1, 1300, 1898), ("B", 2, 1290, 1890), ("C", 3, 1300, 1890)] {
            if let Ok(channel) = ServoChannel::new(servo) {
                let door = DoorConfig::new(channel, PulseWidth(open), PulseWidth(close));
                let _ = doors.insert(name_of(name), door);
            }
        }

        Self {
            motion: MotionSettings::default(),
            doors,
        }
    }

    /// Get a door configuration by name.
    pub fn door(&self, name: &str) -> Option<&DoorConfig> {
        self.doors
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all door names.
    pub fn door_names(&self) -> impl Iterator<Item = &str> {
        self.doors.keys().map(|s| s.as_str())
    }

    /// Iterate over doors in configuration order.
    pub fn doors(&self) -> impl Iterator<Item = (&str, &DoorConfig)> {
        self.doors.iter().map(|(k, v)| (k.as_str(), v))
    }
}
