//! Tunables for the slot table and the normalizer.
//!
//! [`GamepadConfig`] is plain data and (de)serializes with serde, so a host can
//! keep it inside its own settings file. The defaults match the XInput
//! recommended deadzones, which are also sensible for evdev pads once their
//! axes have been rescaled into the 16-bit raw range.
//!
//! ```
//! use padlink::GamepadConfig;
//!
//! let cfg = GamepadConfig::from_toml_str("slots = 2\ntrigger_deadzone = 40").unwrap();
//! assert_eq!(cfg.slots, 2);
//! assert_eq!(cfg.left_stick_deadzone, 7849.0);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::state::{STICK_RAW_MAX, TRIGGER_RAW_MAX};

/// Number of slots when nothing else is configured.
pub const DEFAULT_SLOTS: usize = 4;

/// Shortest allowed time between two rescans.
pub const MIN_RESCAN_INTERVAL_MS: u64 = 2000;

/// Library configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    /// Fixed number of device slots (`N`).
    pub slots: usize,
    /// Left stick deadzone in raw units (`0..32767`).
    pub left_stick_deadzone: f32,
    /// Right stick deadzone in raw units (`0..32767`).
    pub right_stick_deadzone: f32,
    /// Trigger deadzone in raw units (`0..255`).
    pub trigger_deadzone: f32,
    /// Minimum time between two device rescans, at least
    /// [`MIN_RESCAN_INTERVAL_MS`].
    pub rescan_interval_ms: u64,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
            left_stick_deadzone: 7849.0,
            right_stick_deadzone: 8689.0,
            trigger_deadzone: 30.0,
            rescan_interval_ms: MIN_RESCAN_INTERVAL_MS,
        }
    }
}

impl GamepadConfig {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every value is usable by the normalizer.
    pub fn validate(&self) -> Result<()> {
        if self.slots == 0 {
            return Err(Error::Config("slots must be at least 1".into()));
        }
        let stick_max = f32::from(STICK_RAW_MAX);
        for (name, dz) in [
            ("left_stick_deadzone", self.left_stick_deadzone),
            ("right_stick_deadzone", self.right_stick_deadzone),
        ] {
            if !(0.0..stick_max).contains(&dz) {
                return Err(Error::Config(format!(
                    "{name} must be in [0, {stick_max}), got {dz}"
                )));
            }
        }
        let trig_max = f32::from(TRIGGER_RAW_MAX);
        if !(0.0..trig_max).contains(&self.trigger_deadzone) {
            return Err(Error::Config(format!(
                "trigger_deadzone must be in [0, {trig_max}), got {}",
                self.trigger_deadzone
            )));
        }
        if self.rescan_interval_ms < MIN_RESCAN_INTERVAL_MS {
            return Err(Error::Config(format!(
                "rescan_interval_ms must be at least {MIN_RESCAN_INTERVAL_MS}, got {}",
                self.rescan_interval_ms
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GamepadConfig::default().validate().is_ok());
        assert_eq!(GamepadConfig::default().rescan_interval(), Duration::from_secs(2));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = GamepadConfig::from_toml_str("right_stick_deadzone = 9000.0").unwrap();
        assert_eq!(cfg.right_stick_deadzone, 9000.0);
        assert_eq!(cfg.slots, DEFAULT_SLOTS);
        assert_eq!(cfg.trigger_deadzone, 30.0);
    }

    #[test]
    fn zero_slots_rejected() {
        let err = GamepadConfig::from_toml_str("slots = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn deadzone_at_full_scale_rejected() {
        let cfg = GamepadConfig {
            left_stick_deadzone: 32767.0,
            ..GamepadConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = GamepadConfig {
            trigger_deadzone: 255.0,
            ..GamepadConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rescan_interval_has_a_floor() {
        for ms in [0, 16, 1999] {
            let cfg = GamepadConfig {
                rescan_interval_ms: ms,
                ..GamepadConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(Error::Config(_))), "{ms} ms accepted");
        }
        let cfg = GamepadConfig::from_toml_str("rescan_interval_ms = 5000").unwrap();
        assert_eq!(cfg.rescan_interval(), Duration::from_secs(5));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = GamepadConfig::from_toml_str("slots = \"four\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
