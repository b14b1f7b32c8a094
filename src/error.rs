//! Error type shared by backends and the manager.
//!
//! None of these escape the public query/command surface of
//! [`Manager`](crate::manager::Manager): a failed open or probe drops that one
//! candidate, a lost device demotes its slot, and rumble failures are logged
//! and forgotten. They exist so backends can report *why* something failed.

use thiserror::Error;

/// Errors raised while talking to a device or validating configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The OS refused to open the device node.
    #[error("failed to open device {key}: {source}")]
    DeviceOpen {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The device opened but does not look like a gamepad.
    #[error("device {key} failed capability probe: {reason}")]
    CapabilityProbe { key: String, reason: String },

    /// A live read reported that the device is gone.
    #[error("device {0} was lost")]
    DeviceLost(String),

    /// A rumble command could not be delivered.
    #[error("rumble failed: {0}")]
    Rumble(String),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Convenient result alias for padlink operations.
pub type Result<T> = std::result::Result<T, Error>;
