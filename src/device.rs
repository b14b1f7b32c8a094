//! Device identity and what a backend hands back after a successful probe.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::DeviceMeta;

/// Opaque platform key of a physical device.
///
/// On Linux this is the event node path (`/dev/input/event7`), on Windows the
/// device interface path returned by SetupAPI. Two connected slots never hold
/// the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceKey(String);

impl DeviceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Optional features detected at connect time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub rumble: bool,
}

/// A device that passed its capability probe.
pub struct OpenedDevice<H> {
    pub handle: H,
    pub capabilities: Capabilities,
    pub meta: DeviceMeta,
}
