//! Device metadata snapshot.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of a connected pad
//! suitable for UI display and logging. Backends populate what they know;
//! unknown fields remain `None`. None of it is needed for correct input
//! decoding.
//!
//! # Conventions
//! - `bus` is a short bus hint like `"usb"`, `"bluetooth"` or `"xinput"`.
//! - `path` is the OS path the device was opened from. It is the same string
//!   as the slot's [`DeviceKey`](crate::device::DeviceKey), kept here so a
//!   serialized snapshot is self-describing.
//!
//! # Example
//! ```no_run
//! use padlink::{Manager, SlotId};
//!
//! let mut mgr = Manager::native();
//! mgr.init();
//! for slot in mgr.connected_slots().collect::<Vec<SlotId>>() {
//!     if let Some(meta) = mgr.device_meta(slot) {
//!         println!("{slot}: {}", meta.display_name());
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Snapshot of metadata describing a single device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// High-level bus classification (e.g. `"usb"`, `"bluetooth"`, `"xinput"`).
    pub bus: Option<String>,

    /// USB Vendor ID (VID), if known.
    pub vid: Option<u16>,

    /// USB Product ID (PID), if known.
    pub pid: Option<u16>,

    /// Human-readable product name from the driver.
    pub product_string: Option<String>,

    /// OS path to the device.
    pub path: Option<String>,
}

impl DeviceMeta {
    /// Product name, or the path when the driver reported no name.
    pub fn display_name(&self) -> &str {
        self.product_string
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("Unknown")
    }
}
