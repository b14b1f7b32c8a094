//! Event node discovery and the gamepad capability probe.
//!
//! A node qualifies as a gamepad when it reports key events, absolute axis
//! events, and both `ABS_X` and `ABS_Y`. Everything else (keyboards, mice,
//! power buttons, lid switches) is rejected.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use evdev::{AbsoluteAxisType, Device, EventType, FFEffectType};

use crate::backends::evdev_map::{is_hat, Calibration, ABS_CNT};
use crate::device::{Capabilities, DeviceKey};
use crate::error::{Error, Result};
use crate::metadata::DeviceMeta;

const BUS_USB: u16 = 0x03;
const BUS_BLUETOOTH: u16 = 0x05;

/// `eventN` with at least one digit.
pub fn is_event_node(name: &str) -> bool {
    name.strip_prefix("event")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Event nodes under `dir`, sorted by path.
///
/// An unreadable directory yields an empty list.
pub fn list_event_nodes(dir: &Path) -> Vec<DeviceKey> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot list {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut keys: Vec<DeviceKey> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_event_node))
        .map(|entry| DeviceKey::new(entry.path().to_string_lossy().into_owned()))
        .collect();
    keys.sort();
    keys
}

/// Identity of the node file behind `key`.
///
/// udev recreates the node when a device is replugged, so a new device that
/// reuses a node name gets a different inode and change time.
pub fn node_instance(key: &DeviceKey) -> Option<u64> {
    let meta = fs::metadata(key.as_str()).ok()?;
    Some((meta.ino() << 32) ^ (meta.ctime() as u64) ^ ((meta.ctime_nsec() as u64) << 12))
}

/// What the probe learned about an accepted node.
pub struct ProbeResult {
    pub capabilities: Capabilities,
    pub meta: DeviceMeta,
    pub calibration: Calibration,
}

fn bus_name(bus: u16) -> String {
    match bus {
        BUS_USB => "usb".into(),
        BUS_BLUETOOTH => "bluetooth".into(),
        other => format!("bus:{other:#04x}"),
    }
}

/// Confirm `device` is a gamepad and capture what the manager needs.
pub fn probe(key: &DeviceKey, device: &Device) -> Result<ProbeResult> {
    let reject = |reason: &str| Error::CapabilityProbe {
        key: key.to_string(),
        reason: reason.into(),
    };

    let events = device.supported_events();
    if !events.contains(EventType::KEY) {
        return Err(reject("no key events"));
    }
    if !events.contains(EventType::ABSOLUTE) {
        return Err(reject("no absolute axes"));
    }
    let axes = device
        .supported_absolute_axes()
        .ok_or_else(|| reject("no absolute axes"))?;
    if !axes.contains(AbsoluteAxisType::ABS_X) || !axes.contains(AbsoluteAxisType::ABS_Y) {
        return Err(reject("missing X/Y position axes"));
    }

    let abs_state = device.get_abs_state().map_err(|source| Error::DeviceOpen {
        key: key.to_string(),
        source,
    })?;
    let mut calibration = Calibration::default();
    for axis in axes.iter() {
        let code = axis.0;
        if is_hat(code) || usize::from(code) >= ABS_CNT {
            continue;
        }
        if let Some(info) = abs_state.get(usize::from(code)) {
            calibration.set(code, info.minimum, info.maximum);
        }
    }

    let rumble = device
        .supported_ff()
        .is_some_and(|ff| ff.contains(FFEffectType::FF_RUMBLE));

    let id = device.input_id();
    let meta = DeviceMeta {
        bus: Some(bus_name(id.bus_type().0)),
        vid: Some(id.vendor()),
        pid: Some(id.product()),
        product_string: device.name().map(str::to_string),
        path: Some(key.to_string()),
    };

    Ok(ProbeResult {
        capabilities: Capabilities { rumble },
        meta,
        calibration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_node_names() {
        assert!(is_event_node("event0"));
        assert!(is_event_node("event17"));
        assert!(!is_event_node("event"));
        assert!(!is_event_node("mouse0"));
        assert!(!is_event_node("js0"));
        assert!(!is_event_node("by-id"));
        assert!(!is_event_node("event3-old"));
    }

    #[test]
    fn missing_directory_lists_nothing() {
        assert!(list_event_nodes(Path::new("/nonexistent/padlink-input")).is_empty());
    }

    #[test]
    fn node_instance_is_stable_for_one_file() {
        let path = std::env::temp_dir().join(format!("padlink-node-{}", std::process::id()));
        fs::write(&path, b"").unwrap();
        let key = DeviceKey::new(path.to_string_lossy().into_owned());

        let first = node_instance(&key);
        assert!(first.is_some());
        assert_eq!(node_instance(&key), first);

        fs::remove_file(&path).unwrap();
        assert_eq!(node_instance(&key), None);
    }

    #[test]
    fn bus_names() {
        assert_eq!(bus_name(0x03), "usb");
        assert_eq!(bus_name(0x05), "bluetooth");
        assert_eq!(bus_name(0x19), "bus:0x19");
    }
}
