//! In-memory backend driven by the host.
//!
//! [`ScriptedBackend`] is a cheap, cloneable handle to a shared device table.
//! Hand one clone to a [`Manager`](crate::manager::Manager) and keep another to
//! plug pads in, move their sticks, yank them out again, and read back the
//! rumble commands the manager issued.
//!
//! ```
//! use padlink::{Button, GamepadConfig, Manager, ScriptedBackend};
//!
//! let pads = ScriptedBackend::new();
//! let mut mgr = Manager::with_backend(pads.clone(), GamepadConfig::default());
//!
//! pads.plug("pad0");
//! pads.press("pad0", Button::A);
//! mgr.update();
//! assert!(mgr.button_triggered(0, Button::A));
//! ```
//!
//! Each plug creates a new device *instance*: a handle opened before an
//! unplug keeps failing with [`Error::DeviceLost`] even if the same key is
//! plugged in again.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backends::Backend;
use crate::buttons::Button;
use crate::device::{Capabilities, DeviceKey, OpenedDevice};
use crate::error::{Error, Result};
use crate::metadata::DeviceMeta;
use crate::state::{RawFrame, RawStick, Stick, Trigger};

/// One scripted pad.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDevice {
    /// State reported on the next poll.
    pub frame: RawFrame,
    pub capabilities: Capabilities,
    pub meta: DeviceMeta,
    /// Fail the capability probe.
    pub reject_probe: bool,
    /// Fail the open with an I/O error.
    pub fail_open: bool,
    /// Report the device as gone on the next poll while keeping it listed.
    pub lost: bool,
}

impl ScriptedDevice {
    /// A plain pad with a product name and no rumble.
    pub fn gamepad(name: &str) -> Self {
        Self {
            meta: DeviceMeta {
                bus: Some("virtual".into()),
                product_string: Some(name.to_string()),
                ..DeviceMeta::default()
            },
            ..Self::default()
        }
    }

    pub fn with_rumble(mut self) -> Self {
        self.capabilities.rumble = true;
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.reject_probe = true;
        self
    }
}

/// A rumble command as received by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct RumbleCall {
    pub key: DeviceKey,
    pub left: f32,
    pub right: f32,
    pub duration_ms: u32,
}

/// Handle of an opened scripted pad.
#[derive(Debug)]
pub struct ScriptedHandle {
    key: DeviceKey,
    instance: u64,
}

struct Entry {
    device: ScriptedDevice,
    instance: u64,
}

#[derive(Default)]
struct Table {
    devices: BTreeMap<DeviceKey, Entry>,
    next_instance: u64,
    probes: BTreeMap<DeviceKey, u32>,
    open_handles: usize,
    closes: usize,
    rumbles: Vec<RumbleCall>,
}

/// Shared in-memory device table.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    table: Arc<Mutex<Table>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Plug in a default pad named after its key.
    pub fn plug(&self, key: impl Into<DeviceKey>) {
        let key = key.into();
        let device = ScriptedDevice::gamepad(key.as_str());
        self.plug_device(key, device);
    }

    /// Plug in `device` under `key`, replacing any previous instance.
    pub fn plug_device(&self, key: impl Into<DeviceKey>, device: ScriptedDevice) {
        let mut table = self.lock();
        let instance = table.next_instance;
        table.next_instance += 1;
        table.devices.insert(key.into(), Entry { device, instance });
    }

    /// Remove the pad. Returns `false` if nothing was plugged under `key`.
    pub fn unplug(&self, key: impl Into<DeviceKey>) -> bool {
        self.lock().devices.remove(&key.into()).is_some()
    }

    /// Edit a plugged pad in place. No-op when `key` is not plugged.
    pub fn with_device<F>(&self, key: impl Into<DeviceKey>, f: F)
    where
        F: FnOnce(&mut ScriptedDevice),
    {
        if let Some(entry) = self.lock().devices.get_mut(&key.into()) {
            f(&mut entry.device);
        }
    }

    pub fn set_frame(&self, key: impl Into<DeviceKey>, frame: RawFrame) {
        self.with_device(key, |d| d.frame = frame);
    }

    pub fn press(&self, key: impl Into<DeviceKey>, button: Button) {
        self.with_device(key, |d| d.frame.buttons.insert(button));
    }

    pub fn release(&self, key: impl Into<DeviceKey>, button: Button) {
        self.with_device(key, |d| d.frame.buttons.remove(button));
    }

    pub fn set_stick(&self, key: impl Into<DeviceKey>, stick: Stick, x: i32, y: i32) {
        self.with_device(key, |d| *d.frame.stick_mut(stick) = RawStick { x, y });
    }

    pub fn set_trigger(&self, key: impl Into<DeviceKey>, trigger: Trigger, value: i32) {
        self.with_device(key, |d| d.frame.set_trigger(trigger, value));
    }

    pub fn set_lost(&self, key: impl Into<DeviceKey>, lost: bool) {
        self.with_device(key, |d| d.lost = lost);
    }

    /// Rumble commands received so far, oldest first.
    pub fn rumble_log(&self) -> Vec<RumbleCall> {
        self.lock().rumbles.clone()
    }

    /// How many times `key` went through a capability probe.
    pub fn probe_count(&self, key: impl Into<DeviceKey>) -> u32 {
        self.lock().probes.get(&key.into()).copied().unwrap_or(0)
    }

    /// Handles currently held by the manager.
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    /// Total number of `close` calls.
    pub fn close_count(&self) -> usize {
        self.lock().closes
    }
}

impl Backend for ScriptedBackend {
    type Handle = ScriptedHandle;

    fn discover(&mut self) -> Vec<DeviceKey> {
        self.lock().devices.keys().cloned().collect()
    }

    fn instance(&mut self, key: &DeviceKey) -> Option<u64> {
        self.lock().devices.get(key).map(|entry| entry.instance)
    }

    fn probe_and_open(&mut self, key: &DeviceKey) -> Result<OpenedDevice<ScriptedHandle>> {
        let mut table = self.lock();
        let (device, instance) = match table.devices.get(key) {
            Some(entry) => (entry.device.clone(), entry.instance),
            None => {
                return Err(Error::DeviceOpen {
                    key: key.to_string(),
                    source: std::io::ErrorKind::NotFound.into(),
                })
            }
        };
        if device.fail_open {
            return Err(Error::DeviceOpen {
                key: key.to_string(),
                source: std::io::ErrorKind::PermissionDenied.into(),
            });
        }

        *table.probes.entry(key.clone()).or_default() += 1;
        if device.reject_probe {
            return Err(Error::CapabilityProbe {
                key: key.to_string(),
                reason: "scripted rejection".into(),
            });
        }

        table.open_handles += 1;
        let mut meta = device.meta;
        meta.path = Some(key.to_string());
        Ok(OpenedDevice {
            handle: ScriptedHandle {
                key: key.clone(),
                instance,
            },
            capabilities: device.capabilities,
            meta,
        })
    }

    fn poll(&mut self, handle: &mut ScriptedHandle, frame: &mut RawFrame) -> Result<()> {
        let table = self.lock();
        match table.devices.get(&handle.key) {
            Some(entry) if entry.instance == handle.instance && !entry.device.lost => {
                *frame = entry.device.frame;
                Ok(())
            }
            _ => Err(Error::DeviceLost(handle.key.to_string())),
        }
    }

    fn rumble(
        &mut self,
        handle: &mut ScriptedHandle,
        left: f32,
        right: f32,
        duration_ms: u32,
    ) -> Result<()> {
        let mut table = self.lock();
        let live = table
            .devices
            .get(&handle.key)
            .is_some_and(|e| e.instance == handle.instance);
        if !live {
            return Err(Error::Rumble(format!("{} is not plugged", handle.key)));
        }
        table.rumbles.push(RumbleCall {
            key: handle.key.clone(),
            left,
            right,
            duration_ms,
        });
        Ok(())
    }

    fn close(&mut self, handle: ScriptedHandle) {
        let mut table = self.lock();
        table.open_handles = table.open_handles.saturating_sub(1);
        table.closes += 1;
        drop(handle);
    }
}
