//! Input backends for `padlink`.
//!
//! A backend knows how to find gamepads on one platform, open them, read one
//! raw frame per tick and send rumble. The [`Manager`](crate::manager::Manager)
//! owns exactly one backend and drives it through the [`Backend`] trait.
//!
//! # Provided backends
//! - [`XInputBackend`](windows::XInputBackend): Windows, talks to the XInput
//!   driver with `DeviceIoControl`.
//! - [`EvdevBackend`](linux::EvdevBackend): Linux, reads `/dev/input/event*`.
//! - [`NullBackend`]: discovers nothing. Used on other targets, or when the
//!   `native` feature is disabled.
//! - [`ScriptedBackend`]: in-memory devices driven by the host. Useful for
//!   replaying input and for tests.
//!
//! The protocol decoding used by the two hardware backends lives in
//! [`xinput_report`] and [`evdev_map`] and is compiled on every target.

use crate::device::{DeviceKey, OpenedDevice};
use crate::error::{Error, Result};
use crate::state::RawFrame;

pub mod evdev_map;
pub mod scripted;
pub mod xinput_report;

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;

#[cfg(target_os = "linux")]
#[cfg_attr(docsrs, doc(cfg(target_os = "linux")))]
pub mod linux;

pub use scripted::{ScriptedBackend, ScriptedDevice};

/// Platform capability set used by the manager.
///
/// Handles are owned by the manager's slots. [`close`](Backend::close) takes
/// the handle by value, so each one is released exactly once.
pub trait Backend {
    /// Backend-owned open device.
    type Handle;

    /// List candidate device keys currently present.
    fn discover(&mut self) -> Vec<DeviceKey>;

    /// Identity of the device currently behind `key`, if the backend can tell
    /// instances apart without opening them.
    ///
    /// A key rejected by the capability probe is probed again when this
    /// changes. The default (`None`) keeps the rejection until the key drops
    /// out of a listing.
    fn instance(&mut self, _key: &DeviceKey) -> Option<u64> {
        None
    }

    /// Open `key` and confirm it is a gamepad.
    ///
    /// Returns [`Error::DeviceOpen`] when the OS refuses the open (the key is
    /// tried again on the next scan) and [`Error::CapabilityProbe`] when the
    /// device is not a gamepad.
    fn probe_and_open(&mut self, key: &DeviceKey) -> Result<OpenedDevice<Self::Handle>>;

    /// Read everything the device has for this tick into `frame`.
    ///
    /// `frame` keeps its previous contents between calls. Returns
    /// [`Error::DeviceLost`] once the device is gone.
    fn poll(&mut self, handle: &mut Self::Handle, frame: &mut RawFrame) -> Result<()>;

    /// Start both motors. Intensities are in `[0, 1]`.
    fn rumble(
        &mut self,
        handle: &mut Self::Handle,
        left: f32,
        right: f32,
        duration_ms: u32,
    ) -> Result<()>;

    /// Release the device.
    fn close(&mut self, handle: Self::Handle);
}

/// Backend with no devices.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl Backend for NullBackend {
    type Handle = ();

    fn discover(&mut self) -> Vec<DeviceKey> {
        Vec::new()
    }

    fn probe_and_open(&mut self, key: &DeviceKey) -> Result<OpenedDevice<()>> {
        Err(Error::CapabilityProbe {
            key: key.to_string(),
            reason: "no native backend".into(),
        })
    }

    fn poll(&mut self, _handle: &mut (), _frame: &mut RawFrame) -> Result<()> {
        Ok(())
    }

    fn rumble(&mut self, _handle: &mut (), _left: f32, _right: f32, _ms: u32) -> Result<()> {
        Ok(())
    }

    fn close(&mut self, _handle: ()) {}
}

/// Backend compiled in for this target.
#[cfg(all(feature = "native", target_os = "windows"))]
pub type NativeBackend = windows::XInputBackend;

/// Backend compiled in for this target.
#[cfg(all(feature = "native", target_os = "linux"))]
pub type NativeBackend = linux::EvdevBackend;

/// Backend compiled in for this target.
#[cfg(not(all(feature = "native", any(target_os = "windows", target_os = "linux"))))]
pub type NativeBackend = NullBackend;
