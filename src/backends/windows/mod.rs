#![cfg(target_os = "windows")]

//! Windows input backend.
//!
//! Gamepads are reached through the XInput kernel driver's device interface,
//! without going through `xinput1_x.dll`:
//! - [`xinput_discovery`] enumerates interface paths with SetupAPI
//! - [`xinput_device`] opens a path, runs the init handshake, reads reports
//!   and sends motor commands with `DeviceIoControl`
//!
//! The wire formats themselves live in
//! [`xinput_report`](crate::backends::xinput_report) so they can be tested on
//! any target.
//!
//! Report reads are synchronous driver round trips; their latency is whatever
//! the driver takes.

pub mod xinput_device;
pub mod xinput_discovery;

use std::time::Instant;

use crate::backends::Backend;
use crate::device::{DeviceKey, OpenedDevice};
use crate::error::Result;
use crate::state::RawFrame;

pub use xinput_device::XInputPad;

/// XInput driver [`Backend`].
#[derive(Debug, Default, Clone, Copy)]
pub struct XInputBackend;

impl XInputBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for XInputBackend {
    type Handle = XInputPad;

    fn discover(&mut self) -> Vec<DeviceKey> {
        xinput_discovery::list_interfaces()
    }

    fn probe_and_open(&mut self, key: &DeviceKey) -> Result<OpenedDevice<XInputPad>> {
        XInputPad::open(key)
    }

    fn poll(&mut self, handle: &mut XInputPad, frame: &mut RawFrame) -> Result<()> {
        handle.read(frame, Instant::now())
    }

    fn rumble(
        &mut self,
        handle: &mut XInputPad,
        left: f32,
        right: f32,
        duration_ms: u32,
    ) -> Result<()> {
        handle.rumble(left, right, duration_ms, Instant::now())
    }

    fn close(&mut self, handle: XInputPad) {
        log::debug!("closing {}", handle.key());
        drop(handle);
    }
}
