#![cfg(target_os = "linux")]

//! Linux input backend.
//!
//! Gamepads are read from the kernel's event character devices
//! (`/dev/input/event*`) through the `evdev` crate:
//! - [`evdev_discovery`] lists candidate nodes and runs the capability probe
//! - [`evdev_device`] owns one open node: non-blocking drain and rumble
//!
//! Decoding of individual events is shared with every other target in
//! [`evdev_map`](crate::backends::evdev_map).
//!
//! Reading event nodes usually requires membership in the `input` group.
//! Nodes that cannot be opened are skipped and retried on the next scan.

pub mod evdev_device;
pub mod evdev_discovery;

use std::path::PathBuf;

use crate::backends::Backend;
use crate::device::{DeviceKey, OpenedDevice};
use crate::error::Result;
use crate::state::RawFrame;

pub use evdev_device::EvdevPad;

/// Default directory holding event nodes.
pub const INPUT_DIR: &str = "/dev/input";

/// evdev-backed [`Backend`].
#[derive(Debug, Clone)]
pub struct EvdevBackend {
    dir: PathBuf,
}

impl Default for EvdevBackend {
    fn default() -> Self {
        Self::new(INPUT_DIR)
    }
}

impl EvdevBackend {
    /// Scan `dir` instead of `/dev/input`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Backend for EvdevBackend {
    type Handle = EvdevPad;

    fn discover(&mut self) -> Vec<DeviceKey> {
        evdev_discovery::list_event_nodes(&self.dir)
    }

    fn instance(&mut self, key: &DeviceKey) -> Option<u64> {
        evdev_discovery::node_instance(key)
    }

    fn probe_and_open(&mut self, key: &DeviceKey) -> Result<OpenedDevice<EvdevPad>> {
        EvdevPad::open(key)
    }

    fn poll(&mut self, handle: &mut EvdevPad, frame: &mut RawFrame) -> Result<()> {
        handle.drain(frame)
    }

    fn rumble(
        &mut self,
        handle: &mut EvdevPad,
        left: f32,
        right: f32,
        duration_ms: u32,
    ) -> Result<()> {
        handle.rumble(left, right, duration_ms)
    }

    fn close(&mut self, handle: EvdevPad) {
        log::debug!("closing {}", handle.key());
        drop(handle);
    }
}
