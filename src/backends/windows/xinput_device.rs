#![cfg(target_os = "windows")]

//! One open XInput device interface.
//!
//! Opening runs the init handshake ([`IOCTL_XINPUT_INIT`]); only a failed or
//! short reply rejects the device. A reply flagged invalid or reporting no
//! ports still connects, with the standard layout and no LED write. Every
//! poll is a single [`IOCTL_XINPUT_GET_DATA`] round trip.
//!
//! # Rumble
//! The driver has no notion of duration. A rumble command records a deadline
//! and the first read after it sends a stop write.
//!
//! # Debug logging
//! With the `debug-log` feature each decoded report is traced.

use std::ffi::c_void;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use std::time::{Duration, Instant};

use windows_sys::Win32::Foundation::{
    CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows_sys::Win32::System::IO::DeviceIoControl;

use crate::backends::xinput_report::{
    rumble_payload, InitReply, ReportLayout, INIT_REPLY_LEN, IOCTL_XINPUT_GET_DATA,
    IOCTL_XINPUT_INIT, IOCTL_XINPUT_SET_DATA, LED_CONFIG_PAYLOAD, STANDARD_REPORT_LEN,
};
use crate::device::{Capabilities, DeviceKey, OpenedDevice};
use crate::error::{Error, Result};
use crate::metadata::DeviceMeta;
use crate::state::RawFrame;

/// Owned driver handle; closed on drop.
struct DriverHandle(HANDLE);

impl Drop for DriverHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from CreateFileW and is closed once.
        unsafe {
            CloseHandle(self.0);
        }
    }
}

impl DriverHandle {
    fn open(key: &DeviceKey) -> std::io::Result<Self> {
        let wide: Vec<u16> = std::ffi::OsStr::new(key.as_str())
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        // SAFETY: `wide` is NUL-terminated and outlives the call.
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                ptr::null_mut(),
            )
        };
        if handle as isize == INVALID_HANDLE_VALUE as isize {
            return Err(std::io::Error::last_os_error());
        }
        Ok(Self(handle))
    }

    /// One synchronous control round trip. Returns the number of bytes written
    /// into `output`.
    fn ioctl(&self, code: u32, input: &[u8], output: &mut [u8]) -> std::io::Result<usize> {
        let mut returned: u32 = 0;
        let (out_ptr, out_len) = if output.is_empty() {
            (ptr::null_mut(), 0)
        } else {
            (output.as_mut_ptr() as *mut c_void, output.len() as u32)
        };
        // SAFETY: buffers are valid for the lengths passed; no OVERLAPPED.
        let ok = unsafe {
            DeviceIoControl(
                self.0,
                code,
                input.as_ptr() as *const c_void,
                input.len() as u32,
                out_ptr,
                out_len,
                &mut returned,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(returned as usize)
    }
}

/// An open, handshaken XInput device.
pub struct XInputPad {
    key: DeviceKey,
    handle: DriverHandle,
    layout: ReportLayout,
    rumble_stop_at: Option<Instant>,
    buf: [u8; STANDARD_REPORT_LEN],
}

impl XInputPad {
    /// Open `key` and run the init handshake.
    pub fn open(key: &DeviceKey) -> Result<OpenedDevice<XInputPad>> {
        let handle = DriverHandle::open(key).map_err(|source| Error::DeviceOpen {
            key: key.to_string(),
            source,
        })?;

        let mut reply = [0u8; INIT_REPLY_LEN];
        let n = handle
            .ioctl(IOCTL_XINPUT_INIT, &[], &mut reply)
            .map_err(|e| Error::CapabilityProbe {
                key: key.to_string(),
                reason: format!("init request failed: {e}"),
            })?;
        if n < INIT_REPLY_LEN {
            return Err(Error::CapabilityProbe {
                key: key.to_string(),
                reason: format!("short init reply ({n} bytes)"),
            });
        }

        let init = InitReply::parse(&reply);
        if init.is_valid() {
            if let Err(e) = handle.ioctl(IOCTL_XINPUT_SET_DATA, &LED_CONFIG_PAYLOAD, &mut []) {
                log::debug!("LED write to {key} failed: {e}");
            }
        } else {
            log::debug!("{key}: init reply without usable ports ({init:?}), skipping setup");
        }

        let layout = init.layout();
        log::debug!(
            "opened {key}: vid={:04x} pid={:04x} layout={layout:?}",
            init.vid,
            init.pid
        );

        let meta = DeviceMeta {
            bus: Some("xinput".into()),
            vid: Some(init.vid),
            pid: Some(init.pid),
            product_string: Some("XInput Controller".into()),
            path: Some(key.to_string()),
        };

        Ok(OpenedDevice {
            handle: XInputPad {
                key: key.clone(),
                handle,
                layout,
                rumble_stop_at: None,
                buf: [0u8; STANDARD_REPORT_LEN],
            },
            capabilities: Capabilities { rumble: true },
            meta,
        })
    }

    pub fn key(&self) -> &DeviceKey {
        &self.key
    }

    /// Fetch one report into `frame`.
    ///
    /// A failed round trip, a short reply, or a status other than "present"
    /// means the device is gone.
    pub fn read(&mut self, frame: &mut RawFrame, now: Instant) -> Result<()> {
        if self.rumble_stop_at.is_some_and(|at| now >= at) {
            self.rumble_stop_at = None;
            if let Err(e) = self.send_motors(0.0, 0.0) {
                log::debug!("rumble stop on {} failed: {e}", self.key);
            }
        }

        let len = self.layout.report_len();
        let lost = || Error::DeviceLost(self.key.to_string());
        let n = self
            .handle
            .ioctl(IOCTL_XINPUT_GET_DATA, self.layout.request(), &mut self.buf[..len])
            .map_err(|e| {
                log::debug!("report read from {} failed: {e}", self.key);
                lost()
            })?;

        let report = self.layout.decode(&self.buf[..n.min(len)]).ok_or_else(lost)?;

        #[cfg(feature = "debug-log")]
        log::trace!("[XINPUT] {} {report:?}", self.key);

        if !report.is_present() {
            return Err(lost());
        }
        report.apply(frame);
        Ok(())
    }

    /// Start both motors and schedule the stop.
    pub fn rumble(&mut self, left: f32, right: f32, duration_ms: u32, now: Instant) -> Result<()> {
        self.send_motors(left, right)
            .map_err(|e| Error::Rumble(format!("{}: {e}", self.key)))?;
        self.rumble_stop_at = Some(now + Duration::from_millis(u64::from(duration_ms)));
        Ok(())
    }

    fn send_motors(&self, left: f32, right: f32) -> std::io::Result<()> {
        self.handle
            .ioctl(IOCTL_XINPUT_SET_DATA, &rumble_payload(left, right), &mut [])
            .map(|_| ())
    }
}
