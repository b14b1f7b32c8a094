//! One open event node.
//!
//! The node is switched to non-blocking mode right after opening, so a poll
//! drains whatever the kernel has queued and returns as soon as the queue is
//! empty.

use std::io;
use std::os::fd::AsRawFd;

use evdev::{Device, FFEffect, FFEffectData, FFEffectKind, FFReplay, FFTrigger};

use crate::backends::evdev_map::{self, Calibration};
use crate::backends::linux::evdev_discovery;
use crate::device::{Capabilities, DeviceKey, OpenedDevice};
use crate::error::{Error, Result};
use crate::event::RawEvent;
use crate::state::RawFrame;

/// Upper bound on kernel reads per poll, so a flooding device cannot stall
/// the tick.
const MAX_BATCHES_PER_POLL: usize = 64;

/// An open, probed gamepad node.
pub struct EvdevPad {
    key: DeviceKey,
    device: Device,
    calibration: Calibration,
    capabilities: Capabilities,
    /// Uploaded rumble effect; re-used by later rumble commands.
    effect: Option<FFEffect>,
    batch: Vec<RawEvent>,
}

fn set_nonblocking(device: &Device) -> io::Result<()> {
    let fd = device.as_raw_fd();
    // SAFETY: `fd` is owned by `device` and stays open for the duration of
    // both calls.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

fn motor(intensity: f32) -> u16 {
    (intensity.clamp(0.0, 1.0) * f32::from(u16::MAX)) as u16
}

impl EvdevPad {
    /// Open the node at `key`, run the capability probe, and switch to
    /// non-blocking reads.
    pub fn open(key: &DeviceKey) -> Result<OpenedDevice<EvdevPad>> {
        let device = Device::open(key.as_str()).map_err(|source| Error::DeviceOpen {
            key: key.to_string(),
            source,
        })?;

        let probed = evdev_discovery::probe(key, &device)?;

        set_nonblocking(&device).map_err(|source| Error::DeviceOpen {
            key: key.to_string(),
            source,
        })?;

        log::debug!(
            "opened {key} ({}), rumble={}",
            probed.meta.display_name(),
            probed.capabilities.rumble
        );

        Ok(OpenedDevice {
            handle: EvdevPad {
                key: key.clone(),
                device,
                calibration: probed.calibration,
                capabilities: probed.capabilities,
                effect: None,
                batch: Vec::new(),
            },
            capabilities: probed.capabilities,
            meta: probed.meta,
        })
    }

    pub fn key(&self) -> &DeviceKey {
        &self.key
    }

    /// Apply every queued event to `frame`.
    pub fn drain(&mut self, frame: &mut RawFrame) -> Result<()> {
        for _ in 0..MAX_BATCHES_PER_POLL {
            self.batch.clear();
            match self.device.fetch_events() {
                Ok(events) => {
                    self.batch.extend(events.map(|ev| RawEvent {
                        kind: evdev_map::event_kind(ev.event_type().0),
                        code: ev.code(),
                        value: ev.value(),
                    }));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::debug!("read from {} failed: {e}", self.key);
                    return Err(Error::DeviceLost(self.key.to_string()));
                }
            }

            #[cfg(feature = "debug-log")]
            for ev in &self.batch {
                log::trace!("[EVDEV] {} {:?} code={:#x} value={}", self.key, ev.kind, ev.code, ev.value);
            }

            if self.batch.is_empty() {
                return Ok(());
            }
            evdev_map::apply_events(frame, &self.calibration, self.batch.iter().copied());
        }
        Ok(())
    }

    /// Upload (or update) a rumble effect and play it once.
    pub fn rumble(&mut self, left: f32, right: f32, duration_ms: u32) -> Result<()> {
        if !self.capabilities.rumble {
            return Err(Error::Rumble(format!("{} has no rumble motor", self.key)));
        }

        let data = FFEffectData {
            direction: 0,
            trigger: FFTrigger {
                button: 0,
                interval: 0,
            },
            replay: FFReplay {
                length: u16::try_from(duration_ms).unwrap_or(u16::MAX),
                delay: 0,
            },
            kind: FFEffectKind::Rumble {
                strong_magnitude: motor(left),
                weak_magnitude: motor(right),
            },
        };

        let to_rumble = |e: io::Error| Error::Rumble(format!("{}: {e}", self.key));
        let effect = match self.effect.as_mut() {
            Some(effect) => {
                effect.update(data).map_err(to_rumble)?;
                effect
            }
            None => {
                let effect = self.device.upload_ff_effect(data).map_err(to_rumble)?;
                self.effect.insert(effect)
            }
        };
        effect.play(1).map_err(to_rumble)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_scales_and_clamps() {
        assert_eq!(motor(0.0), 0);
        assert_eq!(motor(1.0), u16::MAX);
        assert_eq!(motor(2.0), u16::MAX);
        assert_eq!(motor(-1.0), 0);
        assert_eq!(motor(0.5), 32767);
    }
}
