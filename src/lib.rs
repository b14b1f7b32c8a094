//! padlink: fixed-slot gamepad input for Rust.
//!
//! Discovers connected controllers, polls them once per host tick, and exposes
//! a normalized, edge-aware view of their buttons, sticks and triggers.
//!
//! - Windows: the XInput driver, spoken to directly with `DeviceIoControl`.
//! - Linux: `/dev/input/event*` through `evdev`.
//! - Anywhere: [`ScriptedBackend`] for replayed or synthetic input.
//!
//! ```no_run
//! use padlink::{Button, Manager, Stick, StickDirection};
//!
//! let mut pads = Manager::native();
//! loop {
//!     pads.update();
//!     if pads.button_triggered(0, Button::A) {
//!         pads.set_rumble(0, 0.5, 0.5, 200);
//!     }
//!     if pads.stick_dir_triggered(0, Stick::Left, StickDirection::Up) {
//!         println!("menu up");
//!     }
//!     # break;
//! }
//! ```
//!
//! # Feature flags
//! - **`native`** (default): use the platform backend for [`Manager::native`].
//!   Without it, or on other targets, `native()` finds no devices.
//! - **`debug-log`**: trace every decoded report or event at `trace` level.
//!
//! Logging goes through the [`log`] facade; the library never installs a
//! logger.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod buttons;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod metadata;
pub mod normalize;
pub mod slots;
pub mod snapshot;
pub mod state;

pub use backends::{Backend, NativeBackend, NullBackend, ScriptedBackend, ScriptedDevice};
pub use buttons::{Button, ButtonSet};
pub use config::GamepadConfig;
pub use device::{Capabilities, DeviceKey, OpenedDevice};
pub use error::{Error, Result};
pub use event::{EventKind, RawEvent};
pub use manager::Manager;
pub use metadata::DeviceMeta;
pub use slots::SlotId;
pub use snapshot::SlotSnapshot;
pub use state::{AxisState, RawFrame, RawStick, Stick, StickDirection, Trigger, TriggerState};
