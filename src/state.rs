//! Per-slot input state.
//!
//! ## Raw value convention
//! Both backends hand the normalizer integers in the same ranges:
//! - stick axes: `-32768..=32767`, positive X is right and positive Y is **up**
//! - triggers: `0..=255`
//!
//! The backend writes into a [`RawFrame`]; the normalizer reads the frame and
//! produces [`AxisState`] / [`TriggerState`]. The frame is never modified by
//! normalization, so event-stream devices (which only report axes that moved)
//! keep an accurate accumulated picture of the pad.

use serde::{Deserialize, Serialize};

use crate::buttons::ButtonSet;

/// Full-scale positive stick value.
pub const STICK_RAW_MAX: i16 = i16::MAX;
/// Full-scale trigger value.
pub const TRIGGER_RAW_MAX: u8 = u8::MAX;

/// Analog sticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stick {
    Left,
    Right,
}

impl Stick {
    pub const ALL: [Stick; 2] = [Stick::Left, Stick::Right];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Analog triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    Left,
    Right,
}

impl Trigger {
    pub const ALL: [Trigger; 2] = [Trigger::Left, Trigger::Right];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Four-way classification of a stick outside its deadzone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StickDirection {
    #[default]
    Center,
    Up,
    Down,
    Left,
    Right,
}

/// Raw position of one stick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawStick {
    pub x: i32,
    pub y: i32,
}

/// One backend decode of a device, prior to normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawFrame {
    pub buttons: ButtonSet,
    pub sticks: [RawStick; 2],
    pub triggers: [i32; 2],
}

impl RawFrame {
    #[inline]
    pub fn stick_mut(&mut self, stick: Stick) -> &mut RawStick {
        &mut self.sticks[stick.index()]
    }

    #[inline]
    pub fn set_trigger(&mut self, trigger: Trigger, value: i32) {
        self.triggers[trigger.index()] = value;
    }
}

/// Derived stick state.
///
/// `raw_x`/`raw_y` are the reported raw values: they read `0` while the stick
/// rests inside its deadzone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisState {
    pub raw_x: i32,
    pub raw_y: i32,
    pub norm_x: f32,
    pub norm_y: f32,
    /// Deadzone-scaled length in `[0, 1]`.
    pub magnitude: f32,
    /// Radians in `(-π, π]`; only meaningful while `magnitude > 0`.
    pub angle: f32,
    pub direction_current: StickDirection,
    pub direction_previous: StickDirection,
}

/// Derived trigger state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerState {
    /// Reported raw value; `0` while inside the deadzone.
    pub raw_value: i32,
    /// Deadzone-scaled press length in `[0, 1]`.
    pub press_length: f32,
    pub pressed_current: bool,
    pub pressed_previous: bool,
}

/// Edge helpers shared by buttons, triggers and stick directions.
#[inline]
pub(crate) fn triggered(previous: bool, current: bool) -> bool {
    !previous && current
}

#[inline]
pub(crate) fn released(previous: bool, current: bool) -> bool {
    previous && !current
}
