//! Linux input-event decoding.
//!
//! Turns `(type, code, value)` records into updates of a [`RawFrame`]. The
//! mapping is cumulative: records are applied in arrival order and only the
//! last value per button/axis survives, so draining several device frames
//! in one tick is fine.
//!
//! ## Mapping
//! - `EV_KEY`: face/shoulder/thumb/menu buttons and the `BTN_DPAD_*` keys.
//!   `BTN_MODE` (guide) is not mapped.
//! - `ABS_HAT0X` / `ABS_HAT0Y`: D-pad. Negative sets left/up and clears the
//!   opposite, positive sets right/down, zero clears the pair.
//! - `ABS_Z` / `ABS_RZ`: triggers, rescaled into `0..=255`.
//! - `ABS_X`/`ABS_Y`, `ABS_RX`/`ABS_RY`: sticks, rescaled into
//!   `-32768..=32767` with Y inverted so up is positive.
//!
//! Codes follow `linux/input-event-codes.h`.

use crate::buttons::Button;
use crate::event::{EventKind, RawEvent};
use crate::state::{RawFrame, Stick, Trigger};

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;
pub const EV_FF: u16 = 0x15;

pub const BTN_SOUTH: u16 = 0x130;
pub const BTN_EAST: u16 = 0x131;
pub const BTN_NORTH: u16 = 0x133;
pub const BTN_WEST: u16 = 0x134;
pub const BTN_TL: u16 = 0x136;
pub const BTN_TR: u16 = 0x137;
pub const BTN_SELECT: u16 = 0x13a;
pub const BTN_START: u16 = 0x13b;
pub const BTN_MODE: u16 = 0x13c;
pub const BTN_THUMBL: u16 = 0x13d;
pub const BTN_THUMBR: u16 = 0x13e;
pub const BTN_DPAD_UP: u16 = 0x220;
pub const BTN_DPAD_DOWN: u16 = 0x221;
pub const BTN_DPAD_LEFT: u16 = 0x222;
pub const BTN_DPAD_RIGHT: u16 = 0x223;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_Z: u16 = 0x02;
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;
pub const ABS_RZ: u16 = 0x05;
pub const ABS_HAT0X: u16 = 0x10;
pub const ABS_HAT0Y: u16 = 0x11;
pub const ABS_HAT3Y: u16 = 0x17;
/// Number of absolute axis codes.
pub const ABS_CNT: usize = 0x40;

const STICK_SPAN: f64 = 65535.0;
const STICK_OFFSET: f64 = 32768.0;
const TRIGGER_SPAN: f64 = 255.0;

/// Convert a kernel event type into an [`EventKind`].
pub fn event_kind(ev_type: u16) -> EventKind {
    match ev_type {
        EV_KEY => EventKind::Key,
        EV_ABS => EventKind::Absolute,
        other => EventKind::Other(other),
    }
}

/// Key code → button.
pub fn key_button(code: u16) -> Option<Button> {
    Some(match code {
        BTN_SOUTH => Button::A,
        BTN_EAST => Button::B,
        BTN_NORTH => Button::X,
        BTN_WEST => Button::Y,
        BTN_TL => Button::LeftShoulder,
        BTN_TR => Button::RightShoulder,
        BTN_SELECT => Button::Back,
        BTN_START => Button::Start,
        BTN_THUMBL => Button::LeftThumb,
        BTN_THUMBR => Button::RightThumb,
        BTN_DPAD_UP => Button::DPadUp,
        BTN_DPAD_DOWN => Button::DPadDown,
        BTN_DPAD_LEFT => Button::DPadLeft,
        BTN_DPAD_RIGHT => Button::DPadRight,
        _ => return None,
    })
}

/// Hat axes are reported as -1/0/+1 and carry no calibration.
#[inline]
pub fn is_hat(code: u16) -> bool {
    (ABS_HAT0X..=ABS_HAT3Y).contains(&code)
}

/// Device-reported range of one absolute axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisBounds {
    pub min: i32,
    pub max: i32,
}

impl AxisBounds {
    /// Position of `value` inside the range, or `None` for a degenerate range.
    fn fraction(self, value: i32) -> Option<f64> {
        let span = f64::from(self.max) - f64::from(self.min);
        if span <= 0.0 {
            return None;
        }
        Some((f64::from(value) - f64::from(self.min)) / span)
    }

    /// `((v - min) / (max - min)) * 255`, truncated and clamped to `0..=255`.
    pub fn rescale_trigger(self, value: i32) -> Option<i32> {
        let raw = self.fraction(value)? * TRIGGER_SPAN;
        Some((raw as i32).clamp(0, 255))
    }

    /// `((v - min) / (max - min)) * 65535 - 32768`, truncated and clamped.
    pub fn rescale_stick(self, value: i32) -> Option<i32> {
        let raw = self.fraction(value)? * STICK_SPAN - STICK_OFFSET;
        Some((raw as i32).clamp(-32768, 32767))
    }
}

/// Cached calibration bounds per absolute axis code.
#[derive(Clone, Debug)]
pub struct Calibration {
    bounds: [Option<AxisBounds>; ABS_CNT],
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            bounds: [None; ABS_CNT],
        }
    }
}

impl Calibration {
    pub fn set(&mut self, code: u16, min: i32, max: i32) {
        if let Some(slot) = self.bounds.get_mut(usize::from(code)) {
            *slot = Some(AxisBounds { min, max });
        }
    }

    pub fn get(&self, code: u16) -> Option<AxisBounds> {
        self.bounds.get(usize::from(code)).copied().flatten()
    }
}

fn apply_hat(frame: &mut RawFrame, value: i32, negative: Button, positive: Button) {
    frame.buttons.set(negative, value < 0);
    frame.buttons.set(positive, value > 0);
}

fn stick_for(code: u16) -> Option<(Stick, bool)> {
    match code {
        ABS_X => Some((Stick::Left, false)),
        ABS_Y => Some((Stick::Left, true)),
        ABS_RX => Some((Stick::Right, false)),
        ABS_RY => Some((Stick::Right, true)),
        _ => None,
    }
}

/// Apply one record to `frame`. Unknown records are ignored.
pub fn apply_event(frame: &mut RawFrame, calibration: &Calibration, event: RawEvent) {
    match event.kind {
        EventKind::Key => {
            if let Some(button) = key_button(event.code) {
                frame.buttons.set(button, event.value != 0);
            }
        }
        EventKind::Absolute => match event.code {
            ABS_HAT0X => apply_hat(frame, event.value, Button::DPadLeft, Button::DPadRight),
            ABS_HAT0Y => apply_hat(frame, event.value, Button::DPadUp, Button::DPadDown),
            ABS_Z | ABS_RZ => {
                let trigger = if event.code == ABS_Z {
                    Trigger::Left
                } else {
                    Trigger::Right
                };
                if let Some(v) = calibration
                    .get(event.code)
                    .and_then(|b| b.rescale_trigger(event.value))
                {
                    frame.set_trigger(trigger, v);
                }
            }
            code => {
                let Some((stick, vertical)) = stick_for(code) else {
                    return;
                };
                let Some(v) = calibration
                    .get(code)
                    .and_then(|b| b.rescale_stick(event.value))
                else {
                    return;
                };
                let raw = frame.stick_mut(stick);
                if vertical {
                    raw.y = (-v).min(32767);
                } else {
                    raw.x = v;
                }
            }
        },
        EventKind::Other(_) => {}
    }
}

/// Apply a batch of records in order.
pub fn apply_events(
    frame: &mut RawFrame,
    calibration: &Calibration,
    events: impl IntoIterator<Item = RawEvent>,
) {
    for event in events {
        apply_event(frame, calibration, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xpad_calibration() -> Calibration {
        let mut cal = Calibration::default();
        for code in [ABS_X, ABS_Y, ABS_RX, ABS_RY] {
            cal.set(code, -32768, 32767);
        }
        cal.set(ABS_Z, 0, 1023);
        cal.set(ABS_RZ, 0, 1023);
        cal
    }

    #[test]
    fn hat_left_then_center() {
        let cal = Calibration::default();
        let mut frame = RawFrame::default();

        apply_event(&mut frame, &cal, RawEvent::abs(ABS_HAT0X, -1));
        assert!(frame.buttons.contains(Button::DPadLeft));
        assert!(!frame.buttons.contains(Button::DPadRight));

        apply_event(&mut frame, &cal, RawEvent::abs(ABS_HAT0X, 0));
        assert!(!frame.buttons.contains(Button::DPadLeft));
        assert!(!frame.buttons.contains(Button::DPadRight));
    }

    #[test]
    fn hat_flip_clears_opposite() {
        let cal = Calibration::default();
        let mut frame = RawFrame::default();
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_HAT0Y, -1));
        assert!(frame.buttons.contains(Button::DPadUp));
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_HAT0Y, 1));
        assert!(frame.buttons.contains(Button::DPadDown));
        assert!(!frame.buttons.contains(Button::DPadUp));
    }

    #[test]
    fn keys_map_and_guide_ignored() {
        let cal = Calibration::default();
        let mut frame = RawFrame::default();
        apply_events(
            &mut frame,
            &cal,
            [
                RawEvent::key(BTN_SOUTH, 1),
                RawEvent::key(BTN_TR, 1),
                RawEvent::key(BTN_MODE, 1),
                RawEvent::key(0x2ff, 1),
            ],
        );
        assert!(frame.buttons.contains(Button::A));
        assert!(frame.buttons.contains(Button::RightShoulder));
        assert_eq!(frame.buttons.count(), 2);

        apply_event(&mut frame, &cal, RawEvent::key(BTN_SOUTH, 0));
        assert!(!frame.buttons.contains(Button::A));
    }

    #[test]
    fn sticks_rescale_and_invert_y() {
        let cal = xpad_calibration();
        let mut frame = RawFrame::default();
        apply_events(
            &mut frame,
            &cal,
            [
                RawEvent::abs(ABS_X, 32767),
                RawEvent::abs(ABS_Y, -32768),
                RawEvent::abs(ABS_RX, -32768),
                RawEvent::abs(ABS_RY, 32767),
            ],
        );
        assert_eq!(frame.sticks[0].x, 32767);
        assert_eq!(frame.sticks[0].y, 32767);
        assert_eq!(frame.sticks[1].x, -32768);
        assert_eq!(frame.sticks[1].y, -32767);
    }

    #[test]
    fn unsigned_stick_range_centers() {
        let mut cal = Calibration::default();
        cal.set(ABS_X, 0, 255);
        let mut frame = RawFrame::default();
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_X, 0));
        assert_eq!(frame.sticks[0].x, -32768);
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_X, 255));
        assert_eq!(frame.sticks[0].x, 32767);
    }

    #[test]
    fn triggers_rescale_into_byte_range() {
        let cal = xpad_calibration();
        let mut frame = RawFrame::default();
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_Z, 1023));
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_RZ, 0));
        assert_eq!(frame.triggers, [255, 0]);
    }

    #[test]
    fn last_value_wins() {
        let cal = xpad_calibration();
        let mut frame = RawFrame::default();
        apply_events(
            &mut frame,
            &cal,
            [
                RawEvent::abs(ABS_X, 32767),
                RawEvent::abs(ABS_X, -32768),
                RawEvent::key(BTN_EAST, 1),
                RawEvent::key(BTN_EAST, 0),
            ],
        );
        assert_eq!(frame.sticks[0].x, -32768);
        assert!(frame.buttons.is_empty());
    }

    #[test]
    fn uncalibrated_axes_are_ignored() {
        let mut cal = Calibration::default();
        cal.set(ABS_RX, 5, 5);
        let mut frame = RawFrame::default();
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_X, 1000));
        apply_event(&mut frame, &cal, RawEvent::abs(ABS_RX, 5));
        assert_eq!(frame, RawFrame::default());
    }

    #[test]
    fn other_event_types_ignored() {
        let cal = xpad_calibration();
        let mut frame = RawFrame::default();
        let syn = RawEvent {
            kind: event_kind(EV_SYN),
            code: 0,
            value: 0,
        };
        apply_event(&mut frame, &cal, syn);
        assert_eq!(frame, RawFrame::default());
        assert_eq!(event_kind(EV_KEY), EventKind::Key);
        assert_eq!(event_kind(EV_ABS), EventKind::Absolute);
    }

    #[test]
    fn hats_are_recognized() {
        assert!(is_hat(ABS_HAT0X));
        assert!(is_hat(ABS_HAT3Y));
        assert!(!is_hat(ABS_RZ));
    }
}
