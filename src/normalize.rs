//! Raw samples → deadzone-scaled, direction-classified state.
//!
//! Everything here is pure. The manager calls [`rotate`] to capture the
//! previous tick, lets the backend fill the raw frame, then calls
//! [`normalize_stick`] / [`normalize_trigger`] to recompute derived fields.

use std::f32::consts::{FRAC_PI_4, PI};

use crate::state::{
    AxisState, RawStick, StickDirection, TriggerState, STICK_RAW_MAX, TRIGGER_RAW_MAX,
};

const FRAC_3PI_4: f32 = 3.0 * PI / 4.0;

/// Copy every `current` field into its `previous` twin.
#[inline]
pub fn rotate(sticks: &mut [AxisState; 2], triggers: &mut [TriggerState; 2]) {
    for s in sticks.iter_mut() {
        s.direction_previous = s.direction_current;
    }
    for t in triggers.iter_mut() {
        t.pressed_previous = t.pressed_current;
    }
}

/// Recompute a stick from its raw position.
///
/// Leaves `direction_previous` untouched.
pub fn normalize_stick(axis: &mut AxisState, raw: RawStick, deadzone: f32) {
    let max = f32::from(STICK_RAW_MAX);
    let (x, y) = (raw.x as f32, raw.y as f32);
    let magnitude = (x * x + y * y).sqrt();

    if magnitude > deadzone {
        let clamped = magnitude.min(max);
        axis.raw_x = raw.x;
        axis.raw_y = raw.y;
        axis.norm_x = (x / clamped).clamp(-1.0, 1.0);
        axis.norm_y = (y / clamped).clamp(-1.0, 1.0);
        axis.magnitude = ((clamped - deadzone) / (max - deadzone)).clamp(0.0, 1.0);
        axis.angle = y.atan2(x);
    } else {
        axis.raw_x = 0;
        axis.raw_y = 0;
        axis.norm_x = 0.0;
        axis.norm_y = 0.0;
        axis.magnitude = 0.0;
        axis.angle = 0.0;
    }

    axis.direction_current = if axis.magnitude != 0.0 {
        classify_angle(axis.angle)
    } else {
        StickDirection::Center
    };
}

/// Map an angle to one of the four non-centered directions.
///
/// Bands: `[π/4, 3π/4)` up, `[-3π/4, -π/4)` down, `≥ 3π/4` or `< -3π/4`
/// left, everything else right.
pub fn classify_angle(angle: f32) -> StickDirection {
    if (FRAC_PI_4..FRAC_3PI_4).contains(&angle) {
        StickDirection::Up
    } else if (-FRAC_3PI_4..-FRAC_PI_4).contains(&angle) {
        StickDirection::Down
    } else if angle >= FRAC_3PI_4 || angle < -FRAC_3PI_4 {
        StickDirection::Left
    } else {
        StickDirection::Right
    }
}

/// Recompute a trigger from its raw value.
///
/// Leaves `pressed_previous` untouched.
pub fn normalize_trigger(trigger: &mut TriggerState, raw: i32, deadzone: f32) {
    let value = raw as f32;
    if value > deadzone {
        trigger.raw_value = raw;
        trigger.press_length =
            ((value - deadzone) / (f32::from(TRIGGER_RAW_MAX) - deadzone)).clamp(0.0, 1.0);
        trigger.pressed_current = true;
    } else {
        trigger.raw_value = 0;
        trigger.press_length = 0.0;
        trigger.pressed_current = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn stick(x: i32, y: i32, deadzone: f32) -> AxisState {
        let mut axis = AxisState::default();
        normalize_stick(&mut axis, RawStick { x, y }, deadzone);
        axis
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn inside_deadzone_is_centered() {
        let axis = stick(5000, -5000, 8000.0);
        assert_eq!(axis.magnitude, 0.0);
        assert_eq!(axis.norm_x, 0.0);
        assert_eq!(axis.norm_y, 0.0);
        assert_eq!((axis.raw_x, axis.raw_y), (0, 0));
        assert_eq!(axis.direction_current, StickDirection::Center);
    }

    #[test]
    fn exactly_on_deadzone_is_centered() {
        let axis = stick(8000, 0, 8000.0);
        assert_eq!(axis.magnitude, 0.0);
        assert_eq!(axis.direction_current, StickDirection::Center);
    }

    #[test]
    fn right_push_scales_past_deadzone() {
        let axis = stick(20000, 0, 8000.0);
        assert!(approx(axis.magnitude, (20000.0 - 8000.0) / (32767.0 - 8000.0)));
        assert!(approx(axis.magnitude, 0.48452));
        assert_eq!(axis.angle, 0.0);
        assert_eq!(axis.norm_x, 1.0);
        assert_eq!(axis.direction_current, StickDirection::Right);
        assert_eq!((axis.raw_x, axis.raw_y), (20000, 0));
    }

    #[test]
    fn full_deflection_clamps_to_one() {
        let axis = stick(32767, 32767, 7849.0);
        assert_eq!(axis.magnitude, 1.0);
        assert!(axis.norm_x <= 1.0 && axis.norm_y <= 1.0);

        let axis = stick(-32768, 0, 7849.0);
        assert_eq!(axis.magnitude, 1.0);
        assert_eq!(axis.norm_x, -1.0);
        assert_eq!(axis.direction_current, StickDirection::Left);
    }

    #[test]
    fn cardinal_directions() {
        assert_eq!(stick(0, 30000, 8000.0).direction_current, StickDirection::Up);
        assert_eq!(stick(0, -30000, 8000.0).direction_current, StickDirection::Down);
        assert_eq!(stick(-30000, 0, 8000.0).direction_current, StickDirection::Left);
        assert_eq!(stick(30000, 0, 8000.0).direction_current, StickDirection::Right);
    }

    #[test]
    fn band_edges() {
        assert_eq!(classify_angle(0.0), StickDirection::Right);
        assert_eq!(classify_angle(FRAC_PI_2), StickDirection::Up);
        assert_eq!(classify_angle(PI), StickDirection::Left);
        assert_eq!(classify_angle(-FRAC_PI_2), StickDirection::Down);

        assert_eq!(classify_angle(FRAC_PI_4), StickDirection::Up);
        assert_eq!(classify_angle(FRAC_3PI_4), StickDirection::Left);
        assert_eq!(classify_angle(-FRAC_3PI_4), StickDirection::Down);
        assert_eq!(classify_angle(-FRAC_PI_4), StickDirection::Right);
    }

    #[test]
    fn normalize_keeps_previous_direction() {
        let mut axis = AxisState {
            direction_current: StickDirection::Up,
            ..AxisState::default()
        };
        let mut triggers = [TriggerState::default(); 2];
        let mut sticks = [axis, AxisState::default()];
        rotate(&mut sticks, &mut triggers);
        axis = sticks[0];
        normalize_stick(&mut axis, RawStick { x: 30000, y: 0 }, 8000.0);
        assert_eq!(axis.direction_previous, StickDirection::Up);
        assert_eq!(axis.direction_current, StickDirection::Right);
    }

    #[test]
    fn trigger_threshold() {
        let mut t = TriggerState::default();
        normalize_trigger(&mut t, 30, 30.0);
        assert!(!t.pressed_current);
        assert_eq!(t.press_length, 0.0);
        assert_eq!(t.raw_value, 0);

        normalize_trigger(&mut t, 31, 30.0);
        assert!(t.pressed_current);
        assert!(approx(t.press_length, 1.0 / 225.0));
        assert_eq!(t.raw_value, 31);
    }

    #[test]
    fn trigger_scenario() {
        let mut t = TriggerState::default();
        normalize_trigger(&mut t, 200, 30.0);
        assert!(t.pressed_current);
        assert!(approx(t.press_length, 170.0 / 225.0));

        normalize_trigger(&mut t, 255, 30.0);
        assert_eq!(t.press_length, 1.0);
    }
}
