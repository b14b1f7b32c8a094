//! XInput driver control protocol.
//!
//! The XInput kernel driver is talked to with `DeviceIoControl` round trips
//! on the device interface path. This module holds the platform-independent
//! half: control codes, the init reply, request payloads and the two packed
//! little-endian report layouts.
//!
//! ## Report layouts
//! Standard (29 bytes):
//! ```text
//! 0  u8   ?
//! 1  u8   ?
//! 2  u8   status (1 = present)
//! 3  u8   ?
//! 4  u8   ?
//! 5  u32  packet number
//! 9  u8   ?
//! 10 u8   ?
//! 11 u16  buttons
//! 13 u8   left trigger
//! 14 u8   right trigger
//! 15 i16  LX, LY, RX, RY
//! 23 u32  ?
//! 27 u16  ?
//! ```
//! Alternate (22 bytes), used when the init reply reports type `0x0100`:
//! ```text
//! 0  u8   status (1 = present)
//! 1  u8   ?
//! 2  u8   ?
//! 3  u32  packet number
//! 7  u8   ?
//! 8  u16  buttons
//! 10 u8   left trigger
//! 11 u8   right trigger
//! 12 i16  LX, LY, RX, RY
//! 20 u16  ?
//! ```
//! Stick values are passed through untouched as 16-bit raw samples; the
//! normalizer owns all scaling.

use crate::buttons::Button;
use crate::state::{RawFrame, RawStick, Stick, Trigger};

const fn ctl_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

const XINPUT_DEVICE_TYPE: u32 = 0x8000;
const METHOD_BUFFERED: u32 = 0;
const READ_ACCESS: u32 = 0x0001;
const WRITE_ACCESS: u32 = 0x0002;

/// Handshake; returns an [`InitReply`].
pub const IOCTL_XINPUT_INIT: u32 = ctl_code(XINPUT_DEVICE_TYPE, 0x800, METHOD_BUFFERED, READ_ACCESS);
/// Fetch one input report.
pub const IOCTL_XINPUT_GET_DATA: u32 =
    ctl_code(XINPUT_DEVICE_TYPE, 0x803, METHOD_BUFFERED, READ_ACCESS | WRITE_ACCESS);
/// LED / motor write.
pub const IOCTL_XINPUT_SET_DATA: u32 = ctl_code(XINPUT_DEVICE_TYPE, 0x804, METHOD_BUFFERED, WRITE_ACCESS);

/// Bytes in the init reply (six little-endian words).
pub const INIT_REPLY_LEN: usize = 12;
pub const STANDARD_REPORT_LEN: usize = 29;
pub const ALTERNATE_REPORT_LEN: usize = 22;

const DEVICE_TYPE_ALTERNATE: u16 = 0x0100;

pub const GAMEPAD_DPAD_UP: u16 = 0x0001;
pub const GAMEPAD_DPAD_DOWN: u16 = 0x0002;
pub const GAMEPAD_DPAD_LEFT: u16 = 0x0004;
pub const GAMEPAD_DPAD_RIGHT: u16 = 0x0008;
pub const GAMEPAD_START: u16 = 0x0010;
pub const GAMEPAD_BACK: u16 = 0x0020;
pub const GAMEPAD_LEFT_THUMB: u16 = 0x0040;
pub const GAMEPAD_RIGHT_THUMB: u16 = 0x0080;
pub const GAMEPAD_LEFT_SHOULDER: u16 = 0x0100;
pub const GAMEPAD_RIGHT_SHOULDER: u16 = 0x0200;
pub const GAMEPAD_GUIDE: u16 = 0x0400;
pub const GAMEPAD_RESERVED: u16 = 0x0800;
pub const GAMEPAD_A: u16 = 0x1000;
pub const GAMEPAD_B: u16 = 0x2000;
pub const GAMEPAD_X: u16 = 0x4000;
pub const GAMEPAD_Y: u16 = 0x8000;

/// Wire bit → button. Guide and the reserved bit are not mapped.
pub const BUTTON_MAP: [(u16, Button); 14] = [
    (GAMEPAD_DPAD_UP, Button::DPadUp),
    (GAMEPAD_DPAD_DOWN, Button::DPadDown),
    (GAMEPAD_DPAD_LEFT, Button::DPadLeft),
    (GAMEPAD_DPAD_RIGHT, Button::DPadRight),
    (GAMEPAD_START, Button::Start),
    (GAMEPAD_BACK, Button::Back),
    (GAMEPAD_LEFT_THUMB, Button::LeftThumb),
    (GAMEPAD_RIGHT_THUMB, Button::RightThumb),
    (GAMEPAD_LEFT_SHOULDER, Button::LeftShoulder),
    (GAMEPAD_RIGHT_SHOULDER, Button::RightShoulder),
    (GAMEPAD_A, Button::A),
    (GAMEPAD_B, Button::B),
    (GAMEPAD_X, Button::X),
    (GAMEPAD_Y, Button::Y),
];

/// Which report layout a device answers with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportLayout {
    #[default]
    Standard,
    Alternate,
}

impl ReportLayout {
    /// Request payload sent with [`IOCTL_XINPUT_GET_DATA`].
    pub fn request(self) -> &'static [u8] {
        match self {
            // i16 257 followed by a zero byte.
            ReportLayout::Standard => &[0x01, 0x01, 0x00],
            ReportLayout::Alternate => &[0x00],
        }
    }

    pub fn report_len(self) -> usize {
        match self {
            ReportLayout::Standard => STANDARD_REPORT_LEN,
            ReportLayout::Alternate => ALTERNATE_REPORT_LEN,
        }
    }

    /// Decode a reply buffer. Returns `None` if it is too short.
    pub fn decode(self, buf: &[u8]) -> Option<Report> {
        match self {
            ReportLayout::Standard => Report::decode_standard(buf),
            ReportLayout::Alternate => Report::decode_alternate(buf),
        }
    }
}

/// Parsed reply to [`IOCTL_XINPUT_INIT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitReply {
    pub device_type: u16,
    pub port_count: u8,
    pub vid: u16,
    pub pid: u16,
    flags: u16,
}

impl InitReply {
    pub fn parse(buf: &[u8; INIT_REPLY_LEN]) -> Self {
        let word = |i: usize| u16::from_le_bytes([buf[i * 2], buf[i * 2 + 1]]);
        Self {
            device_type: word(0),
            port_count: (word(1) & 0xFF) as u8,
            flags: word(2),
            vid: word(4),
            pid: word(5),
        }
    }

    /// Whether the reply describes usable ports. The driver marks unusable
    /// replies with bit `0x80` of word 2; the device then runs on defaults.
    pub fn is_valid(&self) -> bool {
        self.flags & 0x80 == 0 && self.port_count > 0
    }

    /// Layout to request, falling back to standard for invalid replies.
    pub fn layout(&self) -> ReportLayout {
        if self.is_valid() && self.device_type == DEVICE_TYPE_ALTERNATE {
            ReportLayout::Alternate
        } else {
            ReportLayout::Standard
        }
    }
}

/// One decoded input report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub status: u8,
    pub packet_number: u32,
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    /// LX, LY, RX, RY.
    pub thumbs: [i16; 4],
}

fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn thumbs_at(buf: &[u8], at: usize) -> [i16; 4] {
    let mut out = [0i16; 4];
    for (i, t) in out.iter_mut().enumerate() {
        *t = le_u16(buf, at + i * 2) as i16;
    }
    out
}

impl Report {
    pub fn decode_standard(buf: &[u8]) -> Option<Self> {
        if buf.len() < STANDARD_REPORT_LEN {
            return None;
        }
        Some(Self {
            status: buf[2],
            packet_number: le_u32(buf, 5),
            buttons: le_u16(buf, 11),
            left_trigger: buf[13],
            right_trigger: buf[14],
            thumbs: thumbs_at(buf, 15),
        })
    }

    pub fn decode_alternate(buf: &[u8]) -> Option<Self> {
        if buf.len() < ALTERNATE_REPORT_LEN {
            return None;
        }
        Some(Self {
            status: buf[0],
            packet_number: le_u32(buf, 3),
            buttons: le_u16(buf, 8),
            left_trigger: buf[10],
            right_trigger: buf[11],
            thumbs: thumbs_at(buf, 12),
        })
    }

    /// The status byte is the only liveness signal.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.status == 1
    }

    /// Overwrite `frame` with this report.
    pub fn apply(&self, frame: &mut RawFrame) {
        for (mask, button) in BUTTON_MAP {
            frame.buttons.set(button, self.buttons & mask != 0);
        }
        let [lx, ly, rx, ry] = self.thumbs;
        *frame.stick_mut(Stick::Left) = RawStick {
            x: i32::from(lx),
            y: i32::from(ly),
        };
        *frame.stick_mut(Stick::Right) = RawStick {
            x: i32::from(rx),
            y: i32::from(ry),
        };
        frame.set_trigger(Trigger::Left, i32::from(self.left_trigger));
        frame.set_trigger(Trigger::Right, i32::from(self.right_trigger));
    }
}

/// One-shot LED / player indicator write sent after a successful handshake.
pub const LED_CONFIG_PAYLOAD: [u8; 5] = [0x00, 0x0D, 0x00, 0x00, 0x01];

/// Motor write for [`IOCTL_XINPUT_SET_DATA`]. Intensities are clamped to `[0, 1]`.
pub fn rumble_payload(left: f32, right: f32) -> [u8; 5] {
    let speed = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [0x00, 0x00, speed(left), speed(right), 0x02]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_codes_match_driver() {
        assert_eq!(IOCTL_XINPUT_INIT, 0x8000_6000);
        assert_eq!(IOCTL_XINPUT_GET_DATA, 0x8000_E00C);
        assert_eq!(IOCTL_XINPUT_SET_DATA, 0x8000_A010);
    }

    #[test]
    fn init_reply_selects_layout() {
        let mut buf = [0u8; INIT_REPLY_LEN];
        buf[0..2].copy_from_slice(&0x0100u16.to_le_bytes());
        buf[2] = 1;
        buf[8..10].copy_from_slice(&0x045Eu16.to_le_bytes());
        buf[10..12].copy_from_slice(&0x028Eu16.to_le_bytes());
        let reply = InitReply::parse(&buf);
        assert!(reply.is_valid());
        assert_eq!(reply.layout(), ReportLayout::Alternate);
        assert_eq!(reply.vid, 0x045E);
        assert_eq!(reply.pid, 0x028E);

        buf[0] = 0x01;
        buf[1] = 0x00;
        assert_eq!(InitReply::parse(&buf).layout(), ReportLayout::Standard);
    }

    #[test]
    fn init_reply_invalid_flag() {
        let mut buf = [0u8; INIT_REPLY_LEN];
        buf[1] = 0x01;
        buf[2] = 1;
        buf[4] = 0x80;
        let reply = InitReply::parse(&buf);
        assert!(!reply.is_valid());
        assert_eq!(reply.layout(), ReportLayout::Standard);
    }

    #[test]
    fn init_reply_without_ports_uses_standard_layout() {
        let mut buf = [0u8; INIT_REPLY_LEN];
        buf[0..2].copy_from_slice(&0x0100u16.to_le_bytes());
        buf[8..10].copy_from_slice(&0x045Eu16.to_le_bytes());
        let reply = InitReply::parse(&buf);
        assert_eq!(reply.port_count, 0);
        assert!(!reply.is_valid());
        assert_eq!(reply.layout(), ReportLayout::Standard);
        assert_eq!(reply.vid, 0x045E);
    }

    fn standard_report(status: u8, buttons: u16, lt: u8, rt: u8, thumbs: [i16; 4]) -> Vec<u8> {
        let mut buf = vec![0u8; STANDARD_REPORT_LEN];
        buf[2] = status;
        buf[5..9].copy_from_slice(&42u32.to_le_bytes());
        buf[11..13].copy_from_slice(&buttons.to_le_bytes());
        buf[13] = lt;
        buf[14] = rt;
        for (i, t) in thumbs.iter().enumerate() {
            buf[15 + i * 2..17 + i * 2].copy_from_slice(&t.to_le_bytes());
        }
        buf
    }

    #[test]
    fn decode_standard_layout() {
        let buf = standard_report(1, GAMEPAD_A | GAMEPAD_DPAD_LEFT, 10, 200, [-32768, 32767, 5, -5]);
        let report = Report::decode_standard(&buf).unwrap();
        assert!(report.is_present());
        assert_eq!(report.packet_number, 42);
        assert_eq!(report.left_trigger, 10);
        assert_eq!(report.right_trigger, 200);
        assert_eq!(report.thumbs, [-32768, 32767, 5, -5]);

        let mut frame = RawFrame::default();
        report.apply(&mut frame);
        assert!(frame.buttons.contains(Button::A));
        assert!(frame.buttons.contains(Button::DPadLeft));
        assert_eq!(frame.buttons.count(), 2);
        assert_eq!(frame.sticks[0].x, -32768);
        assert_eq!(frame.sticks[0].y, 32767);
        assert_eq!(frame.triggers, [10, 200]);
    }

    #[test]
    fn decode_alternate_layout() {
        let mut buf = vec![0u8; ALTERNATE_REPORT_LEN];
        buf[0] = 1;
        buf[3..7].copy_from_slice(&7u32.to_le_bytes());
        buf[8..10].copy_from_slice(&(GAMEPAD_Y | GAMEPAD_RIGHT_SHOULDER).to_le_bytes());
        buf[10] = 255;
        buf[12..14].copy_from_slice(&1234i16.to_le_bytes());
        buf[18..20].copy_from_slice(&(-4321i16).to_le_bytes());
        let report = ReportLayout::Alternate.decode(&buf).unwrap();
        assert!(report.is_present());
        assert_eq!(report.packet_number, 7);
        assert_eq!(report.left_trigger, 255);
        assert_eq!(report.thumbs, [1234, 0, 0, -4321]);

        let mut frame = RawFrame::default();
        report.apply(&mut frame);
        assert!(frame.buttons.contains(Button::Y));
        assert!(frame.buttons.contains(Button::RightShoulder));
    }

    #[test]
    fn short_buffers_rejected() {
        assert!(Report::decode_standard(&[0u8; STANDARD_REPORT_LEN - 1]).is_none());
        assert!(Report::decode_alternate(&[0u8; ALTERNATE_REPORT_LEN - 1]).is_none());
    }

    #[test]
    fn released_bits_clear_without_toggling() {
        let mut frame = RawFrame::default();
        let down = Report::decode_standard(&standard_report(1, GAMEPAD_B, 0, 0, [0; 4])).unwrap();
        let up = Report::decode_standard(&standard_report(1, 0, 0, 0, [0; 4])).unwrap();

        down.apply(&mut frame);
        assert!(frame.buttons.contains(Button::B));
        up.apply(&mut frame);
        assert!(!frame.buttons.contains(Button::B));
        // A second "up" report must keep it clear.
        up.apply(&mut frame);
        assert!(frame.buttons.is_empty());
    }

    #[test]
    fn guide_and_reserved_bits_ignored() {
        let buf = standard_report(1, GAMEPAD_GUIDE | GAMEPAD_RESERVED, 0, 0, [0; 4]);
        let mut frame = RawFrame::default();
        Report::decode_standard(&buf).unwrap().apply(&mut frame);
        assert!(frame.buttons.is_empty());
    }

    #[test]
    fn absent_status() {
        let buf = standard_report(0, 0, 0, 0, [0; 4]);
        assert!(!Report::decode_standard(&buf).unwrap().is_present());
    }

    #[test]
    fn rumble_payload_scales_and_clamps() {
        assert_eq!(rumble_payload(1.0, 0.0), [0, 0, 255, 0, 2]);
        assert_eq!(rumble_payload(2.0, -1.0), [0, 0, 255, 0, 2]);
        assert_eq!(rumble_payload(0.5, 0.5)[2], 128);
    }
}
