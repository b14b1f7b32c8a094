//! Raw event records read from event-stream devices.
//!
//! An event-stream pad reports a sequence of `(type, code, value)` records.
//! Backends convert their platform type into [`RawEvent`] so the decoding in
//! [`evdev_map`](crate::backends::evdev_map) stays platform independent and
//! testable.

/// Category of a raw event record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A key or button changed. `value` is non-zero while held.
    Key,
    /// An absolute axis moved. `value` is in device units.
    Absolute,
    /// Anything else (sync markers, relative axes, misc). Ignored.
    Other(u16),
}

/// One fixed-size event record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    #[inline]
    pub const fn key(code: u16, value: i32) -> Self {
        Self {
            kind: EventKind::Key,
            code,
            value,
        }
    }

    #[inline]
    pub const fn abs(code: u16, value: i32) -> Self {
        Self {
            kind: EventKind::Absolute,
            code,
            value,
        }
    }
}
