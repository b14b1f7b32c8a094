//! Owned per-slot snapshot.
//!
//! [`SlotSnapshot`] is a read-only copy of one connected slot at a point in
//! time (typically "this tick"). It is produced by
//! [`Manager::snapshot`](crate::manager::Manager::snapshot), owns all its
//! data, and serializes with serde, so it can be cloned out to other
//! consumers or logged as JSON.
//!
//! # Semantics
//! - A snapshot does not poll. It reflects the manager's last `update`.
//! - Edge queries answer for the tick the snapshot was taken on.
//!
//! ```no_run
//! use padlink::{Manager, Stick};
//!
//! let mut mgr = Manager::native();
//! mgr.update();
//! if let Some(snap) = mgr.snapshot(0) {
//!     let left = snap.stick(Stick::Left);
//!     println!("{}: {:?} {:.2}", snap.meta.display_name(), left.direction_current, left.magnitude);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::buttons::{Button, ButtonSet};
use crate::device::{Capabilities, DeviceKey};
use crate::metadata::DeviceMeta;
use crate::slots::SlotId;
use crate::state::{self, AxisState, Stick, Trigger, TriggerState};

/// Owned copy of one slot's state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub slot: SlotId,
    pub key: DeviceKey,
    pub meta: DeviceMeta,
    pub capabilities: Capabilities,
    pub buttons_current: ButtonSet,
    pub buttons_previous: ButtonSet,
    pub sticks: [AxisState; 2],
    pub triggers: [TriggerState; 2],
}

impl SlotSnapshot {
    #[inline]
    pub fn button_down(&self, button: Button) -> bool {
        self.buttons_current.contains(button)
    }

    #[inline]
    pub fn button_triggered(&self, button: Button) -> bool {
        state::triggered(
            self.buttons_previous.contains(button),
            self.buttons_current.contains(button),
        )
    }

    #[inline]
    pub fn button_released(&self, button: Button) -> bool {
        state::released(
            self.buttons_previous.contains(button),
            self.buttons_current.contains(button),
        )
    }

    #[inline]
    pub fn stick(&self, stick: Stick) -> &AxisState {
        &self.sticks[stick.index()]
    }

    #[inline]
    pub fn trigger(&self, trigger: Trigger) -> &TriggerState {
        &self.triggers[trigger.index()]
    }
}
