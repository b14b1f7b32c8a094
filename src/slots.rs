//! Fixed-size slot table.
//!
//! All `N` slots are allocated up front and addressed by index. A slot holds
//! at most one device, identified by its [`DeviceKey`], and owns that
//! device's backend handle.

use crate::buttons::ButtonSet;
use crate::device::{Capabilities, DeviceKey, OpenedDevice};
use crate::metadata::DeviceMeta;
use crate::normalize;
use crate::state::{AxisState, RawFrame, Stick, Trigger, TriggerState};

/// Index of a slot, `0..N`.
pub type SlotId = usize;

/// Device attached to a slot.
pub(crate) struct Attached<H> {
    pub key: DeviceKey,
    pub handle: H,
    pub capabilities: Capabilities,
    pub meta: DeviceMeta,
    /// The last poll failed; the next scan releases the slot.
    pub pending_loss: bool,
}

/// One slot's full state.
pub(crate) struct Slot<H> {
    pub device: Option<Attached<H>>,
    /// Accumulated raw input, written only by the backend.
    pub frame: RawFrame,
    pub buttons_current: ButtonSet,
    pub buttons_previous: ButtonSet,
    pub sticks: [AxisState; 2],
    pub triggers: [TriggerState; 2],
}

impl<H> Default for Slot<H> {
    fn default() -> Self {
        Self {
            device: None,
            frame: RawFrame::default(),
            buttons_current: ButtonSet::empty(),
            buttons_previous: ButtonSet::empty(),
            sticks: [AxisState::default(); 2],
            triggers: [TriggerState::default(); 2],
        }
    }
}

impl<H> Slot<H> {
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    pub fn key(&self) -> Option<&DeviceKey> {
        self.device.as_ref().map(|d| &d.key)
    }

    pub fn is_pending_loss(&self) -> bool {
        self.device.as_ref().is_some_and(|d| d.pending_loss)
    }

    /// Reset to the disconnected zero state and hand back the device, if any.
    pub fn detach(&mut self) -> Option<Attached<H>> {
        std::mem::take(self).device
    }

    /// Reset and take ownership of a freshly opened device.
    pub fn attach(&mut self, key: DeviceKey, opened: OpenedDevice<H>) {
        *self = Self {
            device: Some(Attached {
                key,
                handle: opened.handle,
                capabilities: opened.capabilities,
                meta: opened.meta,
                pending_loss: false,
            }),
            ..Self::default()
        };
    }

    /// Capture this tick's `previous` values.
    pub fn rotate(&mut self) {
        self.buttons_previous = self.buttons_current;
        normalize::rotate(&mut self.sticks, &mut self.triggers);
    }

    /// Recompute derived state from the raw frame.
    pub fn normalize(&mut self, stick_deadzones: [f32; 2], trigger_deadzone: f32) {
        self.buttons_current = self.frame.buttons;
        for stick in Stick::ALL {
            let i = stick.index();
            normalize::normalize_stick(&mut self.sticks[i], self.frame.sticks[i], stick_deadzones[i]);
        }
        for trigger in Trigger::ALL {
            let i = trigger.index();
            normalize::normalize_trigger(
                &mut self.triggers[i],
                self.frame.triggers[i],
                trigger_deadzone,
            );
        }
    }
}

/// `N` pre-allocated slots.
pub(crate) struct SlotTable<H> {
    slots: Vec<Slot<H>>,
}

impl<H> SlotTable<H> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| Slot::default()).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&Slot<H>> {
        self.slots.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Slot<H>> {
        self.slots.get_mut(id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut Slot<H>)> {
        self.slots.iter_mut().enumerate()
    }

    pub fn connected(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_connected())
            .map(|(i, _)| i)
    }

    /// Slot currently holding `key`.
    pub fn find(&self, key: &DeviceKey) -> Option<SlotId> {
        self.slots.iter().position(|s| s.key() == Some(key))
    }

    /// Lowest-numbered disconnected slot.
    pub fn free(&self) -> Option<SlotId> {
        self.slots.iter().position(|s| !s.is_connected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::Button;
    use crate::state::StickDirection;

    fn opened(rumble: bool) -> OpenedDevice<u32> {
        OpenedDevice {
            handle: 7,
            capabilities: Capabilities { rumble },
            meta: DeviceMeta::default(),
        }
    }

    #[test]
    fn free_slot_is_lowest_index() {
        let mut table: SlotTable<u32> = SlotTable::new(3);
        assert_eq!(table.free(), Some(0));
        table.get_mut(0).unwrap().attach("a".into(), opened(false));
        table.get_mut(2).unwrap().attach("c".into(), opened(false));
        assert_eq!(table.free(), Some(1));
        assert_eq!(table.find(&"c".into()), Some(2));
        assert_eq!(table.connected().collect::<Vec<_>>(), vec![0, 2]);

        table.get_mut(1).unwrap().attach("b".into(), opened(false));
        assert_eq!(table.free(), None);
    }

    #[test]
    fn detach_resets_everything() {
        let mut table: SlotTable<u32> = SlotTable::new(1);
        let slot = table.get_mut(0).unwrap();
        slot.attach("a".into(), opened(true));
        slot.frame.buttons.insert(Button::A);
        slot.frame.sticks[0].x = 30000;
        slot.normalize([8000.0, 8000.0], 30.0);
        slot.rotate();
        assert_eq!(slot.sticks[0].direction_previous, StickDirection::Right);

        let attached = slot.detach().unwrap();
        assert_eq!(attached.handle, 7);
        assert!(attached.capabilities.rumble);

        assert!(!slot.is_connected());
        assert_eq!(slot.frame, RawFrame::default());
        assert!(slot.buttons_current.is_empty());
        assert!(slot.buttons_previous.is_empty());
        assert_eq!(slot.sticks, [AxisState::default(); 2]);
        assert!(slot.detach().is_none());
    }

    #[test]
    fn reattach_clears_pending_loss() {
        let mut table: SlotTable<u32> = SlotTable::new(1);
        let slot = table.get_mut(0).unwrap();
        assert!(!slot.is_pending_loss());
        slot.attach("a".into(), opened(false));
        slot.device.as_mut().unwrap().pending_loss = true;
        assert!(slot.is_pending_loss());

        slot.attach("a".into(), opened(false));
        assert!(!slot.is_pending_loss());
    }
}
