//! Gamepad manager: discovery, lifecycle, per-tick polling and queries.
//!
//! [`Manager`] owns a [`Backend`] and a fixed table of slots. The host calls
//! [`update`](Manager::update) once per tick and then reads state through the
//! query methods.
//!
//! # Tick
//! 1. If the manager is not initialized yet, initialize (which scans).
//!    Otherwise rescan when the configured interval has elapsed since the
//!    last scan.
//! 2. Capture `previous` state on every slot.
//! 3. Poll every connected slot and recompute its derived state.
//!
//! # Lifecycle
//! - A scan releases slots whose key is no longer listed, then offers every
//!   new key to the lowest free slot. Keys that fail the capability probe
//!   are not probed again until they drop out of a listing or the backend
//!   reports a new instance behind them. Keys that fail to open are retried
//!   on the next scan.
//! - A poll that reports the device lost marks the slot as pending loss. The
//!   slot keeps its last state (and keeps being polled) until the next scan,
//!   which releases it unless a poll succeeded in the meantime.
//! - Released and newly attached slots are fully reset.
//!
//! # Invalid slots
//! Every query accepts any [`SlotId`]. Out-of-range and disconnected slots
//! read as neutral: `false`, `0`, [`StickDirection::Center`] or `None`.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::backends::{Backend, NativeBackend};
use crate::buttons::Button;
use crate::config::GamepadConfig;
use crate::device::{Capabilities, DeviceKey};
use crate::error::{Error, Result};
use crate::metadata::DeviceMeta;
use crate::slots::{Slot, SlotId, SlotTable};
use crate::snapshot::SlotSnapshot;
use crate::state::{self, AxisState, Stick, StickDirection, Trigger, TriggerState};

/// Entry point of the library.
pub struct Manager<B: Backend> {
    backend: B,
    config: GamepadConfig,
    slots: SlotTable<B::Handle>,
    /// Keys that failed the capability probe while still listed, with the
    /// instance that was probed.
    rejected: BTreeMap<DeviceKey, Option<u64>>,
    last_scan: Option<Instant>,
    initialized: bool,
}

impl Manager<NativeBackend> {
    /// Manager over the backend compiled in for this target, with defaults.
    pub fn native() -> Self {
        Self::new(NativeBackend::default())
    }

    /// Manager over the native backend with `config`.
    pub fn native_with_config(config: GamepadConfig) -> Self {
        Self::with_backend(NativeBackend::default(), config)
    }
}

impl<B: Backend> Manager<B> {
    /// Manager over `backend` with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::build(backend, GamepadConfig::default())
    }

    /// Manager over `backend` with `config`.
    ///
    /// An invalid configuration is logged and replaced by the defaults; use
    /// [`try_with_backend`](Self::try_with_backend) to reject it instead.
    pub fn with_backend(backend: B, config: GamepadConfig) -> Self {
        match config.validate() {
            Ok(()) => Self::build(backend, config),
            Err(e) => {
                log::warn!("{e}; using default configuration");
                Self::build(backend, GamepadConfig::default())
            }
        }
    }

    /// Manager over `backend` with `config`, failing on invalid values.
    pub fn try_with_backend(backend: B, config: GamepadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(backend, config))
    }

    fn build(backend: B, config: GamepadConfig) -> Self {
        Self {
            backend,
            slots: SlotTable::new(config.slots),
            config,
            rejected: BTreeMap::new(),
            last_scan: None,
            initialized: false,
        }
    }

    pub fn config(&self) -> &GamepadConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of slots (`N`).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Initialize and run the first scan. Does nothing if already initialized.
    pub fn init(&mut self) {
        self.init_at(Instant::now());
    }

    fn init_at(&mut self, now: Instant) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        log::info!("gamepad manager started with {} slots", self.slots.len());
        self.scan(now);
    }

    /// Advance one tick.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Advance one tick using `now` as the current time.
    ///
    /// Only the rescan throttle reads the clock, so hosts with their own time
    /// source (or tests) can drive it explicitly.
    pub fn update_at(&mut self, now: Instant) {
        if !self.initialized {
            self.init_at(now);
        } else if self.scan_due(now) {
            self.scan(now);
        }

        let stick_deadzones = [
            self.config.left_stick_deadzone,
            self.config.right_stick_deadzone,
        ];
        let trigger_deadzone = self.config.trigger_deadzone;

        for (id, slot) in self.slots.iter_mut() {
            slot.rotate();
            let Some(device) = slot.device.as_mut() else {
                continue;
            };
            match self.backend.poll(&mut device.handle, &mut slot.frame) {
                Ok(()) => {
                    if std::mem::take(&mut device.pending_loss) {
                        log::debug!("slot {id}: {} responding again", device.key);
                    }
                    slot.normalize(stick_deadzones, trigger_deadzone);
                }
                Err(e) => {
                    if !device.pending_loss {
                        log::debug!("slot {id}: {e}; releasing on next scan");
                        device.pending_loss = true;
                    }
                }
            }
        }
    }

    fn scan_due(&self, now: Instant) -> bool {
        let interval = self.config.rescan_interval();
        self.last_scan
            .map_or(true, |last| now.saturating_duration_since(last) >= interval)
    }

    /// Close every device and return to the pre-init state.
    ///
    /// The next [`init`](Self::init) or [`update`](Self::update) starts over.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        for id in 0..self.slots.len() {
            self.release(id, "shutdown");
        }
        self.rejected.clear();
        self.last_scan = None;
        self.initialized = false;
        log::info!("gamepad manager stopped");
    }

    fn release(&mut self, id: SlotId, reason: &str) {
        let Some(slot) = self.slots.get_mut(id) else {
            return;
        };
        if let Some(device) = slot.detach() {
            log::info!("slot {id}: {} disconnected ({reason})", device.key);
            self.backend.close(device.handle);
        }
    }

    fn scan(&mut self, now: Instant) {
        self.last_scan = Some(now);
        let listed = self.backend.discover();
        let present: BTreeSet<&DeviceKey> = listed.iter().collect();

        let stale: Vec<(SlotId, &str)> = self
            .slots
            .connected()
            .filter_map(|id| {
                let slot = self.slots.get(id)?;
                if !present.contains(slot.key()?) {
                    Some((id, "removed"))
                } else if slot.is_pending_loss() {
                    Some((id, "lost"))
                } else {
                    None
                }
            })
            .collect();
        for (id, reason) in stale {
            self.release(id, reason);
        }

        self.rejected.retain(|key, _| present.contains(key));

        for key in &listed {
            if self.slots.find(key).is_some() {
                continue;
            }
            let instance = self.backend.instance(key);
            if let Some(rejected) = self.rejected.get(key) {
                if *rejected == instance {
                    continue;
                }
                log::debug!("{key} changed since it was rejected; probing again");
                self.rejected.remove(key);
            }
            let Some(id) = self.slots.free() else {
                log::debug!("no free slot for {key}");
                break;
            };
            match self.backend.probe_and_open(key) {
                Ok(opened) => {
                    log::info!(
                        "slot {id}: {} connected ({key})",
                        opened.meta.display_name()
                    );
                    if let Some(slot) = self.slots.get_mut(id) {
                        slot.attach(key.clone(), opened);
                    }
                }
                Err(e @ Error::CapabilityProbe { .. }) => {
                    log::debug!("{e}");
                    self.rejected.insert(key.clone(), instance);
                }
                Err(e) => log::warn!("{e}"),
            }
        }
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Run both motors at `left`/`right` (clamped to `[0, 1]`) for
    /// `duration_ms`.
    ///
    /// Fire-and-forget: ignored for slots without a rumble-capable device,
    /// and failures are only logged.
    pub fn set_rumble(&mut self, slot: SlotId, left: f32, right: f32, duration_ms: u32) {
        let Some(device) = self.slots.get_mut(slot).and_then(|s| s.device.as_mut()) else {
            return;
        };
        if !device.capabilities.rumble {
            log::debug!("slot {slot}: rumble not supported by {}", device.key);
            return;
        }
        let (left, right) = (left.clamp(0.0, 1.0), right.clamp(0.0, 1.0));
        if let Err(e) = self
            .backend
            .rumble(&mut device.handle, left, right, duration_ms)
        {
            log::debug!("slot {slot}: {e}");
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    fn slot(&self, slot: SlotId) -> Option<&Slot<B::Handle>> {
        self.slots.get(slot)
    }

    fn stick_state(&self, slot: SlotId, stick: Stick) -> AxisState {
        self.slot(slot)
            .map(|s| s.sticks[stick.index()])
            .unwrap_or_default()
    }

    fn trigger_state(&self, slot: SlotId, trigger: Trigger) -> TriggerState {
        self.slot(slot)
            .map(|s| s.triggers[trigger.index()])
            .unwrap_or_default()
    }

    fn button_edge(&self, slot: SlotId, button: Button) -> (bool, bool) {
        self.slot(slot)
            .map(|s| {
                (
                    s.buttons_previous.contains(button),
                    s.buttons_current.contains(button),
                )
            })
            .unwrap_or_default()
    }

    pub fn is_connected(&self, slot: SlotId) -> bool {
        self.slot(slot).is_some_and(Slot::is_connected)
    }

    /// Connected slots in ascending order.
    pub fn connected_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots.connected()
    }

    pub fn device_key(&self, slot: SlotId) -> Option<&DeviceKey> {
        self.slot(slot).and_then(Slot::key)
    }

    pub fn device_meta(&self, slot: SlotId) -> Option<&DeviceMeta> {
        self.slot(slot)
            .and_then(|s| s.device.as_ref())
            .map(|d| &d.meta)
    }

    pub fn capabilities(&self, slot: SlotId) -> Capabilities {
        self.slot(slot)
            .and_then(|s| s.device.as_ref())
            .map(|d| d.capabilities)
            .unwrap_or_default()
    }

    pub fn button_down(&self, slot: SlotId, button: Button) -> bool {
        self.button_edge(slot, button).1
    }

    pub fn button_triggered(&self, slot: SlotId, button: Button) -> bool {
        let (prev, cur) = self.button_edge(slot, button);
        state::triggered(prev, cur)
    }

    pub fn button_released(&self, slot: SlotId, button: Button) -> bool {
        let (prev, cur) = self.button_edge(slot, button);
        state::released(prev, cur)
    }

    /// Raw trigger value (`0..=255`), `0` inside the deadzone.
    pub fn trigger_value(&self, slot: SlotId, trigger: Trigger) -> i32 {
        self.trigger_state(slot, trigger).raw_value
    }

    /// Deadzone-scaled press length in `[0, 1]`.
    pub fn trigger_length(&self, slot: SlotId, trigger: Trigger) -> f32 {
        self.trigger_state(slot, trigger).press_length
    }

    pub fn trigger_down(&self, slot: SlotId, trigger: Trigger) -> bool {
        self.trigger_state(slot, trigger).pressed_current
    }

    pub fn trigger_triggered(&self, slot: SlotId, trigger: Trigger) -> bool {
        let t = self.trigger_state(slot, trigger);
        state::triggered(t.pressed_previous, t.pressed_current)
    }

    pub fn trigger_released(&self, slot: SlotId, trigger: Trigger) -> bool {
        let t = self.trigger_state(slot, trigger);
        state::released(t.pressed_previous, t.pressed_current)
    }

    /// Raw stick position, `(0, 0)` inside the deadzone.
    pub fn stick_xy(&self, slot: SlotId, stick: Stick) -> (i32, i32) {
        let s = self.stick_state(slot, stick);
        (s.raw_x, s.raw_y)
    }

    /// Unit direction vector, `(0.0, 0.0)` inside the deadzone.
    pub fn stick_norm_xy(&self, slot: SlotId, stick: Stick) -> (f32, f32) {
        let s = self.stick_state(slot, stick);
        (s.norm_x, s.norm_y)
    }

    /// Deadzone-scaled deflection in `[0, 1]`.
    pub fn stick_length(&self, slot: SlotId, stick: Stick) -> f32 {
        self.stick_state(slot, stick).magnitude
    }

    /// Angle in radians; meaningful only while [`stick_length`](Self::stick_length) is non-zero.
    pub fn stick_angle(&self, slot: SlotId, stick: Stick) -> f32 {
        self.stick_state(slot, stick).angle
    }

    pub fn stick_dir(&self, slot: SlotId, stick: Stick) -> StickDirection {
        self.stick_state(slot, stick).direction_current
    }

    /// `true` on the tick the stick entered `dir`.
    pub fn stick_dir_triggered(&self, slot: SlotId, stick: Stick, dir: StickDirection) -> bool {
        let s = self.stick_state(slot, stick);
        state::triggered(s.direction_previous == dir, s.direction_current == dir)
    }

    /// `true` on the tick the stick left `dir`.
    pub fn stick_dir_released(&self, slot: SlotId, stick: Stick, dir: StickDirection) -> bool {
        let s = self.stick_state(slot, stick);
        state::released(s.direction_previous == dir, s.direction_current == dir)
    }

    /// Owned copy of a connected slot's state.
    pub fn snapshot(&self, slot: SlotId) -> Option<SlotSnapshot> {
        let s = self.slot(slot)?;
        let device = s.device.as_ref()?;
        Some(SlotSnapshot {
            slot,
            key: device.key.clone(),
            meta: device.meta.clone(),
            capabilities: device.capabilities,
            buttons_current: s.buttons_current,
            buttons_previous: s.buttons_previous,
            sticks: s.sticks,
            triggers: s.triggers,
        })
    }
}

impl<B: Backend> Drop for Manager<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<B: Backend + Default> Default for Manager<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}
