//! Owned controller state and the single path through which it reaches the
//! display surface.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::{Mode, Reading, ReadingKind};
use tracing::debug;

use crate::{display::DisplaySurface, reconciler::ModeReconciler};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingSnapshot {
    pub set_temp: Reading,
    pub room_temp: Reading,
}

impl ReadingSnapshot {
    pub fn get(&self, kind: ReadingKind) -> &Reading {
        match kind {
            ReadingKind::SetTemp => &self.set_temp,
            ReadingKind::RoomTemp => &self.room_temp,
        }
    }

    fn slot_mut(&mut self, kind: ReadingKind) -> &mut Reading {
        match kind {
            ReadingKind::SetTemp => &mut self.set_temp,
            ReadingKind::RoomTemp => &mut self.room_temp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    /// Last known device mode; `None` until known or after an unrecognized report.
    pub mode: Option<Mode>,
    pub readings: ReadingSnapshot,
}

/// Controller state paired with the display surface. Every mutation is
/// forwarded to the display while the state lock is held, so the display
/// always shows what the state says.
pub struct SharedView {
    display: Arc<dyn DisplaySurface>,
    inner: Mutex<ViewInner>,
}

struct ViewInner {
    state: ControllerState,
    reconciler: ModeReconciler,
}

impl SharedView {
    pub fn new(display: Arc<dyn DisplaySurface>) -> Self {
        Self {
            display,
            inner: Mutex::new(ViewInner {
                state: ControllerState::default(),
                reconciler: ModeReconciler::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn apply_reading(&self, kind: ReadingKind, value: String) {
        let reading = Reading::Available(value);
        let text = reading.render(kind);
        let mut inner = self.lock();
        *inner.state.readings.slot_mut(kind) = reading;
        debug!(?kind, %text, "reading updated");
        self.display.set_reading(kind, &text);
    }

    /// Feeds `mode` (a device-reported or just-commanded mode name) through
    /// the reconciler and highlights the result.
    pub fn apply_mode(&self, mode: &str) {
        let mut inner = self.lock();
        let active = inner.reconciler.reconcile(mode).active();
        inner.state.mode = active;
        debug!(mode, ?active, "mode reconciled");
        self.display.set_active_control(active);
    }

    pub fn snapshot(&self) -> ControllerState {
        self.lock().state.clone()
    }

    pub fn active_control(&self) -> Option<Mode> {
        self.lock().reconciler.active()
    }
}
