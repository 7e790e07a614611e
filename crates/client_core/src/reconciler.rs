//! Maps a mode name onto the four mode controls.

use shared::domain::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAppearance {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlHighlight {
    pub control: Mode,
    pub appearance: ControlAppearance,
}

/// One instruction per control, in [`Mode::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlHighlights([ControlHighlight; 4]);

impl ControlHighlights {
    pub fn iter(&self) -> impl Iterator<Item = &ControlHighlight> {
        self.0.iter()
    }

    pub fn active(&self) -> Option<Mode> {
        self.0
            .iter()
            .find(|highlight| highlight.appearance == ControlAppearance::Active)
            .map(|highlight| highlight.control)
    }

    pub fn active_count(&self) -> usize {
        self.0
            .iter()
            .filter(|highlight| highlight.appearance == ControlAppearance::Active)
            .count()
    }
}

/// Exactly the control named `mode` is active; an unrecognized name leaves
/// every control inactive. Comparison is exact, callers trim device input.
pub fn reconcile(mode: &str) -> ControlHighlights {
    ControlHighlights(Mode::ALL.map(|control| ControlHighlight {
        control,
        appearance: if control.as_str() == mode {
            ControlAppearance::Active
        } else {
            ControlAppearance::Inactive
        },
    }))
}

/// Remembers the currently active control between reconcile passes.
#[derive(Debug, Default)]
pub struct ModeReconciler {
    active: Option<Mode>,
}

impl ModeReconciler {
    pub fn reconcile(&mut self, mode: &str) -> ControlHighlights {
        let highlights = reconcile(mode);
        self.active = highlights.active();
        highlights
    }

    pub fn active(&self) -> Option<Mode> {
        self.active
    }
}
