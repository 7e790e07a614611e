use shared::domain::{Mode, ReadingKind};

/// Rendering target for readings and the active-mode highlight. Implementors
/// only render; all decisions are made before these are called.
pub trait DisplaySurface: Send + Sync {
    fn set_reading(&self, kind: ReadingKind, text: &str);

    /// Highlights `mode`'s control and restores every other control. `None`
    /// restores all four.
    fn set_active_control(&self, mode: Option<Mode>);
}
