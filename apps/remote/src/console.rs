//! Text display surface: one line per reading change, one line showing the
//! four mode controls whenever the highlight changes.

use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

use client_core::{reconcile, ControlAppearance, DisplaySurface};
use shared::domain::{Mode, ReadingKind};

pub struct ConsoleDisplay<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed stdout is not worth failing the session over.
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn render_controls(active: Option<Mode>) -> String {
    let mode = active.map(Mode::as_str).unwrap_or_default();
    reconcile(mode)
        .iter()
        .map(|highlight| match highlight.appearance {
            ControlAppearance::Active => format!("[*{}*]", highlight.control.as_str().to_uppercase()),
            ControlAppearance::Inactive => format!("[ {} ]", highlight.control.as_str()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl<W: Write + Send> DisplaySurface for ConsoleDisplay<W> {
    fn set_reading(&self, _kind: ReadingKind, text: &str) {
        self.write_line(text);
    }

    fn set_active_control(&self, mode: Option<Mode>) {
        self.write_line(&format!("Mode: {}", render_controls(mode)));
    }
}
