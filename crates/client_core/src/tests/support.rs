//! In-memory transport and display used across the crate's tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Mode, ReadingKind},
    error::TransportError,
};
use tokio::sync::oneshot;

use crate::{display::DisplaySurface, transport::Transport};

enum Scripted {
    Reply(Result<String, TransportError>),
    Gated(oneshot::Receiver<()>, Result<String, TransportError>),
}

#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    sticky: Mutex<HashMap<String, Result<String, TransportError>>>,
    requests: Mutex<Vec<String>>,
}

pub fn unreachable() -> TransportError {
    TransportError::Unreachable("connection refused".to_string())
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, path: &str, scripted: Scripted) {
        self.queued
            .lock()
            .expect("queued")
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }

    /// Next request to `path` answers `body`.
    pub fn reply(&self, path: &str, body: &str) {
        self.push(path, Scripted::Reply(Ok(body.to_string())));
    }

    /// Next request to `path` fails.
    pub fn fail(&self, path: &str) {
        self.push(path, Scripted::Reply(Err(unreachable())));
    }

    /// Next request to `path` answers `body` once the returned sender fires
    /// (or is dropped).
    pub fn gated(&self, path: &str, body: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(path, Scripted::Gated(rx, Ok(body.to_string())));
        tx
    }

    /// Every request to `path` without a queued answer gets this one.
    pub fn always(&self, path: &str, response: Result<&str, TransportError>) {
        self.sticky
            .lock()
            .expect("sticky")
            .insert(path.to_string(), response.map(str::to_string));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests").clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| p.as_str() == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, path: &str) -> Result<String, TransportError> {
        self.requests.lock().expect("requests").push(path.to_string());
        let scripted = self
            .queued
            .lock()
            .expect("queued")
            .get_mut(path)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted::Reply(result)) => result,
            Some(Scripted::Gated(gate, result)) => {
                let _ = gate.await;
                result
            }
            None => self
                .sticky
                .lock()
                .expect("sticky")
                .get(path)
                .cloned()
                .unwrap_or_else(|| Err(unreachable())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Reading(ReadingKind, String),
    Active(Option<Mode>),
}

#[derive(Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().expect("events").clone()
    }

    pub fn last_reading(&self, kind: ReadingKind) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            DisplayEvent::Reading(k, text) if k == kind => Some(text),
            _ => None,
        })
    }

    pub fn last_active(&self) -> Option<Option<Mode>> {
        self.events().into_iter().rev().find_map(|event| match event {
            DisplayEvent::Active(mode) => Some(mode),
            _ => None,
        })
    }

    pub fn highlights(&self) -> Vec<Option<Mode>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DisplayEvent::Active(mode) => Some(mode),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySurface for RecordingDisplay {
    fn set_reading(&self, kind: ReadingKind, text: &str) {
        self.events
            .lock()
            .expect("events")
            .push(DisplayEvent::Reading(kind, text.to_string()));
    }

    fn set_active_control(&self, mode: Option<Mode>) {
        self.events
            .lock()
            .expect("events")
            .push(DisplayEvent::Active(mode));
    }
}

/// Lets spawned tasks run until `condition` holds, panicking after a while.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

/// Gives spawned tasks a chance to run to their next suspension point.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
