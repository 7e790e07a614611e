//! Sends user commands to the device, one at a time.
//!
//! A new dispatch cancels whatever command is still in flight. The superseded
//! command's transport call is abandoned at its next suspension point, and if
//! its response has already arrived the result is discarded: its success
//! callback never runs.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use shared::{domain::Command, error::TransportError};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::transport::Transport;

/// Runs once, after the device acknowledged the command and only if the
/// command was not superseded. It runs while the dispatcher slot is held, so
/// it must not dispatch.
pub type SuccessCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    Failed(TransportError),
    /// Superseded by a later dispatch or torn down with the controller.
    Cancelled,
}

/// Receipt for a dispatched command. Dropping it has no effect on the command.
pub struct DispatchHandle {
    id: CommandId,
    outcome: oneshot::Receiver<CommandOutcome>,
}

impl DispatchHandle {
    pub fn id(&self) -> CommandId {
        self.id
    }

    pub async fn outcome(self) -> CommandOutcome {
        self.outcome.await.unwrap_or(CommandOutcome::Cancelled)
    }
}

struct InFlightCommand {
    id: CommandId,
    name: &'static str,
    cancel: CancellationToken,
}

type Slot = Arc<Mutex<Option<InFlightCommand>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<InFlightCommand>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
    slot: Slot,
    next_id: AtomicU64,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Cancels the in-flight command, if any, and starts `command`. The swap
    /// happens under one lock so two commands never coexist.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, command: Command, on_success: Option<SuccessCallback>) -> DispatchHandle {
        let id = CommandId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cancel = CancellationToken::new();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let mut slot = lock(&self.slot);
        if let Some(previous) = slot.take() {
            debug!(
                superseded = previous.name,
                superseded_id = previous.id.0,
                by = command.name(),
                "cancelling in-flight command"
            );
            previous.cancel.cancel();
        }

        tokio::spawn(run_command(
            Arc::clone(&self.transport),
            Arc::clone(&self.slot),
            id,
            command,
            cancel.clone(),
            on_success,
            outcome_tx,
        ));
        *slot = Some(InFlightCommand {
            id,
            name: command.name(),
            cancel,
        });
        debug!(command = command.name(), id = id.0, "dispatched command");

        DispatchHandle {
            id,
            outcome: outcome_rx,
        }
    }

    pub fn in_flight(&self) -> Option<CommandId> {
        lock(&self.slot).as_ref().map(|command| command.id)
    }

    /// Returns whether a command was cancelled.
    pub fn cancel_in_flight(&self) -> bool {
        let Some(command) = lock(&self.slot).take() else {
            return false;
        };
        debug!(command = command.name, id = command.id.0, "cancelling in-flight command");
        command.cancel.cancel();
        true
    }
}

async fn run_command(
    transport: Arc<dyn Transport>,
    slot: Slot,
    id: CommandId,
    command: Command,
    cancel: CancellationToken,
    on_success: Option<SuccessCallback>,
    outcome_tx: oneshot::Sender<CommandOutcome>,
) {
    let path = command.path();
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            let _ = outcome_tx.send(CommandOutcome::Cancelled);
            return;
        }
        result = transport.request(&path) => result,
    };

    let outcome = {
        let mut slot = lock(&slot);
        // A later dispatch may have replaced us while the response was in transit.
        if cancel.is_cancelled() {
            debug!(command = command.name(), id = id.0, "discarding superseded response");
            CommandOutcome::Cancelled
        } else {
            if slot.as_ref().is_some_and(|current| current.id == id) {
                *slot = None;
            }
            match result {
                Ok(_) => {
                    info!(command = command.name(), %path, "device acknowledged command");
                    if let Some(on_success) = on_success {
                        on_success();
                    }
                    CommandOutcome::Completed
                }
                Err(err) => {
                    warn!(command = command.name(), %path, error = %err, "command failed");
                    CommandOutcome::Failed(err)
                }
            }
        }
    };

    let _ = outcome_tx.send(outcome);
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
