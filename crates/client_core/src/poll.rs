//! Background refresh of the temperature readings.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{fetch::refresh_readings, state::SharedView, transport::Transport};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

struct RunningLoop {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// At most one loop runs at a time. Ticks are sequential: the next tick is
/// not awaited until the previous one has updated the display.
pub struct PollLoop {
    transport: Arc<dyn Transport>,
    view: Arc<SharedView>,
    running: Mutex<Option<RunningLoop>>,
}

impl PollLoop {
    pub fn new(transport: Arc<dyn Transport>, view: Arc<SharedView>) -> Self {
        Self {
            transport,
            view,
            running: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<RunningLoop>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts ticking every `every`, the first tick immediately. Returns
    /// `false` without doing anything if a loop is already running.
    pub fn start(&self, every: Duration) -> bool {
        if every.is_zero() {
            warn!("refusing to start poll loop with a zero interval");
            return false;
        }

        let mut running = self.lock();
        if running.as_ref().is_some_and(|current| !current.task.is_finished()) {
            debug!("poll loop already running");
            return false;
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(
            Arc::clone(&self.transport),
            Arc::clone(&self.view),
            every,
            cancel.clone(),
        ));
        *running = Some(RunningLoop { cancel, task });
        info!(interval_ms = every.as_millis() as u64, "poll loop started");
        true
    }

    /// Returns whether a running loop was stopped.
    pub fn stop(&self) -> bool {
        let Some(current) = self.lock().take() else {
            return false;
        };
        current.cancel.cancel();
        info!("poll loop stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|current| !current.task.is_finished())
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    transport: Arc<dyn Transport>,
    view: Arc<SharedView>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        debug!("poll tick");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = refresh_readings(transport.as_ref(), &view) => {}
        }
    }
}

#[cfg(test)]
#[path = "tests/poll_tests.rs"]
mod tests;
