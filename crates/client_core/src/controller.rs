//! Composition root: wires user actions to the dispatcher, owns the poll
//! loop and ties background work to the start/stop lifecycle.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use shared::domain::{Command, Mode, ReadingKind, TargetTemp};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    dispatcher::{CommandDispatcher, DispatchHandle},
    display::DisplaySurface,
    fetch,
    poll::{PollLoop, DEFAULT_POLL_INTERVAL},
    state::{ControllerState, SharedView},
    transport::Transport,
};

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub poll_interval: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub struct Controller {
    transport: Arc<dyn Transport>,
    view: Arc<SharedView>,
    dispatcher: CommandDispatcher,
    poll: PollLoop,
    options: ControllerOptions,
    lifecycle: Mutex<CancellationToken>,
}

impl Controller {
    pub fn new(
        transport: Arc<dyn Transport>,
        display: Arc<dyn DisplaySurface>,
        options: ControllerOptions,
    ) -> Self {
        let view = Arc::new(SharedView::new(display));
        Self {
            dispatcher: CommandDispatcher::new(Arc::clone(&transport)),
            poll: PollLoop::new(Arc::clone(&transport), Arc::clone(&view)),
            transport,
            view,
            options,
            lifecycle: Mutex::new(CancellationToken::new()),
        }
    }

    fn lifecycle_token(&self) -> CancellationToken {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Starts the poll loop (its first tick refreshes both readings) and
    /// fetches the current mode once. Calling it again while running only
    /// repeats the mode fetch.
    pub fn on_start(&self) {
        {
            let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
            if lifecycle.is_cancelled() {
                *lifecycle = CancellationToken::new();
            }
        }
        info!("controller starting");
        self.poll.start(self.options.poll_interval);

        let transport = Arc::clone(&self.transport);
        let view = Arc::clone(&self.view);
        spawn_until_cancelled(self.lifecycle_token(), "initial mode fetch", async move {
            fetch::refresh_mode(transport.as_ref(), &view).await;
        });
    }

    /// Stops polling and drops every outstanding request. Nothing touches
    /// the display after this returns, apart from a callback already running.
    pub fn on_stop(&self) {
        info!("controller stopping");
        self.poll.stop();
        self.dispatcher.cancel_in_flight();
        self.lifecycle_token().cancel();
    }

    /// Sends a mode command; once acknowledged the mode is highlighted
    /// without waiting for the next `/get-mode`.
    pub fn select_mode(&self, mode: Mode) -> DispatchHandle {
        let view = Arc::clone(&self.view);
        self.dispatcher.dispatch(
            Command::Mode(mode),
            Some(Box::new(move || view.apply_mode(mode.as_str()))),
        )
    }

    /// Sends a new target; once acknowledged the set temperature is re-read.
    /// The mode highlight is left alone.
    pub fn set_target_temperature(&self, temp: TargetTemp) -> DispatchHandle {
        let transport = Arc::clone(&self.transport);
        let view = Arc::clone(&self.view);
        let lifecycle = self.lifecycle_token();
        self.dispatcher.dispatch(
            Command::SetTemp(temp),
            Some(Box::new(move || {
                spawn_until_cancelled(lifecycle, "set temperature refresh", async move {
                    fetch::refresh_reading(transport.as_ref(), &view, ReadingKind::SetTemp).await;
                });
            })),
        )
    }

    pub fn dispatch(&self, command: Command) -> DispatchHandle {
        match command {
            Command::Mode(mode) => self.select_mode(mode),
            Command::SetTemp(temp) => self.set_target_temperature(temp),
        }
    }

    pub async fn refresh_mode(&self) -> Option<Mode> {
        fetch::refresh_mode(self.transport.as_ref(), &self.view).await
    }

    pub async fn refresh_readings(&self) {
        fetch::refresh_readings(self.transport.as_ref(), &self.view).await;
    }

    pub fn state(&self) -> ControllerState {
        self.view.snapshot()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_running()
    }

    pub fn has_in_flight_command(&self) -> bool {
        self.dispatcher.in_flight().is_some()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.dispatcher.cancel_in_flight();
        self.lifecycle_token().cancel();
    }
}

fn spawn_until_cancelled<F>(cancel: CancellationToken, what: &'static str, work: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => debug!(what, "background work cancelled"),
            _ = work => {}
        }
    });
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
