//! Remote-control client core: command dispatch, reading polls and mode
//! highlighting for a single networked window/thermostat controller.

pub mod controller;
pub mod dispatcher;
pub mod display;
pub mod fetch;
pub mod poll;
pub mod reconciler;
pub mod state;
pub mod transport;

pub use controller::{Controller, ControllerOptions};
pub use dispatcher::{CommandDispatcher, CommandId, CommandOutcome, DispatchHandle, SuccessCallback};
pub use display::DisplaySurface;
pub use poll::{PollLoop, DEFAULT_POLL_INTERVAL};
pub use reconciler::{reconcile, ControlAppearance, ControlHighlight, ControlHighlights, ModeReconciler};
pub use state::{ControllerState, ReadingSnapshot, SharedView};
pub use transport::{HttpTransport, Transport, TransportSetupError};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
