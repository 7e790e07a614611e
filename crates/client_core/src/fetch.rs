//! One-shot reads of device state, feeding the shared view.

use shared::{
    domain::{Mode, ReadingKind},
    error::TransportError,
    protocol::GET_MODE_ROUTE,
};
use tracing::warn;

use crate::{state::SharedView, transport::Transport};

/// Fetches a temperature reading, trimmed. A body that is not a number is
/// rejected so it never replaces a good reading.
pub async fn fetch_reading(
    transport: &dyn Transport,
    kind: ReadingKind,
) -> Result<String, TransportError> {
    let body = transport.request(kind.path()).await?;
    let value = body.trim();
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(value.to_string()),
        _ => Err(TransportError::Malformed {
            path: kind.path().to_string(),
            detail: format!("expected a temperature, got '{value}'"),
        }),
    }
}

/// Fetches the device mode name with surrounding whitespace removed. The
/// name is returned even when it is not one of the known modes.
pub async fn fetch_mode(transport: &dyn Transport) -> Result<String, TransportError> {
    let body = transport.request(GET_MODE_ROUTE).await?;
    Ok(body.trim().to_string())
}

/// Returns whether the display was updated; on failure the previous reading stays.
pub async fn refresh_reading(transport: &dyn Transport, view: &SharedView, kind: ReadingKind) -> bool {
    match fetch_reading(transport, kind).await {
        Ok(value) => {
            view.apply_reading(kind, value);
            true
        }
        Err(err) => {
            warn!(?kind, error = %err, "reading refresh failed; keeping last value");
            false
        }
    }
}

/// Room temperature first, then set temperature. Each fetch fails on its own.
pub async fn refresh_readings(transport: &dyn Transport, view: &SharedView) {
    refresh_reading(transport, view, ReadingKind::RoomTemp).await;
    refresh_reading(transport, view, ReadingKind::SetTemp).await;
}

pub async fn refresh_mode(transport: &dyn Transport, view: &SharedView) -> Option<Mode> {
    match fetch_mode(transport).await {
        Ok(mode) => {
            view.apply_mode(&mode);
            view.active_control()
        }
        Err(err) => {
            warn!(error = %err, "mode refresh failed; keeping highlight");
            view.active_control()
        }
    }
}
