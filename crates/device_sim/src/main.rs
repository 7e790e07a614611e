use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Mode, TargetTemp},
    protocol::{
        AUTO_ROUTE, CLOSE_ROUTE, GET_MODE_ROUTE, GET_ROOM_TEMP_ROUTE, GET_TEMP_ROUTE, OPEN_ROUTE,
        SET_TEMP_ROUTE, STOP_ROUTE,
    },
};
use tracing::{debug, info};

mod config;

use config::{load_settings, Settings};

/// How far the room temperature moves toward the target per reading.
const DRIFT_STEP: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
struct SimDevice {
    mode: Mode,
    target: TargetTemp,
    room_temp: f64,
}

impl SimDevice {
    fn drift(&mut self) {
        if self.mode == Mode::Stop {
            return;
        }
        let target = f64::from(self.target.value());
        let delta = (target - self.room_temp).clamp(-DRIFT_STEP, DRIFT_STEP);
        self.room_temp += delta;
    }
}

#[derive(Clone)]
struct AppState {
    device: Arc<Mutex<SimDevice>>,
    latency: Duration,
}

impl AppState {
    fn new(settings: &Settings) -> Self {
        Self {
            device: Arc::new(Mutex::new(SimDevice {
                mode: settings.initial_mode,
                target: settings.initial_target,
                room_temp: settings.initial_room_temp,
            })),
            latency: settings.latency,
        }
    }

    async fn with_device<T>(&self, f: impl FnOnce(&mut SimDevice) -> T) -> T {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut device)
    }
}

#[derive(Debug, Deserialize)]
struct SetTempQuery {
    value: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let app = build_router(AppState::new(&settings));

    let addr: SocketAddr = settings.bind.parse()?;
    info!(
        %addr,
        latency_ms = settings.latency.as_millis() as u64,
        mode = %settings.initial_mode,
        "device simulator listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/state", get(http_state))
        .route(AUTO_ROUTE, get(|s: State<AppState>| set_mode(s, Mode::Auto)))
        .route(OPEN_ROUTE, get(|s: State<AppState>| set_mode(s, Mode::Open)))
        .route(CLOSE_ROUTE, get(|s: State<AppState>| set_mode(s, Mode::Close)))
        .route(STOP_ROUTE, get(|s: State<AppState>| set_mode(s, Mode::Stop)))
        .route(SET_TEMP_ROUTE, get(set_temp))
        .route(GET_TEMP_ROUTE, get(get_temp))
        .route(GET_ROOM_TEMP_ROUTE, get(get_room_temp))
        .route(GET_MODE_ROUTE, get(get_mode))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_state(State(state): State<AppState>) -> Json<SimDevice> {
    let device = state.device.lock().unwrap_or_else(PoisonError::into_inner);
    Json(device.clone())
}

async fn set_mode(State(state): State<AppState>, mode: Mode) -> &'static str {
    state.with_device(|device| device.mode = mode).await;
    info!(%mode, "mode changed");
    "OK"
}

async fn set_temp(
    State(state): State<AppState>,
    Query(query): Query<SetTempQuery>,
) -> Result<&'static str, (StatusCode, String)> {
    let raw = query
        .value
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "missing value".to_string()))?;
    let target = raw
        .parse::<TargetTemp>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    state.with_device(|device| device.target = target).await;
    info!(%target, "target temperature changed");
    Ok("OK")
}

async fn get_temp(State(state): State<AppState>) -> String {
    state.with_device(|device| device.target.to_string()).await
}

async fn get_room_temp(State(state): State<AppState>) -> String {
    let room_temp = state
        .with_device(|device| {
            device.drift();
            device.room_temp
        })
        .await;
    debug!(room_temp, "room temperature read");
    format!("{room_temp:.1}")
}

async fn get_mode(State(state): State<AppState>) -> String {
    // Line-terminated like a serial println; clients trim it.
    let mode = state.with_device(|device| device.mode).await;
    format!("{mode}\r\n")
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
