use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use voltwise_common::{
    analyze, format, ErrorResponse, LogEntry, RollingLogBuffer, SimulationPayload, DEFAULT_BINS,
    MAX_BINS, MAX_MESSAGE_LEN,
};

pub mod config;
use config::{LOCK_TIMEOUT, MAX_BODY_BYTES};

/// Abstraction over current time for testability.
pub trait Clock: Send + Sync {
    fn unix_now_secs(&self) -> u64;
}

/// Production clock backed by `SystemTime`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// The single owner of the rolling pulse buffer. Every append goes through this lock.
pub type Pulse = Arc<Mutex<RollingLogBuffer>>;

#[derive(Clone)]
pub struct AppState {
    pub pulse: Pulse,
    pub clock: Arc<dyn Clock>,
    pub default_bins: usize,
}

impl AppState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_default_bins(clock, DEFAULT_BINS)
    }

    pub fn with_default_bins(clock: Arc<dyn Clock>, default_bins: usize) -> Self {
        Self {
            pulse: Arc::new(Mutex::new(RollingLogBuffer::new())),
            clock,
            default_bins,
        }
    }

    /// `HH:MM:SS` for the current clock reading.
    pub fn timestamp(&self) -> String {
        format::clock_time(self.clock.unix_now_secs())
    }

    async fn lock_pulse(&self) -> Option<MutexGuard<'_, RollingLogBuffer>> {
        timeout(LOCK_TIMEOUT, self.pulse.lock()).await.ok()
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub default_bins: usize,
    /// When set, a background task appends synthetic chatter at this interval.
    pub chatter_interval: Option<Duration>,
}

impl ServerConfig {
    pub fn new(address: SocketAddr) -> Self {
        Self { address, default_bins: DEFAULT_BINS, chatter_interval: None }
    }
}

/// Voltwise analytics server
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the server's configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Create the application router with the given state
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/analyze", post(handle_analyze))
            .route("/pulse", get(handle_get_pulse).post(handle_post_pulse))
            // axum's default 2MB limit is too small for full-size sample arrays.
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .with_state(state)
    }

    /// Run the server, signalling `ready_tx` with the bound address once accepting connections
    pub async fn run(self, ready_tx: tokio::sync::oneshot::Sender<SocketAddr>) -> Result<(), Box<dyn std::error::Error>> {
        let state = AppState::with_default_bins(Arc::new(SystemClock), self.config.default_bins);

        if let Some(interval) = self.config.chatter_interval {
            tokio::spawn(run_chatter(state.clone(), interval));
        }

        let app = Self::create_router(state);
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "voltwise server listening");
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message = message.into();
    if status.is_server_error() {
        warn!(%status, %message, "request failed");
    } else {
        debug!(%status, %message, "request rejected");
    }
    (status, Json(ErrorResponse { error: message })).into_response()
}

fn lock_timeout_response() -> Response {
    error_response(StatusCode::SERVICE_UNAVAILABLE, "Server error: Lock acquisition timed out")
}

/// Query string of `POST /analyze`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    /// Kept as text so a malformed value gets the JSON error envelope.
    pub bins: Option<String>,
}

/// Body of `POST /pulse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub message: String,
}

fn parse_bins(raw: Option<&str>, default_bins: usize) -> Result<usize, Response> {
    let Some(raw) = raw else {
        return Ok(default_bins);
    };
    match raw.trim().parse::<usize>() {
        Ok(bins) if (1..=MAX_BINS).contains(&bins) => Ok(bins),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Bin count must be between 1 and {}", MAX_BINS),
        )),
    }
}

/// Handler for POST /analyze: runs the analytics pipeline over a simulation payload
/// and records a SIM_DONE entry in the pulse.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
    body: Bytes,
) -> Response {
    let bins = match parse_bins(params.bins.as_deref(), state.default_bins) {
        Ok(bins) => bins,
        Err(r) => return r,
    };

    let payload: SimulationPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Malformed simulation payload: {}", e))
        }
    };

    // Sorting ~10⁵ samples is CPU work; keep it off the async workers.
    let report = match tokio::task::spawn_blocking(move || analyze(&payload, bins)).await {
        Ok(report) => report,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Server error: {}", e)),
    };

    // Derived entries wait for the lock; the critical section is a single push.
    let entry = LogEntry::analysis_complete(state.timestamp(), &report.tail_risk);
    state.pulse.lock().await.append(entry);

    (StatusCode::OK, Json(report)).into_response()
}

/// Handler for GET /pulse: returns the retained entries, oldest first.
pub async fn handle_get_pulse(State(state): State<AppState>) -> Response {
    match state.lock_pulse().await {
        Some(pulse) => (StatusCode::OK, Json(pulse.snapshot())).into_response(),
        None => lock_timeout_response(),
    }
}

/// Handler for POST /pulse: appends an externally sourced STATUS entry.
pub async fn handle_post_pulse(State(state): State<AppState>, body: Bytes) -> Response {
    let request: StatusRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Malformed status request: {}", e)),
    };

    let message = request.message.trim();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Message must not be empty");
    }
    if message.len() > MAX_MESSAGE_LEN {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Message exceeds maximum size of {} bytes", MAX_MESSAGE_LEN),
        );
    }

    let entry = LogEntry::status(state.timestamp(), message);
    match state.lock_pulse().await {
        Some(mut pulse) => {
            pulse.append(entry.clone());
            (StatusCode::OK, Json(entry)).into_response()
        }
        None => lock_timeout_response(),
    }
}

/// Append one synthetic chatter entry per `interval` tick, forever.
pub async fn run_chatter(state: AppState, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // consume the immediate first tick
    for seq in 0_u64.. {
        ticker.tick().await;
        let entry = LogEntry::synthetic(state.timestamp(), seq);
        state.pulse.lock().await.append(entry);
    }
}
