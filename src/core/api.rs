//! HTTP + WebSocket API for Formcheck
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /exercises - Exercise metadata and thresholds
//! - POST /session/new - Create new session
//! - POST /session/{id}/start - Start recording
//! - POST /session/{id}/frame - Submit one landmark frame
//! - POST /session/{id}/stop - Stop recording, returns the result record
//! - GET /session/{id} - Get session status
//! - GET /results - Results submitted so far
//! - WS /ws/{id} - Live updates

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::FormcheckConfig;
use crate::core::exercise::catalog;
use crate::core::replay::FrameRecord;
use crate::core::session::{NullUi, SessionDriver};
use crate::core::submit::{JsonFileSink, MemorySink, SubmissionSink};
use crate::error::FormcheckError;
use crate::types::{
    AnalysisResult, CountMode, DiagnosticEntry, ExerciseKind, ExerciseMeta, Notification, SessionAggregate,
    SessionResult, Thresholds,
};

/// Session state
pub struct Session {
    pub id: String,
    pub driver: SessionDriver,
    pub last_status: String,
    pub frames: u64,
    pub update_tx: broadcast::Sender<SessionUpdate>,
    ticker: Option<JoinHandle<()>>,
}

impl Session {
    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

/// Live update message
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    pub status: String,
    pub recording: bool,
    pub counted: bool,
    pub correct: bool,
    pub total_count: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub hold_seconds: f64,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

impl SessionUpdate {
    fn snapshot(session: &Session, result: Option<&AnalysisResult>) -> Self {
        let agg = session.driver.aggregate();
        Self {
            status: session.last_status.clone(),
            recording: session.driver.is_recording(),
            counted: result.map(|r| r.counted).unwrap_or(false),
            correct: result.map(|r| r.correct).unwrap_or(false),
            total_count: agg.total_count,
            correct_count: agg.correct_count,
            incorrect_count: agg.incorrect_count,
            hold_seconds: agg.hold_seconds(),
            progress: session.driver.progress(),
            notification: result.and_then(|r| r.notification.clone()),
        }
    }
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
    pub results: RwLock<Vec<SessionResult>>,
    pub config: FormcheckConfig,
    /// Also write each result as a JSON file here
    pub results_dir: Option<PathBuf>,
}

/// Create new session request
#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub exercise: String,
    pub hints: Option<bool>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
    pub exercise: String,
    pub target: u32,
    pub count_mode: CountMode,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub exercise: String,
    pub recording: bool,
    pub status: String,
    pub phase: String,
    pub frames: u64,
    pub total_count: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub hold_seconds: f64,
    pub progress: f64,
    pub score: u8,
    pub diagnostics: Vec<DiagnosticEntry>,
}

/// Frame response
#[derive(Debug, Serialize)]
pub struct FrameResponse {
    /// False when the session is not recording or no subject was detected
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    pub total_count: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Exercise listing entry
#[derive(Debug, Serialize)]
pub struct ExerciseInfo {
    #[serde(flatten)]
    pub meta: ExerciseMeta,
    pub thresholds: Thresholds,
}

fn status_for(err: &FormcheckError) -> StatusCode {
    match err {
        FormcheckError::UnknownExercise { .. }
        | FormcheckError::UnknownThreshold { .. }
        | FormcheckError::MalformedFrame { .. }
        | FormcheckError::IncompleteFrame { .. }
        | FormcheckError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Create the API router
pub fn create_router(config: FormcheckConfig, results_dir: Option<PathBuf>) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        results: RwLock::new(Vec::new()),
        config,
        results_dir,
    });

    Router::new()
        .route("/health", get(health))
        .route("/exercises", get(list_exercises))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/start", post(start_session))
        .route("/session/:id/frame", post(submit_frame))
        .route("/session/:id/stop", post(stop_session))
        .route("/results", get(list_results))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// List exercises with the configured targets and thresholds
async fn list_exercises(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ExerciseInfo>>, StatusCode> {
    let mut list = Vec::new();
    for exercise in catalog() {
        let exercise = state
            .config
            .exercise(exercise.kind())
            .map_err(|e| status_for(&e))?;
        list.push(ExerciseInfo {
            meta: exercise.meta().clone(),
            thresholds: exercise.thresholds(),
        });
    }
    Ok(Json(list))
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let kind: ExerciseKind = req.exercise.parse().map_err(|e| status_for(&e))?;
    let exercise = state.config.exercise(kind).map_err(|e| status_for(&e))?;

    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);
    let mut driver = SessionDriver::new(exercise);
    driver.set_hints_enabled(req.hints.unwrap_or(state.config.session.hints_enabled));

    let response = NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
        exercise: kind.name().to_string(),
        target: driver.meta().target,
        count_mode: driver.meta().count_mode,
    };

    let session = Session {
        id: session_id.clone(),
        driver,
        last_status: "Ready".to_string(),
        frames: 0,
        update_tx: tx,
        ticker: None,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    info!(session = %session_id, exercise = %kind, "session created");

    Ok(Json(response))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let agg: &SessionAggregate = session.driver.aggregate();

    Ok(Json(SessionStatusResponse {
        session_id: id,
        exercise: session.driver.meta().name.to_string(),
        recording: session.driver.is_recording(),
        status: session.last_status.clone(),
        phase: session.driver.state().phase_label(),
        frames: session.frames,
        total_count: agg.total_count,
        correct_count: agg.correct_count,
        incorrect_count: agg.incorrect_count,
        hold_seconds: agg.hold_seconds(),
        progress: session.driver.progress(),
        score: agg.score(),
        diagnostics: agg.diagnostics.clone(),
    }))
}

/// Start recording; hold-based exercises get a ticker task
async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionUpdate>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.stop_ticker();
    session.driver.start();
    session.frames = 0;
    session.last_status = "Recording".to_string();

    if session.driver.meta().is_hold() {
        let period = Duration::from_millis(state.config.session.hold_tick_ms.max(1));
        session.ticker = Some(tokio::spawn(run_hold_ticker(state.clone(), id.clone(), period)));
    }

    let update = SessionUpdate::snapshot(session, None);
    let _ = session.update_tx.send(update.clone());
    Ok(Json(update))
}

/// Hold ticker: ends when the session stops or disappears
async fn run_hold_ticker(state: Arc<AppState>, id: String, period: Duration) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        interval.tick().await;
        let mut sessions = state.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if session.driver.is_recording() => session.driver.tick(period),
            _ => break,
        }
    }
    debug!(session = %id, "hold ticker finished");
}

/// Submit one frame
async fn submit_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(frame): Json<FrameRecord>,
) -> Result<Json<FrameResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    if let Some(landmarks) = &frame.landmarks {
        session
            .driver
            .meta()
            .landmark_model
            .check(landmarks)
            .map_err(|e| status_for(&e))?;
    }

    let result = session
        .driver
        .process_frame(frame.landmarks.as_ref(), frame.now(), &mut NullUi);

    if let Some(r) = &result {
        session.frames += 1;
        session.last_status = r.status.clone();
        let _ = session.update_tx.send(SessionUpdate::snapshot(session, Some(r)));
    }

    let agg = session.driver.aggregate();
    Ok(Json(FrameResponse {
        processed: result.is_some(),
        total_count: agg.total_count,
        correct_count: agg.correct_count,
        incorrect_count: agg.incorrect_count,
        result,
    }))
}

/// Stop recording and submit the result
async fn stop_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResult>, StatusCode> {
    let result = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
        session.stop_ticker();

        let mut sink = MemorySink::default();
        let result = session.driver.stop(&mut sink).map_err(|e| status_for(&e))?;
        session.last_status = "Stopped".to_string();
        let _ = session.update_tx.send(SessionUpdate::snapshot(session, None));
        result
    };

    if let Some(dir) = &state.results_dir {
        if let Err(e) = JsonFileSink::new(dir).submit(&result) {
            warn!(error = %e, "could not save result");
        }
    }
    state.results.write().await.push(result.clone());

    Ok(Json(result))
}

/// Results submitted so far
async fn list_results(State(state): State<Arc<AppState>>) -> Json<Vec<SessionResult>> {
    Json(state.results.read().await.clone())
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SessionUpdate>) {
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    let json = match serde_json::to_string(&update) {
                        Ok(json) => json,
                        Err(_) => continue,
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Client messages are ignored; a close ends the connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("session_{:x}{:04x}", nanos as u64, SEQ.fetch_add(1, Ordering::Relaxed) & 0xffff)
}

/// Run the API server
pub async fn run_server(addr: &str, config: FormcheckConfig, results_dir: Option<PathBuf>) -> crate::Result<()> {
    let router = create_router(config, results_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Formcheck API listening");
    println!("Formcheck API running on {}", addr);
    println!("  GET  /exercises          - List exercises");
    println!("  POST /session/new        - Create session");
    println!("  POST /session/:id/start  - Start recording");
    println!("  POST /session/:id/frame  - Submit frame");
    println!("  POST /session/:id/stop   - Stop and submit result");
    println!("  GET  /session/:id        - Get status");
    println!("  GET  /results            - Submitted results");
    println!("  WS   /ws/:id             - Live updates");
    println!("  GET  /health             - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
