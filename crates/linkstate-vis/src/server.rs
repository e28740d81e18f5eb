//! Axum web server with WebSocket streaming for visualization.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use linkstate_topology::{Selections, TopologySnapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::events::VisEvent;
use crate::phase::{Phase, PhaseKind};
use crate::playback::{PlaybackSpeed, PlaybackStatus};
use crate::session::{Frame, Session};

/// Visualization server.
pub struct VisServer {
    session: Arc<Session>,
}

impl VisServer {
    /// Create a server around a session.
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(health_handler))
            // Topology editing
            .route("/api/topology", get(topology_handler))
            .route("/api/topology/clear", post(clear_handler))
            .route("/api/routers", post(add_router_handler))
            .route("/api/routers/{name}", delete(remove_router_handler))
            .route("/api/links", post(add_link_handler))
            .route("/api/links/{id}", delete(remove_link_handler))
            .route("/api/layout/stabilize", post(stabilize_handler))
            // Views
            .route("/api/scene", get(scene_handler))
            .route("/api/log", get(log_handler))
            .route("/api/events", get(events_handler))
            // Protocol playback
            .route("/api/paths", post(paths_handler))
            .route("/api/phases/{phase}", post(phase_handler))
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/speed", post(speed_handler))
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.session.clone())
    }

    /// Run the server on the given address.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Visualization server running on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_precondition() => StatusCode::BAD_REQUEST,
            Error::Busy => StatusCode::CONFLICT,
            Error::Transport(_) | Error::Status(_) | Error::Decode(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type AppState = Arc<Session>;

/// Server status response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    routers: usize,
    links: usize,
    phase: Phase,
}

async fn health_handler(State(session): State<AppState>) -> Json<HealthResponse> {
    let vis = session.visualizer().lock().await;
    Json(HealthResponse {
        status: "ok",
        routers: vis.topology().router_count(),
        links: vis.topology().link_count(),
        phase: vis.phase(),
    })
}

/// Routers and links plus the picker lists.
#[derive(Debug, Serialize, Deserialize)]
struct TopologyResponse {
    topology: TopologySnapshot,
    selections: Selections,
}

async fn topology_view(session: &Session) -> TopologyResponse {
    let vis = session.visualizer().lock().await;
    TopologyResponse {
        topology: vis.topology().snapshot(),
        selections: vis.topology().selections(),
    }
}

async fn topology_handler(State(session): State<AppState>) -> Json<TopologyResponse> {
    Json(topology_view(&session).await)
}

/// Answer a topology edit with the new topology and push the new scene.
async fn edited(session: &Session) -> Json<TopologyResponse> {
    session.publish_scene().await;
    Json(topology_view(session).await)
}

#[derive(Deserialize)]
struct AddRouterRequest {
    name: String,
}

async fn add_router_handler(
    State(session): State<AppState>,
    Json(req): Json<AddRouterRequest>,
) -> Result<Json<TopologyResponse>> {
    session.visualizer().lock().await.add_router(&req.name)?;
    Ok(edited(&session).await)
}

async fn remove_router_handler(
    State(session): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TopologyResponse>> {
    session.visualizer().lock().await.remove_router(&name)?;
    Ok(edited(&session).await)
}

/// A cost typed by a user may arrive as a number or as raw text.
#[derive(Deserialize)]
#[serde(untagged)]
enum CostInput {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct AddLinkRequest {
    source: String,
    target: String,
    cost: CostInput,
}

async fn add_link_handler(
    State(session): State<AppState>,
    Json(req): Json<AddLinkRequest>,
) -> Result<Json<TopologyResponse>> {
    let cost = match req.cost {
        CostInput::Number(n) => n.to_string(),
        CostInput::Text(text) => text,
    };
    session
        .visualizer()
        .lock()
        .await
        .add_link_from_input(&req.source, &req.target, &cost)?;
    Ok(edited(&session).await)
}

async fn remove_link_handler(
    State(session): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TopologyResponse>> {
    session.visualizer().lock().await.remove_link(&id)?;
    Ok(edited(&session).await)
}

#[derive(Deserialize)]
struct ClearRequest {
    #[serde(default)]
    confirm: bool,
}

async fn clear_handler(
    State(session): State<AppState>,
    Json(req): Json<ClearRequest>,
) -> Result<Json<TopologyResponse>> {
    if !req.confirm {
        return Err(Error::Unconfirmed);
    }
    session.visualizer().lock().await.clear();
    Ok(edited(&session).await)
}

async fn stabilize_handler(State(session): State<AppState>) -> Json<Frame> {
    session.visualizer().lock().await.reset_layout();
    session.publish_scene().await;
    Json(session.scene_frame().await)
}

async fn scene_handler(State(session): State<AppState>) -> Json<Frame> {
    Json(session.scene_frame().await)
}

#[derive(Serialize)]
struct LogResponse {
    step_log: String,
    path_results: String,
}

async fn log_handler(State(session): State<AppState>) -> Json<LogResponse> {
    let vis = session.visualizer().lock().await;
    Json(LogResponse {
        step_log: vis.step_log().to_string(),
        path_results: vis.path_results().to_string(),
    })
}

#[derive(Deserialize)]
struct EventsQuery {
    /// Only events at or after this animation time
    #[serde(default)]
    since: u64,
}

async fn events_handler(
    State(session): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<VisEvent>> {
    let vis = session.visualizer().lock().await;
    Json(
        vis.events()
            .filter(|e| e.at_ms() >= query.since)
            .cloned()
            .collect(),
    )
}

#[derive(Deserialize)]
struct PathsRequest {
    source: Option<String>,
}

async fn paths_handler(
    State(session): State<AppState>,
    Json(req): Json<PathsRequest>,
) -> Result<Json<LogResponse>> {
    session.compute_paths(req.source.as_deref()).await?;
    let vis = session.visualizer().lock().await;
    Ok(Json(LogResponse {
        step_log: vis.step_log().to_string(),
        path_results: vis.path_results().to_string(),
    }))
}

#[derive(Serialize)]
struct AcceptedResponse {
    accepted: String,
}

/// Start a phase or the whole pipeline in the background.
async fn phase_handler(State(session): State<AppState>, Path(phase): Path<String>) -> Response {
    let kind = match phase.as_str() {
        "pipeline" => None,
        other => match other.parse::<PhaseKind>() {
            Ok(kind) => Some(kind),
            Err(message) => {
                return (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message }))
                    .into_response()
            }
        },
    };
    // Claimed before spawning so a second request is refused here, not later.
    let guard = match session.try_claim() {
        Ok(guard) => guard,
        Err(e) => return e.into_response(),
    };

    let task_session = session.clone();
    tokio::spawn(async move {
        // Failures are already logged and broadcast by the session.
        let _ = match kind {
            Some(kind) => task_session.run_phase_claimed(guard, kind).await,
            None => task_session.run_pipeline_claimed(guard).await,
        };
    });

    (StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: phase })).into_response()
}

async fn playback_status_handler(State(session): State<AppState>) -> Json<PlaybackStatus> {
    Json(session.status().await)
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: PlaybackSpeed,
}

async fn speed_handler(
    State(session): State<AppState>,
    Json(req): Json<SpeedRequest>,
) -> Json<PlaybackStatus> {
    session.set_speed(req.speed).await;
    Json(session.status().await)
}

async fn ws_handler(ws: WebSocketUpgrade, State(session): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, session))
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> bool {
    match serde_json::to_string(frame) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            debug!(error = %e, "frame not serializable");
            true
        }
    }
}

async fn handle_ws(mut socket: WebSocket, session: Arc<Session>) {
    let mut frames = session.subscribe();

    // Send initial scene
    let initial = session.scene_frame().await;
    if !send_frame(&mut socket, &initial).await {
        return;
    }

    loop {
        tokio::select! {
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if !send_frame(&mut socket, &frame).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket client lagging, resending scene");
                    let current = session.scene_frame().await;
                    if !send_frame(&mut socket, &current).await {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("websocket client disconnected");
}
