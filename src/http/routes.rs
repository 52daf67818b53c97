//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::game::{Contact, GameError, ShipSnapshot, StatePatch};
use crate::store::ShipDocument;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let mut api = Router::new()
        .route("/connect", post(connect_handler))
        .route("/disconnect", post(disconnect_handler))
        .route("/accelerate", post(accelerate_handler))
        .route("/scan", post(scan_handler))
        .route("/shoot", post(shoot_handler))
        .route("/shield", post(shield_handler))
        .route("/getShipInfo", post(ship_info_handler))
        .route("/health", get(health_handler));

    // The debug control plane is only mounted when explicitly enabled.
    if state.config.debug_api {
        api = api.route("/sudo", post(sudo_handler));
    }

    api.fallback(unknown_route_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Shared request/response shapes
// ============================================================================

/// Body for verbs that take nothing but the session token.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenRequest {
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShipInfoResponse {
    id: String,
    pos_x: f64,
    pos_y: f64,
    vel_x: f64,
    vel_y: f64,
    area: f64,
    energy: f64,
    shield_dir: f64,
    shield_width: f64,
}

impl From<ShipSnapshot> for ShipInfoResponse {
    fn from(snapshot: ShipSnapshot) -> Self {
        Self {
            id: snapshot.id,
            pos_x: snapshot.pos_x,
            pos_y: snapshot.pos_y,
            vel_x: snapshot.vel_x,
            vel_y: snapshot.vel_y,
            area: snapshot.area,
            energy: snapshot.energy,
            shield_dir: snapshot.shield_dir,
            shield_width: snapshot.shield_width,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactResponse {
    id: String,
    area: f64,
    pos_x: f64,
    pos_y: f64,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            area: contact.area,
            pos_x: contact.pos_x,
            pos_y: contact.pos_y,
        }
    }
}

fn require_token(token: Option<&str>) -> Result<&str, AppError> {
    token.ok_or(AppError::Game(GameError::MissingToken))
}

fn empty_body() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

// ============================================================================
// Session endpoints
// ============================================================================

#[derive(Serialize)]
struct ConnectResponse {
    token: String,
}

async fn connect_handler(State(state): State<AppState>) -> Json<ConnectResponse> {
    let ship = state.world.connect();
    Json(ConnectResponse { token: ship.token })
}

async fn disconnect_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<TokenRequest>, AppError>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = require_token(req.token.as_deref())?;
    let last = state.world.disconnect(token)?;
    // Flush the final state so the document outlives the session.
    if let Some(mirror) = &state.mirror {
        mirror.push(ShipDocument::from_snapshot(&last)).await;
    }
    Ok(empty_body())
}

async fn ship_info_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<TokenRequest>, AppError>,
) -> Result<Json<ShipInfoResponse>, AppError> {
    let token = require_token(req.token.as_deref())?;
    let ship = state.world.ship_info(token)?;
    Ok(Json(ship.into()))
}

// ============================================================================
// Maneuvering endpoints
// ============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AccelerateRequest {
    token: Option<String>,
    x: f64,
    y: f64,
}

async fn accelerate_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AccelerateRequest>, AppError>,
) -> Result<Json<ShipInfoResponse>, AppError> {
    let token = require_token(req.token.as_deref())?;
    let ship = state.world.accelerate(token, req.x, req.y)?;
    Ok(Json(ship.into()))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ShieldRequest {
    token: Option<String>,
    direction: f64,
    width: f64,
}

async fn shield_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ShieldRequest>, AppError>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = require_token(req.token.as_deref())?;
    state.world.set_shield(token, req.direction, req.width)?;
    Ok(empty_body())
}

// ============================================================================
// Combat endpoints
// ============================================================================

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScanRequest {
    token: Option<String>,
    direction: f64,
    width: f64,
    energy: f64,
}

#[derive(Serialize)]
struct ScanResponse {
    scanned: Vec<ContactResponse>,
}

async fn scan_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ScanRequest>, AppError>,
) -> Result<Json<ScanResponse>, AppError> {
    let token = require_token(req.token.as_deref())?;
    let contacts = state
        .world
        .scan(token, req.direction, req.width, req.energy)?;
    Ok(Json(ScanResponse {
        scanned: contacts.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ShootRequest {
    token: Option<String>,
    direction: f64,
    width: f64,
    energy: f64,
    damage: f64,
}

#[derive(Serialize)]
struct ShootResponse {
    struck: Vec<ContactResponse>,
}

async fn shoot_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ShootRequest>, AppError>,
) -> Result<Json<ShootResponse>, AppError> {
    let token = require_token(req.token.as_deref())?;
    let contacts = state
        .world
        .shoot(token, req.direction, req.width, req.energy, req.damage)?;
    Ok(Json(ShootResponse {
        struck: contacts.into_iter().map(Into::into).collect(),
    }))
}

// ============================================================================
// Debug endpoint
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SudoRequest {
    token: Option<String>,
    pos_x: Option<f64>,
    pos_y: Option<f64>,
    vel_x: Option<f64>,
    vel_y: Option<f64>,
    area: Option<f64>,
    energy: Option<f64>,
    /// Absolute clock pin, milliseconds.
    time: Option<f64>,
}

async fn sudo_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SudoRequest>, AppError>,
) -> Result<Json<serde_json::Value>, AppError> {
    let patch = StatePatch {
        pos_x: req.pos_x,
        pos_y: req.pos_y,
        vel_x: req.vel_x,
        vel_y: req.vel_y,
        area: req.area,
        energy: req.energy,
        time_ms: req.time,
    };
    state.world.sudo(req.token.as_deref(), &patch)?;
    Ok(empty_body())
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_ships: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started.elapsed().as_secs(),
        active_ships: state.world.ship_count(),
    })
}

async fn unknown_route_handler() -> AppError {
    AppError::UnknownRoute
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Malformed request payload.")]
    Payload(#[from] axum::extract::rejection::JsonRejection),

    #[error("No such API route.")]
    UnknownRoute,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Game(err) => (status_for(&err), err.to_string()),
            AppError::Payload(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::UnknownRoute => (StatusCode::NOT_FOUND, "No such API route.".to_string()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::MissingToken | GameError::UnknownToken => StatusCode::UNAUTHORIZED,
        GameError::ShipDead => StatusCode::GONE,
        GameError::Invalid(_) => StatusCode::BAD_REQUEST,
    }
}
