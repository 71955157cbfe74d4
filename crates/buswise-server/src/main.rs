use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router, response::IntoResponse, routing::get, routing::post};
use buswise_config::BuswiseConfig;
use buswise_core::TripPlan;
use buswise_core::error::INVALID_INPUT_MESSAGE;
use buswise_planner::{
    HistoryError, InMemoryHistoryStore, NewTripRecord, PlanTripResult, TripHistoryStore,
    TripPlanner, TripRequest,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Header carrying the caller identity, set by the auth layer in front of us.
const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
struct AppState {
    planner: Arc<TripPlanner>,
    history: Arc<dyn TripHistoryStore>,
    history_limit: usize,
}

#[derive(Debug, Deserialize)]
struct SaveTripRequest {
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    plan: Option<TripPlan>,
}

impl SaveTripRequest {
    fn into_record(self) -> Option<NewTripRecord> {
        Some(NewTripRecord {
            origin: self.origin.filter(|s| !s.is_empty())?,
            destination: self.destination.filter(|s| !s.is_empty())?,
            plan: self.plan?,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,buswise_server=debug".to_string()),
        )
        .init();

    let config = BuswiseConfig::load(None)?;
    let planner = Arc::new(TripPlanner::connect(&config).await?);
    let state = AppState {
        planner,
        history: Arc::new(InMemoryHistoryStore::new(config.server.history_capacity)),
        history_limit: config.server.history_limit,
    };

    let app = build_router(state);

    let addr = std::env::var("BUSWISE_SERVER_ADDR")
        .ok()
        .and_then(|s| s.parse::<SocketAddr>().ok())
        .map_or_else(|| config.server.addr.parse::<SocketAddr>(), Ok)?;
    info!(%addr, "starting buswise-server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down buswise-server");
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/trips/plan", post(plan_trip))
        .route("/v1/user/trips", get(list_trips).post(save_trip))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<JsonValue> {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// Always answers 200 with the tagged result; an unreadable body is
/// invalid input like any other.
async fn plan_trip(
    State(state): State<AppState>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> Json<PlanTripResult> {
    match payload {
        Ok(Json(request)) => Json(state.planner.plan_trip(request).await),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected plan request body");
            Json(PlanTripResult::failure(INVALID_INPUT_MESSAGE))
        }
    }
}

async fn list_trips(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<JsonValue>, ApiError> {
    let user_id = caller(&headers)?;
    let trips = state
        .history
        .recent(&user_id, state.history_limit)
        .await
        .map_err(ApiError::history)?;
    Ok(Json(serde_json::json!({ "success": true, "data": trips })))
}

async fn save_trip(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SaveTripRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = caller(&headers)?;
    let Json(body) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let record = body
        .into_record()
        .ok_or(ApiError::history(HistoryError::MissingFields))?;

    let saved = state
        .history
        .save(&user_id, record)
        .await
        .map_err(ApiError::history)?;
    info!(user_id = %user_id, id = %saved.id, "saved trip");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": saved })),
    ))
}

fn caller(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(ApiError::unauthorized)
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
        }
    }

    fn history(error: HistoryError) -> Self {
        match error {
            HistoryError::MissingFields => Self::bad_request(error.to_string()),
            HistoryError::MissingUser => Self::unauthorized(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.message
        }));
        (self.status, body).into_response()
    }
}
