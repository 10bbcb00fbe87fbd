//! HTTP API surface
//!
//! Thin axum layer over the engine: handlers take the engine lock, run one
//! operation, and translate failures into the JSON error envelope. The
//! today-checkin handler is the only one that talks to the network, and it
//! does so between two short lock scopes.

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use punch_api::{
    CheckInRequest, CheckInResponse, CheckOutRequest, CheckOutResponse, ConfigResponse,
    ConfigUpdateRequest, ErrorCode, ErrorInfo, ErrorResponse, MonthlyStatsResponse,
    StatusResponse, TodayCheckInRequest, TodayCheckInResponse,
};
use punch_client::AttendanceProvider;
use punch_core::{EngineError, TodayCheckInStep, TrackerEngine};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<TrackerEngine>>,
    pub attendance: Arc<dyn AttendanceProvider>,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .route("/api/config", get(get_config).post(post_config))
        .route("/api/checkin", post(post_check_in))
        .route("/api/checkout", post(post_check_out))
        .route("/api/today-checkin", post(post_today_check_in))
        .route("/api/monthly-stats", get(get_monthly_stats))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, ApiFailure>;

async fn get_status(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let status = state.engine.lock().await.status(punch_util::now())?;
    Ok(Json(status))
}

async fn get_config(State(state): State<AppState>) -> ApiResult<ConfigResponse> {
    let config = state.engine.lock().await.work_config()?;
    Ok(Json(config))
}

async fn post_config(
    State(state): State<AppState>,
    Json(request): Json<ConfigUpdateRequest>,
) -> ApiResult<ConfigResponse> {
    let config = state
        .engine
        .lock()
        .await
        .update_config(&request, punch_util::now())?;
    Ok(Json(config))
}

async fn post_check_in(
    State(state): State<AppState>,
    Json(request): Json<CheckInRequest>,
) -> ApiResult<CheckInResponse> {
    let response = state
        .engine
        .lock()
        .await
        .record_check_in(&request, punch_util::now())?;
    Ok(Json(response))
}

async fn post_check_out(
    State(state): State<AppState>,
    Json(request): Json<CheckOutRequest>,
) -> ApiResult<CheckOutResponse> {
    let response = state
        .engine
        .lock()
        .await
        .record_check_out(&request, punch_util::now())?;
    Ok(Json(response))
}

async fn post_today_check_in(
    State(state): State<AppState>,
    Json(request): Json<TodayCheckInRequest>,
) -> ApiResult<TodayCheckInResponse> {
    let step = state.engine.lock().await.plan_today_checkin(&request)?;

    // The fetch runs without the engine lock so other requests proceed
    let (endpoint, date) = match step {
        TodayCheckInStep::Resolved(response) => return Ok(Json(response)),
        TodayCheckInStep::FetchNeeded { endpoint, date } => (endpoint, date),
    };

    let fetched = state.attendance.fetch_check_in(&endpoint, date).await;

    let response = state
        .engine
        .lock()
        .await
        .apply_fetched_check_in(&request, fetched, punch_util::now())?;
    Ok(Json(response))
}

async fn get_monthly_stats(State(state): State<AppState>) -> ApiResult<MonthlyStatsResponse> {
    let stats = state.engine.lock().await.monthly_stats(punch_util::now())?;
    Ok(Json(stats))
}

/// Permissive CORS for the dashboard, preflight included
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Error reply carrying the HTTP status and the JSON envelope
pub struct ApiFailure {
    status: StatusCode,
    info: ErrorInfo,
}

impl ApiFailure {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: status_for(code),
            info: ErrorInfo::new(code, message),
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidInput | ErrorCode::ConfigInvalid => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::UpstreamUnavailable | ErrorCode::UpstreamParseError => StatusCode::BAD_GATEWAY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.info })).into_response()
    }
}

impl From<EngineError> for ApiFailure {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidInput(message) => Self::new(ErrorCode::InvalidInput, message),
            EngineError::NotFound(message) => Self::new(ErrorCode::NotFound, message),
            EngineError::ConfigInvalid(message) => Self::new(ErrorCode::ConfigInvalid, message),
            EngineError::Store(e) => {
                error!(error = %e, "Store failure");
                Self::new(ErrorCode::Internal, "internal storage failure")
            }
        }
    }
}
