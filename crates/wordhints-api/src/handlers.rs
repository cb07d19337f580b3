use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use wordhints_core::{Hint, HintsEngine};

/// The only language pair served so far.
pub const SUPPORTED_LANGUAGE: &str = "english";

/// Frequency-rank threshold used when the request doesn't carry one.
pub const DEFAULT_DIFFICULTY: u32 = 1000;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn HintsEngine>,
    pub max_text_len: usize,
}

#[derive(Deserialize)]
pub struct HintsRequest {
    pub text: String,
    #[serde(default)]
    pub options: HintsOptions,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct HintsOptions {
    pub text_language: String,
    pub hints_language: String,
    pub difficulty: u32,
    pub avoid_repetitions: bool,
}

impl Default for HintsOptions {
    fn default() -> Self {
        Self {
            text_language: SUPPORTED_LANGUAGE.to_string(),
            hints_language: SUPPORTED_LANGUAGE.to_string(),
            difficulty: DEFAULT_DIFFICULTY,
            avoid_repetitions: true,
        }
    }
}

#[derive(Serialize)]
pub struct HintsResponse {
    hints: Vec<Hint>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/robots.txt", get(robots))
        .route("/healthz", get(healthz))
        .route("/api/v1/get_hints", post(get_hints))
        .route("/api/latest/get_hints", post(get_hints))
        .route("/api/v1/available_languages", get(available_languages))
        .route("/api/latest/available_languages", get(available_languages))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "wordhints",
        "endpoints": ["/api/v1/get_hints", "/api/v1/available_languages"],
    }))
}

async fn robots() -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )],
        "User-agent: *\nDisallow: /",
    )
}

/// Supported `(text_language, hints_language)` pairs.
async fn available_languages() -> impl IntoResponse {
    Json(json!([[SUPPORTED_LANGUAGE, SUPPORTED_LANGUAGE]]))
}

async fn get_hints(
    State(state): State<AppState>,
    Json(request): Json<HintsRequest>,
) -> Result<Response, ApiError> {
    let options = request.options;
    if options.text_language != SUPPORTED_LANGUAGE
        || options.hints_language != SUPPORTED_LANGUAGE
    {
        return Err(ApiError::bad_request(format!(
            "unsupported language pair: {} -> {}",
            options.text_language, options.hints_language
        )));
    }
    if request.text.trim().is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    let text_len = request.text.chars().count();
    if text_len > state.max_text_len {
        return Err(ApiError::bad_request(format!(
            "text must be at most {} characters (got {text_len})",
            state.max_text_len
        )));
    }

    // The pipeline blocks on remote NLP calls; keep it off the runtime
    // worker threads.
    let engine = Arc::clone(&state.engine);
    let text = request.text;
    let hints = tokio::task::spawn_blocking(move || {
        engine.get_hints(&text, options.difficulty, options.avoid_repetitions)
    })
    .await
    .map_err(|err| {
        error!("hint task panicked: {err}");
        ApiError::Internal
    })?
    .map_err(|err| {
        error!("get_hints failed: {err:#}");
        ApiError::Internal
    })?;

    Ok(Json(HintsResponse { hints }).into_response())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
