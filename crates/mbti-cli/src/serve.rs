//! Web form: a text box, a predict button, and the result panels.
//!
//! The predictor is built once in `main` and shared by every request.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mbti_ai::{PredictError, Predictor};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::display::{EMPTY_INPUT_WARNING, PredictionReport};

const INDEX_HTML: &str = include_str!("ui/index.html");

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/predict", post(predict))
        .route("/api/describe/:code", get(describe))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(predictor: Arc<Predictor>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(AppState { predictor });
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("mbti listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// GET /
async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: "mbti",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/predict
///
/// 200 with the report, 422 with a warning for blank input, 500 if
/// inference fails.
async fn predict(State(state): State<AppState>, Json(req): Json<PredictRequest>) -> Response {
    let predictor = Arc::clone(&state.predictor);
    let result = tokio::task::spawn_blocking(move || predictor.predict(&req.text)).await;

    match result {
        Ok(Ok(prediction)) => {
            info!(type_code = %prediction.type_code, "prediction served");
            Json(PredictionReport::from(&prediction)).into_response()
        }
        Ok(Err(PredictError::EmptyInput)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "warning": EMPTY_INPUT_WARNING })),
        )
            .into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "prediction failed");
            internal_error(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "prediction task aborted");
            internal_error(e.to_string())
        }
    }
}

/// GET /api/describe/:code
async fn describe(Path(code): Path<String>) -> Json<serde_json::Value> {
    Json(json!({
        "type_code": code.trim().to_ascii_uppercase(),
        "description": mbti_core::describe(&code),
    }))
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
