use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

use super::json_error;
use super::state::AppState;
use crate::models::AnalyzeRequest;

/// 未匹配的路由
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// POST /analyze-rubric
///
/// 请求体无法解析（类型错误、缺少 Content-Type、非 JSON）时统一返回 400 和 `{"error": ...}`。
pub(crate) async fn handle_analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let detail = rejection.body_text();
            warn!("POST /analyze-rubric 400: {}", detail);
            return json_error(
                StatusCode::BAD_REQUEST,
                &format!("Invalid request body: {}", detail),
            )
            .into_response();
        }
    };

    let prompt = request.prompt.unwrap_or_default();
    let criterion = request.criterion.unwrap_or_default();

    match state.evaluator.evaluate(&prompt, &criterion).await {
        Ok(verdict) => {
            info!("POST /analyze-rubric 200 (isValid={})", verdict.is_valid);
            (StatusCode::OK, Json(verdict)).into_response()
        }
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
            warn!("POST /analyze-rubric {}: {}", status.as_u16(), e);
            json_error(status, &e.public_message()).into_response()
        }
    }
}
