use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn expire_pending_payments(State(state): State<AppState>) -> impl IntoResponse {
    match state.expiry_service.sweep(chrono::Utc::now()).await {
        Ok(cancelled) if cancelled.is_empty() => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "No expired payments found",
                "cancelled_count": 0
            })),
        )
            .into_response(),
        Ok(cancelled) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": format!("cancelled {} expired payments", cancelled.len()),
                "cancelled_count": cancelled.len(),
                "cancelled_payments": cancelled
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "expiry sweep failed");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "failed to expire pending payments",
                    "details": e.to_string()
                })),
            )
                .into_response()
        }
    }
}
