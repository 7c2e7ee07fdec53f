use crate::service::webhook_service::{WebhookEvent, WebhookOutcome};
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn receive_payment_webhook(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> impl IntoResponse {
    match state.webhook_service.handle_event(event).await {
        Ok(WebhookOutcome::Ignored { event_type }) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("ignoring event type '{}'", event_type),
                "received": true
            })),
        )
            .into_response(),
        Ok(WebhookOutcome::Updated {
            payment_id, status, ..
        }) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "payment status updated",
                "payment_id": payment_id,
                "status": status.as_str()
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "webhook processing failed");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "failed to process payment webhook",
                    "details": e.to_string()
                })),
            )
                .into_response()
        }
    }
}
