use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub mod config;
pub mod domain {
    pub mod payment;
}
pub mod http {
    pub mod handlers {
        pub mod jobs;
        pub mod ops;
        pub mod stats;
        pub mod webhook;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
}
pub mod processor;
pub mod service {
    pub mod expiry_service;
    pub mod webhook_service;
}
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::PaymentStore>,
    pub webhook_service: service::webhook_service::WebhookService,
    pub expiry_service: service::expiry_service::ExpiryService,
}

pub fn build_router(state: AppState, internal_api_key: String) -> Router {
    let admin_routes = Router::new()
        .route("/admin/payments/stats", get(http::handlers::stats::payment_stats))
        .layer(from_fn_with_state(
            internal_api_key,
            http::middleware::admin_auth::require_internal_api_key,
        ));

    Router::new()
        .route(
            "/webhooks/payment",
            post(http::handlers::webhook::receive_payment_webhook),
        )
        .route(
            "/jobs/expire-pending",
            post(http::handlers::jobs::expire_pending_payments),
        )
        .route("/ops/readiness", get(http::handlers::ops::readiness))
        .route("/ops/liveness", get(http::handlers::ops::liveness))
        .merge(admin_routes)
        .with_state(state)
}
