use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront_payments::config::AppConfig;
use storefront_payments::processor::mercado_pago::MercadoPagoClient;
use storefront_payments::service::expiry_service::ExpiryService;
use storefront_payments::service::webhook_service::WebhookService;
use storefront_payments::store::postgres::PaymentsRepo;
use storefront_payments::store::PaymentStore;
use storefront_payments::{build_router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let store: Arc<dyn PaymentStore> = Arc::new(PaymentsRepo { pool });

    let processor = Arc::new(MercadoPagoClient {
        base_url: cfg.processor_base_url.clone(),
        access_token: cfg.processor_access_token.clone(),
        timeout_ms: cfg.processor_timeout_ms,
        client: reqwest::Client::new(),
    });

    let state = AppState {
        store: store.clone(),
        webhook_service: WebhookService {
            processor,
            store: store.clone(),
        },
        expiry_service: ExpiryService { store },
    };

    let app = build_router(state, cfg.internal_api_key.clone());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
