use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

use invoice_ledger_rust::api::{self, AppState};
use invoice_ledger_rust::upstream::{MistralClient, VatRegistryClient};
use invoice_ledger_rust::{db, AppConfig, LedgerService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log format
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // Load configuration
    let config = AppConfig::from_env();
    info!(
        "Starting server on {}:{} (db: {})",
        config.server.host, config.server.port, config.database.url
    );

    // Database pool + schema
    let pool = db::create_pool(&config.database.url).await?;
    db::init_schema(&pool).await?;
    info!("Database pool created");

    // Ledger store and upstream clients
    let ledger = Arc::new(LedgerService::new(pool));
    let state = AppState {
        ledger: ledger.clone(),
        vat_registry: Arc::new(VatRegistryClient::new(
            config.upstream.vat_registry_url.clone(),
        )),
        mistral: Arc::new(MistralClient::new(
            config.upstream.mistral_api_url.clone(),
            config.upstream.mistral_api_key.clone(),
        )),
    };

    // CORS is open because the consumer is the local browser UI
    let app = api::router(state).layer(CorsLayer::permissive());

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET/POST/DELETE /api/invoices");
    info!("  GET  /api/invoices/quarter/:q/year/:y");
    info!("  PUT/DELETE /api/invoices/:id");
    info!("  GET  /api/stats, /api/suppliers, /api/suppliers/daterange");
    info!("  POST /api/check-vat, /api/mistral/chat");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain the store once the listener is gone
    ledger.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
