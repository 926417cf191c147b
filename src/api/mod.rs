pub mod handlers;

pub use handlers::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};

/// Assemble the full API surface over the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/invoices",
            get(handlers::list_invoices)
                .post(handlers::create_invoice)
                .delete(handlers::clear_invoices),
        )
        .route(
            "/api/invoices/quarter/:quarter/year/:year",
            get(handlers::invoices_by_quarter),
        )
        .route(
            "/api/invoices/:id",
            put(handlers::update_invoice).delete(handlers::delete_invoice),
        )
        .route("/api/stats", get(handlers::quarter_stats))
        .route("/api/suppliers", get(handlers::supplier_summary))
        .route("/api/suppliers/daterange", get(handlers::supplier_spend))
        .route("/api/check-vat", post(handlers::check_vat))
        .route("/api/mistral/chat", post(handlers::mistral_chat))
        .route("/api/health", get(handlers::health_check))
        .with_state(state)
}
