use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;
use crate::models::{Invoice, InvoiceDraft, QuarterStats, SupplierQuarterRow, SupplierRangeRow, VatCheckResult};
use crate::service::{period, stats, suppliers, LedgerService, Period};
use crate::upstream::{MistralClient, VatRegistryClient};

/// Shared state: ledger store plus the two upstream clients.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
    pub vat_registry: Arc<VatRegistryClient>,
    pub mistral: Arc<MistralClient>,
}

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Bodies that only acknowledge the operation (update/delete/clear).
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

const ACK: AckResponse = AckResponse { success: true };

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub quarter: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodQuery {
    /// Missing components default to the current quarter/year.
    fn resolve(&self) -> Period {
        let current = Period::current();
        Period {
            quarter: self.quarter.unwrap_or(current.quarter),
            year: self.year.unwrap_or(current.year),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckVatRequest {
    #[serde(alias = "vatNumber")]
    pub vat_number: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET /api/invoices
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Invoice>>>, ApiError> {
    let invoices = state.ledger.get_all().await?;
    Ok(ApiResponse::ok(invoices))
}

/// POST /api/invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(draft): Json<InvoiceDraft>,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let invoice = state.ledger.create(draft).await?;
    Ok(ApiResponse::ok(invoice))
}

/// GET /api/invoices/quarter/:quarter/year/:year
pub async fn invoices_by_quarter(
    State(state): State<AppState>,
    Path((quarter, year)): Path<(u32, i32)>,
) -> Result<Json<ApiResponse<Vec<Invoice>>>, ApiError> {
    let invoices = state.ledger.get_by_quarter(quarter, year).await?;
    Ok(ApiResponse::ok(invoices))
}

/// PUT /api/invoices/:id
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<InvoiceDraft>,
) -> Result<Json<AckResponse>, ApiError> {
    state.ledger.update(id, draft).await?;
    Ok(Json(ACK))
}

/// DELETE /api/invoices/:id
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AckResponse>, ApiError> {
    state.ledger.delete(id).await?;
    Ok(Json(ACK))
}

/// DELETE /api/invoices
pub async fn clear_invoices(State(state): State<AppState>) -> Result<Json<AckResponse>, ApiError> {
    state.ledger.clear().await?;
    Ok(Json(ACK))
}

/// GET /api/stats?quarter=&year=
pub async fn quarter_stats(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<QuarterStats>>, ApiError> {
    let target = query.resolve();
    let quarter_rows = state.ledger.get_by_quarter(target.quarter, target.year).await?;
    let year_rows = state.ledger.get_by_year(target.year).await?;
    Ok(ApiResponse::ok(stats::aggregate_quarter(
        target,
        &quarter_rows,
        &year_rows,
    )))
}

/// GET /api/suppliers?quarter=&year=
pub async fn supplier_summary(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<Vec<SupplierQuarterRow>>>, ApiError> {
    let target = query.resolve();
    let rows = state.ledger.get_by_quarter(target.quarter, target.year).await?;
    Ok(ApiResponse::ok(suppliers::aggregate_quarter(&rows)))
}

/// GET /api/suppliers/daterange?startDate=&endDate=
pub async fn supplier_spend(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<ApiResponse<Vec<SupplierRangeRow>>>, ApiError> {
    let (Some(start_raw), Some(end_raw)) = (query.start_date, query.end_date) else {
        return Err(ApiError::Validation(
            "startDate and endDate are required".into(),
        ));
    };

    let start = period::parse_range_date(&start_raw)
        .ok_or_else(|| ApiError::Validation(format!("startDate '{}' is not a date", start_raw)))?;
    let end = period::parse_range_date(&end_raw)
        .ok_or_else(|| ApiError::Validation(format!("endDate '{}' is not a date", end_raw)))?;

    let rows = state.ledger.get_by_date_range(start, end).await?;
    Ok(ApiResponse::ok(suppliers::aggregate_range(&rows)))
}

/// POST /api/check-vat
///
/// Always 200: the client (and the VatRegistryClient itself) embed any
/// failure in the payload so a flaky registry never breaks the form.
pub async fn check_vat(
    State(state): State<AppState>,
    Json(request): Json<CheckVatRequest>,
) -> Json<ApiResponse<VatCheckResult>> {
    let result = state.vat_registry.check_reliability(&request.vat_number).await;
    ApiResponse::ok(result)
}

/// POST /api/mistral/chat — passthrough, mirrors the upstream status.
pub async fn mistral_chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (status, payload) = state.mistral.chat(body).await?;
    Ok((status, Json(payload)))
}
