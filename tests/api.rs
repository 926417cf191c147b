use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use invoice_ledger_rust::api::{self, AppState};
use invoice_ledger_rust::upstream::{MistralClient, VatRegistryClient};
use invoice_ledger_rust::{db, LedgerService};

/// Full router over an in-memory database. The upstream clients point
/// at an unroutable address; routes that would dial out are only tested
/// on their short-circuit paths.
async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_schema(&pool).await.unwrap();

    let state = AppState {
        ledger: Arc::new(LedgerService::new(pool)),
        vat_registry: Arc::new(VatRegistryClient::new("http://127.0.0.1:9".to_string())),
        mistral: Arc::new(MistralClient::new("http://127.0.0.1:9".to_string(), String::new())),
    };

    api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(b) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn invoice_body(supplier: &str, number: &str, vat: &str, duzp: &str, total: f64) -> Value {
    json!({
        "supplier_name": supplier,
        "invoice_number": number,
        "vat_number": vat,
        "duzp": duzp,
        "total_amount_with_VAT": total,
    })
}

#[tokio::test]
async fn create_list_and_duplicate() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/invoices",
        Some(invoice_body("Alza.cz", "F-1", "CZ27082440", "15.02.2024", 121.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["data"]["id"].as_i64().unwrap() > 0);
    assert_eq!(body["data"]["total_amount_with_VAT"], json!(121.0));

    // same natural key again
    let (status, body) = send(
        &app,
        "POST",
        "/api/invoices",
        Some(invoice_body("Alza.cz", "F-1", "CZ27082440", "16.02.2024", 500.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(&app, "GET", "/api/invoices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/invoices",
        Some(json!({ "supplier_name": "Alza.cz", "duzp": "15.02.2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn update_and_delete_unknown_id_are_404() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/invoices/999",
        Some(invoice_body("X", "Y", "", "01.01.2024", 1.0)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/invoices/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_colliding_with_another_rows_key_is_409() {
    let app = test_app().await;

    send(
        &app,
        "POST",
        "/api/invoices",
        Some(invoice_body("Alza.cz", "F-1", "CZ27082440", "15.02.2024", 100.0)),
    )
    .await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/invoices",
        Some(invoice_body("Alza.cz", "F-2", "CZ27082440", "20.02.2024", 200.0)),
    )
    .await;
    let second_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/invoices/{}", second_id),
        Some(invoice_body("Alza.cz", "F-1", "CZ27082440", "20.02.2024", 200.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    // no raw database message in the client-facing error
    assert!(!body["message"].as_str().unwrap().contains("constraint"));
}

#[tokio::test]
async fn quarter_listing_stats_and_suppliers() {
    let app = test_app().await;

    let mut first = invoice_body("Alza.cz", "F-1", "CZ27082440", "15.02.2024", 100.0);
    first["VAT_21"] = json!(21.0);
    let mut second = invoice_body("Alza.cz", "F-2", "CZ27082440", "20.03.2024", 250.0);
    second["VAT_12"] = json!(30.0);
    let mut third = invoice_body("Datart", "F-3", "CZ12345678", "10.05.2024", 500.0);
    third["VAT_21"] = json!(105.0);

    for body in [first, second, third] {
        let (status, _) = send(&app, "POST", "/api/invoices", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, "GET", "/api/invoices/quarter/1/year/2024", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, "GET", "/api/stats?quarter=1&year=2024", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalInvoices"], json!(2));
    assert_eq!(body["data"]["totalAmount"], json!(350.0));
    assert_eq!(body["data"]["currentQuarterVAT"], json!(51.0));
    // year-to-date spans the whole year, including Q2
    assert_eq!(body["data"]["ytdVAT"], json!(156.0));

    let (status, body) = send(&app, "GET", "/api/suppliers?quarter=1&year=2024", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["supplierName"], json!("Alza.cz"));
    assert_eq!(rows[0]["invoiceCount"], json!(2));
    assert_eq!(rows[0]["totalAmount"], json!(350.0));
}

#[tokio::test]
async fn daterange_suppliers_require_both_dates() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/suppliers/daterange?startDate=2024-01-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(
        &app,
        "GET",
        "/api/suppliers/daterange?startDate=2024-01-01&endDate=2024-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn daterange_coalesces_suppliers_by_vat() {
    let app = test_app().await;

    for body in [
        invoice_body("Alza.cz", "F-1", "CZ27082440", "15.02.2024", 100.0),
        invoice_body("Alza.cz a.s.", "F-2", "CZ27082440", "20.03.2024", 50.0),
    ] {
        send(&app, "POST", "/api/invoices", Some(body)).await;
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/suppliers/daterange?startDate=2024-01-01&endDate=2024-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["vatNumber"], json!("CZ27082440"));
    assert_eq!(rows[0]["totalAmount"], json!(150.0));
}

#[tokio::test]
async fn clear_empties_the_ledger() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/invoices",
        Some(invoice_body("Alza.cz", "F-1", "", "15.02.2024", 1.0)),
    )
    .await;

    let (status, body) = send(&app, "DELETE", "/api/invoices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (_, body) = send(&app, "GET", "/api/invoices", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn check_vat_soft_fails_inside_a_200() {
    let app = test_app().await;

    // no digits: the client short-circuits without dialing the registry
    let (status, body) = send(
        &app,
        "POST",
        "/api/check-vat",
        Some(json!({ "vat_number": "CZabc" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("error"));
    assert_eq!(body["data"]["reliable_vat_payer"], json!("true"));
    assert_eq!(body["data"]["auto_checked"], json!(false));
}

#[tokio::test]
async fn health_reports_timestamp() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["timestamp"].as_str().is_some());
}
