use serde::{Deserialize, Serialize};

/// Quarter statistics response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterStats {
    pub quarter: u32,
    pub year: i32,
    pub total_invoices: usize,
    pub total_amount: f64,
    #[serde(rename = "currentQuarterVAT")]
    pub current_quarter_vat: f64,
    #[serde(rename = "ytdVAT")]
    pub ytd_vat: f64,
}

/// Per-supplier totals for the quarter view.
///
/// Grouped by (supplier_name, vat_number); `status` carries the
/// reliability flag of the last invoice seen in the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierQuarterRow {
    pub supplier_name: String,
    /// "N/A" placeholder when the supplier has no VAT number.
    pub vat_number: String,
    pub total_amount: f64,
    #[serde(rename = "totalVAT")]
    pub total_vat: f64,
    pub invoice_count: usize,
    pub status: String,
}

/// Per-supplier totals for the date-range (share-of-wallet) view.
///
/// Grouped by vat_number alone so name variants of one registered
/// supplier coalesce; unregistered suppliers stay keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRangeRow {
    pub supplier_name: String,
    pub vat_number: String,
    pub total_amount: f64,
    pub invoice_count: usize,
}
