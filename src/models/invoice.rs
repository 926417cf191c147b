use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Persisted invoice record.
///
/// `duzp` is the tax-point date (DD.MM.YYYY) and drives all period
/// bucketing. Wire field names keep the upper-case VAT casing the
/// extraction output and the UI use.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub supplier_name: String,
    /// Empty string when the supplier has no VAT number; may be "NA".
    pub vat_number: String,
    pub invoice_number: String,
    pub date_of_sale: Option<String>,
    pub due_date: Option<String>,
    pub duzp: String,
    #[serde(rename = "amount_without_VAT_21")]
    pub amount_without_vat_21: f64,
    #[serde(rename = "VAT_21")]
    pub vat_21: f64,
    #[serde(rename = "amount_without_VAT_12")]
    pub amount_without_vat_12: f64,
    #[serde(rename = "VAT_12")]
    pub vat_12: f64,
    #[serde(rename = "total_amount_with_VAT")]
    pub total_amount_with_vat: f64,
    /// "true" | "false" | "NA" — advisory result of the last registry check.
    #[serde(rename = "reliable_VAT_payer")]
    pub reliable_vat_payer: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Incoming create/update payload.
///
/// Numeric fields tolerate whatever the AI extraction emits: JSON numbers,
/// numeric strings (decimal comma included), null, or nothing at all.
/// Unparseable values coerce to `None`; the store turns that into 0.0 for
/// every amount except `total_amount_with_VAT`, which must parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceDraft {
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub vat_number: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub date_of_sale: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub duzp: Option<String>,
    #[serde(
        default,
        rename = "amount_without_VAT_21",
        deserialize_with = "lenient_amount"
    )]
    pub amount_without_vat_21: Option<f64>,
    #[serde(default, rename = "VAT_21", deserialize_with = "lenient_amount")]
    pub vat_21: Option<f64>,
    #[serde(
        default,
        rename = "amount_without_VAT_12",
        deserialize_with = "lenient_amount"
    )]
    pub amount_without_vat_12: Option<f64>,
    #[serde(default, rename = "VAT_12", deserialize_with = "lenient_amount")]
    pub vat_12: Option<f64>,
    #[serde(
        default,
        rename = "total_amount_with_VAT",
        deserialize_with = "lenient_amount"
    )]
    pub total_amount_with_vat: Option<f64>,
    #[serde(default, rename = "reliable_VAT_payer")]
    pub reliable_vat_payer: Option<String>,
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_amount))
}

/// Coerce a JSON value to a finite f64. Strings may use a decimal comma.
fn coerce_amount(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}
