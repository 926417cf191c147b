use serde::{Deserialize, Serialize};

/// Result of a VAT-registry reliability lookup.
///
/// Field names match the original checker's output so the UI can consume
/// the payload unchanged. The lookup is advisory: on any failure the
/// result degrades to "reliable" with `auto_checked: false` instead of
/// surfacing an HTTP error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatCheckResult {
    /// "success" | "not_found" | "error"
    pub status: String,
    /// "true" | "false" | "NA"
    pub reliable_vat_payer: String,
    pub message: String,
    pub auto_checked: bool,
    pub vat_number_clean: String,
}

impl VatCheckResult {
    /// Soft-failure result: keep the ledger usable when the registry is
    /// unreachable or the input is unusable.
    pub fn error(message: impl Into<String>, vat_number_clean: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            reliable_vat_payer: "true".to_string(),
            message: message.into(),
            auto_checked: false,
            vat_number_clean: vat_number_clean.into(),
        }
    }
}
