use crate::models::{Invoice, QuarterStats};
use crate::service::period::Period;

/// Compute quarter statistics from two ledger query results: the rows of
/// the target quarter and the rows of the whole year containing it.
///
/// `ytd_vat` sums VAT over ALL rows tagged with the year, not just up to
/// the target quarter — "year to date" is a label here, not a cutoff.
pub fn aggregate_quarter(
    period: Period,
    quarter_rows: &[Invoice],
    year_rows: &[Invoice],
) -> QuarterStats {
    QuarterStats {
        quarter: period.quarter,
        year: period.year,
        total_invoices: quarter_rows.len(),
        total_amount: quarter_rows.iter().map(|i| i.total_amount_with_vat).sum(),
        current_quarter_vat: quarter_rows.iter().map(vat_of).sum(),
        ytd_vat: year_rows.iter().map(vat_of).sum(),
    }
}

fn vat_of(inv: &Invoice) -> f64 {
    inv.vat_21 + inv.vat_12
}
