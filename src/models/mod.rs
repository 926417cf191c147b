pub mod invoice;
pub mod stats;
pub mod vat;

pub use invoice::{Invoice, InvoiceDraft};
pub use stats::{QuarterStats, SupplierQuarterRow, SupplierRangeRow};
pub use vat::VatCheckResult;
