pub mod ledger;
pub mod period;
pub mod stats;
pub mod suppliers;

pub use ledger::LedgerService;
pub use period::Period;
