pub mod mistral;
pub mod vat_registry;

pub use mistral::MistralClient;
pub use vat_registry::VatRegistryClient;
