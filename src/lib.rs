pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod service;
pub mod upstream;

pub use config::AppConfig;
pub use db::{create_pool, init_schema};
pub use errors::ApiError;
pub use service::LedgerService;
