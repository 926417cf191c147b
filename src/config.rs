use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Endpoints and credentials for the two upstream collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub mistral_api_url: String,
    pub mistral_api_key: String,
    pub vat_registry_url: String,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://invoices.db";
const DEFAULT_MISTRAL_URL: &str = "https://api.mistral.ai";
const DEFAULT_VAT_REGISTRY_URL: &str =
    "https://adisrws.mfcr.cz/dpr/axis2/services/rozhraniCRPDPH.rozhraniCRPDPHSOAP";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            },
            upstream: UpstreamConfig {
                mistral_api_url: DEFAULT_MISTRAL_URL.to_string(),
                mistral_api_key: String::new(),
                vat_registry_url: DEFAULT_VAT_REGISTRY_URL.to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3000),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            },
            upstream: UpstreamConfig {
                mistral_api_url: std::env::var("MISTRAL_API_URL")
                    .unwrap_or_else(|_| DEFAULT_MISTRAL_URL.to_string()),
                mistral_api_key: std::env::var("MISTRAL_API_KEY").unwrap_or_default(),
                vat_registry_url: std::env::var("VAT_REGISTRY_URL")
                    .unwrap_or_else(|_| DEFAULT_VAT_REGISTRY_URL.to_string()),
            },
        }
    }
}
