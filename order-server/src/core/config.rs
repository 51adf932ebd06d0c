//! Environment-driven configuration
//!
//! Gateway credentials and callback credentials are required; the server
//! refuses to start without them. Everything else has a sensible default.

use shared::error::{AppError, AppResult, ErrorCode};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,

    pub gateway_base_url: String,
    pub gateway_client_id: String,
    pub gateway_client_secret: String,
    pub gateway_client_version: String,
    /// Where the gateway sends the customer after checkout
    pub payment_redirect_url: String,

    /// Shared credentials for the gateway's server-to-server callback
    pub callback_username: String,
    pub callback_password: String,

    pub log_level: String,
    pub log_json: bool,
}

fn required(name: &str) -> AppResult<String> {
    std::env::var(name).map_err(|_| {
        AppError::with_message(
            ErrorCode::ConfigError,
            format!("Missing required environment variable: {name}"),
        )
    })
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let port = optional("PORT", "8080").parse::<u16>().map_err(|_| {
            AppError::with_message(ErrorCode::ConfigError, "PORT must be a valid port number")
        })?;

        Ok(Self {
            host: optional("HOST", "0.0.0.0"),
            port,
            db_path: optional("DB_PATH", "./data/orders.redb"),

            gateway_base_url: required("GATEWAY_BASE_URL")?,
            gateway_client_id: required("GATEWAY_CLIENT_ID")?,
            gateway_client_secret: required("GATEWAY_CLIENT_SECRET")?,
            gateway_client_version: optional("GATEWAY_CLIENT_VERSION", "1"),
            payment_redirect_url: required("PAYMENT_REDIRECT_URL")?,

            callback_username: required("CALLBACK_USERNAME")?,
            callback_password: required("CALLBACK_PASSWORD")?,

            log_level: optional("LOG_LEVEL", "info"),
            log_json: optional("LOG_JSON", "false") == "true",
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
