//! Health check

use serde_json::{Value, json};
use shared::error::ApiResponse;

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
