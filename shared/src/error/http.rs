//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::ItemNotFound
            | Self::VariantNotFound
            | Self::CartNotFound
            | Self::AddressNotFound
            | Self::WalletNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::RefundAlreadyCompleted => StatusCode::CONFLICT,

            // 403 Forbidden
            Self::PermissionDenied | Self::AddressNotOwned => StatusCode::FORBIDDEN,

            // 401 Unauthorized (gateway callback digest mismatch)
            Self::CallbackUnauthorized => StatusCode::UNAUTHORIZED,

            // 502 Bad Gateway (upstream gateway exhausted retries)
            Self::GatewayUnavailable => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient, client may retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::PaymentUnexpectedState => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/state errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
